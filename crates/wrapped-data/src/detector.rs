//! Format detection and merge dispatch for one upload batch.
//!
//! A batch is either a processed stats file (only the first payload counts)
//! or a set of raw streaming-history arrays that are concatenated in batch
//! order.

use serde_json::Value;
use tracing::debug;
use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::StatsResult;

/// Key pairs (snake_case, camelCase) that mark a processed stats object.
const AGGREGATE_KEYS: [(&str, &str); 3] = [
    ("top_artists", "topArtists"),
    ("top_songs", "topSongs"),
    ("top_albums", "topAlbums"),
];

/// The classified content of one batch.
#[derive(Debug, Clone)]
pub enum Dataset {
    /// A previously computed stats snapshot; cannot be re-filtered.
    Aggregated(StatsResult),
    /// All raw records of the batch, flattened in batch order.
    Raw(Vec<Value>),
}

impl Dataset {
    /// Only raw input can be re-aggregated under a date filter.
    pub fn supports_filtering(&self) -> bool {
        matches!(self, Dataset::Raw(_))
    }
}

/// `true` when `value` is an object exposing all three top-list keys.
pub fn is_aggregated_stats(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    AGGREGATE_KEYS
        .iter()
        .all(|(snake, camel)| obj.contains_key(*snake) || obj.contains_key(*camel))
}

/// Classify a batch of parsed payloads.
///
/// Decided by the **first** payload alone:
/// * processed stats object → [`Dataset::Aggregated`], the rest is ignored;
/// * array → every payload must be an array, concatenated into
///   [`Dataset::Raw`];
/// * anything else → [`WrappedError::Format`].
pub fn detect(payloads: Vec<Value>) -> Result<Dataset> {
    let mut iter = payloads.into_iter();
    let Some(first) = iter.next() else {
        return Err(WrappedError::NoInput);
    };

    if is_aggregated_stats(&first) {
        let ignored = iter.count();
        if ignored > 0 {
            debug!("Processed stats input; ignoring {} further payload(s)", ignored);
        }
        let stats: StatsResult = serde_json::from_value(first).map_err(|e| {
            WrappedError::Format(format!("processed stats file is malformed: {}", e))
        })?;
        return Ok(Dataset::Aggregated(stats));
    }

    let Value::Array(mut records) = first else {
        return Err(WrappedError::Format(
            "expected Spotify streaming history JSON arrays or a processed stats file"
                .to_string(),
        ));
    };

    for (index, payload) in iter.enumerate() {
        match payload {
            Value::Array(more) => records.extend(more),
            _ => {
                return Err(WrappedError::Format(format!(
                    "file {} of the batch is not a streaming history array",
                    index + 2
                )))
            }
        }
    }

    debug!("Merged raw batch into {} records", records.len());
    Ok(Dataset::Raw(records))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
