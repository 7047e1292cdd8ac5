//! Alias resolution from raw export records to [`NormalizedEvent`].
//!
//! Streaming-history exports come in several schema variants (the "extended"
//! export uses `ts` / `master_metadata_*`, the "account data" export uses
//! `endTime` / `artistName`). Each canonical field is resolved
//! through a fixed, ordered alias list; the first alias carrying a usable
//! value wins, otherwise the field default applies.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::models::{NormalizedEvent, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TRACK};
use crate::time_utils::TimezoneHandler;

// ── Alias table ───────────────────────────────────────────────────────────────

/// Ordered alias lists for every canonical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub timestamp: &'static [&'static str],
    pub artist_name: &'static [&'static str],
    pub track_name: &'static [&'static str],
    pub album_name: &'static [&'static str],
    pub played_ms: &'static [&'static str],
    pub track_uri: &'static [&'static str],
    pub artist_uri: &'static [&'static str],
    pub album_uri: &'static [&'static str],
}

/// The alias table used by [`RecordNormalizer`].
pub const ALIASES: FieldAliases = FieldAliases {
    timestamp: &["ts", "endTime", "timestamp"],
    artist_name: &["master_metadata_album_artist_name", "artistName"],
    track_name: &["master_metadata_track_name", "trackName"],
    album_name: &["master_metadata_album_album_name", "albumName"],
    played_ms: &["ms_played"],
    track_uri: &["spotify_track_uri", "track_uri"],
    artist_uri: &["spotify_artist_uri", "artist_uri"],
    album_uri: &["spotify_album_uri", "album_uri"],
};

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses event timestamps found in export records.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Attempt to parse a [`serde_json::Value`] into a UTC [`DateTime`].
    ///
    /// Handles:
    /// * `null`       → `None`
    /// * JSON string  → see [`TimezoneHandler::parse_timestamp`].
    /// * JSON number  → milliseconds since the Unix epoch.
    pub fn parse(value: &Value, tz: &TimezoneHandler) -> Option<DateTime<Utc>> {
        match value {
            Value::Null => None,
            Value::String(s) => tz.parse_timestamp(s),
            Value::Number(n) => {
                if let Some(ms) = n.as_i64() {
                    DateTime::from_timestamp_millis(ms)
                } else if let Some(f) = n.as_f64() {
                    if f.is_finite() {
                        DateTime::from_timestamp_millis(f.trunc() as i64)
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

// ── RecordNormalizer ──────────────────────────────────────────────────────────

/// Total, side-effect-free mapping from raw records to [`NormalizedEvent`]s.
///
/// Never rejects a record: missing fields fall back to their defaults and an
/// unparseable timestamp becomes `None`. Whether such an event is kept is the
/// date filter's decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer {
    tz: TimezoneHandler,
}

impl RecordNormalizer {
    /// `tz` decides how naive local timestamps are interpreted.
    pub fn new(tz: TimezoneHandler) -> Self {
        Self { tz }
    }

    /// Normalise one raw record.
    pub fn normalize(&self, data: &Value) -> NormalizedEvent {
        let timestamp = find_usable(data, ALIASES.timestamp)
            .and_then(|v| TimestampProcessor::parse(v, &self.tz));

        NormalizedEvent {
            timestamp,
            artist_name: find_string(data, ALIASES.artist_name)
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            track_name: find_string(data, ALIASES.track_name)
                .unwrap_or_else(|| UNKNOWN_TRACK.to_string()),
            album_name: find_string(data, ALIASES.album_name)
                .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            played_ms: find_played_ms(data, ALIASES.played_ms),
            track_uri: find_string(data, ALIASES.track_uri),
            artist_uri: find_string(data, ALIASES.artist_uri),
            album_uri: find_string(data, ALIASES.album_uri),
        }
    }

    /// Normalise every record of a combined raw sequence, preserving order.
    pub fn normalize_all(&self, records: &[Value]) -> Vec<NormalizedEvent> {
        let events: Vec<NormalizedEvent> = records.iter().map(|r| self.normalize(r)).collect();

        let undated = events.iter().filter(|e| e.timestamp.is_none()).count();
        debug!(
            records = records.len(),
            undated, "normalised raw streaming records"
        );

        events
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// First alias whose value is usable: present, non-null, and not an empty
/// string.
fn find_usable<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
}

/// First alias holding a non-empty string (numbers are stringified).
fn find_string(data: &Value, keys: &[&str]) -> Option<String> {
    for &key in keys {
        match data.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

/// First alias holding a numeric play duration, clamped to `>= 0`.
fn find_played_ms(data: &Value, keys: &[&str]) -> u64 {
    for &key in keys {
        let parsed = match data.get(key) {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        if let Some(ms) = parsed {
            return ms;
        }
    }
    0
}

// ── Tests ──────────────────────────────────────────────────────────────────────
