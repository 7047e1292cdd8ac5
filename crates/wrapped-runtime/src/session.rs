//! Immutable analysis session.
//!
//! A [`Session`] owns the normalised events of one committed batch (raw input
//! only), the active date range and the statistics computed for it. Changing
//! the range never mutates a session; it produces a new one recomputed from
//! the retained events.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use tracing::debug;
use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::{NormalizedEvent, StatsResult};
use wrapped_core::normalizer::RecordNormalizer;
use wrapped_core::time_utils::TimezoneHandler;
use wrapped_data::analysis::compute_stats;
use wrapped_data::detector::Dataset;
use wrapped_data::filter::{custom_range, resolve_preset, DateRange, Preset};

#[derive(Debug, Clone)]
pub struct Session {
    /// Full unfiltered events; `None` for pre-aggregated input.
    retained: Option<Arc<[NormalizedEvent]>>,
    current: Arc<StatsResult>,
    range: DateRange,
    tz: TimezoneHandler,
    year: i32,
}

impl Session {
    /// Build the initial, unfiltered session for a classified batch.
    pub fn from_dataset(dataset: Dataset, tz: TimezoneHandler, year: i32) -> Self {
        match dataset {
            Dataset::Aggregated(stats) => {
                debug!("session from processed stats (year {})", stats.year);
                Self {
                    retained: None,
                    year: stats.year,
                    current: Arc::new(stats),
                    range: DateRange::all_time(),
                    tz,
                }
            }
            Dataset::Raw(records) => {
                let events: Arc<[NormalizedEvent]> =
                    RecordNormalizer::new(tz).normalize_all(&records).into();
                let range = DateRange::all_time();
                let stats = compute_stats(&events, &range, year);
                Self {
                    retained: Some(events),
                    current: Arc::new(stats),
                    range,
                    tz,
                    year,
                }
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn stats(&self) -> &StatsResult {
        &self.current
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn timezone(&self) -> &TimezoneHandler {
        &self.tz
    }

    /// Only raw sessions keep events to re-filter.
    pub fn supports_filtering(&self) -> bool {
        self.retained.is_some()
    }

    /// Number of retained raw events (0 for pre-aggregated input).
    pub fn event_count(&self) -> usize {
        self.retained.as_ref().map_or(0, |events| events.len())
    }

    // ── Filtering ─────────────────────────────────────────────────────────

    /// Recompute the statistics for `range` from the full retained events.
    pub fn apply_range(&self, range: DateRange) -> Result<Session> {
        let Some(events) = &self.retained else {
            return Err(WrappedError::FilterUnavailable);
        };
        let stats = compute_stats(events, &range, self.year);
        Ok(Session {
            retained: Some(Arc::clone(events)),
            current: Arc::new(stats),
            range,
            tz: self.tz,
            year: self.year,
        })
    }

    /// Apply a named preset relative to `now`.
    ///
    /// An unknown name leaves the session unchanged (a warning is logged).
    pub fn apply_preset(&self, name: &str, now: DateTime<Tz>) -> Result<Session> {
        match Preset::parse_lenient(name) {
            Some(preset) => self.apply_range(resolve_preset(preset, now)),
            None => Ok(self.clone()),
        }
    }

    /// Apply an inclusive calendar range in the session's timezone.
    pub fn apply_custom(&self, start: NaiveDate, end: NaiveDate) -> Result<Session> {
        if !self.supports_filtering() {
            return Err(WrappedError::FilterUnavailable);
        }
        let range = custom_range(start, end, &self.tz)?;
        self.apply_range(range)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
