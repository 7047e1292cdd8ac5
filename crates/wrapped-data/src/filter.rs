//! Date-window filtering of normalised events.
//!
//! Bounds are inclusive instants. Named presets and custom calendar ranges
//! are resolved at local-calendar granularity in the configured timezone.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::warn;
use wrapped_core::error::{Result, WrappedError};
use wrapped_core::formatting::format_date_european;
use wrapped_core::models::NormalizedEvent;
use wrapped_core::time_utils::TimezoneHandler;

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Optional inclusive start/end bounds. Both `None` means "all time".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `event` is in scope.
    ///
    /// With no bounds every event passes, dated or not. With any bound an
    /// event whose timestamp did not parse is excluded.
    pub fn contains(&self, event: &NormalizedEvent) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(ts) = event.timestamp else {
            return false;
        };
        if self.start.is_some_and(|start| ts < start) {
            return false;
        }
        if self.end.is_some_and(|end| ts > end) {
            return false;
        }
        true
    }

    /// Human-readable span, e.g. `"All Time"` or `"01/03/2024 - 31/12/2024"`.
    pub fn describe(&self, tz: &TimezoneHandler) -> String {
        if self.is_unbounded() {
            return "All Time".to_string();
        }
        let render = |bound: Option<DateTime<Utc>>| {
            bound
                .map(|dt| format_date_european(tz.to_local(dt).date_naive()))
                .unwrap_or_else(|| "…".to_string())
        };
        format!("{} - {}", render(self.start), render(self.end))
    }
}

/// Keep the events inside `range`, preserving order.
///
/// An unbounded range returns the input unchanged without looking at any
/// timestamp.
pub fn filter_events(events: &[NormalizedEvent], range: &DateRange) -> Vec<NormalizedEvent> {
    if range.is_unbounded() {
        return events.to_vec();
    }
    events.iter().filter(|e| range.contains(e)).cloned().collect()
}

// ── Presets ───────────────────────────────────────────────────────────────────

/// Named date shortcuts relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    AllTime,
}

impl Preset {
    pub const ALL: [Preset; 9] = [
        Preset::Today,
        Preset::Yesterday,
        Preset::Last7Days,
        Preset::Last30Days,
        Preset::ThisMonth,
        Preset::LastMonth,
        Preset::ThisYear,
        Preset::LastYear,
        Preset::AllTime,
    ];

    /// Canonical operation name (`last7days`, `thisMonth`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Preset::Today => "today",
            Preset::Yesterday => "yesterday",
            Preset::Last7Days => "last7days",
            Preset::Last30Days => "last30days",
            Preset::ThisMonth => "thisMonth",
            Preset::LastMonth => "lastMonth",
            Preset::ThisYear => "thisYear",
            Preset::LastYear => "lastYear",
            Preset::AllTime => "allTime",
        }
    }

    /// Look a preset up by name.
    ///
    /// Case, `-` and `_` are ignored, so `thisMonth`, `this-month` and
    /// `THIS_MONTH` are the same preset.
    pub fn from_name(name: &str) -> Option<Preset> {
        let folded: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        Preset::ALL
            .into_iter()
            .find(|p| p.name().to_lowercase() == folded)
    }

    /// Like [`Preset::from_name`] but logs unknown names.
    ///
    /// Unknown presets are a tolerated no-op for callers, so the warning is
    /// the only trace a mistyped name leaves.
    pub fn parse_lenient(name: &str) -> Option<Preset> {
        let preset = Self::from_name(name);
        if preset.is_none() {
            warn!(preset = name, "unknown date preset; keeping current range");
        }
        preset
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve `preset` to concrete bounds relative to `now`.
///
/// Day boundaries are local midnight / `23:59:59` in `now`'s timezone.
/// Rolling presets (`last7days`, `thisMonth`, ...) end at `now` itself.
pub fn resolve_preset(preset: Preset, now: DateTime<Tz>) -> DateRange {
    let tz = TimezoneHandler::from_tz(now.timezone());
    let today = now.date_naive();
    let now_utc = now.with_timezone(&Utc);

    let (start, end) = match preset {
        Preset::Today => (tz.start_of_day(today), tz.end_of_day(today)),
        Preset::Yesterday => {
            let yesterday = days_before(today, 1);
            (tz.start_of_day(yesterday), tz.end_of_day(yesterday))
        }
        Preset::Last7Days => (tz.start_of_day(days_before(today, 7)), now_utc),
        Preset::Last30Days => (tz.start_of_day(days_before(today, 30)), now_utc),
        Preset::ThisMonth => (tz.start_of_day(first_of_month(today)), now_utc),
        Preset::LastMonth => {
            let last_of_previous = days_before(first_of_month(today), 1);
            (
                tz.start_of_day(first_of_month(last_of_previous)),
                tz.end_of_day(last_of_previous),
            )
        }
        Preset::ThisYear => (tz.start_of_day(first_of_year(today.year(), today)), now_utc),
        Preset::LastYear => {
            let year = today.year() - 1;
            let dec_31 = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today);
            (
                tz.start_of_day(first_of_year(year, today)),
                tz.end_of_day(dec_31),
            )
        }
        Preset::AllTime => return DateRange::all_time(),
    };

    DateRange::new(Some(start), Some(end))
}

// ── Custom ranges ─────────────────────────────────────────────────────────────

/// Build a range from two calendar dates.
///
/// `start` begins at local midnight, `end` is extended to local `23:59:59`.
/// Fails with [`WrappedError::Range`] when start lies after end.
pub fn custom_range(start: NaiveDate, end: NaiveDate, tz: &TimezoneHandler) -> Result<DateRange> {
    let start_at = tz.start_of_day(start);
    let end_at = tz.end_of_day(end);
    if start_at > end_at {
        return Err(WrappedError::Range {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(DateRange::new(Some(start_at), Some(end_at)))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| WrappedError::InvalidDate(s.to_string()))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_year(year: i32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(fallback)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
