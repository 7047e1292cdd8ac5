use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{Result, WrappedError};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured timezone name, expanding `"auto"` to the system zone.
///
/// Unknown names are a configuration error rather than a silent UTC
/// fallback.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    let name = if name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    };
    name.parse::<Tz>()
        .map_err(|_| WrappedError::Config(format!("unknown timezone {}", name)))
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// ISO-8601 shapes with an explicit zone that RFC 3339 parsing rejects:
/// minute precision (`2024-01-01T00:00Z`) and basic offsets (`+0100`).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Naive formats interpreted as wall-clock time in the handler's zone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Timezone-aware timestamp parsing and local calendar arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler whose default zone is `tz`.
    pub fn from_tz(tz: Tz) -> Self {
        Self { default_tz: tz }
    }

    /// Parse a timestamp string into a UTC [`DateTime`].
    ///
    /// * RFC 3339 / RFC 2822 strings keep their explicit offset, as do other
    ///   ISO-8601 shapes carrying a zone (`2024-01-01T00:00Z`,
    ///   `2024-01-01T00:00:00+0100`).
    /// * Date-only strings (`2024-01-15`) are midnight UTC.
    /// * Naive date-times (`2024-01-15 10:30`) are local time in the default
    ///   zone, which is how the older export variant writes `endTime`.
    ///
    /// Returns `None` for empty strings or unrecognised formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(self.resolve_local(naive));
            }
        }

        debug!("TimezoneHandler: could not parse timestamp \"{}\"", s);
        None
    }

    /// Current instant in the default zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.default_tz)
    }

    /// Local midnight at the start of `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve_local(date.and_time(NaiveTime::MIN))
    }

    /// Local `23:59:59` on `date`, the inclusive end used by day ranges.
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.resolve_local(date.and_time(last_second))
    }

    /// Map a wall-clock time in the default zone to a UTC instant.
    ///
    /// Ambiguous times (DST fall-back) take the earlier instant; times inside
    /// a DST gap move forward to the first valid wall-clock hour.
    pub fn resolve_local(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        let mut candidate = naive;
        for _ in 0..=24 {
            match self.default_tz.from_local_datetime(&candidate) {
                LocalResult::Single(dt) => return dt.with_timezone(&Utc),
                LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
                LocalResult::None => candidate += Duration::hours(1),
            }
        }
        Utc.from_utc_datetime(&naive)
    }

    /// Convert a UTC [`DateTime`] into the default zone.
    pub fn to_local(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.default_tz)
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self::from_tz(Tz::UTC)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
