use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::models::{MS_PER_HOUR, MS_PER_MINUTE};

/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use wrapped_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a millisecond playtime as `"Xh Ym"`.
///
/// Both parts are floored; the hours part is never omitted.
///
/// # Examples
///
/// ```
/// use wrapped_core::formatting::format_playtime;
///
/// assert_eq!(format_playtime(0), "0h 0m");
/// assert_eq!(format_playtime(180_000), "0h 3m");
/// assert_eq!(format_playtime(5_459_999), "1h 30m");
/// ```
pub fn format_playtime(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    format!("{}h {}m", hours, minutes)
}

/// Format a calendar date as `DD/MM/YYYY`.
pub fn format_date_european(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

/// Convert a `spotify:<kind>:<id>` URI into its `open.spotify.com` web URL.
///
/// Returns `None` for anything that is not a well-formed Spotify URI.
///
/// # Examples
///
/// ```
/// use wrapped_core::formatting::spotify_web_url;
///
/// assert_eq!(
///     spotify_web_url("spotify:track:4uLU6hMCjMI75M1A2tKUQC").as_deref(),
///     Some("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"),
/// );
/// assert_eq!(spotify_web_url("not a uri"), None);
/// ```
pub fn spotify_web_url(uri: &str) -> Option<String> {
    static URI_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = URI_RE
        .get_or_init(|| Regex::new(r"^spotify:([a-z]+):([A-Za-z0-9]+)$").ok())
        .as_ref()?;

    let caps = re.captures(uri.trim())?;
    Some(format!("https://open.spotify.com/{}/{}", &caps[1], &caps[2]))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
