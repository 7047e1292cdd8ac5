//! Text and JSON rendering of a [`StatsResult`].

use std::fmt::Write as _;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use wrapped_core::formatting::{format_count, format_playtime, spotify_web_url};
use wrapped_core::models::{EntityKind, RankedEntity, StatsResult};

/// Display width of the name column in top lists.
const NAME_WIDTH: usize = 36;

// ── Text report ────────────────────────────────────────────────────────────────

/// Render the human-readable report.
///
/// `range_label` is shown as a "Showing:" line; pass `None` for processed
/// stats input, which cannot be filtered. Each top list is cut to `top`
/// entries.
pub fn render_text(stats: &StatsResult, range_label: Option<&str>, top: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Your {} Wrapped", stats.year);
    if let Some(label) = range_label {
        let _ = writeln!(out, "Showing: {}", label);
    }
    out.push('\n');

    let totals = [
        ("Streams", format_count(stats.total_streams)),
        ("Listening time", format_playtime(stats.total_playtime_ms)),
        ("Minutes", format_count(stats.total_minutes)),
        ("Artists", format_count(stats.unique_artists)),
        ("Songs", format_count(stats.unique_songs)),
        ("Albums", format_count(stats.unique_albums)),
    ];
    for (label, value) in totals {
        let _ = writeln!(out, "  {:<16}{}", label, value);
    }

    for kind in EntityKind::ALL {
        out.push('\n');
        let _ = writeln!(out, "Top {}", kind.plural_label());
        let entries = stats.top(kind);
        if entries.is_empty() {
            let _ = writeln!(out, "  (none)");
            continue;
        }
        for (index, entry) in entries.iter().take(top).enumerate() {
            let _ = writeln!(out, "{}", render_entry(kind, index + 1, entry));
        }
    }

    out
}

fn render_entry(kind: EntityKind, position: usize, entry: &RankedEntity) -> String {
    let entity = &entry.entity;
    let name = match kind {
        EntityKind::Artist => entity.display_name().to_string(),
        EntityKind::Song | EntityKind::Album => match &entity.artist_name {
            Some(artist) => format!("{} · {}", entity.display_name(), artist),
            None => entity.display_name().to_string(),
        },
    };

    let plays = if entity.play_count == 1 {
        "1 play".to_string()
    } else {
        format!("{} plays", format_count(entity.play_count))
    };

    let mut line = format!(
        "  {:>2}. {}  {:>9}  {:>12}",
        position,
        fit_width(&name, NAME_WIDTH),
        format_playtime(entity.playtime_ms),
        plays
    );
    if let Some(url) = entity.uri.as_deref().and_then(spotify_web_url) {
        let _ = write!(line, "  {}", url);
    }
    line
}

/// Pad or truncate `s` to exactly `width` terminal columns.
fn fit_width(s: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(s);
    if current <= width {
        return format!("{}{}", s, " ".repeat(width - current));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── JSON ───────────────────────────────────────────────────────────────────────

/// Pretty JSON in the processed stats shape; valid input for a later run.
pub fn render_json(stats: &StatsResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(stats)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wrapped_core::models::EntityAggregate;

    fn ranked(
        key: &str,
        artist: Option<&str>,
        ms: u64,
        plays: u64,
        uri: Option<&str>,
    ) -> RankedEntity {
        RankedEntity::from_aggregate(EntityAggregate {
            key: key.to_string(),
            track_name: artist.map(|_| key.to_string()),
            album_name: None,
            artist_name: artist.map(str::to_string),
            playtime_ms: ms,
            play_count: plays,
            uri: uri.map(str::to_string),
        })
    }

    fn sample_stats() -> StatsResult {
        StatsResult {
            year: 2024,
            total_streams: 1234,
            unique_songs: 2,
            unique_artists: 1,
            unique_albums: 1,
            total_playtime_ms: 3_900_000,
            total_minutes: 65,
            total_hours: 1,
            top_artists: vec![ranked(
                "Art A",
                None,
                3_900_000,
                1234,
                Some("spotify:artist:abc123"),
            )],
            top_songs: vec![
                ranked("Song 1", Some("Art A"), 180_000, 2, None),
                ranked("Song 2", Some("Art A"), 120_000, 1, None),
            ],
            top_albums: vec![],
        }
    }

    // ── render_text ───────────────────────────────────────────────────────────

    #[test]
    fn test_render_text_totals_and_range() {
        let text = render_text(&sample_stats(), Some("All Time"), 5);
        assert!(text.starts_with("Your 2024 Wrapped\nShowing: All Time\n"));
        assert!(text.contains("1,234"));
        assert!(text.contains("1h 5m"));
        assert!(text.contains("https://open.spotify.com/artist/abc123"));
        assert!(text.contains("Song 1 · Art A"));
        assert!(text.contains("1 play"));
        assert!(text.contains("Top Albums\n  (none)"));
    }

    #[test]
    fn test_render_text_hides_range_for_processed_stats() {
        let text = render_text(&sample_stats(), None, 5);
        assert!(!text.contains("Showing:"));
    }

    #[test]
    fn test_render_text_respects_top() {
        let text = render_text(&sample_stats(), None, 1);
        assert!(text.contains("Song 1"));
        assert!(!text.contains("Song 2"));
    }

    // ── fit_width ─────────────────────────────────────────────────────────────

    #[test]
    fn test_fit_width_pads_and_truncates() {
        assert_eq!(fit_width("abc", 5), "abc  ");
        assert_eq!(fit_width("abcdefgh", 5), "abcd…");
        // Wide CJK characters take two columns each.
        let fitted = fit_width("日本語の曲名", 7);
        assert_eq!(UnicodeWidthStr::width(fitted.as_str()), 7);
        assert!(fitted.ends_with('…'));
    }

    // ── render_json ───────────────────────────────────────────────────────────

    #[test]
    fn test_render_json_uses_processed_stats_keys() {
        let json = render_json(&sample_stats()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_streams"], 1234);
        assert_eq!(value["top_artists"][0]["name"], "Art A");
        assert_eq!(value["top_artists"][0]["spotify_uri"], "spotify:artist:abc123");
        assert_eq!(value["top_artists"][0]["playtime_minutes"], 65);
    }

    #[test]
    fn test_render_json_round_trips_as_stats() {
        let json = render_json(&sample_stats()).unwrap();
        let back: StatsResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample_stats());
    }
}
