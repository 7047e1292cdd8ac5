//! Ranking of aggregate maps and assembly of the [`StatsResult`] snapshot.

use indexmap::IndexMap;
use wrapped_core::models::{
    EntityAggregate, RankedEntity, StatsResult, MS_PER_HOUR, MS_PER_MINUTE,
};

use crate::aggregator::AggregateSet;

/// Sort aggregates by descending play count.
///
/// The sort is stable, so entities with equal counts keep the order in which
/// their keys were first seen.
pub fn rank(map: IndexMap<String, EntityAggregate>) -> Vec<RankedEntity> {
    let mut ranked: Vec<RankedEntity> = map
        .into_values()
        .map(RankedEntity::from_aggregate)
        .collect();
    ranked.sort_by(|a, b| b.entity.play_count.cmp(&a.entity.play_count));
    ranked
}

/// Turn one aggregation pass into the immutable snapshot.
///
/// Minutes and hours are floored; the millisecond total is kept exact.
pub fn build_stats(set: AggregateSet, year: i32) -> StatsResult {
    let AggregateSet {
        artists,
        songs,
        albums,
        total_playtime_ms,
        event_count,
    } = set;

    StatsResult {
        year,
        total_streams: event_count,
        unique_songs: songs.len() as u64,
        unique_artists: artists.len() as u64,
        unique_albums: albums.len() as u64,
        total_playtime_ms,
        total_minutes: total_playtime_ms / MS_PER_MINUTE,
        total_hours: total_playtime_ms / MS_PER_HOUR,
        top_artists: rank(artists),
        top_songs: rank(songs),
        top_albums: rank(albums),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ListeningAggregator;
    use wrapped_core::models::NormalizedEvent;

    fn play(artist: &str, track: &str, ms: u64) -> NormalizedEvent {
        NormalizedEvent {
            artist_name: artist.to_string(),
            track_name: track.to_string(),
            played_ms: ms,
            ..Default::default()
        }
    }

    fn song_names(ranked: &[RankedEntity]) -> Vec<&str> {
        ranked.iter().map(|r| r.entity.display_name()).collect()
    }

    // ── rank ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_rank_descending_play_count() {
        let events = vec![
            play("X", "A", 1),
            play("X", "B", 1),
            play("X", "B", 1),
            play("X", "C", 1),
            play("X", "C", 1),
            play("X", "C", 1),
        ];
        let set = ListeningAggregator::aggregate(&events);
        assert_eq!(song_names(&rank(set.songs)), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let events = vec![
            play("X", "A", 1),
            play("X", "B", 999_999),
            play("X", "A", 1),
            play("X", "B", 1),
        ];
        let set = ListeningAggregator::aggregate(&events);
        assert_eq!(song_names(&rank(set.songs)), vec!["A", "B"]);
    }

    #[test]
    fn test_rank_derives_floored_minutes() {
        let set = ListeningAggregator::aggregate(&[play("X", "A", 119_999)]);
        let ranked = rank(set.songs);
        assert_eq!(ranked[0].playtime_minutes, 1);
        assert_eq!(ranked[0].entity.playtime_ms, 119_999);
    }

    // ── build_stats ───────────────────────────────────────────────────────────

    #[test]
    fn test_build_stats_totals() {
        let events = vec![
            play("Art A", "Song 1", 180_000),
            play("Art A", "Song 2", 120_000),
            play("Art B", "Song 1", 7_200_000),
        ];
        let stats = build_stats(ListeningAggregator::aggregate(&events), 2024);
        assert_eq!(stats.year, 2024);
        assert_eq!(stats.total_streams, 3);
        assert_eq!(stats.unique_artists, 2);
        assert_eq!(stats.unique_songs, 3);
        assert_eq!(stats.unique_albums, 2);
        assert_eq!(stats.total_playtime_ms, 7_500_000);
        assert_eq!(stats.total_minutes, 125);
        assert_eq!(stats.total_hours, 2);
        assert_eq!(stats.top_artists[0].entity.key, "Art A");
    }

    #[test]
    fn test_build_stats_empty() {
        let stats = build_stats(AggregateSet::default(), 2024);
        assert_eq!(stats.total_streams, 0);
        assert!(stats.top_artists.is_empty());
        assert!(stats.top_songs.is_empty());
        assert!(stats.top_albums.is_empty());
    }
}
