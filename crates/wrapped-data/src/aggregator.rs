//! Per-artist, per-song and per-album aggregation of listening events.
//!
//! Maps preserve the order in which keys were first seen, which the ranker
//! relies on to break play-count ties deterministically.

use indexmap::IndexMap;
use wrapped_core::models::{EntityAggregate, EntityKind, NormalizedEvent};

// ── AggregateSet ──────────────────────────────────────────────────────────────

/// The three keyed maps plus global totals for one pass over the events.
#[derive(Debug, Clone, Default)]
pub struct AggregateSet {
    pub artists: IndexMap<String, EntityAggregate>,
    pub songs: IndexMap<String, EntityAggregate>,
    pub albums: IndexMap<String, EntityAggregate>,
    pub total_playtime_ms: u64,
    pub event_count: u64,
}

impl AggregateSet {
    /// Fold one event into every map and the totals.
    pub fn add_event(&mut self, event: &NormalizedEvent) {
        self.event_count += 1;
        self.total_playtime_ms = self.total_playtime_ms.saturating_add(event.played_ms);

        for kind in EntityKind::ALL {
            let key = kind.key_for(event);
            self.map_mut(kind)
                .entry(key)
                .or_insert_with(|| EntityAggregate::new(kind, event))
                .add_event(kind, event);
        }
    }

    pub fn map(&self, kind: EntityKind) -> &IndexMap<String, EntityAggregate> {
        match kind {
            EntityKind::Artist => &self.artists,
            EntityKind::Song => &self.songs,
            EntityKind::Album => &self.albums,
        }
    }

    fn map_mut(&mut self, kind: EntityKind) -> &mut IndexMap<String, EntityAggregate> {
        match kind {
            EntityKind::Artist => &mut self.artists,
            EntityKind::Song => &mut self.songs,
            EntityKind::Album => &mut self.albums,
        }
    }
}

// ── ListeningAggregator ───────────────────────────────────────────────────────

/// Stateless helper that groups events by entity.
pub struct ListeningAggregator;

impl ListeningAggregator {
    /// Aggregate `events` in iteration order.
    ///
    /// Accepts any iterator of borrowed events so a date filter can be
    /// applied lazily without cloning.
    pub fn aggregate<'a, I>(events: I) -> AggregateSet
    where
        I: IntoIterator<Item = &'a NormalizedEvent>,
    {
        let mut set = AggregateSet::default();
        for event in events {
            set.add_event(event);
        }
        set
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(artist: &str, track: &str, album: &str, ms: u64) -> NormalizedEvent {
        NormalizedEvent {
            artist_name: artist.to_string(),
            track_name: track.to_string(),
            album_name: album.to_string(),
            played_ms: ms,
            ..Default::default()
        }
    }

    fn with_uris(
        mut event: NormalizedEvent,
        track: Option<&str>,
        artist: Option<&str>,
    ) -> NormalizedEvent {
        event.track_uri = track.map(str::to_string);
        event.artist_uri = artist.map(str::to_string);
        event
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_empty() {
        let set = ListeningAggregator::aggregate(&Vec::<NormalizedEvent>::new());
        assert_eq!(set.event_count, 0);
        assert_eq!(set.total_playtime_ms, 0);
        assert!(set.artists.is_empty());
        assert!(set.songs.is_empty());
        assert!(set.albums.is_empty());
    }

    #[test]
    fn test_total_playtime_is_sum_of_events() {
        let events = vec![
            make_event("A", "x", "Al", 120_000),
            make_event("B", "y", "Bl", 180_000),
            make_event("A", "z", "Al", 1),
        ];
        let set = ListeningAggregator::aggregate(&events);
        assert_eq!(set.total_playtime_ms, 300_001);
        assert_eq!(set.event_count, 3);
    }

    #[test]
    fn test_play_counts_sum_to_event_count() {
        let events = vec![
            make_event("A", "x", "Al", 10),
            make_event("B", "y", "Bl", 10),
            make_event("A", "x", "Al", 10),
            make_event("C", "w", "Cl", 10),
        ];
        let set = ListeningAggregator::aggregate(&events);
        for kind in EntityKind::ALL {
            let total: u64 = set.map(kind).values().map(|a| a.play_count).sum();
            assert_eq!(total, set.event_count, "{kind:?}");
        }
        assert_eq!(set.artists["A"].play_count, 2);
        assert_eq!(set.songs["x - A"].playtime_ms, 20);
    }

    #[test]
    fn test_song_keys_include_artist() {
        let events = vec![
            make_event("A", "Intro", "One", 10),
            make_event("B", "Intro", "Two", 10),
        ];
        let set = ListeningAggregator::aggregate(&events);
        assert_eq!(set.songs.len(), 2);
        assert!(set.songs.contains_key("Intro - A"));
        assert!(set.songs.contains_key("Intro - B"));
        assert_eq!(set.songs["Intro - B"].track_name.as_deref(), Some("Intro"));
        assert_eq!(set.albums["Two - B"].album_name.as_deref(), Some("Two"));
    }

    #[test]
    fn test_keys_keep_first_seen_order() {
        let events = vec![
            make_event("Zed", "s", "a", 1),
            make_event("Amy", "s", "a", 1),
            make_event("Zed", "s", "a", 1),
        ];
        let set = ListeningAggregator::aggregate(&events);
        let keys: Vec<&str> = set.artists.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zed", "Amy"]);
    }

    #[test]
    fn test_first_non_null_uri_wins() {
        let events = vec![
            with_uris(make_event("A", "x", "Al", 1), None, None),
            with_uris(
                make_event("A", "x", "Al", 1),
                Some("spotify:track:first"),
                Some("spotify:artist:a1"),
            ),
            with_uris(
                make_event("A", "x", "Al", 1),
                Some("spotify:track:second"),
                Some("spotify:artist:a2"),
            ),
        ];
        let set = ListeningAggregator::aggregate(&events);
        assert_eq!(set.songs["x - A"].uri.as_deref(), Some("spotify:track:first"));
        assert_eq!(set.artists["A"].uri.as_deref(), Some("spotify:artist:a1"));
        assert_eq!(set.albums["Al - A"].uri, None);
    }

    #[test]
    fn test_aggregate_accepts_filtered_iterator() {
        let events = vec![
            make_event("A", "x", "Al", 5),
            make_event("B", "y", "Bl", 7),
        ];
        let set = ListeningAggregator::aggregate(events.iter().filter(|e| e.artist_name == "B"));
        assert_eq!(set.event_count, 1);
        assert_eq!(set.total_playtime_ms, 7);
    }
}
