//! Statistics pipeline: filter → aggregate → rank.
//!
//! Always recomputes from the full event list, so any filter can be
//! replaced by another (or removed) without loss of fidelity.

use std::time::Instant;

use tracing::debug;
use wrapped_core::models::{NormalizedEvent, StatsResult};

use crate::aggregator::ListeningAggregator;
use crate::filter::DateRange;
use crate::ranker::build_stats;

/// Compute the snapshot for the events inside `range`.
///
/// Events are borrowed through the filter, never copied.
pub fn compute_stats(events: &[NormalizedEvent], range: &DateRange, year: i32) -> StatsResult {
    let started = Instant::now();

    let set = ListeningAggregator::aggregate(events.iter().filter(|e| range.contains(e)));
    let in_scope = set.event_count;
    let stats = build_stats(set, year);

    debug!(
        events = events.len(),
        in_scope,
        artists = stats.unique_artists,
        songs = stats.unique_songs,
        albums = stats.unique_albums,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "computed listening stats"
    );
    stats
}

// ── Tests ─────────────────────────────────────────────────────────────────────
