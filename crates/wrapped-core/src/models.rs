use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artist name used when no alias carries a value.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Track name used when no alias carries a value.
pub const UNKNOWN_TRACK: &str = "Unknown Track";
/// Album name used when no alias carries a value.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u64 = 60_000;
/// Milliseconds in one hour.
pub const MS_PER_HOUR: u64 = 3_600_000;

/// The three entity kinds statistics are kept for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Artist,
    Song,
    Album,
}

impl EntityKind {
    /// All kinds, in the order the aggregator visits them.
    pub const ALL: [EntityKind; 3] = [EntityKind::Artist, EntityKind::Song, EntityKind::Album];

    /// Aggregation key for `event` under this kind.
    ///
    /// * artist → artist name
    /// * song   → `"<track> - <artist>"`
    /// * album  → `"<album> - <artist>"`
    pub fn key_for(self, event: &NormalizedEvent) -> String {
        match self {
            EntityKind::Artist => event.artist_name.clone(),
            EntityKind::Song => format!("{} - {}", event.track_name, event.artist_name),
            EntityKind::Album => format!("{} - {}", event.album_name, event.artist_name),
        }
    }

    /// The URI of the matching kind carried by `event`, if any.
    pub fn uri_for(self, event: &NormalizedEvent) -> Option<&str> {
        match self {
            EntityKind::Artist => event.artist_uri.as_deref(),
            EntityKind::Song => event.track_uri.as_deref(),
            EntityKind::Album => event.album_uri.as_deref(),
        }
    }

    /// Plural heading used by reports.
    pub fn plural_label(self) -> &'static str {
        match self {
            EntityKind::Artist => "Artists",
            EntityKind::Song => "Songs",
            EntityKind::Album => "Albums",
        }
    }
}

/// A single listening event after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// When the stream ended; `None` when absent or unparseable.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub artist_name: String,
    pub track_name: String,
    pub album_name: String,
    /// Milliseconds actually played.
    #[serde(default)]
    pub played_ms: u64,
    #[serde(default)]
    pub track_uri: Option<String>,
    #[serde(default)]
    pub artist_uri: Option<String>,
    #[serde(default)]
    pub album_uri: Option<String>,
}

impl NormalizedEvent {
    /// Milliseconds since the Unix epoch, when the timestamp parsed.
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.timestamp.map(|ts| ts.timestamp_millis())
    }
}

impl Default for NormalizedEvent {
    fn default() -> Self {
        Self {
            timestamp: None,
            artist_name: UNKNOWN_ARTIST.to_string(),
            track_name: UNKNOWN_TRACK.to_string(),
            album_name: UNKNOWN_ALBUM.to_string(),
            played_ms: 0,
            track_uri: None,
            artist_uri: None,
            album_uri: None,
        }
    }
}

/// Running totals for one artist, song or album.
///
/// Serialised with the field names of a processed stats file
/// (`name`, `playtime_ms`, `play_count`, `spotify_uri`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAggregate {
    /// Unique key within its kind; also the display string in stats files.
    #[serde(rename = "name")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub playtime_ms: u64,
    #[serde(default)]
    pub play_count: u64,
    /// First non-null URI seen for this key. Never overwritten once set.
    #[serde(rename = "spotify_uri", default)]
    pub uri: Option<String>,
}

impl EntityAggregate {
    /// Start an empty aggregate for `event` under `kind`.
    ///
    /// The URI is left unset; [`EntityAggregate::add_event`] fills it.
    pub fn new(kind: EntityKind, event: &NormalizedEvent) -> Self {
        let (track_name, album_name, artist_name) = match kind {
            EntityKind::Artist => (None, None, None),
            EntityKind::Song => (
                Some(event.track_name.clone()),
                None,
                Some(event.artist_name.clone()),
            ),
            EntityKind::Album => (
                None,
                Some(event.album_name.clone()),
                Some(event.artist_name.clone()),
            ),
        };
        Self {
            key: kind.key_for(event),
            track_name,
            album_name,
            artist_name,
            playtime_ms: 0,
            play_count: 0,
            uri: None,
        }
    }

    /// Fold one event into the totals, applying the first-wins URI rule.
    pub fn add_event(&mut self, kind: EntityKind, event: &NormalizedEvent) {
        self.playtime_ms = self.playtime_ms.saturating_add(event.played_ms);
        self.play_count += 1;
        if self.uri.is_none() {
            if let Some(uri) = kind.uri_for(event) {
                self.uri = Some(uri.to_string());
            }
        }
    }

    /// Track or album title for songs/albums, the artist name otherwise.
    pub fn display_name(&self) -> &str {
        self.track_name
            .as_deref()
            .or(self.album_name.as_deref())
            .unwrap_or(&self.key)
    }
}

/// An aggregate plus its derived, minute-rounded playtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntity {
    #[serde(flatten)]
    pub entity: EntityAggregate,
    /// `floor(playtime_ms / 60000)`; the stored milliseconds are never rounded.
    #[serde(default)]
    pub playtime_minutes: u64,
}

impl RankedEntity {
    pub fn from_aggregate(entity: EntityAggregate) -> Self {
        let playtime_minutes = entity.playtime_ms / MS_PER_MINUTE;
        Self {
            entity,
            playtime_minutes,
        }
    }
}

/// Immutable statistics snapshot, the unit the report layer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResult {
    #[serde(default)]
    pub year: i32,
    #[serde(default, alias = "totalStreams")]
    pub total_streams: u64,
    #[serde(default, alias = "uniqueSongs")]
    pub unique_songs: u64,
    #[serde(default, alias = "uniqueArtists")]
    pub unique_artists: u64,
    #[serde(default, alias = "uniqueAlbums")]
    pub unique_albums: u64,
    #[serde(default, alias = "totalPlaytimeMs")]
    pub total_playtime_ms: u64,
    #[serde(default, alias = "totalMinutes")]
    pub total_minutes: u64,
    #[serde(default, alias = "totalHours")]
    pub total_hours: u64,
    #[serde(alias = "topArtists")]
    pub top_artists: Vec<RankedEntity>,
    #[serde(alias = "topSongs")]
    pub top_songs: Vec<RankedEntity>,
    #[serde(alias = "topAlbums")]
    pub top_albums: Vec<RankedEntity>,
}

impl StatsResult {
    /// The ranked list for `kind`.
    pub fn top(&self, kind: EntityKind) -> &[RankedEntity] {
        match kind {
            EntityKind::Artist => &self.top_artists,
            EntityKind::Song => &self.top_songs,
            EntityKind::Album => &self.top_albums,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
