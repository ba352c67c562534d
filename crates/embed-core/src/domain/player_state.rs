//! Cached mirror of the embedded player's reported state.
//!
//! The embedded surface periodically posts `UpdateState` messages whose params
//! are a *partial* snapshot: only the fields that changed.  [`PlayerState`]
//! folds those partial payloads into a full picture with a shallow merge:
//!
//! ```text
//! previous:  {"muted": true, "volume": 0.5}
//! update:    {"volume": 0.8}
//! merged:    {"muted": true, "volume": 0.8}
//! ```
//!
//! Fields absent from an update keep their previous value; nothing is ever
//! reset by omission.  Nested objects (such as `stats`) are replaced as a
//! whole, not merged recursively.
//!
//! # Immutability
//!
//! A `PlayerState` is never mutated in place.  [`PlayerState::merged`] returns
//! a new value, and the owner swaps an `Arc<PlayerState>` wholesale, so a
//! reader holding the old `Arc` always sees a complete, consistent snapshot.
//!
//! # Typed views
//!
//! Storage stays an untyped JSON map so unknown fields the surface sends are
//! kept verbatim.  The accessor methods interpret the well-known fields and
//! fall back to a neutral value when a field is missing or has the wrong type.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Wire names of the well-known snapshot fields.
pub mod fields {
    pub const CHANNEL_NAME: &str = "channelName";
    pub const CHANNEL_ID: &str = "channelID";
    pub const COLLECTION_ID: &str = "collectionID";
    pub const VIDEO_ID: &str = "videoID";
    pub const CURRENT_TIME: &str = "currentTime";
    pub const DURATION: &str = "duration";
    pub const ENDED: &str = "ended";
    pub const MUTED: &str = "muted";
    pub const VOLUME: &str = "volume";
    pub const QUALITY: &str = "quality";
    pub const QUALITIES_AVAILABLE: &str = "qualitiesAvailable";
    pub const PLAYBACK: &str = "playback";
    pub const STATS: &str = "stats";
    pub const VIDEO_STATS: &str = "videoStats";
}

// ── Playback phase ────────────────────────────────────────────────────────────

/// Playback phase reported in the `playback` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Ready,
    Buffering,
    Playing,
    Ended,
    /// Anything else, including the empty string before the first update.
    Other(String),
}

impl PlaybackPhase {
    /// Wire value of the idle phase.  `isPaused` is defined against it.
    pub const IDLE: &'static str = "Idle";

    pub fn from_wire(value: &str) -> Self {
        match value {
            "Idle" => Self::Idle,
            "Ready" => Self::Ready,
            "Buffering" => Self::Buffering,
            "Playing" => Self::Playing,
            "Ended" => Self::Ended,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => Self::IDLE,
            Self::Ready => "Ready",
            Self::Buffering => "Buffering",
            Self::Playing => "Playing",
            Self::Ended => "Ended",
            Self::Other(value) => value,
        }
    }
}

// ── Typed sub-records ─────────────────────────────────────────────────────────

/// One entry of `qualitiesAvailable`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quality {
    /// Human-readable label, e.g. `"720p60"`.
    pub name: String,
    /// Group identifier passed back to `SetQuality`, e.g. `"720p60"` or `"chunked"`.
    pub group: String,
    pub codecs: String,
    pub bitrate: u64,
    pub width: u32,
    pub height: u32,
    pub framerate: f64,
    pub is_default: bool,
}

/// Playback statistics reported under `stats.videoStats`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoStats {
    pub backend_version: Option<String>,
    pub buffer_size: Option<f64>,
    pub codecs: Option<String>,
    pub display_resolution: Option<String>,
    pub fps: Option<f64>,
    pub hls_latency_broadcaster: Option<f64>,
    pub playback_rate: Option<f64>,
    pub skipped_frames: Option<u64>,
    pub video_resolution: Option<String>,
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Immutable snapshot of the remote player's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerState {
    fields: Map<String, Value>,
}

impl Default for PlayerState {
    /// The snapshot a channel starts with before any update arrives.
    ///
    /// The playback phase starts empty (unknown), so `is_paused` is `false`
    /// until the surface reports a phase.
    fn default() -> Self {
        let initial = [
            (fields::CHANNEL_NAME, json!("")),
            (fields::CHANNEL_ID, json!("")),
            (fields::COLLECTION_ID, json!("")),
            (fields::VIDEO_ID, json!("")),
            (fields::CURRENT_TIME, json!(0.0)),
            (fields::DURATION, json!(0.0)),
            (fields::ENDED, json!(false)),
            (fields::MUTED, json!(false)),
            (fields::VOLUME, json!(0.0)),
            (fields::QUALITY, json!("")),
            (fields::QUALITIES_AVAILABLE, json!([])),
            (fields::PLAYBACK, json!("")),
            (fields::STATS, json!({ "videoStats": {} })),
        ];
        Self {
            fields: initial
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }
}

impl PlayerState {
    /// A snapshot with no fields at all.
    pub fn empty() -> Self {
        Self { fields: Map::new() }
    }

    /// Builds a snapshot from an arbitrary field map.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Returns a new snapshot with `update`'s top-level fields laid over this one.
    ///
    /// Non-object updates carry no fields and leave the snapshot unchanged.
    pub fn merged(&self, update: &Value) -> PlayerState {
        let mut fields = self.fields.clone();
        if let Value::Object(patch) = update {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
        }
        Self { fields }
    }

    /// Raw access to any field, including ones without a typed accessor.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn str_field(&self, field: &str) -> String {
        self.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn f64_field(&self, field: &str) -> f64 {
        self.get(field).and_then(Value::as_f64).unwrap_or(0.0)
    }

    fn bool_field(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn channel_name(&self) -> String {
        self.str_field(fields::CHANNEL_NAME)
    }

    pub fn channel_id(&self) -> String {
        self.str_field(fields::CHANNEL_ID)
    }

    pub fn collection_id(&self) -> String {
        self.str_field(fields::COLLECTION_ID)
    }

    pub fn video_id(&self) -> String {
        self.str_field(fields::VIDEO_ID)
    }

    /// Playback position in seconds.
    pub fn current_time(&self) -> f64 {
        self.f64_field(fields::CURRENT_TIME)
    }

    /// Content duration in seconds; `0.0` for live streams.
    pub fn duration(&self) -> f64 {
        self.f64_field(fields::DURATION)
    }

    pub fn ended(&self) -> bool {
        self.bool_field(fields::ENDED)
    }

    pub fn muted(&self) -> bool {
        self.bool_field(fields::MUTED)
    }

    pub fn volume(&self) -> f64 {
        self.f64_field(fields::VOLUME)
    }

    pub fn quality(&self) -> String {
        self.str_field(fields::QUALITY)
    }

    /// Available qualities; entries that do not parse are skipped.
    pub fn qualities(&self) -> Vec<Quality> {
        self.get(fields::QUALITIES_AVAILABLE)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn playback(&self) -> PlaybackPhase {
        PlaybackPhase::from_wire(
            self.get(fields::PLAYBACK)
                .and_then(Value::as_str)
                .unwrap_or_default(),
        )
    }

    /// `true` iff the cached playback phase is exactly `Idle`.
    pub fn is_paused(&self) -> bool {
        self.get(fields::PLAYBACK).and_then(Value::as_str) == Some(PlaybackPhase::IDLE)
    }

    /// The `stats.videoStats` record, if present and well-formed.
    pub fn playback_stats(&self) -> Option<VideoStats> {
        let stats = self.get(fields::STATS)?.get(fields::VIDEO_STATS)?;
        serde_json::from_value(stats.clone()).ok()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_has_neutral_values() {
        let state = PlayerState::default();
        assert_eq!(state.channel_name(), "");
        assert_eq!(state.volume(), 0.0);
        assert!(!state.muted());
        assert!(!state.ended());
        assert!(state.qualities().is_empty());
        assert_eq!(state.playback(), PlaybackPhase::Other(String::new()));
        assert!(!state.is_paused());
        assert_eq!(state.playback_stats(), Some(VideoStats::default()));
    }

    #[test]
    fn test_merge_adds_disjoint_fields() {
        // Arrange
        let state = PlayerState::empty();

        // Act
        let state = state.merged(&json!({"a": 1})).merged(&json!({"b": 2}));

        // Assert
        assert_eq!(Value::Object(state.fields().clone()), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_merge_overwrites_same_field() {
        let state = PlayerState::empty()
            .merged(&json!({"a": 1}))
            .merged(&json!({"a": 2}));
        assert_eq!(Value::Object(state.fields().clone()), json!({"a": 2}));
    }

    #[test]
    fn test_merge_with_empty_update_changes_nothing() {
        let before = PlayerState::default().merged(&json!({"muted": true}));
        let after = before.merged(&json!({}));
        assert_eq!(before, after);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let update = json!({"volume": 0.3, "quality": "480p30"});
        let once = PlayerState::default().merged(&update);
        let twice = once.merged(&update);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_ignores_non_object_update() {
        let before = PlayerState::default();
        assert_eq!(before.merged(&json!([1, 2, 3])), before);
        assert_eq!(before.merged(&Value::Null), before);
    }

    #[test]
    fn test_merge_is_shallow_for_nested_objects() {
        let state = PlayerState::empty()
            .merged(&json!({"stats": {"videoStats": {"fps": 60.0}, "other": 1}}))
            .merged(&json!({"stats": {"videoStats": {"fps": 30.0}}}));
        assert_eq!(state.get("stats"), Some(&json!({"videoStats": {"fps": 30.0}})));
    }

    #[test]
    fn test_merge_does_not_touch_original_snapshot() {
        let original = PlayerState::default();
        let _updated = original.merged(&json!({"muted": true}));
        assert!(!original.muted());
    }

    #[test]
    fn test_is_paused_only_for_idle() {
        let idle = PlayerState::default().merged(&json!({"playback": "Idle"}));
        let playing = idle.merged(&json!({"playback": "Playing"}));
        let lowercase = idle.merged(&json!({"playback": "idle"}));

        assert!(idle.is_paused());
        assert!(!playing.is_paused());
        assert!(!lowercase.is_paused());
        assert_eq!(playing.playback(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_typed_getters_fall_back_on_wrong_types() {
        let state = PlayerState::default().merged(&json!({"muted": "yes", "volume": "loud"}));
        assert!(!state.muted());
        assert_eq!(state.volume(), 0.0);
    }

    #[test]
    fn test_qualities_parse_and_skip_malformed_entries() {
        let state = PlayerState::default().merged(&json!({
            "qualitiesAvailable": [
                {"name": "1080p60", "group": "chunked", "bitrate": 6000000, "width": 1920, "height": 1080, "framerate": 60.0, "isDefault": true},
                "garbage",
                {"name": "160p30", "group": "160p30"}
            ]
        }));

        let qualities = state.qualities();

        assert_eq!(qualities.len(), 2);
        assert_eq!(qualities[0].group, "chunked");
        assert!(qualities[0].is_default);
        assert_eq!(qualities[1].name, "160p30");
        assert_eq!(qualities[1].bitrate, 0);
    }

    #[test]
    fn test_playback_stats_reads_video_stats() {
        let state = PlayerState::default().merged(&json!({
            "stats": {"videoStats": {"fps": 59.94, "videoResolution": "1920x1080", "skippedFrames": 3}}
        }));

        let stats = state.playback_stats().unwrap();

        assert_eq!(stats.fps, Some(59.94));
        assert_eq!(stats.video_resolution.as_deref(), Some("1920x1080"));
        assert_eq!(stats.skipped_frames, Some(3));
        assert_eq!(stats.codecs, None);
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let state = PlayerState::default().merged(&json!({"latencyMode": "low"}));
        assert_eq!(state.get("latencyMode"), Some(&json!("low")));
    }
}
