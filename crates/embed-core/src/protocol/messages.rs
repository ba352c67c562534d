//! Message types for the cross-window embed protocol.
//!
//! Every message exchanged between the host page and the embedded player
//! surface is a JSON object with exactly three mandatory keys:
//!
//! ```json
//! {"namespace":"twitch-embed","eventName":"UpdateState","params":{"volume":0.5}}
//! ```
//!
//! # Why a namespace?
//!
//! The page-wide message channel is shared with any other script on the page.
//! The namespace string is the only thing that separates this protocol's
//! traffic from everyone else's, so every receiver drops messages whose
//! `namespace` is not exactly [`NAMESPACE`].
//!
//! # Directions
//!
//! ```text
//! Host    → Surface:  commands       (PlayerCommand names, fire-and-forget)
//! Surface → Host:     UpdateState    (partial snapshot to merge)
//!                     domain events  (EmbedEvent names and any others, opaque)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The reserved protocol namespace carried by every message.
pub const NAMESPACE: &str = "twitch-embed";

/// Event name reserved for state-snapshot updates sent by the surface.
pub const UPDATE_STATE: &str = "UpdateState";

/// Target-origin wildcard used when posting commands into the surface.
///
/// The embedded surface validates the sender on its side.
pub const ANY_ORIGIN: &str = "*";

// ── Wire message ──────────────────────────────────────────────────────────────

/// One structured message as it travels across the window boundary.
///
/// # Serde representation
///
/// Field names are camelCase on the wire (`eventName`), matching what the
/// embedded surface expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    /// Protocol namespace; must equal [`NAMESPACE`] to be accepted.
    pub namespace: String,
    /// Command name (host → surface) or event name (surface → host).
    pub event_name: String,
    /// Arbitrary JSON payload.  `null` for commands without arguments.
    pub params: Value,
}

impl WireMessage {
    /// Builds a message in this protocol's namespace.
    pub fn new(event_name: impl Into<String>, params: Value) -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            event_name: event_name.into(),
            params,
        }
    }

    /// Builds the message for a player command.
    pub fn command(command: PlayerCommand, params: Value) -> Self {
        Self::new(command.as_str(), params)
    }

    /// `true` if this message carries a partial state snapshot.
    pub fn is_state_update(&self) -> bool {
        self.event_name == UPDATE_STATE
    }
}

// ── Host → Surface commands ───────────────────────────────────────────────────

/// Commands the host can post into the embedded player.
///
/// Commands are never acknowledged.  The host observes their effect only
/// through later `UpdateState` messages or domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerCommand {
    DisableCaptions,
    EnableCaptions,
    Pause,
    Play,
    /// Params: playback position in seconds.
    Seek,
    /// Params: channel login name.
    SetChannel,
    /// Params: numeric channel id as a string.
    SetChannelId,
    /// Params: `[collectionId, videoId]`.
    SetCollection,
    /// Params: quality group name.
    SetQuality,
    /// Params: video id.
    SetVideo,
    /// Params: boolean.
    SetMuted,
    /// Params: volume between 0.0 and 1.0.
    SetVolume,
}

impl PlayerCommand {
    /// Every command, in declaration order.
    pub const ALL: [PlayerCommand; 12] = [
        PlayerCommand::DisableCaptions,
        PlayerCommand::EnableCaptions,
        PlayerCommand::Pause,
        PlayerCommand::Play,
        PlayerCommand::Seek,
        PlayerCommand::SetChannel,
        PlayerCommand::SetChannelId,
        PlayerCommand::SetCollection,
        PlayerCommand::SetQuality,
        PlayerCommand::SetVideo,
        PlayerCommand::SetMuted,
        PlayerCommand::SetVolume,
    ];

    /// The `eventName` used on the wire for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerCommand::DisableCaptions => "DisableCaptions",
            PlayerCommand::EnableCaptions => "EnableCaptions",
            PlayerCommand::Pause => "Pause",
            PlayerCommand::Play => "Play",
            PlayerCommand::Seek => "Seek",
            PlayerCommand::SetChannel => "SetChannel",
            PlayerCommand::SetChannelId => "SetChannelID",
            PlayerCommand::SetCollection => "SetCollection",
            PlayerCommand::SetQuality => "SetQuality",
            PlayerCommand::SetVideo => "SetVideo",
            PlayerCommand::SetMuted => "SetMuted",
            PlayerCommand::SetVolume => "SetVolume",
        }
    }

    /// Looks a command up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Surface → Host domain events ──────────────────────────────────────────────

/// Well-known domain events the embedded player emits.
///
/// The list is informational: the host republishes *every* event name it
/// receives, known or not.  These constants exist so host code can subscribe
/// without spelling the wire names by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedEvent {
    Authenticate,
    Captions,
    Ended,
    Error,
    Offline,
    Online,
    Pause,
    Play,
    PlaybackBlocked,
    Playing,
    VideoPause,
    VideoPlay,
    VideoReady,
    Ready,
}

impl EmbedEvent {
    pub const ALL: [EmbedEvent; 14] = [
        EmbedEvent::Authenticate,
        EmbedEvent::Captions,
        EmbedEvent::Ended,
        EmbedEvent::Error,
        EmbedEvent::Offline,
        EmbedEvent::Online,
        EmbedEvent::Pause,
        EmbedEvent::Play,
        EmbedEvent::PlaybackBlocked,
        EmbedEvent::Playing,
        EmbedEvent::VideoPause,
        EmbedEvent::VideoPlay,
        EmbedEvent::VideoReady,
        EmbedEvent::Ready,
    ];

    /// The `eventName` the surface uses for this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedEvent::Authenticate => "authenticate",
            EmbedEvent::Captions => "captions",
            EmbedEvent::Ended => "ended",
            EmbedEvent::Error => "error",
            EmbedEvent::Offline => "offline",
            EmbedEvent::Online => "online",
            EmbedEvent::Pause => "pause",
            EmbedEvent::Play => "play",
            EmbedEvent::PlaybackBlocked => "playbackBlocked",
            EmbedEvent::Playing => "playing",
            EmbedEvent::VideoPause => "video.pause",
            EmbedEvent::VideoPlay => "video.play",
            EmbedEvent::VideoReady => "video.ready",
            EmbedEvent::Ready => "ready",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for EmbedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmbedEvent> for String {
    fn from(event: EmbedEvent) -> Self {
        event.as_str().to_string()
    }
}

// ── Error codes ───────────────────────────────────────────────────────────────

/// Media error codes carried in the params of an `error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    FormatNotSupported = 4,
    ContentNotAvailable = 5,
    RendererNotAvailable = 6,
}

impl MediaErrorCode {
    /// Maps a numeric code from the wire; unknown codes yield `None`.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Aborted),
            2 => Some(Self::Network),
            3 => Some(Self::Decode),
            4 => Some(Self::FormatNotSupported),
            5 => Some(Self::ContentNotAvailable),
            6 => Some(Self::RendererNotAvailable),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
