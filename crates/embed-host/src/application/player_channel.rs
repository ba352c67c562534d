//! Remote control channel for one embedded player.
//!
//! [`PlayerChannel`] sends typed commands into the bound surface and keeps a
//! locally cached [`PlayerState`] that the surface refreshes with
//! `UpdateState` messages.  Getters read the cache, so they never wait on the
//! surface; their answers are as fresh as the last update received.
//!
//! # Data flow
//!
//! ```text
//! set_volume(0.5) ──► post {eventName:"SetVolume", params:0.5, namespace} ──► surface
//!
//! surface ──► {eventName:"UpdateState", params:{volume:0.5}} ──► merge ──► volume() == 0.5
//! ```
//!
//! Commands issued before a surface is bound are dropped with a warning.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use embed_core::domain::{Quality, VideoStats};
use embed_core::protocol::{encode_command, PlayerCommand, ANY_ORIGIN};
use embed_core::PlayerState;
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use crate::application::message_filter::accept;
use crate::infrastructure::page_channel::{
    InboundMessage, MessageChannel, MessageHandler, Subscription, WindowId,
};

type SharedState = Arc<RwLock<Arc<PlayerState>>>;
type SharedSurface = Arc<RwLock<Option<WindowId>>>;

/// Sends commands to, and caches the reported state of, one remote player.
pub struct PlayerChannel {
    page: Arc<dyn MessageChannel>,
    surface: SharedSurface,
    state: SharedState,
    subscription: Mutex<Option<Subscription>>,
}

impl PlayerChannel {
    /// Creates an unbound channel with the default snapshot and starts
    /// listening for state updates on `page`.
    pub fn new(page: Arc<dyn MessageChannel>) -> Self {
        let surface: SharedSurface = Arc::new(RwLock::new(None));
        let state: SharedState = Arc::new(RwLock::new(Arc::new(PlayerState::default())));

        let handler: MessageHandler = {
            let surface = Arc::clone(&surface);
            let state = Arc::clone(&state);
            Arc::new(move |inbound: &InboundMessage| {
                let bound = *read(&surface);
                let Some(message) = accept(bound, inbound) else {
                    return;
                };
                if message.is_state_update() {
                    let mut current = write(&state);
                    let merged = current.merged(&message.params);
                    *current = Arc::new(merged);
                    trace!("merged state update");
                }
            })
        };
        let subscription = Subscription::register(Arc::clone(&page), handler);

        Self {
            page,
            surface,
            state,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    // ── Binding ───────────────────────────────────────────────────────────────

    /// Sets or clears the window commands are posted to and updates are
    /// accepted from.
    pub fn bind_surface(&self, window: Option<WindowId>) {
        debug!(surface = ?window, "binding surface");
        *write(&self.surface) = window;
    }

    pub fn surface(&self) -> Option<WindowId> {
        *read(&self.surface)
    }

    /// Stops listening for state updates.  The cached snapshot stays readable.
    pub fn close(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut subscription) = subscription {
            subscription.cancel();
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Posts `command` to the bound surface.  Returns `false`, after logging a
    /// warning, if no surface is bound.
    pub fn send_command(&self, command: PlayerCommand, params: Value) -> bool {
        let Some(target) = self.surface() else {
            warn!(
                %command,
                "Cannot send player commands before the video player is initialized. \
                 Please wait for the video.ready event before using the player API."
            );
            return false;
        };
        self.page
            .post_message(target, encode_command(command, params), ANY_ORIGIN);
        true
    }

    pub fn disable_captions(&self) {
        self.send_command(PlayerCommand::DisableCaptions, Value::Null);
    }

    pub fn enable_captions(&self) {
        self.send_command(PlayerCommand::EnableCaptions, Value::Null);
    }

    pub fn pause(&self) {
        self.send_command(PlayerCommand::Pause, Value::Null);
    }

    pub fn play(&self) {
        self.send_command(PlayerCommand::Play, Value::Null);
    }

    /// Seeks to `timestamp` seconds.
    pub fn seek(&self, timestamp: f64) {
        self.send_command(PlayerCommand::Seek, json!(timestamp));
    }

    pub fn set_channel(&self, channel: &str) {
        self.send_command(PlayerCommand::SetChannel, json!(channel));
    }

    pub fn set_channel_id(&self, channel_id: &str) {
        self.send_command(PlayerCommand::SetChannelId, json!(channel_id));
    }

    /// Switches to a collection, optionally starting at `video_id`.  The
    /// params are the ordered pair `[collectionId, videoId]`.
    pub fn set_collection(&self, collection_id: &str, video_id: Option<&str>) {
        self.send_command(PlayerCommand::SetCollection, json!([collection_id, video_id]));
    }

    pub fn set_quality(&self, quality: &str) {
        self.send_command(PlayerCommand::SetQuality, json!(quality));
    }

    pub fn set_video(&self, video_id: &str) {
        self.send_command(PlayerCommand::SetVideo, json!(video_id));
    }

    pub fn set_muted(&self, muted: bool) {
        self.send_command(PlayerCommand::SetMuted, Value::Bool(muted));
    }

    /// Like [`set_muted`](Self::set_muted) for untyped input: anything other
    /// than a JSON boolean is sent as `false`.
    pub fn set_muted_value(&self, muted: &Value) {
        self.set_muted(muted.as_bool().unwrap_or(false));
    }

    /// Sets the volume, between 0.0 and 1.0.
    pub fn set_volume(&self, volume: f64) {
        self.send_command(PlayerCommand::SetVolume, json!(volume));
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// The current snapshot.  Later updates replace the cache without
    /// touching snapshots already handed out.
    pub fn player_state(&self) -> Arc<PlayerState> {
        Arc::clone(&read(&self.state))
    }

    pub fn muted(&self) -> bool {
        self.player_state().muted()
    }

    pub fn volume(&self) -> f64 {
        self.player_state().volume()
    }

    pub fn channel(&self) -> String {
        self.player_state().channel_name()
    }

    pub fn channel_id(&self) -> String {
        self.player_state().channel_id()
    }

    pub fn collection(&self) -> String {
        self.player_state().collection_id()
    }

    pub fn video(&self) -> String {
        self.player_state().video_id()
    }

    pub fn current_time(&self) -> f64 {
        self.player_state().current_time()
    }

    pub fn duration(&self) -> f64 {
        self.player_state().duration()
    }

    pub fn ended(&self) -> bool {
        self.player_state().ended()
    }

    pub fn quality(&self) -> String {
        self.player_state().quality()
    }

    pub fn qualities(&self) -> Vec<Quality> {
        self.player_state().qualities()
    }

    pub fn playback_stats(&self) -> Option<VideoStats> {
        self.player_state().playback_stats()
    }

    /// `true` iff the reported playback phase is `Idle`.
    pub fn is_paused(&self) -> bool {
        self.player_state().is_paused()
    }
}

impl Drop for PlayerChannel {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for PlayerChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerChannel")
            .field("surface", &self.surface())
            .finish_non_exhaustive()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
