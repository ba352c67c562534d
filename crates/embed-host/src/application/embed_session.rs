//! The embedding session: one embedded player on one page.
//!
//! An [`EmbedSession`] validates its inputs, builds a surface, attaches it to
//! the target element, and wires two independent listeners onto the
//! page-wide message channel:
//!
//! - its [`PlayerChannel`], which caches `UpdateState` payloads, and
//! - its own filter, which republishes every accepted message on an
//!   [`EventBus`] under the message's event name, with `params` as payload.
//!
//! # Lifecycle
//!
//! ```text
//!  Uninitialized ──(construction succeeds)──► Rendered ──destroy()──► Destroyed
//! ```
//!
//! Construction either returns a rendered session or an [`EmbedError`].
//! After [`destroy`](EmbedSession::destroy) the session is inert: commands
//! are dropped, queries return the last snapshot, and listener registration
//! does nothing.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use embed_core::domain::{Quality, VideoStats};
use embed_core::{EventBus, Listener, PlayerState};
use serde_json::Value;
use tracing::{debug, info};

use crate::application::message_filter::accept;
use crate::application::player_channel::PlayerChannel;
use crate::domain::{EmbedError, EmbedOptions};
use crate::infrastructure::dom::{AttachPoints, NodeRef, Target};
use crate::infrastructure::page_channel::{
    InboundMessage, MessageChannel, MessageHandler, Subscription, WindowId,
};
use crate::infrastructure::surface::{EmbedSurface, SurfaceBuilder, SurfaceKind};

/// The page collaborators a session needs.
#[derive(Clone)]
pub struct EmbedEnvironment {
    pub page: Arc<dyn MessageChannel>,
    pub document: Arc<dyn AttachPoints>,
    pub surfaces: Arc<dyn SurfaceBuilder>,
}

impl EmbedEnvironment {
    pub fn new(
        page: Arc<dyn MessageChannel>,
        document: Arc<dyn AttachPoints>,
        surfaces: Arc<dyn SurfaceBuilder>,
    ) -> Self {
        Self {
            page,
            document,
            surfaces,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Rendered,
    Destroyed,
}

type SharedBus = Arc<RwLock<Option<Arc<EventBus<Value>>>>>;

/// One embedded player and its control surface.
pub struct EmbedSession {
    env: EmbedEnvironment,
    kind: SurfaceKind,
    options: EmbedOptions,
    channel: PlayerChannel,
    bus: SharedBus,
    bound: Arc<RwLock<Option<WindowId>>>,
    target: Mutex<Option<NodeRef>>,
    surface: Mutex<Option<EmbedSurface>>,
    subscription: Mutex<Option<Subscription>>,
    state: Mutex<SessionState>,
}

impl EmbedSession {
    /// Embeds a full embed surface (player and chat) into `target`.
    ///
    /// # Errors
    ///
    /// - [`EmbedError::MissingParameter`] if `options` name no content, if
    ///   `target` is absent or an empty id, or if it resolves to a node that
    ///   is not an element.
    /// - [`EmbedError::MissingElement`] if a target id matches no element.
    pub fn embed(
        target: Option<Target>,
        options: EmbedOptions,
        env: EmbedEnvironment,
    ) -> Result<Self, EmbedError> {
        Self::new(SurfaceKind::Embed, target, options, env)
    }

    /// Embeds a bare video player surface into `target`.
    ///
    /// # Errors
    ///
    /// Same as [`embed`](Self::embed).
    pub fn player(
        target: Option<Target>,
        options: EmbedOptions,
        env: EmbedEnvironment,
    ) -> Result<Self, EmbedError> {
        Self::new(SurfaceKind::Player, target, options, env)
    }

    /// Validates the inputs and renders a session of the given kind.
    ///
    /// # Errors
    ///
    /// Same as [`embed`](Self::embed).
    pub fn new(
        kind: SurfaceKind,
        target: Option<Target>,
        options: EmbedOptions,
        env: EmbedEnvironment,
    ) -> Result<Self, EmbedError> {
        options.validate()?;
        let node = resolve_target(target, env.document.as_ref())?;

        let session = Self {
            channel: PlayerChannel::new(Arc::clone(&env.page)),
            env,
            kind,
            options,
            bus: Arc::new(RwLock::new(Some(Arc::new(EventBus::new())))),
            bound: Arc::new(RwLock::new(None)),
            target: Mutex::new(Some(node)),
            surface: Mutex::new(None),
            subscription: Mutex::new(None),
            state: Mutex::new(SessionState::Uninitialized),
        };
        session.render();
        Ok(session)
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Builds a fresh surface, attaches it to the target, and binds it.
    ///
    /// Rendering again replaces the previous surface.  Does nothing once the
    /// session is destroyed.
    pub fn render(&self) {
        let Some(target) = *lock(&self.target) else {
            debug!("render skipped: session has no target");
            return;
        };

        let surface = self.env.surfaces.build(&self.options, self.kind);
        if let Some(previous) = lock(&self.surface).take() {
            self.env.document.detach(&previous);
        }
        self.env.document.append_child(&target, &surface);
        let window = surface.content_window;
        info!(kind = %self.kind, src = %surface.src(), "rendered embed surface");
        *lock(&self.surface) = Some(surface);

        *self.bound.write().unwrap_or_else(PoisonError::into_inner) = Some(window);
        {
            let mut subscription = lock(&self.subscription);
            if subscription.is_none() {
                *subscription = Some(Subscription::register(
                    Arc::clone(&self.env.page),
                    self.forwarding_handler(),
                ));
            }
        }
        self.channel.bind_surface(Some(window));
        *lock(&self.state) = SessionState::Rendered;
    }

    fn forwarding_handler(&self) -> MessageHandler {
        let bound = Arc::clone(&self.bound);
        let bus = Arc::clone(&self.bus);
        Arc::new(move |inbound: &InboundMessage| {
            let surface = *bound.read().unwrap_or_else(PoisonError::into_inner);
            let Some(message) = accept(surface, inbound) else {
                return;
            };
            // Clone out of the lock so listeners may call back into the session.
            let bus = bus.read().unwrap_or_else(PoisonError::into_inner).clone();
            if let Some(bus) = bus {
                bus.emit(&message.event_name, &message.params);
            }
        })
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    /// Calls `listener` for every message named `event_name` from the
    /// surface.  Does nothing after [`destroy`](Self::destroy).
    pub fn add_event_listener(&self, event_name: &str, listener: Listener<Value>) {
        if let Some(bus) = self.event_bus() {
            bus.on(event_name, listener);
        }
    }

    /// Removes every registration of `listener` for `event_name`.
    pub fn remove_event_listener(&self, event_name: &str, listener: &Listener<Value>) {
        if let Some(bus) = self.event_bus() {
            bus.remove_listener(event_name, listener);
        }
    }

    /// The bus host listeners are registered on, until the session is
    /// destroyed.
    pub fn event_bus(&self) -> Option<Arc<EventBus<Value>>> {
        self.bus.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // ── Teardown ──────────────────────────────────────────────────────────────

    /// Tears the session down.  Calling it again does nothing.
    pub fn destroy(&self) {
        if let Some(bus) = self.event_bus() {
            bus.remove_all_listeners();
        }
        if let Some(mut subscription) = lock(&self.subscription).take() {
            subscription.cancel();
        }
        if let Some(surface) = lock(&self.surface).take() {
            self.env.document.detach(&surface);
        }
        self.channel.bind_surface(None);
        self.channel.close();

        *self.bus.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.bound.write().unwrap_or_else(PoisonError::into_inner) = None;
        *lock(&self.target) = None;

        let mut state = lock(&self.state);
        if *state != SessionState::Destroyed {
            info!(kind = %self.kind, "destroyed embed session");
            *state = SessionState::Destroyed;
        }
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn options(&self) -> &EmbedOptions {
        &self.options
    }

    /// The attached surface, while rendered.
    pub fn surface(&self) -> Option<EmbedSurface> {
        lock(&self.surface).clone()
    }

    /// The control channel the facade methods delegate to.
    pub fn player_channel(&self) -> &PlayerChannel {
        &self.channel
    }

    // ── Player facade ─────────────────────────────────────────────────────────

    pub fn disable_captions(&self) {
        self.channel.disable_captions();
    }

    pub fn enable_captions(&self) {
        self.channel.enable_captions();
    }

    pub fn pause(&self) {
        self.channel.pause();
    }

    pub fn play(&self) {
        self.channel.play();
    }

    pub fn seek(&self, timestamp: f64) {
        self.channel.seek(timestamp);
    }

    pub fn set_channel(&self, channel: &str) {
        self.channel.set_channel(channel);
    }

    pub fn set_channel_id(&self, channel_id: &str) {
        self.channel.set_channel_id(channel_id);
    }

    pub fn set_collection(&self, collection_id: &str, video_id: Option<&str>) {
        self.channel.set_collection(collection_id, video_id);
    }

    pub fn set_quality(&self, quality: &str) {
        self.channel.set_quality(quality);
    }

    pub fn set_video(&self, video_id: &str) {
        self.channel.set_video(video_id);
    }

    pub fn set_muted(&self, muted: bool) {
        self.channel.set_muted(muted);
    }

    pub fn set_muted_value(&self, muted: &Value) {
        self.channel.set_muted_value(muted);
    }

    pub fn set_volume(&self, volume: f64) {
        self.channel.set_volume(volume);
    }

    pub fn muted(&self) -> bool {
        self.channel.muted()
    }

    pub fn volume(&self) -> f64 {
        self.channel.volume()
    }

    pub fn channel(&self) -> String {
        self.channel.channel()
    }

    pub fn channel_id(&self) -> String {
        self.channel.channel_id()
    }

    pub fn collection(&self) -> String {
        self.channel.collection()
    }

    pub fn video(&self) -> String {
        self.channel.video()
    }

    pub fn current_time(&self) -> f64 {
        self.channel.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.channel.duration()
    }

    pub fn ended(&self) -> bool {
        self.channel.ended()
    }

    pub fn quality(&self) -> String {
        self.channel.quality()
    }

    pub fn qualities(&self) -> Vec<Quality> {
        self.channel.qualities()
    }

    pub fn playback_stats(&self) -> Option<VideoStats> {
        self.channel.playback_stats()
    }

    pub fn player_state(&self) -> Arc<PlayerState> {
        self.channel.player_state()
    }

    pub fn is_paused(&self) -> bool {
        self.channel.is_paused()
    }
}

impl Drop for EmbedSession {
    fn drop(&mut self) {
        if let Some(mut subscription) = lock(&self.subscription).take() {
            subscription.cancel();
        }
    }
}

impl fmt::Debug for EmbedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedSession")
            .field("kind", &self.kind)
            .field("state", &self.state())
            .field("surface", &self.channel.surface())
            .finish_non_exhaustive()
    }
}

fn resolve_target(target: Option<Target>, document: &dyn AttachPoints) -> Result<NodeRef, EmbedError> {
    let node = match target {
        None => return Err(EmbedError::missing_target()),
        Some(Target::Id(id)) if id.is_empty() => return Err(EmbedError::missing_target()),
        Some(Target::Id(id)) => document
            .element_by_id(&id)
            .ok_or(EmbedError::MissingElement(id))?,
        Some(Target::Node(node)) => node,
    };
    if node.is_element() {
        Ok(node)
    } else {
        Err(EmbedError::missing_target())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
