//! The page-wide cross-window message channel.
//!
//! Every window on a page shares one inbound message stream.  Any component
//! that cares about cross-window traffic registers its own handler and
//! decides for itself which messages are meant for it.  Outbound messages are
//! posted directly into a target window together with a target origin.
//!
//! # Testability
//!
//! The [`MessageChannel`] trait is the seam between the protocol layer and
//! the page.  [`memory::PageWindow`] is an in-process implementation used by
//! the demo binary and the integration tests; unit tests can also use the
//! generated `MockMessageChannel`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub mod memory;

pub use memory::{PageWindow, PostedMessage};

// ── Identity handles ──────────────────────────────────────────────────────────

/// Opaque handle to a window's message-receiving endpoint.
///
/// Two handles are equal only if they refer to the same window, which is how
/// inbound messages are matched to the surface that sent them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// One message delivered on the page-wide channel.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Window that posted the message, if the page could tell.
    pub source: Option<WindowId>,
    /// Raw payload; may be any JSON value.
    pub data: Value,
}

impl InboundMessage {
    pub fn from_window(source: WindowId, data: Value) -> Self {
        Self {
            source: Some(source),
            data,
        }
    }
}

/// Callback invoked for every inbound message on the page.
pub type MessageHandler = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

/// Identifies one registered [`MessageHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

// ── Channel trait ─────────────────────────────────────────────────────────────

/// The page-wide message channel.
#[cfg_attr(test, mockall::automock)]
pub trait MessageChannel: Send + Sync {
    /// Registers `handler` for every inbound message on the page.
    fn add_listener(&self, handler: MessageHandler) -> SubscriptionId;

    /// Removes a handler.  Returns `false` if it was already gone.
    fn remove_listener(&self, id: SubscriptionId) -> bool;

    /// Posts `data` into the window identified by `target`.
    fn post_message(&self, target: WindowId, data: Value, target_origin: &str);
}

// ── Subscription ──────────────────────────────────────────────────────────────

/// A registered handler that is removed when cancelled or dropped.
pub struct Subscription {
    channel: Arc<dyn MessageChannel>,
    id: Option<SubscriptionId>,
}

impl Subscription {
    /// Registers `handler` on `channel` and returns the handle that owns the
    /// registration.
    pub fn register(channel: Arc<dyn MessageChannel>, handler: MessageHandler) -> Self {
        let id = channel.add_listener(handler);
        Self {
            channel,
            id: Some(id),
        }
    }

    /// `None` once the subscription has been cancelled.
    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }

    /// Removes the handler from the channel.  Safe to call repeatedly; only
    /// the first call has an effect.
    pub fn cancel(&mut self) -> bool {
        match self.id.take() {
            Some(id) => self.channel.remove_listener(id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
