//! In-process implementation of the page-wide message channel.
//!
//! [`PageWindow`] plays the role of the host page's own window.  Inbound
//! messages are injected with [`PageWindow::dispatch`]; outbound messages are
//! forwarded to the target's connected endpoint, or recorded in an outbox
//! when it has none.  The outbox grows until drained with
//! [`PageWindow::take_posted`].  The simulated remote surface uses the endpoint hook to
//! receive the commands addressed to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::trace;

use super::{InboundMessage, MessageChannel, MessageHandler, SubscriptionId, WindowId};

/// Receives every message posted into one window.
pub type EndpointSink = Arc<dyn Fn(Value) + Send + Sync>;

/// One message posted through [`MessageChannel::post_message`].
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub target: WindowId,
    pub data: Value,
    pub target_origin: String,
}

#[derive(Default)]
struct PageState {
    handlers: Vec<(SubscriptionId, MessageHandler)>,
    next_id: u64,
    outbox: Vec<PostedMessage>,
    endpoints: HashMap<WindowId, EndpointSink>,
}

/// The host page's window, held entirely in memory.
pub struct PageWindow {
    id: WindowId,
    state: Mutex<PageState>,
}

impl PageWindow {
    pub fn new() -> Self {
        Self {
            id: WindowId::new(),
            state: Mutex::new(PageState::default()),
        }
    }

    /// Identity of the page window itself.
    pub fn id(&self) -> WindowId {
        self.id
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        // Handlers never run under this lock, so a poisoned guard still holds
        // consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers `message` to every handler registered at the moment of the
    /// call and returns how many were invoked.
    ///
    /// Handlers run without the internal lock held, so they may post,
    /// register, or remove handlers (including themselves).
    pub fn dispatch(&self, message: InboundMessage) -> usize {
        let handlers: Vec<MessageHandler> = self
            .state()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        trace!(handlers = handlers.len(), source = ?message.source, "dispatching inbound message");
        for handler in &handlers {
            handler(&message);
        }
        handlers.len()
    }

    /// Shorthand for dispatching a message that came from `source`.
    pub fn dispatch_from(&self, source: WindowId, data: Value) -> usize {
        self.dispatch(InboundMessage::from_window(source, data))
    }

    /// Number of handlers currently registered.
    pub fn listener_count(&self) -> usize {
        self.state().handlers.len()
    }

    /// Everything posted so far, oldest first.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.state().outbox.clone()
    }

    /// Everything posted so far into `target`, oldest first.
    pub fn posted_to(&self, target: WindowId) -> Vec<PostedMessage> {
        self.state()
            .outbox
            .iter()
            .filter(|m| m.target == target)
            .cloned()
            .collect()
    }

    /// Drains the outbox.
    pub fn take_posted(&self) -> Vec<PostedMessage> {
        std::mem::take(&mut self.state().outbox)
    }

    /// Forwards every future message posted into `window` to `sink` instead
    /// of recording it in the outbox.
    pub fn connect_endpoint(&self, window: WindowId, sink: EndpointSink) {
        self.state().endpoints.insert(window, sink);
    }

    pub fn disconnect_endpoint(&self, window: WindowId) -> bool {
        self.state().endpoints.remove(&window).is_some()
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageChannel for PageWindow {
    fn add_listener(&self, handler: MessageHandler) -> SubscriptionId {
        let mut state = self.state();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.handlers.push((id, handler));
        id
    }

    fn remove_listener(&self, id: SubscriptionId) -> bool {
        let mut state = self.state();
        let before = state.handlers.len();
        state.handlers.retain(|(existing, _)| *existing != id);
        state.handlers.len() != before
    }

    fn post_message(&self, target: WindowId, data: Value, target_origin: &str) {
        let sink = {
            let mut state = self.state();
            let sink = state.endpoints.get(&target).cloned();
            if sink.is_none() {
                state.outbox.push(PostedMessage {
                    target,
                    data: data.clone(),
                    target_origin: target_origin.to_string(),
                });
            }
            sink
        };
        if let Some(sink) = sink {
            sink(data);
        }
    }
}

impl fmt::Debug for PageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("PageWindow")
            .field("id", &self.id)
            .field("handlers", &state.handlers.len())
            .field("outbox", &state.outbox.len())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
