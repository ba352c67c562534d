//! A simulated remote player surface.
//!
//! The simulator stands in for the real remote player so the demo binary and
//! the tests can exercise the whole round trip without a browser.  It
//! receives the commands posted into its content window, applies them to its
//! own [`PlayerState`], and answers the way a live surface does: a partial
//! `UpdateState` carrying the changed fields, followed by any domain events.
//!
//! # Lifecycle
//!
//! [`SimulatedSurface::spawn`] connects an endpoint for the window on the
//! [`PageWindow`] and starts a tokio task.  The task announces itself
//! (`UpdateState` with the full initial state, then `video.ready` and
//! `ready`) and processes commands until [`SimulatedSurface::stop`]
//! disconnects the endpoint.

use std::sync::Arc;

use embed_core::domain::fields;
use embed_core::protocol::{
    decode_message, encode_message, EmbedEvent, PlayerCommand, WireMessage, UPDATE_STATE,
};
use embed_core::{PlaybackPhase, PlayerState};
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::infrastructure::page_channel::{PageWindow, WindowId};

/// Handle to a running simulated surface.
pub struct SimulatedSurface {
    page: Arc<PageWindow>,
    window: WindowId,
    task: JoinHandle<PlayerState>,
}

impl SimulatedSurface {
    /// Starts answering commands posted into `window`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(page: Arc<PageWindow>, window: WindowId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Value>();
        page.connect_endpoint(
            window,
            Arc::new(move |data| {
                // The receiver only goes away after the endpoint is disconnected.
                let _ = tx.send(data);
            }),
        );
        let task = tokio::spawn(run(Arc::clone(&page), window, rx));
        Self { page, window, task }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Disconnects the endpoint, waits for queued commands to drain, and
    /// returns the simulator's final state.
    pub async fn stop(self) -> Result<PlayerState, tokio::task::JoinError> {
        self.page.disconnect_endpoint(self.window);
        self.task.await
    }
}

async fn run(
    page: Arc<PageWindow>,
    window: WindowId,
    mut commands: mpsc::UnboundedReceiver<Value>,
) -> PlayerState {
    let mut initial = Map::new();
    initial.insert(fields::PLAYBACK.to_string(), json!(PlaybackPhase::Ready.as_str()));
    let mut state = PlayerState::default().merged(&Value::Object(initial));

    publish(&page, window, UPDATE_STATE, Value::Object(state.fields().clone()));
    publish(&page, window, EmbedEvent::VideoReady.as_str(), Value::Null);
    publish(&page, window, EmbedEvent::Ready.as_str(), Value::Null);

    while let Some(data) = commands.recv().await {
        let message = match decode_message(&data) {
            Ok(message) => message,
            Err(e) => {
                trace!("simulator ignoring payload: {e}");
                continue;
            }
        };
        let Some(command) = PlayerCommand::from_name(&message.event_name) else {
            trace!(event = %message.event_name, "simulator ignoring unknown command");
            continue;
        };

        let (update, events) = respond(command, &message.params);
        debug!(%command, "simulator applied command");
        if !update.is_empty() {
            let update = Value::Object(update);
            state = state.merged(&update);
            publish(&page, window, UPDATE_STATE, update);
        }
        for (event, params) in events {
            publish(&page, window, event.as_str(), params);
        }
    }

    debug!(%window, "simulated surface stopped");
    state
}

/// Maps one command to the state fields it changes and the events it raises.
fn respond(command: PlayerCommand, params: &Value) -> (Map<String, Value>, Vec<(EmbedEvent, Value)>) {
    let mut update = Map::new();
    let mut events = Vec::new();
    let mut set = |key: &str, value: Value| {
        update.insert(key.to_string(), value);
    };

    match command {
        PlayerCommand::Play => {
            set(fields::PLAYBACK, json!(PlaybackPhase::Playing.as_str()));
            set(fields::ENDED, json!(false));
            events.push((EmbedEvent::Play, Value::Null));
            events.push((EmbedEvent::Playing, Value::Null));
        }
        PlayerCommand::Pause => {
            set(fields::PLAYBACK, json!(PlaybackPhase::IDLE));
            events.push((EmbedEvent::Pause, Value::Null));
        }
        PlayerCommand::Seek => set(fields::CURRENT_TIME, params.clone()),
        PlayerCommand::SetVolume => set(fields::VOLUME, params.clone()),
        PlayerCommand::SetMuted => set(fields::MUTED, json!(params.as_bool().unwrap_or(false))),
        PlayerCommand::SetQuality => set(fields::QUALITY, params.clone()),
        PlayerCommand::SetChannel => {
            set(fields::CHANNEL_NAME, params.clone());
            set(fields::VIDEO_ID, json!(""));
            events.push((EmbedEvent::Online, Value::Null));
        }
        PlayerCommand::SetChannelId => set(fields::CHANNEL_ID, params.clone()),
        PlayerCommand::SetVideo => {
            set(fields::VIDEO_ID, params.clone());
            set(fields::CHANNEL_NAME, json!(""));
        }
        PlayerCommand::SetCollection => {
            let collection = params.get(0).cloned().unwrap_or(Value::Null);
            let video = params.get(1).cloned().unwrap_or(Value::Null);
            set(fields::COLLECTION_ID, collection);
            set(fields::VIDEO_ID, video);
        }
        PlayerCommand::EnableCaptions => {
            events.push((EmbedEvent::Captions, json!({"enabled": true})));
        }
        PlayerCommand::DisableCaptions => {
            events.push((EmbedEvent::Captions, json!({"enabled": false})));
        }
    }

    (update, events)
}

fn publish(page: &PageWindow, window: WindowId, event_name: &str, params: Value) {
    page.dispatch_from(window, encode_message(&WireMessage::new(event_name, params)));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
