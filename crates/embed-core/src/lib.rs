//! # embed-core
//!
//! Shared library for controlling an embedded video player that lives in an
//! isolated, cross-origin rendering surface.  It defines the wire protocol,
//! the cached mirror of the remote player's state, and a generic ordered
//! event bus.
//!
//! This crate has no dependencies on windows, DOM nodes, or message channels.
//! The host crate (`embed-host`) wires these pieces to an actual page.
//!
//! # Architecture overview
//!
//! The host page and the embedded player can only talk by posting structured
//! messages through the page-wide message channel.  Commands go in; state
//! updates and domain events come back out.  Nothing is acknowledged.
//!
//! - **`protocol`** – The `{namespace, eventName, params}` wire shape, the
//!   command and event names, and the decoder that rejects every message that
//!   is not ours.
//!
//! - **`domain`** – The `PlayerState` snapshot that `UpdateState` messages are
//!   shallow-merged into, plus typed views over it.
//!
//! - **`event_bus`** – Ordered publish/subscribe with one-shot listeners; the
//!   host republishes domain events on it.

pub mod domain;
pub mod event_bus;
pub mod protocol;

pub use domain::player_state::{PlaybackPhase, PlayerState};
pub use event_bus::{listener, ContextId, EventBus, Listener, ListenerFilter};
pub use protocol::codec::{decode_message, encode_command, encode_message, ProtocolError};
pub use protocol::messages::{EmbedEvent, MediaErrorCode, PlayerCommand, WireMessage, NAMESPACE};
