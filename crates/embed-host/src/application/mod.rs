//! Application layer for embed-host.
//!
//! The application layer owns the protocol behaviour: which inbound messages
//! count, how the cached state evolves, and how a session moves through its
//! lifecycle.  It reaches the page only through the traits defined in the
//! infrastructure layer.
//!
//! # Responsibilities
//!
//! - Accepting or discarding inbound messages ([`message_filter`])
//! - Sending commands and caching reported state ([`PlayerChannel`])
//! - Rendering, event forwarding, and teardown ([`EmbedSession`])
//!
//! # What does NOT belong here?
//!
//! - Building surface addresses or touching the document (infrastructure)
//! - Option and error type definitions (domain)

pub mod embed_session;
pub mod message_filter;
pub mod player_channel;

pub use embed_session::{EmbedEnvironment, EmbedSession, SessionState};
pub use player_channel::PlayerChannel;
