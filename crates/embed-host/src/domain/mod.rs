//! Domain layer for embed-host.
//!
//! The domain layer contains pure types that have no dependencies on the page,
//! the message channel, or any runtime.  They are easy to build in tests and
//! are shared by the application and infrastructure layers.
//!
//! # What belongs in the domain layer?
//!
//! - The options a host passes when creating an embed
//! - The description of the host page
//! - Construction errors
//!
//! # What does NOT belong here?
//!
//! - Message channel or DOM handles
//! - File I/O or environment variable reading
//! - Anything that posts or receives messages

pub mod config;
pub mod errors;
pub mod options;

pub use config::HostConfig;
pub use errors::{EmbedError, MISSING_CONTENT, MISSING_TARGET};
pub use options::{Dimension, EmbedOptions};
