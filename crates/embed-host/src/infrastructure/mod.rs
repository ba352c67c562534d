//! Infrastructure layer for embed-host.
//!
//! The infrastructure layer is everything that touches the page: the
//! page-wide message channel, the document the surface is attached to, the
//! surface itself, and the files and runtime used by the demo binary.
//!
//! # Responsibilities
//!
//! - The [`MessageChannel`](page_channel::MessageChannel) seam and its
//!   in-memory implementation
//! - Resolving attach points and attaching or detaching surfaces
//! - Building the surface address and attributes
//! - Loading the optional TOML config file
//! - Running a simulated remote surface on tokio
//!
//! # What does NOT belong here?
//!
//! - Message filtering and state caching (that is the application layer)
//! - Option and error type definitions (that is the domain layer)

pub mod config_file;
pub mod dom;
pub mod page_channel;
pub mod simulator;
pub mod surface;

pub use config_file::{load_config, ConfigError, FileConfig};
pub use dom::{AttachPoints, MemoryDocument, NodeKind, NodeRef, Target};
pub use page_channel::{
    InboundMessage, MessageChannel, MessageHandler, PageWindow, Subscription, WindowId,
};
pub use simulator::SimulatedSurface;
pub use surface::{EmbedSurface, IframeBuilder, SurfaceBuilder, SurfaceKind};
