//! embed-host library crate.
//!
//! This crate embeds a remote video player surface into a host page and
//! exposes a synchronous control API over the asynchronous cross-window
//! message channel.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host application
//!         ↕  play(), volume(), add_event_listener(..)
//! [embed-host]
//!   ├── domain/           Pure types: EmbedOptions, HostConfig, EmbedError
//!   ├── application/      EmbedSession, PlayerChannel, inbound message filter
//!   └── infrastructure/
//!         ├── page_channel/ MessageChannel trait + in-memory PageWindow
//!         ├── dom/          Attach points + in-memory document
//!         ├── surface/      Surface address, attributes, query formatting
//!         ├── config_file/  Optional TOML config
//!         └── simulator/    Simulated remote surface (tokio)
//!         ↕  {namespace:"twitch-embed", eventName, params}
//! Remote player surface
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no dependencies on the page or a runtime.
//! - `application` depends on `domain`, `embed-core`, and the infrastructure
//!   traits only.
//! - `infrastructure` provides the trait implementations and everything that
//!   needs `tokio` or the file system.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use embed_host::application::{EmbedEnvironment, EmbedSession};
//! use embed_host::domain::EmbedOptions;
//! use embed_host::infrastructure::{IframeBuilder, MemoryDocument, PageWindow};
//!
//! let page = Arc::new(PageWindow::new());
//! let document = Arc::new(MemoryDocument::new());
//! document.insert_element("twitch-embed");
//! let env = EmbedEnvironment::new(page.clone(), document, Arc::new(IframeBuilder::default()));
//!
//! let session = EmbedSession::embed(Some("twitch-embed".into()), EmbedOptions::video("123"), env).unwrap();
//! session.play();
//! assert_eq!(page.posted().len(), 1);
//! session.destroy();
//! ```

/// Domain layer: pure types (no I/O).
pub mod domain;

/// Application layer: sessions, the control channel, message filtering.
pub mod application;

/// Infrastructure layer: page channel, document, surfaces, config, simulator.
pub mod infrastructure;
