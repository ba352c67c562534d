//! Host page configuration.
//!
//! [`HostConfig`] describes the page an embedding session lives on: its
//! domain, its URL, and which browser capabilities it has.  The surface
//! builder reads it to fill in the `parent` and `referrer` query parameters
//! and the sandbox tokens.
//!
//! The domain never reads the environment; the binary fills this struct from
//! CLI flags or a TOML file.

use serde::{Deserialize, Serialize};

/// Runtime description of the host page.
///
/// # Example
///
/// ```rust
/// use embed_host::domain::HostConfig;
///
/// let cfg = HostConfig::default();
/// assert_eq!(cfg.page_domain.as_deref(), Some("localhost"));
/// assert_eq!(cfg.base_domain, "twitch.tv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Domain of the page hosting the embed.  Appended to the surface's
    /// `parent` list when present.
    pub page_domain: Option<String>,

    /// Full URL of the page hosting the embed, sent as `referrer`.
    pub referrer: String,

    /// Whether the page supports the storage-access API.  Adds
    /// `allow-storage-access-by-user-activation` to the sandbox.
    pub storage_access_api: bool,

    /// Domain the surface is served from; the surface kind is its subdomain.
    pub base_domain: String,
}

impl Default for HostConfig {
    /// | Field              | Default              |
    /// |--------------------|----------------------|
    /// | page_domain        | `localhost`          |
    /// | referrer           | `http://localhost/`  |
    /// | storage_access_api | `false`              |
    /// | base_domain        | `twitch.tv`          |
    fn default() -> Self {
        Self {
            page_domain: Some("localhost".to_string()),
            referrer: "http://localhost/".to_string(),
            storage_access_api: false,
            base_domain: "twitch.tv".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
