//! Building the embedding surface.
//!
//! A surface is the isolated frame the remote player runs in.  Building one
//! means computing its address (`https://<kind>.<base domain>?<query>`) and
//! its attributes, and allocating the content-window handle that commands are
//! posted to.  The surface is returned unattached; the session decides where
//! it goes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::domain::{EmbedOptions, HostConfig};
use crate::infrastructure::page_channel::WindowId;

pub mod query;

use query::{format_query, QueryFormat};

/// Sandbox tokens every surface gets.
pub const BASE_SANDBOX: &str =
    "allow-modals allow-scripts allow-same-origin allow-popups allow-popups-to-escape-sandbox";

/// Sandbox token added when the page supports the storage-access API.
pub const STORAGE_ACCESS_SANDBOX: &str = "allow-storage-access-by-user-activation";

// ── Surface kind ──────────────────────────────────────────────────────────────

/// Which flavour of remote surface to embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Full embed: player plus chat.
    Embed,
    /// Bare video player.
    Player,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceKind::Embed => "embed",
            SurfaceKind::Player => "player",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown surface kind {0:?} (expected \"embed\" or \"player\")")]
pub struct UnknownSurfaceKind(pub String);

impl FromStr for SurfaceKind {
    type Err = UnknownSurfaceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embed" => Ok(SurfaceKind::Embed),
            "player" => Ok(SurfaceKind::Player),
            other => Err(UnknownSurfaceKind(other.to_string())),
        }
    }
}

// ── Surface ───────────────────────────────────────────────────────────────────

/// An unattached embedding surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSurface {
    pub kind: SurfaceKind,
    /// Handle commands are posted to; also the identity inbound messages
    /// must carry as their source.
    pub content_window: WindowId,
    /// Attribute name → value, including `src`.
    pub attributes: BTreeMap<String, String>,
}

impl EmbedSurface {
    pub fn src(&self) -> &str {
        self.attribute("src").unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Creates surfaces from embed options.
pub trait SurfaceBuilder: Send + Sync {
    fn build(&self, options: &EmbedOptions, kind: SurfaceKind) -> EmbedSurface;
}

/// Builds iframe-style surfaces for a given host page.
#[derive(Debug, Clone, Default)]
pub struct IframeBuilder {
    config: HostConfig,
}

impl IframeBuilder {
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Computes the surface address for `options`.
    pub fn source_url(&self, options: &EmbedOptions, kind: SurfaceKind) -> String {
        let mut params = option_params(options);
        params.insert(
            "parent".to_string(),
            Value::from(self.parents_including_page(&options.parent)),
        );
        params.insert(
            "referrer".to_string(),
            Value::String(self.config.referrer.clone()),
        );
        format!(
            "https://{}.{}?{}",
            kind,
            self.config.base_domain,
            format_query(&params, &QueryFormat::default())
        )
    }

    /// Configured parents plus the page's own domain, if not already listed.
    pub fn parents_including_page(&self, parents: &[String]) -> Vec<String> {
        let mut all = parents.to_vec();
        if let Some(domain) = self.config.page_domain.as_deref().filter(|d| !d.is_empty()) {
            if !all.iter().any(|p| p == domain) {
                all.push(domain.to_string());
            }
        }
        all
    }

    fn sandbox(&self) -> String {
        if self.config.storage_access_api {
            format!("{BASE_SANDBOX} {STORAGE_ACCESS_SANDBOX}")
        } else {
            BASE_SANDBOX.to_string()
        }
    }
}

impl SurfaceBuilder for IframeBuilder {
    fn build(&self, options: &EmbedOptions, kind: SurfaceKind) -> EmbedSurface {
        let mut attributes = BTreeMap::new();
        attributes.insert("src".to_string(), self.source_url(options, kind));
        attributes.insert("allowfullscreen".to_string(), String::new());
        attributes.insert("scrolling".to_string(), "no".to_string());
        attributes.insert("frameborder".to_string(), "0".to_string());
        attributes.insert("allow".to_string(), "autoplay; fullscreen".to_string());
        attributes.insert("title".to_string(), "Twitch".to_string());
        attributes.insert("sandbox".to_string(), self.sandbox());
        if let Some(width) = options.width.as_ref().filter(|w| w.is_set()) {
            attributes.insert("width".to_string(), width.to_string());
        }
        if let Some(height) = options.height.as_ref().filter(|h| h.is_set()) {
            attributes.insert("height".to_string(), height.to_string());
        }

        EmbedSurface {
            kind,
            content_window: WindowId::new(),
            attributes,
        }
    }
}

fn option_params(options: &EmbedOptions) -> Map<String, Value> {
    match serde_json::to_value(options) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            warn!("could not serialize embed options: {e}");
            Map::new()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
