//! Optional TOML configuration file for the `embed-host` binary.
//!
//! # File format
//!
//! ```toml
//! [host]
//! page_domain = "example.com"
//! referrer = "https://example.com/watch"
//! storage_access_api = true
//!
//! [options]
//! channel = "somechannel"
//! width = 854
//! height = 480
//! parent = ["example.com", "cdn.example.com"]
//! ```
//!
//! Both tables are optional; missing keys fall back to their defaults.
//! Command-line flags are applied on top of whatever the file provides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{EmbedOptions, HostConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub host: HostConfig,
    pub options: EmbedOptions,
}

/// Parses configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed or a value has the
/// wrong type.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads configuration from `path`.
///
/// Unlike an implicit default location, an explicitly named file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if its TOML is malformed.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = parse_config(&content)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(cfg)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
