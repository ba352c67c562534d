//! Construction-time failures of an embedding session.
//!
//! These are the only errors a host ever sees.  Everything that goes wrong
//! after construction (foreign messages, commands sent too early) is logged
//! and dropped instead.

use thiserror::Error;

/// Message used when the options name nothing to play.
pub const MISSING_CONTENT: &str =
    "A channel, video, or collection id must be provided in options";

/// Message used when the target is absent or is not an element.
pub const MISSING_TARGET: &str = "An element of type String or Element is required";

/// Errors returned by `EmbedSession` constructors.
///
/// Both variants are configuration errors: retrying with the same input will
/// fail the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbedError {
    /// A required construction parameter is missing or has the wrong kind.
    #[error("{0}")]
    MissingParameter(String),

    /// The target id did not resolve to a node on the page.
    #[error("Could not find the provided element: {0}")]
    MissingElement(String),
}

impl EmbedError {
    pub(crate) fn missing_content() -> Self {
        Self::MissingParameter(MISSING_CONTENT.to_string())
    }

    pub(crate) fn missing_target() -> Self {
        Self::MissingParameter(MISSING_TARGET.to_string())
    }
}
