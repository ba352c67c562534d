//! Options describing what an embedding session should show.
//!
//! [`EmbedOptions`] mirrors the option object a host page passes when it
//! creates an embed.  Every option that is set ends up in the embedding
//! surface's query string, so the struct serializes with the camelCase names
//! the remote player understands (`channelId`, not `channel_id`).
//!
//! # Example
//!
//! ```rust
//! use embed_host::domain::EmbedOptions;
//!
//! let options = EmbedOptions::video("123").with_size(640u32, 360u32);
//! assert!(options.validate().is_ok());
//! assert!(EmbedOptions::default().validate().is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::errors::EmbedError;

/// A width or height: either plain pixels or any CSS length string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(u32),
    Css(String),
}

impl Dimension {
    /// `false` for a zero pixel count or an empty CSS length.
    pub fn is_set(&self) -> bool {
        match self {
            Dimension::Pixels(px) => *px != 0,
            Dimension::Css(css) => !css.is_empty(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{px}"),
            Dimension::Css(css) => f.write_str(css),
        }
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::Pixels(px)
    }
}

impl From<&str> for Dimension {
    fn from(css: &str) -> Self {
        Dimension::Css(css.to_string())
    }
}

/// What to embed and how.
///
/// At least one of `channel`, `channel_id`, `video`, `collection`, or
/// `stream` must be set; [`validate`](Self::validate) enforces that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOptions {
    /// Channel login name, e.g. `"somechannel"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Numeric channel id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    /// Video (VOD) id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,

    /// Collection id; may be combined with `video` to start at a given entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// Stream id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,

    /// Domains allowed to embed the surface.  The current page domain is
    /// appended automatically when the surface address is built.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parent: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,

    /// Start offset for videos, e.g. `"1h2m3s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Any other option, passed through to the surface untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl EmbedOptions {
    pub fn channel(name: impl Into<String>) -> Self {
        Self {
            channel: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn video(id: impl Into<String>) -> Self {
        Self {
            video: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn collection(id: impl Into<String>) -> Self {
        Self {
            collection: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_parent(mut self, domain: impl Into<String>) -> Self {
        self.parent.push(domain.into());
        self
    }

    /// `true` if at least one content identifier is set and non-empty.
    pub fn has_content(&self) -> bool {
        [
            &self.channel,
            &self.channel_id,
            &self.video,
            &self.collection,
            &self.stream,
        ]
        .into_iter()
        .any(|id| id.as_deref().is_some_and(|s| !s.is_empty()))
    }

    /// Checks that the options name something to play.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::MissingParameter`] when no content identifier
    /// is set.
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.has_content() {
            Ok(())
        } else {
            Err(EmbedError::missing_content())
        }
    }
}

/// Accepts either `parent = "a.com"` or `parent = ["a.com", "b.com"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(domain) => vec![domain],
        OneOrMany::Many(domains) => domains,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_each_content_identifier_satisfies_validation() {
        let cases = [
            EmbedOptions::channel("somechannel"),
            EmbedOptions::video("123"),
            EmbedOptions::collection("abc"),
            EmbedOptions {
                channel_id: Some("42".to_string()),
                ..EmbedOptions::default()
            },
            EmbedOptions {
                stream: Some("s1".to_string()),
                ..EmbedOptions::default()
            },
        ];
        for options in cases {
            assert!(options.validate().is_ok(), "{options:?} should be valid");
        }
    }

    #[test]
    fn test_options_without_content_are_rejected() {
        let options = EmbedOptions::default().with_size(400u32, 300u32).with_parent("example.com");
        assert_eq!(options.validate(), Err(EmbedError::missing_content()));
    }

    #[test]
    fn test_empty_identifier_does_not_count() {
        let options = EmbedOptions::channel("");
        assert!(!options.has_content());
    }

    #[test]
    fn test_serializes_with_camel_case_and_skips_unset() {
        // Arrange
        let mut options = EmbedOptions {
            channel_id: Some("42".to_string()),
            autoplay: Some(false),
            ..EmbedOptions::default()
        }
        .with_size(640u32, "100%");
        options.extra.insert("theme".to_string(), "dark".to_string());

        // Act
        let value = serde_json::to_value(&options).unwrap();

        // Assert
        assert_eq!(
            value,
            json!({"channelId": "42", "width": 640, "height": "100%", "autoplay": false, "theme": "dark"})
        );
    }

    #[test]
    fn test_parent_accepts_single_string_or_list() {
        let one: EmbedOptions = serde_json::from_value(json!({"video": "1", "parent": "a.com"})).unwrap();
        let many: EmbedOptions =
            serde_json::from_value(json!({"video": "1", "parent": ["a.com", "b.com"]})).unwrap();

        assert_eq!(one.parent, vec!["a.com"]);
        assert_eq!(many.parent, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_unknown_string_options_land_in_extra() {
        let options: EmbedOptions =
            serde_json::from_value(json!({"channel": "c", "layout": "video"})).unwrap();
        assert_eq!(options.extra.get("layout").map(String::as_str), Some("video"));
    }

    #[test]
    fn test_zero_and_empty_dimensions_are_unset() {
        assert!(!Dimension::Pixels(0).is_set());
        assert!(!Dimension::from("").is_set());
        assert!(Dimension::Pixels(1).is_set());
        assert!(Dimension::from("50%").is_set());
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::from(480).to_string(), "480");
        assert_eq!(Dimension::from("100%").to_string(), "100%");
    }
}
