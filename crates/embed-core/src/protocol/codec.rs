//! Validation and encoding of raw cross-window message payloads.
//!
//! Anything can arrive on the page-wide message channel: strings from
//! analytics scripts, objects from other embeds, half-formed junk.
//! [`decode_message`] is the single gate every inbound payload passes through.
//! It accepts a payload only if it is a JSON object with a string `namespace`
//! equal to [`NAMESPACE`], a string `eventName`, and a `params` key (any value,
//! including `null`).
//!
//! Callers treat every [`ProtocolError`] as noise to discard, never as a
//! failure to report upward.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::protocol::messages::{PlayerCommand, WireMessage, NAMESPACE};

/// Reasons an inbound payload is not a message of this protocol.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The payload is not a JSON object.
    #[error("payload is not an object")]
    NotAnObject,

    /// A mandatory key is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A key is present but has the wrong JSON type.
    #[error("field `{0}` has the wrong type")]
    WrongFieldType(&'static str),

    /// The message belongs to some other protocol sharing the channel.
    #[error("foreign namespace: {0:?}")]
    ForeignNamespace(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Validates a raw payload and converts it into a [`WireMessage`].
///
/// The namespace is checked before `eventName` and `params`, so traffic from
/// other protocols is rejected as [`ProtocolError::ForeignNamespace`] even if
/// the rest of its shape is odd.
///
/// # Examples
///
/// ```rust
/// use embed_core::protocol::decode_message;
/// use serde_json::json;
///
/// let msg = decode_message(&json!({
///     "namespace": "twitch-embed",
///     "eventName": "ready",
///     "params": null,
/// })).unwrap();
/// assert_eq!(msg.event_name, "ready");
///
/// assert!(decode_message(&json!({"namespace": "other", "eventName": "ready", "params": 1})).is_err());
/// ```
pub fn decode_message(data: &Value) -> Result<WireMessage, ProtocolError> {
    let object = data.as_object().ok_or(ProtocolError::NotAnObject)?;

    let namespace = string_field(object, "namespace")?;
    if namespace != NAMESPACE {
        return Err(ProtocolError::ForeignNamespace(namespace.to_string()));
    }

    let event_name = string_field(object, "eventName")?;
    let params = object
        .get("params")
        .ok_or(ProtocolError::MissingField("params"))?;

    Ok(WireMessage {
        namespace: namespace.to_string(),
        event_name: event_name.to_string(),
        params: params.clone(),
    })
}

/// Encodes a message into the JSON value posted across the window boundary.
pub fn encode_message(msg: &WireMessage) -> Value {
    let mut object = Map::with_capacity(3);
    object.insert("eventName".to_string(), Value::String(msg.event_name.clone()));
    object.insert("params".to_string(), msg.params.clone());
    object.insert("namespace".to_string(), Value::String(msg.namespace.clone()));
    Value::Object(object)
}

/// Shorthand for encoding a [`PlayerCommand`] with its params.
pub fn encode_command(command: PlayerCommand, params: Value) -> Value {
    encode_message(&WireMessage::command(command, params))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn string_field<'a>(
    object: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ProtocolError> {
    object
        .get(key)
        .ok_or(ProtocolError::MissingField(key))?
        .as_str()
        .ok_or(ProtocolError::WrongFieldType(key))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
