//! The shared acceptance rule for inbound cross-window messages.
//!
//! Both the control channel and the session listen to the same page-wide
//! stream and apply the same rule independently: a message counts only if a
//! surface is bound, the message came from exactly that surface's window, and
//! its payload is a well-formed message in this protocol's namespace.

use embed_core::protocol::{decode_message, WireMessage};
use tracing::trace;

use crate::infrastructure::page_channel::{InboundMessage, WindowId};

/// Returns the decoded message if `inbound` is meant for a listener bound to
/// `bound`, or `None` if it is noise.
pub fn accept(bound: Option<WindowId>, inbound: &InboundMessage) -> Option<WireMessage> {
    let surface = bound?;
    if inbound.source != Some(surface) {
        return None;
    }
    match decode_message(&inbound.data) {
        Ok(message) => Some(message),
        Err(e) => {
            trace!(%surface, "discarding message from bound surface: {e}");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({"namespace": "twitch-embed", "eventName": "online", "params": {"x": 1}})
    }

    #[test]
    fn test_accepts_valid_message_from_bound_surface() {
        let surface = WindowId::new();
        let msg = accept(Some(surface), &InboundMessage::from_window(surface, valid())).unwrap();
        assert_eq!(msg.event_name, "online");
        assert_eq!(msg.params, json!({"x": 1}));
    }

    #[test]
    fn test_rejects_everything_when_unbound() {
        let surface = WindowId::new();
        assert_eq!(accept(None, &InboundMessage::from_window(surface, valid())), None);
    }

    #[test]
    fn test_rejects_other_windows_and_unknown_sources() {
        let surface = WindowId::new();
        let other = InboundMessage::from_window(WindowId::new(), valid());
        let anonymous = InboundMessage {
            source: None,
            data: valid(),
        };

        assert_eq!(accept(Some(surface), &other), None);
        assert_eq!(accept(Some(surface), &anonymous), None);
    }

    #[test]
    fn test_rejects_foreign_namespace_and_malformed_payloads() {
        let surface = WindowId::new();
        let foreign = json!({"namespace": "other", "eventName": "online", "params": null});
        let no_params = json!({"namespace": "twitch-embed", "eventName": "online"});

        for data in [foreign, no_params, json!("online"), json!(null)] {
            assert_eq!(accept(Some(surface), &InboundMessage::from_window(surface, data)), None);
        }
    }
}
