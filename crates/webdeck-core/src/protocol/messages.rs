//! JSON message types for the real-time channel.
//!
//! # Message flow
//!
//! ```text
//! Client → Server:  JSON text frame  →  ClientEvent
//! Server → Client:  ServerEvent      →  JSON text frame
//! ```
//!
//! # JSON discriminant
//!
//! Every message is a JSON object with a `"type"` field naming the event; all
//! other fields are flattened into the same object:
//!
//! ```json
//! {"type":"pressKey","key":"ctrl+c"}
//! {"type":"keyResult","success":true,"key":"ctrl+c","message":"key 'ctrl+c' pressed"}
//! {"type":"layoutUpdated","modes":[...]}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles this automatically.
//!
//! # Why two enums?
//!
//! The directions carry different information: clients send *requests*
//! (`requestLayout`, `pressKey`), the server sends *state and results*
//! (`layoutUpdated`, `keyResult`, `error`).  Separate enums make it a
//! compile-time error to send a server-only event from a client and vice
//! versa.

use serde::{Deserialize, Serialize};

use crate::domain::layout::Layout;

// ── Client → Server events ────────────────────────────────────────────────────

/// All events a client can send over the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Asks the server to push the current layout back to this client only.
    ///
    /// A reconnecting client sends this to recover state it may have missed
    /// while disconnected; the server never queues missed broadcasts.
    RequestLayout,

    /// Asks the server to press a key on the host machine.
    ///
    /// The `key` string is a key specification (`"g"`, `"F13"`, `"ctrl+c"`).
    /// It is forwarded to the dispatcher unchanged; a bad specification
    /// produces a failed [`ServerEvent::KeyResult`], not a transport error.
    PressKey { key: String },
}

// ── Server → Client events ────────────────────────────────────────────────────

/// All events the server can send over the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The full current layout.
    ///
    /// Sent (a) immediately on connect, (b) in reply to `requestLayout`, and
    /// (c) to **every** connected client after a successful config write —
    /// including the client that made the edit, so all viewers converge
    /// through one code path.
    LayoutUpdated {
        /// The layout document, flattened so the wire shape is
        /// `{"type":"layoutUpdated","modes":[...]}`.
        #[serde(flatten)]
        layout: Layout,
    },

    /// The outcome of a `pressKey` request, delivered to the requester only.
    ///
    /// A key press is an action, not shared state, so the result is never
    /// broadcast.
    KeyResult {
        /// Whether the key was dispatched successfully.
        success: bool,
        /// The key specification from the request, echoed back.
        key: String,
        /// Human-readable outcome description.
        message: String,
    },

    /// Reply to a malformed client frame (e.g. unparseable JSON or a missing
    /// `key` field).  The session stays open; the client may simply retry.
    Error { message: String },
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::Layout;

    // ── ClientEvent ───────────────────────────────────────────────────────────

    #[test]
    fn test_request_layout_wire_shape() {
        // Arrange / Act
        let json = serde_json::to_string(&ClientEvent::RequestLayout).unwrap();

        // Assert: exact discriminant spelling is part of the protocol
        assert_eq!(json, r#"{"type":"requestLayout"}"#);
    }

    #[test]
    fn test_press_key_wire_shape() {
        let json = serde_json::to_string(&ClientEvent::PressKey {
            key: "ctrl+c".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"pressKey","key":"ctrl+c"}"#);
    }

    #[test]
    fn test_press_key_deserializes_from_client_json() {
        // Arrange: as a browser would send it
        let json = r#"{"type":"pressKey","key":"F13"}"#;

        // Act
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(
            event,
            ClientEvent::PressKey {
                key: "F13".to_string()
            }
        );
    }

    #[test]
    fn test_press_key_missing_key_field_is_an_error() {
        // A pressKey without a `key` payload must fail deserialization; the
        // session handler turns this into a client-visible error event.
        let result: Result<ClientEvent, _> = serde_json::from_str(r#"{"type":"pressKey"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_event_type_is_an_error() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"type":"selfDestruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_type_field_is_an_error() {
        let result: Result<ClientEvent, _> = serde_json::from_str(r#"{"key":"g"}"#);
        assert!(result.is_err());
    }

    // ── ServerEvent ───────────────────────────────────────────────────────────

    #[test]
    fn test_layout_updated_flattens_modes_to_top_level() {
        // Arrange
        let event = ServerEvent::LayoutUpdated {
            layout: Layout::default_layout(),
        };

        // Act
        let json = serde_json::to_string(&event).unwrap();

        // Assert: layout fields sit next to "type", not nested under "layout"
        assert!(json.contains(r#""type":"layoutUpdated""#));
        assert!(json.contains(r#""modes":["#));
        assert!(!json.contains(r#""layout""#));
    }

    #[test]
    fn test_layout_updated_round_trips() {
        let original = ServerEvent::LayoutUpdated {
            layout: Layout::default_layout(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let decoded: ServerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_key_result_wire_shape() {
        let event = ServerEvent::KeyResult {
            success: true,
            key: "g".to_string(),
            message: "key 'g' pressed".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"keyResult","success":true,"key":"g","message":"key 'g' pressed"}"#
        );
    }

    #[test]
    fn test_key_result_failure_round_trips() {
        let original = ServerEvent::KeyResult {
            success: false,
            key: "banana".to_string(),
            message: "unknown key: \"banana\"".to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let decoded: ServerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_error_event_wire_shape() {
        let event = ServerEvent::Error {
            message: "invalid message".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"error","message":"invalid message"}"#);
    }
}
