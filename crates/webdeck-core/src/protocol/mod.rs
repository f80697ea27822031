//! The JSON real-time protocol spoken over the WebSocket channel.
//!
//! Browsers speak text/JSON naturally, so every frame on the real-time
//! channel is a JSON object with a `"type"` discriminant field.  The message
//! enums in [`messages`] are the single source of truth for that wire shape.

pub mod messages;

pub use messages::{ClientEvent, ServerEvent};
