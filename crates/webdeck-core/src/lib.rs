//! # webdeck-core
//!
//! Shared library for WebDeck containing the layout document model, the key
//! specification grammar, and the JSON real-time protocol types.
//!
//! WebDeck turns a phone or a second PC into a remote keypad for a host
//! machine: a browser shows a grid of configurable buttons, and tapping one
//! triggers a keystroke on the host.  The button layout is a shared document
//! that any connected client can edit; edits are broadcast live to every
//! viewer so all screens converge on the same state.
//!
//! This crate is the shared foundation used by the server (and by any future
//! native client).  It defines:
//!
//! - **`domain`** – Pure business types with no I/O.  The `Layout` document
//!   (modes and buttons) and the `KeySpec` grammar that turns strings like
//!   `"ctrl+c"` into a structured modifier chord.
//!
//! - **`protocol`** – The JSON message "language" spoken over the real-time
//!   channel between browsers and the server.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `webdeck_core::Layout` instead of `webdeck_core::domain::layout::Layout`.
pub use domain::keyspec::{KeySpec, KeySpecError, KeyToken, Modifier, NamedKey};
pub use domain::layout::{Button, Layout, LayoutError, Mode};
pub use protocol::messages::{ClientEvent, ServerEvent};
