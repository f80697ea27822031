//! The layout document: modes, buttons, defaults, and validation.
//!
//! A [`Layout`] is the single persisted document of the whole system.  It is
//! an ordered list of [`Mode`]s (pages of buttons); each mode holds an ordered
//! list of [`Button`]s.  Order is display order and must survive every
//! load/save round trip, which is why both collections are plain `Vec`s.
//!
//! # Whole-document replacement
//!
//! The layout is always replaced as a unit: clients POST a complete new
//! document and the server persists it verbatim.  There is no per-field
//! patching and no merge — when two clients write concurrently, the last
//! accepted write wins.
//!
//! # The `label` alias
//!
//! The PC editor client historically sent the button display name under a
//! `label` field while the mobile client used `name`.  The `name` field
//! therefore accepts `label` as a deserialization alias; serialization always
//! emits the canonical `name`, so the shim disappears at the persistence
//! boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by [`Layout::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Two modes share the same `id`.
    #[error("duplicate mode id: {0:?}")]
    DuplicateModeId(String),

    /// A button has an empty key specification.
    #[error("button {button:?} in mode {mode:?} has an empty key")]
    EmptyKey { mode: String, button: String },
}

/// One clickable action: display name, key specification, color hint.
///
/// The `key` string is forwarded to the key dispatcher unchanged; anything
/// other than emptiness is validated at dispatch time, not at save time.
/// The `color` is an opaque UI hint the server never interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Display label.  Accepts `label` as an incoming alias (see module docs).
    #[serde(alias = "label")]
    pub name: String,
    /// Key specification, e.g. `"g"`, `"F13"`, `"ctrl+c"`.
    pub key: String,
    /// Opaque UI color hint, e.g. `"blue"`.
    pub color: String,
}

/// A named, ordered group of buttons (one page of the keypad).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// Identifier, unique within the layout.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Buttons in display order.
    pub buttons: Vec<Button>,
}

/// The full persisted button/mode configuration document.
///
/// The JSON form has a single top-level key, `modes`:
///
/// ```json
/// {"modes":[{"id":"dcs_basic","name":"...","buttons":[...]}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Modes in display order.
    pub modes: Vec<Mode>,
}

impl Layout {
    /// Returns the built-in default layout.
    ///
    /// This is a pure function — the default is a value, not hidden process
    /// state.  It is used whenever the persisted document is missing or
    /// unreadable, so the UI always has something to render.
    pub fn default_layout() -> Self {
        Self {
            modes: vec![
                Mode {
                    id: "dcs_basic".to_string(),
                    name: "DCS基本操作".to_string(),
                    buttons: vec![
                        Button {
                            name: "ギア".to_string(),
                            key: "g".to_string(),
                            color: "blue".to_string(),
                        },
                        Button {
                            name: "フラップ".to_string(),
                            key: "f".to_string(),
                            color: "blue".to_string(),
                        },
                        Button {
                            name: "エアブレーキ".to_string(),
                            key: "b".to_string(),
                            color: "orange".to_string(),
                        },
                        Button {
                            name: "ライト".to_string(),
                            key: "l".to_string(),
                            color: "green".to_string(),
                        },
                    ],
                },
                Mode {
                    id: "obs_control".to_string(),
                    name: "OBS制御".to_string(),
                    buttons: vec![
                        Button {
                            name: "録画開始/停止".to_string(),
                            key: "F13".to_string(),
                            color: "red".to_string(),
                        },
                        Button {
                            name: "配信開始/停止".to_string(),
                            key: "F14".to_string(),
                            color: "red".to_string(),
                        },
                        Button {
                            name: "シーン1".to_string(),
                            key: "F15".to_string(),
                            color: "blue".to_string(),
                        },
                        Button {
                            name: "シーン2".to_string(),
                            key: "F16".to_string(),
                            color: "blue".to_string(),
                        },
                    ],
                },
            ],
        }
    }

    /// Checks the layout invariants: unique mode ids, non-empty button keys.
    ///
    /// Key *content* is deliberately not validated — any non-empty string is
    /// accepted and failures surface at dispatch time.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] encountered, in document order.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut seen = std::collections::HashSet::new();
        for mode in &self.modes {
            if !seen.insert(mode.id.as_str()) {
                return Err(LayoutError::DuplicateModeId(mode.id.clone()));
            }
            for button in &mode.buttons {
                if button.key.is_empty() {
                    return Err(LayoutError::EmptyKey {
                        mode: mode.id.clone(),
                        button: button.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
