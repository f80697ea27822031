//! The key specification grammar.
//!
//! A key specification is the string stored in a button's `key` field.  It is
//! either a single token (`"g"`, `"F13"`, `"enter"`) or a `+`-joined
//! combination (`"ctrl+c"`, `"shift+alt+f1"`) where every token but the last
//! names a modifier and the last token names the main key.
//!
//! Parsing is deliberately *not* done at save time: the layout accepts any
//! non-empty string and a bad specification only fails when the button is
//! actually pressed.  [`KeySpec::parse`] therefore runs on the dispatch path
//! and its errors are reported back to the single requesting client.
//!
//! # Grammar
//!
//! ```text
//! spec      := token ( "+" token )*
//! modifier  := "ctrl" | "shift" | "alt" | "cmd" | "win"      (win == cmd)
//! main key  := <single character>                            (letters case-insensitive)
//!            | "f1".."f24"
//!            | "enter" | "space" | "tab" | "esc" | "backspace" | "delete"
//!            | "up" | "down" | "left" | "right"
//!            | "home" | "end" | "page_up" | "page_down"
//! ```
//!
//! Tokens are trimmed, so `"ctrl + c"` parses the same as `"ctrl+c"`.

use std::fmt;

use thiserror::Error;

/// Errors produced by [`KeySpec::parse`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeySpecError {
    /// The specification string is empty or whitespace-only.
    #[error("empty key specification")]
    Empty,

    /// A `+`-separated token is empty, e.g. `"ctrl++c"`.
    #[error("empty token in key specification")]
    EmptyToken,

    /// A token before the last is not a recognised modifier.
    #[error("unknown modifier: {0:?}")]
    UnknownModifier(String),

    /// The final token is not a recognised key.
    #[error("unknown key: {0:?}")]
    UnknownKey(String),

    /// The final token names a modifier; a chord needs a main key.
    #[error("{0:?} is a modifier, not a main key")]
    ModifierAsKey(String),
}

/// A modifier key held down around the main key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    /// Command / Windows / Super key.  The tokens `cmd` and `win` both map here.
    Cmd,
}

/// A non-printable key addressed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Space,
    Tab,
    Esc,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

/// The main key of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    /// A printable character key.  Letters are stored lowercase; the backend
    /// synthesises the base key and leaves shifting to explicit modifiers.
    Char(char),
    /// A function key, `1..=24`.
    Function(u8),
    /// A named non-printable key.
    Named(NamedKey),
}

/// A fully parsed key specification: zero or more modifiers plus one main key.
///
/// The dispatch contract is positional: modifiers are pressed in `modifiers`
/// order, the main key is pressed and released, then the modifiers are
/// released in reverse acquisition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub modifiers: Vec<Modifier>,
    pub key: KeyToken,
}

impl KeySpec {
    /// Parses a raw key specification string.
    ///
    /// # Errors
    ///
    /// Returns a [`KeySpecError`] describing the first offending token.
    pub fn parse(raw: &str) -> Result<Self, KeySpecError> {
        if raw.trim().is_empty() {
            return Err(KeySpecError::Empty);
        }

        let tokens: Vec<&str> = raw.split('+').map(str::trim).collect();
        let (main, mods) = tokens.split_last().ok_or(KeySpecError::Empty)?;

        let mut modifiers = Vec::with_capacity(mods.len());
        for token in mods {
            if token.is_empty() {
                return Err(KeySpecError::EmptyToken);
            }
            let modifier = parse_modifier(token)
                .ok_or_else(|| KeySpecError::UnknownModifier((*token).to_string()))?;
            modifiers.push(modifier);
        }

        if main.is_empty() {
            return Err(KeySpecError::EmptyToken);
        }
        if parse_modifier(main).is_some() {
            return Err(KeySpecError::ModifierAsKey((*main).to_string()));
        }

        Ok(Self {
            modifiers,
            key: parse_key_token(main)?,
        })
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{modifier}+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Shift => "shift",
            Modifier::Alt => "alt",
            Modifier::Cmd => "cmd",
        };
        f.write_str(name)
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Char(c) => write!(f, "{c}"),
            KeyToken::Function(n) => write!(f, "f{n}"),
            KeyToken::Named(named) => write!(f, "{named}"),
        }
    }
}

impl fmt::Display for NamedKey {
    /// Formats as the grammar token, so displayed keys parse back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamedKey::Enter => "enter",
            NamedKey::Space => "space",
            NamedKey::Tab => "tab",
            NamedKey::Esc => "esc",
            NamedKey::Backspace => "backspace",
            NamedKey::Delete => "delete",
            NamedKey::Up => "up",
            NamedKey::Down => "down",
            NamedKey::Left => "left",
            NamedKey::Right => "right",
            NamedKey::Home => "home",
            NamedKey::End => "end",
            NamedKey::PageUp => "page_up",
            NamedKey::PageDown => "page_down",
        };
        f.write_str(name)
    }
}

/// Matches a modifier token, case-insensitively.  `win` is an alias for `cmd`.
fn parse_modifier(token: &str) -> Option<Modifier> {
    match token.to_ascii_lowercase().as_str() {
        "ctrl" => Some(Modifier::Ctrl),
        "shift" => Some(Modifier::Shift),
        "alt" => Some(Modifier::Alt),
        "cmd" | "win" => Some(Modifier::Cmd),
        _ => None,
    }
}

/// Matches a main-key token: single character, function key, or named key.
fn parse_key_token(token: &str) -> Result<KeyToken, KeySpecError> {
    // Single character: letters are normalised to lowercase so "G" and "g"
    // name the same key.
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyToken::Char(c.to_ascii_lowercase()));
    }

    let lower = token.to_ascii_lowercase();

    // Function keys f1..f24.
    if let Some(digits) = lower.strip_prefix('f') {
        if let Ok(n) = digits.parse::<u8>() {
            if (1..=24).contains(&n) {
                return Ok(KeyToken::Function(n));
            }
        }
    }

    let named = match lower.as_str() {
        "enter" => NamedKey::Enter,
        "space" => NamedKey::Space,
        "tab" => NamedKey::Tab,
        "esc" => NamedKey::Esc,
        "backspace" => NamedKey::Backspace,
        "delete" => NamedKey::Delete,
        "up" => NamedKey::Up,
        "down" => NamedKey::Down,
        "left" => NamedKey::Left,
        "right" => NamedKey::Right,
        "home" => NamedKey::Home,
        "end" => NamedKey::End,
        "page_up" => NamedKey::PageUp,
        "page_down" => NamedKey::PageDown,
        _ => return Err(KeySpecError::UnknownKey(token.to_string())),
    };
    Ok(KeyToken::Named(named))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
