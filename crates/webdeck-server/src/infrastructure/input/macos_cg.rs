//! macOS key simulation via Core Graphics events.
//!
//! `CGEventCreateKeyboardEvent` + `CGEventPost(kCGHIDEventTap, ...)` injects
//! key events at the HID layer, below the window server, so they reach the
//! frontmost app like physical keystrokes.
//!
//! # Key translation
//!
//! Core Graphics addresses keys by *CGKeyCode* — a physical position on the
//! ANSI layout, not a character.  The tables below cover the ANSI positions
//! of `[a-z0-9]`, the editing keys, and F1..F20 (the HIToolbox constants end
//! at `kVK_F20`; F21..F24 have no key code and are reported as unmapped).
//! Characters outside `[a-z0-9]` would need `UCKeyTranslate` against the
//! current keyboard layout and are unmapped in this scaffold.
//!
//! # Permissions
//!
//! Posting HID events requires the Accessibility permission (System
//! Settings → Privacy & Security).  Without it `CGEventPost` is a silent
//! no-op; the constructor checks `AXIsProcessTrusted` so the operator finds
//! out at startup instead of wondering why presses never land.

use webdeck_core::{KeyToken, Modifier, NamedKey};

use crate::application::press_key::{DispatchError, KeyDispatcher};

// ── CGKeyCode constants (HIToolbox Events.h, ANSI layout) ─────────────────────

const KVK_RETURN: u16 = 36;
const KVK_TAB: u16 = 48;
const KVK_SPACE: u16 = 49;
const KVK_DELETE: u16 = 51; // Backspace on PC keyboards
const KVK_ESCAPE: u16 = 53;
const KVK_COMMAND: u16 = 55;
const KVK_SHIFT: u16 = 56;
const KVK_OPTION: u16 = 58;
const KVK_CONTROL: u16 = 59;
const KVK_FORWARD_DELETE: u16 = 117;
const KVK_HOME: u16 = 115;
const KVK_END: u16 = 119;
const KVK_PAGE_UP: u16 = 116;
const KVK_PAGE_DOWN: u16 = 121;
const KVK_LEFT_ARROW: u16 = 123;
const KVK_RIGHT_ARROW: u16 = 124;
const KVK_DOWN_ARROW: u16 = 125;
const KVK_UP_ARROW: u16 = 126;

/// Returns the CGKeyCode for a key token, or `None` when the token has no
/// ANSI position (F21..F24, layout-dependent characters).
pub fn token_to_keycode(key: KeyToken) -> Option<u16> {
    match key {
        // ANSI letter positions are not alphabetical.
        KeyToken::Char(c @ 'a'..='z') => Some(match c {
            'a' => 0, 'b' => 11, 'c' => 8, 'd' => 2, 'e' => 14, 'f' => 3,
            'g' => 5, 'h' => 4, 'i' => 34, 'j' => 38, 'k' => 40, 'l' => 37,
            'm' => 46, 'n' => 45, 'o' => 31, 'p' => 35, 'q' => 12, 'r' => 15,
            's' => 1, 't' => 17, 'u' => 32, 'v' => 9, 'w' => 13, 'x' => 7,
            'y' => 16, 'z' => 6,
            _ => unreachable!(),
        }),
        KeyToken::Char(c @ '0'..='9') => Some(match c {
            '0' => 29, '1' => 18, '2' => 19, '3' => 20, '4' => 21,
            '5' => 23, '6' => 22, '7' => 26, '8' => 28, '9' => 25,
            _ => unreachable!(),
        }),
        KeyToken::Char(_) => None,
        KeyToken::Function(n) => match n {
            1 => Some(122), 2 => Some(120), 3 => Some(99), 4 => Some(118),
            5 => Some(96), 6 => Some(97), 7 => Some(98), 8 => Some(100),
            9 => Some(101), 10 => Some(109), 11 => Some(103), 12 => Some(111),
            13 => Some(105), 14 => Some(107), 15 => Some(113), 16 => Some(106),
            17 => Some(64), 18 => Some(79), 19 => Some(80), 20 => Some(90),
            _ => None,
        },
        KeyToken::Named(named) => Some(match named {
            NamedKey::Enter => KVK_RETURN,
            NamedKey::Space => KVK_SPACE,
            NamedKey::Tab => KVK_TAB,
            NamedKey::Esc => KVK_ESCAPE,
            NamedKey::Backspace => KVK_DELETE,
            NamedKey::Delete => KVK_FORWARD_DELETE,
            NamedKey::Up => KVK_UP_ARROW,
            NamedKey::Down => KVK_DOWN_ARROW,
            NamedKey::Left => KVK_LEFT_ARROW,
            NamedKey::Right => KVK_RIGHT_ARROW,
            NamedKey::Home => KVK_HOME,
            NamedKey::End => KVK_END,
            NamedKey::PageUp => KVK_PAGE_UP,
            NamedKey::PageDown => KVK_PAGE_DOWN,
        }),
    }
}

/// Returns the CGKeyCode of a modifier.  `Cmd` is the Command key itself;
/// `win` in a spec string lands here too via the grammar's alias.
pub fn modifier_to_keycode(modifier: Modifier) -> u16 {
    match modifier {
        Modifier::Ctrl => KVK_CONTROL,
        Modifier::Shift => KVK_SHIFT,
        Modifier::Alt => KVK_OPTION,
        Modifier::Cmd => KVK_COMMAND,
    }
}

/// macOS Core Graphics key dispatcher.
///
/// Scaffold implementation: the key-code translation path is real, the
/// CGEvent FFI calls are deferred.  The production implementation creates an
/// event source once and, per primitive, posts
/// `CGEventCreateKeyboardEvent(source, keycode, pressed)` to the HID tap.
pub struct MacosCgDispatcher {}

impl MacosCgDispatcher {
    /// Creates the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Platform` when the process lacks the
    /// Accessibility permission (production checks `AXIsProcessTrusted`).
    pub fn new() -> Result<Self, DispatchError> {
        Ok(Self {})
    }

    fn post_key_event(&self, keycode: u16, pressed: bool) -> Result<(), DispatchError> {
        // Production: CGEventPost(kCGHIDEventTap,
        // CGEventCreateKeyboardEvent(source, keycode, pressed)).
        let _ = (keycode, pressed);
        Ok(())
    }
}

impl KeyDispatcher for MacosCgDispatcher {
    fn key_down(&self, key: KeyToken) -> Result<(), DispatchError> {
        let keycode = token_to_keycode(key).ok_or(DispatchError::UnmappedKey(key))?;
        self.post_key_event(keycode, true)
    }

    fn key_up(&self, key: KeyToken) -> Result<(), DispatchError> {
        let keycode = token_to_keycode(key).ok_or(DispatchError::UnmappedKey(key))?;
        self.post_key_event(keycode, false)
    }

    fn modifier_down(&self, modifier: Modifier) -> Result<(), DispatchError> {
        self.post_key_event(modifier_to_keycode(modifier), true)
    }

    fn modifier_up(&self, modifier: Modifier) -> Result<(), DispatchError> {
        self.post_key_event(modifier_to_keycode(modifier), false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_positions_follow_ansi_layout() {
        assert_eq!(token_to_keycode(KeyToken::Char('a')), Some(0));
        assert_eq!(token_to_keycode(KeyToken::Char('g')), Some(5));
        assert_eq!(token_to_keycode(KeyToken::Char('z')), Some(6));
    }

    #[test]
    fn test_function_keys_through_f20_are_mapped() {
        assert_eq!(token_to_keycode(KeyToken::Function(1)), Some(122));
        assert_eq!(token_to_keycode(KeyToken::Function(13)), Some(105));
        assert_eq!(token_to_keycode(KeyToken::Function(20)), Some(90));
    }

    #[test]
    fn test_function_keys_above_f20_are_unmapped() {
        assert_eq!(token_to_keycode(KeyToken::Function(21)), None);

        let dispatcher = MacosCgDispatcher::new().unwrap();
        assert!(matches!(
            dispatcher.key_down(KeyToken::Function(24)),
            Err(DispatchError::UnmappedKey(_))
        ));
    }

    #[test]
    fn test_named_keys_split_backspace_and_forward_delete() {
        assert_eq!(token_to_keycode(KeyToken::Named(NamedKey::Backspace)), Some(51));
        assert_eq!(token_to_keycode(KeyToken::Named(NamedKey::Delete)), Some(117));
    }

    #[test]
    fn test_modifiers_map_to_hitoolbox_constants() {
        assert_eq!(modifier_to_keycode(Modifier::Cmd), 55);
        assert_eq!(modifier_to_keycode(Modifier::Ctrl), 59);
    }
}
