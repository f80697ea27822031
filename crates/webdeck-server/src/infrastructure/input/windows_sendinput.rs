//! Windows key simulation via `SendInput`.
//!
//! `SendInput` with `INPUT_KEYBOARD` structures is the supported way to
//! synthesize keyboard input on modern Windows; events enter the same queue
//! as physical keystrokes and reach the foreground window.
//!
//! # Key translation
//!
//! Windows addresses keys by *virtual-key code* (VK).  Letters map to the
//! VK of their uppercase ASCII value, digits to their ASCII value, and the
//! function/editing keys to the `VK_*` constants below.  Characters outside
//! `[a-z0-9]` would need `VkKeyScanW` (layout-dependent) and are reported as
//! unmapped in this scaffold.
//!
//! # UAC boundary
//!
//! `SendInput` silently drops events aimed at a window of higher integrity
//! level (an elevated app under a non-elevated server).  There is no error
//! to surface; the press just does not land.

use webdeck_core::{KeyToken, Modifier, NamedKey};

use crate::application::press_key::{DispatchError, KeyDispatcher};

// ── Virtual-key constants ─────────────────────────────────────────────────────

const VK_BACK: u16 = 0x08;
const VK_TAB: u16 = 0x09;
const VK_RETURN: u16 = 0x0D;
const VK_SHIFT: u16 = 0x10;
const VK_CONTROL: u16 = 0x11;
const VK_MENU: u16 = 0x12; // Alt
const VK_ESCAPE: u16 = 0x1B;
const VK_SPACE: u16 = 0x20;
const VK_PRIOR: u16 = 0x21; // PageUp
const VK_NEXT: u16 = 0x22; // PageDown
const VK_END: u16 = 0x23;
const VK_HOME: u16 = 0x24;
const VK_LEFT: u16 = 0x25;
const VK_UP: u16 = 0x26;
const VK_RIGHT: u16 = 0x27;
const VK_DOWN: u16 = 0x28;
const VK_DELETE: u16 = 0x2E;
const VK_LWIN: u16 = 0x5B;
/// `VK_F1`; F2..F24 follow contiguously up to 0x87.
const VK_F1: u16 = 0x70;

/// `KEYEVENTF_KEYUP` flag for the release half of a keystroke.
const KEYEVENTF_KEYUP: u32 = 0x0002;

/// Returns the virtual-key code for a key token, or `None` when the token
/// needs layout-dependent translation this scaffold does not perform.
pub fn token_to_vk(key: KeyToken) -> Option<u16> {
    match key {
        KeyToken::Char(c @ 'a'..='z') => Some(c.to_ascii_uppercase() as u16),
        KeyToken::Char(c @ '0'..='9') => Some(c as u16),
        KeyToken::Char(_) => None,
        KeyToken::Function(n @ 1..=24) => Some(VK_F1 + u16::from(n) - 1),
        KeyToken::Function(_) => None,
        KeyToken::Named(named) => Some(match named {
            NamedKey::Enter => VK_RETURN,
            NamedKey::Space => VK_SPACE,
            NamedKey::Tab => VK_TAB,
            NamedKey::Esc => VK_ESCAPE,
            NamedKey::Backspace => VK_BACK,
            NamedKey::Delete => VK_DELETE,
            NamedKey::Up => VK_UP,
            NamedKey::Down => VK_DOWN,
            NamedKey::Left => VK_LEFT,
            NamedKey::Right => VK_RIGHT,
            NamedKey::Home => VK_HOME,
            NamedKey::End => VK_END,
            NamedKey::PageUp => VK_PRIOR,
            NamedKey::PageDown => VK_NEXT,
        }),
    }
}

/// Returns the generic (side-agnostic) virtual-key code of a modifier.
/// `Cmd` maps to the left Windows key, which has no generic VK.
pub fn modifier_to_vk(modifier: Modifier) -> u16 {
    match modifier {
        Modifier::Ctrl => VK_CONTROL,
        Modifier::Shift => VK_SHIFT,
        Modifier::Alt => VK_MENU,
        Modifier::Cmd => VK_LWIN,
    }
}

/// Windows `SendInput` key dispatcher.
///
/// Scaffold implementation: the VK translation path is real, the `SendInput`
/// FFI call is deferred.  The production implementation fills an
/// `INPUT { type: INPUT_KEYBOARD, ki: KEYBDINPUT { wVk, dwFlags, .. } }` and
/// checks that `SendInput(1, &input, size)` returns 1.
pub struct WindowsSendInputDispatcher {}

impl WindowsSendInputDispatcher {
    /// Creates the dispatcher.  `SendInput` needs no handle, so construction
    /// cannot fail, but the signature matches the other backends so the
    /// startup factory treats them uniformly.
    pub fn new() -> Result<Self, DispatchError> {
        Ok(Self {})
    }

    fn send_vk(&self, vk: u16, pressed: bool) -> Result<(), DispatchError> {
        // Production: SendInput with dwFlags = if pressed { 0 } else { KEYEVENTF_KEYUP };
        // a 0 return means the call was blocked and maps to DispatchError::Platform.
        let flags = if pressed { 0 } else { KEYEVENTF_KEYUP };
        let _ = (vk, flags);
        Ok(())
    }
}

impl KeyDispatcher for WindowsSendInputDispatcher {
    fn key_down(&self, key: KeyToken) -> Result<(), DispatchError> {
        let vk = token_to_vk(key).ok_or(DispatchError::UnmappedKey(key))?;
        self.send_vk(vk, true)
    }

    fn key_up(&self, key: KeyToken) -> Result<(), DispatchError> {
        let vk = token_to_vk(key).ok_or(DispatchError::UnmappedKey(key))?;
        self.send_vk(vk, false)
    }

    fn modifier_down(&self, modifier: Modifier) -> Result<(), DispatchError> {
        self.send_vk(modifier_to_vk(modifier), true)
    }

    fn modifier_up(&self, modifier: Modifier) -> Result<(), DispatchError> {
        self.send_vk(modifier_to_vk(modifier), false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_map_to_uppercase_ascii_vk() {
        assert_eq!(token_to_vk(KeyToken::Char('a')), Some(0x41));
        assert_eq!(token_to_vk(KeyToken::Char('g')), Some(0x47));
        assert_eq!(token_to_vk(KeyToken::Char('z')), Some(0x5A));
    }

    #[test]
    fn test_digits_map_to_their_ascii_vk() {
        assert_eq!(token_to_vk(KeyToken::Char('0')), Some(0x30));
        assert_eq!(token_to_vk(KeyToken::Char('9')), Some(0x39));
    }

    #[test]
    fn test_function_keys_are_contiguous_from_vk_f1() {
        assert_eq!(token_to_vk(KeyToken::Function(1)), Some(0x70));
        assert_eq!(token_to_vk(KeyToken::Function(13)), Some(0x7C));
        assert_eq!(token_to_vk(KeyToken::Function(24)), Some(0x87));
    }

    #[test]
    fn test_named_keys_map_to_vk_constants() {
        assert_eq!(token_to_vk(KeyToken::Named(NamedKey::Enter)), Some(0x0D));
        assert_eq!(token_to_vk(KeyToken::Named(NamedKey::PageUp)), Some(0x21));
        assert_eq!(token_to_vk(KeyToken::Named(NamedKey::Delete)), Some(0x2E));
    }

    #[test]
    fn test_layout_dependent_char_is_unmapped() {
        assert_eq!(token_to_vk(KeyToken::Char('é')), None);

        let dispatcher = WindowsSendInputDispatcher::new().unwrap();
        assert!(matches!(
            dispatcher.key_down(KeyToken::Char('é')),
            Err(DispatchError::UnmappedKey(_))
        ));
    }

    #[test]
    fn test_modifiers_map_to_generic_vks() {
        assert_eq!(modifier_to_vk(Modifier::Ctrl), 0x11);
        assert_eq!(modifier_to_vk(Modifier::Alt), 0x12);
        assert_eq!(modifier_to_vk(Modifier::Cmd), 0x5B);
    }
}
