//! PressKeyUseCase: turns a raw key specification into host key events.
//!
//! This use case sits at the application layer and delegates to a
//! [`KeyDispatcher`] trait object for OS-level event synthesis.  The
//! platform-specific implementations are in `infrastructure::input`; they are
//! selected once at startup and call sites never branch on backend identity.

use std::sync::Arc;

use thiserror::Error;
use webdeck_core::{KeySpec, KeySpecError, KeyToken, Modifier};

/// Error type for key dispatch operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The key specification string did not parse.
    #[error(transparent)]
    Spec(#[from] KeySpecError),

    /// No key-simulation capability is available on this host.
    #[error("no key-simulation backend available")]
    NoBackend,

    /// The key parsed but has no mapping on this platform.
    #[error("key '{0}' is not mapped on this platform")]
    UnmappedKey(KeyToken),

    /// The OS rejected the synthesized event.
    #[error("platform error: {0}")]
    Platform(String),

    /// Dispatch did not complete within the configured bound.
    #[error("key dispatch timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Platform-agnostic key-simulation capability.
///
/// Implementations provide the four event primitives; the two press
/// operations are composed here so every backend honours the same ordering
/// contract: modifiers down in listed order, main key down then up, modifiers
/// up in reverse acquisition order.
pub trait KeyDispatcher: Send + Sync {
    /// Synthesizes a key-down event for the main key.
    fn key_down(&self, key: KeyToken) -> Result<(), DispatchError>;

    /// Synthesizes a key-up event for the main key.
    fn key_up(&self, key: KeyToken) -> Result<(), DispatchError>;

    /// Synthesizes a key-down event for a modifier.
    fn modifier_down(&self, modifier: Modifier) -> Result<(), DispatchError>;

    /// Synthesizes a key-up event for a modifier.
    fn modifier_up(&self, modifier: Modifier) -> Result<(), DispatchError>;

    /// Presses and releases a single key (no modifiers).
    ///
    /// # Errors
    ///
    /// Returns the first failing primitive's [`DispatchError`].
    fn press_key(&self, key: KeyToken) -> Result<(), DispatchError> {
        self.key_down(key)?;
        self.key_up(key)
    }

    /// Presses a modifier combination around the main key.
    ///
    /// Acquired modifiers are always released, in reverse order, even when
    /// the main key press fails part-way — a stuck Ctrl on the host would be
    /// worse than the failed press itself.
    ///
    /// # Errors
    ///
    /// Returns the first failing primitive's [`DispatchError`].
    fn press_combination(&self, spec: &KeySpec) -> Result<(), DispatchError> {
        let mut held: Vec<Modifier> = Vec::with_capacity(spec.modifiers.len());
        for &modifier in &spec.modifiers {
            if let Err(e) = self.modifier_down(modifier) {
                for &acquired in held.iter().rev() {
                    let _ = self.modifier_up(acquired);
                }
                return Err(e);
            }
            held.push(modifier);
        }

        let result = self.press_key(spec.key);

        let mut release_result = Ok(());
        for &modifier in held.iter().rev() {
            if let Err(e) = self.modifier_up(modifier) {
                // Keep releasing the rest; report the first release failure
                // only if the main press itself succeeded.
                if release_result.is_ok() {
                    release_result = Err(e);
                }
            }
        }

        result.and(release_result)
    }
}

/// The Press Key use case.
///
/// Parses the raw specification from a `pressKey` request and invokes the
/// selected dispatcher.  Cloneable so the hub can move it onto the blocking
/// pool per request.
#[derive(Clone)]
pub struct PressKeyUseCase {
    dispatcher: Arc<dyn KeyDispatcher>,
}

impl PressKeyUseCase {
    /// Creates a new use case with the given dispatcher.
    pub fn new(dispatcher: Arc<dyn KeyDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Parses `raw` and presses it on the host.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Spec`] for grammar errors and the backend's
    /// error for everything past parsing.  Nothing here panics or terminates
    /// the server — every failure becomes a `keyResult{success:false}`.
    pub fn press(&self, raw: &str) -> Result<(), DispatchError> {
        let spec = KeySpec::parse(raw)?;
        if spec.modifiers.is_empty() {
            self.dispatcher.press_key(spec.key)
        } else {
            self.dispatcher.press_combination(&spec)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input::mock::{MockDispatcher, RecordedEvent};
    use webdeck_core::NamedKey;

    fn make_use_case() -> (PressKeyUseCase, Arc<MockDispatcher>) {
        let dispatcher = Arc::new(MockDispatcher::new());
        let uc = PressKeyUseCase::new(Arc::clone(&dispatcher) as Arc<dyn KeyDispatcher>);
        (uc, dispatcher)
    }

    #[test]
    fn test_press_single_key_emits_down_then_up() {
        // Arrange
        let (uc, dispatcher) = make_use_case();

        // Act
        uc.press("g").unwrap();

        // Assert
        assert_eq!(
            *dispatcher.events.lock().unwrap(),
            vec![
                RecordedEvent::KeyDown(KeyToken::Char('g')),
                RecordedEvent::KeyUp(KeyToken::Char('g')),
            ]
        );
    }

    #[test]
    fn test_press_combination_orders_modifiers_around_main_key() {
        // Arrange
        let (uc, dispatcher) = make_use_case();

        // Act
        uc.press("ctrl+shift+c").unwrap();

        // Assert: down in listed order, up in reverse acquisition order
        assert_eq!(
            *dispatcher.events.lock().unwrap(),
            vec![
                RecordedEvent::ModifierDown(Modifier::Ctrl),
                RecordedEvent::ModifierDown(Modifier::Shift),
                RecordedEvent::KeyDown(KeyToken::Char('c')),
                RecordedEvent::KeyUp(KeyToken::Char('c')),
                RecordedEvent::ModifierUp(Modifier::Shift),
                RecordedEvent::ModifierUp(Modifier::Ctrl),
            ]
        );
    }

    #[test]
    fn test_press_named_key() {
        let (uc, dispatcher) = make_use_case();
        uc.press("enter").unwrap();
        assert_eq!(
            dispatcher.events.lock().unwrap()[0],
            RecordedEvent::KeyDown(KeyToken::Named(NamedKey::Enter))
        );
    }

    #[test]
    fn test_press_function_key_spec_from_default_layout() {
        // "F13" is the default OBS record button
        let (uc, dispatcher) = make_use_case();
        uc.press("F13").unwrap();
        assert_eq!(
            dispatcher.events.lock().unwrap()[0],
            RecordedEvent::KeyDown(KeyToken::Function(13))
        );
    }

    #[test]
    fn test_press_unparseable_spec_returns_spec_error_without_touching_backend() {
        // Arrange
        let (uc, dispatcher) = make_use_case();

        // Act
        let result = uc.press("not+a+key");

        // Assert
        assert!(matches!(result, Err(DispatchError::Spec(_))));
        assert!(dispatcher.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_press_empty_spec_is_a_spec_error() {
        let (uc, _) = make_use_case();
        assert!(matches!(
            uc.press(""),
            Err(DispatchError::Spec(KeySpecError::Empty))
        ));
    }

    #[test]
    fn test_backend_failure_surfaces_as_error() {
        // Arrange
        let dispatcher = Arc::new(MockDispatcher::failing());
        let uc = PressKeyUseCase::new(Arc::clone(&dispatcher) as Arc<dyn KeyDispatcher>);

        // Act
        let result = uc.press("g");

        // Assert
        assert!(matches!(result, Err(DispatchError::Platform(_))));
    }

    #[test]
    fn test_combination_releases_acquired_modifiers_when_main_key_fails() {
        // Arrange: main-key primitives fail, modifier primitives succeed
        let dispatcher = Arc::new(MockDispatcher::failing_main_key());
        let uc = PressKeyUseCase::new(Arc::clone(&dispatcher) as Arc<dyn KeyDispatcher>);

        // Act
        let result = uc.press("ctrl+alt+g");

        // Assert: error reported, but both modifiers were released in reverse
        assert!(result.is_err());
        assert_eq!(
            *dispatcher.events.lock().unwrap(),
            vec![
                RecordedEvent::ModifierDown(Modifier::Ctrl),
                RecordedEvent::ModifierDown(Modifier::Alt),
                RecordedEvent::ModifierUp(Modifier::Alt),
                RecordedEvent::ModifierUp(Modifier::Ctrl),
            ]
        );
    }
}
