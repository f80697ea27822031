//! Mock key dispatcher for unit testing.
//!
//! # Why a mock dispatcher?
//!
//! The real dispatchers (`WindowsSendInputDispatcher`, `LinuxXTestDispatcher`,
//! `MacosCgDispatcher`) make OS API calls that:
//!
//! - Require a desktop session to run.
//! - Actually press keys on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! The `MockDispatcher` replaces all OS calls with in-memory recording.  Each
//! primitive pushes a [`RecordedEvent`] into a `Mutex<Vec<...>>` so tests can
//! assert exactly what was emitted and in what order — the ordering contract
//! (modifiers down, key down, key up, modifiers up in reverse) is the whole
//! point of the composed press operations.
//!
//! # Failure injection
//!
//! Construct with [`MockDispatcher::failing`] to make every primitive fail, or
//! [`MockDispatcher::failing_main_key`] to fail only the main-key primitives
//! while modifiers succeed — that is the shape needed to exercise the
//! release-on-failure path of `press_combination`.

use std::sync::Mutex;

use webdeck_core::{KeyToken, Modifier};

use crate::application::press_key::{DispatchError, KeyDispatcher};

/// One primitive call observed by the mock, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedEvent {
    KeyDown(KeyToken),
    KeyUp(KeyToken),
    ModifierDown(Modifier),
    ModifierUp(Modifier),
}

/// A dispatcher that records all calls without performing OS API calls.
#[derive(Default)]
pub struct MockDispatcher {
    /// Every primitive call, in the order it happened.
    pub events: Mutex<Vec<RecordedEvent>>,
    /// When `true`, every primitive returns `DispatchError::Platform`.
    pub fail_all: bool,
    /// When `true`, only `key_down` / `key_up` fail; modifier primitives
    /// still succeed and are recorded.
    pub fail_main_key: bool,
}

impl MockDispatcher {
    /// A dispatcher where every primitive succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher where every primitive fails.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// A dispatcher where main-key primitives fail but modifiers succeed.
    pub fn failing_main_key() -> Self {
        Self {
            fail_main_key: true,
            ..Self::default()
        }
    }

    fn record(&self, event: RecordedEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn mock_failure() -> DispatchError {
        DispatchError::Platform("mock failure".into())
    }
}

impl KeyDispatcher for MockDispatcher {
    fn key_down(&self, key: KeyToken) -> Result<(), DispatchError> {
        if self.fail_all || self.fail_main_key {
            return Err(Self::mock_failure());
        }
        self.record(RecordedEvent::KeyDown(key));
        Ok(())
    }

    fn key_up(&self, key: KeyToken) -> Result<(), DispatchError> {
        if self.fail_all || self.fail_main_key {
            return Err(Self::mock_failure());
        }
        self.record(RecordedEvent::KeyUp(key));
        Ok(())
    }

    fn modifier_down(&self, modifier: Modifier) -> Result<(), DispatchError> {
        if self.fail_all {
            return Err(Self::mock_failure());
        }
        self.record(RecordedEvent::ModifierDown(modifier));
        Ok(())
    }

    fn modifier_up(&self, modifier: Modifier) -> Result<(), DispatchError> {
        if self.fail_all {
            return Err(Self::mock_failure());
        }
        self.record(RecordedEvent::ModifierUp(modifier));
        Ok(())
    }
}
