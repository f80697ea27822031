//! Fallback dispatcher for hosts with no usable key-simulation backend.
//!
//! When the startup factory cannot construct a platform dispatcher (headless
//! host, unsupported OS), the server still runs: layout editing and
//! synchronization keep working, and every `pressKey` request comes back as a
//! `keyResult{success:false}` naming the missing capability instead of a
//! crash or a silent no-op.

use webdeck_core::{KeyToken, Modifier};

use crate::application::press_key::{DispatchError, KeyDispatcher};

/// Dispatcher that refuses every primitive with [`DispatchError::NoBackend`].
pub struct NullDispatcher;

impl KeyDispatcher for NullDispatcher {
    fn key_down(&self, _key: KeyToken) -> Result<(), DispatchError> {
        Err(DispatchError::NoBackend)
    }

    fn key_up(&self, _key: KeyToken) -> Result<(), DispatchError> {
        Err(DispatchError::NoBackend)
    }

    fn modifier_down(&self, _modifier: Modifier) -> Result<(), DispatchError> {
        Err(DispatchError::NoBackend)
    }

    fn modifier_up(&self, _modifier: Modifier) -> Result<(), DispatchError> {
        Err(DispatchError::NoBackend)
    }
}
