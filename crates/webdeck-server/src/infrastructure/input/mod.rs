//! Platform-specific key-simulation backends.
//!
//! The real backend for the build target is selected at compile time via
//! `#[cfg(target_os = ...)]`; [`select_dispatcher`] picks it at startup and
//! falls back to the [`null`] dispatcher when construction fails, so a
//! headless host still serves layouts.

pub mod mock;
pub mod null;

#[cfg(target_os = "linux")]
pub mod linux_xtest;

#[cfg(target_os = "macos")]
pub mod macos_cg;

#[cfg(target_os = "windows")]
pub mod windows_sendinput;

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::press_key::KeyDispatcher;

/// Selects the key-simulation backend for this host.
///
/// Tries the platform backend first; any construction failure (no X display,
/// missing Accessibility permission) is logged and the null dispatcher takes
/// its place.  Callers never branch on which backend they got — a missing
/// backend only shows up as `keyResult{success:false}` on presses.
pub fn select_dispatcher() -> Arc<dyn KeyDispatcher> {
    match build_platform_dispatcher() {
        Ok(dispatcher) => {
            info!("key-simulation backend ready ({})", std::env::consts::OS);
            dispatcher
        }
        Err(reason) => {
            warn!("no key-simulation backend: {reason}; key presses will be rejected");
            Arc::new(null::NullDispatcher)
        }
    }
}

#[cfg(target_os = "linux")]
fn build_platform_dispatcher() -> Result<Arc<dyn KeyDispatcher>, String> {
    linux_xtest::LinuxXTestDispatcher::new()
        .map(|d| Arc::new(d) as Arc<dyn KeyDispatcher>)
        .map_err(|e| e.to_string())
}

#[cfg(target_os = "macos")]
fn build_platform_dispatcher() -> Result<Arc<dyn KeyDispatcher>, String> {
    macos_cg::MacosCgDispatcher::new()
        .map(|d| Arc::new(d) as Arc<dyn KeyDispatcher>)
        .map_err(|e| e.to_string())
}

#[cfg(target_os = "windows")]
fn build_platform_dispatcher() -> Result<Arc<dyn KeyDispatcher>, String> {
    windows_sendinput::WindowsSendInputDispatcher::new()
        .map(|d| Arc::new(d) as Arc<dyn KeyDispatcher>)
        .map_err(|e| e.to_string())
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn build_platform_dispatcher() -> Result<Arc<dyn KeyDispatcher>, String> {
    Err(format!("unsupported platform '{}'", std::env::consts::OS))
}
