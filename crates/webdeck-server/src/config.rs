//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It is built once at startup from CLI arguments (see `main.rs`) or from
//! defaults, then shared behind an `Arc` across all tasks.  No module reads
//! environment variables or global state after startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// All runtime configuration for the WebDeck server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address and port the REST gateway binds to.
    ///
    /// `0.0.0.0` accepts connections from any interface so phones on the LAN
    /// can reach the server; set `127.0.0.1` to accept local clients only.
    pub http_bind_addr: SocketAddr,

    /// The address and port the real-time WebSocket listener binds to.
    pub ws_bind_addr: SocketAddr,

    /// Path of the persisted layout document.
    ///
    /// Relative paths resolve against the working directory, matching the
    /// expectation that the server runs next to its `config.json`.
    pub layout_path: PathBuf,

    /// Upper bound on one key-dispatch call.
    ///
    /// Dispatch runs on the blocking pool; this bound keeps one stuck OS call
    /// from pinning a requester forever.  On timeout the requester gets a
    /// failed `keyResult` and the session continues.
    pub dispatch_timeout: Duration,
}

impl Default for ServerConfig {
    /// Returns a `ServerConfig` suitable for local development:
    ///
    /// | Field            | Default         |
    /// |------------------|-----------------|
    /// | http_bind_addr   | `0.0.0.0:8700`  |
    /// | ws_bind_addr     | `0.0.0.0:8701`  |
    /// | layout_path      | `config.json`   |
    /// | dispatch_timeout | 5 seconds       |
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address strings.
            http_bind_addr: "0.0.0.0:8700".parse().unwrap(),
            ws_bind_addr: "0.0.0.0:8701".parse().unwrap(),
            layout_path: PathBuf::from("config.json"),
            dispatch_timeout: Duration::from_secs(5),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
