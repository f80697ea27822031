//! webdeck-server library crate.
//!
//! This crate runs the WebDeck host service: it serves the layout document
//! over REST, keeps every connected browser in sync over a WebSocket channel,
//! and presses keys on the host machine when a client asks for it.
//!
//! # Architecture
//!
//! ```text
//! Browser (JSON over HTTP + WebSocket)
//!         ↕
//! [webdeck-server]
//!   ├── config            ServerConfig runtime settings
//!   ├── application/
//!   │     ├── sync_hub    connected-client registry + broadcast fan-out
//!   │     ├── press_key   KeyDispatcher trait + press use case
//!   │     └── persistence LayoutRepository trait + StorageError
//!   └── infrastructure/
//!         ├── storage/    JSON layout file persistence (fail-open load)
//!         ├── input/      per-OS key-simulation backends + mock/null
//!         └── gateway/    axum REST router + tokio-tungstenite WS listener
//! ```
//!
//! # Layer rules
//!
//! - `application` depends on `webdeck-core` and defines the traits
//!   (`LayoutRepository`, `KeyDispatcher`) that the infrastructure implements.
//! - `infrastructure` depends on everything plus `tokio`, `axum`, and
//!   `tungstenite`.
//!
//! This keeps the sync and dispatch logic testable without a real network,
//! a real file system, or a real keyboard.

/// Runtime configuration for the server process.
pub mod config;

/// Application layer: sync hub, key-press use case, persistence seam.
pub mod application;

/// Infrastructure layer: storage, input backends, and the two gateways.
pub mod infrastructure;

pub use config::ServerConfig;
