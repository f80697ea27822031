//! Infrastructure layer for webdeck-server.
//!
//! Everything that touches the outside world lives here:
//!
//! - [`storage`] — the JSON layout file on disk.
//! - [`input`] — per-OS key-simulation backends and the startup factory.
//! - [`gateway`] — the REST router and the real-time WebSocket listener.
//!
//! The application layer only sees the `LayoutRepository` and `KeyDispatcher`
//! traits; these modules provide the implementations and the process plumbing
//! around them.

pub mod gateway;
pub mod input;
pub mod storage;

pub use gateway::realtime::RealtimeServer;
pub use gateway::rest::{router, GatewayState};
pub use input::select_dispatcher;
pub use storage::layout_store::LayoutStore;
