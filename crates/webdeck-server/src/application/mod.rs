//! Application layer for webdeck-server.
//!
//! The application layer orchestrates the business logic: it knows *what* to
//! do, but delegates *how* to do it to the infrastructure layer through two
//! capability traits:
//!
//! - [`persistence::LayoutRepository`] — load/save the layout document.
//! - [`press_key::KeyDispatcher`] — synthesize key events on the host OS.
//!
//! # Responsibilities
//!
//! - Tracking connected real-time clients and fanning layout updates out to
//!   all of them ([`sync_hub::SyncHub`]).
//! - Turning a raw key string into dispatcher calls and a `keyResult`
//!   ([`press_key::PressKeyUseCase`]).
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or listening for connections (infrastructure)
//! - File I/O (infrastructure implements `LayoutRepository`)
//! - WebSocket framing (handled by tokio-tungstenite in the gateway)

pub mod persistence;
pub mod press_key;
pub mod sync_hub;

pub use persistence::{LayoutRepository, StorageError};
pub use press_key::{DispatchError, KeyDispatcher, PressKeyUseCase};
pub use sync_hub::{ConnectionId, SyncHub};
