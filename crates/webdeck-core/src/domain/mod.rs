//! Domain types for WebDeck.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: no file I/O, no sockets, no async.  Everything here can be
//! constructed and tested on any platform without external setup.
//!
//! The two domain concepts are:
//!
//! - [`layout::Layout`] — the persisted button/mode configuration document
//!   that every client renders and any client may replace wholesale.
//! - [`keyspec::KeySpec`] — the parsed form of a key specification string
//!   (`"g"`, `"F13"`, `"ctrl+c"`), separating modifier keys from the main key.

pub mod keyspec;
pub mod layout;
