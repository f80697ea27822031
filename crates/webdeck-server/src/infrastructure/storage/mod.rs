//! Layout persistence: one human-editable JSON document on disk.

pub mod layout_store;

pub use layout_store::LayoutStore;
