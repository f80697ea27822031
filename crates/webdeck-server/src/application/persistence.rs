//! The persistence seam: `LayoutRepository` and `StorageError`.
//!
//! The sync hub and the REST gateway talk to storage through this trait so
//! the application logic can be tested against an in-memory fake.  The real
//! JSON-file implementation lives in `infrastructure::storage`.

use std::path::PathBuf;

use thiserror::Error;
use webdeck_core::Layout;

/// Error type for layout persistence operations.
///
/// Only `save` surfaces this error: loading is fail-open and falls back to
/// the built-in default layout instead (the UI must always have something to
/// render).
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing layout at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The layout could not be serialized to JSON.
    #[error("failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load/save access to the persisted layout document.
///
/// The contract deliberately mirrors the fail-open policy of the system:
///
/// - [`load_or_default`](Self::load_or_default) never fails — a missing,
///   empty, or corrupt document yields [`Layout::default_layout`] after a
///   logged warning.
/// - [`save`](Self::save) replaces the whole document; there is no partial
///   update.  Failure is reported to the caller and never crashes the server.
pub trait LayoutRepository: Send + Sync {
    /// Returns the persisted layout, or the built-in default when the
    /// document is missing or unreadable.
    fn load_or_default(&self) -> Layout;

    /// Replaces the persisted layout with `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on I/O or serialization failure.
    fn save(&self, layout: &Layout) -> Result<(), StorageError>;
}
