//! JSON file persistence for the layout document.
//!
//! The store owns the on-disk representation: one UTF-8 JSON file, pretty
//! printed so it stays human-editable, top-level key `modes`.  Non-ASCII
//! display text is written verbatim (serde_json does not escape it) and
//! array order is preserved exactly, so a load/save round trip is
//! structurally a no-op.
//!
//! # Fail-open loading
//!
//! `load_or_default` never returns an error.  A missing file, empty content,
//! unreadable bytes, or malformed JSON all log a warning and yield the
//! built-in default layout — the UI must always have something to render.
//! The broken file is left in place for the operator to inspect; the next
//! successful save overwrites it.
//!
//! # Atomic saves
//!
//! Saves go through `atomic-write-file` (write to a temporary sibling, then
//! rename over the target), so a concurrent reader never observes a
//! half-written document even if the process dies mid-save.

use std::io::Write;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use tracing::{debug, warn};
use webdeck_core::Layout;

use crate::application::persistence::{LayoutRepository, StorageError};

/// The on-disk layout store.
pub struct LayoutStore {
    path: PathBuf,
}

impl LayoutStore {
    /// Creates a store over the given file path.  The file itself is only
    /// touched by `load_or_default` / `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayoutRepository for LayoutStore {
    fn load_or_default(&self) -> Layout {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "layout file {} not found; using built-in defaults",
                    self.path.display()
                );
                return Layout::default_layout();
            }
            Err(e) => {
                warn!(
                    "failed to read layout file {}: {e}; using built-in defaults",
                    self.path.display()
                );
                return Layout::default_layout();
            }
        };

        if content.trim().is_empty() {
            warn!(
                "layout file {} is empty; using built-in defaults",
                self.path.display()
            );
            return Layout::default_layout();
        }

        match serde_json::from_str(&content) {
            Ok(layout) => layout,
            Err(e) => {
                warn!(
                    "failed to parse layout file {}: {e}; using built-in defaults",
                    self.path.display()
                );
                Layout::default_layout()
            }
        }
    }

    fn save(&self, layout: &Layout) -> Result<(), StorageError> {
        // Pretty output keeps the document hand-editable.
        let content = serde_json::to_string_pretty(layout)?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        // Write-then-rename: readers see either the old or the new document,
        // never a torn one.
        let mut file = AtomicWriteFile::options()
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(content.as_bytes()).map_err(io_err)?;
        file.commit().map_err(io_err)?;

        debug!("layout saved to {}", self.path.display());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
