//! Single-file JSON document store.
//!
//! # Storage layout
//!
//! ```text
//! <db_path>          (the document, mode 0600)
//! <db_path>.tmp      (transient, only between write and rename)
//! <db_path>.corrupt  (last unparseable document, kept on self-heal)
//! ```
//!
//! Callers never patch single fields: read the whole [`Document`], mutate it
//! in memory, then [`DocumentStore::save`] it back.

use std::path::{Path, PathBuf};

use crate::error::{io_err, StoreError};
use crate::types::Document;

/// Owns the location of the persisted [`Document`].
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, falling back to [`Document::default`].
    ///
    /// Never fails. An absent or malformed file yields the default document,
    /// which is written back immediately; a malformed file is first copied to
    /// `<path>.corrupt`. A readable document is re-saved so that defaulted
    /// fields and legacy keys are normalized on disk.
    pub fn load(&self) -> Document {
        let document = match self.read() {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "no document yet, bootstrapping defaults");
                Document::default()
            }
            Err(StoreError::Parse { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "malformed document, resetting to defaults");
                self.keep_corrupt_copy();
                Document::default()
            }
            Err(err) => {
                // Unreadable but present: do not overwrite what we could not read.
                tracing::error!(error = %err, "document unreadable, continuing with defaults in memory");
                return Document::default();
            }
        };

        if let Err(err) = self.save(&document) {
            tracing::warn!(error = %err, "failed to persist document after load");
        }
        document
    }

    /// Read the document strictly. `Ok(None)` when the file does not exist.
    pub fn read(&self) -> Result<Option<Document>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_err(&self.path, err)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Atomically replace the persisted document.
    ///
    /// Write flow: serialize → `<path>.tmp` sibling → `chmod 0600` → `rename`.
    /// The `.tmp` lives next to the target so the rename never crosses
    /// filesystems.
    pub fn save(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.sibling("tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        set_file_permissions(&tmp)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }

    fn keep_corrupt_copy(&self) {
        let backup = self.sibling("corrupt");
        if let Err(err) = std::fs::copy(&self.path, &backup) {
            tracing::warn!(path = %backup.display(), error = %err, "could not keep copy of malformed document");
        }
    }

    /// `<path>.<suffix>` in the same directory, e.g. `db.json.tmp`.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "db.json".to_string());
        self.path.with_file_name(format!("{name}.{suffix}"))
    }
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PingInterval, Resource};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> DocumentStore {
        DocumentStore::new(dir.path().join("db.json"))
    }

    #[test]
    fn read_missing_is_none() {
        let dir = TempDir::new().expect("tempdir");
        assert!(store_in(&dir).read().expect("read").is_none());
    }

    #[test]
    fn save_and_read_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        let mut doc = Document::default();
        doc.resources.push(Resource::new("https://example.com"));
        doc.settings.ping_interval = PingInterval::new(10).unwrap();

        store.save(&doc).expect("save");
        let loaded = store.read().expect("read").expect("present");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = TempDir::new().expect("tempdir");
        let store = DocumentStore::new(dir.path().join("nested/deeper/db.json"));
        store.save(&Document::default()).expect("save");
        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.save(&Document::default()).expect("save");
        assert!(!dir.path().join("db.json.tmp").exists(), ".tmp must be gone after save");
    }

    #[cfg(unix)]
    #[test]
    fn saved_document_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.save(&Document::default()).expect("save");
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn load_bootstraps_and_persists_default() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        let doc = store.load();
        assert_eq!(doc, Document::default());
        assert!(store.path().exists(), "default must be persisted immediately");
    }
}
