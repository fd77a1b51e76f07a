//! Local persistence for the pit.
//!
//! The whole collection lives in a single JSON document:
//!
//! ```text
//! <pit file>        # {"version": 1, "entries": [...]}, insertion order
//! <pit file>.tmp    # scratch file, only present mid-write
//! ```
//!
//! Every save rewrites the full document through a temporary file and a
//! rename, so a failed write never leaves a half-written snapshot behind.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::Entry;

/// Snapshot format written by this build.
const FORMAT_VERSION: u32 = 1;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt pit file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

pub type Result<T> = core::result::Result<T, StorageError>;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    entries: &'a [Entry],
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    entries: Vec<Entry>,
}

/// File-backed snapshot storage for the entry collection.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Creates a storage handle for the given pit file.
    ///
    /// The parent directory is created if it doesn't exist. The file itself
    /// is only created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Returns the default pit file: `~/.pit/pit.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pit").join("pit.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every entry from disk.
    ///
    /// A missing or empty file is a valid empty pit. Anything else that
    /// can't be read back is reported as corrupt rather than ignored.
    pub fn load_all(&self) -> Result<Vec<Entry>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }

        let snapshot: SnapshotIn =
            serde_json::from_str(&json).map_err(|e| self.corrupt(e.to_string()))?;
        if snapshot.version > FORMAT_VERSION {
            return Err(self.corrupt(format!(
                "unsupported format version {}",
                snapshot.version
            )));
        }

        let mut seen = HashSet::new();
        for entry in &snapshot.entries {
            entry
                .validate()
                .map_err(|e| self.corrupt(format!("entry {}: {e}", entry.id)))?;
            if !seen.insert(entry.id) {
                return Err(self.corrupt(format!("duplicate entry id {}", entry.id)));
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            entries = snapshot.entries.len(),
            "loaded pit snapshot"
        );
        Ok(snapshot.entries)
    }

    /// Replaces the on-disk snapshot with `entries`.
    ///
    /// Writes a temporary sibling file, syncs it, then renames it over the
    /// pit file. The rename is the commit point: an error means the previous
    /// snapshot is still in place, and `Ok` means the new one is.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot can't be serialized, written, or
    /// renamed into place.
    pub fn save_all(&self, entries: &[Entry]) -> Result<()> {
        let json = serde_json::to_vec_pretty(&SnapshotOut {
            version: FORMAT_VERSION,
            entries,
        })?;

        let temp_path = self.temp_path();
        let committed =
            write_synced(&temp_path, &json).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = committed {
            // The scratch file may not exist at all.
            if let Err(cleanup) = fs::remove_file(&temp_path)
                && cleanup.kind() != io::ErrorKind::NotFound
            {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %cleanup,
                    "could not remove scratch file"
                );
            }
            return Err(e.into());
        }

        // Already committed; the new snapshot is what a reopen will read.
        if let Err(e) = self.sync_directory() {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "pit snapshot committed but directory sync failed"
            );
        }

        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            bytes = json.len(),
            "wrote pit snapshot"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn corrupt(&self, reason: String) -> StorageError {
        StorageError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }

    /// Makes the rename durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        File::open(dir)?.sync_all()
    }

    // NTFS journals metadata; there is no directory handle to sync.
    #[cfg(not(unix))]
    fn sync_directory(&self) -> io::Result<()> {
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
