//! Autosave observer for the booking draft.
//!
//! The wizard never talks to disk directly; it fires a [`DraftStore`] hook on
//! every mutation. The durable slot is a single key, so concurrent sessions
//! follow last-writer-wins, matching the single client-storage slot the
//! booking flow persists into.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;

use crate::state::draft::DraftSnapshot;

/// Storage key for the serialized draft snapshot.
pub const DRAFT_STORAGE_KEY: &str = "booking-flow-data";

/// Errors raised by a draft store. The wizard logs and swallows all of them;
/// a booking is never blocked on the autosave slot.
#[derive(Debug, Error)]
pub enum DraftStoreError {
    /// The slot file could not be read, written or removed.
    #[error("failed to access draft slot at `{path}`")]
    Io {
        /// Location of the slot file.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The slot exists but its contents do not decode into a snapshot.
    #[error("draft slot holds an unreadable snapshot")]
    Corrupt(#[source] serde_json::Error),
}

/// Durable single-slot storage for the in-progress draft.
pub trait DraftStore: Send + Sync {
    /// Overwrite the slot with a fresh snapshot.
    fn save(&self, snapshot: &DraftSnapshot) -> Result<(), DraftStoreError>;
    /// Read the slot; `Ok(None)` when no snapshot was ever written.
    fn load(&self) -> Result<Option<DraftSnapshot>, DraftStoreError>;
    /// Empty the slot.
    fn clear(&self) -> Result<(), DraftStoreError>;
}

/// [`DraftStore`] persisting the snapshot as a JSON file under the configured
/// draft directory.
pub struct JsonFileDraftStore {
    path: PathBuf,
}

impl JsonFileDraftStore {
    /// Build a store writing `<dir>/booking-flow-data.json`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{DRAFT_STORAGE_KEY}.json")),
        }
    }

    fn io_err(&self, source: std::io::Error) -> DraftStoreError {
        DraftStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DraftStore for JsonFileDraftStore {
    fn save(&self, snapshot: &DraftSnapshot) -> Result<(), DraftStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
        }
        let payload = serde_json::to_vec(snapshot).map_err(DraftStoreError::Corrupt)?;
        fs::write(&self.path, payload).map_err(|source| self.io_err(source))
    }

    fn load(&self) -> Result<Option<DraftSnapshot>, DraftStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_err(err)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(DraftStoreError::Corrupt)
    }

    fn clear(&self) -> Result<(), DraftStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_err(err)),
        }
    }
}

/// In-memory [`DraftStore`] for tests and backendless experimentation.
#[derive(Default)]
pub struct MemoryDraftStore {
    slot: Mutex<Option<DraftSnapshot>>,
}

impl MemoryDraftStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, snapshot: &DraftSnapshot) -> Result<(), DraftStoreError> {
        *self.slot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<DraftSnapshot>, DraftStoreError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn clear(&self) -> Result<(), DraftStoreError> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}
