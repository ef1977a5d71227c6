//! File-based conversation log

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::HistoryEntry;
use crate::domain::traits::HistoryStore;

/// Conversation log stored as a pretty-printed JSON array, capped at
/// `max_entries` (oldest dropped first)
pub struct JsonHistoryStore {
    path: PathBuf,
    max_entries: usize,
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries: max_entries.max(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        self.read_entries()
    }

    fn append(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        // Serialise read-modify-write cycles within this process
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut entries = self.read_entries()?;
        entries.push(entry);
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(..excess);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
