use crate::application::errors::StorageError;
use crate::domain::entities::HistoryEntry;

/// Conversation log persistence
pub trait HistoryStore: Send + Sync {
    /// All stored exchanges, oldest first
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError>;

    /// Append one exchange
    fn append(&self, entry: HistoryEntry) -> Result<(), StorageError>;

    /// The most recent `limit` exchanges, oldest first
    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StorageError> {
        let mut entries = self.load()?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}
