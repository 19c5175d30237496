//! In-memory Q-table repository for testing.
//!
//! Stores the serialized text in memory, so tests exercise the real codec
//! without touching the file system.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    Result,
    ports::{LoadStatus, TableRepository},
    q_learning::{QTable, serialization},
};

#[derive(Debug, Default)]
struct Storage {
    text: Option<String>,
    saves: usize,
}

/// In-memory repository for testing.
///
/// All clones share the same storage, so a test can hand one clone to a
/// trainer and inspect the other.
///
/// # Examples
///
/// ```
/// use evader::adapters::InMemoryRepository;
/// use evader::ports::{LoadStatus, TableRepository};
/// use evader::q_learning::QTable;
///
/// let repo = InMemoryRepository::new();
/// let mut table = QTable::new();
/// assert_eq!(repo.load(&mut table)?, LoadStatus::Missing);
///
/// repo.save(&table)?;
/// assert_eq!(repo.save_count(), 1);
/// # Ok::<(), evader::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<Storage>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository preloaded with table text, e.g. a malformed fixture.
    pub fn with_text(text: impl Into<String>) -> Self {
        let repo = Self::new();
        repo.lock().text = Some(text.into());
        repo
    }

    /// Number of saves performed so far.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Text written by the latest save (or the preloaded text).
    pub fn text(&self) -> Option<String> {
        self.lock().text.clone()
    }

    pub fn clear(&self) {
        *self.lock() = Storage::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Storage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TableRepository for InMemoryRepository {
    fn save(&self, table: &QTable) -> Result<()> {
        let text = serialization::to_text(table);
        let mut storage = self.lock();
        storage.text = Some(text);
        storage.saves += 1;
        Ok(())
    }

    fn load(&self, table: &mut QTable) -> Result<LoadStatus> {
        let Some(text) = self.text() else {
            return Ok(LoadStatus::Missing);
        };
        serialization::from_text(&text, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, q_learning::StateId, types::Action};

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();

        let mut table = QTable::new();
        table.update(Action::North, StateId::new(7).unwrap(), 2.5);
        repo1.save(&table).unwrap();

        let mut loaded = QTable::new();
        repo2.load(&mut loaded).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(repo2.save_count(), 1);
    }

    #[test]
    fn test_preloaded_malformed_text() {
        let repo = InMemoryRepository::with_text("0;x");
        let mut table = QTable::new();
        assert!(matches!(
            repo.load(&mut table),
            Err(Error::TableParse { line: 1, field: 2, .. })
        ));
        assert!(!table.is_valid());
    }

    #[test]
    fn test_clear_removes_all() {
        let repo = InMemoryRepository::with_text("1");
        repo.save(&QTable::new()).unwrap();
        repo.clear();
        assert_eq!(repo.save_count(), 0);
        assert!(repo.text().is_none());
    }
}
