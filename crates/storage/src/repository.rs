use async_trait::async_trait;
use headcheck_core::model::{CompletionRecord, ScopeSettings};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::sqlite::SqliteInitError;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Everything that is written back on each save: done headings plus scope settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub record: CompletionRecord,
    pub settings: ScopeSettings,
}

impl PersistedState {
    #[must_use]
    pub fn new(record: CompletionRecord, settings: ScopeSettings) -> Self {
        Self { record, settings }
    }
}

/// Repository contract for the persisted heading-check state.
///
/// The state is a single record; saving replaces it wholesale.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Load the last saved state.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if stored content is malformed,
    /// or other storage errors if the backend cannot be read.
    async fn load_state(&self) -> Result<Option<PersistedState>, StorageError>;

    /// Overwrite the stored state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be written.
    async fn save_state(&self, state: &PersistedState) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<Option<PersistedState>>>,
    fail_saves: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that already holds `state`, as if it had been saved earlier.
    #[must_use]
    pub fn seeded(state: PersistedState) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(state))),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with `StorageError::Io` until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the currently stored state, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn stored(&self) -> Result<Option<PersistedState>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl StateRepository for InMemoryRepository {
    async fn load_state(&self) -> Result<Option<PersistedState>, StorageError> {
        self.stored()
    }

    async fn save_state(&self, state: &PersistedState) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io("save rejected".into()));
        }
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Holds the state repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub state: Arc<dyn StateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let state: Arc<dyn StateRepository> = Arc::new(InMemoryRepository::new());
        Self { state }
    }

    /// Open storage from a location string.
    ///
    /// `sqlite:` URLs select the `SQLite` backend; anything else is treated as
    /// a JSON file path.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the `SQLite` backend cannot be initialized.
    pub async fn open(location: &str) -> Result<Self, SqliteInitError> {
        if location.starts_with("sqlite:") {
            Self::sqlite(location).await
        } else {
            Ok(Self::json_file(location))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headcheck_core::model::HeadingLine;

    fn sample_state() -> PersistedState {
        let record: CompletionRecord = [("A.md", HeadingLine::new(3))].into_iter().collect();
        PersistedState::new(record, ScopeSettings::new(["Questions/"], ["Archive/"]))
    }

    #[tokio::test]
    async fn empty_repository_loads_nothing() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_state() {
        let repo = InMemoryRepository::seeded(sample_state());
        let replacement = PersistedState::default();
        repo.save_state(&replacement).await.unwrap();

        let loaded = repo.load_state().await.unwrap().expect("state");
        assert_eq!(loaded, replacement);
        assert_eq!(repo.save_count(), 1);
    }

    #[tokio::test]
    async fn failing_saves_keep_stored_state() {
        let repo = InMemoryRepository::seeded(sample_state());
        repo.set_fail_saves(true);

        let err = repo.save_state(&PersistedState::default()).await;
        assert!(matches!(err, Err(StorageError::Io(_))));
        assert_eq!(repo.stored().unwrap(), Some(sample_state()));
        assert_eq!(repo.save_count(), 0);

        repo.set_fail_saves(false);
        repo.save_state(&PersistedState::default()).await.unwrap();
        assert_eq!(repo.stored().unwrap(), Some(PersistedState::default()));
    }

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InMemoryRepository>();
    }
}
