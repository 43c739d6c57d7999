use std::sync::Arc;

use headcheck_core::model::{HeadingLine, ScopeSettings};
use storage::repository::{PersistedState, StateRepository, StorageError};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::error::HeadingCheckError;

/// Host-facing facade over heading done-state and scope settings.
///
/// All state lives in memory behind one lock and is written back wholesale
/// after every mutation. Mutations hold the lock across the save so the
/// read-modify-write-persist sequence is serialized.
#[derive(Clone)]
pub struct HeadingCheckService {
    repo: Arc<dyn StateRepository>,
    state: Arc<Mutex<PersistedState>>,
}

impl HeadingCheckService {
    /// Load persisted state (or defaults if missing or unreadable).
    ///
    /// Loading never fails: malformed or unreachable storage starts the
    /// service from an empty state so heading checks stay usable.
    pub async fn load(repo: Arc<dyn StateRepository>) -> Self {
        let state = match repo.load_state().await {
            Ok(Some(state)) => state,
            Ok(None) => PersistedState::default(),
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "persisted heading state is malformed; starting empty");
                PersistedState::default()
            }
            Err(err) => {
                warn!(error = %err, "could not read persisted heading state; starting empty");
                PersistedState::default()
            }
        };
        debug!(
            done = state.record.len(),
            include_roots = state.settings.include_roots().len(),
            exclude_roots = state.settings.exclude_roots().len(),
            "loaded heading state"
        );

        Self {
            repo,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Write the full in-memory state to storage, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns `HeadingCheckError::Storage` if the write fails. Memory is left
    /// untouched, so the save can simply be retried.
    pub async fn save(&self) -> Result<(), HeadingCheckError> {
        let state = self.state.lock().await;
        self.persist(&state).await?;
        Ok(())
    }

    /// Whether heading checks apply to `path` under the current settings.
    pub async fn is_path_enabled(&self, path: &str) -> bool {
        self.state.lock().await.settings.is_path_enabled(path)
    }

    /// Whether the heading at `line` in `path` is marked done.
    pub async fn is_heading_done(&self, path: &str, line: u32) -> bool {
        self.state
            .lock()
            .await
            .record
            .is_done(path, HeadingLine::new(line))
    }

    /// Flip the done state of a heading, persist, and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `HeadingCheckError::Persist` if saving fails. The flag has
    /// already flipped in memory at that point; retry `save()`, not the
    /// toggle, which would flip it back.
    pub async fn toggle_heading(&self, path: &str, line: u32) -> Result<bool, HeadingCheckError> {
        let mut state = self.state.lock().await;
        self.toggle_locked(&mut state, path, HeadingLine::new(line)).await
    }

    /// Toggle a heading only when `path` is in scope.
    ///
    /// Returns `Ok(None)` without touching state when the path is disabled.
    ///
    /// # Errors
    ///
    /// Same as `toggle_heading`.
    pub async fn toggle_heading_if_enabled(
        &self,
        path: &str,
        line: u32,
    ) -> Result<Option<bool>, HeadingCheckError> {
        let line = HeadingLine::new(line);
        let mut state = self.state.lock().await;
        if !state.settings.is_path_enabled(path) {
            debug!(path, %line, "path not in scope; toggle skipped");
            return Ok(None);
        }
        self.toggle_locked(&mut state, path, line).await.map(Some)
    }

    /// Replace the include/exclude roots and persist immediately.
    ///
    /// Roots are trimmed; blank roots are kept and never match.
    ///
    /// # Errors
    ///
    /// Returns `HeadingCheckError::Storage` if saving fails; the new settings
    /// remain in effect in memory.
    pub async fn update_settings<I, E, S, T>(
        &self,
        include_roots: I,
        exclude_roots: E,
    ) -> Result<(), HeadingCheckError>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.replace_settings(ScopeSettings::new(include_roots, exclude_roots))
            .await
    }

    /// Install already-built settings and persist immediately.
    ///
    /// # Errors
    ///
    /// Same as `update_settings`.
    pub async fn replace_settings(&self, settings: ScopeSettings) -> Result<(), HeadingCheckError> {
        let mut state = self.state.lock().await;
        debug!(
            include_roots = ?settings.include_roots(),
            exclude_roots = ?settings.exclude_roots(),
            "updating scope settings"
        );
        state.settings = settings;
        self.persist(&state).await?;
        Ok(())
    }

    /// Current scope settings.
    pub async fn settings(&self) -> ScopeSettings {
        self.state.lock().await.settings.clone()
    }

    /// Copy of everything that a save would write.
    pub async fn snapshot(&self) -> PersistedState {
        self.state.lock().await.clone()
    }

    /// Done headings, optionally restricted to one path, ordered by path then line.
    pub async fn done_headings(&self, path: Option<&str>) -> Vec<(String, HeadingLine)> {
        let state = self.state.lock().await;
        match path {
            Some(path) => state
                .record
                .done_lines(path)
                .map(|line| (path.to_owned(), line))
                .collect(),
            None => state
                .record
                .iter()
                .map(|(path, line)| (path.to_owned(), line))
                .collect(),
        }
    }

    async fn toggle_locked(
        &self,
        state: &mut PersistedState,
        path: &str,
        line: HeadingLine,
    ) -> Result<bool, HeadingCheckError> {
        let new_state = state.record.toggle(path, line);
        debug!(path, %line, done = new_state, "toggled heading");

        self.persist(state)
            .await
            .map_err(|source| HeadingCheckError::Persist { new_state, source })?;
        Ok(new_state)
    }

    async fn persist(&self, state: &PersistedState) -> Result<(), StorageError> {
        self.repo.save_state(state).await.inspect_err(|err| {
            error!(error = %err, "failed to save heading state");
        })
    }
}
