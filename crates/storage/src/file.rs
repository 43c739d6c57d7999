use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::document::StateDocument;
use crate::repository::{PersistedState, StateRepository, Storage, StorageError};

/// Stores the state as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_err(e: std::io::Error) -> StorageError {
    StorageError::Io(e.to_string())
}

#[async_trait]
impl StateRepository for JsonFileRepository {
    async fn load_state(&self) -> Result<Option<PersistedState>, StorageError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        StateDocument::from_json(&text).map(|doc| Some(doc.into_state()))
    }

    async fn save_state(&self, state: &PersistedState) -> Result<(), StorageError> {
        let text = StateDocument::from_state(state).to_json()?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        // Write beside the target and rename so readers never see a partial document.
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, text).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` backed by a JSON file at `path`.
    ///
    /// The file is created on first save.
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        let state: Arc<dyn StateRepository> = Arc::new(JsonFileRepository::new(path));
        Self { state }
    }
}
