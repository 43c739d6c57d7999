#![forbid(unsafe_code)]

pub mod document;
pub mod file;
pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, PersistedState, StateRepository, Storage, StorageError};
