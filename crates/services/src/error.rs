//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `HeadingCheckService`.
///
/// Every variant is a persistence failure raised after memory was already
/// updated; memory stays authoritative and `save()` may be retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HeadingCheckError {
    #[error("heading toggled to done={new_state} but saving failed")]
    Persist {
        new_state: bool,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
