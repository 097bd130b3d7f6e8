//! Errors surfaced to callers of the core.

use crate::model::WishStatus;
use crate::storage::StorageError;

/// Everything a wish operation can fail with.
///
/// No variant implies a partial write: the operation either completed or
/// left stored state untouched, except where a method documents otherwise.
#[derive(Debug, thiserror::Error)]
pub enum WishError {
    #[error("you can pick at most {limit} wishes to do soon")]
    CapacityExceeded { limit: usize },

    #[error("{0}")]
    Validation(String),

    #[error("cannot move a wish from '{}' to '{}'", from.label(), to.label())]
    InvalidTransition { from: WishStatus, to: WishStatus },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not signed in")]
    Unauthenticated,

    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for WishError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::WishNotFound(id) => Self::NotFound(format!("wish {id}")),
            StorageError::CatalogEntryNotFound(id) => Self::NotFound(format!("catalog entry {id}")),
            StorageError::SourceNotFound { owner, source_id } => Self::NotFound(format!(
                "no wish of {owner} instantiated from catalog entry {source_id}"
            )),
            StorageError::UserNotFound(id) => Self::NotFound(format!("user {id}")),
            other => Self::Storage(other),
        }
    }
}

pub type Result<T> = core::result::Result<T, WishError>;
