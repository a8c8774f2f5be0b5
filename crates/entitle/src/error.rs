//! Error types for the ledger.

use entitle_core::{CoreError, ValidationError};
use entitle_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed caller input, such as a bad duration token.
    #[error("invalid format: {0}")]
    InvalidFormat(#[from] CoreError),

    /// Out-of-range configuration value. Nothing was written.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The persistence call failed. The operation had no effect and may be
    /// retried by the caller.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(StoreError),

    /// Stored data could not be interpreted. Retrying will not help.
    #[error("corrupt stored data: {0}")]
    CorruptData(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(_) | StoreError::Database(_) | StoreError::Io(_) => {
                LedgerError::StorageUnavailable(e)
            }
            StoreError::InvalidData(_)
            | StoreError::Serialization(_)
            | StoreError::Migration(_) => LedgerError::CorruptData(e),
        }
    }
}

impl LedgerError {
    /// Whether the error is transient (backend unreachable) and the call may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::StorageUnavailable(_))
    }
}


/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
