//! Content store errors.

use shared_types::{CategorizedError, ErrorCategory};
use thiserror::Error;

/// Errors raised by a [`crate::ContentStore`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentStoreError {
    /// No blob is registered under this CID.
    #[error("unknown cid: {0}")]
    UnknownCid(String),

    /// The active key provider could not seal the plaintext.
    #[error("failed to seal blob: {0}")]
    SealFailed(String),

    /// The envelope's `kid` is not resolvable by the configured key
    /// provider, or decryption under the resolved key failed.
    #[error("failed to open blob {0}: key unavailable or ciphertext invalid")]
    OpenFailed(String),

    /// The backing store (network-attached adapter) failed transiently and
    /// the caller should retry with backoff.
    #[error("transient content-store failure: {0}")]
    Transient(String),
}

impl CategorizedError for ContentStoreError {
    fn category(&self) -> ErrorCategory {
        match self {
            ContentStoreError::UnknownCid(_) => ErrorCategory::NotFound,
            ContentStoreError::SealFailed(_) | ContentStoreError::OpenFailed(_) => {
                ErrorCategory::Fatal
            }
            ContentStoreError::Transient(_) => ErrorCategory::TransientStorageError,
        }
    }
}
