//! Ledger backend errors.

use shared_types::{CategorizedError, ErrorCategory};
use thiserror::Error;

/// Errors raised by a [`crate::LedgerBackend`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No record exists under this `patient_id`.
    #[error("no medical record stored for patient {0}")]
    RecordNotFound(String),

    /// No redaction request exists with this handle.
    #[error("no redaction request found for handle {0}")]
    RequestNotFound(String),

    /// `approve_redaction` or `record_nullifier` was asked to act on a
    /// request that already reached a terminal status.
    #[error("request {0} already in terminal status, cannot be acted on further")]
    RequestAlreadyTerminal(String),

    /// A backing I/O failure the caller may retry.
    #[error("transient ledger backend failure: {0}")]
    Transient(String),
}

impl CategorizedError for LedgerError {
    fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::RecordNotFound(_) | LedgerError::RequestNotFound(_) => {
                ErrorCategory::NotFound
            }
            LedgerError::RequestAlreadyTerminal(_) => ErrorCategory::PolicyViolation,
            LedgerError::Transient(_) => ErrorCategory::TransientStorageError,
        }
    }
}
