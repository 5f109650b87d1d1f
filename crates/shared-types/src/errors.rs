//! # Error Taxonomy
//!
//! The error *categories* shared across every crate (spec §7). Each crate
//! defines its own `thiserror`-derived error enum for its own failure modes;
//! this module defines only the common `ErrorCategory` every such enum maps
//! to, so that a caller at any boundary (the CLI, the redaction engine) can
//! make one exit-code/retry decision without matching on every concrete
//! error type.

use std::fmt;

/// The error taxonomy from spec §7. Every domain error implements
/// `CategorizedError` to report which of these it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Shape/constraint violation (unknown op_type, missing required field).
    InvalidInput,
    /// RecordNotFound, RequestNotFound, CIDNotFound.
    NotFound,
    /// Role not allowed for the declared operation.
    Unauthorized,
    /// Threshold not met, time-lock not elapsed, non-redactable block/tx.
    PolicyViolation,
    /// ZK verification failed or public-inputs mismatch.
    ProofInvalid,
    /// Declared transformation does not satisfy §4.4 invariants.
    ConsistencyViolation,
    /// Nullifier already recorded.
    Replay,
    /// Content Store or Ledger Backend I/O failure.
    StorageError,
    /// As `StorageError`, but safe to retry with backoff.
    TransientStorageError,
    /// Trapdoor unavailable, CH verification mismatch, cryptographic failure.
    /// The only category a process may abort on.
    Fatal,
}

impl ErrorCategory {
    /// Maps a category to the CLI exit code from spec §6/§7:
    /// `0` success (not applicable here), `2` bad input/config, `1` runtime
    /// failure.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::InvalidInput => 2,
            _ => 1,
        }
    }

    /// Whether the caller may retry the operation that produced this error.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::TransientStorageError)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::InvalidInput => "InvalidInput",
            ErrorCategory::NotFound => "NotFound",
            ErrorCategory::Unauthorized => "Unauthorized",
            ErrorCategory::PolicyViolation => "PolicyViolation",
            ErrorCategory::ProofInvalid => "ProofInvalid",
            ErrorCategory::ConsistencyViolation => "ConsistencyViolation",
            ErrorCategory::Replay => "Replay",
            ErrorCategory::StorageError => "StorageError",
            ErrorCategory::TransientStorageError => "TransientStorageError",
            ErrorCategory::Fatal => "Fatal",
        };
        write!(f, "{s}")
    }
}

/// Implemented by every domain error enum so callers can dispatch on
/// category without matching every concrete variant.
pub trait CategorizedError {
    /// The category this error belongs to.
    fn category(&self) -> ErrorCategory;
}
