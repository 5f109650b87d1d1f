//! Consistency-proof engine errors.

use shared_types::{CategorizedError, ErrorCategory};
use thiserror::Error;

/// Errors raised by the consistency-proof engine itself (as opposed to a
/// *failed check*, which is reported as `ConsistencyProof { is_valid: false,
/// .. }` rather than as an `Err`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// The check type requested requires witness data (a chain snapshot, a
    /// state snapshot) the caller did not supply.
    #[error("missing witness data for check: {0}")]
    MissingWitness(String),

    /// The declared operation's `op_type` has no corresponding check
    /// dispatch. The engine rejects this rather than silently skipping
    /// validation.
    #[error("unrecognized operation type, cannot establish consistency")]
    UnknownOperation,

    /// `target_block` (or a target tx index) was out of range for the
    /// supplied chain.
    #[error("target index out of range: {0}")]
    IndexOutOfRange(String),
}

impl CategorizedError for ConsistencyError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::ConsistencyViolation
    }
}
