//! ZKP error types.

use shared_types::{CategorizedError, ErrorCategory};
use thiserror::Error;

/// Zero-knowledge proof errors.
#[derive(Debug, Error)]
pub enum ZkpError {
    /// Invalid field element
    #[error("Invalid field element: value exceeds modulus")]
    InvalidFieldElement,

    /// Polynomial degree too high
    #[error("Polynomial degree {0} exceeds maximum {1}")]
    PolynomialDegreeTooHigh(usize, usize),

    /// Proof verification failed
    #[error("Proof verification failed")]
    VerificationFailed,

    /// Invalid commitment
    #[error("Invalid Merkle commitment")]
    InvalidCommitment,

    /// Witness mismatch
    #[error("Witness does not satisfy constraints")]
    WitnessMismatch,

    /// The declared public inputs do not satisfy the backend's required
    /// booleans (`consistencyCheckPassed`, `policyAllowed`) before a proof
    /// is even attempted.
    #[error("Public inputs rejected: {0}")]
    PublicInputRejected(String),

    /// A proof blob could not be decoded (wrong length, corrupted bytes).
    #[error("Malformed proof blob: {0}")]
    MalformedProof(String),
}

impl CategorizedError for ZkpError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::ProofInvalid
    }
}
