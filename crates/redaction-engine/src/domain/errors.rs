//! Redaction engine errors.
//!
//! One top-level `EngineError` wraps every subordinate crate's error type so
//! a caller at the service boundary (the CLI, an integration test) sees a
//! single type to match on, mirroring the teacher's `StorageError: From<...>`
//! collapsing pattern.

use consistency_proof::ConsistencyError;
use content_store::ContentStoreError;
use ledger_backend::LedgerError;
use policy_registry::PolicyError;
use shared_types::{ApproverId, CategorizedError, ErrorCategory, OpType, Role};
use thiserror::Error;
use zkp_core::ZkpError;

/// Errors raised while driving a redaction request through its lifecycle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No medical record is stored for this patient.
    #[error("no medical record stored for patient {0}")]
    RecordNotFound(String),

    /// No request is tracked under this handle.
    #[error("no redaction request found for handle {0}")]
    RequestNotFound(String),

    /// `requester_role` is not in the governing policy's authorized set.
    #[error("role {role} is not authorized to request {op_type}")]
    Unauthorized {
        /// The role that attempted the request.
        role: Role,
        /// The operation it attempted.
        op_type: OpType,
    },

    /// `approver` has already signed off on this request.
    #[error("approver {0} has already approved this request")]
    AlreadyApproved(ApproverId),

    /// The request is already APPROVED, REJECTED, or EXECUTED and cannot be
    /// acted on further.
    #[error("request {0} is already in a terminal or non-pending status")]
    AlreadyTerminal(String),

    /// The policy's `time_lock_secs` has not yet elapsed since submission.
    #[error("time-lock has {remaining_secs}s remaining before this request may execute")]
    TimeLockNotElapsed {
        /// Seconds still required before execution is permitted.
        remaining_secs: u64,
    },

    /// This request's nullifier was already recorded by an earlier
    /// execution; the proof is being replayed.
    #[error("nullifier already recorded, this proof has already been consumed")]
    ReplayDetected,

    /// The bound consistency proof did not validate.
    #[error("consistency proof failed: {0}")]
    ConsistencyCheckFailed(String),

    /// The bound SNARK proof failed re-verification at execute time.
    #[error("zk proof failed re-verification")]
    ProofRejected,

    /// A policy registry failure.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A consistency-proof engine failure.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// A zk proof backend failure.
    #[error(transparent)]
    Zkp(#[from] ZkpError),

    /// A ledger backend failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A content store failure.
    #[error(transparent)]
    ContentStore(#[from] ContentStoreError),
}

impl CategorizedError for EngineError {
    fn category(&self) -> ErrorCategory {
        match self {
            EngineError::RecordNotFound(_) | EngineError::RequestNotFound(_) => {
                ErrorCategory::NotFound
            }
            EngineError::Unauthorized { .. } => ErrorCategory::Unauthorized,
            EngineError::AlreadyApproved(_)
            | EngineError::AlreadyTerminal(_)
            | EngineError::TimeLockNotElapsed { .. } => ErrorCategory::PolicyViolation,
            EngineError::ReplayDetected => ErrorCategory::Replay,
            EngineError::ConsistencyCheckFailed(_) => ErrorCategory::ConsistencyViolation,
            EngineError::ProofRejected => ErrorCategory::ProofInvalid,
            EngineError::Policy(e) => e.category(),
            EngineError::Consistency(e) => e.category(),
            EngineError::Zkp(e) => e.category(),
            EngineError::Ledger(e) => e.category(),
            EngineError::ContentStore(e) => e.category(),
        }
    }
}
