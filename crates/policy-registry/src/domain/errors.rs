//! Policy registry errors.

use shared_types::{CategorizedError, ErrorCategory, OpType};
use thiserror::Error;

/// Errors raised while registering or looking up redaction policies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// No policy is registered for the requested operation type.
    #[error("no policy registered for operation {0}")]
    PolicyNotFound(OpType),

    /// A policy is already registered for this operation type. Policies are
    /// immutable once registered (§4.3); callers must mint a new
    /// `policy_id` rather than overwrite.
    #[error("policy already registered for operation {0}")]
    PolicyAlreadyRegistered(OpType),

    /// `min_approvals` was zero, which would let any single approver
    /// execute a redaction unilaterally.
    #[error("min_approvals must be at least 1")]
    ZeroApprovalThreshold,
}

impl CategorizedError for PolicyError {
    fn category(&self) -> ErrorCategory {
        match self {
            PolicyError::PolicyNotFound(_) => ErrorCategory::NotFound,
            PolicyError::PolicyAlreadyRegistered(_) | PolicyError::ZeroApprovalThreshold => {
                ErrorCategory::InvalidInput
            }
        }
    }
}
