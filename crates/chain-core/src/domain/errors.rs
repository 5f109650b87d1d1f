//! # Domain Errors
//!
//! Error types for the chameleon-hash commitment layer and the block/chain
//! data model.
//!
//! ## Design Principles
//!
//! - Each variant corresponds to a specific invariant violation.
//! - No panics in domain logic (use `Result` instead).

use shared_types::{CategorizedError, ErrorCategory, Hash256};
use thiserror::Error;

/// Errors from the chameleon-hash and block/chain layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// A block's stored `id` does not match `CH(pk, canonical(block), r)`.
    #[error("block id mismatch: stored {stored:02x?}..., recomputed {recomputed:02x?}...")]
    IdMismatch {
        /// The `id` stored on the block.
        stored: Hash256,
        /// The `id` recomputed from current fields.
        recomputed: Hash256,
    },

    /// Genesis blocks (`depth == 0`) can never be redacted.
    #[error("genesis block is not redactable")]
    GenesisNotRedactable,

    /// The block contains at least one transaction flagged
    /// `is_redactable = false`, which freezes the whole block.
    #[error("block frozen: contains a non-redactable transaction")]
    BlockFrozen,

    /// The trapdoor needed to forge a new randomness is unavailable.
    /// Fatal: the caller must abort rather than retry.
    #[error("chameleon-hash trapdoor unavailable")]
    TrapdoorUnavailable,

    /// Re-encoding the canonical message produced different bytes than the
    /// form that was originally sealed. Fatal: abort before forging.
    #[error("canonical re-encoding diverged from sealed form")]
    CanonicalMismatch,

    /// `forge` produced an `r_new` that fails re-verification against the
    /// target `id`. Fatal.
    #[error("forged randomness failed re-verification")]
    ForgeVerificationFailed,

    /// Hash-chain linkage broken at a specific index.
    #[error("chain break at index {index}: expected prev={expected:02x?}..., got {actual:02x?}...")]
    ChainBreak {
        /// Index of the block whose `prev_id` does not match.
        index: usize,
        /// The expected `prev_id` (the predecessor's `id`).
        expected: Hash256,
        /// The actual `prev_id` stored on the block.
        actual: Hash256,
    },

    /// An index was out of range for the requested operation.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Collection length.
        len: usize,
    },

    /// Merkle inclusion proof failed to reconstruct the expected root.
    #[error("merkle proof did not reconstruct the expected root")]
    MerkleProofInvalid,

    /// Serialization of the canonical block message failed.
    #[error("canonical serialization failed: {0}")]
    SerializationError(String),
}

impl CategorizedError for ChainError {
    fn category(&self) -> ErrorCategory {
        match self {
            ChainError::GenesisNotRedactable | ChainError::BlockFrozen => {
                ErrorCategory::PolicyViolation
            }
            ChainError::TrapdoorUnavailable
            | ChainError::CanonicalMismatch
            | ChainError::ForgeVerificationFailed => ErrorCategory::Fatal,
            ChainError::IdMismatch { .. }
            | ChainError::ChainBreak { .. }
            | ChainError::MerkleProofInvalid => ErrorCategory::ConsistencyViolation,
            ChainError::IndexOutOfRange { .. } => ErrorCategory::InvalidInput,
            ChainError::SerializationError(_) => ErrorCategory::InvalidInput,
        }
    }
}
