//! # Consistency Proof Model
//!
//! The five check types from §4.4 and the proof/witness shapes that carry
//! enough information to be independently re-verified in bounded time,
//! without a proving ceremony.

use chain_core::Chain;
use chain_core::ProofStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Hash256, OpType};
use std::collections::{BTreeMap, BTreeSet};

/// A record's field-value map, as stored inside a smart-contract state
/// entry (§3's "Medical/Contract Record"). Closed to `serde_json::Value`
/// rather than a bespoke enum because contract state is genuinely
/// operator-defined schema; the consistency checks only need equality and
/// presence, which `Value` already supports.
pub type ContractStateMap = BTreeMap<String, Value>;

/// Which of the five invariant families a [`ConsistencyProof`] establishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckType {
    /// Every block except the target is byte-for-byte identical pre/post.
    BlockIntegrity,
    /// Linear `prev_id`/depth/timestamp chain invariants hold post-redaction.
    HashChain,
    /// The target block's stored Merkle root matches its (possibly
    /// redacted) transaction list.
    MerkleTree,
    /// The declared field-level transformation on contract state is the
    /// only change, and balances/events move in an allowed direction.
    ContractState,
    /// Non-redacted transaction ordering within the target block survives.
    TxOrdering,
}

/// Describes the redaction being validated: what kind of operation, which
/// block it targets, and which fields/transactions it touches.
#[derive(Debug, Clone)]
pub struct RedactionOperation {
    /// The declared operation kind.
    pub op_type: OpType,
    /// Index (in chain order) of the block this redaction targets.
    pub target_block: usize,
    /// Field names the operation is declared to have changed.
    pub redacted_fields: BTreeSet<String>,
    /// Indices, within the target block's transaction list, removed or
    /// altered by this operation (used by `TxOrdering`; empty for
    /// field-only contract-state redactions).
    pub target_tx_indices: Vec<usize>,
}

/// Witness data a specific check type needs. Not every field is required
/// by every check; the engine returns [`crate::ConsistencyError::MissingWitness`]
/// if a check's required field is absent.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyWitness<'a> {
    /// The chain before the redaction (used by `BlockIntegrity`).
    pub pre_chain: Option<&'a Chain>,
    /// The chain after the redaction (used by `BlockIntegrity`,
    /// `HashChain`, `MerkleTree`, `TxOrdering`).
    pub post_chain: Option<&'a Chain>,
    /// Contract state before the redaction (used by `ContractState`).
    pub pre_state: Option<&'a ContractStateMap>,
    /// Contract state after the redaction (used by `ContractState`).
    pub post_state: Option<&'a ContractStateMap>,
    /// Balance drift tolerance, in basis points, for the `ContractState`
    /// check's `balances` guard.
    pub balance_tolerance_bps: u16,
}

/// A generated or re-verified consistency proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyProof {
    /// Unique proof identifier.
    pub proof_id: String,
    /// Which invariant family this proof establishes.
    pub check_type: CheckType,
    /// Inclusive `(start_depth, end_depth)` of blocks this proof covers.
    pub block_range: (u64, u64),
    /// Hash of the pre-redaction witness state.
    pub pre_state_hash: Hash256,
    /// Hash of the post-redaction witness state.
    pub post_state_hash: Hash256,
    /// An example Merkle inclusion path (leaf 0 of the target block),
    /// re-verifiable independent of the rest of the proof.
    pub merkle_proof_path: Vec<ProofStep>,
    /// `chain_core::chain_checksum` over the witnessed chain.
    pub hash_chain_checksum: Hash256,
    /// Whether every invariant for `check_type` held.
    pub is_valid: bool,
    /// Human-readable description of the first failing invariant, if any.
    pub error_detail: Option<String>,
}
