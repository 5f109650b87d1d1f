//! # Redaction Engine Model
//!
//! The medical/contract record the engine owns end-to-end, the full
//! `RedactionRequest` lifecycle record (§3), and the append-only audit
//! entry persisted on every `execute()`.

use consistency_proof::{ConsistencyProof, ContractStateMap};
use ledger_backend::RequestHandle;
use serde::{Deserialize, Serialize};
use shared_types::{ApproverId, Hash256, OpType, RequestStatus, Role, Timestamp};
use std::collections::BTreeSet;

/// A stored record: free-form fields (name, diagnosis, physician, consent...)
/// plus an optional content-store pointer for an attached dataset blob
/// (spec §3's "Medical/Contract Record").
#[derive(Debug, Clone, PartialEq)]
pub struct MedicalRecord {
    /// The record's subject identifier.
    pub patient_id: String,
    /// Field-value map. Kept as [`ContractStateMap`] so it can be handed to
    /// the consistency-proof engine without conversion.
    pub fields: ContractStateMap,
    /// Content-store CID of an attached dataset blob, if any.
    pub pointer_to_blob: Option<String>,
    /// Bumped on every executed redaction that mutates this record.
    pub version: u64,
}

/// Operator-supplied guidance for a MODIFY request: which fields to touch
/// and what to set them to. Absent (`None`) falls back to a keyword match
/// against `reason` against the policy's modifiable-field whitelist, which
/// is how the source system infers target fields from free text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RedactionHint {
    /// No explicit field list; infer from `reason`.
    #[default]
    None,
    /// Explicit field → replacement value map.
    Modify(std::collections::BTreeMap<String, serde_json::Value>),
}

/// The ZKProof record attached to a request (spec §3 ZKProof entity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZkProofRecord {
    /// Unique proof identifier.
    pub proof_id: String,
    /// The operation this proof was produced for.
    pub op_type: OpType,
    /// Commitment this proof attests to, the post-redaction content hash.
    pub commitment: Hash256,
    /// Deterministic replay-prevention tag derived from `public_signals`.
    pub nullifier: Hash256,
    /// Merkle root bound into the proof's public inputs.
    pub merkle_root: Hash256,
    /// Time the proof was produced.
    pub timestamp: Timestamp,
    /// Opaque proof bytes, as returned by the `ProofBackend`.
    pub proof_blob: Vec<u8>,
    /// Flattened public signals the proof commits to.
    pub public_signals: Vec<u128>,
}

/// A redaction request tracked end-to-end by the engine (spec §3
/// RedactionRequest; the ledger's own `LedgerRequest` only tracks the
/// approval bookkeeping subset of this).
#[derive(Debug, Clone)]
pub struct RedactionRequest {
    /// This request's handle, shared with the `LedgerBackend`.
    pub request_id: RequestHandle,
    /// Target record.
    pub patient_id: String,
    /// Declared operation kind.
    pub op_type: OpType,
    /// Identity of the party that submitted the request.
    pub requester: String,
    /// Role the requester held at submission time.
    pub requester_role: Role,
    /// Human-readable justification.
    pub reason: String,
    /// Submission time.
    pub timestamp: Timestamp,
    /// Distinct approvals required before APPROVED.
    pub approval_threshold: u32,
    /// Distinct approvers recorded so far.
    pub approvals: BTreeSet<ApproverId>,
    /// The SNARK proof bound to this request.
    pub zk_proof: ZkProofRecord,
    /// The consistency proof bound to this request.
    pub consistency_proof: ConsistencyProof,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Field map before the declared transformation.
    pub original_data: ContractStateMap,
    /// Field map after the declared transformation.
    pub redacted_data: ContractStateMap,
    /// Field names the transformation is declared to have changed.
    pub redacted_fields: BTreeSet<String>,
    /// Nullifier derived from `zk_proof.public_signals`.
    pub nullifier: Hash256,
}

/// One append-only audit log entry, written on every successful `execute()`
/// (spec §6 persisted state layout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Execution time.
    pub ts: Timestamp,
    /// The executed request's handle, as a string.
    pub request_id: String,
    /// Target record.
    pub patient_id: String,
    /// Executed operation kind.
    pub op_type: OpType,
    /// Approvers who signed off, in insertion order.
    pub approvers: Vec<ApproverId>,
    /// Hash of the pre-redaction field map.
    pub pre_hash: Hash256,
    /// Hash of the post-redaction field map.
    pub post_hash: Hash256,
    /// The bound SNARK proof's id.
    pub zk_proof_id: String,
    /// The bound consistency proof's id.
    pub consistency_proof_id: String,
    /// Set when the executed operation was DELETE: the record no longer
    /// exists after this entry.
    pub deleted: bool,
}
