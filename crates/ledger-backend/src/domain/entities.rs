//! # Ledger Backend Model
//!
//! The on-chain-shaped bookkeeping a [`crate::LedgerBackend`] exposes:
//! stored medical-record pointers, in-flight redaction requests (approvals
//! only. The PENDING/APPROVED/EXECUTED state machine itself lives one
//! layer up, in the redaction engine that orchestrates policy, proof, and
//! consistency checks before ever calling this trait), the nullifier
//! registry, and an append-only event log.

use serde::{Deserialize, Serialize};
use shared_types::{ApproverId, Hash256, OpType};
use std::collections::BTreeSet;

/// Opaque handle to a submitted redaction request, analogous to an
/// on-chain transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestHandle(pub String);

impl std::fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored medical-record pointer: the content-store CID and the hash of
/// its plaintext body (spec §3's `data_hash`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecordPointer {
    /// Patient/record identifier.
    pub patient_id: String,
    /// Content-store CID the record's body is sealed under.
    pub cid: String,
    /// SHA-256 of the record's plaintext body.
    pub data_hash: Hash256,
}

/// Proof material attached to a request submitted via
/// `request_data_redaction_with_proof`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestProof {
    /// Opaque SNARK proof bytes (`zkp_core::Proof::to_bytes`).
    pub proof_blob: Vec<u8>,
    /// Hash of the policy this redaction was authorized under.
    pub policy_hash: Hash256,
    /// Merkle root of the affected block's transaction list.
    pub merkle_root: Hash256,
    /// Hash of the pre-redaction data.
    pub original_hash: Hash256,
    /// Hash of the post-redaction data.
    pub redacted_hash: Hash256,
}

/// A redaction request as tracked by the ledger: who asked, what for, which
/// approvers have signed off, and any attached proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRequest {
    /// This request's handle.
    pub handle: RequestHandle,
    /// Target patient/record.
    pub patient_id: String,
    /// Declared operation kind.
    pub op_type: OpType,
    /// Human-readable justification.
    pub reason: String,
    /// Distinct approvers recorded so far.
    pub approvals: BTreeSet<ApproverId>,
    /// Proof material, if this request was submitted with one.
    pub proof: Option<RequestProof>,
}

/// One append-only event-log entry (spec §6 `events(name, from..to)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Event name, e.g. `"RedactionExecuted"`, `"DataStored"`, `"RedactionApproved"`.
    pub name: String,
    /// Monotonically increasing position in the simulated chain (spec §6's
    /// "block" in `from_block..to_block`).
    pub block: u64,
    /// Event payload fields, serialized as JSON for schema flexibility
    /// across event kinds.
    pub fields: serde_json::Value,
}
