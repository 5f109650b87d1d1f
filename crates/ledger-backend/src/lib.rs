//! # Ledger Backend
//!
//! The `LedgerBackend` collaborator boundary (§6): an on-chain-shaped store
//! for medical-record pointers, redaction-request approval bookkeeping, a
//! nullifier registry guarding against SNARK replay, and an append-only
//! event log. `SimulatedLedgerBackend` is the in-process default every test
//! and the reference runtime use; an external, network-attached
//! implementation satisfies the same trait identically (§4.1's component
//! table: "the core must work against an in-process simulated backend
//! identically").
//!
//! The chameleon-hash trapdoor itself is **not** held here: block-level
//! `forge` is a `chain-core` operation exercised directly by whatever holds
//! the trapdoor (the simulated chain harness in the test suite), matching
//! spec §4.1's rule that "the core never exposes the trapdoor to policy or
//! request layers". This trait's `request_data_redaction*`/`approve_redaction`
//! surface is the contract-level bookkeeping §6 actually specifies; the
//! PENDING→APPROVED→EXECUTED state machine itself is owned one layer up, by
//! `redaction-engine`.
//!
//! ## Components
//!
//! - `domain` - `LedgerRequest`, `LedgerEvent`, `MedicalRecordPointer`, the crate's error type
//! - the `LedgerBackend` trait and `SimulatedLedgerBackend` (this module)
//! - `external` - the network-attached adapter satisfying the same trait

#![warn(missing_docs)]

pub mod domain;
pub mod external;

pub use domain::{LedgerError, LedgerEvent, LedgerRequest, MedicalRecordPointer, RequestHandle, RequestProof};
pub use external::ExternalLedgerBackend;

use parking_lot::Mutex;
use shared_types::{ApproverId, Hash256, OpType};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// The on-chain collaborator boundary (§6). Every method is safe to call
/// concurrently; a `Simulated` implementation serializes internally with
/// `parking_lot::Mutex` per §5's "reads are lock-free, writes serialized
/// and deduplicated" nullifier-registry rule and the general "calls from
/// the core are serialized per request" scheduling model.
pub trait LedgerBackend: Send + Sync {
    /// Record a medical-record pointer: the content-store CID its body is
    /// sealed under and the SHA-256 of that plaintext body.
    fn store_medical_data(
        &self,
        patient_id: &str,
        cid: &str,
        data_hash: Hash256,
    ) -> Result<(), LedgerError>;

    /// The currently recorded pointer for `patient_id`, if any.
    fn get_medical_data(&self, patient_id: &str) -> Option<MedicalRecordPointer>;

    /// Remove `patient_id`'s pointer entirely (DELETE's on-chain effect).
    fn remove_medical_data(&self, patient_id: &str) -> Result<(), LedgerError>;

    /// Open a redaction request with no proof attached yet.
    fn request_data_redaction(
        &self,
        patient_id: &str,
        op_type: OpType,
        reason: &str,
    ) -> Result<RequestHandle, LedgerError>;

    /// Open a redaction request with SNARK proof material already bound.
    fn request_data_redaction_with_proof(
        &self,
        patient_id: &str,
        op_type: OpType,
        reason: &str,
        proof: RequestProof,
    ) -> Result<RequestHandle, LedgerError>;

    /// The request tracked under `handle`, if any.
    fn get_request(&self, handle: &RequestHandle) -> Option<LedgerRequest>;

    /// Record `approver`'s sign-off on `handle`. Returns `true` if this is
    /// the first time `approver` has signed, `false` if it is a duplicate
    /// (idempotent per spec §8 property #7; the caller, not this layer,
    /// decides whether a duplicate is an error).
    fn approve_redaction(
        &self,
        handle: &RequestHandle,
        approver: ApproverId,
    ) -> Result<bool, LedgerError>;

    /// Whether `nullifier` has **not** yet been recorded (i.e. is still
    /// usable).
    fn is_nullifier_valid(&self, nullifier: &Hash256) -> bool;

    /// Record `nullifier`. Returns `false` if it was already recorded
    /// (§6: "false if already recorded") rather than erroring. Replay
    /// detection is the caller's concern.
    fn record_nullifier(&self, nullifier: Hash256) -> Result<bool, LedgerError>;

    /// Append an event to the log, returning the recorded entry (its
    /// `block` position is assigned here).
    fn emit_event(&self, name: &str, fields: serde_json::Value) -> LedgerEvent;

    /// Events named `name` whose `block` falls in `[from_block, to_block)`.
    fn events(&self, name: &str, from_block: u64, to_block: u64) -> Vec<LedgerEvent>;
}

/// The default, in-process `LedgerBackend`. All state lives in
/// `parking_lot::Mutex`-guarded maps for the lifetime of the process; the
/// reference runtime and every test in this workspace run against this
/// implementation rather than a real chain.
#[derive(Default)]
pub struct SimulatedLedgerBackend {
    records: Mutex<HashMap<String, MedicalRecordPointer>>,
    requests: Mutex<HashMap<RequestHandle, LedgerRequest>>,
    nullifiers: Mutex<HashSet<Hash256>>,
    events: Mutex<Vec<LedgerEvent>>,
    next_handle: AtomicU64,
}

impl SimulatedLedgerBackend {
    /// A fresh, empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&self) -> RequestHandle {
        let n = self.next_handle.fetch_add(1, Ordering::SeqCst);
        RequestHandle(format!("req-{n:08x}"))
    }
}

impl LedgerBackend for SimulatedLedgerBackend {
    fn store_medical_data(
        &self,
        patient_id: &str,
        cid: &str,
        data_hash: Hash256,
    ) -> Result<(), LedgerError> {
        self.records.lock().insert(
            patient_id.to_string(),
            MedicalRecordPointer {
                patient_id: patient_id.to_string(),
                cid: cid.to_string(),
                data_hash,
            },
        );
        self.emit_event(
            "DataStored",
            serde_json::json!({ "patient_id": patient_id, "cid": cid }),
        );
        Ok(())
    }

    fn get_medical_data(&self, patient_id: &str) -> Option<MedicalRecordPointer> {
        self.records.lock().get(patient_id).cloned()
    }

    fn remove_medical_data(&self, patient_id: &str) -> Result<(), LedgerError> {
        self.records
            .lock()
            .remove(patient_id)
            .ok_or_else(|| LedgerError::RecordNotFound(patient_id.to_string()))?;
        Ok(())
    }

    fn request_data_redaction(
        &self,
        patient_id: &str,
        op_type: OpType,
        reason: &str,
    ) -> Result<RequestHandle, LedgerError> {
        let handle = self.next_handle();
        self.requests.lock().insert(
            handle.clone(),
            LedgerRequest {
                handle: handle.clone(),
                patient_id: patient_id.to_string(),
                op_type,
                reason: reason.to_string(),
                approvals: Default::default(),
                proof: None,
            },
        );
        Ok(handle)
    }

    fn request_data_redaction_with_proof(
        &self,
        patient_id: &str,
        op_type: OpType,
        reason: &str,
        proof: RequestProof,
    ) -> Result<RequestHandle, LedgerError> {
        let handle = self.next_handle();
        self.requests.lock().insert(
            handle.clone(),
            LedgerRequest {
                handle: handle.clone(),
                patient_id: patient_id.to_string(),
                op_type,
                reason: reason.to_string(),
                approvals: Default::default(),
                proof: Some(proof),
            },
        );
        Ok(handle)
    }

    fn get_request(&self, handle: &RequestHandle) -> Option<LedgerRequest> {
        self.requests.lock().get(handle).cloned()
    }

    fn approve_redaction(
        &self,
        handle: &RequestHandle,
        approver: ApproverId,
    ) -> Result<bool, LedgerError> {
        let mut requests = self.requests.lock();
        let request = requests
            .get_mut(handle)
            .ok_or_else(|| LedgerError::RequestNotFound(handle.0.clone()))?;
        Ok(request.approvals.insert(approver))
    }

    fn is_nullifier_valid(&self, nullifier: &Hash256) -> bool {
        !self.nullifiers.lock().contains(nullifier)
    }

    fn record_nullifier(&self, nullifier: Hash256) -> Result<bool, LedgerError> {
        Ok(self.nullifiers.lock().insert(nullifier))
    }

    fn emit_event(&self, name: &str, fields: serde_json::Value) -> LedgerEvent {
        let mut events = self.events.lock();
        let event = LedgerEvent {
            name: name.to_string(),
            block: events.len() as u64,
            fields,
        };
        events.push(event.clone());
        tracing::debug!(name, block = events.len() as u64 - 1, "ledger event emitted");
        event
    }

    fn events(&self, name: &str, from_block: u64, to_block: u64) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name == name && e.block >= from_block && e.block < to_block)
            .cloned()
            .collect()
    }
}
