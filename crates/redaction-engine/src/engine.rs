//! # Redaction Engine
//!
//! Orchestrates the full request lifecycle (§4.5): `request()` builds and
//! binds a SNARK + consistency proof to a new PENDING request; `approve()`
//! records a sign-off and, once the policy's threshold is met, attempts
//! `execute()` immediately; `execute()` re-verifies everything and applies
//! the declared transformation. Every collaborator (`LedgerBackend`,
//! `ProofBackend`, `ContentStore`, `PolicyRegistry`, `ConsistencyEngine`,
//! `Clock`) is injected, so the whole lifecycle runs identically against
//! simulated or external adapters.

use crate::clock::Clock;
use crate::domain::{AuditEntry, EngineError, MedicalRecord, RedactionHint, RedactionRequest, ZkProofRecord};
use consistency_proof::{
    CheckType, ConsistencyEngine, ConsistencyWitness, ContractStateMap, RedactionOperation,
};
use content_store::{ContentStore, ContentStoreError};
use ledger_backend::{LedgerBackend, RequestHandle, RequestProof};
use policy_registry::{ConditionValue, PolicyRegistry, RedactionPolicy};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use shared_types::{ApproverId, Hash256, OpType, RequestStatus, Role};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use zkp_core::{FieldElement, ProofBackend, PublicInputs};

/// Orchestrates redaction requests against a record store it owns directly
/// (spec §3's Medical/Contract Record lives here, not in `LedgerBackend`,
/// which only tracks pointers and approval bookkeeping).
pub struct RedactionEngine {
    ledger: Arc<dyn LedgerBackend>,
    proof_backend: Arc<dyn ProofBackend>,
    content_store: Arc<dyn ContentStore>,
    policies: PolicyRegistry,
    consistency: ConsistencyEngine,
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<String, MedicalRecord>>,
    requests: Mutex<HashMap<RequestHandle, RedactionRequest>>,
    audit_log: Mutex<Vec<AuditEntry>>,
    next_proof_id: AtomicU64,
}

impl RedactionEngine {
    /// Wire a fresh engine against its collaborators. `policies` should
    /// already have every `OpType` this deployment uses registered;
    /// policies are immutable once registered (§4.3), so there is no
    /// `register_policy` escape hatch on the engine itself.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerBackend>,
        proof_backend: Arc<dyn ProofBackend>,
        content_store: Arc<dyn ContentStore>,
        policies: PolicyRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            proof_backend,
            content_store,
            policies,
            consistency: ConsistencyEngine,
            clock,
            records: Mutex::new(HashMap::new()),
            requests: Mutex::new(HashMap::new()),
            audit_log: Mutex::new(Vec::new()),
            next_proof_id: AtomicU64::new(0),
        }
    }

    /// Seal `fields` into the content store, record the pointer on the
    /// ledger, and track the live field map here for future requests to
    /// read and mutate.
    pub fn store_medical_record(
        &self,
        patient_id: &str,
        fields: ContractStateMap,
    ) -> Result<(), EngineError> {
        let plaintext = serde_json::to_vec(&fields).unwrap_or_default();
        let cid = self.content_store.add(&plaintext, true)?;
        let data_hash: Hash256 = Sha256::digest(&plaintext).into();
        self.ledger.store_medical_data(patient_id, &cid, data_hash)?;
        self.records.lock().insert(
            patient_id.to_string(),
            MedicalRecord {
                patient_id: patient_id.to_string(),
                fields,
                pointer_to_blob: Some(cid),
                version: 0,
            },
        );
        Ok(())
    }

    /// The currently live record for `patient_id`, if one exists (`None`
    /// after an executed DELETE).
    #[must_use]
    pub fn get_record(&self, patient_id: &str) -> Option<MedicalRecord> {
        self.records.lock().get(patient_id).cloned()
    }

    /// The full lifecycle record tracked under `handle`, if any.
    #[must_use]
    pub fn get_request(&self, handle: &RequestHandle) -> Option<RedactionRequest> {
        self.requests.lock().get(handle).cloned()
    }

    /// The append-only audit log, oldest first.
    #[must_use]
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit_log.lock().clone()
    }

    fn next_proof_id(&self) -> u64 {
        self.next_proof_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Step 1-7 of §4.5 `request()`: authorize the requester, compute the
    /// declared transformation, bind a consistency proof and a SNARK proof
    /// to it, and open a PENDING request.
    pub fn request(
        &self,
        patient_id: &str,
        op_type: OpType,
        requester: impl Into<String>,
        requester_role: Role,
        reason: impl Into<String>,
        hint: RedactionHint,
    ) -> Result<RequestHandle, EngineError> {
        let reason = reason.into();
        let policy = self.policies.get_policy(op_type)?.clone();
        if !policy.authorizes(requester_role) {
            return Err(EngineError::Unauthorized {
                role: requester_role,
                op_type,
            });
        }

        let original = {
            let records = self.records.lock();
            records
                .get(patient_id)
                .ok_or_else(|| EngineError::RecordNotFound(patient_id.to_string()))?
                .fields
                .clone()
        };

        let (redacted, redacted_fields) =
            Self::apply_operation(op_type, &policy, &original, &hint, &reason)?;

        let operation = RedactionOperation {
            op_type,
            target_block: 0,
            redacted_fields: redacted_fields.clone(),
            target_tx_indices: Vec::new(),
        };
        let witness = ConsistencyWitness {
            pre_state: Some(&original),
            post_state: Some(&redacted),
            balance_tolerance_bps: policy.balance_tolerance_bps,
            ..Default::default()
        };
        let proof_id = self.next_proof_id();
        let consistency_proof = self.consistency.generate(
            CheckType::ContractState,
            &witness,
            &operation,
            format!("cproof-{proof_id:08x}"),
        )?;
        if !consistency_proof.is_valid {
            return Err(EngineError::ConsistencyCheckFailed(
                consistency_proof
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| "unknown consistency failure".to_string()),
            ));
        }

        let original_hash = consistency_proof.pre_state_hash;
        let redacted_hash = consistency_proof.post_state_hash;
        let merkle_root = chain_core::merkle_root(&[original_hash, redacted_hash]);
        let policy_hash: Hash256 = Sha256::digest(policy.policy_id.as_bytes()).into();

        let public_inputs = PublicInputs {
            policy_hash,
            merkle_root,
            original_hash,
            redacted_hash,
            pre_state_hash: original_hash,
            post_state_hash: redacted_hash,
            consistency_check_passed: consistency_proof.is_valid,
            policy_allowed: true,
        };
        let witness_elements = Self::witness_from_hashes(&original_hash, &redacted_hash);
        let prove_output = self.proof_backend.prove(&public_inputs, &witness_elements)?;
        let nullifier = Self::derive_nullifier(&prove_output.public_signals);

        let zk_proof = ZkProofRecord {
            proof_id: format!("zproof-{proof_id:08x}"),
            op_type,
            commitment: redacted_hash,
            nullifier,
            merkle_root,
            timestamp: self.clock.now(),
            proof_blob: prove_output.proof_blob.clone(),
            public_signals: prove_output.public_signals,
        };

        let handle = self.ledger.request_data_redaction_with_proof(
            patient_id,
            op_type,
            &reason,
            RequestProof {
                proof_blob: prove_output.proof_blob,
                policy_hash,
                merkle_root,
                original_hash,
                redacted_hash,
            },
        )?;

        let request = RedactionRequest {
            request_id: handle.clone(),
            patient_id: patient_id.to_string(),
            op_type,
            requester: requester.into(),
            requester_role,
            reason,
            timestamp: self.clock.now(),
            approval_threshold: policy.min_approvals,
            approvals: BTreeSet::new(),
            zk_proof,
            consistency_proof,
            status: RequestStatus::Pending,
            original_data: original,
            redacted_data: redacted,
            redacted_fields,
            nullifier,
        };
        self.requests.lock().insert(handle.clone(), request);
        Ok(handle)
    }

    /// Record `approver`'s sign-off. Duplicate approvals are rejected
    /// explicitly (`AlreadyApproved`) rather than ignored. Once the
    /// policy's threshold is met the request transitions to APPROVED and
    /// `execute()` is attempted immediately; if the time-lock has not
    /// elapsed yet, the request is left APPROVED for a later `execute()`
    /// call rather than treated as a failed approval.
    pub fn approve(
        &self,
        handle: &RequestHandle,
        approver: ApproverId,
        approver_role: Role,
    ) -> Result<RequestStatus, EngineError> {
        let op_type = {
            let requests = self.requests.lock();
            requests
                .get(handle)
                .ok_or_else(|| EngineError::RequestNotFound(handle.0.clone()))?
                .op_type
        };
        let policy = self.policies.get_policy(op_type)?;
        if !policy.authorizes(approver_role) {
            return Err(EngineError::Unauthorized {
                role: approver_role,
                op_type,
            });
        }
        let threshold = policy.min_approvals;

        let became_approved = {
            let mut requests = self.requests.lock();
            let request = requests
                .get_mut(handle)
                .ok_or_else(|| EngineError::RequestNotFound(handle.0.clone()))?;
            if request.status != RequestStatus::Pending {
                return Err(EngineError::AlreadyTerminal(handle.0.clone()));
            }
            if !request.approvals.insert(approver.clone()) {
                return Err(EngineError::AlreadyApproved(approver));
            }
            if request.approvals.len() as u32 >= threshold {
                request.status = RequestStatus::Approved;
                true
            } else {
                false
            }
        };
        self.ledger.approve_redaction(handle, approver)?;

        if became_approved {
            match self.do_execute(handle) {
                Ok(status) => Ok(status),
                Err(EngineError::TimeLockNotElapsed { .. }) => Ok(RequestStatus::Approved),
                Err(e) => Err(e),
            }
        } else {
            Ok(RequestStatus::Pending)
        }
    }

    /// Re-attempt execution of an APPROVED request: the entry point a
    /// caller uses once a time-lock has elapsed. Propagates
    /// `TimeLockNotElapsed` rather than swallowing it, unlike the implicit
    /// attempt inside `approve()`.
    pub fn execute(&self, handle: &RequestHandle) -> Result<RequestStatus, EngineError> {
        self.do_execute(handle)
    }

    fn do_execute(&self, handle: &RequestHandle) -> Result<RequestStatus, EngineError> {
        let request = {
            let requests = self.requests.lock();
            requests
                .get(handle)
                .cloned()
                .ok_or_else(|| EngineError::RequestNotFound(handle.0.clone()))?
        };
        if request.status != RequestStatus::Approved {
            return Err(EngineError::AlreadyTerminal(handle.0.clone()));
        }

        let policy = self.policies.get_policy(request.op_type)?;
        let lock_secs = u64::from(policy.time_lock_secs);
        let elapsed = self.clock.now().saturating_sub(request.timestamp);
        if elapsed < lock_secs {
            return Err(EngineError::TimeLockNotElapsed {
                remaining_secs: lock_secs - elapsed,
            });
        }

        // 1. re-verify the zk proof.
        let proof_ok = self
            .proof_backend
            .verify(&request.zk_proof.proof_blob, &request.zk_proof.public_signals)?;
        if !proof_ok {
            return Err(EngineError::ProofRejected);
        }

        // 2. nullifier must still be unspent.
        if !self.ledger.is_nullifier_valid(&request.nullifier) {
            return Err(EngineError::ReplayDetected);
        }

        // 3. apply the mutation.
        let deleted = request.op_type == OpType::Delete;
        if deleted {
            self.records.lock().remove(&request.patient_id);
            self.ledger.remove_medical_data(&request.patient_id)?;
        } else {
            let mut records = self.records.lock();
            if let Some(record) = records.get_mut(&request.patient_id) {
                record.fields = request.redacted_data.clone();
                record.version += 1;
            }
        }

        // 4-5. record the nullifier and emit the execution event. This is
        // the linearization point (§5): once recorded, a replayed proof is
        // rejected by every subsequent execute() attempt.
        if !self.ledger.record_nullifier(request.nullifier)? {
            return Err(EngineError::ReplayDetected);
        }
        self.ledger.emit_event(
            "RedactionExecuted",
            serde_json::json!({
                "request_id": handle.0,
                "patient_id": request.patient_id,
                "op_type": request.op_type.to_string(),
                "deleted": deleted,
            }),
        );

        // 6. rotate the content-store pointer, with retry on transient
        // failure. A DELETE has already removed the pointer entirely.
        if !deleted {
            let plaintext = serde_json::to_vec(&request.redacted_data).unwrap_or_default();
            let new_cid = self.upload_with_retry(&plaintext, 3)?;
            let data_hash: Hash256 = Sha256::digest(&plaintext).into();
            self.ledger
                .store_medical_data(&request.patient_id, &new_cid, data_hash)?;
            let mut records = self.records.lock();
            if let Some(record) = records.get_mut(&request.patient_id) {
                record.pointer_to_blob = Some(new_cid);
            }
        }

        // 7. transition to EXECUTED.
        {
            let mut requests = self.requests.lock();
            if let Some(stored) = requests.get_mut(handle) {
                stored.status = RequestStatus::Executed;
            }
        }

        self.audit_log.lock().push(AuditEntry {
            ts: self.clock.now(),
            request_id: handle.0.clone(),
            patient_id: request.patient_id.clone(),
            op_type: request.op_type,
            approvers: request.approvals.iter().cloned().collect(),
            pre_hash: request.consistency_proof.pre_state_hash,
            post_hash: request.consistency_proof.post_state_hash,
            zk_proof_id: request.zk_proof.proof_id.clone(),
            consistency_proof_id: request.consistency_proof.proof_id.clone(),
            deleted,
        });

        Ok(RequestStatus::Executed)
    }

    fn upload_with_retry(&self, plaintext: &[u8], attempts: u32) -> Result<String, EngineError> {
        let mut last_err = None;
        for _ in 0..attempts.max(1) {
            match self.content_store.add(plaintext, true) {
                Ok(cid) => return Ok(cid),
                Err(ContentStoreError::Transient(msg)) => {
                    last_err = Some(ContentStoreError::Transient(msg));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_err
            .unwrap_or_else(|| ContentStoreError::Transient("upload retries exhausted".to_string()))
            .into())
    }

    fn witness_from_hashes(original_hash: &Hash256, redacted_hash: &Hash256) -> Vec<FieldElement> {
        original_hash
            .chunks_exact(8)
            .chain(redacted_hash.chunks_exact(8))
            .map(|chunk| FieldElement::new(u64::from_be_bytes(chunk.try_into().unwrap())))
            .collect()
    }

    fn derive_nullifier(public_signals: &[u128]) -> Hash256 {
        let mut hasher = Sha256::new();
        for limb in public_signals {
            hasher.update(limb.to_be_bytes());
        }
        hasher.finalize().into()
    }

    fn sensitive_fields(policy: &RedactionPolicy) -> Vec<String> {
        match policy.conditions.get("sensitive_fields") {
            Some(ConditionValue::List(fields)) => fields.clone(),
            _ => vec![
                "patient_name".to_string(),
                "medical_record_number".to_string(),
                "physician".to_string(),
            ],
        }
    }

    fn modifiable_fields(policy: &RedactionPolicy) -> Vec<String> {
        match policy.conditions.get("modifiable_fields") {
            Some(ConditionValue::List(fields)) => fields.clone(),
            _ => Vec::new(),
        }
    }

    /// §4.6 per-operation semantics: DELETE clears every field (the caller
    /// removes the pointer/record entirely at execute time); ANONYMIZE sets
    /// the policy's configured sensitive-field set (or the built-in
    /// default) to `"[REDACTED]"`; MODIFY applies an explicit field/value
    /// hint, or falls back to matching `reason` against the policy's
    /// modifiable-field whitelist.
    fn apply_operation(
        op_type: OpType,
        policy: &RedactionPolicy,
        original: &ContractStateMap,
        hint: &RedactionHint,
        reason: &str,
    ) -> Result<(ContractStateMap, BTreeSet<String>), EngineError> {
        match op_type {
            OpType::Delete => {
                let fields: BTreeSet<String> = original.keys().cloned().collect();
                Ok((ContractStateMap::new(), fields))
            }
            OpType::Anonymize => {
                let sensitive = Self::sensitive_fields(policy);
                let mut post = original.clone();
                let mut changed = BTreeSet::new();
                for field in &sensitive {
                    if post.contains_key(field) {
                        post.insert(field.clone(), serde_json::json!("[REDACTED]"));
                        changed.insert(field.clone());
                    }
                }
                Ok((post, changed))
            }
            OpType::Modify => {
                let whitelist = Self::modifiable_fields(policy);
                let mut post = original.clone();
                let mut changed = BTreeSet::new();
                match hint {
                    RedactionHint::Modify(values) => {
                        for (field, value) in values {
                            if !whitelist.is_empty() && !whitelist.contains(field) {
                                continue;
                            }
                            if original.contains_key(field) {
                                post.insert(field.clone(), value.clone());
                                changed.insert(field.clone());
                            }
                        }
                    }
                    RedactionHint::None => {
                        let reason_lower = reason.to_lowercase();
                        for field in &whitelist {
                            if reason_lower.contains(&field.to_lowercase()) && post.contains_key(field) {
                                post.insert(field.clone(), serde_json::json!("[MODIFIED]"));
                                changed.insert(field.clone());
                            }
                        }
                    }
                }
                if changed.is_empty() {
                    return Err(EngineError::ConsistencyCheckFailed(
                        "no modifiable fields resolved for MODIFY request".to_string(),
                    ));
                }
                Ok((post, changed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use content_store::InMemoryContentStore;
    use ledger_backend::SimulatedLedgerBackend;
    use shared_crypto::EnvKeyProvider;
    use std::collections::BTreeMap;
    use zkp_core::SimulatedProofBackend;

    fn registry_with(op_type: OpType, roles: &[Role], threshold: u32, time_lock: u32) -> PolicyRegistry {
        let mut registry = PolicyRegistry::new();
        registry
            .register(RedactionPolicy {
                policy_id: format!("policy-{op_type}"),
                op_type,
                conditions: BTreeMap::new(),
                authorized_roles: roles.iter().copied().collect(),
                min_approvals: threshold,
                time_lock_secs: time_lock,
                balance_tolerance_bps: 0,
            })
            .unwrap();
        registry
    }

    fn engine(registry: PolicyRegistry, clock: Arc<FixedClock>) -> RedactionEngine {
        RedactionEngine::new(
            Arc::new(SimulatedLedgerBackend::new()),
            Arc::new(SimulatedProofBackend::new()),
            Arc::new(InMemoryContentStore::new(Arc::new(EnvKeyProvider::from_env(
                "CHAMELEON_LEDGER_TEST_ENGINE_KEY_UNSET",
            )))),
            registry,
            clock,
        )
    }

    fn fields(pairs: &[(&str, &str)]) -> ContractStateMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
            .collect()
    }

    // S1: GDPR DELETE, threshold 2, approvers admin_1 + regulator_2.
    #[test]
    fn delete_with_sufficient_approvals_executes_and_removes_record() {
        let registry = registry_with(OpType::Delete, &[Role::Admin, Role::Regulator], 2, 0);
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, clock);

        engine
            .store_medical_record("P1", fields(&[("patient_name", "Alice")]))
            .unwrap();

        let handle = engine
            .request(
                "P1",
                OpType::Delete,
                "admin_1",
                Role::Admin,
                "GDPR erasure request",
                RedactionHint::None,
            )
            .unwrap();

        let status = engine
            .approve(&handle, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap();
        assert_eq!(status, RequestStatus::Pending);

        let status = engine
            .approve(&handle, ApproverId("regulator_2".to_string()), Role::Regulator)
            .unwrap();
        assert_eq!(status, RequestStatus::Executed);

        assert!(engine.get_record("P1").is_none());
        let audit = engine.audit_log();
        assert_eq!(audit.len(), 1);
        assert!(audit[0].deleted);

        let request = engine.get_request(&handle).unwrap();
        assert_eq!(request.status, RequestStatus::Executed);

        let err = engine.execute(&handle).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyTerminal(_)));
    }

    // S2: HIPAA ANONYMIZE, threshold 3, approvers from three distinct roles.
    #[test]
    fn anonymize_redacts_configured_fields_and_leaves_others_untouched() {
        let registry = registry_with(
            OpType::Anonymize,
            &[Role::Admin, Role::Regulator, Role::EthicsBoard],
            3,
            0,
        );
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, clock);

        engine
            .store_medical_record(
                "P2",
                fields(&[
                    ("patient_name", "Bob"),
                    ("medical_record_number", "MRN-2"),
                    ("physician", "Dr. Smith"),
                    ("diagnosis", "Cond"),
                ]),
            )
            .unwrap();

        let handle = engine
            .request(
                "P2",
                OpType::Anonymize,
                "admin_1",
                Role::Admin,
                "HIPAA anonymization",
                RedactionHint::None,
            )
            .unwrap();

        engine
            .approve(&handle, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap();
        engine
            .approve(&handle, ApproverId("regulator_1".to_string()), Role::Regulator)
            .unwrap();
        let status = engine
            .approve(&handle, ApproverId("ethics_board".to_string()), Role::EthicsBoard)
            .unwrap();
        assert_eq!(status, RequestStatus::Executed);

        let record = engine.get_record("P2").unwrap();
        assert_eq!(record.fields["patient_name"], serde_json::json!("[REDACTED]"));
        assert_eq!(
            record.fields["medical_record_number"],
            serde_json::json!("[REDACTED]")
        );
        assert_eq!(record.fields["physician"], serde_json::json!("[REDACTED]"));
        assert_eq!(record.fields["diagnosis"], serde_json::json!("Cond"));

        let request = engine.get_request(&handle).unwrap();
        assert_ne!(
            request.consistency_proof.pre_state_hash,
            request.consistency_proof.post_state_hash
        );
        assert!(request.consistency_proof.is_valid);
    }

    // S3: an unauthorized role cannot even open the request.
    #[test]
    fn unauthorized_role_cannot_request_delete() {
        let registry = registry_with(OpType::Delete, &[Role::Admin], 1, 0);
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, clock);

        engine
            .store_medical_record("P3", fields(&[("patient_name", "Carol")]))
            .unwrap();

        let err = engine
            .request(
                "P3",
                OpType::Delete,
                "user_1",
                Role::User,
                "not my call",
                RedactionHint::None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Unauthorized {
                role: Role::User,
                op_type: OpType::Delete
            }
        ));

        assert!(engine.get_record("P3").is_some());
        assert!(engine.audit_log().is_empty());
    }

    // S6: a second request whose proof collides with an already-consumed
    // nullifier (identical pre/post state hashes, unchanged in between) is
    // rejected at execute time rather than applied twice.
    #[test]
    fn replaying_a_consumed_nullifier_is_rejected() {
        let registry = registry_with(OpType::Delete, &[Role::Admin], 1, 0);
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, clock);

        engine
            .store_medical_record("P4", fields(&[("patient_name", "Dave")]))
            .unwrap();
        let handle_a = engine
            .request(
                "P4",
                OpType::Delete,
                "admin_1",
                Role::Admin,
                "erasure",
                RedactionHint::None,
            )
            .unwrap();
        let handle_b = engine
            .request(
                "P4",
                OpType::Delete,
                "admin_1",
                Role::Admin,
                "erasure",
                RedactionHint::None,
            )
            .unwrap();
        assert_eq!(
            engine.get_request(&handle_a).unwrap().nullifier,
            engine.get_request(&handle_b).unwrap().nullifier
        );

        let status = engine
            .approve(&handle_a, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap();
        assert_eq!(status, RequestStatus::Executed);

        let err = engine
            .approve(&handle_b, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap_err();
        assert!(matches!(err, EngineError::ReplayDetected));
    }

    #[test]
    fn double_execute_after_terminal_is_rejected() {
        let registry = registry_with(OpType::Delete, &[Role::Admin], 1, 0);
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, clock);

        engine
            .store_medical_record("P4b", fields(&[("patient_name", "Dave")]))
            .unwrap();
        let handle = engine
            .request(
                "P4b",
                OpType::Delete,
                "admin_1",
                Role::Admin,
                "erasure",
                RedactionHint::None,
            )
            .unwrap();
        engine
            .approve(&handle, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap();

        let err = engine.execute(&handle).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyTerminal(_)));
    }

    #[test]
    fn duplicate_approval_by_same_approver_is_rejected() {
        let registry = registry_with(OpType::Delete, &[Role::Admin, Role::Regulator], 2, 0);
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, clock);
        engine
            .store_medical_record("P5", fields(&[("patient_name", "Eve")]))
            .unwrap();
        let handle = engine
            .request(
                "P5",
                OpType::Delete,
                "admin_1",
                Role::Admin,
                "erasure",
                RedactionHint::None,
            )
            .unwrap();
        engine
            .approve(&handle, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap();
        let err = engine
            .approve(&handle, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyApproved(_)));
    }

    #[test]
    fn time_lock_defers_execution_until_elapsed() {
        let registry = registry_with(OpType::Delete, &[Role::Admin], 1, 300);
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, Arc::clone(&clock));
        engine
            .store_medical_record("P6", fields(&[("patient_name", "Frank")]))
            .unwrap();
        let handle = engine
            .request(
                "P6",
                OpType::Delete,
                "admin_1",
                Role::Admin,
                "erasure",
                RedactionHint::None,
            )
            .unwrap();

        let status = engine
            .approve(&handle, ApproverId("admin_1".to_string()), Role::Admin)
            .unwrap();
        assert_eq!(status, RequestStatus::Approved);
        assert!(engine.get_record("P6").is_some());

        let err = engine.execute(&handle).unwrap_err();
        assert!(matches!(err, EngineError::TimeLockNotElapsed { .. }));

        clock.advance(300);
        let status = engine.execute(&handle).unwrap();
        assert_eq!(status, RequestStatus::Executed);
        assert!(engine.get_record("P6").is_none());
    }

    #[test]
    fn modify_applies_explicit_field_hint() {
        let mut registry = PolicyRegistry::new();
        let mut conditions = BTreeMap::new();
        conditions.insert(
            "modifiable_fields".to_string(),
            ConditionValue::List(vec!["diagnosis".to_string()]),
        );
        registry
            .register(RedactionPolicy {
                policy_id: "policy-modify".to_string(),
                op_type: OpType::Modify,
                conditions,
                authorized_roles: [Role::Researcher].into_iter().collect(),
                min_approvals: 1,
                time_lock_secs: 0,
                balance_tolerance_bps: 0,
            })
            .unwrap();
        let clock = Arc::new(FixedClock::new(1_000));
        let engine = engine(registry, clock);
        engine
            .store_medical_record("P7", fields(&[("diagnosis", "Cond A")]))
            .unwrap();

        let mut hint_values = BTreeMap::new();
        hint_values.insert("diagnosis".to_string(), serde_json::json!("Cond B"));
        let handle = engine
            .request(
                "P7",
                OpType::Modify,
                "researcher_1",
                Role::Researcher,
                "correcting diagnosis",
                RedactionHint::Modify(hint_values),
            )
            .unwrap();
        let status = engine
            .approve(&handle, ApproverId("researcher_1".to_string()), Role::Researcher)
            .unwrap();
        assert_eq!(status, RequestStatus::Executed);

        let record = engine.get_record("P7").unwrap();
        assert_eq!(record.fields["diagnosis"], serde_json::json!("Cond B"));
    }
}
