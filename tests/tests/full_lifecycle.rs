//! Cross-crate: the full redaction lifecycle wired against every simulated
//! collaborator at once (`redaction-engine` + `ledger-backend` +
//! `content-store` + `zkp-core` + `policy-registry`), checking the seams
//! `redaction-engine`'s own unit tests don't: that an ANONYMIZE rotates the
//! content-store pointer to a fresh CID while leaving the pre-redaction
//! blob retrievable (§4.7's "content-immutable store" guarantee, property
//! #14), and that the nullifier the ledger records actually blocks a
//! second identical request end to end.

use content_store::{ContentStore, InMemoryContentStore};
use ledger_backend::{LedgerBackend, SimulatedLedgerBackend};
use policy_registry::{PolicyRegistry, RedactionPolicy};
use redaction_engine::clock::FixedClock;
use redaction_engine::{EngineError, RedactionEngine, RedactionHint};
use shared_crypto::EnvKeyProvider;
use shared_types::{ApproverId, OpType, RequestStatus, Role};
use std::collections::BTreeMap;
use std::sync::Arc;
use zkp_core::SimulatedProofBackend;

fn registry_with(op_type: OpType, roles: &[Role], threshold: u32) -> PolicyRegistry {
    let mut registry = PolicyRegistry::new();
    registry
        .register(RedactionPolicy {
            policy_id: format!("policy-{op_type}"),
            op_type,
            conditions: BTreeMap::new(),
            authorized_roles: roles.iter().copied().collect(),
            min_approvals: threshold,
            time_lock_secs: 0,
            balance_tolerance_bps: 0,
        })
        .unwrap();
    registry
}

fn fields(pairs: &[(&str, &str)]) -> consistency_proof::ContractStateMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
        .collect()
}

#[test]
fn anonymize_rotates_content_store_pointer_while_old_blob_stays_retrievable() {
    let key_provider = Arc::new(EnvKeyProvider::from_env(
        "CHAMELEON_LEDGER_CROSSCRATE_FULL_LIFECYCLE_KEY_UNSET",
    ));
    let content_store = Arc::new(InMemoryContentStore::new(key_provider));
    let ledger = Arc::new(SimulatedLedgerBackend::new());

    let registry = registry_with(OpType::Anonymize, &[Role::Admin, Role::Regulator], 2);
    let clock = Arc::new(FixedClock::new(5_000));
    let engine = RedactionEngine::new(
        ledger.clone(),
        Arc::new(SimulatedProofBackend::new()),
        content_store.clone(),
        registry,
        clock,
    );

    engine
        .store_medical_record(
            "PX1",
            fields(&[("patient_name", "Grace"), ("diagnosis", "Cond")]),
        )
        .unwrap();
    let original_cid = engine.get_record("PX1").unwrap().pointer_to_blob.unwrap();

    let handle = engine
        .request(
            "PX1",
            OpType::Anonymize,
            "admin_1",
            Role::Admin,
            "anonymize for research export",
            RedactionHint::None,
        )
        .unwrap();
    engine
        .approve(&handle, ApproverId("admin_1".to_string()), Role::Admin)
        .unwrap();
    let status = engine
        .approve(&handle, ApproverId("regulator_1".to_string()), Role::Regulator)
        .unwrap();
    assert_eq!(status, RequestStatus::Executed);

    let new_cid = engine.get_record("PX1").unwrap().pointer_to_blob.unwrap();
    assert_ne!(original_cid, new_cid, "pointer must rotate to a new CID");

    // The store is content-immutable: the pre-redaction blob is still
    // fetchable by its old CID even though the live pointer moved on.
    let stale_blob: serde_json::Value =
        serde_json::from_slice(&content_store.get(&original_cid).unwrap().unwrap()).unwrap();
    assert_eq!(stale_blob["patient_name"], serde_json::json!("Grace"));

    let fresh_blob: serde_json::Value =
        serde_json::from_slice(&content_store.get(&new_cid).unwrap().unwrap()).unwrap();
    assert_eq!(fresh_blob["patient_name"], serde_json::json!("[REDACTED]"));

    let request = engine.get_request(&handle).unwrap();
    assert!(!ledger.is_nullifier_valid(&request.nullifier));
}

#[test]
fn a_second_identical_request_is_blocked_by_the_first_nullifier() {
    let key_provider = Arc::new(EnvKeyProvider::from_env(
        "CHAMELEON_LEDGER_CROSSCRATE_REPLAY_KEY_UNSET",
    ));
    let content_store = Arc::new(InMemoryContentStore::new(key_provider));
    let ledger = Arc::new(SimulatedLedgerBackend::new());

    let registry = registry_with(OpType::Delete, &[Role::Admin], 1);
    let clock = Arc::new(FixedClock::new(5_000));
    let engine = RedactionEngine::new(
        ledger,
        Arc::new(SimulatedProofBackend::new()),
        content_store,
        registry,
        clock,
    );

    engine
        .store_medical_record("PX2", fields(&[("patient_name", "Heidi")]))
        .unwrap();

    let handle_a = engine
        .request(
            "PX2",
            OpType::Delete,
            "admin_1",
            Role::Admin,
            "erasure",
            RedactionHint::None,
        )
        .unwrap();
    let handle_b = engine
        .request(
            "PX2",
            OpType::Delete,
            "admin_1",
            Role::Admin,
            "erasure",
            RedactionHint::None,
        )
        .unwrap();

    let status = engine
        .approve(&handle_a, ApproverId("admin_1".to_string()), Role::Admin)
        .unwrap();
    assert_eq!(status, RequestStatus::Executed);
    assert!(engine.get_record("PX2").is_none());

    let err = engine
        .approve(&handle_b, ApproverId("admin_1".to_string()), Role::Admin)
        .unwrap_err();
    assert!(matches!(err, EngineError::ReplayDetected));
}
