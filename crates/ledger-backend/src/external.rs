//! # External Ledger Backend
//!
//! A network-attached [`LedgerBackend`] satisfying the same trait as
//! [`crate::SimulatedLedgerBackend`] (spec §4.1: "the core must work against
//! an in-process simulated backend identically"). This is the thin client
//! side of the on-chain execution environment spec.md §1 names as an opaque
//! external collaborator. It never embeds an EVM or contract ABI, only the
//! JSON-RPC surface §6 declares.
//!
//! Grounded on `tools/qc-admin/src/api/client.rs`'s `JsonRpcRequest`/
//! `JsonRpcResponse` envelope and `reqwest::blocking` client shape, reused
//! here verbatim for the method/params/id wire format.

use crate::domain::{LedgerError, LedgerEvent, LedgerRequest, MedicalRecordPointer, RequestHandle, RequestProof};
use crate::LedgerBackend;
use serde::{Deserialize, Serialize};
use shared_types::{ApproverId, Hash256, OpType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: String,
    params: T,
    id: u64,
}

impl<T> JsonRpcRequest<T> {
    fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

#[derive(Deserialize)]
struct JsonRpcError {
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// Talks to an external, network-attached ledger over JSON-RPC.
pub struct ExternalLedgerBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    request_id: AtomicU64,
}

impl ExternalLedgerBackend {
    /// Build a client against `base_url` (the JSON-RPC endpoint of the
    /// external on-chain execution environment).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Transient`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, LedgerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| LedgerError::Transient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    fn call<P: Serialize, R: serde::de::DeserializeOwned>(&self, method: &str, params: P) -> Result<R, LedgerError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        let response: JsonRpcResponse<R> = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .map_err(|e| LedgerError::Transient(e.to_string()))?
            .json()
            .map_err(|e| LedgerError::Transient(e.to_string()))?;

        match response.result {
            Some(result) => Ok(result),
            None => Err(LedgerError::Transient(
                response
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| format!("{method} returned neither result nor error")),
            )),
        }
    }
}

impl LedgerBackend for ExternalLedgerBackend {
    fn store_medical_data(&self, patient_id: &str, cid: &str, data_hash: Hash256) -> Result<(), LedgerError> {
        self.call("ledger_storeMedicalData", (patient_id, cid, hex::encode(data_hash)))
    }

    fn get_medical_data(&self, patient_id: &str) -> Option<MedicalRecordPointer> {
        self.call("ledger_getMedicalData", [patient_id]).ok().flatten()
    }

    fn remove_medical_data(&self, patient_id: &str) -> Result<(), LedgerError> {
        self.call("ledger_removeMedicalData", [patient_id])
    }

    fn request_data_redaction(
        &self,
        patient_id: &str,
        op_type: OpType,
        reason: &str,
    ) -> Result<RequestHandle, LedgerError> {
        self.call("ledger_requestDataRedaction", (patient_id, op_type.to_string(), reason))
    }

    fn request_data_redaction_with_proof(
        &self,
        patient_id: &str,
        op_type: OpType,
        reason: &str,
        proof: RequestProof,
    ) -> Result<RequestHandle, LedgerError> {
        self.call(
            "ledger_requestDataRedactionWithProof",
            (patient_id, op_type.to_string(), reason, proof),
        )
    }

    fn get_request(&self, handle: &RequestHandle) -> Option<LedgerRequest> {
        self.call("ledger_getRequest", [handle.0.clone()]).ok().flatten()
    }

    fn approve_redaction(&self, handle: &RequestHandle, approver: ApproverId) -> Result<bool, LedgerError> {
        self.call("ledger_approveRedaction", (handle.0.clone(), approver.0))
    }

    fn is_nullifier_valid(&self, nullifier: &Hash256) -> bool {
        self.call("ledger_isNullifierValid", [hex::encode(nullifier)])
            .unwrap_or(false)
    }

    fn record_nullifier(&self, nullifier: Hash256) -> Result<bool, LedgerError> {
        self.call("ledger_recordNullifier", [hex::encode(nullifier)])
    }

    fn emit_event(&self, name: &str, fields: serde_json::Value) -> LedgerEvent {
        self.call("ledger_emitEvent", (name, fields.clone())).unwrap_or(LedgerEvent {
            name: name.to_string(),
            block: 0,
            fields,
        })
    }

    fn events(&self, name: &str, from_block: u64, to_block: u64) -> Vec<LedgerEvent> {
        self.call("ledger_events", (name, from_block, to_block)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_surfaces_as_transient_not_a_panic() {
        let ledger = ExternalLedgerBackend::new("http://127.0.0.1:1").unwrap();
        let err = ledger.remove_medical_data("P1").unwrap_err();
        assert!(matches!(err, LedgerError::Transient(_)));
    }

    #[test]
    fn get_medical_data_returns_none_rather_than_panicking_on_transport_failure() {
        let ledger = ExternalLedgerBackend::new("http://127.0.0.1:1").unwrap();
        assert!(ledger.get_medical_data("P1").is_none());
    }
}
