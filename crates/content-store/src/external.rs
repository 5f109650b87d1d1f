//! # External Content Store
//!
//! A network-attached [`ContentStore`] satisfying the same contract as
//! [`crate::InMemoryContentStore`] (spec §4.7: "Two implementations: the
//! in-memory/simulated and external network-attached; both must satisfy the
//! same contract"). Envelope sealing/opening happens here, client-side,
//! exactly as it does for the in-memory store. The wire only ever carries
//! ciphertext plus the `kid`, never plaintext or key material.
//!
//! Grounded on `tools/qc-admin/src/api/client.rs`'s `reqwest::blocking`
//! client shape (timeouts, a thin per-call error mapping); the actual wire
//! protocol here is a plain REST surface over `ContentBlob` JSON rather than
//! qc-admin's JSON-RPC envelope, since a blob store has no RPC method
//! dispatch to model.

use crate::domain::{compute_cid, Cid, ContentBlob, ContentStoreError, PinState};
use crate::store::ContentStore;
use shared_crypto::{envelope, KeyProvider};
use std::sync::Arc;
use std::time::Duration;

/// Talks to a network-attached blob store over HTTP. `base_url` is expected
/// to expose `PUT/GET /blobs/{cid}` and `POST /blobs/{cid}/{pin,unpin}`.
pub struct ExternalContentStore {
    client: reqwest::blocking::Client,
    base_url: String,
    key_provider: Arc<dyn KeyProvider>,
}

impl ExternalContentStore {
    /// Build a client against `base_url`, sealing/opening blobs under
    /// `key_provider`. A short connect/request timeout keeps a network
    /// partition from hanging the redaction engine's suspension point
    /// (spec §5): failures surface as [`ContentStoreError::Transient`] for
    /// the engine's bounded retry to handle.
    ///
    /// # Errors
    ///
    /// Returns [`ContentStoreError::Transient`] if the underlying HTTP
    /// client cannot be constructed (e.g. an invalid TLS configuration).
    pub fn new(base_url: impl Into<String>, key_provider: Arc<dyn KeyProvider>) -> Result<Self, ContentStoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| ContentStoreError::Transient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            key_provider,
        })
    }

    fn blob_url(&self, cid: &Cid) -> String {
        format!("{}/blobs/{cid}", self.base_url)
    }
}

impl ContentStore for ExternalContentStore {
    fn add(&self, plaintext: &[u8], pin: bool) -> Result<Cid, ContentStoreError> {
        let (key, kid) = self
            .key_provider
            .active_key()
            .map_err(|e| ContentStoreError::SealFailed(e.to_string()))?;
        let sealed = envelope::seal(&key, &kid, plaintext)
            .map_err(|e| ContentStoreError::SealFailed(e.to_string()))?;
        let cid = compute_cid(plaintext);
        let blob = ContentBlob {
            cid: cid.clone(),
            envelope: sealed,
            pin_state: if pin { PinState::Pinned } else { PinState::Unpinned },
        };

        self.client
            .put(self.blob_url(&cid))
            .json(&blob)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| ContentStoreError::Transient(e.to_string()))?;
        Ok(cid)
    }

    fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>, ContentStoreError> {
        let response = self
            .client
            .get(self.blob_url(cid))
            .send()
            .map_err(|e| ContentStoreError::Transient(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let blob: ContentBlob = response
            .error_for_status()
            .map_err(|e| ContentStoreError::Transient(e.to_string()))?
            .json()
            .map_err(|e| ContentStoreError::Transient(e.to_string()))?;

        let key = self
            .key_provider
            .resolve(&blob.envelope.kid)
            .ok_or_else(|| ContentStoreError::OpenFailed(cid.clone()))?;
        let plaintext = envelope::open(&key, &blob.envelope).ok_or_else(|| ContentStoreError::OpenFailed(cid.clone()))?;
        Ok(Some(plaintext))
    }

    fn pin(&self, cid: &Cid) -> Result<(), ContentStoreError> {
        self.client
            .post(format!("{}/pin", self.blob_url(cid)))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| ContentStoreError::Transient(e.to_string()))?;
        Ok(())
    }

    fn unpin(&self, cid: &Cid) -> Result<(), ContentStoreError> {
        self.client
            .post(format!("{}/unpin", self.blob_url(cid)))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| ContentStoreError::Transient(e.to_string()))?;
        Ok(())
    }

    fn rm(&self, cid: &Cid) -> Result<(), ContentStoreError> {
        // Real object stores are content-immutable: `rm` is unpin-only, the
        // same contract `InMemoryContentStore::rm` implements.
        self.unpin(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::EnvKeyProvider;

    #[test]
    fn builds_against_a_base_url() {
        let store = ExternalContentStore::new(
            "http://localhost:9999",
            Arc::new(EnvKeyProvider::from_env("CHAMELEON_LEDGER_TEST_EXTERNAL_STORE_KEY_UNSET")),
        )
        .unwrap();
        assert_eq!(store.blob_url(&"abcd".to_string()), "http://localhost:9999/blobs/abcd");
    }

    #[test]
    fn unreachable_host_surfaces_as_transient() {
        let store = ExternalContentStore::new(
            "http://127.0.0.1:1",
            Arc::new(EnvKeyProvider::from_env("CHAMELEON_LEDGER_TEST_EXTERNAL_STORE_KEY_UNSET_2")),
        )
        .unwrap();
        let err = store.add(b"data", true).unwrap_err();
        assert!(matches!(err, ContentStoreError::Transient(_)));
    }
}
