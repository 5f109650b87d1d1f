//! # Content Store
//!
//! `add(bytes, pin) -> cid`, `get(cid) -> bytes?`, `pin`/`unpin`, `rm`
//! (best-effort unpin, a real object store is content-immutable) behind
//! one trait, so the redaction engine can be wired against either the
//! in-memory default or a network-attached adapter (spec §4.7).

use crate::domain::{compute_cid, Cid, ContentBlob, ContentStoreError, PinState};
use parking_lot::Mutex;
use shared_crypto::{envelope, KeyProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// Content-addressed blob storage with pinning, satisfied identically by
/// the in-memory default and any external network-attached adapter.
pub trait ContentStore: Send + Sync {
    /// Seal `plaintext` under the active key and store it, returning its
    /// CID. Pinned by default; pass `pin = false` to leave it collectible.
    fn add(&self, plaintext: &[u8], pin: bool) -> Result<Cid, ContentStoreError>;

    /// Retrieve and decrypt the blob at `cid`, or `None` if no such CID is
    /// known to this store.
    fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>, ContentStoreError>;

    /// Mark `cid` as retained against garbage collection.
    fn pin(&self, cid: &Cid) -> Result<(), ContentStoreError>;

    /// Mark `cid` as collectible. Does not delete it immediately.
    fn unpin(&self, cid: &Cid) -> Result<(), ContentStoreError>;

    /// Best-effort removal: unpins `cid`. A real backing object store is
    /// content-immutable, so this never guarantees the bytes are gone.
    fn rm(&self, cid: &Cid) -> Result<(), ContentStoreError>;
}

/// The default, in-process `ContentStore`: blobs live in a `Mutex`-guarded
/// map for the lifetime of the process.
pub struct InMemoryContentStore {
    key_provider: Arc<dyn KeyProvider>,
    blobs: Mutex<HashMap<Cid, ContentBlob>>,
}

impl InMemoryContentStore {
    /// A fresh, empty store sealing blobs under `key_provider`.
    #[must_use]
    pub fn new(key_provider: Arc<dyn KeyProvider>) -> Self {
        Self {
            key_provider,
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

impl ContentStore for InMemoryContentStore {
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
            pin_state: if pin {
                PinState::Pinned
            } else {
                PinState::Unpinned
            },
        };
        self.blobs.lock().insert(cid.clone(), blob);
        tracing::debug!(cid = %cid, pinned = pin, "sealed blob into content store");
        Ok(cid)
    }

    fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>, ContentStoreError> {
        let blob = match self.blobs.lock().get(cid).cloned() {
            Some(blob) => blob,
            None => return Ok(None),
        };
        let key = self
            .key_provider
            .resolve(&blob.envelope.kid)
            .ok_or_else(|| ContentStoreError::OpenFailed(cid.clone()))?;
        let plaintext = envelope::open(&key, &blob.envelope)
            .ok_or_else(|| ContentStoreError::OpenFailed(cid.clone()))?;
        Ok(Some(plaintext))
    }

    fn pin(&self, cid: &Cid) -> Result<(), ContentStoreError> {
        let mut blobs = self.blobs.lock();
        let blob = blobs
            .get_mut(cid)
            .ok_or_else(|| ContentStoreError::UnknownCid(cid.clone()))?;
        blob.pin_state = PinState::Pinned;
        Ok(())
    }

    fn unpin(&self, cid: &Cid) -> Result<(), ContentStoreError> {
        let mut blobs = self.blobs.lock();
        let blob = blobs
            .get_mut(cid)
            .ok_or_else(|| ContentStoreError::UnknownCid(cid.clone()))?;
        blob.pin_state = PinState::Unpinned;
        Ok(())
    }

    fn rm(&self, cid: &Cid) -> Result<(), ContentStoreError> {
        self.unpin(cid)
    }
}
