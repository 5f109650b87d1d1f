//! # Content Blob Model
//!
//! A CID is the hex-encoded SHA-256 of the plaintext body (spec §3's
//! `data_hash` role, reused as the address so a pointer's integrity and its
//! location are the same check).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_crypto::Envelope;

/// Content identifier: `hex(SHA-256(plaintext))`.
pub type Cid = String;

/// Compute the CID a given plaintext body would be stored under.
#[must_use]
pub fn compute_cid(plaintext: &[u8]) -> Cid {
    let digest = Sha256::digest(plaintext);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Whether a stored blob is retained against garbage collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinState {
    /// Retained; `rm` will not remove it.
    Pinned,
    /// Not retained; a real network-attached store may garbage-collect it.
    Unpinned,
}

/// A sealed blob as held by the store: its envelope ciphertext and pin
/// state (spec §3 ContentBlob).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlob {
    /// Address of this blob.
    pub cid: Cid,
    /// AES-GCM envelope the plaintext is sealed in.
    pub envelope: Envelope,
    /// Current retention state.
    pub pin_state: PinState,
}
