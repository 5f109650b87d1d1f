//! # AES-GCM Envelopes
//!
//! The on-disk/on-network wire format a `ContentStore` uses to seal a blob
//! under a `KeyProvider`-issued key (spec §4.7, §6).
//!
//! Unlike `symmetric` (XChaCha20-Poly1305, used for the workspace's own
//! internal secrets), the envelope format is pinned to AES-GCM with a 96-bit
//! nonce because that is the wire format spec §6 specifies: `{"enc":
//! "AES-GCM", "nonce": b64, "ciphertext": b64, "kid": string, "v": 1}`.

use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use serde::{Deserialize, Serialize};

/// Current envelope schema version. Unknown versions are rejected per spec §6.
pub const ENVELOPE_VERSION: u32 = 1;

const NONCE_LEN: usize = 12; // 96 bits, per spec §4.7

/// The sealed form of a plaintext blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Always `"AES-GCM"`.
    pub enc: String,
    /// Base64-encoded 96-bit nonce.
    pub nonce: String,
    /// Base64-encoded ciphertext (including the GCM authentication tag).
    pub ciphertext: String,
    /// The key id (see `shared_crypto::keystore`) the ciphertext was sealed
    /// under.
    pub kid: String,
    /// Schema version.
    pub v: u32,
}

/// Seal `plaintext` under `key` (32 bytes), recording `kid` so a future
/// `KeyProvider::resolve` call can find the right key to decrypt it.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if sealing fails (never happens
/// for a well-formed 32-byte key, but AEAD APIs are fallible by contract).
pub fn seal(key: &[u8; 32], kid: &str, plaintext: &[u8]) -> Result<Envelope, CryptoError> {
    let cipher = Aes256Gcm::new(key.into());
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(Envelope {
        enc: "AES-GCM".to_string(),
        nonce: base64_encode(&nonce_bytes),
        ciphertext: base64_encode(&ciphertext),
        kid: kid.to_string(),
        v: ENVELOPE_VERSION,
    })
}

/// Open an envelope given the key material it was sealed under.
///
/// Per spec §4.7, failures (wrong key, tampered ciphertext, unknown version)
/// return `None` rather than propagating a plaintext-revealing error. The
/// caller (the content store) never learns *why* decryption failed, only
/// that it did.
#[must_use]
pub fn open(key: &[u8; 32], envelope: &Envelope) -> Option<Vec<u8>> {
    if envelope.v != ENVELOPE_VERSION {
        return None;
    }
    let nonce_bytes = base64_decode(&envelope.nonce)?;
    if nonce_bytes.len() != NONCE_LEN {
        return None;
    }
    let ciphertext = base64_decode(&envelope.ciphertext)?;

    let cipher = Aes256Gcm::new(key.into());
    let nonce = Nonce::from_slice(&nonce_bytes);
    cipher.decrypt(nonce, ciphertext.as_slice()).ok()
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn base64_decode(s: &str) -> Option<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn roundtrip() {
        let k = key(7);
        let env = seal(&k, "kid-1", b"patient record").unwrap();
        assert_eq!(env.enc, "AES-GCM");
        assert_eq!(env.v, ENVELOPE_VERSION);
        let plain = open(&k, &env).unwrap();
        assert_eq!(plain, b"patient record");
    }

    #[test]
    fn wrong_key_fails() {
        let env = seal(&key(1), "kid-1", b"secret").unwrap();
        assert!(open(&key(2), &env).is_none());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut env = seal(&key(9), "kid-1", b"secret").unwrap();
        let mut raw = base64_decode(&env.ciphertext).unwrap();
        raw[0] ^= 0xFF;
        env.ciphertext = base64_encode(&raw);
        assert!(open(&key(9), &env).is_none());
    }

    #[test]
    fn unknown_version_rejected() {
        let mut env = seal(&key(3), "kid-1", b"secret").unwrap();
        env.v = 2;
        assert!(open(&key(3), &env).is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Property #12: decrypt(encrypt(P, key)) == P for any plaintext and
        // valid key, and a tampered ciphertext or mismatched key never opens.
        #[test]
        fn envelope_round_trip(
            key_bytes in proptest::collection::vec(any::<u8>(), 32),
            plaintext in proptest::collection::vec(any::<u8>(), 0..256),
            kid in "[a-f0-9]{16}",
        ) {
            let key: [u8; 32] = key_bytes.try_into().unwrap();
            let env = seal(&key, &kid, &plaintext).unwrap();
            prop_assert_eq!(open(&key, &env), Some(plaintext));
        }

        #[test]
        fn wrong_key_never_opens(
            key_bytes in proptest::collection::vec(any::<u8>(), 32),
            other_key_bytes in proptest::collection::vec(any::<u8>(), 32),
            plaintext in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let key: [u8; 32] = key_bytes.try_into().unwrap();
            let other: [u8; 32] = other_key_bytes.try_into().unwrap();
            prop_assume!(key != other);
            let env = seal(&key, "kid", &plaintext).unwrap();
            prop_assert_eq!(open(&other, &env), None);
        }
    }
}
