//! # Key Provider
//!
//! The active-key-plus-kid-registry contract from spec §4.7, with two
//! implementations grounded on `original_source/medical/key_provider.py`:
//! an environment-seeded in-memory provider, and a file-backed keystore that
//! wraps each key with a passphrase via scrypt + AES-GCM.

use crate::CryptoError;
use scrypt::{scrypt, Params};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Active key plus a by-`kid` registry, supporting rotation. Prior keys
/// remain resolvable by their `kid` after rotation (spec §4.7, property #13).
pub trait KeyProvider: Send + Sync {
    /// The currently active key and its id.
    fn active_key(&self) -> Result<([u8; 32], String), CryptoError>;

    /// Rotate to a new key (random, unless `new_key` is supplied). The new
    /// key becomes active; every previously issued key remains resolvable.
    fn rotate(&mut self, new_key: Option<[u8; 32]>) -> Result<([u8; 32], String), CryptoError>;

    /// Resolve a specific historical (or active) key by id.
    fn resolve(&self, kid: &str) -> Option<[u8; 32]>;

    /// All known key ids, active key first.
    fn list_kids(&self) -> Vec<String>;
}

/// `kid` is the first 16 hex characters of `SHA-256(key)`, matching the
/// original Python implementation's `_compute_kid`.
#[must_use]
pub fn compute_kid(key: &[u8; 32]) -> String {
    let digest = Sha256::digest(key);
    hex_encode(&digest[..8])
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ============================================================================
// Env-backed provider
// ============================================================================

/// Key material held in memory, seeded from environment variables at
/// construction (spec §4.7: "env-backed (key material in memory,
/// base64-encoded from environment)"). `rotate` updates the in-memory state
/// only. It does not attempt to mutate the process environment, which is
/// not a safe operation to perform from a library in a multi-threaded host.
pub struct EnvKeyProvider {
    keys: HashMap<String, [u8; 32]>,
    active: String,
}

impl EnvKeyProvider {
    /// Read `var` (base64, 32 bytes) as the initial active key. If unset or
    /// malformed, a fresh random key is generated instead.
    #[must_use]
    pub fn from_env(var: &str) -> Self {
        let key = std::env::var(var)
            .ok()
            .and_then(|b64| base64_decode_32(&b64))
            .unwrap_or_else(random_key);
        let kid = compute_kid(&key);
        let mut keys = HashMap::new();
        keys.insert(kid.clone(), key);
        Self { keys, active: kid }
    }
}

impl KeyProvider for EnvKeyProvider {
    fn active_key(&self) -> Result<([u8; 32], String), CryptoError> {
        self.keys
            .get(&self.active)
            .map(|k| (*k, self.active.clone()))
            .ok_or_else(|| CryptoError::KeyNotFound(self.active.clone()))
    }

    fn rotate(&mut self, new_key: Option<[u8; 32]>) -> Result<([u8; 32], String), CryptoError> {
        let key = new_key.unwrap_or_else(random_key);
        let kid = compute_kid(&key);
        self.keys.insert(kid.clone(), key);
        self.active = kid.clone();
        Ok((key, kid))
    }

    fn resolve(&self, kid: &str) -> Option<[u8; 32]> {
        self.keys.get(kid).copied()
    }

    fn list_kids(&self) -> Vec<String> {
        let mut kids = vec![self.active.clone()];
        kids.extend(self.keys.keys().filter(|k| **k != self.active).cloned());
        kids
    }
}

fn random_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut key);
    key
}

fn base64_decode_32(s: &str) -> Option<[u8; 32]> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD.decode(s).ok()?;
    bytes.try_into().ok()
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

// ============================================================================
// File-backed provider
// ============================================================================

const NONCE_LEN: usize = 12;

/// scrypt cost parameters, matching the original's `{n: 2**14, r: 8, p: 1}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScryptParams {
    /// CPU/memory cost parameter (log2 form is not used here; this is `N`
    /// itself, matching the Python original's literal `2 ** 14`).
    pub n: u32,
    /// Block size parameter.
    pub r: u32,
    /// Parallelization parameter.
    pub p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            n: 1 << 14,
            r: 8,
            p: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeyEntry {
    kid: String,
    salt: String,
    nonce: String,
    ciphertext: String,
    klen: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeystoreFile {
    v: u32,
    wrap: String,
    params: ScryptParams,
    keys: Vec<KeyEntry>,
    active: String,
}

/// Keys wrapped at rest with a passphrase (scrypt-derived KEK + AES-GCM).
/// On-disk format matches spec §4.7 exactly:
/// `{v, wrap, params:{n,r,p}, keys:[{kid,salt,nonce,ciphertext,klen}], active}`.
pub struct FileKeyProvider {
    path: PathBuf,
    passphrase: String,
    params: ScryptParams,
}

impl FileKeyProvider {
    /// Open (but do not yet read) a keystore at `path`, unlocked with
    /// `passphrase`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P, passphrase: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            passphrase: passphrase.into(),
            params: ScryptParams::default(),
        }
    }

    fn derive_kek(&self, salt: &[u8], params: ScryptParams) -> Result<[u8; 32], CryptoError> {
        let log_n = (params.n as f64).log2().round() as u8;
        let scrypt_params = Params::new(log_n, params.r, params.p, 32)
            .map_err(|e| CryptoError::KeystoreIo(e.to_string()))?;
        let mut kek = [0u8; 32];
        scrypt(self.passphrase.as_bytes(), salt, &scrypt_params, &mut kek)
            .map_err(|e| CryptoError::KeystoreIo(e.to_string()))?;
        Ok(kek)
    }

    fn wrap(&self, key: &[u8; 32]) -> Result<KeyEntry, CryptoError> {
        use aes_gcm::{
            aead::{Aead, KeyInit},
            Aes256Gcm, Nonce,
        };

        let mut salt = [0u8; 16];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut salt);
        let kek = self.derive_kek(&salt, self.params)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);

        let cipher = Aes256Gcm::new((&kek).into());
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), key.as_slice())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        Ok(KeyEntry {
            kid: compute_kid(key),
            salt: base64_encode(&salt),
            nonce: base64_encode(&nonce_bytes),
            ciphertext: base64_encode(&ciphertext),
            klen: key.len(),
        })
    }

    fn unwrap(&self, entry: &KeyEntry, params: ScryptParams) -> Option<[u8; 32]> {
        use aes_gcm::{
            aead::{Aead, KeyInit},
            Aes256Gcm, Nonce,
        };

        let salt = base64_decode(&entry.salt)?;
        let nonce_bytes = base64_decode(&entry.nonce)?;
        let ciphertext = base64_decode(&entry.ciphertext)?;
        let kek = self.derive_kek(&salt, params).ok()?;

        let cipher = Aes256Gcm::new((&kek).into());
        let plain = cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
            .ok()?;
        plain.try_into().ok()
    }

    fn load(&self) -> Option<KeystoreFile> {
        let bytes = std::fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn save(&self, file: &KeystoreFile) -> Result<(), CryptoError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CryptoError::KeystoreIo(e.to_string()))?;
        }
        let bytes =
            serde_json::to_vec_pretty(file).map_err(|e| CryptoError::KeystoreIo(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes).map_err(|e| CryptoError::KeystoreIo(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| CryptoError::KeystoreIo(e.to_string()))
    }
}

impl KeyProvider for FileKeyProvider {
    fn active_key(&self) -> Result<([u8; 32], String), CryptoError> {
        let file = self
            .load()
            .ok_or_else(|| CryptoError::MalformedKeystore("keystore file not found".into()))?;
        let entry = file
            .keys
            .iter()
            .find(|e| e.kid == file.active)
            .ok_or_else(|| CryptoError::KeyNotFound(file.active.clone()))?;
        let key = self
            .unwrap(entry, file.params)
            .ok_or_else(|| CryptoError::MalformedKeystore("failed to unwrap active key".into()))?;
        Ok((key, file.active))
    }

    fn rotate(&mut self, new_key: Option<[u8; 32]>) -> Result<([u8; 32], String), CryptoError> {
        let key = new_key.unwrap_or_else(random_key);
        let entry = self.wrap(&key)?;
        let kid = entry.kid.clone();

        let mut file = self.load().unwrap_or(KeystoreFile {
            v: 1,
            wrap: "AES-GCM-SCRYPT".to_string(),
            params: self.params,
            keys: Vec::new(),
            active: String::new(),
        });
        file.keys.push(entry);
        file.active = kid.clone();
        self.save(&file)?;
        Ok((key, kid))
    }

    fn resolve(&self, kid: &str) -> Option<[u8; 32]> {
        let file = self.load()?;
        let entry = file.keys.iter().find(|e| e.kid == kid)?;
        self.unwrap(entry, file.params)
    }

    fn list_kids(&self) -> Vec<String> {
        self.load()
            .map(|f| f.keys.into_iter().map(|e| e.kid).collect())
            .unwrap_or_default()
    }
}

fn base64_decode(s: &str) -> Option<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_provider_rotation_preserves_history() {
        let mut kp = EnvKeyProvider::from_env("CHAMELEON_LEDGER_TEST_KEY_UNSET");
        let (_, old_kid) = kp.active_key().unwrap();

        let (_, new_kid) = kp.rotate(None).unwrap();
        assert_ne!(old_kid, new_kid);

        // Old key remains resolvable.
        assert!(kp.resolve(&old_kid).is_some());
        assert!(kp.list_kids().contains(&old_kid));
        assert!(kp.list_kids().contains(&new_kid));
    }

    #[test]
    fn file_provider_roundtrip_and_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let mut kp = FileKeyProvider::new(&path, "correct horse battery staple");
        kp.params = ScryptParams { n: 1 << 10, r: 8, p: 1 }; // cheap params for tests

        let (key1, kid1) = kp.rotate(None).unwrap();
        let (key2, kid2) = kp.rotate(None).unwrap();
        assert_ne!(kid1, kid2);

        let (active_key, active_kid) = kp.active_key().unwrap();
        assert_eq!(active_key, key2);
        assert_eq!(active_kid, kid2);

        assert_eq!(kp.resolve(&kid1), Some(key1));
        assert_eq!(kp.resolve(&kid2), Some(key2));
        assert_eq!(kp.resolve("does-not-exist"), None);

        let kids = kp.list_kids();
        assert!(kids.contains(&kid1));
        assert!(kids.contains(&kid2));
    }

    #[test]
    fn file_provider_wrong_passphrase_fails_to_unwrap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let mut kp = FileKeyProvider::new(&path, "right passphrase");
        kp.params = ScryptParams { n: 1 << 10, r: 8, p: 1 };
        let (_, kid) = kp.rotate(None).unwrap();

        let mut wrong = FileKeyProvider::new(&path, "wrong passphrase");
        wrong.params = ScryptParams { n: 1 << 10, r: 8, p: 1 };
        assert_eq!(wrong.resolve(&kid), None);
    }
}
