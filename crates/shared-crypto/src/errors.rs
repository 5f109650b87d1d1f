//! Crypto error types.

use shared_types::{CategorizedError, ErrorCategory};
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length
    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected nonce length in bytes
        expected: usize,
        /// Actual nonce length in bytes
        actual: usize,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Invalid input for cryptographic operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Keystore key id not found.
    #[error("Key id not found: {0}")]
    KeyNotFound(String),

    /// Keystore file is malformed or uses an unsupported format version.
    #[error("Malformed keystore: {0}")]
    MalformedKeystore(String),

    /// Keystore I/O failure.
    #[error("Keystore I/O error: {0}")]
    KeystoreIo(String),

    /// Envelope uses an unsupported `"v"` schema version.
    #[error("Unsupported envelope version: {0}")]
    UnsupportedEnvelopeVersion(u32),
}

impl CategorizedError for CryptoError {
    fn category(&self) -> ErrorCategory {
        match self {
            CryptoError::KeyNotFound(_) => ErrorCategory::NotFound,
            CryptoError::InvalidKeyLength { .. }
            | CryptoError::InvalidNonceLength { .. }
            | CryptoError::InvalidSignatureFormat
            | CryptoError::InvalidPublicKey
            | CryptoError::InvalidPrivateKey
            | CryptoError::InvalidInput(_)
            | CryptoError::UnsupportedEnvelopeVersion(_) => ErrorCategory::InvalidInput,
            CryptoError::KeystoreIo(_) => ErrorCategory::StorageError,
            CryptoError::MalformedKeystore(_) => ErrorCategory::Fatal,
            CryptoError::EncryptionFailed(_)
            | CryptoError::DecryptionFailed(_)
            | CryptoError::SignatureVerificationFailed
            | CryptoError::InvalidSignature
            | CryptoError::KeyGenerationFailed(_) => ErrorCategory::Fatal,
        }
    }
}
