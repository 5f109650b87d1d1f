//! # Chameleon-Hash Block Commitment
//!
//! A trapdoor commitment: `seal(pk, m, r) → BlockId` binds a message to a
//! block id; `forge(trapdoor, m_old, r_old, m_new) → r_new` finds a new
//! randomness reproducing the *same* id for a different message. This is
//! what lets a redaction rewrite a block's content without breaking
//! downstream `prev_id` linkage.
//!
//! The commitment is `CH(m, r) = g * (m + x * r) mod q`, a Pedersen-style
//! linear commitment evaluated in a single prime field, with `pk = g * x`
//! the public key and `x` the trapdoor. `q` is the Goldilocks prime
//! (`2^64 - 2^32 + 1`), chosen for the same reason `zkp-core` uses it: fast
//! native 64-bit arithmetic with a well-understood modulus. This module
//! does not depend on `zkp-core`; the commitment layer and the SNARK
//! backend are independent collaborators (§6), so the field arithmetic is
//! duplicated here rather than shared.

use crate::domain::errors::ChainError;
use rand::RngCore;
use sha2::{Digest, Sha256};
use shared_types::{BlockId, Hash256};

/// The Goldilocks prime, `2^64 - 2^32 + 1`.
pub const FIELD_MODULUS: u64 = 0xFFFF_FFFF_0000_0001;

/// An element of the field the commitment arithmetic runs in. Used both for
/// the chameleon-hash randomness `r` and the trapdoor/public-key scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scalar(u64);

impl Scalar {
    /// Reduce `value` into the field.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value % FIELD_MODULUS)
    }

    /// Reduce a `u128` into the field.
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        Self((value % u128::from(FIELD_MODULUS)) as u64)
    }

    /// Sample a uniformly random field element.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_u128(u128::from_le_bytes(bytes))
    }

    /// Raw value, reduced mod the field modulus.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    fn add(self, rhs: Self) -> Self {
        Self::from_u128(u128::from(self.0) + u128::from(rhs.0))
    }

    fn sub(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 {
            Self(self.0 - rhs.0)
        } else {
            Self(FIELD_MODULUS - rhs.0 + self.0)
        }
    }

    fn mul(self, rhs: Self) -> Self {
        Self::from_u128(u128::from(self.0) * u128::from(rhs.0))
    }

    fn pow(self, mut exp: u64) -> Self {
        let mut base = self;
        let mut result = Self(1);
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(base);
            }
            base = base.mul(base);
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse via Fermat's little theorem. `None` for zero.
    #[must_use]
    pub fn inverse(self) -> Option<Self> {
        if self.0 == 0 {
            None
        } else {
            Some(self.pow(FIELD_MODULUS - 2))
        }
    }
}

/// Fixed commitment generator. Any nonzero field element works; the value
/// has no special structure requirement beyond that.
const GENERATOR: u64 = 7;

/// The chameleon-hash public key: `pk = g * x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(Scalar);

impl PublicKey {
    /// Raw scalar value of the public key.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0.value()
    }
}

/// The chameleon-hash trapdoor: the secret `x` behind a `PublicKey`. Never
/// exposed outside the Ledger Backend's atomic execute step (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trapdoor(Scalar);

/// A freshly generated `(PublicKey, Trapdoor)` pair.
#[must_use]
pub fn generate_keypair() -> (PublicKey, Trapdoor) {
    let x = Scalar::random();
    let pk = PublicKey(Scalar::new(GENERATOR).mul(x));
    (pk, Trapdoor(x))
}

fn hash_to_scalar(message: &Hash256) -> Scalar {
    // Horner's rule over the four big-endian u64 limbs of the hash,
    // folding all 32 bytes of entropy into one field element.
    let mut acc = Scalar::new(0);
    for chunk in message.chunks_exact(8) {
        let limb = u64::from_be_bytes(chunk.try_into().expect("8-byte chunk"));
        acc = acc.mul(Scalar::new(GENERATOR)).add(Scalar::new(limb));
    }
    acc
}

/// `CH(pk, m, r) = g * (m + x*r)`, expressed without the trapdoor as
/// `g*m + pk*r` (equivalent since `pk = g*x`), so sealing never needs `x`.
fn commit(pk: PublicKey, m: Scalar, r: Scalar) -> Scalar {
    let g = Scalar::new(GENERATOR);
    g.mul(m).add(pk.0.mul(r))
}

fn scalar_to_block_id(value: Scalar) -> BlockId {
    let mut hasher = Sha256::new();
    hasher.update(b"chameleon-hash-v1");
    hasher.update(value.value().to_be_bytes());
    hasher.finalize().into()
}

/// Seal a block's canonical message under `pk` with randomness `r`,
/// producing its `BlockId`.
#[must_use]
pub fn seal(pk: PublicKey, message: &Hash256, r: Scalar) -> BlockId {
    let m = hash_to_scalar(message);
    scalar_to_block_id(commit(pk, m, r))
}

/// Find `r_new` such that `seal(pk, m_new, r_new) == seal(pk, m_old, r_old)`,
/// using the trapdoor. Fails only if the trapdoor scalar is zero, which
/// [`generate_keypair`] never produces but a caller-constructed trapdoor
/// theoretically could.
pub fn forge(
    trapdoor: Trapdoor,
    pk: PublicKey,
    m_old: &Hash256,
    r_old: Scalar,
    m_new: &Hash256,
) -> Result<Scalar, ChainError> {
    let x_inv = trapdoor.0.inverse().ok_or(ChainError::TrapdoorUnavailable)?;

    let m_old_scalar = hash_to_scalar(m_old);
    let m_new_scalar = hash_to_scalar(m_new);
    let r_new = r_old.add(m_old_scalar.sub(m_new_scalar).mul(x_inv));

    // Defence-in-depth: a forge that does not reproduce the original
    // commitment must never be accepted (§4.1 failure modes).
    if commit(pk, m_old_scalar, r_old) != commit(pk, m_new_scalar, r_new) {
        return Err(ChainError::ForgeVerificationFailed);
    }
    Ok(r_new)
}
