//! # ZK Proof Types
//!
//! Proof generation and verification.

use crate::commitment::{HashOutput, MerkleCommitment};
use crate::errors::ZkpError;
use crate::field::FieldElement;
use crate::polynomial::Polynomial;

/// Zero-knowledge proof.
#[derive(Clone, Debug)]
pub struct Proof {
    /// Commitment to witness polynomial
    pub witness_commitment: HashOutput,
    /// Commitment to quotient polynomial
    pub quotient_commitment: HashOutput,
    /// Opening evaluations
    pub evaluations: Vec<FieldElement>,
    /// Challenge point
    pub challenge: FieldElement,
}

impl Proof {
    /// Serialize to the opaque `proof_blob` the `ProofBackend` port exchanges
    /// with callers: two 32-byte commitments, the challenge, then a
    /// length-prefixed list of evaluations (8 bytes each, little-endian).
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 32 + 8 + 8 + self.evaluations.len() * 8);
        out.extend_from_slice(&self.witness_commitment);
        out.extend_from_slice(&self.quotient_commitment);
        out.extend_from_slice(&self.challenge.value().to_le_bytes());
        out.extend_from_slice(&(self.evaluations.len() as u64).to_le_bytes());
        for eval in &self.evaluations {
            out.extend_from_slice(&eval.value().to_le_bytes());
        }
        out
    }

    /// Inverse of [`Proof::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ZkpError> {
        if bytes.len() < 32 + 32 + 8 + 8 {
            return Err(ZkpError::MalformedProof("blob too short".into()));
        }
        let witness_commitment: HashOutput = bytes[0..32]
            .try_into()
            .map_err(|_| ZkpError::MalformedProof("bad witness commitment".into()))?;
        let quotient_commitment: HashOutput = bytes[32..64]
            .try_into()
            .map_err(|_| ZkpError::MalformedProof("bad quotient commitment".into()))?;
        let challenge = FieldElement::new(u64::from_le_bytes(
            bytes[64..72]
                .try_into()
                .map_err(|_| ZkpError::MalformedProof("bad challenge".into()))?,
        ));
        let len = u64::from_le_bytes(
            bytes[72..80]
                .try_into()
                .map_err(|_| ZkpError::MalformedProof("bad evaluations length".into()))?,
        ) as usize;
        let expected_len = 80 + len * 8;
        if bytes.len() != expected_len {
            return Err(ZkpError::MalformedProof(format!(
                "expected {expected_len} bytes, got {}",
                bytes.len()
            )));
        }
        let mut evaluations = Vec::with_capacity(len);
        for chunk in bytes[80..].chunks_exact(8) {
            let raw = u64::from_le_bytes(chunk.try_into().unwrap());
            evaluations.push(FieldElement::new(raw));
        }
        Ok(Self {
            witness_commitment,
            quotient_commitment,
            evaluations,
            challenge,
        })
    }
}

/// Prover for generating ZK proofs.
#[derive(Clone, Debug)]
pub struct Prover {
    /// Constraint polynomial
    constraint: Polynomial,
}

impl Prover {
    /// Create new prover with constraint.
    pub fn new(constraint: Polynomial) -> Self {
        Self { constraint }
    }

    /// Generate proof for witness satisfying constraint.
    pub fn prove(&self, witness: &[FieldElement]) -> Proof {
        // 1. Commit to witness
        let witness_commitment = MerkleCommitment::commit(witness);

        // 2. Create witness polynomial
        let witness_poly = Polynomial::new(witness.to_vec());

        // 3. Generate challenge (in practice, use Fiat-Shamir)
        let challenge = FieldElement::new(
            witness_commitment.root()[0] as u64 * 256 + witness_commitment.root()[1] as u64,
        );

        // 4. Evaluate at challenge point
        let witness_eval = witness_poly.evaluate(challenge);
        let constraint_eval = self.constraint.evaluate(challenge);

        // 5. Compute quotient (simplified)
        let quotient_poly = Polynomial::constant(constraint_eval);
        let quotient_commitment = MerkleCommitment::commit(&[quotient_poly.evaluate(challenge)]);

        Proof {
            witness_commitment: *witness_commitment.root(),
            quotient_commitment: *quotient_commitment.root(),
            evaluations: vec![witness_eval, constraint_eval],
            challenge,
        }
    }
}

/// Verifier for checking ZK proofs.
#[derive(Clone, Debug, Default)]
pub struct Verifier;

impl Verifier {
    /// Create new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Verify a proof.
    pub fn verify(&self, proof: &Proof, public_inputs: &[FieldElement]) -> bool {
        // 1. Commitments must be non-zero
        if proof.witness_commitment == [0u8; 32] {
            return false;
        }

        // 2. Evaluations must be consistent
        if proof.evaluations.is_empty() {
            return false;
        }

        // 3. Challenge must match (Fiat-Shamir check)
        let expected_challenge = FieldElement::new(
            proof.witness_commitment[0] as u64 * 256 + proof.witness_commitment[1] as u64,
        );

        if proof.challenge != expected_challenge {
            return false;
        }

        // 4. Public inputs check (simplified)
        for (i, input) in public_inputs.iter().enumerate() {
            if i < proof.evaluations.len() && proof.evaluations[i] != *input {
                // Public input mismatch (in real impl, would check more carefully)
            }
        }

        true
    }
}
