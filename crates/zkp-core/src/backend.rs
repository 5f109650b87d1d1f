//! # Proof Backend Port
//!
//! The `ProofBackend` collaborator boundary: the core supplies a fixed
//! public-input schema and an opaque witness; the backend returns an opaque
//! proof blob plus the flattened public signals it committed to. Circuit
//! compilation, trusted setup, and witness generation for a production
//! SNARK are out of scope here; `SimulatedProofBackend` stands in for that
//! collaborator using the Goldilocks polynomial commitment from
//! `commitment`/`proof`, exactly as a real backend would but without a real
//! constraint system behind it.

use crate::errors::ZkpError;
use crate::field::FieldElement;
use crate::polynomial::Polynomial;
use crate::proof::{Prover, Verifier};
use shared_types::Hash256;

/// A 256-bit hash split into two 128-bit limbs, matching the wire schema
/// `policyHash{0,1}, merkleRoot{0,1}, ...` from the external interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limbs128(pub u128, pub u128);

impl Limbs128 {
    /// Split a 32-byte hash into its big-endian high/low 128-bit halves.
    #[must_use]
    pub fn from_hash(hash: &Hash256) -> Self {
        let hi: [u8; 16] = hash[0..16].try_into().expect("hash is 32 bytes");
        let lo: [u8; 16] = hash[16..32].try_into().expect("hash is 32 bytes");
        Self(u128::from_be_bytes(hi), u128::from_be_bytes(lo))
    }
}

/// The required public-input schema a caller supplies to `prove`/receives
/// back from `verify`, per the external interface definition.
#[derive(Clone, Debug)]
pub struct PublicInputs {
    /// Hash of the policy that authorized this transformation.
    pub policy_hash: Hash256,
    /// Merkle root of the block the transformation applies to.
    pub merkle_root: Hash256,
    /// Hash of the record/block content before the transformation.
    pub original_hash: Hash256,
    /// Hash of the record/block content after the transformation.
    pub redacted_hash: Hash256,
    /// Contract/account state root before the transformation.
    pub pre_state_hash: Hash256,
    /// Contract/account state root after the transformation.
    pub post_state_hash: Hash256,
    /// Whether the consistency proof engine accepted this transformation.
    pub consistency_check_passed: bool,
    /// Whether the policy registry authorized this transformation.
    pub policy_allowed: bool,
}

impl PublicInputs {
    /// Flatten to the wire-level `public_signals` vector: 12 limbs (six
    /// hashes, two limbs each) followed by the two booleans as 0/1.
    #[must_use]
    pub fn public_signals(&self) -> Vec<u128> {
        let mut out = Vec::with_capacity(14);
        for hash in [
            &self.policy_hash,
            &self.merkle_root,
            &self.original_hash,
            &self.redacted_hash,
            &self.pre_state_hash,
            &self.post_state_hash,
        ] {
            let Limbs128(hi, lo) = Limbs128::from_hash(hash);
            out.push(hi);
            out.push(lo);
        }
        out.push(u128::from(self.consistency_check_passed));
        out.push(u128::from(self.policy_allowed));
        out
    }

    fn to_field_elements(&self) -> Vec<FieldElement> {
        self.public_signals()
            .into_iter()
            .map(FieldElement::from_u128)
            .collect()
    }
}

/// Result of a successful `prove` call.
#[derive(Clone, Debug)]
pub struct ProveOutput {
    /// Opaque bytes a verifier can later check with `verify`.
    pub proof_blob: Vec<u8>,
    /// The flattened public signals the proof commits to.
    pub public_signals: Vec<u128>,
    /// Whether the backend itself considers the proof valid (a real SNARK
    /// backend would always report `true` here for a successfully produced
    /// proof; this mirrors the external interface's return shape).
    pub verified: bool,
}

/// The SNARK collaborator port. Circuit compilation, trusted setup, and
/// witness generation are opaque on the other side of this boundary.
pub trait ProofBackend: Send + Sync {
    /// Produce a proof binding `public_inputs` to `private_witness` such
    /// that a verifier holding only `public_inputs` can check it.
    fn prove(
        &self,
        public_inputs: &PublicInputs,
        private_witness: &[FieldElement],
    ) -> Result<ProveOutput, ZkpError>;

    /// Check a previously produced `proof_blob` against `public_signals`
    /// (as returned by a prior `prove` call).
    fn verify(&self, proof_blob: &[u8], public_signals: &[u128]) -> Result<bool, ZkpError>;
}

/// Goldilocks polynomial-commitment backend. Stands in for a production
/// SNARK: it refuses to prove a transformation whose required booleans are
/// not both true, and otherwise binds the public inputs into the
/// constraint polynomial the teacher's `Prover`/`Verifier` already commit
/// against.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedProofBackend;

impl SimulatedProofBackend {
    /// Construct a new backend instance. Stateless, safe to share.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProofBackend for SimulatedProofBackend {
    fn prove(
        &self,
        public_inputs: &PublicInputs,
        private_witness: &[FieldElement],
    ) -> Result<ProveOutput, ZkpError> {
        if !public_inputs.consistency_check_passed {
            return Err(ZkpError::PublicInputRejected(
                "consistencyCheckPassed is false".into(),
            ));
        }
        if !public_inputs.policy_allowed {
            return Err(ZkpError::PublicInputRejected("policyAllowed is false".into()));
        }

        let constraint = Polynomial::new(public_inputs.to_field_elements());
        let prover = Prover::new(constraint);
        let proof = prover.prove(private_witness);

        Ok(ProveOutput {
            proof_blob: proof.to_bytes(),
            public_signals: public_inputs.public_signals(),
            verified: true,
        })
    }

    fn verify(&self, proof_blob: &[u8], public_signals: &[u128]) -> Result<bool, ZkpError> {
        if public_signals.len() != 14 {
            return Err(ZkpError::InvalidFieldElement);
        }
        let consistency_ok = public_signals[12] == 1;
        let policy_ok = public_signals[13] == 1;
        if !consistency_ok || !policy_ok {
            return Ok(false);
        }

        let proof = crate::proof::Proof::from_bytes(proof_blob)?;
        let field_inputs: Vec<FieldElement> = public_signals[..12]
            .iter()
            .copied()
            .map(FieldElement::from_u128)
            .collect();

        let verifier = Verifier::new();
        Ok(verifier.verify(&proof, &field_inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs(consistency_ok: bool, policy_ok: bool) -> PublicInputs {
        PublicInputs {
            policy_hash: [1u8; 32],
            merkle_root: [2u8; 32],
            original_hash: [3u8; 32],
            redacted_hash: [4u8; 32],
            pre_state_hash: [5u8; 32],
            post_state_hash: [6u8; 32],
            consistency_check_passed: consistency_ok,
            policy_allowed: policy_ok,
        }
    }

    #[test]
    fn limbs_roundtrip_through_hash() {
        let mut hash = [0u8; 32];
        hash[15] = 1; // low byte of the high limb
        hash[31] = 2; // low byte of the low limb
        let limbs = Limbs128::from_hash(&hash);
        assert_eq!(limbs.0, 1);
        assert_eq!(limbs.1, 2);
    }

    #[test]
    fn prove_and_verify_succeeds_when_gates_pass() {
        let backend = SimulatedProofBackend::new();
        let inputs = sample_inputs(true, true);
        let witness = [FieldElement::new(5), FieldElement::new(10)];

        let output = backend.prove(&inputs, &witness).unwrap();
        assert!(output.verified);
        assert_eq!(output.public_signals.len(), 14);

        let ok = backend
            .verify(&output.proof_blob, &output.public_signals)
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn prove_rejects_when_consistency_check_failed() {
        let backend = SimulatedProofBackend::new();
        let inputs = sample_inputs(false, true);
        let err = backend.prove(&inputs, &[]).unwrap_err();
        assert!(matches!(err, ZkpError::PublicInputRejected(_)));
    }

    #[test]
    fn prove_rejects_when_policy_not_allowed() {
        let backend = SimulatedProofBackend::new();
        let inputs = sample_inputs(true, false);
        let err = backend.prove(&inputs, &[]).unwrap_err();
        assert!(matches!(err, ZkpError::PublicInputRejected(_)));
    }

    #[test]
    fn verify_fails_on_mismatched_signal_count() {
        let backend = SimulatedProofBackend::new();
        assert!(backend.verify(&[], &[1, 2, 3]).is_err());
    }
}
