//! # Consistency Engine
//!
//! Dispatches a [`CheckType`] to its check implementation in [`crate::checks`]
//! and packages the result into a re-verifiable [`ConsistencyProof`].

use crate::checks;
use crate::domain::{CheckType, ConsistencyError, ConsistencyProof, ConsistencyWitness, RedactionOperation};
use chain_core::chain_checksum;
use sha2::{Digest, Sha256};
use shared_types::Hash256;

/// Stateless dispatcher. Holds no data of its own; every check is a pure
/// function of the witness and operation it is handed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsistencyEngine;

fn state_hash(state: Option<&crate::domain::ContractStateMap>) -> Hash256 {
    let mut hasher = Sha256::new();
    if let Some(map) = state {
        if let Ok(bytes) = serde_json::to_vec(map) {
            hasher.update(&bytes);
        }
    }
    hasher.finalize().into()
}

impl ConsistencyEngine {
    /// Run `check_type` against `witness`/`operation` and produce a
    /// [`ConsistencyProof`] recording the outcome, whether the invariants
    /// held or not. Only returns `Err` when the engine itself cannot
    /// proceed (missing witness data, out-of-range indices, an
    /// unrecognized operation). A failed invariant is reported as
    /// `is_valid: false`, not as an `Err`.
    pub fn generate(
        &self,
        check_type: CheckType,
        witness: &ConsistencyWitness<'_>,
        operation: &RedactionOperation,
        proof_id: impl Into<String>,
    ) -> Result<ConsistencyProof, ConsistencyError> {
        let outcome = self.run_check(check_type, witness, operation)?;

        let post_chain = witness.post_chain;
        let block_range = post_chain
            .filter(|c| !c.is_empty())
            .map(|c| (0, (c.len() - 1) as u64))
            .unwrap_or((0, 0));

        let merkle_proof_path = match (check_type, post_chain) {
            (CheckType::MerkleTree, Some(chain)) => chain
                .block(operation.target_block)
                .ok()
                .map(|block| {
                    let tx_ids: Vec<_> = block.txs.iter().map(|tx| tx.id).collect();
                    chain_core::merkle_proof(&tx_ids, 0).unwrap_or_default()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let hash_chain_checksum = post_chain
            .map(|c| chain_checksum(c.blocks()))
            .unwrap_or([0u8; 32]);

        Ok(ConsistencyProof {
            proof_id: proof_id.into(),
            check_type,
            block_range,
            pre_state_hash: state_hash(witness.pre_state),
            post_state_hash: state_hash(witness.post_state),
            merkle_proof_path,
            hash_chain_checksum,
            is_valid: outcome.is_ok(),
            error_detail: outcome.err(),
        })
    }

    /// Re-run `proof.check_type` against fresh `witness`/`operation` data
    /// and confirm it still validates with no failing invariant.
    pub fn verify(
        &self,
        proof: &ConsistencyProof,
        witness: &ConsistencyWitness<'_>,
        operation: &RedactionOperation,
    ) -> Result<bool, ConsistencyError> {
        if !proof.is_valid {
            return Ok(false);
        }
        let outcome = self.run_check(proof.check_type, witness, operation)?;
        if outcome.is_err() {
            return Ok(false);
        }
        if let Some(chain) = witness.post_chain {
            if chain_checksum(chain.blocks()) != proof.hash_chain_checksum {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn run_check(
        &self,
        check_type: CheckType,
        witness: &ConsistencyWitness<'_>,
        operation: &RedactionOperation,
    ) -> Result<Result<(), String>, ConsistencyError> {
        match check_type {
            CheckType::BlockIntegrity => {
                let pre = witness
                    .pre_chain
                    .ok_or_else(|| ConsistencyError::MissingWitness("pre_chain".to_string()))?;
                let post = witness
                    .post_chain
                    .ok_or_else(|| ConsistencyError::MissingWitness("post_chain".to_string()))?;
                Ok(checks::block_integrity(pre, post, operation.target_block))
            }
            CheckType::HashChain => {
                let post = witness
                    .post_chain
                    .ok_or_else(|| ConsistencyError::MissingWitness("post_chain".to_string()))?;
                Ok(checks::hash_chain(post))
            }
            CheckType::MerkleTree => {
                let post = witness
                    .post_chain
                    .ok_or_else(|| ConsistencyError::MissingWitness("post_chain".to_string()))?;
                if operation.target_block >= post.len() {
                    return Err(ConsistencyError::IndexOutOfRange(format!(
                        "target_block {} (chain has {} blocks)",
                        operation.target_block,
                        post.len()
                    )));
                }
                Ok(checks::merkle_tree(post, operation.target_block))
            }
            CheckType::ContractState => {
                let pre = witness
                    .pre_state
                    .ok_or_else(|| ConsistencyError::MissingWitness("pre_state".to_string()))?;
                let post = witness
                    .post_state
                    .ok_or_else(|| ConsistencyError::MissingWitness("post_state".to_string()))?;
                Ok(checks::contract_state(
                    pre,
                    post,
                    &operation.redacted_fields,
                    witness.balance_tolerance_bps,
                ))
            }
            CheckType::TxOrdering => {
                let pre = witness
                    .pre_chain
                    .ok_or_else(|| ConsistencyError::MissingWitness("pre_chain".to_string()))?;
                let post = witness
                    .post_chain
                    .ok_or_else(|| ConsistencyError::MissingWitness("post_chain".to_string()))?;
                Ok(checks::tx_ordering(
                    pre,
                    post,
                    operation.target_block,
                    &operation.target_tx_indices,
                    operation.op_type,
                ))
            }
        }
    }
}
