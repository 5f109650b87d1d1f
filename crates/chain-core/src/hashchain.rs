//! # Hash-Chain Linkage Utilities
//!
//! Verifies the linear `prev_id` chain a sequence of blocks must form, and
//! computes a cheap checksum over that chain usable as witness material in
//! a consistency proof.

use crate::domain::{Block, ChainError};
use shared_types::Hash256;
use sha2::{Digest, Sha256};

/// Verify that `blocks[i].prev_id == blocks[i-1].id` for every `i > 0`.
/// Returns the index and the expected/actual ids of the first break.
pub fn verify_chain(blocks: &[Block]) -> Result<(), ChainError> {
    for i in 1..blocks.len() {
        let expected = blocks[i - 1].id;
        let actual = blocks[i].prev_id;
        if expected != actual {
            return Err(ChainError::ChainBreak {
                index: i,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// SHA-256 over the big-endian `(id, prev, depth, timestamp)` fields of
/// every block, concatenated in chain order. A cheap, reproducible witness
/// for "this exact sequence of blocks was the one checked", used by the
/// consistency-proof engine rather than re-running a full chain walk.
#[must_use]
pub fn chain_checksum(blocks: &[Block]) -> Hash256 {
    let mut hasher = Sha256::new();
    for block in blocks {
        hasher.update(block.id);
        hasher.update(block.prev_id);
        hasher.update(block.depth.to_be_bytes());
        hasher.update(block.timestamp.to_be_bytes());
    }
    hasher.finalize().into()
}
