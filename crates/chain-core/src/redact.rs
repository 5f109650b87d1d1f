//! # Block-Level Redaction Operations
//!
//! §4.1's three operations a redaction may apply directly to a sealed
//! block: `MODIFY` a transaction field, `DELETE` a transaction, or
//! `ANONYMIZE` a transaction's payload reference. Each recomputes the
//! block's canonical message, forges a new `r` under the trapdoor so `id`
//! is preserved, and re-derives `merkle_root` from the resulting tx list.
//!
//! This is the one place in the workspace that calls
//! [`crate::chameleon::forge`] directly, per spec §4.1, "the core never
//! exposes the trapdoor to policy or request layers; only the Ledger
//! Backend invokes `forge` inside an atomic execute step." Callers that
//! hold the trapdoor (the simulated ledger backend, or a test harness
//! standing in for it) are expected to call `redact_block` from inside
//! that atomic step, never to hand the trapdoor further upstream.

use crate::chameleon::{forge, seal, PublicKey, Trapdoor};
use crate::domain::errors::ChainError;
use crate::domain::entities::{Block, Chain, Transaction};
use crate::merkle::merkle_root;
use shared_types::Hash256;

/// One of the three block-level redaction operations from §4.1.
#[derive(Debug, Clone)]
pub enum BlockRedaction {
    /// Replace the transaction at `index` with `replacement`. The
    /// replacement's `id` may differ (a field changed) or match (only
    /// `is_redactable` or `payload_ref` changed); either way the block's
    /// `merkle_root` is recomputed from the resulting tx id list.
    ModifyTx {
        /// Index of the transaction to replace.
        index: usize,
        /// Its replacement.
        replacement: Transaction,
    },
    /// Remove the transaction at `index`, shifting the tail left.
    DeleteTx {
        /// Index of the transaction to remove.
        index: usize,
    },
    /// Clear `payload_ref` to the sentinel value on the transaction at
    /// `index`, leaving every other field (including `id`, so downstream
    /// references by tx id remain valid) untouched.
    AnonymizeTx {
        /// Index of the transaction to anonymize.
        index: usize,
    },
}

const REDACTED_SENTINEL: &str = "[REDACTED]";

fn apply(txs: &mut Vec<Transaction>, redaction: &BlockRedaction) -> Result<(), ChainError> {
    match redaction {
        BlockRedaction::ModifyTx { index, replacement } => {
            let len = txs.len();
            let slot = txs
                .get_mut(*index)
                .ok_or(ChainError::IndexOutOfRange { index: *index, len })?;
            *slot = replacement.clone();
        }
        BlockRedaction::DeleteTx { index } => {
            let len = txs.len();
            if *index >= len {
                return Err(ChainError::IndexOutOfRange { index: *index, len });
            }
            txs.remove(*index);
        }
        BlockRedaction::AnonymizeTx { index } => {
            let len = txs.len();
            let slot = txs
                .get_mut(*index)
                .ok_or(ChainError::IndexOutOfRange { index: *index, len })?;
            slot.payload_ref = Some(REDACTED_SENTINEL.to_string());
        }
    }
    Ok(())
}

/// Apply `redaction` to the block at `index` in `chain`, forging a new `r`
/// under `trapdoor` so the block's `id` is preserved.
///
/// Enforces the edge policies from §4.1: a genesis block
/// (`ChainError::GenesisNotRedactable`) or a block containing any
/// `is_redactable = false` transaction (`ChainError::BlockFrozen`) is
/// rejected before any mutation is attempted. On any failure the block is
/// left completely unchanged; this function never partially applies a
/// redaction.
pub fn redact_block(
    chain: &mut Chain,
    index: usize,
    pk: PublicKey,
    trapdoor: Trapdoor,
    redaction: BlockRedaction,
) -> Result<(), ChainError> {
    let block = chain.block(index)?;
    if block.depth == 0 {
        return Err(ChainError::GenesisNotRedactable);
    }
    if block.has_frozen_tx() {
        return Err(ChainError::BlockFrozen);
    }

    let m_old = block.canonical_message()?;
    let r_old = block.r;
    let original_id = block.id;

    let mut new_txs = block.txs.clone();
    apply(&mut new_txs, &redaction)?;

    let new_tx_ids: Vec<Hash256> = new_txs.iter().map(|tx| tx.id).collect();
    let m_new = crate::domain::entities::canonical_message(
        &new_tx_ids,
        &block.prev_id,
        block.depth,
        block.timestamp,
    )?;

    let r_new = forge(trapdoor, pk, &m_old, r_old, &m_new)?;

    // Defence-in-depth (§4.1 failure modes): the forge already re-verifies
    // internally, but re-derive the id here too, against the *stored*
    // block id rather than a value forge computed, before committing any
    // mutation to the chain.
    if seal(pk, &m_new, r_new) != original_id {
        return Err(ChainError::IdMismatch {
            stored: original_id,
            recomputed: seal(pk, &m_new, r_new),
        });
    }

    let new_root = merkle_root(&new_tx_ids);
    let block = chain.block_mut(index)?;
    block.txs = new_txs;
    block.merkle_root = new_root;
    block.r = r_new;
    // block.id is intentionally untouched: that is the entire point of
    // the chameleon-hash commitment (§4.1).
    Ok(())
}
