//! # Domain Entities
//!
//! Block, Transaction, and Chain: the data model the chameleon-hash
//! commitment layer seals and the redaction engine mutates in place.

use crate::chameleon::Scalar;
use crate::domain::errors::ChainError;
use sha2::{Digest, Sha256};
use shared_types::{BlockId, Hash256, NodeId, Timestamp};
use std::collections::BTreeMap;

/// Distinguishes a genesis block (never redactable) from an ordinary one.
/// Redaction history lives in the audit log (`redaction-engine`), not as a
/// third block kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// The chain's depth-0 anchor. Never redactable.
    Genesis,
    /// An ordinary block sealed by a miner.
    Normal,
}

/// A single transfer or state-changing call referenced by a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Unique transaction id.
    pub id: Hash256,
    /// Sending node.
    pub sender: NodeId,
    /// Receiving node.
    pub receiver: NodeId,
    /// Transferred value, in the chain's smallest unit.
    pub value: u64,
    /// Opaque reference to off-chain payload (content-store CID, typically).
    pub payload_ref: Option<String>,
    /// If `false`, this transaction freezes its containing block against
    /// any redaction (§4.1 edge policy).
    pub is_redactable: bool,
}

/// A sealed block: `id = CH(pk, canonical(block), r)`.
///
/// Redaction mutates `txs`/`merkle_root` and replaces `r` via
/// [`crate::chameleon::forge`] so that `id` is preserved; every other field
/// is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Position in the chain; genesis is 0.
    pub depth: u64,
    /// `id` of the preceding block (`ZERO_HASH` for genesis).
    pub prev_id: BlockId,
    /// Seal time.
    pub timestamp: Timestamp,
    /// Node that sealed this block.
    pub miner: NodeId,
    /// Ordered transactions.
    pub txs: Vec<Transaction>,
    /// Serialized size in bytes, recorded at seal time.
    pub size: u32,
    /// `merkle_root(txs)` at the time this block was last sealed or
    /// re-sealed by a redaction.
    pub merkle_root: Hash256,
    /// Chameleon-hash randomness bound to `id`.
    pub r: Scalar,
    /// `CH(pk, canonical(self), r)`. Invariant: recomputing it from current
    /// fields must reproduce this value exactly.
    pub id: BlockId,
    /// Genesis / normal / redaction-audit.
    pub block_type: BlockType,
}

impl Block {
    /// Whether any contained transaction is flagged non-redactable, which
    /// freezes the entire block (§4.1).
    #[must_use]
    pub fn has_frozen_tx(&self) -> bool {
        self.txs.iter().any(|tx| !tx.is_redactable)
    }

    /// Whether this block may ever be the target of a redaction, independent
    /// of any specific policy: genesis blocks and frozen blocks are always
    /// excluded.
    #[must_use]
    pub fn is_redactable(&self) -> bool {
        self.depth != 0 && self.block_type != BlockType::Genesis && !self.has_frozen_tx()
    }

    /// The canonical message this block's `id` commits to:
    /// `H(tx_ids, prev_id, depth, timestamp)`.
    pub fn canonical_message(&self) -> Result<Hash256, ChainError> {
        let tx_ids: Vec<Hash256> = self.txs.iter().map(|tx| tx.id).collect();
        canonical_message(&tx_ids, &self.prev_id, self.depth, self.timestamp)
    }
}

/// `H(tx_ids, prev_id, depth, timestamp)`: SHA-256 over UTF-8 JSON with
/// sorted keys of `{tx_ids:[…], prev:hex, depth:u64, timestamp:u64}`. Any
/// deviation in this encoding changes the resulting hash, and therefore the
/// block `id` built on top of it.
pub fn canonical_message(
    tx_ids: &[Hash256],
    prev_id: &BlockId,
    depth: u64,
    timestamp: Timestamp,
) -> Result<Hash256, ChainError> {
    // `BTreeMap` serializes as a JSON object with keys in `Ord` order, which
    // for these four field names is already alphabetical: depth, prev,
    // timestamp, tx_ids.
    let mut fields: BTreeMap<&'static str, serde_json::Value> = BTreeMap::new();
    fields.insert("depth", serde_json::Value::from(depth));
    fields.insert("prev", serde_json::Value::String(hex_encode(prev_id)));
    fields.insert("timestamp", serde_json::Value::from(timestamp));
    fields.insert(
        "tx_ids",
        serde_json::Value::Array(
            tx_ids
                .iter()
                .map(|id| serde_json::Value::String(hex_encode(id)))
                .collect(),
        ),
    );

    let encoded =
        serde_json::to_string(&fields).map_err(|e| ChainError::SerializationError(e.to_string()))?;
    Ok(Sha256::digest(encoded.as_bytes()).into())
}

fn hex_encode(bytes: &[u8; 32]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// An ordered sequence of [`Block`]s, genesis first.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// An empty chain (no genesis block yet).
    #[must_use]
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Build a chain from an already-ordered block list without
    /// re-validating linkage (callers that need the invariant checked
    /// should follow with [`crate::hashchain::verify_chain`]).
    #[must_use]
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Append a block to the tip.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// All blocks, genesis first.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access to a block by depth-order index, for redaction
    /// execution. Callers must re-verify `id` after mutating.
    pub fn block_mut(&mut self, index: usize) -> Result<&mut Block, ChainError> {
        let len = self.blocks.len();
        self.blocks
            .get_mut(index)
            .ok_or(ChainError::IndexOutOfRange { index, len })
    }

    /// A block by depth-order index.
    pub fn block(&self, index: usize) -> Result<&Block, ChainError> {
        let len = self.blocks.len();
        self.blocks
            .get(index)
            .ok_or(ChainError::IndexOutOfRange { index, len })
    }

    /// Number of blocks in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the chain has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id_byte: u8, redactable: bool) -> Transaction {
        Transaction {
            id: [id_byte; 32],
            sender: NodeId([1; 32]),
            receiver: NodeId([2; 32]),
            value: 10,
            payload_ref: None,
            is_redactable: redactable,
        }
    }

    #[test]
    fn canonical_message_is_deterministic() {
        let tx_ids = vec![[1u8; 32], [2u8; 32]];
        let a = canonical_message(&tx_ids, &[0u8; 32], 1, 1_000).unwrap();
        let b = canonical_message(&tx_ids, &[0u8; 32], 1, 1_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_message_changes_with_any_field() {
        let tx_ids = vec![[1u8; 32]];
        let base = canonical_message(&tx_ids, &[0u8; 32], 1, 1_000).unwrap();
        let diff_depth = canonical_message(&tx_ids, &[0u8; 32], 2, 1_000).unwrap();
        let diff_timestamp = canonical_message(&tx_ids, &[0u8; 32], 1, 1_001).unwrap();
        assert_ne!(base, diff_depth);
        assert_ne!(base, diff_timestamp);
    }

    #[test]
    fn block_frozen_when_any_tx_nonredactable() {
        let mut block = Block {
            depth: 1,
            prev_id: [0; 32],
            timestamp: 1,
            miner: NodeId([0; 32]),
            txs: vec![tx(1, true), tx(2, false)],
            size: 100,
            merkle_root: [0; 32],
            r: Scalar::new(1),
            id: [9; 32],
            block_type: BlockType::Normal,
        };
        assert!(block.has_frozen_tx());
        assert!(!block.is_redactable());

        block.txs[1].is_redactable = true;
        assert!(!block.has_frozen_tx());
        assert!(block.is_redactable());
    }

    #[test]
    fn genesis_never_redactable() {
        let block = Block {
            depth: 0,
            prev_id: [0; 32],
            timestamp: 0,
            miner: NodeId([0; 32]),
            txs: vec![],
            size: 0,
            merkle_root: [0; 32],
            r: Scalar::new(0),
            id: [0; 32],
            block_type: BlockType::Genesis,
        };
        assert!(!block.is_redactable());
    }
}
