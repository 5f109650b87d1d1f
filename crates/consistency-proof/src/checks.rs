//! # Check Implementations
//!
//! One function per §4.4 check type. Each returns `Ok(())` when every
//! invariant holds, or `Err(detail)` naming the first violation.

use crate::domain::ContractStateMap;
use chain_core::{canonical_message, merkle_proof, merkle_root, verify_chain, verify_merkle_proof, Chain};
use serde_json::Value;
use shared_types::{OpType, ZERO_HASH};
use std::collections::BTreeSet;

/// `len(pre)==len(post)`; every block except `target_block` recomputes to
/// the same structural hash pre/post.
pub fn block_integrity(pre: &Chain, post: &Chain, target_block: usize) -> Result<(), String> {
    if pre.len() != post.len() {
        return Err(format!(
            "chain length changed: pre={} post={}",
            pre.len(),
            post.len()
        ));
    }
    for i in 0..pre.len() {
        if i == target_block {
            continue;
        }
        let a = pre.block(i).map_err(|e| e.to_string())?;
        let b = post.block(i).map_err(|e| e.to_string())?;
        let hash_a = canonical_message(
            &a.txs.iter().map(|tx| tx.id).collect::<Vec<_>>(),
            &a.prev_id,
            a.depth,
            a.timestamp,
        )
        .map_err(|e| e.to_string())?;
        let hash_b = canonical_message(
            &b.txs.iter().map(|tx| tx.id).collect::<Vec<_>>(),
            &b.prev_id,
            b.depth,
            b.timestamp,
        )
        .map_err(|e| e.to_string())?;
        if hash_a != hash_b {
            return Err(format!("block {i} changed outside the declared target"));
        }
    }
    Ok(())
}

/// `prev_id` linkage, strictly incrementing depth, non-decreasing
/// timestamps, and a well-formed genesis.
pub fn hash_chain(post: &Chain) -> Result<(), String> {
    if post.is_empty() {
        return Err("empty chain has no hash-chain to verify".to_string());
    }
    let genesis = post.block(0).map_err(|e| e.to_string())?;
    if genesis.depth != 0 || genesis.prev_id != ZERO_HASH {
        return Err("genesis must have depth=0 and prev=ZERO_HASH".to_string());
    }

    verify_chain(post.blocks()).map_err(|e| e.to_string())?;

    for i in 1..post.len() {
        let prev = post.block(i - 1).map_err(|e| e.to_string())?;
        let cur = post.block(i).map_err(|e| e.to_string())?;
        if cur.depth != prev.depth + 1 {
            return Err(format!(
                "depth does not increment by 1 at index {i}: {} -> {}",
                prev.depth, cur.depth
            ));
        }
        if cur.timestamp < prev.timestamp {
            return Err(format!("timestamp decreased at index {i}"));
        }
    }
    Ok(())
}

/// The target block's stored `merkle_root` matches its current tx list,
/// and an example inclusion proof for leaf 0 re-verifies.
pub fn merkle_tree(post: &Chain, target_block: usize) -> Result<(), String> {
    let block = post.block(target_block).map_err(|e| e.to_string())?;
    let tx_ids: Vec<_> = block.txs.iter().map(|tx| tx.id).collect();
    let recomputed = merkle_root(&tx_ids);
    if recomputed != block.merkle_root {
        return Err(format!(
            "merkle root mismatch at block {target_block}: stored differs from recomputed"
        ));
    }
    if !tx_ids.is_empty() {
        let path = merkle_proof(&tx_ids, 0).ok_or("failed to build example inclusion proof")?;
        if !verify_merkle_proof(&tx_ids[0], &path, &block.merkle_root, 0) {
            return Err("example inclusion proof for leaf 0 failed to re-verify".to_string());
        }
    }
    Ok(())
}

fn approx_balances_sum(value: &Value) -> Option<i128> {
    match value {
        Value::Object(map) => {
            let mut total = 0i128;
            for v in map.values() {
                total += v.as_i64().map(i128::from)?;
            }
            Some(total)
        }
        Value::Array(items) => {
            let mut total = 0i128;
            for v in items {
                total += v.as_i64().map(i128::from)?;
            }
            Some(total)
        }
        _ => None,
    }
}

/// Declared `redacted_fields` changed and nothing else did; the optional
/// `balances` aggregate drifted within tolerance; the `events` log did not
/// grow.
pub fn contract_state(
    pre: &ContractStateMap,
    post: &ContractStateMap,
    redacted_fields: &BTreeSet<String>,
    balance_tolerance_bps: u16,
) -> Result<(), String> {
    for field in redacted_fields {
        let before = pre.get(field);
        let after = post.get(field);
        if before == after {
            return Err(format!("declared redacted field `{field}` did not change"));
        }
    }

    for (field, before) in pre {
        if redacted_fields.contains(field) {
            continue;
        }
        match post.get(field) {
            Some(after) if after == before => {}
            Some(_) => return Err(format!("undeclared field `{field}` changed")),
            None => return Err(format!("undeclared field `{field}` disappeared")),
        }
    }

    if let (Some(pre_bal), Some(post_bal)) = (pre.get("balances"), post.get("balances")) {
        if let (Some(pre_sum), Some(post_sum)) =
            (approx_balances_sum(pre_bal), approx_balances_sum(post_bal))
        {
            let drift = (pre_sum - post_sum).abs();
            let allowed = (pre_sum.unsigned_abs() * u128::from(balance_tolerance_bps)) / 10_000;
            if u128::try_from(drift).unwrap_or(u128::MAX) > allowed {
                return Err(format!(
                    "balances drifted by {drift}, exceeding tolerance of {balance_tolerance_bps} bps"
                ));
            }
        }
    }

    if let (Some(Value::Array(pre_events)), Some(Value::Array(post_events))) =
        (pre.get("events"), post.get("events"))
    {
        if post_events.len() > pre_events.len() {
            return Err("event log length increased".to_string());
        }
    }

    Ok(())
}

/// Non-redacted tx ids in the target block retain relative order;
/// `DELETE` removes exactly the target indices and renumbers the rest.
pub fn tx_ordering(
    pre: &Chain,
    post: &Chain,
    target_block: usize,
    target_tx_indices: &[usize],
    op_type: OpType,
) -> Result<(), String> {
    let pre_block = pre.block(target_block).map_err(|e| e.to_string())?;
    let post_block = post.block(target_block).map_err(|e| e.to_string())?;

    let removed: BTreeSet<usize> = target_tx_indices.iter().copied().collect();
    let pre_survivors: Vec<_> = pre_block
        .txs
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, tx)| tx.id)
        .collect();

    match op_type {
        OpType::Delete => {
            let post_ids: Vec<_> = post_block.txs.iter().map(|tx| tx.id).collect();
            if post_ids != pre_survivors {
                return Err(
                    "post-redaction tx sequence does not equal pre minus the deleted indices"
                        .to_string(),
                );
            }
        }
        OpType::Modify | OpType::Anonymize => {
            let post_survivor_ids: Vec<_> = post_block
                .txs
                .iter()
                .enumerate()
                .filter(|(i, _)| !removed.contains(i))
                .map(|(_, tx)| tx.id)
                .collect();
            if post_survivor_ids != pre_survivors {
                return Err("relative order of non-redacted transactions changed".to_string());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{BlockType, Scalar};
    use shared_types::NodeId;
    use serde_json::json;

    fn tx(id: u8) -> chain_core::Transaction {
        chain_core::Transaction {
            id: [id; 32],
            sender: NodeId([0; 32]),
            receiver: NodeId([0; 32]),
            value: 1,
            payload_ref: None,
            is_redactable: true,
        }
    }

    fn block(depth: u64, prev: [u8; 32], txs: Vec<chain_core::Transaction>) -> chain_core::Block {
        let ids: Vec<_> = txs.iter().map(|t| t.id).collect();
        chain_core::Block {
            depth,
            prev_id: prev,
            timestamp: depth,
            miner: NodeId([0; 32]),
            txs,
            size: 0,
            merkle_root: merkle_root(&ids),
            r: Scalar::new(0),
            id: [depth as u8 + 1; 32],
            block_type: if depth == 0 {
                BlockType::Genesis
            } else {
                BlockType::Normal
            },
        }
    }

    #[test]
    fn hash_chain_rejects_bad_genesis() {
        let chain = Chain::from_blocks(vec![block(1, [0; 32], vec![])]);
        let err = hash_chain(&chain).unwrap_err();
        assert!(err.contains("genesis"));
    }

    #[test]
    fn hash_chain_accepts_well_formed_chain() {
        let b0 = block(0, ZERO_HASH, vec![]);
        let id0 = b0.id;
        let b1 = block(1, id0, vec![]);
        let chain = Chain::from_blocks(vec![b0, b1]);
        assert!(hash_chain(&chain).is_ok());
    }

    #[test]
    fn merkle_tree_detects_stale_root() {
        let mut b = block(1, [0; 32], vec![tx(1), tx(2)]);
        b.merkle_root = [0xAAu8; 32];
        let chain = Chain::from_blocks(vec![b]);
        assert!(merkle_tree(&chain, 0).is_err());
    }

    #[test]
    fn contract_state_requires_declared_field_to_change() {
        let pre: ContractStateMap = [("name".to_string(), json!("Alice"))].into_iter().collect();
        let post = pre.clone();
        let mut fields = BTreeSet::new();
        fields.insert("name".to_string());
        assert!(contract_state(&pre, &post, &fields, 0).is_err());
    }

    #[test]
    fn contract_state_rejects_undeclared_field_change() {
        let pre: ContractStateMap = [
            ("name".to_string(), json!("Alice")),
            ("diagnosis".to_string(), json!("Cond")),
        ]
        .into_iter()
        .collect();
        let mut post = pre.clone();
        post.insert("name".to_string(), json!("[REDACTED]"));
        post.insert("diagnosis".to_string(), json!("Other"));
        let mut fields = BTreeSet::new();
        fields.insert("name".to_string());
        assert!(contract_state(&pre, &post, &fields, 0).is_err());
    }

    #[test]
    fn contract_state_allows_declared_anonymize() {
        let pre: ContractStateMap = [
            ("name".to_string(), json!("Alice")),
            ("diagnosis".to_string(), json!("Cond")),
        ]
        .into_iter()
        .collect();
        let mut post = pre.clone();
        post.insert("name".to_string(), json!("[REDACTED]"));
        let mut fields = BTreeSet::new();
        fields.insert("name".to_string());
        assert!(contract_state(&pre, &post, &fields, 0).is_ok());
    }

    #[test]
    fn tx_ordering_delete_renumbers() {
        let pre_block = block(1, [0; 32], vec![tx(1), tx(2), tx(3)]);
        let post_block = block(1, [0; 32], vec![tx(1), tx(3)]);
        let pre = Chain::from_blocks(vec![pre_block]);
        let post = Chain::from_blocks(vec![post_block]);
        assert!(tx_ordering(&pre, &post, 0, &[1], OpType::Delete).is_ok());
    }

    #[test]
    fn tx_ordering_rejects_reordering() {
        let pre_block = block(1, [0; 32], vec![tx(1), tx(2), tx(3)]);
        let post_block = block(1, [0; 32], vec![tx(1), tx(3), tx(2)]);
        let pre = Chain::from_blocks(vec![pre_block]);
        let post = Chain::from_blocks(vec![post_block]);
        assert!(tx_ordering(&pre, &post, 0, &[], OpType::Modify).is_err());
    }
}
