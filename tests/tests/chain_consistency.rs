//! Cross-crate: a redaction applied directly to a `chain_core::Chain` via
//! `redact_block`, independently re-checked by every relevant
//! `consistency_proof` check type against the resulting pre/post chains.
//! This is the S4/S5 scenario from spec.md §8, carried one level further
//! than `chain-core`'s own unit tests: here the consistency-proof engine
//! (not just `verify_chain`) is the thing doing the re-checking, exactly as
//! the redaction engine would before binding a SNARK to the transformation.

use chain_core::{
    canonical_message, generate_keypair, merkle_root, redact_block, verify_chain, Block,
    BlockRedaction, BlockType, Chain, Transaction,
};
use consistency_proof::{CheckType, ConsistencyEngine, ConsistencyWitness, RedactionOperation};
use shared_types::{NodeId, OpType, ZERO_HASH};
use std::collections::BTreeSet;

fn tx(id_byte: u8, value: u64, redactable: bool) -> Transaction {
    Transaction {
        id: [id_byte; 32],
        sender: NodeId([1; 32]),
        receiver: NodeId([2; 32]),
        value,
        payload_ref: None,
        is_redactable: redactable,
    }
}

fn sealed_block(
    pk: chain_core::PublicKey,
    depth: u64,
    prev_id: shared_types::Hash256,
    txs: Vec<Transaction>,
    block_type: BlockType,
) -> Block {
    let timestamp = depth;
    let tx_ids: Vec<_> = txs.iter().map(|t| t.id).collect();
    let m = canonical_message(&tx_ids, &prev_id, depth, timestamp).unwrap();
    let r = chain_core::Scalar::new(depth + 1000);
    let id = chain_core::seal(pk, &m, r);
    Block {
        depth,
        prev_id,
        timestamp,
        miner: NodeId([0; 32]),
        txs,
        size: 0,
        merkle_root: merkle_root(&tx_ids),
        r,
        id,
        block_type,
    }
}

fn three_block_chain(pk: chain_core::PublicKey) -> Chain {
    let genesis = sealed_block(pk, 0, ZERO_HASH, vec![], BlockType::Genesis);
    let genesis_id = genesis.id;
    let b1 = sealed_block(
        pk,
        1,
        genesis_id,
        vec![tx(2, 25, true), tx(3, 75, true)],
        BlockType::Normal,
    );
    let b1_id = b1.id;
    let b2 = sealed_block(pk, 2, b1_id, vec![tx(5, 5, true)], BlockType::Normal);
    Chain::from_blocks(vec![genesis, b1, b2])
}

#[test]
fn modify_satisfies_block_integrity_hash_chain_and_merkle_checks() {
    let (pk, trapdoor) = generate_keypair();
    let pre = three_block_chain(pk);
    let mut post = pre.clone();

    redact_block(
        &mut post,
        1,
        pk,
        trapdoor,
        BlockRedaction::ModifyTx {
            index: 1,
            replacement: tx(3, 999, true),
        },
    )
    .unwrap();

    let engine = ConsistencyEngine;
    let operation = RedactionOperation {
        op_type: OpType::Modify,
        target_block: 1,
        redacted_fields: BTreeSet::new(),
        target_tx_indices: vec![1],
    };

    let block_integrity_witness = ConsistencyWitness {
        pre_chain: Some(&pre),
        post_chain: Some(&post),
        ..Default::default()
    };
    let proof = engine
        .generate(
            CheckType::BlockIntegrity,
            &block_integrity_witness,
            &operation,
            "cp-block-integrity",
        )
        .unwrap();
    assert!(proof.is_valid, "{:?}", proof.error_detail);

    let hash_chain_witness = ConsistencyWitness {
        post_chain: Some(&post),
        ..Default::default()
    };
    let proof = engine
        .generate(CheckType::HashChain, &hash_chain_witness, &operation, "cp-hash-chain")
        .unwrap();
    assert!(proof.is_valid, "{:?}", proof.error_detail);

    let proof = engine
        .generate(CheckType::MerkleTree, &hash_chain_witness, &operation, "cp-merkle")
        .unwrap();
    assert!(proof.is_valid, "{:?}", proof.error_detail);
    // The proof's example inclusion path re-verifies independent of the
    // engine that produced it.
    let target = post.block(1).unwrap();
    let tx_ids: Vec<_> = target.txs.iter().map(|t| t.id).collect();
    assert!(chain_core::verify_merkle_proof(
        &tx_ids[0],
        &proof.merkle_proof_path,
        &target.merkle_root,
        0
    ));

    assert!(verify_chain(post.blocks()).is_ok());
    assert_eq!(pre.block(1).unwrap().id, post.block(1).unwrap().id);
}

#[test]
fn delete_satisfies_tx_ordering_and_preserves_downstream_linkage() {
    let (pk, trapdoor) = generate_keypair();
    let pre = three_block_chain(pk);
    let mut post = pre.clone();

    redact_block(
        &mut post,
        1,
        pk,
        trapdoor,
        BlockRedaction::DeleteTx { index: 0 },
    )
    .unwrap();

    let engine = ConsistencyEngine;
    let operation = RedactionOperation {
        op_type: OpType::Delete,
        target_block: 1,
        redacted_fields: BTreeSet::new(),
        target_tx_indices: vec![0],
    };
    let witness = ConsistencyWitness {
        pre_chain: Some(&pre),
        post_chain: Some(&post),
        ..Default::default()
    };

    let proof = engine
        .generate(CheckType::TxOrdering, &witness, &operation, "cp-tx-ordering")
        .unwrap();
    assert!(proof.is_valid, "{:?}", proof.error_detail);

    let proof = engine
        .generate(CheckType::BlockIntegrity, &witness, &operation, "cp-block-integrity-2")
        .unwrap();
    assert!(proof.is_valid, "{:?}", proof.error_detail);

    assert_eq!(post.block(1).unwrap().txs.len(), 1);
    assert_eq!(post.block(1).unwrap().id, pre.block(1).unwrap().id);
    assert_eq!(post.block(2).unwrap().prev_id, post.block(1).unwrap().id);
    assert!(verify_chain(post.blocks()).is_ok());
}

#[test]
fn a_redaction_that_touches_an_undeclared_block_fails_block_integrity() {
    let (pk, trapdoor) = generate_keypair();
    let pre = three_block_chain(pk);
    let mut post = pre.clone();

    redact_block(
        &mut post,
        1,
        pk,
        trapdoor,
        BlockRedaction::DeleteTx { index: 0 },
    )
    .unwrap();

    let engine = ConsistencyEngine;
    // Declare the wrong target block (2, not 1): block 1's change now
    // falls outside the declared target and must be caught.
    let operation = RedactionOperation {
        op_type: OpType::Delete,
        target_block: 2,
        redacted_fields: BTreeSet::new(),
        target_tx_indices: vec![],
    };
    let witness = ConsistencyWitness {
        pre_chain: Some(&pre),
        post_chain: Some(&post),
        ..Default::default()
    };
    let proof = engine
        .generate(CheckType::BlockIntegrity, &witness, &operation, "cp-mislabeled")
        .unwrap();
    assert!(!proof.is_valid);
    assert!(proof.error_detail.unwrap().contains("block 1"));
}

#[test]
fn verify_rejects_a_proof_once_the_chain_diverges_further() {
    let (pk, trapdoor) = generate_keypair();
    let pre = three_block_chain(pk);
    let mut post = pre.clone();
    redact_block(
        &mut post,
        1,
        pk,
        trapdoor,
        BlockRedaction::ModifyTx {
            index: 0,
            replacement: tx(2, 1, true),
        },
    )
    .unwrap();

    let engine = ConsistencyEngine;
    let operation = RedactionOperation {
        op_type: OpType::Modify,
        target_block: 1,
        redacted_fields: BTreeSet::new(),
        target_tx_indices: vec![0],
    };
    let witness = ConsistencyWitness {
        post_chain: Some(&post),
        ..Default::default()
    };
    let proof = engine
        .generate(CheckType::HashChain, &witness, &operation, "cp-then-diverge")
        .unwrap();
    assert!(proof.is_valid);

    // A second, unrelated mutation happens after the proof was minted.
    redact_block(
        &mut post,
        1,
        pk,
        trapdoor,
        BlockRedaction::DeleteTx { index: 0 },
    )
    .unwrap();
    let later_witness = ConsistencyWitness {
        post_chain: Some(&post),
        ..Default::default()
    };
    let still_ok = engine.verify(&proof, &later_witness, &operation).unwrap();
    assert!(!still_ok, "checksum mismatch must invalidate the stale proof");
}
