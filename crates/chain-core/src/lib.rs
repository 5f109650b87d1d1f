//! # Chain Core
//!
//! The chameleon-hash commitment layer and the Block/Chain data model
//! (§4.1, §4.2): a trapdoor-based collision scheme lets an authorized
//! redaction rewrite a block's content while reproducing its original id,
//! so downstream `prev_id` linkage survives the rewrite unmodified.
//!
//! ## Components
//!
//! - `chameleon` - the `CH`/`forge` trapdoor commitment
//! - `merkle` - Merkle roots and inclusion proofs
//! - `hashchain` - linear `prev_id` verification and chain checksums
//! - `domain` - `Block`, `Transaction`, `Chain`, and the crate's error type
//! - `redact` - the MODIFY/DELETE/ANONYMIZE block-level operations

#![warn(missing_docs)]

pub mod chameleon;
pub mod domain;
pub mod hashchain;
pub mod merkle;
pub mod redact;

pub use chameleon::{forge, generate_keypair, seal, PublicKey, Scalar, Trapdoor};
pub use domain::{canonical_message, Block, BlockType, Chain, ChainError, Transaction};
pub use hashchain::{chain_checksum, verify_chain};
pub use merkle::{merkle_proof, merkle_root, verify_merkle_proof, ProofStep};
pub use redact::{redact_block, BlockRedaction};
