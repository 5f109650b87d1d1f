//! # Consistency Proof
//!
//! Independently re-verifiable evidence that a redaction preserved every
//! chain invariant it did not explicitly waive (§4.4): block integrity,
//! hash-chain linkage, Merkle-root correctness, contract-state
//! transformation shape, and transaction ordering. Each check runs in
//! bounded time against plain witness data, no SNARK required, though a
//! [`ConsistencyProof`]'s `is_valid` flag is exactly the public input the
//! `zkp-core` backend is asked to attest to.
//!
//! ## Components
//!
//! - `domain` - `CheckType`, `ConsistencyWitness`, `ConsistencyProof`, the crate's error type
//! - `checks` - one pure function per check type
//! - `engine` - `ConsistencyEngine::generate`/`verify` dispatch

#![warn(missing_docs)]

pub mod checks;
pub mod domain;
pub mod engine;

pub use domain::{
    CheckType, ConsistencyError, ConsistencyProof, ConsistencyWitness, ContractStateMap,
    RedactionOperation,
};
pub use engine::ConsistencyEngine;
