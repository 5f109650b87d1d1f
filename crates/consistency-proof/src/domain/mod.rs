//! Domain entities and errors for the consistency-proof engine.

pub mod entities;
pub mod errors;

pub use entities::{
    CheckType, ConsistencyProof, ConsistencyWitness, ContractStateMap, RedactionOperation,
};
pub use errors::ConsistencyError;
