//! Domain entities and errors for the chameleon-hash commitment layer.

pub mod entities;
pub mod errors;

pub use entities::{canonical_message, Block, BlockType, Chain, Transaction};
pub use errors::ChainError;
