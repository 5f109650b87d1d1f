//! # Core Domain Vocabulary
//!
//! Defines the primitive types every other crate in the workspace builds on.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash256`, `BlockId`, `NodeId`, `ApproverId`
//! - **Redaction vocabulary**: `Role`, `OpType`, `RequestStatus`

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte hash (SHA-256 throughout this workspace).
pub type Hash256 = [u8; 32];

/// Unix timestamp in seconds since epoch.
pub type Timestamp = u64;

/// The zero hash, used for the genesis block's `prev_id`.
pub const ZERO_HASH: Hash256 = [0u8; 32];

/// Identifier of a block: the chameleon-hash commitment over its canonical
/// message (spec §3 Block.id).
pub type BlockId = Hash256;

/// Identifier of a node (miner, validator) participating in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Hash256);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex_prefix(&self.0))
    }
}

/// Identifier of a party approving a redaction request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApproverId(pub String);

impl fmt::Display for ApproverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A role a requester or approver may hold.
///
/// `Patient` is present for parity with the original system's vocabulary but
/// is intentionally never granted authorization by a default policy; see
/// `DESIGN.md` Open Question 4. Patient-originated deletions must be routed
/// through an operator-configured proxy role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Chain/system administrator.
    Admin,
    /// Regulatory compliance officer.
    Regulator,
    /// Clinical or research staff with limited authority.
    Researcher,
    /// An ethics review board member.
    EthicsBoard,
    /// The data subject the record concerns. Never auto-authorized.
    Patient,
    /// An ordinary authenticated user with no special standing.
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "ADMIN",
            Role::Regulator => "REGULATOR",
            Role::Researcher => "RESEARCHER",
            Role::EthicsBoard => "ETHICS_BOARD",
            Role::Patient => "PATIENT",
            Role::User => "USER",
        };
        write!(f, "{s}")
    }
}

/// The kind of redaction a request declares (spec §3 RedactionRequest.op_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpType {
    /// Right-to-erasure: remove the record entirely.
    Delete,
    /// Replace specific fields with operator-supplied or sentinel values.
    Modify,
    /// Set a configured sensitive-field set to `[REDACTED]`.
    Anonymize,
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpType::Delete => "DELETE",
            OpType::Modify => "MODIFY",
            OpType::Anonymize => "ANONYMIZE",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of a `RedactionRequest` (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting sufficient approvals.
    Pending,
    /// Threshold reached; awaiting execution.
    Approved,
    /// Explicitly rejected; terminal.
    Rejected,
    /// Applied on-chain; terminal.
    Executed,
}

/// Render the first 4 bytes of a hash as a `0x`-prefixed hex string, for
/// compact log lines and `Display` impls.
pub fn hex_prefix(hash: &Hash256) -> String {
    format!(
        "0x{:02x}{:02x}{:02x}{:02x}…",
        hash[0], hash[1], hash[2], hash[3]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hash_is_all_zero() {
        assert_eq!(ZERO_HASH, [0u8; 32]);
    }

    #[test]
    fn role_display_matches_policy_vocabulary() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::EthicsBoard.to_string(), "ETHICS_BOARD");
    }

    #[test]
    fn hex_prefix_formats_first_four_bytes() {
        let mut h = [0u8; 32];
        h[0] = 0xAB;
        h[1] = 0xCD;
        assert_eq!(hex_prefix(&h), "0xabcd0000…");
    }
}
