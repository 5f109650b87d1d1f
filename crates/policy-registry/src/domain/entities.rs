//! # Redaction Policy
//!
//! A named, immutable policy keyed by redaction operation type.

use crate::domain::errors::PolicyError;
use serde::{Deserialize, Serialize};
use shared_types::{OpType, Role};
use std::collections::{BTreeMap, BTreeSet};

/// A single condition value a policy's `conditions` map may hold. Kept
/// small and closed rather than an open `serde_json::Value`; every
/// consumer (the redaction engine, the consistency-proof engine) needs to
/// pattern-match on these deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionValue {
    /// A free-form string (e.g. a field name allow-listed for MODIFY).
    Text(String),
    /// A numeric bound (e.g. a maximum redaction count per day).
    Number(i64),
    /// A boolean switch.
    Flag(bool),
    /// A list of allowed string values (e.g. the MODIFY field whitelist).
    List(Vec<String>),
}

/// Authorized roles, approval threshold, and timing constraints for one
/// redaction operation type. Immutable once registered (§3): a change in
/// requirements means minting a new `policy_id`, not mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Unique policy identifier.
    pub policy_id: String,
    /// The operation this policy governs.
    pub op_type: OpType,
    /// Free-form conditions consulted by the redaction engine (e.g. the
    /// MODIFY field whitelist) and the consistency-proof engine.
    pub conditions: BTreeMap<String, ConditionValue>,
    /// Roles permitted to request this operation.
    pub authorized_roles: BTreeSet<Role>,
    /// Minimum distinct approvals required before APPROVED.
    pub min_approvals: u32,
    /// Seconds that must elapse after `request.timestamp` before EXECUTED.
    pub time_lock_secs: u32,
    /// Maximum relative drift, in basis points, tolerated between
    /// pre/post `balances` totals during the CONTRACT_STATE consistency
    /// check (§4.4's "within 10%" balance guard, expressed as a
    /// configurable tolerance rather than a hardcoded constant). `0`
    /// requires an exact match.
    pub balance_tolerance_bps: u16,
}

impl RedactionPolicy {
    /// The spec's illustrative "within 10%" balance guard is demo-grade,
    /// not a safe default for an operator who hasn't thought about it, so
    /// the conservative default is an exact match (0 bps) unless a policy
    /// opts into drift explicitly. §4.4 describes the 10%/1000bps figure as
    /// an example, not a mandated constant.
    pub const DEFAULT_BALANCE_TOLERANCE_BPS: u16 = 0;

    /// The illustrative tolerance named in §4.4 (10%), available for a
    /// policy that wants that specific behavior rather than the strict
    /// default.
    pub const SPEC_EXAMPLE_BALANCE_TOLERANCE_BPS: u16 = 1000;

    /// Whether `role` is permitted to request this policy's operation.
    #[must_use]
    pub fn authorizes(&self, role: Role) -> bool {
        self.authorized_roles.contains(&role)
    }
}

/// The set of policies active for a contract, keyed by operation type.
/// Built at contract-creation time; policies are inserted once and never
/// mutated in place.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<OpType, RedactionPolicy>,
}

impl PolicyRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: BTreeMap::new(),
        }
    }

    /// All registered operation types.
    #[must_use]
    pub fn op_types(&self) -> Vec<OpType> {
        self.policies.keys().copied().collect()
    }

    /// Register `policy` for its `op_type`. Policies are immutable once
    /// registered (§3); a second registration for the same `op_type` is
    /// rejected rather than silently overwriting.
    pub fn register(&mut self, policy: RedactionPolicy) -> Result<(), PolicyError> {
        if policy.min_approvals == 0 {
            return Err(PolicyError::ZeroApprovalThreshold);
        }
        if self.policies.contains_key(&policy.op_type) {
            return Err(PolicyError::PolicyAlreadyRegistered(policy.op_type));
        }
        self.policies.insert(policy.op_type, policy);
        Ok(())
    }

    /// The policy governing `op_type`.
    pub fn get_policy(&self, op_type: OpType) -> Result<&RedactionPolicy, PolicyError> {
        self.policies
            .get(&op_type)
            .ok_or(PolicyError::PolicyNotFound(op_type))
    }

    /// Whether `role` is authorized to request `op_type`.
    pub fn authorize(&self, role: Role, op_type: OpType) -> Result<bool, PolicyError> {
        Ok(self.get_policy(op_type)?.authorizes(role))
    }

    /// Minimum approvals required for `op_type`.
    pub fn threshold(&self, op_type: OpType) -> Result<u32, PolicyError> {
        Ok(self.get_policy(op_type)?.min_approvals)
    }

    /// Time-lock, in seconds, required for `op_type` before EXECUTED.
    pub fn time_lock_secs(&self, op_type: OpType) -> Result<u32, PolicyError> {
        Ok(self.get_policy(op_type)?.time_lock_secs)
    }
}
