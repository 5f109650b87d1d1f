//! # Policy Registry
//!
//! Named redaction policies keyed by operation type (§4.3): authorized
//! roles, minimum approvals, and time-lock. Built once at contract-creation
//! time; entries are immutable after registration.

#![warn(missing_docs)]

pub mod domain;

pub use domain::{ConditionValue, PolicyError, PolicyRegistry, RedactionPolicy};
