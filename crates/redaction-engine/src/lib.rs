//! # Redaction Engine
//!
//! Owns the full redaction request lifecycle (§4.5, §4.6): propose a
//! transformation, bind it to a consistency proof and a SNARK proof, gather
//! multi-party approvals, and execute once policy and timing conditions are
//! satisfied. This is the one crate in the workspace that holds the live
//! medical/contract record field maps and the append-only audit log. Every
//! other crate it depends on is a stateless or pointer-only collaborator
//! injected at construction time.
//!
//! ## Components
//!
//! - `domain` - `MedicalRecord`, `RedactionRequest`, `ZkProofRecord`, `AuditEntry`, the crate's error type
//! - `clock` - the `Clock` port and its production/test implementations
//! - `engine` - `RedactionEngine` and its `request`/`approve`/`execute` lifecycle

#![warn(missing_docs)]

pub mod clock;
pub mod domain;
pub mod engine;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{AuditEntry, EngineError, MedicalRecord, RedactionHint, RedactionRequest, ZkProofRecord};
pub use engine::RedactionEngine;
