//! Entities and errors owned by the redaction engine.

pub mod entities;
pub mod errors;

pub use entities::{AuditEntry, MedicalRecord, RedactionHint, RedactionRequest, ZkProofRecord};
pub use errors::EngineError;
