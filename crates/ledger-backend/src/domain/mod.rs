//! Domain entities and errors for the ledger backend.

pub mod entities;
pub mod errors;

pub use entities::{LedgerEvent, LedgerRequest, MedicalRecordPointer, RequestHandle, RequestProof};
pub use errors::LedgerError;
