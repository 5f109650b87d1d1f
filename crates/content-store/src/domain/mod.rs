//! Domain entities and errors for the content store.

pub mod entities;
pub mod errors;

pub use entities::{compute_cid, Cid, ContentBlob, PinState};
pub use errors::ContentStoreError;
