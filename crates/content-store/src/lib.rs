//! # Content Store
//!
//! The off-chain companion to the chain's on-chain pointers (§3 ContentBlob,
//! §4.7): content-addressed, envelope-encrypted blob storage with pinning.
//! A redaction that touches an attached dataset uploads a new blob and
//! atomically rotates the on-chain CID pointer; the old CID is left pinned
//! until an operator unpins it separately. The store never deletes on a
//! pointer rotation by itself.
//!
//! ## Components
//!
//! - `domain` - `Cid`, `ContentBlob`, `PinState`, the crate's error type
//! - `store` - the `ContentStore` trait and its in-memory default
//! - `external` - the network-attached adapter satisfying the same trait

#![warn(missing_docs)]

pub mod domain;
pub mod external;
pub mod store;

pub use domain::{compute_cid, Cid, ContentBlob, ContentStoreError, PinState};
pub use external::ExternalContentStore;
pub use store::{ContentStore, InMemoryContentStore};
