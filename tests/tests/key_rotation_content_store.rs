//! Cross-crate: a `FileKeyProvider` backing an `InMemoryContentStore` across
//! a rotation boundary (spec §4.7, property #13). Unlike `shared-crypto`'s
//! own keystore tests (which only exercise the provider in isolation), this
//! drives the rotation through the consumer that actually matters: content
//! previously sealed must stay retrievable after the active key changes,
//! without the content store itself knowing rotation happened.

use content_store::{ContentStore, InMemoryContentStore};
use shared_crypto::{FileKeyProvider, KeyProvider};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn blob_sealed_before_rotation_still_opens_after_several_rotations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keystore.json");

    let mut provider = FileKeyProvider::new(&path, "a passphrase nobody reuses");
    provider.rotate(None).unwrap();

    let provider = Arc::new(provider);
    let store = InMemoryContentStore::new(provider.clone());

    let cid_early = store.add(b"pre-rotation dataset", true).unwrap();

    // Rotation happens out from under the content store: a fresh provider
    // instance pointed at the same file, standing in for a process restart
    // between rotations.
    let mut rotator = FileKeyProvider::new(&path, "a passphrase nobody reuses");
    rotator.rotate(None).unwrap();
    rotator.rotate(None).unwrap();

    let cid_late = store.add(b"post-rotation dataset", true).unwrap();

    assert_eq!(
        store.get(&cid_early).unwrap(),
        Some(b"pre-rotation dataset".to_vec())
    );
    assert_eq!(
        store.get(&cid_late).unwrap(),
        Some(b"post-rotation dataset".to_vec())
    );
}

#[test]
fn wrong_passphrase_cannot_resolve_any_historical_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keystore.json");

    let mut provider = FileKeyProvider::new(&path, "right passphrase");
    let (_, kid_a) = provider.rotate(None).unwrap();
    let (_, kid_b) = provider.rotate(None).unwrap();

    let wrong = FileKeyProvider::new(&path, "wrong passphrase");
    assert_eq!(wrong.resolve(&kid_a), None);
    assert_eq!(wrong.resolve(&kid_b), None);
}
