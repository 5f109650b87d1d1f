//! # Merkle Tree Utilities
//!
//! SHA-256 Merkle roots and inclusion proofs. Odd levels duplicate their
//! last leaf, matching the convention `verify_merkle_proof` reproduces on
//! the way back up. Interior hashing uses domain-separated `leaf:`/`node:`
//! prefixes to keep a leaf hash from colliding with a pair hash; the single
//! leaf boundary case (spec §8) is exempt from this and returns the leaf
//! unprefixed, so a one-element tree's root is recognizable as that exact
//! leaf rather than a derived digest of it.

use shared_types::Hash256;
use sha2::{Digest, Sha256};

fn hash_leaf(data: &Hash256) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(b"leaf:");
    hasher.update(data);
    hasher.finalize().into()
}

fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(b"node:");
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Compute the Merkle root over `leaves`. Odd-length levels duplicate the
/// last element before pairing. An empty input's root is `SHA-256("")`
/// (spec §8 boundary behavior), not the zero hash. A single-leaf input's
/// root is the leaf itself, unhashed, the other boundary case spec §8 names.
#[must_use]
pub fn merkle_root(leaves: &[Hash256]) -> Hash256 {
    if leaves.is_empty() {
        return Sha256::digest(b"").into();
    }
    if leaves.len() == 1 {
        return leaves[0];
    }
    let mut level: Vec<Hash256> = leaves.iter().map(hash_leaf).collect();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

/// One step of a bottom-up inclusion path: the sibling hash and which side
/// it sits on relative to the node being proved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofStep {
    /// The sibling's hash at this level.
    pub sibling: Hash256,
    /// `true` if the sibling is the left-hand node (i.e. our node is odd-indexed).
    pub sibling_is_left: bool,
}

/// Bottom-up sibling path proving `leaves[index]` is included under
/// `merkle_root(leaves)`.
#[must_use]
pub fn merkle_proof(leaves: &[Hash256], index: usize) -> Option<Vec<ProofStep>> {
    if index >= leaves.len() {
        return None;
    }
    let mut level: Vec<Hash256> = leaves.iter().map(hash_leaf).collect();
    let mut idx = index;
    let mut path = Vec::new();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
        path.push(ProofStep {
            sibling: level[sibling_idx],
            sibling_is_left: idx % 2 == 1,
        });
        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
        idx /= 2;
    }
    Some(path)
}

/// Reconstruct the root from `leaf`, its `path`, and the leaf's original
/// `index`, and compare against `root`. An empty `path` only ever arises
/// from a single-leaf tree (`merkle_proof` never returns one for index `0`
/// of a longer tree), so it's checked against the unhashed leaf directly,
/// matching `merkle_root`'s single-leaf case.
#[must_use]
pub fn verify_merkle_proof(leaf: &Hash256, path: &[ProofStep], root: &Hash256, index: usize) -> bool {
    if path.is_empty() {
        return leaf == root;
    }
    let mut current = hash_leaf(leaf);
    let mut idx = index;
    for step in path {
        current = if idx % 2 == 0 {
            hash_pair(&current, &step.sibling)
        } else {
            hash_pair(&step.sibling, &current)
        };
        idx /= 2;
    }
    &current == root
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_hash() -> impl Strategy<Value = Hash256> {
        proptest::collection::vec(any::<u8>(), 32).prop_map(|v| v.try_into().unwrap())
    }

    proptest! {
        // Property #11: for any leaf list and index, the inclusion proof
        // re-verifies against the tree's root.
        #[test]
        fn merkle_round_trip(leaves in proptest::collection::vec(arb_hash(), 1..32)) {
            let root = merkle_root(&leaves);
            for i in 0..leaves.len() {
                let path = merkle_proof(&leaves, i).unwrap();
                prop_assert!(verify_merkle_proof(&leaves[i], &path, &root, i));
            }
        }

        #[test]
        fn tampering_any_leaf_breaks_its_own_proof(
            leaves in proptest::collection::vec(arb_hash(), 2..16),
            tamper in arb_hash(),
        ) {
            let root = merkle_root(&leaves);
            let idx = 0;
            if tamper != leaves[idx] {
                let path = merkle_proof(&leaves, idx).unwrap();
                prop_assert!(!verify_merkle_proof(&tamper, &path, &root, idx));
            }
        }
    }
}
