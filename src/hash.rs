// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! The injected hash primitive (component A): SHA-256 over a 64-byte input, plus the
//! process-wide, write-once table of zero-subtree roots used throughout the node algebra.

use once_cell::sync::Lazy;
use primitive_types::H256;
use sha2::{Digest, Sha256};

/// A 32-byte Merkle root, or the value stored at a `Leaf`.
pub type Root = H256;

/// The all-zero root, i.e. `zero_hashes()[0]`.
pub const ZERO_ROOT: Root = H256::zero();

/// Deepest tree this crate will build a zero-subtree for. 100 is the depth the reference
/// implementation precomputes, sufficient for lists up to 2^100 elements (spec §4.A).
pub const MAX_ZERO_HASH_DEPTH: usize = 100;

/// `h(l, r) = SHA256(l || r)`. The single injected pure function the rest of the tree algebra
/// is built on top of (spec §4.A, out of scope for substitution elsewhere in this crate).
pub fn h(left: &Root, right: &Root) -> Root {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    let digest = hasher.finalize();
    Root::from_slice(&digest)
}

static ZERO_HASHES: Lazy<[Root; MAX_ZERO_HASH_DEPTH + 1]> = Lazy::new(|| {
    let mut table = [ZERO_ROOT; MAX_ZERO_HASH_DEPTH + 1];
    for depth in 0..MAX_ZERO_HASH_DEPTH {
        table[depth + 1] = h(&table[depth], &table[depth]);
    }
    table
});

/// The root of the unique all-zero subtree of the given depth. Interned: every call for the
/// same `depth` yields the same logical value, which is what lets the node algebra share
/// structure between sparse containers (spec §3's `zero_node` invariant).
pub fn zero_hash(depth: usize) -> Root {
    if depth >= ZERO_HASHES.len() {
        // Depths beyond the precomputed table are not supported by this implementation; the
        // table already covers lists up to 2^100 elements, far beyond any practical SSZ schema.
        let mut root = ZERO_HASHES[ZERO_HASHES.len() - 1];
        for _ in ZERO_HASHES.len() - 1..depth {
            root = h(&root, &root);
        }
        return root;
    }
    ZERO_HASHES[depth]
}
