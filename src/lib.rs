// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! A typed, mutable value layer over persistent binary Merkle trees.
//!
//! The tree substrate (`node`, `gindex`, `hash`) is a plain algebra over
//! immutable nodes addressed by generalized index: every mutation returns a
//! new root while sharing whatever sub-structure didn't change. The view
//! layer (`view`, `basic`, `vector`, `list`, `container`, `bitfield`,
//! `byte_vector`, `union`, `stable_container`) wraps that substrate with
//! SSZ-typed accessors, so writing through a deeply nested field rebinds
//! every ancestor up to whichever view currently holds the root. `codec`
//! is the bit-exact SSZ wire format built on top of the same type metadata
//! (`typ`) the tree views use to size themselves.
//!
//! This crate does not implement a CLI, packaging, BLS signatures, or a JSON
//! presentation layer; the `Serialize`/`Deserialize` impls below are a thin
//! passthrough onto the SSZ codec, not a schema-aware JSON encoder.

pub mod basic;
pub mod bitfield;
pub mod byte_vector;
pub mod codec;
pub mod container;
pub mod error;
pub mod gindex;
pub mod hash;
pub mod list;
pub mod node;
pub mod path;
pub mod stable_container;
pub mod subtree;
pub mod typ;
pub mod union;
pub mod vector;
pub mod view;

/// Common imports for working with typed views. Mirrors the teacher's own
/// `smt::prelude` re-export shape: bring in the traits first, concrete view
/// types second.
pub mod prelude {
    pub use crate::codec::SszCodec;
    pub use crate::subtree::Element;
    pub use crate::typ::{AsNode, BasicCodec, Packed, SszType};
    pub use crate::view::{Backed, BackedView, ViewBacking};

    pub use crate::basic::{Boolean, Uint128, Uint16, Uint256, Uint32, Uint64, Uint8};
    pub use crate::bitfield::{Bitlist, Bitvector};
    pub use crate::byte_vector::{ByteList, ByteVector};
    pub use crate::list::List;
    pub use crate::path::{Path, PathSegment};
    pub use crate::stable_container::{OneOf, Variant};
    pub use crate::vector::Vector;

    pub use crate::error::{Result, SszError};
    pub use crate::gindex::Gindex;
    pub use crate::hash::Root;

    pub use crate::{ssz_container, ssz_stable_container, ssz_union};
}
