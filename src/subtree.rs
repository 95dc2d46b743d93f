// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! Generic element access for `Vector`/`List` backings (component H): packed access for basic
//! elements that share 32-byte chunks, and unpacked access for compound elements that each own
//! a whole chunk.

use crate::error::{Result, SszError};
use crate::gindex::{get_depth, to_gindex, Gindex};
use crate::hash::Root;
use crate::node::{getter, leaf, setter, NodeRef, Setter};
use crate::typ::{BasicCodec, Packed};

/// Depth of the chunk tree backing `length` elements of a packed, `per_chunk`-per-chunk type.
pub fn packed_chunk_depth(length: u64, per_chunk: usize) -> u32 {
    let chunk_count = (length + per_chunk as u64 - 1) / per_chunk as u64;
    get_depth(chunk_count.max(1))
}

/// Read element `index` of a packed type out of its shared chunk.
pub fn get_packed<E: Packed + BasicCodec>(node: &NodeRef, index: u64, chunk_depth: u32) -> Result<E> {
    let per_chunk = E::per_chunk() as u64;
    let byte_len = E::byte_length();
    let chunk_index = index / per_chunk;
    let slot = (index % per_chunk) as usize;
    let g = to_gindex(chunk_index, chunk_depth)?;
    let chunk = getter(node, g)?;
    let root = match chunk.as_ref() {
        crate::node::Node::Leaf(r) => *r,
        crate::node::Node::Pair(..) => {
            return Err(SszError::navigation("packed element chunk is not a leaf"))
        }
    };
    let bytes = root.as_bytes();
    let start = slot * byte_len;
    E::from_le_bytes(&bytes[start..start + byte_len])
}

/// Rewrite element `index` of a packed type within its shared chunk, leaving the chunk's other
/// elements untouched, and return the new whole-tree root. Unlike compound element access, a
/// packed write already knows its final chunk value, so there's nothing for a caller to supply
/// through a `Setter` closure.
pub fn set_packed<E: Packed + BasicCodec>(
    node: &NodeRef,
    index: u64,
    chunk_depth: u32,
    value: &E,
) -> Result<NodeRef> {
    let per_chunk = E::per_chunk() as u64;
    let byte_len = E::byte_length();
    let chunk_index = index / per_chunk;
    let slot = (index % per_chunk) as usize;
    let g = to_gindex(chunk_index, chunk_depth)?;
    let chunk = getter(node, g)?;
    let mut bytes = match chunk.as_ref() {
        crate::node::Node::Leaf(r) => *r.as_bytes(),
        crate::node::Node::Pair(..) => {
            return Err(SszError::navigation("packed element chunk is not a leaf"))
        }
    };
    let start = slot * byte_len;
    bytes[start..start + byte_len].copy_from_slice(&value.to_le_bytes());
    let set = setter(node, g, false)?;
    Ok(set(leaf(Root::from(bytes))))
}

/// Gindex of compound (unpacked) element `index` within a tree of the given depth.
pub fn unpacked_gindex(index: u64, depth: u32) -> Result<Gindex> {
    to_gindex(index, depth)
}

pub fn get_unpacked(node: &NodeRef, index: u64, depth: u32) -> Result<NodeRef> {
    getter(node, unpacked_gindex(index, depth)?)
}

pub fn set_unpacked(node: &NodeRef, index: u64, depth: u32) -> Result<Setter> {
    setter(node, unpacked_gindex(index, depth)?, false)
}

/// Uniform element access for `Vector`/`List` bodies, covering both packed basic elements and
/// one-chunk-per-element compound elements. `Vector`/`List` are generic over any `E: Element`;
/// the two families of implementations below (concrete basic types, and the blanket impl for
/// `BackedView` compounds) never overlap, so there's no need for specialization.
pub trait Element: Sized {
    fn chunk_depth(length: u64) -> u32;
    fn read(node: &NodeRef, index: u64, depth: u32) -> Result<Self>;
    fn write(node: &NodeRef, index: u64, depth: u32, value: &Self) -> Result<NodeRef>;
}

macro_rules! impl_packed_element {
    ($name:ident) => {
        impl Element for crate::basic::$name {
            fn chunk_depth(length: u64) -> u32 {
                packed_chunk_depth(length, crate::basic::$name::per_chunk() as u64)
            }
            fn read(node: &NodeRef, index: u64, depth: u32) -> Result<Self> {
                get_packed(node, index, depth)
            }
            fn write(node: &NodeRef, index: u64, depth: u32, value: &Self) -> Result<NodeRef> {
                set_packed(node, index, depth, value)
            }
        }
    };
}

impl_packed_element!(Boolean);
impl_packed_element!(Uint8);
impl_packed_element!(Uint16);
impl_packed_element!(Uint32);
impl_packed_element!(Uint64);
impl_packed_element!(Uint128);
impl_packed_element!(Uint256);

impl<E> Element for E
where
    E: crate::view::BackedView + crate::typ::SszType,
{
    fn chunk_depth(length: u64) -> u32 {
        get_depth(length)
    }

    fn read(node: &NodeRef, index: u64, depth: u32) -> Result<Self> {
        let child = get_unpacked(node, index, depth)?;
        Ok(E::from_backed(crate::view::ViewBacking::new(child)))
    }

    fn write(node: &NodeRef, index: u64, depth: u32, value: &Self) -> Result<NodeRef> {
        let set = set_unpacked(node, index, depth)?;
        Ok(set(value.node()))
    }
}
