// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! `Bitvector<N>` and `Bitlist<N>` (component J): packed single-bit elements, 256 bits per
//! 32-byte chunk. `Bitlist` is backed the same way `List` is — `Pair(body, length)` — with the
//! SSZ delimiting-bit wire trick confined to the codec (spec §6); the tree itself always stores
//! an explicit bit count.

use std::marker::PhantomData;

use crate::error::{Result, SszError};
use crate::gindex::{get_depth, to_gindex};
use crate::hash::Root;
use crate::node::{fill_to_depth, getter, leaf, pair, setter, zero_node, Node, NodeRef};
use crate::typ::SszType;
use crate::view::{Backed, BackedView, ViewBacking};

const BITS_PER_CHUNK: u64 = 256;

fn chunk_depth_for_bits(bit_count: u64) -> u32 {
    let chunks = (bit_count + BITS_PER_CHUNK - 1) / BITS_PER_CHUNK;
    get_depth(chunks.max(1))
}

fn read_bit(node: &NodeRef, bit_index: u64, depth: u32) -> Result<bool> {
    let chunk_index = bit_index / BITS_PER_CHUNK;
    let in_chunk = bit_index % BITS_PER_CHUNK;
    let g = to_gindex(chunk_index, depth)?;
    let chunk = getter(node, g)?;
    let byte = match chunk.as_ref() {
        Node::Leaf(root) => root.as_bytes()[(in_chunk / 8) as usize],
        Node::Pair(..) => return Err(SszError::navigation("bit chunk is not a leaf")),
    };
    Ok((byte >> (in_chunk % 8)) & 1 == 1)
}

fn write_bit(node: &NodeRef, bit_index: u64, depth: u32, value: bool) -> Result<NodeRef> {
    let chunk_index = bit_index / BITS_PER_CHUNK;
    let in_chunk = bit_index % BITS_PER_CHUNK;
    let g = to_gindex(chunk_index, depth)?;
    let chunk = getter(node, g)?;
    let mut bytes = match chunk.as_ref() {
        Node::Leaf(root) => *root.as_bytes(),
        Node::Pair(..) => return Err(SszError::navigation("bit chunk is not a leaf")),
    };
    let byte_index = (in_chunk / 8) as usize;
    let mask = 1u8 << (in_chunk % 8);
    if value {
        bytes[byte_index] |= mask;
    } else {
        bytes[byte_index] &= !mask;
    }
    let set = setter(node, g, false)?;
    Ok(set(leaf(Root::from(bytes))))
}

/// A fixed-length sequence of `N` bits.
#[derive(Clone)]
pub struct Bitvector<const N: usize> {
    backed: Backed,
}

impl<const N: usize> Bitvector<N> {
    pub fn default() -> Self {
        Self::from_backed(ViewBacking::new(Self::default_node()))
    }

    pub fn get(&self, index: u64) -> Result<bool> {
        if index >= N as u64 {
            return Err(SszError::IndexOutOfRange {
                index,
                length: N as u64,
            });
        }
        read_bit(&self.node(), index, Self::tree_depth())
    }

    pub fn set(&mut self, index: u64, value: bool) -> Result<()> {
        if index >= N as u64 {
            return Err(SszError::IndexOutOfRange {
                index,
                length: N as u64,
            });
        }
        let new_root = write_bit(&self.node(), index, Self::tree_depth(), value)?;
        ViewBacking::rebind(&self.backed, new_root)
    }

    pub fn len(&self) -> u64 {
        N as u64
    }
}

impl<const N: usize> SszType for Bitvector<N> {
    fn chunk_count() -> u64 {
        1u64 << Self::tree_depth()
    }

    fn tree_depth() -> u32 {
        chunk_depth_for_bits(N as u64)
    }

    fn default_node() -> NodeRef {
        fill_to_depth(zero_node(0), Self::tree_depth() as usize)
    }

    fn min_encoded_len() -> usize {
        (N + 7) / 8
    }

    fn max_encoded_len() -> usize {
        (N + 7) / 8
    }
}

impl<const N: usize> BackedView for Bitvector<N> {
    fn from_backed(backed: Backed) -> Self {
        Bitvector { backed }
    }

    fn backed(&self) -> &Backed {
        &self.backed
    }
}

const BODY_GINDEX: crate::gindex::Gindex = crate::gindex::Gindex(2);
const LENGTH_GINDEX: crate::gindex::Gindex = crate::gindex::Gindex(3);

fn read_length(node: &NodeRef) -> Result<u64> {
    let length_leaf = getter(node, LENGTH_GINDEX)?;
    match length_leaf.as_ref() {
        Node::Leaf(root) => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&root.as_bytes()[..8]);
            Ok(u64::from_le_bytes(buf))
        }
        Node::Pair(..) => Err(SszError::decode("length slot is not a leaf")),
    }
}

fn length_leaf(length: u64) -> NodeRef {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&length.to_le_bytes());
    leaf(Root::from(bytes))
}

fn set_length_on(node: &NodeRef, length: u64) -> Result<NodeRef> {
    let set = setter(node, LENGTH_GINDEX, false)?;
    Ok(set(length_leaf(length)))
}

/// A variable-length sequence of up to `N` bits.
#[derive(Clone)]
pub struct Bitlist<const N: usize> {
    backed: Backed,
    _marker: PhantomData<()>,
}

impl<const N: usize> Bitlist<N> {
    fn body_depth() -> u32 {
        chunk_depth_for_bits(N as u64)
    }

    pub fn default() -> Self {
        Self::from_backed(ViewBacking::new(Self::default_node()))
    }

    pub fn len(&self) -> u64 {
        read_length(&self.node()).expect("bitlist backing always has a length leaf")
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u64) -> Result<bool> {
        let length = self.len();
        if index >= length {
            return Err(SszError::IndexOutOfRange { index, length });
        }
        let body = getter(&self.node(), BODY_GINDEX)?;
        read_bit(&body, index, Self::body_depth())
    }

    pub fn set(&mut self, index: u64, value: bool) -> Result<()> {
        let length = self.len();
        if index >= length {
            return Err(SszError::IndexOutOfRange { index, length });
        }
        let node = self.node();
        let body = getter(&node, BODY_GINDEX)?;
        let new_body = write_bit(&body, index, Self::body_depth(), value)?;
        let set_body = setter(&node, BODY_GINDEX, false)?;
        ViewBacking::rebind(&self.backed, set_body(new_body))
    }

    pub fn append(&mut self, value: bool) -> Result<()> {
        let length = self.len();
        if length >= N as u64 {
            return Err(SszError::Full);
        }
        let node = self.node();
        let body = getter(&node, BODY_GINDEX)?;
        let new_body = write_bit(&body, length, Self::body_depth(), value)?;
        let set_body = setter(&node, BODY_GINDEX, false)?;
        let with_new_body = set_body(new_body);
        let with_new_length = set_length_on(&with_new_body, length + 1)?;
        ViewBacking::rebind(&self.backed, with_new_length)
    }

    pub fn pop(&mut self) -> Result<bool> {
        let length = self.len();
        if length == 0 {
            return Err(SszError::Empty);
        }
        let value = self.get(length - 1)?;
        let node = self.node();
        let body = getter(&node, BODY_GINDEX)?;
        let cleared_body = write_bit(&body, length - 1, Self::body_depth(), false)?;
        let set_body = setter(&node, BODY_GINDEX, false)?;
        let with_cleared_body = set_body(cleared_body);
        let with_new_length = set_length_on(&with_cleared_body, length - 1)?;
        ViewBacking::rebind(&self.backed, with_new_length)?;
        Ok(value)
    }
}

impl<const N: usize> SszType for Bitlist<N> {
    fn chunk_count() -> u64 {
        2
    }

    fn tree_depth() -> u32 {
        1
    }

    fn is_variable_length() -> bool {
        true
    }

    fn default_node() -> NodeRef {
        pair(
            fill_to_depth(zero_node(0), chunk_depth_for_bits(N as u64) as usize),
            length_leaf(0),
        )
    }

    fn min_encoded_len() -> usize {
        1
    }

    fn max_encoded_len() -> usize {
        (N + 7) / 8 + 1
    }
}

impl<const N: usize> BackedView for Bitlist<N> {
    fn from_backed(backed: Backed) -> Self {
        Bitlist {
            backed,
            _marker: PhantomData,
        }
    }

    fn backed(&self) -> &Backed {
        &self.backed
    }
}
