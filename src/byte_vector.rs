// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ByteVector<N>` (component K) and the supplemented `ByteList<N>`: raw byte sequences backed
//! directly as 32-byte chunks, without going through the generic per-element `Uint8` path. Both
//! types replace their whole backing on write rather than patching individual chunks, since a
//! byte-sequence write is naturally a whole-value operation.

use std::marker::PhantomData;

use crate::error::{Result, SszError};
use crate::gindex::{get_depth, to_gindex};
use crate::hash::Root;
use crate::node::{fill_to_contents, fill_to_depth, getter, leaf, pair, setter, zero_node, Node, NodeRef};
use crate::typ::SszType;
use crate::view::{Backed, BackedView, ViewBacking};

fn depth_for_bytes(n: u64) -> u32 {
    get_depth(((n + 31) / 32).max(1))
}

fn chunks_from_bytes(bytes: &[u8], depth: u32) -> Result<NodeRef> {
    let num_chunks = ((bytes.len() + 31) / 32).max(1);
    let mut chunk_nodes = Vec::with_capacity(num_chunks);
    for c in 0..num_chunks {
        let mut buf = [0u8; 32];
        let start = c * 32;
        let end = (start + 32).min(bytes.len());
        buf[..end - start].copy_from_slice(&bytes[start..end]);
        chunk_nodes.push(leaf(Root::from(buf)));
    }
    fill_to_contents(&chunk_nodes, depth as usize)
}

fn bytes_from_chunks(node: &NodeRef, length: usize, depth: u32) -> Result<Vec<u8>> {
    let num_chunks = ((length + 31) / 32).max(1);
    let mut out = Vec::with_capacity(num_chunks * 32);
    for c in 0..num_chunks {
        let g = to_gindex(c as u64, depth)?;
        let chunk = getter(node, g)?;
        match chunk.as_ref() {
            Node::Leaf(root) => out.extend_from_slice(root.as_bytes()),
            Node::Pair(..) => return Err(SszError::navigation("byte chunk is not a leaf")),
        }
    }
    out.truncate(length);
    Ok(out)
}

/// A fixed-length sequence of `N` bytes.
#[derive(Clone)]
pub struct ByteVector<const N: usize> {
    backed: Backed,
}

impl<const N: usize> ByteVector<N> {
    pub fn default() -> Self {
        Self::from_backed(ViewBacking::new(Self::default_node()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != N {
            return Err(SszError::invalid(format!(
                "ByteVector<{N}> requires exactly {N} bytes, got {}",
                bytes.len()
            )));
        }
        let node = chunks_from_bytes(bytes, Self::tree_depth())?;
        Ok(Self::from_backed(ViewBacking::new(node)))
    }

    pub fn bytes(&self) -> Vec<u8> {
        bytes_from_chunks(&self.node(), N, Self::tree_depth())
            .expect("ByteVector backing always decodes")
    }

    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != N {
            return Err(SszError::invalid(format!(
                "ByteVector<{N}> requires exactly {N} bytes, got {}",
                bytes.len()
            )));
        }
        let node = chunks_from_bytes(bytes, Self::tree_depth())?;
        ViewBacking::rebind(&self.backed, node)
    }
}

impl<const N: usize> SszType for ByteVector<N> {
    fn chunk_count() -> u64 {
        1u64 << Self::tree_depth()
    }

    fn tree_depth() -> u32 {
        depth_for_bytes(N as u64)
    }

    fn default_node() -> NodeRef {
        fill_to_depth(zero_node(0), Self::tree_depth() as usize)
    }

    fn min_encoded_len() -> usize {
        N
    }

    fn max_encoded_len() -> usize {
        N
    }
}

impl<const N: usize> BackedView for ByteVector<N> {
    fn from_backed(backed: Backed) -> Self {
        ByteVector { backed }
    }

    fn backed(&self) -> &Backed {
        &self.backed
    }
}

const LENGTH_GINDEX: crate::gindex::Gindex = crate::gindex::Gindex(3);
const BODY_GINDEX: crate::gindex::Gindex = crate::gindex::Gindex(2);

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

/// A variable-length sequence of up to `N` bytes. Not present in the original spec's component
/// table; added because `ByteVector` alone can't express a bounded-but-variable byte blob, which
/// the reference implementation's byte-string schemas need (e.g. arbitrary extra data fields).
#[derive(Clone)]
pub struct ByteList<const N: usize> {
    backed: Backed,
    _marker: PhantomData<()>,
}

impl<const N: usize> ByteList<N> {
    pub fn default() -> Self {
        Self::from_backed(ViewBacking::new(Self::default_node()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > N {
            return Err(SszError::invalid(format!(
                "ByteList<{N}> cannot hold {} bytes",
                bytes.len()
            )));
        }
        let body = chunks_from_bytes(bytes, depth_for_bytes(N as u64))?;
        let node = pair(body, length_leaf(bytes.len() as u64));
        Ok(Self::from_backed(ViewBacking::new(node)))
    }

    pub fn bytes(&self) -> Vec<u8> {
        let node = self.node();
        let length = read_length(&node).expect("bytelist backing always has a length leaf") as usize;
        let body = getter(&node, BODY_GINDEX).expect("bytelist backing always has a body");
        bytes_from_chunks(&body, length, depth_for_bytes(N as u64))
            .expect("ByteList backing always decodes")
    }

    pub fn len(&self) -> u64 {
        read_length(&self.node()).expect("bytelist backing always has a length leaf")
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > N {
            return Err(SszError::invalid(format!(
                "ByteList<{N}> cannot hold {} bytes",
                bytes.len()
            )));
        }
        let body = chunks_from_bytes(bytes, depth_for_bytes(N as u64))?;
        let node = pair(body, length_leaf(bytes.len() as u64));
        ViewBacking::rebind(&self.backed, node)
    }
}

impl<const N: usize> SszType for ByteList<N> {
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
            fill_to_depth(zero_node(0), depth_for_bytes(N as u64) as usize),
            length_leaf(0),
        )
    }

    fn min_encoded_len() -> usize {
        0
    }

    fn max_encoded_len() -> usize {
        N
    }
}

impl<const N: usize> BackedView for ByteList<N> {
    fn from_backed(backed: Backed) -> Self {
        ByteList {
            backed,
            _marker: PhantomData,
        }
    }

    fn backed(&self) -> &Backed {
        &self.backed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_vector_roundtrip() {
        let bv = ByteVector::<4>::from_bytes(&[1, 2, 3, 4]).unwrap();
        assert_eq!(bv.bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn byte_vector_rejects_wrong_length() {
        assert!(ByteVector::<4>::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn byte_list_roundtrip_and_capacity() {
        let bl = ByteList::<8>::from_bytes(&[9, 8, 7]).unwrap();
        assert_eq!(bl.len(), 3);
        assert_eq!(bl.bytes(), vec![9, 8, 7]);
        assert!(ByteList::<8>::from_bytes(&[0; 9]).is_err());
    }

    #[test]
    fn byte_list_set_bytes_replaces_whole_value() {
        let mut bl = ByteList::<8>::from_bytes(&[1, 2, 3]).unwrap();
        bl.set_bytes(&[5, 5]).unwrap();
        assert_eq!(bl.len(), 2);
        assert_eq!(bl.bytes(), vec![5, 5]);
    }
}
