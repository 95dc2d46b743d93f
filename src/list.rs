// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! `List<E, N>` (component I): a variable-length sequence of up to `N` elements, backed the way
//! the reference implementation backs every variable-length type: `Pair(body, length)`, where
//! `body` is a `Vector<E, N>`-shaped tree and `length` is a leaf holding the element count as a
//! little-endian `u64` in its first 8 bytes (spec §4.I's length mix-in).

use std::marker::PhantomData;

use crate::error::{Result, SszError};
use crate::gindex::Gindex;
use crate::hash::Root;
use crate::node::{fill_to_depth, getter, leaf, pair, setter, zero_node, Node, NodeRef};
use crate::subtree::Element;
use crate::typ::SszType;
use crate::view::{Backed, BackedView, ViewBacking};

const BODY_GINDEX: Gindex = Gindex(2);
const LENGTH_GINDEX: Gindex = Gindex(3);

#[derive(Clone)]
pub struct List<E, const N: usize> {
    backed: Backed,
    _marker: PhantomData<E>,
}

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

impl<E: Element + SszType + Clone + Default, const N: usize> List<E, N> {
    fn this_body_depth() -> u32 {
        E::chunk_depth(N as u64)
    }

    pub fn default() -> Self {
        Self::from_backed(ViewBacking::new(Self::default_node()))
    }

    pub fn new(elements: Vec<E>) -> Result<Self> {
        if elements.len() > N {
            return Err(SszError::invalid(format!(
                "List<_, {N}> cannot hold {} elements",
                elements.len()
            )));
        }
        let mut list = Self::default();
        for e in elements {
            list.append(e)?;
        }
        Ok(list)
    }

    pub fn len(&self) -> u64 {
        read_length(&self.node()).expect("list backing always has a length leaf")
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u64) -> Result<E> {
        let length = self.len();
        if index >= length {
            return Err(SszError::IndexOutOfRange { index, length });
        }
        let body = getter(&self.node(), BODY_GINDEX)?;
        E::read(&body, index, Self::this_body_depth())
    }

    pub fn set(&mut self, index: u64, value: E) -> Result<()> {
        let length = self.len();
        if index >= length {
            return Err(SszError::IndexOutOfRange { index, length });
        }
        let node = self.node();
        let body = getter(&node, BODY_GINDEX)?;
        let new_body = E::write(&body, index, Self::this_body_depth(), &value)?;
        let set_body = setter(&node, BODY_GINDEX, false)?;
        ViewBacking::rebind(&self.backed, set_body(new_body))
    }

    pub fn append(&mut self, value: E) -> Result<()> {
        let length = self.len();
        if length >= N as u64 {
            return Err(SszError::Full);
        }
        let node = self.node();
        let body = getter(&node, BODY_GINDEX)?;
        let new_body = E::write(&body, length, Self::this_body_depth(), &value)?;
        let set_body = setter(&node, BODY_GINDEX, false)?;
        let set_length = setter(&node, LENGTH_GINDEX, false)?;
        let with_new_body = set_body(new_body);
        let with_new_length = set_length_on(&with_new_body, length + 1)?;
        ViewBacking::rebind(&self.backed, with_new_length)
    }

    pub fn pop(&mut self) -> Result<E> {
        let length = self.len();
        if length == 0 {
            return Err(SszError::Empty);
        }
        let value = self.get(length - 1)?;
        let node = self.node();
        let body = getter(&node, BODY_GINDEX)?;
        let cleared_body = E::write(&body, length - 1, Self::this_body_depth(), &E::default())?;
        let set_body = setter(&node, BODY_GINDEX, false)?;
        let set_length = setter(&node, LENGTH_GINDEX, false)?;
        let with_cleared_body = set_body(cleared_body);
        let with_new_length = set_length_on(&with_cleared_body, length - 1)?;
        ViewBacking::rebind(&self.backed, with_new_length)?;
        Ok(value)
    }
}

fn set_length_on(node: &NodeRef, length: u64) -> Result<NodeRef> {
    let set = setter(node, LENGTH_GINDEX, false)?;
    Ok(set(length_leaf(length)))
}

impl<E: Element + SszType + Clone, const N: usize> SszType for List<E, N> {
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
            fill_to_depth(zero_node(0), E::chunk_depth(N as u64) as usize),
            length_leaf(0),
        )
    }

    fn min_encoded_len() -> usize {
        0
    }

    fn max_encoded_len() -> usize {
        N * E::max_encoded_len()
    }
}

impl<E, const N: usize> BackedView for List<E, N> {
    fn from_backed(backed: Backed) -> Self {
        List {
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
    use crate::basic::Uint64;

    #[test]
    fn append_get_pop_roundtrip() {
        let mut l: List<Uint64, 8> = List::default();
        assert_eq!(l.len(), 0);
        l.append(Uint64(1)).unwrap();
        l.append(Uint64(2)).unwrap();
        l.append(Uint64(3)).unwrap();
        assert_eq!(l.len(), 3);
        assert_eq!(l.get(1).unwrap(), Uint64(2));

        let popped = l.pop().unwrap();
        assert_eq!(popped, Uint64(3));
        assert_eq!(l.len(), 2);
        assert!(l.get(2).is_err());
    }

    #[test]
    fn append_rejects_beyond_capacity() {
        let mut l: List<Uint64, 2> = List::default();
        l.append(Uint64(1)).unwrap();
        l.append(Uint64(2)).unwrap();
        assert!(matches!(l.append(Uint64(3)), Err(SszError::Full)));
    }

    #[test]
    fn pop_rejects_on_empty() {
        let mut l: List<Uint64, 2> = List::default();
        assert!(matches!(l.pop(), Err(SszError::Empty)));
    }

    #[test]
    fn empty_list_root_mixes_in_zero_length() {
        let l: List<Uint64, 4> = List::default();
        let body_depth = Uint64::chunk_depth(4);
        let expected = crate::hash::h(&crate::hash::zero_hash(body_depth as usize), &crate::hash::zero_hash(0));
        assert_eq!(l.hash_tree_root(), expected);
    }
}
