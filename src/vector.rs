// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! `Vector<E, N>` (component I): a fixed-length sequence of `N` elements of type `E`. Basic
//! elements pack several per chunk; compound elements each own a whole chunk. Both cases are
//! handled uniformly through `Element`/`SszType`, so `Vector` itself never needs to know which
//! case it's in.

use std::marker::PhantomData;

use crate::error::{Result, SszError};
use crate::node::{fill_to_depth, zero_node, NodeRef};
use crate::subtree::Element;
use crate::typ::SszType;
use crate::view::{Backed, BackedView, ViewBacking};

#[derive(Clone)]
pub struct Vector<E, const N: usize> {
    backed: Backed,
    _marker: PhantomData<E>,
}

impl<E: Element + SszType + Clone, const N: usize> Vector<E, N> {
    fn check_bounds(index: u64) -> Result<()> {
        if index >= N as u64 {
            return Err(SszError::IndexOutOfRange {
                index,
                length: N as u64,
            });
        }
        Ok(())
    }

    pub fn default() -> Self {
        Self::from_backed(ViewBacking::new(Self::default_node()))
    }

    /// Build a vector from exactly `N` elements. Writes them in one at a time; not a bulk
    /// construction, but `N` is expected to be small enough that this doesn't matter.
    pub fn new(elements: Vec<E>) -> Result<Self> {
        if elements.len() != N {
            return Err(SszError::invalid(format!(
                "Vector<_, {N}> requires exactly {N} elements, got {}",
                elements.len()
            )));
        }
        let mut v = Self::default();
        for (i, e) in elements.into_iter().enumerate() {
            v.set(i as u64, e)?;
        }
        Ok(v)
    }

    pub fn get(&self, index: u64) -> Result<E> {
        Self::check_bounds(index)?;
        E::read(&self.node(), index, Self::tree_depth())
    }

    pub fn set(&mut self, index: u64, value: E) -> Result<()> {
        Self::check_bounds(index)?;
        let new_root = E::write(&self.node(), index, Self::tree_depth(), &value)?;
        ViewBacking::rebind(&self.backed, new_root)
    }

    pub fn len(&self) -> u64 {
        N as u64
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<E: Element + SszType + Clone, const N: usize> SszType for Vector<E, N> {
    fn chunk_count() -> u64 {
        1u64 << Self::tree_depth()
    }

    fn tree_depth() -> u32 {
        E::chunk_depth(N as u64)
    }

    fn default_node() -> NodeRef {
        fill_to_depth(zero_node(0), Self::tree_depth() as usize)
    }

    fn min_encoded_len() -> usize {
        N * E::min_encoded_len()
    }

    fn max_encoded_len() -> usize {
        N * E::max_encoded_len()
    }
}

impl<E, const N: usize> BackedView for Vector<E, N> {
    fn from_backed(backed: Backed) -> Self {
        Vector {
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
    fn vector_get_set_roundtrip() {
        let mut v: Vector<Uint64, 4> = Vector::default();
        assert_eq!(v.get(0).unwrap(), Uint64(0));
        v.set(2, Uint64(42)).unwrap();
        assert_eq!(v.get(2).unwrap(), Uint64(42));
        assert_eq!(v.get(0).unwrap(), Uint64(0));
    }

    #[test]
    fn vector_rejects_out_of_range_index() {
        let v: Vector<Uint64, 4> = Vector::default();
        assert!(v.get(4).is_err());
    }

    #[test]
    fn vector_new_requires_exact_length() {
        assert!(Vector::<Uint64, 3>::new(vec![Uint64(1), Uint64(2)]).is_err());
        let v = Vector::<Uint64, 3>::new(vec![Uint64(1), Uint64(2), Uint64(3)]).unwrap();
        assert_eq!(v.get(1).unwrap(), Uint64(2));
    }

    #[test]
    fn default_vector_root_is_zero_subtree() {
        let v: Vector<Uint64, 4> = Vector::default();
        assert_eq!(v.hash_tree_root(), crate::hash::zero_hash(Vector::<Uint64, 4>::tree_depth() as usize));
    }
}
