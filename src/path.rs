// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! Path-based gindex computation (component N, supplemented): a pure, side-effect-free way to
//! compute the generalized index a chain of field/index/length/selector accesses denotes,
//! without touching any tree. This complements the literal hook chain (view.rs) rather than
//! replacing it — callers who already hold a `NodeRef` keep using `getter`/`setter` directly;
//! `Path` is for describing *where* a value lives (e.g. for proofs) independent of any concrete
//! backing.

use crate::error::{Result, SszError};
use crate::gindex::{to_gindex, Gindex, ROOT_GINDEX};

/// One step of a path through a typed tree. `Field`/`Index` both resolve to a child gindex
/// computed from a position and the depth of the container being addressed; `Length` and
/// `Selector` resolve to the fixed right-hand slot used by `List`/`Bitlist` length mix-ins and
/// `Union`/`StableContainer` selector slots.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Index(u64),
    Field(u64),
    Length,
    Selector,
}

/// A chain of path segments, each paired with the depth needed to resolve it into a gindex.
#[derive(Clone, Debug, Default)]
pub struct Path {
    segments: Vec<(PathSegment, u32)>,
}

impl Path {
    pub fn new() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    pub fn index(mut self, i: u64, depth: u32) -> Self {
        self.segments.push((PathSegment::Index(i), depth));
        self
    }

    pub fn field(mut self, i: u64, depth: u32) -> Self {
        self.segments.push((PathSegment::Field(i), depth));
        self
    }

    pub fn length(mut self) -> Self {
        self.segments.push((PathSegment::Length, 1));
        self
    }

    pub fn selector(mut self) -> Self {
        self.segments.push((PathSegment::Selector, 1));
        self
    }

    pub fn segments(&self) -> &[(PathSegment, u32)] {
        &self.segments
    }

    /// Compose this path into the single gindex it denotes relative to the root.
    pub fn to_gindex(&self) -> Result<Gindex> {
        let mut g = ROOT_GINDEX;
        for (segment, depth) in &self.segments {
            let step = match segment {
                PathSegment::Index(i) | PathSegment::Field(i) => to_gindex(*i, *depth)?,
                PathSegment::Length | PathSegment::Selector => to_gindex(1, 1)?,
            };
            g = concat(g, step);
        }
        Ok(g)
    }
}

/// Concatenate gindex `outer` (relative to some root) with `inner` (relative to the node
/// `outer` denotes), producing the gindex of `inner` relative to the original root.
fn concat(outer: Gindex, inner: Gindex) -> Gindex {
    Gindex((outer.0 << inner.depth()) | (inner.0 ^ inner.anchor()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_index_matches_to_gindex() {
        let path = Path::new().index(5, 3);
        assert_eq!(path.to_gindex().unwrap(), to_gindex(5, 3).unwrap());
    }

    #[test]
    fn nested_field_then_index_concatenates() {
        let path = Path::new().field(1, 2).index(0, 1);
        // field 1 of a depth-2 container is gindex 0b1_01 = 5; its index 0 child is gindex 2
        // relative to that; concatenated: (5 << 1) | 0 = 10.
        assert_eq!(path.to_gindex().unwrap(), Gindex(10));
    }

    #[test]
    fn length_segment_is_the_right_child() {
        let path = Path::new().length();
        assert_eq!(path.to_gindex().unwrap(), crate::gindex::RIGHT_GINDEX);
    }
}
