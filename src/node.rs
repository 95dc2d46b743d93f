// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! The persistent binary Merkle tree substrate (components B and C): immutable nodes, gindex
//! navigation, rebinding, and the sub-tree builders used to construct default and packed trees.
//!
//! Nodes are logically immutable. Every mutation returns a new node while reusing whatever
//! sub-structure didn't change (spec §3). A node's memoized root, once computed, is cached for
//! the lifetime of that node; the cache is filled in at most once, so a benign data race between
//! concurrent readers would just recompute and store the same value twice (spec §5).

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{Result, SszError};
use crate::gindex::Gindex;
use crate::hash::{h, zero_hash, Root};

/// A node in the persistent binary Merkle tree. Either a 32-byte leaf with no children, or a
/// pair of child references plus a lazily-filled memoized root.
pub enum Node {
    Leaf(Root),
    Pair(NodeRef, NodeRef, Cell<Option<Root>>),
}

/// Shared reference to a node. Cloning a `NodeRef` is a cheap pointer clone; this is what lets
/// unrelated views share sub-structure.
pub type NodeRef = Rc<Node>;

/// A pending rebind: given the replacement node at some gindex, produces the new root node with
/// unchanged siblings shared from the original.
pub type Setter = Box<dyn FnOnce(NodeRef) -> NodeRef>;

/// A pending summarization: collapses the sub-tree at some gindex into a single `Leaf` equal to
/// that sub-tree's current root.
pub type Summarizer = Box<dyn FnOnce() -> NodeRef>;

pub fn leaf(root: Root) -> NodeRef {
    Rc::new(Node::Leaf(root))
}

pub fn pair(left: NodeRef, right: NodeRef) -> NodeRef {
    Rc::new(Node::Pair(left, right, Cell::new(None)))
}

/// The unique all-zero sub-tree of the given depth, as a `Leaf` holding the precomputed root
/// (spec §3: `zero_node(d)` must be interned; returning a `Leaf` whose stored value already
/// equals `zero_hashes[d]` gives every caller the same logical node without building an actual
/// depth-`d` tree).
pub fn zero_node(depth: usize) -> NodeRef {
    leaf(zero_hash(depth))
}

pub fn merkle_root(node: &NodeRef) -> Root {
    match node.as_ref() {
        Node::Leaf(root) => *root,
        Node::Pair(left, right, cached) => {
            if let Some(root) = cached.get() {
                return root;
            }
            let root = h(&merkle_root(left), &merkle_root(right));
            cached.set(Some(root));
            root
        }
    }
}

/// Navigate to the node rooted at gindex `g`.
pub fn getter(node: &NodeRef, g: Gindex) -> Result<NodeRef> {
    if g.0 < 1 {
        return Err(SszError::navigation(format!("gindex {} < 1", g.0)));
    }
    if g.0 == 1 {
        return Ok(node.clone());
    }
    match node.as_ref() {
        Node::Leaf(_) => Err(SszError::navigation(format!(
            "cannot navigate to gindex {} through a leaf",
            g.0
        ))),
        Node::Pair(left, right, _) => {
            if g.0 == 2 {
                return Ok(left.clone());
            }
            if g.0 == 3 {
                return Ok(right.clone());
            }
            let anchor = g.anchor();
            let pivot = anchor >> 1;
            if g.0 < (g.0 | pivot) {
                getter(left, Gindex(g.0 ^ anchor | pivot))
            } else {
                getter(right, Gindex(g.0 ^ anchor | pivot))
            }
        }
    }
}

/// Build a setter that rebinds the node at gindex `g`, sharing every sibling sub-tree untouched
/// by the walk. Descending through a `Leaf` with `g != 1` fails unless `expand` is set, in which
/// case the leaf is treated as a zero sub-tree of the required depth and split before descending.
pub fn setter(node: &NodeRef, g: Gindex, expand: bool) -> Result<Setter> {
    if g.0 < 1 {
        return Err(SszError::navigation(format!("gindex {} < 1", g.0)));
    }
    if g.0 == 1 {
        return Ok(Box::new(|v| v));
    }
    match node.as_ref() {
        Node::Leaf(_) => {
            if !expand {
                return Err(SszError::navigation(format!(
                    "cannot navigate to gindex {} through a leaf without expand",
                    g.0
                )));
            }
            let depth = g.depth() as usize - 1;
            let child = zero_node(depth);
            let expanded = pair(child.clone(), child);
            setter(&expanded, g, true)
        }
        Node::Pair(left, right, _) => {
            if g.0 == 2 {
                let right = right.clone();
                return Ok(Box::new(move |v| pair(v, right)));
            }
            if g.0 == 3 {
                let left = left.clone();
                return Ok(Box::new(move |v| pair(left, v)));
            }
            let anchor = g.anchor();
            let pivot = anchor >> 1;
            if g.0 < (g.0 | pivot) {
                let inner = setter(left, Gindex(g.0 ^ anchor | pivot), expand)?;
                let right = right.clone();
                Ok(Box::new(move |v| pair(inner(v), right)))
            } else {
                let inner = setter(right, Gindex(g.0 ^ anchor | pivot), expand)?;
                let left = left.clone();
                Ok(Box::new(move |v| pair(left, inner(v))))
            }
        }
    }
}

/// Build a closure that replaces the sub-tree at `g` with a single `Leaf` equal to that
/// sub-tree's current Merkle root. Used to collapse zeroed list tails after `pop`.
pub fn summarize_into(node: &NodeRef, g: Gindex) -> Result<Summarizer> {
    let set = setter(node, g, false)?;
    let sub_root = merkle_root(&getter(node, g)?);
    Ok(Box::new(move || set(leaf(sub_root))))
}

/// A perfect tree of depth `d` in which every leaf equals `bottom`. Each level reuses the same
/// child reference, giving full structural sharing.
pub fn fill_to_depth(bottom: NodeRef, depth: usize) -> NodeRef {
    let mut node = bottom;
    for _ in 0..depth {
        node = pair(node.clone(), node);
    }
    node
}

/// A tree of depth `d` whose first `length` leaves equal `bottom` and the remainder are zero.
pub fn fill_to_length(bottom: NodeRef, depth: usize, length: u64) -> Result<NodeRef> {
    let capacity = 1u64 << depth;
    if length > capacity {
        return Err(SszError::invalid(format!(
            "too many nodes: {length} for depth {depth}"
        )));
    }
    if length == capacity {
        return Ok(fill_to_depth(bottom, depth));
    }
    if depth == 0 {
        return if length == 1 {
            Ok(bottom)
        } else {
            Err(SszError::navigation("empty subtree has no root node"))
        };
    }
    if depth == 1 {
        let right = if length > 1 { bottom.clone() } else { zero_node(0) };
        return Ok(pair(bottom, right));
    }
    let pivot = capacity >> 1;
    if length <= pivot {
        Ok(pair(
            fill_to_length(bottom, depth - 1, length)?,
            zero_node(depth - 1),
        ))
    } else {
        Ok(pair(
            fill_to_depth(bottom.clone(), depth - 1),
            fill_to_length(bottom, depth - 1, length - pivot)?,
        ))
    }
}

/// A tree of depth `d` whose leaf `i` is `nodes[i]`, right-padded with zero sub-trees.
pub fn fill_to_contents(nodes: &[NodeRef], depth: usize) -> Result<NodeRef> {
    let capacity = 1usize << depth;
    if nodes.len() > capacity {
        return Err(SszError::invalid(format!(
            "too many nodes: {} for depth {depth}",
            nodes.len()
        )));
    }
    if depth == 0 {
        return if nodes.len() == 1 {
            Ok(nodes[0].clone())
        } else {
            Err(SszError::navigation("empty subtree has no root node"))
        };
    }
    if depth == 1 {
        let right = if nodes.len() > 1 {
            nodes[1].clone()
        } else {
            zero_node(0)
        };
        return Ok(pair(nodes[0].clone(), right));
    }
    let pivot = capacity >> 1;
    if nodes.len() <= pivot {
        Ok(pair(
            fill_to_contents(nodes, depth - 1)?,
            zero_node(depth - 1),
        ))
    } else {
        Ok(pair(
            fill_to_contents(&nodes[..pivot], depth - 1)?,
            fill_to_contents(&nodes[pivot..], depth - 1)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_root_is_itself() {
        let root = Root::repeat_byte(7);
        assert_eq!(merkle_root(&leaf(root)), root);
    }

    #[test]
    fn pair_root_is_memoized_once() {
        let n = pair(leaf(Root::repeat_byte(1)), leaf(Root::repeat_byte(2)));
        let first = merkle_root(&n);
        let second = merkle_root(&n);
        assert_eq!(first, second);
    }

    #[test]
    fn getter_setter_roundtrip_preserves_siblings() {
        let l = leaf(Root::repeat_byte(1));
        let r = leaf(Root::repeat_byte(2));
        let root = pair(l.clone(), r.clone());

        let got = getter(&root, Gindex(2)).unwrap();
        assert_eq!(merkle_root(&got), merkle_root(&l));

        let set = setter(&root, Gindex(3), false).unwrap();
        let replaced = Root::repeat_byte(9);
        let new_root = set(leaf(replaced));
        assert_eq!(merkle_root(&getter(&new_root, Gindex(2)).unwrap()), merkle_root(&l));
        assert_eq!(merkle_root(&getter(&new_root, Gindex(3)).unwrap()), replaced);
    }

    #[test]
    fn setter_rejects_leaf_without_expand() {
        let root = leaf(Root::repeat_byte(1));
        assert!(setter(&root, Gindex(2), false).is_err());
        assert!(setter(&root, Gindex(2), true).is_ok());
    }

    #[test]
    fn fill_to_depth_shares_structure() {
        let bottom = zero_node(0);
        let tree = fill_to_depth(bottom.clone(), 3);
        assert_eq!(merkle_root(&tree), zero_hash(3));
    }

    #[test]
    fn fill_to_contents_matches_fill_to_length_for_equal_elements() {
        let bottom = leaf(Root::repeat_byte(3));
        let nodes = vec![bottom.clone(); 5];
        let a = fill_to_contents(&nodes, 3).unwrap();
        let b = fill_to_length(bottom, 3, 5).unwrap();
        assert_eq!(merkle_root(&a), merkle_root(&b));
    }

    #[test]
    fn summarize_into_collapses_to_same_root() {
        let l = leaf(Root::repeat_byte(1));
        let r = leaf(Root::repeat_byte(2));
        let root = pair(l, r);
        let before = merkle_root(&root);
        let summarize = summarize_into(&root, Gindex(1)).unwrap();
        let after = summarize();
        assert!(matches!(after.as_ref(), Node::Leaf(_)));
        assert_eq!(merkle_root(&after), before);
    }
}
