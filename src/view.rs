// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! The mutable view overlay (component G): every typed view is backed by a `NodeRef` plus an
//! optional hook into its parent. Writing through a child rebinds the child's own backing and,
//! via the hook chain, rebinds every ancestor up to whatever view is holding the root (spec §3,
//! scenario S7). A view with no hook is its own root.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::gindex::Gindex;
use crate::hash::Root;
use crate::node::{merkle_root, setter, NodeRef};

/// Called with a child's freshly rebound node; rebinds the parent and keeps propagating upward.
pub type Hook = Rc<dyn Fn(NodeRef) -> Result<()>>;

/// The mutable cell a view owns: its current backing node, and the hook (if any) that propagates
/// a rebind to whatever holds this view.
pub struct ViewBacking {
    node: NodeRef,
    hook: Option<Hook>,
}

/// Shared handle to a `ViewBacking`. Cloning a `Backed` clones the handle, not the backing: two
/// views sharing one `Backed` observe each other's writes, which is how a child view mutated in
/// place keeps its parent's copy in sync without re-fetching.
pub type Backed = Rc<RefCell<ViewBacking>>;

impl ViewBacking {
    pub fn new(node: NodeRef) -> Backed {
        Rc::new(RefCell::new(ViewBacking { node, hook: None }))
    }

    pub fn with_hook(node: NodeRef, hook: Hook) -> Backed {
        Rc::new(RefCell::new(ViewBacking {
            node,
            hook: Some(hook),
        }))
    }

    pub fn node(this: &Backed) -> NodeRef {
        this.borrow().node.clone()
    }

    pub fn root(this: &Backed) -> Root {
        merkle_root(&this.borrow().node)
    }

    /// Replace the backing node and, if this backing has a hook, call it so the update keeps
    /// propagating to the root. This is the single place a write becomes observable.
    pub fn rebind(this: &Backed, node: NodeRef) -> Result<()> {
        let hook = {
            let mut backing = this.borrow_mut();
            backing.node = node.clone();
            backing.hook.clone()
        };
        if let Some(hook) = hook {
            hook(node)?;
        }
        Ok(())
    }

    /// Build the hook a child view backed at gindex `g` within `this` should carry: invoking it
    /// with the child's new node rebinds `this` at `g` (sharing every untouched sibling) and
    /// then runs `this`'s own hook, so a write at any depth propagates all the way to whichever
    /// view holds the ultimate root.
    pub fn child_hook(this: Backed, g: Gindex) -> Hook {
        Rc::new(move |child_node: NodeRef| {
            let current = ViewBacking::node(&this);
            let set = setter(&current, g, false)?;
            ViewBacking::rebind(&this, set(child_node))
        })
    }
}

/// A view whose value lives entirely in a backing tree. Implemented by every concrete view type
/// (`Vector`, `List`, generated containers, `Bitvector`, …); basic values (component F) are
/// plain value types and don't need this.
pub trait BackedView: Sized {
    fn from_backed(backed: Backed) -> Self;
    fn backed(&self) -> &Backed;

    fn node(&self) -> NodeRef {
        ViewBacking::node(self.backed())
    }

    fn hash_tree_root(&self) -> Root {
        ViewBacking::root(self.backed())
    }
}

impl<T: BackedView> crate::typ::AsNode for T {
    fn as_node(&self) -> NodeRef {
        self.node()
    }

    fn from_node(node: &NodeRef) -> Result<Self> {
        Ok(T::from_backed(ViewBacking::new(node.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{leaf, pair};

    #[test]
    fn child_hook_propagates_rebind_to_root() {
        let left = leaf(Root::repeat_byte(1));
        let right = leaf(Root::repeat_byte(2));
        let root_node = pair(left, right);
        let root_backed = ViewBacking::new(root_node);

        let hook = ViewBacking::child_hook(root_backed.clone(), Gindex(3));
        let child_backed = ViewBacking::with_hook(leaf(Root::repeat_byte(2)), hook);

        ViewBacking::rebind(&child_backed, leaf(Root::repeat_byte(9))).unwrap();

        let expected = pair(leaf(Root::repeat_byte(1)), leaf(Root::repeat_byte(9)));
        assert_eq!(ViewBacking::root(&root_backed), merkle_root(&expected));
    }
}
