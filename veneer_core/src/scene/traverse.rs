// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::tree::SceneTree;

/// An iterator over the direct children of a node.
///
/// Created by [`SceneTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a SceneTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a SceneTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(NodeId {
            idx,
            generation: self.tree.generation[idx as usize],
        })
    }
}

/// Collects the raw child indices of `idx` in sibling order.
///
/// The frame passes mutate the tree while recursing, so they snapshot the
/// child list first instead of holding a [`Children`] borrow.
pub(crate) fn child_indices(tree: &SceneTree, idx: u32) -> alloc::vec::Vec<u32> {
    let mut out = alloc::vec::Vec::new();
    let mut child = tree.first_child[idx as usize];
    while child != INVALID {
        out.push(child);
        child = tree.next_sibling[child as usize];
    }
    out
}
