// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation drains each dirty channel and recomputes what depends on it:
//!
//! 1. **TRANSFORM**: recompute `world_transform` as
//!    `parent_world * shadow_transform`.
//! 2. **OPACITY**: recompute `effective_opacity` as
//!    `parent_effective * shadow_opacity`.
//! 3. **CLIP** / **CONTENT**: collect only; backends read the current shadow
//!    clip and referent straight from the tree.
//! 4. **TOPOLOGY**: drain and discard, the traversal order was rebuilt first.
//!
//! [`FrameChanges`] carries raw slot indices so that backends can use the
//! `*_at()` accessors without a generation check per access.

use alloc::vec::Vec;

use super::id::INVALID;
use super::tree::SceneTree;
use crate::dirty;
use crate::transform::Transform3d;

/// The set of changes produced by a single [`SceneTree::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Nodes whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose effective opacity was recomputed.
    pub opacities: Vec<u32>,
    /// Nodes whose shadow clip changed.
    pub clips: Vec<u32>,
    /// Reference nodes whose remote tree was connected or detached.
    pub content: Vec<u32>,
    /// Nodes added since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes removed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.opacities.clear();
        self.clips.clear();
        self.content.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.opacities.is_empty()
            && self.clips.is_empty()
            && self.content.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl SceneTree {
    /// Evaluates the tree, recomputing dirty computed properties and
    /// returning the set of changes.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let parent_idx = self.parent[idx as usize];
            let parent_world = if parent_idx != INVALID {
                self.world_transform[parent_idx as usize]
            } else {
                Transform3d::IDENTITY
            };
            self.world_transform[idx as usize] = parent_world * self.shadow_transform[idx as usize];
        }
        changes.transforms = dirty_transforms;

        let dirty_opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_opacities {
            let parent_idx = self.parent[idx as usize];
            let parent_opacity = if parent_idx != INVALID {
                self.effective_opacity[parent_idx as usize]
            } else {
                1.0
            };
            self.effective_opacity[idx as usize] = parent_opacity * self.shadow_opacity[idx as usize];
        }
        changes.opacities = dirty_opacities;

        changes.clips = self
            .dirty
            .drain(dirty::CLIP)
            .deterministic()
            .run()
            .collect();

        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && self.alive[idx as usize] {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::scene::NodeKind;

    #[test]
    fn world_transform_uses_shadow_not_base() {
        let mut tree = SceneTree::new();
        let parent = tree.create_node(NodeKind::Container);
        let child = tree.create_node(NodeKind::Content);
        tree.add_child(parent, child);

        tree.set_base_transform(parent, Transform3d::from_translation(100.0, 0.0, 0.0));
        tree.set_shadow_transform_at(parent.idx, Transform3d::from_translation(10.0, 0.0, 0.0));
        tree.set_shadow_transform_at(child.idx, Transform3d::from_translation(0.0, 5.0, 0.0));
        let _ = tree.evaluate();

        assert_eq!(
            tree.world_transform(child),
            Transform3d::from_translation(10.0, 5.0, 0.0)
        );
    }

    #[test]
    fn effective_opacity_multiplies_down() {
        let mut tree = SceneTree::new();
        let parent = tree.create_node(NodeKind::Container);
        let child = tree.create_node(NodeKind::Content);
        tree.add_child(parent, child);
        tree.set_shadow_opacity_at(parent.idx, 0.5);
        tree.set_shadow_opacity_at(child.idx, 0.8);
        let _ = tree.evaluate();

        assert!((tree.effective_opacity(child) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn unchanged_shadow_write_is_not_a_change() {
        let mut tree = SceneTree::new();
        let id = tree.create_node(NodeKind::Container);
        let _ = tree.evaluate();

        tree.set_shadow_transform_at(id.idx, Transform3d::IDENTITY);
        tree.set_shadow_opacity_at(id.idx, 1.0);
        tree.set_shadow_clip_at(id.idx, None);
        assert!(tree.evaluate().is_empty());
    }

    #[test]
    fn clip_changes_are_reported() {
        let mut tree = SceneTree::new();
        let id = tree.create_node(NodeKind::Container);
        let _ = tree.evaluate();

        tree.set_shadow_clip_at(id.idx, Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
        let changes = tree.evaluate();
        assert_eq!(changes.clips, [id.idx]);
        assert!(changes.transforms.is_empty());
    }

    #[test]
    fn lifecycle_lists_drain_once() {
        let mut tree = SceneTree::new();
        let id = tree.create_node(NodeKind::Container);
        let changes = tree.evaluate();
        assert!(changes.added.contains(&id.idx));
        assert!(changes.topology_changed);

        assert!(tree.evaluate().added.is_empty());

        tree.destroy_node(id);
        assert!(tree.evaluate().removed.contains(&id.idx));
    }

    #[test]
    fn traversal_order_is_depth_first() {
        let mut tree = SceneTree::new();
        let a = tree.create_node(NodeKind::Container);
        let b = tree.create_node(NodeKind::Container);
        let c = tree.create_node(NodeKind::Content);
        let d = tree.create_node(NodeKind::Content);
        tree.add_child(a, b);
        tree.add_child(a, c);
        tree.add_child(b, d);
        let _ = tree.evaluate();
        assert_eq!(tree.traversal_order(), &[a.idx, b.idx, d.idx, c.idx]);
    }
}
