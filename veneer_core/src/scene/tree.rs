// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays scene storage with allocation, topology, and property management.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::animation::{Animation, AnimationRuntime};
use crate::dirty;
use crate::error::AnimationError;
use crate::pan_zoom::{FrameMetrics, SharedController};
use crate::transform::Transform3d;

use super::id::{INVALID, NodeId, RemoteTreeId};
use super::node::{FixedPosition, NodeKind, ScaleFactors};
use super::traverse::Children;

/// Struct-of-arrays storage for one scene tree.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; destroyed nodes are recycled via a free list and
/// generation counters reject stale handles.
///
/// Base properties (`base_*`, clip, fixed position, animations, metrics…)
/// belong to the producer that built the tree. Shadow properties are the
/// compositor's per-frame output and are only written by the frame passes.
#[derive(Debug)]
pub struct SceneTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) root: u32,
    pub(crate) primary_scrollable: u32,

    // -- Producer properties --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) base_transform: Vec<Transform3d>,
    pub(crate) base_opacity: Vec<f32>,
    pub(crate) clip: Vec<Option<Rect>>,
    pub(crate) visible_rect: Vec<Rect>,
    pub(crate) fixed: Vec<Option<FixedPosition>>,
    pub(crate) scale_factors: Vec<ScaleFactors>,
    pub(crate) animations: Vec<Vec<Animation>>,
    pub(crate) animation_runtime: Vec<Vec<AnimationRuntime>>,
    pub(crate) frame_metrics: Vec<Option<FrameMetrics>>,
    pub(crate) remote_tree: Vec<Option<RemoteTreeId>>,

    // -- Compositor-side attachments --
    pub(crate) pan_zoom: Vec<Option<SharedController>>,
    pub(crate) referent: Vec<Option<RemoteTreeId>>,

    // -- Shadow properties (written by the frame passes) --
    pub(crate) shadow_transform: Vec<Transform3d>,
    pub(crate) shadow_opacity: Vec<f32>,
    pub(crate) shadow_clip: Vec<Option<Rect>>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Transform3d>,
    pub(crate) effective_opacity: Vec<f32>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            root: INVALID,
            primary_scrollable: INVALID,
            kind: Vec::new(),
            base_transform: Vec::new(),
            base_opacity: Vec::new(),
            clip: Vec::new(),
            visible_rect: Vec::new(),
            fixed: Vec::new(),
            scale_factors: Vec::new(),
            animations: Vec::new(),
            animation_runtime: Vec::new(),
            frame_metrics: Vec::new(),
            remote_tree: Vec::new(),
            pan_zoom: Vec::new(),
            referent: Vec::new(),
            shadow_transform: Vec::new(),
            shadow_opacity: Vec::new(),
            shadow_clip: Vec::new(),
            world_transform: Vec::new(),
            effective_opacity: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new node and returns its handle.
    ///
    /// The node starts with identity transforms, full opacity, no clip, no
    /// animations, and no parent.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.alive[i] = true;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.base_transform[i] = Transform3d::IDENTITY;
            self.base_opacity[i] = 1.0;
            self.clip[i] = None;
            self.visible_rect[i] = Rect::ZERO;
            self.fixed[i] = None;
            self.scale_factors[i] = ScaleFactors::IDENTITY;
            self.animations[i].clear();
            self.animation_runtime[i].clear();
            self.frame_metrics[i] = None;
            self.remote_tree[i] = None;
            self.pan_zoom[i] = None;
            self.referent[i] = None;
            self.shadow_transform[i] = Transform3d::IDENTITY;
            self.shadow_opacity[i] = 1.0;
            self.shadow_clip[i] = None;
            self.world_transform[i] = Transform3d::IDENTITY;
            self.effective_opacity[i] = 1.0;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.base_transform.push(Transform3d::IDENTITY);
            self.base_opacity.push(1.0);
            self.clip.push(None);
            self.visible_rect.push(Rect::ZERO);
            self.fixed.push(None);
            self.scale_factors.push(ScaleFactors::IDENTITY);
            self.animations.push(Vec::new());
            self.animation_runtime.push(Vec::new());
            self.frame_metrics.push(None);
            self.remote_tree.push(None);
            self.pan_zoom.push(None);
            self.referent.push(None);
            self.shadow_transform.push(Transform3d::IDENTITY);
            self.shadow_opacity.push(1.0);
            self.shadow_clip.push(None);
            self.world_transform.push(Transform3d::IDENTITY);
            self.effective_opacity.push(1.0);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }
        if self.root == idx {
            self.root = INVALID;
        }
        if self.primary_scrollable == idx {
            self.primary_scrollable = INVALID;
        }

        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.alive[idx as usize] = false;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Designates the root node every frame pass starts from.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has a parent.
    pub fn set_root(&mut self, id: NodeId) {
        self.validate(id);
        assert!(
            self.parent[id.idx as usize] == INVALID,
            "root node cannot have a parent"
        );
        self.root = id.idx;
        self.traversal_dirty = true;
        self.dirty.mark(id.idx, dirty::TOPOLOGY);
    }

    /// Returns the root node, if one is designated.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.handle(self.root)
    }

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(c != self.root, "root node cannot become a child");

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.handle(self.parent[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    // -- Scrollable discovery --

    /// Designates the primary scrollable node used by the fallback path.
    pub fn set_primary_scrollable(&mut self, id: Option<NodeId>) {
        self.primary_scrollable = match id {
            Some(id) => {
                self.validate(id);
                id.idx
            }
            None => INVALID,
        };
    }

    /// Returns the primary scrollable node.
    ///
    /// That is the designated node if any, else the first scrollable
    /// container in breadth-first order from the root, else the root.
    #[must_use]
    pub fn primary_scrollable(&self) -> Option<NodeId> {
        if self.primary_scrollable != INVALID {
            return self.handle(self.primary_scrollable);
        }
        if self.root == INVALID {
            return None;
        }
        let mut queue = VecDeque::new();
        queue.push_back(self.root);
        while let Some(idx) = queue.pop_front() {
            if self.is_scrollable_at(idx) {
                return self.handle(idx);
            }
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                queue.push_back(child);
                child = self.next_sibling[child as usize];
            }
        }
        self.handle(self.root)
    }

    /// Returns every scrollable container reachable from the root, in
    /// depth-first pre-order.
    #[must_use]
    pub fn scrollable_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.root != INVALID {
            self.collect_scrollable(self.root, &mut out);
        }
        out
    }

    // -- Producer property getters --

    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the producer-set base transform.
    #[must_use]
    pub fn base_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.base_transform[id.idx as usize]
    }

    /// Returns the producer-set base opacity.
    #[must_use]
    pub fn base_opacity(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.base_opacity[id.idx as usize]
    }

    /// Returns the producer-set clip rectangle.
    #[must_use]
    pub fn clip(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.clip[id.idx as usize]
    }

    /// Returns the fixed-position data, if the node is fixed.
    #[must_use]
    pub fn fixed_position(&self, id: NodeId) -> Option<FixedPosition> {
        self.validate(id);
        self.fixed[id.idx as usize]
    }

    /// Returns the resolution scale factors.
    #[must_use]
    pub fn scale_factors(&self, id: NodeId) -> ScaleFactors {
        self.validate(id);
        self.scale_factors[id.idx as usize]
    }

    /// Returns the node's animations.
    #[must_use]
    pub fn animations(&self, id: NodeId) -> &[Animation] {
        self.validate(id);
        &self.animations[id.idx as usize]
    }

    /// Returns the frame metrics of a scrollable container.
    #[must_use]
    pub fn frame_metrics(&self, id: NodeId) -> Option<&FrameMetrics> {
        self.validate(id);
        self.frame_metrics[id.idx as usize].as_ref()
    }

    /// Returns the remote tree this reference node stitches in.
    #[must_use]
    pub fn remote_tree(&self, id: NodeId) -> Option<RemoteTreeId> {
        self.validate(id);
        self.remote_tree[id.idx as usize]
    }

    /// Returns the remote tree currently connected as this node's content.
    #[must_use]
    pub fn referent(&self, id: NodeId) -> Option<RemoteTreeId> {
        self.validate(id);
        self.referent[id.idx as usize]
    }

    /// Returns the attached pan/zoom controller.
    #[must_use]
    pub fn pan_zoom_controller(&self, id: NodeId) -> Option<&SharedController> {
        self.validate(id);
        self.pan_zoom[id.idx as usize].as_ref()
    }

    // -- Producer property setters --

    /// Sets the base transform.
    pub fn set_base_transform(&mut self, id: NodeId, transform: Transform3d) {
        self.validate(id);
        self.base_transform[id.idx as usize] = transform;
    }

    /// Sets the base opacity.
    pub fn set_base_opacity(&mut self, id: NodeId, opacity: f32) {
        self.validate(id);
        self.base_opacity[id.idx as usize] = opacity;
    }

    /// Sets the clip rectangle.
    pub fn set_clip(&mut self, id: NodeId, clip: Option<Rect>) {
        self.validate(id);
        self.clip[id.idx as usize] = clip;
    }

    /// Sets the bounds of the node's visible region.
    pub fn set_visible_rect(&mut self, id: NodeId, rect: Rect) {
        self.validate(id);
        self.visible_rect[id.idx as usize] = rect;
    }

    /// Marks the node fixed-position (or clears it with `None`).
    pub fn set_fixed_position(&mut self, id: NodeId, fixed: Option<FixedPosition>) {
        self.validate(id);
        self.fixed[id.idx as usize] = fixed;
    }

    /// Sets the resolution scale factors.
    pub fn set_scale_factors(&mut self, id: NodeId, factors: ScaleFactors) {
        self.validate(id);
        self.scale_factors[id.idx as usize] = factors;
    }

    /// Replaces the node's animations, preparing runtime state for each.
    ///
    /// On error the node keeps its previous animations.
    pub fn set_animations(
        &mut self,
        id: NodeId,
        animations: Vec<Animation>,
    ) -> Result<(), AnimationError> {
        self.validate(id);
        let runtime = animations
            .iter()
            .map(AnimationRuntime::prepare)
            .collect::<Result<Vec<_>, _>>()?;
        self.animations[id.idx as usize] = animations;
        self.animation_runtime[id.idx as usize] = runtime;
        Ok(())
    }

    /// Replaces the node's animations with precomputed runtime state.
    ///
    /// The two sequences must be index-aligned: same length, and each
    /// runtime entry sized to its animation's segments.
    pub fn set_animations_with_runtime(
        &mut self,
        id: NodeId,
        animations: Vec<Animation>,
        runtime: Vec<AnimationRuntime>,
    ) -> Result<(), AnimationError> {
        self.validate(id);
        if animations.len() != runtime.len() {
            return Err(AnimationError::RuntimeLengthMismatch {
                animations: animations.len(),
                runtime: runtime.len(),
            });
        }
        for (index, (animation, state)) in animations.iter().zip(&runtime).enumerate() {
            animation.validate()?;
            state.check_aligned(index, animation)?;
        }
        self.animations[id.idx as usize] = animations;
        self.animation_runtime[id.idx as usize] = runtime;
        Ok(())
    }

    /// Sets the frame metrics of a scrollable container.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a container.
    pub fn set_frame_metrics(&mut self, id: NodeId, metrics: Option<FrameMetrics>) {
        self.validate(id);
        assert!(
            self.kind[id.idx as usize] == NodeKind::Container,
            "frame metrics require a container node"
        );
        self.frame_metrics[id.idx as usize] = metrics;
    }

    /// Makes the node a reference node for the given remote tree.
    pub fn set_remote_tree(&mut self, id: NodeId, remote: Option<RemoteTreeId>) {
        self.validate(id);
        self.remote_tree[id.idx as usize] = remote;
    }

    /// Attaches (or detaches) a pan/zoom controller.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a container.
    pub fn set_pan_zoom_controller(&mut self, id: NodeId, controller: Option<SharedController>) {
        self.validate(id);
        assert!(
            self.kind[id.idx as usize] == NodeKind::Container,
            "pan/zoom controllers attach to container nodes"
        );
        self.pan_zoom[id.idx as usize] = controller;
    }

    // -- Shadow property getters --

    /// Returns this frame's shadow transform.
    #[must_use]
    pub fn shadow_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.shadow_transform[id.idx as usize]
    }

    /// Returns this frame's shadow opacity.
    #[must_use]
    pub fn shadow_opacity(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.shadow_opacity[id.idx as usize]
    }

    /// Returns this frame's shadow clip.
    #[must_use]
    pub fn shadow_clip(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.shadow_clip[id.idx as usize]
    }

    /// Returns the computed world transform.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the computed effective opacity.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_opacity(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.effective_opacity[id.idx as usize]
    }

    // -- Raw-index accessors for backends --

    /// Returns the computed world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Transform3d {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.world_transform[idx as usize]
    }

    /// Returns the shadow clip at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn shadow_clip_at(&self, idx: u32) -> Option<Rect> {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.shadow_clip[idx as usize]
    }

    // -- Shadow writes (frame passes only) --

    pub(crate) fn set_shadow_transform_at(&mut self, idx: u32, transform: Transform3d) {
        if self.shadow_transform[idx as usize] != transform {
            self.shadow_transform[idx as usize] = transform;
            self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        }
    }

    pub(crate) fn set_shadow_opacity_at(&mut self, idx: u32, opacity: f32) {
        if self.shadow_opacity[idx as usize] != opacity {
            self.shadow_opacity[idx as usize] = opacity;
            self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
        }
    }

    pub(crate) fn set_shadow_clip_at(&mut self, idx: u32, clip: Option<Rect>) {
        if self.shadow_clip[idx as usize] != clip {
            self.shadow_clip[idx as usize] = clip;
            self.dirty.mark(idx, dirty::CLIP);
        }
    }

    pub(crate) fn set_referent_at(&mut self, idx: u32, referent: Option<RemoteTreeId>) {
        if self.referent[idx as usize] != referent {
            self.referent[idx as usize] = referent;
            self.dirty.mark(idx, dirty::CONTENT);
        }
    }

    /// Copies every live node's base transform, opacity, and clip into its
    /// shadow slots, discarding whatever the previous frame wrote.
    pub fn reset_shadow_properties(&mut self) {
        for idx in 0..self.len {
            if !self.alive[idx as usize] {
                continue;
            }
            let i = idx as usize;
            self.set_shadow_transform_at(idx, self.base_transform[i]);
            self.set_shadow_opacity_at(idx, self.base_opacity[i]);
            self.set_shadow_clip_at(idx, self.clip[i]);
        }
    }

    // -- Internal helpers --

    pub(crate) fn root_index(&self) -> Option<u32> {
        (self.root != INVALID).then_some(self.root)
    }

    pub(crate) fn handle(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| NodeId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    pub(crate) fn is_scrollable_at(&self, idx: u32) -> bool {
        self.kind[idx as usize] == NodeKind::Container
            && self.frame_metrics[idx as usize]
                .as_ref()
                .is_some_and(FrameMetrics::is_scrollable)
    }

    pub(crate) fn is_fixed_at(&self, idx: u32) -> bool {
        self.fixed[idx as usize].is_some()
    }

    /// Whether the parent of `idx` (within this tree) is fixed-position.
    pub(crate) fn parent_is_fixed_at(&self, idx: u32) -> bool {
        let p = self.parent[idx as usize];
        p != INVALID && self.is_fixed_at(p)
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn collect_scrollable(&self, idx: u32, out: &mut Vec<NodeId>) {
        if self.is_scrollable_at(idx) {
            out.extend(self.handle(idx));
        }
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_scrollable(child, out);
            child = self.next_sibling[child as usize];
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }
}
