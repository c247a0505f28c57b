// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Remote trees, target configurations, and the cross-tree resolver.
//!
//! A reference node names a remote tree by [`RemoteTreeId`]. Remote trees
//! live in a [`RemoteTreeRegistry`], keyed by that id and owned by the
//! compositor, each with the [`TargetConfig`] its producer rendered for.
//!
//! [`resolve_remote_trees`] walks a tree and connects each reference node to
//! its remote tree, so that every later frame pass descends into the remote
//! tree as if it were an extra child of the reference node.
//! [`detach_remote_trees`] undoes this before a tree is replaced. Remote
//! trees may themselves contain reference nodes; both walks recurse
//! through them.

use alloc::collections::BTreeMap;
use core::f64::consts::{FRAC_PI_2, PI};

use kurbo::Rect;

use crate::pan_zoom::SharedController;
use crate::scene::{NodeKind, RemoteTreeId, SceneTree, child_indices};
use crate::trace::{RemoteTreeEvent, RemoteTreeOp, Tracer};
use crate::transform::Transform3d;

/// Screen orientation a tree was laid out for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScreenOrientation {
    /// Upright portrait.
    #[default]
    PortraitPrimary,
    /// Upside-down portrait.
    PortraitSecondary,
    /// Landscape, rotated one way.
    LandscapePrimary,
    /// Landscape, rotated the other way.
    LandscapeSecondary,
}

impl ScreenOrientation {
    /// Whether this is a portrait orientation.
    #[must_use]
    pub const fn is_portrait(self) -> bool {
        matches!(self, Self::PortraitPrimary | Self::PortraitSecondary)
    }

    /// Whether both orientations are portrait or both are landscape.
    #[must_use]
    pub const fn is_same_dimension(self, other: Self) -> bool {
        self.is_portrait() == other.is_portrait()
    }
}

/// Rotation of the physical screen relative to its natural orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScreenRotation {
    /// No rotation.
    #[default]
    Deg0,
    /// Quarter turn.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three-quarter turn.
    Deg270,
}

/// The screen configuration a tree was produced for.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TargetConfig {
    /// Orientation the content was laid out for.
    pub orientation: ScreenOrientation,
    /// Rotation of the screen.
    pub rotation: ScreenRotation,
    /// Bounds of the client area.
    pub client_bounds: Rect,
    /// Bounds of the screen in its natural orientation.
    pub natural_bounds: Rect,
}

impl TargetConfig {
    /// Creates a configuration with no rotation and empty natural bounds.
    #[must_use]
    pub const fn new(orientation: ScreenOrientation, client_bounds: Rect) -> Self {
        Self {
            orientation,
            rotation: ScreenRotation::Deg0,
            client_bounds,
            natural_bounds: Rect::ZERO,
        }
    }

    /// Whether content laid out for these client bounds would reflow if the
    /// orientation flipped. Square bounds look the same either way.
    #[must_use]
    pub fn might_reflow_on_orientation_change(&self) -> bool {
        self.client_bounds.width() != self.client_bounds.height()
    }
}

/// World transform that presents content for a rotated screen.
///
/// Each rotation moves the content's origin to the corner that ends up top
/// left, then rotates about Z.
#[must_use]
pub fn compute_rotation(rotation: ScreenRotation, natural_bounds: Rect) -> Transform3d {
    let w = natural_bounds.width();
    let h = natural_bounds.height();
    match rotation {
        ScreenRotation::Deg0 => Transform3d::IDENTITY,
        ScreenRotation::Deg90 => Transform3d::from_translation(w, 0.0, 0.0) * Transform3d::from_rotation_z(FRAC_PI_2),
        ScreenRotation::Deg180 => Transform3d::from_translation(w, h, 0.0) * Transform3d::from_rotation_z(PI),
        ScreenRotation::Deg270 => Transform3d::from_translation(0.0, h, 0.0) * Transform3d::from_rotation_z(-FRAC_PI_2),
    }
}

/// A tree published by another producer, with the configuration it targets.
#[derive(Debug)]
pub struct RemoteTree {
    /// The remote scene tree.
    pub tree: SceneTree,
    /// Configuration the remote producer laid the tree out for.
    pub target_config: TargetConfig,
    /// Controller attached to the tree's root while it is connected.
    pub controller: Option<SharedController>,
}

impl RemoteTree {
    /// Wraps a tree with the default target configuration and no controller.
    #[must_use]
    pub fn new(tree: SceneTree) -> Self {
        Self {
            tree,
            target_config: TargetConfig::default(),
            controller: None,
        }
    }

    /// Sets the target configuration.
    #[must_use]
    pub fn with_target_config(mut self, target_config: TargetConfig) -> Self {
        self.target_config = target_config;
        self
    }

    /// Sets the controller attached to the root on connection.
    #[must_use]
    pub fn with_controller(mut self, controller: SharedController) -> Self {
        self.controller = Some(controller);
        self
    }

    fn attach_controller(&mut self, controller: Option<SharedController>) {
        let Some(root) = self.tree.root_index() else {
            return;
        };
        if self.tree.kind[root as usize] == NodeKind::Container {
            self.tree.pan_zoom[root as usize] = controller;
        } else {
            tracing::debug!("remote tree root is not a container; controller not attached");
        }
    }
}

/// Remote trees keyed by id.
///
/// While a frame pass descends into a remote tree, the tree is checked out
/// of its slot; a nested reference back to a tree that is already checked
/// out is therefore skipped rather than revisited.
#[derive(Debug, Default)]
pub struct RemoteTreeRegistry {
    entries: BTreeMap<RemoteTreeId, Option<RemoteTree>>,
}

impl RemoteTreeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes (or replaces) the remote tree under `id`, returning the
    /// previous one.
    pub fn publish(&mut self, id: RemoteTreeId, remote: RemoteTree) -> Option<RemoteTree> {
        self.entries.insert(id, Some(remote)).flatten()
    }

    /// Removes the remote tree under `id`.
    ///
    /// Reference nodes still naming `id` are skipped by later frame passes.
    pub fn remove(&mut self, id: RemoteTreeId) -> Option<RemoteTree> {
        self.entries.remove(&id).flatten()
    }

    /// Returns the remote tree under `id`.
    #[must_use]
    pub fn get(&self, id: RemoteTreeId) -> Option<&RemoteTree> {
        self.entries.get(&id).and_then(Option::as_ref)
    }

    /// Returns the remote tree under `id` mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: RemoteTreeId) -> Option<&mut RemoteTree> {
        self.entries.get_mut(&id).and_then(Option::as_mut)
    }

    /// Whether a tree is published under `id`.
    #[must_use]
    pub fn contains(&self, id: RemoteTreeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of published trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| e.is_some()).count()
    }

    /// Whether no tree is published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over published trees in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RemoteTreeId, &mut RemoteTree)> {
        self.entries
            .iter_mut()
            .filter_map(|(id, entry)| entry.as_mut().map(|remote| (*id, remote)))
    }

    /// Checks out the tree under `id`, runs `f` on it with the rest of the
    /// registry, then puts it back.
    ///
    /// Returns `None` when no tree is published under `id` or it is already
    /// checked out further up the walk.
    pub(crate) fn with_tree<R>(
        &mut self,
        id: RemoteTreeId,
        f: impl FnOnce(&mut RemoteTree, &mut Self) -> R,
    ) -> Option<R> {
        let mut remote = self.entries.get_mut(&id)?.take()?;
        let out = f(&mut remote, self);
        if let Some(slot) = self.entries.get_mut(&id) {
            *slot = Some(remote);
        }
        Some(out)
    }
}

/// Connects every reference node reachable from the root of `tree` to its
/// published remote tree.
///
/// Returns whether the frame is ready to compose: `false` when some remote
/// tree was laid out for the other orientation class while the local client
/// bounds are non-square, since that content is about to reflow. Only
/// reference nodes with a non-empty visible rect take part in that check.
/// Reference nodes whose tree is not published yet are left unconnected.
///
/// A remote tree published with a controller gets it attached to its root
/// while connected.
pub fn resolve_remote_trees(
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    local: &TargetConfig,
    tracer: &mut Tracer<'_>,
) -> bool {
    let mut ready = true;
    if let Some(root) = tree.root_index() {
        resolve_node(tree, registry, root, local, &mut ready, tracer);
    }
    ready
}

fn resolve_node(
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    idx: u32,
    local: &TargetConfig,
    ready: &mut bool,
    tracer: &mut Tracer<'_>,
) {
    let i = idx as usize;
    if let Some(id) = tree.remote_tree[i] {
        let mut deferred = false;
        let op = match registry.get_mut(id) {
            None => {
                tracing::debug!(node = idx, remote = id.0, "remote tree not published yet");
                tree.set_referent_at(idx, None);
                RemoteTreeOp::Missing
            }
            Some(remote) => {
                if !tree.visible_rect[i].is_zero_area() {
                    deferred = !local
                        .orientation
                        .is_same_dimension(remote.target_config.orientation)
                        && local.might_reflow_on_orientation_change();
                }
                if deferred {
                    tracing::debug!(remote = id.0, "orientation change pending, deferring composition");
                    *ready = false;
                }
                tree.set_referent_at(idx, Some(id));
                if let Some(controller) = remote.controller.clone() {
                    remote.attach_controller(Some(controller));
                }
                RemoteTreeOp::Connected
            }
        };
        tracer.remote_tree(&RemoteTreeEvent {
            node_index: idx,
            id,
            op,
            deferred,
        });
    }

    for child in child_indices(tree, idx) {
        resolve_node(tree, registry, child, local, ready, tracer);
    }
    if let Some(id) = tree.referent[i] {
        let _ = registry.with_tree(id, |remote, registry| {
            if let Some(root) = remote.tree.root_index() {
                resolve_node(&mut remote.tree, registry, root, local, ready, tracer);
            }
        });
    }
}

/// Disconnects every remote tree connected anywhere under the root of
/// `tree`, including trees nested inside connected remote trees.
pub fn detach_remote_trees(tree: &mut SceneTree, registry: &mut RemoteTreeRegistry, tracer: &mut Tracer<'_>) {
    if let Some(root) = tree.root_index() {
        detach_node(tree, registry, root, tracer);
    }
}

fn detach_node(tree: &mut SceneTree, registry: &mut RemoteTreeRegistry, idx: u32, tracer: &mut Tracer<'_>) {
    if let Some(id) = tree.referent[idx as usize] {
        let _ = registry.with_tree(id, |remote, registry| {
            if let Some(root) = remote.tree.root_index() {
                detach_node(&mut remote.tree, registry, root, tracer);
            }
            remote.attach_controller(None);
        });
        tree.set_referent_at(idx, None);
        tracer.remote_tree(&RemoteTreeEvent {
            node_index: idx,
            id,
            op: RemoteTreeOp::Detached,
            deferred: false,
        });
    }
    for child in child_indices(tree, idx) {
        detach_node(tree, registry, child, tracer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeId, NodeKind};

    const LANDSCAPE: ScreenOrientation = ScreenOrientation::LandscapePrimary;
    const PORTRAIT: ScreenOrientation = ScreenOrientation::PortraitPrimary;

    /// Root container with one visible reference node naming `id`.
    fn tree_with_reference(id: u64) -> (SceneTree, NodeId) {
        let mut tree = SceneTree::new();
        let root = tree.create_node(NodeKind::Container);
        let reference = tree.create_node(NodeKind::Container);
        tree.set_root(root);
        tree.add_child(root, reference);
        tree.set_remote_tree(reference, Some(RemoteTreeId(id)));
        tree.set_visible_rect(reference, Rect::new(0.0, 0.0, 100.0, 100.0));
        (tree, reference)
    }

    fn remote(orientation: ScreenOrientation) -> RemoteTree {
        let mut tree = SceneTree::new();
        let root = tree.create_node(NodeKind::Container);
        tree.set_root(root);
        RemoteTree::new(tree).with_target_config(TargetConfig::new(orientation, Rect::ZERO))
    }

    struct Still;

    impl crate::pan_zoom::PanZoomController for Still {
        fn sample_content_transform(
            &self,
            _: crate::time::HostTime,
            metrics: &crate::pan_zoom::FrameMetrics,
        ) -> crate::pan_zoom::PanZoomSample {
            crate::pan_zoom::PanZoomSample::at_rest(metrics)
        }
    }

    fn resolve(tree: &mut SceneTree, registry: &mut RemoteTreeRegistry, local: &TargetConfig) -> bool {
        resolve_remote_trees(tree, registry, local, &mut Tracer::none())
    }

    #[test]
    fn same_dimension_classes() {
        assert!(PORTRAIT.is_same_dimension(ScreenOrientation::PortraitSecondary));
        assert!(LANDSCAPE.is_same_dimension(ScreenOrientation::LandscapeSecondary));
        assert!(!PORTRAIT.is_same_dimension(LANDSCAPE));
    }

    #[test]
    fn resolve_connects_published_tree() {
        let (mut tree, reference) = tree_with_reference(1);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(1), remote(PORTRAIT));

        let local = TargetConfig::new(PORTRAIT, Rect::new(0.0, 0.0, 480.0, 800.0));
        assert!(resolve(&mut tree, &mut registry, &local));
        assert_eq!(tree.referent(reference), Some(RemoteTreeId(1)));
    }

    #[test]
    fn missing_tree_is_skipped() {
        let (mut tree, reference) = tree_with_reference(2);
        let mut registry = RemoteTreeRegistry::new();
        assert!(resolve(&mut tree, &mut registry, &TargetConfig::default()));
        assert_eq!(tree.referent(reference), None);
    }

    #[test]
    fn invisible_reference_connects_without_orientation_check() {
        let (mut tree, reference) = tree_with_reference(1);
        tree.set_visible_rect(reference, Rect::ZERO);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(1), remote(PORTRAIT));

        let local = TargetConfig::new(LANDSCAPE, Rect::new(0.0, 0.0, 800.0, 480.0));
        assert!(resolve(&mut tree, &mut registry, &local));
        assert_eq!(tree.referent(reference), Some(RemoteTreeId(1)));
    }

    #[test]
    fn published_controller_follows_the_connection() {
        let (mut tree, _) = tree_with_reference(1);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(
            RemoteTreeId(1),
            remote(PORTRAIT).with_controller(SharedController::new(Still)),
        );
        let remote_root = registry.get(RemoteTreeId(1)).unwrap().tree.root().unwrap();

        assert!(resolve(&mut tree, &mut registry, &TargetConfig::default()));
        let remote = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert!(remote.pan_zoom_controller(remote_root).is_some());

        detach_remote_trees(&mut tree, &mut registry, &mut Tracer::none());
        let remote = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert!(remote.pan_zoom_controller(remote_root).is_none());
    }

    #[test]
    fn detach_clears_controller_set_by_producer() {
        let (mut tree, _) = tree_with_reference(1);
        let mut remote_tree = SceneTree::new();
        let remote_root = remote_tree.create_node(NodeKind::Container);
        remote_tree.set_root(remote_root);
        remote_tree.set_pan_zoom_controller(remote_root, Some(SharedController::new(Still)));
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(1), RemoteTree::new(remote_tree));

        assert!(resolve(&mut tree, &mut registry, &TargetConfig::default()));
        let remote = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert!(remote.pan_zoom_controller(remote_root).is_some());

        detach_remote_trees(&mut tree, &mut registry, &mut Tracer::none());
        let remote = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert!(remote.pan_zoom_controller(remote_root).is_none());
    }

    #[test]
    fn orientation_mismatch_with_non_square_bounds_defers() {
        let (mut tree, reference) = tree_with_reference(1);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(1), remote(PORTRAIT));

        let local = TargetConfig::new(LANDSCAPE, Rect::new(0.0, 0.0, 800.0, 480.0));
        assert!(!resolve(&mut tree, &mut registry, &local));
        // Still connected; only composition is deferred.
        assert_eq!(tree.referent(reference), Some(RemoteTreeId(1)));
    }

    #[test]
    fn orientation_mismatch_with_square_bounds_is_ready() {
        let (mut tree, _) = tree_with_reference(1);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(1), remote(PORTRAIT));

        let local = TargetConfig::new(LANDSCAPE, Rect::new(0.0, 0.0, 600.0, 600.0));
        assert!(resolve(&mut tree, &mut registry, &local));
    }

    #[test]
    fn detach_then_resolve_twice_is_idempotent() {
        let (mut tree, reference) = tree_with_reference(1);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(
            RemoteTreeId(1),
            remote(PORTRAIT).with_controller(SharedController::new(Still)),
        );
        let remote_root = registry.get(RemoteTreeId(1)).unwrap().tree.root().unwrap();
        let local = TargetConfig::new(PORTRAIT, Rect::new(0.0, 0.0, 480.0, 800.0));

        assert!(resolve(&mut tree, &mut registry, &local));
        let attached = registry
            .get(RemoteTreeId(1))
            .unwrap()
            .tree
            .pan_zoom_controller(remote_root)
            .cloned()
            .unwrap();

        detach_remote_trees(&mut tree, &mut registry, &mut Tracer::none());
        assert_eq!(tree.referent(reference), None);
        let remote = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert!(remote.pan_zoom_controller(remote_root).is_none());

        assert!(resolve(&mut tree, &mut registry, &local));
        let _ = tree.evaluate();
        assert!(resolve(&mut tree, &mut registry, &local));
        assert_eq!(tree.referent(reference), Some(RemoteTreeId(1)));
        let remote = &registry.get(RemoteTreeId(1)).unwrap().tree;
        let reattached = remote.pan_zoom_controller(remote_root).unwrap();
        assert!(reattached.ptr_eq(&attached));
        // The second resolve changed nothing.
        assert!(tree.evaluate().content.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn nested_remote_trees_resolve_and_detach() {
        let (mut tree, outer_ref) = tree_with_reference(1);
        let (inner_tree, inner_ref) = tree_with_reference(2);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(1), RemoteTree::new(inner_tree));
        registry.publish(RemoteTreeId(2), remote(PORTRAIT));

        assert!(resolve(&mut tree, &mut registry, &TargetConfig::default()));
        assert_eq!(tree.referent(outer_ref), Some(RemoteTreeId(1)));
        let inner = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert_eq!(inner.referent(inner_ref), Some(RemoteTreeId(2)));

        detach_remote_trees(&mut tree, &mut registry, &mut Tracer::none());
        assert_eq!(tree.referent(outer_ref), None);
        let inner = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert_eq!(inner.referent(inner_ref), None);
    }

    #[test]
    fn self_reference_does_not_recurse_forever() {
        let (inner_tree, inner_ref) = tree_with_reference(1);
        let (mut tree, _) = tree_with_reference(1);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(1), RemoteTree::new(inner_tree));

        assert!(resolve(&mut tree, &mut registry, &TargetConfig::default()));
        // The inner reference was resolved while tree 1 was checked out, so it
        // saw the tree as missing.
        let inner = &registry.get(RemoteTreeId(1)).unwrap().tree;
        assert_eq!(inner.referent(inner_ref), None);
    }

    #[test]
    fn rotation_moves_origin_to_the_rotated_corner() {
        let bounds = Rect::new(0.0, 0.0, 480.0, 800.0);
        assert_eq!(compute_rotation(ScreenRotation::Deg0, bounds), Transform3d::IDENTITY);

        let r90 = compute_rotation(ScreenRotation::Deg90, bounds);
        assert_eq!(r90.translation_2d(), kurbo::Vec2::new(480.0, 0.0));
        assert!((r90.cols[0][1] - 1.0).abs() < 1e-12);

        let r180 = compute_rotation(ScreenRotation::Deg180, bounds);
        assert_eq!(r180.translation_2d(), kurbo::Vec2::new(480.0, 800.0));
        assert!((r180.cols[0][0] + 1.0).abs() < 1e-12);

        let r270 = compute_rotation(ScreenRotation::Deg270, bounds);
        assert_eq!(r270.translation_2d(), kurbo::Vec2::new(0.0, 800.0));
        assert!((r270.cols[0][1] + 1.0).abs() < 1e-12);
    }
}
