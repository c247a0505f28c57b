// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-position compensation.
//!
//! When the compositor scrolls or zooms a container on its own, nodes the
//! producer laid out as fixed to the viewport must not move with the
//! content. The compensator walks the subtree and, at the outermost fixed
//! node of each chain, applies the counter-translation (re-centred on the
//! node's anchor and reconciled with the host's current margins). Fixed
//! descendants of a fixed node then move rigidly with it.

use kurbo::{Insets, Vec2};

use crate::remote::RemoteTreeRegistry;
use crate::scene::{NodeId, SceneTree, child_indices};

/// Counter-transforms the fixed-position nodes under `node` (inclusive).
///
/// `translation` is the offset fixed nodes must undo, in their unscaled
/// space; `scale_diff` the zoom applied to the content; `margins` the
/// fixed-layer margins the host currently reports. Connected remote trees
/// are included.
pub fn compensate_fixed_nodes(
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    node: NodeId,
    translation: Vec2,
    scale_diff: Vec2,
    margins: Insets,
) {
    tree.validate(node);
    compensate_at(tree, registry, node.idx, translation, scale_diff, margins);
}

pub(crate) fn compensate_at(
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    idx: u32,
    translation: Vec2,
    scale_diff: Vec2,
    margins: Insets,
) {
    let parent_fixed = tree.parent_is_fixed_at(idx);
    let params = Params {
        translation,
        scale_diff,
        margins,
    };
    compensate_node(tree, registry, idx, parent_fixed, &params);
}

struct Params {
    translation: Vec2,
    scale_diff: Vec2,
    margins: Insets,
}

fn compensate_node(
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    idx: u32,
    parent_fixed: bool,
    params: &Params,
) {
    let i = idx as usize;
    let fixed = tree.fixed[i];

    if let Some(fp) = fixed
        && !parent_fixed
    {
        let offset = node_offset(fp.anchor.to_vec2(), fp.margins, params);

        let mut transform = tree.base_transform[i];
        transform.translate_2d(offset);
        let transform = tree.scale_factors[i].remove_resolution(transform, tree.kind[i]);
        tree.set_shadow_transform_at(idx, transform);

        if let Some(clip) = tree.clip[i] {
            tree.set_shadow_clip_at(idx, Some(clip + offset));
        }
        return;
    }

    let this_fixed = fixed.is_some();
    for child in child_indices(tree, idx) {
        compensate_node(tree, registry, child, this_fixed, params);
    }
    if let Some(id) = tree.referent[i] {
        let _ = registry.with_tree(id, |remote, registry| {
            if let Some(root) = remote.tree.root_index() {
                compensate_node(&mut remote.tree, registry, root, this_fixed, params);
            }
        });
    }
}

/// The translation one outermost fixed node receives.
fn node_offset(anchor: Vec2, layout_margins: Insets, params: &Params) -> Vec2 {
    let s = params.scale_diff;
    let mut offset = params.translation - (anchor - Vec2::new(anchor.x / s.x, anchor.y / s.y));

    // Negative left/top margins mark an auto-positioned axis.
    let current = params.margins;
    if layout_margins.x0 >= 0.0 {
        if anchor.x > 0.0 {
            offset.x -= current.x1 - layout_margins.x1;
        } else {
            offset.x += current.x0 - layout_margins.x0;
        }
    }
    if layout_margins.y0 >= 0.0 {
        if anchor.y > 0.0 {
            offset.y -= current.y1 - layout_margins.y1;
        } else {
            offset.y += current.y0 - layout_margins.y0;
        }
    }
    offset
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::*;
    use crate::remote::RemoteTree;
    use crate::scene::{FixedPosition, NodeKind, RemoteTreeId, ScaleFactors};
    use crate::transform::Transform3d;

    fn compensate(tree: &mut SceneTree, node: NodeId, translation: Vec2, scale_diff: Vec2, margins: Insets) {
        compensate_fixed_nodes(
            tree,
            &mut RemoteTreeRegistry::new(),
            node,
            translation,
            scale_diff,
            margins,
        );
    }

    /// Root container with a single fixed child.
    fn fixed_child(anchor: Point, margins: Insets) -> (SceneTree, NodeId, NodeId) {
        let mut tree = SceneTree::new();
        let root = tree.create_node(NodeKind::Container);
        let child = tree.create_node(NodeKind::Content);
        tree.set_root(root);
        tree.add_child(root, child);
        tree.set_fixed_position(child, Some(FixedPosition::new(anchor, margins)));
        (tree, root, child)
    }

    #[test]
    fn zero_translation_and_margin_delta_is_identity() {
        let margins = Insets::new(4.0, 8.0, 4.0, 8.0);
        let (mut tree, root, child) = fixed_child(Point::new(30.0, 60.0), margins);
        let base = Transform3d::from_translation(12.0, 34.0, 0.0);
        let clip = Rect::new(0.0, 0.0, 50.0, 20.0);
        tree.set_base_transform(child, base);
        tree.set_clip(child, Some(clip));

        compensate(&mut tree, root, Vec2::ZERO, Vec2::new(1.0, 1.0), margins);
        assert_eq!(tree.shadow_transform(child), base);
        assert_eq!(tree.shadow_clip(child), Some(clip));
    }

    #[test]
    fn anchor_weights_translation() {
        let (mut tree, root, child) = fixed_child(Point::ZERO, FixedPosition::AUTO_MARGINS);
        compensate(&mut tree, root, Vec2::new(5.0, 7.0), Vec2::new(2.0, 2.0), Insets::ZERO);
        assert_eq!(tree.shadow_transform(child).translation_2d(), Vec2::new(5.0, 7.0));

        let (mut tree, root, child) = fixed_child(Point::new(100.0, 40.0), FixedPosition::AUTO_MARGINS);
        compensate(&mut tree, root, Vec2::new(5.0, 7.0), Vec2::new(2.0, 2.0), Insets::ZERO);
        // Re-centred on the anchor: translation - (anchor - anchor / 2).
        assert_eq!(tree.shadow_transform(child).translation_2d(), Vec2::new(-45.0, -13.0));
    }

    #[test]
    fn margin_changes_shift_the_anchored_edge() {
        // Anchored to the bottom edge: a taller bottom toolbar pushes it up.
        let (mut tree, root, child) = fixed_child(Point::new(0.0, 50.0), Insets::ZERO);
        let current = Insets::new(3.0, 0.0, 0.0, 20.0);
        compensate(&mut tree, root, Vec2::ZERO, Vec2::new(1.0, 1.0), current);
        assert_eq!(tree.shadow_transform(child).translation_2d(), Vec2::new(3.0, -20.0));
    }

    #[test]
    fn auto_positioned_axes_ignore_margins() {
        let (mut tree, root, child) = fixed_child(Point::new(0.0, 50.0), FixedPosition::AUTO_MARGINS);
        let current = Insets::new(3.0, 10.0, 6.0, 20.0);
        compensate(&mut tree, root, Vec2::ZERO, Vec2::new(1.0, 1.0), current);
        assert_eq!(tree.shadow_transform(child).translation_2d(), Vec2::ZERO);
    }

    #[test]
    fn clip_copy_moves_and_original_stays() {
        let (mut tree, root, child) = fixed_child(Point::ZERO, FixedPosition::AUTO_MARGINS);
        let clip = Rect::new(0.0, 0.0, 10.0, 10.0);
        tree.set_clip(child, Some(clip));
        compensate(&mut tree, root, Vec2::new(2.0, 3.0), Vec2::new(1.0, 1.0), Insets::ZERO);
        assert_eq!(tree.shadow_clip(child), Some(Rect::new(2.0, 3.0, 12.0, 13.0)));
        assert_eq!(tree.clip(child), Some(clip));
    }

    #[test]
    fn only_outermost_fixed_node_acts() {
        let (mut tree, root, outer) = fixed_child(Point::ZERO, FixedPosition::AUTO_MARGINS);
        let inner = tree.create_node(NodeKind::Content);
        tree.add_child(outer, inner);
        tree.set_fixed_position(inner, Some(FixedPosition::new(Point::ZERO, FixedPosition::AUTO_MARGINS)));

        compensate(&mut tree, root, Vec2::new(9.0, 9.0), Vec2::new(1.0, 1.0), Insets::ZERO);
        assert_eq!(tree.shadow_transform(outer).translation_2d(), Vec2::new(9.0, 9.0));
        assert_eq!(tree.shadow_transform(inner), Transform3d::IDENTITY);

        // Starting directly at the inner node still sees its fixed parent.
        compensate(&mut tree, inner, Vec2::new(9.0, 9.0), Vec2::new(1.0, 1.0), Insets::ZERO);
        assert_eq!(tree.shadow_transform(inner), Transform3d::IDENTITY);
    }

    #[test]
    fn fixed_grandchild_under_plain_container_is_found() {
        let mut tree = SceneTree::new();
        let root = tree.create_node(NodeKind::Container);
        let mid = tree.create_node(NodeKind::Container);
        let leaf = tree.create_node(NodeKind::Content);
        tree.set_root(root);
        tree.add_child(root, mid);
        tree.add_child(mid, leaf);
        tree.set_fixed_position(leaf, Some(FixedPosition::new(Point::ZERO, FixedPosition::AUTO_MARGINS)));

        compensate(&mut tree, root, Vec2::new(1.0, 2.0), Vec2::new(1.0, 1.0), Insets::ZERO);
        assert_eq!(tree.shadow_transform(leaf).translation_2d(), Vec2::new(1.0, 2.0));
        assert_eq!(tree.shadow_transform(mid), Transform3d::IDENTITY);
    }

    #[test]
    fn resolution_is_divided_out() {
        let mut tree = SceneTree::new();
        let root = tree.create_node(NodeKind::Container);
        let fixed = tree.create_node(NodeKind::Container);
        tree.set_root(root);
        tree.add_child(root, fixed);
        tree.set_fixed_position(fixed, Some(FixedPosition::new(Point::ZERO, FixedPosition::AUTO_MARGINS)));
        tree.set_scale_factors(
            fixed,
            ScaleFactors {
                post_x: 2.0,
                post_y: 2.0,
                ..ScaleFactors::IDENTITY
            },
        );
        compensate(&mut tree, root, Vec2::new(10.0, 10.0), Vec2::new(1.0, 1.0), Insets::ZERO);
        assert_eq!(tree.shadow_transform(fixed).translation_2d(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn fixed_nodes_in_connected_remote_trees_are_compensated() {
        let mut tree = SceneTree::new();
        let root = tree.create_node(NodeKind::Container);
        tree.set_root(root);
        tree.set_referent_at(root.idx, Some(RemoteTreeId(3)));

        let (remote, _, remote_fixed) = fixed_child(Point::ZERO, FixedPosition::AUTO_MARGINS);
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(3), RemoteTree::new(remote));

        compensate_fixed_nodes(
            &mut tree,
            &mut registry,
            root,
            Vec2::new(4.0, 4.0),
            Vec2::new(1.0, 1.0),
            Insets::ZERO,
        );
        let remote = &registry.get(RemoteTreeId(3)).unwrap().tree;
        assert_eq!(remote.shadow_transform(remote_fixed).translation_2d(), Vec2::new(4.0, 4.0));
    }
}
