// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applies sampled pan/zoom transforms to the containers that own a
//! controller.

use kurbo::{Insets, Vec2};

use super::metrics::FrameMetrics;
use crate::compositor::FrameContext;
use crate::fixed::compensate_at;
use crate::remote::RemoteTreeRegistry;
use crate::scene::{NodeKind, SceneTree, child_indices};
use crate::trace::PanZoomAppliedEvent;
use crate::viewport::FrameMetricsSync;

/// Walks `tree` (and connected remote trees) children first and applies
/// the transform of every attached controller.
///
/// `root_x_scale` is the X scale of the local root's base transform; its
/// inverse is the display-port resolution reported to the bridge. Returns
/// whether any controller was applied; requests for another frame are
/// accumulated in the frame context.
pub(crate) fn apply_async_content_transforms(
    cx: &mut FrameContext<'_, '_>,
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    root_x_scale: f64,
) -> bool {
    match tree.root_index() {
        Some(root) => apply_node(cx, tree, registry, root, root_x_scale),
        None => false,
    }
}

fn apply_node(
    cx: &mut FrameContext<'_, '_>,
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    idx: u32,
    root_x_scale: f64,
) -> bool {
    let mut applied = false;
    for child in child_indices(tree, idx) {
        applied |= apply_node(cx, tree, registry, child, root_x_scale);
    }
    let i = idx as usize;
    if let Some(id) = tree.referent[i] {
        applied |= registry
            .with_tree(id, |remote, registry| match remote.tree.root_index() {
                Some(root) => apply_node(cx, &mut remote.tree, registry, root, root_x_scale),
                None => false,
            })
            .unwrap_or(false);
    }

    if tree.kind[i] != NodeKind::Container {
        return applied;
    }
    let Some(controller) = tree.pan_zoom[i].clone() else {
        return applied;
    };

    let metrics = tree.frame_metrics[i].unwrap_or(FrameMetrics::DEFAULT);
    let sample = controller.sample(cx.now, &metrics);
    cx.want_next_frame |= sample.want_next_frame;

    let reply = cx.bridge.sync_frame_metrics(&FrameMetricsSync {
        scroll_offset: sample.scroll_offset,
        zoom: sample.view.scale.x,
        css_page_rect: metrics.scrollable_rect,
        layers_updated: cx.state.layers_updated,
        display_port: metrics.display_port,
        display_resolution: 1.0 / root_x_scale,
        is_first_paint: cx.state.is_first_paint,
    });
    cx.state.is_first_paint = false;
    cx.state.layers_updated = false;

    let (margins, render_offset) = match reply {
        Some(reply) => (reply.fixed_layer_margins, reply.render_offset),
        None => (Insets::ZERO, Vec2::ZERO),
    };
    cx.render_offset = Some(render_offset);

    let transform = tree.base_transform[i] * sample.view.to_transform();
    let transform = tree.scale_factors[i].remove_resolution(transform, NodeKind::Container);
    tree.set_shadow_transform_at(idx, transform);

    compensate_at(
        tree,
        registry,
        idx,
        sample.view.fixed_layer_translation(),
        sample.view.scale,
        margins,
    );

    cx.tracer.pan_zoom_applied(&PanZoomAppliedEvent {
        frame_index: cx.frame_index,
        node_index: idx,
        translation: sample.view.translation,
        scale: sample.view.scale,
        want_next_frame: sample.want_next_frame,
    });
    true
}
