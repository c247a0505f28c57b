// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scrollable fallback.
//!
//! Used for frames in which no pan/zoom controller applied a transform.
//! The viewport bridge then owns scrolling: the compositor reports the
//! display port it has content for and the host replies with the scroll
//! offset and zoom it is showing right now. The scrollable node is moved
//! by the difference between the two, clamped so content never scrolls
//! past its edges and shrunk to fit when it is smaller than the viewport.

use kurbo::{Insets, Point, Rect, Vec2};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::compositor::FrameContext;
use crate::fixed::compensate_at;
use crate::pan_zoom::{FrameMetrics, ViewTransform};
use crate::remote::RemoteTreeRegistry;
use crate::scene::{NodeKind, SceneTree};
use crate::trace::FallbackAppliedEvent;
use crate::transform::Transform3d;

/// How the fallback fits the content to the host's viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportFit {
    /// Offset handed to the fixed-position compensator.
    pub offset: Vec2,
    /// Scale handed to the fixed-position compensator.
    pub scale_diff: Vec2,
    /// The content is narrower than the viewport.
    pub shrink_x: bool,
    /// The content is shorter than the viewport.
    pub shrink_y: bool,
}

/// Transforms the scrollable container at `idx` from the host's viewport.
///
/// `root_transform` is the base transform of the local root; its axis
/// scales convert layer pixels to device pixels. Returns `false` without
/// touching anything when `idx` is not a container.
pub(crate) fn apply_scrollable_fallback(
    cx: &mut FrameContext<'_, '_>,
    tree: &mut SceneTree,
    registry: &mut RemoteTreeRegistry,
    idx: u32,
    root_transform: &Transform3d,
) -> bool {
    let i = idx as usize;
    if tree.kind[i] != NodeKind::Container {
        return false;
    }
    let metrics = tree.frame_metrics[i].unwrap_or(FrameMetrics::DEFAULT);

    let root_scale = Vec2::new(root_transform.x_scale(), root_transform.y_scale());
    let dev_ratio = Vec2::new(1.0 / root_scale.x, 1.0 / root_scale.y);
    let scroll_layer = metrics.scroll_offset_in_layer_pixels();
    let scroll_dev = Point::new(
        (scroll_layer.x * dev_ratio.x).round(),
        (scroll_layer.y * dev_ratio.y).round(),
    );

    let state = &mut *cx.state;
    if state.is_first_paint {
        state.content_rect = metrics.content_rect;
        cx.bridge.set_first_paint_viewport(
            scroll_dev,
            dev_ratio.x,
            state.content_rect,
            metrics.scrollable_rect,
        );
        state.is_first_paint = false;
    } else if metrics.content_rect != state.content_rect {
        state.content_rect = metrics.content_rect;
        cx.bridge.set_page_rect(metrics.scrollable_rect);
    }

    // Synchronized after the notifications above so the host can take them
    // into account in its reply.
    let display_port = display_port_in_dev_pixels(&metrics, dev_ratio, scroll_dev);
    let reply = cx
        .bridge
        .sync_viewport(display_port, dev_ratio.x, state.layers_updated);
    state.layers_updated = false;
    let (margins, render_offset) = match reply {
        Some(sync) => {
            state.scroll_offset = sync.scroll_offset;
            state.zoom = sync.zoom;
            (sync.fixed_layer_margins, sync.render_offset)
        }
        None => {
            tracing::trace!("viewport bridge gave no reply; keeping the previous viewport");
            (Insets::ZERO, Vec2::ZERO)
        }
    };
    cx.render_offset = Some(render_offset);

    let metrics_scroll = if metrics.is_scrollable() {
        scroll_dev
    } else {
        Point::ZERO
    };
    let (view, outcome) = fit_viewport(
        &metrics,
        state.content_rect,
        state.scroll_offset,
        state.zoom,
        root_scale,
        metrics_scroll,
    );

    let transform = tree.base_transform[i] * view.to_transform();
    let transform = tree.scale_factors[i].remove_resolution(transform, NodeKind::Container);
    tree.set_shadow_transform_at(idx, transform);
    compensate_at(tree, registry, idx, outcome.offset, outcome.scale_diff, margins);

    cx.tracer.fallback_applied(&FallbackAppliedEvent {
        frame_index: cx.frame_index,
        node_index: idx,
        offset: outcome.offset,
        scale_diff: outcome.scale_diff,
        shrink_x: outcome.shrink_x,
        shrink_y: outcome.shrink_y,
    });
    true
}

/// Absolute display port in device pixels: the effective display port
/// scaled and rounded, then moved by the device-pixel scroll offset.
fn display_port_in_dev_pixels(metrics: &FrameMetrics, dev_ratio: Vec2, scroll_dev: Point) -> Rect {
    let dp = metrics.effective_display_port();
    let origin = Point::new(
        (dp.x0 * dev_ratio.x).round() + scroll_dev.x,
        (dp.y0 * dev_ratio.y).round() + scroll_dev.y,
    );
    let width = (dp.width() * dev_ratio.x).round();
    let height = (dp.height() * dev_ratio.y).round();
    Rect::from_origin_size(origin, (width, height))
}

/// Reconciles the producer's scroll state with the host's.
///
/// `scroll_offset` and `zoom` are what the host shows; `metrics_scroll` the
/// producer's scroll offset in device pixels (zero for a node that does not
/// scroll). Returns the view transform for the node and what the
/// fixed-position compensator needs.
///
/// On an axis where the zoomed content is smaller than the composition
/// bounds the content is shrunk to fit (never scaled up); otherwise the
/// host's offset is clamped to the content.
#[must_use]
pub fn fit_viewport(
    metrics: &FrameMetrics,
    content_rect: Rect,
    scroll_offset: Point,
    zoom: Vec2,
    root_scale: Vec2,
    metrics_scroll: Point,
) -> (ViewTransform, ViewportFit) {
    let scale = Vec2::new(root_scale.x * zoom.x, root_scale.y * zoom.y);

    let compensation = Vec2::new(
        ((scroll_offset.x / scale.x - metrics_scroll.x) * zoom.x).trunc(),
        ((scroll_offset.y / scale.y - metrics_scroll.y) * zoom.y).trunc(),
    );
    let view = ViewTransform::new(-compensation, zoom);

    let bounds = metrics.composition_bounds;
    let (offset_x, scale_x, shrink_x) = fit_axis(
        content_rect.x0,
        content_rect.width(),
        bounds.width(),
        scroll_offset.x,
        scale.x,
        metrics_scroll.x,
    );
    let (offset_y, scale_y, shrink_y) = fit_axis(
        content_rect.y0,
        content_rect.height(),
        bounds.height(),
        scroll_offset.y,
        scale.y,
        metrics_scroll.y,
    );

    let outcome = ViewportFit {
        offset: Vec2::new(offset_x, offset_y),
        scale_diff: Vec2::new(scale_x, scale_y),
        shrink_x,
        shrink_y,
    };
    (view, outcome)
}

/// One axis of [`fit_viewport`]: `(offset, scale, shrunk)`.
fn fit_axis(
    content_start: f64,
    content_extent: f64,
    viewport_extent: f64,
    scroll: f64,
    scale: f64,
    metrics_scroll: f64,
) -> (f64, f64, bool) {
    if content_extent * scale < viewport_extent {
        let shrink = (viewport_extent / content_extent).min(1.0);
        (-metrics_scroll, shrink, true)
    } else {
        let lo = content_start;
        let hi = content_start + content_extent - viewport_extent / scale;
        let clamped = (scroll / scale).max(lo).min(hi);
        (clamped - metrics_scroll, scale, false)
    }
}
