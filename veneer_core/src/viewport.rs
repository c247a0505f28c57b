// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The viewport bridge: the host side that owns the authoritative viewport.
//!
//! On hosts where the UI toolkit drives scrolling (a mobile browser shell
//! with a dynamic toolbar, for instance) the compositor reconciles its view
//! of the content with the host's every frame. Every method has a default
//! that models "no host": notifications are dropped and queries return
//! `None`, which the frame passes treat as an identity reply (state left
//! unchanged, zero margins, zero render offset).

use kurbo::{Insets, Point, Rect, Vec2};

/// The host's reply to a display-port sync on the fallback path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSync {
    /// Scroll offset the host currently shows, in device pixels.
    pub scroll_offset: Point,
    /// Zoom per axis.
    pub zoom: Vec2,
    /// Current fixed-layer margins (dynamic toolbars and the like).
    pub fixed_layer_margins: Insets,
    /// Offset to apply to the whole rendered frame.
    pub render_offset: Vec2,
}

/// What the pan/zoom path reports to the host for one controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetricsSync {
    /// Scroll offset sampled from the controller, in CSS pixels.
    pub scroll_offset: Point,
    /// Zoom sampled from the controller.
    pub zoom: f64,
    /// Scrollable area, in CSS pixels.
    pub css_page_rect: Rect,
    /// Whether the tree was updated since the previous frame.
    pub layers_updated: bool,
    /// Display port of the container.
    pub display_port: Rect,
    /// Resolution of the display port: the inverse of the root X scale.
    pub display_resolution: f64,
    /// Whether this is the first paint of a new document.
    pub is_first_paint: bool,
}

/// The host's reply to a [`FrameMetricsSync`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetricsReply {
    /// Current fixed-layer margins.
    pub fixed_layer_margins: Insets,
    /// Offset to apply to the whole rendered frame.
    pub render_offset: Vec2,
}

/// Host-side viewport collaborator.
pub trait ViewportBridge {
    /// First paint of a new document: the initial viewport.
    fn set_first_paint_viewport(&mut self, offset: Point, zoom: f64, page_rect: Rect, css_page_rect: Rect) {
        _ = (offset, zoom, page_rect, css_page_rect);
    }

    /// The page grew or shrank since the previous frame.
    fn set_page_rect(&mut self, css_page_rect: Rect) {
        _ = css_page_rect;
    }

    /// Synchronizes the display port (device pixels) and asks the host for
    /// the current viewport.
    fn sync_viewport(
        &mut self,
        display_port: Rect,
        display_resolution: f64,
        layers_updated: bool,
    ) -> Option<ViewportSync> {
        _ = (display_port, display_resolution, layers_updated);
        None
    }

    /// Reports a controller's sampled scroll state and asks for current
    /// margins and render offset.
    fn sync_frame_metrics(&mut self, sync: &FrameMetricsSync) -> Option<FrameMetricsReply> {
        _ = sync;
        None
    }
}

/// A [`ViewportBridge`] for hosts without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopViewportBridge;

impl ViewportBridge for NoopViewportBridge {}
