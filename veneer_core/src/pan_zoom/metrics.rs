// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll metadata and the view transform a controller samples.

use kurbo::{Point, Rect, Vec2};

use crate::transform::Transform3d;

/// Scroll and zoom metadata of a scrollable container.
///
/// Rects marked "layer pixels" are in the container's own resolution-scaled
/// space; rects marked "CSS pixels" are in the producer's layout space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetrics {
    /// Full extent of the scrolled content, in layer pixels.
    pub content_rect: Rect,
    /// Full scrollable area, in CSS pixels.
    pub scrollable_rect: Rect,
    /// The area the container is composited into, in layer pixels.
    pub composition_bounds: Rect,
    /// Scroll offset, in CSS pixels.
    pub scroll_offset: Point,
    /// Pre-rendered area relative to the scroll offset, in layer pixels.
    pub display_port: Rect,
    /// A smaller, higher-priority part of the display port, if any.
    pub critical_display_port: Option<Rect>,
    /// Resolution the content was rendered at.
    pub resolution: Vec2,
    /// Device pixels per CSS pixel.
    pub dev_pixels_per_css_pixel: f64,
    /// Scroll id; `None` for a container that does not scroll.
    pub scroll_id: Option<u64>,
}

impl FrameMetrics {
    /// Non-scrollable metrics with empty rects and unit scales.
    pub const DEFAULT: Self = Self {
        content_rect: Rect::ZERO,
        scrollable_rect: Rect::ZERO,
        composition_bounds: Rect::ZERO,
        scroll_offset: Point::ZERO,
        display_port: Rect::ZERO,
        critical_display_port: None,
        resolution: Vec2::new(1.0, 1.0),
        dev_pixels_per_css_pixel: 1.0,
        scroll_id: None,
    };

    /// Whether the container scrolls.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.scroll_id.is_some()
    }

    /// Scroll offset converted to layer pixels.
    #[must_use]
    pub fn scroll_offset_in_layer_pixels(&self) -> Point {
        let s = self.dev_pixels_per_css_pixel;
        Point::new(
            self.scroll_offset.x * self.resolution.x * s,
            self.scroll_offset.y * self.resolution.y * s,
        )
    }

    /// The display port to synchronize: the critical one when present and
    /// non-empty, else the full one.
    #[must_use]
    pub fn effective_display_port(&self) -> Rect {
        match self.critical_display_port {
            Some(critical) if !critical.is_zero_area() => critical,
            _ => self.display_port,
        }
    }
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A 2D translation plus per-axis scale, applied scale first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Translation, applied after the scale.
    pub translation: Vec2,
    /// Per-axis scale.
    pub scale: Vec2,
}

impl ViewTransform {
    /// No translation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        scale: Vec2::new(1.0, 1.0),
    };

    /// Creates a view transform.
    #[must_use]
    pub const fn new(translation: Vec2, scale: Vec2) -> Self {
        Self { translation, scale }
    }

    /// The matrix `translate(translation) * scale(scale)`.
    #[must_use]
    pub fn to_transform(&self) -> Transform3d {
        Transform3d::from_translation(self.translation.x, self.translation.y, 0.0)
            * Transform3d::from_scale(self.scale.x, self.scale.y, 1.0)
    }

    /// The translation fixed-position descendants must undo, in their
    /// unscaled space: `-translation / scale`.
    #[must_use]
    pub fn fixed_layer_translation(&self) -> Vec2 {
        Vec2::new(
            -self.translation.x / self.scale.x,
            -self.translation.y / self.scale.y,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_transform_scales_then_translates() {
        let view = ViewTransform::new(Vec2::new(-20.0, -40.0), Vec2::new(2.0, 2.0));
        let m = view.to_transform();
        assert_eq!(m.x_scale(), 2.0);
        assert_eq!(m.translation_2d(), Vec2::new(-20.0, -40.0));
        assert_eq!(view.fixed_layer_translation(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn layer_pixel_scroll_offset() {
        let metrics = FrameMetrics {
            scroll_offset: Point::new(10.0, 30.0),
            resolution: Vec2::new(2.0, 2.0),
            dev_pixels_per_css_pixel: 1.5,
            ..FrameMetrics::DEFAULT
        };
        assert_eq!(metrics.scroll_offset_in_layer_pixels(), Point::new(30.0, 90.0));
    }

    #[test]
    fn critical_display_port_is_preferred_when_non_empty() {
        let full = Rect::new(0.0, 0.0, 100.0, 300.0);
        let mut metrics = FrameMetrics {
            display_port: full,
            critical_display_port: Some(Rect::ZERO),
            ..FrameMetrics::DEFAULT
        };
        assert_eq!(metrics.effective_display_port(), full);
        let critical = Rect::new(0.0, 0.0, 100.0, 100.0);
        metrics.critical_display_port = Some(critical);
        assert_eq!(metrics.effective_display_port(), critical);
    }
}
