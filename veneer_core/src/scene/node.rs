// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node property types set by the producer side.

use kurbo::{Insets, Point};

use crate::transform::Transform3d;

/// Whether a node groups children or only presents content.
///
/// Only containers may carry frame metrics, a pan/zoom controller, or
/// pre-scale and inherited-scale factors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A grouping node.
    #[default]
    Container,
    /// A leaf presenting already-rendered content.
    Content,
}

/// Fixed-position data for a node that stays anchored to the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedPosition {
    /// The anchor point, in node pixels, that scaling re-focuses on.
    pub anchor: Point,
    /// Margins used at layout time. A negative `x0` (left) or `y0` (top)
    /// means the node is auto-positioned on that axis and margin changes
    /// are ignored for it.
    pub margins: Insets,
}

impl FixedPosition {
    /// Margins meaning "auto-positioned on both axes".
    pub const AUTO_MARGINS: Insets = Insets {
        x0: -1.0,
        y0: -1.0,
        x1: -1.0,
        y1: -1.0,
    };

    /// Creates fixed-position data with the given anchor and layout margins.
    #[must_use]
    pub const fn new(anchor: Point, margins: Insets) -> Self {
        Self { anchor, margins }
    }
}

/// Resolution scale factors the producer baked into a node.
///
/// Shadow transforms are computed in the resolution-scaled space, so the
/// frame passes divide these back out before writing a shadow transform to
/// avoid applying them twice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    /// Container pre-scale, X.
    pub pre_x: f64,
    /// Container pre-scale, Y.
    pub pre_y: f64,
    /// Post-scale, X.
    pub post_x: f64,
    /// Post-scale, Y.
    pub post_y: f64,
    /// Scale inherited from ancestors, X (containers only).
    pub inherited_x: f64,
    /// Scale inherited from ancestors, Y (containers only).
    pub inherited_y: f64,
}

impl ScaleFactors {
    /// All factors equal to one.
    pub const IDENTITY: Self = Self {
        pre_x: 1.0,
        pre_y: 1.0,
        post_x: 1.0,
        post_y: 1.0,
        inherited_x: 1.0,
        inherited_y: 1.0,
    };

    /// Divides the pre-scale (containers only) and post-scale back out of `m`.
    #[must_use]
    pub fn remove_resolution(&self, m: Transform3d, kind: NodeKind) -> Transform3d {
        let m = match kind {
            NodeKind::Container => m.pre_scale(1.0 / self.pre_x, 1.0 / self.pre_y, 1.0),
            NodeKind::Content => m,
        };
        m.post_scale(1.0 / self.post_x, 1.0 / self.post_y, 1.0)
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_resolution_skips_pre_scale_on_content() {
        let factors = ScaleFactors {
            pre_x: 2.0,
            pre_y: 2.0,
            post_x: 4.0,
            post_y: 4.0,
            ..ScaleFactors::IDENTITY
        };
        let m = Transform3d::from_scale(8.0, 8.0, 1.0);
        let container = factors.remove_resolution(m, NodeKind::Container);
        let content = factors.remove_resolution(m, NodeKind::Content);
        assert_eq!(container.x_scale(), 1.0);
        assert_eq!(content.x_scale(), 2.0);
    }

    #[test]
    fn identity_factors_are_a_no_op() {
        let m = Transform3d::from_translation(3.0, 4.0, 0.0);
        assert_eq!(ScaleFactors::IDENTITY.remove_resolution(m, NodeKind::Container), m);
    }
}
