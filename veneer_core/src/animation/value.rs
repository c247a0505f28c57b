// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated values and their interpolation.
//!
//! Opacity interpolates linearly. Transform lists interpolate function by
//! function when both lists have the same shape (an empty list stands in
//! for the identity of the other list's shape); otherwise both sides are
//! flattened to matrices and, when both are 2D, interpolated through a
//! translate / rotate / skew / scale decomposition. Mismatched 3D lists
//! switch discretely at the halfway point.

use alloc::vec::Vec;
use core::f64::consts::PI;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Vec2;

use super::model::{AnimatedProperty, TransformData};
use crate::APP_UNITS_PER_CSS_PIXEL;
use crate::transform::Transform3d;

/// One CSS-style transform function. Lengths are CSS pixels, angles radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformFunction {
    /// Translation.
    Translate {
        /// X offset.
        x: f64,
        /// Y offset.
        y: f64,
        /// Z offset.
        z: f64,
    },
    /// Scale about the transform origin.
    Scale {
        /// X factor.
        x: f64,
        /// Y factor.
        y: f64,
        /// Z factor.
        z: f64,
    },
    /// Rotation about the Z axis.
    Rotate(f64),
    /// Skew along X and Y.
    Skew {
        /// X angle.
        x: f64,
        /// Y angle.
        y: f64,
    },
    /// Perspective with the given distance.
    Perspective(f64),
    /// An arbitrary matrix whose translation column is in CSS pixels.
    Matrix(Transform3d),
}

impl TransformFunction {
    /// The identity function with this function's shape.
    fn identity_like(&self) -> Self {
        match self {
            Self::Translate { .. } => Self::Translate {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            Self::Scale { .. } => Self::Scale {
                x: 1.0,
                y: 1.0,
                z: 1.0,
            },
            Self::Rotate(_) => Self::Rotate(0.0),
            Self::Skew { .. } => Self::Skew { x: 0.0, y: 0.0 },
            Self::Perspective(_) => Self::Perspective(f64::INFINITY),
            Self::Matrix(_) => Self::Matrix(Transform3d::IDENTITY),
        }
    }

    /// Interpolates two functions of the same shape.
    fn lerp(&self, other: &Self, t: f64) -> Option<Self> {
        let f = match (*self, *other) {
            (Self::Translate { x, y, z }, Self::Translate { x: x2, y: y2, z: z2 }) => Self::Translate {
                x: lerp(x, x2, t),
                y: lerp(y, y2, t),
                z: lerp(z, z2, t),
            },
            (Self::Scale { x, y, z }, Self::Scale { x: x2, y: y2, z: z2 }) => Self::Scale {
                x: lerp(x, x2, t),
                y: lerp(y, y2, t),
                z: lerp(z, z2, t),
            },
            (Self::Rotate(a), Self::Rotate(b)) => Self::Rotate(lerp(a, b, t)),
            (Self::Skew { x, y }, Self::Skew { x: x2, y: y2 }) => Self::Skew {
                x: lerp(x, x2, t),
                y: lerp(y, y2, t),
            },
            (Self::Perspective(a), Self::Perspective(b)) => {
                // Interpolate the projection coefficient, not the distance.
                let inv = lerp(inverse_distance(a), inverse_distance(b), t);
                Self::Perspective(if inv > 0.0 { 1.0 / inv } else { f64::INFINITY })
            }
            _ => return None,
        };
        Some(f)
    }

    /// The matrix for this function, with lengths scaled by `px`.
    fn to_matrix(self, px: f64) -> Transform3d {
        match self {
            Self::Translate { x, y, z } => Transform3d::from_translation(x * px, y * px, z * px),
            Self::Scale { x, y, z } => Transform3d::from_scale(x, y, z),
            Self::Rotate(angle) => Transform3d::from_rotation_z(angle),
            Self::Skew { x, y } => Transform3d::from_skew(x, y),
            Self::Perspective(distance) => {
                if distance.is_finite() {
                    Transform3d::from_perspective(distance * px)
                } else {
                    Transform3d::IDENTITY
                }
            }
            Self::Matrix(mut m) => {
                for v in &mut m.cols[3][..3] {
                    *v *= px;
                }
                m
            }
        }
    }
}

/// A value an animation segment starts or ends at.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationValue {
    /// An opacity in `[0, 1]`.
    Opacity(f32),
    /// A transform function list, applied left to right as written.
    Transform(Vec<TransformFunction>),
}

impl AnimationValue {
    /// Whether this value can drive `property`.
    #[must_use]
    pub fn matches(&self, property: AnimatedProperty) -> bool {
        matches!(
            (self, property),
            (Self::Opacity(_), AnimatedProperty::Opacity)
                | (Self::Transform(_), AnimatedProperty::Transform)
        )
    }
}

/// Interpolates between two opacities.
///
/// Exact at `t == 0` and `t == 1`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "opacity is stored as f32; the f64 intermediate only improves the blend"
)]
pub fn interpolate_opacity(from: f32, to: f32, t: f64) -> f32 {
    lerp(f64::from(from), f64::from(to), t) as f32
}

/// Interpolates between two transform lists and flattens the result.
///
/// `px` is the number of device pixels per CSS pixel; translations and
/// perspective distances are scaled by it. Exact at `t == 0` and `t == 1`.
#[must_use]
pub fn interpolate_transform(from: &[TransformFunction], to: &[TransformFunction], t: f64, px: f64) -> Transform3d {
    if t == 0.0 {
        return compose(from, px);
    }
    if t == 1.0 {
        return compose(to, px);
    }

    if let Some(list) = lerp_lists(from, to, t) {
        return compose(&list, px);
    }

    let a = compose(from, px);
    let b = compose(to, px);
    match (Decomposed2d::new(&a), Decomposed2d::new(&b)) {
        (Some(da), Some(db)) => da.lerp(&db, t).recompose(),
        _ => {
            if t < 0.5 {
                a
            } else {
                b
            }
        }
    }
}

/// Builds the node transform from flattened transform functions.
///
/// The functions are applied about the transform origin, then the
/// perspective (if any) about the perspective origin, and finally the frame
/// is placed at its origin rounded to whole device pixels.
#[must_use]
pub fn resolve_transform(functions: Transform3d, data: &TransformData) -> Transform3d {
    let px = APP_UNITS_PER_CSS_PIXEL / data.app_units_per_dev_pixel;
    let to = data.transform_origin.to_vec2() * px;
    let mut m = Transform3d::from_translation(to.x, to.y, 0.0)
        * functions
        * Transform3d::from_translation(-to.x, -to.y, 0.0);

    if data.perspective > 0.0 {
        let po = data.perspective_origin.to_vec2() * px;
        m = Transform3d::from_translation(po.x, po.y, 0.0)
            * Transform3d::from_perspective(data.perspective * px)
            * Transform3d::from_translation(-po.x, -po.y, 0.0)
            * m;
    }

    let origin = Vec2::new(
        (data.origin.x / data.app_units_per_dev_pixel).round(),
        (data.origin.y / data.app_units_per_dev_pixel).round(),
    );
    Transform3d::from_translation(origin.x, origin.y, 0.0) * m
}

/// Multiplies out a function list in order.
pub(crate) fn compose(list: &[TransformFunction], px: f64) -> Transform3d {
    list.iter()
        .fold(Transform3d::IDENTITY, |acc, f| acc * f.to_matrix(px))
}

fn lerp_lists(from: &[TransformFunction], to: &[TransformFunction], t: f64) -> Option<Vec<TransformFunction>> {
    if from.is_empty() {
        return to.iter().map(|f| f.identity_like().lerp(f, t)).collect();
    }
    if to.is_empty() {
        return from.iter().map(|f| f.lerp(&f.identity_like(), t)).collect();
    }
    if from.len() != to.len() {
        return None;
    }
    from.iter().zip(to).map(|(a, b)| a.lerp(b, t)).collect()
}

/// `a` at `t == 0`, `b` at `t == 1`, both exactly.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

fn inverse_distance(distance: f64) -> f64 {
    if distance.is_finite() && distance > 0.0 {
        1.0 / distance
    } else {
        0.0
    }
}

/// A 2D affine matrix split as `translate * rotate * skew_x * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Decomposed2d {
    translate: Vec2,
    scale: Vec2,
    skew: f64,
    angle: f64,
}

impl Decomposed2d {
    fn new(m: &Transform3d) -> Option<Self> {
        if !m.is_2d() {
            return None;
        }
        let col0 = Vec2::new(m.cols[0][0], m.cols[0][1]);
        let col1 = Vec2::new(m.cols[1][0], m.cols[1][1]);
        let det = col0.cross(col1);
        if det == 0.0 {
            return None;
        }

        let mut sx = col0.hypot();
        let mut n0 = col0 / sx;
        let mut skew = n0.dot(col1);
        let rest = col1 - n0 * skew;
        let sy = rest.hypot();
        skew /= sy;

        if det < 0.0 {
            sx = -sx;
            n0 = -n0;
            skew = -skew;
        }

        Some(Self {
            translate: m.translation_2d(),
            scale: Vec2::new(sx, sy),
            skew,
            angle: n0.y.atan2(n0.x),
        })
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        let mut a = self.angle;
        let mut b = other.angle;
        // Rotate the short way round.
        if (a - b).abs() > PI {
            if a > b {
                b += 2.0 * PI;
            } else {
                a += 2.0 * PI;
            }
        }
        Self {
            translate: self.translate.lerp(other.translate, t),
            scale: self.scale.lerp(other.scale, t),
            skew: lerp(self.skew, other.skew, t),
            angle: lerp(a, b, t),
        }
    }

    fn recompose(&self) -> Transform3d {
        let mut shear = Transform3d::IDENTITY;
        shear.cols[1][0] = self.skew;
        Transform3d::from_translation(self.translate.x, self.translate.y, 0.0)
            * Transform3d::from_rotation_z(self.angle)
            * shear
            * Transform3d::from_scale(self.scale.x, self.scale.y, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Point, Rect};

    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn opacity_endpoints_are_exact() {
        assert_eq!(interpolate_opacity(0.3, 0.9, 0.0), 0.3);
        assert_eq!(interpolate_opacity(0.3, 0.9, 1.0), 0.9);
        assert!((interpolate_opacity(0.0, 1.0, 0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn matching_lists_interpolate_per_function() {
        let from = [TransformFunction::Translate { x: 0.0, y: 0.0, z: 0.0 }];
        let to = [TransformFunction::Translate { x: 100.0, y: 50.0, z: 0.0 }];
        let m = interpolate_transform(&from, &to, 0.5, 1.0);
        assert!(m.approx_eq(&Transform3d::from_translation(50.0, 25.0, 0.0), EPS));
    }

    #[test]
    fn empty_list_acts_as_identity() {
        let to = [TransformFunction::Scale { x: 3.0, y: 3.0, z: 1.0 }];
        let m = interpolate_transform(&[], &to, 0.5, 1.0);
        assert!(m.approx_eq(&Transform3d::from_scale(2.0, 2.0, 1.0), EPS));
    }

    #[test]
    fn translation_scales_with_device_pixels() {
        let to = [TransformFunction::Translate { x: 10.0, y: 0.0, z: 0.0 }];
        let m = interpolate_transform(&[], &to, 1.0, 2.0);
        assert_eq!(m.translation_2d(), Vec2::new(20.0, 0.0));
    }

    #[test]
    fn mismatched_2d_lists_go_through_decomposition() {
        let from = [TransformFunction::Rotate(0.0)];
        let to = [
            TransformFunction::Translate { x: 40.0, y: 0.0, z: 0.0 },
            TransformFunction::Rotate(PI / 2.0),
        ];
        let mid = interpolate_transform(&from, &to, 0.5, 1.0);
        let expected = Transform3d::from_translation(20.0, 0.0, 0.0) * Transform3d::from_rotation_z(PI / 4.0);
        assert!(mid.approx_eq(&expected, 1e-9));
    }

    #[test]
    fn decomposition_round_trips() {
        let m = Transform3d::from_translation(7.0, -3.0, 0.0)
            * Transform3d::from_rotation_z(0.4)
            * Transform3d::from_skew(0.2, 0.0)
            * Transform3d::from_scale(2.0, 0.5, 1.0);
        let d = Decomposed2d::new(&m).unwrap();
        assert!(d.recompose().approx_eq(&m, 1e-9));

        let flipped = Transform3d::from_scale(-1.0, 2.0, 1.0);
        let d = Decomposed2d::new(&flipped).unwrap();
        assert!(d.recompose().approx_eq(&flipped, 1e-9));
    }

    #[test]
    fn mismatched_3d_lists_switch_at_half() {
        let from = [TransformFunction::Perspective(100.0)];
        let to = [
            TransformFunction::Rotate(0.5),
            TransformFunction::Scale { x: 2.0, y: 2.0, z: 1.0 },
        ];
        let a = interpolate_transform(&from, &to, 0.0, 1.0);
        assert_eq!(interpolate_transform(&from, &to, 0.49, 1.0), a);
        let b = interpolate_transform(&from, &to, 1.0, 1.0);
        assert_eq!(interpolate_transform(&from, &to, 0.5, 1.0), b);
    }

    #[test]
    fn resolve_applies_origin_and_transform_origin() {
        let data = TransformData {
            origin: Point::new(600.0, 1200.0),
            transform_origin: Point::new(50.0, 50.0),
            perspective_origin: Point::ZERO,
            perspective: 0.0,
            app_units_per_dev_pixel: 60.0,
            bounds: Rect::new(0.0, 0.0, 6000.0, 6000.0),
        };
        let scale = Transform3d::from_scale(2.0, 2.0, 1.0);
        let m = resolve_transform(scale, &data);
        // Origin (10, 20); scaling about (50, 50) shifts by -50.
        assert!(m.approx_eq(
            &(Transform3d::from_translation(-40.0, -30.0, 0.0) * scale),
            EPS
        ));
    }

    #[test]
    fn value_matches_property() {
        assert!(AnimationValue::Opacity(1.0).matches(AnimatedProperty::Opacity));
        assert!(!AnimationValue::Opacity(1.0).matches(AnimatedProperty::Transform));
        assert!(AnimationValue::Transform(vec![]).matches(AnimatedProperty::Transform));
    }
}
