// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transform and the matrix helpers the frame passes share.
//!
//! Column vectors are used throughout: `a * b` applies `b` first, then `a`.
//! Two families of helpers exist for resolution compensation:
//!
//! - [`pre_scale`](Transform3d::pre_scale) scales *before* the matrix acts
//!   (`M * S`), used for a container's pre-scale factors.
//! - [`post_scale`](Transform3d::post_scale) scales *after* the matrix acts
//!   (`S * M`), used for post-scale and inherited-scale factors.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Vec2;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix; column 3 holds the
/// translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a 2D skew with the given X and Y angles (radians).
    #[inline]
    #[must_use]
    pub fn from_skew(ax: f64, ay: f64) -> Self {
        Self {
            cols: [
                [1.0, ay.tan(), 0.0, 0.0],
                [ax.tan(), 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a perspective projection with the given distance.
    ///
    /// A non-positive distance yields the identity.
    #[inline]
    #[must_use]
    pub fn from_perspective(distance: f64) -> Self {
        let mut m = Self::IDENTITY;
        if distance > 0.0 {
            m.cols[2][3] = -1.0 / distance;
        }
        m
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// The X scale factor (first diagonal element).
    #[inline]
    #[must_use]
    pub const fn x_scale(&self) -> f64 {
        self.cols[0][0]
    }

    /// The Y scale factor (second diagonal element).
    #[inline]
    #[must_use]
    pub const fn y_scale(&self) -> f64 {
        self.cols[1][1]
    }

    /// The 2D translation component.
    #[inline]
    #[must_use]
    pub const fn translation_2d(&self) -> Vec2 {
        Vec2::new(self.cols[3][0], self.cols[3][1])
    }

    /// Adds `offset` to the translation in place, after everything else the
    /// matrix does.
    #[inline]
    pub fn translate_2d(&mut self, offset: Vec2) {
        self.cols[3][0] += offset.x;
        self.cols[3][1] += offset.y;
    }

    /// Returns `self * scale(sx, sy, sz)`: the scale acts before the matrix.
    #[inline]
    #[must_use]
    pub fn pre_scale(self, sx: f64, sy: f64, sz: f64) -> Self {
        let mut out = self;
        for i in 0..4 {
            out.cols[0][i] *= sx;
            out.cols[1][i] *= sy;
            out.cols[2][i] *= sz;
        }
        out
    }

    /// Returns `scale(sx, sy, sz) * self`: the scale acts after the matrix.
    #[inline]
    #[must_use]
    pub fn post_scale(self, sx: f64, sy: f64, sz: f64) -> Self {
        let mut out = self;
        for col in &mut out.cols {
            col[0] *= sx;
            col[1] *= sy;
            col[2] *= sz;
        }
        out
    }

    /// Whether the matrix only uses the 2D affine subset (`a b c d tx ty`).
    #[must_use]
    pub fn is_2d(&self) -> bool {
        let c = &self.cols;
        c[0][2] == 0.0
            && c[0][3] == 0.0
            && c[1][2] == 0.0
            && c[1][3] == 0.0
            && c[2] == [0.0, 0.0, 1.0, 0.0]
            && c[3][2] == 0.0
            && c[3][3] == 1.0
    }

    /// Element-wise comparison with an absolute tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Is every element of this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn scale_then_translate() {
        let s = Transform3d::from_scale(2.0, 2.0, 2.0);
        let t = Transform3d::from_translation(3.0, 4.0, 0.0);
        // Scale first, then translate: T * S
        let combined = t * s;
        assert_eq!(combined.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn pre_scale_matches_right_multiplication() {
        let m = Transform3d::from_translation(10.0, 20.0, 0.0) * Transform3d::from_scale(3.0, 3.0, 1.0);
        let expected = m * Transform3d::from_scale(0.5, 0.25, 1.0);
        assert!(m.pre_scale(0.5, 0.25, 1.0).approx_eq(&expected, 1e-12));
    }

    #[test]
    fn post_scale_matches_left_multiplication() {
        let m = Transform3d::from_translation(10.0, 20.0, 0.0);
        let expected = Transform3d::from_scale(0.5, 2.0, 1.0) * m;
        let got = m.post_scale(0.5, 2.0, 1.0);
        assert!(got.approx_eq(&expected, 1e-12));
        // Translation is scaled too, since the scale acts last.
        assert_eq!(got.translation_2d(), Vec2::new(5.0, 40.0));
    }

    #[test]
    fn translate_2d_is_post_translation() {
        let mut m = Transform3d::from_scale(2.0, 2.0, 1.0);
        m.translate_2d(Vec2::new(5.0, -3.0));
        let expected = Transform3d::from_translation(5.0, -3.0, 0.0) * Transform3d::from_scale(2.0, 2.0, 1.0);
        assert_eq!(m, expected);
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        let eps = 1e-6;
        assert!((r.col(0)[0] - 0.0).abs() < eps);
        assert!((r.col(0)[1] - 1.0).abs() < eps);
        assert!((r.col(1)[0] + 1.0).abs() < eps);
    }

    #[test]
    fn perspective_is_not_2d() {
        assert!(Transform3d::IDENTITY.is_2d());
        assert!(Transform3d::from_skew(0.3, 0.0).is_2d());
        assert!(!Transform3d::from_perspective(500.0).is_2d());
        assert_eq!(Transform3d::from_perspective(0.0), Transform3d::IDENTITY);
    }

    #[test]
    fn infinity_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[0][3] = f64::INFINITY;
        assert!(!t.is_finite());
    }
}
