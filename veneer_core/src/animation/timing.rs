// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Iteration timing and per-segment easing.
//!
//! [`position_in_iteration`] maps elapsed time to a position in `[0, 1]`
//! within the current iteration, honoring iteration count and playback
//! direction. [`TimingFunction`] describes the easing applied inside one
//! segment; [`ComputedTiming`] is its prepared form with the cubic-bezier
//! sample table already built.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use super::model::{IterationCount, PlaybackDirection};

/// Where a step timing function jumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepPosition {
    /// Jump at the start of each step.
    Start,
    /// Jump at the end of each step.
    End,
}

/// Easing applied to the position inside one segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TimingFunction {
    /// Identity easing.
    #[default]
    Linear,
    /// A cubic bezier through `(0, 0)`, `(x1, y1)`, `(x2, y2)`, `(1, 1)`.
    CubicBezier {
        /// First control point X (clamped to `[0, 1]` when prepared).
        x1: f64,
        /// First control point Y.
        y1: f64,
        /// Second control point X (clamped to `[0, 1]` when prepared).
        x2: f64,
        /// Second control point Y.
        y2: f64,
    },
    /// A staircase with `count` equal steps.
    Steps {
        /// Number of steps; zero is treated as one.
        count: u32,
        /// Where each step jumps.
        position: StepPosition,
    },
}

impl TimingFunction {
    /// CSS `ease`.
    pub const EASE: Self = Self::cubic_bezier(0.25, 0.1, 0.25, 1.0);
    /// CSS `ease-in`.
    pub const EASE_IN: Self = Self::cubic_bezier(0.42, 0.0, 1.0, 1.0);
    /// CSS `ease-out`.
    pub const EASE_OUT: Self = Self::cubic_bezier(0.0, 0.0, 0.58, 1.0);
    /// CSS `ease-in-out`.
    pub const EASE_IN_OUT: Self = Self::cubic_bezier(0.42, 0.0, 0.58, 1.0);

    /// Creates a cubic-bezier timing function.
    #[must_use]
    pub const fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::CubicBezier { x1, y1, x2, y2 }
    }
}

/// A [`TimingFunction`] prepared for repeated evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedTiming {
    kind: ComputedKind,
}

#[derive(Clone, Debug, PartialEq)]
enum ComputedKind {
    Linear,
    Bezier(KeySpline),
    Steps { count: u32, position: StepPosition },
}

impl ComputedTiming {
    /// Prepares a timing function.
    #[must_use]
    pub fn new(function: &TimingFunction) -> Self {
        let kind = match *function {
            TimingFunction::Linear => ComputedKind::Linear,
            TimingFunction::CubicBezier { x1, y1, x2, y2 } => {
                ComputedKind::Bezier(KeySpline::new(x1.clamp(0.0, 1.0), y1, x2.clamp(0.0, 1.0), y2))
            }
            TimingFunction::Steps { count, position } => ComputedKind::Steps {
                count: count.max(1),
                position,
            },
        };
        Self { kind }
    }

    /// Eases `x`, a position in `[0, 1]`.
    ///
    /// `0` maps to `0` and `1` maps to `1` exactly for every function.
    #[must_use]
    pub fn value(&self, x: f64) -> f64 {
        match &self.kind {
            ComputedKind::Linear => x,
            ComputedKind::Bezier(spline) => spline.value(x),
            ComputedKind::Steps { count, position } => {
                let steps = f64::from(*count);
                match position {
                    StepPosition::Start => ((x * steps).ceil() / steps).min(1.0),
                    StepPosition::End => (x * steps).floor() / steps,
                }
            }
        }
    }
}

const SPLINE_TABLE_SIZE: usize = 11;
const SAMPLE_STEP: f64 = 1.0 / (SPLINE_TABLE_SIZE - 1) as f64;
const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f64 = 0.02;
const SUBDIVISION_PRECISION: f64 = 1e-7;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

/// Cubic-bezier evaluator with a precomputed table of X samples.
///
/// Solving for the curve parameter starts from the table, refines with
/// Newton's method where the slope allows, and falls back to bisection on
/// flat stretches.
#[derive(Clone, Debug, PartialEq)]
struct KeySpline {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    samples: [f64; SPLINE_TABLE_SIZE],
}

impl KeySpline {
    fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut samples = [0.0; SPLINE_TABLE_SIZE];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = calc_bezier(i as f64 * SAMPLE_STEP, x1, x2);
        }
        Self {
            x1,
            y1,
            x2,
            y2,
            samples,
        }
    }

    fn value(&self, x: f64) -> f64 {
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        if x <= 0.0 || x >= 1.0 {
            return x.clamp(0.0, 1.0);
        }
        calc_bezier(self.t_for_x(x), self.y1, self.y2)
    }

    fn t_for_x(&self, x: f64) -> f64 {
        let last = SPLINE_TABLE_SIZE - 1;
        let mut interval_start = 0.0;
        let mut current = 1;
        while current != last && self.samples[current] <= x {
            interval_start += SAMPLE_STEP;
            current += 1;
        }
        current -= 1;

        let span = self.samples[current + 1] - self.samples[current];
        let dist = if span > 0.0 {
            (x - self.samples[current]) / span
        } else {
            0.0
        };
        let guess = interval_start + dist * SAMPLE_STEP;

        let slope = slope_at(guess, self.x1, self.x2);
        if slope >= NEWTON_MIN_SLOPE {
            self.newton(x, guess)
        } else if slope == 0.0 {
            guess
        } else {
            self.bisect(x, interval_start, interval_start + SAMPLE_STEP)
        }
    }

    fn newton(&self, x: f64, mut t: f64) -> f64 {
        for _ in 0..NEWTON_ITERATIONS {
            let slope = slope_at(t, self.x1, self.x2);
            if slope == 0.0 {
                return t;
            }
            t -= (calc_bezier(t, self.x1, self.x2) - x) / slope;
        }
        t
    }

    fn bisect(&self, x: f64, mut a: f64, mut b: f64) -> f64 {
        let mut t = a;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            t = a + (b - a) / 2.0;
            let err = calc_bezier(t, self.x1, self.x2) - x;
            if err.abs() <= SUBDIVISION_PRECISION {
                break;
            }
            if err > 0.0 {
                b = t;
            } else {
                a = t;
            }
        }
        t
    }
}

fn coeff_a(a1: f64, a2: f64) -> f64 {
    1.0 - 3.0 * a2 + 3.0 * a1
}

fn coeff_b(a1: f64, a2: f64) -> f64 {
    3.0 * a2 - 6.0 * a1
}

fn coeff_c(a1: f64) -> f64 {
    3.0 * a1
}

fn calc_bezier(t: f64, a1: f64, a2: f64) -> f64 {
    ((coeff_a(a1, a2) * t + coeff_b(a1, a2)) * t + coeff_c(a1)) * t
}

fn slope_at(t: f64, a1: f64, a2: f64) -> f64 {
    3.0 * coeff_a(a1, a2) * t * t + 2.0 * coeff_b(a1, a2) * t + coeff_c(a1)
}

/// Position in `[0, 1]` within the current iteration.
///
/// `elapsed` and `duration` are in the same (arbitrary) unit. The iteration
/// index is clamped to the last iteration once the active interval is over,
/// so an animation fills forwards at its final position. A negative
/// `elapsed` samples the first position; a zero `duration` samples the end
/// of the active interval.
#[must_use]
pub fn position_in_iteration(
    elapsed: f64,
    duration: f64,
    iterations: IterationCount,
    direction: PlaybackDirection,
) -> f64 {
    let count = iterations.as_f64();
    let elapsed = elapsed.max(0.0);
    let mut current = if duration > 0.0 {
        elapsed / duration
    } else {
        count
    };
    if current >= count {
        current = count;
    }

    let (which, position) = if current.is_finite() {
        let mut which = current.floor();
        if which == count && which != 0.0 {
            which -= 1.0;
        }
        (which, current - which)
    } else {
        // Zero duration repeated forever: pin to the end of the first iteration.
        (0.0, 1.0)
    };

    #[expect(
        clippy::cast_possible_truncation,
        reason = "only the parity of the iteration index is needed"
    )]
    let odd = (which as u64) % 2 == 1;
    let reverse = match direction {
        PlaybackDirection::Normal => false,
        PlaybackDirection::Reverse => true,
        PlaybackDirection::Alternate => odd,
        PlaybackDirection::AlternateReverse => !odd,
    };
    if reverse { 1.0 - position } else { position }
}
