// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Producer-side description of a compositor-driven animation.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use super::timing::TimingFunction;
use super::value::AnimationValue;
use crate::error::AnimationError;
use crate::time::{Duration, HostTime};

/// The node property an animation drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    /// Drives the shadow opacity.
    Opacity,
    /// Drives the shadow transform.
    Transform,
}

/// Playback direction across iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackDirection {
    /// Every iteration plays forwards.
    #[default]
    Normal,
    /// Every iteration plays backwards.
    Reverse,
    /// Even iterations play forwards, odd ones backwards.
    Alternate,
    /// Even iterations play backwards, odd ones forwards.
    AlternateReverse,
}

/// How many iterations an animation runs for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IterationCount {
    /// A finite (possibly fractional) number of iterations.
    Finite(f64),
    /// Repeat forever.
    Infinite,
}

impl IterationCount {
    /// Interprets a raw count where `-1` means infinite.
    #[must_use]
    pub fn from_raw(count: f64) -> Self {
        if count == -1.0 {
            Self::Infinite
        } else {
            Self::Finite(count)
        }
    }

    /// The count as a float, with [`Infinite`](Self::Infinite) as `f64::INFINITY`.
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Finite(n) => n,
            Self::Infinite => f64::INFINITY,
        }
    }
}

impl Default for IterationCount {
    fn default() -> Self {
        Self::Finite(1.0)
    }
}

/// One keyframe interval of an animation.
///
/// Portions are fractions of one iteration; consecutive segments tile
/// `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSegment {
    /// Where the segment starts within the iteration.
    pub start_portion: f64,
    /// Where the segment ends within the iteration.
    pub end_portion: f64,
    /// Value at `start_portion`.
    pub start_value: AnimationValue,
    /// Value at `end_portion`.
    pub end_value: AnimationValue,
    /// Easing across the segment.
    pub timing: TimingFunction,
}

/// Geometry needed to turn transform functions into a node transform.
///
/// Lengths tagged "app units" are in the producer's layout units, of which
/// there are [`APP_UNITS_PER_CSS_PIXEL`](crate::APP_UNITS_PER_CSS_PIXEL) per
/// CSS pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformData {
    /// Position of the node's frame in its reference frame, in app units.
    pub origin: Point,
    /// Transform origin relative to the frame, in CSS pixels.
    pub transform_origin: Point,
    /// Perspective origin relative to the frame, in CSS pixels.
    pub perspective_origin: Point,
    /// Perspective distance in CSS pixels; non-positive means none.
    pub perspective: f64,
    /// App units per device pixel at the node's resolution.
    pub app_units_per_dev_pixel: f64,
    /// Frame bounds in app units.
    pub bounds: Rect,
}

/// A compositor-driven animation attached to a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    /// Host time at which the first iteration starts.
    pub start_time: HostTime,
    /// Length of one iteration.
    pub duration: Duration,
    /// Number of iterations.
    pub iterations: IterationCount,
    /// Direction of each iteration.
    pub direction: PlaybackDirection,
    /// Property the animation drives.
    pub property: AnimatedProperty,
    /// Keyframe segments tiling one iteration.
    pub segments: Vec<AnimationSegment>,
    /// Required for [`AnimatedProperty::Transform`].
    pub transform_data: Option<TransformData>,
}

impl Animation {
    /// Checks that the segments tile `[0, 1]` with values matching the
    /// animated property, and that the iteration count is usable.
    pub fn validate(&self) -> Result<(), AnimationError> {
        if self.segments.is_empty() {
            return Err(AnimationError::NoSegments);
        }
        if matches!(self.iterations, IterationCount::Finite(n) if n.is_nan() || n < 0.0) {
            return Err(AnimationError::InvalidIterationCount);
        }
        if self.property == AnimatedProperty::Transform && self.transform_data.is_none() {
            return Err(AnimationError::MissingTransformData);
        }
        let mut expected_start = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            if segment.start_portion != expected_start {
                return Err(AnimationError::SegmentGap { index });
            }
            if segment.end_portion <= segment.start_portion {
                return Err(AnimationError::SegmentOutOfOrder { index });
            }
            if !segment.start_value.matches(self.property) || !segment.end_value.matches(self.property) {
                return Err(AnimationError::SegmentValueMismatch { index });
            }
            expected_start = segment.end_portion;
        }
        if expected_start != 1.0 {
            return Err(AnimationError::SegmentGap {
                index: self.segments.len() - 1,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::animation::tests_support::opacity_animation;

    #[test]
    fn raw_iteration_count() {
        assert_eq!(IterationCount::from_raw(-1.0), IterationCount::Infinite);
        assert_eq!(IterationCount::from_raw(3.0), IterationCount::Finite(3.0));
        assert_eq!(IterationCount::Infinite.as_f64(), f64::INFINITY);
    }

    #[test]
    fn valid_two_segment_animation() {
        let mut animation = opacity_animation(0.0, 1.0);
        animation.segments[0].end_portion = 0.5;
        animation.segments.push(AnimationSegment {
            start_portion: 0.5,
            end_portion: 1.0,
            start_value: AnimationValue::Opacity(1.0),
            end_value: AnimationValue::Opacity(0.0),
            timing: TimingFunction::EASE,
        });
        assert_eq!(animation.validate(), Ok(()));
    }

    #[test]
    fn malformed_iteration_counts_are_rejected() {
        for count in [-0.5, -2.0, f64::NAN] {
            let mut animation = opacity_animation(0.0, 1.0);
            animation.iterations = IterationCount::Finite(count);
            assert_eq!(animation.validate(), Err(AnimationError::InvalidIterationCount));
        }

        let mut animation = opacity_animation(0.0, 1.0);
        animation.iterations = IterationCount::Finite(0.0);
        assert_eq!(animation.validate(), Ok(()));
        animation.iterations = IterationCount::from_raw(-1.0);
        assert_eq!(animation.validate(), Ok(()));
    }

    #[test]
    fn empty_and_gapped_segments_are_rejected() {
        let mut animation = opacity_animation(0.0, 1.0);
        animation.segments.clear();
        assert_eq!(animation.validate(), Err(AnimationError::NoSegments));

        let mut animation = opacity_animation(0.0, 1.0);
        animation.segments[0].end_portion = 0.75;
        assert_eq!(animation.validate(), Err(AnimationError::SegmentGap { index: 0 }));

        let mut animation = opacity_animation(0.0, 1.0);
        animation.segments[0].start_portion = 1.0;
        assert_eq!(animation.validate(), Err(AnimationError::SegmentGap { index: 0 }));
    }

    #[test]
    fn transform_animation_needs_transform_data() {
        let animation = Animation {
            property: AnimatedProperty::Transform,
            segments: vec![AnimationSegment {
                start_portion: 0.0,
                end_portion: 1.0,
                start_value: AnimationValue::Transform(vec![]),
                end_value: AnimationValue::Transform(vec![]),
                timing: TimingFunction::Linear,
            }],
            transform_data: None,
            ..opacity_animation(0.0, 1.0)
        };
        assert_eq!(animation.validate(), Err(AnimationError::MissingTransformData));
    }
}
