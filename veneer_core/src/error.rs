// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported when a producer hands over malformed animation data.
//!
//! Frame passes never fail; these errors surface at the point where the
//! producer attaches animations to a node, so a bad description is
//! rejected before it can reach a frame.

/// Why an animation (or its prepared runtime state) was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
    /// The animation has no segments.
    #[error("animation has no segments")]
    NoSegments,
    /// Segments do not tile `[0, 1]`: segment `index` does not start where
    /// the previous one ended (or the first does not start at 0, or the last
    /// does not end at 1).
    #[error("segment {index} leaves a gap in the [0, 1] portion range")]
    SegmentGap {
        /// Offending segment.
        index: usize,
    },
    /// Segment `index` ends before (or where) it starts.
    #[error("segment {index} has a non-increasing portion range")]
    SegmentOutOfOrder {
        /// Offending segment.
        index: usize,
    },
    /// Segment `index` carries values that do not match the animated property.
    #[error("segment {index} values do not match the animated property")]
    SegmentValueMismatch {
        /// Offending segment.
        index: usize,
    },
    /// The iteration count is negative or NaN.
    #[error("iteration count must be a non-negative number")]
    InvalidIterationCount,
    /// A transform animation was supplied without transform data.
    #[error("transform animation is missing its transform data")]
    MissingTransformData,
    /// Animations and runtime state are not index-aligned.
    #[error("{animations} animations but {runtime} runtime entries")]
    RuntimeLengthMismatch {
        /// Number of animations.
        animations: usize,
        /// Number of runtime entries.
        runtime: usize,
    },
    /// Runtime entry `index` is not sized to its animation's segments.
    #[error("runtime entry {index} has {functions} timing functions for {segments} segments")]
    SegmentCountMismatch {
        /// Offending animation.
        index: usize,
        /// Segments in the animation.
        segments: usize,
        /// Timing functions in the runtime entry.
        functions: usize,
    },
}
