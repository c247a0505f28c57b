// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor-driven animations.
//!
//! A producer attaches [`Animation`]s to nodes; attaching validates each one
//! and prepares an [`AnimationRuntime`] holding the eased timing functions
//! and cached segment values. Every frame, [`sample_animations`] evaluates
//! them at the frame's host time and writes the shadow opacity and shadow
//! transform of the animated nodes, without any round trip to the producer.

mod model;
mod runtime;
mod sample;
mod timing;
mod value;

pub use model::{
    AnimatedProperty, Animation, AnimationSegment, IterationCount, PlaybackDirection, TransformData,
};
pub use runtime::AnimationRuntime;
pub use sample::sample_animations;
pub use timing::{ComputedTiming, StepPosition, TimingFunction, position_in_iteration};
pub use value::{
    AnimationValue, TransformFunction, interpolate_opacity, interpolate_transform, resolve_transform,
};

#[cfg(test)]
pub(crate) mod tests_support {
    use alloc::vec;

    use super::*;
    use crate::time::{Duration, HostTime};

    /// A single-segment linear opacity animation over ticks `[0, 100]`.
    pub(crate) fn opacity_animation(from: f32, to: f32) -> Animation {
        Animation {
            start_time: HostTime(0),
            duration: Duration(100),
            iterations: IterationCount::Finite(1.0),
            direction: PlaybackDirection::Normal,
            property: AnimatedProperty::Opacity,
            segments: vec![AnimationSegment {
                start_portion: 0.0,
                end_portion: 1.0,
                start_value: AnimationValue::Opacity(from),
                end_value: AnimationValue::Opacity(to),
                timing: TimingFunction::Linear,
            }],
            transform_data: None,
        }
    }
}
