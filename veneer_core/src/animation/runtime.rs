// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prepared per-animation sampling state.

use alloc::vec::Vec;

use super::model::Animation;
use super::timing::ComputedTiming;
use super::value::AnimationValue;
use crate::error::AnimationError;

/// Sampling state prepared once per animation when it is attached.
///
/// Holds one prepared timing function and the cached start and end values
/// for every segment, index-aligned with [`Animation::segments`].
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationRuntime {
    pub(crate) functions: Vec<ComputedTiming>,
    pub(crate) start_values: Vec<AnimationValue>,
    pub(crate) end_values: Vec<AnimationValue>,
}

impl AnimationRuntime {
    /// Validates `animation` and prepares its runtime state.
    pub fn prepare(animation: &Animation) -> Result<Self, AnimationError> {
        animation.validate()?;
        let segments = &animation.segments;
        Ok(Self {
            functions: segments.iter().map(|s| ComputedTiming::new(&s.timing)).collect(),
            start_values: segments.iter().map(|s| s.start_value.clone()).collect(),
            end_values: segments.iter().map(|s| s.end_value.clone()).collect(),
        })
    }

    /// Number of prepared segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.functions.len()
    }

    /// Checks that this runtime is sized to `animation`'s segments.
    pub(crate) fn check_aligned(&self, index: usize, animation: &Animation) -> Result<(), AnimationError> {
        let segments = animation.segments.len();
        let aligned = self.functions.len() == segments
            && self.start_values.len() == segments
            && self.end_values.len() == segments;
        if aligned {
            Ok(())
        } else {
            Err(AnimationError::SegmentCountMismatch {
                index,
                segments,
                functions: self.functions.len(),
            })
        }
    }
}
