// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pan/zoom controller seam.

use alloc::sync::Arc;
use core::fmt;

use kurbo::Point;

use super::metrics::{FrameMetrics, ViewTransform};
use crate::time::HostTime;

/// What a controller reports for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanZoomSample {
    /// Transform to apply on top of the container's base transform.
    pub view: ViewTransform,
    /// Scroll offset the controller currently shows, in CSS pixels.
    pub scroll_offset: Point,
    /// Whether the controller needs another frame (fling, bounce…).
    pub want_next_frame: bool,
}

impl PanZoomSample {
    /// A sample that leaves the content where the producer put it.
    #[must_use]
    pub fn at_rest(metrics: &FrameMetrics) -> Self {
        Self {
            view: ViewTransform::IDENTITY,
            scroll_offset: metrics.scroll_offset,
            want_next_frame: false,
        }
    }
}

/// Computes a container's asynchronous scroll and zoom.
///
/// Called on the compositor thread once per frame for every container the
/// controller is attached to. Implementations must not block or do I/O; the
/// controller may be shared with (and concurrently driven by) an input
/// thread, hence `&self` and the `Send + Sync` bound.
pub trait PanZoomController: Send + Sync {
    /// Samples the transform for the frame presented at `now`.
    fn sample_content_transform(&self, now: HostTime, metrics: &FrameMetrics) -> PanZoomSample;
}

/// A reference-counted handle to a [`PanZoomController`].
#[derive(Clone)]
pub struct SharedController(Arc<dyn PanZoomController>);

impl SharedController {
    /// Wraps a controller.
    #[must_use]
    pub fn new(controller: impl PanZoomController + 'static) -> Self {
        Self(Arc::new(controller))
    }

    /// Wraps an already shared controller.
    #[must_use]
    pub fn from_arc(controller: Arc<dyn PanZoomController>) -> Self {
        Self(controller)
    }

    /// Whether both handles point to the same controller.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Samples the controller.
    #[must_use]
    pub fn sample(&self, now: HostTime, metrics: &FrameMetrics) -> PanZoomSample {
        self.0.sample_content_transform(now, metrics)
    }
}

impl fmt::Debug for SharedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedController")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
