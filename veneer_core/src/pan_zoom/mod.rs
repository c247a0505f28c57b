// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous pan and zoom.
//!
//! A [`PanZoomController`] attached to a container decides, independently
//! of the producer, how far the container's content is scrolled and zoomed
//! right now. Each frame the compositor samples every attached controller,
//! composes the resulting [`ViewTransform`] onto the container's base
//! transform, and counter-transforms fixed-position descendants so they
//! stay put.

mod apply;
mod controller;
mod metrics;

pub use controller::{PanZoomController, PanZoomSample, SharedController};
pub use metrics::{FrameMetrics, ViewTransform};

pub(crate) use apply::apply_async_content_transforms;
