// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seams consumed by the GPU side.
//!
//! The engine never draws. After a frame pass the host's renderer needs two
//! things from it:
//!
//! - **Render offset**: the offset the viewport bridge asked the whole frame
//!   to be drawn at, delivered through [`RenderOffsetSink`] at most once per
//!   frame.
//! - **Presentation**: the evaluated world transforms, effective opacities
//!   and clips of every tree, applied incrementally through [`Presenter`].
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_vsync(now: HostTime) {
//!     // Tree hand-over from the producer, if one is pending.
//!     if let Some(update) = channel.try_recv() {
//!         compositor.update_tree(update);
//!     }
//!
//!     // Sample, pan/zoom or fallback, evaluate and present.
//!     let want_next_frame = compositor.composite(now, &mut presenter);
//!     if want_next_frame {
//!         schedule_composite();
//!     }
//! }
//! ```

use kurbo::Vec2;

use crate::scene::{FrameChanges, RemoteTreeId, SceneTree};

/// Receives the offset the whole frame is drawn at.
pub trait RenderOffsetSink {
    /// Sets the screen render offset for the frame being composited.
    fn set_screen_render_offset(&mut self, offset: Vec2);
}

/// A [`RenderOffsetSink`] that drops the offset.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRenderOffsetSink;

impl RenderOffsetSink for NoopRenderOffsetSink {
    fn set_screen_render_offset(&mut self, offset: Vec2) {
        _ = offset;
    }
}

/// Applies evaluated frame changes to a platform-native presentation tree.
///
/// Called once per tree per composite: first for the local tree
/// (`remote == None`), then for every published remote tree.
pub trait Presenter {
    /// Applies the given [`FrameChanges`] for `tree`, reading current world
    /// values from it as needed.
    fn apply(&mut self, remote: Option<RemoteTreeId>, tree: &SceneTree, changes: &FrameChanges);
}
