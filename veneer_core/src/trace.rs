// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame pass.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the compositor calls at each stage of a frame. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing. When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates [`ShadowChange`] events and the
//!   corresponding `TraceSink` method.

use kurbo::Vec2;

use crate::scene::RemoteTreeId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which path produced the frame's scroll and zoom transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramePath {
    /// At least one pan/zoom controller applied a transform.
    PanZoom,
    /// No controller applied; the scrollable fallback ran.
    Fallback,
    /// Neither applied (empty tree, or no scrollable target had metrics).
    None,
}

/// What happened to a reference node during a resolve or detach walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteTreeOp {
    /// The remote tree was found and connected.
    Connected,
    /// No remote tree is published under the id yet.
    Missing,
    /// The remote tree was disconnected.
    Detached,
}

/// Which shadow property of a node changed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadowField {
    /// Shadow (and therefore world) transform.
    Transform,
    /// Shadow (and therefore effective) opacity.
    Opacity,
    /// Shadow clip.
    Clip,
    /// Connected remote tree.
    Content,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame pass starts.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time the frame samples at.
    pub now: HostTime,
    /// Whether the tree was updated since the previous frame.
    pub layers_updated: bool,
}

/// Emitted after the animation sampler ran.
#[derive(Clone, Copy, Debug)]
pub struct AnimationsSampledEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Whether any animation exists in the traversal.
    pub active: bool,
}

/// Emitted for each container a pan/zoom controller transformed.
#[derive(Clone, Copy, Debug)]
pub struct PanZoomAppliedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the container within its own tree.
    pub node_index: u32,
    /// Translation of the sampled view transform.
    pub translation: Vec2,
    /// Scale of the sampled view transform.
    pub scale: Vec2,
    /// Whether the controller asked for another frame.
    pub want_next_frame: bool,
}

/// Emitted for each node the scrollable fallback transformed.
#[derive(Clone, Copy, Debug)]
pub struct FallbackAppliedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the scrollable node.
    pub node_index: u32,
    /// Offset handed to the fixed-position compensator.
    pub offset: Vec2,
    /// Scale difference handed to the fixed-position compensator.
    pub scale_diff: Vec2,
    /// Whether the X axis was shrunk to fit.
    pub shrink_x: bool,
    /// Whether the Y axis was shrunk to fit.
    pub shrink_y: bool,
}

/// Emitted for each reference node visited by a resolve or detach walk.
#[derive(Clone, Copy, Debug)]
pub struct RemoteTreeEvent {
    /// Slot index of the reference node within its own tree.
    pub node_index: u32,
    /// The remote tree the reference node names.
    pub id: RemoteTreeId,
    /// What happened.
    pub op: RemoteTreeOp,
    /// Whether this remote tree deferred composition for an orientation change.
    pub deferred: bool,
}

/// Per-frame summary emitted when a frame pass ends.
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time the frame sampled at.
    pub now: HostTime,
    /// Whether any animation exists in the traversal.
    pub animations_active: bool,
    /// Which path produced the scroll and zoom transforms.
    pub path: FramePath,
    /// Whether another frame is wanted (animations or a controller).
    pub want_next_frame: bool,
    /// Render offset delivered to the sink this frame, if any.
    pub render_offset: Option<Vec2>,
    /// Whether the tree is ready to compose.
    pub ready_for_compose: bool,
}

/// A per-frame shadow change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ShadowChange {
    /// The tree the node lives in, `None` for the local tree.
    pub tree: Option<RemoteTreeId>,
    /// Slot index of the node that changed.
    pub node_index: u32,
    /// Which field changed.
    pub field: ShadowField,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the compositor.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame pass starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called after animations were sampled.
    fn on_animations_sampled(&mut self, e: &AnimationsSampledEvent) {
        _ = e;
    }

    /// Called for each container a pan/zoom controller transformed.
    fn on_pan_zoom_applied(&mut self, e: &PanZoomAppliedEvent) {
        _ = e;
    }

    /// Called for each node the scrollable fallback transformed.
    fn on_fallback_applied(&mut self, e: &FallbackAppliedEvent) {
        _ = e;
    }

    /// Called for each reference node a resolve or detach walk visits.
    fn on_remote_tree(&mut self, e: &RemoteTreeEvent) {
        _ = e;
    }

    /// Called with the per-frame summary.
    fn on_frame_end(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with per-frame shadow changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_shadow_changes(&mut self, frame_index: u64, changes: &[ShadowChange]) {
        _ = (frame_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $event:expr) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($event);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $event;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        dispatch!(self, on_frame_begin, e);
    }

    /// Emits an [`AnimationsSampledEvent`].
    #[inline]
    pub fn animations_sampled(&mut self, e: &AnimationsSampledEvent) {
        dispatch!(self, on_animations_sampled, e);
    }

    /// Emits a [`PanZoomAppliedEvent`].
    #[inline]
    pub fn pan_zoom_applied(&mut self, e: &PanZoomAppliedEvent) {
        dispatch!(self, on_pan_zoom_applied, e);
    }

    /// Emits a [`FallbackAppliedEvent`].
    #[inline]
    pub fn fallback_applied(&mut self, e: &FallbackAppliedEvent) {
        dispatch!(self, on_fallback_applied, e);
    }

    /// Emits a [`RemoteTreeEvent`].
    #[inline]
    pub fn remote_tree(&mut self, e: &RemoteTreeEvent) {
        dispatch!(self, on_remote_tree, e);
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_end(&mut self, s: &FrameSummary) {
        dispatch!(self, on_frame_end, s);
    }

    /// Emits per-frame shadow changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn shadow_changes(&mut self, frame_index: u64, changes: &[ShadowChange]) {
        if let Some(s) = &mut self.sink {
            s.on_shadow_changes(frame_index, changes);
        }
    }

    /// Whether a sink is attached (always `false` without the `trace` feature).
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }
}
