// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame asynchronous scene transforms for a compositing renderer.
//!
//! `veneer_core` runs on the compositor thread of a renderer whose content
//! is produced elsewhere (a layout engine, another process). Between two
//! content updates it keeps the presented scene alive: it samples
//! compositor-driven animations, applies user scrolling and zooming from
//! pan/zoom controllers or a host viewport bridge, and keeps fixed-position
//! content pinned to the viewport. It is `no_std` compatible (with `alloc`)
//! and stores each scene tree as struct-of-arrays with generational handles.
//!
//! # Architecture
//!
//! ```text
//!   Producer ──► TreeUpdate ──► AsyncCompositor::update_tree()
//!                                   │  detach / resolve remote trees
//!                                   ▼
//!   vsync ──► AsyncCompositor::transform_shadow_tree(now)
//!                 │ sample_animations
//!                 │ pan/zoom controllers ── or ── scrollable fallback
//!                 │ fixed-position compensation
//!                 ▼
//!   SceneTree::evaluate() ──► FrameChanges ──► Presenter::apply()
//! ```
//!
//! **[`scene`]**: struct-of-arrays scene tree. Producers set *base*
//! properties; frame passes write *shadow* properties; evaluation derives
//! world transforms and effective opacities.
//!
//! **[`animation`]**: animation model, timing functions, interpolation and
//! the sampler.
//!
//! **[`pan_zoom`]**: the controller seam, frame metrics and view transforms.
//!
//! **[`fixed`]** and **[`scrollable`]**: fixed-position compensation and
//! the fallback used when no controller applied.
//!
//! **[`remote`]**: remote trees published by other producers and the walks
//! that connect them to reference nodes.
//!
//! **[`viewport`]** and **[`backend`]**: host-side collaborators.
//!
//! **[`compositor`]**: the frame orchestrator.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) and event types for
//! frame-pass instrumentation, with a zero-overhead [`Tracer`](trace::Tracer).
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-node
//!   shadow change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod backend;
pub mod compositor;
pub mod dirty;
pub mod error;
pub mod fixed;
pub mod handoff;
pub mod pan_zoom;
pub mod remote;
pub mod scene;
pub mod scrollable;
pub mod time;
pub mod trace;
pub mod transform;
pub mod viewport;

/// Layout units per CSS pixel.
pub const APP_UNITS_PER_CSS_PIXEL: f64 = 60.0;
