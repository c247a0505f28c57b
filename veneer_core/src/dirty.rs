// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channels for shadow outputs.
//!
//! The frame passes write *shadow* properties (the compositor-side outputs)
//! and every write that actually changes a value marks a channel via
//! [`understory_dirty`]. [`SceneTree::evaluate`](crate::scene::SceneTree::evaluate)
//! drains the channels and reports the result as
//! [`FrameChanges`](crate::scene::FrameChanges).
//!
//! - **Propagating**: [`TRANSFORM`] and [`OPACITY`] are marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) over child→parent
//!   dependency edges, since world transforms and effective opacities are
//!   inherited.
//! - **Local-only**: [`CLIP`] (shadow clip rect) and [`CONTENT`] (a remote
//!   tree connected to or detached from a reference node).
//! - **Structural**: [`TOPOLOGY`] triggers a traversal-order rebuild.

use understory_dirty::Channel;

/// Shadow transform changed; world transforms of the subtree are stale.
pub const TRANSFORM: Channel = Channel::new(0);

/// Shadow opacity changed; effective opacities of the subtree are stale.
pub const OPACITY: Channel = Channel::new(1);

/// Shadow clip changed.
pub const CLIP: Channel = Channel::new(2);

/// Rendered content of a reference node changed (remote tree linked or unlinked).
pub const CONTENT: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);
