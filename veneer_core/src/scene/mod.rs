// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A *node* is an element of a compositing scene tree published by a
//! producer (a content process, or the chrome). Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - **Base properties** set by the producer: transform, opacity, clip,
//!   [fixed position](FixedPosition), [resolution factors](ScaleFactors),
//!   animations, and for scrollable containers the
//!   [frame metrics](crate::pan_zoom::FrameMetrics).
//! - **Shadow properties** written by the compositor's frame passes: the
//!   transform, opacity, and clip actually presented this frame.
//! - **Computed properties** produced by [`evaluate`](SceneTree::evaluate):
//!   `world_transform` (product of ancestor shadow transforms) and
//!   `effective_opacity` (product of ancestor shadow opacities).
//!
//! A node of a tree may also be a *reference node*
//! ([`set_remote_tree`](SceneTree::set_remote_tree)) whose content is a
//! whole remote tree kept in a
//! [`RemoteTreeRegistry`](crate::remote::RemoteTreeRegistry). Every frame
//! pass descends into the connected remote tree as if its root were an
//! extra child of the reference node.
//!
//! # Dirty tracking
//!
//! Shadow writes that change a value mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)), so a backend only re-applies what moved.

mod evaluate;
mod id;
mod node;
mod traverse;
mod tree;

pub use evaluate::FrameChanges;
pub use id::{INVALID, NodeId, RemoteTreeId};
pub use node::{FixedPosition, NodeKind, ScaleFactors};
pub use traverse::Children;
pub use tree::SceneTree;

pub(crate) use traverse::child_indices;
