// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree hand-over from the producer side.
//!
//! A producer either sends a whole replacement tree as a [`TreeUpdate`]
//! (applied with [`AsyncCompositor::update_tree`]) or, when it patched the
//! compositor's tree through some other synchronized channel, raises the
//! flags on the shared [`UpdateSignal`]. The compositor folds pending
//! flags into its state at the start of every frame pass.
//!
//! [`AsyncCompositor::update_tree`]: crate::compositor::AsyncCompositor::update_tree

use core::sync::atomic::{AtomicBool, Ordering};

use crate::remote::TargetConfig;
use crate::scene::SceneTree;

/// A complete replacement scene tree.
#[derive(Debug)]
pub struct TreeUpdate {
    /// The new tree.
    pub tree: SceneTree,
    /// Orientation, rotation and bounds the tree was laid out for.
    pub target_config: TargetConfig,
    /// Whether this is the first paint of a new document.
    pub is_first_paint: bool,
}

impl TreeUpdate {
    /// Creates an update that is not a first paint.
    #[must_use]
    pub fn new(tree: SceneTree, target_config: TargetConfig) -> Self {
        Self {
            tree,
            target_config,
            is_first_paint: false,
        }
    }

    /// Marks the update as the first paint of a new document.
    #[must_use]
    pub fn first_paint(mut self) -> Self {
        self.is_first_paint = true;
        self
    }
}

/// Flags taken from an [`UpdateSignal`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingFlags {
    /// The tree changed since the last frame.
    pub layers_updated: bool,
    /// The change was the first paint of a new document.
    pub is_first_paint: bool,
}

/// Cross-thread "tree updated" and "first paint" flags.
///
/// The producer raises them with [`notify`](Self::notify) after its tree
/// changes are visible; the compositor thread consumes them with
/// [`take`](Self::take). `layers_updated` is the release/acquire pair that
/// publishes everything written before it, including `first_paint`.
#[derive(Debug, Default)]
pub struct UpdateSignal {
    layers_updated: AtomicBool,
    first_paint: AtomicBool,
}

impl UpdateSignal {
    /// Creates a signal with no pending flags.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            layers_updated: AtomicBool::new(false),
            first_paint: AtomicBool::new(false),
        }
    }

    /// Raises "tree updated", and "first paint" if `is_first_paint`.
    pub fn notify(&self, is_first_paint: bool) {
        if is_first_paint {
            self.first_paint.store(true, Ordering::Relaxed);
        }
        self.layers_updated.store(true, Ordering::Release);
    }

    /// Whether a notification is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.layers_updated.load(Ordering::Acquire)
    }

    /// Consumes pending flags.
    pub fn take(&self) -> PendingFlags {
        if !self.layers_updated.swap(false, Ordering::AcqRel) {
            return PendingFlags::default();
        }
        PendingFlags {
            layers_updated: true,
            is_first_paint: self.first_paint.swap(false, Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_flags_once() {
        let signal = UpdateSignal::new();
        assert_eq!(signal.take(), PendingFlags::default());

        signal.notify(true);
        assert!(signal.is_pending());
        assert_eq!(
            signal.take(),
            PendingFlags {
                layers_updated: true,
                is_first_paint: true,
            }
        );
        assert!(!signal.is_pending());
        assert_eq!(signal.take(), PendingFlags::default());
    }

    #[test]
    fn first_paint_survives_later_notifications() {
        let signal = UpdateSignal::new();
        signal.notify(true);
        signal.notify(false);
        let flags = signal.take();
        assert!(flags.layers_updated);
        assert!(flags.is_first_paint);
    }

    #[test]
    fn builder_sets_first_paint() {
        let update = TreeUpdate::new(SceneTree::new(), TargetConfig::default()).first_paint();
        assert!(update.is_first_paint);
    }
}
