// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame orchestrator.
//!
//! [`AsyncCompositor`] owns the compositor-side copy of the scene tree, the
//! registry of remote trees and the little state that persists between
//! frames ([`CompositionState`]). Once per display refresh,
//! [`transform_shadow_tree`](AsyncCompositor::transform_shadow_tree) runs
//! the frame pass:
//!
//! ```text
//!   reset shadows ──► sample animations ──► apply pan/zoom controllers
//!                                                │
//!                          nothing applied? ─────┤
//!                                                ▼
//!                                      scrollable fallback
//!                                                │
//!                                                ▼
//!                                   render offset ──► RenderOffsetSink
//! ```
//!
//! [`composite`](AsyncCompositor::composite) additionally evaluates every
//! tree and hands the changes to a [`Presenter`].
//!
//! A frame pass never fails. Missing remote trees, containers without a
//! controller, an empty tree or a host without a viewport bridge each
//! degrade to "no adjustment" for the part they affect.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::animation::sample_animations;
use crate::backend::{NoopRenderOffsetSink, Presenter, RenderOffsetSink};
use crate::handoff::{TreeUpdate, UpdateSignal};
use crate::pan_zoom::apply_async_content_transforms;
use crate::remote::{
    RemoteTreeRegistry, TargetConfig, compute_rotation, detach_remote_trees, resolve_remote_trees,
};
use crate::scene::{NodeId, SceneTree};
use crate::scrollable::apply_scrollable_fallback;
use crate::time::HostTime;
use crate::trace::{AnimationsSampledEvent, FrameBeginEvent, FramePath, FrameSummary, Tracer};
use crate::transform::Transform3d;
use crate::viewport::{NoopViewportBridge, ViewportBridge};

/// Which nodes the scrollable fallback transforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FallbackTargets {
    /// Only the tree's primary scrollable node.
    #[default]
    PrimaryScrollable,
    /// Every scrollable container of the tree.
    AllScrollable,
}

/// Construction-time configuration of an [`AsyncCompositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompositorConfig {
    /// Targets of the scrollable fallback.
    pub fallback: FallbackTargets,
    /// Whether every frame starts from the producer's base properties.
    pub reset_shadow_each_frame: bool,
}

impl CompositorConfig {
    /// A host with a single viewport owned by a platform bridge.
    #[must_use]
    pub const fn mobile() -> Self {
        Self {
            fallback: FallbackTargets::PrimaryScrollable,
            reset_shadow_each_frame: true,
        }
    }

    /// A host where every scrollable container scrolls on its own.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            fallback: FallbackTargets::AllScrollable,
            reset_shadow_each_frame: true,
        }
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self::mobile()
    }
}

/// State that persists between frame passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositionState {
    /// Zoom the host shows, per axis.
    pub zoom: Vec2,
    /// Scroll offset the host shows, in device pixels.
    pub scroll_offset: Point,
    /// Whether the next frame is the first paint of a new document.
    pub is_first_paint: bool,
    /// Content rect last reported to the viewport bridge.
    pub content_rect: Rect,
    /// Whether the tree changed since the last sync with the bridge.
    pub layers_updated: bool,
    /// Whether the tree may be composited; cleared while a remote tree is
    /// about to reflow for an orientation change.
    pub ready_for_compose: bool,
}

impl CompositionState {
    /// Sets a uniform zoom and the scroll offset from the host.
    pub fn set_transformation(&mut self, scale: f64, scroll_offset: Point) {
        self.zoom = Vec2::new(scale, scale);
        self.scroll_offset = scroll_offset;
    }
}

impl Default for CompositionState {
    fn default() -> Self {
        Self {
            zoom: Vec2::new(1.0, 1.0),
            scroll_offset: Point::ZERO,
            is_first_paint: false,
            content_rect: Rect::ZERO,
            layers_updated: false,
            ready_for_compose: true,
        }
    }
}

/// Everything a frame pass threads through its tree walks.
pub(crate) struct FrameContext<'a, 't> {
    pub(crate) now: HostTime,
    pub(crate) frame_index: u64,
    pub(crate) state: &'a mut CompositionState,
    pub(crate) bridge: &'a mut dyn ViewportBridge,
    /// Last render offset reported by the bridge this frame.
    pub(crate) render_offset: Option<Vec2>,
    pub(crate) want_next_frame: bool,
    pub(crate) tracer: &'a mut Tracer<'t>,
}

/// The per-frame asynchronous transform engine.
pub struct AsyncCompositor {
    config: CompositorConfig,
    state: CompositionState,
    target_config: TargetConfig,
    tree: SceneTree,
    registry: RemoteTreeRegistry,
    bridge: Box<dyn ViewportBridge + Send>,
    render_offset_sink: Box<dyn RenderOffsetSink + Send>,
    world_transform: Transform3d,
    frame_index: u64,
    signal: Arc<UpdateSignal>,
}

impl fmt::Debug for AsyncCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCompositor")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("target_config", &self.target_config)
            .field("tree", &self.tree)
            .field("registry", &self.registry)
            .field("world_transform", &self.world_transform)
            .field("frame_index", &self.frame_index)
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}

impl AsyncCompositor {
    /// Creates a compositor with an empty tree and no host collaborators.
    #[must_use]
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            config,
            state: CompositionState::default(),
            target_config: TargetConfig::default(),
            tree: SceneTree::new(),
            registry: RemoteTreeRegistry::new(),
            bridge: Box::new(NoopViewportBridge),
            render_offset_sink: Box::new(NoopRenderOffsetSink),
            world_transform: Transform3d::IDENTITY,
            frame_index: 0,
            signal: Arc::new(UpdateSignal::new()),
        }
    }

    /// Sets the host's viewport bridge.
    #[must_use]
    pub fn with_viewport_bridge(mut self, bridge: impl ViewportBridge + Send + 'static) -> Self {
        self.bridge = Box::new(bridge);
        self
    }

    /// Sets the sink that receives the render offset.
    #[must_use]
    pub fn with_render_offset_sink(mut self, sink: impl RenderOffsetSink + Send + 'static) -> Self {
        self.render_offset_sink = Box::new(sink);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Returns the state persisted between frames.
    #[must_use]
    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// Returns the state persisted between frames, mutably.
    pub fn state_mut(&mut self) -> &mut CompositionState {
        &mut self.state
    }

    /// Sets a uniform zoom and the scroll offset from the host.
    pub fn set_transformation(&mut self, scale: f64, scroll_offset: Point) {
        self.state.set_transformation(scale, scroll_offset);
    }

    /// Returns the target configuration of the current tree.
    #[must_use]
    pub fn target_config(&self) -> &TargetConfig {
        &self.target_config
    }

    /// Whether the current tree may be composited.
    #[must_use]
    pub fn ready_for_compose(&self) -> bool {
        self.state.ready_for_compose
    }

    /// Returns the local tree.
    #[must_use]
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Returns the local tree for in-place patches. Raise the
    /// [`update_signal`](Self::update_signal) afterwards.
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// Returns the remote tree registry.
    #[must_use]
    pub fn registry(&self) -> &RemoteTreeRegistry {
        &self.registry
    }

    /// Returns the remote tree registry for publishing. Call
    /// [`refresh_remote_trees`](Self::refresh_remote_trees) afterwards.
    pub fn registry_mut(&mut self) -> &mut RemoteTreeRegistry {
        &mut self.registry
    }

    /// World transform presenting the tree for the rotated screen.
    #[must_use]
    pub fn world_transform(&self) -> Transform3d {
        self.world_transform
    }

    /// Number of frame passes run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns a handle producers use to flag tree changes across threads.
    #[must_use]
    pub fn update_signal(&self) -> Arc<UpdateSignal> {
        Arc::clone(&self.signal)
    }

    /// Installs a replacement tree. See [`update_tree_traced`](Self::update_tree_traced).
    pub fn update_tree(&mut self, update: TreeUpdate) {
        self.update_tree_traced(update, &mut Tracer::none());
    }

    /// Installs a replacement tree.
    ///
    /// Remote trees are detached from the outgoing tree, the flags are set,
    /// the rotation is recomputed and remote trees are resolved against the
    /// new tree. Returns the outgoing tree.
    pub fn update_tree_traced(&mut self, update: TreeUpdate, tracer: &mut Tracer<'_>) -> SceneTree {
        detach_remote_trees(&mut self.tree, &mut self.registry, tracer);
        let old = core::mem::replace(&mut self.tree, update.tree);
        self.target_config = update.target_config;
        self.state.is_first_paint |= update.is_first_paint;
        self.state.layers_updated = true;
        self.state.ready_for_compose = true;
        if !self.target_config.natural_bounds.is_zero_area() {
            self.world_transform =
                compute_rotation(self.target_config.rotation, self.target_config.natural_bounds);
        }
        self.state.ready_for_compose =
            resolve_remote_trees(&mut self.tree, &mut self.registry, &self.target_config, tracer);
        old
    }

    /// Detaches and re-resolves remote trees, for example after a remote
    /// tree was published or removed. Returns [`ready_for_compose`](Self::ready_for_compose).
    pub fn refresh_remote_trees(&mut self, tracer: &mut Tracer<'_>) -> bool {
        detach_remote_trees(&mut self.tree, &mut self.registry, tracer);
        self.state.ready_for_compose =
            resolve_remote_trees(&mut self.tree, &mut self.registry, &self.target_config, tracer);
        self.state.ready_for_compose
    }

    /// Runs one frame pass. See [`transform_shadow_tree_traced`](Self::transform_shadow_tree_traced).
    pub fn transform_shadow_tree(&mut self, now: HostTime) -> bool {
        self.transform_shadow_tree_traced(now, &mut Tracer::none())
    }

    /// Runs one frame pass at `now`.
    ///
    /// Animations are sampled first, then every pan/zoom controller is
    /// applied; if none was, the scrollable fallback runs. Returns whether
    /// another frame is wanted: an animation exists or a controller asked
    /// for one.
    pub fn transform_shadow_tree_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> bool {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let pending = self.signal.take();
        self.state.layers_updated |= pending.layers_updated;
        self.state.is_first_paint |= pending.is_first_paint;

        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            now,
            layers_updated: self.state.layers_updated,
        });

        if self.config.reset_shadow_each_frame {
            self.tree.reset_shadow_properties();
            for (_, remote) in self.registry.iter_mut() {
                remote.tree.reset_shadow_properties();
            }
        }

        let animations_active = sample_animations(&mut self.tree, &mut self.registry, now);
        tracer.animations_sampled(&AnimationsSampledEvent {
            frame_index,
            active: animations_active,
        });

        let root_transform = self
            .tree
            .root()
            .map_or(Transform3d::IDENTITY, |root| self.tree.base_transform(root));

        let mut cx = FrameContext {
            now,
            frame_index,
            state: &mut self.state,
            bridge: &mut *self.bridge,
            render_offset: None,
            want_next_frame: false,
            tracer,
        };

        let path = if apply_async_content_transforms(
            &mut cx,
            &mut self.tree,
            &mut self.registry,
            root_transform.x_scale(),
        ) {
            FramePath::PanZoom
        } else {
            let targets: Vec<NodeId> = match self.config.fallback {
                FallbackTargets::PrimaryScrollable => self.tree.primary_scrollable().into_iter().collect(),
                FallbackTargets::AllScrollable => self.tree.scrollable_nodes(),
            };
            let mut applied = false;
            for node in targets {
                applied |= apply_scrollable_fallback(
                    &mut cx,
                    &mut self.tree,
                    &mut self.registry,
                    node.idx,
                    &root_transform,
                );
            }
            if applied {
                FramePath::Fallback
            } else {
                FramePath::None
            }
        };

        let render_offset = cx.render_offset;
        let want_next_frame = animations_active || cx.want_next_frame;
        if let Some(offset) = render_offset {
            self.render_offset_sink.set_screen_render_offset(offset);
        }

        tracer.frame_end(&FrameSummary {
            frame_index,
            now,
            animations_active,
            path,
            want_next_frame,
            render_offset,
            ready_for_compose: self.state.ready_for_compose,
        });
        want_next_frame
    }

    /// Runs a frame pass, evaluates every tree and presents the changes.
    /// See [`composite_traced`](Self::composite_traced).
    pub fn composite(&mut self, now: HostTime, presenter: &mut dyn Presenter) -> bool {
        self.composite_traced(now, presenter, &mut Tracer::none())
    }

    /// Runs a frame pass, evaluates every tree and presents the changes.
    ///
    /// Does nothing and returns `false` while the tree is not ready to
    /// compose. Otherwise the local tree is presented first, then every
    /// published remote tree in id order. Returns whether another frame is
    /// wanted.
    pub fn composite_traced(
        &mut self,
        now: HostTime,
        presenter: &mut dyn Presenter,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if !self.state.ready_for_compose {
            tracing::debug!("tree not ready to compose, skipping frame");
            return false;
        }
        let frame_index = self.frame_index;
        let want_next_frame = self.transform_shadow_tree_traced(now, tracer);

        #[cfg(feature = "trace-rich")]
        let mut shadow_changes = Vec::new();

        let changes = self.tree.evaluate();
        #[cfg(feature = "trace-rich")]
        collect_shadow_changes(None, &changes, &mut shadow_changes);
        presenter.apply(None, &self.tree, &changes);

        for (id, remote) in self.registry.iter_mut() {
            let changes = remote.tree.evaluate();
            #[cfg(feature = "trace-rich")]
            collect_shadow_changes(Some(id), &changes, &mut shadow_changes);
            presenter.apply(Some(id), &remote.tree, &changes);
        }

        #[cfg(feature = "trace-rich")]
        tracer.shadow_changes(frame_index, &shadow_changes);
        #[cfg(not(feature = "trace-rich"))]
        let _ = frame_index;

        want_next_frame
    }
}

#[cfg(feature = "trace-rich")]
fn collect_shadow_changes(
    tree: Option<crate::scene::RemoteTreeId>,
    changes: &crate::scene::FrameChanges,
    out: &mut Vec<crate::trace::ShadowChange>,
) {
    use crate::trace::{ShadowChange, ShadowField};

    let fields = [
        (&changes.transforms, ShadowField::Transform),
        (&changes.opacities, ShadowField::Opacity),
        (&changes.clips, ShadowField::Clip),
        (&changes.content, ShadowField::Content),
    ];
    for (indices, field) in fields {
        out.extend(indices.iter().map(|&node_index| ShadowChange {
            tree,
            node_index,
            field,
        }));
    }
}
