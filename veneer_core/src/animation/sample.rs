// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame animation sampling into shadow properties.

use super::model::{AnimatedProperty, Animation};
use super::runtime::AnimationRuntime;
use super::timing::position_in_iteration;
use super::value::{AnimationValue, interpolate_opacity, interpolate_transform, resolve_transform};
use crate::APP_UNITS_PER_CSS_PIXEL;
use crate::remote::RemoteTreeRegistry;
use crate::scene::{NodeKind, SceneTree, child_indices};
use crate::time::HostTime;
use crate::transform::Transform3d;

/// Samples every animation in `tree`, including connected remote trees, at
/// `now` and writes the results into shadow opacity and shadow transform.
///
/// A node's animations are scanned in reverse declaration order and the
/// first value produced for a property wins, so the last-declared
/// animation of each property is the one presented.
///
/// Returns whether any animation exists anywhere in the traversal. Finished
/// animations keep filling forwards and still count as active.
pub fn sample_animations(tree: &mut SceneTree, registry: &mut RemoteTreeRegistry, now: HostTime) -> bool {
    match tree.root_index() {
        Some(root) => sample_node(tree, registry, root, now),
        None => false,
    }
}

fn sample_node(tree: &mut SceneTree, registry: &mut RemoteTreeRegistry, idx: u32, now: HostTime) -> bool {
    let own = sample_own(tree, idx, now);
    if let Some(opacity) = own.opacity {
        tree.set_shadow_opacity_at(idx, opacity);
    }
    if let Some(transform) = own.transform {
        tree.set_shadow_transform_at(idx, transform);
    }

    let mut active = own.active;
    for child in child_indices(tree, idx) {
        active |= sample_node(tree, registry, child, now);
    }
    if let Some(id) = tree.referent[idx as usize] {
        active |= registry
            .with_tree(id, |remote, registry| match remote.tree.root_index() {
                Some(root) => sample_node(&mut remote.tree, registry, root, now),
                None => false,
            })
            .unwrap_or(false);
    }
    active
}

#[derive(Default)]
struct NodeSample {
    active: bool,
    opacity: Option<f32>,
    transform: Option<Transform3d>,
}

fn sample_own(tree: &SceneTree, idx: u32, now: HostTime) -> NodeSample {
    let i = idx as usize;
    let animations = &tree.animations[i];
    let runtime = &tree.animation_runtime[i];
    let mut out = NodeSample::default();
    if animations.is_empty() {
        return out;
    }
    if animations.len() != runtime.len() {
        debug_assert!(false, "animations and runtime state are not index-aligned");
        tracing::warn!(
            node = idx,
            animations = animations.len(),
            runtime = runtime.len(),
            "skipping animations with misaligned runtime state"
        );
        return out;
    }

    for (animation, state) in animations.iter().zip(runtime).rev() {
        out.active = true;
        let taken = match animation.property {
            AnimatedProperty::Opacity => out.opacity.is_some(),
            AnimatedProperty::Transform => out.transform.is_some(),
        };
        if taken {
            continue;
        }
        match sample_value(animation, state, now) {
            Some(Sampled::Opacity(opacity)) => out.opacity = Some(opacity),
            Some(Sampled::Transform(m)) => {
                if tree.fixed[i].is_some() {
                    debug_assert!(false, "fixed-position node carries a transform animation");
                    tracing::warn!(node = idx, "ignoring transform animation on fixed-position node");
                    continue;
                }
                let m = match tree.kind[i] {
                    NodeKind::Container => {
                        let s = tree.scale_factors[i];
                        m.post_scale(1.0 / s.inherited_x, 1.0 / s.inherited_y, 1.0)
                    }
                    NodeKind::Content => m,
                };
                out.transform = Some(m);
            }
            None => {}
        }
    }
    out
}

enum Sampled {
    Opacity(f32),
    Transform(Transform3d),
}

fn sample_value(animation: &Animation, runtime: &AnimationRuntime, now: HostTime) -> Option<Sampled> {
    let elapsed = now.signed_ticks_since(animation.start_time);
    let position = position_in_iteration(
        elapsed,
        animation.duration.as_f64(),
        animation.iterations,
        animation.direction,
    );
    debug_assert!(
        (0.0..=1.0).contains(&position),
        "iteration position {position} escaped [0, 1]"
    );

    let segments = &animation.segments;
    let mut seg = 0;
    while seg + 1 < segments.len() && segments[seg].end_portion < position {
        seg += 1;
    }
    let segment = segments.get(seg)?;
    let portion = (position - segment.start_portion) / (segment.end_portion - segment.start_portion);
    let eased = runtime.functions.get(seg)?.value(portion);

    match (runtime.start_values.get(seg)?, runtime.end_values.get(seg)?) {
        (AnimationValue::Opacity(from), AnimationValue::Opacity(to)) => {
            Some(Sampled::Opacity(interpolate_opacity(*from, *to, eased)))
        }
        (AnimationValue::Transform(from), AnimationValue::Transform(to)) => {
            let data = animation.transform_data.as_ref()?;
            let px = APP_UNITS_PER_CSS_PIXEL / data.app_units_per_dev_pixel;
            let functions = interpolate_transform(from, to, eased, px);
            Some(Sampled::Transform(resolve_transform(functions, data)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Point, Rect};

    use super::*;
    use crate::animation::tests_support::opacity_animation;
    use crate::animation::{AnimationSegment, TimingFunction, TransformData, TransformFunction};
    use crate::remote::RemoteTree;
    use crate::scene::{FixedPosition, RemoteTreeId, ScaleFactors};

    fn single_node_tree(kind: NodeKind) -> (SceneTree, crate::scene::NodeId) {
        let mut tree = SceneTree::new();
        let root = tree.create_node(kind);
        tree.set_root(root);
        (tree, root)
    }

    fn translate_animation(to_x: f64) -> Animation {
        Animation {
            property: AnimatedProperty::Transform,
            segments: vec![AnimationSegment {
                start_portion: 0.0,
                end_portion: 1.0,
                start_value: AnimationValue::Transform(vec![]),
                end_value: AnimationValue::Transform(vec![TransformFunction::Translate {
                    x: to_x,
                    y: 0.0,
                    z: 0.0,
                }]),
                timing: TimingFunction::Linear,
            }],
            transform_data: Some(TransformData {
                origin: Point::ZERO,
                transform_origin: Point::ZERO,
                perspective_origin: Point::ZERO,
                perspective: 0.0,
                app_units_per_dev_pixel: 60.0,
                bounds: Rect::new(0.0, 0.0, 600.0, 600.0),
            }),
            ..opacity_animation(0.0, 1.0)
        }
    }

    #[test]
    fn no_animations_is_inactive() {
        let (mut tree, _) = single_node_tree(NodeKind::Container);
        let mut registry = RemoteTreeRegistry::new();
        assert!(!sample_animations(&mut tree, &mut registry, HostTime(10)));
        assert!(!sample_animations(&mut SceneTree::new(), &mut registry, HostTime(10)));
    }

    #[test]
    fn opacity_interpolates_and_fills_forwards() {
        let (mut tree, root) = single_node_tree(NodeKind::Container);
        let mut registry = RemoteTreeRegistry::new();
        tree.set_animations(root, vec![opacity_animation(0.0, 1.0)]).unwrap();

        assert!(sample_animations(&mut tree, &mut registry, HostTime(25)));
        assert!((tree.shadow_opacity(root) - 0.25).abs() < 1e-6);

        assert!(sample_animations(&mut tree, &mut registry, HostTime(100)));
        assert_eq!(tree.shadow_opacity(root), 1.0);

        // Long after the end: still active, still the final value.
        assert!(sample_animations(&mut tree, &mut registry, HostTime(10_000)));
        assert_eq!(tree.shadow_opacity(root), 1.0);
    }

    #[test]
    fn later_declared_animation_wins() {
        let (mut tree, root) = single_node_tree(NodeKind::Container);
        let mut registry = RemoteTreeRegistry::new();
        let a = opacity_animation(0.1, 0.1);
        let b = opacity_animation(0.7, 0.7);
        tree.set_animations(root, vec![a, b]).unwrap();

        assert!(sample_animations(&mut tree, &mut registry, HostTime(50)));
        assert!((tree.shadow_opacity(root) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn segment_boundaries_hit_exact_values() {
        let (mut tree, root) = single_node_tree(NodeKind::Content);
        let mut registry = RemoteTreeRegistry::new();
        let mut animation = opacity_animation(0.0, 1.0);
        animation.segments[0].end_portion = 0.5;
        animation.segments.push(AnimationSegment {
            start_portion: 0.5,
            end_portion: 1.0,
            start_value: AnimationValue::Opacity(1.0),
            end_value: AnimationValue::Opacity(0.4),
            timing: TimingFunction::EASE_IN_OUT,
        });
        tree.set_animations(root, vec![animation]).unwrap();

        let _ = sample_animations(&mut tree, &mut registry, HostTime(50));
        assert_eq!(tree.shadow_opacity(root), 1.0);
        let _ = sample_animations(&mut tree, &mut registry, HostTime(100));
        assert_eq!(tree.shadow_opacity(root), 0.4);
    }

    #[test]
    fn container_transform_divides_out_inherited_scale() {
        let (mut tree, root) = single_node_tree(NodeKind::Container);
        let mut registry = RemoteTreeRegistry::new();
        tree.set_scale_factors(
            root,
            ScaleFactors {
                inherited_x: 2.0,
                inherited_y: 2.0,
                ..ScaleFactors::IDENTITY
            },
        );
        tree.set_animations(root, vec![translate_animation(100.0)]).unwrap();

        let _ = sample_animations(&mut tree, &mut registry, HostTime(100));
        let m = tree.shadow_transform(root);
        assert!((m.translation_2d().x - 50.0).abs() < 1e-9);
        assert!((m.x_scale() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn remote_tree_animations_are_sampled_through_the_referent() {
        let (mut tree, reference) = single_node_tree(NodeKind::Container);
        tree.set_referent_at(reference.idx, Some(RemoteTreeId(7)));

        let (mut remote, remote_root) = single_node_tree(NodeKind::Content);
        remote.set_animations(remote_root, vec![opacity_animation(1.0, 0.0)]).unwrap();
        let mut registry = RemoteTreeRegistry::new();
        registry.publish(RemoteTreeId(7), RemoteTree::new(remote));

        assert!(sample_animations(&mut tree, &mut registry, HostTime(50)));
        let remote = &registry.get(RemoteTreeId(7)).unwrap().tree;
        assert!((remote.shadow_opacity(remote_root) - 0.5).abs() < 1e-6);
    }

    #[test]
    #[cfg_attr(
        debug_assertions,
        should_panic(expected = "fixed-position node carries a transform animation")
    )]
    fn transform_animation_on_fixed_node_is_skipped() {
        let (mut tree, root) = single_node_tree(NodeKind::Content);
        let mut registry = RemoteTreeRegistry::new();
        tree.set_fixed_position(root, Some(FixedPosition::new(Point::ZERO, FixedPosition::AUTO_MARGINS)));
        tree.set_animations(root, vec![translate_animation(10.0)]).unwrap();

        assert!(sample_animations(&mut tree, &mut registry, HostTime(100)));
        assert_eq!(tree.shadow_transform(root), Transform3d::IDENTITY);
    }
}
