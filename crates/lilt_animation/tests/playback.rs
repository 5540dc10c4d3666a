//! Integration tests for playback through the public scheduler API
//!
//! These tests verify that:
//! - Tweens start on their origin and land exactly on their destination
//! - Delay, loop, ping-pong and reverse behave over whole runs
//! - Finishing and stopping never disturb the frame in progress
//! - Groups derive their duration from their members

use lilt_animation::{
    init_scheduler, AnimationScheduler, Easing, EffectCurve, EffectKind, GroupEffect, LoopMode,
};
use lilt_core::{Color, GraphicNode, Quat, RectNode, ScreenMetrics, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn scheduler() -> AnimationScheduler {
    AnimationScheduler::with_metrics(ScreenMetrics::new(1000.0, 1000.0).unwrap()).unwrap()
}

fn assert_near(actual: Vec2, expected: Vec2) {
    assert!(
        (actual.x - expected.x).abs() < 1e-3 && (actual.y - expected.y).abs() < 1e-3,
        "expected {expected:?}, got {actual:?}"
    );
}

/// Every easing starts on the origin and ends exactly on the destination
#[test]
fn test_endpoints_are_exact_for_every_easing() {
    let easings = [
        Easing::Linear,
        Easing::EaseInOut,
        Easing::EaseOutQuart,
        Easing::Power(0.33),
        Easing::InverseSine,
        Easing::CircularOut,
        Easing::CubicBezier(0.68, -0.6, 0.32, 1.6),
    ];
    for easing in easings {
        let mut scheduler = scheduler();
        let node = RectNode::new().shared();
        let id = scheduler
            .move_between(node.clone(), Vec2::new(0.125, 0.25), Vec2::new(0.75, 0.875), 1.0)
            .unwrap()
            .easing(easing)
            .effect(EffectCurve::spring(0.2, 3), Quat::IDENTITY)
            .id();

        assert!(scheduler.advance(id, 0.0));
        assert_near(node.borrow().anchored_position, Vec2::new(125.0, 250.0));

        while scheduler.advance(id, 0.1) {}
        assert_eq!(
            node.borrow().anchored_position,
            Vec2::new(750.0, 875.0),
            "{easing:?}"
        );
    }
}

/// `advance` keeps returning true until progress reaches 1, then false once
#[test]
fn test_advance_reports_completion_once() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    let finished = Rc::new(Cell::new(0));
    let seen = finished.clone();
    let id = scheduler
        .scale_between(node.clone(), Vec3::ONE, Vec3::new(3.0, 3.0, 1.0), 1.0)
        .on_finish(move |_, _| seen.set(seen.get() + 1))
        .play();

    for _ in 0..3 {
        scheduler.tick(0.25);
        assert!(scheduler.is_active(id));
    }
    scheduler.tick(0.25);
    assert!(!scheduler.is_active(id));
    assert_eq!(finished.get(), 1);

    // Further frames neither advance nor finish it again
    scheduler.tick(0.25);
    scheduler.tick(0.25);
    assert_eq!(finished.get(), 1);
    assert_eq!(node.borrow().scale, Vec3::new(3.0, 3.0, 1.0));
}

/// Reversing twice restores the original direction
#[test]
fn test_reverse_is_an_involution() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    let id = scheduler
        .move_between(node.clone(), Vec2::ZERO, Vec2::new(0.5, 0.25), 1.0)
        .unwrap()
        .id();

    scheduler.reverse(id);
    scheduler.reverse(id);
    scheduler.play(id);
    scheduler.tick(1.0);
    assert_eq!(node.borrow().anchored_position, Vec2::new(500.0, 250.0));

    scheduler.play_reverse(id);
    scheduler.tick(1.0);
    assert_eq!(node.borrow().anchored_position, Vec2::ZERO);
}

/// A delayed animation holds its origin, then runs for its full duration
#[test]
fn test_delay_pins_origin() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    let id = scheduler
        .move_between(node.clone(), Vec2::new(0.2, 0.2), Vec2::new(0.6, 0.2), 1.0)
        .unwrap()
        .delay(0.5)
        .play();

    for _ in 0..4 {
        scheduler.tick(0.125);
        assert_near(node.borrow().anchored_position, Vec2::new(200.0, 200.0));
    }
    scheduler.tick(0.5);
    assert_near(node.borrow().anchored_position, Vec2::new(400.0, 200.0));
    scheduler.tick(0.5);
    assert_near(node.borrow().anchored_position, Vec2::new(600.0, 200.0));
    assert!(!scheduler.is_active(id));
}

/// Looping replays origin to destination until stopped
#[test]
fn test_loop_repeats_until_stopped() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    let id = scheduler
        .scale_between(node.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 2.0), 1.0)
        .looping(LoopMode::Loop)
        .play();

    for _ in 0..3 {
        scheduler.tick(0.5);
        assert_eq!(node.borrow().scale.x, 1.5);
        scheduler.tick(0.5);
        assert_eq!(node.borrow().scale.x, 2.0);
    }

    scheduler.tick(0.25);
    scheduler.stop(id);
    scheduler.tick(0.25);
    scheduler.tick(1.0);
    assert_eq!(node.borrow().scale.x, 1.25);
    assert_eq!(scheduler.active_count(), 0);
}

/// Ping-pong alternates direction on every completion
#[test]
fn test_ping_pong_alternates() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    scheduler
        .rotate_angle_between(node.clone(), 0.0, 90.0, 1.0)
        .looping(LoopMode::PingPong)
        .play();

    let angle = |node: &Rc<RefCell<RectNode>>| node.borrow().rotation.z_angle_degrees();

    scheduler.tick(1.0);
    assert!((angle(&node) - 90.0).abs() < 1e-3);
    scheduler.tick(0.25);
    assert!((angle(&node) - 67.5).abs() < 1e-3);
    scheduler.tick(0.75);
    assert!(angle(&node).abs() < 1e-3 || (angle(&node) - 360.0).abs() < 1e-3);
    scheduler.tick(0.5);
    assert!((angle(&node) - 45.0).abs() < 1e-3);
}

/// A stop requested from a finish callback leaves the current frame alone
#[test]
fn test_stop_from_callback_applies_next_frame() {
    let mut scheduler = scheduler();
    let first = RectNode::new().shared();
    let second = RectNode::new().shared();
    let third = RectNode::new().shared();

    let a = scheduler
        .scale_between(first.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 2.0)
        .id();
    let c = scheduler
        .scale_between(third.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 2.0)
        .id();
    let b = scheduler
        .scale_between(second.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 0.5)
        .on_finish(move |scheduler, _| {
            scheduler.stop(c);
        })
        .id();
    for id in [a, b, c] {
        scheduler.play(id);
    }
    assert_eq!(scheduler.active_ids().collect::<Vec<_>>(), vec![a, b, c]);

    scheduler.tick(0.5);
    // Third was advanced during the frame in which the stop was requested
    assert_eq!(third.borrow().scale.x, 1.25);
    assert!(!scheduler.is_active(b));
    assert!(!scheduler.is_active(c));

    scheduler.tick(0.5);
    assert_eq!(third.borrow().scale.x, 1.25);
    assert_eq!(first.borrow().scale.x, 1.5);
    assert_eq!(scheduler.active_ids().collect::<Vec<_>>(), vec![a]);
}

/// An animation registered by a callback starts moving on the next frame
#[test]
fn test_callback_registration_is_deferred() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    let follow_up = scheduler
        .scale_between(node.clone(), Vec3::ONE, Vec3::new(3.0, 3.0, 1.0), 1.0)
        .id();
    let other = RectNode::new().shared();
    scheduler
        .scale_between(other, Vec3::ONE, Vec3::ONE, 0.5)
        .on_finish(move |scheduler, _| {
            scheduler.play(follow_up);
        })
        .play();

    scheduler.tick(0.5);
    assert!(scheduler.is_active(follow_up));
    assert_eq!(node.borrow().scale.x, 1.0);

    scheduler.tick(0.5);
    assert_eq!(node.borrow().scale.x, 2.0);
}

/// Group duration is the longest member; the group finishes exactly then
#[test]
fn test_group_finishes_with_longest_member() {
    let mut scheduler = scheduler();
    let nodes: Vec<_> = (0..3).map(|_| RectNode::new().shared()).collect();
    let members: Vec<_> = [1.0, 2.5, 0.5]
        .into_iter()
        .zip(&nodes)
        .map(|(duration, node)| {
            scheduler
                .scale_between(node.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), duration)
                .id()
        })
        .collect();
    let group = scheduler.group(&members).unwrap().play();
    assert_eq!(scheduler.get(group).unwrap().duration(), 2.5);

    for _ in 0..3 {
        scheduler.tick(0.625);
        assert!(scheduler.is_active(group));
    }
    assert_eq!(nodes[0].borrow().scale.x, 2.0);
    assert_eq!(nodes[1].borrow().scale.x, 1.75);
    assert_eq!(nodes[2].borrow().scale.x, 2.0);

    scheduler.tick(0.625);
    assert!(!scheduler.is_active(group));
    for node in &nodes {
        assert_eq!(node.borrow().scale.x, 2.0);
    }
}

/// A looping group replays every member from the start
#[test]
fn test_group_loop_resets_members() {
    let mut scheduler = scheduler();
    let a = RectNode::new().shared();
    let b = RectNode::new().shared();
    let first = scheduler
        .scale_between(a.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 0.5)
        .id();
    let second = scheduler
        .scale_between(b.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 0.5)
        .delay(0.5)
        .id();
    let group = scheduler
        .group(&[first, second])
        .unwrap()
        .looping(LoopMode::Loop)
        .play();

    scheduler.tick(0.5);
    scheduler.tick(0.5);
    assert!(scheduler.is_active(group));
    assert_eq!(b.borrow().scale.x, 2.0);

    scheduler.tick(0.25);
    assert_eq!(a.borrow().scale.x, 1.5);
    // Second is back inside its delay
    assert_eq!(b.borrow().scale.x, 1.0);
}

/// Viewport fractions map to local units on a 1000x1000 viewport
#[test]
fn test_position_scenario() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    scheduler
        .move_between(node.clone(), Vec2::ZERO, Vec2::ONE, 1.0)
        .unwrap()
        .play();

    scheduler.tick(0.5);
    assert_near(node.borrow().anchored_position, Vec2::new(500.0, 500.0));
    scheduler.tick(0.75);
    assert_eq!(node.borrow().anchored_position, Vec2::new(1000.0, 1000.0));
}

/// Fade in from transparent to opaque
#[test]
fn test_fade_in_scenario() {
    let mut scheduler = scheduler();
    let graphic = GraphicNode::new(Color::rgb(0.5, 0.25, 1.0)).shared();
    scheduler.fade_in(graphic.clone(), 1.0).play();

    scheduler.tick(0.25);
    assert!((graphic.borrow().color.a - 0.25).abs() < 1e-6);
    scheduler.tick(0.75);
    assert_eq!(graphic.borrow().color, Color::rgba(0.5, 0.25, 1.0, 1.0));
}

/// A Bezier move follows its curve and lands exactly on the end point
#[test]
fn test_bezier_round_trip() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    let id = scheduler
        .move_bezier_cubic(
            node.clone(),
            Vec2::ZERO,
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            1.0,
        )
        .unwrap()
        .play();

    scheduler.tick(0.5);
    assert_near(node.borrow().anchored_position, Vec2::new(500.0, 750.0));
    scheduler.tick(0.5);
    assert_eq!(node.borrow().anchored_position, Vec2::new(1000.0, 0.0));

    scheduler.play_reverse(id);
    scheduler.tick(1.0);
    assert_eq!(node.borrow().anchored_position, Vec2::ZERO);
}

/// Negative frame deltas scrub backwards
#[test]
fn test_negative_delta_scrubs_back() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    scheduler
        .scale_between(node.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 1.0)
        .play();
    scheduler.tick(0.75);
    scheduler.tick(-0.5);
    assert_eq!(node.borrow().scale.x, 1.25);
}

/// Seeded group effects are reproducible and still end exactly
#[test]
fn test_group_effect_is_seeded_and_vanishes_at_end() {
    let run = |seed: u64| {
        let mut scheduler = scheduler();
        let nodes: Vec<_> = (0..4).map(|_| RectNode::new().shared()).collect();
        let template_node = RectNode::new().shared();
        let template = scheduler
            .move_between(template_node, Vec2::ZERO, Vec2::new(0.5, 0.0), 1.0)
            .unwrap()
            .id();
        let targets: Vec<_> = nodes
            .iter()
            .map(|n| n.clone() as lilt_core::SharedTransform)
            .collect();
        let group = scheduler.group_broadcast(template, &targets).unwrap().id();

        let effect = GroupEffect::new(EffectKind::Wave)
            .amplitude(0.05, 0.2)
            .bounce(1, 4)
            .angle(0.0, 360.0);
        let mut rng = StdRng::seed_from_u64(seed);
        assert!(scheduler.set_group_effect(group, &effect, &mut rng));
        scheduler.play(group);

        scheduler.tick(0.5);
        let midway: Vec<Vec2> = nodes.iter().map(|n| n.borrow().anchored_position).collect();
        scheduler.tick(0.5);
        for node in &nodes {
            assert_eq!(node.borrow().anchored_position, Vec2::new(500.0, 0.0));
        }
        midway
    };

    assert_eq!(run(42), run(42));
}

/// The update thread's scheduler is shared through cloned handles
#[test]
fn test_global_handle_drives_animations() {
    let handle = init_scheduler(Some(ScreenMetrics::new(1000.0, 1000.0).unwrap())).unwrap();
    let node = RectNode::new().shared();
    handle.with(|scheduler| {
        scheduler
            .move_to(node.clone(), Vec2::new(0.25, 0.5), 1.0)
            .unwrap()
            .play();
    });

    handle.tick(1.0);
    assert_eq!(node.borrow().anchored_position, Vec2::new(250.0, 500.0));
    assert!(!handle.has_active_animations());
}

/// Delaying a member after grouping stretches the group to cover it
#[test]
fn test_group_follows_member_delay_changes() {
    let mut scheduler = scheduler();
    let first = RectNode::new().shared();
    let second = RectNode::new().shared();
    let a = scheduler
        .scale_between(first.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 1.0)
        .id();
    let b = scheduler
        .scale_between(second.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 1.0)
        .id();
    let group = scheduler.group(&[a, b]).unwrap().play();
    assert_eq!(scheduler.get(group).unwrap().duration(), 1.0);

    scheduler.get_mut(b).unwrap().set_delay(1.0);
    scheduler.tick(0.5);
    assert_eq!(scheduler.get(group).unwrap().duration(), 2.0);
    assert_eq!(first.borrow().scale.x, 1.5);
    assert_eq!(second.borrow().scale.x, 1.0);

    scheduler.tick(0.5);
    assert!(scheduler.is_active(group));
    assert_eq!(first.borrow().scale.x, 2.0);
    assert_eq!(second.borrow().scale.x, 1.0);

    scheduler.tick(0.5);
    assert_eq!(second.borrow().scale.x, 1.5);
    scheduler.tick(0.5);
    assert_eq!(second.borrow().scale.x, 2.0);
    assert!(!scheduler.is_active(group));

    // A replay picks up the new span from the start
    scheduler.get_mut(a).unwrap().set_delay(1.5);
    scheduler.play(group);
    assert_eq!(scheduler.get(group).unwrap().duration(), 2.5);
}

/// A grouped animation is advanced by its group only, once per frame
#[test]
fn test_group_member_is_advanced_once_per_frame() {
    let mut scheduler = scheduler();
    let node = RectNode::new().shared();
    let member = scheduler
        .scale_between(node.clone(), Vec3::ONE, Vec3::new(2.0, 2.0, 1.0), 1.0)
        .play();
    let group = scheduler.group(&[member]).unwrap().id();

    assert!(!scheduler.play(member));
    assert!(!scheduler.register(member));
    scheduler.play(group);
    assert_eq!(scheduler.active_ids().collect::<Vec<_>>(), vec![group]);

    scheduler.tick(0.25);
    assert_eq!(node.borrow().scale.x, 1.25);
    scheduler.tick(0.25);
    assert_eq!(node.borrow().scale.x, 1.5);
}
