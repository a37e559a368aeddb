//! End-to-end scenarios driving the scheduler against an in-memory scene.

use std::collections::HashMap;

use popper_core::{
    NullPlayer, PopConfig, PopEvent, PopScheduler, SceneGraph, TargetDescriptor, TargetHandle,
    TargetHost, TargetState, Vec3,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn build(config: PopConfig, targets: u32) -> PopScheduler<SceneGraph, NullPlayer> {
    let descriptors: Vec<TargetDescriptor> = (0..targets)
        .map(|i| TargetDescriptor::new(format!("mole-{i}"), Vec3::new(i as f32 * 2.0, 0.0, 1.0)))
        .collect();
    let scene = SceneGraph::from_descriptors(&descriptors);
    let pool = scene.handles();
    PopScheduler::new(config, pool, scene, NullPlayer).expect("valid scheduler")
}

fn deterministic_config() -> PopConfig {
    PopConfig {
        min_interval: 1.0,
        max_interval: 1.0,
        min_hold_time: 1.0,
        max_hold_time: 1.0,
        pop_height: 0.5,
        pop_down_speed: 5.0,
        ..Default::default()
    }
}

#[test]
fn fixed_interval_pops_once_per_time_unit() {
    let mut sched = build(deterministic_config(), 3);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    sched.start(&mut rng);

    let mut events = Vec::new();
    for _ in 0..40 {
        events.extend(sched.tick(0.25, &mut rng));
    }

    let pops = events
        .iter()
        .filter(|event| matches!(event, PopEvent::Popped { .. }))
        .count();
    assert_eq!(pops, 10);
    assert!(!events.contains(&PopEvent::AllBusy));
    assert_eq!(sched.elapsed(), 10.0);
}

#[test]
fn fall_takes_height_over_speed_at_frame_rate_ticks() {
    const DT: f32 = 0.01;
    let config = PopConfig {
        min_interval: 5.0,
        max_interval: 5.0,
        ..deterministic_config()
    };
    let mut sched = build(config, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let target = TargetHandle(0);
    let rest = Vec3::new(0.0, 0.0, 1.0);
    sched.start(&mut rng);

    let mut raised_at = None;
    let mut hold_ended_at = None;
    let mut lowered_at = None;
    for _ in 0..1000 {
        let events = sched.tick(DT, &mut rng);
        let now = sched.elapsed();
        if events.contains(&PopEvent::Raised { target }) {
            raised_at = Some(now);
        }
        if hold_ended_at.is_none() && sched.state_of(target) == TargetState::Falling {
            hold_ended_at = Some(now);
            // 0.05 to 0.06 s into a 0.1 s fall from 0.5 above rest
            for _ in 0..5 {
                sched.tick(DT, &mut rng);
            }
            assert_eq!(sched.state_of(target), TargetState::Falling);
            let lift = sched.host().position(target).unwrap().y - rest.y;
            assert!(lift > 0.19 && lift < 0.26, "lift midway through fall = {lift}");
            continue;
        }
        if events.contains(&PopEvent::Lowered { target }) {
            lowered_at = Some(now);
            break;
        }
    }

    let raised_at = raised_at.expect("target should rise");
    let hold_ended_at = hold_ended_at.expect("target should start falling");
    let lowered_at = lowered_at.expect("target should be lowered");
    assert!(((hold_ended_at - raised_at) - 1.0).abs() <= DT + 1e-3);
    assert!(((lowered_at - hold_ended_at) - 0.1).abs() <= DT + 1e-3);
    assert_eq!(sched.host().position(target), Some(rest));
    assert!(!sched.host().is_active(target));
}

#[test]
fn completed_cycles_return_exactly_to_rest() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for round in 0..20 {
        let min_interval = rng.gen_range(0.05f32..0.5);
        let min_hold = rng.gen_range(0.05f32..0.8);
        let config = PopConfig {
            min_interval,
            max_interval: min_interval + rng.gen_range(0.0f32..0.5),
            min_hold_time: min_hold,
            max_hold_time: min_hold + rng.gen_range(0.0f32..0.5),
            rise_duration: rng.gen_range(0.01f32..0.4),
            pop_height: rng.gen_range(0.1f32..3.0),
            pop_down_speed: rng.gen_range(0.5f32..20.0),
            up_axis: Vec3::new(0.3, 1.0, -0.2),
            ..Default::default()
        };
        let mut sched = build(config, 4);
        let dt = [1.0 / 60.0, 1.0 / 30.0, 0.07][round % 3];
        sched.start(&mut rng);

        let mut rests: HashMap<TargetHandle, Vec3> = HashMap::new();
        let mut completed = 0;
        for _ in 0..600 {
            for event in sched.tick(dt, &mut rng) {
                match event {
                    PopEvent::Popped { target, rest } => {
                        rests.insert(target, rest);
                    }
                    PopEvent::Lowered { target } => {
                        let rest = rests[&target];
                        assert_eq!(sched.host().position(target), Some(rest));
                        // may already be re-popped within the same tick
                        if sched.state_of(target) == TargetState::Idle {
                            assert!(!sched.host().is_active(target));
                        }
                        completed += 1;
                    }
                    _ => {}
                }
            }
        }
        assert!(completed > 0, "round {round} never completed a cycle");
    }
}

#[test]
fn early_strike_stops_motion_and_scores() {
    let config = PopConfig {
        min_interval: 5.0,
        max_interval: 5.0,
        rise_duration: 0.25,
        ..deterministic_config()
    };
    let mut sched = build(config, 3);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    sched.start(&mut rng);

    let mut popped = None;
    for _ in 0..200 {
        popped = sched.tick(0.05, &mut rng).into_iter().find_map(|event| match event {
            PopEvent::Popped { target, rest } => Some((target, rest)),
            _ => None,
        });
        if popped.is_some() {
            break;
        }
    }
    let (target, rest) = popped.expect("a target should pop within five seconds");

    sched.tick(0.05, &mut rng);
    sched.tick(0.05, &mut rng);
    assert_eq!(sched.state_of(target), TargetState::Rising);
    let mid = sched.host().position(target).unwrap();
    assert!(mid.y > rest.y && mid.y < rest.y + 0.5);

    assert_eq!(sched.strike(target), Some(1));
    assert_eq!(sched.score(), 1);
    assert!(!sched.host().is_active(target));
    let after_hit = sched.host().position(target);

    for _ in 0..20 {
        sched.tick(0.05, &mut rng);
    }
    assert_eq!(sched.state_of(target), TargetState::Idle);
    assert_eq!(sched.host().position(target), after_hit);
    assert!(!sched.host().is_active(target));
    assert_eq!(sched.score(), 1);
}

#[test]
fn strikes_on_idle_targets_never_score() {
    let mut sched = build(deterministic_config(), 3);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    sched.start(&mut rng);

    for _ in 0..40 {
        for target in sched.host().handles() {
            if sched.state_of(target) == TargetState::Idle {
                assert_eq!(sched.strike(target), None);
            }
        }
        sched.tick(0.25, &mut rng);
    }
    assert_eq!(sched.score(), 0);
}

#[test]
fn stop_mid_session_leaves_every_target_hidden_at_rest() {
    let mut sched = build(deterministic_config(), 3);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    sched.start(&mut rng);
    for _ in 0..21 {
        sched.tick(0.25, &mut rng);
    }
    assert!(!sched.active_targets().is_empty());

    sched.stop();

    for (index, target) in sched.host().handles().into_iter().enumerate() {
        assert!(!sched.host().is_active(target));
        assert_eq!(
            sched.host().position(target),
            Some(Vec3::new(index as f32 * 2.0, 0.0, 1.0))
        );
    }
}
