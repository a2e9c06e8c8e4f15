//! Simulation invariants over random input scripts on the built-in levels.

use std::time::Duration;

use gimbo::core::fixed::{STARTING_HEARTS, FIXED_ONE};
use gimbo::game::camera::CameraConfig;
use gimbo::game::catalog::all_levels;
use gimbo::game::input::{InputFrame, InputSampler, Key};
use gimbo::game::physics::PhysicsConfig;
use gimbo::game::state::{LevelState, PlatformKind};
use gimbo::game::tick::tick;
use gimbo::replay::verify_transcript;
use gimbo::session::{Phase, SimConfig, Simulation};
use gimbo::Level;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn level_at(index: usize) -> &'static Level {
    let levels: Vec<_> = all_levels().collect();
    levels[index % levels.len()]
}

fn fresh(level: &Level) -> LevelState {
    LevelState::from_level(level, &PhysicsConfig::default(), &CameraConfig::default(), STARTING_HEARTS)
}

/// Held keys that change every few ticks, biased toward running right.
fn random_script(seed: u64, ticks: usize) -> Vec<InputFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut frame = InputFrame::new();
    (0..ticks)
        .map(|_| {
            if rng.gen_bool(0.1) {
                frame = InputFrame::new();
                if rng.gen_bool(0.7) {
                    frame = frame.with(Key::Right);
                } else if rng.gen_bool(0.5) {
                    frame = frame.with(Key::Left);
                }
                if rng.gen_bool(0.4) {
                    frame = frame.with(Key::Jump);
                }
                if rng.gen_bool(0.3) {
                    frame = frame.with(Key::Stretch);
                }
            }
            frame
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn neck_stays_within_bounds(
        level in 0usize..20,
        flags in proptest::collection::vec(0u8..16, 1..300)
    ) {
        let mut state = fresh(level_at(level));
        let config = PhysicsConfig::default();
        for f in flags {
            tick(&mut state, InputFrame::from_flags(f), &config);
            let player = &state.player;
            prop_assert!(player.neck_length >= 0);
            prop_assert!(player.neck_length <= player.max_neck_length);
        }
    }

    #[test]
    fn grounded_player_has_no_vertical_velocity(
        level in 0usize..20,
        flags in proptest::collection::vec(0u8..16, 1..300)
    ) {
        let mut state = fresh(level_at(level));
        let config = PhysicsConfig::default();
        for f in flags {
            tick(&mut state, InputFrame::from_flags(f), &config);
            if state.player.is_grounded {
                prop_assert_eq!(state.player.velocity.y, 0, "tick {}", state.tick);
            }
        }
    }

    #[test]
    fn player_stays_inside_horizontal_bounds(
        level in 0usize..20,
        flags in proptest::collection::vec(0u8..16, 1..300)
    ) {
        let mut state = fresh(level_at(level));
        let config = PhysicsConfig::default();
        for f in flags {
            tick(&mut state, InputFrame::from_flags(f), &config);
            let player = &state.player;
            prop_assert!(player.position.x >= state.bounds.min_x);
            prop_assert!(player.position.x <= state.bounds.max_x - player.width);
        }
    }

    #[test]
    fn pickups_and_stats_are_monotonic(level in 0usize..20, seed in any::<u64>()) {
        let mut state = fresh(level_at(level));
        let config = PhysicsConfig::default();
        let mut collected: Vec<bool> = state.collectibles.iter().map(|c| c.collected).collect();
        let mut stats = state.stats;

        for frame in random_script(seed, 600) {
            tick(&mut state, frame, &config);
            for (was, now) in collected.iter_mut().zip(&state.collectibles) {
                prop_assert!(!*was || now.collected, "{} was un-collected", now.id);
                *was = now.collected;
            }
            prop_assert!(state.stats.leaves >= stats.leaves);
            prop_assert!(state.stats.stars >= stats.stars);
            prop_assert!(state.stats.hearts >= stats.hearts);
            prop_assert!(state.stats.score >= stats.score);
            stats = state.stats;
        }
    }

    #[test]
    fn completion_fires_at_most_once(level in 0usize..20, seed in any::<u64>()) {
        let mut state = fresh(level_at(level));
        let config = PhysicsConfig::default();
        let mut completions = 0;
        let mut completed_at = None;

        for frame in random_script(seed, 1200) {
            let result = tick(&mut state, frame, &config);
            if result.completion.is_some() {
                completions += 1;
                completed_at = Some(state.tick);
            }
            if let Some(at) = completed_at {
                prop_assert!(state.goal.reached);
                prop_assert_eq!(state.tick, at);
            }
        }
        prop_assert!(completions <= 1);
    }

    #[test]
    fn moving_platforms_stay_on_their_segment(level in 0usize..20, ticks in 1u32..1500) {
        let mut state = fresh(level_at(level));
        let config = PhysicsConfig::default();
        for _ in 0..ticks {
            tick(&mut state, InputFrame::new(), &config);
        }

        for platform in &state.platforms {
            if let PlatformKind::Moving { path, .. } = &platform.kind {
                let min_x = path.iter().map(|p| p.x).min().unwrap_or(0);
                let max_x = path.iter().map(|p| p.x).max().unwrap_or(0);
                let min_y = path.iter().map(|p| p.y).min().unwrap_or(0);
                let max_y = path.iter().map(|p| p.y).max().unwrap_or(0);
                let at = platform.bounds();
                prop_assert!(at.x >= min_x && at.x <= max_x, "platform {} x out of path", platform.id);
                prop_assert!(at.y >= min_y && at.y <= max_y, "platform {} y out of path", platform.id);
            }
        }
    }
}

#[test]
fn zero_ticks_leave_state_unchanged() {
    for level in all_levels() {
        let mut sim = Simulation::load(level, SimConfig::default()).unwrap();
        let before = sim.state_hash();
        sim.start().unwrap();

        // Less than one step never ticks
        assert_eq!(sim.frame(Duration::ZERO, &InputSampler::new()), 0);
        assert_eq!(sim.frame(Duration::from_millis(5), &InputSampler::new()), 0);
        assert_eq!(sim.state_hash(), before, "{}", level.id);
        assert_eq!(sim.state().player.position, level.start_position);
    }
}

#[test]
fn identical_scripts_give_identical_hashes() {
    let config = PhysicsConfig::default();
    for (i, level) in all_levels().enumerate() {
        let script = random_script(i as u64, 900);
        let mut a = fresh(level);
        let mut b = fresh(level);
        for frame in &script {
            tick(&mut a, *frame, &config);
            tick(&mut b, *frame, &config);
        }
        assert_eq!(a.compute_hash(), b.compute_hash(), "{}", level.id);
    }
}

#[test]
fn recorded_sessions_verify_on_every_level() {
    for (i, level) in all_levels().enumerate() {
        let mut config = SimConfig::default();
        config.session.checkpoint_interval = 120;
        let mut sim = Simulation::load(level, config).unwrap();
        sim.start().unwrap();

        for frame in random_script(1000 + i as u64, 900) {
            if sim.phase() != Phase::Playing {
                break;
            }
            sim.step(frame).unwrap();
        }

        let transcript = sim.take_transcript().unwrap();
        let result = verify_transcript(&transcript, level);
        assert!(result.valid, "{}: {:?}", level.id, result.error);
    }
}

#[test]
fn player_starts_above_the_floor() {
    for level in all_levels() {
        let state = fresh(level);
        assert!(state.player.bottom() <= PhysicsConfig::default().ground_y + FIXED_ONE, "{}", level.id);
    }
}
