//! Authoritative Simulation Tick
//!
//! The core game loop. Must be 100% deterministic: same level, same config
//! and same input sequence always give the same state hash.

use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{InputFrame, InputRecording};
use crate::game::interaction::{check_goal, collect_pickups};
use crate::game::level::Level;
use crate::game::physics::{step_player, PhysicsConfig};
use crate::game::platform::{advance_moving_platforms, apply_landing_hook};
use crate::game::progress::LevelCompletion;
use crate::game::camera::CameraConfig;
use crate::game::state::LevelState;
use crate::core::hash::StateHash;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, ordered by priority
    pub events: Vec<GameEvent>,
    /// Set on the tick the goal is reached
    pub completion: Option<LevelCompletion>,
}

impl TickResult {
    #[inline]
    pub fn completed(&self) -> bool {
        self.completion.is_some()
    }

    /// Whether any pickup changed the stats this tick.
    pub fn stats_changed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.data, GameEventData::StatsChanged { .. }))
    }
}

/// Run one simulation tick.
///
/// # Order
///
/// 1. Advance the tick counter
/// 2. Move platforms along their paths
/// 3. Player physics and platform collision
/// 4. Landing hooks (breakable, bounce)
/// 5. Pickups, then goal
/// 6. Camera follow
///
/// # Determinism
///
/// - Fixed-point math only
/// - Platforms resolved in authored order
/// - Camera shake draws from the level-seeded RNG in the state
/// - No system calls, no floating point
///
/// A completed level is frozen: further calls return an empty result.
pub fn tick(state: &mut LevelState, input: InputFrame, config: &PhysicsConfig) -> TickResult {
    let mut result = TickResult::default();
    if state.is_complete() {
        return result;
    }

    // 1. Advance tick counter
    state.tick += 1;

    // 2. Moving platforms
    advance_moving_platforms(&mut state.platforms);

    // 3. Player
    let previous = state.player.standing_on;
    let step = step_player(&state.player, &state.platforms, &state.bounds, input, config);
    state.player = step.player;
    if step.jump_triggered {
        state.push_event(GameEvent::jumped(state.tick));
    }

    // 4. Landing hooks
    if let Some(event) = apply_landing_hook(
        &mut state.player,
        &mut state.platforms,
        previous,
        step.contact,
        state.tick,
    ) {
        if matches!(event.data, GameEventData::PlatformBroken { .. }) && state.camera.config().shake_on_break {
            state.camera.shake_default();
        }
        state.push_event(event);
    }

    // 5. Interactions
    collect_pickups(state);
    result.completion = check_goal(state);

    // 6. Camera
    let player_x = state.player.position.x;
    state.camera.update(player_x, &state.bounds);

    result.events = state.take_events();
    result.events.sort();

    if let Some(completion) = &result.completion {
        tracing::info!(
            level = %state.level_id,
            tick = state.tick,
            found = completion.collectibles_found,
            total = completion.total_collectibles,
            "level complete"
        );
    }

    result
}

/// Replay a level from recorded inputs.
///
/// Runs until the recording ends or the goal is reached, whichever comes
/// first. Returns the final state and every event produced.
pub fn replay_level(
    level: &Level,
    recording: &InputRecording,
    physics: &PhysicsConfig,
    camera: &CameraConfig,
    starting_hearts: u32,
) -> (LevelState, Vec<GameEvent>) {
    let mut state = LevelState::from_level(level, physics, camera, starting_hearts);
    let mut all_events = Vec::new();

    for (_, frame) in recording.replay_iter() {
        let result = tick(&mut state, frame, physics);
        let done = result.completed();
        all_events.extend(result.events);
        if done {
            break;
        }
    }

    (state, all_events)
}

/// Hash after every `interval` ticks of a replay (interval 0 disables).
pub fn replay_checkpoints(
    level: &Level,
    recording: &InputRecording,
    physics: &PhysicsConfig,
    camera: &CameraConfig,
    starting_hearts: u32,
    interval: u32,
) -> Vec<(u32, StateHash)> {
    let mut state = LevelState::from_level(level, physics, camera, starting_hearts);
    let mut checkpoints = Vec::new();

    for (_, frame) in recording.replay_iter() {
        let result = tick(&mut state, frame, physics);
        if interval > 0 && state.tick % interval == 0 {
            checkpoints.push((state.tick, state.compute_hash()));
        }
        if result.completed() {
            break;
        }
    }

    checkpoints
}
