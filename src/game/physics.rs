//! Player Physics
//!
//! One player step per tick: read intent from the input snapshot, integrate
//! velocity and position, resolve against platforms, clamp to the world, and
//! update the neck. Pure function of (previous player, platforms, bounds,
//! input, config).

use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    units, Fixed, fixed_clamp, fixed_max, fixed_min,
    GRAVITY, GROUND_Y, JUMP_NUDGE, JUMP_STRENGTH, LANDING_TOLERANCE, MAX_NECK_LENGTH,
    MOVE_SPEED, NECK_GROW, NECK_SHRINK, PLAYER_HEIGHT, PLAYER_WIDTH,
};
use crate::game::collision::resolve_platforms;
use crate::game::input::InputFrame;
use crate::game::level::Bounds;
use crate::game::state::{Facing, PlatformId, PlatformState, PlayerState};

/// Physics tuning. All values in world units per tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    #[serde(with = "units")]
    pub gravity: Fixed,
    /// Negative: up
    #[serde(with = "units")]
    pub jump_strength: Fixed,
    #[serde(with = "units")]
    pub move_speed: Fixed,
    /// Fallback floor under the whole level
    #[serde(with = "units")]
    pub ground_y: Fixed,
    /// Vertical window for top landings and ceiling bumps
    #[serde(with = "units")]
    pub landing_tolerance: Fixed,
    /// Upward nudge on the tick a jump starts
    #[serde(with = "units")]
    pub jump_nudge: Fixed,
    #[serde(with = "units")]
    pub neck_grow: Fixed,
    #[serde(with = "units")]
    pub neck_shrink: Fixed,
    #[serde(with = "units")]
    pub player_width: Fixed,
    #[serde(with = "units")]
    pub player_height: Fixed,
    #[serde(with = "units")]
    pub max_neck_length: Fixed,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,
            move_speed: MOVE_SPEED,
            ground_y: GROUND_Y,
            landing_tolerance: LANDING_TOLERANCE,
            jump_nudge: JUMP_NUDGE,
            neck_grow: NECK_GROW,
            neck_shrink: NECK_SHRINK,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            max_neck_length: MAX_NECK_LENGTH,
        }
    }
}

/// Player after intent and integration, before any collision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Integration {
    pub player: PlayerState,
    pub jump_triggered: bool,
}

/// Outcome of a full player step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerStep {
    pub player: PlayerState,
    /// Platform the player rests on after resolution (top landing only)
    pub contact: Option<PlatformId>,
    pub jump_triggered: bool,
}

/// Apply intent and integrate velocity/position (steps 1-5).
pub fn integrate(prev: &PlayerState, input: InputFrame, config: &PhysicsConfig) -> Integration {
    let mut player = prev.clone();

    // 1. Horizontal intent (right wins when both are held)
    player.velocity.x = 0;
    if input.left() {
        player.velocity.x = -config.move_speed;
        player.facing = Facing::Left;
    }
    if input.right() {
        player.velocity.x = config.move_speed;
        player.facing = Facing::Right;
    }

    // 2. Jump intent
    let jump_triggered = input.jump() && prev.is_grounded;

    // 3. Stretch intent
    player.is_stretching = input.stretch();

    // 4. Vertical integration
    player.velocity.y = prev.velocity.y + config.gravity;
    if jump_triggered {
        player.velocity.y = config.jump_strength;
        player.position.y -= config.jump_nudge;
    }

    // 5. Tentative position
    player.position.x += player.velocity.x;
    player.position.y += player.velocity.y;

    Integration { player, jump_triggered }
}

/// Run one full player step (steps 1-11).
///
/// `platforms` must already be advanced for this tick.
pub fn step_player(
    prev: &PlayerState,
    platforms: &[PlatformState],
    bounds: &Bounds,
    input: InputFrame,
    config: &PhysicsConfig,
) -> PlayerStep {
    let Integration { mut player, jump_triggered } = integrate(prev, input, config);
    player.is_grounded = false;

    // 6. Platform collision
    let contact = resolve_platforms(prev, &mut player, platforms, config.landing_tolerance);

    // 7. World clamp (min wins on a level narrower than the player)
    player.position.x = fixed_clamp(
        player.position.x,
        bounds.min_x,
        bounds.max_x - player.width,
    );

    // 8. Ground fallback
    if player.bottom() >= config.ground_y {
        player.position.y = config.ground_y - player.height;
        player.velocity.y = 0;
        player.is_grounded = true;
    }

    // 9. Jump reconciliation
    if jump_triggered {
        player.is_grounded = false;
    }
    player.is_jumping = !player.is_grounded;

    // 10. Neck
    player.neck_length = if player.is_stretching {
        fixed_min(player.neck_length + config.neck_grow, player.max_neck_length)
    } else {
        fixed_max(player.neck_length - config.neck_shrink, 0)
    };

    // 11. Commit
    let contact = if jump_triggered { None } else { contact };
    player.standing_on = contact;

    PlayerStep { player, contact, jump_triggered }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};
    use crate::core::rect::Rect;
    use crate::core::vec2::FixedVec2;
    use crate::game::input::Key;
    use crate::game::level::LevelPlatform;

    fn config() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn bounds() -> Bounds {
        Bounds::new(0, from_int(900), 0, from_int(400))
    }

    fn floor() -> Vec<PlatformState> {
        vec![PlatformState::from_level(
            PlatformId(0),
            &LevelPlatform::solid(Rect::from_units(0.0, 350.0, 300.0, 50.0)),
        )]
    }

    fn resting_player() -> PlayerState {
        PlayerState::new(FixedVec2::from_ints(100, 290), &config())
    }

    #[test]
    fn test_config_defaults_match_constants() {
        let c = config();
        assert_eq!(c.gravity, to_fixed(0.8));
        assert_eq!(c.jump_strength, from_int(-15));
        assert_eq!(c.move_speed, from_int(5));
        assert_eq!(c.ground_y, from_int(350));
    }

    #[test]
    fn test_config_json_uses_units_and_defaults() {
        let c: PhysicsConfig = serde_json::from_str(r#"{ "gravity": 0.5, "move_speed": 6 }"#).unwrap();
        assert_eq!(c.gravity, to_fixed(0.5));
        assert_eq!(c.move_speed, from_int(6));
        assert_eq!(c.jump_strength, JUMP_STRENGTH);
    }

    #[test]
    fn test_idle_integration_is_tentative() {
        let out = integrate(&resting_player(), InputFrame::new(), &config());
        assert_eq!(out.player.velocity.y, to_fixed(0.8));
        assert_eq!(out.player.position.y, from_int(290) + to_fixed(0.8));
        assert!(!out.jump_triggered);
    }

    #[test]
    fn test_idle_player_rests_on_platform() {
        let step = step_player(&resting_player(), &floor(), &bounds(), InputFrame::new(), &config());
        assert_eq!(step.player.position, FixedVec2::from_ints(100, 290));
        assert_eq!(step.player.velocity.y, 0);
        assert!(step.player.is_grounded);
        assert!(!step.player.is_jumping);
        assert_eq!(step.contact, Some(PlatformId(0)));
    }

    #[test]
    fn test_jump_from_ground() {
        let input = InputFrame::new().with(Key::Jump);
        let step = step_player(&resting_player(), &floor(), &bounds(), input, &config());

        assert!(step.jump_triggered);
        assert_eq!(step.player.velocity.y, from_int(-15));
        // 290 - nudge 2 - 15
        assert_eq!(step.player.position.y, from_int(273));
        assert!(!step.player.is_grounded);
        assert!(step.player.is_jumping);
        assert_eq!(step.contact, None);
    }

    #[test]
    fn test_no_jump_while_airborne() {
        let mut player = resting_player();
        player.position.y = from_int(100);
        player.is_grounded = false;
        let step = step_player(&player, &floor(), &bounds(), InputFrame::new().with(Key::Jump), &config());
        assert!(!step.jump_triggered);
        assert_eq!(step.player.velocity.y, to_fixed(0.8));
    }

    #[test]
    fn test_right_overrides_left() {
        let input = InputFrame::new().with(Key::Left).with(Key::Right);
        let step = step_player(&resting_player(), &floor(), &bounds(), input, &config());
        assert_eq!(step.player.velocity.x, from_int(5));
        assert_eq!(step.player.facing, Facing::Right);

        let step = step_player(&resting_player(), &floor(), &bounds(), InputFrame::new().with(Key::Left), &config());
        assert_eq!(step.player.velocity.x, from_int(-5));
        assert_eq!(step.player.facing, Facing::Left);
        assert_eq!(step.player.position.x, from_int(95));
    }

    #[test]
    fn test_world_clamp() {
        let mut player = resting_player();
        player.position.x = from_int(2);
        let step = step_player(&player, &floor(), &bounds(), InputFrame::new().with(Key::Left), &config());
        assert_eq!(step.player.position.x, 0);

        player.position.x = from_int(858);
        let step = step_player(&player, &[], &bounds(), InputFrame::new().with(Key::Right), &config());
        assert_eq!(step.player.position.x, from_int(860));
    }

    #[test]
    fn test_ground_fallback_without_platforms() {
        let mut player = resting_player();
        player.position.y = from_int(280);
        player.velocity.y = from_int(12);
        player.is_grounded = false;
        let step = step_player(&player, &[], &bounds(), InputFrame::new(), &config());
        assert_eq!(step.player.position.y, from_int(290));
        assert_eq!(step.player.velocity.y, 0);
        assert!(step.player.is_grounded);
        assert_eq!(step.contact, None);
    }

    #[test]
    fn test_neck_grows_and_shrinks_within_bounds() {
        let stretch = InputFrame::new().with(Key::Stretch);
        let mut player = resting_player();

        for _ in 0..30 {
            player = step_player(&player, &floor(), &bounds(), stretch, &config()).player;
        }
        assert_eq!(player.neck_length, from_int(100));
        assert!(player.is_stretching);

        player = step_player(&player, &floor(), &bounds(), InputFrame::new(), &config()).player;
        assert_eq!(player.neck_length, from_int(97));
        assert!(!player.is_stretching);

        for _ in 0..50 {
            player = step_player(&player, &floor(), &bounds(), InputFrame::new(), &config()).player;
        }
        assert_eq!(player.neck_length, 0);
    }
}
