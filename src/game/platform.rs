//! Platform Behavior
//!
//! Moving platforms walk their waypoints once per tick, before the player
//! is resolved. Breakable and bounce platforms react to fresh landings.

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::game::events::GameEvent;
use crate::game::state::{PlatformId, PlatformKind, PlatformState, PlayerState};

/// Advance every moving platform by one tick.
///
/// A platform walks straight toward `path[path_index]` at `speed`. Once it
/// is closer than one step it snaps onto the waypoint and turns to the next
/// one, reversing at either end of the path.
pub fn advance_moving_platforms(platforms: &mut [PlatformState]) {
    for platform in platforms.iter_mut() {
        if let PlatformKind::Moving { path, speed, path_index, direction, current } = &mut platform.kind {
            advance_along_path(path, *speed, path_index, direction, current);
        }
    }
}

fn advance_along_path(
    path: &[FixedVec2],
    speed: Fixed,
    path_index: &mut usize,
    direction: &mut i8,
    current: &mut FixedVec2,
) {
    let Some(&target) = path.get(*path_index) else {
        return;
    };

    if current.distance(target) < speed {
        *current = target;

        let next = *path_index as isize + *direction as isize;
        if next >= path.len() as isize {
            *path_index = path.len().saturating_sub(2);
            *direction = -1;
        } else if next < 0 {
            *path_index = 1.min(path.len().saturating_sub(1));
            *direction = 1;
        } else {
            *path_index = next as usize;
        }
    } else {
        *current = current.step_towards(target, speed);
    }
}

/// Run the landing hook for `contact` if it is a new landing.
///
/// `previous` is what the player stood on at the end of the last tick.
/// Staying on the same platform does nothing. Returns the event the hook
/// produced, if any.
pub fn apply_landing_hook(
    player: &mut PlayerState,
    platforms: &mut [PlatformState],
    previous: Option<PlatformId>,
    contact: Option<PlatformId>,
    tick: u32,
) -> Option<GameEvent> {
    let id = contact?;
    if previous == Some(id) {
        return None;
    }
    let platform = platforms.get_mut(id.0 as usize)?;

    match &mut platform.kind {
        PlatformKind::Breakable { remaining, broken, .. } => {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 && !*broken {
                *broken = true;
                #[cfg(feature = "debug-tracing")]
                tracing::debug!(tick, platform = %id, "platform broke");
                return Some(GameEvent::platform_broken(tick, id));
            }
            None
        }
        PlatformKind::Bounce { strength } => {
            let strength = *strength;
            player.velocity.y = strength;
            player.is_grounded = false;
            player.is_jumping = true;
            player.standing_on = None;
            Some(GameEvent::bounced(tick, id, strength))
        }
        PlatformKind::Solid | PlatformKind::Moving { .. } => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};
    use crate::core::rect::Rect;
    use crate::game::events::GameEventData;
    use crate::game::level::LevelPlatform;
    use crate::game::physics::PhysicsConfig;

    fn mover(path: Vec<FixedVec2>, speed: f64) -> PlatformState {
        PlatformState::from_level(
            PlatformId(0),
            &LevelPlatform::moving(Rect::from_units(300.0, 280.0, 80.0, 20.0), path, to_fixed(speed)),
        )
    }

    fn position(platform: &PlatformState) -> (FixedVec2, usize, i8) {
        match &platform.kind {
            PlatformKind::Moving { current, path_index, direction, .. } => (*current, *path_index, *direction),
            _ => panic!("not a moving platform"),
        }
    }

    fn player() -> PlayerState {
        PlayerState::new(FixedVec2::from_ints(100, 290), &PhysicsConfig::default())
    }

    #[test]
    fn test_first_tick_turns_toward_second_waypoint() {
        let mut platforms = vec![mover(vec![FixedVec2::from_ints(300, 280), FixedVec2::from_ints(450, 280)], 2.0)];
        advance_moving_platforms(&mut platforms);
        assert_eq!(position(&platforms[0]), (FixedVec2::from_ints(300, 280), 1, 1));

        advance_moving_platforms(&mut platforms);
        assert_eq!(position(&platforms[0]).0, FixedVec2::from_ints(302, 280));
    }

    #[test]
    fn test_ping_pong_between_two_points() {
        let a = FixedVec2::from_ints(0, 0);
        let b = FixedVec2::from_ints(10, 0);
        let mut platforms = vec![mover(vec![a, b], 2.0)];

        // 1 turn tick + 5 steps reaches b
        for _ in 0..6 {
            advance_moving_platforms(&mut platforms);
        }
        assert_eq!(position(&platforms[0]), (b, 1, 1));

        // Arrival snaps and reverses
        advance_moving_platforms(&mut platforms);
        assert_eq!(position(&platforms[0]), (b, 0, -1));

        for _ in 0..6 {
            advance_moving_platforms(&mut platforms);
        }
        assert_eq!(position(&platforms[0]), (a, 1, 1));
    }

    #[test]
    fn test_three_point_path_reverses_from_end() {
        let path = vec![FixedVec2::from_ints(0, 0), FixedVec2::from_ints(4, 0), FixedVec2::from_ints(4, 4)];
        let mut platforms = vec![mover(path, 10.0)];

        let mut seen = Vec::new();
        for _ in 0..6 {
            advance_moving_platforms(&mut platforms);
            let (_, index, direction) = position(&platforms[0]);
            seen.push((index, direction));
        }
        assert_eq!(seen, vec![(1, 1), (2, 1), (1, -1), (0, -1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_diagonal_motion_keeps_speed() {
        let path = vec![FixedVec2::from_ints(0, 0), FixedVec2::from_ints(30, 40)];
        let mut platforms = vec![mover(path, 5.0)];
        advance_moving_platforms(&mut platforms);
        advance_moving_platforms(&mut platforms);
        assert_eq!(position(&platforms[0]).0, FixedVec2::from_ints(3, 4));
        assert_eq!(platforms[0].bounds().origin(), FixedVec2::from_ints(3, 4));
    }

    #[test]
    fn test_breakable_breaks_after_durability_landings() {
        let mut platforms = vec![PlatformState::from_level(
            PlatformId(0),
            &LevelPlatform::breakable(Rect::from_units(0.0, 300.0, 80.0, 20.0), 2),
        )];
        let mut p = player();

        assert_eq!(apply_landing_hook(&mut p, &mut platforms, None, Some(PlatformId(0)), 5), None);
        // Resting on it is not a new landing
        assert_eq!(apply_landing_hook(&mut p, &mut platforms, Some(PlatformId(0)), Some(PlatformId(0)), 6), None);
        assert!(platforms[0].is_solid());

        let event = apply_landing_hook(&mut p, &mut platforms, None, Some(PlatformId(0)), 40).unwrap();
        assert_eq!(event.data, GameEventData::PlatformBroken { platform_id: PlatformId(0) });
        assert_eq!(event.tick, 40);
        assert!(!platforms[0].is_solid());
    }

    #[test]
    fn test_bounce_launches_player() {
        let mut platforms = vec![PlatformState::from_level(
            PlatformId(0),
            &LevelPlatform::bounce(Rect::from_units(0.0, 300.0, 80.0, 20.0), from_int(-20)),
        )];
        let mut p = player();
        p.standing_on = Some(PlatformId(0));

        let event = apply_landing_hook(&mut p, &mut platforms, None, Some(PlatformId(0)), 3).unwrap();
        assert!(matches!(event.data, GameEventData::Bounced { strength, .. } if strength == from_int(-20)));
        assert_eq!(p.velocity.y, from_int(-20));
        assert!(!p.is_grounded);
        assert!(p.is_jumping);
        assert_eq!(p.standing_on, None);
    }

    #[test]
    fn test_solid_landing_has_no_hook() {
        let mut platforms = vec![PlatformState::from_level(
            PlatformId(0),
            &LevelPlatform::solid(Rect::from_units(0.0, 300.0, 80.0, 20.0)),
        )];
        let mut p = player();
        let before = p.clone();
        assert_eq!(apply_landing_hook(&mut p, &mut platforms, None, Some(PlatformId(0)), 1), None);
        assert_eq!(p, before);
    }
}
