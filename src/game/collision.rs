//! Collision Resolution
//!
//! Axis-aligned player vs platform resolution. Every test runs against the
//! tentative rectangle from integration; the branch taken is decided by where
//! the player was before moving.

use crate::core::fixed::Fixed;
use crate::core::rect::Rect;
use crate::game::state::{PlatformId, PlatformState, PlayerState};

/// Which way a platform pushed the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Landed on top
    Top,
    /// Bumped the underside
    Ceiling,
    /// Pushed out horizontally
    Side,
}

/// Classify a collision with `platform` given the pre-move player.
///
/// Returns `None` when the tentative rect does not overlap the platform, or
/// when it overlaps sideways without horizontal motion.
pub fn classify_contact(
    prev: &PlayerState,
    tentative: &Rect,
    velocity_x: Fixed,
    platform: &Rect,
    tolerance: Fixed,
) -> Option<Contact> {
    if !tentative.overlaps(platform) {
        return None;
    }

    if prev.velocity.y >= 0 && prev.bottom() <= platform.top() + tolerance {
        Some(Contact::Top)
    } else if prev.velocity.y < 0 && prev.position.y >= platform.bottom() - tolerance {
        Some(Contact::Ceiling)
    } else if velocity_x != 0 {
        Some(Contact::Side)
    } else {
        None
    }
}

/// Resolve `player` (already holding the tentative position) against every
/// solid platform in list order.
///
/// Later platforms override earlier resolutions. Returns the last platform
/// landed on, if any.
pub fn resolve_platforms(
    prev: &PlayerState,
    player: &mut PlayerState,
    platforms: &[PlatformState],
    tolerance: Fixed,
) -> Option<PlatformId> {
    let tentative = player.rect();
    let velocity_x = player.velocity.x;
    let mut landed_on = None;

    for platform in platforms.iter().filter(|p| p.is_solid()) {
        let bounds = platform.bounds();
        match classify_contact(prev, &tentative, velocity_x, &bounds, tolerance) {
            Some(Contact::Top) => {
                player.position.y = bounds.top() - player.height;
                player.velocity.y = 0;
                player.is_grounded = true;
                landed_on = Some(platform.id);
            }
            Some(Contact::Ceiling) => {
                player.position.y = bounds.bottom();
                player.velocity.y = 0;
            }
            Some(Contact::Side) => {
                player.position.x = if velocity_x > 0 {
                    bounds.left() - player.width
                } else {
                    bounds.right()
                };
            }
            None => {}
        }
    }

    landed_on
}

// =============================================================================
// TESTS
// =============================================================================
