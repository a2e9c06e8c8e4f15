//! Interaction Checks
//!
//! Pickups and goal detection against the committed player rectangle.

use crate::game::events::GameEvent;
use crate::game::progress::LevelCompletion;
use crate::game::state::LevelState;

/// Collect every uncollected pickup the player overlaps.
///
/// Emits one `CollectiblePicked` per pickup, then a single `StatsChanged`
/// if anything was collected. Returns how many were picked up.
pub fn collect_pickups(state: &mut LevelState) -> usize {
    let player = state.player.rect();
    let tick = state.tick;
    let mut picked = Vec::new();

    for collectible in state.collectibles.iter_mut().filter(|c| !c.collected) {
        if collectible.pickup_rect().overlaps(&player) {
            collectible.collected = true;
            state.stats.apply_pickup(collectible.kind);
            picked.push(collectible.clone());
        }
    }

    let count = picked.len();
    for collectible in picked {
        #[cfg(feature = "debug-tracing")]
        tracing::debug!(tick, id = %collectible.id, kind = ?collectible.kind, "collectible picked");
        state.push_event(GameEvent::collectible_picked(tick, collectible));
    }
    if count > 0 {
        state.push_event(GameEvent::stats_changed(tick, state.stats));
    }
    count
}

/// Mark the goal reached if the player touches it.
///
/// Fires at most once per level instance.
pub fn check_goal(state: &mut LevelState) -> Option<LevelCompletion> {
    if state.goal.reached || !state.goal.rect.overlaps(&state.player.rect()) {
        return None;
    }

    state.goal.reached = true;
    let completion = LevelCompletion {
        completed: true,
        elapsed_ticks: state.tick,
        collectibles_found: state.collectibles_found(),
        total_collectibles: state.total_collectibles(),
    };
    state.push_event(GameEvent::level_completed(state.tick, completion));
    Some(completion)
}

// =============================================================================
// TESTS
// =============================================================================
