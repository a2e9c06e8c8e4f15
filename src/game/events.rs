//! Game Events
//!
//! Events generated during simulation. The session drains them after each
//! tick to drive observers; replays compare them for free.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::game::progress::LevelCompletion;
use crate::game::state::{CollectibleState, GameStats, PlatformId};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Platform reactions happen during physics, so they come first
    PlatformEffect = 0,
    /// Then pickups
    Collection = 1,
    /// Then the aggregated stats update
    Stats = 2,
    /// Completion is always last in its tick
    Completion = 3,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player left the ground under their own power
    Jumped,

    /// A breakable platform ran out of durability
    PlatformBroken { platform_id: PlatformId },

    /// A bounce platform launched the player
    Bounced {
        platform_id: PlatformId,
        strength: Fixed,
    },

    /// A collectible was picked up (full record, including power)
    CollectiblePicked { collectible: CollectibleState },

    /// Stats after this tick's pickups
    StatsChanged { stats: GameStats },

    /// Goal reached
    LevelCompleted { completion: LevelCompletion },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        Self { tick, priority, data }
    }

    pub fn jumped(tick: u32) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::Jumped)
    }

    pub fn platform_broken(tick: u32, platform_id: PlatformId) -> Self {
        Self::new(
            tick,
            EventPriority::PlatformEffect,
            GameEventData::PlatformBroken { platform_id },
        )
    }

    pub fn bounced(tick: u32, platform_id: PlatformId, strength: Fixed) -> Self {
        Self::new(
            tick,
            EventPriority::PlatformEffect,
            GameEventData::Bounced { platform_id, strength },
        )
    }

    pub fn collectible_picked(tick: u32, collectible: CollectibleState) -> Self {
        Self::new(
            tick,
            EventPriority::Collection,
            GameEventData::CollectiblePicked { collectible },
        )
    }

    pub fn stats_changed(tick: u32, stats: GameStats) -> Self {
        Self::new(tick, EventPriority::Stats, GameEventData::StatsChanged { stats })
    }

    pub fn level_completed(tick: u32, completion: LevelCompletion) -> Self {
        Self::new(
            tick,
            EventPriority::Completion,
            GameEventData::LevelCompleted { completion },
        )
    }
}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority. Stable sorts keep emission order within a bucket.
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
    }
}
