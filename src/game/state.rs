//! Game State Definitions
//!
//! Mutable runtime state for one level instance. Built once from a
//! [`Level`], mutated every tick, and rebuilt wholesale on reset.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    Fixed, MAX_HEARTS, PICKUP_SIZE, SCORE_PER_HEART, SCORE_PER_LEAF, SCORE_PER_STAR,
};
use crate::core::hash::{compute_state_hash, StateHash, StateHasher};
use crate::core::rect::Rect;
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::camera::{CameraConfig, SmoothCamera};
use crate::game::events::GameEvent;
use crate::game::level::{Bounds, CollectibleKind, Level, LevelCollectible, LevelPlatform, LevelPlatformKind, Power};
use crate::game::physics::PhysicsConfig;

// =============================================================================
// PLAYER
// =============================================================================

/// Which way the player is looking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Facing {
    Left = 0,
    #[default]
    Right = 1,
}

/// The giraffe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left corner
    pub position: FixedVec2,
    pub velocity: FixedVec2,
    pub width: Fixed,
    pub height: Fixed,

    pub is_grounded: bool,
    pub is_jumping: bool,
    pub facing: Facing,

    /// 0..=max_neck_length
    pub neck_length: Fixed,
    pub max_neck_length: Fixed,
    pub is_stretching: bool,

    /// Platform rested on at the end of the previous tick
    pub standing_on: Option<PlatformId>,
}

impl PlayerState {
    /// Spawn at `position`, grounded and facing right.
    pub fn new(position: FixedVec2, config: &PhysicsConfig) -> Self {
        Self {
            position,
            velocity: FixedVec2::ZERO,
            width: config.player_width,
            height: config.player_height,
            is_grounded: true,
            is_jumping: false,
            facing: Facing::Right,
            neck_length: 0,
            max_neck_length: config.max_neck_length,
            is_stretching: false,
            standing_on: None,
        }
    }

    /// Body rectangle at the current position.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }

    #[inline]
    pub fn bottom(&self) -> Fixed {
        self.position.y + self.height
    }

    /// Hash this player's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_fixed(self.width);
        hasher.update_fixed(self.height);
        hasher.update_bool(self.is_grounded);
        hasher.update_bool(self.is_jumping);
        hasher.update_u8(self.facing as u8);
        hasher.update_fixed(self.neck_length);
        hasher.update_bool(self.is_stretching);
        match self.standing_on {
            Some(id) => {
                hasher.update_bool(true);
                hasher.update_u32(id.0);
            }
            None => hasher.update_bool(false),
        }
    }
}

// =============================================================================
// PLATFORMS
// =============================================================================

/// Stable platform identity: index in the authored platform list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "platform#{}", self.0)
    }
}

/// Runtime platform behavior. Each variant carries its own mutable state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Solid,
    Moving {
        /// Waypoints (at least two)
        path: Vec<FixedVec2>,
        /// Units per tick
        speed: Fixed,
        /// Waypoint currently walked toward
        path_index: usize,
        /// +1 or -1
        direction: i8,
        /// Current top-left corner
        current: FixedVec2,
    },
    Breakable {
        durability: u32,
        remaining: u32,
        broken: bool,
    },
    Bounce {
        /// Vertical velocity applied on landing (negative is up)
        strength: Fixed,
    },
}

impl PlatformKind {
    #[inline]
    fn tag(&self) -> u8 {
        match self {
            PlatformKind::Solid => 0,
            PlatformKind::Moving { .. } => 1,
            PlatformKind::Breakable { .. } => 2,
            PlatformKind::Bounce { .. } => 3,
        }
    }
}

/// A platform in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformState {
    pub id: PlatformId,
    /// Authored rectangle. Moving platforms keep its size but not its origin.
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl PlatformState {
    /// Runtime platform from its authored form.
    pub fn from_level(id: PlatformId, platform: &LevelPlatform) -> Self {
        let kind = match &platform.kind {
            LevelPlatformKind::Solid => PlatformKind::Solid,
            LevelPlatformKind::Moving { move_path, move_speed } => PlatformKind::Moving {
                path: move_path.clone(),
                speed: *move_speed,
                path_index: 0,
                direction: 1,
                current: move_path.first().copied().unwrap_or_else(|| platform.rect.origin()),
            },
            LevelPlatformKind::Breakable { durability } => PlatformKind::Breakable {
                durability: *durability,
                remaining: *durability,
                broken: false,
            },
            LevelPlatformKind::Bounce { bounce_strength } => PlatformKind::Bounce {
                strength: *bounce_strength,
            },
        };

        Self { id, rect: platform.rect, kind }
    }

    /// Where the platform is right now.
    #[inline]
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            PlatformKind::Moving { current, .. } => Rect::at(*current, self.rect.width, self.rect.height),
            _ => self.rect,
        }
    }

    /// Broken platforms no longer collide.
    #[inline]
    pub fn is_solid(&self) -> bool {
        !matches!(self.kind, PlatformKind::Breakable { broken: true, .. })
    }

    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u8(self.kind.tag());
        let b = self.bounds();
        hasher.update_fixed(b.x);
        hasher.update_fixed(b.y);
        match &self.kind {
            PlatformKind::Moving { path_index, direction, .. } => {
                hasher.update_u32(*path_index as u32);
                hasher.update_u8(*direction as u8);
            }
            PlatformKind::Breakable { remaining, broken, .. } => {
                hasher.update_u32(*remaining);
                hasher.update_bool(*broken);
            }
            PlatformKind::Solid | PlatformKind::Bounce { .. } => {}
        }
    }
}

// =============================================================================
// COLLECTIBLES & GOAL
// =============================================================================

/// A collectible in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleState {
    pub id: String,
    pub position: FixedVec2,
    pub kind: CollectibleKind,
    /// Terminal for this level instance
    pub collected: bool,
    pub power: Option<Power>,
}

impl CollectibleState {
    pub fn from_level(collectible: &LevelCollectible) -> Self {
        Self {
            id: collectible.id.clone(),
            position: collectible.position,
            kind: collectible.kind,
            collected: false,
            power: collectible.power,
        }
    }

    /// Fixed-size pickup box anchored at the authored point.
    #[inline]
    pub fn pickup_rect(&self) -> Rect {
        Rect::at(self.position, PICKUP_SIZE, PICKUP_SIZE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalState {
    pub rect: Rect,
    /// Terminal: once reached the level is complete
    pub reached: bool,
}

// =============================================================================
// STATS
// =============================================================================

/// Running totals shown on the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub leaves: u32,
    /// Saturates at MAX_HEARTS
    pub hearts: u32,
    pub stars: u32,
    pub score: u32,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::with_hearts(crate::core::fixed::STARTING_HEARTS)
    }
}

impl GameStats {
    pub fn with_hearts(hearts: u32) -> Self {
        Self {
            leaves: 0,
            hearts: hearts.min(MAX_HEARTS),
            stars: 0,
            score: 0,
        }
    }

    /// Credit one pickup.
    pub fn apply_pickup(&mut self, kind: CollectibleKind) {
        match kind {
            CollectibleKind::Leaf => {
                self.leaves += 1;
                self.score = self.score.saturating_add(SCORE_PER_LEAF);
            }
            CollectibleKind::Star => {
                self.stars += 1;
                self.score = self.score.saturating_add(SCORE_PER_STAR);
            }
            CollectibleKind::Heart => {
                self.hearts = (self.hearts + 1).min(MAX_HEARTS);
                self.score = self.score.saturating_add(SCORE_PER_HEART);
            }
        }
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.leaves);
        hasher.update_u32(self.hearts);
        hasher.update_u32(self.stars);
        hasher.update_u32(self.score);
    }
}

// =============================================================================
// LEVEL STATE
// =============================================================================

/// Everything that changes while a level is played.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelState {
    /// Level this state was built from
    pub level_id: String,

    /// Ticks simulated so far
    pub tick: u32,

    pub player: PlayerState,

    /// In authored order; `platforms[i].id == PlatformId(i)`
    pub platforms: Vec<PlatformState>,

    pub collectibles: Vec<CollectibleState>,

    pub goal: GoalState,

    pub stats: GameStats,

    pub bounds: Bounds,

    /// Par time, for the completion record
    pub target_time_ticks: u32,

    pub camera: SmoothCamera,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl LevelState {
    /// Fresh state for a validated level.
    pub fn from_level(
        level: &Level,
        physics: &PhysicsConfig,
        camera: &CameraConfig,
        starting_hearts: u32,
    ) -> Self {
        let platforms: Vec<PlatformState> = level
            .platforms
            .iter()
            .enumerate()
            .map(|(i, p)| PlatformState::from_level(PlatformId(i as u32), p))
            .collect();

        // Spawning on a platform is not a landing
        let mut player = PlayerState::new(level.start_position, physics);
        player.standing_on = platform_under(&player, &platforms);

        let collectibles = level
            .collectibles
            .iter()
            .map(CollectibleState::from_level)
            .collect();

        let mut camera = SmoothCamera::new(camera.clone(), DeterministicRng::for_level(&level.id));
        camera.snap_to_player(player.position.x, &level.bounds);

        Self {
            level_id: level.id.clone(),
            tick: 0,
            player,
            platforms,
            collectibles,
            goal: GoalState { rect: level.goal, reached: false },
            stats: GameStats::with_hearts(starting_hearts),
            bounds: level.bounds,
            target_time_ticks: level.target_time_ticks(),
            camera,
            pending_events: Vec::new(),
        }
    }

    pub fn platform(&self, id: PlatformId) -> Option<&PlatformState> {
        self.platforms.get(id.0 as usize)
    }

    pub fn collectible(&self, id: &str) -> Option<&CollectibleState> {
        self.collectibles.iter().find(|c| c.id == id)
    }

    pub fn collectibles_found(&self) -> u32 {
        self.collectibles.iter().filter(|c| c.collected).count() as u32
    }

    pub fn total_collectibles(&self) -> u32 {
        self.collectibles.len() as u32
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.goal.reached
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, &self.level_id, |hasher| {
            self.player.hash_into(hasher);

            hasher.update_u32(self.platforms.len() as u32);
            for platform in &self.platforms {
                platform.hash_into(hasher);
            }

            hasher.update_u32(self.collectibles.len() as u32);
            for collectible in &self.collectibles {
                hasher.update_str(&collectible.id);
                hasher.update_bool(collectible.collected);
            }

            hasher.update_bool(self.goal.reached);
            self.stats.hash_into(hasher);
            self.camera.hash_into(hasher);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

/// Last solid platform whose top the player rests on exactly.
///
/// Later platforms win, matching collision resolution order.
fn platform_under(player: &PlayerState, platforms: &[PlatformState]) -> Option<PlatformId> {
    let body = player.rect();
    platforms
        .iter()
        .rev()
        .filter(|p| p.is_solid())
        .find(|p| {
            let bounds = p.bounds();
            bounds.top() == body.bottom() && bounds.left() < body.right() && bounds.right() > body.left()
        })
        .map(|p| p.id)
}

// =============================================================================
// TESTS
// =============================================================================
