//! Level Definitions
//!
//! Immutable authoring-time description of a level: geometry, collectibles,
//! goal and bounds. Levels are validated once at load; the tick loop assumes
//! every level it sees is well formed.
//!
//! The JSON form mirrors the authoring format (camelCase keys, platform kind
//! under `"type"`, coordinates in world units).

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{units, Fixed};
use crate::core::rect::Rect;
use crate::core::vec2::FixedVec2;

// =============================================================================
// PLATFORMS
// =============================================================================

/// Authored platform behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LevelPlatformKind {
    /// Static platform
    Solid,
    /// Ping-pongs along `move_path` at `move_speed` units per tick
    Moving {
        #[serde(rename = "movePath")]
        move_path: Vec<FixedVec2>,
        #[serde(rename = "moveSpeed", with = "units")]
        move_speed: Fixed,
    },
    /// Breaks after `durability` landings
    Breakable { durability: u32 },
    /// Launches the player with `bounce_strength` vertical velocity (negative is up)
    Bounce {
        #[serde(rename = "bounceStrength", with = "units")]
        bounce_strength: Fixed,
    },
}

/// Authored platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPlatform {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(flatten)]
    pub kind: LevelPlatformKind,
}

impl LevelPlatform {
    pub fn solid(rect: Rect) -> Self {
        Self { rect, kind: LevelPlatformKind::Solid }
    }

    pub fn moving(rect: Rect, move_path: Vec<FixedVec2>, move_speed: Fixed) -> Self {
        Self { rect, kind: LevelPlatformKind::Moving { move_path, move_speed } }
    }

    pub fn breakable(rect: Rect, durability: u32) -> Self {
        Self { rect, kind: LevelPlatformKind::Breakable { durability } }
    }

    pub fn bounce(rect: Rect, bounce_strength: Fixed) -> Self {
        Self { rect, kind: LevelPlatformKind::Bounce { bounce_strength } }
    }
}

// =============================================================================
// COLLECTIBLES & OBSTACLES
// =============================================================================

/// Kind of collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CollectibleKind {
    Leaf = 0,
    Star = 1,
    Heart = 2,
}

/// Power carried by a leaf. Cosmetic for now: reported on pickup only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Power {
    Speed = 0,
    Jump = 1,
    Wisdom = 2,
}

/// Authored collectible. `position` is the top-left of its pickup box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCollectible {
    pub id: String,
    #[serde(flatten)]
    pub position: FixedVec2,
    #[serde(rename = "type")]
    pub kind: CollectibleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
}

impl LevelCollectible {
    pub fn new(id: &str, position: FixedVec2, kind: CollectibleKind) -> Self {
        Self { id: id.to_string(), position, kind, power: None }
    }

    pub fn with_power(mut self, power: Power) -> Self {
        self.power = Some(power);
        self
    }
}

/// Reserved obstacle kinds. Carried through loading, ignored by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Spike,
    Wind,
    Quicksand,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelObstacle {
    pub id: String,
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
}

// =============================================================================
// BOUNDS
// =============================================================================

/// World extents for clamping and camera limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    #[serde(with = "units")]
    pub min_x: Fixed,
    #[serde(with = "units")]
    pub max_x: Fixed,
    #[serde(with = "units")]
    pub min_y: Fixed,
    #[serde(with = "units")]
    pub max_y: Fixed,
}

impl Bounds {
    pub const fn new(min_x: Fixed, max_x: Fixed, min_y: Fixed, max_y: Fixed) -> Self {
        Self { min_x, max_x, min_y, max_y }
    }

    #[inline]
    pub fn width(&self) -> Fixed {
        self.max_x - self.min_x
    }
}

// =============================================================================
// LEVEL
// =============================================================================

/// Immutable level record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: String,
    pub world_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_position: FixedVec2,
    pub platforms: Vec<LevelPlatform>,
    #[serde(default)]
    pub collectibles: Vec<LevelCollectible>,
    #[serde(default)]
    pub obstacles: Vec<LevelObstacle>,
    pub goal: Rect,
    pub bounds: Bounds,
    /// Par time in seconds for the time star
    pub target_time: u32,
    /// Total stars needed before this level unlocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_stars: Option<u32>,
}

impl Level {
    /// Parse and validate a level from JSON.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Par time in ticks.
    pub fn target_time_ticks(&self) -> u32 {
        self.target_time.saturating_mul(crate::TICK_RATE)
    }

    pub fn total_collectibles(&self) -> u32 {
        self.collectibles.len() as u32
    }

    /// Reject levels the simulation cannot run.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.bounds.max_x <= self.bounds.min_x || self.bounds.max_y <= self.bounds.min_y {
            return Err(LevelError::InvertedBounds);
        }

        if !self.goal.is_valid() {
            return Err(LevelError::InvalidGoalSize);
        }

        for (index, platform) in self.platforms.iter().enumerate() {
            if !platform.rect.is_valid() {
                return Err(LevelError::InvalidPlatformSize { index });
            }

            match &platform.kind {
                LevelPlatformKind::Solid => {}
                LevelPlatformKind::Moving { move_path, move_speed } => {
                    if move_path.len() < 2 {
                        return Err(LevelError::MovingPathTooShort { index, points: move_path.len() });
                    }
                    if *move_speed <= 0 {
                        return Err(LevelError::NonPositiveSpeed { index });
                    }
                }
                LevelPlatformKind::Breakable { durability } => {
                    if *durability == 0 {
                        return Err(LevelError::ZeroDurability { index });
                    }
                }
                LevelPlatformKind::Bounce { bounce_strength } => {
                    if *bounce_strength >= 0 {
                        return Err(LevelError::NonNegativeBounce { index });
                    }
                }
            }
        }

        let mut seen = BTreeSet::new();
        for collectible in &self.collectibles {
            if !seen.insert(collectible.id.as_str()) {
                return Err(LevelError::DuplicateCollectible { id: collectible.id.clone() });
            }
        }

        for obstacle in &self.obstacles {
            if !obstacle.rect.is_valid() {
                return Err(LevelError::InvalidObstacleSize { id: obstacle.id.clone() });
            }
        }

        Ok(())
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Why a level was rejected.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// Platform with zero or negative width/height
    #[error("platform {index} has non-positive dimensions")]
    InvalidPlatformSize { index: usize },

    /// Goal with zero or negative width/height
    #[error("goal has non-positive dimensions")]
    InvalidGoalSize,

    /// Obstacle with zero or negative width/height
    #[error("obstacle {id} has non-positive dimensions")]
    InvalidObstacleSize { id: String },

    /// Moving platform needs at least two waypoints
    #[error("moving platform {index} has {points} waypoint(s), needs at least 2")]
    MovingPathTooShort { index: usize, points: usize },

    /// Moving platform speed must be positive
    #[error("moving platform {index} has non-positive speed")]
    NonPositiveSpeed { index: usize },

    /// Breakable platform must survive at least one landing
    #[error("breakable platform {index} has zero durability")]
    ZeroDurability { index: usize },

    /// Bounce must launch upward
    #[error("bounce platform {index} has non-negative strength")]
    NonNegativeBounce { index: usize },

    /// Collectible ids must be unique within a level
    #[error("duplicate collectible id: {id}")]
    DuplicateCollectible { id: String },

    /// min must be below max on both axes
    #[error("level bounds are inverted or empty")]
    InvertedBounds,

    /// Malformed JSON
    #[error("level JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// TESTS
// =============================================================================
