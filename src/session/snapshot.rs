//! Render snapshot.
//!
//! Immutable float view of a simulation frame. Renderers read this and
//! nothing else; fixed-point state never crosses the boundary.

use serde::{Serialize, Deserialize};

use crate::core::fixed::to_float;
use crate::core::rect::Rect;
use crate::game::level::{CollectibleKind, Power};
use crate::game::state::{Facing, GameStats, LevelState, PlatformKind};
use crate::session::simulation::Phase;

/// Axis-aligned box in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Rect> for BoxView {
    fn from(rect: Rect) -> Self {
        let (x, y, width, height) = rect.to_floats();
        Self { x, y, width, height }
    }
}

/// Player as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub bounds: BoxView,
    pub velocity: [f32; 2],
    pub facing: Facing,
    pub is_grounded: bool,
    pub is_jumping: bool,
    pub is_stretching: bool,
    pub neck_length: f32,
}

/// Platform style hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformStyle {
    Solid,
    Moving,
    Breakable,
    Bounce,
}

/// Platform at its resolved position this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformView {
    pub id: u32,
    pub bounds: BoxView,
    pub style: PlatformStyle,
    /// Broken platforms are kept so the host can animate them away
    pub broken: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleView {
    pub id: String,
    pub bounds: BoxView,
    pub kind: CollectibleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalView {
    pub bounds: BoxView,
    pub reached: bool,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub level_id: String,
    pub tick: u32,
    pub phase: Phase,
    pub player: PlayerView,
    pub platforms: Vec<PlatformView>,
    pub collectibles: Vec<CollectibleView>,
    pub goal: GoalView,
    pub stats: GameStats,
    /// Render translation, shake included
    pub camera_offset: [f32; 2],
    pub collectibles_found: u32,
    pub total_collectibles: u32,
}

impl RenderSnapshot {
    /// Capture `state` as it stands.
    pub fn capture(state: &LevelState, phase: Phase) -> Self {
        let player = &state.player;
        let (vx, vy) = player.velocity.to_floats();
        let (cx, cy) = state.camera.offset().to_floats();

        Self {
            level_id: state.level_id.clone(),
            tick: state.tick,
            phase,
            player: PlayerView {
                bounds: player.rect().into(),
                velocity: [vx, vy],
                facing: player.facing,
                is_grounded: player.is_grounded,
                is_jumping: player.is_jumping,
                is_stretching: player.is_stretching,
                neck_length: to_float(player.neck_length),
            },
            platforms: state
                .platforms
                .iter()
                .map(|p| {
                    let (style, broken) = match &p.kind {
                        PlatformKind::Solid => (PlatformStyle::Solid, false),
                        PlatformKind::Moving { .. } => (PlatformStyle::Moving, false),
                        PlatformKind::Breakable { broken, .. } => (PlatformStyle::Breakable, *broken),
                        PlatformKind::Bounce { .. } => (PlatformStyle::Bounce, false),
                    };
                    PlatformView { id: p.id.0, bounds: p.bounds().into(), style, broken }
                })
                .collect(),
            collectibles: state
                .collectibles
                .iter()
                .map(|c| CollectibleView {
                    id: c.id.clone(),
                    bounds: c.pickup_rect().into(),
                    kind: c.kind,
                    power: c.power,
                    collected: c.collected,
                })
                .collect(),
            goal: GoalView { bounds: state.goal.rect.into(), reached: state.goal.reached },
            stats: state.stats,
            camera_offset: [cx, cy],
            collectibles_found: state.collectibles_found(),
            total_collectibles: state.total_collectibles(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
