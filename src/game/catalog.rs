//! Built-in Level Catalog
//!
//! The four shipped worlds and their levels. Geometry is authored in whole
//! world units; speeds may be fractional. Every level starts the player on
//! the left ground segment and ends at a 60x80 goal standing on the ground
//! line.

use std::sync::OnceLock;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{from_int, to_fixed, GROUND_Y, PLAYER_HEIGHT, VIEWPORT_HEIGHT};
use crate::core::rect::Rect;
use crate::core::vec2::FixedVec2;
use crate::game::level::{
    Bounds, CollectibleKind, Level, LevelCollectible, LevelPlatform, Power,
};

/// Visual theme of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Savanna,
    Jungle,
    Desert,
    Clouds,
}

/// A group of levels sharing a theme.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub id: String,
    pub name: String,
    pub description: String,
    pub theme: Theme,
    pub levels: Vec<Level>,
}

impl World {
    /// Stars needed for the first level of this world (0 when always open).
    pub fn required_stars(&self) -> u32 {
        self.levels
            .first()
            .and_then(|l| l.required_stars)
            .unwrap_or(0)
    }

    pub fn level(&self, level_id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == level_id)
    }
}

static CATALOG: OnceLock<Vec<World>> = OnceLock::new();

/// All built-in worlds in play order.
pub fn worlds() -> &'static [World] {
    CATALOG.get_or_init(build_catalog)
}

/// Look up a world by id.
pub fn world_by_id(world_id: &str) -> Option<&'static World> {
    worlds().iter().find(|w| w.id == world_id)
}

/// Look up a level by id across all worlds.
pub fn level_by_id(level_id: &str) -> Option<&'static Level> {
    worlds().iter().find_map(|w| w.level(level_id))
}

/// Iterate every level in play order.
pub fn all_levels() -> impl Iterator<Item = &'static Level> {
    worlds().iter().flat_map(|w| w.levels.iter())
}

// =============================================================================
// AUTHORING HELPERS
// =============================================================================

const GROUND: i32 = 350;

fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect {
    Rect::new(from_int(x), from_int(y), from_int(w), from_int(h))
}

fn solid(x: i32, y: i32, w: i32, h: i32) -> LevelPlatform {
    LevelPlatform::solid(rect(x, y, w, h))
}

/// Two-point path starting at the platform's own origin.
fn moving(x: i32, y: i32, w: i32, h: i32, to: (i32, i32), speed: f64) -> LevelPlatform {
    LevelPlatform::moving(
        rect(x, y, w, h),
        vec![FixedVec2::from_ints(x, y), FixedVec2::from_ints(to.0, to.1)],
        to_fixed(speed),
    )
}

fn breakable(x: i32, y: i32, w: i32, h: i32, durability: u32) -> LevelPlatform {
    LevelPlatform::breakable(rect(x, y, w, h), durability)
}

fn bounce(x: i32, y: i32, w: i32, h: i32, strength: i32) -> LevelPlatform {
    LevelPlatform::bounce(rect(x, y, w, h), from_int(strength))
}

fn leaf(id: &str, x: i32, y: i32, power: Power) -> LevelCollectible {
    LevelCollectible::new(id, FixedVec2::from_ints(x, y), CollectibleKind::Leaf).with_power(power)
}

fn star(id: &str, x: i32, y: i32) -> LevelCollectible {
    LevelCollectible::new(id, FixedVec2::from_ints(x, y), CollectibleKind::Star)
}

fn heart(id: &str, x: i32, y: i32) -> LevelCollectible {
    LevelCollectible::new(id, FixedVec2::from_ints(x, y), CollectibleKind::Heart)
}

/// Shared level skeleton.
struct Layout {
    id: &'static str,
    world: &'static str,
    name: &'static str,
    description: &'static str,
    goal_x: i32,
    max_x: i32,
    min_y: i32,
    target_time: u32,
    required_stars: Option<u32>,
}

fn level(layout: Layout, platforms: Vec<LevelPlatform>, collectibles: Vec<LevelCollectible>) -> Level {
    Level {
        id: layout.id.to_string(),
        world_id: layout.world.to_string(),
        name: layout.name.to_string(),
        description: layout.description.to_string(),
        start_position: FixedVec2::new(from_int(100), GROUND_Y - PLAYER_HEIGHT),
        platforms,
        collectibles,
        obstacles: Vec::new(),
        goal: rect(layout.goal_x, GROUND - 80, 60, 80),
        bounds: Bounds::new(0, from_int(layout.max_x), from_int(layout.min_y), VIEWPORT_HEIGHT),
        target_time: layout.target_time,
        required_stars: layout.required_stars,
    }
}

// =============================================================================
// WORLDS
// =============================================================================

fn build_catalog() -> Vec<World> {
    vec![
        World {
            id: "savanna".into(),
            name: "African Savanna".into(),
            description: "Gimbo's home on the golden savanna".into(),
            theme: Theme::Savanna,
            levels: savanna_levels(),
        },
        World {
            id: "jungle".into(),
            name: "Rainforest Jungle".into(),
            description: "Dense trees and mysterious paths".into(),
            theme: Theme::Jungle,
            levels: jungle_levels(),
        },
        World {
            id: "desert".into(),
            name: "Sahara Desert".into(),
            description: "Hot dunes and glittering oases".into(),
            theme: Theme::Desert,
            levels: desert_levels(),
        },
        World {
            id: "clouds".into(),
            name: "Sky Clouds".into(),
            description: "Float among the clouds high above the earth".into(),
            theme: Theme::Clouds,
            levels: clouds_levels(),
        },
    ]
}

fn savanna_levels() -> Vec<Level> {
    vec![
        level(
            Layout {
                id: "savanna-1", world: "savanna", name: "First Steps",
                description: "Learn the basics of movement and jumping",
                goal_x: 800, max_x: 900, min_y: 0, target_time: 30, required_stars: None,
            },
            vec![
                solid(0, GROUND, 300, 50),
                solid(400, GROUND, 400, 50),
                solid(300, 280, 120, 20),
                solid(500, 220, 100, 20),
                solid(700, 180, 120, 20),
            ],
            vec![
                leaf("leaf1", 320, 250, Power::Speed),
                star("star1", 520, 190),
                leaf("leaf2", 720, 150, Power::Jump),
            ],
        ),
        level(
            Layout {
                id: "savanna-2", world: "savanna", name: "Moving Bridges",
                description: "Navigate moving platforms across the savanna",
                goal_x: 1100, max_x: 1200, min_y: 0, target_time: 45, required_stars: None,
            },
            vec![
                solid(0, GROUND, 200, 50),
                moving(300, 280, 80, 20, (450, 280), 2.0),
                moving(600, 200, 80, 20, (600, 300), 1.5),
                solid(800, 250, 100, 20),
                solid(1000, GROUND, 200, 50),
            ],
            vec![
                star("star1", 350, 250),
                heart("heart1", 620, 170),
                leaf("leaf1", 830, 220, Power::Wisdom),
            ],
        ),
        level(
            Layout {
                id: "savanna-3", world: "savanna", name: "Sunset Challenge",
                description: "Master bouncing platforms and breakable bridges",
                goal_x: 1150, max_x: 1300, min_y: 0, target_time: 60, required_stars: None,
            },
            vec![
                solid(0, GROUND, 150, 50),
                bounce(250, 300, 60, 15, -20),
                breakable(400, 200, 80, 15, 3),
                bounce(600, 250, 60, 15, -25),
                solid(800, 150, 100, 20),
                solid(1050, GROUND, 200, 50),
            ],
            vec![
                leaf("leaf1", 270, 270, Power::Speed),
                star("star1", 420, 170),
                star("star2", 620, 220),
                heart("heart1", 820, 120),
            ],
        ),
        level(
            Layout {
                id: "savanna-4", world: "savanna", name: "Acacia Heights",
                description: "Climb the tall acacia trees with precision jumps",
                goal_x: 1300, max_x: 1400, min_y: 0, target_time: 75, required_stars: None,
            },
            vec![
                solid(0, GROUND, 120, 50),
                solid(200, 300, 40, 15),
                breakable(320, 250, 40, 15, 2),
                bounce(450, 200, 60, 15, -22),
                moving(600, 150, 40, 15, (750, 150), 2.5),
                solid(850, 100, 80, 15),
                bounce(1000, 200, 60, 15, -28),
                solid(1200, GROUND, 150, 50),
            ],
            vec![
                leaf("leaf1", 220, 270, Power::Jump),
                star("star1", 340, 220),
                star("star2", 470, 170),
                heart("heart1", 870, 70),
                star("star3", 1020, 170),
            ],
        ),
        level(
            Layout {
                id: "savanna-5", world: "savanna", name: "The Great Migration",
                description: "Follow the animal migration path across the plains",
                goal_x: 1500, max_x: 1650, min_y: 0, target_time: 90, required_stars: None,
            },
            vec![
                solid(0, GROUND, 100, 50),
                moving(200, 280, 80, 15, (350, 280), 3.0),
                breakable(450, 220, 60, 15, 1),
                moving(600, 300, 80, 15, (600, 180), 2.0),
                bounce(800, 160, 60, 15, -30),
                moving(950, 240, 80, 15, (1100, 240), 2.5),
                breakable(1250, 200, 60, 15, 2),
                solid(1400, GROUND, 200, 50),
            ],
            vec![
                star("star1", 220, 250),
                leaf("leaf1", 470, 190, Power::Speed),
                star("star2", 620, 270),
                star("star3", 820, 130),
                heart("heart1", 970, 210),
                leaf("leaf2", 1270, 170, Power::Wisdom),
            ],
        ),
    ]
}

fn jungle_levels() -> Vec<Level> {
    vec![
        level(
            Layout {
                id: "jungle-1", world: "jungle", name: "Vine Swinging",
                description: "Navigate the dense jungle canopy",
                goal_x: 1000, max_x: 1150, min_y: 0, target_time: 40, required_stars: Some(3),
            },
            vec![
                solid(0, GROUND, 200, 50),
                solid(300, 250, 80, 20),
                breakable(500, 180, 60, 15, 2),
                moving(700, 220, 80, 20, (700, 300), 2.0),
                solid(900, GROUND, 200, 50),
            ],
            vec![
                leaf("leaf1", 320, 220, Power::Jump),
                star("star1", 520, 150),
                heart("heart1", 720, 190),
            ],
        ),
        level(
            Layout {
                id: "jungle-2", world: "jungle", name: "Canopy Heights",
                description: "Reach for the treetops with bouncing leaves",
                goal_x: 1100, max_x: 1250, min_y: 0, target_time: 50, required_stars: Some(6),
            },
            vec![
                solid(0, GROUND, 150, 50),
                bounce(250, 280, 60, 15, -22),
                bounce(450, 200, 60, 15, -25),
                solid(650, 120, 80, 20),
                breakable(850, 180, 60, 15, 1),
                solid(1000, GROUND, 200, 50),
            ],
            vec![
                star("star1", 270, 250),
                leaf("leaf1", 470, 170, Power::Wisdom),
                star("star2", 670, 90),
                heart("heart1", 870, 150),
            ],
        ),
        level(
            Layout {
                id: "jungle-3", world: "jungle", name: "Temple Ruins",
                description: "Ancient platforms hide jungle secrets",
                goal_x: 1300, max_x: 1400, min_y: 0, target_time: 75, required_stars: Some(9),
            },
            vec![
                solid(0, GROUND, 120, 50),
                breakable(220, 250, 80, 15, 2),
                moving(400, 200, 60, 15, (550, 200), 1.5),
                bounce(700, 150, 60, 15, -30),
                solid(900, 100, 100, 20),
                solid(1200, GROUND, 200, 50),
            ],
            vec![
                leaf("leaf1", 240, 220, Power::Speed),
                star("star1", 420, 170),
                star("star2", 720, 120),
                star("star3", 920, 70),
                heart("heart1", 1250, GROUND - 30),
            ],
        ),
        level(
            Layout {
                id: "jungle-4", world: "jungle", name: "Monkey Business",
                description: "Swing through the jungle like the monkeys do",
                goal_x: 1300, max_x: 1400, min_y: 0, target_time: 85, required_stars: Some(12),
            },
            vec![
                solid(0, GROUND, 100, 50),
                moving(180, 280, 50, 15, (280, 200), 2.0),
                bounce(350, 160, 60, 15, -25),
                breakable(500, 240, 50, 15, 1),
                moving(650, 180, 60, 15, (750, 120), 2.5),
                bounce(850, 200, 80, 15, -28),
                solid(1050, 100, 60, 15),
                solid(1200, GROUND, 150, 50),
            ],
            vec![
                star("star1", 200, 250),
                leaf("leaf1", 370, 130, Power::Jump),
                star("star2", 520, 210),
                star("star3", 670, 150),
                heart("heart1", 870, 170),
                star("star4", 1070, 70),
            ],
        ),
        level(
            Layout {
                id: "jungle-5", world: "jungle", name: "Heart of Darkness",
                description: "The deepest part of the jungle holds the greatest treasures",
                goal_x: 1500, max_x: 1650, min_y: 0, target_time: 120, required_stars: Some(15),
            },
            vec![
                solid(0, GROUND, 80, 50),
                breakable(150, 300, 40, 15, 1),
                moving(250, 240, 60, 15, (380, 160), 1.8),
                bounce(450, 200, 50, 15, -32),
                breakable(600, 120, 40, 15, 2),
                moving(750, 180, 60, 15, (750, 280), 3.0),
                bounce(900, 100, 50, 15, -35),
                moving(1100, 160, 80, 15, (1250, 160), 2.2),
                solid(1400, GROUND, 200, 50),
            ],
            vec![
                leaf("leaf1", 170, 270, Power::Speed),
                star("star1", 270, 210),
                star("star2", 470, 170),
                star("star3", 620, 90),
                heart("heart1", 770, 150),
                star("star4", 920, 70),
                leaf("leaf2", 1120, 130, Power::Wisdom),
            ],
        ),
    ]
}

fn desert_levels() -> Vec<Level> {
    vec![
        level(
            Layout {
                id: "desert-1", world: "desert", name: "Dune Walker",
                description: "Navigate the shifting sands",
                goal_x: 1150, max_x: 1300, min_y: 0, target_time: 45, required_stars: Some(12),
            },
            vec![
                solid(0, GROUND, 180, 50),
                moving(300, 280, 100, 20, (500, 280), 1.8),
                solid(650, 200, 80, 20),
                breakable(850, 250, 60, 15, 2),
                solid(1050, GROUND, 200, 50),
            ],
            vec![
                star("star1", 350, 250),
                leaf("leaf1", 670, 170, Power::Speed),
                heart("heart1", 870, 220),
            ],
        ),
        level(
            Layout {
                id: "desert-2", world: "desert", name: "Oasis Springs",
                description: "Bounce between palm-shaded platforms",
                goal_x: 1200, max_x: 1350, min_y: 0, target_time: 55, required_stars: Some(15),
            },
            vec![
                solid(0, GROUND, 150, 50),
                bounce(250, 300, 60, 15, -24),
                moving(450, 220, 80, 20, (450, 300), 2.5),
                bounce(650, 150, 60, 15, -28),
                solid(850, 200, 100, 20),
                solid(1100, GROUND, 200, 50),
            ],
            vec![
                leaf("leaf1", 270, 270, Power::Jump),
                star("star1", 470, 190),
                star("star2", 670, 120),
                heart("heart1", 870, 170),
            ],
        ),
        level(
            Layout {
                id: "desert-3", world: "desert", name: "Pyramid Ascent",
                description: "Scale the ancient pyramid",
                goal_x: 1400, max_x: 1550, min_y: 0, target_time: 80, required_stars: Some(18),
            },
            vec![
                solid(0, GROUND, 120, 50),
                breakable(250, 280, 80, 15, 1),
                bounce(450, 220, 60, 15, -26),
                breakable(650, 160, 80, 15, 2),
                bounce(850, 100, 60, 15, -32),
                solid(1050, 50, 100, 20),
                solid(1300, GROUND, 200, 50),
            ],
            vec![
                star("star1", 270, 250),
                leaf("leaf1", 470, 190, Power::Wisdom),
                star("star2", 670, 130),
                star("star3", 870, 70),
                heart("heart1", 1070, 20),
            ],
        ),
        level(
            Layout {
                id: "desert-4", world: "desert", name: "Sandstorm Escape",
                description: "Race through the desert before the sandstorm hits",
                goal_x: 1550, max_x: 1700, min_y: 0, target_time: 90, required_stars: Some(21),
            },
            vec![
                solid(0, GROUND, 100, 50),
                moving(180, 280, 60, 15, (320, 280), 3.5),
                bounce(400, 200, 50, 15, -30),
                moving(550, 240, 80, 15, (700, 180), 2.8),
                breakable(850, 160, 60, 15, 1),
                bounce(1000, 220, 80, 15, -35),
                solid(1200, 120, 100, 20),
                solid(1450, GROUND, 200, 50),
            ],
            vec![
                star("star1", 200, 250),
                leaf("leaf1", 420, 170, Power::Speed),
                star("star2", 570, 210),
                star("star3", 870, 130),
                heart("heart1", 1020, 190),
                star("star4", 1220, 90),
            ],
        ),
        level(
            Layout {
                id: "desert-5", world: "desert", name: "Pharaoh's Treasure",
                description: "Reach the top of the great pyramid for ultimate treasure",
                goal_x: 1500, max_x: 1650, min_y: -50, target_time: 150, required_stars: Some(24),
            },
            vec![
                solid(0, GROUND, 80, 50),
                breakable(150, 320, 40, 15, 1),
                bounce(250, 280, 50, 15, -28),
                moving(380, 220, 40, 15, (480, 180), 2.5),
                breakable(550, 160, 50, 15, 2),
                bounce(680, 120, 40, 15, -32),
                moving(800, 80, 60, 15, (920, 80), 3.0),
                bounce(1000, 40, 50, 15, -40),
                solid(1150, 10, 80, 20),
                solid(1400, GROUND, 200, 50),
            ],
            vec![
                star("star1", 170, 290),
                leaf("leaf1", 270, 250, Power::Jump),
                star("star2", 400, 190),
                star("star3", 570, 130),
                star("star4", 700, 90),
                heart("heart1", 820, 50),
                star("star5", 1020, 10),
                leaf("leaf2", 1170, -20, Power::Wisdom),
            ],
        ),
    ]
}

fn clouds_levels() -> Vec<Level> {
    vec![
        level(
            Layout {
                id: "clouds-1", world: "clouds", name: "Sky Walker",
                description: "Float among the fluffy clouds",
                goal_x: 1050, max_x: 1200, min_y: 0, target_time: 40, required_stars: Some(21),
            },
            vec![
                solid(0, GROUND, 150, 50),
                bounce(250, 250, 80, 15, -20),
                moving(450, 180, 60, 15, (600, 180), 2.0),
                bounce(750, 220, 80, 15, -25),
                solid(950, GROUND, 200, 50),
            ],
            vec![
                star("star1", 270, 220),
                leaf("leaf1", 470, 150, Power::Jump),
                heart("heart1", 770, 190),
            ],
        ),
        level(
            Layout {
                id: "clouds-2", world: "clouds", name: "Storm Rider",
                description: "Navigate through stormy weather",
                goal_x: 1250, max_x: 1400, min_y: 0, target_time: 60, required_stars: Some(24),
            },
            vec![
                solid(0, GROUND, 120, 50),
                moving(220, 280, 60, 15, (380, 280), 3.0),
                breakable(500, 200, 60, 15, 1),
                bounce(700, 150, 60, 15, -28),
                moving(900, 100, 80, 20, (900, 200), 2.5),
                solid(1150, GROUND, 200, 50),
            ],
            vec![
                leaf("leaf1", 240, 250, Power::Speed),
                star("star1", 520, 170),
                star("star2", 720, 120),
                heart("heart1", 920, 70),
            ],
        ),
        level(
            Layout {
                id: "clouds-3", world: "clouds", name: "Heaven's Gate",
                description: "Reach the highest peaks of the sky",
                goal_x: 1650, max_x: 1800, min_y: -50, target_time: 90, required_stars: Some(27),
            },
            vec![
                solid(0, GROUND, 100, 50),
                bounce(200, 300, 60, 15, -25),
                bounce(400, 240, 60, 15, -30),
                bounce(600, 180, 60, 15, -35),
                bounce(800, 120, 60, 15, -35),
                moving(1000, 60, 80, 20, (1150, 60), 2.0),
                solid(1300, 20, 100, 20),
                solid(1550, GROUND, 200, 50),
            ],
            vec![
                star("star1", 220, 270),
                star("star2", 420, 210),
                star("star3", 620, 150),
                leaf("leaf1", 820, 90, Power::Wisdom),
                heart("heart1", 1020, 30),
                star("star4", 1320, -10),
            ],
        ),
        level(
            Layout {
                id: "clouds-4", world: "clouds", name: "Lightning Dancer",
                description: "Dance through the lightning bolts in the storm clouds",
                goal_x: 1650, max_x: 1800, min_y: 0, target_time: 105, required_stars: Some(30),
            },
            vec![
                solid(0, GROUND, 80, 50),
                moving(150, 300, 50, 15, (280, 200), 3.5),
                bounce(350, 180, 40, 15, -32),
                moving(480, 240, 60, 15, (620, 120), 2.8),
                breakable(700, 160, 50, 15, 1),
                bounce(850, 100, 60, 15, -38),
                moving(1000, 50, 80, 15, (1150, 80), 3.0),
                solid(1300, 120, 100, 20),
                solid(1550, GROUND, 200, 50),
            ],
            vec![
                star("star1", 170, 270),
                leaf("leaf1", 370, 150, Power::Speed),
                star("star2", 500, 210),
                star("star3", 720, 130),
                star("star4", 870, 70),
                heart("heart1", 1020, 20),
                star("star5", 1320, 90),
            ],
        ),
        level(
            Layout {
                id: "clouds-5", world: "clouds", name: "Celestial Summit",
                description: "Reach the very top of the sky realm where stars are born",
                goal_x: 1800, max_x: 1950, min_y: -80, target_time: 180, required_stars: Some(33),
            },
            vec![
                solid(0, GROUND, 60, 50),
                bounce(120, 320, 40, 15, -30),
                moving(220, 280, 50, 15, (350, 220), 2.5),
                bounce(420, 200, 40, 15, -35),
                moving(540, 160, 50, 15, (660, 100), 3.0),
                bounce(730, 80, 40, 15, -40),
                moving(850, 40, 50, 15, (980, 20), 2.2),
                bounce(1050, 0, 60, 15, -45),
                solid(1200, -20, 80, 20),
                moving(1400, 60, 100, 20, (1550, 60), 2.8),
                solid(1700, GROUND, 200, 50),
            ],
            vec![
                star("star1", 140, 290),
                star("star2", 240, 250),
                leaf("leaf1", 440, 170, Power::Jump),
                star("star3", 560, 130),
                star("star4", 750, 50),
                star("star5", 870, 10),
                heart("heart1", 1070, -30),
                star("star6", 1220, -50),
                leaf("leaf2", 1420, 30, Power::Wisdom),
            ],
        ),
    ]
}

// =============================================================================
// TESTS
// =============================================================================
