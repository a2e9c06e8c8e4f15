//! # Gimbo Simulation Core
//!
//! Deterministic simulation for the Gimbo platformer: a long-necked giraffe
//! runs, jumps and stretches through hand-authored levels.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    GIMBO CORE                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                 │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic            │
//! │  ├── vec2.rs     - 2D vector with fixed-point               │
//! │  ├── rect.rs     - Axis-aligned rectangles                  │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs     - State hashing for verification           │
//! │                                                             │
//! │  game/           - Game logic (deterministic)               │
//! │  ├── level.rs    - Level data and validation                │
//! │  ├── catalog.rs  - Built-in worlds and levels               │
//! │  ├── input.rs    - Held keys, snapshots, recordings         │
//! │  ├── state.rs    - Player, platform and level state         │
//! │  ├── physics.rs  - Player integration                       │
//! │  ├── collision.rs- Platform collision resolution            │
//! │  ├── platform.rs - Moving platforms, landing hooks          │
//! │  ├── interaction.rs - Pickups and goal                      │
//! │  ├── camera.rs   - Follow, shake, transitions               │
//! │  ├── tick.rs     - Authoritative simulation step            │
//! │  └── progress.rs - Completion, stars, progress book         │
//! │                                                             │
//! │  session/        - Game loop (host facing)                  │
//! │  └── simulation.rs, scheduler.rs, config.rs, ...            │
//! │                                                             │
//! │  replay/         - Transcripts and verification             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - Platforms and collectibles resolved in authored order
//! - No system time dependencies
//! - Camera shake drawn from a level-seeded Xorshift128+
//!
//! Given the same level, config and inputs, a run produces **identical
//! state hashes** on any platform.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod replay;
pub mod session;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::FixedVec2;
pub use core::rect::Rect;
pub use core::rng::DeterministicRng;
pub use game::input::{InputFrame, InputDelta, InputRecording, InputSampler, Key};
pub use game::level::Level;
pub use game::state::{LevelState, PlayerState};
pub use session::{Simulation, SimConfig, Phase, RenderSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
