//! Session Layer
//!
//! The game-loop abstraction hosts talk to:
//! - Phase state machine and observers (`Simulation`)
//! - Fixed-timestep scheduling of host frames
//! - Configuration loading
//! - Keyboard listener scope
//! - Render snapshots
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SESSION LAYER                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  simulation.rs   - Phases, ticking, observers, transcripts  │
//! │  scheduler.rs    - Fixed-step accumulator                   │
//! │  config.rs       - SimConfig (JSON, defaults)               │
//! │  keyboard.rs     - RAII key listener scope                  │
//! │  snapshot.rs     - Float view for renderers                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod keyboard;
pub mod scheduler;
pub mod simulation;
pub mod snapshot;

// Re-export key types
pub use config::{SimConfig, SessionConfig, ConfigError};
pub use keyboard::{KeyboardHost, KeyboardScope};
pub use scheduler::{FixedStepScheduler, StepPlan};
pub use simulation::{Simulation, SimulationId, SimulationObserver, Phase, SessionError};
pub use snapshot::{RenderSnapshot, PlayerView, PlatformView, PlatformStyle, CollectibleView, GoalView, BoxView};
