//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Key mapping, per-tick input snapshots, recordings
//! - `level`: Authored level data and validation
//! - `catalog`: Built-in worlds and levels
//! - `state`: Runtime level state (player, platforms, pickups, goal)
//! - `physics`: Player integration and step ordering
//! - `collision`: Player vs platform resolution
//! - `platform`: Moving platforms and landing hooks
//! - `interaction`: Pickups and goal detection
//! - `camera`: Follow camera, shake, transitions
//! - `tick`: Authoritative simulation loop
//! - `events`: Game events for observers and replay
//! - `progress`: Star rating and persistent progress

pub mod input;
pub mod level;
pub mod catalog;
pub mod state;
pub mod physics;
pub mod collision;
pub mod platform;
pub mod interaction;
pub mod camera;
pub mod tick;
pub mod events;
pub mod progress;

// Re-export key types
pub use input::{InputFrame, InputDelta, InputRecording, InputSampler, Key, KeyDisposition};
pub use level::{Level, LevelError, Bounds, CollectibleKind, Power};
pub use state::{LevelState, PlayerState, PlatformId, GameStats};
pub use physics::PhysicsConfig;
pub use camera::{CameraConfig, SmoothCamera};
pub use tick::{tick, TickResult};
pub use events::{GameEvent, GameEventData};
pub use progress::{LevelCompletion, ProgressBook, ProgressStore, MemoryProgressStore, star_rating};
