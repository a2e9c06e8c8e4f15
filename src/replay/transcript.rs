//! Level Transcript Recording
//!
//! Records everything needed to re-run a level deterministically and check
//! the outcome: the configs, the delta-compressed inputs, periodic state
//! hashes and the final result. Stored with bincode.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};
use crate::game::camera::CameraConfig;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{InputDelta, InputRecording};
use crate::game::level::{Level, LevelPlatformKind};
use crate::game::physics::PhysicsConfig;
use crate::game::progress::LevelCompletion;
use crate::game::state::{GameStats, PlatformId};

/// Current transcript version.
pub const TRANSCRIPT_VERSION: u8 = 1;

/// Default checkpoint interval in ticks (every 10 seconds at 60Hz).
pub const CHECKPOINT_INTERVAL: u32 = 600;

/// Complete record of one level run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelTranscript {
    /// Version for forward compatibility.
    pub version: u8,

    pub metadata: TranscriptMetadata,

    /// Hash of the freshly built level state (tick 0).
    pub initial_state_hash: StateHash,

    /// Delta-compressed inputs, keyed by the tick they were sampled on.
    pub inputs: Vec<InputDelta>,

    /// Last tick that received input.
    pub input_end_tick: u32,

    /// State hash checkpoints for partial verification.
    pub checkpoints: Vec<StateCheckpoint>,

    /// Outcome; `None` while still recording.
    pub result: Option<TranscriptResult>,

    /// Significant events (pickups, breaks, completion).
    pub events: Vec<TranscriptEvent>,
}

/// Who played what, under which rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    /// Simulation instance that recorded the run (UUID bytes).
    pub session_id: [u8; 16],

    pub level_id: String,

    /// Structural hash of the level the run was played on.
    pub level_fingerprint: StateHash,

    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub starting_hearts: u32,

    /// Unix timestamp (milliseconds) when recording started.
    pub recorded_at_ms: i64,
}

/// State checkpoint for partial verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCheckpoint {
    pub tick: u32,
    pub state_hash: StateHash,
}

/// Outcome of the recorded run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Tick the recording stopped on.
    pub end_tick: u32,
    /// Set when the goal was reached.
    pub completion: Option<LevelCompletion>,
    pub stats: GameStats,
    pub final_state_hash: StateHash,
}

/// Transcript event (subset of GameEvent for compact storage).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptEvent {
    CollectiblePicked { tick: u32, collectible_id: String },
    PlatformBroken { tick: u32, platform_id: PlatformId },
    LevelCompleted { tick: u32 },
}

impl TranscriptEvent {
    /// Convert a GameEvent to TranscriptEvent (if relevant).
    pub fn from_game_event(event: &GameEvent) -> Option<Self> {
        match &event.data {
            GameEventData::CollectiblePicked { collectible } => Some(TranscriptEvent::CollectiblePicked {
                tick: event.tick,
                collectible_id: collectible.id.clone(),
            }),
            GameEventData::PlatformBroken { platform_id } => Some(TranscriptEvent::PlatformBroken {
                tick: event.tick,
                platform_id: *platform_id,
            }),
            GameEventData::LevelCompleted { .. } => Some(TranscriptEvent::LevelCompleted { tick: event.tick }),
            // Other events are not recorded in transcript
            _ => None,
        }
    }
}

impl LevelTranscript {
    /// Start a transcript for a freshly built level state.
    pub fn new(metadata: TranscriptMetadata, initial_state_hash: StateHash) -> Self {
        Self {
            version: TRANSCRIPT_VERSION,
            metadata,
            initial_state_hash,
            inputs: Vec::new(),
            input_end_tick: 0,
            checkpoints: Vec::new(),
            result: None,
            events: Vec::new(),
        }
    }

    /// Record a state checkpoint.
    pub fn add_checkpoint(&mut self, tick: u32, state_hash: StateHash) {
        self.checkpoints.push(StateCheckpoint { tick, state_hash });
    }

    /// Record a game event if it is significant.
    pub fn record_event(&mut self, event: &GameEvent) {
        if let Some(transcript_event) = TranscriptEvent::from_game_event(event) {
            self.events.push(transcript_event);
        }
    }

    /// Close the transcript with the run's inputs and outcome.
    pub fn finalize(&mut self, recording: &InputRecording, result: TranscriptResult) {
        self.inputs = recording.deltas().to_vec();
        self.input_end_tick = recording.end_tick;
        self.result = Some(result);
    }

    /// Check if transcript is complete.
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Inputs as a replayable recording.
    pub fn recording(&self) -> InputRecording {
        InputRecording::from_deltas(self.inputs.clone(), self.input_end_tick)
    }

    /// Serialize to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TranscriptError> {
        bincode::serialize(self).map_err(TranscriptError::Encode)
    }

    /// Deserialize from bytes, rejecting other versions.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TranscriptError> {
        let transcript: Self = bincode::deserialize(data).map_err(TranscriptError::Decode)?;
        if transcript.version != TRANSCRIPT_VERSION {
            return Err(TranscriptError::VersionMismatch {
                expected: TRANSCRIPT_VERSION,
                got: transcript.version,
            });
        }
        Ok(transcript)
    }

    /// Estimated size in bytes.
    pub fn estimated_size(&self) -> usize {
        // Rough estimate
        let base = 1 + 16 + self.metadata.level_id.len() + 32 + 88 + 29 + 4 + 8 + 32;
        let inputs = self.inputs.len() * InputDelta::SIZE + 4;
        let checkpoints = self.checkpoints.len() * 36;
        let events = self.events.len() * 24;
        let result = if self.result.is_some() { 80 } else { 0 };

        base + inputs + checkpoints + events + result
    }
}

/// Structural hash of a level: geometry, behavior and pickups.
///
/// Used to make sure a transcript is verified against the level it was
/// recorded on.
pub fn level_fingerprint(level: &Level) -> StateHash {
    let mut hasher = StateHasher::new(b"GIMBO_LEVEL_V1");
    hasher.update_str(&level.id);
    hasher.update_vec2(level.start_position);

    hasher.update_u32(level.platforms.len() as u32);
    for platform in &level.platforms {
        let r = platform.rect;
        hasher.update_fixed(r.x);
        hasher.update_fixed(r.y);
        hasher.update_fixed(r.width);
        hasher.update_fixed(r.height);
        match &platform.kind {
            LevelPlatformKind::Solid => hasher.update_u8(0),
            LevelPlatformKind::Moving { move_path, move_speed } => {
                hasher.update_u8(1);
                hasher.update_u32(move_path.len() as u32);
                for point in move_path {
                    hasher.update_vec2(*point);
                }
                hasher.update_fixed(*move_speed);
            }
            LevelPlatformKind::Breakable { durability } => {
                hasher.update_u8(2);
                hasher.update_u32(*durability);
            }
            LevelPlatformKind::Bounce { bounce_strength } => {
                hasher.update_u8(3);
                hasher.update_fixed(*bounce_strength);
            }
        }
    }

    hasher.update_u32(level.collectibles.len() as u32);
    for collectible in &level.collectibles {
        hasher.update_str(&collectible.id);
        hasher.update_vec2(collectible.position);
        hasher.update_u8(collectible.kind as u8);
    }

    let g = level.goal;
    hasher.update_fixed(g.x);
    hasher.update_fixed(g.y);
    hasher.update_fixed(g.width);
    hasher.update_fixed(g.height);

    let b = level.bounds;
    hasher.update_fixed(b.min_x);
    hasher.update_fixed(b.max_x);
    hasher.update_fixed(b.min_y);
    hasher.update_fixed(b.max_y);
    hasher.update_u32(level.target_time);

    hasher.finalize()
}

/// Errors that can occur with transcripts.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    /// Serialization failed.
    #[error("transcript encoding failed: {0}")]
    Encode(#[source] bincode::Error),

    /// Deserialization failed.
    #[error("transcript decoding failed: {0}")]
    Decode(#[source] bincode::Error),

    /// Version mismatch.
    #[error("transcript version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u8, got: u8 },
}
