//! Replay System
//!
//! Verifiable level runs through:
//! - Level transcript recording (configs, inputs, checkpoints, result)
//! - Verification by deterministic replay
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    REPLAY SYSTEM                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  transcript.rs   - Level transcript recording (bincode)     │
//! │  verify.rs       - Verification by replay                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod transcript;
pub mod verify;

// Re-export key types
pub use transcript::{
    LevelTranscript, TranscriptMetadata, TranscriptResult, TranscriptEvent,
    StateCheckpoint, TranscriptError, level_fingerprint,
    TRANSCRIPT_VERSION, CHECKPOINT_INTERVAL,
};
pub use verify::{verify_transcript, VerificationResult, VerificationError, CheckpointResult};
