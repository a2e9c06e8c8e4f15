//! Verification API
//!
//! Verify level runs by deterministic replay: rebuild the level state from
//! the transcript's configs, feed the recorded inputs through the tick
//! loop, and compare state hashes at every checkpoint and at the end.

use crate::core::hash::StateHash;
use crate::game::level::Level;
use crate::game::state::LevelState;
use crate::game::tick::tick;
use crate::replay::transcript::{level_fingerprint, LevelTranscript, TRANSCRIPT_VERSION};

/// Verification result.
#[derive(Debug)]
pub struct VerificationResult {
    /// Did verification pass?
    pub valid: bool,

    /// Final state hash (from replay).
    pub computed_final_hash: StateHash,

    /// Expected final hash (from transcript).
    pub expected_final_hash: StateHash,

    /// Checkpoint verification results.
    pub checkpoint_results: Vec<CheckpointResult>,

    /// Detailed error if verification failed.
    pub error: Option<VerificationError>,
}

impl VerificationResult {
    fn failed(error: VerificationError, checkpoint_results: Vec<CheckpointResult>) -> Self {
        Self {
            valid: false,
            computed_final_hash: [0; 32],
            expected_final_hash: [0; 32],
            checkpoint_results,
            error: Some(error),
        }
    }

    /// Turn a failed verification into its error.
    pub fn into_result(self) -> Result<StateHash, VerificationError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.computed_final_hash),
        }
    }
}

/// Result of verifying a single checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointResult {
    pub tick: u32,
    pub expected: StateHash,
    pub computed: StateHash,
    pub valid: bool,
}

/// Errors that can occur during verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// Transcript version mismatch.
    #[error("version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u8, got: u8 },

    /// Transcript was recorded on a different level (or a different revision of it).
    #[error("level mismatch: transcript is for {expected}, got {got}")]
    LevelMismatch { expected: String, got: String },

    /// Initial state hash mismatch.
    #[error("initial state hash mismatch")]
    InitialStateMismatch { expected: StateHash, computed: StateHash },

    /// Checkpoint hash mismatch.
    #[error("checkpoint mismatch at tick {tick}")]
    CheckpointMismatch { tick: u32, expected: StateHash, computed: StateHash },

    /// Final state hash mismatch.
    #[error("final state hash mismatch")]
    FinalStateMismatch { expected: StateHash, computed: StateHash },

    /// Recorded completion does not match the replayed one.
    #[error("level result mismatch")]
    ResultMismatch,

    /// Transcript is incomplete.
    #[error("transcript is incomplete")]
    IncompleteTranscript,
}

/// Verify a level transcript by full replay against `level`.
///
/// This is the authoritative verification method.
pub fn verify_transcript(transcript: &LevelTranscript, level: &Level) -> VerificationResult {
    // Check transcript is complete
    let result = match &transcript.result {
        Some(r) => r,
        None => return VerificationResult::failed(VerificationError::IncompleteTranscript, vec![]),
    };

    if transcript.version != TRANSCRIPT_VERSION {
        return VerificationResult::failed(
            VerificationError::VersionMismatch { expected: TRANSCRIPT_VERSION, got: transcript.version },
            vec![],
        );
    }

    // 1. Same level, same geometry
    let metadata = &transcript.metadata;
    if metadata.level_id != level.id || metadata.level_fingerprint != level_fingerprint(level) {
        return VerificationResult::failed(
            VerificationError::LevelMismatch { expected: metadata.level_id.clone(), got: level.id.clone() },
            vec![],
        );
    }

    // 2. Rebuild and check the initial state
    let mut state = LevelState::from_level(level, &metadata.physics, &metadata.camera, metadata.starting_hearts);
    let initial_hash = state.compute_hash();
    if initial_hash != transcript.initial_state_hash {
        return VerificationResult {
            valid: false,
            computed_final_hash: initial_hash,
            expected_final_hash: transcript.initial_state_hash,
            checkpoint_results: vec![],
            error: Some(VerificationError::InitialStateMismatch {
                expected: transcript.initial_state_hash,
                computed: initial_hash,
            }),
        };
    }

    // 3. Replay tick by tick with checkpoint verification
    let recording = transcript.recording();
    let mut checkpoint_results = Vec::new();
    let mut checkpoints = transcript.checkpoints.iter().peekable();
    let mut completion = None;

    while state.tick < result.end_tick && !state.is_complete() {
        let frame = recording.input_at(state.tick);
        let tick_result = tick(&mut state, frame, &metadata.physics);
        if tick_result.completion.is_some() {
            completion = tick_result.completion;
        }

        while let Some(checkpoint) = checkpoints.next_if(|c| c.tick <= state.tick) {
            let computed = state.compute_hash();
            let valid = checkpoint.tick == state.tick && computed == checkpoint.state_hash;
            checkpoint_results.push(CheckpointResult {
                tick: checkpoint.tick,
                expected: checkpoint.state_hash,
                computed,
                valid,
            });

            if !valid {
                tracing::warn!(tick = checkpoint.tick, "checkpoint mismatch");
                return VerificationResult {
                    valid: false,
                    computed_final_hash: computed,
                    expected_final_hash: checkpoint.state_hash,
                    checkpoint_results,
                    error: Some(VerificationError::CheckpointMismatch {
                        tick: checkpoint.tick,
                        expected: checkpoint.state_hash,
                        computed,
                    }),
                };
            }
        }
    }

    // 4. Verify final state
    let final_hash = state.compute_hash();
    let error = if state.tick != result.end_tick || completion != result.completion {
        Some(VerificationError::ResultMismatch)
    } else if final_hash != result.final_state_hash {
        Some(VerificationError::FinalStateMismatch {
            expected: result.final_state_hash,
            computed: final_hash,
        })
    } else {
        None
    };

    tracing::debug!(
        level = %level.id,
        ticks = state.tick,
        checkpoints = checkpoint_results.len(),
        valid = error.is_none(),
        "transcript verified"
    );

    VerificationResult {
        valid: error.is_none(),
        computed_final_hash: final_hash,
        expected_final_hash: result.final_state_hash,
        checkpoint_results,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::STARTING_HEARTS;
    use crate::game::camera::CameraConfig;
    use crate::game::catalog::level_by_id;
    use crate::game::input::{InputFrame, InputRecording, Key};
    use crate::game::physics::PhysicsConfig;
    use crate::replay::transcript::{TranscriptMetadata, TranscriptResult};

    /// Record a run the way a session does.
    fn record_run(level: &Level, ticks: u32, interval: u32) -> LevelTranscript {
        let physics = PhysicsConfig::default();
        let camera = CameraConfig::default();
        let mut state = LevelState::from_level(level, &physics, &camera, STARTING_HEARTS);
        let mut transcript = LevelTranscript::new(
            TranscriptMetadata {
                session_id: [9; 16],
                level_id: level.id.clone(),
                level_fingerprint: level_fingerprint(level),
                physics: physics.clone(),
                camera,
                starting_hearts: STARTING_HEARTS,
                recorded_at_ms: 0,
            },
            state.compute_hash(),
        );

        let mut recording = InputRecording::new();
        let mut completion = None;
        for t in 0..ticks {
            let frame = if (t / 30) % 3 == 2 {
                InputFrame::new().with(Key::Right).with(Key::Jump)
            } else {
                InputFrame::new().with(Key::Right)
            };
            recording.record(state.tick, frame);
            let result = tick(&mut state, frame, &physics);
            for event in &result.events {
                transcript.record_event(event);
            }
            if state.tick % interval == 0 {
                transcript.add_checkpoint(state.tick, state.compute_hash());
            }
            if result.completion.is_some() {
                completion = result.completion;
                break;
            }
        }

        transcript.finalize(
            &recording,
            TranscriptResult {
                end_tick: state.tick,
                completion,
                stats: state.stats,
                final_state_hash: state.compute_hash(),
            },
        );
        transcript
    }

    #[test]
    fn test_incomplete_transcript_fails() {
        let level = level_by_id("savanna-1").unwrap();
        let mut transcript = record_run(level, 10, 5);
        transcript.result = None;

        let result = verify_transcript(&transcript, level);
        assert!(!result.valid);
        assert_eq!(result.error, Some(VerificationError::IncompleteTranscript));
    }

    #[test]
    fn test_honest_run_verifies() {
        let level = level_by_id("savanna-2").unwrap();
        let transcript = record_run(level, 400, 60);

        let result = verify_transcript(&transcript, level);
        assert!(result.valid, "{:?}", result.error);
        assert_eq!(result.checkpoint_results.len(), transcript.checkpoints.len());
        assert!(result.checkpoint_results.iter().all(|c| c.valid));
        assert_eq!(result.into_result().unwrap(), transcript.result.unwrap().final_state_hash);
    }

    #[test]
    fn test_verifies_after_bincode_roundtrip() {
        let level = level_by_id("jungle-1").unwrap();
        let transcript = record_run(level, 300, 100);
        let decoded = LevelTranscript::from_bytes(&transcript.to_bytes().unwrap()).unwrap();
        assert!(verify_transcript(&decoded, level).valid);
    }

    #[test]
    fn test_tampered_inputs_fail_checkpoint() {
        let level = level_by_id("savanna-1").unwrap();
        let mut transcript = record_run(level, 200, 50);
        // Hold left instead for the first stretch
        transcript.inputs[0].frame = InputFrame::new().with(Key::Left);

        let result = verify_transcript(&transcript, level);
        assert!(!result.valid);
        assert!(matches!(result.error, Some(VerificationError::CheckpointMismatch { tick: 50, .. })));
    }

    #[test]
    fn test_tampered_final_hash_fails() {
        let level = level_by_id("savanna-1").unwrap();
        let mut transcript = record_run(level, 90, 1000);
        if let Some(result) = transcript.result.as_mut() {
            result.final_state_hash = [0xAB; 32];
        }

        let result = verify_transcript(&transcript, level);
        assert!(matches!(result.error, Some(VerificationError::FinalStateMismatch { .. })));
    }

    #[test]
    fn test_wrong_level_rejected() {
        let transcript = record_run(level_by_id("savanna-1").unwrap(), 30, 10);

        let other = level_by_id("savanna-2").unwrap();
        assert!(matches!(
            verify_transcript(&transcript, other).error,
            Some(VerificationError::LevelMismatch { .. })
        ));

        // Same id, edited geometry
        let mut edited = level_by_id("savanna-1").unwrap().clone();
        edited.goal.x += 10;
        assert!(matches!(
            verify_transcript(&transcript, &edited).error,
            Some(VerificationError::LevelMismatch { .. })
        ));
    }

    #[test]
    fn test_initial_state_tamper_detected() {
        let level = level_by_id("savanna-1").unwrap();
        let mut transcript = record_run(level, 30, 10);
        transcript.metadata.starting_hearts = 5;

        assert!(matches!(
            verify_transcript(&transcript, level).error,
            Some(VerificationError::InitialStateMismatch { .. })
        ));
    }
}
