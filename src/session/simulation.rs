//! Simulation Session
//!
//! Owns one level run: the entity state, the phase state machine, the
//! fixed-step scheduler, input recording and the replay transcript. Hosts
//! drive it with `frame()` from their animation callback and read back a
//! `RenderSnapshot`.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHash;
use crate::game::events::GameEventData;
use crate::game::input::{InputFrame, InputRecording, InputSampler};
use crate::game::level::{Level, LevelError};
use crate::game::progress::LevelCompletion;
use crate::game::state::{CollectibleState, GameStats, LevelState};
use crate::game::tick::{tick, TickResult};
use crate::replay::transcript::{level_fingerprint, LevelTranscript, TranscriptMetadata, TranscriptResult};
use crate::session::config::{ConfigError, SimConfig};
use crate::session::scheduler::FixedStepScheduler;
use crate::session::snapshot::RenderSnapshot;

/// Unique simulation identifier (UUID bytes).
pub type SimulationId = [u8; 16];

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Loaded, waiting for start.
    Idle,
    /// Ticks are running.
    Playing,
    /// Frozen until resumed.
    Paused,
    /// Goal reached. Only `reset` leaves this phase.
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Callbacks into the host. All methods default to no-ops.
pub trait SimulationObserver {
    /// Stats changed after a tick's pickups.
    fn on_stats_changed(&mut self, _stats: &GameStats) {}

    /// A collectible was picked up.
    fn on_collect(&mut self, _collectible: &CollectibleState) {}

    /// Goal reached. Fires exactly once per run.
    fn on_level_complete(&mut self, _completion: &LevelCompletion) {}

    fn on_phase_changed(&mut self, _from: Phase, _to: Phase) {}
}

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: Phase, action: &'static str },

    #[error("simulation is {phase}, not playing")]
    NotPlaying { phase: Phase },

    #[error("level rejected: {0}")]
    LevelRejected(#[from] LevelError),

    #[error("config rejected: {0}")]
    ConfigRejected(#[from] ConfigError),
}

/// One level run.
pub struct Simulation {
    /// Unique identifier.
    id: SimulationId,
    /// Level being played (validated).
    level: Level,
    config: SimConfig,
    state: LevelState,
    phase: Phase,
    scheduler: FixedStepScheduler,
    /// Inputs fed to the current run.
    recording: InputRecording,
    /// Replay transcript (if recording transcripts).
    transcript: Option<LevelTranscript>,
    completion: Option<LevelCompletion>,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl Simulation {
    /// Validate `level` and `config` and build an idle simulation.
    pub fn load(level: &Level, config: SimConfig) -> Result<Self, SessionError> {
        level.validate()?;
        config.validate()?;

        let id = uuid::Uuid::new_v4().into_bytes();
        let state = Self::fresh_state(level, &config);
        let scheduler = FixedStepScheduler::new(config.session.tick_rate, config.session.max_steps_per_frame);

        tracing::info!(
            simulation = %uuid::Uuid::from_bytes(id),
            level = %level.id,
            platforms = level.platforms.len(),
            collectibles = level.collectibles.len(),
            "level loaded"
        );

        Ok(Self {
            id,
            level: level.clone(),
            config,
            state,
            phase: Phase::Idle,
            scheduler,
            recording: InputRecording::new(),
            transcript: None,
            completion: None,
            observers: Vec::new(),
        })
    }

    fn fresh_state(level: &Level, config: &SimConfig) -> LevelState {
        LevelState::from_level(level, &config.physics, &config.camera, config.session.starting_hearts)
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> SimulationId {
        self.id
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn state(&self) -> &LevelState {
        &self.state
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn tick_count(&self) -> u32 {
        self.state.tick
    }

    /// Completion of the current run, once the goal is reached.
    pub fn completion(&self) -> Option<&LevelCompletion> {
        self.completion.as_ref()
    }

    pub fn recording(&self) -> &InputRecording {
        &self.recording
    }

    /// Transcript of the current run, if recording.
    pub fn transcript(&self) -> Option<&LevelTranscript> {
        self.transcript.as_ref()
    }

    pub fn state_hash(&self) -> StateHash {
        self.state.compute_hash()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state, self.phase)
    }

    // =========================================================================
    // Phase transitions
    // =========================================================================

    /// Idle -> Playing.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Idle, "start")?;
        self.begin_transcript();
        self.set_phase(Phase::Playing);
        Ok(())
    }

    /// Playing -> Paused.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Playing, "pause")?;
        self.set_phase(Phase::Paused);
        Ok(())
    }

    /// Paused -> Playing.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Paused, "resume")?;
        self.set_phase(Phase::Playing);
        Ok(())
    }

    /// Pause when playing, resume when paused.
    pub fn toggle_pause(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            from => Err(SessionError::InvalidTransition { from, action: "toggle pause" }),
        }
    }

    /// Any phase -> Idle with a fresh state rebuilt from the level.
    pub fn reset(&mut self) {
        self.state = Self::fresh_state(&self.level, &self.config);
        self.recording = InputRecording::new();
        self.transcript = None;
        self.completion = None;
        self.scheduler.reset();
        self.set_phase(Phase::Idle);
        tracing::debug!(level = %self.level.id, "simulation reset");
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase != expected {
            return Err(SessionError::InvalidTransition { from: self.phase, action });
        }
        Ok(())
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        if from == Phase::Playing {
            self.scheduler.reset();
        }
        self.phase = to;

        tracing::info!(level = %self.level.id, tick = self.state.tick, %from, %to, "phase changed");
        for observer in &mut self.observers {
            observer.on_phase_changed(from, to);
        }
    }

    // =========================================================================
    // Driving the loop
    // =========================================================================

    /// Feed one host frame. Runs the ticks the scheduler allows while
    /// playing and returns how many ran.
    pub fn frame(&mut self, frame_dt: Duration, sampler: &InputSampler) -> u32 {
        if self.phase != Phase::Playing {
            return 0;
        }

        let plan = self.scheduler.advance(frame_dt);
        let mut ran = 0;
        for _ in 0..plan.ticks_to_run {
            if self.phase != Phase::Playing {
                break;
            }
            self.run_tick(sampler.snapshot());
            ran += 1;
        }
        ran
    }

    /// Run exactly one tick with `input`, bypassing the scheduler.
    pub fn step(&mut self, input: InputFrame) -> Result<TickResult, SessionError> {
        if self.phase != Phase::Playing {
            return Err(SessionError::NotPlaying { phase: self.phase });
        }
        Ok(self.run_tick(input))
    }

    fn run_tick(&mut self, input: InputFrame) -> TickResult {
        self.recording.record(self.state.tick, input);
        let result = tick(&mut self.state, input, &self.config.physics);

        if let Some(transcript) = self.transcript.as_mut() {
            for event in &result.events {
                transcript.record_event(event);
            }
            let interval = self.config.session.checkpoint_interval;
            if interval > 0 && self.state.tick % interval == 0 {
                transcript.add_checkpoint(self.state.tick, self.state.compute_hash());
            }
        }

        for event in &result.events {
            match &event.data {
                GameEventData::CollectiblePicked { collectible } => {
                    for observer in &mut self.observers {
                        observer.on_collect(collectible);
                    }
                }
                GameEventData::StatsChanged { stats } => {
                    for observer in &mut self.observers {
                        observer.on_stats_changed(stats);
                    }
                }
                GameEventData::LevelCompleted { completion } => {
                    for observer in &mut self.observers {
                        observer.on_level_complete(completion);
                    }
                }
                _ => {}
            }
        }

        if let Some(completion) = result.completion {
            self.completion = Some(completion);
            self.finish_transcript();

            tracing::info!(
                level = %self.level.id,
                elapsed_ticks = completion.elapsed_ticks,
                found = completion.collectibles_found,
                total = completion.total_collectibles,
                state_hash = %hex::encode(&self.state.compute_hash()[..8]),
                "level complete"
            );
            self.set_phase(Phase::Complete);
        }

        result
    }

    // =========================================================================
    // Transcript
    // =========================================================================

    fn begin_transcript(&mut self) {
        if !self.config.session.record_transcript {
            return;
        }

        let metadata = TranscriptMetadata {
            session_id: self.id,
            level_id: self.level.id.clone(),
            level_fingerprint: level_fingerprint(&self.level),
            physics: self.config.physics.clone(),
            camera: self.config.camera.clone(),
            starting_hearts: self.config.session.starting_hearts,
            recorded_at_ms: chrono::Utc::now().timestamp_millis(),
        };
        self.transcript = Some(LevelTranscript::new(metadata, self.state.compute_hash()));
    }

    fn finish_transcript(&mut self) {
        let Some(transcript) = self.transcript.as_mut() else {
            return;
        };
        if transcript.is_complete() {
            return;
        }

        let end_tick = self.state.tick;
        self.recording.finalize(end_tick.saturating_sub(1));
        transcript.finalize(
            &self.recording,
            TranscriptResult {
                end_tick,
                completion: self.completion,
                stats: self.state.stats,
                final_state_hash: self.state.compute_hash(),
            },
        );
    }

    /// Close the transcript at the current tick and hand it over.
    ///
    /// Runs that never reached the goal are finalized without a completion.
    pub fn take_transcript(&mut self) -> Option<LevelTranscript> {
        self.finish_transcript();
        self.transcript.take()
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("id", &uuid::Uuid::from_bytes(self.id))
            .field("level", &self.level.id)
            .field("phase", &self.phase)
            .field("tick", &self.state.tick)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::fixed::from_int;
    use crate::core::rect::Rect;
    use crate::core::vec2::FixedVec2;
    use crate::game::catalog::level_by_id;
    use crate::game::input::Key;
    use crate::game::level::{Bounds, CollectibleKind, LevelCollectible, LevelPlatform};
    use crate::replay::verify::verify_transcript;

    #[derive(Default)]
    struct Log {
        stats: Vec<GameStats>,
        collected: Vec<String>,
        completions: Vec<LevelCompletion>,
        phases: Vec<(Phase, Phase)>,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl SimulationObserver for Recorder {
        fn on_stats_changed(&mut self, stats: &GameStats) {
            self.0.borrow_mut().stats.push(*stats);
        }

        fn on_collect(&mut self, collectible: &CollectibleState) {
            self.0.borrow_mut().collected.push(collectible.id.clone());
        }

        fn on_level_complete(&mut self, completion: &LevelCompletion) {
            self.0.borrow_mut().completions.push(*completion);
        }

        fn on_phase_changed(&mut self, from: Phase, to: Phase) {
            self.0.borrow_mut().phases.push((from, to));
        }
    }

    /// Flat floor, one leaf on the way, goal 200 units to the right.
    fn corridor() -> Level {
        let mut level = level_by_id("savanna-1").unwrap().clone();
        level.id = "test-corridor".into();
        level.platforms = vec![LevelPlatform::solid(Rect::from_units(0.0, 350.0, 900.0, 50.0))];
        level.collectibles = vec![LevelCollectible::new("leaf1", FixedVec2::from_ints(200, 300), CollectibleKind::Leaf)];
        level.obstacles.clear();
        level.goal = Rect::from_units(300.0, 270.0, 60.0, 80.0);
        level.bounds = Bounds::new(0, from_int(900), 0, from_int(400));
        level
    }

    fn observed(level: &Level) -> (Simulation, Rc<RefCell<Log>>) {
        let mut sim = Simulation::load(level, SimConfig::default()).unwrap();
        let log = Rc::new(RefCell::new(Log::default()));
        sim.add_observer(Box::new(Recorder(log.clone())));
        (sim, log)
    }

    #[test]
    fn test_load_rejects_invalid_level() {
        let mut level = corridor();
        level.goal.width = 0;
        assert!(matches!(
            Simulation::load(&level, SimConfig::default()),
            Err(SessionError::LevelRejected(LevelError::InvalidGoalSize))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.session.tick_rate = 0;
        assert!(matches!(
            Simulation::load(&corridor(), config),
            Err(SessionError::ConfigRejected(_))
        ));
    }

    #[test]
    fn test_phase_transitions() {
        let (mut sim, log) = observed(&corridor());
        assert_eq!(sim.phase(), Phase::Idle);

        assert!(matches!(sim.pause(), Err(SessionError::InvalidTransition { from: Phase::Idle, .. })));
        assert!(sim.resume().is_err());
        assert!(sim.toggle_pause().is_err());

        sim.start().unwrap();
        assert!(sim.start().is_err());
        sim.pause().unwrap();
        assert_eq!(sim.phase(), Phase::Paused);
        sim.toggle_pause().unwrap();
        assert_eq!(sim.phase(), Phase::Playing);
        sim.toggle_pause().unwrap();
        sim.reset();
        assert_eq!(sim.phase(), Phase::Idle);

        assert_eq!(
            log.borrow().phases,
            vec![
                (Phase::Idle, Phase::Playing),
                (Phase::Playing, Phase::Paused),
                (Phase::Paused, Phase::Playing),
                (Phase::Playing, Phase::Paused),
                (Phase::Paused, Phase::Idle),
            ]
        );
    }

    #[test]
    fn test_step_requires_playing() {
        let mut sim = Simulation::load(&corridor(), SimConfig::default()).unwrap();
        assert!(matches!(
            sim.step(InputFrame::new()),
            Err(SessionError::NotPlaying { phase: Phase::Idle })
        ));
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn test_frame_runs_only_while_playing() {
        let mut sim = Simulation::load(&corridor(), SimConfig::default()).unwrap();
        let sampler = InputSampler::new();
        let step = Duration::from_nanos(1_000_000_000 / 60);

        assert_eq!(sim.frame(step * 3, &sampler), 0);

        sim.start().unwrap();
        assert_eq!(sim.frame(step * 3, &sampler), 3);
        assert_eq!(sim.tick_count(), 3);

        // Half a step banked, then dropped by the pause
        assert_eq!(sim.frame(step / 2, &sampler), 0);
        sim.pause().unwrap();
        assert_eq!(sim.frame(step * 4, &sampler), 0);
        sim.resume().unwrap();
        assert_eq!(sim.frame(step / 2, &sampler), 0);
        assert_eq!(sim.tick_count(), 3);
    }

    #[test]
    fn test_frame_caps_long_frames() {
        let mut sim = Simulation::load(&corridor(), SimConfig::default()).unwrap();
        sim.start().unwrap();
        assert_eq!(sim.frame(Duration::from_secs(2), &InputSampler::new()), 5);
    }

    #[test]
    fn test_frame_samples_held_keys() {
        let mut sim = Simulation::load(&corridor(), SimConfig::default()).unwrap();
        sim.start().unwrap();
        let mut sampler = InputSampler::new();
        sampler.press(Key::Right);

        let start_x = sim.state().player.position.x;
        let step = Duration::from_nanos(1_000_000_000 / 60);
        sim.frame(step * 2, &sampler);
        assert_eq!(sim.state().player.position.x, start_x + from_int(10));
    }

    #[test]
    fn test_walk_to_goal_notifies_once() {
        let (mut sim, log) = observed(&corridor());
        sim.start().unwrap();

        let right = InputFrame::new().with(Key::Right);
        while sim.phase() == Phase::Playing {
            sim.step(right).unwrap();
        }

        assert_eq!(sim.phase(), Phase::Complete);
        assert!(sim.step(right).is_err());

        let log = log.borrow();
        assert_eq!(log.collected, vec!["leaf1".to_string()]);
        assert_eq!(log.stats.len(), 1);
        assert_eq!(log.stats[0].leaves, 1);
        assert_eq!(log.completions.len(), 1);

        let completion = log.completions[0];
        assert!(completion.completed);
        assert_eq!(completion.elapsed_ticks, 33);
        assert_eq!(completion.collectibles_found, 1);
        assert_eq!(completion.total_collectibles, 1);
        assert_eq!(sim.completion(), Some(&completion));
        assert_eq!(log.phases.last(), Some(&(Phase::Playing, Phase::Complete)));
    }

    #[test]
    fn test_completed_run_transcript_verifies() {
        let level = corridor();
        let mut sim = Simulation::load(&level, SimConfig::default()).unwrap();
        sim.start().unwrap();
        let right = InputFrame::new().with(Key::Right);
        while sim.phase() == Phase::Playing {
            sim.step(right).unwrap();
        }

        let transcript = sim.take_transcript().unwrap();
        assert!(transcript.is_complete());
        assert_eq!(transcript.metadata.session_id, sim.id());
        assert!(transcript.result.as_ref().and_then(|r| r.completion).is_some());

        let result = verify_transcript(&transcript, &level);
        assert!(result.valid, "{:?}", result.error);
    }

    #[test]
    fn test_abandoned_run_transcript_verifies() {
        let level = level_by_id("jungle-1").unwrap();
        let mut config = SimConfig::default();
        config.session.checkpoint_interval = 30;
        let mut sim = Simulation::load(level, config).unwrap();
        sim.start().unwrap();

        for t in 0..120u32 {
            let frame = if t % 40 == 10 {
                InputFrame::new().with(Key::Right).with(Key::Jump)
            } else {
                InputFrame::new().with(Key::Right)
            };
            sim.step(frame).unwrap();
        }

        let transcript = sim.take_transcript().unwrap();
        assert_eq!(transcript.checkpoints.len(), 4);
        assert_eq!(transcript.result.as_ref().map(|r| r.end_tick), Some(120));
        assert!(verify_transcript(&transcript, level).valid);
    }

    #[test]
    fn test_transcript_disabled() {
        let mut config = SimConfig::default();
        config.session.record_transcript = false;
        let mut sim = Simulation::load(&corridor(), config).unwrap();
        sim.start().unwrap();
        sim.step(InputFrame::new()).unwrap();
        assert!(sim.take_transcript().is_none());
        assert_eq!(sim.recording().end_tick, 0);
    }

    #[test]
    fn test_reset_rebuilds_state() {
        let level = corridor();
        let mut sim = Simulation::load(&level, SimConfig::default()).unwrap();
        let initial = sim.state_hash();

        sim.start().unwrap();
        for _ in 0..20 {
            sim.step(InputFrame::new().with(Key::Right)).unwrap();
        }
        assert_ne!(sim.state_hash(), initial);

        sim.reset();
        assert_eq!(sim.state_hash(), initial);
        assert_eq!(sim.tick_count(), 0);
        assert!(sim.completion().is_none());
        assert!(sim.transcript().is_none());
        assert!(sim.recording().deltas().is_empty());

        // And a second run plays the same way
        sim.start().unwrap();
        assert!(sim.step(InputFrame::new()).is_ok());
    }

    #[test]
    fn test_snapshot_reports_phase() {
        let mut sim = Simulation::load(&corridor(), SimConfig::default()).unwrap();
        assert_eq!(sim.snapshot().phase, Phase::Idle);
        sim.start().unwrap();
        sim.step(InputFrame::new()).unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.phase, Phase::Playing);
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.level_id, "test-corridor");
    }
}
