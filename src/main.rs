//! Gimbo Simulation Runner
//!
//! Headless host for the simulation core. Plays a level at 60Hz with a
//! scripted keyboard, then verifies the recorded transcript by replay.
//!
//! Usage: `gimbo-sim [level-id] [config.json]`

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gimbo::{
    TICK_RATE, VERSION,
    game::{
        catalog::{all_levels, level_by_id},
        input::InputSampler,
        progress::{MemoryProgressStore, ProgressBook, ProgressStore, LevelCompletion},
        state::{CollectibleState, GameStats},
    },
    replay::{verify_transcript, LevelTranscript},
    session::{KeyboardHost, KeyboardScope, Phase, SimConfig, Simulation, SimulationObserver},
};

/// Give up on a run after this many seconds of play.
const MAX_RUN_SECONDS: u32 = 45;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    info!("Gimbo Simulation v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut args = std::env::args().skip(1);
    let level_id = args.next().unwrap_or_else(|| "savanna-1".to_string());
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
            SimConfig::from_json(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => SimConfig::default(),
    };

    let level = level_by_id(&level_id).with_context(|| {
        let known: Vec<_> = all_levels().map(|l| l.id.as_str()).collect();
        format!("unknown level {level_id:?}, expected one of: {}", known.join(", "))
    })?;

    let mut sim = Simulation::load(level, config)?;
    sim.add_observer(Box::new(LogObserver));

    let mut keyboard = ScriptedKeyboard::default();
    let transcript = {
        let mut scope = KeyboardScope::new(&mut keyboard);
        play(&mut sim, scope.host_mut()).await?;
        sim.take_transcript()
    };

    let final_hash = sim.state_hash();
    info!("Final State Hash: {}", hex::encode(final_hash));
    info!("Stats: {:?}", sim.state().stats);

    if let Some(transcript) = transcript {
        check_transcript(&transcript, level)?;
    }

    if let Some(completion) = sim.completion().copied() {
        record_progress(level, &completion)?;
    } else {
        warn!("Level not completed within {} seconds", MAX_RUN_SECONDS);
    }

    Ok(())
}

/// Drive the simulation from a 60Hz timer until the goal or the time limit.
async fn play(sim: &mut Simulation, keyboard: &mut ScriptedKeyboard) -> Result<()> {
    let max_ticks = MAX_RUN_SECONDS * sim.config().session.tick_rate;
    let frame_duration = Duration::from_micros(1_000_000 / sim.config().session.tick_rate as u64);
    let mut frames = interval(frame_duration);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("=== Playing {} ({}) ===", sim.level().name, sim.level().id);
    sim.start()?;

    let mut last_frame = Instant::now();
    let mut last_report_tick = 0;

    while sim.phase() == Phase::Playing && sim.tick_count() < max_ticks {
        frames.tick().await;
        let now = Instant::now();
        let dt = now - last_frame;
        last_frame = now;

        keyboard.script(sim.tick_count());
        sim.frame(dt, &keyboard.sampler);

        if sim.tick_count() - last_report_tick >= 300 {
            let snapshot = sim.snapshot();
            info!(
                "Tick {}: player at ({:.1}, {:.1}), camera x {:.1}",
                snapshot.tick, snapshot.player.bounds.x, snapshot.player.bounds.y, -snapshot.camera_offset[0]
            );
            last_report_tick = sim.tick_count();
        }
    }

    Ok(())
}

/// Replay the transcript and make sure it reproduces the run.
fn check_transcript(transcript: &LevelTranscript, level: &gimbo::Level) -> Result<()> {
    info!("=== Verifying Transcript ===");
    let bytes = transcript.to_bytes()?;
    info!(
        "Transcript: {} bytes ({} input deltas, {} checkpoints, {} events)",
        bytes.len(),
        transcript.inputs.len(),
        transcript.checkpoints.len(),
        transcript.events.len()
    );

    let decoded = LevelTranscript::from_bytes(&bytes)?;
    let replay_hash = verify_transcript(&decoded, level).into_result()?;
    info!("Replay State Hash: {}", hex::encode(replay_hash));
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

fn record_progress(level: &gimbo::Level, completion: &LevelCompletion) -> Result<()> {
    let mut store = MemoryProgressStore::new();
    let mut book: ProgressBook = store.load()?;
    let progress = book.record(level, completion, chrono::Utc::now());
    info!(
        "Level complete in {:.2}s: {} star(s), {}/{} collectibles",
        completion.elapsed_ticks as f64 / TICK_RATE as f64,
        progress.stars,
        progress.collectibles_found,
        progress.total_collectibles
    );
    store.save(&book)?;
    info!("Total stars: {}", book.total_stars());
    Ok(())
}

/// Stands in for a browser keyboard: presses keys by host key code.
#[derive(Default)]
struct ScriptedKeyboard {
    sampler: InputSampler,
    attached: bool,
}

impl ScriptedKeyboard {
    /// Run right, hop periodically.
    fn script(&mut self, tick: u32) {
        if !self.attached {
            return;
        }
        self.sampler.key_down("ArrowRight");
        if tick % 50 < 8 {
            self.sampler.key_down("Space");
        } else {
            self.sampler.key_up("Space");
        }
    }
}

impl KeyboardHost for ScriptedKeyboard {
    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
        self.sampler.clear();
    }
}

struct LogObserver;

impl SimulationObserver for LogObserver {
    fn on_stats_changed(&mut self, stats: &GameStats) {
        info!(
            "Stats: {} leaves, {} stars, {} hearts, score {}",
            stats.leaves, stats.stars, stats.hearts, stats.score
        );
    }

    fn on_collect(&mut self, collectible: &CollectibleState) {
        info!("Picked up {} ({:?})", collectible.id, collectible.kind);
    }

    fn on_level_complete(&mut self, completion: &LevelCompletion) {
        info!("Goal reached at tick {}", completion.elapsed_ticks);
    }
}
