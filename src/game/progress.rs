//! Level Progress
//!
//! Star ratings and the per-player progress book. The simulation only
//! produces a [`LevelCompletion`]; turning it into durable progress is up
//! to the host, through a [`ProgressStore`].

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::game::level::Level;

/// Most stars a level can award.
pub const MAX_STARS: u8 = 3;

/// Result of a finished level run, in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCompletion {
    pub completed: bool,
    pub elapsed_ticks: u32,
    pub collectibles_found: u32,
    pub total_collectibles: u32,
}

impl LevelCompletion {
    #[inline]
    pub fn found_everything(&self) -> bool {
        self.collectibles_found >= self.total_collectibles
    }
}

/// Stars for a run: one for finishing, one for beating par, one for
/// collecting everything.
pub fn star_rating(completion: &LevelCompletion, target_time_ticks: u32) -> u8 {
    if !completion.completed {
        return 0;
    }
    let mut stars = 1;
    if completion.elapsed_ticks <= target_time_ticks {
        stars += 1;
    }
    if completion.found_everything() {
        stars += 1;
    }
    stars.min(MAX_STARS)
}

// =============================================================================
// LEVEL PROGRESS
// =============================================================================

/// Best-ever record for one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level_id: String,
    pub completed: bool,
    /// `None` until the level has been completed once
    pub best_time_ticks: Option<u32>,
    pub stars: u8,
    pub collectibles_found: u32,
    pub total_collectibles: u32,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl LevelProgress {
    pub fn new(level_id: &str) -> Self {
        Self {
            level_id: level_id.to_string(),
            completed: false,
            best_time_ticks: None,
            stars: 0,
            collectibles_found: 0,
            total_collectibles: 0,
            last_completed_at: None,
        }
    }

    /// Fold a run into the record. Never makes the record worse.
    pub fn merge(&mut self, completion: &LevelCompletion, stars: u8, now: DateTime<Utc>) {
        self.total_collectibles = completion.total_collectibles;
        self.collectibles_found = self.collectibles_found.max(completion.collectibles_found);
        self.stars = self.stars.max(stars);

        if completion.completed {
            self.completed = true;
            self.best_time_ticks = Some(match self.best_time_ticks {
                Some(best) => best.min(completion.elapsed_ticks),
                None => completion.elapsed_ticks,
            });
            self.last_completed_at = Some(now);
        }
    }
}

/// Aggregate for one world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldProgress {
    pub completed_levels: u32,
    pub total_stars: u32,
}

// =============================================================================
// PROGRESS BOOK
// =============================================================================

/// Every level's progress, keyed by level id.
///
/// BTreeMap keeps the JSON form stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressBook {
    levels: BTreeMap<String, LevelProgress>,
}

impl ProgressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate a run and merge it into the level's record.
    pub fn record(&mut self, level: &Level, completion: &LevelCompletion, now: DateTime<Utc>) -> &LevelProgress {
        let stars = star_rating(completion, level.target_time_ticks());
        let entry = self
            .levels
            .entry(level.id.clone())
            .or_insert_with(|| LevelProgress::new(&level.id));
        entry.merge(completion, stars, now);
        entry
    }

    pub fn get(&self, level_id: &str) -> Option<&LevelProgress> {
        self.levels.get(level_id)
    }

    /// Record for a level, or a blank one if it was never played.
    pub fn progress_for(&self, level_id: &str) -> LevelProgress {
        self.get(level_id)
            .cloned()
            .unwrap_or_else(|| LevelProgress::new(level_id))
    }

    pub fn total_stars(&self) -> u32 {
        self.levels.values().map(|p| p.stars as u32).sum()
    }

    /// Completed count and stars for levels whose id starts with `<world_id>-`.
    pub fn world_progress(&self, world_id: &str) -> WorldProgress {
        let prefix = format!("{}-", world_id);
        self.levels
            .values()
            .filter(|p| p.level_id.starts_with(&prefix))
            .fold(WorldProgress::default(), |mut acc, p| {
                if p.completed {
                    acc.completed_levels += 1;
                }
                acc.total_stars += p.stars as u32;
                acc
            })
    }

    /// A level with no requirement is always open.
    pub fn is_unlocked(&self, required_stars: Option<u32>) -> bool {
        match required_stars {
            None | Some(0) => true,
            Some(required) => self.total_stars() >= required,
        }
    }

    pub fn is_level_unlocked(&self, level: &Level) -> bool {
        self.is_unlocked(level.required_stars)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn to_json(&self) -> Result<String, ProgressError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProgressError> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Durable home for a [`ProgressBook`]. Hosts back this with whatever
/// key-value storage they have.
pub trait ProgressStore {
    /// Load the saved book, or an empty one when nothing was saved yet.
    fn load(&self) -> Result<ProgressBook, ProgressError>;

    fn save(&mut self, book: &ProgressBook) -> Result<(), ProgressError>;
}

/// In-memory store holding the serialized book, like a browser's local storage slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryProgressStore {
    slot: Option<String>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON (for inspection).
    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<ProgressBook, ProgressError> {
        match &self.slot {
            Some(json) => ProgressBook::from_json(json),
            None => Ok(ProgressBook::new()),
        }
    }

    fn save(&mut self, book: &ProgressBook) -> Result<(), ProgressError> {
        self.slot = Some(book.to_json()?);
        Ok(())
    }
}

/// Progress persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Book could not be (de)serialized
    #[error("progress JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backing store failed
    #[error("progress store error: {0}")]
    Store(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::level_by_id;
    use chrono::TimeZone;

    fn run(elapsed_ticks: u32, found: u32, total: u32) -> LevelCompletion {
        LevelCompletion {
            completed: true,
            elapsed_ticks,
            collectibles_found: found,
            total_collectibles: total,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_star_rating_is_additive() {
        let par = 1800;
        assert_eq!(star_rating(&run(2000, 1, 3), par), 1);
        assert_eq!(star_rating(&run(1800, 1, 3), par), 2);
        // Full pickup without par still earns the collection star
        assert_eq!(star_rating(&run(2000, 3, 3), par), 2);
        assert_eq!(star_rating(&run(100, 3, 3), par), 3);

        let failed = LevelCompletion { completed: false, ..run(100, 3, 3) };
        assert_eq!(star_rating(&failed, par), 0);

        // Level with nothing to collect
        assert_eq!(star_rating(&run(100, 0, 0), par), 3);
    }

    #[test]
    fn test_merge_keeps_best() {
        let level = level_by_id("savanna-1").unwrap();
        let mut book = ProgressBook::new();

        let first = book.record(level, &run(1000, 3, 3), now()).clone();
        assert_eq!(first.stars, 3);
        assert_eq!(first.best_time_ticks, Some(1000));

        let second = book.record(level, &run(5000, 1, 3), now()).clone();
        assert_eq!(second.stars, 3);
        assert_eq!(second.best_time_ticks, Some(1000));
        assert_eq!(second.collectibles_found, 3);
        assert!(second.completed);
        assert_eq!(second.last_completed_at, Some(now()));

        let third = book.record(level, &run(900, 0, 3), now()).clone();
        assert_eq!(third.best_time_ticks, Some(900));
    }

    #[test]
    fn test_totals_and_unlocks() {
        let mut book = ProgressBook::new();
        assert!(book.is_unlocked(None));
        assert!(!book.is_unlocked(Some(3)));

        book.record(level_by_id("savanna-1").unwrap(), &run(100, 3, 3), now());
        book.record(level_by_id("savanna-2").unwrap(), &run(100_000, 0, 3), now());
        book.record(level_by_id("jungle-1").unwrap(), &run(100, 0, 3), now());

        assert_eq!(book.total_stars(), 3 + 1 + 2);
        assert!(book.is_level_unlocked(level_by_id("jungle-1").unwrap()));
        assert!(book.is_level_unlocked(level_by_id("jungle-2").unwrap()));
        assert!(!book.is_level_unlocked(level_by_id("jungle-3").unwrap()));

        let savanna = book.world_progress("savanna");
        assert_eq!(savanna, WorldProgress { completed_levels: 2, total_stars: 4 });
        assert_eq!(book.world_progress("desert"), WorldProgress::default());
    }

    #[test]
    fn test_progress_for_unplayed_level() {
        let book = ProgressBook::new();
        let blank = book.progress_for("clouds-5");
        assert!(!blank.completed);
        assert_eq!(blank.best_time_ticks, None);
        assert_eq!(blank.stars, 0);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryProgressStore::new();
        assert!(store.load().unwrap().is_empty());

        let mut book = ProgressBook::new();
        book.record(level_by_id("desert-2").unwrap(), &run(10, 4, 4), now());
        store.save(&book).unwrap();

        assert!(store.raw().unwrap().contains("\"desert-2\""));
        assert_eq!(store.load().unwrap(), book);
    }

    #[test]
    fn test_corrupt_store_reports_error() {
        assert!(matches!(ProgressBook::from_json("[1,2"), Err(ProgressError::Json(_))));
    }
}
