//! High score leaderboard system
//!
//! `ScoreSink` is the seam the round talks to: it hands over one record per
//! finished round and reads back the running best. `ScoreBoard` is the stock
//! implementation, a top-10 list sorted descending with optional JSON
//! persistence.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry, one per finished round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_name: String,
    pub score: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp_ms: u64,
}

/// Where finished rounds report their score
pub trait ScoreSink {
    /// Record one finished round
    fn save(&mut self, record: ScoreRecord);
    /// Best score on record, 0 when empty
    fn highest(&self) -> u32;
    /// All records, best first
    fn all(&self) -> Vec<ScoreRecord>;
    /// Forget everything
    fn clear(&mut self);
}

/// High score leaderboard
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    entries: Vec<ScoreRecord>,
    /// When set, every mutation is mirrored to this JSON file
    path: Option<PathBuf>,
}

impl ScoreBoard {
    /// Create an empty, in-memory leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a leaderboard backed by a JSON file; missing or corrupt data
    /// starts fresh rather than failing
    pub fn load(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<Vec<ScoreRecord>>(&json) {
                Ok(mut entries) => {
                    entries.sort_by(|a, b| b.score.cmp(&a.score));
                    entries.truncate(MAX_HIGH_SCORES);
                    log::info!("loaded {} high scores", entries.len());
                    entries
                }
                Err(err) => {
                    log::warn!("high score file unreadable ({err}), starting fresh");
                    Vec::new()
                }
            },
            Err(_) => {
                log::info!("no high scores found, starting fresh");
                Vec::new()
            }
        };
        Self {
            entries,
            path: Some(path),
        }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// The rank a score would achieve (1-indexed), None if it wouldn't make
    /// the board
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    log::warn!("could not save high scores: {err}");
                } else {
                    log::info!("high scores saved ({} entries)", self.entries.len());
                }
            }
            Err(err) => log::warn!("could not encode high scores: {err}"),
        }
    }
}

impl ScoreSink for ScoreBoard {
    fn save(&mut self, record: ScoreRecord) {
        // Insert sorted descending by score
        let pos = self
            .entries
            .iter()
            .position(|e| record.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, record);
        self.entries.truncate(MAX_HIGH_SCORES);
        self.persist();
    }

    fn highest(&self) -> u32 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }

    fn all(&self) -> Vec<ScoreRecord> {
        self.entries.clone()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }
}

/// Current wall-clock time as Unix milliseconds
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
