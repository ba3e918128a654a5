//! High score leaderboard
//!
//! Top 10 finished runs, stored as JSON next to the score file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Stage reached
    pub stage: u32,
    /// Frames survived
    pub frames: u64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub const FILE_NAME: &'static str = "highscores.json";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run; returns the rank achieved
    pub fn add_score(&mut self, score: u64, stage: u32, frames: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            stage,
            frames,
        };

        // Ties keep the older run ahead
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from `path`; missing file gives an empty board
    pub fn load_from(path: &Path) -> Result<Self, PersistenceError> {
        let mut scores = persistence::read_json::<HighScores>(path)?.unwrap_or_default();
        // Hand-edited files may arrive unsorted or oversized
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::write_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load from the platform data directory, starting fresh on any failure
    pub fn load() -> Self {
        let loaded = persistence::data_file(Self::FILE_NAME).and_then(|p| Self::load_from(&p));
        match loaded {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::warn!("Failed to load high scores: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self) {
        let saved = persistence::data_file(Self::FILE_NAME).and_then(|p| self.save_to(&p));
        if let Err(e) = saved {
            log::warn!("Failed to save high scores: {}", e);
        }
    }
}

/// `mm:ss` for a frame count at 60 fps
pub fn format_frames(frames: u64) -> String {
    let secs = frames / u64::from(crate::consts::FRAMES_PER_SECOND);
    format!("{}:{:02}", secs / 60, secs % 60)
}
