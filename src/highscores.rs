//! Per-game high score
//!
//! Each game keeps a single best score, persisted as a decimal string under
//! its own storage key (e.g. `snake-highscore`).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::KeyValueStore;

/// Best score for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    /// Storage key
    pub key: String,
    pub best: u64,
}

impl HighScore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            best: 0,
        }
    }

    /// Read the stored best; a missing or unparsable value counts as 0
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Self {
        let mut high = Self::new(key);
        match store.get(key) {
            Ok(Some(raw)) => match raw.trim().parse::<u64>() {
                Ok(best) => {
                    high.best = best;
                    log::info!("Loaded high score {best} ({key})");
                }
                Err(_) => log::warn!("Ignoring malformed high score {raw:?} ({key})"),
            },
            Ok(None) => log::info!("No high score yet ({key})"),
            Err(e) => log::warn!("High score unavailable: {e}"),
        }
        high
    }

    /// Whether a finished round beats the stored best
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a finished round. Returns true (and persists) on a new best.
    pub fn record<S: KeyValueStore + ?Sized>(&mut self, score: u64, store: &mut S) -> Result<bool> {
        if !self.qualifies(score) {
            return Ok(false);
        }
        self.best = score;
        store.set(&self.key, &score.to_string())?;
        log::info!("New high score {score} ({})", self.key);
        Ok(true)
    }

    /// HUD text
    pub fn label(&self) -> String {
        format!("High Score: {}", self.best)
    }
}
