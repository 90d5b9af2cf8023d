//! Round settings and preferences
//!
//! Persisted separately from high scores. The engine trusts validated
//! settings at `start`; the validity checks here are what a setup screen
//! runs before handing them over.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Shortest allowed round, in seconds
pub const MIN_ROUND_SECS: u32 = 1;
/// Longest allowed round, in seconds
pub const MAX_ROUND_SECS: u32 = 60;
/// Smallest allowed simultaneous-bubble cap
pub const MIN_BUBBLES: usize = 1;
/// Largest allowed simultaneous-bubble cap
pub const MAX_BUBBLES: usize = 15;

/// Settings for one round, immutable while it runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSettings {
    /// Who gets credited on the leaderboard
    pub player_name: String,
    /// Total round duration in seconds
    pub round_secs: u32,
    /// Maximum simultaneous bubble count
    pub max_bubbles: usize,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            round_secs: 60,
            max_bubbles: 15,
        }
    }
}

impl RoundSettings {
    /// Player name must be non-empty after trimming
    pub fn name_valid(&self) -> bool {
        !self.player_name.trim().is_empty()
    }

    pub fn duration_valid(&self) -> bool {
        (MIN_ROUND_SECS..=MAX_ROUND_SECS).contains(&self.round_secs)
    }

    pub fn cap_valid(&self) -> bool {
        (MIN_BUBBLES..=MAX_BUBBLES).contains(&self.max_bubbles)
    }

    /// Aggregate check the engine runs at `start`
    pub fn is_valid(&self) -> bool {
        self.name_valid() && self.duration_valid() && self.cap_valid()
    }

    /// Load settings from a JSON file, falling back to defaults on any
    /// missing or unreadable data
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("settings file unreadable ({err}), using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("no settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Save settings as JSON; failures are logged, never fatal
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    log::warn!("could not save settings: {err}");
                } else {
                    log::info!("settings saved");
                }
            }
            Err(err) => log::warn!("could not encode settings: {err}"),
        }
    }
}
