//! Bubble Pop - A tap-to-pop bubble arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, round state machine)
//! - `settings`: Round settings with validation bounds
//! - `highscores`: Score records and the leaderboard sink

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::{ScoreBoard, ScoreRecord, ScoreSink};
pub use settings::RoundSettings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz physics)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Fine ticks per lifecycle tick (time, difficulty, spawner churn)
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Maximum substeps per advance to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Countdown value shown before a round begins
    pub const COUNTDOWN_SECS: u32 = 3;

    /// Bubble defaults
    pub const BUBBLE_BASE_DIAMETER: f32 = 60.0;
    /// Diameter jitter applied at spawn time (± this much)
    pub const BUBBLE_SIZE_JITTER: f32 = 10.0;
    /// Shrink factor for the fallback bubble when placement retries run out
    pub const FALLBACK_DIAMETER_SCALE: f32 = 0.7;
    /// Minimum gap kept between a spawned bubble and the playfield edge
    pub const SPAWN_EDGE_PADDING: f32 = 5.0;
    /// Placement attempts before falling back to a smaller bubble
    pub const SPAWN_RETRY_BUDGET: u32 = 100;
    /// Spawn velocity range per axis is ± this times the difficulty factor
    pub const SPAWN_SPEED_RANGE: f32 = 20.0;

    /// Scoring
    pub const COMBO_MULTIPLIER: f32 = 1.5;
    /// Ticks a popped bubble lingers before removal (0.3 s at 60 Hz)
    pub const POP_GRACE_TICKS: u32 = 18;

    /// Difficulty ramp bounds
    pub const DIFFICULTY_MIN: f32 = 1.0;
    pub const DIFFICULTY_MAX: f32 = 3.0;
    /// Difficulty gained over a full round (scaled by elapsed fraction)
    pub const DIFFICULTY_RAMP: f32 = 2.0;

    /// One-in-N odds per axis per tick of a velocity sign flip
    pub const DIRECTION_FLIP_ODDS: u32 = 500;
    /// Y-velocity retained after a bottom-edge bounce
    pub const BOTTOM_BOUNCE_DAMPING: f32 = 0.95;
    /// Safety margin above the bottom edge to avoid boundary jitter
    pub const BOTTOM_BOUNCE_MARGIN: f32 = 1.0;
}
