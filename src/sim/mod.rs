//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod motion;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{reflect, resolve_pair, resolve_walls};
pub use state::{Bubble, ColorTier, Rect, Round, RoundEvent, RoundPhase};
pub use tick::advance;
