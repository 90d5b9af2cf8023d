//! Round state and core simulation types
//!
//! All state for one play session lives here, along with the synchronous
//! mutations driven by player input (`pop`) and the host (`start`, `pause`,
//! `resume`, `reset`, `update_bounds`). Time-driven behavior is in `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::highscores::{self, ScoreRecord, ScoreSink};
use crate::settings::RoundSettings;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Collecting player info, nothing simulated yet
    Setup,
    /// Countdown before gameplay begins
    Starting,
    /// Active gameplay
    Playing,
    /// Round is paused, state frozen
    Paused,
    /// Round ended, score handed to the sink
    Finished,
}

/// Bubble color category, fixing point value and spawn weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTier {
    Red,
    Pink,
    Green,
    Blue,
    Black,
}

impl ColorTier {
    /// All tiers in spawn-table order
    pub const ALL: [ColorTier; 5] = [
        ColorTier::Red,
        ColorTier::Pink,
        ColorTier::Green,
        ColorTier::Blue,
        ColorTier::Black,
    ];

    /// Points awarded for popping this tier
    pub fn points(self) -> u32 {
        match self {
            ColorTier::Red => 1,
            ColorTier::Pink => 2,
            ColorTier::Green => 5,
            ColorTier::Blue => 8,
            ColorTier::Black => 10,
        }
    }

    /// Spawn probability (the table sums to 1.0)
    pub fn probability(self) -> f32 {
        match self {
            ColorTier::Red => 0.40,
            ColorTier::Pink => 0.30,
            ColorTier::Green => 0.15,
            ColorTier::Blue => 0.10,
            ColorTier::Black => 0.05,
        }
    }

    /// Draw a tier by walking the cumulative probability table
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        let draw: f32 = rng.random();
        let mut cumulative = 0.0;
        for tier in Self::ALL {
            cumulative += tier.probability();
            if draw < cumulative {
                return tier;
            }
        }
        // Rounding can leave the last sliver uncovered
        ColorTier::Red
    }
}

/// Axis-aligned playfield rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.origin.y
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// A degenerate rect (e.g. bounds not yet reported) disables spawning
    /// and movement rather than producing NaN positions.
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// True iff a circle of the given radius lies fully inside
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x >= self.left() + radius
            && center.x <= self.right() - radius
            && center.y >= self.top() + radius
            && center.y <= self.bottom() - radius
    }

    /// Clamp a circle center so the circle lies inside the rect.
    /// The lower bound wins if the circle is wider than the rect.
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            center
                .x
                .min(self.right() - radius)
                .max(self.left() + radius),
            center
                .y
                .min(self.bottom() - radius)
                .max(self.top() + radius),
        )
    }
}

/// A bubble entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bubble {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub diameter: f32,
    pub tier: ColorTier,
    /// Set on pop; the bubble lingers for a grace period before removal
    pub popped: bool,
    /// Ticks until a popped bubble is removed
    pub grace_ticks: u32,
}

impl Bubble {
    pub fn new(id: u32, pos: Vec2, diameter: f32, tier: ColorTier) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            diameter,
            tier,
            popped: false,
            grace_ticks: 0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    pub fn points(&self) -> u32 {
        self.tier.points()
    }

    /// Popped bubbles are excluded from movement and collision
    pub fn is_active(&self) -> bool {
        !self.popped
    }

    /// True iff the center distance is below the mean of the diameters
    pub fn overlaps(&self, other: &Bubble) -> bool {
        let min_distance = (self.diameter + other.diameter) / 2.0;
        self.pos.distance(other.pos) < min_distance
    }

    /// True iff the full circle lies within the playfield
    pub fn is_in_bounds(&self, bounds: &Rect) -> bool {
        bounds.contains_circle(self.pos, self.radius())
    }
}

/// Change notification emitted by the round; drained by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundEvent {
    PhaseChanged(RoundPhase),
    /// Countdown ticked down during Starting
    Countdown(u32),
    /// A bubble was popped and points awarded
    Popped {
        id: u32,
        tier: ColorTier,
        awarded: u32,
        combo: u32,
    },
    /// One second of play elapsed
    SecondElapsed { remaining: u32 },
    /// The round ended with this final score
    Finished { score: u32 },
}

/// One play session from countdown to finish
pub struct Round {
    pub settings: RoundSettings,
    pub phase: RoundPhase,
    pub score: u32,
    /// Whole seconds left while Playing; non-increasing
    pub time_remaining: u32,
    /// Seconds shown during Starting
    pub countdown: u32,
    /// Consecutive pops of the same tier
    pub combo: u32,
    pub last_popped: Option<ColorTier>,
    /// Motion/spawn multiplier in [1.0, 3.0], ramped over the round
    pub difficulty: f32,
    pub bubbles: Vec<Bubble>,
    pub bounds: Rect,
    /// Best score known to the sink, refreshed after every finish
    pub highest_score: u32,
    pub(crate) rng: Pcg32,
    pub(crate) sink: Box<dyn ScoreSink>,
    pub(crate) events: Vec<RoundEvent>,
    pub(crate) fine_acc: f32,
    pub(crate) ticks_into_second: u32,
    next_id: u32,
}

impl Round {
    /// Create a round in Setup with the given seed for reproducibility
    pub fn new(settings: RoundSettings, sink: Box<dyn ScoreSink>, seed: u64) -> Self {
        let time_remaining = settings.round_secs;
        let highest_score = sink.highest();
        Self {
            settings,
            phase: RoundPhase::Setup,
            score: 0,
            time_remaining,
            countdown: 0,
            combo: 0,
            last_popped: None,
            difficulty: DIFFICULTY_MIN,
            bubbles: Vec::new(),
            bounds: Rect::ZERO,
            highest_score,
            rng: Pcg32::seed_from_u64(seed),
            sink,
            events: Vec::new(),
            fine_acc: 0.0,
            ticks_into_second: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Begin a round: Setup -> Starting with the countdown armed.
    ///
    /// Returns false (and stays in Setup) if the settings are invalid.
    pub fn start(&mut self) -> bool {
        if !self.settings.is_valid() {
            log::warn!("cannot start round: settings need setup");
            self.set_phase(RoundPhase::Setup);
            return false;
        }

        self.clear_session();
        self.countdown = COUNTDOWN_SECS;
        self.set_phase(RoundPhase::Starting);
        self.events.push(RoundEvent::Countdown(self.countdown));
        log::info!(
            "round starting for '{}' ({}s, up to {} bubbles)",
            self.settings.player_name,
            self.settings.round_secs,
            self.settings.max_bubbles
        );
        true
    }

    /// Freeze the round; ticks stop until `resume`
    pub fn pause(&mut self) {
        if self.phase == RoundPhase::Playing {
            self.fine_acc = 0.0;
            self.set_phase(RoundPhase::Paused);
        }
    }

    /// Continue a paused round without resetting anything
    pub fn resume(&mut self) {
        if self.phase == RoundPhase::Paused {
            self.set_phase(RoundPhase::Playing);
        }
    }

    /// Return to Setup from any phase, discarding all session state
    pub fn reset(&mut self) {
        self.clear_session();
        self.set_phase(RoundPhase::Setup);
    }

    /// Pop a bubble by id. Unknown or already-popped ids are silent no-ops;
    /// the UI and the grace-period removal may race harmlessly.
    pub fn pop(&mut self, id: u32) {
        let Some(bubble) = self.bubbles.iter_mut().find(|b| b.id == id) else {
            return;
        };
        if bubble.popped {
            return;
        }

        bubble.popped = true;
        bubble.grace_ticks = POP_GRACE_TICKS;
        let tier = bubble.tier;
        let base = tier.points();

        let awarded = if self.last_popped == Some(tier) {
            self.combo += 1;
            (base as f32 * COMBO_MULTIPLIER).round() as u32
        } else {
            self.combo = 1;
            base
        };

        self.score += awarded;
        self.last_popped = Some(tier);
        self.events.push(RoundEvent::Popped {
            id,
            tier,
            awarded,
            combo: self.combo,
        });
    }

    /// Report the current playfield rectangle. Callable at any time and
    /// idempotent; existing bubbles are re-clamped immediately.
    pub fn update_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        if bounds.is_empty() {
            return;
        }
        for bubble in &mut self.bubbles {
            bubble.pos = bounds.clamp_circle(bubble.pos, bubble.radius());
        }
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// The score sink collaborator (leaderboard)
    pub fn scores(&self) -> &dyn ScoreSink {
        self.sink.as_ref()
    }

    /// Remaining time as MM:SS
    pub fn formatted_time(&self) -> String {
        format!("{:02}:{:02}", self.time_remaining / 60, self.time_remaining % 60)
    }

    /// Build the final score record and hand it to the sink. Called once
    /// per finished round by the lifecycle tick.
    pub(crate) fn submit_score(&mut self) {
        let record = ScoreRecord {
            player_name: self.settings.player_name.clone(),
            score: self.score,
            timestamp_ms: highscores::now_ms(),
        };
        self.sink.save(record);
        self.highest_score = self.sink.highest();
    }

    pub(crate) fn set_phase(&mut self, phase: RoundPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.push(RoundEvent::PhaseChanged(phase));
        }
    }

    fn clear_session(&mut self) {
        self.score = 0;
        self.time_remaining = self.settings.round_secs;
        self.bubbles.clear();
        self.last_popped = None;
        self.combo = 0;
        self.difficulty = DIFFICULTY_MIN;
        self.countdown = 0;
        self.fine_acc = 0.0;
        self.ticks_into_second = 0;
    }
}
