//! Fixed timestep round driver
//!
//! Converts wall-clock deltas into fixed 60 Hz steps. Every step runs the
//! integrator (while Playing) and the grace-period bookkeeping; every 60th
//! step runs the one-second lifecycle tick: countdown during Starting, or
//! clock + difficulty ramp + spawner churn during Playing.

use super::state::{Round, RoundEvent, RoundPhase};
use super::{motion, spawner};
use crate::consts::*;

/// Advance the round by a wall-clock delta. Only Starting and Playing
/// consume time; the other phases hold still until a lifecycle call.
pub fn advance(round: &mut Round, dt: f32) {
    if !matches!(round.phase, RoundPhase::Starting | RoundPhase::Playing) {
        return;
    }

    // Large hitches are clamped so the sim never spirals
    round.fine_acc += dt.min(0.1);

    let mut substeps = 0;
    while round.fine_acc >= SIM_DT && substeps < MAX_SUBSTEPS {
        round.fine_acc -= SIM_DT;
        substeps += 1;

        match round.phase {
            RoundPhase::Starting => {
                round.ticks_into_second += 1;
                if round.ticks_into_second >= TICKS_PER_SECOND {
                    round.ticks_into_second = 0;
                    countdown_tick(round);
                }
            }
            RoundPhase::Playing => {
                frame_tick(round, SIM_DT);
                round.ticks_into_second += 1;
                if round.ticks_into_second >= TICKS_PER_SECOND {
                    round.ticks_into_second = 0;
                    second_tick(round);
                }
            }
            // A tick above may have finished or reset the round
            _ => break,
        }
    }
}

/// One second of the pre-round countdown
fn countdown_tick(round: &mut Round) {
    round.countdown = round.countdown.saturating_sub(1);
    round.events.push(RoundEvent::Countdown(round.countdown));
    if round.countdown == 0 {
        begin_playing(round);
    }
}

/// Countdown expired: arm the clock and seed the field
fn begin_playing(round: &mut Round) {
    round.score = 0;
    round.time_remaining = round.settings.round_secs;
    round.difficulty = DIFFICULTY_MIN;
    round.ticks_into_second = 0;
    round.fine_acc = 0.0;
    round.set_phase(RoundPhase::Playing);
    spawner::refresh(round);
    log::info!("round live: {}s on the clock", round.time_remaining);
}

/// One 60 Hz step while Playing
fn frame_tick(round: &mut Round, dt: f32) {
    // Grace-period bookkeeping before physics, so an expiring bubble never
    // participates in this tick
    for bubble in &mut round.bubbles {
        if bubble.popped && bubble.grace_ticks > 0 {
            bubble.grace_ticks -= 1;
        }
    }
    round.bubbles.retain(|b| !(b.popped && b.grace_ticks == 0));

    // One difficulty snapshot shared by every bubble this tick
    let speed_factor = round.difficulty;
    let bounds = round.bounds;
    motion::step(&mut round.bubbles, &bounds, dt, speed_factor, &mut round.rng);
}

/// One second of play: clock, difficulty ramp, finish check, churn
fn second_tick(round: &mut Round) {
    round.time_remaining = round.time_remaining.saturating_sub(1);

    let total = round.settings.round_secs as f32;
    let elapsed = (round.settings.round_secs - round.time_remaining) as f32;
    round.difficulty = (DIFFICULTY_MIN + elapsed / total * DIFFICULTY_RAMP).min(DIFFICULTY_MAX);

    round.events.push(RoundEvent::SecondElapsed {
        remaining: round.time_remaining,
    });

    if round.time_remaining == 0 {
        finish(round);
    } else {
        spawner::refresh(round);
    }
}

/// Clock ran out: hand the score to the sink, exactly once per round
fn finish(round: &mut Round) {
    round.set_phase(RoundPhase::Finished);
    round.submit_score();
    round.events.push(RoundEvent::Finished { score: round.score });
    log::info!(
        "round finished: '{}' scored {}",
        round.settings.player_name,
        round.score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::ScoreBoard;
    use crate::settings::RoundSettings;
    use crate::sim::state::{Bubble, ColorTier, Rect};
    use glam::Vec2;

    fn round_with(round_secs: u32, seed: u64) -> Round {
        let settings = RoundSettings {
            player_name: "tester".into(),
            round_secs,
            max_bubbles: 8,
        };
        let mut round = Round::new(settings, Box::new(ScoreBoard::new()), seed);
        round.update_bounds(Rect::new(0.0, 0.0, 400.0, 600.0));
        round
    }

    fn run_seconds(round: &mut Round, secs: u32) {
        for _ in 0..secs * TICKS_PER_SECOND {
            advance(round, SIM_DT);
        }
    }

    #[test]
    fn test_start_reaches_playing_within_countdown() {
        let mut round = round_with(10, 21);
        assert!(round.start());
        assert_eq!(round.phase, RoundPhase::Starting);
        assert_eq!(round.countdown, 3);

        run_seconds(&mut round, 3);
        assert_eq!(round.phase, RoundPhase::Playing);
        assert_eq!(round.time_remaining, 10);
        // The initial churn seeded the field
        assert!(!round.bubbles.is_empty());
    }

    #[test]
    fn test_countdown_events_step_down() {
        let mut round = round_with(10, 22);
        round.start();
        run_seconds(&mut round, 3);

        let events = round.drain_events();
        let countdowns: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::Countdown(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(countdowns, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_round_finishes_with_exactly_one_record() {
        let mut round = round_with(3, 23);
        round.start();
        run_seconds(&mut round, 3); // countdown
        run_seconds(&mut round, 3); // play to zero

        assert_eq!(round.phase, RoundPhase::Finished);
        assert_eq!(round.time_remaining, 0);
        assert_eq!(round.scores().all().len(), 1);

        // Extra time changes nothing once finished
        run_seconds(&mut round, 5);
        assert_eq!(round.scores().all().len(), 1);

        let finished: Vec<_> = round
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, RoundEvent::Finished { .. }))
            .collect();
        assert_eq!(finished.len(), 1);
    }

    #[test]
    fn test_difficulty_ramps_monotonically_within_bounds() {
        let mut round = round_with(10, 24);
        round.start();
        run_seconds(&mut round, 3);

        let mut last = round.difficulty;
        assert_eq!(last, DIFFICULTY_MIN);
        while round.phase == RoundPhase::Playing {
            run_seconds(&mut round, 1);
            assert!(round.difficulty >= last);
            assert!((DIFFICULTY_MIN..=DIFFICULTY_MAX).contains(&round.difficulty));
            last = round.difficulty;
        }
        assert_eq!(round.difficulty, DIFFICULTY_MAX);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut round = round_with(10, 25);
        round.start();
        run_seconds(&mut round, 4); // countdown + 1s of play
        assert_eq!(round.time_remaining, 9);

        round.pause();
        assert_eq!(round.phase, RoundPhase::Paused);
        let frozen: Vec<Vec2> = round.bubbles.iter().map(|b| b.pos).collect();

        run_seconds(&mut round, 5);
        assert_eq!(round.time_remaining, 9);
        let still: Vec<Vec2> = round.bubbles.iter().map(|b| b.pos).collect();
        assert_eq!(frozen, still);

        round.resume();
        run_seconds(&mut round, 1);
        assert_eq!(round.time_remaining, 8);
    }

    #[test]
    fn test_popped_bubble_removed_after_grace() {
        let mut round = round_with(10, 26);
        round.start();
        run_seconds(&mut round, 3);

        let id = {
            let id = round.next_entity_id();
            round
                .bubbles
                .push(Bubble::new(id, Vec2::new(200.0, 300.0), 50.0, ColorTier::Blue));
            id
        };
        round.pop(id);
        assert!(round.bubbles.iter().any(|b| b.id == id && b.popped));

        // Still lingering one tick before the grace period ends
        for _ in 0..POP_GRACE_TICKS - 1 {
            advance(&mut round, SIM_DT);
        }
        assert!(round.bubbles.iter().any(|b| b.id == id));

        advance(&mut round, SIM_DT);
        assert!(!round.bubbles.iter().any(|b| b.id == id));
    }

    #[test]
    fn test_unknown_bounds_round_still_completes() {
        let settings = RoundSettings {
            player_name: "tester".into(),
            round_secs: 2,
            max_bubbles: 8,
        };
        let mut round = Round::new(settings, Box::new(ScoreBoard::new()), 27);
        // No bounds reported at all
        round.start();
        run_seconds(&mut round, 5);

        assert_eq!(round.phase, RoundPhase::Finished);
        assert!(round.bubbles.is_empty());
        assert_eq!(round.score, 0);
        assert_eq!(round.scores().all().len(), 1);
    }

    #[test]
    fn test_same_seed_same_field() {
        let mut a = round_with(10, 99);
        let mut b = round_with(10, 99);
        a.start();
        b.start();
        run_seconds(&mut a, 8);
        run_seconds(&mut b, 8);

        let field_a: Vec<(u32, Vec2)> = a.bubbles.iter().map(|x| (x.id, x.pos)).collect();
        let field_b: Vec<(u32, Vec2)> = b.bubbles.iter().map(|x| (x.id, x.pos)).collect();
        assert_eq!(field_a, field_b);
        assert_eq!(a.difficulty, b.difficulty);
    }

    #[test]
    fn test_reset_mid_round_cancels_everything() {
        let mut round = round_with(10, 28);
        round.start();
        run_seconds(&mut round, 5);
        if let Some(id) = round.bubbles.first().map(|b| b.id) {
            round.pop(id);
        }

        round.reset();
        assert_eq!(round.phase, RoundPhase::Setup);
        assert!(round.bubbles.is_empty());

        // Time no longer flows, and no stale removal ever fires
        run_seconds(&mut round, 3);
        assert_eq!(round.phase, RoundPhase::Setup);
        assert_eq!(round.score, 0);
    }
}
