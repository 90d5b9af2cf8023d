//! Once-per-second bubble churn
//!
//! Evicts a random subset of the field, then replenishes toward a random
//! target count. Placement respects bounds and non-overlap for a bounded
//! number of attempts, then degrades to a smaller bubble rather than
//! stalling the round.

use glam::Vec2;
use rand::Rng;
use rand::seq::index;
use rand_pcg::Pcg32;

use super::state::{Bubble, ColorTier, Rect, Round};
use crate::consts::*;

/// Refresh the field for one churn interval. No-op while the playfield
/// rectangle is unknown or degenerate.
pub fn refresh(round: &mut Round) {
    if round.bounds.is_empty() {
        return;
    }

    // Attrition: turnover so the field doesn't stagnate
    if !round.bubbles.is_empty() {
        let count = round.bubbles.len();
        let removal = round.rng.random_range(1..=(count / 2).max(1));
        let mut doomed = index::sample(&mut round.rng, count, removal).into_vec();
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for idx in doomed {
            round.bubbles.remove(idx);
        }
    }

    // Replenish toward a random target, never past the cap
    let target = round.rng.random_range(1..=round.settings.max_bubbles);
    let needed = target.saturating_sub(round.bubbles.len());
    for _ in 0..needed {
        if let Some(bubble) = place_bubble(round) {
            round.bubbles.push(bubble);
        }
    }

    // Defensive re-clamp; handles bounds changes between churn intervals
    let bounds = round.bounds;
    for bubble in &mut round.bubbles {
        bubble.pos = bounds.clamp_circle(bubble.pos, bubble.radius());
    }
}

/// Try to place one bubble: jittered diameter at a random in-bounds spot
/// that overlaps nothing. When the retry budget runs out, fall back to a
/// reduced-diameter bubble and accept it without another overlap check.
fn place_bubble(round: &mut Round) -> Option<Bubble> {
    for _ in 0..SPAWN_RETRY_BUDGET {
        let diameter = BUBBLE_BASE_DIAMETER
            + round
                .rng
                .random_range(-BUBBLE_SIZE_JITTER..=BUBBLE_SIZE_JITTER);
        let pos = sample_position(&mut round.rng, &round.bounds, diameter)?;

        let candidate = Bubble::new(0, pos, diameter, ColorTier::Red);
        if round.bubbles.iter().any(|b| b.overlaps(&candidate)) {
            continue;
        }
        return Some(build_bubble(round, pos, diameter));
    }

    let diameter = BUBBLE_BASE_DIAMETER * FALLBACK_DIAMETER_SCALE;
    let pos = sample_position(&mut round.rng, &round.bounds, diameter)?;
    log::debug!("placement retries exhausted, accepting reduced bubble");
    Some(build_bubble(round, pos, diameter))
}

fn build_bubble(round: &mut Round, pos: Vec2, diameter: f32) -> Bubble {
    let id = round.next_entity_id();
    let tier = ColorTier::sample(&mut round.rng);
    let mut bubble = Bubble::new(id, pos, diameter, tier);

    // Spawn speed scales with the current difficulty
    let speed = SPAWN_SPEED_RANGE * round.difficulty;
    bubble.vel = Vec2::new(
        round.rng.random_range(-speed..=speed),
        round.rng.random_range(-speed..=speed),
    );
    bubble
}

/// Sample a position keeping the full circle in bounds with edge padding.
/// Returns `None` when the field is too small to hold the bubble at all.
fn sample_position(rng: &mut Pcg32, bounds: &Rect, diameter: f32) -> Option<Vec2> {
    let radius = diameter / 2.0;
    let min_x = bounds.left() + radius + SPAWN_EDGE_PADDING;
    let max_x = bounds.right() - radius - SPAWN_EDGE_PADDING;
    let min_y = bounds.top() + radius + SPAWN_EDGE_PADDING;
    let max_y = bounds.bottom() - radius - SPAWN_EDGE_PADDING;

    if max_x <= min_x || max_y <= min_y {
        return None;
    }
    Some(Vec2::new(
        rng.random_range(min_x..=max_x),
        rng.random_range(min_y..=max_y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::ScoreBoard;
    use crate::settings::RoundSettings;

    fn churn_round(seed: u64) -> Round {
        let settings = RoundSettings {
            player_name: "tester".into(),
            round_secs: 30,
            max_bubbles: 10,
        };
        let mut round = Round::new(settings, Box::new(ScoreBoard::new()), seed);
        round.update_bounds(Rect::new(0.0, 0.0, 400.0, 600.0));
        round
    }

    fn assert_field_invariants(round: &Round) {
        assert!(round.bubbles.len() <= round.settings.max_bubbles);
        for b in &round.bubbles {
            assert!(
                b.is_in_bounds(&round.bounds),
                "bubble {} out of bounds at {:?}",
                b.id,
                b.pos
            );
        }
    }

    #[test]
    fn test_refresh_populates_empty_field() {
        let mut round = churn_round(11);
        refresh(&mut round);

        assert!(!round.bubbles.is_empty());
        assert_field_invariants(&round);
    }

    #[test]
    fn test_placed_bubbles_do_not_overlap() {
        // Generous field and few bubbles, so retries always succeed and the
        // fallback path never runs
        let mut round = churn_round(12);
        round.update_bounds(Rect::new(0.0, 0.0, 1200.0, 1200.0));
        refresh(&mut round);

        for (i, a) in round.bubbles.iter().enumerate() {
            for b in round.bubbles.iter().skip(i + 1) {
                let min_distance = (a.diameter + b.diameter) / 2.0;
                assert!(
                    a.pos.distance(b.pos) >= min_distance,
                    "bubbles {} and {} overlap",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn test_cap_holds_over_repeated_churn() {
        let mut round = churn_round(13);
        for _ in 0..25 {
            refresh(&mut round);
            assert_field_invariants(&round);
        }
    }

    #[test]
    fn test_attrition_changes_the_field() {
        let mut round = churn_round(14);
        refresh(&mut round);
        let before: Vec<u32> = round.bubbles.iter().map(|b| b.id).collect();

        refresh(&mut round);
        let after: Vec<u32> = round.bubbles.iter().map(|b| b.id).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_spawn_velocity_tracks_difficulty() {
        let mut round = churn_round(15);
        round.difficulty = 3.0;
        refresh(&mut round);

        let limit = SPAWN_SPEED_RANGE * 3.0;
        for b in &round.bubbles {
            assert!(b.vel.x.abs() <= limit);
            assert!(b.vel.y.abs() <= limit);
        }
    }

    #[test]
    fn test_empty_bounds_spawns_nothing() {
        let mut round = churn_round(16);
        round.update_bounds(Rect::ZERO);
        refresh(&mut round);
        assert!(round.bubbles.is_empty());
    }

    #[test]
    fn test_field_too_small_for_any_bubble() {
        let mut round = churn_round(17);
        round.update_bounds(Rect::new(0.0, 0.0, 30.0, 30.0));
        refresh(&mut round);
        assert!(round.bubbles.is_empty());
    }
}
