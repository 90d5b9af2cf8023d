//! Per-frame motion integration
//!
//! Advances every active bubble by one fixed timestep: scaled displacement,
//! wall bounce, pairwise elastic resolution, then a rare velocity
//! perturbation. Popped bubbles sit out their grace period untouched.

use rand::Rng;
use rand_pcg::Pcg32;

use super::collision;
use super::state::{Bubble, Rect};
use crate::consts::*;

/// Integrate one tick. `speed_factor` is the difficulty snapshot for this
/// tick; it scales displacement only, never the stored velocity. Wall
/// resolution runs to completion before any pair is resolved.
pub fn step(bubbles: &mut [Bubble], bounds: &Rect, dt: f32, speed_factor: f32, rng: &mut Pcg32) {
    if bounds.is_empty() {
        return;
    }

    // Wall pass: integrate forward and bounce off edges
    for bubble in bubbles.iter_mut().filter(|b| b.is_active()) {
        let displaced = bubble.pos + bubble.vel * speed_factor * dt;
        let (pos, vel) = collision::resolve_walls(displaced, bubble.vel, bubble.radius(), bounds);
        bubble.pos = pos;
        bubble.vel = vel;
    }

    // Pair pass over unordered active pairs
    for i in 0..bubbles.len() {
        if !bubbles[i].is_active() {
            continue;
        }
        for j in (i + 1)..bubbles.len() {
            if !bubbles[j].is_active() {
                continue;
            }
            let (a, b) = (bubbles[i], bubbles[j]);
            if let Some(hit) =
                collision::resolve_pair(a.pos, a.vel, a.radius(), b.pos, b.vel, b.radius())
            {
                bubbles[i].pos = hit.pos_a;
                bubbles[i].vel = hit.vel_a;
                bubbles[j].pos = hit.pos_b;
                bubbles[j].vel = hit.vel_b;
            }
        }
    }

    // Rare sign flips keep long-run motion from settling into fixed orbits
    for bubble in bubbles.iter_mut().filter(|b| b.is_active()) {
        if rng.random_range(0..DIRECTION_FLIP_ODDS) == 0 {
            bubble.vel.x = -bubble.vel.x;
        }
        if rng.random_range(0..DIRECTION_FLIP_ODDS) == 0 {
            bubble.vel.y = -bubble.vel.y;
        }
    }

    // Defensive re-clamp; pair separation near an edge can push outward
    for bubble in bubbles.iter_mut() {
        bubble.pos = bounds.clamp_circle(bubble.pos, bubble.radius());
    }
}
