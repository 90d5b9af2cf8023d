//! Collision response for screen-bounded circles
//!
//! Pure math shared by the spawner and the integrator: wall bounce with the
//! asymmetric bottom damping, and equal-mass elastic resolution between
//! circle pairs.

use glam::Vec2;

use super::state::Rect;
use crate::consts::*;

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Resolve wall contact for a circle that just moved to `pos`.
///
/// Left/right edges clamp and negate x undamped. The bottom edge bounces
/// with the y-velocity damped by 5% and a small margin to avoid boundary
/// jitter. The top edge only clamps. The returned position is always fully
/// inside `bounds`.
pub fn resolve_walls(pos: Vec2, vel: Vec2, radius: f32, bounds: &Rect) -> (Vec2, Vec2) {
    let mut pos = pos;
    let mut vel = vel;

    if pos.x - radius < bounds.left() {
        pos.x = bounds.left() + radius;
        vel.x = -vel.x;
    } else if pos.x + radius > bounds.right() {
        pos.x = bounds.right() - radius;
        vel.x = -vel.x;
    }

    if pos.y + radius > bounds.bottom() {
        pos.y = bounds.bottom() - radius - BOTTOM_BOUNCE_MARGIN;
        vel.y = -vel.y * BOTTOM_BOUNCE_DAMPING;
    }

    // Redundant clamp to handle floating-point drift and the top edge
    (bounds.clamp_circle(pos, radius), vel)
}

/// Outcome of an elastic circle-circle resolution
#[derive(Debug, Clone, Copy)]
pub struct PairResolution {
    pub pos_a: Vec2,
    pub vel_a: Vec2,
    pub pos_b: Vec2,
    pub vel_b: Vec2,
}

/// Resolve a pair of equal-mass circles if they interpenetrate.
///
/// Both centers are pushed apart along the collision normal by half the
/// penetration depth, then each velocity is reflected about the normal.
/// Returns `None` when the circles are apart or exactly coincident (no
/// usable normal).
pub fn resolve_pair(
    pos_a: Vec2,
    vel_a: Vec2,
    radius_a: f32,
    pos_b: Vec2,
    vel_b: Vec2,
    radius_b: f32,
) -> Option<PairResolution> {
    let delta = pos_a - pos_b;
    let distance = delta.length();
    let min_distance = radius_a + radius_b;

    if distance >= min_distance || distance == 0.0 {
        return None;
    }

    let normal = delta / distance;
    let half_overlap = (min_distance - distance) / 2.0;

    Some(PairResolution {
        pos_a: pos_a + normal * half_overlap,
        vel_a: reflect(vel_a, normal),
        pos_b: pos_b - normal * half_overlap,
        vel_b: reflect(vel_b, normal),
    })
}
