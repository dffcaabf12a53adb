//! 256-unit angle helpers
//!
//! A full turn is 256 units: 0 = right, 64 = down (screen Y grows downward),
//! 128 = left, 192 = up. Slope-following and flying bob both use this
//! quantization so trajectories match the reference engine.

use glam::Vec2;
use std::f64::consts::TAU;

/// Units in one full turn
pub const ANGLE_UNITS: f32 = 256.0;

/// Cosine of an angle given in 256-units
pub fn cos256(angle: f32) -> f32 {
    (angle as f64 * TAU / ANGLE_UNITS as f64).cos() as f32
}

/// Sine of an angle given in 256-units
pub fn sin256(angle: f32) -> f32 {
    (angle as f64 * TAU / ANGLE_UNITS as f64).sin() as f32
}

/// Direction from `from` to `to`, truncated to whole 256-units in `0..256`
///
/// Coincident points have no direction and yield 0.
pub fn angle256(from: Vec2, to: Vec2) -> i32 {
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    if dx == 0.0 && dy == 0.0 {
        return 0;
    }

    // Truncation toward zero matches the integer cast of the reference engine
    let mut angle = (dy.atan2(dx) * ANGLE_UNITS as f64 / TAU) as i32;
    if angle < 0 {
        angle += 256;
    }
    angle % 256
}
