//! Tilt Pong - a two-player paddle game on a discrete-event collision engine
//!
//! Core modules:
//! - `sim`: Event-driven simulation (bodies, predictors, event queue, scheduler)
//! - `config`: Session parameters loaded from JSON
//!
//! Unlike a fixed-timestep loop, the simulation clock jumps straight to the
//! next predicted occurrence: a ball-ball collision, a wall bounce, a paddle
//! hit, a scoring-boundary crossing, or the periodic redraw tick. Predictors
//! are exact under straight-line motion, which always holds because bodies
//! only move in straight lines between events.

pub mod config;
pub mod sim;

pub use config::SessionConfig;
pub use sim::{Side, Simulation, StepOutcome};

use glam::Vec2;

/// Rotate a point around a pivot by `angle_rad` (counter-clockwise).
#[inline]
pub fn rotate_around_pivot(point: Vec2, pivot: Vec2, angle_rad: f32) -> Vec2 {
    pivot + Vec2::from_angle(angle_rad).rotate(point - pivot)
}

/// Rotate a free vector (velocity, direction) by `angle_rad`.
#[inline]
pub fn rotate_vec(v: Vec2, angle_rad: f32) -> Vec2 {
    Vec2::from_angle(angle_rad).rotate(v)
}
