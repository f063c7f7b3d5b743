//! Session configuration
//!
//! All tunables are fixed for the lifetime of a session. Loaded from a JSON
//! file when one is given, otherwise defaults apply.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session parameters consumed at simulation construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of balls in play
    pub num_balls: usize,
    /// Arena half-width (scoring boundaries at ±half_width)
    pub half_width: f32,
    /// Arena half-height (bounce walls at ±half_height)
    pub half_height: f32,
    /// Ball radius drawn uniformly from [min, max] on every respawn
    pub ball_radius_range: [f32; 2],
    /// Speed given to a ball on respawn; also scales the paddle kick
    pub base_ball_speed: f32,
    /// Paddle width (the thin axis, facing the ball)
    pub paddle_width: f32,
    /// Paddle height (the long axis)
    pub paddle_height: f32,
    /// Horizontal distance of each paddle center from the arena center
    pub paddle_offset_x: f32,
    /// Maximum paddle tilt, degrees (unsigned; applied as ±)
    pub max_tilt_deg: f32,
    /// First player to reach this score wins
    pub winning_score: u32,
    /// Player names, left then right
    pub player_names: [String; 2],
    /// RNG seed for ball spawns
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_balls: 3,
            half_width: 1060.0,
            half_height: 540.0,
            ball_radius_range: [20.0, 40.0],
            base_ball_speed: 8.0,
            paddle_width: 10.0,
            paddle_height: 150.0,
            paddle_offset_x: 420.0,
            max_tilt_deg: 40.0,
            winning_score: 5,
            player_names: ["LEFT".into(), "RIGHT".into()],
            seed: 0x7017_b0b5,
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file, falling back to defaults on any failure.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded session config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("Bad session config in {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Cannot read {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Redraw rate for the session, Hz.
    ///
    /// Lowered for long player names: every on-screen character costs render
    /// time, so the tick slows down rather than letting redraws pile up.
    /// Computed once and held constant during play.
    pub fn refresh_hz(&self) -> f32 {
        let total_chars: usize = self.player_names.iter().map(|n| n.len()).sum();
        (5.0 - 0.1 * total_chars as f32).max(1.0)
    }

    /// Tick period between redraw events, seconds.
    pub fn tick_period(&self) -> f32 {
        1.0 / self.refresh_hz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_rate_drops_with_name_length() {
        let mut config = SessionConfig::default();
        config.player_names = ["AB".into(), "CD".into()];
        assert_eq!(config.refresh_hz(), 5.0 - 0.4);

        config.player_names = ["A_VERY_LONG_NAME_INDEED_YES".into(), "X".repeat(40)];
        assert_eq!(config.refresh_hz(), 1.0);
    }

    #[test]
    fn tick_period_is_reciprocal_of_rate() {
        let config = SessionConfig::default();
        let period = config.tick_period();
        assert!((period * config.refresh_hz() - 1.0).abs() < 1e-6);
    }
}
