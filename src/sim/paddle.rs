//! Paddle pose and the player-facing controller
//!
//! `Paddle` is pure geometry: a rotatable rectangle read by the collision
//! predictors and responses. `Controller` composes a paddle with target
//! values fed asynchronously by the input collaborator and smooths the pose
//! toward them once per simulation step.

use glam::Vec2;

use crate::{rotate_around_pivot, rotate_vec};

/// Interpolation factor applied per step when easing toward targets.
const POSE_SMOOTHING: f32 = 0.3;

/// A rotatable rectangle. Width and height never change after construction.
#[derive(Debug, Clone)]
pub struct Paddle {
    pub pos: Vec2,
    /// Signed tilt in degrees; zero means the long axis is vertical.
    pub angle_deg: f32,
    width: f32,
    height: f32,
}

impl Paddle {
    pub fn new(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            pos,
            angle_deg: 0.0,
            width,
            height,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// Map a world point into the paddle's unrotated local frame.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        rotate_around_pivot(point, self.pos, -self.angle_deg.to_radians())
    }

    /// Map a world velocity into the paddle's unrotated local frame.
    pub fn vel_to_local(&self, v: Vec2) -> Vec2 {
        rotate_vec(v, -self.angle_deg.to_radians())
    }
}

/// Smooths a paddle's pose toward externally supplied targets.
///
/// Input callbacks only ever touch the targets; the scheduler's per-event
/// call to [`Controller::advance`] is the sole place the pose moves, so pose
/// reads during prediction and response never race with input.
#[derive(Debug, Clone)]
pub struct Controller {
    paddle: Paddle,
    target_y: f32,
    target_tilt_deg: f32,
    max_tilt_deg: f32,
    /// Vertical travel per nudge
    move_step: f32,
    /// Nudges stop once the target passes this bound
    travel_limit: f32,
}

impl Controller {
    pub fn new(paddle: Paddle, max_tilt_deg: f32, arena_half_height: f32) -> Self {
        let move_step = paddle.height() * 0.8;
        let target_y = paddle.pos.y;
        Self {
            paddle,
            target_y,
            target_tilt_deg: 0.0,
            max_tilt_deg,
            move_step,
            travel_limit: arena_half_height / 2.0,
        }
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn target_tilt_deg(&self) -> f32 {
        self.target_tilt_deg
    }

    /// Move the position target one step up, while still inside the arena.
    pub fn nudge_up(&mut self) {
        if self.target_y < self.travel_limit {
            self.target_y += self.move_step;
        }
    }

    /// Move the position target one step down, while still inside the arena.
    pub fn nudge_down(&mut self) {
        if self.target_y > -self.travel_limit {
            self.target_y -= self.move_step;
        }
    }

    /// Hold clockwise tilt (key press).
    pub fn tilt_cw(&mut self) {
        self.target_tilt_deg = -self.max_tilt_deg;
    }

    /// Hold counter-clockwise tilt (key press).
    pub fn tilt_ccw(&mut self) {
        self.target_tilt_deg = self.max_tilt_deg;
    }

    /// Return to vertical (key release).
    pub fn level(&mut self) {
        self.target_tilt_deg = 0.0;
    }

    /// Set the position target directly (pointer-style input).
    pub fn set_target_y(&mut self, y: f32) {
        self.target_y = y.clamp(-self.travel_limit, self.travel_limit);
    }

    /// Set the tilt target directly, clamped to the configured maximum.
    pub fn set_target_tilt(&mut self, deg: f32) {
        self.target_tilt_deg = deg.clamp(-self.max_tilt_deg, self.max_tilt_deg);
    }

    /// Ease the pose toward the targets. Called once per processed event.
    pub fn advance(&mut self) {
        let dy = self.target_y - self.paddle.pos.y;
        self.paddle.pos.y += POSE_SMOOTHING * dy;

        let da = self.target_tilt_deg - self.paddle.angle_deg;
        self.paddle.angle_deg += POSE_SMOOTHING * da;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller() -> Controller {
        let paddle = Paddle::new(Vec2::new(-420.0, 0.0), 10.0, 150.0);
        Controller::new(paddle, 40.0, 540.0)
    }

    #[test]
    fn advance_converges_on_targets() {
        let mut c = controller();
        c.nudge_up();
        c.tilt_ccw();
        for _ in 0..64 {
            c.advance();
        }
        assert!((c.paddle().pos.y - c.target_y()).abs() < 1e-2);
        assert!((c.paddle().angle_deg - 40.0).abs() < 1e-2);
    }

    #[test]
    fn tilt_target_clamped_to_max() {
        let mut c = controller();
        c.set_target_tilt(95.0);
        assert_eq!(c.target_tilt_deg(), 40.0);
        c.set_target_tilt(-95.0);
        assert_eq!(c.target_tilt_deg(), -40.0);
    }

    #[test]
    fn nudges_stop_at_travel_limit() {
        let mut c = controller();
        for _ in 0..100 {
            c.nudge_up();
        }
        // One overshoot past the bound is allowed, then nudges become no-ops
        assert!(c.target_y() <= 270.0 + 120.0);
        let frozen = c.target_y();
        c.nudge_up();
        assert_eq!(c.target_y(), frozen);
    }

    #[test]
    fn local_frame_is_paddle_aligned() {
        let mut paddle = Paddle::new(Vec2::new(100.0, 50.0), 10.0, 150.0);
        paddle.angle_deg = 90.0;
        // A point directly to the paddle's world-right maps onto the local
        // negative y axis after undoing a 90° tilt
        let local = paddle.to_local(Vec2::new(130.0, 50.0));
        assert!((local.x - 100.0).abs() < 1e-3);
        assert!((local.y - 20.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn rotation_round_trip(
            px in -500.0f32..500.0, py in -500.0f32..500.0,
            cx in -500.0f32..500.0, cy in -500.0f32..500.0,
            deg in -180.0f32..180.0,
        ) {
            let point = Vec2::new(px, py);
            let pivot = Vec2::new(cx, cy);
            let rad = deg.to_radians();
            let back = rotate_around_pivot(rotate_around_pivot(point, pivot, rad), pivot, -rad);
            prop_assert!((back - point).length() < 1e-2);
        }
    }
}
