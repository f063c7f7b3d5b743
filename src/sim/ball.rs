//! Ball state and collision responses
//!
//! A ball is the only moving body in the simulation. Between events it
//! travels in a straight line; every response below changes its velocity and
//! bumps the collision count, which is what invalidates queued predictions
//! referencing it.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::rotate_vec;
use crate::sim::paddle::Paddle;

/// Extra speed added along the post-bounce heading after a paddle hit,
/// as a fraction of the base speed. Breaks up degenerate head-on rallies.
const PADDLE_KICK: f32 = 0.1;

/// A circular rigid body.
#[derive(Debug, Clone)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    radius: f32,
    mass: f32,
    /// Monotonic count of responses applied to this ball. Never reset, even
    /// on respawn: queued events snapshot it to detect staleness.
    count: u32,
    base_speed: f32,
    radius_range: [f32; 2],
}

impl Ball {
    /// Create a ball at the arena center with a random heading and radius.
    pub fn new(base_speed: f32, radius_range: [f32; 2], rng: &mut impl Rng) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: radius_range[0],
            mass: 0.0,
            count: 0,
            base_speed,
            radius_range,
        };
        ball.respawn(rng);
        ball
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Mass, always π·r² for the current radius.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Collision-count fingerprint used for event invalidation.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Advance along the current velocity for `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Response to contact with the top or bottom arena wall.
    pub fn bounce_off_horizontal_wall(&mut self) {
        self.vel.y = -self.vel.y;
        self.count += 1;
    }

    /// Two-body elastic collision impulse. Only called when the balls are
    /// geometrically in contact (center distance equals the radius sum).
    pub fn bounce_off_ball(&mut self, other: &mut Ball) {
        let dr = other.pos - self.pos;
        let dv = other.vel - self.vel;
        let dvdr = dr.dot(dv);
        // Center distance at contact
        let sigma = self.radius + other.radius;

        let magnitude =
            2.0 * self.mass * other.mass * dvdr / ((self.mass + other.mass) * sigma);
        let force = magnitude * dr / sigma;

        self.vel += force / self.mass;
        other.vel -= force / other.mass;

        self.count += 1;
        other.count += 1;
    }

    /// Response to hitting a (possibly tilted) paddle.
    ///
    /// Works in the paddle's unrotated local frame: whichever axis the ball
    /// penetrated least is the face it struck, so that local velocity
    /// component flips. The velocity then rotates back to world coordinates
    /// and gets a small kick along its new heading.
    pub fn bounce_off_paddle(&mut self, paddle: &Paddle) {
        let local_pos = paddle.to_local(self.pos);
        let mut local_vel = paddle.vel_to_local(self.vel);

        let dx = (local_pos.x - paddle.pos.x).abs() - self.radius - paddle.half_width();
        let dy = (local_pos.y - paddle.pos.y).abs() - self.radius - paddle.half_height();

        if dx > dy {
            local_vel.x = -local_vel.x;
        } else {
            local_vel.y = -local_vel.y;
        }

        self.vel = rotate_vec(local_vel, paddle.angle_deg.to_radians());

        let heading = self.vel.y.atan2(self.vel.x);
        self.vel += PADDLE_KICK * self.base_speed * Vec2::from_angle(heading);

        self.count += 1;
    }

    /// Deterministic constructor for tests.
    #[cfg(test)]
    pub(crate) fn from_state(pos: Vec2, vel: Vec2, radius: f32, base_speed: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            mass: PI * radius * radius,
            count: 0,
            base_speed,
            radius_range: [radius, radius],
        }
    }

    /// Reset to the arena center with a fresh random heading and radius.
    ///
    /// The count still bumps: any queued prediction for this ball refers to a
    /// trajectory that no longer exists.
    pub fn respawn(&mut self, rng: &mut impl Rng) {
        let angle = rng.random_range(0.0..TAU);
        self.pos = Vec2::ZERO;
        self.vel = self.base_speed * Vec2::from_angle(angle);
        self.radius = rng.random_range(self.radius_range[0]..=self.radius_range[1]);
        self.mass = PI * self.radius * self.radius;
        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn test_ball(pos: Vec2, vel: Vec2, radius: f32) -> Ball {
        Ball {
            pos,
            vel,
            radius,
            mass: PI * radius * radius,
            count: 0,
            base_speed: 8.0,
            radius_range: [20.0, 40.0],
        }
    }

    #[test]
    fn wall_bounce_flips_vy_and_bumps_count() {
        let mut ball = test_ball(Vec2::new(10.0, 500.0), Vec2::new(3.0, 7.0), 20.0);
        ball.bounce_off_horizontal_wall();
        assert_eq!(ball.vel, Vec2::new(3.0, -7.0));
        assert_eq!(ball.count(), 1);
    }

    #[test]
    fn head_on_equal_mass_collision_swaps_velocities() {
        // Two equal balls in contact, one moving, one at rest
        let mut a = test_ball(Vec2::ZERO, Vec2::new(5.0, 0.0), 20.0);
        let mut b = test_ball(Vec2::new(40.0, 0.0), Vec2::ZERO, 20.0);

        a.bounce_off_ball(&mut b);

        assert!((a.vel.x).abs() < 1e-4);
        assert!((b.vel.x - 5.0).abs() < 1e-4);
        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 1);
    }

    #[test]
    fn head_on_collision_conserves_kinetic_energy() {
        let mut a = test_ball(Vec2::ZERO, Vec2::new(5.0, 0.0), 20.0);
        let mut b = test_ball(Vec2::new(55.0, 0.0), Vec2::new(-2.0, 0.0), 35.0);

        let ke = |ball: &Ball| 0.5 * ball.mass() * ball.vel.length_squared();
        let before = ke(&a) + ke(&b);
        a.bounce_off_ball(&mut b);
        let after = ke(&a) + ke(&b);

        assert!((before - after).abs() / before < 1e-4);
    }

    #[test]
    fn respawn_invariants() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ball = test_ball(Vec2::new(300.0, -200.0), Vec2::new(9.0, 9.0), 25.0);
        let count_before = ball.count();

        ball.respawn(&mut rng);

        assert_eq!(ball.pos, Vec2::ZERO);
        assert!((ball.vel.length() - 8.0).abs() < 1e-4);
        assert!(ball.radius() >= 20.0 && ball.radius() <= 40.0);
        assert!((ball.mass() - PI * ball.radius() * ball.radius()).abs() < 1e-3);
        assert_eq!(ball.count(), count_before + 1);
    }

    #[test]
    fn paddle_bounce_reverses_approach_and_bumps_count() {
        use crate::sim::paddle::Paddle;
        // Upright paddle, ball arriving head-on from the left onto its face
        let paddle = Paddle::new(Vec2::new(420.0, 0.0), 10.0, 150.0);
        let mut ball = test_ball(Vec2::new(395.0, 0.0), Vec2::new(6.0, 0.0), 20.0);

        ball.bounce_off_paddle(&paddle);

        assert!(ball.vel.x < 0.0);
        assert!(ball.vel.length() > 6.0); // kick added
        assert_eq!(ball.count(), 1);
    }

    proptest! {
        #[test]
        fn ball_collision_conserves_momentum(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            avx in -50.0f32..50.0, avy in -50.0f32..50.0,
            bvx in -50.0f32..50.0, bvy in -50.0f32..50.0,
            ra in 5.0f32..40.0, rb in 5.0f32..40.0,
        ) {
            let mut a = test_ball(Vec2::new(ax, ay), Vec2::new(avx, avy), ra);
            // Place b in contact with a along an arbitrary-ish axis
            let mut b = test_ball(Vec2::new(ax + ra + rb, ay), Vec2::new(bvx, bvy), rb);

            let momentum = |a: &Ball, b: &Ball| a.mass() * a.vel + b.mass() * b.vel;
            let before = momentum(&a, &b);
            a.bounce_off_ball(&mut b);
            let after = momentum(&a, &b);

            let scale = before.length().max(1.0);
            prop_assert!((before - after).length() / scale < 1e-3);
        }
    }
}
