//! Analytic time-to-event predictors
//!
//! Every function here is a pure function of current kinematic state and
//! returns the non-negative time until the event, or [`NEVER`] when no such
//! future event is possible. Times are exact under straight-line motion,
//! which holds by construction between processed events.
//!
//! Numeric edge cases (zero relative speed, negative discriminant, spurious
//! non-positive roots from rounding) all resolve to [`NEVER`] locally; none
//! of them is an error.

use crate::sim::ball::Ball;
use crate::sim::paddle::Paddle;

/// Sentinel for "no future collision of this kind".
pub const NEVER: f32 = f32::INFINITY;

/// Time until two balls come into contact.
pub fn time_to_hit_ball(a: &Ball, b: &Ball) -> f32 {
    if std::ptr::eq(a, b) {
        return NEVER;
    }
    let dr = b.pos - a.pos;
    let dv = b.vel - a.vel;
    let dvdr = dr.dot(dv);
    if dvdr > 0.0 {
        // Separating
        return NEVER;
    }
    let dvdv = dv.dot(dv);
    if dvdv == 0.0 {
        return NEVER;
    }
    let drdr = dr.dot(dr);
    let sigma = a.radius() + b.radius();
    let d = dvdr * dvdr - dvdv * (drdr - sigma * sigma);
    if d < 0.0 {
        // Trajectories pass without touching
        return NEVER;
    }
    let t = -(dvdr + d.sqrt()) / dvdv;
    // Rounding near dvdv ~ 0 can produce a non-positive root
    if t <= 0.0 { NEVER } else { t }
}

/// Time until the ball is fully past the left or right scoring boundary.
pub fn time_to_leave_border(ball: &Ball, half_width: f32) -> f32 {
    if ball.vel.x > 0.0 {
        (half_width - ball.pos.x + ball.radius()) / ball.vel.x
    } else if ball.vel.x < 0.0 {
        (half_width + ball.pos.x + ball.radius()) / -ball.vel.x
    } else {
        NEVER
    }
}

/// Time until the ball's edge touches the top or bottom wall.
pub fn time_to_hit_horizontal_wall(ball: &Ball, half_height: f32) -> f32 {
    if ball.vel.y > 0.0 {
        (half_height - ball.pos.y - ball.radius()) / ball.vel.y
    } else if ball.vel.y < 0.0 {
        (half_height + ball.pos.y - ball.radius()) / -ball.vel.y
    } else {
        NEVER
    }
}

/// Time until the ball hits one of the paddle's narrow faces (local x axis).
///
/// The paddle may be tilted, so the check runs in its local frame: reject
/// when the ball moves away from (or already overlaps) the approach face,
/// compute the time to the face plane, then require that the ball's local y
/// at that time still falls within the paddle extent plus its own radius.
pub fn time_to_hit_paddle_horizontal(ball: &Ball, paddle: &Paddle) -> f32 {
    let local_pos = paddle.to_local(ball.pos);
    let local_vel = paddle.vel_to_local(ball.vel);
    let r = ball.radius();

    if local_vel.x > 0.0 && local_pos.x + r > paddle.pos.x - paddle.half_width() {
        return NEVER;
    }
    if local_vel.x < 0.0 && local_pos.x - r < paddle.pos.x + paddle.half_width() {
        return NEVER;
    }
    if local_vel.x == 0.0 {
        return NEVER;
    }

    let dt = ((paddle.pos.x - local_pos.x).abs() - r - paddle.half_width()) / local_vel.x.abs();
    if dt <= 0.0 {
        return NEVER;
    }

    let y_at_hit = local_pos.y + local_vel.y * dt;
    let lo = paddle.pos.y - paddle.half_height() - r;
    let hi = paddle.pos.y + paddle.half_height() + r;
    if (lo..=hi).contains(&y_at_hit) { dt } else { NEVER }
}

/// Time until the ball hits one of the paddle's long faces (local y axis).
pub fn time_to_hit_paddle_vertical(ball: &Ball, paddle: &Paddle) -> f32 {
    let local_pos = paddle.to_local(ball.pos);
    let local_vel = paddle.vel_to_local(ball.vel);
    let r = ball.radius();

    if local_vel.y > 0.0 && local_pos.y + r > paddle.pos.y - paddle.half_height() {
        return NEVER;
    }
    if local_vel.y < 0.0 && local_pos.y - r < paddle.pos.y + paddle.half_height() {
        return NEVER;
    }
    if local_vel.y == 0.0 {
        return NEVER;
    }

    let dt = ((paddle.pos.y - local_pos.y).abs() - r - paddle.half_height()) / local_vel.y.abs();
    if dt <= 0.0 {
        return NEVER;
    }

    let x_at_hit = local_pos.x + local_vel.x * dt;
    let lo = paddle.pos.x - paddle.half_width() - r;
    let hi = paddle.pos.x + paddle.half_width() + r;
    if (lo..=hi).contains(&x_at_hit) { dt } else { NEVER }
}
