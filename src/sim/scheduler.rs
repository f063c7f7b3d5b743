//! Event scheduler and main loop
//!
//! Owns the simulation clock, the prediction queue, the balls, the paddle
//! controllers and the scores. Each step pops the earliest still-valid
//! prediction, advances every body to that instant, applies the response,
//! then re-predicts for whatever changed. Paddle predictions are refreshed
//! on every step regardless, because paddle pose moves between events in a
//! way queued predictions cannot know about.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::ops::ControlFlow;

use crate::config::SessionConfig;
use crate::sim::ball::Ball;
use crate::sim::collision;
use crate::sim::event::{BallId, EventKind, EventQueue, Side};
use crate::sim::paddle::{Controller, Paddle};

/// What a single processed event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A collision response was applied (ball-ball, wall, or paddle).
    Bounced,
    /// A ball left the arena and respawned. `scorer` is `None` for a
    /// dead-center exit at exactly x = 0, which scores neither side.
    Scored { scorer: Option<Side> },
    /// Periodic tick; the host should redraw now.
    Redraw,
    /// The winning score was reached. No state mutates from here on.
    GameOver { winner: Side },
}

/// The discrete-event simulation of one session.
pub struct Simulation {
    config: SessionConfig,
    clock: f32,
    balls: Vec<Ball>,
    controllers: [Controller; 2],
    scores: [u32; 2],
    queue: EventQueue,
    rng: Pcg32,
    tick_period: f32,
    winner: Option<Side>,
}

/// Which side a ball exiting at `x` scores for. Exiting left feeds the right
/// player and vice versa; a dead-center exit scores nobody.
fn scoring_side(x: f32) -> Option<Side> {
    if x < 0.0 {
        Some(Side::Right)
    } else if x > 0.0 {
        Some(Side::Left)
    } else {
        None
    }
}

/// Disjoint mutable borrows of two balls for the pair response.
fn pair_mut(balls: &mut [Ball], a: usize, b: usize) -> (&mut Ball, &mut Ball) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = balls.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = balls.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

impl Simulation {
    pub fn new(config: SessionConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let balls = (0..config.num_balls)
            .map(|_| Ball::new(config.base_ball_speed, config.ball_radius_range, &mut rng))
            .collect();

        let paddle_at = |x: f32| {
            Controller::new(
                Paddle::new(Vec2::new(x, 0.0), config.paddle_width, config.paddle_height),
                config.max_tilt_deg,
                config.half_height,
            )
        };
        let controllers = [
            paddle_at(-config.paddle_offset_x),
            paddle_at(config.paddle_offset_x),
        ];
        let tick_period = config.tick_period();

        let mut sim = Self {
            config,
            clock: 0.0,
            balls,
            controllers,
            scores: [0, 0],
            queue: EventQueue::new(),
            rng,
            tick_period,
            winner: None,
        };
        sim.prime();
        sim
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        self.controllers[side.index()].paddle()
    }

    /// Input collaborators set paddle targets through here between steps.
    pub fn controller_mut(&mut self, side: Side) -> &mut Controller {
        &mut self.controllers[side.index()]
    }

    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Seed the queue with predictions for every ball plus the first tick.
    fn prime(&mut self) {
        for id in 0..self.balls.len() {
            self.predict_ball(id);
        }
        self.queue.push(self.clock, EventKind::Redraw);
    }

    /// Process the next valid event and report what happened.
    ///
    /// Stale events are discarded silently on the way; the method returns
    /// once one event has actually been applied.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(winner) = self.winner {
            return StepOutcome::GameOver { winner };
        }

        loop {
            let Some(event) = self.queue.pop() else {
                // The tick always re-queues itself, so an empty queue means
                // the host drained it externally. Re-arm and carry on.
                log::warn!("event queue ran dry at t={}; re-arming tick", self.clock);
                self.queue.push(self.clock + self.tick_period, EventKind::Redraw);
                continue;
            };
            if !event.is_valid(&self.balls) {
                log::trace!("stale event at t={} discarded", event.time());
                continue;
            }

            // Advance every body to the event instant before any response
            // runs, and only then predict from the mutated state. This
            // ordering is what keeps predictions free of stale reads.
            let dt = event.time() - self.clock;
            for ball in &mut self.balls {
                ball.advance(dt);
            }
            for controller in &mut self.controllers {
                controller.advance();
            }
            self.clock = event.time();

            let outcome = match event.kind {
                EventKind::BallBall { a, b, .. } => {
                    let (first, second) = pair_mut(&mut self.balls, a, b);
                    first.bounce_off_ball(second);
                    log::debug!("t={:.3} balls {a} and {b} collide", self.clock);
                    self.predict_ball(a);
                    self.predict_ball(b);
                    StepOutcome::Bounced
                }
                EventKind::WallBounce { ball, .. } => {
                    self.balls[ball].bounce_off_horizontal_wall();
                    log::debug!("t={:.3} ball {ball} bounces off wall", self.clock);
                    self.predict_ball(ball);
                    StepOutcome::Bounced
                }
                EventKind::PaddleHit { ball, side, .. } => {
                    let paddle = self.controllers[side.index()].paddle();
                    self.balls[ball].bounce_off_paddle(paddle);
                    log::debug!("t={:.3} ball {ball} hits {side:?} paddle", self.clock);
                    self.predict_ball(ball);
                    StepOutcome::Bounced
                }
                EventKind::BorderCrossing { ball, .. } => {
                    let scorer = scoring_side(self.balls[ball].pos.x);
                    if let Some(side) = scorer {
                        self.scores[side.index()] += 1;
                        log::info!(
                            "t={:.3} {side:?} scores, {} - {}",
                            self.clock,
                            self.scores[0],
                            self.scores[1]
                        );
                        if self.scores[side.index()] >= self.config.winning_score {
                            log::info!("{side:?} wins the session");
                            self.winner = Some(side);
                            return StepOutcome::GameOver { winner: side };
                        }
                    }
                    self.balls[ball].respawn(&mut self.rng);
                    self.predict_ball(ball);
                    StepOutcome::Scored { scorer }
                }
                EventKind::Redraw => {
                    self.queue
                        .push(self.clock + self.tick_period, EventKind::Redraw);
                    StepOutcome::Redraw
                }
            };

            // Paddle pose may have moved since these were queued, so refresh
            // them wholesale on every processed event.
            self.predict_paddles();
            return outcome;
        }
    }

    /// Drive the loop until a winner emerges or the host breaks.
    ///
    /// `on_redraw` runs on every tick with full mutable access, so the host
    /// both renders and feeds paddle targets from the same callback.
    /// Returning [`ControlFlow::Break`] stops the session cleanly between
    /// events.
    pub fn run<F>(&mut self, mut on_redraw: F) -> Option<Side>
    where
        F: FnMut(&mut Simulation) -> ControlFlow<()>,
    {
        loop {
            match self.step() {
                StepOutcome::Redraw => {
                    if on_redraw(self).is_break() {
                        return None;
                    }
                }
                StepOutcome::GameOver { winner } => return Some(winner),
                StepOutcome::Bounced | StepOutcome::Scored { .. } => {}
            }
        }
    }

    /// Rematch: zero the clock and scores, respawn every ball, re-prime the
    /// queue. Paddle poses carry over unchanged.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.clock = 0.0;
        self.scores = [0, 0];
        self.winner = None;
        for ball in &mut self.balls {
            ball.respawn(&mut self.rng);
        }
        self.prime();
    }

    /// Queue fresh ball-ball and boundary predictions for one ball.
    fn predict_ball(&mut self, id: BallId) {
        let now = self.clock;
        for other in 0..self.balls.len() {
            let dt = collision::time_to_hit_ball(&self.balls[id], &self.balls[other]);
            self.queue.push(
                now + dt,
                EventKind::BallBall {
                    a: id,
                    b: other,
                    count_a: self.balls[id].count(),
                    count_b: self.balls[other].count(),
                },
            );
        }

        let dt_x = collision::time_to_leave_border(&self.balls[id], self.config.half_width);
        self.queue.push(
            now + dt_x,
            EventKind::BorderCrossing {
                ball: id,
                count: self.balls[id].count(),
            },
        );

        let dt_y = collision::time_to_hit_horizontal_wall(&self.balls[id], self.config.half_height);
        self.queue.push(
            now + dt_y,
            EventKind::WallBounce {
                ball: id,
                count: self.balls[id].count(),
            },
        );
    }

    /// Queue paddle-hit predictions for every (paddle, ball) pair.
    fn predict_paddles(&mut self) {
        let now = self.clock;
        for side in Side::BOTH {
            let paddle = self.controllers[side.index()].paddle();
            for (id, ball) in self.balls.iter().enumerate() {
                let count = ball.count();
                let dt_v = collision::time_to_hit_paddle_vertical(ball, paddle);
                let dt_h = collision::time_to_hit_paddle_horizontal(ball, paddle);
                self.queue
                    .push(now + dt_v, EventKind::PaddleHit { ball: id, side, count });
                self.queue
                    .push(now + dt_h, EventKind::PaddleHit { ball: id, side, count });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_balls: usize, winning_score: u32) -> SessionConfig {
        SessionConfig {
            num_balls,
            winning_score,
            seed: 11,
            ..SessionConfig::default()
        }
    }

    /// Replace a ball's trajectory and rebuild predictions around it.
    fn force_ball(sim: &mut Simulation, id: usize, pos: Vec2, vel: Vec2) {
        sim.balls[id].pos = pos;
        sim.balls[id].vel = vel;
        sim.queue.clear();
        sim.prime();
    }

    #[test]
    fn exit_side_attribution() {
        assert_eq!(scoring_side(-1.0), Some(Side::Right));
        assert_eq!(scoring_side(1.0), Some(Side::Left));
        // A dead-center exit scores neither side
        assert_eq!(scoring_side(0.0), None);
    }

    #[test]
    fn win_at_score_one_terminates_without_further_mutation() {
        let mut sim = Simulation::new(config(1, 1));
        // Cross the right boundary at a height no paddle can reach
        force_ball(&mut sim, 0, Vec2::new(0.0, 300.0), Vec2::new(50.0, 0.0));

        let winner = sim.run(|_| ControlFlow::Continue(()));
        assert_eq!(winner, Some(Side::Left));
        assert_eq!(sim.scores(), [1, 0]);

        let frozen_pos = sim.balls()[0].pos;
        let frozen_clock = sim.clock();
        assert_eq!(sim.step(), StepOutcome::GameOver { winner: Side::Left });
        assert_eq!(sim.balls()[0].pos, frozen_pos);
        assert_eq!(sim.clock(), frozen_clock);
    }

    #[test]
    fn non_winning_score_respawns_the_ball() {
        let mut sim = Simulation::new(config(1, 2));
        force_ball(&mut sim, 0, Vec2::new(0.0, 300.0), Vec2::new(-50.0, 0.0));

        loop {
            match sim.step() {
                StepOutcome::Scored { scorer } => {
                    assert_eq!(scorer, Some(Side::Right));
                    break;
                }
                StepOutcome::GameOver { .. } => panic!("won too early"),
                _ => {}
            }
        }
        assert_eq!(sim.scores(), [0, 1]);
        assert_eq!(sim.balls()[0].pos, Vec2::ZERO);
    }

    #[test]
    fn wall_bounce_flips_vertical_velocity() {
        let mut sim = Simulation::new(config(1, 99));
        force_ball(&mut sim, 0, Vec2::new(0.0, 0.0), Vec2::new(0.0, 40.0));

        loop {
            if sim.step() == StepOutcome::Bounced {
                break;
            }
        }
        assert!(sim.balls()[0].vel.y < 0.0);
    }

    #[test]
    fn ball_pair_collides_through_the_queue() {
        let mut sim = Simulation::new(config(2, 99));
        sim.balls[0].pos = Vec2::new(-200.0, 0.0);
        sim.balls[0].vel = Vec2::new(30.0, 0.0);
        sim.balls[1].pos = Vec2::new(200.0, 0.0);
        sim.balls[1].vel = Vec2::new(-30.0, 0.0);
        sim.queue.clear();
        sim.prime();

        let momentum_before: Vec2 = sim
            .balls()
            .iter()
            .map(|b| b.mass() * b.vel)
            .fold(Vec2::ZERO, |acc, p| acc + p);

        loop {
            if sim.step() == StepOutcome::Bounced {
                break;
            }
        }

        // Head-on approach reversed for both, momentum conserved
        assert!(sim.balls()[0].vel.x < 0.0 || sim.balls()[1].vel.x > 0.0);
        let gap = (sim.balls()[0].pos - sim.balls()[1].pos).length()
            - (sim.balls()[0].radius() + sim.balls()[1].radius());
        assert!(gap.abs() < 1e-2, "collided out of contact: gap {gap}");

        let momentum_after: Vec2 = sim
            .balls()
            .iter()
            .map(|b| b.mass() * b.vel)
            .fold(Vec2::ZERO, |acc, p| acc + p);
        assert!((momentum_before - momentum_after).length() < 1.0);
    }

    #[test]
    fn redraw_reenqueues_at_tick_period() {
        let mut sim = Simulation::new(config(1, 99));
        // Park the ball so only ticks fire
        force_ball(&mut sim, 0, Vec2::ZERO, Vec2::ZERO);

        assert_eq!(sim.step(), StepOutcome::Redraw);
        let first = sim.clock();
        assert_eq!(sim.step(), StepOutcome::Redraw);
        let second = sim.clock();
        assert!((second - first - sim.config.tick_period()).abs() < 1e-6);
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let mut sim = Simulation::new(config(1, 1));
        force_ball(&mut sim, 0, Vec2::new(0.0, 300.0), Vec2::new(50.0, 0.0));
        let winner = sim.run(|_| ControlFlow::Continue(()));
        assert!(winner.is_some());

        sim.reset();
        assert_eq!(sim.clock(), 0.0);
        assert_eq!(sim.scores(), [0, 0]);
        assert_eq!(sim.winner(), None);
        assert_eq!(sim.balls()[0].pos, Vec2::ZERO);
        // Queue is live again
        assert!(matches!(
            sim.step(),
            StepOutcome::Redraw | StepOutcome::Bounced | StepOutcome::Scored { .. }
        ));
    }

    #[test]
    fn paddle_blocks_an_incoming_ball() {
        let mut sim = Simulation::new(config(1, 99));
        // Straight at the right paddle's face, at paddle height
        force_ball(&mut sim, 0, Vec2::new(0.0, 0.0), Vec2::new(60.0, 0.0));

        loop {
            if sim.step() == StepOutcome::Bounced {
                break;
            }
        }
        assert!(sim.balls()[0].vel.x < 0.0);
        assert!(sim.balls()[0].pos.x < sim.paddle(Side::Right).pos.x);
    }
}
