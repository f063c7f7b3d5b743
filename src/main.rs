//! Tilt Pong entry point
//!
//! Runs a headless demo session: both paddles follow a simple chase policy
//! and the match is logged tick by tick until one side wins. Pass a JSON
//! config path as the first argument to override the defaults.

use std::ops::ControlFlow;
use std::path::Path;

use tilt_pong::{SessionConfig, Side, Simulation};

/// Stop a runaway demo after this many redraw ticks.
const TICK_BUDGET: u64 = 200_000;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::load(Path::new(&path)),
        None => SessionConfig::default(),
    };
    let names = config.player_names.clone();
    log::info!(
        "starting session: {} vs {}, first to {}",
        names[0],
        names[1],
        config.winning_score
    );

    let mut sim = Simulation::new(config);

    let mut last_scores = [0u32; 2];
    let mut ticks: u64 = 0;
    let winner = sim.run(|sim| {
        for side in Side::BOTH {
            steer(sim, side);
        }

        let scores = sim.scores();
        if scores != last_scores {
            log::info!(
                "t={:8.2}  {} {} - {} {}",
                sim.clock(),
                names[0],
                scores[0],
                scores[1],
                names[1]
            );
            last_scores = scores;
        }

        ticks += 1;
        if ticks >= TICK_BUDGET {
            log::warn!("tick budget exhausted, stopping the demo");
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    match winner {
        Some(side) => {
            let scores = sim.scores();
            log::info!(
                "{} wins {} - {}",
                names[side.index()],
                scores[side.index()],
                scores[side.opponent().index()]
            );
        }
        None => log::info!("session stopped without a winner"),
    }
}

/// Chase policy: intercept the soonest-arriving ball heading for this side,
/// leaning the paddle into the return; otherwise recenter and level out.
fn steer(sim: &mut Simulation, side: Side) {
    let paddle_x = sim.paddle(side).pos.x;

    let mut intercept: Option<(f32, f32)> = None; // (eta, y)
    for ball in sim.balls() {
        let toward = match side {
            Side::Left => ball.vel.x < 0.0,
            Side::Right => ball.vel.x > 0.0,
        };
        if !toward {
            continue;
        }
        let eta = (paddle_x - ball.pos.x) / ball.vel.x;
        if eta <= 0.0 {
            continue;
        }
        let y = ball.pos.y + ball.vel.y * eta;
        if intercept.is_none_or(|(best, _)| eta < best) {
            intercept = Some((eta, y));
        }
    }

    let controller = sim.controller_mut(side);
    match intercept {
        Some((_, y)) => {
            controller.set_target_y(y);
            if y > 0.0 {
                controller.tilt_ccw();
            } else {
                controller.tilt_cw();
            }
        }
        None => {
            controller.set_target_y(0.0);
            controller.level();
        }
    }
}
