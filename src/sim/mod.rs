//! Event-driven simulation
//!
//! All gameplay logic lives here. The engine is strictly single-threaded:
//! one scheduler loop is the only reader and writer of simulation state, and
//! input collaborators may only touch paddle targets between steps. Hosts
//! that run on a multi-threaded toolkit must serialize input callbacks onto
//! the simulation thread.
//!
//! - `ball`: body state, motion, collision responses
//! - `collision`: pure time-to-event predictors
//! - `paddle`: paddle pose plus the target-smoothing controller
//! - `event`: predictions, validity fingerprints, the time-ordered queue
//! - `scheduler`: the clock and the pop/advance/dispatch/re-predict loop

pub mod ball;
pub mod collision;
pub mod event;
pub mod paddle;
pub mod scheduler;

pub use ball::Ball;
pub use collision::NEVER;
pub use event::{Event, EventKind, EventQueue, Side};
pub use paddle::{Controller, Paddle};
pub use scheduler::{Simulation, StepOutcome};
