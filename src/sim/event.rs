//! Predicted events and the time-ordered queue
//!
//! An event is an immutable record of a predicted future occurrence. It
//! snapshots the collision counts of the balls it references; validity is
//! derived by comparing those snapshots against live counts, never stored as
//! a flag. The queue never removes stale entries eagerly - they are filtered
//! when popped, which keeps the queue a plain binary heap at the cost of
//! memory proportional to total predictions made.

use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::sim::ball::Ball;

/// Index of a ball in the simulation's ball list.
pub type BallId = usize;

/// Which player / paddle, by arena side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// What a queued event predicts, with count snapshots for the balls involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Two balls come into contact.
    BallBall {
        a: BallId,
        b: BallId,
        count_a: u32,
        count_b: u32,
    },
    /// A ball fully crosses the left or right scoring boundary.
    BorderCrossing { ball: BallId, count: u32 },
    /// A ball's edge reaches the top or bottom wall.
    WallBounce { ball: BallId, count: u32 },
    /// A ball reaches a paddle face.
    PaddleHit {
        ball: BallId,
        side: Side,
        count: u32,
    },
    /// Periodic redraw tick; references no bodies and is always valid.
    Redraw,
}

/// A timestamped prediction. Immutable once queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    time: OrderedFloat<f32>,
    /// Insertion sequence, the deterministic tie-break for equal times.
    seq: u64,
    pub kind: EventKind,
}

impl Event {
    pub fn time(&self) -> f32 {
        self.time.into_inner()
    }

    /// A prediction still holds iff every referenced ball's live count
    /// matches the snapshot taken at creation.
    pub fn is_valid(&self, balls: &[Ball]) -> bool {
        match self.kind {
            EventKind::BallBall {
                a,
                b,
                count_a,
                count_b,
            } => balls[a].count() == count_a && balls[b].count() == count_b,
            EventKind::BorderCrossing { ball, count }
            | EventKind::WallBounce { ball, count }
            | EventKind::PaddleHit { ball, count, .. } => balls[ball].count() == count,
            EventKind::Redraw => true,
        }
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of predictions ordered by time, then insertion order.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a prediction. Non-finite times are dropped: an event at t = inf
    /// can never pop ahead of any finite one, so storing it only leaks.
    pub fn push(&mut self, time: f32, kind: EventKind) {
        if !time.is_finite() {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Event {
            time: OrderedFloat(time),
            seq,
            kind,
        }));
    }

    /// Pop the earliest prediction, stale or not. Callers filter staleness
    /// via [`Event::is_valid`].
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
