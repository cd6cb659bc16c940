use crate::grid::Position;
use std::collections::VecDeque;
use std::time::Duration;

/// A click-path being walked one cell per step interval.
///
/// Polled from the frame loop: each [`advance`](PathReplay::advance) adds the frame time to
/// an accumulator, and once the accumulator reaches the interval the next cell is handed out
/// and the accumulator starts again from zero. At most one cell per call.
#[derive(Debug, Clone)]
pub struct PathReplay {
    pending: VecDeque<Position>,
    elapsed: Duration,
    interval: Duration,
}

impl PathReplay {
    /// `path` starts at the player's current cell, which is skipped.
    pub fn new(path: Vec<Position>, interval: Duration) -> Self {
        let mut pending = VecDeque::from(path);
        pending.pop_front();
        PathReplay {
            pending,
            elapsed: Duration::ZERO,
            interval,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn advance(&mut self, dt: Duration) -> Option<Position> {
        if self.pending.is_empty() {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.interval {
            return None;
        }
        self.elapsed = Duration::ZERO;
        self.pending.pop_front()
    }
}
