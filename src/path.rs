use crate::grid::{Grid, Position};
use std::collections::VecDeque;

/// Shortest walk from `start` to `goal` over free cells (passable and unoccupied).
///
/// Breadth-first, expanding neighbours left, right, down, up, so ties between equally
/// short walks always resolve the same way. The returned path includes both endpoints.
/// `start` itself may be occupied (it is usually the player's cell).
pub fn shortest_path(grid: &Grid, start: Position, goal: Position) -> Option<Vec<Position>> {
    if !grid.contains(start) || !grid.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let width = grid.width();
    let slot = |pos: Position| pos.y as usize * width + pos.x as usize;

    // parent[i] is the cell we reached cell i from; the start points at itself
    let mut parent: Vec<Option<Position>> = vec![None; width * grid.height()];
    let mut queue = VecDeque::new();
    parent[slot(start)] = Some(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for next in grid.neighbors(pos) {
            if parent[slot(next)].is_some() || !grid.is_free(next) {
                continue;
            }
            parent[slot(next)] = Some(pos);
            if next == goal {
                return Some(reconstruct(&parent, slot, start, goal));
            }
            queue.push_back(next);
        }
    }

    None
}

fn reconstruct(
    parent: &[Option<Position>],
    slot: impl Fn(Position) -> usize,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut pos = goal;
    while pos != start {
        // Every cell on the way back was reached, so it has a parent
        let Some(prev) = parent[slot(pos)] else {
            break;
        };
        path.push(prev);
        pos = prev;
    }
    path.reverse();
    path
}
