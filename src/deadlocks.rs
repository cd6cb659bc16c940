use crate::grid::{Direction, Grid, Position};
use std::fmt;

/// The 8 neighbours of a cell as (dx, dy), starting west and turning clockwise:
/// W, NW, N, NE, E, SE, S, SW.
const COMPASS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Which heuristic flagged a crate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlockRule {
    Corner,
    DeadEnd,
    CrateRun,
    Block,
}

impl fmt::Display for DeadlockRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadlockRule::Corner => write!(f, "crate is stuck in a corner"),
            DeadlockRule::DeadEnd => write!(f, "crate is stuck along a wall without targets"),
            DeadlockRule::CrateRun => write!(f, "crate is wedged against three other crates"),
            DeadlockRule::Block => write!(f, "crate forms a block with a crate and two walls"),
        }
    }
}

/// Check the crate that was just pushed `direction` onto `pos`.
///
/// These rules are advisory heuristics: a `None` does not mean the level is still
/// solvable, it only means none of the known stuck patterns matched.
pub fn find_deadlock(grid: &Grid, pos: Position, direction: Direction) -> Option<DeadlockRule> {
    if is_in_corner(grid, pos) {
        Some(DeadlockRule::Corner)
    } else if is_dead_end(grid, pos, direction) {
        Some(DeadlockRule::DeadEnd)
    } else if has_crate_run(grid, pos) {
        Some(DeadlockRule::CrateRun)
    } else if is_in_block(grid, pos) {
        Some(DeadlockRule::Block)
    } else {
        None
    }
}

/// Walls above and to one side, or to the right and below, or below and to the left.
///
/// The checks run in a fixed order: up first (then right or left), otherwise right (then
/// below), otherwise below and left.
fn is_in_corner(grid: &Grid, pos: Position) -> bool {
    let wall = |dir: Direction| grid.is_wall(pos.step(dir));

    if wall(Direction::Up) {
        return wall(Direction::Right) || wall(Direction::Left);
    }
    if wall(Direction::Right) {
        return wall(Direction::Down);
    }
    wall(Direction::Down) && wall(Direction::Left)
}

/// The crate was pushed flat against a wall, and the wall runs on both sides until a
/// corner without ever offering a target or an opening.
fn is_dead_end(grid: &Grid, pos: Position, direction: Direction) -> bool {
    let wall_pos = pos.step(direction);
    if !grid.is_wall(wall_pos) {
        return false;
    }

    let axis = if direction.is_horizontal() {
        Direction::Up
    } else {
        Direction::Left
    };
    let (ax, ay) = axis.delta();

    for sign in [-1, 1] {
        let (dx, dy) = (ax * sign, ay * sign);
        let mut check = pos;
        let mut check_wall = wall_pos;
        loop {
            check = check.offset(dx, dy);
            check_wall = check_wall.offset(dx, dy);

            if !grid.is_wall(check_wall) {
                return false;
            }
            if grid.is_target(check) {
                return false;
            }
            // Walking into a wall also ends the run
            if grid.is_wall(check) || is_in_corner(grid, check) {
                break;
            }
        }
    }

    true
}

/// Three crates in a row while walking the neighbours once around from the west.
fn has_crate_run(grid: &Grid, pos: Position) -> bool {
    let mut run = 0;
    for (dx, dy) in COMPASS {
        if grid.has_crate(pos.offset(dx, dy)) {
            run += 1;
            if run == 3 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// An orthogonal neighbour holds a crate off target, and the two cells completing the
/// 2x2 square on either side of it are both walls.
fn is_in_block(grid: &Grid, pos: Position) -> bool {
    let neighbor = |i: usize| {
        let (dx, dy) = COMPASS[i % COMPASS.len()];
        pos.offset(dx, dy)
    };

    for i in (0..COMPASS.len()).step_by(2) {
        let side = neighbor(i);
        if !grid.has_crate(side) || grid.is_target(side) {
            continue;
        }
        let ahead = grid.is_wall(neighbor(i + 1)) && grid.is_wall(neighbor(i + 2));
        let behind = grid.is_wall(neighbor(i + 7)) && grid.is_wall(neighbor(i + 6));
        if ahead || behind {
            return true;
        }
    }
    false
}
