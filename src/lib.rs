//! Rule engine for a grid-based crate-pushing puzzle: level loading, movement with
//! pushes, win detection, advisory deadlock detection, click-to-move pathfinding and
//! undo/redo.

pub mod deadlocks;
pub mod grid;
pub mod history;
pub mod level;
pub mod levels;
pub mod path;
pub mod replay;
pub mod rules;
pub mod session;

#[cfg(test)]
mod testing;

pub use deadlocks::{DeadlockRule, find_deadlock};
pub use grid::{ALL_DIRECTIONS, Cell, CellKind, Direction, Grid, Occupant, Position};
pub use history::{History, HistoryError, Leg, MoveRecord};
pub use level::{Level, LevelMeta, LoadError};
pub use levels::{LevelDirectory, LevelList, LevelSource};
pub use path::shortest_path;
pub use replay::PathReplay;
pub use rules::{MoveOutcome, resolve_move, resolve_step};
pub use session::{InputError, Listener, PathRequest, Session, SessionConfig};
