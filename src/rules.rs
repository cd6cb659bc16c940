use crate::deadlocks::{DeadlockRule, find_deadlock};
use crate::grid::{Direction, Grid, Occupant};
use crate::history::MoveRecord;
use crate::level::LevelMeta;

/// The result of one move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing changed.
    Blocked,
    /// The player stepped onto a free cell.
    Moved(MoveRecord),
    /// The player pushed a crate. `deadlock` names the stuck pattern the crate landed in,
    /// if any; the move stands either way.
    Pushed {
        record: MoveRecord,
        deadlock: Option<DeadlockRule>,
    },
    /// The push put the last crate on a target.
    Solved(MoveRecord),
}

impl MoveOutcome {
    pub fn record(&self) -> Option<MoveRecord> {
        match *self {
            MoveOutcome::Blocked => None,
            MoveOutcome::Moved(record)
            | MoveOutcome::Pushed { record, .. }
            | MoveOutcome::Solved(record) => Some(record),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, MoveOutcome::Blocked)
    }

    pub fn advisory_deadlock(&self) -> bool {
        matches!(
            self,
            MoveOutcome::Pushed {
                deadlock: Some(_),
                ..
            }
        )
    }
}

/// Move the player one cell, pushing at most one crate ahead of it.
pub fn resolve_move(grid: &mut Grid, meta: &LevelMeta, direction: Direction) -> MoveOutcome {
    let from = grid.player();
    let to = from.step(direction);
    let Some(&cell) = grid.cell_at(to) else {
        return MoveOutcome::Blocked;
    };
    if !cell.is_passable {
        return MoveOutcome::Blocked;
    }

    match cell.occupant {
        None => {
            let record = MoveRecord::step(from, to);
            record.apply(grid);
            MoveOutcome::Moved(record)
        }
        Some(Occupant::Crate) => {
            let beyond = to.step(direction);
            let Some(&beyond_cell) = grid.cell_at(beyond) else {
                return MoveOutcome::Blocked;
            };
            if !beyond_cell.is_free() {
                return MoveOutcome::Blocked;
            }
            let lands_on_target = beyond_cell.is_target;

            let record = MoveRecord::push(from, to, beyond);
            record.apply(grid);

            if lands_on_target {
                if grid.crates_on_targets() == meta.crate_count {
                    MoveOutcome::Solved(record)
                } else {
                    MoveOutcome::Pushed {
                        record,
                        deadlock: None,
                    }
                }
            } else {
                MoveOutcome::Pushed {
                    record,
                    deadlock: find_deadlock(grid, beyond, direction),
                }
            }
        }
        Some(Occupant::Wall) | Some(Occupant::Player) => MoveOutcome::Blocked,
    }
}

/// Move the player one cell without pushing anything. Used for click-path steps.
pub fn resolve_step(grid: &mut Grid, direction: Direction) -> MoveOutcome {
    let from = grid.player();
    let to = from.step(direction);
    if !grid.is_free(to) {
        return MoveOutcome::Blocked;
    }
    let record = MoveRecord::step(from, to);
    record.apply(grid);
    MoveOutcome::Moved(record)
}
