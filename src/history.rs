use crate::grid::{Grid, Position};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// One occupant relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub from: Position,
    pub to: Position,
}

/// A committed move: the player's step, plus the crate leg when the move was a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub player: Leg,
    pub pushed: Option<Leg>,
}

impl MoveRecord {
    pub fn step(from: Position, to: Position) -> Self {
        MoveRecord {
            player: Leg { from, to },
            pushed: None,
        }
    }

    pub fn push(from: Position, to: Position, crate_to: Position) -> Self {
        MoveRecord {
            player: Leg { from, to },
            pushed: Some(Leg {
                from: to,
                to: crate_to,
            }),
        }
    }

    /// Play the move forwards. The crate goes first so the player never lands on an
    /// occupied cell.
    pub fn apply(&self, grid: &mut Grid) {
        if let Some(pushed) = self.pushed {
            grid.move_occupant(pushed.from, pushed.to);
        }
        grid.move_occupant(self.player.from, self.player.to);
    }

    /// Play the move backwards: player leg first, then the crate leg.
    pub fn revert(&self, grid: &mut Grid) {
        grid.move_occupant(self.player.to, self.player.from);
        if let Some(pushed) = self.pushed {
            grid.move_occupant(pushed.to, pushed.from);
        }
    }

    /// Every cell whose occupancy this move changes.
    pub fn touched(&self) -> impl Iterator<Item = Position> {
        let crate_to = self.pushed.map(|leg| leg.to);
        [self.player.from, self.player.to]
            .into_iter()
            .chain(crate_to)
    }
}

/// Undo and redo stacks of committed moves.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<MoveRecord>,
    redo: Vec<MoveRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh move. Anything that was undone can no longer be redone.
    pub fn commit(&mut self, record: MoveRecord) {
        self.undo.push(record);
        self.redo.clear();
    }

    pub fn undo(&mut self, grid: &mut Grid) -> Result<MoveRecord, HistoryError> {
        let record = self.undo.pop().ok_or(HistoryError::NothingToUndo)?;
        record.revert(grid);
        self.redo.push(record);
        Ok(record)
    }

    pub fn redo(&mut self, grid: &mut Grid) -> Result<MoveRecord, HistoryError> {
        let record = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        record.apply(grid);
        self.undo.push(record);
        Ok(record)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
