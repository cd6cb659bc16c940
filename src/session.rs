use crate::grid::{CellKind, Direction, Grid, Position};
use crate::history::{History, HistoryError, MoveRecord};
use crate::level::{Level, LevelMeta, LoadError};
use crate::levels::LevelSource;
use crate::path::shortest_path;
use crate::replay::PathReplay;
use crate::rules::{MoveOutcome, resolve_move, resolve_step};
use log::{debug, error, info, warn};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time between two cells of a click-path.
    pub step_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            step_interval: Duration::from_millis(100),
        }
    }
}

/// Outside collaborators told about what happens in the session. Every method defaults
/// to doing nothing.
pub trait Listener {
    /// A cell's occupancy changed, or the cell was created by a level load.
    fn occupancy_changed(&mut self, _kind: CellKind, _pos: Position) {}

    /// The level was solved; input stays paused until reset or next level.
    fn win_game(&mut self) {}

    /// A reset or next level resumed play.
    fn resume_game(&mut self) {}
}

impl Listener for () {}

/// Requests the session turned down. Nothing changes when one of these is returned.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("no level is loaded")]
    NoLevel,
    #[error("level is solved, input is paused")]
    Paused,
    #[error("a click-path is still being walked")]
    ReplayActive,
    #[error("level {0} does not exist")]
    NoSuchLevel(usize),
    #[error("level {number} failed to load")]
    Load {
        number: usize,
        #[source]
        source: LoadError,
    },
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// What came of a click-to-move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRequest {
    /// A walk of `steps` cells has started; it advances on [`Session::tick`].
    Walking { steps: usize },
    AlreadyThere,
    Unreachable,
    OffGrid,
}

#[derive(Debug)]
struct ActiveLevel {
    number: usize,
    level: Level,
    history: History,
    replay: Option<PathReplay>,
    solved: bool,
}

/// One play session: the loaded level plus everything that moves it.
///
/// Only one mover holds the grid at a time. While a click-path is being walked, direct
/// moves, undo and redo are refused; once the level is solved, all of them are.
pub struct Session<S, L> {
    config: SessionConfig,
    source: S,
    listener: L,
    active: Option<ActiveLevel>,
}

impl<S: LevelSource, L: Listener> Session<S, L> {
    pub fn new(config: SessionConfig, source: S, listener: L) -> Self {
        Session {
            config,
            source,
            listener,
            active: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.active.as_ref().map(|active| &active.level.grid)
    }

    pub fn meta(&self) -> Option<&LevelMeta> {
        self.active.as_ref().map(|active| &active.level.meta)
    }

    pub fn history(&self) -> Option<&History> {
        self.active.as_ref().map(|active| &active.history)
    }

    pub fn level_number(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.number)
    }

    pub fn is_solved(&self) -> bool {
        self.active.as_ref().is_some_and(|active| active.solved)
    }

    pub fn is_walking(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.replay.is_some())
    }

    /// Load level `number` and make it the active level.
    ///
    /// On failure the previous level, if any, stays active untouched.
    pub fn load_level(&mut self, number: usize) -> Result<(), InputError> {
        if !self.source.exists(number) {
            error!("level {} does not exist", number);
            return Err(InputError::NoSuchLevel(number));
        }
        let level = self
            .source
            .read(number)
            .map_err(LoadError::from)
            .and_then(|text| Level::from_text(&text))
            .map_err(|source| {
                error!("level {} failed to load: {}", number, source);
                InputError::Load { number, source }
            })?;

        info!(
            "loaded level {}: {}x{}, {} crates, {} targets",
            number,
            level.meta.width,
            level.meta.height,
            level.meta.crate_count,
            level.meta.target_count
        );
        debug!("grid contents:\n{}", level.grid);

        for cell in level.grid.cells() {
            self.listener.occupancy_changed(cell.kind(), cell.position());
        }
        self.active = Some(ActiveLevel {
            number,
            level,
            history: History::new(),
            replay: None,
            solved: false,
        });
        Ok(())
    }

    /// Reload the active level from its source, dropping history and any walk in progress.
    pub fn reset(&mut self) -> Result<(), InputError> {
        let number = self.level_number().ok_or(InputError::NoLevel)?;
        self.load_level(number)?;
        self.listener.resume_game();
        info!("level reset");
        Ok(())
    }

    pub fn next_level(&mut self) -> Result<(), InputError> {
        let number = self.level_number().ok_or(InputError::NoLevel)? + 1;
        if !self.source.exists(number) {
            error!("no next level found");
            return Err(InputError::NoSuchLevel(number));
        }
        self.load_level(number)?;
        self.listener.resume_game();
        Ok(())
    }

    fn notify(listener: &mut L, grid: &Grid, record: &MoveRecord) {
        for pos in record.touched() {
            if let Some(cell) = grid.cell_at(pos) {
                listener.occupancy_changed(cell.kind(), pos);
            }
        }
    }

    /// Move the player one cell in `direction`, pushing a crate if one is in the way.
    pub fn attempt_move(&mut self, direction: Direction) -> Result<MoveOutcome, InputError> {
        let active = ready(&mut self.active)?;
        let outcome = resolve_move(&mut active.level.grid, &active.level.meta, direction);
        let Some(record) = outcome.record() else {
            return Ok(outcome);
        };

        active.history.commit(record);
        match outcome {
            MoveOutcome::Solved(_) => active.solved = true,
            MoveOutcome::Pushed {
                deadlock: Some(rule),
                ..
            } => info!("tip: the level can no longer be solved ({})", rule),
            _ => {}
        }
        debug!("grid contents:\n{}", active.level.grid);

        let solved = active.solved;
        Self::notify(&mut self.listener, &active.level.grid, &record);
        if solved {
            info!("level solved");
            self.listener.win_game();
        }
        Ok(outcome)
    }

    /// Walk to the cell under a world position, one cell per step interval. Never pushes.
    pub fn attempt_move_to(&mut self, x: f32, y: f32) -> Result<PathRequest, InputError> {
        let interval = self.config.step_interval;
        let active = ready(&mut self.active)?;
        let grid = &active.level.grid;

        let Some(goal) = grid.world_to_cell(x, y) else {
            return Ok(PathRequest::OffGrid);
        };
        let Some(path) = shortest_path(grid, grid.player(), goal) else {
            info!("no path from {} to {}", grid.player(), goal);
            return Ok(PathRequest::Unreachable);
        };

        let replay = PathReplay::new(path, interval);
        if replay.is_finished() {
            return Ok(PathRequest::AlreadyThere);
        }
        let steps = replay.remaining();
        active.replay = Some(replay);
        Ok(PathRequest::Walking { steps })
    }

    /// Advance the frame clock by `dt`. Returns the outcome of the click-path step taken
    /// during this tick, if any.
    pub fn tick(&mut self, dt: Duration) -> Option<MoveOutcome> {
        let active = self.active.as_mut()?;
        let replay = active.replay.as_mut()?;
        let next = replay.advance(dt);
        let finished = replay.is_finished();

        let outcome = next.map(|next| {
            let grid = &mut active.level.grid;
            match Direction::between(grid.player(), next) {
                Some(direction) => resolve_step(grid, direction),
                None => MoveOutcome::Blocked,
            }
        });

        match outcome {
            Some(MoveOutcome::Blocked) => {
                warn!("click-path step blocked, abandoning the walk");
                active.replay = None;
            }
            Some(outcome) => {
                if let Some(record) = outcome.record() {
                    active.history.commit(record);
                    debug!("grid contents:\n{}", active.level.grid);
                    Self::notify(&mut self.listener, &active.level.grid, &record);
                }
                if finished {
                    active.replay = None;
                }
            }
            None => {
                if finished {
                    active.replay = None;
                }
            }
        }
        outcome
    }

    pub fn undo(&mut self) -> Result<MoveRecord, InputError> {
        let active = ready(&mut self.active)?;
        let record = active
            .history
            .undo(&mut active.level.grid)
            .inspect_err(|_| info!("no undo action available"))?;
        debug!("grid contents:\n{}", active.level.grid);
        Self::notify(&mut self.listener, &active.level.grid, &record);
        Ok(record)
    }

    pub fn redo(&mut self) -> Result<MoveRecord, InputError> {
        let active = ready(&mut self.active)?;
        let record = active
            .history
            .redo(&mut active.level.grid)
            .inspect_err(|_| info!("no redo action available"))?;
        debug!("grid contents:\n{}", active.level.grid);
        Self::notify(&mut self.listener, &active.level.grid, &record);
        Ok(record)
    }
}

/// The active level, if it may take player input right now.
fn ready(active: &mut Option<ActiveLevel>) -> Result<&mut ActiveLevel, InputError> {
    let active = active.as_mut().ok_or(InputError::NoLevel)?;
    if active.solved {
        return Err(InputError::Paused);
    }
    if active.replay.is_some() {
        return Err(InputError::ReplayActive);
    }
    Ok(active)
}
