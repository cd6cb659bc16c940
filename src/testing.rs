//! Helpers for building levels in tests.

use crate::grid::{Grid, Position};
use crate::level::{self, Level};

/// Level text for the given rows (top row first), with the header filled in.
pub(crate) fn level_text(rows: &[&str]) -> String {
    let width = rows
        .first()
        .map(|row| row.split_whitespace().count())
        .unwrap_or(0);
    let mut text = format!("{} {}\n", width, rows.len());
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

/// A fully validated level.
#[track_caller]
pub(crate) fn level(rows: &[&str]) -> Level {
    Level::from_text(&level_text(rows)).unwrap()
}

/// A grid that skips the target and crate requirements, for testing grid-level rules in
/// isolation. Still needs exactly one player.
#[track_caller]
pub(crate) fn grid(rows: &[&str]) -> Grid {
    let parsed = level::parse(&level_text(rows)).unwrap();
    let player = parsed.player.expect("test grid needs a player");
    Grid::from_cells(parsed.width, parsed.height, parsed.cells, player)
}

/// Grid position of the symbol at `column`, `row` as written in the test rows.
pub(crate) fn at(rows: &[&str], column: i32, row: i32) -> Position {
    Position::new(column, rows.len() as i32 - 1 - row)
}
