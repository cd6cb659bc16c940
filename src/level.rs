use crate::grid::{Cell, CellKind, Grid, Occupant, Position};
use log::warn;
use std::io;
use thiserror::Error;

/// Why a level could not be installed. Nothing from a failed load is ever applied.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read level: {0}")]
    Io(#[from] io::Error),
    #[error("invalid width and/or height in header {header:?}")]
    MalformedHeader { header: String },
    #[error("height is {expected} but the level has {found} rows")]
    LineCount { expected: usize, found: usize },
    #[error("row {row} has {found} symbols, expected width {expected}")]
    LineLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("more than one player, second one at {position}")]
    DuplicatePlayer { position: Position },
    #[error("no player on the level")]
    MissingPlayer,
    #[error("level has no targets")]
    NoTargets,
    #[error("level has no crates")]
    NoCrates,
    #[error("{targets} targets cannot hold {crates} crates")]
    TooFewTargets { targets: usize, crates: usize },
}

/// Counts derived from the level text when it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelMeta {
    pub width: usize,
    pub height: usize,
    pub target_count: usize,
    pub crate_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub grid: Grid,
    pub meta: LevelMeta,
}

/// Parser output before the level requirements are checked.
pub(crate) struct Parsed {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cells: Vec<Cell>,
    pub(crate) player: Option<Position>,
    pub(crate) target_count: usize,
    pub(crate) crate_count: usize,
}

impl Level {
    /// Parse a level from text.
    ///
    /// ```text
    /// <width> <height>
    /// <height rows of width space-separated symbols, top row first>
    /// ```
    ///
    /// The first text row becomes grid row `height - 1`. Unknown symbols are logged and
    /// loaded as empty cells; every other problem rejects the whole level.
    pub fn from_text(text: &str) -> Result<Self, LoadError> {
        let parsed = parse(text)?;

        let player = parsed.player.ok_or(LoadError::MissingPlayer)?;
        if parsed.target_count == 0 {
            return Err(LoadError::NoTargets);
        }
        if parsed.crate_count == 0 {
            return Err(LoadError::NoCrates);
        }
        if parsed.target_count < parsed.crate_count {
            return Err(LoadError::TooFewTargets {
                targets: parsed.target_count,
                crates: parsed.crate_count,
            });
        }

        let meta = LevelMeta {
            width: parsed.width,
            height: parsed.height,
            target_count: parsed.target_count,
            crate_count: parsed.crate_count,
        };
        let grid = Grid::from_cells(parsed.width, parsed.height, parsed.cells, player);
        Ok(Level { grid, meta })
    }
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut tokens = line.split_whitespace();
    let width = tokens.next()?.parse::<usize>().ok()?;
    let height = tokens.next()?.parse::<usize>().ok()?;
    if tokens.next().is_some() || width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

pub(crate) fn parse(text: &str) -> Result<Parsed, LoadError> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default();
    let (width, height) = parse_header(header).ok_or_else(|| LoadError::MalformedHeader {
        header: header.to_string(),
    })?;

    let rows: Vec<&str> = lines.collect();
    if rows.len() != height {
        return Err(LoadError::LineCount {
            expected: height,
            found: rows.len(),
        });
    }

    // Every row is checked before anything is sized from the header
    let mut table = Vec::with_capacity(rows.len());
    for (row, line) in rows.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != width {
            return Err(LoadError::LineLength {
                row,
                expected: width,
                found: tokens.len(),
            });
        }
        table.push(tokens);
    }
    let size = width
        .checked_mul(height)
        .ok_or_else(|| LoadError::MalformedHeader {
            header: header.to_string(),
        })?;

    let mut cells = vec![Cell::new(Position::new(0, 0), CellKind::Empty); size];
    let mut player = None;
    let mut target_count = 0;
    let mut crate_count = 0;

    for (row, tokens) in table.into_iter().enumerate() {
        let y = height - row - 1;
        for (x, token) in tokens.into_iter().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            let mut chars = token.chars();
            let kind = match (chars.next(), chars.next()) {
                (Some(symbol), None) => CellKind::from_symbol(symbol),
                _ => None,
            };
            let kind = kind.unwrap_or_else(|| {
                warn!("invalid symbol {:?} at {}, treating it as empty", token, pos);
                CellKind::Empty
            });

            match kind.occupant() {
                Some(Occupant::Player) => {
                    if player.is_some() {
                        return Err(LoadError::DuplicatePlayer { position: pos });
                    }
                    player = Some(pos);
                }
                Some(Occupant::Crate) => crate_count += 1,
                _ => {}
            }
            if kind.is_target() {
                target_count += 1;
            }

            cells[y * width + x] = Cell::new(pos, kind);
        }
    }

    Ok(Parsed {
        width,
        height,
        cells,
        player,
        target_count,
        crate_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::level_text;
    use proptest::prelude::*;

    #[test]
    fn test_parse_basic_level() {
        let input = "5 3\n\
                     X X X X X\n\
                     X P B T X\n\
                     X X X X X\n";
        let level = Level::from_text(input).unwrap();

        assert_eq!(
            level.meta,
            LevelMeta {
                width: 5,
                height: 3,
                target_count: 1,
                crate_count: 1,
            }
        );
        assert_eq!(level.grid.player(), Position::new(1, 1));
        assert_eq!(level.grid.count_occupants(Occupant::Player), 1);
    }

    #[test]
    fn test_y_axis_flip() {
        let input = level_text(&["X T X", "E P E", "B E E"]);
        let level = Level::from_text(&input).unwrap();
        let grid = &level.grid;

        // First text row is the top of the grid
        assert_eq!(grid.cell_at(Position::new(1, 2)).unwrap().kind(), CellKind::Target);
        assert_eq!(grid.cell_at(Position::new(0, 0)).unwrap().kind(), CellKind::Crate);
        assert_eq!(grid.cell_at(Position::new(0, 2)).unwrap().kind(), CellKind::Wall);
        assert_eq!(grid.cell_at(Position::new(1, 2)).unwrap().y, 2);
    }

    #[test]
    fn test_display_round_trip() {
        let input = level_text(&["X X X X X X", "X p B E b X", "X T E E E X", "X X X X X X"]);
        let level = Level::from_text(&input).unwrap();
        assert_eq!(level.grid.to_string(), input);
    }

    #[test]
    fn test_player_on_target() {
        let input = level_text(&["X X X X", "X p B X", "X T E X", "X X X X"]);
        let level = Level::from_text(&input).unwrap();
        assert_eq!(level.meta.target_count, 2);
        assert_eq!(level.meta.crate_count, 1);
        let cell = level.grid.cell_at(level.grid.player()).unwrap();
        assert!(cell.is_target);
        assert_eq!(cell.kind(), CellKind::PlayerOnTarget);
    }

    #[test]
    fn test_malformed_header() {
        for input in ["", "5\nX", "a 1\nX", "1 1 1\nX", "0 1\n", "-1 1\nX"] {
            assert!(
                matches!(Level::from_text(input), Err(LoadError::MalformedHeader { .. })),
                "accepted header in {:?}",
                input
            );
        }
    }

    #[test]
    fn test_line_count_mismatch() {
        let input = "3 3\nX X X\nP B T\n";
        assert!(matches!(
            Level::from_text(input),
            Err(LoadError::LineCount {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_line_length_mismatch() {
        let input = "3 2\nP B T\nX X\n";
        assert!(matches!(
            Level::from_text(input),
            Err(LoadError::LineLength {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_huge_header_width() {
        let input = format!("{} 1\nP B T\n", usize::MAX);
        assert!(matches!(
            Level::from_text(&input),
            Err(LoadError::LineLength {
                row: 0,
                expected: usize::MAX,
                found: 3
            })
        ));

        let input = format!("1000000000 {}\n", usize::MAX);
        assert!(matches!(
            Level::from_text(&input),
            Err(LoadError::LineCount { found: 0, .. })
        ));
    }

    #[test]
    fn test_multiple_players() {
        for input in [
            level_text(&["P P B T"]),
            level_text(&["P B T", "E p E"]),
            level_text(&["p B T", "E P E"]),
        ] {
            assert!(matches!(
                Level::from_text(&input),
                Err(LoadError::DuplicatePlayer { .. })
            ));
        }
    }

    #[test]
    fn test_level_requirements() {
        assert!(matches!(
            Level::from_text(&level_text(&["E B T"])),
            Err(LoadError::MissingPlayer)
        ));
        assert!(matches!(
            Level::from_text(&level_text(&["P B E"])),
            Err(LoadError::NoTargets)
        ));
        assert!(matches!(
            Level::from_text(&level_text(&["P T E"])),
            Err(LoadError::NoCrates)
        ));
        assert!(matches!(
            Level::from_text(&level_text(&["P B B T"])),
            Err(LoadError::TooFewTargets {
                targets: 1,
                crates: 2
            })
        ));
        // Spare targets are fine
        assert!(Level::from_text(&level_text(&["P B T T"])).is_ok());
    }

    #[test]
    fn test_unknown_symbol_is_empty() {
        let input = level_text(&["P B T ?", "E Q XY E"]);
        let level = Level::from_text(&input).unwrap();
        assert_eq!(
            level.grid.cell_at(Position::new(3, 1)).unwrap().kind(),
            CellKind::Empty
        );
        assert_eq!(
            level.grid.cell_at(Position::new(2, 0)).unwrap().kind(),
            CellKind::Empty
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = "3 1\r\nP B T\r\n";
        assert!(Level::from_text(input).is_ok());
    }

    fn well_formed_level() -> impl Strategy<Value = (String, usize, usize)> {
        (3usize..8, 1usize..8).prop_flat_map(|(width, height)| {
            let area = width * height;
            // One cell for the player, at least as many targets as crates
            (1..=(area - 1) / 2)
                .prop_flat_map(move |crates| (Just(crates), crates..=(area - 1 - crates)))
                .prop_flat_map(move |(crates, targets)| {
                    let kinds = (0..area)
                        .map(|i| {
                            if i == 0 {
                                'P'
                            } else if i <= crates {
                                'B'
                            } else if i <= crates + targets {
                                'T'
                            } else {
                                'E'
                            }
                        })
                        .collect::<Vec<_>>();
                    (Just(kinds).prop_shuffle(), Just(crates), Just(targets))
                })
                .prop_map(move |(kinds, crates, targets)| {
                    let rows: Vec<String> = kinds
                        .chunks(width)
                        .map(|row| {
                            row.iter()
                                .map(char::to_string)
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect();
                    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
                    (level_text(&rows), crates, targets)
                })
        })
    }

    proptest! {
        #[test]
        fn well_formed_levels_always_load((text, crates, targets) in well_formed_level()) {
            let level = Level::from_text(&text).unwrap();
            prop_assert_eq!(level.grid.count_occupants(Occupant::Player), 1);
            prop_assert_eq!(level.meta.crate_count, crates);
            prop_assert_eq!(level.meta.target_count, targets);
        }
    }
}
