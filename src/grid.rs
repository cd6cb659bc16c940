use arrayvec::ArrayVec;
use std::fmt;

/// A cell coordinate. The origin is the bottom-left cell and `y` grows upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Unit grid vector. `Up` increases `y`.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// The direction leading from `from` to the adjacent cell `to`, if they are adjacent.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        match (to.x - from.x, to.y - from.y) {
            (0, 1) => Some(Direction::Up),
            (0, -1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// Whatever stands on a cell. A cell without an occupant is walkable floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Wall,
    Player,
    Crate,
}

/// What a cell looks like from the outside: one variant per level symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Wall,
    Player,
    Crate,
    Target,
    CrateOnTarget,
    PlayerOnTarget,
}

impl CellKind {
    /// Symbols:
    /// - `E` = Empty
    /// - `X` = Wall
    /// - `P` = Player
    /// - `B` = Crate
    /// - `T` = Target
    /// - `b` = Crate on target
    /// - `p` = Player on target
    pub fn from_symbol(symbol: char) -> Option<CellKind> {
        match symbol {
            'E' => Some(CellKind::Empty),
            'X' => Some(CellKind::Wall),
            'P' => Some(CellKind::Player),
            'B' => Some(CellKind::Crate),
            'T' => Some(CellKind::Target),
            'b' => Some(CellKind::CrateOnTarget),
            'p' => Some(CellKind::PlayerOnTarget),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            CellKind::Empty => 'E',
            CellKind::Wall => 'X',
            CellKind::Player => 'P',
            CellKind::Crate => 'B',
            CellKind::Target => 'T',
            CellKind::CrateOnTarget => 'b',
            CellKind::PlayerOnTarget => 'p',
        }
    }

    pub fn occupant(&self) -> Option<Occupant> {
        match self {
            CellKind::Empty | CellKind::Target => None,
            CellKind::Wall => Some(Occupant::Wall),
            CellKind::Player | CellKind::PlayerOnTarget => Some(Occupant::Player),
            CellKind::Crate | CellKind::CrateOnTarget => Some(Occupant::Crate),
        }
    }

    pub fn is_target(&self) -> bool {
        matches!(
            self,
            CellKind::Target | CellKind::CrateOnTarget | CellKind::PlayerOnTarget
        )
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub occupant: Option<Occupant>,
    pub is_target: bool,
    pub is_passable: bool,
}

impl Cell {
    pub fn new(pos: Position, kind: CellKind) -> Self {
        let occupant = kind.occupant();
        Cell {
            x: pos.x,
            y: pos.y,
            occupant,
            is_target: kind.is_target(),
            is_passable: occupant != Some(Occupant::Wall),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Passable and unoccupied: somewhere the player can step without pushing.
    pub fn is_free(&self) -> bool {
        self.is_passable && self.occupant.is_none()
    }

    pub fn kind(&self) -> CellKind {
        match (self.occupant, self.is_target) {
            (None, false) => CellKind::Empty,
            (None, true) => CellKind::Target,
            (Some(Occupant::Wall), _) => CellKind::Wall,
            (Some(Occupant::Player), false) => CellKind::Player,
            (Some(Occupant::Player), true) => CellKind::PlayerOnTarget,
            (Some(Occupant::Crate), false) => CellKind::Crate,
            (Some(Occupant::Crate), true) => CellKind::CrateOnTarget,
        }
    }
}

/// The cell grid of one level. Rebuilt from the level text on reset, never patched back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    // Row-major, row 0 is the bottom row
    cells: Vec<Cell>,
    player: Position,
}

impl Grid {
    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<Cell>, player: Position) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Grid {
            width,
            height,
            cells,
            player,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// Bounds-checked lookup. Positions outside the grid have no cell.
    pub fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Swap the occupants of two cells.
    ///
    /// Relocating a player or crate onto an empty cell leaves the source empty. There is no
    /// legality check: callers decide whether the move is allowed. Returns false, without
    /// touching the grid, if either position is out of bounds.
    pub fn move_occupant(&mut self, from: Position, to: Position) -> bool {
        let (Some(a), Some(b)) = (self.index(from), self.index(to)) else {
            return false;
        };
        let moved = self.cells[a].occupant;
        let displaced = self.cells[b].occupant;
        self.cells[b].occupant = moved;
        self.cells[a].occupant = displaced;

        if moved == Some(Occupant::Player) {
            self.player = to;
        } else if displaced == Some(Occupant::Player) {
            self.player = from;
        }
        true
    }

    /// Walls, and everything outside the grid.
    pub fn is_wall(&self, pos: Position) -> bool {
        self.cell_at(pos)
            .is_none_or(|cell| cell.occupant == Some(Occupant::Wall))
    }

    pub fn has_crate(&self, pos: Position) -> bool {
        self.cell_at(pos)
            .is_some_and(|cell| cell.occupant == Some(Occupant::Crate))
    }

    pub fn is_target(&self, pos: Position) -> bool {
        self.cell_at(pos).is_some_and(|cell| cell.is_target)
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.cell_at(pos).is_some_and(Cell::is_free)
    }

    pub fn count_occupants(&self, occupant: Occupant) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.occupant == Some(occupant))
            .count()
    }

    pub fn crates_on_targets(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.is_target && cell.occupant == Some(Occupant::Crate))
            .count()
    }

    /// In-bounds 4-neighbours, enumerated left, right, down, up.
    pub fn neighbors(&self, pos: Position) -> ArrayVec<Position, 4> {
        [
            Direction::Left,
            Direction::Right,
            Direction::Down,
            Direction::Up,
        ]
        .into_iter()
        .map(|dir| pos.step(dir))
        .filter(|&next| self.contains(next))
        .collect()
    }

    /// World coordinates of a cell's centre: one world unit per cell.
    pub fn cell_to_world(&self, pos: Position) -> (f32, f32) {
        (pos.x as f32, pos.y as f32)
    }

    /// The cell containing a world position, rounding to the nearest cell centre.
    pub fn world_to_cell(&self, x: f32, y: f32) -> Option<Position> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let pos = Position::new(x.round() as i32, y.round() as i32);
        self.contains(pos).then_some(pos)
    }
}

impl fmt::Display for Grid {
    /// Renders the level text format: header, then rows from the top visual row down.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.width, self.height)?;
        for row in self.cells.chunks(self.width).rev() {
            let mut line = String::with_capacity(self.width * 2);
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                line.push(cell.kind().symbol());
            }
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::grid;

    #[test]
    fn test_cell_at_bounds() {
        let grid = grid(&["X X X", "X P X", "X X X"]);

        assert!(grid.cell_at(Position::new(0, 0)).is_some());
        assert!(grid.cell_at(Position::new(2, 2)).is_some());
        assert!(grid.cell_at(Position::new(3, 0)).is_none());
        assert!(grid.cell_at(Position::new(0, 3)).is_none());
        assert!(grid.cell_at(Position::new(-1, 1)).is_none());
    }

    #[test]
    fn test_wall_cells_are_impassable() {
        let grid = grid(&["X X X", "X P T", "X X X"]);
        for cell in grid.cells() {
            if cell.occupant == Some(Occupant::Wall) {
                assert!(!cell.is_passable);
            } else {
                assert!(cell.is_passable);
            }
        }
    }

    #[test]
    fn test_move_occupant_swaps() {
        let mut grid = grid(&["X X X X", "X P B T", "X X X X"]);
        let player = Position::new(1, 1);
        let crate_pos = Position::new(2, 1);
        let target = Position::new(3, 1);

        assert!(grid.move_occupant(crate_pos, target));
        assert_eq!(grid.cell_at(target).unwrap().kind(), CellKind::CrateOnTarget);
        assert_eq!(grid.cell_at(crate_pos).unwrap().kind(), CellKind::Empty);

        assert!(grid.move_occupant(player, crate_pos));
        assert_eq!(grid.player(), crate_pos);
        assert_eq!(grid.cell_at(player).unwrap().occupant, None);

        // Swapping back through the displaced side keeps the player cache right
        assert!(grid.move_occupant(player, crate_pos));
        assert_eq!(grid.player(), player);
    }

    #[test]
    fn test_move_occupant_out_of_bounds() {
        let mut grid = grid(&["P E"]);
        let before = grid.clone();
        assert!(!grid.move_occupant(Position::new(0, 0), Position::new(-1, 0)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_is_wall_outside_grid() {
        let grid = grid(&["P E", "E E"]);
        assert!(grid.is_wall(Position::new(-1, 0)));
        assert!(grid.is_wall(Position::new(0, 2)));
        assert!(!grid.is_wall(Position::new(1, 1)));
    }

    #[test]
    fn test_neighbors_order() {
        let grid = grid(&["E E E", "E P E", "E E E"]);
        let center = Position::new(1, 1);
        assert_eq!(
            grid.neighbors(center).as_slice(),
            &[
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );
        assert_eq!(grid.neighbors(Position::new(0, 0)).len(), 2);
    }

    #[test]
    fn test_world_mapping() {
        let grid = grid(&["E E E", "E P E"]);
        assert_eq!(grid.world_to_cell(1.2, 0.8), Some(Position::new(1, 1)));
        assert_eq!(grid.world_to_cell(2.4, -0.4), Some(Position::new(2, 0)));
        assert_eq!(grid.world_to_cell(3.0, 0.0), None);
        assert_eq!(grid.world_to_cell(f32::NAN, 0.0), None);
        assert_eq!(grid.cell_to_world(Position::new(2, 1)), (2.0, 1.0));
    }

    #[test]
    fn test_counts() {
        let grid = grid(&["X X X X X", "X P B b X", "X T T E X", "X X X X X"]);
        assert_eq!(grid.count_occupants(Occupant::Player), 1);
        assert_eq!(grid.count_occupants(Occupant::Crate), 2);
        assert_eq!(grid.crates_on_targets(), 1);
    }

    #[test]
    fn test_direction_between() {
        let origin = Position::new(2, 2);
        for dir in ALL_DIRECTIONS {
            assert_eq!(Direction::between(origin, origin.step(dir)), Some(dir));
        }
        assert_eq!(Direction::between(origin, origin.offset(1, 1)), None);
        assert_eq!(Direction::between(origin, origin), None);
    }
}
