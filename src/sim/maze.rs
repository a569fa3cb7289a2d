//! Maze grid
//!
//! A fixed `WIDTH x HEIGHT` grid of cells indexed `[y][x]`. The level layout is
//! parsed at compile time, so a malformed built-in layout fails the build.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{HEIGHT, WIDTH};
use crate::in_bounds;

const W: usize = WIDTH as usize;
const H: usize = HEIGHT as usize;

/// Contents of one maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Pellet,
    PowerPellet,
    GhostHouse,
}

impl Cell {
    /// Pellets and power pellets must all be eaten to clear a level
    pub fn is_consumable(self) -> bool {
        matches!(self, Cell::Pellet | Cell::PowerPellet)
    }

    /// Layout glyph for this cell
    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Wall => '#',
            Cell::Pellet => '.',
            Cell::PowerPellet => 'o',
            Cell::GhostHouse => '-',
        }
    }

    const fn from_glyph(glyph: u8) -> Option<Cell> {
        match glyph {
            b' ' => Some(Cell::Empty),
            b'#' => Some(Cell::Wall),
            b'.' => Some(Cell::Pellet),
            b'o' => Some(Cell::PowerPellet),
            b'-' => Some(Cell::GhostHouse),
            _ => None,
        }
    }
}

/// The level layout. Row 9 is open at both edges for the wrap-around tunnel.
pub const LAYOUT: [&str; H] = [
    "###################",
    "#o.......#.......o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "####.#       #.####",
    "####.# ##-## #.####",
    "    .  #---#  .    ",
    "####.# ##-## #.####",
    "####.#       #.####",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#..... .....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

const fn parse_layout(rows: &[&str; H]) -> [[Cell; W]; H] {
    let mut cells = [[Cell::Empty; W]; H];
    let mut y = 0;
    while y < H {
        let row = rows[y].as_bytes();
        assert!(row.len() == W, "maze row has the wrong width");
        let mut x = 0;
        while x < W {
            cells[y][x] = match Cell::from_glyph(row[x]) {
                Some(cell) => cell,
                None => panic!("unknown maze glyph"),
            };
            x += 1;
        }
        y += 1;
    }
    cells
}

const INITIAL_CELLS: [[Cell; W]; H] = parse_layout(&LAYOUT);

/// Errors from parsing a textual layout at runtime
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has width {found}, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

/// Mutable maze grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    cells: [[Cell; W]; H],
}

impl Default for Maze {
    fn default() -> Self {
        Self::initial()
    }
}

impl Maze {
    /// Fresh copy of the level layout
    pub fn initial() -> Self {
        Self {
            cells: INITIAL_CELLS,
        }
    }

    /// Parse a layout using the same glyphs as [`LAYOUT`]
    pub fn from_layout(rows: &[&str]) -> Result<Self, MazeError> {
        if rows.len() != H {
            return Err(MazeError::RowCount {
                expected: H,
                found: rows.len(),
            });
        }

        let mut cells = [[Cell::Empty; W]; H];
        for (y, row) in rows.iter().enumerate() {
            let width = row.chars().count();
            if width != W {
                return Err(MazeError::RowWidth {
                    row: y,
                    expected: W,
                    found: width,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = u8::try_from(glyph)
                    .ok()
                    .and_then(Cell::from_glyph)
                    .ok_or(MazeError::UnknownGlyph { glyph, x, y })?;
                cells[y][x] = cell;
            }
        }

        Ok(Self { cells })
    }

    /// Cell at `pos`, or `None` outside the grid
    pub fn cell(&self, pos: IVec2) -> Option<Cell> {
        in_bounds(pos).then(|| self.cells[pos.y as usize][pos.x as usize])
    }

    /// Overwrite the cell at `pos`. Out-of-grid writes are ignored.
    pub fn set(&mut self, pos: IVec2, cell: Cell) {
        if in_bounds(pos) {
            self.cells[pos.y as usize][pos.x as usize] = cell;
        }
    }

    /// Eat whatever pellet sits at `pos`, leaving the cell empty.
    ///
    /// Returns the consumed cell, or `None` if there was nothing to eat.
    pub fn consume(&mut self, pos: IVec2) -> Option<Cell> {
        let cell = self.cell(pos).filter(|c| c.is_consumable())?;
        self.set(pos, Cell::Empty);
        Some(cell)
    }

    /// Number of pellets and power pellets left
    pub fn remaining_pellets(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| c.is_consumable())
            .count()
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; W]> {
        self.cells.iter()
    }

    /// Positions of every cell matching `pred`
    pub fn positions(&self, pred: impl Fn(Cell) -> bool) -> Vec<IVec2> {
        let mut out = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if pred(cell) {
                    out.push(IVec2::new(x as i32, y as i32));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_SPAWN;

    #[test]
    fn test_initial_layout_counts() {
        let maze = Maze::initial();
        assert_eq!(maze.remaining_pellets(), 150);
        assert_eq!(maze.positions(|c| c == Cell::PowerPellet).len(), 4);
        assert_eq!(maze.cell(PLAYER_SPAWN), Some(Cell::Empty));
    }

    #[test]
    fn test_tunnel_row_open_at_edges() {
        let maze = Maze::initial();
        assert_ne!(maze.cell(IVec2::new(0, 9)), Some(Cell::Wall));
        assert_ne!(maze.cell(IVec2::new(WIDTH - 1, 9)), Some(Cell::Wall));
    }

    #[test]
    fn test_consume_is_idempotent() {
        let mut maze = Maze::initial();
        let pos = IVec2::new(1, 3);
        let before = maze.remaining_pellets();

        assert_eq!(maze.consume(pos), Some(Cell::Pellet));
        assert_eq!(maze.consume(pos), None);
        assert_eq!(maze.cell(pos), Some(Cell::Empty));
        assert_eq!(maze.remaining_pellets(), before - 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut maze = Maze::initial();
        assert_eq!(maze.cell(IVec2::new(0, -1)), None);
        assert_eq!(maze.cell(IVec2::new(WIDTH, 0)), None);
        maze.set(IVec2::new(-1, -1), Cell::Pellet);
        assert_eq!(maze, Maze::initial());
    }

    #[test]
    fn test_from_layout_round_trips_builtin() {
        let maze = Maze::from_layout(&LAYOUT).unwrap();
        assert_eq!(maze, Maze::initial());
    }

    #[test]
    fn test_from_layout_errors() {
        assert_eq!(
            Maze::from_layout(&LAYOUT[..3]),
            Err(MazeError::RowCount {
                expected: H,
                found: 3
            })
        );

        let mut rows = LAYOUT;
        rows[2] = "#.#";
        assert!(matches!(
            Maze::from_layout(&rows),
            Err(MazeError::RowWidth { row: 2, .. })
        ));

        rows[2] = "#.##.###.#.###.##.X";
        assert_eq!(
            Maze::from_layout(&rows),
            Err(MazeError::UnknownGlyph {
                glyph: 'X',
                x: 18,
                y: 2
            })
        );
    }
}
