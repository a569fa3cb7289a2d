//! Movement resolution on the grid
//!
//! Horizontal steps wrap around the maze edges (the tunnel); vertical steps
//! never wrap, so stepping off the top or bottom yields an out-of-grid position
//! that [`is_passable`] rejects.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::maze::{Cell, Maze};
use crate::consts::WIDTH;

/// Heading of a moving entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    /// Stationary
    #[default]
    None,
}

impl Direction {
    /// Candidate order for agent decisions; also the tie-break order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Reverse heading, `None` for `Direction::None`
    pub fn opposite(self) -> Option<Direction> {
        match self {
            Direction::Up => Some(Direction::Down),
            Direction::Down => Some(Direction::Up),
            Direction::Left => Some(Direction::Right),
            Direction::Right => Some(Direction::Left),
            Direction::None => None,
        }
    }

    /// Unit step in grid space (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
            Direction::None => IVec2::ZERO,
        }
    }
}

/// Position one step from `pos` in `dir`
#[inline]
pub fn next_position(pos: IVec2, dir: Direction) -> IVec2 {
    let next = pos + dir.delta();
    IVec2::new(next.x.rem_euclid(WIDTH), next.y)
}

/// False outside the grid vertically or on a wall
#[inline]
pub fn is_passable(maze: &Maze, pos: IVec2) -> bool {
    matches!(maze.cell(pos), Some(cell) if cell != Cell::Wall)
}
