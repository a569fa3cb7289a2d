//! Read-only projection of the game for drawing
//!
//! Hosts never touch `GameState` mutably to draw; they ask for a glyph per
//! cell plus the HUD strings and overlay text.

use glam::IVec2;

use crate::consts::{HEIGHT, WIDTH};
use crate::sim::{AgentId, Cell, Direction, GameState};

/// What occupies a cell visually (top-most thing wins)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Cell(Cell),
    Player(Direction),
    Agent { id: AgentId, frightened: bool },
}

impl Glyph {
    /// Single character for text rendering
    pub fn as_char(self) -> char {
        match self {
            Glyph::Cell(cell) => cell.glyph(),
            Glyph::Player(dir) => match dir {
                Direction::Up => 'v',
                Direction::Down => '^',
                Direction::Left => '>',
                Direction::Right => '<',
                Direction::None => 'P',
            },
            Glyph::Agent {
                frightened: true, ..
            } => '~',
            Glyph::Agent { id, .. } => match id {
                AgentId::A => 'A',
                AgentId::B => 'B',
                AgentId::C => 'C',
                AgentId::D => 'D',
            },
        }
    }

    /// CSS class list for DOM rendering
    pub fn css_class(self) -> String {
        match self {
            Glyph::Cell(Cell::Empty) => "cell".to_string(),
            Glyph::Cell(Cell::Wall) => "cell wall".to_string(),
            Glyph::Cell(Cell::Pellet) => "cell pellet".to_string(),
            Glyph::Cell(Cell::PowerPellet) => "cell power".to_string(),
            Glyph::Cell(Cell::GhostHouse) => "cell house".to_string(),
            Glyph::Player(dir) => format!("cell player facing-{}", direction_name(dir)),
            Glyph::Agent { id, frightened } => {
                if frightened {
                    format!("cell agent agent-{} frightened", id.name())
                } else {
                    format!("cell agent agent-{}", id.name())
                }
            }
        }
    }
}

fn direction_name(dir: Direction) -> &'static str {
    match dir {
        Direction::Up => "up",
        Direction::Down => "down",
        Direction::Left => "left",
        Direction::Right => "right",
        Direction::None => "none",
    }
}

/// Glyph at `pos`: player over agents over the maze cell
pub fn glyph_at(state: &GameState, pos: IVec2) -> Glyph {
    if state.player.pos == pos {
        return Glyph::Player(state.player.direction);
    }
    if let Some(agent) = state.agents.iter().find(|a| a.pos == pos) {
        return Glyph::Agent {
            id: agent.id,
            frightened: state.is_frightened,
        };
    }
    Glyph::Cell(state.maze.cell(pos).unwrap_or(Cell::Wall))
}

/// The board as text, one line per row
pub fn render_text(state: &GameState) -> String {
    let mut out = String::with_capacity(((WIDTH + 1) * HEIGHT) as usize);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            out.push(glyph_at(state, IVec2::new(x, y)).as_char());
        }
        out.push('\n');
    }
    out
}

/// Score as shown in the HUD
pub fn score_text(score: u64) -> String {
    format!("{:06}", score)
}

/// Modal text over the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: &'static str,
    pub body: &'static str,
    /// Offer a full restart
    pub restart: bool,
}

/// Overlay for the current state, if any
pub fn overlay(state: &GameState) -> Option<Overlay> {
    if state.is_game_over {
        Some(Overlay {
            title: "GAME OVER",
            body: "Friendship needs to be recharged...",
            restart: true,
        })
    } else if state.is_paused {
        Some(Overlay {
            title: "PAUSED",
            body: "Press Arrow Keys or WASD to Move!",
            restart: false,
        })
    } else {
        None
    }
}
