//! Sparkle Maze - A maze-chase arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, movement, agents, collisions, session)
//! - `quote`: Decorative level-up quote service with offline fallback
//! - `input`: Keyboard intent mapping
//! - `view`: Read-only projection of game state for drawing
//! - `settings`: Rules and preferences

pub mod input;
pub mod quote;
pub mod settings;
pub mod sim;
pub mod view;

pub use settings::Settings;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    use glam::IVec2;

    /// Maze width in cells
    pub const WIDTH: i32 = 19;
    /// Maze height in cells
    pub const HEIGHT: i32 = 21;

    /// Minimum time between simulation ticks (ms)
    pub const TICK_INTERVAL_MS: f64 = 180.0;
    /// How long a power pellet keeps agents frightened (ms)
    pub const FRIGHTENED_DURATION_MS: f64 = 7000.0;
    /// Window after a lost life during which collisions are ignored (ms)
    pub const COLLISION_COOLDOWN_MS: f64 = 500.0;

    /// Lives at game start
    pub const INITIAL_LIVES: u8 = 3;

    /// Points
    pub const PELLET_SCORE: u64 = 10;
    pub const POWER_PELLET_SCORE: u64 = 50;
    pub const AGENT_SCORE: u64 = 200;

    /// Where the player (re)spawns
    pub const PLAYER_SPAWN: IVec2 = IVec2::new(9, 15);
}

/// True if `pos` lies inside the maze grid
#[inline]
pub fn in_bounds(pos: IVec2) -> bool {
    (0..consts::WIDTH).contains(&pos.x) && (0..consts::HEIGHT).contains(&pos.y)
}

/// Euclidean distance between two grid cells
#[inline]
pub fn cell_distance(a: IVec2, b: IVec2) -> f32 {
    a.as_vec2().distance(b.as_vec2())
}
