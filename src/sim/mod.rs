//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives through the driver clock
//! - Seeded RNG only
//! - Stable iteration order (agents A, B, C, D)
//! - No rendering or platform dependencies

pub mod agent;
pub mod collision;
pub mod driver;
pub mod maze;
pub mod movement;
pub mod state;
pub mod tick;

pub use agent::{Agent, AgentId, AgentState, choose_direction};
pub use collision::{CollisionOutcome, resolve_collisions};
pub use driver::Driver;
pub use maze::{Cell, Maze, MazeError};
pub use movement::{Direction, is_passable, next_position};
pub use state::{GameEvent, GameState, Player, QuoteTicket, Rules};
pub use tick::{TickInput, apply_input, expire_frightened, tick};
