//! Pursuing agents
//!
//! Four agents share one record type; only their spawn, heading and cosmetic
//! identity differ. Each tick an agent picks among the passable, non-reversing
//! directions: greedy toward the player normally, uniformly at random while
//! frightened.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::maze::Maze;
use super::movement::{Direction, is_passable, next_position};
use crate::cell_distance;

/// Fixed agent identities, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    A,
    B,
    C,
    D,
}

impl AgentId {
    pub const ALL: [AgentId; 4] = [AgentId::A, AgentId::B, AgentId::C, AgentId::D];

    pub fn name(self) -> &'static str {
        match self {
            AgentId::A => "blinky",
            AgentId::B => "pinky",
            AgentId::C => "inky",
            AgentId::D => "clyde",
        }
    }

    /// CSS color
    pub fn color(self) -> &'static str {
        match self {
            AgentId::A => "#FF0000",
            AgentId::B => "#FFB8FF",
            AgentId::C => "#00FFFF",
            AgentId::D => "#FFB852",
        }
    }

    /// Spawn cell inside the ghost house; also the respawn target
    pub fn home(self) -> IVec2 {
        match self {
            AgentId::A | AgentId::B => IVec2::new(9, 9),
            AgentId::C => IVec2::new(8, 9),
            AgentId::D => IVec2::new(10, 9),
        }
    }

    pub fn initial_direction(self) -> Direction {
        match self {
            AgentId::A | AgentId::D => Direction::Left,
            AgentId::B => Direction::Up,
            AgentId::C => Direction::Right,
        }
    }
}

/// Agent behaviour mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Chase,
    /// Starting mode; moves exactly like `Chase`
    Scatter,
    Frightened,
    /// Never entered: an eaten agent is returned home in `Chase` at once
    Eaten,
}

/// A pursuing agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub pos: IVec2,
    pub direction: Direction,
    pub state: AgentState,
    pub home: IVec2,
}

impl Agent {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            pos: id.home(),
            direction: id.initial_direction(),
            state: AgentState::Scatter,
            home: id.home(),
        }
    }

    /// The full squad in processing order
    pub fn squad() -> [Agent; 4] {
        AgentId::ALL.map(Agent::new)
    }

    /// Move back to the spawn cell (heading and mode are kept)
    pub fn reset_position(&mut self) {
        self.pos = self.home;
    }

    /// Eaten while frightened: respawn and resume chasing
    pub fn send_home(&mut self) {
        self.pos = self.home;
        self.state = AgentState::Chase;
    }

    /// Decide and commit one step toward (or away from) `target`
    pub fn step(&mut self, maze: &Maze, target: IVec2, rng: &mut impl Rng) {
        let dir = choose_direction(self, maze, target, rng);
        self.direction = dir;
        let next = next_position(self.pos, dir);
        // A boxed-in agent may be forced toward a wall; it keeps the heading but stays put
        if is_passable(maze, next) {
            self.pos = next;
        }
    }
}

/// Pick the next heading for `agent`.
///
/// Legal candidates are passable and not the reverse of the current heading,
/// enumerated in [`Direction::ALL`] order. Frightened agents choose uniformly;
/// otherwise the candidate landing closest to `target` wins, first one on ties.
/// With no legal candidate the agent reverses, or goes left if it had no heading.
pub fn choose_direction(
    agent: &Agent,
    maze: &Maze,
    target: IVec2,
    rng: &mut impl Rng,
) -> Direction {
    let reverse = agent.direction.opposite();
    let legal: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&dir| Some(dir) != reverse && is_passable(maze, next_position(agent.pos, dir)))
        .collect();

    if legal.is_empty() {
        return reverse.unwrap_or(Direction::Left);
    }

    if agent.state == AgentState::Frightened {
        return legal[rng.random_range(0..legal.len())];
    }

    let mut best = legal[0];
    let mut best_dist = cell_distance(next_position(agent.pos, best), target);
    for &dir in &legal[1..] {
        let dist = cell_distance(next_position(agent.pos, dir), target);
        if dist < best_dist {
            best = dir;
            best_dist = dist;
        }
    }
    best
}
