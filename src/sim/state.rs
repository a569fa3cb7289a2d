//! Game state and core simulation types
//!
//! One owner for everything the tick mutates. Handlers go through the narrow
//! methods here instead of poking fields from several places.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, AgentId, AgentState};
use super::maze::Maze;
use super::movement::Direction;
use crate::consts::*;
use crate::quote::INITIAL_QUOTE;

/// Tunable rules (timing and lives)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Minimum time between ticks (ms)
    pub tick_interval_ms: f64,
    /// Power pellet duration (ms)
    pub frightened_duration_ms: f64,
    /// Collision immunity after a lost life (ms)
    pub collision_cooldown_ms: f64,
    pub initial_lives: u8,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            frightened_duration_ms: FRIGHTENED_DURATION_MS,
            collision_cooldown_ms: COLLISION_COOLDOWN_MS,
            initial_lives: INITIAL_LIVES,
        }
    }
}

/// The player character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub pos: IVec2,
    pub direction: Direction,
    /// Turn requested by input, taken at the first tick it is possible
    pub queued: Direction,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: PLAYER_SPAWN,
            direction: Direction::None,
            queued: Direction::None,
        }
    }
}

/// Identifies the quote request issued by one level advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteTicket(pub u32);

/// Something that happened during a tick or frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PelletEaten { pos: IVec2 },
    PowerPelletEaten { pos: IVec2 },
    AgentEaten { id: AgentId },
    LifeLost { lives_left: u8 },
    GameOver { score: u64 },
    /// Maze cleared; the host should fetch a quote for `ticket`
    LevelAdvanced { level: u32, ticket: QuoteTicket },
    FrightenedEnded,
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rules: Rules,
    pub maze: Maze,
    pub player: Player,
    /// Agents in processing order A, B, C, D
    pub agents: [Agent; 4],
    pub score: u64,
    pub lives: u8,
    /// 1-based
    pub level: u32,
    pub is_game_over: bool,
    pub is_paused: bool,
    pub is_frightened: bool,
    /// Driver-clock time at which frightened mode ends (ms)
    pub frightened_until: f64,
    /// Collisions are ignored until this driver-clock time (ms)
    pub collision_cooldown_until: f64,
    /// Decorative quote shown above the board
    pub message: String,
    /// Simulation tick counter
    pub time_ticks: u64,
    quote_generation: u32,
}

impl GameState {
    /// Create a new game with default rules
    pub fn new(seed: u64) -> Self {
        Self::with_rules(seed, Rules::default())
    }

    pub fn with_rules(seed: u64, rules: Rules) -> Self {
        Self {
            seed,
            rules,
            maze: Maze::initial(),
            player: Player::default(),
            agents: Agent::squad(),
            score: 0,
            lives: rules.initial_lives,
            level: 1,
            is_game_over: false,
            is_paused: true,
            is_frightened: false,
            frightened_until: 0.0,
            collision_cooldown_until: 0.0,
            message: INITIAL_QUOTE.to_string(),
            time_ticks: 0,
            quote_generation: 0,
        }
    }

    /// Movement, agents and collisions only run while this holds
    pub fn is_running(&self) -> bool {
        !self.is_paused && !self.is_game_over
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id as usize]
    }

    pub fn agent_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id as usize]
    }

    /// Score never decreases
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Player and every agent back to their spawn cells
    pub fn reset_positions(&mut self) {
        self.player.pos = PLAYER_SPAWN;
        self.player.direction = Direction::None;
        for agent in &mut self.agents {
            agent.reset_position();
        }
    }

    /// Start (or extend) frightened mode from `now`
    pub fn enter_frightened(&mut self, now: f64) {
        self.is_frightened = true;
        self.frightened_until = now + self.rules.frightened_duration_ms;
        for agent in &mut self.agents {
            agent.state = AgentState::Frightened;
        }
    }

    /// End frightened mode; every frightened agent resumes chasing
    pub fn exit_frightened(&mut self) {
        self.is_frightened = false;
        for agent in &mut self.agents {
            if agent.state == AgentState::Frightened {
                agent.state = AgentState::Chase;
            }
        }
    }

    /// Lose one life at `now`. Returns the lives left.
    pub fn lose_life(&mut self, now: f64) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        self.collision_cooldown_until = now + self.rules.collision_cooldown_ms;
        if self.lives == 0 {
            self.is_game_over = true;
            log::info!("Game over at level {} with score {}", self.level, self.score);
        } else {
            self.is_paused = true;
            self.reset_positions();
            log::info!("Life lost, {} left", self.lives);
        }
        self.lives
    }

    /// Move to the next level with a fresh maze.
    ///
    /// The returned ticket identifies the quote fetch for this level; replies
    /// carrying an older ticket are ignored by [`GameState::apply_quote`].
    pub fn advance_level(&mut self) -> QuoteTicket {
        self.level += 1;
        self.maze = Maze::initial();
        self.reset_positions();
        self.is_paused = true;
        self.quote_generation = self.quote_generation.wrapping_add(1);
        log::info!("Level {} reached (score {})", self.level, self.score);
        QuoteTicket(self.quote_generation)
    }

    /// Install a fetched quote if it belongs to the latest level advance
    pub fn apply_quote(&mut self, ticket: QuoteTicket, quote: String) -> bool {
        if ticket.0 != self.quote_generation {
            log::warn!(
                "Dropping stale quote for ticket {} (current {})",
                ticket.0,
                self.quote_generation
            );
            return false;
        }
        self.message = quote;
        true
    }

    /// Flip pause; no effect once the game is over
    pub fn toggle_pause(&mut self) {
        if !self.is_game_over {
            self.is_paused = !self.is_paused;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let state = GameState::new(1);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, INITIAL_LIVES);
        assert_eq!(state.level, 1);
        assert!(state.is_paused);
        assert!(!state.is_game_over);
        assert!(!state.is_running());
        assert_eq!(state.message, INITIAL_QUOTE);
        assert_eq!(state.player.pos, PLAYER_SPAWN);
        for id in AgentId::ALL {
            assert_eq!(state.agent(id).pos, id.home());
        }
    }

    #[test]
    fn test_lose_life_clamps_at_zero() {
        let mut state = GameState::new(1);
        state.lives = 0;
        assert_eq!(state.lose_life(0.0), 0);
        assert!(state.is_game_over);
    }

    #[test]
    fn test_toggle_pause_ignored_after_game_over() {
        let mut state = GameState::new(1);
        state.toggle_pause();
        assert!(!state.is_paused);
        state.is_game_over = true;
        state.toggle_pause();
        assert!(!state.is_paused);
    }

    #[test]
    fn test_stale_quote_is_dropped() {
        let mut state = GameState::new(1);
        let first = state.advance_level();
        let second = state.advance_level();
        assert_ne!(first, second);

        assert!(state.apply_quote(second, "newest".into()));
        assert!(!state.apply_quote(first, "late reply".into()));
        assert_eq!(state.message, "newest");
    }

    #[test]
    fn test_exit_frightened_only_touches_frightened_agents() {
        let mut state = GameState::new(1);
        state.enter_frightened(0.0);
        state.agent_mut(AgentId::B).send_home();
        state.exit_frightened();
        assert!(!state.is_frightened);
        for agent in &state.agents {
            assert_eq!(agent.state, AgentState::Chase);
        }
    }

    #[test]
    fn test_rules_fill_missing_fields() {
        let rules: Rules = serde_json::from_str(r#"{"initial_lives": 5}"#).unwrap();
        assert_eq!(rules.initial_lives, 5);
        assert_eq!(rules.tick_interval_ms, TICK_INTERVAL_MS);
    }
}
