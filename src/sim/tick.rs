//! Fixed-interval simulation tick
//!
//! One tick runs player movement, then every agent, then collisions. Each
//! stage re-checks that the game is still running, since an earlier stage may
//! have paused it (level advance) within the same tick.

use glam::IVec2;
use rand::Rng;

use super::collision::{CollisionOutcome, resolve_collisions};
use super::maze::Cell;
use super::movement::{Direction, is_passable, next_position};
use super::state::{GameEvent, GameState};
use crate::consts::{PELLET_SCORE, POWER_PELLET_SCORE};

/// Input intents delivered between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Queue a turn (also resumes a paused game)
    pub direction: Option<Direction>,
    /// Pause toggle
    pub pause: bool,
}

/// Record input into the state. Ignored entirely once the game is over.
pub fn apply_input(state: &mut GameState, input: &TickInput) {
    if state.is_game_over {
        return;
    }

    if let Some(dir) = input.direction.filter(|d| *d != Direction::None) {
        state.player.queued = dir;
        state.is_paused = false;
    }

    if input.pause {
        state.toggle_pause();
    }
}

/// Advance the game by one tick at driver time `now` (ms)
pub fn tick(state: &mut GameState, rng: &mut impl Rng, now: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if !state.is_running() {
        return events;
    }
    state.time_ticks += 1;

    move_player(state, now, &mut events);

    if state.is_running() {
        let target = state.player.pos;
        for agent in &mut state.agents {
            agent.step(&state.maze, target, rng);
        }
    }

    match resolve_collisions(state, now) {
        CollisionOutcome::Clear => {}
        CollisionOutcome::Eaten(ids) => {
            events.extend(ids.into_iter().map(|id| GameEvent::AgentEaten { id }));
        }
        CollisionOutcome::LifeLost { lives_left } => {
            events.push(GameEvent::LifeLost { lives_left });
        }
        CollisionOutcome::GameOver => {
            events.push(GameEvent::LifeLost { lives_left: 0 });
            events.push(GameEvent::GameOver { score: state.score });
        }
    }

    events
}

/// End frightened mode once `now` reaches its expiry.
///
/// Time-based, so the driver calls this every frame rather than every tick.
pub fn expire_frightened(state: &mut GameState, now: f64) -> Option<GameEvent> {
    if state.is_frightened && now >= state.frightened_until {
        state.exit_frightened();
        log::debug!("Frightened mode ended");
        Some(GameEvent::FrightenedEnded)
    } else {
        None
    }
}

/// Take the queued turn if possible, else keep going, else stop; then eat
fn move_player(state: &mut GameState, now: f64, events: &mut Vec<GameEvent>) {
    let player = &mut state.player;

    let turned = next_position(player.pos, player.queued);
    if player.queued != Direction::None && is_passable(&state.maze, turned) {
        player.direction = player.queued;
        player.pos = turned;
    } else {
        let ahead = next_position(player.pos, player.direction);
        if player.direction != Direction::None && is_passable(&state.maze, ahead) {
            player.pos = ahead;
        } else {
            player.direction = Direction::None;
        }
    }

    let pos = player.pos;
    eat_at(state, pos, now, events);
}

fn eat_at(state: &mut GameState, pos: IVec2, now: f64, events: &mut Vec<GameEvent>) {
    match state.maze.consume(pos) {
        Some(Cell::Pellet) => {
            state.add_score(PELLET_SCORE);
            events.push(GameEvent::PelletEaten { pos });
        }
        Some(Cell::PowerPellet) => {
            state.add_score(POWER_PELLET_SCORE);
            state.enter_frightened(now);
            log::debug!("Power pellet at {:?}, frightened until {}", pos, state.frightened_until);
            events.push(GameEvent::PowerPelletEaten { pos });
        }
        _ => return,
    }

    if state.maze.remaining_pellets() == 0 {
        let ticket = state.advance_level();
        events.push(GameEvent::LevelAdvanced {
            level: state.level,
            ticket,
        });
    }
}
