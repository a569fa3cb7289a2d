//! Player/agent collision detection and response
//!
//! Collisions are exact cell co-location checked once per tick after all
//! movement. While frightened, every agent on the player's cell is eaten.
//! Otherwise the first agent (A, B, C, D order) costs a life and processing
//! stops.

use super::agent::AgentId;
use super::state::GameState;
use crate::consts::AGENT_SCORE;

/// Result of a collision pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Nothing touched the player (or collisions were suppressed)
    Clear,
    /// Frightened agents caught by the player, in processing order
    Eaten(Vec<AgentId>),
    /// A life was lost; positions were reset and the game paused
    LifeLost { lives_left: u8 },
    /// The last life was lost
    GameOver,
}

/// Resolve player/agent contact at driver time `now` (ms)
pub fn resolve_collisions(state: &mut GameState, now: f64) -> CollisionOutcome {
    if !state.is_running() || now < state.collision_cooldown_until {
        return CollisionOutcome::Clear;
    }

    let player_pos = state.player.pos;
    let mut eaten = Vec::new();

    for id in AgentId::ALL {
        if state.agent(id).pos != player_pos {
            continue;
        }

        if state.is_frightened {
            state.add_score(AGENT_SCORE);
            state.agent_mut(id).send_home();
            log::debug!("{} sent home", id.name());
            eaten.push(id);
        } else {
            let lives_left = state.lose_life(now);
            return if lives_left == 0 {
                CollisionOutcome::GameOver
            } else {
                CollisionOutcome::LifeLost { lives_left }
            };
        }
    }

    if eaten.is_empty() {
        CollisionOutcome::Clear
    } else {
        CollisionOutcome::Eaten(eaten)
    }
}
