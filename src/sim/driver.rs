//! Game loop driver
//!
//! Owns the monotonic clock and the seeded RNG. The host calls
//! [`Driver::advance`] once per frame with the elapsed time; ticks run at most
//! once per `tick_interval_ms`, while the frightened expiry is checked every
//! frame.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{GameEvent, GameState, QuoteTicket, Rules};
use super::tick::{TickInput, apply_input, expire_frightened, tick};

pub struct Driver {
    state: GameState,
    rng: Pcg32,
    /// Milliseconds since the driver started
    clock_ms: f64,
    last_tick_ms: f64,
}

impl Driver {
    pub fn new(seed: u64) -> Self {
        Self::with_rules(seed, Rules::default())
    }

    pub fn with_rules(seed: u64, rules: Rules) -> Self {
        Self::from_state(GameState::with_rules(seed, rules))
    }

    /// Drive an existing state; the RNG is seeded from `state.seed`
    pub fn from_state(state: GameState) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(state.seed),
            state,
            clock_ms: 0.0,
            last_tick_ms: 0.0,
        }
    }

    /// Read-only view for rendering
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current driver time (ms)
    pub fn now(&self) -> f64 {
        self.clock_ms
    }

    /// Record an input intent; takes effect at the next tick
    pub fn handle_input(&mut self, input: &TickInput) {
        apply_input(&mut self.state, input);
    }

    /// Deliver a fetched quote. Stale tickets are ignored.
    pub fn apply_quote(&mut self, ticket: QuoteTicket, quote: String) -> bool {
        self.state.apply_quote(ticket, quote)
    }

    /// Full restart with a new seed, keeping the rules
    pub fn restart(&mut self, seed: u64) {
        let rules = self.state.rules;
        *self = Self::with_rules(seed, rules);
        log::info!("Game restarted with seed: {}", seed);
    }

    /// Advance the clock by `dt_ms` and run whatever is due
    pub fn advance(&mut self, dt_ms: f64) -> Vec<GameEvent> {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.clock_ms += dt_ms;

        let mut events = Vec::new();
        if self.clock_ms - self.last_tick_ms > self.state.rules.tick_interval_ms {
            events = tick(&mut self.state, &mut self.rng, self.clock_ms);
            self.last_tick_ms = self.clock_ms;
        }

        events.extend(expire_frightened(&mut self.state, self.clock_ms));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_INTERVAL_MS;
    use crate::sim::agent::AgentState;
    use crate::sim::maze::Cell;
    use crate::sim::movement::{Direction, is_passable};
    use glam::IVec2;
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn go(dir: Direction) -> TickInput {
        TickInput {
            direction: Some(dir),
            pause: false,
        }
    }

    #[test]
    fn test_ticks_are_throttled() {
        let mut driver = Driver::new(7);
        driver.handle_input(&go(Direction::Left));

        // 10 frames = ~167ms, below the tick interval
        for _ in 0..10 {
            driver.advance(FRAME_MS);
        }
        assert_eq!(driver.state().time_ticks, 0);

        driver.advance(FRAME_MS);
        assert_eq!(driver.state().time_ticks, 1);

        // One tick per interval, however many frames arrive
        for _ in 0..60 {
            driver.advance(FRAME_MS);
        }
        let ticks = driver.state().time_ticks;
        assert!((5..=6).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn test_bad_deltas_do_not_rewind() {
        let mut driver = Driver::new(7);
        driver.advance(50.0);
        driver.advance(-100.0);
        driver.advance(f64::NAN);
        assert_eq!(driver.now(), 50.0);
    }

    #[test]
    fn test_frightened_expiry_is_checked_every_frame() {
        let mut driver = Driver::new(7);
        driver.state.is_paused = false;
        driver.state.player.pos = IVec2::new(2, 1);
        driver.state.player.queued = Direction::Left;

        driver.advance(TICK_INTERVAL_MS + 1.0);
        assert!(driver.state().is_frightened);
        let until = driver.state().frightened_until;

        // Pause so no further ticks run; the expiry still fires
        driver.handle_input(&TickInput {
            pause: true,
            ..Default::default()
        });
        while driver.now() < until {
            let events = driver.advance(FRAME_MS);
            if driver.now() < until {
                assert!(events.is_empty());
            } else {
                assert_eq!(events, vec![GameEvent::FrightenedEnded]);
            }
        }
        assert!(!driver.state().is_frightened);
        assert!(
            driver
                .state()
                .agents
                .iter()
                .all(|a| a.state == AgentState::Chase)
        );
    }

    #[test]
    fn test_determinism() {
        let run = |seed| {
            let mut driver = Driver::new(seed);
            let script = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];
            for (i, dir) in script.iter().cycle().take(400).enumerate() {
                if i % 7 == 0 {
                    driver.handle_input(&go(*dir));
                }
                driver.advance(FRAME_MS * 3.0);
            }
            let s = driver.state();
            (
                s.score,
                s.lives,
                s.level,
                s.player.pos,
                s.agents.iter().map(|a| a.pos).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(99999), run(99999));
    }

    #[test]
    fn test_restart_keeps_rules() {
        let rules = Rules {
            initial_lives: 5,
            ..Rules::default()
        };
        let mut driver = Driver::with_rules(1, rules);
        driver.handle_input(&go(Direction::Left));
        driver.advance(1000.0);
        driver.restart(2);
        assert_eq!(driver.state().lives, 5);
        assert_eq!(driver.state().seed, 2);
        assert_eq!(driver.now(), 0.0);
        assert_eq!(driver.state().time_ticks, 0);
    }

    fn arb_input() -> impl Strategy<Value = Option<TickInput>> {
        prop_oneof![
            3 => Just(None),
            1 => prop::sample::select(Direction::ALL.to_vec()).prop_map(|d| Some(go(d))),
            1 => Just(Some(TickInput { direction: None, pause: true })),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_score_monotonic_and_no_walls(
            seed in any::<u64>(),
            frames in prop::collection::vec((arb_input(), 0.0f64..400.0), 1..300),
        ) {
            let mut driver = Driver::new(seed);
            let mut last_score = 0;
            for (input, dt) in frames {
                if let Some(input) = input {
                    driver.handle_input(&input);
                }
                driver.advance(dt);

                let state = driver.state();
                prop_assert!(state.score >= last_score);
                last_score = state.score;
                prop_assert!(is_passable(&state.maze, state.player.pos));
                prop_assert_ne!(state.maze.cell(state.player.pos), Some(Cell::Wall));
                for agent in &state.agents {
                    prop_assert!(is_passable(&state.maze, agent.pos));
                }
                prop_assert_eq!(state.is_game_over, state.lives == 0);
            }
        }
    }
}
