//! Sparkle Maze entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::IVec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent};

    use sparkle_maze::Settings;
    use sparkle_maze::consts::{HEIGHT, WIDTH};
    use sparkle_maze::input::map_key;
    use sparkle_maze::quote::{GeminiClient, fetch_encouragement_quote};
    use sparkle_maze::sim::{Driver, GameEvent, QuoteTicket, TickInput};
    use sparkle_maze::view::{self, Glyph};

    /// Game instance holding all state
    struct Game {
        driver: Driver,
        quotes: GeminiClient,
        last_time: f64,
        /// Board cells, row-major
        cells: Vec<Element>,
        /// Last drawn glyph per cell, to skip unchanged DOM writes
        drawn: Vec<Option<Glyph>>,
    }

    impl Game {
        fn new(settings: &Settings, seed: u64, cells: Vec<Element>) -> Self {
            let drawn = vec![None; cells.len()];
            Self {
                driver: Driver::with_rules(seed, settings.rules),
                quotes: GeminiClient::from_env(settings.quote.clone()),
                last_time: 0.0,
                cells,
                drawn,
            }
        }

        /// Run the driver for one frame; returns quote tickets to fetch
        fn update(&mut self, time: f64) -> Vec<QuoteTicket> {
            let dt = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                0.0
            };
            self.last_time = time;

            let mut tickets = Vec::new();
            for event in self.driver.advance(dt) {
                match event {
                    GameEvent::LevelAdvanced { ticket, .. } => tickets.push(ticket),
                    GameEvent::GameOver { score } => log::info!("Final score: {}", score),
                    other => log::debug!("{:?}", other),
                }
            }
            tickets
        }

        /// Redraw changed board cells
        fn render(&mut self) {
            let state = self.driver.state();
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    let idx = (y * WIDTH + x) as usize;
                    let glyph = view::glyph_at(state, IVec2::new(x, y));
                    if self.drawn[idx] == Some(glyph) {
                        continue;
                    }
                    let el = &self.cells[idx];
                    el.set_class_name(&glyph.css_class());
                    let style = match glyph {
                        Glyph::Agent {
                            id,
                            frightened: false,
                        } => format!("color: {}", id.color()),
                        _ => String::new(),
                    };
                    let _ = el.set_attribute("style", &style);
                    self.drawn[idx] = Some(glyph);
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = self.driver.state();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&view::score_text(state.score)));
            }
            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                el.set_text_content(Some(&state.level.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-lives .hud-value").ok().flatten() {
                el.set_text_content(Some(&"♥".repeat(state.lives as usize)));
            }
            if let Some(el) = document.get_element_by_id("quote") {
                el.set_text_content(Some(&format!("\"{}\"", state.message)));
            }

            if let Some(el) = document.get_element_by_id("overlay") {
                match view::overlay(state) {
                    Some(overlay) => {
                        let _ = el.set_attribute("class", "");
                        if let Some(title) = document.get_element_by_id("overlay-title") {
                            title.set_text_content(Some(overlay.title));
                        }
                        if let Some(body) = document.get_element_by_id("overlay-body") {
                            body.set_text_content(Some(overlay.body));
                        }
                        if let Some(btn) = document.get_element_by_id("restart-btn") {
                            let class = if overlay.restart { "" } else { "hidden" };
                            let _ = btn.set_attribute("class", class);
                        }
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            self.driver.restart(seed);
            self.last_time = 0.0;
            self.drawn.iter_mut().for_each(|d| *d = None);
        }
    }

    /// Create one `div` per maze cell inside `#board`
    fn build_board(document: &Document) -> Result<Vec<Element>, JsValue> {
        let board = document
            .get_element_by_id("board")
            .ok_or_else(|| JsValue::from_str("no #board element"))?;
        let _ = board.set_attribute(
            "style",
            &format!(
                "grid-template-columns: repeat({}, var(--tile)); grid-template-rows: repeat({}, var(--tile))",
                WIDTH, HEIGHT
            ),
        );

        let mut cells = Vec::with_capacity((WIDTH * HEIGHT) as usize);
        for _ in 0..WIDTH * HEIGHT {
            let cell = document.create_element("div")?;
            board.append_child(&cell)?;
            cells.push(cell);
        }
        Ok(cells)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sparkle Maze starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        // Store back with every field filled in so it can be edited in place
        settings.save();
        let cells = build_board(&document).expect("failed to build board");

        let seed = settings.seed_or(js_sys::Date::now() as u64);
        let game = Rc::new(RefCell::new(Game::new(&settings, seed, cells)));
        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Sparkle Maze running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(input) = map_key(&event.key()) {
                event.prevent_default();
                game.borrow_mut().driver.handle_input(&input);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        let pause_if_running = |game: &Rc<RefCell<Game>>, why: &str| {
            let mut g = game.borrow_mut();
            if g.driver.state().is_running() {
                g.driver.handle_input(&TickInput {
                    direction: None,
                    pause: true,
                });
                log::info!("Auto-paused ({})", why);
            }
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    pause_if_running(&game, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                pause_if_running(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Fire-and-forget quote fetch; stale replies are dropped by the ticket check
    fn spawn_quote_fetch(game: Rc<RefCell<Game>>, ticket: QuoteTicket) {
        let client = game.borrow().quotes.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let mut rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64);
            let quote = fetch_encouragement_quote(&client, &mut rng).await;
            game.borrow_mut().driver.apply_quote(ticket, quote);
        });
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let tickets = {
            let mut g = game.borrow_mut();
            let tickets = g.update(time);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
            tickets
        };

        for ticket in tickets {
            spawn_quote_fetch(game.clone(), ticket);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run: a random autopilot plays at 60 fps until game over or the
/// frame budget runs out, then the final board is printed.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use sparkle_maze::Settings;
    use sparkle_maze::quote::{GeminiClient, fetch_encouragement_quote};
    use sparkle_maze::sim::{Direction, Driver, GameEvent, TickInput};
    use sparkle_maze::view;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    env_logger::init();
    log::info!("Sparkle Maze (native) starting...");

    let settings = Settings::load();
    settings.save();
    let clock_seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let seed = settings.seed_or(clock_seed);
    log::info!("Game initialized with seed: {}", seed);

    let quotes = GeminiClient::from_env(settings.quote.clone());
    let mut driver = Driver::with_rules(seed, settings.rules);
    let mut pilot = Pcg32::seed_from_u64(seed ^ 0x5eed);

    for frame in 0..MAX_FRAMES {
        if frame % 20 == 0 {
            let dir = Direction::ALL[pilot.random_range(0..Direction::ALL.len())];
            driver.handle_input(&TickInput {
                direction: Some(dir),
                pause: false,
            });
        }

        for event in driver.advance(FRAME_MS) {
            match event {
                GameEvent::LevelAdvanced { level, ticket } => {
                    let quote = pollster::block_on(fetch_encouragement_quote(&quotes, &mut pilot));
                    log::info!("Level {}: \"{}\"", level, quote);
                    driver.apply_quote(ticket, quote);
                }
                other => log::debug!("{:?}", other),
            }
        }

        if driver.state().is_game_over {
            break;
        }
    }

    let state = driver.state();
    print!("{}", view::render_text(state));
    println!(
        "SCORE {}  LEVEL {}  LIVES {}  \"{}\"",
        view::score_text(state.score),
        state.level,
        state.lives,
        state.message
    );

    if std::env::args().any(|a| a == "--json") {
        match serde_json::to_string_pretty(state) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Cannot serialize state: {}", e),
        }
    }
}
