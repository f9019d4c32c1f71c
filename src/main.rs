//! Frente entry point
//!
//! Handles platform-specific initialization and drives a round from the
//! frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Fallback deck when the page doesn't supply one
const DEFAULT_WORDS: &[&str] = &[
    "Chale", "Cámara", "Guajolota", "Micrero", "Godínez", "Vagonero", "Quesadilla sin queso",
    "Metro Pantitlán", "¡Aguas!", "Bicitaxi", "Tianguis", "El Torito", "Gordita de chicharrón",
    "Echar la hueva", "Me late", "¿Qué transita?", "Awilson", "No manches", "Caer gordo",
    "Hacer vaca", "Teporocho", "Cantina", "Lucha Libre",
];

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use frente::Settings;
    use frente::audio::{Cue, CuePlayer};
    use frente::deck::Deck;
    use frente::platform::web::{self, OrientationSubscription};
    use frente::platform::{RawOrientation, SensorAccess};
    use frente::round::{
        FrameInput, Outcome, RoundController, RoundInput, RoundNotice, RoundResult, RoundState,
        RoundView,
    };

    /// Game instance holding all state
    struct Game {
        settings: Settings,
        deck: Deck,
        round: Option<RoundController>,
        /// Dropped on exit/end, which removes the DOM listener
        subscription: Option<OrientationSubscription>,
        /// Readings collected since the last frame
        readings: Vec<RawOrientation>,
        /// Tap collected since the last frame
        tap: Option<Outcome>,
        last_time: f64,
        last_view: Option<RoundView>,
        cues: CuePlayer,
    }

    impl Game {
        fn new(settings: Settings, deck: Deck) -> Self {
            let cues = CuePlayer::new(settings.effective_volume(), settings.haptics);
            Self {
                settings,
                deck,
                round: None,
                subscription: None,
                readings: Vec::new(),
                tap: None,
                last_time: 0.0,
                last_view: None,
                cues,
            }
        }

        /// Shuffle the deck and start a fresh round
        fn start_round(&mut self) -> bool {
            let seed = js_sys::Date::now() as u64;
            let words = self.deck.shuffled(seed);
            match RoundController::start(
                words,
                self.settings.round_secs(),
                self.settings.round_config(),
            ) {
                Ok(round) => {
                    self.round = Some(round);
                    self.readings.clear();
                    self.tap = None;
                    self.last_time = 0.0;
                    self.last_view = None;
                    web::set_class("summary", "hidden");
                    web::set_class("menu", "hidden");
                    web::set_class("round", "");
                    self.flush();
                    true
                }
                Err(e) => {
                    log::error!("Could not start round: {}", e);
                    false
                }
            }
        }

        /// Advance one frame
        fn update(&mut self, time: f64) {
            let elapsed_ms = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, 250.0) as u32
            } else {
                0
            };
            self.last_time = time;

            let frame = FrameInput {
                elapsed_ms,
                orientation: std::mem::take(&mut self.readings),
                manual: self.tap.take(),
            };
            if let Some(round) = self.round.as_mut() {
                round.step(&frame);
            }
            self.flush();
        }

        fn exit_round(&mut self) {
            if let Some(mut round) = self.round.take() {
                round.exit();
            }
            self.subscription = None;
            self.readings.clear();
            web::set_class("round", "hidden");
            web::set_class("menu", "");
            log::info!("Back to menu");
        }

        /// Apply pending notices to the page
        fn flush(&mut self) {
            let Some(round) = self.round.as_mut() else {
                return;
            };
            let mut finished = None;
            for notice in round.drain_notices() {
                match notice {
                    RoundNotice::Changed(view) => {
                        self.play_cues(&view);
                        render(&view);
                        self.last_view = Some(view);
                    }
                    RoundNotice::Finished(result) => finished = Some(result),
                }
            }
            if let Some(result) = finished {
                self.subscription = None;
                self.round = None;
                show_summary(&result);
            }
        }

        fn play_cues(&self, view: &RoundView) {
            let previous = self.last_view.as_ref().map(|v| &v.state);
            match (&view.state, previous) {
                (RoundState::Countdown(n), Some(RoundState::Countdown(m))) if n != m => {
                    self.cues.play(Cue::CountdownBeep)
                }
                (RoundState::Active, Some(RoundState::Countdown(_))) => self.cues.play(Cue::Go),
                (RoundState::Feedback { outcome, .. }, Some(RoundState::Active)) => {
                    self.cues.play((*outcome).into())
                }
                (RoundState::Ended, Some(RoundState::Active)) if view.remaining == 0 => {
                    self.cues.play(Cue::TimeUp)
                }
                _ => {}
            }
        }
    }

    fn render(view: &RoundView) {
        match view.countdown() {
            Some(n) => {
                web::set_class("countdown", "");
                web::set_text("countdown-value", &n.to_string());
            }
            None => web::set_class("countdown", "hidden"),
        }
        web::set_class(
            "sensor-btn",
            if view.offer_sensor_prompt() { "" } else { "hidden" },
        );
        web::set_text("word", view.current_word.as_deref().unwrap_or(""));
        web::set_text("timer", &view.clock_text());
        let flash = match view.feedback() {
            Some(Outcome::Correct) => "flash correct",
            Some(Outcome::Skip) => "flash skip",
            None => "",
        };
        web::set_class("round", flash);
    }

    fn show_summary(result: &RoundResult) {
        web::set_class("round", "hidden");
        web::set_class("summary", "");
        web::set_text("summary-score", &result.score().to_string());
        web::set_text("summary-correct", &result.correct.join(" · "));
        web::set_text("summary-skipped", &result.skipped.join(" · "));
    }

    /// Deck from `<script id="deck" type="application/json">`, or the built-in one
    fn load_deck() -> Deck {
        let from_page = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("deck"))
            .and_then(|el| el.text_content())
            .and_then(|json| serde_json::from_str::<Deck>(&json).ok())
            .and_then(|deck| Deck::new(deck.title, deck.words).ok());
        from_page.unwrap_or_else(|| {
            let words = super::DEFAULT_WORDS.iter().map(|w| w.to_string()).collect();
            Deck {
                title: "Chilango Básico".to_string(),
                words,
            }
        })
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Frente starting...");

        let settings = Settings::load();
        let deck = load_deck();
        log::info!("Deck '{}' with {} words", deck.title, deck.words.len());

        let game = Rc::new(RefCell::new(Game::new(settings, deck)));

        setup_tap_zones(game.clone());
        setup_sensor_button(game.clone());
        setup_exit_button(game.clone());
        setup_start_buttons(game.clone());
        setup_auto_exit(game.clone());

        if game.borrow_mut().start_round() {
            request_animation_frame(game);
        }

        log::info!("Frente running!");
    }

    fn on_click(id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            log::warn!("Missing element #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_tap_zones(game: Rc<RefCell<Game>>) {
        for (id, outcome) in [("tap-correct", Outcome::Correct), ("tap-skip", Outcome::Skip)] {
            let game = game.clone();
            on_click(id, move |_event| {
                let mut g = game.borrow_mut();
                g.cues.resume();
                g.tap = Some(outcome);
            });
        }
    }

    /// Sensor prompt has to run inside the click handler
    fn setup_sensor_button(game: Rc<RefCell<Game>>) {
        on_click("sensor-btn", move |_event| {
            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let access = web::request_permission().await;
                let mut g = game.borrow_mut();
                let Some(round) = g.round.as_mut() else {
                    return;
                };
                round.push(RoundInput::SensorAccess(access));
                round.pump();
                if access == SensorAccess::Granted && g.subscription.is_none() {
                    let sink = game.clone();
                    match OrientationSubscription::subscribe(move |raw| {
                        if let Ok(mut g) = sink.try_borrow_mut() {
                            g.readings.push(raw);
                        }
                    }) {
                        Ok(sub) => g.subscription = Some(sub),
                        Err(e) => log::warn!("Orientation subscribe failed: {:?}", e),
                    }
                }
                g.flush();
            });
        });
    }

    fn setup_exit_button(game: Rc<RefCell<Game>>) {
        on_click("exit-btn", move |_event| {
            game.borrow_mut().exit_round();
        });
    }

    /// Summary's "play again" and the menu's "start" both begin a new round
    fn setup_start_buttons(game: Rc<RefCell<Game>>) {
        for id in ["play-again", "start-btn"] {
            let game = game.clone();
            on_click(id, move |_event| {
                let started = {
                    let mut g = game.borrow_mut();
                    g.cues.resume();
                    g.round.is_none() && g.start_round()
                };
                if started {
                    request_animation_frame(game.clone());
                }
            });
        }
    }

    /// Leaving the tab abandons the round
    fn setup_auto_exit(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                if g.round.is_some() {
                    g.exit_round();
                    log::info!("Round abandoned (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Runs while a round exists; stops rescheduling once it ends or exits
    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let running = {
            let mut g = game.borrow_mut();
            g.update(time);
            g.round.is_some()
        };
        if running {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Frente (native) starting...");
    log::info!("Native mode plays a scripted round - run with `trunk serve` for the web version");

    demo_round();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Tap through a shuffled deck at ~60 fps, one answer every 2.5s
#[cfg(not(target_arch = "wasm32"))]
fn demo_round() {
    use frente::Settings;
    use frente::deck::Deck;
    use frente::round::{FrameInput, Outcome, RoundController, RoundNotice};

    let settings = Settings::load();
    let words = DEFAULT_WORDS.iter().map(|w| w.to_string()).collect();
    let deck = match Deck::new("Chilango Básico", words) {
        Ok(deck) => deck,
        Err(e) => {
            log::error!("Bad deck: {}", e);
            return;
        }
    };

    let mut round = match RoundController::start(
        deck.shuffled(42),
        settings.round_secs(),
        settings.round_config(),
    ) {
        Ok(round) => round,
        Err(e) => {
            log::error!("Could not start round: {}", e);
            return;
        }
    };

    const FRAME_MS: u32 = 16;
    let mut frame_index: u32 = 0;
    let mut answers: u32 = 0;
    loop {
        frame_index += 1;
        let manual = if frame_index % 156 == 0 {
            answers += 1;
            Some(if answers % 3 == 0 { Outcome::Skip } else { Outcome::Correct })
        } else {
            None
        };
        round.step(&FrameInput {
            elapsed_ms: FRAME_MS,
            manual,
            ..Default::default()
        });

        for notice in round.drain_notices() {
            if let RoundNotice::Finished(result) = notice {
                println!("\n¡SE ACABÓ! Score: {}", result.score());
                println!("  Correct: {}", result.correct.join(", "));
                println!("  Skipped: {}", result.skipped.join(", "));
                return;
            }
        }
    }
}
