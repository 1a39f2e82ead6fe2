//! Canvas Arcade entry point
//!
//! Wires the page (canvas, keyboard, touch, HUD elements) to a [`Session`]
//! and runs the frame loop. The native build plays a few scripted rounds.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use canvas_arcade::audio::{AudioManager, MusicCue, SoundEffect};
    use canvas_arcade::consts::*;
    use canvas_arcade::persistence::{KeyValueStore, LocalStore, MemoryStore};
    use canvas_arcade::platform::{InputState, Key};
    use canvas_arcade::renderer::scene::{Align, DrawCmd};
    use canvas_arcade::renderer::CanvasRenderer;
    use canvas_arcade::{ArcadeError, GameKind, Result, Session, Settings};

    thread_local! {
        static RUNNING: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    /// Everything the page needs for one running game
    struct App {
        session: Session,
        input: InputState,
        renderer: CanvasRenderer,
        audio: AudioManager,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        document: Document,
        // HUD text currently on the page
        shown_score: Option<u64>,
        shown_high: Option<u64>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let events = self
                .session
                .frame(time, &mut self.input, self.store.as_mut());
            for event in &events {
                if let Some(fx) = SoundEffect::for_event(self.session.kind, event) {
                    self.audio.play(fx);
                }
                if let Some(cue) = MusicCue::for_event(event) {
                    self.audio.cue(cue);
                }
            }

            self.track_fps(time);
            let mut cmds = self.session.scene(&self.settings);
            if self.settings.show_fps {
                cmds.push(DrawCmd::Text {
                    text: format!("{} fps", self.fps),
                    pos: Vec2::new(self.renderer.width() - 60.0, 20.0),
                    font: "12px monospace",
                    color: "#888",
                    align: Align::Left,
                });
            }
            self.renderer.draw(&cmds);
            self.update_hud();
        }

        /// Put a different game on the same canvas
        fn switch_to(&mut self, kind: GameKind) {
            let seed = js_sys::Date::now() as u64;
            self.session.switch_to(kind, seed, self.store.as_ref());
            self.input.release_all();
            self.input.clear_one_shots();
            self.audio.cue(MusicCue::Rewind);
            self.shown_score = None;
            self.shown_high = None;
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Oldest sample is the one about to be overwritten
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 && time > oldest {
                self.fps = (60_000.0 / (time - oldest)).round() as u32;
            }
        }

        /// Mirror score and high score into the page, if it has the elements
        fn update_hud(&mut self) {
            let score = self.session.score();
            if self.shown_score != Some(score) {
                if let Some(el) = self.document.get_element_by_id("score") {
                    el.set_text_content(Some(&format!("Score: {score}")));
                }
                self.shown_score = Some(score);
            }
            let high = self.session.high.best;
            if self.shown_high != Some(high) {
                if let Some(el) = self.document.get_element_by_id("high-score") {
                    el.set_text_content(Some(&self.session.high.label()));
                }
                self.shown_high = Some(high);
            }
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{e}; scores will not persist");
                Box::new(MemoryStore::new())
            }
        }
    }

    /// Canvas backing-store size, falling back to the defaults for an unsized canvas
    fn canvas_size(canvas: &HtmlCanvasElement) -> Vec2 {
        let w = match canvas.width() {
            0 => DEFAULT_CANVAS_WIDTH,
            w => w as f32,
        };
        let h = match canvas.height() {
            0 => DEFAULT_CANVAS_HEIGHT,
            h => h as f32,
        };
        Vec2::new(w, h)
    }

    /// Client coordinates to canvas pixels (the canvas may be CSS-scaled)
    fn canvas_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        let sx = if rect.width() > 0.0 {
            canvas.width() as f64 / rect.width()
        } else {
            1.0
        };
        let sy = if rect.height() > 0.0 {
            canvas.height() as f64 / rect.height()
        } else {
            1.0
        };
        Vec2::new(
            ((client_x - rect.left()) * sx) as f32,
            ((client_y - rect.top()) * sy) as f32,
        )
    }

    /// Start the game on `#game`. `kind` overrides the canvas `data-game` attribute;
    /// if a game is already running it is replaced by `kind` in place.
    pub fn start_game(kind: Option<&str>) -> Result<()> {
        if let Some(app) = RUNNING.with(|r| r.borrow().clone()) {
            match kind {
                Some(k) => app.borrow_mut().switch_to(k.parse()?),
                None => log::warn!("A game is already running on this page"),
            }
            return Ok(());
        }

        let window = web_sys::window().ok_or(ArcadeError::MissingElement("window"))?;
        let document = window
            .document()
            .ok_or(ArcadeError::MissingElement("document"))?;
        let Some(el) = document.get_element_by_id("game") else {
            log::warn!("No #game canvas on this page, nothing to start");
            return Ok(());
        };
        let canvas: HtmlCanvasElement = el
            .dyn_into()
            .map_err(|_| ArcadeError::MissingElement("canvas#game"))?;

        let kind: GameKind = match kind {
            Some(k) => k.parse()?,
            None => canvas
                .get_attribute("data-game")
                .as_deref()
                .unwrap_or("snake")
                .parse()?,
        };

        let size = canvas_size(&canvas);
        canvas.set_width(size.x as u32);
        canvas.set_height(size.y as u32);

        let mut store = open_store();
        let settings = Settings::open(store.as_mut());
        let seed = js_sys::Date::now() as u64;
        let session = Session::open(kind, size, seed, store.as_ref());

        let app = App {
            session,
            input: InputState::new(),
            renderer: CanvasRenderer::new(canvas.clone())?,
            audio: AudioManager::new(&settings),
            settings,
            store,
            document: document.clone(),
            shown_score: None,
            shown_high: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        };
        let app = Rc::new(RefCell::new(app));

        setup_keyboard(app.clone())?;
        setup_pointer(&canvas, app.clone())?;
        setup_auto_release(&document, app.clone())?;

        RUNNING.with(|r| *r.borrow_mut() = Some(app.clone()));
        request_animation_frame(app);
        log::info!("{kind} running");
        Ok(())
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) -> Result<()> {
        let window = web_sys::window().ok_or(ArcadeError::MissingElement("window"))?;

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_key(&event.key()) else {
                    return;
                };
                if key.scrolls_page() {
                    event.prevent_default();
                }
                let mut a = app.borrow_mut();
                a.audio.on_gesture();
                a.input.key_down(key);
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_key(&event.key()) {
                    app.borrow_mut().input.key_up(key);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<()> {
        // Click: space shots, restart on the game-over overlay
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let at = canvas_point(&canvas_clone, event.client_x() as f64, event.client_y() as f64);
                let mut a = app.borrow_mut();
                a.audio.on_gesture();
                a.input.click(at);
            });
            canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start (swipe origin)
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let at = canvas_point(&canvas_clone, touch.client_x() as f64, touch.client_y() as f64);
                    let mut a = app.borrow_mut();
                    a.audio.on_gesture();
                    a.input.touch_start(at);
                }
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch end (swipe or tap)
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let at = canvas_point(&canvas_clone, touch.client_x() as f64, touch.client_y() as f64);
                    app.borrow_mut().input.touch_end(at);
                }
            });
            canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    /// Drop held keys when the page loses focus, so nothing stays pressed
    fn setup_auto_release(document: &Document, app: Rc<RefCell<App>>) -> Result<()> {
        let window = web_sys::window().ok_or(ArcadeError::MissingElement("window"))?;

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut a = app.borrow_mut();
                    a.input.release_all();
                    a.session.pause_clock();
                    log::info!("Tab hidden, input released");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().input.release_all();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Canvas Arcade starting...");
    canvas_arcade::widgets::start();
    if let Err(e) = wasm_game::start_game(None) {
        log::error!("Could not start game: {e}");
    }
}

/// Start (or override) the game on the `#game` canvas
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_game(kind: &str) -> Result<(), JsValue> {
    wasm_game::start_game(Some(kind)).map_err(Into::into)
}

/// Refresh the visitor counter and weather widgets
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_widgets() {
    canvas_arcade::widgets::start();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Canvas Arcade (native) starting...");
    log::info!("The games need a browser - build for wasm32 and serve index.html");

    println!("\nPlaying scripted rounds...");
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use canvas_arcade::GameKind;
    use canvas_arcade::Session;
    use canvas_arcade::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
    use canvas_arcade::persistence::MemoryStore;
    use canvas_arcade::platform::{InputState, Key};
    use canvas_arcade::sim::GamePhase;
    use glam::Vec2;

    const MAX_TICKS: u32 = 20_000;

    /// Hold one key and let each game play until the round ends
    pub fn run() {
        let mut store = MemoryStore::new();
        let canvas = Vec2::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT);
        for kind in GameKind::ALL {
            let mut session = Session::open(kind, canvas, 7, &store);
            let mut input = InputState::new();
            let key = match kind {
                GameKind::Space => Key::D,
                _ => Key::ArrowRight,
            };
            input.key_down(key);

            let mut ticks = 0;
            while session.phase() != GamePhase::GameOver && ticks < MAX_TICKS {
                session.tick(&mut input, &mut store);
                input.clear_one_shots();
                ticks += 1;
            }
            println!(
                "{kind:>13}: {:?} after {ticks} ticks, score {}, best {}",
                session.phase(),
                session.score(),
                session.high.best
            );
        }
    }
}
