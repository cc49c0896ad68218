//! AR Asteroids entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, XrFrame};

    use ar_asteroids::assets::{Asset, AssetRegistry};
    use ar_asteroids::platform::web::{
        DomPresenter, XrContext, XrFrameSource, is_ar_supported, listen_for_tilt, start_session,
    };
    use ar_asteroids::presentation::Presenter;
    use ar_asteroids::{Session, SessionError, Settings, Tuning};

    thread_local! {
        /// Model readiness, flipped by the page's loaders via `asset_loaded`
        static ASSETS: RefCell<AssetRegistry> = RefCell::new(AssetRegistry::new());
        /// Page renderer registered via `set_render_callback`
        static RENDER_CALLBACK: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
    }

    /// Register the page's renderer. Called every simulated frame with
    /// `(instances, view, projection)` as `Float32Array`s; each instance is
    /// a column-major model matrix followed by its kind (0 asteroid, 1 laser)
    /// and three padding floats.
    #[wasm_bindgen]
    pub fn set_render_callback(callback: js_sys::Function) {
        RENDER_CALLBACK.with(|c| *c.borrow_mut() = Some(callback));
    }

    /// Called by the host page when a model finishes loading
    #[wasm_bindgen]
    pub fn asset_loaded(name: &str) {
        let asset = match name {
            "asteroid" => Asset::AsteroidModel,
            "laser" => Asset::LaserModel,
            other => {
                log::warn!("Unknown asset '{other}'");
                return;
            }
        };
        ASSETS.with(|a| {
            let mut registry = a.borrow_mut();
            registry.mark_ready(asset);
            if registry.all_ready() {
                log::info!("All models loaded");
            }
        });
    }

    /// Game instance holding all per-session state
    struct Game {
        session: Session,
        presenter: DomPresenter,
        xr: XrContext,
        tilt: Rc<Cell<Option<f32>>>,
    }

    impl Game {
        fn on_xr_frame(&mut self, time: f64, frame: &XrFrame) {
            let mut source = XrFrameSource {
                frame,
                ctx: &self.xr,
                tilt: &self.tilt,
            };
            source.prepare_framebuffer();
            ASSETS.with(|assets| {
                let assets = assets.borrow();
                self.session
                    .frame_from(&mut source, time, &*assets, &mut self.presenter);
            });
        }
    }

    /// Tuning from `<body data-tuning='{...}'>`, defaults otherwise
    fn load_tuning(document: &Document) -> Tuning {
        let json = document
            .body()
            .and_then(|b| b.get_attribute("data-tuning"));
        match json.map(|j| Tuning::from_json(&j)) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning from page");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("{e}; using default tuning");
                Tuning::default()
            }
            None => Tuning::default(),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("AR Asteroids starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to attach to");
            return;
        };

        if !is_ar_supported().await {
            let mut presenter = DomPresenter::new(document, Settings::load(), None);
            presenter.on_session_error(&SessionError::Unsupported);
            return;
        }

        let Some(button) = document.get_element_by_id("enter-ar") else {
            log::error!("Missing #enter-ar button");
            return;
        };
        let on_click = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            wasm_bindgen_futures::spawn_local(enter_ar());
        });
        let _ = button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
        on_click.forget();
    }

    /// Runs on the Start AR button (user gesture required by the platform)
    async fn enter_ar() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let render = RENDER_CALLBACK.with(|c| c.borrow().clone());
        if render.is_none() {
            log::warn!("No render callback registered; entities will not be drawn");
        }
        let mut presenter = DomPresenter::new(document.clone(), Settings::load(), render);

        let xr = match start_session(&document).await {
            Ok(xr) => xr,
            Err(e) => {
                presenter.on_session_error(&e);
                return;
            }
        };
        presenter.on_session_started();

        let tuning = load_tuning(&document);
        let seed = js_sys::Date::now() as u64;
        log::info!("Session seed: {seed}");

        let tilt = Rc::new(Cell::new(None));
        if tuning.tilt.enabled {
            listen_for_tilt(tilt.clone());
        }

        let session = match Session::new(seed, tuning) {
            Ok(session) => session,
            Err(e) => {
                log::error!("{e}");
                let _ = xr.session.end();
                return;
            }
        };

        let xr_session = xr.session.clone();
        let game = Rc::new(RefCell::new(Game {
            session,
            presenter,
            xr,
            tilt,
        }));

        setup_session_end(&xr_session, game.clone());
        setup_mute_on_blur(&document, game.clone());
        setup_mute_toggle(&document, game.clone());
        request_xr_frame(xr_session, game);
        log::info!("AR Asteroids running!");
    }

    /// Stop the loop and timers when the platform ends the session
    fn setup_session_end(xr_session: &web_sys::XrSession, game: Rc<RefCell<Game>>) {
        let on_end = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            let Game {
                session, presenter, ..
            } = &mut *g;
            session.end(presenter);
        });
        let _ = xr_session.add_event_listener_with_callback("end", on_end.as_ref().unchecked_ref());
        on_end.forget();
    }

    fn setup_mute_on_blur(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            game.borrow_mut().presenter.set_page_hidden(hidden);
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// `#mute-toggle` flips and saves the mute preference
    fn setup_mute_toggle(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(button) = document.get_element_by_id("mute-toggle") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().presenter.toggle_muted();
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_xr_frame(xr_session: web_sys::XrSession, game: Rc<RefCell<Game>>) {
        let handle = xr_session.clone();
        let closure = Closure::once(move |time: f64, frame: XrFrame| {
            xr_loop(handle, game, time, frame);
        });
        xr_session.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// The next frame is requested only while the session lives
    fn xr_loop(xr_session: web_sys::XrSession, game: Rc<RefCell<Game>>, time: f64, frame: XrFrame) {
        {
            let mut g = game.borrow_mut();
            if g.session.is_ended() {
                log::info!("XR frame loop stopped");
                return;
            }
            g.on_xr_frame(time, &frame);
        }

        request_xr_frame(xr_session, game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("AR Asteroids (native) starting...");
    log::info!("Native mode replays a scripted headset; run with `trunk serve` for WebXR");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| ar_asteroids::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => ar_asteroids::Tuning::default(),
    };

    headless::run(tuning, 60 * 60);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec3;

    use ar_asteroids::assets::AlwaysReady;
    use ar_asteroids::consts::{DEFAULT_SEED, NOMINAL_FRAME_MS};
    use ar_asteroids::platform::{Clock, ManualClock, ScriptedPoseSource};
    use ar_asteroids::presentation::{FrameSnapshot, HudState, Presenter};
    use ar_asteroids::{Session, Tuning};

    /// Logs what a browser overlay would show
    #[derive(Default)]
    struct LogPresenter {
        hud: HudState,
        hits: u32,
        reached: u32,
    }

    impl Presenter for LogPresenter {
        fn on_frame_update(&mut self, snapshot: &FrameSnapshot<'_>) {
            let hud = HudState::from_snapshot(snapshot);
            let changes = hud.changes_since(&self.hud);
            if let Some(score) = changes.score_text {
                log::debug!("score: {score}");
            }
            for class in &changes.add_classes {
                log::info!("body class += {class}");
            }
            self.hud = hud;
        }

        fn on_stabilized(&mut self) {
            log::info!("Surface found");
        }

        fn on_game_started(&mut self) {
            log::info!("Asteroids incoming");
        }

        fn on_hit(&mut self, pos: Vec3) {
            self.hits += 1;
            log::info!("Boom at ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z);
        }

        fn on_asteroid_reached_player(&mut self) {
            self.reached += 1;
            log::info!("Ouch");
        }

        fn on_session_ended(&mut self) {
            log::info!(
                "Final score {} ({} hits, {} reached)",
                self.hud.score_text,
                self.hits,
                self.reached
            );
        }
    }

    pub fn run(tuning: Tuning, frames: u64) {
        let mut session = match Session::new(DEFAULT_SEED, tuning) {
            Ok(session) => session,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        let mut source = ScriptedPoseSource::new()
            .lock_on_after(45)
            .sweep(0.35, 720.0)
            .dropout(900..960);
        let clock = ManualClock::new(0.0);
        let mut presenter = LogPresenter::default();

        for _ in 0..frames {
            session.frame_from(&mut source, clock.now_ms(), &AlwaysReady, &mut presenter);
            source.advance();
            clock.advance(NOMINAL_FRAME_MS);
        }
        session.end(&mut presenter);
    }
}
