//! Vibe Arcade entry point
//!
//! On the web this wires the canvas, DOM HUD, input and music to a game
//! loop. Natively it runs a short headless session with a scripted pilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent, TouchEvent};

    use vibe_arcade::GameKind;
    use vibe_arcade::audio::{AudioSink, HtmlAudio, SilentAudio};
    use vibe_arcade::consts::*;
    use vibe_arcade::engine::{FrameOutcome, GameLoop, Phase, StepPolicy, Viewport};
    use vibe_arcade::hud::{HudSnapshot, format_clock};
    use vibe_arcade::platform::{EventListeners, FrameScheduler, default_store, request_idle};
    use vibe_arcade::renderer::{FrameBuilder, RenderState};
    use vibe_arcade::runner::RunnerState;
    use vibe_arcade::settings::Settings;
    use vibe_arcade::survivor::SurvivorState;
    use vibe_arcade::tuning::Tuning;

    /// Touch drag distance (CSS px) that maps to a full joystick deflection
    const JOYSTICK_RANGE: f32 = 60.0;

    enum Active {
        Runner(GameLoop<RunnerState>),
        Survivor(GameLoop<SurvivorState>),
    }

    /// Everything one page session owns
    struct Game {
        kind: GameKind,
        active: Active,
        settings: Settings,
        frames: FrameBuilder,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        viewport: Viewport,
        last_compaction_ms: f64,
        touch_origin: Option<Vec2>,
        last_phase: Option<Phase>,
    }

    impl Game {
        fn new(kind: GameKind, canvas: HtmlCanvasElement, seed: u64) -> Self {
            let tuning = Tuning::default();
            let settings = Settings::load(default_store().as_ref());
            let tier = settings.quality.initial_tier();
            let active = match kind {
                GameKind::Runner => {
                    let mut state = RunnerState::new(&tuning.runner, &tuning.quality, tier, seed);
                    state.effects = settings.effects();
                    state.quality.set_enabled(settings.adaptive_quality);
                    let lp = GameLoop::new(state, StepPolicy::fixed_60hz(), &tuning.quality);
                    Active::Runner(
                        lp.with_audio(music(&settings))
                            .with_high_score(kind.high_score_key(), default_store()),
                    )
                }
                GameKind::Survivor => {
                    let mut state =
                        SurvivorState::new(&tuning.survivor, &tuning.quality, tier, seed);
                    state.effects = settings.effects();
                    state.quality.set_enabled(settings.adaptive_quality);
                    let lp = GameLoop::new(state, StepPolicy::PerFrame, &tuning.quality);
                    Active::Survivor(
                        lp.with_audio(music(&settings))
                            .with_high_score(kind.high_score_key(), default_store()),
                    )
                }
            };
            Self {
                kind,
                active,
                settings,
                frames: FrameBuilder::new(Viewport::default()),
                render_state: None,
                canvas,
                viewport: Viewport::default(),
                last_compaction_ms: 0.0,
                touch_origin: None,
                last_phase: None,
            }
        }

        fn phase(&self) -> Phase {
            match &self.active {
                Active::Runner(lp) => lp.phase(),
                Active::Survivor(lp) => lp.phase(),
            }
        }

        fn hud(&self) -> HudSnapshot {
            match &self.active {
                Active::Runner(lp) => lp.hud(),
                Active::Survivor(lp) => lp.hud(),
            }
        }

        fn start(&mut self, seed: u64) {
            match &mut self.active {
                Active::Runner(lp) => {
                    lp.session_mut().set_seed(seed);
                    lp.start();
                }
                Active::Survivor(lp) => {
                    lp.session_mut().set_seed(seed);
                    lp.start();
                }
            }
            self.touch_origin = None;
            log::info!("Started {} with seed {}", self.kind.as_str(), seed);
        }

        fn toggle_pause(&mut self) {
            match &mut self.active {
                Active::Runner(lp) => lp.toggle_pause(),
                Active::Survivor(lp) => lp.toggle_pause(),
            }
        }

        fn pause(&mut self) {
            match &mut self.active {
                Active::Runner(lp) => lp.pause(),
                Active::Survivor(lp) => lp.pause(),
            }
        }

        fn continue_after_victory(&mut self) {
            if let Active::Survivor(lp) = &mut self.active {
                lp.continue_after_victory();
            }
        }

        fn choose(&mut self, index: usize) {
            if let Active::Survivor(lp) = &mut self.active {
                if !lp.session_mut().choose_upgrade(index) {
                    log::warn!("No upgrade choice at index {index}");
                }
            }
        }

        fn exit(&mut self) {
            match &mut self.active {
                Active::Runner(lp) => lp.exit(),
                Active::Survivor(lp) => lp.exit(),
            }
            self.touch_origin = None;
        }

        fn compact_pools(&mut self) {
            match &mut self.active {
                Active::Runner(lp) => lp.compact_pools(),
                Active::Survivor(lp) => lp.compact_pools(),
            };
        }

        /// Match the drawing buffer to the element size at the current DPR
        fn sync_canvas_size(&mut self) -> Viewport {
            let dpr = web_sys::window()
                .map(|w| w.device_pixel_ratio())
                .unwrap_or(1.0);
            let width = (self.canvas.client_width().max(0) as f64 * dpr) as u32;
            let height = (self.canvas.client_height().max(0) as f64 * dpr) as u32;
            let viewport = Viewport::new(width, height);
            if viewport != self.viewport {
                self.viewport = viewport;
                if viewport.is_ready() {
                    self.canvas.set_width(width);
                    self.canvas.set_height(height);
                    if let Some(rs) = &mut self.render_state {
                        rs.resize(viewport);
                    }
                    self.frames.resize(viewport);
                    log::info!("Canvas resized to {width}x{height}");
                }
            }
            viewport
        }

        fn tick(&mut self, now_ms: f64) -> FrameOutcome {
            let viewport = self.sync_canvas_size();
            match &mut self.active {
                Active::Runner(lp) => lp.tick(now_ms, viewport),
                Active::Survivor(lp) => lp.tick(now_ms, viewport),
            }
        }

        fn render(&mut self) {
            let Some(render_state) = &mut self.render_state else {
                return;
            };
            let batch = match &self.active {
                Active::Runner(lp) => self.frames.runner(lp.session()),
                Active::Survivor(lp) => self.frames.survivor(lp.session()),
            };
            match render_state.render(batch) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = render_state.size;
                    render_state.surface.configure(&render_state.device, &render_state.config);
                    log::warn!("Surface lost, reconfigured at {}x{}", size.width, size.height);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn set_hold(&mut self, held: bool) {
            if let Active::Runner(lp) = &mut self.active {
                lp.input_mut().hold = held;
            }
        }

        fn set_key(&mut self, code: &str, down: bool) {
            match &mut self.active {
                Active::Runner(lp) => {
                    if matches!(code, "Space" | "ArrowUp" | "KeyW") {
                        lp.input_mut().hold = down;
                    }
                }
                Active::Survivor(lp) => {
                    let input = lp.input_mut();
                    match code {
                        "ArrowUp" | "KeyW" => input.up = down,
                        "ArrowDown" | "KeyS" => input.down = down,
                        "ArrowLeft" | "KeyA" => input.left = down,
                        "ArrowRight" | "KeyD" => input.right = down,
                        "Space" | "ShiftLeft" | "ShiftRight" => {
                            if down {
                                input.dash = true;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        fn set_joystick(&mut self, axis: Vec2) {
            if let Active::Survivor(lp) = &mut self.active {
                lp.input_mut().joystick = axis;
            }
        }

        /// Project the HUD snapshot into the page's elements
        fn update_hud(&mut self, document: &Document) {
            let hud = self.hud();
            set_text(document, "hud-score", &hud.score.to_string());
            set_text(document, "hud-best", &hud.high_score.to_string());
            set_text(document, "hud-time", &format_clock(hud.elapsed_secs));
            set_text(
                document,
                "hud-health",
                &format!("{:.0}/{:.0}", hud.health, hud.max_health),
            );
            if self.kind == GameKind::Survivor {
                set_text(document, "hud-level", &hud.level.to_string());
                set_text(
                    document,
                    "hud-xp",
                    &format!("{:.0}%", hud.xp_progress * 100.0),
                );
                let weapons: Vec<String> = hud
                    .weapons
                    .iter()
                    .map(|(name, level)| format!("{name} {level}"))
                    .collect();
                set_text(document, "hud-weapons", &weapons.join(" · "));
            } else {
                set_text(document, "hud-distance", &format!("{:.0}m", hud.distance / 10.0));
            }
            show(document, "hud-fps", self.settings.show_fps);
            if self.settings.show_fps {
                set_text(document, "hud-fps", &format!("{:.0}", hud.fps));
            }

            for (i, label) in hud.choices.iter().enumerate() {
                set_text(document, &format!("choice-{i}"), label);
            }

            let phase = hud.phase;
            if self.last_phase == Some(phase) {
                return;
            }
            self.last_phase = Some(phase);
            show(document, "menu", phase == Phase::Menu);
            show(document, HUD_ID, phase != Phase::Menu);
            show(document, "pause-menu", phase == Phase::Paused);
            show(document, "level-up", phase == Phase::LevelUp);
            show(document, "victory", phase == Phase::Victory);
            show(document, "game-over", phase == Phase::GameOver);
            if phase == Phase::GameOver {
                let stats = match &self.active {
                    Active::Runner(lp) => lp.final_stats().cloned(),
                    Active::Survivor(lp) => lp.final_stats().cloned(),
                };
                if let Some(stats) = stats {
                    set_text(document, "final-score", &stats.score.to_string());
                    set_text(document, "final-best", &stats.high_score.to_string());
                    set_text(document, "final-time", &format_clock(stats.elapsed_secs));
                    show(document, "new-best", stats.new_high_score);
                }
            }
        }
    }

    fn music(settings: &Settings) -> Box<dyn AudioSink> {
        if settings.effective_volume() <= 0.0 {
            return Box::new(SilentAudio);
        }
        match HtmlAudio::from_element_id(MUSIC_ID) {
            Ok(audio) => {
                audio.set_volume(settings.effective_volume());
                Box::new(audio)
            }
            Err(e) => {
                log::warn!("Music disabled: {e}");
                Box::new(SilentAudio)
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn seed() -> u64 {
        js_sys::Date::now() as u64
    }

    /// Shared handles for event callbacks
    #[derive(Clone)]
    struct Host {
        game: Rc<RefCell<Game>>,
        scheduler: Rc<FrameScheduler>,
        /// Input and focus listeners; live only while a session is open
        session: Rc<EventListeners>,
        /// Overlay buttons; live for the page
        buttons: Rc<EventListeners>,
    }

    impl Host {
        fn start(&self) {
            if self.session.is_empty() {
                self.attach_session_listeners();
            }
            self.game.borrow_mut().start(seed());
            self.schedule();
        }

        fn schedule(&self) {
            let host = self.clone();
            self.scheduler.start(move |now| host.frame(now));
        }

        /// One animation frame. Returns false to stop rescheduling.
        fn frame(&self, now_ms: f64) -> bool {
            let Ok(mut game) = self.game.try_borrow_mut() else {
                return true;
            };
            let outcome = game.tick(now_ms);
            let keep_going = match outcome {
                FrameOutcome::Stopped => {
                    game.render();
                    false
                }
                FrameOutcome::NotReady => return true,
                FrameOutcome::Frame { render, .. } => {
                    if render {
                        game.render();
                    }
                    true
                }
            };
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                game.update_hud(&document);
            }

            if now_ms - game.last_compaction_ms > COMPACTION_INTERVAL_MS {
                game.last_compaction_ms = now_ms;
                let handle = self.game.clone();
                request_idle(move || {
                    if let Ok(mut game) = handle.try_borrow_mut() {
                        game.compact_pools();
                    }
                });
            }
            keep_going
        }

        fn exit(&self) {
            self.scheduler.cancel();
            let detached = self.session.detach_all();
            let mut game = self.game.borrow_mut();
            game.exit();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                game.update_hud(&document);
            }
            log::info!("Session closed ({detached} listeners detached)");
        }

        fn attach_session_listeners(&self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let Some(document) = window.document() else {
                return;
            };
            let canvas = self.game.borrow().canvas.clone();
            setup_keyboard(&window, self);
            setup_pointer(&canvas, self);
            setup_touch(&canvas, self);
            setup_auto_pause(&window, &document, self);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Vibe Arcade starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document; nothing to attach to");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #{CANVAS_ID} canvas element");
            return;
        };

        let kind = canvas
            .get_attribute("data-game")
            .and_then(|g| GameKind::parse(&g))
            .unwrap_or(GameKind::Runner);

        let game = Rc::new(RefCell::new(Game::new(kind, canvas.clone(), seed())));
        let viewport = game.borrow_mut().sync_canvas_size();

        match create_renderer(&canvas, viewport).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Renderer unavailable, running without drawing: {e}"),
        }

        let host = Host {
            game,
            scheduler: Rc::new(FrameScheduler::new()),
            session: Rc::new(EventListeners::new()),
            buttons: Rc::new(EventListeners::new()),
        };

        host.attach_session_listeners();
        setup_buttons(&document, &host);

        if let Ok(mut game) = host.game.try_borrow_mut() {
            game.update_hud(&document);
        }

        log::info!("Vibe Arcade ready ({})", kind.as_str());
    }

    async fn create_renderer(
        canvas: &HtmlCanvasElement,
        viewport: Viewport,
    ) -> vibe_arcade::Result<RenderState> {
        use vibe_arcade::GameError;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| GameError::Render(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GameError::Render(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, viewport).await
    }

    fn setup_keyboard(window: &web_sys::Window, host: &Host) {
        {
            let game = host.game.clone();
            host.session.attach(window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let code = event.code();
                let mut game = game.borrow_mut();
                match code.as_str() {
                    "Escape" | "KeyP" => {
                        if !event.repeat() {
                            game.toggle_pause();
                        }
                    }
                    "Digit1" | "Digit2" | "Digit3" if game.phase() == Phase::LevelUp => {
                        let index = code.as_bytes()[5] - b'1';
                        game.choose(index as usize);
                    }
                    _ => game.set_key(&code, true),
                }
            });
        }

        let game = host.game.clone();
        host.session.attach(window, "keyup", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                game.borrow_mut().set_key(&event.code(), false);
            }
        });
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, host: &Host) {
        for (name, held) in [("pointerdown", true), ("pointerup", false), ("pointerleave", false)] {
            let game = host.game.clone();
            host.session.attach(canvas, name, move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                if event.pointer_type() == "touch" {
                    return;
                }
                game.borrow_mut().set_hold(held);
            });
        }
    }

    fn first_touch(event: &web_sys::Event) -> Option<Vec2> {
        let event = event.dyn_ref::<TouchEvent>()?;
        event.prevent_default();
        let touch = event.touches().get(0)?;
        Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32))
    }

    fn setup_touch(canvas: &HtmlCanvasElement, host: &Host) {
        {
            let game = host.game.clone();
            host.session.attach(canvas, "touchstart", move |event| {
                let Some(at) = first_touch(&event) else {
                    return;
                };
                let mut game = game.borrow_mut();
                game.touch_origin = Some(at);
                game.set_hold(true);
            });
        }

        // Virtual joystick: drag from where the finger landed
        {
            let game = host.game.clone();
            host.session.attach(canvas, "touchmove", move |event| {
                let Some(at) = first_touch(&event) else {
                    return;
                };
                let mut game = game.borrow_mut();
                let Some(origin) = game.touch_origin else {
                    return;
                };
                let axis = ((at - origin) / JOYSTICK_RANGE).clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
                game.set_joystick(axis);
            });
        }

        for name in ["touchend", "touchcancel"] {
            let game = host.game.clone();
            host.session.attach(canvas, name, move |event| {
                event.prevent_default();
                let mut game = game.borrow_mut();
                game.touch_origin = None;
                game.set_joystick(Vec2::ZERO);
                game.set_hold(false);
            });
        }
    }

    fn on_click(document: &Document, listeners: &EventListeners, id: &str, mut action: impl FnMut() + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            return;
        };
        listeners.attach(&btn, "click", move |_event| action());
    }

    fn setup_buttons(document: &Document, host: &Host) {
        let buttons = &host.buttons;
        for id in ["start-btn", "retry-btn"] {
            let host = host.clone();
            on_click(document, buttons, id, move || host.start());
        }
        {
            let game = host.game.clone();
            on_click(document, buttons, "resume-btn", move || game.borrow_mut().toggle_pause());
        }
        {
            let game = host.game.clone();
            on_click(document, buttons, "continue-btn", move || {
                game.borrow_mut().continue_after_victory()
            });
        }
        for id in ["exit-btn", "quit-btn", "menu-btn"] {
            let host = host.clone();
            on_click(document, buttons, id, move || host.exit());
        }
        for i in 0..3 {
            let game = host.game.clone();
            on_click(document, buttons, &format!("choice-{i}"), move || {
                game.borrow_mut().choose(i)
            });
        }
    }

    /// Pause when the tab hides or the window loses focus
    fn setup_auto_pause(window: &web_sys::Window, document: &Document, host: &Host) {
        {
            let game = host.game.clone();
            let doc = document.clone();
            host.session.attach(document, "visibilitychange", move |_event| {
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            });
        }

        let game = host.game.clone();
        host.session.attach(window, "blur", move |_event| {
            game.borrow_mut().pause();
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use vibe_arcade::GameKind;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Vibe Arcade (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in the browser");

    let mut args = std::env::args().skip(1);
    let kinds = match args.next().as_deref().map(GameKind::parse) {
        Some(Some(kind)) => vec![kind],
        Some(None) => {
            log::error!("Unknown game; expected `runner` or `survivor`");
            std::process::exit(2);
        }
        None => vec![GameKind::Runner, GameKind::Survivor],
    };
    let seconds: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60);

    for kind in kinds {
        let stats = headless::run(kind, seconds, 7);
        println!(
            "{}: score {} in {:.1}s (level {}, kills {}, bosses {}, distance {:.0})",
            kind.as_str(),
            stats.score,
            stats.elapsed_secs,
            stats.level,
            stats.kills,
            stats.boss_kills,
            stats.distance
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use vibe_arcade::GameKind;
    use vibe_arcade::engine::{FinalStats, FrameOutcome, GameLoop, Phase, StepPolicy, Viewport};
    use vibe_arcade::engine::game_loop::TICK_MS;
    use vibe_arcade::platform::MemoryStore;
    use vibe_arcade::runner::{RunnerState, WORLD_HEIGHT};
    use vibe_arcade::survivor::SurvivorState;
    use vibe_arcade::tuning::Tuning;

    const VIEWPORT: Viewport = Viewport {
        width: 1280,
        height: 720,
    };

    /// Drive a session with a scripted pilot for up to `seconds` of game time
    pub fn run(kind: GameKind, seconds: u32, seed: u64) -> FinalStats {
        let tuning = Tuning::default();
        let frames = seconds as u64 * 60;
        match kind {
            GameKind::Runner => {
                let state = RunnerState::new(&tuning.runner, &tuning.quality, 5, seed);
                let mut lp = GameLoop::new(state, StepPolicy::fixed_60hz(), &tuning.quality)
                    .with_high_score(kind.high_score_key(), Box::new(MemoryStore::default()));
                lp.start();
                for frame in 0..frames {
                    // Hover around the middle of the corridor
                    let y = lp.session().player.pos.y;
                    lp.input_mut().hold = y > WORLD_HEIGHT * 0.5;
                    if lp.tick(frame as f64 * TICK_MS, VIEWPORT) == FrameOutcome::Stopped {
                        break;
                    }
                }
                lp.stop()
            }
            GameKind::Survivor => {
                let state = SurvivorState::new(&tuning.survivor, &tuning.quality, 5, seed);
                let mut lp = GameLoop::new(state, StepPolicy::PerFrame, &tuning.quality)
                    .with_high_score(kind.high_score_key(), Box::new(MemoryStore::default()));
                lp.start();
                for frame in 0..frames {
                    match lp.phase() {
                        Phase::LevelUp => {
                            lp.session_mut().choose_upgrade(0);
                        }
                        Phase::Victory => lp.continue_after_victory(),
                        _ => {}
                    }
                    // Circle-strafe and dash every few seconds
                    let angle = frame as f32 / 90.0;
                    let input = lp.input_mut();
                    input.joystick = Vec2::from_angle(angle);
                    input.dash = frame % 180 == 0;
                    if lp.tick(frame as f64 * TICK_MS, VIEWPORT) == FrameOutcome::Stopped {
                        break;
                    }
                }
                lp.stop()
            }
        }
    }
}
