//! Grovebound entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CustomEvent, CustomEventInit, Document, Element, HtmlCanvasElement, KeyboardEvent,
        MouseEvent, TouchEvent, Window,
    };

    use grovebound::QualityPreset;
    use grovebound::audio::AudioManager;
    use grovebound::consts::*;
    use grovebound::settings::Settings;
    use grovebound::sim::{
        FrameEvents, Game, GameEvent, KeyState, TickInput, aim_from_pointer, analog_from_drag,
        to_viewport,
    };

    /// DOM event carrying each frame's snapshot (parsed JSON) in `detail`
    const FRAME_EVENT: &str = "grovebound-frame";

    /// Browser-side state around the game
    struct Host {
        game: Game,
        audio: AudioManager,
        keys: KeyState,
        /// Latest input; one-shot flags are cleared after each tick
        input: TickInput,
        /// Events of every tick since the last publish
        frame_events: FrameEvents,
        touch_start: Option<Vec2>,
        accumulator: f64,
        last_time: f64,
    }

    impl Host {
        fn new(settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                game: Game::new(settings),
                audio,
                keys: KeyState::default(),
                input: TickInput::default(),
                frame_events: FrameEvents::default(),
                touch_start: None,
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run the fixed ticks owed for `dt_ms` of wall time
        fn update(&mut self, dt_ms: f64) {
            let tick_ms = f64::from(TICK_MS);
            // Drop backlog beyond one frame's worth of ticks
            self.accumulator =
                (self.accumulator + dt_ms).min(tick_ms * f64::from(MAX_TICKS_PER_FRAME));

            let mut ticks = 0;
            while self.accumulator >= tick_ms && ticks < MAX_TICKS_PER_FRAME {
                self.input.keys = self.keys.direction();
                self.input.sprint = self.keys.sprint;
                self.input.attack = self.keys.attack;

                self.game.update(&self.input);
                self.frame_events.record(&self.game);
                self.play_cues();

                self.input.clear_triggers();
                self.accumulator -= tick_ms;
                ticks += 1;
            }
        }

        fn play_cues(&self) {
            for event in self.game.events() {
                if let GameEvent::Cue(cue) = event {
                    self.audio.play(*cue);
                }
            }
        }

        /// Serialize this frame's snapshot and start collecting the next frame
        fn take_frame_json(&mut self) -> Option<String> {
            let json = self
                .game
                .snapshot()
                .with_events(self.frame_events.as_slice())
                .to_json();
            self.frame_events.clear();
            match json {
                Ok(json) => Some(json),
                Err(e) => {
                    log::warn!("Snapshot serialization failed: {:?}", e);
                    None
                }
            }
        }

        /// Apply a `data-action` button from the page
        fn apply_action(&mut self, action: &str, value: Option<String>) {
            let game = &mut self.game;
            let accepted = match action {
                "play" => game.open_level_select(),
                "settings" => game.open_settings(),
                "back" => game.back_to_menu(),
                "level" => value
                    .and_then(|v| v.parse::<usize>().ok())
                    .is_some_and(|index| game.select_level(index)),
                "pause" => game.pause(),
                "resume" => game.resume(),
                "next" => game.next_level(),
                "retry" => game.retry(),
                "quit" => game.abandon(),
                "quality" => {
                    let preset = value.as_deref().and_then(QualityPreset::from_name);
                    if let Some(preset) = preset {
                        game.settings_mut().quality = preset;
                    }
                    preset.is_some()
                }
                "particles" => {
                    let settings = game.settings_mut();
                    settings.particles = !settings.particles;
                    true
                }
                "mute" => {
                    let settings = game.settings_mut();
                    settings.muted = !settings.muted;
                    true
                }
                _ => {
                    log::debug!("Unknown action '{}'", action);
                    false
                }
            };
            if accepted {
                self.audio.apply_settings(self.game.settings());
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Grovebound starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let mut settings = Settings::default();
        if let Ok(query) = window.location().search() {
            settings.apply_query(&query);
        }
        log::info!("Quality: {}", settings.quality.as_str());

        let host = Rc::new(RefCell::new(Host::new(settings)));

        match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        {
            Some(canvas) => setup_pointer_handlers(&canvas, host.clone()),
            None => log::warn!("No canvas element - pointer input disabled"),
        }
        setup_keyboard(&window, host.clone());
        setup_ui_actions(&document, host.clone());
        setup_auto_pause(&window, &document, host.clone());

        host.borrow_mut().game.finish_loading();
        request_animation_frame(host);

        log::info!("Grovebound running!");
    }

    fn viewport_centre() -> Vec2 {
        Vec2::new(VIEWPORT_WIDTH / 2.0, VIEWPORT_HEIGHT / 2.0)
    }

    fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        to_viewport(
            Vec2::new(client_x as f32, client_y as f32),
            Vec2::new(rect.left() as f32, rect.top() as f32),
            Vec2::new(rect.width() as f32, rect.height() as f32),
        )
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        // Mouse move - aim
        {
            let host = host.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut h = host.borrow_mut();
                let pointer = canvas_point(&canvas_clone, event.client_x(), event.client_y());
                h.input.aim = aim_from_pointer(pointer, viewport_centre());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - shoot
        {
            let host = host.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut h = host.borrow_mut();
                h.audio.resume();
                let pointer = canvas_point(&canvas_clone, event.client_x(), event.client_y());
                h.input.aim = aim_from_pointer(pointer, viewport_centre());
                h.input.shoot = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start - first finger anchors the joystick, a second finger shoots
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut h = host.borrow_mut();
                h.audio.resume();
                let touches = event.touches();
                if touches.length() > 1 {
                    h.input.shoot = true;
                    return;
                }
                if let Some(touch) = touches.get(0) {
                    h.touch_start = Some(Vec2::new(
                        touch.client_x() as f32,
                        touch.client_y() as f32,
                    ));
                    h.input.analog = Vec2::ZERO;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move - joystick deflection
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut h = host.borrow_mut();
                let Some(start) = h.touch_start else { return };
                if let Some(touch) = event.touches().get(0) {
                    let current = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    let analog = analog_from_drag(start, current);
                    h.input.analog = analog;
                    if analog != Vec2::ZERO {
                        h.input.aim = analog.y.atan2(analog.x);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end - release joystick
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if event.touches().length() == 0 {
                    let mut h = host.borrow_mut();
                    h.touch_start = None;
                    h.input.analog = Vec2::ZERO;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(window: &Window, host: Rc<RefCell<Host>>) {
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut h = host.borrow_mut();
                let key = event.key();
                if h.keys.set_key(&key, true) {
                    event.prevent_default();
                    return;
                }
                match key.as_str() {
                    "Escape" | "p" | "P" => h.input.pause = true,
                    "m" | "M" => h.input.toggle_map = true,
                    "c" | "C" => h.input.campfire = true,
                    "f" | "F" => h.input.shoot = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                host.borrow_mut().keys.set_key(&event.key(), false);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Menu buttons are plain elements with `data-action` (and optional
    /// `data-value`) attributes
    fn setup_ui_actions(document: &Document, host: Rc<RefCell<Host>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[data-action]").ok().flatten())
            else {
                return;
            };
            let Some(action) = target.get_attribute("data-action") else {
                return;
            };
            let value = target.get_attribute("data-value");
            let mut h = host.borrow_mut();
            h.audio.resume();
            h.apply_action(&action, value);
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(window: &Window, document: &Document, host: Rc<RefCell<Host>>) {
        // Visibility change (tab switch, minimize)
        {
            let host = host.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut h = host.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    h.game.focus_lost();
                    log::info!("Auto-paused (tab hidden)");
                } else {
                    h.game.focus_gained();
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
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                host.borrow_mut().game.focus_lost();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                host.borrow_mut().game.focus_gained();
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Hand a frame to the page. Page listeners may click `data-action`
    /// buttons synchronously, so no `Host` borrow may be held here.
    fn publish(json: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let init = CustomEventInit::new();
        let detail = js_sys::JSON::parse(json).unwrap_or_else(|_| JsValue::from_str(json));
        init.set_detail(&detail);
        if let Ok(event) = CustomEvent::new_with_event_init_dict(FRAME_EVENT, &init) {
            let _ = window.dispatch_event(&event);
        }
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        let frame = {
            let mut h = host.borrow_mut();

            let dt = if h.last_time > 0.0 {
                time - h.last_time
            } else {
                0.0
            };
            h.last_time = time;

            h.update(dt);
            h.take_frame_json()
        };

        if let Some(json) = frame {
            publish(&json);
        }

        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Grovebound (native) starting...");
    log::info!("Native mode runs the simulation headless - build for wasm32 to play");

    let mut args = std::env::args().skip(1);
    let level = args.next().and_then(|a| a.parse().ok()).unwrap_or(0);
    let ticks = args.next().and_then(|a| a.parse().ok()).unwrap_or(600);
    run_headless(level, ticks);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Sprint east from the portal for `ticks` ticks, chopping along the way
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(level: usize, ticks: u32) {
    use glam::Vec2;
    use grovebound::sim::{Game, TickInput, TickOutcome};

    let mut game = Game::default();
    game.finish_loading();
    game.open_level_select();
    if !game.select_level(level) {
        log::warn!("Level {} is not playable", level);
        return;
    }

    let input = TickInput {
        keys: Vec2::X,
        sprint: true,
        attack: true,
        ..Default::default()
    };
    for _ in 0..ticks {
        match game.update(&input) {
            TickOutcome::Continue => {}
            outcome => {
                log::info!("Run ended: {:?}", outcome);
                break;
            }
        }
    }

    let Some(sim) = game.sim() else {
        return;
    };
    let hud = game.snapshot().hud();
    println!(
        "Level {} '{}' after {} ticks: mode {:?}, player at ({:.0}, {:.0})",
        sim.level.id,
        sim.level.name,
        sim.time_ticks,
        game.mode(),
        sim.player.pos.x,
        sim.player.pos.y
    );
    if let Some(hud) = hud {
        println!(
            "stones {}/{} lives {} stamina {}% wood {} axe {} gun {}",
            hud.stones_collected,
            hud.stones_required,
            hud.lives,
            hud.stamina_percent,
            hud.wood,
            hud.has_axe,
            hud.has_gun
        );
    }
}
