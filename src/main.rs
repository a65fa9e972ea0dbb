//! Orbit Folio entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use orbit_folio::platform::web::{DefenseInput, publish_frame, update_overlay, viewport_size};
    use orbit_folio::sim::{Command, Experience, ExperienceEvent, Viewport, apply, tick};

    /// Longest frame step fed to the core (tab switches, breakpoints)
    const MAX_DT: f32 = 0.1;

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Host state around the experience core
    struct Game {
        experience: Experience,
        last_time: f64,
        defense_input: Option<DefenseInput>,
    }

    impl Game {
        fn new(experience: Experience) -> Self {
            Self {
                experience,
                last_time: 0.0,
                defense_input: None,
            }
        }

        fn command(&mut self, command: &Command) -> bool {
            apply(&mut self.experience, command)
        }
    }

    fn dispatch(command: &Command) -> bool {
        GAME.with(|slot| {
            slot.borrow()
                .as_ref()
                .is_some_and(|game| game.borrow_mut().command(command))
        })
    }

    /// Entry point for the JS renderer (e.g. a clicked category node)
    #[wasm_bindgen]
    pub fn send_command(json: &str) -> bool {
        match serde_json::from_str::<Command>(json) {
            Ok(command) => dispatch(&command),
            Err(e) => {
                log::warn!("Bad command {}: {}", json, e);
                false
            }
        }
    }

    /// Called by the JS orbit controls whenever the visitor moves the camera
    #[wasm_bindgen]
    pub fn report_camera(x: f32, y: f32, z: f32) -> bool {
        dispatch(&Command::CameraMoved(glam::Vec3::new(x, y, z)))
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Orbit Folio starting...");

        let seed = js_sys::Date::now() as u64;
        let experience = match Experience::with_defaults(seed) {
            Ok(experience) => experience,
            Err(e) => {
                log::error!("Failed to load catalog: {}", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(experience)));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        log::info!("Experience initialized with seed: {}", seed);

        setup_buttons(game.clone());
        request_animation_frame(game);

        log::info!("Orbit Folio running!");
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to attach buttons to");
            return;
        };

        let buttons = [
            ("yes-btn", Command::ConfirmBeauty),
            ("nav-btn", Command::Nav),
            ("continue-btn", Command::ContinueIntro),
            ("explore-btn", Command::EnterExplore),
            ("contact-btn", Command::ToggleContact),
            ("modal-close", Command::CloseImage),
        ];

        for (id, command) in buttons {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    game.borrow_mut().command(&command);
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Panel items are rebuilt on every focus change, so listen on the list
        if let Some(list) = document.get_element_by_id("panel-items") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                let link = event
                    .target()
                    .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
                    .and_then(|el| el.closest("[data-image]").ok().flatten())
                    .and_then(|el| el.get_attribute("data-image"));
                if let Some(link) = link {
                    game.borrow_mut().command(&Command::ViewImage(link));
                }
            });
            let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let events = {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            let (width, height) = viewport_size();
            let frame = tick(&mut g.experience, dt.min(MAX_DT), Viewport::new(width, height));
            publish_frame(&frame);
            update_overlay(&frame);

            g.experience.drain_events()
        };

        for event in events {
            if let ExperienceEvent::InputCaptureChanged { active } = event {
                sync_defense_input(&game, active);
            }
        }

        request_animation_frame(game);
    }

    /// Listeners live exactly as long as the defense phase
    fn sync_defense_input(game: &Rc<RefCell<Game>>, active: bool) {
        let input = if active {
            let target = game.clone();
            DefenseInput::install(move || {
                target.borrow_mut().experience.fire();
            })
        } else {
            None
        };
        game.borrow_mut().defense_input = input;
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
    log::info!("Orbit Folio (native) starting...");
    log::info!("Native mode runs a headless walkthrough - serve the wasm build for the real thing");

    walkthrough();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one scripted session and log what the renderer would see
#[cfg(not(target_arch = "wasm32"))]
fn walkthrough() {
    use orbit_folio::sim::{Command, Experience, Frame, Phase, Viewport, apply, tick};

    const DT: f32 = 1.0 / 60.0;
    let viewport = Viewport::new(1280.0, 720.0);

    // Tick and drain, the way the browser host does every frame
    let step = |exp: &mut Experience, dt: f32| -> Frame {
        let frame = tick(exp, dt, viewport);
        for event in exp.drain_events() {
            log::debug!("{:?}", event);
        }
        frame
    };

    let mut exp = match Experience::with_defaults(2024) {
        Ok(exp) => exp,
        Err(e) => {
            log::error!("Failed to load catalog: {}", e);
            return;
        }
    };

    apply(&mut exp, &Command::ConfirmBeauty);
    while exp.phase() != Phase::Defense {
        step(&mut exp, DT);
    }

    while exp.phase() == Phase::Defense {
        step(&mut exp, DT * 10.0);
        apply(&mut exp, &Command::Fire);
    }
    println!("Defense won with {} hits", exp.hits());

    while exp.phase() != Phase::Intro {
        step(&mut exp, DT);
    }
    apply(&mut exp, &Command::EnterExplore);

    let names: Vec<String> = exp.catalog().names().map(str::to_owned).collect();
    for name in names {
        apply(&mut exp, &Command::SelectCategory(name.clone()));
        let mut frame = step(&mut exp, DT);
        for _ in 0..120 {
            frame = step(&mut exp, DT);
        }
        let items = frame
            .satellites
            .iter()
            .find(|s| s.selected)
            .map_or(0, |s| s.items.len());
        println!(
            "{:<12} ring={:+.3} items={:>2} camera_z={:.2}",
            name, frame.ring_rotation, items, frame.camera.position.z
        );
    }

    apply(&mut exp, &Command::Nav);
    apply(&mut exp, &Command::Nav);
    println!("✓ Walkthrough finished in phase {}", exp.phase());
}
