//! Deterministic experience core
//!
//! Everything that decides what happens lives here. This module must stay
//! platform-free and reproducible:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - Stable iteration order (by id / catalog order)
//! - No rendering or DOM access

pub mod asteroids;
pub mod camera;
pub mod explosions;
pub mod orbit;
pub mod phase;
pub mod state;
pub mod tick;
pub mod timer;
pub mod typewriter;

pub use asteroids::{Asteroid, AsteroidField};
pub use camera::{CameraController, CameraPose, ControlPolicy, Viewport};
pub use explosions::{Explosion, Explosions, Particle};
pub use orbit::{OrbitRing, OrbitSlot, PLANE_TILTS, sub_item_slots};
pub use phase::{IntroStep, Phase};
pub use state::{Experience, ExperienceEvent, NavButton, THANKS_TEXT};
pub use tick::{Command, Frame, PanelItemView, PanelView, SatelliteView, SubItemView, apply, tick};
pub use timer::{Scheduler, TimerHandle};
pub use typewriter::TextReveal;
