//! Experience state machine
//!
//! `Experience` owns every piece of mutable session state. Phases only change
//! through the guarded methods below; each returns whether it applied, and a
//! command that does not fit the current phase is ignored.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::asteroids::AsteroidField;
use super::camera::CameraController;
use super::explosions::Explosions;
use super::orbit::OrbitRing;
use super::phase::{IntroStep, Phase};
use super::timer::{Scheduler, TimerHandle};
use super::typewriter::TextReveal;
use crate::catalog::{Catalog, Category};
use crate::tuning::{ConfigError, Tuning};

/// Text revealed on the intro's first step
pub const THANKS_TEXT: &str = "Thank you for saving my home";

/// Things the host may want to react to, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExperienceEvent {
    PhaseChanged { from: Phase, to: Phase },
    /// Fire listeners should be installed (true) or removed (false)
    InputCaptureChanged { active: bool },
    Hit { hits: u32, position: Vec3 },
    RevealCompleted,
    FocusChanged { focus: Option<String> },
}

/// Label of the skip/back button, if it is shown at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavButton {
    Skip,
    Close,
    Back,
}

impl NavButton {
    pub fn label(&self) -> &'static str {
        match self {
            NavButton::Skip => "Skip",
            NavButton::Close => "Close",
            NavButton::Back => "Back",
        }
    }
}

/// A delayed phase change, only valid while `from` is still current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PhaseTimer {
    pub from: Phase,
    pub to: Phase,
}

/// The whole session
#[derive(Debug)]
pub struct Experience {
    pub(crate) tuning: Tuning,
    pub(crate) catalog: Catalog,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,

    pub(crate) phase: Phase,
    pub(crate) intro_step: IntroStep,
    pub(crate) show_continue: bool,
    pub(crate) hits: u32,
    pub(crate) focus: Option<String>,
    pub(crate) modal_image: Option<String>,
    pub(crate) contact_open: bool,

    pub(crate) timers: Scheduler<PhaseTimer>,
    /// The single pending auto-transition, if any
    pub(crate) pending_transition: Option<TimerHandle>,

    pub(crate) field: Option<AsteroidField>,
    pub(crate) explosions: Explosions,
    pub(crate) ring: OrbitRing,
    pub(crate) camera: CameraController,
    pub(crate) reveal: TextReveal,

    /// Seconds since the session started
    pub(crate) elapsed: f32,
    pub(crate) events: Vec<ExperienceEvent>,
}

impl Experience {
    /// Start a session in [`Phase::Beauty`]
    pub fn new(seed: u64, catalog: Catalog, tuning: Tuning) -> Self {
        Self {
            explosions: Explosions::new(&tuning),
            ring: OrbitRing::new(&tuning),
            camera: CameraController::new(&tuning),
            tuning,
            catalog,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Beauty,
            intro_step: IntroStep::Thanks,
            show_continue: false,
            hits: 0,
            focus: None,
            modal_image: None,
            contact_open: false,
            timers: Scheduler::new(),
            pending_transition: None,
            field: None,
            reveal: TextReveal::default(),
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    /// Session with the built-in catalog and default tuning
    pub fn with_defaults(seed: u64) -> Result<Self, ConfigError> {
        Ok(Self::new(seed, Catalog::builtin()?, Tuning::default()))
    }

    // === Read access ===

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn intro_step(&self) -> IntroStep {
        self.intro_step
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// The focused category, if it exists in the catalog
    pub fn focused_category(&self) -> Option<&Category> {
        self.focus.as_deref().and_then(|name| self.catalog.get(name))
    }

    pub fn show_continue(&self) -> bool {
        self.show_continue
    }

    pub fn contact_open(&self) -> bool {
        self.contact_open
    }

    pub fn modal_image(&self) -> Option<&str> {
        self.modal_image.as_deref()
    }

    pub fn reveal_text(&self) -> &str {
        self.reveal.visible()
    }

    pub fn asteroids(&self) -> Option<&AsteroidField> {
        self.field.as_ref()
    }

    pub fn explosions(&self) -> &Explosions {
        &self.explosions
    }

    pub fn ring(&self) -> &OrbitRing {
        &self.ring
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether a delayed phase change is waiting to fire
    pub fn has_pending_transition(&self) -> bool {
        self.pending_transition
            .is_some_and(|handle| self.timers.is_pending(handle))
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<ExperienceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Which skip/back button the host should show
    pub fn nav_button(&self) -> Option<NavButton> {
        match self.phase {
            Phase::Beauty | Phase::TransitionOut => Some(NavButton::Skip),
            Phase::Intro if self.intro_step != IntroStep::Bio => Some(NavButton::Skip),
            Phase::Explore if self.focus.is_some() => Some(NavButton::Close),
            Phase::Explore => Some(NavButton::Back),
            _ => None,
        }
    }

    // === Transitions ===

    /// "Isn't it beautiful?" - yes
    pub fn confirm_beauty(&mut self) -> bool {
        if self.phase != Phase::Beauty {
            return self.ignored("confirm_beauty");
        }
        self.enter(Phase::TransitionOut);
        true
    }

    /// Shoot the asteroid nearest to the planet
    pub fn fire(&mut self) -> bool {
        if self.phase != Phase::Defense {
            return self.ignored("fire");
        }
        let Some(position) = self
            .field
            .as_mut()
            .and_then(|field| field.destroy_nearest(Vec3::ZERO))
        else {
            log::debug!("fire: no target");
            return false;
        };

        self.explosions.spawn(position, &mut self.rng);
        self.hits += 1;
        self.events.push(ExperienceEvent::Hit {
            hits: self.hits,
            position,
        });

        if self.hits >= self.tuning.victory_hits {
            self.enter(Phase::Victory);
        }
        true
    }

    /// Jump straight to the bio, bypassing the narrative and the game
    pub fn skip(&mut self) -> bool {
        let allowed = match self.phase {
            Phase::Beauty | Phase::TransitionOut => true,
            Phase::Intro => self.intro_step != IntroStep::Bio,
            _ => false,
        };
        if !allowed {
            return self.ignored("skip");
        }
        self.enter_intro(IntroStep::Bio);
        true
    }

    /// CONTINUE after the thank-you text has been revealed
    pub fn continue_intro(&mut self) -> bool {
        if self.phase != Phase::Intro || self.intro_step != IntroStep::Thanks || !self.show_continue
        {
            return self.ignored("continue_intro");
        }
        self.enter_intro(IntroStep::Bio);
        true
    }

    pub fn enter_explore(&mut self) -> bool {
        if self.phase != Phase::Intro || self.intro_step != IntroStep::Bio {
            return self.ignored("enter_explore");
        }
        self.enter(Phase::Explore);
        true
    }

    /// Focus a category; unknown names are ignored
    pub fn select_category(&mut self, name: &str) -> bool {
        if self.phase != Phase::Explore {
            return self.ignored("select_category");
        }
        if self.catalog.get(name).is_none() {
            log::warn!("select_category: unknown category {name:?}");
            return false;
        }
        self.set_focus(Some(name.to_owned()));
        true
    }

    pub fn clear_focus(&mut self) -> bool {
        if self.phase != Phase::Explore || self.focus.is_none() {
            return self.ignored("clear_focus");
        }
        self.set_focus(None);
        true
    }

    /// Close the focused category, or leave explore for the bio
    pub fn back(&mut self) -> bool {
        if self.phase != Phase::Explore {
            return self.ignored("back");
        }
        if self.focus.is_some() {
            self.set_focus(None);
        } else {
            self.enter_intro(IntroStep::Bio);
        }
        true
    }

    /// Press whatever [`nav_button`](Self::nav_button) currently shows
    pub fn press_nav(&mut self) -> bool {
        match self.nav_button() {
            Some(NavButton::Skip) => self.skip(),
            Some(NavButton::Close | NavButton::Back) => self.back(),
            None => self.ignored("nav"),
        }
    }

    pub fn toggle_contact(&mut self) -> bool {
        self.contact_open = !self.contact_open;
        true
    }

    /// Open an item's image in the modal viewer
    pub fn view_image(&mut self, link: &str) -> bool {
        if self.phase != Phase::Explore || self.focus.is_none() {
            return self.ignored("view_image");
        }
        self.modal_image = Some(link.to_owned());
        true
    }

    pub fn close_image(&mut self) -> bool {
        self.modal_image.take().is_some()
    }

    /// Report a camera position set by the visitor's orbit controls
    ///
    /// Returns false while the camera is locked.
    pub fn set_user_camera(&mut self, position: Vec3) -> bool {
        self.camera.set_user_position(self.phase, position)
    }

    // === Internals ===

    fn ignored(&self, command: &str) -> bool {
        log::debug!("{command} ignored in phase {}", self.phase);
        false
    }

    fn set_focus(&mut self, focus: Option<String>) {
        if self.focus != focus {
            self.focus = focus.clone();
            self.events.push(ExperienceEvent::FocusChanged { focus });
        }
    }

    fn schedule_transition(&mut self, to: Phase, delay_ms: f64) {
        let from = self.phase;
        let handle = self.timers.schedule(PhaseTimer { from, to }, delay_ms);
        self.pending_transition = Some(handle);
    }

    /// Handle a fired phase timer; stale timers are dropped
    pub(crate) fn on_timer(&mut self, timer: PhaseTimer) {
        if timer.from != self.phase {
            log::debug!(
                "Stale timer {} -> {} ignored in phase {}",
                timer.from,
                timer.to,
                self.phase
            );
            return;
        }
        self.pending_transition = None;
        match timer.to {
            Phase::Intro => self.enter_intro(self.tuning.victory_intro_step),
            to => self.enter(to),
        }
    }

    /// Called when the running text reveal finishes
    pub(crate) fn on_reveal_complete(&mut self) {
        if self.phase == Phase::Intro && self.intro_step == IntroStep::Thanks {
            self.show_continue = true;
        }
        self.events.push(ExperienceEvent::RevealCompleted);
    }

    fn enter_intro(&mut self, step: IntroStep) {
        self.enter(Phase::Intro);
        self.intro_step = step;
        self.show_continue = false;
        match step {
            IntroStep::Thanks => self.reveal.start(THANKS_TEXT, self.tuning.thanks_reveal_ms),
            IntroStep::Bio => self
                .reveal
                .start(self.catalog.owner.clone(), self.tuning.name_reveal_ms),
        }
    }

    /// Switch phase, superseding any pending auto-transition
    fn enter(&mut self, next: Phase) {
        if let Some(handle) = self.pending_transition.take() {
            self.timers.cancel(handle);
        }

        let prev = self.phase;
        if prev == next {
            return;
        }

        // Exit actions
        match prev {
            Phase::Defense => self.field = None,
            Phase::Intro => {
                self.reveal.cancel();
                self.show_continue = false;
            }
            Phase::Explore => {
                self.set_focus(None);
                self.modal_image = None;
            }
            _ => {}
        }

        self.phase = next;
        log::info!("Phase {} -> {}", prev, next);
        self.events.push(ExperienceEvent::PhaseChanged {
            from: prev,
            to: next,
        });
        if prev.captures_input() != next.captures_input() {
            self.events.push(ExperienceEvent::InputCaptureChanged {
                active: next.captures_input(),
            });
        }

        // Entry actions
        match next {
            Phase::TransitionOut => self.schedule_transition(Phase::ThreatAlert, self.tuning.silence_ms),
            Phase::ThreatAlert => self.schedule_transition(Phase::Defense, self.tuning.alert_ms),
            Phase::Defense => {
                self.hits = 0;
                self.explosions.clear();
                self.field = Some(AsteroidField::new(&mut self.rng, &self.tuning));
                log::info!("Defense round started ({} asteroids)", self.tuning.asteroid_count);
            }
            Phase::Victory => {
                self.explosions.clear();
                self.schedule_transition(Phase::Intro, self.tuning.victory_ms);
            }
            Phase::Explore => self.set_focus(None),
            Phase::Beauty | Phase::Intro => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Experience {
        Experience::with_defaults(42).unwrap()
    }

    /// Drive the session into the bio step via skip
    fn at_bio() -> Experience {
        let mut exp = session();
        assert!(exp.skip());
        exp
    }

    #[test]
    fn test_starts_in_beauty() {
        let exp = session();
        assert_eq!(exp.phase(), Phase::Beauty);
        assert_eq!(exp.hits(), 0);
        assert_eq!(exp.nav_button(), Some(NavButton::Skip));
        assert!(!exp.has_pending_transition());
    }

    #[test]
    fn test_confirm_beauty_schedules_alert() {
        let mut exp = session();
        assert!(exp.confirm_beauty());
        assert_eq!(exp.phase(), Phase::TransitionOut);
        assert!(exp.has_pending_transition());
        assert_eq!(exp.nav_button(), Some(NavButton::Skip));
        // Only once
        assert!(!exp.confirm_beauty());
    }

    #[test]
    fn test_commands_gated_by_phase() {
        let mut exp = session();
        assert!(!exp.fire());
        assert!(!exp.select_category("Skills"));
        assert!(!exp.enter_explore());
        assert!(!exp.back());
        assert!(!exp.continue_intro());
        assert!(!exp.view_image("/a.jpg"));
        assert_eq!(exp.phase(), Phase::Beauty);
    }

    #[test]
    fn test_skip_cancels_pending_transition() {
        let mut exp = session();
        exp.confirm_beauty();
        assert!(exp.skip());
        assert_eq!(exp.phase(), Phase::Intro);
        assert_eq!(exp.intro_step(), IntroStep::Bio);
        assert!(!exp.has_pending_transition());
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut exp = session();
        exp.confirm_beauty();
        exp.skip();
        exp.on_timer(PhaseTimer {
            from: Phase::TransitionOut,
            to: Phase::ThreatAlert,
        });
        assert_eq!(exp.phase(), Phase::Intro);
    }

    #[test]
    fn test_skip_not_available_on_bio() {
        let mut exp = at_bio();
        assert!(!exp.skip());
        assert_eq!(exp.nav_button(), None);
    }

    #[test]
    fn test_explore_focus_and_back() {
        let mut exp = at_bio();
        assert!(exp.enter_explore());
        assert_eq!(exp.phase(), Phase::Explore);
        assert_eq!(exp.focus(), None);
        assert_eq!(exp.nav_button(), Some(NavButton::Back));

        assert!(exp.select_category("Projects"));
        assert_eq!(exp.focused_category().unwrap().items.len(), 6);
        assert_eq!(exp.nav_button(), Some(NavButton::Close));

        assert!(exp.back());
        assert_eq!(exp.phase(), Phase::Explore);
        assert_eq!(exp.focus(), None);

        assert!(exp.back());
        assert_eq!(exp.phase(), Phase::Intro);
        assert_eq!(exp.intro_step(), IntroStep::Bio);
    }

    #[test]
    fn test_unknown_category_renders_nothing() {
        let mut exp = at_bio();
        exp.enter_explore();
        assert!(!exp.select_category("Hobbies"));
        assert_eq!(exp.focus(), None);
        assert!(exp.focused_category().is_none());
    }

    #[test]
    fn test_clear_focus() {
        let mut exp = at_bio();
        exp.enter_explore();
        assert!(!exp.clear_focus());
        exp.select_category("Skills");
        assert!(exp.clear_focus());
        assert_eq!(exp.focus(), None);
    }

    #[test]
    fn test_image_modal() {
        let mut exp = at_bio();
        exp.enter_explore();
        exp.select_category("Education");
        assert!(exp.view_image("/class10.jpg"));
        assert_eq!(exp.modal_image(), Some("/class10.jpg"));
        assert!(exp.close_image());
        assert!(!exp.close_image());

        // Leaving explore closes it
        exp.view_image("/class12.jpg");
        exp.back();
        exp.back();
        assert_eq!(exp.modal_image(), None);
    }

    #[test]
    fn test_contact_toggle_any_phase() {
        let mut exp = session();
        assert!(exp.toggle_contact());
        assert!(exp.contact_open());
        exp.confirm_beauty();
        exp.toggle_contact();
        assert!(!exp.contact_open());
    }

    #[test]
    fn test_press_nav_follows_label() {
        let mut exp = session();
        assert!(exp.press_nav());
        assert_eq!(exp.phase(), Phase::Intro);
        assert!(!exp.press_nav());

        exp.enter_explore();
        exp.select_category("Skills");
        assert!(exp.press_nav());
        assert_eq!(exp.focus(), None);
        assert!(exp.press_nav());
        assert_eq!(exp.phase(), Phase::Intro);
    }

    #[test]
    fn test_events_recorded() {
        let mut exp = session();
        exp.skip();
        let events = exp.drain_events();
        assert_eq!(
            events,
            vec![ExperienceEvent::PhaseChanged {
                from: Phase::Beauty,
                to: Phase::Intro
            }]
        );
        assert!(exp.drain_events().is_empty());
    }

    #[test]
    fn test_nav_skips_the_silence() {
        let mut exp = session();
        exp.confirm_beauty();
        assert!(exp.press_nav());
        assert_eq!(exp.phase(), Phase::Intro);
        assert!(!exp.has_pending_transition());
    }

    #[test]
    fn test_reveal_text_cleared_after_intro() {
        let mut exp = at_bio();
        exp.reveal.advance(10_000.0);
        assert_eq!(exp.reveal_text(), "Subhradip Nandi");
        exp.enter_explore();
        assert_eq!(exp.reveal_text(), "");
    }

    #[test]
    fn test_user_camera_locked_during_defense() {
        let mut exp = session();
        assert!(exp.set_user_camera(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(exp.camera().position(), Vec3::new(1.0, 2.0, 3.0));

        exp.phase = Phase::Defense;
        assert!(!exp.set_user_camera(Vec3::new(4.0, 4.0, 4.0)));
        assert_eq!(exp.camera().position(), Vec3::new(1.0, 2.0, 3.0));
    }
}
