//! Per-frame update and the renderer boundary
//!
//! The host calls [`tick`] once per rendered frame and [`apply`] for each
//! discrete input. Everything the renderer needs comes back in a [`Frame`].

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::asteroids::Asteroid;
use super::camera::{CameraPose, Viewport};
use super::explosions::Explosion;
use super::orbit::sub_item_slots;
use super::phase::{IntroStep, Phase};
use super::state::{Experience, NavButton};

/// Discrete input from the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Command {
    ConfirmBeauty,
    /// Space key or tap during defense
    Fire,
    Skip,
    ContinueIntro,
    EnterExplore,
    SelectCategory(String),
    ClearFocus,
    Back,
    /// Whatever the skip/back button currently does
    Nav,
    ToggleContact,
    ViewImage(String),
    CloseImage,
    /// The visitor's orbit controls moved the camera
    CameraMoved(Vec3),
}

/// Dispatch a command; returns whether it applied
pub fn apply(exp: &mut Experience, command: &Command) -> bool {
    match command {
        Command::ConfirmBeauty => exp.confirm_beauty(),
        Command::Fire => exp.fire(),
        Command::Skip => exp.skip(),
        Command::ContinueIntro => exp.continue_intro(),
        Command::EnterExplore => exp.enter_explore(),
        Command::SelectCategory(name) => exp.select_category(name),
        Command::ClearFocus => exp.clear_focus(),
        Command::Back => exp.back(),
        Command::Nav => exp.press_nav(),
        Command::ToggleContact => exp.toggle_contact(),
        Command::ViewImage(link) => exp.view_image(link),
        Command::CloseImage => exp.close_image(),
        Command::CameraMoved(position) => exp.set_user_camera(*position),
    }
}

/// A sub-item orbiting the focused category
#[derive(Debug, Clone, Serialize)]
pub struct SubItemView {
    pub name: String,
    pub color: String,
    pub position: Vec3,
}

/// A category node on the ring
#[derive(Debug, Clone, Serialize)]
pub struct SatelliteView {
    pub name: String,
    pub color: String,
    pub position: Vec3,
    pub selected: bool,
    /// Only filled for the selected node
    pub items: Vec<SubItemView>,
}

/// One entry of the explore panel
#[derive(Debug, Clone, Serialize)]
pub struct PanelItemView {
    pub name: String,
    pub color: String,
    pub detail: Option<String>,
    pub external_link: Option<String>,
    /// Image opened in the modal viewer
    pub link: Option<String>,
    pub link_label: String,
}

/// Text panel for the focused category
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub items: Vec<PanelItemView>,
}

/// Everything the renderer draws for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub phase: Phase,
    pub intro_step: IntroStep,
    pub hits: u32,
    pub victory_hits: u32,
    pub focus: Option<String>,
    pub asteroids: Vec<Asteroid>,
    pub explosions: Vec<Explosion>,
    pub camera: CameraPose,
    pub ring_rotation: f32,
    /// Spin of each category node about its own axis
    pub node_spin: f32,
    pub satellites: Vec<SatelliteView>,
    /// Explore panel, present while a known category is focused
    pub panel: Option<PanelView>,
    pub reveal_text: String,
    pub show_continue: bool,
    pub nav: Option<NavButton>,
    pub contact_open: bool,
    pub modal_image: Option<String>,
}

/// Advance the session by `dt` seconds and capture the frame
pub fn tick(exp: &mut Experience, dt: f32, viewport: Viewport) -> Frame {
    let dt = dt.max(0.0);
    let dt_ms = f64::from(dt) * 1000.0;
    exp.elapsed += dt;

    // Reveal before timers: a reveal started by a timer begins next frame
    if exp.reveal.advance(dt_ms) {
        exp.on_reveal_complete();
    }

    for timer in exp.timers.advance(dt_ms) {
        exp.on_timer(timer);
    }

    if exp.phase == Phase::Defense {
        if let Some(field) = exp.field.as_mut() {
            field.advance(dt, &mut exp.rng);
        }
    }
    exp.explosions.advance(dt);

    if exp.phase == Phase::Explore {
        let focus_index = exp
            .focus
            .as_deref()
            .and_then(|name| exp.catalog.index_of(name));
        exp.ring.advance(focus_index, exp.catalog.len(), dt);
    }

    let camera = exp
        .camera
        .update(exp.phase, exp.focus.as_deref(), viewport, dt);

    capture(exp, camera)
}

fn capture(exp: &Experience, camera: CameraPose) -> Frame {
    let asteroids = match (exp.phase, exp.field.as_ref()) {
        (Phase::Defense, Some(field)) => field.live().copied().collect(),
        _ => Vec::new(),
    };

    Frame {
        phase: exp.phase,
        intro_step: exp.intro_step,
        hits: exp.hits,
        victory_hits: exp.tuning.victory_hits,
        focus: exp.focus.clone(),
        asteroids,
        explosions: exp.explosions.iter().cloned().collect(),
        camera,
        ring_rotation: exp.ring.rotation(),
        node_spin: exp.elapsed * exp.tuning.node_spin,
        satellites: satellites(exp),
        panel: panel(exp),
        reveal_text: exp.reveal_text().to_owned(),
        show_continue: exp.show_continue,
        nav: exp.nav_button(),
        contact_open: exp.contact_open,
        modal_image: exp.modal_image.clone(),
    }
}

fn panel(exp: &Experience) -> Option<PanelView> {
    if exp.phase != Phase::Explore {
        return None;
    }
    let category = exp.focused_category()?;
    Some(PanelView {
        name: category.name.clone(),
        color: category.color.clone(),
        description: category.description.clone(),
        items: category
            .items
            .iter()
            .map(|item| PanelItemView {
                name: item.name.clone(),
                color: item.color.clone(),
                detail: item.detail.clone(),
                external_link: item.external_link.clone(),
                link: item.link.clone(),
                link_label: item.link_label().to_owned(),
            })
            .collect(),
    })
}

fn satellites(exp: &Experience) -> Vec<SatelliteView> {
    if exp.phase != Phase::Explore {
        return Vec::new();
    }

    let count = exp.catalog.len();
    let spin = Quat::from_rotation_y(exp.ring.rotation());
    exp.catalog
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let local = exp.ring.node_local(i, count);
            let selected = exp.focus.as_deref() == Some(category.name.as_str());
            let items = if selected {
                sub_item_slots(category.distribution, category.items.len())
                    .iter()
                    .zip(&category.items)
                    .map(|(slot, item)| SubItemView {
                        name: item.name.clone(),
                        color: item.color.clone(),
                        position: spin * (local + slot.position_at(exp.elapsed)),
                    })
                    .collect()
            } else {
                Vec::new()
            };

            SatelliteView {
                name: category.name.clone(),
                color: category.color.clone(),
                position: spin * local,
                selected,
                items,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ExperienceEvent;

    const VIEW: Viewport = Viewport {
        width: 1280.0,
        height: 720.0,
    };

    fn session() -> Experience {
        Experience::with_defaults(12345).unwrap()
    }

    /// Tick in whole half-second steps
    fn run_secs(exp: &mut Experience, secs: f32) -> Frame {
        let mut frame = tick(exp, 0.0, VIEW);
        let steps = (secs / 0.5) as usize;
        for _ in 0..steps {
            frame = tick(exp, 0.5, VIEW);
        }
        frame
    }

    fn into_defense(exp: &mut Experience) {
        exp.confirm_beauty();
        run_secs(exp, 10.0);
        assert_eq!(exp.phase(), Phase::Defense);
    }

    #[test]
    fn test_beauty_to_defense_timeline() {
        let mut exp = session();
        assert!(apply(&mut exp, &Command::ConfirmBeauty));

        run_secs(&mut exp, 5.5);
        assert_eq!(exp.phase(), Phase::TransitionOut);
        run_secs(&mut exp, 0.5);
        assert_eq!(exp.phase(), Phase::ThreatAlert);

        run_secs(&mut exp, 3.5);
        assert_eq!(exp.phase(), Phase::ThreatAlert);
        let frame = run_secs(&mut exp, 0.5);
        assert_eq!(exp.phase(), Phase::Defense);
        assert_eq!(frame.asteroids.len(), 20);
        assert!(!frame.camera.controls.enabled);
    }

    #[test]
    fn test_skip_during_silence_never_alerts() {
        let mut exp = session();
        exp.confirm_beauty();
        run_secs(&mut exp, 3.0);
        assert!(apply(&mut exp, &Command::Skip));

        run_secs(&mut exp, 20.0);
        assert_eq!(exp.phase(), Phase::Intro);
        let phases: Vec<_> = exp
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                ExperienceEvent::PhaseChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert!(!phases.contains(&Phase::ThreatAlert));
    }

    #[test]
    fn test_fifteen_hits_win_and_clear_effects() {
        let mut exp = session();
        into_defense(&mut exp);

        for i in 0..15 {
            assert!(apply(&mut exp, &Command::Fire), "shot {i}");
            if i < 14 {
                assert!(!exp.explosions().is_empty());
            }
            tick(&mut exp, 1.0 / 60.0, VIEW);
        }
        assert_eq!(exp.hits(), 15);
        assert_eq!(exp.phase(), Phase::Victory);
        assert!(exp.explosions().is_empty());
        assert!(!apply(&mut exp, &Command::Fire));
        assert_eq!(exp.hits(), 15);
    }

    #[test]
    fn test_victory_leads_to_bio() {
        let mut exp = session();
        into_defense(&mut exp);
        for _ in 0..15 {
            exp.fire();
        }
        run_secs(&mut exp, 3.5);
        assert_eq!(exp.phase(), Phase::Victory);
        run_secs(&mut exp, 0.5);
        assert_eq!(exp.phase(), Phase::Intro);
        assert_eq!(exp.intro_step(), IntroStep::Bio);
    }

    #[test]
    fn test_fire_without_targets_is_silent() {
        let mut tuning = crate::Tuning::default();
        tuning.asteroid_count = 3;
        // Unwinnable on purpose: `Experience::new` takes tuning unvalidated
        assert!(tuning.validate().is_err());
        let mut exp = Experience::new(9, crate::Catalog::builtin().unwrap(), tuning);
        into_defense(&mut exp);

        for _ in 0..3 {
            assert!(exp.fire());
        }
        assert!(!exp.fire());
        assert_eq!(exp.hits(), 3);
        assert_eq!(exp.explosions().len(), 3);
        assert_eq!(exp.phase(), Phase::Defense);
    }

    #[test]
    fn test_input_capture_scoped_to_defense() {
        let mut exp = session();
        into_defense(&mut exp);
        let events = exp.drain_events();
        assert!(events.contains(&ExperienceEvent::InputCaptureChanged { active: true }));

        for _ in 0..15 {
            exp.fire();
        }
        let events = exp.drain_events();
        assert!(events.contains(&ExperienceEvent::InputCaptureChanged { active: false }));
    }

    #[test]
    fn test_asteroids_hidden_outside_defense() {
        let mut exp = session();
        let frame = tick(&mut exp, 0.1, VIEW);
        assert!(frame.asteroids.is_empty());
        assert!(frame.satellites.is_empty());
    }

    #[test]
    fn test_thanks_flow_when_configured() {
        let mut tuning = crate::Tuning::default();
        tuning.victory_intro_step = IntroStep::Thanks;
        let mut exp = Experience::new(5, crate::Catalog::builtin().unwrap(), tuning);
        into_defense(&mut exp);
        for _ in 0..15 {
            exp.fire();
        }
        run_secs(&mut exp, 4.0);
        assert_eq!(exp.intro_step(), IntroStep::Thanks);
        assert_eq!(exp.nav_button(), Some(NavButton::Skip));
        assert!(!exp.continue_intro());

        // 28 characters at 150ms, plus one more step to complete
        let frame = run_secs(&mut exp, 5.0);
        assert_eq!(frame.reveal_text, crate::sim::THANKS_TEXT);
        assert!(frame.show_continue);

        assert!(apply(&mut exp, &Command::ContinueIntro));
        assert_eq!(exp.intro_step(), IntroStep::Bio);
        let frame = run_secs(&mut exp, 3.0);
        assert_eq!(frame.reveal_text, "Subhradip Nandi");
    }

    #[test]
    fn test_explore_frame() {
        let mut exp = session();
        exp.skip();
        exp.enter_explore();
        apply(&mut exp, &Command::SelectCategory("Skills".into()));

        let frame = run_secs(&mut exp, 5.0);
        assert_eq!(frame.satellites.len(), 4);
        let skills = &frame.satellites[1];
        assert!(skills.selected);
        assert_eq!(skills.items.len(), 12);
        assert!(frame.satellites.iter().filter(|s| !s.selected).all(|s| s.items.is_empty()));

        // Skills has been brought round to the front
        assert!((skills.position - Vec3::new(0.0, 0.0, 6.0)).length() < 0.05);
        assert!(frame.camera.view_offset.is_some());
    }

    #[test]
    fn test_idle_ring_spins_in_explore_only() {
        let mut exp = session();
        run_secs(&mut exp, 2.0);
        assert_eq!(exp.ring().rotation(), 0.0);

        exp.skip();
        exp.enter_explore();
        run_secs(&mut exp, 1.0);
        assert!((exp.ring().rotation() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_command_wire_format() {
        let cmd: Command =
            serde_json::from_str(r#"{ "type": "select_category", "value": "Skills" }"#).unwrap();
        assert_eq!(cmd, Command::SelectCategory("Skills".into()));
        let cmd: Command = serde_json::from_str(r#"{ "type": "fire" }"#).unwrap();
        assert_eq!(cmd, Command::Fire);
    }

    #[test]
    fn test_same_seed_same_field() {
        let mut a = session();
        let mut b = session();
        into_defense(&mut a);
        into_defense(&mut b);
        let pa: Vec<_> = a.asteroids().unwrap().live().map(|x| x.pos).collect();
        let pb: Vec<_> = b.asteroids().unwrap().live().map(|x| x.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_explore_panel_lists_item_links() {
        let mut exp = session();
        exp.skip();
        exp.enter_explore();
        assert!(tick(&mut exp, 0.1, VIEW).panel.is_none());

        apply(&mut exp, &Command::SelectCategory("Education".into()));
        let frame = tick(&mut exp, 0.1, VIEW);
        let panel = frame.panel.expect("panel for focused category");
        assert_eq!(panel.name, "Education");
        let class12 = panel.items.iter().find(|i| i.name == "Class 12").unwrap();
        assert_eq!(class12.link.as_deref(), Some("/class12.jpg"));
        assert_eq!(class12.link_label, "View Class 12 Marksheet");

        assert!(apply(&mut exp, &Command::ViewImage("/class12.jpg".into())));
        let frame = tick(&mut exp, 0.1, VIEW);
        assert_eq!(frame.modal_image.as_deref(), Some("/class12.jpg"));

        apply(&mut exp, &Command::Back);
        assert!(tick(&mut exp, 0.1, VIEW).panel.is_none());
    }

    #[test]
    fn test_camera_moved_hands_off_to_visitor() {
        let mut exp = session();
        exp.skip();
        exp.enter_explore();
        run_secs(&mut exp, 5.0);

        let cmd: Command =
            serde_json::from_str(r#"{ "type": "camera_moved", "value": [3.0, 1.0, 9.0] }"#).unwrap();
        assert!(apply(&mut exp, &cmd));
        let frame = tick(&mut exp, 1.0 / 60.0, VIEW);
        assert_eq!(frame.camera.position, Vec3::new(3.0, 1.0, 9.0));
    }

    #[test]
    fn test_camera_moved_ignored_in_defense() {
        let mut exp = session();
        into_defense(&mut exp);
        assert!(!apply(&mut exp, &Command::CameraMoved(Vec3::new(3.0, 1.0, 9.0))));
    }
}
