//! Camera pose derived from phase, focus and viewport
//!
//! Two concerns are composed every frame:
//! - a view offset that slides the planet aside while a text panel is shown
//! - position/zoom, either held fixed (locked phases) or eased toward a
//!   per-phase target once after every phase or focus change, then left to
//!   the visitor's orbit controls

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::phase::Phase;
use crate::consts::{OFFSET_EPSILON, TRANSITION_EPSILON};
use crate::tuning::Tuning;
use crate::{damp, damp_vec3};

/// Viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_mobile(&self, breakpoint: f32) -> bool {
        self.width < breakpoint
    }
}

/// What the visitor's orbit controls are allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPolicy {
    pub enabled: bool,
    pub zoom: bool,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl ControlPolicy {
    pub fn for_phase(phase: Phase) -> Self {
        Self {
            enabled: !phase.is_locked(),
            zoom: matches!(
                phase,
                Phase::Beauty | Phase::Intro | Phase::Victory | Phase::Explore
            ),
            auto_rotate: matches!(phase, Phase::Beauty | Phase::Victory | Phase::Intro),
            auto_rotate_speed: 0.5,
            min_distance: 3.5,
            max_distance: 25.0,
        }
    }
}

/// Camera output for one frame; the camera always looks at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    /// Projection shift in pixels, `None` when cleared
    pub view_offset: Option<Vec2>,
    pub controls: ControlPolicy,
}

/// Camera rates and distances taken from [`Tuning`]
#[derive(Debug, Clone, Copy)]
struct Rates {
    breakpoint: f32,
    view_shift: f32,
    offset_rate: f32,
    locked_rate: f32,
    transition_decay: f32,
    approach_rate: f32,
    locked_distance: f32,
    focus_distance: f32,
    focus_distance_mobile: f32,
    overview_distance: f32,
    overview_distance_mobile: f32,
}

/// Eases the camera between phase-specific poses
#[derive(Debug, Clone)]
pub struct CameraController {
    position: Vec3,
    offset: Vec2,
    /// 1.0 right after a phase/focus change, decays toward 0
    transition: f32,
    last_key: Option<(Phase, Option<String>)>,
    rates: Rates,
}

impl CameraController {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, tuning.start_distance),
            offset: Vec2::ZERO,
            transition: 1.0,
            last_key: None,
            rates: Rates {
                breakpoint: tuning.mobile_breakpoint,
                view_shift: tuning.view_shift,
                offset_rate: tuning.offset_rate,
                locked_rate: tuning.locked_rate,
                transition_decay: tuning.transition_decay,
                approach_rate: tuning.approach_rate,
                locked_distance: tuning.locked_distance,
                focus_distance: tuning.focus_distance,
                focus_distance_mobile: tuning.focus_distance_mobile,
                overview_distance: tuning.overview_distance,
                overview_distance_mobile: tuning.overview_distance_mobile,
            },
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn transition(&self) -> f32 {
        self.transition
    }

    /// Report where the orbit controls moved the camera
    ///
    /// Ignored in locked phases, where the next [`update`](Self::update)
    /// pulls the camera back anyway. Returns whether the position was taken.
    pub fn set_user_position(&mut self, phase: Phase, position: Vec3) -> bool {
        if phase.is_locked() || !position.is_finite() {
            return false;
        }
        self.position = position;
        true
    }

    pub fn update(
        &mut self,
        phase: Phase,
        focus: Option<&str>,
        viewport: Viewport,
        dt: f32,
    ) -> CameraPose {
        let changed = self
            .last_key
            .as_ref()
            .is_none_or(|(p, f)| *p != phase || f.as_deref() != focus);
        if changed {
            self.transition = 1.0;
            self.last_key = Some((phase, focus.map(str::to_owned)));
        }

        let r = self.rates;
        let mobile = viewport.is_mobile(r.breakpoint);
        let panel_open = phase == Phase::Intro || (phase == Phase::Explore && focus.is_some());

        // View offset
        let target_offset = match (panel_open, mobile) {
            (false, _) => Vec2::ZERO,
            (true, true) => Vec2::new(0.0, viewport.height * r.view_shift),
            (true, false) => Vec2::new(viewport.width * r.view_shift, 0.0),
        };
        self.offset = Vec2::new(
            damp(self.offset.x, target_offset.x, r.offset_rate, dt),
            damp(self.offset.y, target_offset.y, r.offset_rate, dt),
        );
        let view_offset = (panel_open
            || self.offset.x.abs() > OFFSET_EPSILON
            || self.offset.y.abs() > OFFSET_EPSILON)
            .then_some(self.offset);

        // Position / zoom
        if phase.is_locked() {
            self.position = damp_vec3(
                self.position,
                Vec3::new(0.0, 0.0, r.locked_distance),
                r.locked_rate,
                dt,
            );
        } else if self.transition > TRANSITION_EPSILON {
            self.transition = damp(self.transition, 0.0, r.transition_decay, dt);

            if phase == Phase::Explore {
                if focus.is_some() {
                    let z = if mobile { r.focus_distance_mobile } else { r.focus_distance };
                    self.position =
                        damp_vec3(self.position, Vec3::new(0.0, 0.0, z), r.approach_rate, dt);
                } else {
                    let target = if mobile { r.overview_distance_mobile } else { r.overview_distance };
                    let dist = damp(self.position.length(), target, r.approach_rate, dt);
                    let dir = self.position.try_normalize().unwrap_or(Vec3::Z);
                    self.position = dir * dist;
                }
            }
        }

        CameraPose {
            position: self.position,
            view_offset,
            controls: ControlPolicy::for_phase(phase),
        }
    }
}
