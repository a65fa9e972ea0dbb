//! Category ring and sub-item orbits
//!
//! Categories sit evenly on a horizontal ring around the planet. Angle 0 is
//! the front of the ring (+Z, facing the camera). When a category is focused
//! the ring turns the short way round until that category is in front.
//! Sub-item positions are a closed-form function of elapsed time, so they
//! never drift.

use glam::{Quat, Vec3};
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI, TAU};

use crate::catalog::Distribution;
use crate::consts::{ITEMS_PER_PLANE, SPHERE_ORBIT_RADIUS, SUB_ORBIT_RADIUS};
use crate::shortest_angle_delta;
use crate::tuning::Tuning;

/// Inclinations used by multi-plane layouts, in plane order
pub const PLANE_TILTS: [f32; 3] = [0.0, FRAC_PI_2, FRAC_PI_4];

/// Where one sub-item orbits its category node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitSlot {
    pub radius: f32,
    /// Inclination about the X axis
    pub tilt: f32,
    /// Angle along the orbit at t = 0
    pub phase: f32,
    /// Which inclined ring the item is on
    pub plane: usize,
}

impl OrbitSlot {
    /// Position relative to the category node after `t` seconds
    pub fn position_at(&self, t: f32) -> Vec3 {
        let a = self.phase + t;
        let flat = Vec3::new(a.cos() * self.radius, 0.0, a.sin() * self.radius);
        Quat::from_rotation_x(self.tilt) * flat
    }
}

/// Orbit slots for `count` items under the given policy
pub fn sub_item_slots(distribution: Distribution, count: usize) -> Vec<OrbitSlot> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|idx| match distribution {
            Distribution::Ring => OrbitSlot {
                radius: SUB_ORBIT_RADIUS,
                tilt: 0.0,
                phase: idx as f32 / n * TAU,
                plane: 0,
            },
            Distribution::MultiPlane => {
                let plane = idx / ITEMS_PER_PLANE;
                let in_plane = idx % ITEMS_PER_PLANE;
                // Offset each plane so items cross the shared nodes at different times
                let phase = in_plane as f32 / ITEMS_PER_PLANE as f32 * TAU + plane as f32 * FRAC_PI_6;
                OrbitSlot {
                    radius: SUB_ORBIT_RADIUS,
                    tilt: PLANE_TILTS[plane % PLANE_TILTS.len()],
                    phase,
                    plane,
                }
            }
            Distribution::FullSphere => OrbitSlot {
                radius: SPHERE_ORBIT_RADIUS,
                tilt: idx as f32 * (PI / n),
                phase: idx as f32 * (TAU / n),
                plane: idx,
            },
        })
        .collect()
}

/// The rotating ring of category nodes
#[derive(Debug, Clone)]
pub struct OrbitRing {
    rotation: f32,
    radius: f32,
    idle_spin: f32,
    focus_damping: f32,
}

impl OrbitRing {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            rotation: 0.0,
            radius: tuning.ring_radius,
            idle_spin: tuning.idle_spin,
            focus_damping: tuning.focus_damping,
        }
    }

    /// Current ring rotation about Y (radians, unwrapped)
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Angle of category `index` on the unrotated ring
    pub fn node_angle(index: usize, count: usize) -> f32 {
        index as f32 / count.max(1) as f32 * TAU
    }

    /// Ring rotation that brings category `index` to the front
    pub fn target_rotation(index: usize, count: usize) -> f32 {
        -Self::node_angle(index, count)
    }

    /// Spin idly, or turn toward the focused category
    pub fn advance(&mut self, focus: Option<usize>, count: usize, dt: f32) {
        match focus {
            Some(index) if count > 0 => {
                let target = Self::target_rotation(index, count);
                let delta = shortest_angle_delta(self.rotation, target);
                self.rotation += delta * (self.focus_damping * dt).min(1.0);
            }
            _ => self.rotation += self.idle_spin * dt,
        }
    }

    /// Node position before the ring rotation is applied
    pub fn node_local(&self, index: usize, count: usize) -> Vec3 {
        let a = Self::node_angle(index, count);
        Vec3::new(a.sin() * self.radius, 0.0, a.cos() * self.radius)
    }

    /// Node position in world space
    pub fn node_position(&self, index: usize, count: usize) -> Vec3 {
        Quat::from_rotation_y(self.rotation) * self.node_local(index, count)
    }
}
