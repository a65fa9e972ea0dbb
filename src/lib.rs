//! Orbit Folio - phase-driven core of an orbiting-planet portfolio experience
//!
//! Core modules:
//! - `sim`: Deterministic experience core (phases, timers, asteroids, orbits, camera)
//! - `catalog`: Read-only content catalog consumed by the explore phase
//! - `tuning`: Data-driven timings and motion constants
//! - `platform`: Browser bindings (input scoping, frame publication)

pub mod catalog;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use catalog::{Catalog, Category, Distribution, Item};
pub use tuning::{ConfigError, Tuning};

use glam::Vec3;
use rand::Rng;

/// Experience configuration constants
pub mod consts {
    /// Silence between confirming the planet's beauty and the threat alert
    pub const SILENCE_MS: f64 = 6000.0;
    /// How long the threat alert is shown before defense starts
    pub const ALERT_MS: f64 = 4000.0;
    /// How long the victory message is shown before the intro
    pub const VICTORY_MS: f64 = 4000.0;
    /// Lifetime of a single explosion
    pub const EXPLOSION_LIFETIME_MS: f64 = 2500.0;

    /// Hits needed to win the defense round
    pub const VICTORY_HITS: u32 = 15;

    /// Asteroid field defaults
    pub const ASTEROID_COUNT: usize = 20;
    pub const SPAWN_MIN_RADIUS: f32 = 10.0;
    pub const SPAWN_MAX_RADIUS: f32 = 20.0;
    /// Approach speed toward the planet (units/s)
    pub const APPROACH_SPEED: f32 = 2.0;
    /// Asteroids closer than this get pushed back out
    pub const RECYCLE_RADIUS: f32 = 2.5;
    pub const RECYCLE_MIN_RADIUS: f32 = 15.0;
    pub const RECYCLE_MAX_RADIUS: f32 = 20.0;

    /// Explosion particles
    pub const PARTICLE_COUNT: usize = 20;
    pub const PARTICLE_MIN_SPEED: f32 = 0.05;
    pub const PARTICLE_MAX_SPEED: f32 = 0.15;
    /// Per-frame scale multiplier (render hint)
    pub const PARTICLE_SHRINK: f32 = 0.97;

    /// Category ring
    pub const RING_RADIUS: f32 = 6.0;
    /// Ring spin when nothing is focused (rad/s)
    pub const IDLE_SPIN: f32 = 0.2;
    /// Damping rate toward the focused category
    pub const FOCUS_DAMPING: f32 = 4.0;
    /// Spin of each category node about its own axis (rad/s)
    pub const NODE_SPIN: f32 = 0.5;
    pub const SUB_ORBIT_RADIUS: f32 = 2.0;
    pub const SPHERE_ORBIT_RADIUS: f32 = 2.5;
    pub const ITEMS_PER_PLANE: usize = 4;

    /// Text reveal cadence
    pub const THANKS_REVEAL_MS: f64 = 150.0;
    pub const NAME_REVEAL_MS: f64 = 100.0;

    /// Viewports narrower than this use the vertical layout
    pub const MOBILE_BREAKPOINT: f32 = 768.0;
    /// Fraction of the viewport the view offset shifts by
    pub const VIEW_SHIFT: f32 = 0.25;
    pub const OFFSET_RATE: f32 = 2.5;
    pub const LOCKED_RATE: f32 = 2.0;
    pub const TRANSITION_DECAY: f32 = 2.0;
    pub const APPROACH_RATE: f32 = 4.0;
    /// Transition weight below which automatic camera moves stop
    pub const TRANSITION_EPSILON: f32 = 0.01;
    /// Offsets smaller than this are treated as cleared
    pub const OFFSET_EPSILON: f32 = 0.1;

    /// Camera distances
    pub const START_DISTANCE: f32 = 8.0;
    pub const LOCKED_DISTANCE: f32 = 14.0;
    pub const FOCUS_DISTANCE: f32 = 20.0;
    pub const FOCUS_DISTANCE_MOBILE: f32 = 32.0;
    pub const OVERVIEW_DISTANCE: f32 = 20.0;
    pub const OVERVIEW_DISTANCE_MOBILE: f32 = 35.0;
}

/// Shortest signed angle from `current` to `target`, wrapped to [-π, π]
#[inline]
pub fn shortest_angle_delta(current: f32, target: f32) -> f32 {
    let diff = target - current;
    diff.sin().atan2(diff.cos())
}

/// Exponential approach of `current` toward `target` at `rate` per second
#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}

/// Vector form of [`damp`]
#[inline]
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, (rate * dt).min(1.0))
}

/// Uniformly distributed direction on the unit sphere
///
/// Uses inverse-transform sampling of the polar angle so points do not
/// cluster at the poles.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * std::f32::consts::TAU;
    let phi = (rng.random::<f32>() * 2.0 - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    #[test]
    fn test_shortest_delta_wraps_backwards() {
        let delta = shortest_angle_delta(0.0, 3.0 * PI / 2.0);
        assert!((delta + PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_damp_never_overshoots() {
        assert_eq!(damp(0.0, 10.0, 4.0, 1.0), 10.0);
        assert!((damp(0.0, 10.0, 4.0, 0.1) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_random_unit_vector_is_normalized() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            assert!((random_unit_vector(&mut rng).length() - 1.0).abs() < 1e-4);
        }
    }

    proptest! {
        #[test]
        fn shortest_delta_is_bounded_and_lands_on_target(
            current in -20.0f32..20.0,
            target in -20.0f32..20.0,
        ) {
            let delta = shortest_angle_delta(current, target);
            prop_assert!(delta.abs() <= PI + 1e-4);
            let landed = current + delta;
            prop_assert!((landed - target).sin().abs() < 1e-3);
            prop_assert!((landed - target).cos() > 0.999);
        }
    }
}
