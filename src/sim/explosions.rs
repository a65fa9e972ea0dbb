//! Short-lived explosion effects
//!
//! Each explosion owns its particles and an expiry timer. Expiry is driven by
//! the session clock; [`Explosions::clear`] removes everything at once along
//! with the pending expiries.

use glam::Vec3;
use rand::Rng;
use serde::Serialize;

use super::timer::{Scheduler, TimerHandle};
use crate::random_unit_vector;
use crate::tuning::Tuning;

/// One debris particle, offset from the explosion origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub offset: Vec3,
    pub dir: Vec3,
    /// Distance travelled per frame
    pub speed: f32,
    /// Render scale, shrinks every frame
    pub scale: f32,
}

/// A single explosion
#[derive(Debug, Clone, Serialize)]
pub struct Explosion {
    pub id: u64,
    /// Where the asteroid was destroyed
    pub origin: Vec3,
    pub particles: Vec<Particle>,
    #[serde(skip)]
    expiry: TimerHandle,
}

/// All explosions currently on screen
#[derive(Debug, Clone)]
pub struct Explosions {
    effects: Vec<Explosion>,
    timers: Scheduler<u64>,
    next_id: u64,
    lifetime_ms: f64,
    particle_count: usize,
    min_speed: f32,
    max_speed: f32,
    shrink: f32,
}

impl Explosions {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            effects: Vec::new(),
            timers: Scheduler::new(),
            next_id: 1,
            lifetime_ms: tuning.explosion_lifetime_ms,
            particle_count: tuning.particle_count,
            min_speed: tuning.particle_min_speed,
            max_speed: tuning.particle_max_speed,
            shrink: tuning.particle_shrink,
        }
    }

    /// Spawn an explosion at `origin`, returning its id
    pub fn spawn<R: Rng + ?Sized>(&mut self, origin: Vec3, rng: &mut R) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let particles = (0..self.particle_count)
            .map(|_| Particle {
                offset: Vec3::ZERO,
                dir: random_unit_vector(rng),
                speed: rng.random_range(self.min_speed..=self.max_speed),
                scale: 1.0,
            })
            .collect();

        let expiry = self.timers.schedule(id, self.lifetime_ms);
        self.effects.push(Explosion {
            id,
            origin,
            particles,
            expiry,
        });
        id
    }

    /// Expire old explosions, then move and shrink the remaining particles
    pub fn advance(&mut self, dt: f32) {
        let expired = self.timers.advance(f64::from(dt) * 1000.0);
        if !expired.is_empty() {
            self.effects.retain(|e| !expired.contains(&e.id));
        }

        for effect in &mut self.effects {
            for p in &mut effect.particles {
                p.offset += p.dir * p.speed;
                p.scale *= self.shrink;
            }
        }
    }

    /// Remove every explosion immediately
    pub fn clear(&mut self) {
        for effect in self.effects.drain(..) {
            self.timers.cancel(effect.expiry);
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.effects.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Explosion> {
        self.effects.iter()
    }
}
