//! Asteroid field for the defense round
//!
//! A fixed population spawned on a spherical shell, drifting toward the
//! planet at the origin. Asteroids that get too close are pushed back out
//! rather than removed, so only the player's shots shrink the field.

use glam::Vec3;
use rand::Rng;
use serde::Serialize;

use crate::random_unit_vector;
use crate::tuning::Tuning;

/// A destructible asteroid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Asteroid {
    /// Stable id in 0..count, fixed when the field is created
    pub id: u32,
    pub pos: Vec3,
    /// Cleared when shot; never set again within a round
    pub alive: bool,
}

/// The active population of asteroids
#[derive(Debug, Clone)]
pub struct AsteroidField {
    asteroids: Vec<Asteroid>,
    approach_speed: f32,
    recycle_radius: f32,
    recycle_min: f32,
    recycle_max: f32,
}

impl AsteroidField {
    /// Spawn `tuning.asteroid_count` asteroids uniformly on the spawn shell
    pub fn new<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning) -> Self {
        let asteroids = (0..tuning.asteroid_count as u32)
            .map(|id| {
                let r = rng.random_range(tuning.spawn_min_radius..=tuning.spawn_max_radius);
                Asteroid {
                    id,
                    pos: random_unit_vector(rng) * r,
                    alive: true,
                }
            })
            .collect();

        Self {
            asteroids,
            approach_speed: tuning.approach_speed,
            recycle_radius: tuning.recycle_radius,
            recycle_min: tuning.recycle_min_radius,
            recycle_max: tuning.recycle_max_radius,
        }
    }

    /// Move every live asteroid toward the origin, recycling close ones
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        for asteroid in self.asteroids.iter_mut().filter(|a| a.alive) {
            let dist = asteroid.pos.length();
            let outward = asteroid
                .pos
                .try_normalize()
                .unwrap_or_else(|| random_unit_vector(rng));

            // Never step through the planet
            let step = (self.approach_speed * dt).min(dist);
            asteroid.pos -= outward * step;

            if asteroid.pos.length() < self.recycle_radius {
                let r = rng.random_range(self.recycle_min..=self.recycle_max);
                asteroid.pos = outward * r;
            }
        }
    }

    /// Remove the live asteroid nearest to `origin` and return where it was
    ///
    /// Ties go to the lowest id. Returns `None` when nothing is left.
    pub fn destroy_nearest(&mut self, origin: Vec3) -> Option<Vec3> {
        let mut nearest: Option<(usize, f32)> = None;
        for (i, asteroid) in self.asteroids.iter().enumerate() {
            if !asteroid.alive {
                continue;
            }
            let dist = asteroid.pos.distance(origin);
            if nearest.is_none_or(|(_, best)| dist < best) {
                nearest = Some((i, dist));
            }
        }

        let (index, _) = nearest?;
        let asteroid = &mut self.asteroids[index];
        asteroid.alive = false;
        log::debug!("Asteroid {} destroyed at {:?}", asteroid.id, asteroid.pos);
        Some(asteroid.pos)
    }

    /// Live asteroids in id order
    pub fn live(&self) -> impl Iterator<Item = &Asteroid> {
        self.asteroids.iter().filter(|a| a.alive)
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn is_alive(&self, id: u32) -> bool {
        self.asteroids.get(id as usize).is_some_and(|a| a.alive)
    }

    /// Every asteroid, including destroyed ones
    pub fn all(&self) -> &[Asteroid] {
        &self.asteroids
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, id: u32, pos: Vec3) {
        self.asteroids[id as usize].pos = pos;
    }
}
