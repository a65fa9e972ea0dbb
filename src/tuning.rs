//! Data-driven timings and motion constants
//!
//! Every field defaults to the matching value in [`crate::consts`], so a
//! partial JSON document only overrides what it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::IntroStep;

/// Errors raised while loading catalog or tuning data
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no categories")]
    EmptyCatalog,
    #[error("duplicate category `{0}`")]
    DuplicateCategory(String),
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}

/// Timings and speeds for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Phase timers (ms) ===
    pub silence_ms: f64,
    pub alert_ms: f64,
    pub victory_ms: f64,
    /// Intro step shown once the victory message times out
    pub victory_intro_step: IntroStep,

    // === Defense round ===
    pub victory_hits: u32,
    pub asteroid_count: usize,
    pub spawn_min_radius: f32,
    pub spawn_max_radius: f32,
    pub approach_speed: f32,
    pub recycle_radius: f32,
    pub recycle_min_radius: f32,
    pub recycle_max_radius: f32,

    // === Explosions ===
    pub explosion_lifetime_ms: f64,
    pub particle_count: usize,
    pub particle_min_speed: f32,
    pub particle_max_speed: f32,
    pub particle_shrink: f32,

    // === Category ring ===
    pub ring_radius: f32,
    pub idle_spin: f32,
    pub focus_damping: f32,
    /// Spin of each category node about its own axis (rad/s)
    pub node_spin: f32,

    // === Text reveal (ms per character) ===
    pub thanks_reveal_ms: f64,
    pub name_reveal_ms: f64,

    // === Camera ===
    pub mobile_breakpoint: f32,
    /// Fraction of the viewport a text panel shifts the view by
    pub view_shift: f32,
    pub offset_rate: f32,
    pub locked_rate: f32,
    pub transition_decay: f32,
    pub approach_rate: f32,
    pub start_distance: f32,
    pub locked_distance: f32,
    pub focus_distance: f32,
    pub focus_distance_mobile: f32,
    pub overview_distance: f32,
    pub overview_distance_mobile: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            silence_ms: SILENCE_MS,
            alert_ms: ALERT_MS,
            victory_ms: VICTORY_MS,
            victory_intro_step: IntroStep::Bio,

            victory_hits: VICTORY_HITS,
            asteroid_count: ASTEROID_COUNT,
            spawn_min_radius: SPAWN_MIN_RADIUS,
            spawn_max_radius: SPAWN_MAX_RADIUS,
            approach_speed: APPROACH_SPEED,
            recycle_radius: RECYCLE_RADIUS,
            recycle_min_radius: RECYCLE_MIN_RADIUS,
            recycle_max_radius: RECYCLE_MAX_RADIUS,

            explosion_lifetime_ms: EXPLOSION_LIFETIME_MS,
            particle_count: PARTICLE_COUNT,
            particle_min_speed: PARTICLE_MIN_SPEED,
            particle_max_speed: PARTICLE_MAX_SPEED,
            particle_shrink: PARTICLE_SHRINK,

            ring_radius: RING_RADIUS,
            idle_spin: IDLE_SPIN,
            focus_damping: FOCUS_DAMPING,
            node_spin: NODE_SPIN,

            thanks_reveal_ms: THANKS_REVEAL_MS,
            name_reveal_ms: NAME_REVEAL_MS,

            mobile_breakpoint: MOBILE_BREAKPOINT,
            view_shift: VIEW_SHIFT,
            offset_rate: OFFSET_RATE,
            locked_rate: LOCKED_RATE,
            transition_decay: TRANSITION_DECAY,
            approach_rate: APPROACH_RATE,
            start_distance: START_DISTANCE,
            locked_distance: LOCKED_DISTANCE,
            focus_distance: FOCUS_DISTANCE,
            focus_distance_mobile: FOCUS_DISTANCE_MOBILE,
            overview_distance: OVERVIEW_DISTANCE,
            overview_distance_mobile: OVERVIEW_DISTANCE_MOBILE,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or break the session
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("silence_ms", self.silence_ms),
            ("alert_ms", self.alert_ms),
            ("victory_ms", self.victory_ms),
            ("explosion_lifetime_ms", self.explosion_lifetime_ms),
            ("thanks_reveal_ms", self.thanks_reveal_ms),
            ("name_reveal_ms", self.name_reveal_ms),
        ];
        for (name, value) in durations {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidTuning(format!("{name} must be positive")));
            }
        }
        if self.victory_hits == 0 {
            return Err(ConfigError::InvalidTuning("victory_hits must be at least 1".into()));
        }
        if self.asteroid_count == 0 {
            return Err(ConfigError::InvalidTuning("asteroid_count must be at least 1".into()));
        }
        // Destroyed asteroids stay gone for the rest of the round
        if self.victory_hits as usize > self.asteroid_count {
            return Err(ConfigError::InvalidTuning(format!(
                "victory_hits ({}) exceeds asteroid_count ({})",
                self.victory_hits, self.asteroid_count
            )));
        }
        let rates = [
            ("offset_rate", self.offset_rate),
            ("locked_rate", self.locked_rate),
            ("transition_decay", self.transition_decay),
            ("approach_rate", self.approach_rate),
        ];
        for (name, value) in rates {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidTuning(format!("{name} must be positive")));
            }
        }
        if self.spawn_min_radius > self.spawn_max_radius
            || self.recycle_min_radius > self.recycle_max_radius
            || self.particle_min_speed > self.particle_max_speed
        {
            return Err(ConfigError::InvalidTuning("range minimum exceeds maximum".into()));
        }
        if self.recycle_min_radius <= self.recycle_radius {
            return Err(ConfigError::InvalidTuning(
                "recycled asteroids must land outside the recycle radius".into(),
            ));
        }
        Ok(())
    }
}
