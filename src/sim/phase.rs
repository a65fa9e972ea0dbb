//! Narrative phases and intro sub-steps

use serde::{Deserialize, Serialize};

/// Top-level narrative/game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Idle planet, waiting for the visitor to agree it is beautiful
    Beauty,
    /// Silence before the threat appears
    TransitionOut,
    /// Warning banner, camera locked
    ThreatAlert,
    /// Asteroid mini-game
    Defense,
    /// Round won, thank-you message
    Victory,
    /// Narrative intro (thanks, then bio)
    Intro,
    /// Free exploration of the category ring
    Explore,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Beauty => "beauty",
            Phase::TransitionOut => "transition_out",
            Phase::ThreatAlert => "threat_alert",
            Phase::Defense => "defense",
            Phase::Victory => "victory",
            Phase::Intro => "intro",
            Phase::Explore => "explore",
        }
    }

    /// Camera is held by the experience, user orbit/zoom disabled
    pub fn is_locked(&self) -> bool {
        matches!(self, Phase::ThreatAlert | Phase::Defense)
    }

    /// Fire input is only listened for during defense
    pub fn captures_input(&self) -> bool {
        *self == Phase::Defense
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-state of [`Phase::Intro`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroStep {
    #[default]
    Thanks,
    Bio,
}
