//! Player resources and the madness regime they live under.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    MULTIPLIER_ENLIGHTENED, MULTIPLIER_MAD, MULTIPLIER_NORMAL, PLAYER_MAX_HP, PLAYER_MAX_MADNESS,
    PLAYER_MAX_MP,
};

/// Which side of the madness threshold the player last landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MadnessState {
    #[default]
    Normal,
    Enlightened,
    Mad,
}

impl MadnessState {
    /// Factor applied to every madness delta while in this state.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Normal => MULTIPLIER_NORMAL,
            Self::Enlightened => MULTIPLIER_ENLIGHTENED,
            Self::Mad => MULTIPLIER_MAD,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Enlightened => "enlightened",
            Self::Mad => "mad",
        }
    }
}

impl fmt::Display for MadnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Player vitals. Every resolver returns a clamped copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub madness: i32,
    pub max_madness: i32,
    #[serde(default)]
    pub madness_state: MadnessState,
}

impl Default for Player {
    fn default() -> Self {
        Self::with_maxima(PLAYER_MAX_HP, PLAYER_MAX_MP, PLAYER_MAX_MADNESS)
    }
}

impl Player {
    /// Fresh player at full health and mana with no madness.
    #[must_use]
    pub const fn with_maxima(max_hp: i32, max_mp: i32, max_madness: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            madness: 0,
            max_madness,
            madness_state: MadnessState::Normal,
        }
    }

    /// Current madness multiplier, derived from [`MadnessState`].
    #[must_use]
    pub const fn madness_multiplier(&self) -> f64 {
        self.madness_state.multiplier()
    }

    #[must_use]
    pub const fn is_enlightened(&self) -> bool {
        matches!(self.madness_state, MadnessState::Enlightened)
    }

    #[must_use]
    pub const fn is_mad(&self) -> bool {
        matches!(self.madness_state, MadnessState::Mad)
    }

    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    #[must_use]
    pub const fn madness_at_cap(&self) -> bool {
        self.madness >= self.max_madness
    }

    pub fn clamp(&mut self) {
        self.hp = self.hp.clamp(0, self.max_hp.max(0));
        self.mp = self.mp.clamp(0, self.max_mp.max(0));
        self.madness = self.madness.clamp(0, self.max_madness.max(0));
    }

    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.clamp();
        self
    }

    /// True when all three resources sit inside their ranges.
    #[must_use]
    pub const fn within_bounds(&self) -> bool {
        self.hp >= 0
            && self.hp <= self.max_hp
            && self.mp >= 0
            && self.mp <= self.max_mp
            && self.madness >= 0
            && self.madness <= self.max_madness
    }
}
