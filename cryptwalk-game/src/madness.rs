//! Madness engine: delta scaling, the threshold roll, and hallway omens.
use serde::{Deserialize, Serialize};

use crate::constants::{ENLIGHTENMENT_CHANCE, MADNESS_CRITICAL_LEVEL, MADNESS_WARNING_LEVEL};
use crate::numbers::scale_floor;
use crate::player::{MadnessState, Player};
use crate::rng::RandomSource;

pub const MSG_TRANSCENDED: &str =
    "Your madness reaches its limit and TRANSCENDS! You are ENLIGHTENED!";
pub const MSG_SHATTERED: &str = "Your sanity shatters! You have gone completely mad!";

pub const OMEN_ENLIGHTENED: &str = "You are ENLIGHTENED! Your power has doubled...";
pub const OMEN_MAD: &str = "You have gone MAD! Your mind is fragmented...";
pub const OMEN_CRITICAL: &str = "CRITICAL ALERT! Your sanity is at its limit...";
pub const OMEN_RISING: &str = "Your madness grows dangerously...";

/// A state change produced by the threshold roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MadnessTransition {
    pub from: MadnessState,
    pub to: MadnessState,
    pub roll: f64,
}

impl MadnessTransition {
    /// Narrative line for the active screen log.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self.to {
            MadnessState::Enlightened => MSG_TRANSCENDED,
            MadnessState::Mad | MadnessState::Normal => MSG_SHATTERED,
        }
    }
}

/// Scale a raw madness delta by the player's current multiplier.
#[must_use]
pub fn scaled_delta(player: &Player, raw_delta: i32) -> i32 {
    if raw_delta == 0 {
        return 0;
    }
    scale_floor(raw_delta, player.madness_multiplier())
}

/// Apply a raw madness delta through the multiplier, clamped to the cap.
#[must_use]
pub fn apply_madness_delta(player: &Player, raw_delta: i32) -> Player {
    let mut next = player.clone();
    next.madness = (player.madness + scaled_delta(player, raw_delta)).clamp(0, player.max_madness);
    next
}

/// Roll for a new madness state once madness reaches the cap.
///
/// Below the cap this is the identity and draws nothing. At the cap one
/// roll decides: under the enlightenment chance the player transcends,
/// otherwise they go mad. Madness resets to 0 either way.
pub fn check_madness_threshold<R>(player: Player, rng: &mut R) -> (Player, Option<MadnessTransition>)
where
    R: RandomSource + ?Sized,
{
    if !player.madness_at_cap() {
        return (player, None);
    }
    let roll = rng.next_f64();
    let to = if roll < ENLIGHTENMENT_CHANCE {
        MadnessState::Enlightened
    } else {
        MadnessState::Mad
    };
    let transition = MadnessTransition {
        from: player.madness_state,
        to,
        roll,
    };
    log::info!(
        "madness threshold crossed: {} -> {} (roll {roll:.3})",
        transition.from,
        transition.to
    );
    let next = Player {
        madness: 0,
        madness_state: to,
        ..player
    };
    (next, Some(transition))
}

/// Status line surfaced when the player returns to the hallway.
#[must_use]
pub const fn hallway_omen(player: &Player) -> Option<&'static str> {
    match player.madness_state {
        MadnessState::Enlightened => Some(OMEN_ENLIGHTENED),
        MadnessState::Mad => Some(OMEN_MAD),
        MadnessState::Normal if player.madness >= MADNESS_CRITICAL_LEVEL => Some(OMEN_CRITICAL),
        MadnessState::Normal if player.madness >= MADNESS_WARNING_LEVEL => Some(OMEN_RISING),
        MadnessState::Normal => None,
    }
}
