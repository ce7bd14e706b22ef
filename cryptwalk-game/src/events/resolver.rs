//! Decision resolution: gate checks, effect evaluation, and the resolved
//! successor player that the session applies on conclusion.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::DecisionEvent;
use crate::constants::ENLIGHTENED_RESTORE_FACTOR;
use crate::inventory::{Inventory, Item};
use crate::madness::{MadnessTransition, check_madness_threshold, scaled_delta};
use crate::player::Player;
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("decision {event_id} was already resolved")]
    AlreadyResolved { event_id: u32 },
}

/// Final outcome of a decision, after madness scaling and enlightenment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResolution {
    pub event_id: u32,
    pub choice: Choice,
    pub player: Player,
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_to_add: Option<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_to_remove: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<MadnessTransition>,
}

/// Run one side of a decision against the pre-resolution state.
///
/// The effect's raw madness delta is rescaled by the pre-effect multiplier
/// and re-applied on top of the original madness. Enlightened players get
/// positive hp and mp deltas doubled. The threshold check runs last.
pub fn resolve_decision<R>(
    event: &DecisionEvent,
    choice: Choice,
    player: &Player,
    inventory: &Inventory,
    rng: &mut R,
) -> DecisionResolution
where
    R: RandomSource + ?Sized,
{
    let effect = match choice {
        Choice::Yes => &event.yes,
        Choice::No => &event.no,
    };
    let proposal = effect.evaluate(player, inventory, rng);
    let mut next = proposal.player;

    let raw_madness = next.madness - player.madness;
    if raw_madness != 0 {
        next.madness = (player.madness + scaled_delta(player, raw_madness)).clamp(0, next.max_madness);
    }

    if player.is_enlightened() {
        let hp_delta = next.hp - player.hp;
        if hp_delta > 0 {
            next.hp = (player.hp + hp_delta * ENLIGHTENED_RESTORE_FACTOR).min(next.max_hp);
        }
        let mp_delta = next.mp - player.mp;
        if mp_delta > 0 {
            next.mp = (player.mp + mp_delta * ENLIGHTENED_RESTORE_FACTOR).min(next.max_mp);
        }
    }

    let mut messages = vec![proposal.message];
    let (next, transition) = check_madness_threshold(next.clamped(), rng);
    if let Some(transition) = &transition {
        messages.push(transition.message().to_string());
    }
    log::debug!(
        "decision {} resolved {}: hp {} -> {}, madness {} -> {}",
        event.id,
        choice.key(),
        player.hp,
        next.hp,
        player.madness,
        next.madness
    );

    DecisionResolution {
        event_id: event.id,
        choice,
        player: next,
        messages,
        item_to_add: proposal.item_to_add,
        item_to_remove: proposal.item_to_remove,
        transition,
    }
}

/// A decision on screen. Resolves at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEncounter {
    pub event: DecisionEvent,
    /// Description picked when the encounter opened.
    pub description: String,
    #[serde(default)]
    pub resolution: Option<DecisionResolution>,
}

impl DecisionEncounter {
    #[must_use]
    pub fn open(event: &DecisionEvent, inventory: &Inventory) -> Self {
        Self {
            description: event.shown_description(inventory).to_string(),
            event: event.clone(),
            resolution: None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Resolve the encounter.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::AlreadyResolved`] on every call after the first.
    pub fn resolve<R>(
        &mut self,
        choice: Choice,
        player: &Player,
        inventory: &Inventory,
        rng: &mut R,
    ) -> Result<&DecisionResolution, DecisionError>
    where
        R: RandomSource + ?Sized,
    {
        if self.resolution.is_some() {
            return Err(DecisionError::AlreadyResolved {
                event_id: self.event.id,
            });
        }
        let resolution = resolve_decision(&self.event, choice, player, inventory, rng);
        Ok(&*self.resolution.insert(resolution))
    }
}
