use std::fmt;

use cryptwalk_game::{
    Choice, DecisionEncounter, Direction, EffectSpec, EventArchetype, GameState, Inventory,
    ItemKind, Player, PlayerAction,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// What a policy wants to do on its combat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatMove {
    Act(PlayerAction),
    UseItem(String),
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick a branch at the current junction.
    fn pick_direction(&mut self, state: &GameState) -> Direction;

    /// Pick an action for the player's combat turn.
    fn pick_combat_move(&mut self, state: &GameState) -> CombatMove;

    /// Answer an open decision.
    fn pick_choice(&mut self, state: &GameState, decision: &DecisionEncounter) -> Choice;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Cautious,
    Reckless,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 3] = [Self::Cautious, Self::Reckless, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Reckless => "Reckless",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Reckless => "reckless",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(key))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Reckless => Box::new(RecklessPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct CautiousPolicy;
struct RecklessPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

const CAUTIOUS_HEAL_BELOW: i32 = 40;

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_direction(&mut self, state: &GameState) -> Direction {
        let junction = state.junction;
        if direction_risk(junction.left) <= direction_risk(junction.right) {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    fn pick_combat_move(&mut self, state: &GameState) -> CombatMove {
        let player = &state.player;
        if player.hp < CAUTIOUS_HEAL_BELOW
            && let Some(id) = first_item_of(&state.inventory, ItemKind::Potion)
        {
            return CombatMove::UseItem(id);
        }
        if player.mp < PlayerAction::Spell.mana_cost()
            && let Some(id) = first_item_of(&state.inventory, ItemKind::Mana)
        {
            return CombatMove::UseItem(id);
        }
        if player.mp >= PlayerAction::Spell.mana_cost() {
            CombatMove::Act(PlayerAction::Spell)
        } else {
            CombatMove::Act(PlayerAction::Strike)
        }
    }

    fn pick_choice(&mut self, state: &GameState, decision: &DecisionEncounter) -> Choice {
        let yes = worst_case(&decision.event.yes, &state.player, &state.inventory);
        let no = worst_case(&decision.event.no, &state.player, &state.inventory);
        if yes > no { Choice::Yes } else { Choice::No }
    }
}

impl PlayerPolicy for RecklessPolicy {
    fn name(&self) -> &'static str {
        "Reckless"
    }

    fn pick_direction(&mut self, state: &GameState) -> Direction {
        if state.junction.right == EventArchetype::Combat {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    fn pick_combat_move(&mut self, state: &GameState) -> CombatMove {
        if state.player.mp >= PlayerAction::Spell.mana_cost() {
            CombatMove::Act(PlayerAction::Spell)
        } else {
            CombatMove::Act(PlayerAction::Strike)
        }
    }

    fn pick_choice(&mut self, state: &GameState, decision: &DecisionEncounter) -> Choice {
        let yes = best_case(&decision.event.yes, &state.player, &state.inventory);
        let no = best_case(&decision.event.no, &state.player, &state.inventory);
        if yes >= no { Choice::Yes } else { Choice::No }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_direction(&mut self, _state: &GameState) -> Direction {
        if self.rng.gen_bool(0.5) {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    fn pick_combat_move(&mut self, state: &GameState) -> CombatMove {
        let consumables: Vec<&str> = state
            .inventory
            .consumables()
            .map(|item| item.id.as_str())
            .collect();
        let pick = self.rng.gen_range(0..4);
        if pick == 0
            && let Some(id) = consumables.choose(&mut self.rng)
        {
            return CombatMove::UseItem((*id).to_string());
        }
        match pick {
            1 | 2 if state.player.mp >= PlayerAction::Spell.mana_cost() => {
                CombatMove::Act(PlayerAction::Spell)
            }
            _ => CombatMove::Act(PlayerAction::Strike),
        }
    }

    fn pick_choice(&mut self, _state: &GameState, _decision: &DecisionEncounter) -> Choice {
        if self.rng.gen_bool(0.5) {
            Choice::Yes
        } else {
            Choice::No
        }
    }
}

fn first_item_of(inventory: &Inventory, kind: ItemKind) -> Option<String> {
    inventory
        .items()
        .iter()
        .find(|item| item.kind == kind && item.effect > 0)
        .map(|item| item.id.clone())
}

const fn direction_risk(archetype: EventArchetype) -> i32 {
    match archetype {
        EventArchetype::Ambient => 0,
        EventArchetype::Treasure => 1,
        EventArchetype::Object => 2,
        EventArchetype::Mystic => 3,
        EventArchetype::Combat => 4,
    }
}

fn outcome_score(hp: i32, mp: i32, madness: i32) -> i32 {
    hp * 3 + mp - madness * 2
}

/// Score of the least favourable leaf reachable from here.
fn worst_case(spec: &EffectSpec, player: &Player, inventory: &Inventory) -> i32 {
    match spec {
        EffectSpec::Apply(outcome) => outcome_score(outcome.hp, outcome.mp, outcome.madness),
        EffectSpec::Chance { then, otherwise, .. } => {
            worst_case(then, player, inventory).min(worst_case(otherwise, player, inventory))
        }
        EffectSpec::When {
            condition,
            then,
            otherwise,
        } => {
            if condition.holds(player, inventory) {
                worst_case(then, player, inventory)
            } else {
                worst_case(otherwise, player, inventory)
            }
        }
    }
}

/// Score of the most favourable leaf reachable from here.
fn best_case(spec: &EffectSpec, player: &Player, inventory: &Inventory) -> i32 {
    match spec {
        EffectSpec::Apply(outcome) => {
            let bonus = if outcome.add_item.is_some() { 25 } else { 0 };
            outcome_score(outcome.hp, outcome.mp, outcome.madness) + bonus
        }
        EffectSpec::Chance { then, otherwise, .. } => {
            best_case(then, player, inventory).max(best_case(otherwise, player, inventory))
        }
        EffectSpec::When {
            condition,
            then,
            otherwise,
        } => {
            if condition.holds(player, inventory) {
                best_case(then, player, inventory)
            } else {
                best_case(otherwise, player, inventory)
            }
        }
    }
}
