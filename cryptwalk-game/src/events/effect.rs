//! Decision effects as data.
//!
//! An [`EffectSpec`] is a small tree: leaves are [`Outcome`] deltas, inner
//! nodes branch on a roll or on a [`Condition`] over the pre-resolution
//! player and inventory. [`EffectSpec::evaluate`] walks the tree without
//! touching its inputs and returns the proposed successor.

use serde::{Deserialize, Serialize};

use crate::inventory::{Inventory, Item};
use crate::player::Player;
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Hp,
    Mp,
    Madness,
}

impl Stat {
    #[must_use]
    pub const fn read(self, player: &Player) -> i32 {
        match self {
            Self::Hp => player.hp,
            Self::Mp => player.mp,
            Self::Madness => player.madness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    HasItem { item: String },
    AtLeast { stat: Stat, value: i32 },
    Above { stat: Stat, value: i32 },
}

impl Condition {
    #[must_use]
    pub fn holds(&self, player: &Player, inventory: &Inventory) -> bool {
        match self {
            Self::HasItem { item } => inventory.contains(item),
            Self::AtLeast { stat, value } => stat.read(player) >= *value,
            Self::Above { stat, value } => stat.read(player) > *value,
        }
    }
}

/// Leaf of an effect tree: stat deltas plus optional inventory changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Outcome {
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub mp: i32,
    #[serde(default)]
    pub madness: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_item: Option<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_item: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSpec {
    Apply(Outcome),
    Chance {
        probability: f64,
        then: Box<EffectSpec>,
        otherwise: Box<EffectSpec>,
    },
    When {
        condition: Condition,
        then: Box<EffectSpec>,
        otherwise: Box<EffectSpec>,
    },
}

/// Raw result of an effect before madness scaling and enlightenment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectProposal {
    pub player: Player,
    pub message: String,
    pub item_to_add: Option<Item>,
    pub item_to_remove: Option<String>,
}

impl EffectSpec {
    /// Shorthand for a leaf that only prints a message.
    #[must_use]
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::Apply(Outcome {
            message: message.into(),
            ..Outcome::default()
        })
    }

    /// Evaluate the tree. Each `chance` node on the taken path draws one roll.
    pub fn evaluate<R>(&self, player: &Player, inventory: &Inventory, rng: &mut R) -> EffectProposal
    where
        R: RandomSource + ?Sized,
    {
        let mut node = self;
        loop {
            match node {
                Self::Apply(outcome) => return outcome.propose(player),
                Self::Chance {
                    probability,
                    then,
                    otherwise,
                } => {
                    node = if rng.chance(*probability) {
                        then.as_ref()
                    } else {
                        otherwise.as_ref()
                    };
                }
                Self::When {
                    condition,
                    then,
                    otherwise,
                } => {
                    node = if condition.holds(player, inventory) {
                        then.as_ref()
                    } else {
                        otherwise.as_ref()
                    };
                }
            }
        }
    }

    /// Items this effect could ever hand out.
    #[must_use]
    pub fn granted_items(&self) -> Vec<&Item> {
        match self {
            Self::Apply(outcome) => outcome.add_item.iter().collect(),
            Self::Chance { then, otherwise, .. } | Self::When { then, otherwise, .. } => {
                let mut items = then.granted_items();
                items.extend(otherwise.granted_items());
                items
            }
        }
    }

    /// Item ids this effect checks for possession.
    #[must_use]
    pub fn required_items(&self) -> Vec<&str> {
        match self {
            Self::Apply(_) => Vec::new(),
            Self::Chance { then, otherwise, .. } => {
                let mut ids = then.required_items();
                ids.extend(otherwise.required_items());
                ids
            }
            Self::When {
                condition,
                then,
                otherwise,
            } => {
                let mut ids = match condition {
                    Condition::HasItem { item } => vec![item.as_str()],
                    Condition::AtLeast { .. } | Condition::Above { .. } => Vec::new(),
                };
                ids.extend(then.required_items());
                ids.extend(otherwise.required_items());
                ids
            }
        }
    }
}

impl Outcome {
    fn propose(&self, player: &Player) -> EffectProposal {
        let mut next = player.clone();
        next.hp = next.hp.saturating_add(self.hp);
        next.mp = next.mp.saturating_add(self.mp);
        next.madness = next.madness.saturating_add(self.madness);
        EffectProposal {
            player: next.clamped(),
            message: self.message.clone(),
            item_to_add: self.add_item.clone(),
            item_to_remove: self.remove_item.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ItemKind;
    use crate::rng::ScriptedRolls;

    fn gated() -> EffectSpec {
        EffectSpec::When {
            condition: Condition::HasItem {
                item: "ancient_key".into(),
            },
            then: Box::new(EffectSpec::Apply(Outcome {
                hp: 30,
                message: "open".into(),
                remove_item: Some("ancient_key".into()),
                ..Outcome::default()
            })),
            otherwise: Box::new(EffectSpec::Apply(Outcome {
                madness: 15,
                message: "locked".into(),
                ..Outcome::default()
            })),
        }
    }

    #[test]
    fn apply_clamps_each_stat() {
        let spec = EffectSpec::Apply(Outcome {
            hp: 50,
            madness: -40,
            message: "x".into(),
            ..Outcome::default()
        });
        let player = Player {
            hp: 80,
            madness: 10,
            ..Player::default()
        };
        let mut rng = ScriptedRolls::default();
        let proposal = spec.evaluate(&player, &Inventory::new(), &mut rng);
        assert_eq!(proposal.player.hp, 100);
        assert_eq!(proposal.player.madness, 0);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn conditions_branch_on_inventory() {
        let mut rng = ScriptedRolls::default();
        let player = Player::default();
        let locked = gated().evaluate(&player, &Inventory::new(), &mut rng);
        assert_eq!(locked.message, "locked");
        assert_eq!(locked.player.madness, 15);

        let keyed: Inventory = [Item::key_item("ancient_key", "Ancient Key")]
            .into_iter()
            .collect();
        let open = gated().evaluate(
            &Player {
                hp: 50,
                ..Player::default()
            },
            &keyed,
            &mut rng,
        );
        assert_eq!(open.player.hp, 80);
        assert_eq!(open.item_to_remove.as_deref(), Some("ancient_key"));
    }

    #[test]
    fn chance_draws_one_roll() {
        let spec = EffectSpec::Chance {
            probability: 0.5,
            then: Box::new(EffectSpec::message_only("heads")),
            otherwise: Box::new(EffectSpec::message_only("tails")),
        };
        let mut rng = ScriptedRolls::new(vec![0.49, 0.5]);
        let player = Player::default();
        let inv = Inventory::new();
        assert_eq!(spec.evaluate(&player, &inv, &mut rng).message, "heads");
        assert_eq!(spec.evaluate(&player, &inv, &mut rng).message, "tails");
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn stat_thresholds() {
        let player = Player {
            hp: 40,
            madness: 30,
            ..Player::default()
        };
        let inv = Inventory::new();
        assert!(!Condition::Above { stat: Stat::Hp, value: 40 }.holds(&player, &inv));
        assert!(Condition::AtLeast { stat: Stat::Madness, value: 30 }.holds(&player, &inv));
    }

    #[test]
    fn specs_parse_from_tagged_json() {
        let json = r#"{
            "kind": "when",
            "condition": { "kind": "at_least", "stat": "madness", "value": 30 },
            "then": {
                "kind": "apply",
                "madness": -30,
                "message": "sold",
                "add_item": { "id": "renewal_elixir", "name": "Renewal Elixir", "type": "potion", "effect": 50 }
            },
            "otherwise": { "kind": "apply", "message": "no sale" }
        }"#;
        let spec: EffectSpec = serde_json::from_str(json).unwrap();
        let granted = spec.granted_items();
        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].kind, ItemKind::Potion);
        assert!(spec.required_items().is_empty());
    }
}
