//! Items, the ordered inventory and consumable effects.
use serde::{Deserialize, Serialize};

use crate::constants::{ENLIGHTENED_RESTORE_FACTOR, STARTER_MANA_EFFECT, STARTER_POTION_EFFECT};
use crate::madness::apply_madness_delta;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Potion,
    Mana,
    /// Narrative flag. Unknown kinds deserialize here so they stay inert.
    #[serde(other)]
    Key,
}

impl ItemKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Potion => "potion",
            Self::Mana => "mana",
            Self::Key => "key",
        }
    }

    #[must_use]
    pub const fn is_consumable(self) -> bool {
        !matches!(self, Self::Key)
    }
}

/// Inventory entry. `kind` and `effect` drive mechanics; `name` is cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub effect: i32,
}

impl Item {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind, effect: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            effect,
        }
    }

    #[must_use]
    pub fn key_item(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, ItemKind::Key, 0)
    }

    /// Mana-typed items with a negative effect reduce madness instead.
    #[must_use]
    pub const fn reduces_madness(&self) -> bool {
        matches!(self.kind, ItemKind::Mana) && self.effect < 0
    }
}

/// Outcome of drinking a consumable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUse {
    pub player: Player,
    pub message: String,
}

/// Apply a consumable to the player. Returns `None` for key items.
///
/// Enlightened players get double healing and mana. The madness-reducing
/// variant goes through the madness multiplier like every madness delta.
#[must_use]
pub fn apply_item(player: &Player, item: &Item) -> Option<ItemUse> {
    let factor = if player.is_enlightened() {
        ENLIGHTENED_RESTORE_FACTOR
    } else {
        1
    };
    let mut next = player.clone();
    let message = match item.kind {
        ItemKind::Key => return None,
        ItemKind::Mana if item.effect < 0 => {
            next = apply_madness_delta(player, item.effect);
            format!("You used {} - your madness recedes", item.name)
        }
        ItemKind::Potion | ItemKind::Mana => {
            let amount = item.effect.max(0).saturating_mul(factor);
            if matches!(item.kind, ItemKind::Potion) {
                next.hp = next.hp.saturating_add(amount);
            } else {
                next.mp = next.mp.saturating_add(amount);
            }
            if factor > 1 {
                format!("You used {} (DOUBLE EFFECT FROM ENLIGHTENMENT!)", item.name)
            } else {
                format!("You used {}", item.name)
            }
        }
    };
    Some(ItemUse {
        player: next.clamped(),
        message,
    })
}

/// Ordered item list; insertion order is pickup order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Two health potions and one mana potion.
    #[must_use]
    pub fn starter_kit() -> Self {
        Self {
            items: vec![
                Item::new("1", "Health Potion", ItemKind::Potion, STARTER_POTION_EFFECT),
                Item::new("2", "Health Potion", ItemKind::Potion, STARTER_POTION_EFFECT),
                Item::new("3", "Mana Potion", ItemKind::Mana, STARTER_MANA_EFFECT),
            ],
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Remove the first entry with a matching id.
    pub fn remove_first(&mut self, id: &str) -> Option<Item> {
        let idx = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn consumables(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.kind.is_consumable())
    }
}

impl FromIterator<Item> for Inventory {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
