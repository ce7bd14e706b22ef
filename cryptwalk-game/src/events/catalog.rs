use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::effect::EffectSpec;
use crate::inventory::Inventory;

const DEFAULT_EVENT_DATA: &str = include_str!("../../assets/data/events.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Mystic,
    Object,
    Ambient,
    Shop,
}

impl EventCategory {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Mystic => "mystic",
            Self::Object => "object",
            Self::Ambient => "ambient",
            Self::Shop => "shop",
        }
    }
}

/// Static binary-choice encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub id: u32,
    pub category: EventCategory,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_item: Option<String>,
    pub yes_text: String,
    pub no_text: String,
    pub yes: EffectSpec,
    pub no: EffectSpec,
}

impl DecisionEvent {
    /// Whether the gating item (if any) is in the inventory.
    #[must_use]
    pub fn has_required_item(&self, inventory: &Inventory) -> bool {
        self.required_item
            .as_deref()
            .is_none_or(|id| inventory.contains(id))
    }

    /// Description to show. Gating here is cosmetic; effects re-check.
    #[must_use]
    pub fn shown_description(&self, inventory: &Inventory) -> &str {
        match &self.alternative_description {
            Some(alt) if !self.has_required_item(inventory) => alt,
            _ => &self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DecisionCatalog {
    #[serde(default)]
    pub events: Vec<DecisionEvent>,
}

impl DecisionCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        match serde_json::from_str(DEFAULT_EVENT_DATA) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::error!("bundled event catalog failed to parse: {err}");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<DecisionCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into an event catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&DecisionEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Event ids in a category, in catalog order.
    #[must_use]
    pub fn pool(&self, category: EventCategory) -> Vec<u32> {
        self.events
            .iter()
            .filter(|event| event.category == category)
            .map(|event| event.id)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
