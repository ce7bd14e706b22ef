//! Decision events: the effect model, the bundled catalog and the resolver.

pub mod catalog;
pub mod effect;
pub mod resolver;

pub use catalog::{DecisionCatalog, DecisionEvent, EventCategory};
pub use effect::{Condition, EffectProposal, EffectSpec, Outcome, Stat};
pub use resolver::{Choice, DecisionEncounter, DecisionError, DecisionResolution, resolve_decision};
