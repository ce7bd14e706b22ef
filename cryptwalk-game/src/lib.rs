//! Cryptwalk Game Engine
//!
//! Platform-agnostic core logic for the Cryptwalk dungeon crawler: the
//! hallway state machine, combat resolution, the madness mechanic and the
//! decision-event effect model. Renderers consume [`GameState`] snapshots
//! and feed intents back into a [`GameSession`].

pub mod combat;
pub mod config;
pub mod constants;
pub mod enemy;
pub mod events;
pub mod hallway;
pub mod inventory;
pub mod journal;
pub mod madness;
pub mod numbers;
pub mod player;
pub mod rng;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use combat::{
    ActionReport, CombatEncounter, CombatError, CombatOutcome, PlayerAction, Turn, TurnResolution,
};
pub use config::{ConfigError, GameConfig, PacingConfig, PlayerConfig, ProgressionConfig};
pub use enemy::{Enemy, EnemyKind};
pub use events::{
    Choice, Condition, DecisionCatalog, DecisionEncounter, DecisionError, DecisionEvent,
    DecisionResolution, EffectSpec, EventCategory, Outcome, Stat, resolve_decision,
};
pub use hallway::{Direction, EventArchetype, Junction};
pub use inventory::{Inventory, Item, ItemKind, ItemUse, apply_item};
pub use journal::NarrativeLog;
pub use madness::{
    MadnessTransition, apply_madness_delta, check_madness_threshold, hallway_omen,
};
pub use player::{MadnessState, Player};
pub use rng::{GameRng, RandomSource, ScriptedRolls};
pub use session::{GameSession, Intent, IntentRejection, IntentResult};
pub use state::{GameLogs, GamePhase, GameState, PendingStep};
