//! Session snapshot handed to the renderer after every intent.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::combat::{CombatEncounter, CombatOutcome, Turn};
use crate::config::{GameConfig, PacingConfig};
use crate::enemy::Enemy;
use crate::events::DecisionEncounter;
use crate::hallway::{Direction, Junction};
use crate::inventory::Inventory;
use crate::journal::NarrativeLog;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Start,
    Hallway,
    Combat,
    Decision,
    GameOver,
    Victory,
}

impl GamePhase {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Hallway => "hallway",
            Self::Combat => "combat",
            Self::Decision => "decision",
            Self::GameOver => "game_over",
            Self::Victory => "victory",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A committed action whose delayed half has not run yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PendingStep {
    ArriveAtJunction { direction: Direction },
    EnemyTurn { after_item: bool },
    ConcludeCombat { outcome: CombatOutcome },
    ConcludeDecision,
}

impl PendingStep {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ArriveAtJunction { .. } => "arrive_at_junction",
            Self::EnemyTurn { .. } => "enemy_turn",
            Self::ConcludeCombat { .. } => "conclude_combat",
            Self::ConcludeDecision => "conclude_decision",
        }
    }

    /// How long the renderer should wait before advancing.
    #[must_use]
    pub const fn delay(self, pacing: &PacingConfig) -> Duration {
        let ms = match self {
            Self::ArriveAtJunction { .. } => pacing.direction_ms,
            Self::EnemyTurn { after_item: true } => pacing.item_use_ms,
            Self::EnemyTurn { after_item: false } => pacing.enemy_turn_ms,
            Self::ConcludeCombat { .. } => pacing.combat_conclusion_ms,
            Self::ConcludeDecision => pacing.decision_ms,
        };
        Duration::from_millis(ms)
    }
}

impl fmt::Display for PendingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One rolling log per screen context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogs {
    pub exploration: NarrativeLog,
    pub combat: NarrativeLog,
    pub decision: NarrativeLog,
}

impl GameLogs {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            exploration: NarrativeLog::with_capacity(capacity),
            combat: NarrativeLog::with_capacity(capacity),
            decision: NarrativeLog::with_capacity(capacity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub player: Player,
    pub inventory: Inventory,
    pub event_count: u32,
    pub boss_spawned: bool,
    pub junction: Junction,
    #[serde(default)]
    pub selected_direction: Option<Direction>,
    #[serde(default)]
    pub combat: Option<CombatEncounter>,
    #[serde(default)]
    pub decision: Option<DecisionEncounter>,
    #[serde(default)]
    pub pending: Option<PendingStep>,
    #[serde(default)]
    pub inventory_open: bool,
    /// Threshold rolls taken this game.
    #[serde(default)]
    pub madness_transitions: u32,
    pub logs: GameLogs,
}

impl GameState {
    /// Pre-game state: fresh player, starter kit, nothing drawn yet.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: GamePhase::Start,
            player: config.player.fresh_player(),
            inventory: Inventory::starter_kit(),
            event_count: 0,
            boss_spawned: false,
            junction: Junction::default(),
            selected_direction: None,
            combat: None,
            decision: None,
            pending: None,
            inventory_open: false,
            madness_transitions: 0,
            logs: GameLogs::with_capacity(config.log_capacity),
        }
    }

    #[must_use]
    pub fn enemy(&self) -> Option<&Enemy> {
        self.combat.as_ref().map(|combat| &combat.enemy)
    }

    /// Player may act in combat right now.
    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.phase == GamePhase::Combat
            && self.pending.is_none()
            && self
                .combat
                .as_ref()
                .is_some_and(|combat| combat.turn == Turn::Player && combat.outcome.is_none())
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
