//! Session-level configuration: starting maxima, boss gating and pacing.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{PLAYER_MAX_HP, PLAYER_MAX_MADNESS, PLAYER_MAX_MP};
use crate::player::Player;

/// Errors raised when configuration fails to parse or violates its bounds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("{field} must be between 0 and 1 (got {value:.3})")]
    Probability { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "PlayerConfig::default_max_hp")]
    pub max_hp: i32,
    #[serde(default = "PlayerConfig::default_max_mp")]
    pub max_mp: i32,
    #[serde(default = "PlayerConfig::default_max_madness")]
    pub max_madness: i32,
}

impl PlayerConfig {
    const fn default_max_hp() -> i32 {
        PLAYER_MAX_HP
    }

    const fn default_max_mp() -> i32 {
        PLAYER_MAX_MP
    }

    const fn default_max_madness() -> i32 {
        PLAYER_MAX_MADNESS
    }

    #[must_use]
    pub const fn fresh_player(&self) -> Player {
        Player::with_maxima(self.max_hp, self.max_mp, self.max_madness)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("player.max_hp", self.max_hp),
            ("player.max_mp", self.max_mp),
            ("player.max_madness", self.max_madness),
        ] {
            if value < 1 {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 1,
                    value: i64::from(value),
                });
            }
        }
        Ok(())
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp: Self::default_max_hp(),
            max_mp: Self::default_max_mp(),
            max_madness: Self::default_max_madness(),
        }
    }
}

/// Boss gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "ProgressionConfig::default_boss_event_threshold")]
    pub boss_event_threshold: u32,
    #[serde(default = "ProgressionConfig::default_boss_spawn_chance")]
    pub boss_spawn_chance: f64,
}

impl ProgressionConfig {
    const fn default_boss_event_threshold() -> u32 {
        50
    }

    const fn default_boss_spawn_chance() -> f64 {
        0.25
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.boss_spawn_chance) {
            return Err(ConfigError::Probability {
                field: "progression.boss_spawn_chance",
                value: self.boss_spawn_chance,
            });
        }
        Ok(())
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            boss_event_threshold: Self::default_boss_event_threshold(),
            boss_spawn_chance: Self::default_boss_spawn_chance(),
        }
    }
}

/// Presentation delays in milliseconds. The engine reports them; it never sleeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "PacingConfig::default_direction_ms")]
    pub direction_ms: u64,
    #[serde(default = "PacingConfig::default_enemy_turn_ms")]
    pub enemy_turn_ms: u64,
    #[serde(default = "PacingConfig::default_combat_conclusion_ms")]
    pub combat_conclusion_ms: u64,
    #[serde(default = "PacingConfig::default_decision_ms")]
    pub decision_ms: u64,
    #[serde(default = "PacingConfig::default_item_use_ms")]
    pub item_use_ms: u64,
}

impl PacingConfig {
    const fn default_direction_ms() -> u64 {
        5000
    }

    const fn default_enemy_turn_ms() -> u64 {
        1500
    }

    const fn default_combat_conclusion_ms() -> u64 {
        2000
    }

    const fn default_decision_ms() -> u64 {
        2000
    }

    const fn default_item_use_ms() -> u64 {
        500
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            direction_ms: Self::default_direction_ms(),
            enemy_turn_ms: Self::default_enemy_turn_ms(),
            combat_conclusion_ms: Self::default_combat_conclusion_ms(),
            decision_ms: Self::default_decision_ms(),
            item_use_ms: Self::default_item_use_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default = "GameConfig::default_log_capacity")]
    pub log_capacity: usize,
}

impl GameConfig {
    const fn default_log_capacity() -> usize {
        32
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the JSON is malformed or a field is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.validate()?;
        self.progression.validate()?;
        if self.log_capacity == 0 {
            return Err(ConfigError::MinViolation {
                field: "log_capacity",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            progression: ProgressionConfig::default(),
            pacing: PacingConfig::default(),
            log_capacity: Self::default_log_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = GameConfig::from_json("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.progression.boss_event_threshold, 50);
        assert_eq!(config.pacing.direction_ms, 5000);
        assert_eq!(config.log_capacity, 32);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config =
            GameConfig::from_json(r#"{"progression": {"boss_event_threshold": 3}}"#).unwrap();
        assert_eq!(config.progression.boss_event_threshold, 3);
        assert!((config.progression.boss_spawn_chance - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.player.fresh_player(), Player::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = GameConfig::from_json(r#"{"progression": {"boss_spawn_chance": 1.5}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Probability { .. }));

        let err = GameConfig::from_json(r#"{"player": {"max_hp": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("player.max_hp"));

        let err = GameConfig::from_json(r#"{"log_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MinViolation { field: "log_capacity", .. }));

        assert!(matches!(
            GameConfig::from_json("not json").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
