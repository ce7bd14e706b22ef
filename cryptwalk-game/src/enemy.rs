//! Enemy archetypes and the spawn table.
use serde::{Deserialize, Serialize};

use crate::constants::{BOSS_HP, DEMON_HP, SKELETON_HP, WRAITH_HP};
use crate::rng::RandomSource;

/// Enemy archetypes known to the spawn table.
///
/// Deserialization goes through [`EnemyKind::from_key`], so a snapshot
/// naming an unknown kind loads as a skeleton instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EnemyKind {
    Skeleton,
    Demon,
    Wraith,
    Boss,
}

impl EnemyKind {
    /// Regular spawn table, drawn uniformly.
    pub const REGULAR: [Self; 3] = [Self::Skeleton, Self::Demon, Self::Wraith];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Skeleton => "skeleton",
            Self::Demon => "demon",
            Self::Wraith => "wraith",
            Self::Boss => "boss",
        }
    }

    /// Parse a kind key, falling back to [`EnemyKind::Skeleton`] for unknown keys.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "demon" => Self::Demon,
            "wraith" => Self::Wraith,
            "boss" => Self::Boss,
            _ => Self::Skeleton,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Skeleton => "Skeleton",
            Self::Demon => "Lesser Demon",
            Self::Wraith => "Wraith",
            Self::Boss => "Lord of Shadows",
        }
    }

    #[must_use]
    pub const fn base_hp(self) -> i32 {
        match self {
            Self::Skeleton => SKELETON_HP,
            Self::Demon => DEMON_HP,
            Self::Wraith => WRAITH_HP,
            Self::Boss => BOSS_HP,
        }
    }

    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::Boss)
    }
}

impl From<String> for EnemyKind {
    fn from(key: String) -> Self {
        Self::from_key(&key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
}

impl Enemy {
    /// Fresh enemy of the given kind at full health.
    #[must_use]
    pub fn of_kind(kind: EnemyKind) -> Self {
        Self {
            name: kind.display_name().to_string(),
            hp: kind.base_hp(),
            max_hp: kind.base_hp(),
            kind,
        }
    }

    /// Draw a regular enemy from the spawn table. Consumes one roll.
    pub fn spawn_regular<R>(rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
    {
        let idx = rng.pick_index(EnemyKind::REGULAR.len());
        let kind = EnemyKind::REGULAR
            .get(idx)
            .copied()
            .unwrap_or(EnemyKind::Skeleton);
        log::debug!("spawned {} (roll index {idx})", kind.key());
        Self::of_kind(kind)
    }

    #[must_use]
    pub fn boss() -> Self {
        Self::of_kind(EnemyKind::Boss)
    }

    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Subtract damage, flooring hp at zero.
    pub fn take_damage(&mut self, damage: i32) {
        self.hp = (self.hp - damage.max(0)).clamp(0, self.max_hp);
    }
}
