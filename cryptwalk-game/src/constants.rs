//! Centralized balance and tuning constants for Cryptwalk game logic.
//!
//! These values define the deterministic math for combat and madness.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets. Session-level knobs (boss gating, pacing) live in
//! [`crate::config::GameConfig`].

// Player defaults ----------------------------------------------------------
pub const PLAYER_MAX_HP: i32 = 100;
pub const PLAYER_MAX_MP: i32 = 100;
pub const PLAYER_MAX_MADNESS: i32 = 100;

// Madness engine -----------------------------------------------------------
pub const ENLIGHTENMENT_CHANCE: f64 = 0.05;
pub const MULTIPLIER_NORMAL: f64 = 1.0;
pub const MULTIPLIER_ENLIGHTENED: f64 = 2.0;
pub const MULTIPLIER_MAD: f64 = 0.5;
pub const ENLIGHTENED_RESTORE_FACTOR: i32 = 2;
pub const MADNESS_WARNING_LEVEL: i32 = 70;
pub const MADNESS_CRITICAL_LEVEL: i32 = 90;

// Player strikes -----------------------------------------------------------
pub const PHYSICAL_BASE_DAMAGE: i32 = 20;
pub const PHYSICAL_DAMAGE_SPREAD: i32 = 15;
pub const SPELL_BASE_DAMAGE: i32 = 35;
pub const SPELL_DAMAGE_SPREAD: i32 = 20;
pub const SPELL_MANA_COST: i32 = 20;
pub const MAD_WHIFF_CHANCE: f64 = 0.2;
pub const MAD_CRITICAL_CHANCE: f64 = 0.3;
pub const CRITICAL_DAMAGE_FACTOR: i32 = 2;
pub const CRITICAL_SELF_DAMAGE: i32 = 20;
pub const ENLIGHTENED_DAMAGE_FACTOR: i32 = 2;
pub const MIN_DAMAGE: i32 = 1;

// Enemy strikes ------------------------------------------------------------
pub const ENEMY_BASE_DAMAGE: i32 = 15;
pub const ENEMY_DAMAGE_SPREAD: i32 = 15;
pub const ENLIGHTENED_INCOMING_FACTOR: f64 = 0.5;
pub const MAD_INCOMING_FACTOR: f64 = 1.3;
pub const HIT_MADNESS_BASE: i32 = 3;
pub const HIT_MADNESS_SPREAD: i32 = 4;

// Enemy roster -------------------------------------------------------------
pub const SKELETON_HP: i32 = 40;
pub const DEMON_HP: i32 = 60;
pub const WRAITH_HP: i32 = 50;
pub const BOSS_HP: i32 = 350;

// Starter kit --------------------------------------------------------------
pub const STARTER_POTION_EFFECT: i32 = 30;
pub const STARTER_MANA_EFFECT: i32 = 20;
