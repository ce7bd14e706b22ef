//! Turn-based combat resolution.
//!
//! [`CombatEncounter`] owns the enemy and the turn marker. Each resolver
//! takes the current [`Player`] by reference and returns an
//! [`ActionReport`] carrying the clamped successor player, the narrative
//! lines and how the turn resolved. Enemy death is checked before player
//! death after every damaging action.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CRITICAL_DAMAGE_FACTOR, CRITICAL_SELF_DAMAGE, ENEMY_BASE_DAMAGE, ENEMY_DAMAGE_SPREAD,
    ENLIGHTENED_DAMAGE_FACTOR, ENLIGHTENED_INCOMING_FACTOR, HIT_MADNESS_BASE, HIT_MADNESS_SPREAD,
    MAD_CRITICAL_CHANCE, MAD_INCOMING_FACTOR, MAD_WHIFF_CHANCE, MIN_DAMAGE, PHYSICAL_BASE_DAMAGE,
    PHYSICAL_DAMAGE_SPREAD, SPELL_BASE_DAMAGE, SPELL_DAMAGE_SPREAD, SPELL_MANA_COST,
};
use crate::enemy::Enemy;
use crate::madness::{MadnessTransition, apply_madness_delta, check_madness_threshold};
use crate::numbers::floor_f64_to_i32;
use crate::player::{MadnessState, Player};
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    #[default]
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Victory,
    Defeat,
}

/// What happens next once an action has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnResolution {
    EnemyTurn,
    PlayerTurn,
    Victory,
    Defeat,
}

impl TurnResolution {
    #[must_use]
    pub const fn ends_combat(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Strike,
    Spell,
}

impl PlayerAction {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Strike => "strike",
            Self::Spell => "spell",
        }
    }

    const fn base_damage(self) -> (i32, i32) {
        match self {
            Self::Strike => (PHYSICAL_BASE_DAMAGE, PHYSICAL_DAMAGE_SPREAD),
            Self::Spell => (SPELL_BASE_DAMAGE, SPELL_DAMAGE_SPREAD),
        }
    }

    #[must_use]
    pub const fn mana_cost(self) -> i32 {
        match self {
            Self::Strike => 0,
            Self::Spell => SPELL_MANA_COST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("it is not the player's turn")]
    NotPlayerTurn,
    #[error("it is not the enemy's turn")]
    NotEnemyTurn,
    #[error("combat already ended")]
    Concluded,
    #[error("spell needs {required} mana, only {available} available")]
    InsufficientMana { required: i32, available: i32 },
}

/// Everything a single combat action produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionReport {
    pub player: Player,
    pub enemy: Enemy,
    pub damage: i32,
    pub self_damage: i32,
    pub critical: bool,
    pub whiffed: bool,
    pub madness_gain: i32,
    pub transition: Option<MadnessTransition>,
    pub messages: Vec<String>,
    pub resolution: TurnResolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEncounter {
    pub enemy: Enemy,
    pub turn: Turn,
    pub outcome: Option<CombatOutcome>,
}

impl CombatEncounter {
    #[must_use]
    pub const fn new(enemy: Enemy) -> Self {
        Self {
            enemy,
            turn: Turn::Player,
            outcome: None,
        }
    }

    #[must_use]
    pub const fn is_player_turn(&self) -> bool {
        matches!(self.turn, Turn::Player) && self.outcome.is_none()
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Opening line for the combat log.
    #[must_use]
    pub fn announcement(&self) -> String {
        if self.enemy.kind.is_boss() {
            format!("{} emerges from the shadows!", self.enemy.name)
        } else {
            format!("A {} appears!", self.enemy.name)
        }
    }

    fn ensure_player_turn(&self) -> Result<(), CombatError> {
        if self.outcome.is_some() {
            return Err(CombatError::Concluded);
        }
        if !matches!(self.turn, Turn::Player) {
            return Err(CombatError::NotPlayerTurn);
        }
        Ok(())
    }

    /// Resolve a physical strike or a spell.
    ///
    /// Roll order: whiff (mad only), damage, critical (mad only).
    ///
    /// # Errors
    ///
    /// Rejects the action outside the player's turn, after combat ended,
    /// or when a spell cannot be paid for.
    pub fn player_action<R>(
        &mut self,
        action: PlayerAction,
        player: &Player,
        rng: &mut R,
    ) -> Result<ActionReport, CombatError>
    where
        R: RandomSource + ?Sized,
    {
        self.ensure_player_turn()?;
        let cost = action.mana_cost();
        if player.mp < cost {
            return Err(CombatError::InsufficientMana {
                required: cost,
                available: player.mp,
            });
        }

        let mut next = player.clone();
        next.mp -= cost;
        let mut messages = Vec::new();

        if player.is_mad() && rng.chance(MAD_WHIFF_CHANCE) {
            messages.push(whiff_message(action).to_string());
            self.turn = Turn::Enemy;
            log::debug!("{} whiffed against {}", action.key(), self.enemy.name);
            return Ok(ActionReport {
                player: next.clamped(),
                enemy: self.enemy.clone(),
                damage: 0,
                self_damage: 0,
                critical: false,
                whiffed: true,
                madness_gain: 0,
                transition: None,
                messages,
                resolution: TurnResolution::EnemyTurn,
            });
        }

        let (base, spread) = action.base_damage();
        let mut damage = rng.spread(base, spread);
        let mut self_damage = 0;
        let mut critical = false;
        match player.madness_state {
            MadnessState::Enlightened => damage *= ENLIGHTENED_DAMAGE_FACTOR,
            MadnessState::Mad => {
                if rng.chance(MAD_CRITICAL_CHANCE) {
                    damage *= CRITICAL_DAMAGE_FACTOR;
                    self_damage = CRITICAL_SELF_DAMAGE;
                    critical = true;
                }
            }
            MadnessState::Normal => {}
        }
        let damage = damage.max(MIN_DAMAGE);

        self.enemy.take_damage(damage);
        next.hp -= self_damage;
        let next = next.clamped();

        messages.push(strike_message(action, player, &self.enemy, damage, self_damage));

        let resolution = if self.enemy.is_defeated() {
            messages.push(fallen_message(action, &self.enemy));
            self.outcome = Some(CombatOutcome::Victory);
            TurnResolution::Victory
        } else if next.is_dead() {
            messages.push("You have wounded yourself fatally...".to_string());
            self.outcome = Some(CombatOutcome::Defeat);
            TurnResolution::Defeat
        } else {
            self.turn = Turn::Enemy;
            TurnResolution::EnemyTurn
        };

        Ok(ActionReport {
            player: next,
            enemy: self.enemy.clone(),
            damage,
            self_damage,
            critical,
            whiffed: false,
            madness_gain: 0,
            transition: None,
            messages,
            resolution,
        })
    }

    /// Resolve the enemy's attack.
    ///
    /// Roll order: damage, madness gain, threshold (only at the cap).
    ///
    /// # Errors
    ///
    /// Rejects the call unless the turn marker is on the enemy.
    pub fn enemy_turn<R>(&mut self, player: &Player, rng: &mut R) -> Result<ActionReport, CombatError>
    where
        R: RandomSource + ?Sized,
    {
        if self.outcome.is_some() {
            return Err(CombatError::Concluded);
        }
        if !matches!(self.turn, Turn::Enemy) {
            return Err(CombatError::NotEnemyTurn);
        }

        let base = rng.spread(ENEMY_BASE_DAMAGE, ENEMY_DAMAGE_SPREAD);
        let factor = match player.madness_state {
            MadnessState::Enlightened => ENLIGHTENED_INCOMING_FACTOR,
            MadnessState::Mad => MAD_INCOMING_FACTOR,
            MadnessState::Normal => 1.0,
        };
        let damage = floor_f64_to_i32(f64::from(base) * factor).max(MIN_DAMAGE);

        let raw_gain = rng.spread(HIT_MADNESS_BASE, HIT_MADNESS_SPREAD);
        let mut hit = apply_madness_delta(player, raw_gain);
        let madness_gain = hit.madness - player.madness;
        hit.hp -= damage;
        let hit = hit.clamped();

        let mut messages = vec![enemy_strike_message(player, &self.enemy, damage)];
        let (next, transition) = check_madness_threshold(hit, rng);
        if let Some(transition) = &transition {
            messages.push(transition.message().to_string());
        }

        let resolution = if next.is_dead() {
            messages.push("You have been defeated...".to_string());
            self.outcome = Some(CombatOutcome::Defeat);
            TurnResolution::Defeat
        } else {
            self.turn = Turn::Player;
            TurnResolution::PlayerTurn
        };

        Ok(ActionReport {
            player: next,
            enemy: self.enemy.clone(),
            damage,
            self_damage: 0,
            critical: false,
            whiffed: false,
            madness_gain,
            transition,
            messages,
            resolution,
        })
    }

    /// Spend the player's turn on an item. Control passes to the enemy.
    ///
    /// # Errors
    ///
    /// Rejects the call outside the player's turn.
    pub fn spend_turn_on_item(&mut self) -> Result<(), CombatError> {
        self.ensure_player_turn()?;
        self.turn = Turn::Enemy;
        Ok(())
    }
}

const fn whiff_message(action: PlayerAction) -> &'static str {
    match action {
        PlayerAction::Strike => "Your attack misses! Madness clouds your aim.",
        PlayerAction::Spell => "Your spell fizzles! The mana is wasted.",
    }
}

fn strike_message(
    action: PlayerAction,
    player: &Player,
    enemy: &Enemy,
    damage: i32,
    self_damage: i32,
) -> String {
    match (action, player.madness_state, self_damage > 0) {
        (PlayerAction::Strike, _, true) => {
            format!("CRITICAL strike! You deal {damage} damage but hurt yourself for {self_damage}.")
        }
        (PlayerAction::Spell, _, true) => {
            format!("CRITICAL spell! You deal {damage} damage but hurt yourself for {self_damage}.")
        }
        (PlayerAction::Strike, MadnessState::Enlightened, false) => {
            format!("You strike with ENLIGHTENED power for {damage} damage.")
        }
        (PlayerAction::Spell, MadnessState::Enlightened, false) => {
            format!("You cast an ENLIGHTENED spell for {damage} damage.")
        }
        (PlayerAction::Strike, _, false) => {
            format!("You attack the {} for {damage} damage.", enemy.name)
        }
        (PlayerAction::Spell, _, false) => format!("You cast a dark spell for {damage} damage."),
    }
}

fn fallen_message(action: PlayerAction, enemy: &Enemy) -> String {
    match action {
        PlayerAction::Strike => format!("The {} has fallen!", enemy.name),
        PlayerAction::Spell => format!("The {} has been annihilated!", enemy.name),
    }
}

fn enemy_strike_message(player: &Player, enemy: &Enemy, damage: i32) -> String {
    match player.madness_state {
        MadnessState::Enlightened => format!(
            "The {} attacks, but your ENLIGHTENMENT reduces the damage to {damage}.",
            enemy.name
        ),
        MadnessState::Mad => format!("The {} mauls you for {damage} damage.", enemy.name),
        MadnessState::Normal => format!("The {} attacks you for {damage} damage.", enemy.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyKind;
    use crate::madness::MSG_SHATTERED;
    use crate::rng::ScriptedRolls;

    fn skeleton_fight() -> CombatEncounter {
        CombatEncounter::new(Enemy::of_kind(EnemyKind::Skeleton))
    }

    #[test]
    fn normal_strike_hands_turn_to_enemy() {
        let mut fight = skeleton_fight();
        let mut rng = ScriptedRolls::new(vec![0.0]);
        let report = fight
            .player_action(PlayerAction::Strike, &Player::default(), &mut rng)
            .unwrap();
        assert_eq!(report.damage, 20);
        assert_eq!(report.enemy.hp, 20);
        assert_eq!(report.resolution, TurnResolution::EnemyTurn);
        assert_eq!(fight.turn, Turn::Enemy);
        assert_eq!(rng.consumed(), 1);
    }

    #[test]
    fn strike_out_of_turn_is_rejected() {
        let mut fight = skeleton_fight();
        fight.turn = Turn::Enemy;
        let mut rng = ScriptedRolls::new(vec![0.0]);
        let err = fight
            .player_action(PlayerAction::Strike, &Player::default(), &mut rng)
            .unwrap_err();
        assert_eq!(err, CombatError::NotPlayerTurn);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn mad_whiff_spends_mana_but_deals_nothing() {
        let mut fight = skeleton_fight();
        let player = Player {
            madness_state: MadnessState::Mad,
            ..Player::default()
        };
        let mut rng = ScriptedRolls::new(vec![0.1]);
        let report = fight
            .player_action(PlayerAction::Spell, &player, &mut rng)
            .unwrap();
        assert!(report.whiffed);
        assert_eq!(report.damage, 0);
        assert_eq!(report.player.mp, 80);
        assert_eq!(fight.enemy.hp, 40);
        assert_eq!(report.resolution, TurnResolution::EnemyTurn);
    }

    #[test]
    fn mad_critical_doubles_and_self_harms() {
        let mut fight = CombatEncounter::new(Enemy::of_kind(EnemyKind::Boss));
        let player = Player {
            madness_state: MadnessState::Mad,
            ..Player::default()
        };
        // no whiff, max damage roll, crit
        let mut rng = ScriptedRolls::new(vec![0.5, 0.999, 0.1]);
        let report = fight
            .player_action(PlayerAction::Strike, &player, &mut rng)
            .unwrap();
        assert!(report.critical);
        assert_eq!(report.damage, 68);
        assert_eq!(report.player.hp, 80);
        assert_eq!(report.enemy.hp, 350 - 68);
    }

    #[test]
    fn enemy_death_is_checked_before_self_inflicted_death() {
        let mut fight = skeleton_fight();
        fight.enemy.hp = 5;
        let player = Player {
            hp: 10,
            madness_state: MadnessState::Mad,
            ..Player::default()
        };
        let mut rng = ScriptedRolls::new(vec![0.5, 0.0, 0.0]);
        let report = fight
            .player_action(PlayerAction::Strike, &player, &mut rng)
            .unwrap();
        assert_eq!(report.player.hp, 0);
        assert_eq!(report.resolution, TurnResolution::Victory);
        assert_eq!(fight.outcome, Some(CombatOutcome::Victory));
    }

    #[test]
    fn spell_needs_mana() {
        let mut fight = skeleton_fight();
        let player = Player {
            mp: 19,
            ..Player::default()
        };
        let mut rng = ScriptedRolls::default();
        let err = fight
            .player_action(PlayerAction::Spell, &player, &mut rng)
            .unwrap_err();
        assert!(matches!(err, CombatError::InsufficientMana { required: 20, available: 19 }));
    }

    #[test]
    fn enemy_hit_scales_with_state() {
        let mut fight = skeleton_fight();
        fight.turn = Turn::Enemy;
        let player = Player {
            madness: 10,
            madness_state: MadnessState::Enlightened,
            ..Player::default()
        };
        // damage 29 halved to 14, gain 6 doubled to 12
        let mut rng = ScriptedRolls::new(vec![0.999, 0.999]);
        let report = fight.enemy_turn(&player, &mut rng).unwrap();
        assert_eq!(report.damage, 14);
        assert_eq!(report.player.hp, 86);
        assert_eq!(report.madness_gain, 12);
        assert_eq!(report.player.madness, 22);
        assert_eq!(fight.turn, Turn::Player);
    }

    #[test]
    fn enemy_hit_at_cap_rolls_threshold() {
        let mut fight = skeleton_fight();
        fight.turn = Turn::Enemy;
        let player = Player {
            madness: 95,
            ..Player::default()
        };
        let mut rng = ScriptedRolls::new(vec![0.34, 0.5, 0.5]);
        let report = fight.enemy_turn(&player, &mut rng).unwrap();
        assert_eq!(report.damage, 20);
        assert_eq!(report.player.hp, 80);
        assert_eq!(report.player.madness, 0);
        assert_eq!(report.player.madness_state, MadnessState::Mad);
        assert!(report.messages.iter().any(|line| line == MSG_SHATTERED));
        assert_eq!(rng.consumed(), 3);
    }

    #[test]
    fn lethal_enemy_hit_ends_combat() {
        let mut fight = skeleton_fight();
        fight.turn = Turn::Enemy;
        let player = Player {
            hp: 10,
            ..Player::default()
        };
        let mut rng = ScriptedRolls::new(vec![0.0, 0.0]);
        let report = fight.enemy_turn(&player, &mut rng).unwrap();
        assert_eq!(report.player.hp, 0);
        assert_eq!(report.resolution, TurnResolution::Defeat);
        assert!(fight.is_over());
        assert!(fight.enemy_turn(&report.player, &mut rng).is_err());
    }
}
