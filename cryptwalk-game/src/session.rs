//! Exploration and progression controller.
//!
//! [`GameSession`] owns the authoritative [`GameState`] and turns player
//! intents into transitions. Actions that the renderer animates are split
//! in two: the intent commits the action and parks a [`PendingStep`];
//! [`GameSession::advance`] runs the delayed half once the renderer's
//! timer fires. Only one step can be pending, and every other intent is
//! rejected until it has run.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::combat::{
    ActionReport, CombatEncounter, CombatError, CombatOutcome, PlayerAction, TurnResolution,
};
use crate::config::GameConfig;
use crate::enemy::Enemy;
use crate::events::{Choice, DecisionCatalog, DecisionEncounter, DecisionError};
use crate::hallway::{Direction, EventArchetype, Junction};
use crate::inventory::{Inventory, Item, apply_item};
use crate::journal::NarrativeLog;
use crate::madness::hallway_omen;
use crate::rng::{GameRng, RandomSource};
use crate::state::{GamePhase, GameState, PendingStep};

const MSG_ENTERING: &str = "You step into the dark corridors...";
const MSG_BOSS_APPROACHES: &str = "A dark presence draws near...";
const MSG_COMBAT_WON: &str = "Victory. You continue down the corridor...";
const MSG_DECISION_TAKEN: &str = "You make your choice and move on...";

/// Player intents accepted by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    StartGame,
    ChooseDirection,
    Attack,
    CastSpell,
    UseItem,
    ResolveDecision,
    OpenInventory,
    CloseInventory,
}

impl Intent {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::StartGame => "start_game",
            Self::ChooseDirection => "choose_direction",
            Self::Attack => "attack",
            Self::CastSpell => "cast_spell",
            Self::UseItem => "use_item",
            Self::ResolveDecision => "resolve_decision",
            Self::OpenInventory => "open_inventory",
            Self::CloseInventory => "close_inventory",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why an intent was ignored. The state is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentRejection {
    #[error("{intent} is not available during {phase}")]
    NotAvailable { intent: Intent, phase: GamePhase },
    #[error("waiting on {pending} before accepting input")]
    ActionInProgress { pending: PendingStep },
    #[error("it is not the player's turn")]
    NotPlayerTurn,
    #[error("close the inventory first")]
    InventoryOpen,
    #[error("spell needs {required} mana, only {available} available")]
    InsufficientMana { required: i32, available: i32 },
    #[error("no item with id {id} in the inventory")]
    UnknownItem { id: String },
    #[error("item {id} cannot be used")]
    ItemNotUsable { id: String },
    #[error("decision {event_id} was already resolved")]
    AlreadyResolved { event_id: u32 },
    #[error("no pending step to advance")]
    NothingPending,
}

impl From<DecisionError> for IntentRejection {
    fn from(err: DecisionError) -> Self {
        match err {
            DecisionError::AlreadyResolved { event_id } => Self::AlreadyResolved { event_id },
        }
    }
}

/// Result of an intent: the new snapshot, or why nothing happened.
pub type IntentResult = Result<GameState, IntentRejection>;

/// Authoritative game session.
#[derive(Debug, Clone)]
pub struct GameSession<R = GameRng> {
    config: GameConfig,
    catalog: DecisionCatalog,
    rng: R,
    state: GameState,
}

impl GameSession<GameRng> {
    /// Session with default configuration and the bundled event catalog.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(GameConfig::default(), seed)
    }

    #[must_use]
    pub fn with_config(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(
            config,
            DecisionCatalog::default_catalog().clone(),
            GameRng::from_user_seed(seed),
        )
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Session over an arbitrary random source and catalog.
    #[must_use]
    pub fn with_rng(config: GameConfig, catalog: DecisionCatalog, rng: R) -> Self {
        let state = GameState::new(&config);
        Self {
            config,
            catalog,
            rng,
            state,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Apply a closure to the mutable game state.
    pub fn with_state_mut<T>(&mut self, f: impl FnOnce(&mut GameState) -> T) -> T {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &DecisionCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }

    pub const fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Delay the renderer should wait before calling [`Self::advance`].
    #[must_use]
    pub fn pending_delay(&self) -> Option<Duration> {
        self.state
            .pending
            .map(|step| step.delay(&self.config.pacing))
    }

    fn ensure_idle(&self) -> Result<(), IntentRejection> {
        match self.state.pending {
            Some(pending) => Err(IntentRejection::ActionInProgress { pending }),
            None => Ok(()),
        }
    }

    fn ensure_phase(&self, intent: Intent, allowed: &[GamePhase]) -> Result<(), IntentRejection> {
        if allowed.contains(&self.state.phase) {
            Ok(())
        } else {
            Err(IntentRejection::NotAvailable {
                intent,
                phase: self.state.phase,
            })
        }
    }

    fn reject(&self, rejection: IntentRejection) -> IntentResult {
        log::debug!("intent rejected in {}: {rejection}", self.state.phase);
        Err(rejection)
    }

    /// Begin a new run from the title or an end screen.
    ///
    /// # Errors
    ///
    /// Rejected while a run is in progress.
    pub fn start_game(&mut self) -> IntentResult {
        if let Err(rejection) = self.ensure_phase(
            Intent::StartGame,
            &[GamePhase::Start, GamePhase::GameOver, GamePhase::Victory],
        ) {
            return self.reject(rejection);
        }
        let mut state = GameState::new(&self.config);
        state.logs.exploration.reset_with(MSG_ENTERING);
        state.junction = Junction::draw(&mut self.rng);
        state.phase = GamePhase::Hallway;
        self.state = state;
        log::info!("new run started");
        Ok(self.snapshot())
    }

    /// Drop the current run and return to the title screen.
    pub fn restart(&mut self) -> GameState {
        self.state = GameState::new(&self.config);
        log::info!("session restarted");
        self.snapshot()
    }

    /// Commit to a hallway branch. The arrival runs on [`Self::advance`].
    ///
    /// # Errors
    ///
    /// Rejected outside the hallway or while a previous choice is resolving.
    pub fn choose_direction(&mut self, direction: Direction) -> IntentResult {
        if let Err(rejection) = self
            .ensure_phase(Intent::ChooseDirection, &[GamePhase::Hallway])
            .and_then(|()| self.ensure_idle())
        {
            return self.reject(rejection);
        }
        self.state.selected_direction = Some(direction);
        self.state.inventory_open = false;
        self.state
            .logs
            .exploration
            .push(format!("You head {}...", direction.key()));
        self.state.pending = Some(PendingStep::ArriveAtJunction { direction });
        Ok(self.snapshot())
    }

    /// Physical attack on the current enemy.
    ///
    /// # Errors
    ///
    /// Rejected outside combat, off-turn, or with the inventory open.
    pub fn attack(&mut self) -> IntentResult {
        self.player_action(Intent::Attack, PlayerAction::Strike)
    }

    /// Spell attack costing mana.
    ///
    /// # Errors
    ///
    /// Rejected like [`Self::attack`], and when mana is short.
    pub fn cast_spell(&mut self) -> IntentResult {
        self.player_action(Intent::CastSpell, PlayerAction::Spell)
    }

    fn ensure_combat_input(&self, intent: Intent) -> Result<(), IntentRejection> {
        self.ensure_phase(intent, &[GamePhase::Combat])?;
        self.ensure_idle()?;
        if !self.state.is_player_turn() {
            return Err(IntentRejection::NotPlayerTurn);
        }
        Ok(())
    }

    fn player_action(&mut self, intent: Intent, action: PlayerAction) -> IntentResult {
        if let Err(rejection) = self.ensure_combat_input(intent) {
            return self.reject(rejection);
        }
        if self.state.inventory_open {
            return self.reject(IntentRejection::InventoryOpen);
        }
        let Some(combat) = self.state.combat.as_mut() else {
            return self.reject(IntentRejection::NotPlayerTurn);
        };
        let report = match combat.player_action(action, &self.state.player, &mut self.rng) {
            Ok(report) => report,
            Err(err) => return self.reject(combat_rejection(err)),
        };
        self.apply_report(report);
        Ok(self.snapshot())
    }

    /// Drink or use an item during the player's combat turn.
    ///
    /// # Errors
    ///
    /// Rejected outside combat, off-turn, for unknown ids and for key items.
    pub fn use_item(&mut self, item_id: &str) -> IntentResult {
        if let Err(rejection) = self.ensure_combat_input(Intent::UseItem) {
            return self.reject(rejection);
        }
        let Some(item) = self.state.inventory.get(item_id).cloned() else {
            return self.reject(IntentRejection::UnknownItem {
                id: item_id.to_string(),
            });
        };
        let Some(used) = apply_item(&self.state.player, &item) else {
            return self.reject(IntentRejection::ItemNotUsable {
                id: item_id.to_string(),
            });
        };
        let Some(combat) = self.state.combat.as_mut() else {
            return self.reject(IntentRejection::NotPlayerTurn);
        };
        if let Err(err) = combat.spend_turn_on_item() {
            return self.reject(combat_rejection(err));
        }
        self.state.inventory.remove_first(item_id);
        self.state.player = used.player;
        self.state.logs.combat.push(used.message);
        self.state.inventory_open = false;
        self.state.pending = Some(PendingStep::EnemyTurn { after_item: true });
        Ok(self.snapshot())
    }

    /// Answer the decision on screen. The outcome lands on [`Self::advance`].
    ///
    /// # Errors
    ///
    /// Rejected outside the decision screen and on every repeat answer.
    pub fn resolve_decision(&mut self, choice: Choice) -> IntentResult {
        if let Err(rejection) = self.ensure_phase(Intent::ResolveDecision, &[GamePhase::Decision]) {
            return self.reject(rejection);
        }
        if let Some(decision) = &self.state.decision
            && decision.is_resolved()
        {
            return self.reject(IntentRejection::AlreadyResolved {
                event_id: decision.event.id,
            });
        }
        if let Err(rejection) = self.ensure_idle() {
            return self.reject(rejection);
        }
        let Some(decision) = self.state.decision.as_mut() else {
            return self.reject(IntentRejection::NotAvailable {
                intent: Intent::ResolveDecision,
                phase: self.state.phase,
            });
        };
        let outcome = decision
            .resolve(
                choice,
                &self.state.player,
                &self.state.inventory,
                &mut self.rng,
            )
            .map(|resolution| (resolution.messages.clone(), resolution.transition.is_some()));
        let (messages, transitioned) = match outcome {
            Ok(outcome) => outcome,
            Err(err) => return self.reject(err.into()),
        };
        if transitioned {
            self.state.madness_transitions += 1;
        }
        self.state.logs.decision.extend(messages);
        self.state.pending = Some(PendingStep::ConcludeDecision);
        Ok(self.snapshot())
    }

    /// # Errors
    ///
    /// Rejected outside the hallway and combat, or off-turn in combat.
    pub fn open_inventory(&mut self) -> IntentResult {
        if let Err(rejection) = self
            .ensure_phase(Intent::OpenInventory, &[GamePhase::Hallway, GamePhase::Combat])
            .and_then(|()| self.ensure_idle())
        {
            return self.reject(rejection);
        }
        if self.state.phase == GamePhase::Combat && !self.state.is_player_turn() {
            return self.reject(IntentRejection::NotPlayerTurn);
        }
        self.state.inventory_open = true;
        Ok(self.snapshot())
    }

    /// # Errors
    ///
    /// Rejected when the inventory is not open.
    pub fn close_inventory(&mut self) -> IntentResult {
        if !self.state.inventory_open {
            return self.reject(IntentRejection::NotAvailable {
                intent: Intent::CloseInventory,
                phase: self.state.phase,
            });
        }
        self.state.inventory_open = false;
        Ok(self.snapshot())
    }

    /// Run the pending step.
    ///
    /// # Errors
    ///
    /// Returns [`IntentRejection::NothingPending`] when there is nothing to run.
    pub fn advance(&mut self) -> IntentResult {
        let Some(step) = self.state.pending.take() else {
            return Err(IntentRejection::NothingPending);
        };
        match step {
            PendingStep::ArriveAtJunction { direction } => self.arrive(direction),
            PendingStep::EnemyTurn { .. } => self.enemy_turn(),
            PendingStep::ConcludeCombat { outcome } => self.conclude_combat(outcome),
            PendingStep::ConcludeDecision => self.conclude_decision(),
        }
        self.enforce_death();
        Ok(self.snapshot())
    }

    /// Run pending steps until none remain.
    pub fn settle(&mut self) -> GameState {
        while self.state.pending.is_some() {
            if self.advance().is_err() {
                break;
            }
        }
        self.snapshot()
    }

    fn arrive(&mut self, direction: Direction) {
        let archetype = self.state.junction.archetype(direction);
        self.state.event_count = self.state.event_count.saturating_add(1);
        let progression = &self.config.progression;
        if self.state.event_count >= progression.boss_event_threshold
            && !self.state.boss_spawned
            && self.rng.chance(progression.boss_spawn_chance)
        {
            log::info!("boss spawned at event {}", self.state.event_count);
            self.state.boss_spawned = true;
            self.state.logs.exploration.push(MSG_BOSS_APPROACHES);
            self.begin_combat(Enemy::boss());
        } else {
            self.dispatch(archetype);
        }
        self.state.junction = Junction::draw(&mut self.rng);
        self.state.selected_direction = None;
    }

    fn dispatch(&mut self, archetype: EventArchetype) {
        let Some(category) = archetype.category() else {
            let enemy = Enemy::spawn_regular(&mut self.rng);
            self.begin_combat(enemy);
            return;
        };
        let pool = self.catalog.pool(category);
        if pool.is_empty() {
            log::warn!("no events for {archetype}, falling back to combat");
            let enemy = Enemy::spawn_regular(&mut self.rng);
            self.begin_combat(enemy);
            return;
        }
        let idx = self.rng.pick_index(pool.len());
        let event = pool.get(idx).and_then(|id| self.catalog.get(*id)).cloned();
        match event {
            Some(event) => {
                log::debug!("{archetype} branch opened decision {}", event.id);
                let decision = DecisionEncounter::open(&event, &self.state.inventory);
                self.state.logs.decision.reset_with(decision.description.clone());
                self.state.decision = Some(decision);
                self.state.phase = GamePhase::Decision;
            }
            None => {
                log::warn!("event pool for {archetype} points at a missing event");
                let enemy = Enemy::spawn_regular(&mut self.rng);
                self.begin_combat(enemy);
            }
        }
    }

    fn begin_combat(&mut self, enemy: Enemy) {
        let combat = CombatEncounter::new(enemy);
        self.state.logs.combat.reset_with(combat.announcement());
        log::info!("combat begins against {}", combat.enemy.name);
        self.state.combat = Some(combat);
        self.state.inventory_open = false;
        self.state.phase = GamePhase::Combat;
    }

    fn enemy_turn(&mut self) {
        let Some(combat) = self.state.combat.as_mut() else {
            log::warn!("enemy turn scheduled without an active combat");
            return;
        };
        match combat.enemy_turn(&self.state.player, &mut self.rng) {
            Ok(report) => self.apply_report(report),
            Err(err) => log::warn!("enemy turn skipped: {err}"),
        }
    }

    fn apply_report(&mut self, report: ActionReport) {
        self.state.player = report.player;
        self.state.logs.combat.extend(report.messages);
        if report.transition.is_some() {
            self.state.madness_transitions += 1;
        }
        self.state.pending = match report.resolution {
            TurnResolution::EnemyTurn => Some(PendingStep::EnemyTurn { after_item: false }),
            TurnResolution::PlayerTurn => None,
            TurnResolution::Victory => Some(PendingStep::ConcludeCombat {
                outcome: CombatOutcome::Victory,
            }),
            TurnResolution::Defeat => Some(PendingStep::ConcludeCombat {
                outcome: CombatOutcome::Defeat,
            }),
        };
    }

    fn conclude_combat(&mut self, outcome: CombatOutcome) {
        let enemy = self.state.combat.take().map(|combat| combat.enemy);
        self.state.logs.combat.clear();
        self.state.inventory_open = false;
        match outcome {
            CombatOutcome::Victory if enemy.as_ref().is_some_and(|enemy| enemy.kind.is_boss()) => {
                log::info!("boss defeated, run won");
                self.state.phase = GamePhase::Victory;
            }
            CombatOutcome::Victory => {
                self.state.junction = Junction::draw(&mut self.rng);
                self.state.logs.exploration.push(MSG_COMBAT_WON);
                self.enter_hallway();
            }
            CombatOutcome::Defeat => {
                log::info!("player defeated after {} events", self.state.event_count);
                self.state.phase = GamePhase::GameOver;
            }
        }
    }

    fn conclude_decision(&mut self) {
        let Some(resolution) = self
            .state
            .decision
            .take()
            .and_then(|decision| decision.resolution)
        else {
            log::warn!("decision concluded without a resolution");
            self.enter_hallway();
            return;
        };
        self.state.player = resolution.player;
        apply_inventory_delta(
            &mut self.state.inventory,
            &mut self.state.logs.exploration,
            resolution.item_to_add,
            resolution.item_to_remove.as_deref(),
        );
        if self.state.player.is_dead() {
            log::info!("player died resolving decision {}", resolution.event_id);
            self.state.phase = GamePhase::GameOver;
        } else {
            self.state.logs.exploration.push(MSG_DECISION_TAKEN);
            self.enter_hallway();
        }
    }

    fn enter_hallway(&mut self) {
        self.state.phase = GamePhase::Hallway;
        if let Some(omen) = hallway_omen(&self.state.player) {
            self.state.logs.exploration.push_distinct(omen);
        }
    }

    fn enforce_death(&mut self) {
        if self.state.pending.is_none()
            && !self.state.phase.is_terminal()
            && self.state.phase != GamePhase::Start
            && self.state.player.is_dead()
        {
            log::info!("player hp reached zero during {}", self.state.phase);
            self.state.combat = None;
            self.state.decision = None;
            self.state.phase = GamePhase::GameOver;
        }
    }
}

fn apply_inventory_delta(
    inventory: &mut Inventory,
    log: &mut NarrativeLog,
    add: Option<Item>,
    remove: Option<&str>,
) {
    if let Some(item) = add {
        log.push(format!("You obtained {}!", item.name));
        inventory.push(item);
    }
    if let Some(id) = remove {
        inventory.remove_first(id);
    }
}

fn combat_rejection(err: CombatError) -> IntentRejection {
    match err {
        CombatError::InsufficientMana {
            required,
            available,
        } => IntentRejection::InsufficientMana {
            required,
            available,
        },
        CombatError::NotPlayerTurn | CombatError::NotEnemyTurn | CombatError::Concluded => {
            IntentRejection::NotPlayerTurn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyKind;
    use crate::events::EventCategory;
    use crate::player::MadnessState;
    use crate::rng::ScriptedRolls;

    fn scripted(rolls: Vec<f64>) -> GameSession<ScriptedRolls> {
        GameSession::with_rng(
            GameConfig::default(),
            DecisionCatalog::default_catalog().clone(),
            ScriptedRolls::new(rolls),
        )
    }

    fn in_combat(session: &mut GameSession<ScriptedRolls>, kind: EnemyKind) {
        session.with_state_mut(|state| {
            state.phase = GamePhase::Combat;
            state.combat = Some(CombatEncounter::new(Enemy::of_kind(kind)));
        });
    }

    #[test]
    fn start_game_draws_first_junction() {
        // left ambient, right combat
        let mut session = scripted(vec![0.0, 0.2]);
        let state = session.start_game().unwrap();
        assert_eq!(state.phase, GamePhase::Hallway);
        assert_eq!(state.junction.left, EventArchetype::Ambient);
        assert_eq!(state.junction.right, EventArchetype::Combat);
        assert_eq!(state.logs.exploration.last(), Some(MSG_ENTERING));
        assert!(matches!(
            session.start_game(),
            Err(IntentRejection::NotAvailable { .. })
        ));
    }

    #[test]
    fn direction_locks_until_arrival() {
        // junction, then arrival: skeleton spawn, next junction
        let mut session = scripted(vec![0.0, 0.2, 0.0, 0.0, 0.5]);
        session.start_game().unwrap();
        let state = session.choose_direction(Direction::Right).unwrap();
        assert_eq!(state.selected_direction, Some(Direction::Right));
        assert_eq!(
            session.choose_direction(Direction::Left),
            Err(IntentRejection::ActionInProgress {
                pending: PendingStep::ArriveAtJunction {
                    direction: Direction::Right
                }
            })
        );
        assert_eq!(session.pending_delay(), Some(Duration::from_secs(5)));
        let state = session.advance().unwrap();
        assert_eq!(state.phase, GamePhase::Combat);
        assert_eq!(state.event_count, 1);
        assert_eq!(state.enemy().map(|enemy| enemy.kind), Some(EnemyKind::Skeleton));
        assert!(state.selected_direction.is_none());
        assert_ne!(state.junction.left, state.junction.right);
    }

    #[test]
    fn mystic_branch_opens_decision() {
        // left mystic, right ambient, pick first mystic event (1)
        let mut session = scripted(vec![0.9, 0.0, 0.0, 0.0, 0.5]);
        session.start_game().unwrap();
        session.choose_direction(Direction::Left).unwrap();
        let state = session.advance().unwrap();
        assert_eq!(state.phase, GamePhase::Decision);
        let decision = state.decision.as_ref().unwrap();
        assert_eq!(decision.event.id, 1);
        assert_eq!(decision.event.category, EventCategory::Mystic);
        assert_eq!(state.logs.decision.last(), Some(decision.description.as_str()));
    }

    #[test]
    fn attack_then_enemy_turn_round_trip() {
        let mut session = scripted(vec![0.0]);
        in_combat(&mut session, EnemyKind::Demon);
        let state = session.attack().unwrap();
        assert_eq!(state.enemy().map(|enemy| enemy.hp), Some(40));
        assert_eq!(state.pending, Some(PendingStep::EnemyTurn { after_item: false }));
        assert_eq!(session.attack(), Err(IntentRejection::ActionInProgress {
            pending: PendingStep::EnemyTurn { after_item: false }
        }));
        let state = session.advance().unwrap();
        assert_eq!(state.player.hp, 85);
        assert_eq!(state.player.madness, 3);
        assert!(state.is_player_turn());
    }

    #[test]
    fn item_use_requires_combat() {
        let mut session = scripted(vec![0.0, 0.2]);
        session.start_game().unwrap();
        assert!(matches!(
            session.use_item("1"),
            Err(IntentRejection::NotAvailable {
                intent: Intent::UseItem,
                phase: GamePhase::Hallway
            })
        ));
        assert_eq!(session.state().inventory.len(), 3);
    }

    #[test]
    fn item_use_consumes_turn_and_closes_inventory() {
        let mut session = scripted(vec![0.0]);
        in_combat(&mut session, EnemyKind::Skeleton);
        session.with_state_mut(|state| state.player.hp = 50);
        session.open_inventory().unwrap();
        assert_eq!(session.attack(), Err(IntentRejection::InventoryOpen));
        let state = session.use_item("1").unwrap();
        assert_eq!(state.player.hp, 80);
        assert!(!state.inventory_open);
        assert_eq!(state.inventory.len(), 2);
        assert_eq!(state.pending, Some(PendingStep::EnemyTurn { after_item: true }));
        assert_eq!(session.pending_delay(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn keys_and_unknown_items_are_rejected() {
        let mut session = scripted(vec![0.0]);
        in_combat(&mut session, EnemyKind::Skeleton);
        session.with_state_mut(|state| {
            state
                .inventory
                .push(Item::key_item("ancient_key", "Ancient Key"));
        });
        assert_eq!(
            session.use_item("ancient_key"),
            Err(IntentRejection::ItemNotUsable {
                id: "ancient_key".into()
            })
        );
        assert_eq!(
            session.use_item("nope"),
            Err(IntentRejection::UnknownItem { id: "nope".into() })
        );
    }

    #[test]
    fn regular_victory_returns_to_hallway() {
        let mut session = scripted(vec![0.999, 0.0, 0.5]);
        in_combat(&mut session, EnemyKind::Skeleton);
        session.with_state_mut(|state| {
            if let Some(combat) = state.combat.as_mut() {
                combat.enemy.hp = 10;
            }
        });
        let state = session.attack().unwrap();
        assert_eq!(
            state.pending,
            Some(PendingStep::ConcludeCombat {
                outcome: CombatOutcome::Victory
            })
        );
        let state = session.advance().unwrap();
        assert_eq!(state.phase, GamePhase::Hallway);
        assert!(state.combat.is_none());
        assert!(state.logs.combat.is_empty());
        assert_eq!(state.logs.exploration.last(), Some(MSG_COMBAT_WON));
    }

    #[test]
    fn boss_victory_wins_the_run() {
        let mut session = scripted(vec![0.0]);
        in_combat(&mut session, EnemyKind::Boss);
        session.with_state_mut(|state| {
            if let Some(combat) = state.combat.as_mut() {
                combat.enemy.hp = 1;
            }
        });
        session.attack().unwrap();
        let state = session.settle();
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(session.start_game().is_ok());
    }

    #[test]
    fn fatal_critical_on_regular_kill_ends_the_run() {
        // no whiff, minimum damage, critical self-hit
        let mut session = scripted(vec![0.999, 0.0, 0.0]);
        in_combat(&mut session, EnemyKind::Skeleton);
        session.with_state_mut(|state| {
            state.player.hp = 5;
            state.player.madness_state = MadnessState::Mad;
            if let Some(combat) = state.combat.as_mut() {
                combat.enemy.hp = 1;
            }
        });
        let state = session.attack().unwrap();
        assert_eq!(state.player.hp, 0);
        assert_eq!(
            state.pending,
            Some(PendingStep::ConcludeCombat {
                outcome: CombatOutcome::Victory
            })
        );
        let state = session.settle();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.combat.is_none());
        assert!(state.pending.is_none());
    }

    #[test]
    fn decision_applies_on_conclusion() {
        let mut session = scripted(vec![0.0]);
        let event = session.catalog().get(11).cloned().unwrap();
        session.with_state_mut(|state| {
            state.phase = GamePhase::Decision;
            state.decision = Some(DecisionEncounter::open(&event, &state.inventory));
        });
        let state = session.resolve_decision(Choice::Yes).unwrap();
        assert!(!state.inventory.contains("ancient_key"));
        assert_eq!(
            session.resolve_decision(Choice::Yes),
            Err(IntentRejection::AlreadyResolved { event_id: 11 })
        );
        let state = session.advance().unwrap();
        assert_eq!(state.phase, GamePhase::Hallway);
        assert!(state.inventory.contains("ancient_key"));
        assert!(state.logs.exploration.contains("You obtained Ancient Key!"));
    }

    #[test]
    fn lethal_decision_ends_the_run() {
        let mut session = scripted(vec![0.0]);
        let event = session.catalog().get(16).cloned().unwrap();
        session.with_state_mut(|state| {
            state.player.hp = 30;
            state.phase = GamePhase::Decision;
            state.decision = Some(DecisionEncounter::open(&event, &state.inventory));
        });
        session.resolve_decision(Choice::Yes).unwrap();
        let state = session.advance().unwrap();
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn hallway_omen_follows_each_return() {
        let mut session = scripted(vec![0.0]);
        let event = session.catalog().get(19).cloned().unwrap();
        for _ in 0..2 {
            session.with_state_mut(|state| {
                state.player.madness_state = MadnessState::Mad;
                state.phase = GamePhase::Decision;
                state.decision = Some(DecisionEncounter::open(&event, &state.inventory));
            });
            session.resolve_decision(Choice::No).unwrap();
            session.advance().unwrap();
        }
        let omens = session
            .state()
            .logs
            .exploration
            .lines()
            .filter(|line| line.contains("gone MAD"))
            .count();
        assert_eq!(omens, 2);
        assert_eq!(
            session.state().logs.exploration.last(),
            Some(crate::madness::OMEN_MAD)
        );
    }

    #[test]
    fn restart_returns_to_title() {
        let mut session = scripted(vec![0.0, 0.2]);
        session.start_game().unwrap();
        let state = session.restart();
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(session.advance(), Err(IntentRejection::NothingPending));
    }
}
