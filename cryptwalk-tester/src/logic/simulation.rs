use cryptwalk_game::{
    DecisionCatalog, GameConfig, GamePhase, GameRng, GameSession, GameState, IntentResult, Player,
    PlayerAction,
};
use serde::Serialize;

use crate::logic::policy::{CombatMove, GameplayStrategy, PlayerPolicy};

/// Configuration for a single headless run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_steps: u32,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_steps: 2_000,
        }
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Victory,
    Defeat,
    /// Step budget ran out before the game ended.
    Stalled,
}

impl RunOutcome {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Stalled => "stalled",
        }
    }
}

/// Everything worth reporting about one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub strategy: String,
    pub outcome: RunOutcome,
    pub steps: u32,
    pub events: u32,
    pub combats_won: u32,
    pub decisions: u32,
    pub madness_transitions: u32,
    pub boss_spawned: bool,
    pub final_player: Player,
    pub violations: Vec<String>,
}

impl RunRecord {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Drives a [`GameSession`] with a policy until the game ends.
pub struct SimulationSession {
    session: GameSession,
    config: SimulationConfig,
    steps: u32,
    combats_won: u32,
    decisions: u32,
    violations: Vec<String>,
}

impl SimulationSession {
    #[must_use]
    pub fn new(game_config: GameConfig, catalog: DecisionCatalog, config: SimulationConfig) -> Self {
        let session =
            GameSession::with_rng(game_config, catalog, GameRng::from_user_seed(config.seed));
        Self {
            session,
            config,
            steps: 0,
            combats_won: 0,
            decisions: 0,
            violations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        self.session.state()
    }

    /// Play until victory, defeat or the step budget.
    pub fn run(mut self, policy: &mut dyn PlayerPolicy) -> RunRecord {
        if let Err(err) = self.session.start_game() {
            self.violations.push(format!("start rejected: {err}"));
        }
        while !self.state().is_over() && self.steps < self.config.max_steps {
            self.steps += 1;
            self.drain_pending();
            if self.state().is_over() {
                break;
            }
            self.take_turn(policy);
            self.check_invariants();
        }
        self.drain_pending();
        self.finish()
    }

    fn drain_pending(&mut self) {
        while self.state().pending.is_some() {
            let phase = self.state().phase;
            let in_combat = self.state().combat.is_some();
            let result = self.session.advance();
            if let Ok(state) = &result
                && in_combat
                && phase == GamePhase::Combat
                && state.combat.is_none()
                && !state.player.is_dead()
            {
                self.combats_won += 1;
            }
            self.record(result, "advance");
            self.check_invariants();
        }
    }

    fn take_turn(&mut self, policy: &mut dyn PlayerPolicy) {
        let state = self.state().clone();
        let result = match state.phase {
            GamePhase::Hallway => {
                let direction = policy.pick_direction(&state);
                log::debug!("{} heads {}", policy.name(), direction.key());
                self.session.choose_direction(direction)
            }
            GamePhase::Combat => match policy.pick_combat_move(&state) {
                CombatMove::Act(action) => {
                    let result = match action {
                        PlayerAction::Strike => self.session.attack(),
                        PlayerAction::Spell => self.session.cast_spell(),
                    };
                    // a refused move falls back to a plain strike
                    if result.is_err() {
                        self.session.attack()
                    } else {
                        result
                    }
                }
                CombatMove::UseItem(id) => {
                    let result = self.session.use_item(&id);
                    if result.is_err() {
                        self.session.attack()
                    } else {
                        result
                    }
                }
            },
            GamePhase::Decision => match state.decision.as_ref() {
                Some(decision) => {
                    let choice = policy.pick_choice(&state, decision);
                    log::debug!(
                        "{} answers {} to event {}",
                        policy.name(),
                        choice.key(),
                        decision.event.id
                    );
                    self.decisions += 1;
                    self.session.resolve_decision(choice)
                }
                None => {
                    self.violations
                        .push("decision phase without an open event".to_string());
                    return;
                }
            },
            GamePhase::Start | GamePhase::GameOver | GamePhase::Victory => return,
        };
        self.record(result, state.phase.key());
    }

    fn record(&mut self, result: IntentResult, context: &str) {
        if let Err(err) = result {
            self.violations
                .push(format!("step {}: {context} rejected: {err}", self.steps));
        }
    }

    fn check_invariants(&mut self) {
        let state = self.session.state();
        let mut broken = Vec::new();
        if !state.player.within_bounds() {
            broken.push(format!("player out of bounds: {:?}", state.player));
        }
        if state.phase == GamePhase::Combat && state.combat.is_none() {
            broken.push("combat phase without an encounter".to_string());
        }
        if state.pending.is_none() && state.player.is_dead() && !state.is_over() {
            broken.push(format!("dead player left in {}", state.phase));
        }
        for line in broken {
            self.violations.push(format!("step {}: {line}", self.steps));
        }
    }

    fn finish(self) -> RunRecord {
        let state = self.session.into_state();
        let outcome = match state.phase {
            GamePhase::Victory => RunOutcome::Victory,
            GamePhase::GameOver => RunOutcome::Defeat,
            _ => RunOutcome::Stalled,
        };
        RunRecord {
            seed: self.config.seed,
            strategy: self.config.strategy.key().to_string(),
            outcome,
            steps: self.steps,
            events: state.event_count,
            combats_won: self.combats_won,
            decisions: self.decisions,
            madness_transitions: state.madness_transitions,
            boss_spawned: state.boss_spawned,
            final_player: state.player,
            violations: self.violations,
        }
    }
}

/// Play one full game headlessly.
#[must_use]
pub fn run_simulation(
    game_config: &GameConfig,
    catalog: &DecisionCatalog,
    config: SimulationConfig,
) -> RunRecord {
    let mut policy = config.strategy.create_policy(config.seed);
    let session = SimulationSession::new(game_config.clone(), catalog.clone(), config);
    let record = session.run(policy.as_mut());
    log::info!(
        "seed {} with {} ended in {} after {} steps",
        record.seed,
        config.strategy,
        record.outcome.label(),
        record.steps
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_boss_config() -> GameConfig {
        GameConfig::from_json(
            r#"{"progression": {"boss_event_threshold": 1, "boss_spawn_chance": 1.0}}"#,
        )
        .expect("config")
    }

    #[test]
    fn every_strategy_finishes_cleanly() {
        let catalog = DecisionCatalog::default_catalog();
        for strategy in GameplayStrategy::ALL {
            for seed in [1, 42, 1337] {
                let record = run_simulation(
                    &GameConfig::default(),
                    catalog,
                    SimulationConfig::new(strategy, seed).with_max_steps(400),
                );
                assert!(record.is_clean(), "{strategy} seed {seed}: {:?}", record.violations);
                assert!(record.final_player.within_bounds());
                assert!(record.steps <= 400);
            }
        }
    }

    #[test]
    fn runs_are_reproducible() {
        let catalog = DecisionCatalog::default_catalog();
        let config = SimulationConfig::new(GameplayStrategy::Random, 99).with_max_steps(300);
        let a = run_simulation(&GameConfig::default(), catalog, config);
        let b = run_simulation(&GameConfig::default(), catalog, config);
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.steps, b.steps);
        assert_eq!(a.events, b.events);
        assert_eq!(a.final_player, b.final_player);
    }

    #[test]
    fn forced_boss_ends_the_run() {
        let catalog = DecisionCatalog::default_catalog();
        let record = run_simulation(
            &quick_boss_config(),
            catalog,
            SimulationConfig::new(GameplayStrategy::Reckless, 5),
        );
        assert!(record.boss_spawned);
        assert_eq!(record.events, 1);
        assert_ne!(record.outcome, RunOutcome::Stalled);
    }

    #[test]
    fn tiny_budget_stalls() {
        let catalog = DecisionCatalog::default_catalog();
        let record = run_simulation(
            &GameConfig::default(),
            catalog,
            SimulationConfig::new(GameplayStrategy::Cautious, 3).with_max_steps(1),
        );
        assert_eq!(record.outcome, RunOutcome::Stalled);
        assert_eq!(record.steps, 1);
    }
}
