use cryptwalk_game::{
    CombatEncounter, Enemy, EnemyKind, GameRng, MadnessState, Player, PlayerAction,
    RandomSource, Turn, check_madness_threshold,
};

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn boss_fight() -> CombatEncounter {
    CombatEncounter::new(Enemy::of_kind(EnemyKind::Boss))
}

fn sample_player_damage(action: PlayerAction, state: MadnessState, seed: u64) -> Vec<i32> {
    let mut rng = GameRng::from_user_seed(seed);
    let player = Player {
        madness_state: state,
        ..Player::default()
    };
    (0..SAMPLE_SIZE)
        .map(|_| {
            let mut fight = boss_fight();
            fight
                .player_action(action, &player, &mut rng)
                .expect("player turn")
                .damage
        })
        .collect()
}

fn observed_rate(hits: usize) -> f64 {
    let hits = u32::try_from(hits).expect("count fits");
    let total = u32::try_from(SAMPLE_SIZE).expect("sample size fits u32");
    f64::from(hits) / f64::from(total)
}

#[test]
fn physical_damage_stays_in_band() {
    let damage = sample_player_damage(PlayerAction::Strike, MadnessState::Normal, 11);
    assert!(damage.iter().all(|d| (20..=34).contains(d)));
    assert!(damage.contains(&20));
    assert!(damage.contains(&34));
}

#[test]
fn spell_damage_stays_in_band() {
    let damage = sample_player_damage(PlayerAction::Spell, MadnessState::Normal, 12);
    assert!(damage.iter().all(|d| (35..=54).contains(d)));
    assert!(damage.contains(&35));
    assert!(damage.contains(&54));
}

#[test]
fn enlightened_strikes_double() {
    let damage = sample_player_damage(PlayerAction::Strike, MadnessState::Enlightened, 13);
    assert!(damage.iter().all(|d| (40..=68).contains(d) && d % 2 == 0));
}

#[test]
fn enemy_damage_stays_in_band() {
    let mut rng = GameRng::from_user_seed(14);
    let player = Player::default();
    let mut seen = Vec::with_capacity(SAMPLE_SIZE);
    for _ in 0..SAMPLE_SIZE {
        let mut fight = boss_fight();
        fight.turn = Turn::Enemy;
        let report = fight.enemy_turn(&player, &mut rng).expect("enemy turn");
        assert!((3..=6).contains(&report.madness_gain));
        seen.push(report.damage);
    }
    assert!(seen.iter().all(|d| (15..=29).contains(d)));
    assert!(seen.contains(&15));
    assert!(seen.contains(&29));
}

#[test]
fn mad_whiff_rate_tracks_twenty_percent() {
    let damage = sample_player_damage(PlayerAction::Strike, MadnessState::Mad, 15);
    let whiffs = damage.iter().filter(|d| **d == 0).count();
    let observed = observed_rate(whiffs);
    assert!(
        (observed - 0.2).abs() <= TOLERANCE,
        "whiff rate drifted: observed {observed:.4}"
    );
}

#[test]
fn enlightenment_rate_tracks_five_percent() {
    let mut rng = GameRng::from_user_seed(16);
    let at_cap = Player {
        madness: 100,
        ..Player::default()
    };
    let enlightened = (0..SAMPLE_SIZE)
        .filter(|_| {
            let (next, _) = check_madness_threshold(at_cap.clone(), &mut rng);
            next.madness_state == MadnessState::Enlightened
        })
        .count();
    let observed = observed_rate(enlightened);
    assert!(
        (observed - 0.05).abs() <= TOLERANCE,
        "enlightenment rate drifted: observed {observed:.4}"
    );
    assert_eq!(rng.draws(), u64::try_from(SAMPLE_SIZE).expect("fits"));
}

#[test]
fn seeded_sessions_replay_identically() {
    let mut a = GameRng::from_user_seed(0xC0FFEE);
    let mut b = GameRng::from_user_seed(0xC0FFEE);
    let rolls_a: Vec<i32> = (0..64).map(|_| a.spread(0, 1000)).collect();
    let rolls_b: Vec<i32> = (0..64).map(|_| b.spread(0, 1000)).collect();
    assert_eq!(rolls_a, rolls_b);
}
