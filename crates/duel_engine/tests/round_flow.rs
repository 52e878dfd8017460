//! Round-flow integration tests.
//!
//! These drive whole rounds through the public API the way a presentation
//! shell would: select, begin, then advance the timeline page by page.

use duel_engine::{
    Battle, BattleObserver, BattleOutcome, Combatant, CombatantId, CombatantSnapshot,
    DefaultMessages, MoveCatalog, MoveId, NullObserver, RoundPhase, RulesConfig, SequenceSource,
    Side, SmallRngSource,
};

fn snapshot(id: u16, speed: i32, health: i32, moves: [Option<MoveId>; 4]) -> CombatantSnapshot {
    CombatantSnapshot {
        id: CombatantId(id),
        level: 5,
        max_health: 50,
        health,
        attack: 10,
        defense: 5,
        speed,
        max_energy: 20,
        energy: 20,
        moves,
    }
}

fn battle(
    player: CombatantSnapshot,
    opponent: CombatantSnapshot,
    draws: impl IntoIterator<Item = f64>,
) -> Battle {
    Battle::from_snapshots(
        &player,
        &opponent,
        MoveCatalog::new(),
        RulesConfig::default(),
        Box::new(DefaultMessages::new()),
        Box::new(SequenceSource::new(draws, 0.99)),
    )
    .unwrap()
}

/// Drain the current script, collecting page texts.
fn drain(b: &mut Battle, obs: &mut dyn BattleObserver) -> Vec<String> {
    let mut texts = Vec::new();
    while let Some(page) = b.advance(obs) {
        texts.push(page.text.clone());
    }
    texts
}

#[test]
fn lethal_first_action_truncates_the_round() {
    let attacker = [Some(MoveId::Slash), None, None, None];
    // Opponent is one hit from death and slower.
    let mut b = battle(
        snapshot(1, 10, 50, attacker),
        snapshot(2, 5, 1, attacker),
        // Player accuracy pass, crit fail.
        [0.0, 0.99],
    );
    b.select_move(Side::Player, 0);
    b.select_move(Side::Opponent, 0);
    b.begin_round();

    let texts = drain(&mut b, &mut NullObserver);

    // The opponent's queued action never opened; a terminal blank page
    // closed the action phase instead.
    assert!(!texts.iter().any(|t| t.contains("Unit 2 used")));
    assert!(texts.iter().any(|t| t.is_empty()));
    assert_eq!(b.combatant(Side::Player).health, 50);
    assert_eq!(b.outcome(), Some(BattleOutcome::Victory));
    assert_eq!(b.phase(), RoundPhase::BattleEnded);
}

#[test]
fn shield_blocks_the_slower_attacker() {
    let mut b = battle(
        snapshot(1, 5, 50, [Some(MoveId::Guard), None, None, None]),
        snapshot(2, 10, 50, [Some(MoveId::Slash), None, None, None]),
        // Guard success draw, then opponent accuracy pass and crit fail.
        [0.0, 0.0, 0.99],
    );
    b.select_move(Side::Player, 0);
    b.select_move(Side::Opponent, 0);
    b.begin_round();

    // Shield priority outranks raw speed.
    assert_eq!(b.round_context().first_mover, Side::Player);

    let texts = drain(&mut b, &mut NullObserver);
    assert!(texts.iter().any(|t| t.contains("braced behind a shield")));
    assert!(texts.iter().any(|t| t.contains("absorbed the blow")));
    assert_eq!(b.combatant(Side::Player).health, 50);
    assert_eq!(b.phase(), RoundPhase::Selecting);

    // The shield expires with the round.
    assert!(b.combatant(Side::Player).vulnerable);
}

#[test]
fn burn_ticks_after_the_action_phase() {
    let mut b = battle(
        snapshot(1, 10, 50, [Some(MoveId::Scorch), None, None, None]),
        snapshot(2, 5, 50, [Some(MoveId::Slash), None, None, None]),
        // Player: accuracy, crit fail, burn infliction pass.
        // Opponent: accuracy, crit fail.
        [0.0, 0.99, 0.1, 0.0, 0.99],
    );
    b.select_move(Side::Player, 0);
    b.select_move(Side::Opponent, 0);
    b.begin_round();

    let texts = drain(&mut b, &mut NullObserver);

    assert!(texts.iter().any(|t| t.contains("was burned")));
    assert!(texts.iter().any(|t| t.contains("hurt by its burn")));
    // Scorch dealt 13, then the burn tick took 3 (50/16 rounded, min 1).
    assert_eq!(b.combatant(Side::Opponent).health, 34);
    assert_eq!(b.combatant(Side::Player).health, 35);
    assert_eq!(b.phase(), RoundPhase::Selecting);
    assert_eq!(b.round(), 1);
}

#[test]
fn fleeing_hands_control_back_to_the_overworld() {
    struct ExitRecorder {
        exited: bool,
    }
    impl BattleObserver for ExitRecorder {
        fn exit_to_overworld(&mut self) {
            self.exited = true;
        }
    }

    let mut b = battle(
        snapshot(1, 10, 50, [Some(MoveId::Retreat), None, None, None]),
        snapshot(2, 5, 50, [Some(MoveId::Slash), None, None, None]),
        // Flee draw passes.
        [0.2],
    );
    b.select_move(Side::Player, 0);
    b.select_move(Side::Opponent, 0);
    b.begin_round();

    let mut obs = ExitRecorder { exited: false };
    let texts = drain(&mut b, &mut obs);

    assert!(texts.iter().any(|t| t.contains("Got away safely")));
    assert!(obs.exited);
    assert_eq!(b.outcome(), Some(BattleOutcome::Fled));
    // The opponent never got to act.
    assert_eq!(b.combatant(Side::Player).health, 50);
    assert!(b.timeline().is_empty());
}

#[test]
fn battles_with_a_real_rng_reach_an_outcome() {
    let moves = [Some(MoveId::Slash), Some(MoveId::Recharge), None, None];
    let mut b = Battle::from_snapshots(
        &snapshot(1, 10, 50, moves),
        &snapshot(2, 9, 50, moves),
        MoveCatalog::new(),
        RulesConfig::default(),
        Box::new(DefaultMessages::new()),
        Box::new(SmallRngSource::seeded(42)),
    )
    .unwrap();

    // Shell policy: attack while the energy lasts, recharge otherwise.
    for _ in 0..100 {
        for side in [Side::Player, Side::Opponent] {
            let slot = if b.move_usable(side, 0) { 0 } else { 1 };
            assert!(b.select_move(side, slot));
        }
        b.begin_round();
        drain(&mut b, &mut NullObserver);
        if b.phase() == RoundPhase::BattleEnded {
            break;
        }
        assert_eq!(b.phase(), RoundPhase::Selecting);
    }

    assert!(matches!(
        b.outcome(),
        Some(BattleOutcome::Victory) | Some(BattleOutcome::Defeat)
    ));
}

#[test]
fn snapshots_survive_a_battle_round_trip() {
    let player = snapshot(7, 10, 33, [Some(MoveId::Slash), Some(MoveId::Mend), None, None]);
    let opponent = snapshot(8, 5, 50, [Some(MoveId::Slash), None, None, None]);
    let b = battle(player.clone(), opponent, []);

    let (back, _) = b.into_snapshots();
    assert_eq!(back.health, player.health);
    assert_eq!(back.energy, player.energy);
    assert_eq!(back.moves, player.moves);

    // And the persisted form itself round-trips through serde.
    let json = serde_json::to_string(&back).unwrap();
    let parsed: CombatantSnapshot = serde_json::from_str(&json).unwrap();
    let restored = Combatant::from_snapshot(&parsed).unwrap();
    assert_eq!(restored.health, 33);
    assert_eq!(restored.equipped[1], Some(MoveId::Mend));
}
