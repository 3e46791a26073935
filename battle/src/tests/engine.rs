use super::*;
use crate::engine::{BattleOutcome, Phase};
use crate::error::BattleError;
use crate::events::{EngineEvent, TeamEvent, UnitEvent};

fn tester(kind: &str) -> UnitTemplate {
    let unit_type = match kind {
        "resistant" => resistant_type(),
        "weak" => weak_type(),
        _ => normal_type(),
    };
    tester_template(kind, unit_type)
}

#[test]
fn test_battle_setup() {
    let engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);
    let mechanics = engine.mechanics().unwrap();

    assert_eq!(engine.phase(), Some(Phase::Start));
    assert_eq!(mechanics.teams().len(), 2);
    assert_eq!(mechanics.team(0).unwrap().size(), 1);
    assert_eq!(mechanics.team(1).unwrap().size(), 1);

    let active = mechanics.team(0).unwrap().active().unwrap();
    assert_eq!(active.max_health.value(), 20);
    assert_eq!(active.power.value(), 10);
    assert_eq!(active.speed.value(), 12);
}

#[test]
fn test_phases_advance() {
    let mut engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);

    engine.step();
    assert_eq!(engine.phase(), Some(Phase::SelectAction));
    engine.step();
    assert_eq!(engine.phase(), Some(Phase::SelectAction));
    engine.submit_action(0, Action::Attack).unwrap();
    assert_eq!(engine.phase(), Some(Phase::Attack));
    engine.step();
    assert_eq!(engine.phase(), Some(Phase::BetweenRounds));
    engine.step();
    assert_eq!(engine.phase(), Some(Phase::SelectAction));
    assert_eq!(engine.mechanics().unwrap().round(), 2);
}

#[test]
fn test_normal_damage() {
    let mut engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);
    run_to_first_attack(&mut engine, Action::Attack);

    assert_eq!(engine.phase(), Some(Phase::BetweenRounds));
    assert_eq!(active_health(&engine, 0), Some(10));
    assert_eq!(active_health(&engine, 1), Some(10));
}

#[test]
fn test_reduced_damage() {
    let mut engine = create_engine(&[roster(&[tester("resistant")]), dummy_roster()]);
    run_to_first_attack(&mut engine, Action::Attack);

    assert_eq!(engine.phase(), Some(Phase::BetweenRounds));
    assert_eq!(active_health(&engine, 0), Some(20 - (10 - 10 / 3)));
    assert_eq!(active_health(&engine, 1), Some(10));
}

#[test]
fn test_increased_damage() {
    let mut engine = create_engine(&[roster(&[tester("weak")]), dummy_roster()]);
    run_to_first_attack(&mut engine, Action::Attack);

    assert_eq!(engine.phase(), Some(Phase::BetweenRounds));
    assert_eq!(active_health(&engine, 0), Some(20 - (10 + 10 / 2)));
    assert_eq!(active_health(&engine, 1), Some(10));
}

#[test]
fn test_logging_ability() {
    let mut engine = create_engine(&[roster(&[logger_template()]), dummy_roster()]);
    engine.step();
    assert_eq!(engine.mechanics().unwrap().handlers().len(), 1);
    let events = record(engine.mechanics_mut().unwrap().unit_events_mut());

    engine.step();
    engine.submit_action(0, Action::Attack).unwrap();
    engine.step();

    let mechanics = engine.mechanics().unwrap();
    assert_eq!(engine.phase(), Some(Phase::End));
    assert!(!mechanics.team(0).unwrap().is_alive());
    assert!(mechanics.team(0).unwrap().active().is_none());
    assert_eq!(mechanics.team(0).unwrap().grave().len(), 1);
    assert_eq!(active_health(&engine, 1), Some(10));
    assert!(mechanics.handlers().is_empty());
    assert_eq!(mechanics.unit_events().binding_count(), 0);

    let abilities = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, UnitEvent::Ability { .. }))
        .count();
    assert_eq!(abilities, 2);
}

#[test]
fn test_clockwise_rotation() {
    let team = roster(&[tester("resistant"), tester("weak"), tester("normal")]);
    let mut engine = create_engine(&[team, dummy_roster()]);
    let active_id = |engine: &BattleEngine| {
        engine.mechanics().unwrap().team(0).unwrap().active().unwrap().template_id.clone()
    };
    assert_eq!(active_id(&engine), "resistant");

    engine.step();
    engine.step();
    engine.submit_action(0, Action::RotateClock).unwrap();
    assert_eq!(engine.phase(), Some(Phase::Attack));
    assert_eq!(active_id(&engine), "normal");

    engine.step();
    assert_eq!(engine.phase(), Some(Phase::BetweenRounds));
    assert_eq!(active_health(&engine, 0), Some(10));
    assert_eq!(active_health(&engine, 1), Some(10));
}

#[test]
fn test_counter_clockwise_rotation() {
    let team = roster(&[tester("resistant"), tester("normal"), tester("weak")]);
    let mut engine = create_engine(&[team, dummy_roster()]);

    engine.step();
    engine.step();
    engine.submit(0, "rotate_counter").unwrap();

    let seated: Vec<String> = engine
        .mechanics()
        .unwrap()
        .team(0)
        .unwrap()
        .units()
        .iter()
        .map(|u| u.template_id.clone())
        .collect();
    assert_eq!(seated, vec!["normal", "weak", "resistant"]);

    engine.step();
    assert_eq!(engine.phase(), Some(Phase::BetweenRounds));
    assert_eq!(active_health(&engine, 0), Some(10));
    assert_eq!(active_health(&engine, 1), Some(10));
}

#[test]
fn test_rotation_changes_who_acts() {
    // Slow unit in front, fast one behind
    let slow = UnitTemplate::new("slow", "Slow", normal_type(), 20, 10, 5);
    let team = roster(&[slow, tester("normal")]);
    let mut engine = create_engine(&[team, dummy_roster()]);

    engine.step();
    engine.step();
    engine.submit_action(0, Action::RotateCounter).unwrap();
    let unit_events = record(engine.mechanics_mut().unwrap().unit_events_mut());
    engine.step();

    // Speed 12 now beats the dummy's 10, so team 0 strikes first
    let first_attack = unit_events
        .borrow()
        .iter()
        .find(|e| matches!(e, UnitEvent::Attack { .. }))
        .cloned();
    assert_eq!(
        first_attack,
        Some(UnitEvent::Attack {
            unit: UnitId(2),
            target: UnitId(3),
        })
    );
}

#[test]
fn test_rotation_events() {
    let team = roster(&[tester("resistant"), tester("weak")]);
    let mut engine = create_engine(&[team, dummy_roster()]);
    engine.step();
    engine.step();
    let mechanics = engine.mechanics_mut().unwrap();
    let team_events = record(mechanics.team_events_mut());
    let unit_events = record(mechanics.unit_events_mut());

    engine.submit_action(0, Action::RotateClock).unwrap();

    assert_eq!(
        *team_events.borrow(),
        vec![
            TeamEvent::Rotate {
                team: 0,
                active: UnitId(2),
                previous: UnitId(1),
            },
            TeamEvent::RotateRight {
                team: 0,
                active: UnitId(2),
                previous: UnitId(1),
            },
        ]
    );
    assert_eq!(
        *unit_events.borrow(),
        vec![
            UnitEvent::RotateOut { unit: UnitId(1) },
            UnitEvent::RotateIn { unit: UnitId(2) },
        ]
    );
}

#[test]
fn test_single_unit_rotation_is_harmless() {
    let mut engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);
    engine.step();
    engine.step();

    engine.submit_action(0, Action::RotateClock).unwrap();

    assert_eq!(engine.phase(), Some(Phase::Attack));
    assert_eq!(engine.mechanics().unwrap().team(0).unwrap().size(), 1);
}

#[test]
fn test_invalid_actions_are_rejected() {
    let mut engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);

    assert_eq!(
        engine.submit_action(0, Action::Attack),
        Err(BattleError::WrongPhase {
            phase: Phase::Start
        })
    );
    engine.step();
    engine.step();

    assert_eq!(
        engine.submit(0, "dance"),
        Err(BattleError::UnknownAction {
            name: "dance".into()
        })
    );
    assert_eq!(
        engine.submit_action(5, Action::Attack),
        Err(BattleError::InvalidTeam { index: 5 })
    );
    assert_eq!(engine.phase(), Some(Phase::SelectAction));

    // Still waiting, a valid action goes through
    assert!(engine.submit(0, "attack").is_ok());
    assert_eq!(engine.phase(), Some(Phase::Attack));
}

#[test]
fn test_no_battle() {
    let mut engine = BattleEngine::new(1);
    engine.step();

    assert_eq!(engine.phase(), None);
    assert_eq!(
        engine.submit_action(0, Action::Attack),
        Err(BattleError::NoBattle)
    );
    assert!(engine.snapshot().teams.is_empty());
}

#[test]
fn test_surrender_ends_battle() {
    let mut engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);
    let events = record(engine.events_mut());
    engine.step();
    engine.step();

    engine.submit_action(1, Action::Surrender).unwrap();
    assert_eq!(engine.phase(), Some(Phase::End));
    assert_eq!(engine.outcome(), Some(&BattleOutcome::Surrender { team: 1 }));

    engine.step();
    engine.step();
    let ends = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, EngineEvent::BattleEnd { .. }))
        .count();
    assert_eq!(ends, 1);
    assert_eq!(
        events.borrow().last(),
        Some(&EngineEvent::EndPhase { phase: Phase::End })
    );
    // Untouched by the surrender
    assert_eq!(active_health(&engine, 0), Some(20));
}

#[test]
fn test_victory_outcome() {
    let mut engine = create_engine(&[roster(&[logger_template()]), dummy_roster()]);
    run_to_first_attack(&mut engine, Action::Attack);
    engine.step();

    assert_eq!(engine.outcome(), Some(&BattleOutcome::Victory { team: 1 }));
}

#[test]
fn test_draw_outcome() {
    // The dummy takes the glass unit down with it as it dies
    let spite = Ability::new("spite", "Spite").with_effect(
        AbilityEffect::new(Mechanic::Damage, crate::targeting::TargetKeyword::Opponent)
            .on("self death")
            .unwrap()
            .with_amount(10),
    );
    let glass = UnitTemplate::new("glass", "Glass", normal_type(), 5, 10, 12);
    let mut dummy = UnitInstance::new(dummy_template()).with_ability(spite);
    dummy.health = Some(5);
    let mut engine = create_engine(&[roster(&[glass]), vec![dummy]]);

    run_to_first_attack(&mut engine, Action::Attack);

    assert_eq!(engine.phase(), Some(Phase::End));
    assert_eq!(engine.outcome(), Some(&BattleOutcome::Draw));
}

#[test]
fn test_engine_event_sequence() {
    let mut engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);
    let events = record(engine.events_mut());

    run_to_first_attack(&mut engine, Action::Attack);

    let kinds: Vec<&str> = events
        .borrow()
        .iter()
        .map(|e| match e {
            EngineEvent::BattleStart => "battle_start",
            EngineEvent::BattleSelectAction => "battle_select_action",
            EngineEvent::BattleAttack => "battle_attack",
            EngineEvent::BattleBetweenRounds => "battle_between_rounds",
            EngineEvent::BattleEnd { .. } => "battle_end",
            EngineEvent::RequestInput => "request_input",
            EngineEvent::EndPhase { .. } => "end_phase",
            EngineEvent::Attack { .. } => "attack",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "battle_start",
            "end_phase",
            "battle_select_action",
            "request_input",
            "end_phase",
            "battle_attack",
            "attack",
            "attack",
            "end_phase",
        ]
    );

    let events = events.borrow();
    let EngineEvent::Attack { unit, target } = &events[6] else {
        panic!("expected attack snapshot");
    };
    assert_eq!(unit.template_id, "normal");
    assert_eq!(target.health, 10);
}

#[test]
fn test_roster_announced_on_start() {
    let mut engine = create_engine(&[roster(&[tester("normal"), tester("weak")]), dummy_roster()]);
    let team_events = record(engine.mechanics_mut().unwrap().team_events_mut());

    engine.step();

    assert_eq!(
        *team_events.borrow(),
        vec![
            TeamEvent::Add { team: 0, unit: UnitId(1) },
            TeamEvent::Add { team: 0, unit: UnitId(2) },
            TeamEvent::Add { team: 1, unit: UnitId(3) },
        ]
    );
}

#[test]
fn test_snapshot_view() {
    let mut engine = create_engine(&[roster(&[tester("normal")]), dummy_roster()]);
    run_to_first_attack(&mut engine, Action::Attack);

    let view = engine.snapshot();
    assert_eq!(view.phase, Some(Phase::BetweenRounds));
    assert_eq!(view.round, 1);
    assert_eq!(view.teams.len(), 2);
    assert_eq!(view.teams[1].units[0].health, 10);
    assert_eq!(view.teams[1].units[0].unit_type, "dummy");

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["phase"], "between_rounds");
    assert_eq!(json["teams"][0]["units"][0]["maxHealth"], 20);
}

#[test]
fn test_full_battle_terminates() {
    let mut engine = create_engine(&[
        roster(&[tester("normal"), tester("weak")]),
        roster(&[dummy_template(), dummy_template()]),
    ]);

    for _ in 0..100 {
        if engine.phase() == Some(Phase::End) {
            break;
        }
        if engine.phase() == Some(Phase::SelectAction) {
            engine.submit_action(0, Action::Attack).unwrap();
        } else {
            engine.step();
        }
    }
    engine.step();

    assert_eq!(engine.phase(), Some(Phase::End));
    assert!(engine.outcome().is_some());
    assert!(engine.mechanics().unwrap().battle_over());
}
