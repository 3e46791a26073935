mod attributes;
mod engine;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::channel::EventChannel;
use crate::engine::{Action, BattleEngine};
use crate::events::Event;
use crate::mechanics::BattleMechanics;
use crate::rng::{BattleRng, XorShiftRng};
use crate::team::Team;
use crate::types::*;
use crate::unit::{Unit, UnitId};

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

fn dummy_type() -> UnitType {
    UnitType::new("dummy", "Dummy Type")
}

fn normal_type() -> UnitType {
    UnitType::new("normal", "Normal")
}

fn resistant_type() -> UnitType {
    UnitType::new("resistant", "Resistant").resisting("dummy")
}

fn weak_type() -> UnitType {
    UnitType::new("weak", "Weak").weak_to("dummy")
}

/// 20 health, 10 power, 10 speed
fn dummy_template() -> UnitTemplate {
    UnitTemplate::new("dummy", "Target Dummy", dummy_type(), 20, 10, 10)
}

/// 20 health, 10 power, 12 speed
fn tester_template(id: &str, unit_type: UnitType) -> UnitTemplate {
    UnitTemplate::new(id, "Tester", unit_type, 20, 10, 12)
}

fn log_ability() -> Ability {
    Ability::new("log", "Log Ability").with_effect(
        AbilityEffect::new(Mechanic::Log, crate::targeting::TargetKeyword::SelfUnit)
            .on("self attack")
            .unwrap()
            .on("opponent defend")
            .unwrap(),
    )
}

/// 10 health, 10 power, 12 speed, logs when it attacks or its opponent defends
fn logger_template() -> UnitTemplate {
    UnitTemplate::new("logger", "Logger", normal_type(), 10, 10, 12).with_ability(log_ability())
}

fn create_dummy_unit(id: u32, name: &str, health: i32, power: i32, speed: i32) -> Unit {
    let template = UnitTemplate::new(name, name, dummy_type(), health, power, speed);
    Unit::from_instance(UnitId(id), &UnitInstance::new(template))
}

/// A team seating one fresh unit per name, with ids starting at `first_id`
fn create_team(index: usize, first_id: u32, names: &[&str]) -> Team {
    let mut team = Team::new(index, crate::team::TEAM_CAPACITY);
    for (offset, name) in names.iter().enumerate() {
        team.add_unit(create_dummy_unit(first_id + offset as u32, name, 20, 10, 10))
            .unwrap();
    }
    team
}

fn names(team: &Team) -> Vec<&str> {
    team.units().iter().map(|unit| unit.name.as_str()).collect()
}

fn roster(templates: &[UnitTemplate]) -> Vec<UnitInstance> {
    templates.iter().cloned().map(UnitInstance::new).collect()
}

fn create_mechanics(rosters: &[Vec<UnitInstance>]) -> BattleMechanics {
    let mut mechanics = BattleMechanics::new(Box::new(XorShiftRng::seed_from_u64(42)));
    for roster in rosters {
        mechanics.make_team(roster).unwrap();
    }
    mechanics
}

fn create_engine(rosters: &[Vec<UnitInstance>]) -> BattleEngine {
    let mut engine = BattleEngine::new(42);
    engine.set_battle(rosters).unwrap();
    engine
}

/// start -> select_action -> (team 0 submits) -> attack
fn run_to_first_attack(engine: &mut BattleEngine, action: Action) {
    engine.step();
    engine.step();
    engine.submit_action(0, action).unwrap();
    engine.step();
}

fn active_health(engine: &BattleEngine, team: usize) -> Option<i32> {
    engine
        .mechanics()
        .and_then(|m| m.team(team))
        .and_then(|t| t.active())
        .map(|u| u.health())
}

/// Subscribe to every event of a channel and keep a copy of each
fn record<E: Event + Clone + 'static>(channel: &mut EventChannel<E>) -> Rc<RefCell<Vec<E>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    channel.subscribe_all(move |event: &E| sink.borrow_mut().push(event.clone()));
    log
}

/// RNG replaying a fixed list of coin flips, then always tails
struct ScriptedRng {
    flips: Vec<bool>,
}

impl ScriptedRng {
    fn new(flips: &[bool]) -> Box<Self> {
        let mut flips = flips.to_vec();
        flips.reverse();
        Box::new(Self { flips })
    }
}

impl BattleRng for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        u32::from(self.flips.pop().unwrap_or(false))
    }
}

fn scripted_mechanics(rosters: &[Vec<UnitInstance>], flips: &[bool]) -> BattleMechanics {
    let mut mechanics = BattleMechanics::new(ScriptedRng::new(flips));
    for roster in rosters {
        mechanics.make_team(roster).unwrap();
    }
    mechanics
}

fn dummy_roster() -> Vec<UnitInstance> {
    vec![UnitInstance::new(dummy_template())]
}
