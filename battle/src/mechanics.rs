//! Battle mechanics: teams, turn order, attacks and event dispatch.
//!
//! Every state change goes through a method here so that the matching event
//! is published. Publication is synchronous and depth first: a handler that
//! reacts to an event runs to completion, including anything it triggers,
//! before the next subscriber sees the original event.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::channel::{BindingRef, Delivery, EventChannel};
use crate::effects::{EffectHandler, HandlerId, Trigger};
use crate::error::BattleResult;
use crate::events::{Event, MechanicsEvent, TeamEvent, UnitEvent};
use crate::limits::BattleLimits;
use crate::rng::BattleRng;
use crate::team::{Rotation, Team, TEAM_CAPACITY};
use crate::types::{EventSpec, UnitInstance, UnitTypeId};
use crate::unit::{Unit, UnitId};

/// Outcome of a single attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReport {
    pub attacker: UnitId,
    pub defender: UnitId,
    /// Damage the defender took after its type multiplier
    pub damage: i32,
}

pub struct BattleMechanics {
    teams: Vec<Team>,
    turn: usize,
    round: u32,
    handlers: Vec<EffectHandler>,
    unit_events: EventChannel<UnitEvent>,
    team_events: EventChannel<TeamEvent>,
    events: EventChannel<MechanicsEvent>,
    limits: BattleLimits,
    rng: Box<dyn BattleRng>,
    next_handler: u32,
}

impl BattleMechanics {
    pub fn new(rng: Box<dyn BattleRng>) -> Self {
        Self {
            teams: Vec::new(),
            turn: 0,
            round: 1,
            handlers: Vec::new(),
            unit_events: EventChannel::new(),
            team_events: EventChannel::new(),
            events: EventChannel::new(),
            limits: BattleLimits::new(),
            rng,
            next_handler: 0,
        }
    }

    // ==========================================
    // STATE
    // ==========================================

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, index: usize) -> Option<&Team> {
        self.teams.get(index)
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Live effect handlers, in creation order
    pub fn handlers(&self) -> &[EffectHandler] {
        &self.handlers
    }

    pub fn limits(&self) -> &BattleLimits {
        &self.limits
    }

    pub fn limits_mut(&mut self) -> &mut BattleLimits {
        &mut self.limits
    }

    pub fn unit_events(&self) -> &EventChannel<UnitEvent> {
        &self.unit_events
    }

    pub fn unit_events_mut(&mut self) -> &mut EventChannel<UnitEvent> {
        &mut self.unit_events
    }

    pub fn team_events(&self) -> &EventChannel<TeamEvent> {
        &self.team_events
    }

    pub fn team_events_mut(&mut self) -> &mut EventChannel<TeamEvent> {
        &mut self.team_events
    }

    pub fn events(&self) -> &EventChannel<MechanicsEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventChannel<MechanicsEvent> {
        &mut self.events
    }

    /// Seated unit by id
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.teams.iter().find_map(|team| team.unit(id))
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.teams.iter_mut().find_map(|team| team.unit_mut(id))
    }

    /// Fewer than two teams have anyone seated
    pub fn battle_over(&self) -> bool {
        self.teams.iter().filter(|team| team.is_alive()).count() < 2
    }

    /// The team after `turn` that still has a seated unit
    pub fn next_team(&self) -> usize {
        let count = self.teams.len();
        if count == 0 {
            return 0;
        }
        (1..count)
            .map(|offset| (self.turn + offset) % count)
            .find(|index| self.teams[*index].is_alive())
            .unwrap_or((self.turn + 1) % count)
    }

    pub fn attacker(&self) -> Option<&Unit> {
        self.teams.get(self.turn)?.active()
    }

    pub fn defender(&self) -> Option<&Unit> {
        self.teams.get(self.next_team())?.active()
    }

    // ==========================================
    // SETUP
    // ==========================================

    /// Seat a roster as a new team. Returns the team index.
    ///
    /// Abilities are validated up front. Entries past the team capacity are
    /// dropped with a warning.
    pub fn make_team(&mut self, roster: &[UnitInstance]) -> BattleResult<usize> {
        for instance in roster {
            if let Some(ability) = instance.ability() {
                ability.validate()?;
            }
        }

        let index = self.teams.len();
        let mut team = Team::new(index, TEAM_CAPACITY);
        for instance in roster {
            let unit = Unit::from_instance(self.limits.generate_instance_id(), instance);
            if let Err(err) = team.add_unit(unit) {
                log::warn!(
                    "team {}: dropping {} of {} roster entries: {}",
                    index,
                    roster.len() - team.size(),
                    roster.len(),
                    err
                );
                break;
            }
        }
        log::debug!("team {} seated with {} units", index, team.size());
        self.teams.push(team);
        Ok(index)
    }

    /// Build and bind one handler per effect of every living unit's ability
    pub fn create_handlers(&mut self) {
        let mut created = Vec::new();
        for team in &self.teams {
            for unit in team.units().iter().filter(|unit| unit.is_alive()) {
                let Some(ability) = &unit.ability else {
                    continue;
                };
                for effect in &ability.effects {
                    let id = HandlerId(self.next_handler);
                    self.next_handler += 1;
                    created.push(EffectHandler::new(id, &self.teams, unit, ability, effect));
                }
            }
        }

        for mut handler in created {
            self.bind_handler(&mut handler);
            self.handlers.push(handler);
        }
    }

    fn bind_handler(&mut self, handler: &mut EffectHandler) {
        for (slot, binding) in handler.bindings.iter_mut().enumerate() {
            let reference = BindingRef {
                handler: handler.id,
                slot,
            };
            let subscription = match binding.spec {
                EventSpec::Mechanics(kind) => self.events.bind(kind, reference),
                EventSpec::Team { kind, .. } => self.team_events.bind(kind, reference),
                EventSpec::Unit { kind, .. } => self.unit_events.bind(kind, reference),
            };
            binding.subscription = Some(subscription);
        }
        log::debug!(
            "bound {:?} of {} ({}) to {} events",
            handler.id,
            handler.owner,
            handler.ability,
            handler.bindings.len()
        );
    }

    /// Unsubscribe and drop every handler owned by `owner`
    fn remove_handlers(&mut self, owner: UnitId) {
        let (removed, kept): (Vec<_>, Vec<_>) = core::mem::take(&mut self.handlers)
            .into_iter()
            .partition(|handler| handler.owner == owner);
        self.handlers = kept;

        for handler in removed {
            for binding in &handler.bindings {
                let Some(subscription) = binding.subscription else {
                    continue;
                };
                match binding.spec {
                    EventSpec::Mechanics(_) => self.events.unsubscribe(subscription),
                    EventSpec::Team { .. } => self.team_events.unsubscribe(subscription),
                    EventSpec::Unit { .. } => self.unit_events.unsubscribe(subscription),
                };
            }
            log::debug!("removed {:?} of {}", handler.id, owner);
        }
    }

    /// Announce every seated unit: team `add`, then unit `spawn`
    pub fn announce_roster(&mut self) {
        let seated: Vec<(usize, UnitId)> = self
            .teams
            .iter()
            .flat_map(|team| team.units().iter().map(move |unit| (team.index, unit.id)))
            .collect();
        for (team, unit) in seated {
            self.publish_team(TeamEvent::Add { team, unit });
            self.publish_unit(UnitEvent::Spawn { unit });
        }
    }

    // ==========================================
    // TURNS AND ROUNDS
    // ==========================================

    /// Give the turn to the team whose active unit is fastest.
    ///
    /// Ties are broken while scanning: each later team that matches the
    /// current best takes the turn on a coin flip.
    pub fn calculate_turn(&mut self) {
        let mut best = 0;
        for (index, team) in self.teams.iter().enumerate() {
            let Some(active) = team.active() else {
                continue;
            };
            let speed = active.speed.value();
            if speed > best {
                best = speed;
                self.turn = index;
            } else if speed == best && self.rng.coin_flip() {
                self.turn = index;
            }
        }
        log::debug!("turn {} (speed {})", self.turn, best);
    }

    /// Hand the turn to the next team without looking at speed
    pub fn flip_turn(&mut self) {
        self.turn = self.next_team();
    }

    /// Hook for time based effects, run once between rounds
    pub fn tick(&mut self) {}

    pub fn next_round(&mut self) {
        self.round += 1;
        log::debug!("round {}", self.round);
        self.publish_mechanics(MechanicsEvent::Round { round: self.round });
    }

    // ==========================================
    // ACTIONS
    // ==========================================

    /// The current team's active unit attacks the next team's active unit
    pub fn attack(&mut self) -> Option<AttackReport> {
        let attacker = self.attacker()?;
        let (attacker, power, unit_type) = (
            attacker.id,
            attacker.power.value(),
            attacker.unit_type.id.clone(),
        );
        let defender = self.defender()?.id;
        if attacker == defender {
            return None;
        }

        self.publish_unit(UnitEvent::Attack {
            unit: attacker,
            target: defender,
        });
        self.publish_unit(UnitEvent::Defend {
            unit: defender,
            target: attacker,
        });
        let damage = self.damage_unit(defender, power, Some(&unit_type));
        if damage > 0 {
            self.publish_unit(UnitEvent::PostAttack {
                unit: attacker,
                target: defender,
                damage,
            });
        }

        Some(AttackReport {
            attacker,
            defender,
            damage,
        })
    }

    /// Damage a seated unit and announce it. `attacking` selects the type
    /// multiplier; `None` subtracts `amount` as is.
    ///
    /// Returns the damage dealt. Dead units are ignored.
    pub fn damage_unit(&mut self, id: UnitId, amount: i32, attacking: Option<&UnitTypeId>) -> i32 {
        let Some(unit) = self.unit_mut(id) else {
            return 0;
        };
        if !unit.is_alive() {
            return 0;
        }
        let dealt = unit.damage(amount.max(0), attacking);
        let killed = !unit.is_alive();

        self.publish_unit(UnitEvent::Damage {
            unit: id,
            amount: dealt,
            unit_type: attacking.cloned(),
        });
        if killed && self.unit(id).is_some_and(|unit| !unit.is_alive()) {
            self.publish_unit(UnitEvent::Death { unit: id });
        }
        dealt
    }

    /// Heal a living seated unit and announce it
    pub fn heal_unit(&mut self, id: UnitId, amount: i32, source: Option<UnitId>) {
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        if !unit.is_alive() {
            return;
        }
        let amount = amount.max(0);
        unit.heal(amount);
        self.publish_unit(UnitEvent::Heal {
            unit: id,
            amount,
            source,
        });
    }

    /// Force a seated unit's health to zero and publish `death`, even when
    /// the unit was already dead
    pub fn kill_unit(&mut self, id: UnitId) {
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        unit.kill();
        self.publish_unit(UnitEvent::Death { unit: id });
    }

    /// Front unit of `team` moves to the back
    pub fn rotate_left(&mut self, team: usize) -> Option<Rotation> {
        let rotation = self.teams.get_mut(team)?.rotate_left()?;
        self.announce_rotation(
            team,
            rotation,
            TeamEvent::RotateLeft {
                team,
                active: rotation.active,
                previous: rotation.previous,
            },
        );
        Some(rotation)
    }

    /// Back unit of `team` moves to the front
    pub fn rotate_right(&mut self, team: usize) -> Option<Rotation> {
        let rotation = self.teams.get_mut(team)?.rotate_right()?;
        self.announce_rotation(
            team,
            rotation,
            TeamEvent::RotateRight {
                team,
                active: rotation.active,
                previous: rotation.previous,
            },
        );
        Some(rotation)
    }

    fn announce_rotation(&mut self, team: usize, rotation: Rotation, directed: TeamEvent) {
        log::debug!(
            "team {} rotated: {} in, {} out",
            team,
            rotation.active,
            rotation.previous
        );
        self.publish_team(TeamEvent::Rotate {
            team,
            active: rotation.active,
            previous: rotation.previous,
        });
        self.publish_team(directed);
        self.publish_unit(UnitEvent::RotateOut {
            unit: rotation.previous,
        });
        self.publish_unit(UnitEvent::RotateIn {
            unit: rotation.active,
        });
    }

    /// Send the dead of every team to the grave, announcing each removal
    pub fn cleanup(&mut self) {
        for index in 0..self.teams.len() {
            let removed = self.teams[index].cleanup();
            for unit in removed {
                log::debug!("team {}: {} removed", index, unit);
                self.publish_team(TeamEvent::Remove { team: index, unit });
            }
        }
    }

    // ==========================================
    // PUBLICATION
    // ==========================================

    pub fn publish_unit(&mut self, event: UnitEvent) {
        log::trace!("unit event {:?}", event);
        for id in self.unit_events.snapshot(event.kind()) {
            if let Delivery::Binding(binding) = self.unit_events.deliver(id, &event) {
                self.dispatch(binding, Trigger::Unit(&event));
            }
        }
    }

    /// Publish a team event. A `remove` tears down the removed unit's
    /// handlers before anyone else hears about it.
    pub fn publish_team(&mut self, event: TeamEvent) {
        log::trace!("team event {:?}", event);
        if let TeamEvent::Remove { unit, .. } = event {
            self.remove_handlers(unit);
        }
        for id in self.team_events.snapshot(event.kind()) {
            if let Delivery::Binding(binding) = self.team_events.deliver(id, &event) {
                self.dispatch(binding, Trigger::Team(&event));
            }
        }
    }

    pub fn publish_mechanics(&mut self, event: MechanicsEvent) {
        log::trace!("mechanics event {:?}", event);
        for id in self.events.snapshot(event.kind()) {
            if let Delivery::Binding(binding) = self.events.deliver(id, &event) {
                self.dispatch(binding, Trigger::Mechanics(&event));
            }
        }
    }

    /// Run a handler binding for `trigger`, then announce the ability on the
    /// same channel if its mechanic fired
    fn dispatch(&mut self, binding: BindingRef, trigger: Trigger<'_>) {
        let Some(handler) = self.handlers.iter().find(|h| h.id == binding.handler) else {
            return;
        };
        if !handler.accepts(binding.slot, &self.teams, trigger.emitter()) {
            return;
        }
        let activation = handler.activate(&self.teams, &trigger);
        let owner_team = handler.owner_team;

        if let Err(reason) = self.limits.enter_trigger_depth() {
            log::warn!("skipping {} of {}: {:?}", activation.ability, activation.owner, reason);
            return;
        }
        if let Err(reason) = self.limits.record_trigger() {
            log::warn!("skipping {} of {}: {:?}", activation.ability, activation.owner, reason);
            self.limits.exit_trigger_depth();
            return;
        }

        if activation.execute(self) {
            let (ability, unit) = (activation.ability, activation.owner);
            match trigger {
                Trigger::Unit(_) => self.publish_unit(UnitEvent::Ability { ability, unit }),
                Trigger::Team(_) => self.publish_team(TeamEvent::Ability {
                    team: owner_team,
                    ability,
                    unit,
                }),
                Trigger::Mechanics(_) => {
                    self.publish_mechanics(MechanicsEvent::Ability { ability, unit })
                }
            }
        }
        self.limits.exit_trigger_depth();
    }
}
