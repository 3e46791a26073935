//! Ability effect handlers.
//!
//! One handler exists per effect of every ability equipped at battle start.
//! The handler owns its pre-resolved target and its allowed event sources;
//! the channels only hold [`BindingRef`](crate::channel::BindingRef)s naming
//! the handler, and [`BattleMechanics`] resolves them when an event fires.

use alloc::string::String;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

use crate::channel::SubscriptionId;
use crate::events::{Emitter, MechanicsEvent, TeamEvent, UnitEvent};
use crate::mechanics::BattleMechanics;
use crate::targeting::{self, Target};
use crate::team::Team;
use crate::types::{Ability, AbilityEffect, AbilityId, EffectParameters, EventSpec, Mechanic};
use crate::unit::{Unit, UnitId};

/// Identifier of a live effect handler
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, MaxEncodedLen, TypeInfo,
)]
pub struct HandlerId(pub u32);

/// Emitters a binding accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
    Mechanics,
    Teams(Vec<usize>),
    Units(Target),
}

impl Sources {
    fn resolve(teams: &[Team], unit: &Unit, spec: &EventSpec) -> Self {
        match spec {
            EventSpec::Mechanics(_) => Sources::Mechanics,
            EventSpec::Team { source, .. } => {
                Sources::Teams(targeting::resolve_teams(teams, unit, *source))
            }
            EventSpec::Unit { source, .. } => {
                Sources::Units(targeting::resolve(teams, unit, *source))
            }
        }
    }

    fn accepts(&self, teams: &[Team], emitter: Emitter) -> bool {
        match (self, emitter) {
            (Sources::Mechanics, Emitter::Mechanics) => true,
            (Sources::Teams(indices), Emitter::Team(team)) => indices.contains(&team),
            (Sources::Units(target), Emitter::Unit(unit)) => target.contains(teams, unit),
            _ => false,
        }
    }
}

/// One event specifier of an effect and the subscription serving it
#[derive(Debug, Clone)]
pub struct Binding {
    pub spec: EventSpec,
    pub sources: Sources,
    pub subscription: Option<SubscriptionId>,
}

/// Event being delivered to a binding
#[derive(Debug, Clone, Copy)]
pub enum Trigger<'a> {
    Unit(&'a UnitEvent),
    Team(&'a TeamEvent),
    Mechanics(&'a MechanicsEvent),
}

impl Trigger<'_> {
    pub fn emitter(&self) -> Emitter {
        match self {
            Trigger::Unit(event) => Emitter::Unit(event.emitter()),
            Trigger::Team(event) => Emitter::Team(event.emitter()),
            Trigger::Mechanics(_) => Emitter::Mechanics,
        }
    }

    /// Numeric payload field by name
    pub fn field(&self, name: &str) -> Option<i32> {
        match self {
            Trigger::Unit(event) => event.field(name),
            Trigger::Team(_) => None,
            Trigger::Mechanics(event) => event.field(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EffectHandler {
    pub id: HandlerId,
    pub owner: UnitId,
    /// Team of the owner, fixed for the battle
    pub owner_team: usize,
    pub ability: AbilityId,
    pub ability_name: String,
    pub mechanic: Mechanic,
    pub parameters: Option<EffectParameters>,
    pub target: Target,
    pub bindings: Vec<Binding>,
}

impl EffectHandler {
    /// Resolve `effect` for `unit` against the current seating. The handler
    /// is not subscribed anywhere yet.
    pub fn new(
        id: HandlerId,
        teams: &[Team],
        unit: &Unit,
        ability: &Ability,
        effect: &AbilityEffect,
    ) -> Self {
        let bindings = effect
            .events
            .iter()
            .map(|spec| Binding {
                spec: *spec,
                sources: Sources::resolve(teams, unit, spec),
                subscription: None,
            })
            .collect();

        Self {
            id,
            owner: unit.id,
            owner_team: unit.team,
            ability: ability.id.clone(),
            ability_name: ability.name.clone(),
            mechanic: effect.mechanic,
            parameters: effect.parameters.clone(),
            target: targeting::resolve(teams, unit, effect.target),
            bindings,
        }
    }

    /// Whether binding `slot` takes events from `emitter`
    pub fn accepts(&self, slot: usize, teams: &[Team], emitter: Emitter) -> bool {
        self.bindings
            .get(slot)
            .is_some_and(|binding| binding.sources.accepts(teams, emitter))
    }

    /// Build the activation for one delivery, resolving amount and targets
    /// against the state at trigger time
    pub(crate) fn activate(&self, teams: &[Team], trigger: &Trigger<'_>) -> Activation {
        Activation {
            owner: self.owner,
            ability: self.ability.clone(),
            ability_name: self.ability_name.clone(),
            mechanic: self.mechanic,
            amount: self
                .parameters
                .as_ref()
                .and_then(|p| p.amount(|field| trigger.field(field))),
            targets: self.target.units(teams),
        }
    }
}

/// Everything a mechanic needs, detached from the handler list
#[derive(Debug, Clone)]
pub(crate) struct Activation {
    pub owner: UnitId,
    pub ability: AbilityId,
    pub ability_name: String,
    pub mechanic: Mechanic,
    pub amount: Option<i32>,
    pub targets: Vec<UnitId>,
}

impl Activation {
    /// Run the mechanic. Returns whether it fired.
    pub(crate) fn execute(&self, mechanics: &mut BattleMechanics) -> bool {
        match self.mechanic {
            Mechanic::Log => {
                log::info!(
                    target: "ability",
                    "{} ({}) of {} triggered, amount {:?}, targets {:?}",
                    self.ability_name,
                    self.ability,
                    self.owner,
                    self.amount,
                    self.targets
                );
                true
            }
            Mechanic::Damage => {
                let Some(amount) = self.amount else {
                    return false;
                };
                for target in &self.targets {
                    mechanics.damage_unit(*target, amount, None);
                }
                true
            }
            Mechanic::Heal => {
                let Some(amount) = self.amount else {
                    return false;
                };
                for target in &self.targets {
                    mechanics.heal_unit(*target, amount, Some(self.owner));
                }
                true
            }
        }
    }
}
