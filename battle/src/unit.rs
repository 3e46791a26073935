//! Battle instances of units.
//!
//! A [`Unit`] only mutates itself. Announcing what happened is the job of
//! [`crate::mechanics::BattleMechanics`], which wraps each of these operations
//! and publishes the matching unit event.

use alloc::string::String;
use core::fmt;

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::types::{Ability, UnitInstance, UnitType, UnitTypeId};

/// Identifier of a unit, unique within one battle
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub template_id: String,
    pub name: String,
    pub unit_type: UnitType,
    pub max_health: Attribute,
    health: i32,
    pub power: Attribute,
    pub speed: Attribute,
    pub ability: Option<Ability>,
    /// Index of the owning team in the battle
    pub team: usize,
    /// Seat cache; the team's sequence is authoritative
    pub index: usize,
}

impl Unit {
    /// Build a battle unit from a roster entry. Team and seat are assigned
    /// when the unit is seated.
    pub fn from_instance(id: UnitId, instance: &UnitInstance) -> Self {
        let max_health = Attribute::new(instance.health());
        Self {
            id,
            template_id: instance.template.id.clone(),
            name: instance.template.name.clone(),
            unit_type: instance.template.unit_type.clone(),
            max_health,
            health: max_health.value(),
            power: Attribute::new(instance.power()),
            speed: Attribute::new(instance.speed()),
            ability: instance.ability().cloned(),
            team: 0,
            index: 0,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Take typed damage. The defending type scales `amount` by the attacking
    /// type; health floors at zero. Returns the post-multiplier amount.
    pub fn damage(&mut self, amount: i32, attacking: Option<&UnitTypeId>) -> i32 {
        let amount = self.unit_type.multiplier(attacking).apply(amount.max(0));
        self.health = self.health.saturating_sub(amount).max(0);
        amount
    }

    /// Heal up to the current cap
    pub fn heal(&mut self, amount: i32) {
        self.health = self.health.saturating_add(amount).min(self.max_health.value());
    }

    pub fn kill(&mut self) {
        self.health = 0;
    }

    pub fn plus_health(&mut self, amount: i32) {
        self.max_health.plus(amount);
        if self.health > 0 {
            self.health = self.health.saturating_add(amount).min(self.max_health.value());
        }
    }

    pub fn minus_health(&mut self, amount: i32) {
        self.max_health.minus(amount);
        self.health = self.health.min(self.max_health.value());
    }

    pub fn plus_power(&mut self, amount: i32) {
        self.power.plus(amount);
    }

    pub fn minus_power(&mut self, amount: i32) {
        self.power.minus(amount);
    }

    pub fn plus_speed(&mut self, amount: i32) {
        self.speed.plus(amount);
    }

    pub fn minus_speed(&mut self, amount: i32) {
        self.speed.minus(amount);
    }
}
