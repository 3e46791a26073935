//! Data definitions: unit types, species, roster entries and abilities.
//!
//! Everything in here is plain data that a caller can build in code or
//! deserialize with serde. Keyword fields are typed, so a definition naming an
//! unknown target, event or mechanic is rejected when it is loaded rather than
//! when the battle first tries to use it.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, BattleResult};
use crate::events::{MechanicsEventKind, TeamEventKind, UnitEventKind};
use crate::targeting::{TargetKeyword, TeamSource};

// ==========================================
// UNIT TYPES
// ==========================================

/// Identifier of a unit type, matched against resistances and weaknesses
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTypeId(pub String);

impl UnitTypeId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Damage scaling picked by the defending unit's type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplier {
    /// `amount - amount / 3`
    Reduced,
    /// `amount + amount / 2`
    Amplified,
    /// `amount`
    Normal,
}

impl Multiplier {
    /// Scale `amount`, truncating toward zero
    pub fn apply(self, amount: i32) -> i32 {
        match self {
            Multiplier::Reduced => amount - amount / 3,
            Multiplier::Amplified => amount.saturating_add(amount / 2),
            Multiplier::Normal => amount,
        }
    }
}

/// A unit type with the attacking types it resists or is weak against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitType {
    pub id: UnitTypeId,
    pub name: String,
    #[serde(default)]
    pub resistances: Vec<UnitTypeId>,
    #[serde(default)]
    pub weaknesses: Vec<UnitTypeId>,
}

impl UnitType {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: UnitTypeId::new(id),
            name: name.to_string(),
            resistances: Vec::new(),
            weaknesses: Vec::new(),
        }
    }

    pub fn resisting(mut self, attacking: &str) -> Self {
        self.resistances.push(UnitTypeId::new(attacking));
        self
    }

    pub fn weak_to(mut self, attacking: &str) -> Self {
        self.weaknesses.push(UnitTypeId::new(attacking));
        self
    }

    /// Multiplier applied to damage coming from `attacking`.
    ///
    /// Untyped damage always scales normally.
    pub fn multiplier(&self, attacking: Option<&UnitTypeId>) -> Multiplier {
        let Some(attacking) = attacking else {
            return Multiplier::Normal;
        };
        if self.resistances.contains(attacking) {
            Multiplier::Reduced
        } else if self.weaknesses.contains(attacking) {
            Multiplier::Amplified
        } else {
            Multiplier::Normal
        }
    }
}

// ==========================================
// SPECIES AND ROSTER ENTRIES
// ==========================================

/// Species template shared by every instance of a unit kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTemplate {
    pub id: String,
    pub name: String,
    pub unit_type: UnitType,
    pub health: i32,
    pub power: i32,
    pub speed: i32,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl UnitTemplate {
    pub fn new(
        id: &str,
        name: &str,
        unit_type: UnitType,
        health: i32,
        power: i32,
        speed: i32,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit_type,
            health,
            power,
            speed,
            abilities: Vec::new(),
        }
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Ability a fresh instance starts with
    pub fn default_ability(&self) -> Option<&Ability> {
        self.abilities.first()
    }
}

/// A persistent roster entry, the thing a team is assembled from.
///
/// Stats grow with level unless explicitly overridden. Overrides are honoured
/// as given, including zero; the battle unit's attributes clamp them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInstance {
    pub template: UnitTemplate,
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default)]
    pub experience: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<Ability>,
}

fn default_level() -> i32 {
    1
}

impl UnitInstance {
    pub fn new(template: UnitTemplate) -> Self {
        Self {
            template,
            level: 1,
            experience: 0,
            health: None,
            power: None,
            speed: None,
            ability: None,
        }
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn health(&self) -> i32 {
        self.health
            .unwrap_or(self.template.health + (self.level + 1) / 3)
    }

    pub fn power(&self) -> i32 {
        self.power.unwrap_or(self.template.power + self.level / 3)
    }

    pub fn speed(&self) -> i32 {
        self.speed
            .unwrap_or(self.template.speed + (self.level - 1) / 3)
    }

    /// Equipped ability: the override if present, else the species default
    pub fn ability(&self) -> Option<&Ability> {
        self.ability
            .as_ref()
            .or_else(|| self.template.default_ability())
    }
}

// ==========================================
// ABILITIES
// ==========================================

/// Identifier of an ability definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(pub String);

impl AbilityId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

keyword_enum! {
    /// Routine run when an ability effect triggers
    pub enum Mechanic, unknown = unknown_mechanic {
        /// Emit a trace line, touch nothing
        Log => "log",
        /// Subtract health from every target, bypassing type multipliers
        Damage => "damage",
        /// Heal every target
        Heal => "heal",
    }
}

impl Mechanic {
    fn needs_amount(&self) -> bool {
        !matches!(self, Mechanic::Log)
    }
}

fn unknown_mechanic(name: &str) -> BattleError {
    BattleError::UnknownMechanic {
        name: name.to_string(),
    }
}

/// How much a damage or heal effect applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectParameters {
    /// A fixed amount
    Amount { amount: i32 },
    /// A fraction of a field carried by the triggering event, e.g.
    /// `{ "relative": 0.5, "reference": "damage" }` on `post_attack`
    Relative { relative: f64, reference: String },
}

impl EffectParameters {
    /// Resolve the amount against the triggering event's payload fields.
    ///
    /// Relative amounts truncate toward zero.
    pub fn amount(&self, field: impl Fn(&str) -> Option<i32>) -> Option<i32> {
        match self {
            EffectParameters::Amount { amount } => Some(*amount),
            EffectParameters::Relative {
                relative,
                reference,
            } => field(reference).map(|value| (relative * f64::from(value)) as i32),
        }
    }
}

/// Where a bound event must come from, parsed from `"<source> <event>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventSpec {
    /// `mechanics <event>`: round-level events from the mechanics itself
    Mechanics(MechanicsEventKind),
    /// `<team source> <event>`: team events from the selected teams
    Team {
        source: TeamSource,
        kind: TeamEventKind,
    },
    /// `<target keyword> <event>`: unit events from the selected units
    Unit {
        source: TargetKeyword,
        kind: UnitEventKind,
    },
}

impl EventSpec {
    /// Names of the numeric payload fields the bound event carries
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            EventSpec::Mechanics(kind) => kind.fields(),
            EventSpec::Team { kind, .. } => kind.fields(),
            EventSpec::Unit { kind, .. } => kind.fields(),
        }
    }
}

impl FromStr for EventSpec {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(source), Some(event), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BattleError::MalformedEvent {
                spec: s.to_string(),
            });
        };

        if source == "mechanics" {
            Ok(EventSpec::Mechanics(event.parse()?))
        } else if source.contains("team") {
            Ok(EventSpec::Team {
                source: source.parse()?,
                kind: event.parse()?,
            })
        } else {
            Ok(EventSpec::Unit {
                source: source.parse()?,
                kind: event.parse()?,
            })
        }
    }
}

impl fmt::Display for EventSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSpec::Mechanics(kind) => write!(f, "mechanics {}", kind.as_str()),
            EventSpec::Team { source, kind } => write!(f, "{} {}", source.as_str(), kind.as_str()),
            EventSpec::Unit { source, kind } => write!(f, "{} {}", source.as_str(), kind.as_str()),
        }
    }
}

impl TryFrom<String> for EventSpec {
    type Error = BattleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventSpec> for String {
    fn from(spec: EventSpec) -> Self {
        format!("{}", spec)
    }
}

/// One effect of an ability: a mechanic, what it hits, and what wakes it up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityEffect {
    pub mechanic: Mechanic,
    pub target: TargetKeyword,
    pub events: Vec<EventSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<EffectParameters>,
}

impl AbilityEffect {
    pub fn new(mechanic: Mechanic, target: TargetKeyword) -> Self {
        Self {
            mechanic,
            target,
            events: Vec::new(),
            parameters: None,
        }
    }

    /// Listen to an additional `"<source> <event>"` specifier
    pub fn on(mut self, spec: &str) -> BattleResult<Self> {
        self.events.push(spec.parse()?);
        Ok(self)
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.parameters = Some(EffectParameters::Amount { amount });
        self
    }

    pub fn with_relative(mut self, relative: f64, reference: &str) -> Self {
        self.parameters = Some(EffectParameters::Relative {
            relative,
            reference: reference.to_string(),
        });
        self
    }

    /// Check the parameters against the mechanic and the bound events
    pub fn validate(&self, ability: &AbilityId) -> BattleResult<()> {
        match &self.parameters {
            None if self.mechanic.needs_amount() => Err(BattleError::MissingAmount {
                ability: ability.0.clone(),
            }),
            Some(EffectParameters::Relative { reference, .. }) => {
                for spec in &self.events {
                    if !spec.fields().contains(&reference.as_str()) {
                        return Err(BattleError::MissingReference {
                            event: spec.to_string(),
                            reference: reference.clone(),
                        });
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// A named, ordered list of effects equipped on a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub id: AbilityId,
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub effects: Vec<AbilityEffect>,
}

fn default_description() -> String {
    "No description.".to_string()
}

impl Ability {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: AbilityId::new(id),
            name: name.to_string(),
            description: default_description(),
            effects: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_effect(mut self, effect: AbilityEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn validate(&self) -> BattleResult<()> {
        self.effects
            .iter()
            .try_for_each(|effect| effect.validate(&self.id))
    }
}
