//! Event payloads for every channel.
//!
//! Each channel has a closed enum of events and a matching `*Kind` enum used
//! as the subscription key. Kind names are the stable snake case strings that
//! ability definitions refer to in `"<source> <event>"` specifiers.

use alloc::string::ToString;
use core::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::engine::{BattleOutcome, Phase};
use crate::error::BattleError;
use crate::types::{AbilityId, UnitTypeId};
use crate::unit::UnitId;
use crate::view::UnitView;

/// Anything that can be published on an [`crate::channel::EventChannel`]
pub trait Event {
    type Kind: Copy + Ord + Debug;

    fn kind(&self) -> Self::Kind;
}

/// Who published an event, checked against a binding's allowed sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitter {
    Mechanics,
    Team(usize),
    Unit(UnitId),
}

fn unknown_event(channel: &str, event: &str) -> BattleError {
    BattleError::UnknownEvent {
        channel: channel.to_string(),
        event: event.to_string(),
    }
}

fn unknown_unit_event(event: &str) -> BattleError {
    unknown_event("unit", event)
}

fn unknown_team_event(event: &str) -> BattleError {
    unknown_event("team", event)
}

fn unknown_mechanics_event(event: &str) -> BattleError {
    unknown_event("mechanics", event)
}

fn unknown_engine_event(event: &str) -> BattleError {
    unknown_event("engine", event)
}

// ==========================================
// UNIT CHANNEL
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum UnitEvent {
    Spawn {
        unit: UnitId,
    },
    Death {
        unit: UnitId,
    },
    /// `amount` is what the unit actually took after its type multiplier
    #[serde(rename_all = "camelCase")]
    Damage {
        unit: UnitId,
        amount: i32,
        unit_type: Option<UnitTypeId>,
    },
    Heal {
        unit: UnitId,
        amount: i32,
        source: Option<UnitId>,
    },
    Attack {
        unit: UnitId,
        target: UnitId,
    },
    Defend {
        unit: UnitId,
        target: UnitId,
    },
    RotateIn {
        unit: UnitId,
    },
    RotateOut {
        unit: UnitId,
    },
    /// An ability effect of `unit` fired
    Ability {
        ability: AbilityId,
        unit: UnitId,
    },
    /// An attack took health off its target
    PostAttack {
        unit: UnitId,
        target: UnitId,
        damage: i32,
    },
}

keyword_enum! {
    pub enum UnitEventKind, unknown = unknown_unit_event {
        Spawn => "spawn",
        Death => "death",
        Damage => "damage",
        Heal => "heal",
        Attack => "attack",
        Defend => "defend",
        RotateIn => "rotate_in",
        RotateOut => "rotate_out",
        Ability => "ability",
        PostAttack => "post_attack",
    }
}

impl UnitEventKind {
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            UnitEventKind::Damage | UnitEventKind::Heal => &["amount"],
            UnitEventKind::PostAttack => &["damage"],
            _ => &[],
        }
    }
}

impl Event for UnitEvent {
    type Kind = UnitEventKind;

    fn kind(&self) -> UnitEventKind {
        match self {
            UnitEvent::Spawn { .. } => UnitEventKind::Spawn,
            UnitEvent::Death { .. } => UnitEventKind::Death,
            UnitEvent::Damage { .. } => UnitEventKind::Damage,
            UnitEvent::Heal { .. } => UnitEventKind::Heal,
            UnitEvent::Attack { .. } => UnitEventKind::Attack,
            UnitEvent::Defend { .. } => UnitEventKind::Defend,
            UnitEvent::RotateIn { .. } => UnitEventKind::RotateIn,
            UnitEvent::RotateOut { .. } => UnitEventKind::RotateOut,
            UnitEvent::Ability { .. } => UnitEventKind::Ability,
            UnitEvent::PostAttack { .. } => UnitEventKind::PostAttack,
        }
    }
}

impl UnitEvent {
    /// The unit the event is about
    pub fn emitter(&self) -> UnitId {
        match self {
            UnitEvent::Spawn { unit }
            | UnitEvent::Death { unit }
            | UnitEvent::Damage { unit, .. }
            | UnitEvent::Heal { unit, .. }
            | UnitEvent::Attack { unit, .. }
            | UnitEvent::Defend { unit, .. }
            | UnitEvent::RotateIn { unit }
            | UnitEvent::RotateOut { unit }
            | UnitEvent::Ability { unit, .. }
            | UnitEvent::PostAttack { unit, .. } => *unit,
        }
    }

    pub fn field(&self, name: &str) -> Option<i32> {
        match (self, name) {
            (UnitEvent::Damage { amount, .. }, "amount") => Some(*amount),
            (UnitEvent::Heal { amount, .. }, "amount") => Some(*amount),
            (UnitEvent::PostAttack { damage, .. }, "damage") => Some(*damage),
            _ => None,
        }
    }
}

// ==========================================
// TEAM CHANNEL
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum TeamEvent {
    Add {
        team: usize,
        unit: UnitId,
    },
    Remove {
        team: usize,
        unit: UnitId,
    },
    Rotate {
        team: usize,
        active: UnitId,
        previous: UnitId,
    },
    RotateLeft {
        team: usize,
        active: UnitId,
        previous: UnitId,
    },
    RotateRight {
        team: usize,
        active: UnitId,
        previous: UnitId,
    },
    Ability {
        team: usize,
        ability: AbilityId,
        unit: UnitId,
    },
}

keyword_enum! {
    pub enum TeamEventKind, unknown = unknown_team_event {
        Add => "add",
        Remove => "remove",
        Rotate => "rotate",
        RotateLeft => "rotate_left",
        RotateRight => "rotate_right",
        Ability => "ability",
    }
}

impl TeamEventKind {
    pub fn fields(&self) -> &'static [&'static str] {
        &[]
    }
}

impl Event for TeamEvent {
    type Kind = TeamEventKind;

    fn kind(&self) -> TeamEventKind {
        match self {
            TeamEvent::Add { .. } => TeamEventKind::Add,
            TeamEvent::Remove { .. } => TeamEventKind::Remove,
            TeamEvent::Rotate { .. } => TeamEventKind::Rotate,
            TeamEvent::RotateLeft { .. } => TeamEventKind::RotateLeft,
            TeamEvent::RotateRight { .. } => TeamEventKind::RotateRight,
            TeamEvent::Ability { .. } => TeamEventKind::Ability,
        }
    }
}

impl TeamEvent {
    /// Index of the team the event is about
    pub fn emitter(&self) -> usize {
        match self {
            TeamEvent::Add { team, .. }
            | TeamEvent::Remove { team, .. }
            | TeamEvent::Rotate { team, .. }
            | TeamEvent::RotateLeft { team, .. }
            | TeamEvent::RotateRight { team, .. }
            | TeamEvent::Ability { team, .. } => *team,
        }
    }
}

// ==========================================
// MECHANICS CHANNEL
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum MechanicsEvent {
    /// A new round started
    Round { round: u32 },
    Ability { ability: AbilityId, unit: UnitId },
}

keyword_enum! {
    pub enum MechanicsEventKind, unknown = unknown_mechanics_event {
        Round => "round",
        Ability => "ability",
    }
}

impl MechanicsEventKind {
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            MechanicsEventKind::Round => &["round"],
            MechanicsEventKind::Ability => &[],
        }
    }
}

impl Event for MechanicsEvent {
    type Kind = MechanicsEventKind;

    fn kind(&self) -> MechanicsEventKind {
        match self {
            MechanicsEvent::Round { .. } => MechanicsEventKind::Round,
            MechanicsEvent::Ability { .. } => MechanicsEventKind::Ability,
        }
    }
}

impl MechanicsEvent {
    pub fn field(&self, name: &str) -> Option<i32> {
        match (self, name) {
            (MechanicsEvent::Round { round }, "round") => i32::try_from(*round).ok(),
            _ => None,
        }
    }
}

// ==========================================
// ENGINE CHANNEL
// ==========================================

/// Phase lifecycle events for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum EngineEvent {
    BattleStart,
    BattleSelectAction,
    BattleAttack,
    BattleBetweenRounds,
    BattleEnd { outcome: Option<BattleOutcome> },
    /// The engine is waiting for [`crate::engine::BattleEngine::submit_action`]
    RequestInput,
    EndPhase { phase: Phase },
    /// Snapshots of both sides right after an attack resolved
    Attack { unit: UnitView, target: UnitView },
}

keyword_enum! {
    pub enum EngineEventKind, unknown = unknown_engine_event {
        BattleStart => "battle_start",
        BattleSelectAction => "battle_select_action",
        BattleAttack => "battle_attack",
        BattleBetweenRounds => "battle_between_rounds",
        BattleEnd => "battle_end",
        RequestInput => "request_input",
        EndPhase => "end_phase",
        Attack => "attack",
    }
}

impl Event for EngineEvent {
    type Kind = EngineEventKind;

    fn kind(&self) -> EngineEventKind {
        match self {
            EngineEvent::BattleStart => EngineEventKind::BattleStart,
            EngineEvent::BattleSelectAction => EngineEventKind::BattleSelectAction,
            EngineEvent::BattleAttack => EngineEventKind::BattleAttack,
            EngineEvent::BattleBetweenRounds => EngineEventKind::BattleBetweenRounds,
            EngineEvent::BattleEnd { .. } => EngineEventKind::BattleEnd,
            EngineEvent::RequestInput => EngineEventKind::RequestInput,
            EngineEvent::EndPhase { .. } => EngineEventKind::EndPhase,
            EngineEvent::Attack { .. } => EngineEventKind::Attack,
        }
    }
}
