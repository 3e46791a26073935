//! View types for presentation layers
//!
//! Owned snapshots of battle state. Nothing here borrows from the mechanics,
//! so a view can be kept, serialized or sent anywhere.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::engine::Phase;
use crate::team::Team;
use crate::unit::{Unit, UnitId};

/// View of a single unit
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub id: UnitId,
    pub name: String,
    pub template_id: String,
    pub team: u32,
    pub seat: u32,
    pub health: i32,
    pub max_health: i32,
    pub power: i32,
    pub speed: i32,
    pub unit_type: String,
}

impl From<&Unit> for UnitView {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.name.clone(),
            template_id: unit.template_id.clone(),
            team: unit.team as u32,
            seat: unit.index as u32,
            health: unit.health(),
            max_health: unit.max_health.value(),
            power: unit.power.value(),
            speed: unit.speed.value(),
            unit_type: unit.unit_type.id.to_string(),
        }
    }
}

/// View of a team: seated units in seat order, then the fallen
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub index: u32,
    pub units: Vec<UnitView>,
    pub grave: Vec<UnitView>,
}

impl From<&Team> for TeamView {
    fn from(team: &Team) -> Self {
        Self {
            index: team.index as u32,
            units: team.units().iter().map(UnitView::from).collect(),
            grave: team.grave().iter().map(UnitView::from).collect(),
        }
    }
}

/// The complete battle view
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleView {
    /// `None` before the battle has been set up
    pub phase: Option<Phase>,
    pub round: u32,
    /// Index of the team whose turn it is
    pub turn: u32,
    pub teams: Vec<TeamView>,
}
