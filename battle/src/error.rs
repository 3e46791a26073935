//! Error types for battle operations
//!
//! Data-definition problems (unknown keywords, malformed event specifiers) are
//! caught when abilities are built or loaded, so the battle loop itself only
//! ever reports rejected input.

use alloc::string::String;
use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::engine::Phase;

/// Errors that can occur while building or driving a battle
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[derive(thiserror::Error)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BattleError {
    /// Team has no free seat left
    #[error("team is full (capacity {capacity})")]
    TeamFull { capacity: u32 },
    /// Target keyword does not name a targeting rule
    #[error("unknown target keyword `{keyword}`")]
    UnknownTarget { keyword: String },
    /// Source keyword containing `team` does not name a team selector
    #[error("unknown team source `{keyword}`")]
    UnknownTeamSource { keyword: String },
    /// Event name is not published on the selected channel
    #[error("unknown {channel} event `{event}`")]
    UnknownEvent { channel: String, event: String },
    /// Event specifier is not of the form `<source> <event>`
    #[error("malformed event specifier `{spec}`")]
    MalformedEvent { spec: String },
    /// Mechanic name does not match any built-in mechanic
    #[error("unknown mechanic `{name}`")]
    UnknownMechanic { name: String },
    /// Damage or heal effect declared without an amount
    #[error("effect of ability `{ability}` has no amount")]
    MissingAmount { ability: String },
    /// Relative amount refers to a field the bound event does not carry
    #[error("event `{event}` carries no `{reference}` field")]
    MissingReference { event: String, reference: String },
    /// Action name is not one of attack, rotate_clock, rotate_counter, surrender
    #[error("unknown action `{name}`")]
    UnknownAction { name: String },
    /// Action submitted while the engine was not waiting for input
    #[error("actions are not accepted during {phase:?}")]
    WrongPhase { phase: Phase },
    /// Team index outside the battle
    #[error("team {index} does not exist")]
    InvalidTeam { index: u32 },
    /// Engine has not been given a battle yet
    #[error("no battle has been set")]
    NoBattle,
}

/// Result type alias for battle operations
pub type BattleResult<T> = Result<T, BattleError>;
