//! Combat core for a turn-based team battle game.
//!
//! Teams of seated units fight through a small state machine
//! ([`engine::BattleEngine`]). Every mutation is announced on typed event
//! channels; ability effects bind to those channels and react without the
//! battle loop knowing about any particular ability. Presentation layers only
//! call into the engine and observe its channels.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[macro_use]
mod keyword;

pub mod attribute;
pub mod channel;
pub mod effects;
pub mod engine;
pub mod error;
pub mod events;
pub mod limits;
pub mod mechanics;
pub mod rng;
pub mod targeting;
pub mod team;
pub mod types;
pub mod unit;
pub mod view;

#[cfg(test)]
mod tests;

pub use attribute::Attribute;
pub use channel::{EventChannel, SubscriptionId};
pub use effects::{EffectHandler, HandlerId};
pub use engine::{Action, BattleEngine, BattleOutcome, Phase};
pub use error::{BattleError, BattleResult};
pub use events::*;
pub use mechanics::{AttackReport, BattleMechanics};
pub use rng::{BattleRng, XorShiftRng};
pub use targeting::{Target, TargetKeyword, TeamSource};
pub use team::{Team, TEAM_CAPACITY};
pub use types::*;
pub use unit::{Unit, UnitId};
pub use view::{BattleView, TeamView, UnitView};
