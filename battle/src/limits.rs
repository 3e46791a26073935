//! Limits on ability chaining.
//!
//! Effects can trigger effects. Every handler invocation enters one level of
//! trigger depth and counts against the per-phase budget; past either limit
//! the invocation is skipped and the battle carries on.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

pub const MAX_TRIGGER_DEPTH: u32 = 10;
pub const MAX_TRIGGERS_PER_PHASE: u32 = 200;

/// Which limit stopped a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitReason {
    TriggerDepth,
    PhaseTriggers,
}

#[derive(Debug, Clone)]
pub struct BattleLimits {
    pub trigger_depth: u32,
    pub phase_triggers: u32,
    /// Handler invocations skipped since the battle started
    pub skipped: u32,
    pub last_exceeded: Option<LimitReason>,
    next_instance_id: u32,
}

impl Default for BattleLimits {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleLimits {
    pub fn new() -> Self {
        Self {
            trigger_depth: 0,
            phase_triggers: 0,
            skipped: 0,
            last_exceeded: None,
            next_instance_id: 1,
        }
    }

    /// Next unit id of this battle
    pub fn generate_instance_id(&mut self) -> UnitId {
        let id = self.next_instance_id;
        self.next_instance_id += 1;
        UnitId(id)
    }

    pub fn reset_phase_counters(&mut self) {
        self.phase_triggers = 0;
    }

    pub fn is_exceeded(&self) -> bool {
        self.last_exceeded.is_some()
    }

    /// Count one handler invocation against the phase budget
    pub fn record_trigger(&mut self) -> Result<(), LimitReason> {
        if self.phase_triggers >= MAX_TRIGGERS_PER_PHASE {
            return Err(self.exceeded(LimitReason::PhaseTriggers));
        }
        self.phase_triggers += 1;
        Ok(())
    }

    /// Enter one nested handler invocation. Must be paired with
    /// [`BattleLimits::exit_trigger_depth`] on success.
    pub fn enter_trigger_depth(&mut self) -> Result<(), LimitReason> {
        if self.trigger_depth >= MAX_TRIGGER_DEPTH {
            return Err(self.exceeded(LimitReason::TriggerDepth));
        }
        self.trigger_depth += 1;
        Ok(())
    }

    pub fn exit_trigger_depth(&mut self) {
        self.trigger_depth = self.trigger_depth.saturating_sub(1);
    }

    fn exceeded(&mut self, reason: LimitReason) -> LimitReason {
        self.skipped += 1;
        self.last_exceeded = Some(reason);
        reason
    }
}
