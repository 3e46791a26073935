//! Clamped stat values

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Lowest value an attribute can report
pub const ATTRIBUTE_FLOOR: i32 = 1;

/// A base stat plus a transient bonus.
///
/// Buffs and debuffs only ever touch `bonus`, so the base survives any
/// sequence of modifications. The effective value never drops below
/// [`ATTRIBUTE_FLOOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct Attribute {
    pub base: i32,
    pub bonus: i32,
}

impl Attribute {
    pub fn new(base: i32) -> Self {
        Self { base, bonus: 0 }
    }

    /// Effective value, `max(1, base + bonus)`
    pub fn value(&self) -> i32 {
        self.base.saturating_add(self.bonus).max(ATTRIBUTE_FLOOR)
    }

    pub fn plus(&mut self, amount: i32) {
        self.bonus = self.bonus.saturating_add(amount);
    }

    pub fn minus(&mut self, amount: i32) {
        self.bonus = self.bonus.saturating_sub(amount);
    }
}
