//! Randomness used by the battle.
//!
//! Only the speed tie-break draws from here. [`BattleMechanics`] owns a boxed
//! [`BattleRng`], so a replay can reuse a seed and a test can script the
//! flips outright.
//!
//! [`BattleMechanics`]: crate::mechanics::BattleMechanics

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

/// Source of random numbers for a battle
pub trait BattleRng {
    fn next_u32(&mut self) -> u32;

    /// Uniform-ish value in `[0, bound)`; `0` for an empty range
    fn gen_range(&mut self, bound: usize) -> usize {
        match bound {
            0 => 0,
            _ => self.next_u32() as usize % bound,
        }
    }

    /// Heads on an odd draw
    fn coin_flip(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }
}

/// Stand-in state for a zero seed, which would lock xorshift at zero
const ZERO_SEED_STATE: u64 = 0x9E37_79B9_7F4A_7C15;

/// 64-bit xorshift generator yielding the high half of its state.
///
/// Equal seeds replay equal tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = if seed == 0 { ZERO_SEED_STATE } else { seed };
        Self { state }
    }
}

impl BattleRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut state = self.state;
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        self.state = state;
        (state >> 32) as u32
    }
}
