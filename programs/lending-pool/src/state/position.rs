use anchor_lang::prelude::*;

use crate::math::{to_u64, wad_mul_down};
use crate::state::Reserve;

/// Receipt balance of one owner in one reserve.
#[account]
#[derive(Debug)]
pub struct Position {
    pub reserve: Pubkey,
    pub owner: Pubkey,
    /// Balance divided by the liquidity index at the time of each supply
    pub scaled_balance: u128,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8 + // discriminator
        32 + // reserve
        32 + // owner
        16 + // scaled_balance
        1; // bump

    /// Current redeemable balance, interest included, rounded down.
    pub fn balance_of(&self, reserve: &Reserve, slot: u64) -> Result<u64> {
        if self.scaled_balance == 0 {
            return Ok(0);
        }
        to_u64(wad_mul_down(
            self.scaled_balance,
            reserve.normalized_income(slot)?,
        )?)
    }
}
