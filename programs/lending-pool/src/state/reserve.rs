use anchor_lang::prelude::*;

use crate::math::{linear_interest, to_u64, wad_mul, WAD};

#[account]
#[derive(Debug)]
pub struct Reserve {
    /// The base asset supplied to this reserve
    pub base_mint: Pubkey,
    /// Token account holding the reserve liquidity, owned by the reserve PDA
    pub liquidity_vault: Pubkey,
    /// Cumulative income factor at `last_update_slot` (WAD)
    pub liquidity_index: u128,
    /// Annual supply rate (WAD)
    pub liquidity_rate: u128,
    pub last_update_slot: u64,
    /// Sum of every position's scaled balance
    pub total_scaled: u128,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl Reserve {
    pub const LEN: usize = 8 + // discriminator
        32 + // base_mint
        32 + // liquidity_vault
        16 + // liquidity_index
        16 + // liquidity_rate
        8 + // last_update_slot
        16 + // total_scaled
        1; // bump

    /// Liquidity index as it would be after accruing up to `slot`.
    pub fn normalized_income(&self, slot: u64) -> Result<u128> {
        let elapsed = slot.saturating_sub(self.last_update_slot);
        if elapsed == 0 {
            return Ok(self.liquidity_index);
        }
        wad_mul(
            linear_interest(self.liquidity_rate, elapsed)?,
            self.liquidity_index,
        )
    }

    /// Base units a supply at `slot` may lose to scaled-balance rounding:
    /// half a scaled unit on credit and one unit on the balance read.
    pub fn supply_rounding(&self, slot: u64) -> Result<u64> {
        let one_scaled_unit = to_u64(self.normalized_income(slot)?.div_ceil(WAD))?;
        Ok(one_scaled_unit.saturating_add(1))
    }

    pub fn accrue(&mut self, slot: u64) -> Result<()> {
        if slot > self.last_update_slot {
            self.liquidity_index = self.normalized_income(slot)?;
            self.last_update_slot = slot;
        }
        Ok(())
    }
}
