//! WAD fixed-point helpers for the liquidity index.
//!
//! `wad_mul` and `wad_div` round half up and drive the index and supply
//! credit. Position balances round down and partial-withdraw burns round up,
//! so a position never reports more than it can redeem.

use anchor_lang::prelude::*;

use crate::error::LendingPoolError;

pub const WAD: u128 = 1_000_000_000_000_000_000;
const HALF_WAD: u128 = WAD / 2;

// 2 slots per second * 60 * 60 * 24 * 365
pub const SLOTS_PER_YEAR: u64 = 63_072_000;

pub const BPS_DENOMINATOR: u128 = 10_000;

pub fn wad_mul(a: u128, b: u128) -> Result<u128> {
    let product = a.checked_mul(b).ok_or(LendingPoolError::MathOverflow)?;
    let rounded = product
        .checked_add(HALF_WAD)
        .ok_or(LendingPoolError::MathOverflow)?;
    Ok(rounded / WAD)
}

pub fn wad_div(a: u128, b: u128) -> Result<u128> {
    require!(b > 0, LendingPoolError::MathOverflow);
    let scaled = a.checked_mul(WAD).ok_or(LendingPoolError::MathOverflow)?;
    let rounded = scaled
        .checked_add(b / 2)
        .ok_or(LendingPoolError::MathOverflow)?;
    Ok(rounded / b)
}

pub fn wad_mul_down(a: u128, b: u128) -> Result<u128> {
    let product = a.checked_mul(b).ok_or(LendingPoolError::MathOverflow)?;
    Ok(product / WAD)
}

pub fn wad_div_up(a: u128, b: u128) -> Result<u128> {
    require!(b > 0, LendingPoolError::MathOverflow);
    let scaled = a.checked_mul(WAD).ok_or(LendingPoolError::MathOverflow)?;
    Ok(scaled.div_ceil(b))
}

/// Annual rate in basis points to a WAD-scaled rate.
pub fn bps_to_wad(bps: u16) -> u128 {
    (bps as u128) * WAD / BPS_DENOMINATOR
}

/// Growth factor of simple interest at `rate` over `elapsed_slots`.
pub fn linear_interest(rate: u128, elapsed_slots: u64) -> Result<u128> {
    let accrued = rate
        .checked_mul(elapsed_slots as u128)
        .ok_or(LendingPoolError::MathOverflow)?
        / SLOTS_PER_YEAR as u128;
    WAD.checked_add(accrued)
        .ok_or_else(|| error!(LendingPoolError::MathOverflow))
}

pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(LendingPoolError::MathOverflow))
}
