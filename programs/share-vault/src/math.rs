//! Conversions between vault shares and base-asset value.
//!
//! `claimable` is always the vault's live receipt balance in the lending
//! pool. Products are taken in `u128`; results that do not fit in `u64`
//! are reported as `MathOverflow`.
//!
//! | Conversion       | Used by           | Rounding |
//! |------------------|-------------------|----------|
//! | value -> shares  | deposit           | down     |
//! | value -> shares  | withdraw (burn)   | up       |
//! | shares -> value  | redeem, queries   | down     |

use anchor_lang::prelude::*;

use crate::error::VaultError;

/// Shares minted for depositing `amount` against the pre-deposit balance.
///
/// An empty vault prices one share at one unit of base value.
pub fn shares_for(amount: u64, total_shares: u64, claimable: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(amount);
    }
    require!(claimable > 0, VaultError::InvalidVaultState);

    let shares = (amount as u128)
        .checked_mul(total_shares as u128)
        .ok_or(VaultError::MathOverflow)?
        .checked_div(claimable as u128)
        .ok_or(VaultError::MathOverflow)?;

    to_u64(shares)
}

/// Shares burned to pay out `amount`, rounded so the caller always covers it.
pub fn shares_to_burn(amount: u64, total_shares: u64, claimable: u64) -> Result<u64> {
    require!(total_shares > 0, VaultError::EmptyVault);
    require!(claimable > 0, VaultError::InvalidVaultState);

    let numerator = (amount as u128)
        .checked_mul(total_shares as u128)
        .ok_or(VaultError::MathOverflow)?;
    let shares = numerator
        .checked_add(claimable as u128 - 1)
        .ok_or(VaultError::MathOverflow)?
        / claimable as u128;

    to_u64(shares)
}

/// Base-asset value of `shares`; zero while no shares are outstanding.
pub fn value_for(shares: u64, total_shares: u64, claimable: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(0);
    }

    let value = (shares as u128)
        .checked_mul(claimable as u128)
        .ok_or(VaultError::MathOverflow)?
        .checked_div(total_shares as u128)
        .ok_or(VaultError::MathOverflow)?;

    to_u64(value)
}

/// Whether the pool credited a supply of `amount` in full, allowing it to
/// lose up to `tolerance` units to its own rounding.
pub fn credit_covers(amount: u64, credited: u64, tolerance: u64) -> bool {
    credited > 0 && credited.saturating_add(tolerance) >= amount
}

fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}
