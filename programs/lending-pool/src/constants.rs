use anchor_lang::prelude::*;

#[constant]
pub const RESERVE_SEED: &[u8] = b"reserve";
#[constant]
pub const LIQUIDITY_VAULT_SEED: &[u8] = b"liquidity_vault";
#[constant]
pub const POSITION_SEED: &[u8] = b"position";

/// Passing this amount to `withdraw` redeems the whole position.
#[constant]
pub const WITHDRAW_ALL: u64 = u64::MAX;

#[constant]
pub const MAX_LIQUIDITY_RATE_BPS: u16 = 10_000;
