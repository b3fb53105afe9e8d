use anchor_lang::prelude::*;

#[constant]
pub const VAULT_SEED: &[u8] = b"vault";
#[constant]
pub const VAULT_TOKEN_ACCOUNT_SEED: &[u8] = b"vault_token_account";
#[constant]
pub const USER_SHARES_SEED: &[u8] = b"user_shares";

/// Referral code forwarded to the lending pool on every supply
#[constant]
pub const REFERRAL_CODE: u16 = 0;
