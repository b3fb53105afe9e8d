use anchor_lang::prelude::*;
use lending_pool::state::{Position, Reserve};

use crate::constants::USER_SHARES_SEED;
use crate::state::{UserShares, Vault};

#[derive(Accounts)]
pub struct VaultInfo<'info> {
    pub vault: Account<'info, Vault>,
}

#[derive(Accounts)]
#[instruction(account: Pubkey)]
pub struct UserInfo<'info> {
    #[account(has_one = pool, has_one = a_token)]
    pub vault: Account<'info, Vault>,

    pub pool: Box<Account<'info, Reserve>>,

    pub a_token: Box<Account<'info, Position>>,

    /// CHECK: ledger entry of `account`; it may not exist yet
    #[account(
        seeds = [USER_SHARES_SEED, vault.key().as_ref(), account.as_ref()],
        bump
    )]
    pub user_shares: UncheckedAccount<'info>,
}

pub fn total_share(ctx: Context<VaultInfo>) -> Result<u64> {
    Ok(ctx.accounts.vault.total_shares)
}

pub fn user_shares(ctx: Context<UserInfo>, account: Pubkey) -> Result<u64> {
    let shares = UserShares::shares_in(&ctx.accounts.user_shares)?;
    msg!("{} holds {} shares", account, shares);
    Ok(shares)
}

/// Value `account` could withdraw right now, interest included.
pub fn get_user_token(ctx: Context<UserInfo>, account: Pubkey) -> Result<u64> {
    let shares = UserShares::shares_in(&ctx.accounts.user_shares)?;
    let slot = Clock::get()?.slot;
    let claimable = ctx.accounts.a_token.balance_of(&ctx.accounts.pool, slot)?;
    let value = ctx.accounts.vault.value_of(shares, claimable)?;

    msg!("{} can withdraw {} tokens", account, value);
    Ok(value)
}
