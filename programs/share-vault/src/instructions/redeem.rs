use anchor_lang::prelude::*;

use crate::instructions::Withdraw;

/// Burns exactly `shares` and pays out their current value.
pub fn handler(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
    let user_shares = ctx.accounts.ledger_entry()?;
    let claimable = ctx.accounts.claimable()?;
    let value = ctx
        .accounts
        .vault
        .value_for_redeem(&user_shares, shares, claimable)?;

    ctx.accounts.pay_out(value)?;
    ctx.accounts.settle(user_shares, value, shares, claimable)
}
