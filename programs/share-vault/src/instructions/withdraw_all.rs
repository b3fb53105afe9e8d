use anchor_lang::prelude::*;

use crate::error::VaultError;
use crate::instructions::{redeem, Withdraw};

pub fn handler(ctx: Context<Withdraw>) -> Result<()> {
    let shares = ctx.accounts.ledger_entry()?.shares;
    require!(shares > 0, VaultError::InsufficientShares);

    redeem::handler(ctx, shares)
}
