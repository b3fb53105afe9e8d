use anchor_lang::prelude::*;

use crate::constants::POSITION_SEED;
use crate::state::{Position, Reserve};

#[derive(Accounts)]
pub struct InitPosition<'info> {
    pub reserve: Account<'info, Reserve>,

    /// CHECK: any key may own a position, including program-derived addresses
    pub owner: UncheckedAccount<'info>,

    #[account(
        init,
        payer = payer,
        space = Position::LEN,
        seeds = [POSITION_SEED, reserve.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, Position>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitPosition>) -> Result<()> {
    let position = &mut ctx.accounts.position;

    position.reserve = ctx.accounts.reserve.key();
    position.owner = ctx.accounts.owner.key();
    position.scaled_balance = 0;
    position.bump = ctx.bumps.position;

    msg!("Position {} opened for {}", position.key(), position.owner);

    Ok(())
}
