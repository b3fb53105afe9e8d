use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{LIQUIDITY_VAULT_SEED, MAX_LIQUIDITY_RATE_BPS, RESERVE_SEED};
use crate::error::LendingPoolError;
use crate::math::{bps_to_wad, WAD};
use crate::state::Reserve;

#[derive(Accounts)]
pub struct InitReserve<'info> {
    #[account(
        init,
        payer = payer,
        space = Reserve::LEN,
        seeds = [RESERVE_SEED, base_mint.key().as_ref()],
        bump
    )]
    pub reserve: Account<'info, Reserve>,

    /// The base asset lent out by this reserve
    pub base_mint: InterfaceAccount<'info, Mint>,

    /// Liquidity held by the reserve
    #[account(
        init,
        payer = payer,
        token::mint = base_mint,
        token::authority = reserve,
        token::token_program = token_program,
        seeds = [LIQUIDITY_VAULT_SEED, reserve.key().as_ref()],
        bump
    )]
    pub liquidity_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<InitReserve>, liquidity_rate_bps: u16) -> Result<()> {
    require!(
        liquidity_rate_bps <= MAX_LIQUIDITY_RATE_BPS,
        LendingPoolError::InvalidLiquidityRate
    );

    let reserve = &mut ctx.accounts.reserve;

    reserve.base_mint = ctx.accounts.base_mint.key();
    reserve.liquidity_vault = ctx.accounts.liquidity_vault.key();
    reserve.liquidity_index = WAD;
    reserve.liquidity_rate = bps_to_wad(liquidity_rate_bps);
    reserve.last_update_slot = Clock::get()?.slot;
    reserve.total_scaled = 0;
    reserve.bump = ctx.bumps.reserve;

    msg!("Reserve initialized: {}", reserve.key());
    msg!("Base mint: {}", reserve.base_mint);
    msg!("Liquidity rate: {} bps", liquidity_rate_bps);

    Ok(())
}
