use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{POSITION_SEED, RESERVE_SEED};
use crate::error::LendingPoolError;
use crate::math::wad_div;
use crate::state::{Position, Reserve};

#[derive(Accounts)]
#[instruction(amount: u64, on_behalf_of: Pubkey)]
pub struct Supply<'info> {
    #[account(
        mut,
        seeds = [RESERVE_SEED, base_mint.key().as_ref()],
        bump = reserve.bump,
        has_one = base_mint,
        has_one = liquidity_vault,
    )]
    pub reserve: Account<'info, Reserve>,

    pub base_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub liquidity_vault: InterfaceAccount<'info, TokenAccount>,

    /// Position credited with the supply
    #[account(
        mut,
        seeds = [POSITION_SEED, reserve.key().as_ref(), on_behalf_of.as_ref()],
        bump = position.bump,
    )]
    pub position: Account<'info, Position>,

    pub supplier: Signer<'info>,

    #[account(
        mut,
        token::mint = base_mint,
        token::authority = supplier,
    )]
    pub supplier_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(
    ctx: Context<Supply>,
    amount: u64,
    on_behalf_of: Pubkey,
    referral_code: u16,
) -> Result<()> {
    require!(amount > 0, LendingPoolError::InvalidAmount);

    let slot = Clock::get()?.slot;
    let reserve = &mut ctx.accounts.reserve;
    reserve.accrue(slot)?;

    let scaled = wad_div(amount as u128, reserve.liquidity_index)?;
    require!(scaled > 0, LendingPoolError::InvalidAmount);

    let transfer_accounts = TransferChecked {
        from: ctx.accounts.supplier_token_account.to_account_info(),
        mint: ctx.accounts.base_mint.to_account_info(),
        to: ctx.accounts.liquidity_vault.to_account_info(),
        authority: ctx.accounts.supplier.to_account_info(),
    };

    let cpi_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.base_mint.decimals)?;

    let position = &mut ctx.accounts.position;
    position.scaled_balance = position
        .scaled_balance
        .checked_add(scaled)
        .ok_or(LendingPoolError::MathOverflow)?;
    reserve.total_scaled = reserve
        .total_scaled
        .checked_add(scaled)
        .ok_or(LendingPoolError::MathOverflow)?;

    msg!("Supplied {} on behalf of {}", amount, on_behalf_of);
    msg!("Scaled units credited: {}", scaled);
    msg!("Liquidity index: {}", reserve.liquidity_index);
    if referral_code != 0 {
        msg!("Referral code: {}", referral_code);
    }

    Ok(())
}
