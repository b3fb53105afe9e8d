use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{POSITION_SEED, RESERVE_SEED, WITHDRAW_ALL};
use crate::error::LendingPoolError;
use crate::math::wad_div_up;
use crate::state::{Position, Reserve};

#[derive(Accounts)]
pub struct Withdraw<'info> {
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

    #[account(
        mut,
        seeds = [POSITION_SEED, reserve.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
        has_one = owner,
    )]
    pub position: Account<'info, Position>,

    pub owner: Signer<'info>,

    /// Receives the withdrawn base asset
    #[account(
        mut,
        token::mint = base_mint,
    )]
    pub destination: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Scaled units to burn for `amount`, rounded up. Withdrawing the full
/// balance clears the position so no scaled dust is left behind.
pub fn scaled_to_burn(amount: u64, balance: u64, scaled_balance: u128, index: u128) -> Result<u128> {
    if amount == balance {
        return Ok(scaled_balance);
    }
    Ok(wad_div_up(amount as u128, index)?.min(scaled_balance))
}

pub fn handler(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
    require!(amount > 0, LendingPoolError::InvalidAmount);

    let slot = Clock::get()?.slot;
    let reserve = &mut ctx.accounts.reserve;
    reserve.accrue(slot)?;

    let position = &mut ctx.accounts.position;
    let balance = position.balance_of(reserve, slot)?;
    let amount = if amount == WITHDRAW_ALL { balance } else { amount };

    require!(amount > 0, LendingPoolError::InvalidAmount);
    require_gte!(
        balance,
        amount,
        LendingPoolError::NotEnoughAvailableUserBalance
    );
    require_gte!(
        ctx.accounts.liquidity_vault.amount,
        amount,
        LendingPoolError::InsufficientLiquidity
    );

    let burned = scaled_to_burn(
        amount,
        balance,
        position.scaled_balance,
        reserve.liquidity_index,
    )?;
    position.scaled_balance -= burned;
    reserve.total_scaled = reserve
        .total_scaled
        .checked_sub(burned)
        .ok_or(LendingPoolError::MathOverflow)?;

    let base_mint_key = reserve.base_mint;
    let reserve_seeds = &[
        RESERVE_SEED,
        base_mint_key.as_ref(),
        &[reserve.bump],
    ];
    let signer_seeds = &[&reserve_seeds[..]];

    let transfer_accounts = TransferChecked {
        from: ctx.accounts.liquidity_vault.to_account_info(),
        mint: ctx.accounts.base_mint.to_account_info(),
        to: ctx.accounts.destination.to_account_info(),
        authority: reserve.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
        signer_seeds,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.base_mint.decimals)?;

    msg!("Withdrawn {} to {}", amount, ctx.accounts.destination.key());
    msg!("Scaled units burned: {}", burned);
    msg!("Remaining position balance: {}", balance - amount);

    Ok(())
}
