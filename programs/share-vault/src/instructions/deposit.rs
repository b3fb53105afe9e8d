use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};
use lending_pool::cpi::accounts::Supply;
use lending_pool::program::LendingPool;
use lending_pool::state::{Position, Reserve};

use crate::constants::{REFERRAL_CODE, USER_SHARES_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::DepositEvent;
use crate::math::credit_covers;
use crate::state::{UserShares, Vault};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, token_mint.key().as_ref(), pool.key().as_ref()],
        bump = vault.bump,
        has_one = pool,
        has_one = a_token,
        has_one = token_account,
    )]
    pub vault: Account<'info, Vault>,

    /// The base asset mint
    #[account(address = vault.token)]
    pub token_mint: InterfaceAccount<'info, Mint>,

    /// The vault's custody account for the base asset
    #[account(mut)]
    pub token_account: InterfaceAccount<'info, TokenAccount>,

    /// The lending reserve receiving the deposit
    #[account(mut)]
    pub pool: Box<Account<'info, Reserve>>,

    /// The reserve's liquidity account
    #[account(mut, address = pool.liquidity_vault)]
    pub pool_liquidity_vault: InterfaceAccount<'info, TokenAccount>,

    /// The vault's receipt position in the reserve
    #[account(mut)]
    pub a_token: Box<Account<'info, Position>>,

    /// The depositor's entry in the share ledger
    #[account(
        init_if_needed,
        payer = depositor,
        space = UserShares::LEN,
        seeds = [USER_SHARES_SEED, vault.key().as_ref(), depositor.key().as_ref()],
        bump
    )]
    pub user_shares: Account<'info, UserShares>,

    /// The depositor's token account for the base asset
    #[account(
        mut,
        token::mint = token_mint,
        token::authority = depositor,
    )]
    pub depositor_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub lending_pool_program: Program<'info, LendingPool>,
    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    require!(amount > 0, VaultError::InvalidAmount);
    require_gte!(
        ctx.accounts.depositor_token_account.amount,
        amount,
        VaultError::InsufficientBalance
    );

    let slot = Clock::get()?.slot;

    // Price the deposit before it reaches the pool so it does not dilute itself
    let claimable_before = ctx.accounts.a_token.balance_of(&ctx.accounts.pool, slot)?;
    let total_shares_before = ctx.accounts.vault.total_shares;
    let shares_to_mint = ctx
        .accounts
        .vault
        .shares_for_deposit(amount, claimable_before)?;

    // Transfer base tokens from depositor to vault custody
    let transfer_accounts = TransferChecked {
        from: ctx.accounts.depositor_token_account.to_account_info(),
        mint: ctx.accounts.token_mint.to_account_info(),
        to: ctx.accounts.token_account.to_account_info(),
        authority: ctx.accounts.depositor.to_account_info(),
    };

    let cpi_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.token_mint.decimals)?;

    // Supply custody to the lending pool on behalf of the vault
    let vault_seeds = ctx.accounts.vault.signer_seeds();
    let signer_seeds = &[&vault_seeds[..]];

    let supply_accounts = Supply {
        reserve: ctx.accounts.pool.to_account_info(),
        base_mint: ctx.accounts.token_mint.to_account_info(),
        liquidity_vault: ctx.accounts.pool_liquidity_vault.to_account_info(),
        position: ctx.accounts.a_token.to_account_info(),
        supplier: ctx.accounts.vault.to_account_info(),
        supplier_token_account: ctx.accounts.token_account.to_account_info(),
        token_program: ctx.accounts.token_program.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.lending_pool_program.to_account_info(),
        supply_accounts,
        signer_seeds,
    );

    lending_pool::cpi::supply(cpi_ctx, amount, ctx.accounts.vault.key(), REFERRAL_CODE)?;

    ctx.accounts.pool.reload()?;
    ctx.accounts.a_token.reload()?;
    let claimable_after = ctx.accounts.a_token.balance_of(&ctx.accounts.pool, slot)?;
    let credited = claimable_after.saturating_sub(claimable_before);
    let tolerance = ctx.accounts.pool.supply_rounding(slot)?;
    require!(
        credit_covers(amount, credited, tolerance),
        VaultError::ExternalCallFailure
    );

    let depositor = ctx.accounts.depositor.key();
    let vault_key = ctx.accounts.vault.key();
    let user_shares = &mut ctx.accounts.user_shares;
    if user_shares.owner == Pubkey::default() {
        user_shares.vault = vault_key;
        user_shares.owner = depositor;
        user_shares.bump = ctx.bumps.user_shares;
    }

    let vault = &mut ctx.accounts.vault;
    vault.mint_shares(user_shares, shares_to_mint)?;

    msg!("Deposit successful!");
    msg!("Deposited: {} tokens", amount);
    msg!("Minted: {} shares", shares_to_mint);
    msg!("Claimable balance: {} -> {}", claimable_before, claimable_after);
    msg!("Total shares: {}", vault.total_shares);
    msg!("User shares: {}", user_shares.shares);

    emit!(DepositEvent {
        vault: vault_key,
        depositor,
        amount,
        shares_minted: shares_to_mint,
        claimable_before,
        total_shares_before,
    });

    Ok(())
}
