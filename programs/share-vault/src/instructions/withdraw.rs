use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};
use lending_pool::cpi::accounts::Withdraw as PoolWithdraw;
use lending_pool::program::LendingPool;
use lending_pool::state::{Position, Reserve};

use crate::constants::{USER_SHARES_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::WithdrawEvent;
use crate::state::{UserShares, Vault};

/// Accounts shared by `withdraw`, `redeem` and `withdraw_all`.
#[derive(Accounts)]
pub struct Withdraw<'info> {
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

    /// The lending reserve holding the vault's deposits
    #[account(mut)]
    pub pool: Box<Account<'info, Reserve>>,

    /// The reserve's liquidity account
    #[account(mut, address = pool.liquidity_vault)]
    pub pool_liquidity_vault: InterfaceAccount<'info, TokenAccount>,

    /// The vault's receipt position in the reserve
    #[account(mut)]
    pub a_token: Box<Account<'info, Position>>,

    /// CHECK: the caller's entry in the share ledger, read through
    /// `UserShares::load_or_empty`; it does not exist until the first deposit
    #[account(
        mut,
        seeds = [USER_SHARES_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub user_shares: UncheckedAccount<'info>,

    /// The caller's token account receiving the base asset
    #[account(
        mut,
        token::mint = token_mint,
        token::authority = owner,
    )]
    pub owner_token_account: InterfaceAccount<'info, TokenAccount>,

    pub owner: Signer<'info>,

    pub lending_pool_program: Program<'info, LendingPool>,
    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> Withdraw<'info> {
    /// The caller's ledger entry; a caller who never deposited holds zero shares.
    pub fn ledger_entry(&self) -> Result<UserShares> {
        UserShares::load_or_empty(&self.user_shares, self.vault.key(), self.owner.key())
    }

    /// Live receipt balance of the vault.
    pub fn claimable(&self) -> Result<u64> {
        let slot = Clock::get()?.slot;
        self.a_token.balance_of(&self.pool, slot)
    }

    /// Pulls `amount` out of the lending pool into custody and forwards it
    /// to the caller.
    pub fn pay_out(&mut self, amount: u64) -> Result<()> {
        let custody_before = self.token_account.amount;
        let vault_seeds = self.vault.signer_seeds();
        let signer_seeds = &[&vault_seeds[..]];

        let withdraw_accounts = PoolWithdraw {
            reserve: self.pool.to_account_info(),
            base_mint: self.token_mint.to_account_info(),
            liquidity_vault: self.pool_liquidity_vault.to_account_info(),
            position: self.a_token.to_account_info(),
            owner: self.vault.to_account_info(),
            destination: self.token_account.to_account_info(),
            token_program: self.token_program.to_account_info(),
        };

        let cpi_ctx = CpiContext::new_with_signer(
            self.lending_pool_program.to_account_info(),
            withdraw_accounts,
            signer_seeds,
        );

        lending_pool::cpi::withdraw(cpi_ctx, amount)?;

        self.token_account.reload()?;
        let received = self
            .token_account
            .amount
            .checked_sub(custody_before)
            .ok_or(VaultError::ExternalCallFailure)?;
        require_eq!(received, amount, VaultError::ExternalCallFailure);

        let transfer_accounts = TransferChecked {
            from: self.token_account.to_account_info(),
            mint: self.token_mint.to_account_info(),
            to: self.owner_token_account.to_account_info(),
            authority: self.vault.to_account_info(),
        };

        let cpi_ctx = CpiContext::new_with_signer(
            self.token_program.to_account_info(),
            transfer_accounts,
            signer_seeds,
        );

        transfer_checked(cpi_ctx, amount, self.token_mint.decimals)
    }

    /// Burns `shares` from the caller, logs and emits the withdrawal record.
    pub fn settle(
        &mut self,
        mut user_shares: UserShares,
        amount: u64,
        shares: u64,
        claimable_before: u64,
    ) -> Result<()> {
        let total_shares_before = self.vault.total_shares;
        let vault = &mut self.vault;
        vault.burn_shares(&mut user_shares, shares)?;
        user_shares.store(&self.user_shares)?;

        msg!("Withdraw successful!");
        msg!("Withdrawn: {} tokens", amount);
        msg!("Burned: {} shares", shares);
        msg!("Remaining total shares: {}", vault.total_shares);
        msg!("Remaining user shares: {}", user_shares.shares);

        emit!(WithdrawEvent {
            vault: vault.key(),
            owner: self.owner.key(),
            amount,
            shares_burned: shares,
            claimable_before,
            total_shares_before,
        });

        Ok(())
    }
}

pub fn handler(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
    let user_shares = ctx.accounts.ledger_entry()?;
    let claimable = ctx.accounts.claimable()?;
    let shares_to_burn = ctx
        .accounts
        .vault
        .shares_for_withdraw(&user_shares, amount, claimable)?;

    ctx.accounts.pay_out(amount)?;
    ctx.accounts.settle(user_shares, amount, shares_to_burn, claimable)
}
