use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use lending_pool::cpi::accounts::InitPosition;
use lending_pool::program::LendingPool;
use lending_pool::state::Reserve;

use crate::constants::{VAULT_SEED, VAULT_TOKEN_ACCOUNT_SEED};
use crate::error::VaultError;
use crate::events::VaultInitializedEvent;
use crate::state::Vault;

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(
        init,
        payer = payer,
        space = Vault::LEN,
        seeds = [VAULT_SEED, token_mint.key().as_ref(), pool.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    /// The base asset mint that the vault will accept
    pub token_mint: InterfaceAccount<'info, Mint>,

    /// The lending reserve that will hold the vault's deposits
    #[account(
        constraint = pool.base_mint == token_mint.key() @ VaultError::InvalidPool,
    )]
    pub pool: Box<Account<'info, Reserve>>,

    /// CHECK: created by the lending pool as the vault's receipt position
    #[account(mut)]
    pub a_token: UncheckedAccount<'info>,

    /// The token account that holds base assets on their way to or from the pool
    #[account(
        init,
        payer = payer,
        token::mint = token_mint,
        token::authority = vault,
        token::token_program = token_program,
        seeds = [VAULT_TOKEN_ACCOUNT_SEED, vault.key().as_ref()],
        bump
    )]
    pub token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub lending_pool_program: Program<'info, LendingPool>,
    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<InitializeVault>) -> Result<()> {
    let position_accounts = InitPosition {
        reserve: ctx.accounts.pool.to_account_info(),
        owner: ctx.accounts.vault.to_account_info(),
        position: ctx.accounts.a_token.to_account_info(),
        payer: ctx.accounts.payer.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };

    let cpi_ctx = CpiContext::new(
        ctx.accounts.lending_pool_program.to_account_info(),
        position_accounts,
    );

    lending_pool::cpi::init_position(cpi_ctx)?;

    let vault = &mut ctx.accounts.vault;

    vault.token = ctx.accounts.token_mint.key();
    vault.pool = ctx.accounts.pool.key();
    vault.a_token = ctx.accounts.a_token.key();
    vault.token_account = ctx.accounts.token_account.key();
    vault.total_shares = 0;
    vault.bump = ctx.bumps.vault;

    msg!("Vault initialized successfully!");
    msg!("Vault: {}", vault.key());
    msg!("Token: {}", vault.token);
    msg!("Pool: {}", vault.pool);
    msg!("aToken: {}", vault.a_token);
    msg!("Vault Token Account: {}", vault.token_account);

    emit!(VaultInitializedEvent {
        vault: vault.key(),
        token: vault.token,
        pool: vault.pool,
        a_token: vault.a_token,
    });

    Ok(())
}
