pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("7iP8cx3KbY4a2qrojSpJuEEmiErZdJvk5K463oDF7e4T");

#[program]
pub mod share_vault {
    use super::*;

    pub fn initialize_vault(ctx: Context<InitializeVault>) -> Result<()> {
        initialize_vault::handler(ctx)
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        deposit::handler(ctx, amount)
    }

    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        withdraw::handler(ctx, amount)
    }

    pub fn redeem(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
        redeem::handler(ctx, shares)
    }

    pub fn withdraw_all(ctx: Context<Withdraw>) -> Result<()> {
        withdraw_all::handler(ctx)
    }

    pub fn get_user_token(ctx: Context<UserInfo>, account: Pubkey) -> Result<u64> {
        queries::get_user_token(ctx, account)
    }

    pub fn total_share(ctx: Context<VaultInfo>) -> Result<u64> {
        queries::total_share(ctx)
    }

    pub fn user_shares(ctx: Context<UserInfo>, account: Pubkey) -> Result<u64> {
        queries::user_shares(ctx, account)
    }
}
