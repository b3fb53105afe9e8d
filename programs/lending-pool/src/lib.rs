pub mod constants;
pub mod error;
pub mod instructions;
pub mod math;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("CUdMRoH47e3FGcf8KHBScw9mNMa1G78HNA6M2QDneiDs");

#[program]
pub mod lending_pool {
    use super::*;

    pub fn init_reserve(ctx: Context<InitReserve>, liquidity_rate_bps: u16) -> Result<()> {
        init_reserve::handler(ctx, liquidity_rate_bps)
    }

    pub fn init_position(ctx: Context<InitPosition>) -> Result<()> {
        init_position::handler(ctx)
    }

    pub fn supply(
        ctx: Context<Supply>,
        amount: u64,
        on_behalf_of: Pubkey,
        referral_code: u16,
    ) -> Result<()> {
        supply::handler(ctx, amount, on_behalf_of, referral_code)
    }

    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        withdraw::handler(ctx, amount)
    }
}
