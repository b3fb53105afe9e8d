use anchor_lang::prelude::*;

#[error_code]
pub enum LendingPoolError {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Math operation overflow")]
    MathOverflow,
    #[msg("Requested amount exceeds the position balance")]
    NotEnoughAvailableUserBalance,
    #[msg("Reserve does not hold enough liquidity")]
    InsufficientLiquidity,
    #[msg("Liquidity rate is out of range")]
    InvalidLiquidityRate,
}
