use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Amount must be greater than zero and mint or redeem a non-zero quantity")]
    InvalidAmount,
    #[msg("Depositor does not hold enough of the base token")]
    InsufficientBalance,
    #[msg("Request exceeds the caller's redeemable shares")]
    InsufficientShares,
    #[msg("Lending pool call did not move the expected balance")]
    ExternalCallFailure,
    #[msg("Vault has no shares outstanding")]
    EmptyVault,
    #[msg("Vault has shares outstanding but no claimable balance")]
    InvalidVaultState,
    #[msg("Math operation overflow")]
    MathOverflow,
    #[msg("Lending reserve does not lend the vault's base token")]
    InvalidPool,
}
