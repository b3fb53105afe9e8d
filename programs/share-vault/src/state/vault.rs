use anchor_lang::prelude::*;

use crate::constants::VAULT_SEED;
use crate::error::VaultError;
use crate::math::{shares_for, shares_to_burn, value_for};
use crate::state::UserShares;

#[account]
#[derive(Debug, Default)]
pub struct Vault {
    /// The base asset mint users deposit and withdraw
    pub token: Pubkey,
    /// The lending reserve the base asset is supplied to
    pub pool: Pubkey,
    /// The vault's receipt position in `pool`
    pub a_token: Pubkey,
    /// The token account holding base assets in transit
    pub token_account: Pubkey,
    /// Shares outstanding across every depositor
    pub total_shares: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl Vault {
    pub const LEN: usize = 8 + // discriminator
        32 + // token
        32 + // pool
        32 + // a_token
        32 + // token_account
        8 + // total_shares
        1; // bump

    pub fn signer_seeds(&self) -> [&[u8]; 4] {
        [
            VAULT_SEED,
            self.token.as_ref(),
            self.pool.as_ref(),
            std::slice::from_ref(&self.bump),
        ]
    }

    /// Base-asset value of `shares` at the given claimable balance.
    pub fn value_of(&self, shares: u64, claimable: u64) -> Result<u64> {
        value_for(shares, self.total_shares, claimable)
    }

    /// Shares to mint for a deposit of `amount`, priced against the balance
    /// read before the deposit reached the pool.
    pub fn shares_for_deposit(&self, amount: u64, claimable_before: u64) -> Result<u64> {
        require!(amount > 0, VaultError::InvalidAmount);

        let shares = shares_for(amount, self.total_shares, claimable_before)?;
        require!(shares > 0, VaultError::InvalidAmount);

        Ok(shares)
    }

    /// Shares `user` burns to take out `amount` of base value.
    pub fn shares_for_withdraw(
        &self,
        user: &UserShares,
        amount: u64,
        claimable: u64,
    ) -> Result<u64> {
        require!(amount > 0, VaultError::InvalidAmount);
        require!(self.total_shares > 0, VaultError::EmptyVault);

        let redeemable = self.value_of(user.shares, claimable)?;
        require_gte!(redeemable, amount, VaultError::InsufficientShares);

        let shares = shares_to_burn(amount, self.total_shares, claimable)?;
        require_gte!(user.shares, shares, VaultError::InsufficientShares);

        Ok(shares)
    }

    /// Base value paid out when `user` redeems exactly `shares`.
    pub fn value_for_redeem(&self, user: &UserShares, shares: u64, claimable: u64) -> Result<u64> {
        require!(shares > 0, VaultError::InvalidAmount);
        require!(self.total_shares > 0, VaultError::EmptyVault);
        require_gte!(user.shares, shares, VaultError::InsufficientShares);

        let value = self.value_of(shares, claimable)?;
        require!(value > 0, VaultError::InvalidAmount);

        Ok(value)
    }

    pub fn mint_shares(&mut self, user: &mut UserShares, shares: u64) -> Result<()> {
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        user.shares = user
            .shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    pub fn burn_shares(&mut self, user: &mut UserShares, shares: u64) -> Result<()> {
        user.shares = user
            .shares
            .checked_sub(shares)
            .ok_or(VaultError::InsufficientShares)?;
        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::InvalidVaultState)?;
        Ok(())
    }
}
