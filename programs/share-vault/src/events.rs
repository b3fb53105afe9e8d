use anchor_lang::prelude::*;

#[event]
pub struct VaultInitializedEvent {
    pub vault: Pubkey,
    pub token: Pubkey,
    pub pool: Pubkey,
    pub a_token: Pubkey,
}

#[event]
pub struct DepositEvent {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
    //--- exchange rate used
    pub claimable_before: u64,
    pub total_shares_before: u64,
}

#[event]
pub struct WithdrawEvent {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub shares_burned: u64,
    //--- exchange rate used
    pub claimable_before: u64,
    pub total_shares_before: u64,
}
