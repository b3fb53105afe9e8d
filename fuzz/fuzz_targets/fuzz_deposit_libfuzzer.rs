#![no_main]

use arbitrary::Arbitrary;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use lending_pool::error::LendingPoolError;
use share_vault::error::VaultError;

/// Fuzzable input for the deposit instruction
#[derive(Debug, Clone, Arbitrary)]
struct DepositFuzzInput {
    /// Amount to deposit (fuzzed)
    amount: u64,
    /// Extra user balance on top of what the scenario needs
    initial_balance: u64,
    /// Token decimals (for setup)
    decimals: u8,
    /// Reserve liquidity rate in basis points
    liquidity_rate_bps: u16,
    /// Slots to let interest accrue before the fuzzed deposit
    accrual_slots: u32,
    /// Whether another user deposits first (to test subsequent deposit scenarios)
    do_initial_deposit: bool,
    /// Initial deposit amount (if do_initial_deposit is true)
    initial_deposit_amount: u64,
}

/// Execute a single fuzz iteration for the deposit instruction
async fn fuzz_deposit_once(input: DepositFuzzInput) -> FuzzResult<()> {
    let amount = input.amount.max(1);
    let initial_deposit = input.initial_deposit_amount.max(1);
    let initial_balance = input
        .initial_balance
        .saturating_add(amount)
        .saturating_add(initial_deposit);
    let decimals = input.decimals % 19;
    let liquidity_rate_bps = input.liquidity_rate_bps % 10_001;
    let accrual_slots = u64::from(input.accrual_slots % 1_000_000);

    let (mut env, setup) = match setup_complete_environment(
        initial_balance,
        decimals,
        liquidity_rate_bps,
        2,
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Setup failed: {}", e);
            return Ok(());
        }
    };

    let vault = &setup.vault;
    let seed_user = &setup.users[0];
    let user = &setup.users[1];

    // SCENARIO 1: another depositor already holds shares
    if input.do_initial_deposit {
        let ix = deposit_ix(vault, seed_user, initial_deposit);
        if process_user_ix(&mut env.context, ix, seed_user).await.is_err() {
            return Ok(());
        }
    }

    // SCENARIO 2: interest accrues on the vault's position
    if accrual_slots > 0 {
        advance_slots(&mut env.context, accrual_slots).await?;
    }

    let claimable_before = get_claimable_balance(&mut env.context, vault).await?;
    let total_shares_before = get_vault_state(&mut env.context, &vault.vault).await?.total_shares;
    let user_balance_before = get_token_balance(&mut env.context, &user.token_account).await?;
    let user_shares_before = get_user_shares(&mut env.context, &user.user_shares).await?;
    let liquidity_before = get_token_balance(&mut env.context, &vault.pool_liquidity_vault).await?;

    let ix = deposit_ix(vault, user, amount);
    let result = process_user_ix(&mut env.context, ix, user).await;

    match result {
        Ok(_) => {
            let claimable_after = get_claimable_balance(&mut env.context, vault).await?;
            let total_shares_after =
                get_vault_state(&mut env.context, &vault.vault).await?.total_shares;
            let user_balance_after = get_token_balance(&mut env.context, &user.token_account).await?;
            let user_shares_after = get_user_shares(&mut env.context, &user.user_shares).await?;
            let liquidity_after =
                get_token_balance(&mut env.context, &vault.pool_liquidity_vault).await?;
            let custody_after = get_token_balance(&mut env.context, &vault.token_account).await?;

            let shares_minted = user_shares_after - user_shares_before;

            // The whole deposit reaches the pool and nothing stays in custody
            assert_eq!(user_balance_after, user_balance_before - amount);
            assert_eq!(liquidity_after, liquidity_before + amount);
            assert_eq!(custody_after, 0, "Custody account should be empty after deposit");

            // Ledger and total move together
            assert_eq!(total_shares_after, total_shares_before + shares_minted);
            assert!(shares_minted > 0, "Deposit of {} minted zero shares", amount);

            if total_shares_before == 0 {
                assert_eq!(shares_minted, amount, "First deposit should mint 1:1");
            } else {
                // Rounding favors existing holders
                let max_shares = (amount as u128) * (total_shares_before as u128)
                    / (claimable_before as u128);
                assert!(
                    shares_minted as u128 <= max_shares,
                    "Minted {} shares, at most {} expected (amount={}, total={}, claimable={})",
                    shares_minted,
                    max_shares,
                    amount,
                    total_shares_before,
                    claimable_before
                );

                // Value per share does not drop, up to pool-side rounding
                let lhs = (claimable_after as u128 + 2) * total_shares_before as u128;
                let rhs = claimable_before as u128 * total_shares_after as u128;
                assert!(
                    lhs >= rhs,
                    "Share dilution: claimable {}->{}, shares {}->{}",
                    claimable_before,
                    claimable_after,
                    total_shares_before,
                    total_shares_after
                );
            }

            println!(
                "PASS deposit={} shares={} claimable {}->{} total {}->{}",
                amount,
                shares_minted,
                claimable_before,
                claimable_after,
                total_shares_before,
                total_shares_after
            );
        }
        Err(e) => {
            // Rejections the vault is allowed to make for extreme inputs
            let acceptable = [VaultError::InvalidAmount, VaultError::MathOverflow];

            if !is_program_error(&e, &acceptable)
                && !is_program_error(&e, &[LendingPoolError::MathOverflow])
            {
                panic!("Unexpected error during deposit: {:?}\nInput: {:?}", e, input);
            }
        }
    }

    Ok(())
}

fuzz_target!(|input: DepositFuzzInput| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_deposit_once(input).await {
            eprintln!("Fuzz iteration failed: {}", e);
        }
    });
});
