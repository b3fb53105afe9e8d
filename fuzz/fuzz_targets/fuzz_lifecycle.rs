use arbitrary::{Arbitrary, Unstructured};
use fuzz_helpers::*;
use honggfuzz::fuzz;
use share_vault::error::VaultError;
use share_vault::math::{shares_to_burn, value_for};

const USERS: usize = 3;
const USER_BALANCE: u64 = 1_000_000_000_000;
const POOL_BUFFER: u64 = 1_000_000_000_000_000;
const MAX_OPS: usize = 24;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Deposit { user: u8, amount: u64 },
    Withdraw { user: u8, amount: u64 },
    Redeem { user: u8, shares: u64 },
    WithdrawAll { user: u8 },
    Accrue { slots: u32 },
}

#[derive(Debug, Clone, Arbitrary)]
struct LifecycleInput {
    liquidity_rate_bps: u16,
    ops: Vec<Op>,
}

/// Snapshot of everything a step can change
struct Snapshot {
    claimable: u64,
    total_shares: u64,
    user_shares: u64,
    user_balance: u64,
}

async fn snapshot(
    context: &mut ProgramTestContext,
    setup: &CompleteSetup,
    user: usize,
) -> FuzzResult<Snapshot> {
    let user = &setup.users[user];
    Ok(Snapshot {
        claimable: get_claimable_balance(context, &setup.vault).await?,
        total_shares: get_vault_state(context, &setup.vault.vault).await?.total_shares,
        user_shares: get_user_shares(context, &user.user_shares).await?,
        user_balance: get_token_balance(context, &user.token_account).await?,
    })
}

async fn assert_ledger_balanced(context: &mut ProgramTestContext, setup: &CompleteSetup) -> FuzzResult<()> {
    let total_shares = get_vault_state(context, &setup.vault.vault).await?.total_shares;
    let mut sum = 0u64;
    for user in &setup.users {
        sum += get_user_shares(context, &user.user_shares).await?;
    }
    assert_eq!(sum, total_shares, "Ledger entries do not add up to total shares");

    let custody = get_token_balance(context, &setup.vault.token_account).await?;
    assert_eq!(custody, 0, "Custody account should never hold a balance between calls");
    Ok(())
}

async fn run_lifecycle(input: LifecycleInput) -> FuzzResult<()> {
    let rate = input.liquidity_rate_bps % 10_001;
    let (mut env, setup) = setup_complete_environment(USER_BALANCE, 6, rate, USERS).await?;

    // Pre-fund the reserve so accrued interest can always be paid out
    mint_tokens_to(
        &mut env.context,
        &setup.base.mint,
        &setup.base.mint_authority,
        &setup.reserve.liquidity_vault,
        POOL_BUFFER,
    )
    .await?;

    for op in input.ops.into_iter().take(MAX_OPS) {
        // New slot per step so repeated instructions get fresh blockhashes
        advance_slots(&mut env.context, 1).await?;

        match op {
            Op::Accrue { slots } => {
                advance_slots(&mut env.context, u64::from(slots % 5_000_000)).await?;
            }
            Op::Deposit { user, amount } => {
                let idx = user as usize % USERS;
                let amount = amount % (USER_BALANCE + 1);
                let before = snapshot(&mut env.context, &setup, idx).await?;

                let ix = deposit_ix(&setup.vault, &setup.users[idx], amount);
                match process_user_ix(&mut env.context, ix, &setup.users[idx]).await {
                    Ok(_) => {
                        let after = snapshot(&mut env.context, &setup, idx).await?;
                        assert_eq!(after.user_balance, before.user_balance - amount);
                        assert!(after.user_shares > before.user_shares);
                    }
                    Err(e) => {
                        let acceptable = [
                            VaultError::InvalidAmount,
                            VaultError::InsufficientBalance,
                            VaultError::MathOverflow,
                        ];
                        if !is_program_error(&e, &acceptable) {
                            panic!("Unexpected deposit error: {:?}", e);
                        }
                    }
                }
            }
            Op::Withdraw { user, amount } => {
                let idx = user as usize % USERS;
                let amount = amount % (USER_BALANCE * 2);
                let before = snapshot(&mut env.context, &setup, idx).await?;

                let ix = withdraw_ix(&setup.vault, &setup.users[idx], amount);
                match process_user_ix(&mut env.context, ix, &setup.users[idx]).await {
                    Ok(_) => {
                        let after = snapshot(&mut env.context, &setup, idx).await?;
                        let expected_burn =
                            shares_to_burn(amount, before.total_shares, before.claimable)
                                .map_err(|e| format!("{e:?}"))?;

                        assert_eq!(after.user_balance, before.user_balance + amount);
                        assert_eq!(after.user_shares, before.user_shares - expected_burn);
                        assert_eq!(after.total_shares, before.total_shares - expected_burn);
                    }
                    Err(e) => {
                        let acceptable = [
                            VaultError::InvalidAmount,
                            VaultError::InsufficientShares,
                            VaultError::EmptyVault,
                            VaultError::MathOverflow,
                        ];
                        if !is_program_error(&e, &acceptable) {
                            panic!("Unexpected withdraw error: {:?}", e);
                        }
                    }
                }
            }
            Op::Redeem { user, shares } => {
                let idx = user as usize % USERS;
                let before = snapshot(&mut env.context, &setup, idx).await?;
                let shares = shares % (before.user_shares + 2);

                let ix = redeem_ix(&setup.vault, &setup.users[idx], shares);
                match process_user_ix(&mut env.context, ix, &setup.users[idx]).await {
                    Ok(_) => {
                        let after = snapshot(&mut env.context, &setup, idx).await?;
                        let expected_value = value_for(shares, before.total_shares, before.claimable)
                            .map_err(|e| format!("{e:?}"))?;

                        assert_eq!(after.user_balance, before.user_balance + expected_value);
                        assert_eq!(after.user_shares, before.user_shares - shares);
                    }
                    Err(e) => {
                        let acceptable = [
                            VaultError::InvalidAmount,
                            VaultError::InsufficientShares,
                            VaultError::EmptyVault,
                        ];
                        if !is_program_error(&e, &acceptable) {
                            panic!("Unexpected redeem error: {:?}", e);
                        }
                    }
                }
            }
            Op::WithdrawAll { user } => {
                let idx = user as usize % USERS;
                let before = snapshot(&mut env.context, &setup, idx).await?;
                let quoted = get_user_token(&mut env.context, &setup.vault, &setup.users[idx]).await?;

                let ix = withdraw_all_ix(&setup.vault, &setup.users[idx]);
                match process_user_ix(&mut env.context, ix, &setup.users[idx]).await {
                    Ok(_) => {
                        let after = snapshot(&mut env.context, &setup, idx).await?;
                        assert_eq!(after.user_shares, 0);
                        assert_eq!(after.user_balance, before.user_balance + quoted);
                    }
                    Err(e) => {
                        let acceptable = [VaultError::InvalidAmount, VaultError::InsufficientShares];
                        if !is_program_error(&e, &acceptable) {
                            panic!("Unexpected withdraw_all error: {:?}", e);
                        }
                    }
                }
            }
        }

        assert_ledger_balanced(&mut env.context, &setup).await?;
    }

    // Everyone exits; the last holder drains the position
    for user in &setup.users {
        if get_user_shares(&mut env.context, &user.user_shares).await? == 0 {
            continue;
        }
        advance_slots(&mut env.context, 1).await?;
        let ix = withdraw_all_ix(&setup.vault, user);
        if let Err(e) = process_user_ix(&mut env.context, ix, user).await {
            // A dust holder whose shares are worth nothing cannot exit
            if !is_program_error(&e, &[VaultError::InvalidAmount]) {
                panic!("Final withdraw_all failed: {:?}", e);
            }
        }
    }

    let state = get_vault_state(&mut env.context, &setup.vault.vault).await?;
    if state.total_shares == 0 {
        let claimable = get_claimable_balance(&mut env.context, &setup.vault).await?;
        assert_eq!(claimable, 0, "Position should be fully drained once all shares are burned");
    }
    assert_ledger_balanced(&mut env.context, &setup).await?;

    Ok(())
}

fn main() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    loop {
        fuzz!(|data: &[u8]| {
            let mut unstructured = Unstructured::new(data);
            let Ok(input) = LifecycleInput::arbitrary(&mut unstructured) else {
                return;
            };

            runtime.block_on(async {
                if let Err(e) = run_lifecycle(input).await {
                    eprintln!("Fuzz iteration failed: {}", e);
                }
            });
        });
    }
}
