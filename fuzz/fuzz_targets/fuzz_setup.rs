use anchor_lang::AccountDeserialize;
use anchor_lang::InstructionData;
use anchor_lang::ToAccountMetas;
use lending_pool::state::{Position, Reserve};
use share_vault::state::{UserShares, Vault};
use solana_program_test::*;
use solana_sdk::{
    clock::Clock,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use spl_token::instruction as token_instruction;

// Re-export for convenience
pub use solana_program_test::{BanksClientError, ProgramTestContext};

pub type FuzzResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Test environment with both programs loaded
pub struct FuzzTestEnv {
    pub context: ProgramTestContext,
}

/// Base asset mint
#[derive(Debug)]
pub struct BaseMintAccounts {
    pub mint: Pubkey,
    pub mint_authority: Keypair,
    pub decimals: u8,
}

/// Lending reserve for the base asset
#[derive(Debug, Clone)]
pub struct ReserveAccounts {
    pub reserve: Pubkey,
    pub liquidity_vault: Pubkey,
    pub base_mint: Pubkey,
}

/// Vault-specific accounts
#[derive(Debug, Clone)]
pub struct VaultAccounts {
    pub vault: Pubkey,
    pub token_mint: Pubkey,
    pub token_account: Pubkey,
    pub pool: Pubkey,
    pub pool_liquidity_vault: Pubkey,
    pub a_token: Pubkey,
}

/// A depositor and its accounts
#[derive(Debug)]
pub struct UserAccounts {
    pub owner: Keypair,
    pub token_account: Pubkey,
    pub user_shares: Pubkey,
}

/// Complete setup with all accounts
pub struct CompleteSetup {
    pub base: BaseMintAccounts,
    pub reserve: ReserveAccounts,
    pub vault: VaultAccounts,
    pub users: Vec<UserAccounts>,
}

// ============================================================================
// Core Setup Functions
// ============================================================================

/// Creates the program test environment from the built program binaries
pub async fn setup_program_test() -> FuzzTestEnv {
    let mut program_test = ProgramTest::new("share_vault", share_vault::id(), None);
    program_test.add_program("lending_pool", lending_pool::id(), None);
    program_test.prefer_bpf(true);

    let context = program_test.start_with_context().await;

    FuzzTestEnv { context }
}

/// Transfers lamports from the test payer so `account` can pay for rent and fees
pub async fn fund_account(context: &mut ProgramTestContext, account: &Pubkey) -> FuzzResult<()> {
    let rent = context.banks_client.get_rent().await?;
    let lamports = rent.minimum_balance(0) + 1_000_000_000; // 1 SOL

    let ix = solana_sdk::system_instruction::transfer(&context.payer.pubkey(), account, lamports);

    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(())
}

/// Creates a new SPL token mint to serve as the base asset
pub async fn setup_base_mint(
    context: &mut ProgramTestContext,
    decimals: u8,
) -> FuzzResult<BaseMintAccounts> {
    let mint_authority = Keypair::new();
    let mint_keypair = Keypair::new();
    let mint = mint_keypair.pubkey();

    let rent = context.banks_client.get_rent().await?;
    let mint_len = 82; // Size of Mint account in SPL Token program
    let mint_rent = rent.minimum_balance(mint_len);

    let create_account_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &mint,
        mint_rent,
        mint_len as u64,
        &spl_token::id(),
    );

    let init_mint_ix = token_instruction::initialize_mint(
        &spl_token::id(),
        &mint,
        &mint_authority.pubkey(),
        None,
        decimals,
    )?;

    let tx = Transaction::new_signed_with_payer(
        &[create_account_ix, init_mint_ix],
        Some(&context.payer.pubkey()),
        &[&context.payer, &mint_keypair],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(BaseMintAccounts {
        mint,
        mint_authority,
        decimals,
    })
}

/// Opens a lending reserve for `base_mint`
pub async fn setup_reserve(
    context: &mut ProgramTestContext,
    base_mint: &Pubkey,
    liquidity_rate_bps: u16,
) -> FuzzResult<ReserveAccounts> {
    let (reserve, _) = derive_reserve_pda(base_mint);
    let (liquidity_vault, _) = derive_liquidity_vault_pda(&reserve);

    let accounts = lending_pool::accounts::InitReserve {
        reserve,
        base_mint: *base_mint,
        liquidity_vault,
        payer: context.payer.pubkey(),
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
    };

    let data = lending_pool::instruction::InitReserve { liquidity_rate_bps }.data();

    let ix = Instruction {
        program_id: lending_pool::id(),
        accounts: accounts.to_account_metas(None),
        data,
    };

    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(ReserveAccounts {
        reserve,
        liquidity_vault,
        base_mint: *base_mint,
    })
}

/// Initializes a vault on top of a reserve
pub async fn setup_vault(
    context: &mut ProgramTestContext,
    reserve: &ReserveAccounts,
) -> FuzzResult<VaultAccounts> {
    let (vault, _) = derive_vault_pda(&reserve.base_mint, &reserve.reserve);
    let (token_account, _) = derive_vault_token_account_pda(&vault);
    let (a_token, _) = derive_position_pda(&reserve.reserve, &vault);

    let accounts = share_vault::accounts::InitializeVault {
        vault,
        token_mint: reserve.base_mint,
        pool: reserve.reserve,
        a_token,
        token_account,
        payer: context.payer.pubkey(),
        lending_pool_program: lending_pool::id(),
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
    };

    let data = share_vault::instruction::InitializeVault {}.data();

    let ix = Instruction {
        program_id: share_vault::id(),
        accounts: accounts.to_account_metas(None),
        data,
    };

    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(VaultAccounts {
        vault,
        token_mint: reserve.base_mint,
        token_account,
        pool: reserve.reserve,
        pool_liquidity_vault: reserve.liquidity_vault,
        a_token,
    })
}

/// Creates a funded depositor with a base-asset token account
pub async fn setup_user_accounts(
    context: &mut ProgramTestContext,
    vault: &VaultAccounts,
) -> FuzzResult<UserAccounts> {
    let owner = Keypair::new();
    fund_account(context, &owner.pubkey()).await?;

    let rent = context.banks_client.get_rent().await?;
    let account_len = 165; // Size of Token account in SPL Token program

    let token_account = Keypair::new();
    let create_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &token_account.pubkey(),
        rent.minimum_balance(account_len),
        account_len as u64,
        &spl_token::id(),
    );

    let init_ix = token_instruction::initialize_account(
        &spl_token::id(),
        &token_account.pubkey(),
        &vault.token_mint,
        &owner.pubkey(),
    )?;

    let tx = Transaction::new_signed_with_payer(
        &[create_ix, init_ix],
        Some(&context.payer.pubkey()),
        &[&context.payer, &token_account],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    let (user_shares, _) = derive_user_shares_pda(&vault.vault, &owner.pubkey());

    Ok(UserAccounts {
        owner,
        token_account: token_account.pubkey(),
        user_shares,
    })
}

/// Mints base tokens to any token account
pub async fn mint_tokens_to(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    mint_authority: &Keypair,
    destination: &Pubkey,
    amount: u64,
) -> FuzzResult<()> {
    let mint_to_ix = token_instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &mint_authority.pubkey(),
        &[],
        amount,
    )?;

    let tx = Transaction::new_signed_with_payer(
        &[mint_to_ix],
        Some(&context.payer.pubkey()),
        &[&context.payer, mint_authority],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(())
}

/// Moves the clock forward so the reserve accrues interest
pub async fn advance_slots(context: &mut ProgramTestContext, slots: u64) -> FuzzResult<()> {
    let clock: Clock = context.banks_client.get_sysvar().await?;
    context
        .warp_to_slot(clock.slot + slots.max(1))
        .map_err(|e| format!("warp failed: {e:?}"))?;
    context.last_blockhash = context.banks_client.get_latest_blockhash().await?;
    Ok(())
}

/// Sets up a reserve, a vault over it and `users` funded depositors
pub async fn setup_complete_environment(
    initial_user_balance: u64,
    decimals: u8,
    liquidity_rate_bps: u16,
    users: usize,
) -> FuzzResult<(FuzzTestEnv, CompleteSetup)> {
    let mut env = setup_program_test().await;

    let base = setup_base_mint(&mut env.context, decimals).await?;
    let reserve = setup_reserve(&mut env.context, &base.mint, liquidity_rate_bps).await?;
    let vault = setup_vault(&mut env.context, &reserve).await?;

    let mut user_accounts = Vec::with_capacity(users);
    for _ in 0..users {
        let user = setup_user_accounts(&mut env.context, &vault).await?;
        if initial_user_balance > 0 {
            mint_tokens_to(
                &mut env.context,
                &base.mint,
                &base.mint_authority,
                &user.token_account,
                initial_user_balance,
            )
            .await?;
        }
        user_accounts.push(user);
    }

    let setup = CompleteSetup {
        base,
        reserve,
        vault,
        users: user_accounts,
    };

    Ok((env, setup))
}

// ============================================================================
// Instruction Builders
// ============================================================================

pub fn deposit_ix(vault: &VaultAccounts, user: &UserAccounts, amount: u64) -> Instruction {
    let accounts = share_vault::accounts::Deposit {
        vault: vault.vault,
        token_mint: vault.token_mint,
        token_account: vault.token_account,
        pool: vault.pool,
        pool_liquidity_vault: vault.pool_liquidity_vault,
        a_token: vault.a_token,
        user_shares: user.user_shares,
        depositor_token_account: user.token_account,
        depositor: user.owner.pubkey(),
        lending_pool_program: lending_pool::id(),
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: share_vault::id(),
        accounts: accounts.to_account_metas(None),
        data: share_vault::instruction::Deposit { amount }.data(),
    }
}

fn withdraw_accounts(vault: &VaultAccounts, user: &UserAccounts) -> share_vault::accounts::Withdraw {
    share_vault::accounts::Withdraw {
        vault: vault.vault,
        token_mint: vault.token_mint,
        token_account: vault.token_account,
        pool: vault.pool,
        pool_liquidity_vault: vault.pool_liquidity_vault,
        a_token: vault.a_token,
        user_shares: user.user_shares,
        owner_token_account: user.token_account,
        owner: user.owner.pubkey(),
        lending_pool_program: lending_pool::id(),
        token_program: spl_token::id(),
    }
}

pub fn withdraw_ix(vault: &VaultAccounts, user: &UserAccounts, amount: u64) -> Instruction {
    Instruction {
        program_id: share_vault::id(),
        accounts: withdraw_accounts(vault, user).to_account_metas(None),
        data: share_vault::instruction::Withdraw { amount }.data(),
    }
}

pub fn redeem_ix(vault: &VaultAccounts, user: &UserAccounts, shares: u64) -> Instruction {
    Instruction {
        program_id: share_vault::id(),
        accounts: withdraw_accounts(vault, user).to_account_metas(None),
        data: share_vault::instruction::Redeem { shares }.data(),
    }
}

pub fn withdraw_all_ix(vault: &VaultAccounts, user: &UserAccounts) -> Instruction {
    Instruction {
        program_id: share_vault::id(),
        accounts: withdraw_accounts(vault, user).to_account_metas(None),
        data: share_vault::instruction::WithdrawAll {}.data(),
    }
}

/// Signs `ix` with the user and submits it
pub async fn process_user_ix(
    context: &mut ProgramTestContext,
    ix: Instruction,
    user: &UserAccounts,
) -> std::result::Result<(), BanksClientError> {
    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&user.owner.pubkey()),
        &[&user.owner],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await
}

// ============================================================================
// PDA Derivation Helpers
// ============================================================================

pub fn derive_reserve_pda(base_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[lending_pool::RESERVE_SEED, base_mint.as_ref()],
        &lending_pool::id(),
    )
}

pub fn derive_liquidity_vault_pda(reserve: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[lending_pool::LIQUIDITY_VAULT_SEED, reserve.as_ref()],
        &lending_pool::id(),
    )
}

pub fn derive_position_pda(reserve: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[lending_pool::POSITION_SEED, reserve.as_ref(), owner.as_ref()],
        &lending_pool::id(),
    )
}

pub fn derive_vault_pda(token_mint: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[share_vault::VAULT_SEED, token_mint.as_ref(), pool.as_ref()],
        &share_vault::id(),
    )
}

pub fn derive_vault_token_account_pda(vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[share_vault::VAULT_TOKEN_ACCOUNT_SEED, vault.as_ref()],
        &share_vault::id(),
    )
}

pub fn derive_user_shares_pda(vault: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[share_vault::USER_SHARES_SEED, vault.as_ref(), owner.as_ref()],
        &share_vault::id(),
    )
}

// ============================================================================
// Account State Verification Helpers
// ============================================================================

async fn fetch<T: AccountDeserialize>(
    context: &mut ProgramTestContext,
    address: &Pubkey,
) -> FuzzResult<Option<T>> {
    let Some(account) = context.banks_client.get_account(*address).await? else {
        return Ok(None);
    };
    Ok(Some(T::try_deserialize(&mut account.data.as_ref())?))
}

pub async fn get_vault_state(context: &mut ProgramTestContext, vault: &Pubkey) -> FuzzResult<Vault> {
    fetch(context, vault)
        .await?
        .ok_or_else(|| "Vault account not found".into())
}

/// Shares recorded for a user; zero when the ledger entry was never created
pub async fn get_user_shares(context: &mut ProgramTestContext, user_shares: &Pubkey) -> FuzzResult<u64> {
    Ok(fetch::<UserShares>(context, user_shares)
        .await?
        .map_or(0, |entry| entry.shares))
}

pub async fn get_reserve(context: &mut ProgramTestContext, reserve: &Pubkey) -> FuzzResult<Reserve> {
    fetch(context, reserve)
        .await?
        .ok_or_else(|| "Reserve account not found".into())
}

pub async fn get_position(context: &mut ProgramTestContext, position: &Pubkey) -> FuzzResult<Position> {
    fetch(context, position)
        .await?
        .ok_or_else(|| "Position account not found".into())
}

/// The vault's receipt balance at the current slot
pub async fn get_claimable_balance(
    context: &mut ProgramTestContext,
    vault: &VaultAccounts,
) -> FuzzResult<u64> {
    let reserve = get_reserve(context, &vault.pool).await?;
    let position = get_position(context, &vault.a_token).await?;
    let clock: Clock = context.banks_client.get_sysvar().await?;

    let balance = position
        .balance_of(&reserve, clock.slot)
        .map_err(|e| format!("balance_of failed: {e:?}"))?;
    Ok(balance)
}

/// Value a user could withdraw at the current slot, as answered by the
/// vault's `get_user_token` view
pub async fn get_user_token(
    context: &mut ProgramTestContext,
    vault: &VaultAccounts,
    user: &UserAccounts,
) -> FuzzResult<u64> {
    let account = user.owner.pubkey();
    let accounts = share_vault::accounts::UserInfo {
        vault: vault.vault,
        pool: vault.pool,
        a_token: vault.a_token,
        user_shares: user.user_shares,
    };
    let ix = Instruction {
        program_id: share_vault::id(),
        accounts: accounts.to_account_metas(None),
        data: share_vault::instruction::GetUserToken { account }.data(),
    };

    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );
    let simulation = context.banks_client.simulate_transaction(tx).await?;
    if let Some(Err(e)) = simulation.result {
        return Err(format!("get_user_token failed: {e:?}").into());
    }

    // Trailing zero bytes are stripped from return data
    let mut bytes = [0u8; 8];
    if let Some(return_data) = simulation.simulation_details.and_then(|d| d.return_data) {
        bytes[..return_data.data.len()].copy_from_slice(&return_data.data);
    }
    Ok(u64::from_le_bytes(bytes))
}

/// Get token account balance
pub async fn get_token_balance(context: &mut ProgramTestContext, account: &Pubkey) -> FuzzResult<u64> {
    let account_data = context
        .banks_client
        .get_account(*account)
        .await?
        .ok_or("Token account not found")?;

    // Token account structure: amount is at offset 64 (u64)
    if account_data.data.len() < 72 {
        return Err("Invalid token account data".into());
    }

    let amount = u64::from_le_bytes(
        account_data.data[64..72]
            .try_into()
            .map_err(|_| "Failed to parse amount")?,
    );

    Ok(amount)
}

/// Custom program error code carried by a failed transaction, if any
pub fn custom_error_code(err: &BanksClientError) -> Option<u32> {
    use solana_sdk::{instruction::InstructionError, transaction::TransactionError};

    let tx_err = match err {
        BanksClientError::TransactionError(e) => e,
        BanksClientError::SimulationError { err, .. } => err,
        _ => return None,
    };

    match tx_err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
        _ => None,
    }
}

/// Whether `err` is one of the listed program errors
pub fn is_program_error<E: Into<u32> + Copy>(err: &BanksClientError, expected: &[E]) -> bool {
    custom_error_code(err).is_some_and(|code| expected.iter().any(|e| (*e).into() == code))
}
