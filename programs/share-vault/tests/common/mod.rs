//! Shared helpers for the share-vault program tests.
//!
//! Both programs run as native processors inside `solana-program-test`, so
//! the tests execute the real instruction handlers and CPIs without a
//! prebuilt `.so`.

#![allow(dead_code)]

use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use lending_pool::state::{Position, Reserve};
use share_vault::state::{UserShares, Vault};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account_info::AccountInfo,
    clock::Clock,
    entrypoint::ProgramResult,
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};
use spl_token::instruction as token_instruction;

/// Base asset decimals used by every scenario
pub const DECIMALS: u8 = 9;
/// One whole base-asset token
pub const ONE: u64 = 1_000_000_000;
/// 10% a year, so a few hundred thousand slots show visible interest
pub const LIQUIDITY_RATE_BPS: u16 = 1_000;
/// Slots per accrual step
pub const ACCRUAL_SLOTS: u64 = 1_000_000;

const MINT_LEN: usize = 82;
const TOKEN_ACCOUNT_LEN: usize = 165;

fn process_share_vault(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let accounts = Box::leak(Box::new(accounts.to_vec()));
    share_vault::entry(program_id, accounts, data)
}

fn process_lending_pool(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let accounts = Box::leak(Box::new(accounts.to_vec()));
    lending_pool::entry(program_id, accounts, data)
}

/// A depositor with a funded base-asset token account
pub struct User {
    pub owner: Keypair,
    pub token_account: Pubkey,
    pub user_shares: Pubkey,
}

/// A running test validator with a reserve and a vault on top of it
pub struct TestVault {
    pub context: ProgramTestContext,
    pub mint: Pubkey,
    pub mint_authority: Keypair,
    pub reserve: Pubkey,
    pub liquidity_vault: Pubkey,
    pub vault: Pubkey,
    pub token_account: Pubkey,
    pub a_token: Pubkey,
}

impl TestVault {
    pub async fn start() -> Self {
        let mut program_test = ProgramTest::new(
            "share_vault",
            share_vault::id(),
            processor!(process_share_vault),
        );
        program_test.add_program(
            "lending_pool",
            lending_pool::id(),
            processor!(process_lending_pool),
        );
        program_test.prefer_bpf(false);

        let mut context = program_test.start_with_context().await;
        let mint_authority = Keypair::new();
        let mint = create_mint(&mut context, &mint_authority).await;

        let (reserve, _) = Pubkey::find_program_address(
            &[lending_pool::RESERVE_SEED, mint.as_ref()],
            &lending_pool::id(),
        );
        let (liquidity_vault, _) = Pubkey::find_program_address(
            &[lending_pool::LIQUIDITY_VAULT_SEED, reserve.as_ref()],
            &lending_pool::id(),
        );
        let (vault, _) = Pubkey::find_program_address(
            &[share_vault::VAULT_SEED, mint.as_ref(), reserve.as_ref()],
            &share_vault::id(),
        );
        let (token_account, _) = Pubkey::find_program_address(
            &[share_vault::VAULT_TOKEN_ACCOUNT_SEED, vault.as_ref()],
            &share_vault::id(),
        );
        let (a_token, _) = Pubkey::find_program_address(
            &[lending_pool::POSITION_SEED, reserve.as_ref(), vault.as_ref()],
            &lending_pool::id(),
        );

        let payer = context.payer.pubkey();
        let init_reserve = Instruction {
            program_id: lending_pool::id(),
            accounts: lending_pool::accounts::InitReserve {
                reserve,
                base_mint: mint,
                liquidity_vault,
                payer,
                system_program: solana_sdk::system_program::ID,
                token_program: spl_token::id(),
            }
            .to_account_metas(None),
            data: lending_pool::instruction::InitReserve {
                liquidity_rate_bps: LIQUIDITY_RATE_BPS,
            }
            .data(),
        };
        let initialize_vault = Instruction {
            program_id: share_vault::id(),
            accounts: share_vault::accounts::InitializeVault {
                vault,
                token_mint: mint,
                pool: reserve,
                a_token,
                token_account,
                payer,
                lending_pool_program: lending_pool::id(),
                system_program: solana_sdk::system_program::ID,
                token_program: spl_token::id(),
            }
            .to_account_metas(None),
            data: share_vault::instruction::InitializeVault {}.data(),
        };
        send_as_payer(&mut context, &[init_reserve, initialize_vault], &[])
            .await
            .unwrap();

        Self {
            context,
            mint,
            mint_authority,
            reserve,
            liquidity_vault,
            vault,
            token_account,
            a_token,
        }
    }

    /// Creates a depositor holding `balance` base units.
    pub async fn user(&mut self, balance: u64) -> User {
        let owner = Keypair::new();
        let token_account = Keypair::new();
        let rent = self.context.banks_client.get_rent().await.unwrap();
        let payer = self.context.payer.pubkey();

        let ixs = [
            solana_sdk::system_instruction::transfer(&payer, &owner.pubkey(), 1_000_000_000),
            solana_sdk::system_instruction::create_account(
                &payer,
                &token_account.pubkey(),
                rent.minimum_balance(TOKEN_ACCOUNT_LEN),
                TOKEN_ACCOUNT_LEN as u64,
                &spl_token::id(),
            ),
            token_instruction::initialize_account(
                &spl_token::id(),
                &token_account.pubkey(),
                &self.mint,
                &owner.pubkey(),
            )
            .unwrap(),
        ];
        send_as_payer(&mut self.context, &ixs, &[&token_account])
            .await
            .unwrap();

        self.mint_to(&token_account.pubkey(), balance).await;

        let (user_shares, _) = Pubkey::find_program_address(
            &[
                share_vault::USER_SHARES_SEED,
                self.vault.as_ref(),
                owner.pubkey().as_ref(),
            ],
            &share_vault::id(),
        );

        User {
            owner,
            token_account: token_account.pubkey(),
            user_shares,
        }
    }

    pub async fn mint_to(&mut self, destination: &Pubkey, amount: u64) {
        if amount == 0 {
            return;
        }
        let ix = token_instruction::mint_to(
            &spl_token::id(),
            &self.mint,
            destination,
            &self.mint_authority.pubkey(),
            &[],
            amount,
        )
        .unwrap();
        send_as_payer(&mut self.context, &[ix], &[&self.mint_authority])
            .await
            .unwrap();
    }

    /// Tops up the reserve so it can pay out accrued interest.
    pub async fn fund_interest(&mut self, amount: u64) {
        let liquidity_vault = self.liquidity_vault;
        self.mint_to(&liquidity_vault, amount).await;
    }

    /// Moves the clock forward so the reserve accrues interest.
    pub async fn advance_slots(&mut self, slots: u64) {
        let clock: Clock = self.context.banks_client.get_sysvar().await.unwrap();
        self.context.warp_to_slot(clock.slot + slots.max(1)).unwrap();
        self.context.last_blockhash = self
            .context
            .banks_client
            .get_latest_blockhash()
            .await
            .unwrap();
    }

    // ------------------------------------------------------------------
    // Instructions
    // ------------------------------------------------------------------

    pub async fn deposit(&mut self, user: &User, amount: u64) -> Result<(), BanksClientError> {
        let accounts = share_vault::accounts::Deposit {
            vault: self.vault,
            token_mint: self.mint,
            token_account: self.token_account,
            pool: self.reserve,
            pool_liquidity_vault: self.liquidity_vault,
            a_token: self.a_token,
            user_shares: user.user_shares,
            depositor_token_account: user.token_account,
            depositor: user.owner.pubkey(),
            lending_pool_program: lending_pool::id(),
            system_program: solana_sdk::system_program::ID,
            token_program: spl_token::id(),
        };
        let ix = Instruction {
            program_id: share_vault::id(),
            accounts: accounts.to_account_metas(None),
            data: share_vault::instruction::Deposit { amount }.data(),
        };
        self.send_as(user, ix).await
    }

    pub async fn withdraw(&mut self, user: &User, amount: u64) -> Result<(), BanksClientError> {
        let data = share_vault::instruction::Withdraw { amount }.data();
        self.send_withdrawal(user, data).await
    }

    pub async fn redeem(&mut self, user: &User, shares: u64) -> Result<(), BanksClientError> {
        let data = share_vault::instruction::Redeem { shares }.data();
        self.send_withdrawal(user, data).await
    }

    pub async fn withdraw_all(&mut self, user: &User) -> Result<(), BanksClientError> {
        let data = share_vault::instruction::WithdrawAll {}.data();
        self.send_withdrawal(user, data).await
    }

    async fn send_withdrawal(&mut self, user: &User, data: Vec<u8>) -> Result<(), BanksClientError> {
        let accounts = share_vault::accounts::Withdraw {
            vault: self.vault,
            token_mint: self.mint,
            token_account: self.token_account,
            pool: self.reserve,
            pool_liquidity_vault: self.liquidity_vault,
            a_token: self.a_token,
            user_shares: user.user_shares,
            owner_token_account: user.token_account,
            owner: user.owner.pubkey(),
            lending_pool_program: lending_pool::id(),
            token_program: spl_token::id(),
        };
        let ix = Instruction {
            program_id: share_vault::id(),
            accounts: accounts.to_account_metas(None),
            data,
        };
        self.send_as(user, ix).await
    }

    /// Signs with the user and submits `ix` in a fresh slot, so repeated
    /// identical calls are not deduplicated.
    async fn send_as(&mut self, user: &User, ix: Instruction) -> Result<(), BanksClientError> {
        self.advance_slots(1).await;
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&user.owner.pubkey()),
            &[&user.owner],
            self.context.last_blockhash,
        );
        self.context.banks_client.process_transaction(tx).await
    }

    // ------------------------------------------------------------------
    // Views, answered by the program through return data
    // ------------------------------------------------------------------

    pub async fn total_share(&mut self) -> u64 {
        let ix = Instruction {
            program_id: share_vault::id(),
            accounts: share_vault::accounts::VaultInfo { vault: self.vault }.to_account_metas(None),
            data: share_vault::instruction::TotalShare {}.data(),
        };
        self.view(ix).await
    }

    pub async fn user_shares(&mut self, account: &Pubkey) -> u64 {
        let data = share_vault::instruction::UserShares { account: *account }.data();
        let ix = self.user_info_ix(account, data);
        self.view(ix).await
    }

    pub async fn get_user_token(&mut self, account: &Pubkey) -> u64 {
        let data = share_vault::instruction::GetUserToken { account: *account }.data();
        let ix = self.user_info_ix(account, data);
        self.view(ix).await
    }

    fn user_info_ix(&self, account: &Pubkey, data: Vec<u8>) -> Instruction {
        let (user_shares, _) = Pubkey::find_program_address(
            &[share_vault::USER_SHARES_SEED, self.vault.as_ref(), account.as_ref()],
            &share_vault::id(),
        );
        let accounts = share_vault::accounts::UserInfo {
            vault: self.vault,
            pool: self.reserve,
            a_token: self.a_token,
            user_shares,
        };
        Instruction {
            program_id: share_vault::id(),
            accounts: accounts.to_account_metas(None),
            data,
        }
    }

    /// Simulates `ix` and decodes the `u64` it returns. The runtime strips
    /// trailing zero bytes from return data.
    async fn view(&mut self, ix: Instruction) -> u64 {
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&self.context.payer.pubkey()),
            &[&self.context.payer],
            self.context.last_blockhash,
        );
        let simulation = self
            .context
            .banks_client
            .simulate_transaction(tx)
            .await
            .unwrap();
        simulation.result.unwrap().unwrap();

        let mut bytes = [0u8; 8];
        if let Some(return_data) = simulation.simulation_details.and_then(|d| d.return_data) {
            assert_eq!(return_data.program_id, share_vault::id());
            bytes[..return_data.data.len()].copy_from_slice(&return_data.data);
        }
        u64::from_le_bytes(bytes)
    }

    // ------------------------------------------------------------------
    // Raw account state
    // ------------------------------------------------------------------

    async fn fetch<T: AccountDeserialize>(&mut self, address: &Pubkey) -> Option<T> {
        let account = self
            .context
            .banks_client
            .get_account(*address)
            .await
            .unwrap()?;
        Some(T::try_deserialize(&mut account.data.as_ref()).unwrap())
    }

    pub async fn vault_state(&mut self) -> Vault {
        let vault = self.vault;
        self.fetch(&vault).await.unwrap()
    }

    pub async fn ledger_entry(&mut self, user: &User) -> Option<UserShares> {
        self.fetch(&user.user_shares).await
    }

    /// The vault's receipt balance in the reserve at the current slot.
    pub async fn a_token_balance(&mut self) -> u64 {
        let (reserve, position) = (self.reserve, self.a_token);
        let reserve: Reserve = self.fetch(&reserve).await.unwrap();
        let position: Position = self.fetch(&position).await.unwrap();
        let clock: Clock = self.context.banks_client.get_sysvar().await.unwrap();
        position.balance_of(&reserve, clock.slot).unwrap()
    }

    pub async fn token_balance(&mut self, account: &Pubkey) -> u64 {
        let account = self
            .context
            .banks_client
            .get_account(*account)
            .await
            .unwrap()
            .unwrap();
        u64::from_le_bytes(account.data[64..72].try_into().unwrap())
    }
}

async fn create_mint(context: &mut ProgramTestContext, authority: &Keypair) -> Pubkey {
    let mint = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let payer = context.payer.pubkey();

    let ixs = [
        solana_sdk::system_instruction::create_account(
            &payer,
            &mint.pubkey(),
            rent.minimum_balance(MINT_LEN),
            MINT_LEN as u64,
            &spl_token::id(),
        ),
        token_instruction::initialize_mint(
            &spl_token::id(),
            &mint.pubkey(),
            &authority.pubkey(),
            None,
            DECIMALS,
        )
        .unwrap(),
    ];
    send_as_payer(context, &ixs, &[&mint]).await.unwrap();
    mint.pubkey()
}

async fn send_as_payer(
    context: &mut ProgramTestContext,
    ixs: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let mut all_signers = vec![&context.payer];
    all_signers.extend_from_slice(signers);
    let tx = Transaction::new_signed_with_payer(
        ixs,
        Some(&context.payer.pubkey()),
        &all_signers,
        context.last_blockhash,
    );
    context.banks_client.process_transaction(tx).await
}

/// Custom program error code carried by a failed transaction, if any
pub fn custom_error_code(err: &BanksClientError) -> Option<u32> {
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

#[track_caller]
pub fn assert_program_error<E: Into<u32>>(result: Result<(), BanksClientError>, expected: E) {
    let expected = expected.into();
    match result {
        Ok(()) => panic!("expected error {expected}, transaction succeeded"),
        Err(err) => assert_eq!(custom_error_code(&err), Some(expected), "{err:?}"),
    }
}
