use anchor_lang::prelude::*;

#[account]
#[derive(Debug, Default)]
pub struct UserShares {
    /// The vault this ledger entry belongs to
    pub vault: Pubkey,
    /// The depositor owning the shares
    pub owner: Pubkey,
    /// Shares currently held
    pub shares: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl UserShares {
    pub const LEN: usize = 8 + // discriminator
        32 + // vault
        32 + // owner
        8 + // shares
        1; // bump

    /// Entry stored in `info`, or `None` when the account was never created.
    pub fn load(info: &AccountInfo) -> Result<Option<UserShares>> {
        if info.owner != &crate::ID || info.data_is_empty() {
            return Ok(None);
        }
        let data = info.try_borrow_data()?;
        Ok(Some(UserShares::try_deserialize(&mut &data[..])?))
    }

    /// Entry of `owner` in `vault`. A missing account holds no shares.
    pub fn load_or_empty(info: &AccountInfo, vault: Pubkey, owner: Pubkey) -> Result<UserShares> {
        let Some(entry) = Self::load(info)? else {
            return Ok(UserShares {
                vault,
                owner,
                ..Default::default()
            });
        };
        require_keys_eq!(entry.vault, vault, anchor_lang::error::ErrorCode::ConstraintHasOne);
        require_keys_eq!(entry.owner, owner, anchor_lang::error::ErrorCode::ConstraintHasOne);
        Ok(entry)
    }

    /// Shares recorded in `info`. An account that was never created holds none.
    pub fn shares_in(info: &AccountInfo) -> Result<u64> {
        Ok(Self::load(info)?.map_or(0, |entry| entry.shares))
    }

    /// Writes the entry back into an existing account.
    pub fn store(&self, info: &AccountInfo) -> Result<()> {
        let mut data = info.try_borrow_mut_data()?;
        self.try_serialize(&mut &mut data[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_info<'a>(
        key: &'a Pubkey,
        owner: &'a Pubkey,
        lamports: &'a mut u64,
        data: &'a mut [u8],
    ) -> AccountInfo<'a> {
        AccountInfo::new(key, false, true, lamports, data, owner, false, 0)
    }

    fn serialized(entry: &UserShares) -> Vec<u8> {
        let mut data = vec![0u8; UserShares::LEN];
        entry.try_serialize(&mut &mut data[..]).unwrap();
        data
    }

    #[test]
    fn missing_account_reads_as_empty_entry() {
        let key = Pubkey::new_unique();
        let system = Pubkey::default();
        let mut lamports = 0;
        let mut data: [u8; 0] = [];
        let info = account_info(&key, &system, &mut lamports, &mut data);

        let vault = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let entry = UserShares::load_or_empty(&info, vault, owner).unwrap();
        assert_eq!(entry.shares, 0);
        assert_eq!(entry.vault, vault);
        assert_eq!(entry.owner, owner);
        assert_eq!(UserShares::shares_in(&info).unwrap(), 0);
    }

    #[test]
    fn stored_entry_round_trips_through_the_account() {
        let vault = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let entry = UserShares {
            vault,
            owner,
            shares: 42,
            bump: 253,
        };

        let key = Pubkey::new_unique();
        let program = crate::ID;
        let mut lamports = 1;
        let mut data = serialized(&entry);
        let info = account_info(&key, &program, &mut lamports, &mut data);

        let mut loaded = UserShares::load_or_empty(&info, vault, owner).unwrap();
        assert_eq!(loaded.shares, 42);

        loaded.shares = 7;
        loaded.store(&info).unwrap();
        assert_eq!(UserShares::shares_in(&info).unwrap(), 7);
    }

    #[test]
    fn entry_of_another_owner_is_rejected() {
        let vault = Pubkey::new_unique();
        let entry = UserShares {
            vault,
            owner: Pubkey::new_unique(),
            shares: 1,
            bump: 255,
        };

        let key = Pubkey::new_unique();
        let program = crate::ID;
        let mut lamports = 1;
        let mut data = serialized(&entry);
        let info = account_info(&key, &program, &mut lamports, &mut data);

        assert!(UserShares::load_or_empty(&info, vault, Pubkey::new_unique()).is_err());
    }
}
