use crate::{Database, DatabaseCommit, DatabaseRef, EmptyDB};
use primitives::{
    hash_map::Entry, Address, Bytes, HashMap, StorageKey, StorageValue, B256, KECCAK_EMPTY, U256,
};
use state::{Account, AccountInfo};

/// A [Database] implementation that stores all state changes in memory.
pub type InMemoryDB = CacheDB<EmptyDB>;

/// A cache used in [CacheDB]. Its kept separate so it can be used independently.
///
/// Accounts map addresses to [DbAccount]; contract code is keyed by its hash
/// in `contracts`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cache {
    /// Account info where `None` means it is not existing.
    /// `code` is always `None`, bytecode lives in `contracts`.
    pub accounts: HashMap<Address, DbAccount>,
    /// Tracks all contracts by their code hash.
    pub contracts: HashMap<B256, Bytes>,
    /// All cached block hashes from the [DatabaseRef].
    pub block_hashes: HashMap<U256, B256>,
}

impl Default for Cache {
    fn default() -> Self {
        let mut contracts = HashMap::default();
        contracts.insert(KECCAK_EMPTY, Bytes::new());
        contracts.insert(B256::ZERO, Bytes::new());

        Cache {
            accounts: HashMap::default(),
            contracts,
            block_hashes: HashMap::default(),
        }
    }
}

/// A [Database] implementation that stores all state changes in memory.
///
/// Wraps a [DatabaseRef] that is used to load data missing from the cache.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheDB<ExtDB> {
    /// The cache that stores all state changes.
    pub cache: Cache,
    /// The underlying database. Data is never written to it.
    pub db: ExtDB,
}

impl<ExtDB: Default> Default for CacheDB<ExtDB> {
    fn default() -> Self {
        Self::new(ExtDB::default())
    }
}

impl<ExtDB> CacheDB<ExtDB> {
    /// Creates a new cache with the given external database.
    pub fn new(db: ExtDB) -> Self {
        Self {
            cache: Cache::default(),
            db,
        }
    }

    /// Moves the account's code into `contracts`, keyed by its hash.
    pub fn insert_contract(&mut self, account: &mut AccountInfo) {
        if let Some(code) = account.code.take() {
            if !code.is_empty() {
                if account.code_hash == KECCAK_EMPTY {
                    account.code_hash = primitives::keccak256(&code);
                }
                self.cache
                    .contracts
                    .entry(account.code_hash)
                    .or_insert(code);
            }
        }
        if account.code_hash.is_zero() {
            account.code_hash = KECCAK_EMPTY;
        }
    }

    /// Inserts account info but does not override storage.
    pub fn insert_account_info(&mut self, address: Address, mut info: AccountInfo) {
        self.insert_contract(&mut info);
        let account = self.cache.accounts.entry(address).or_default();
        account.info = info;
        if account.account_state == AccountState::NotExisting {
            account.account_state = AccountState::None;
        }
    }

    /// Inserts a block hash served by [Database::block_hash].
    pub fn insert_block_hash(&mut self, number: u64, hash: B256) {
        self.cache.block_hashes.insert(U256::from(number), hash);
    }

    /// Wraps the cache in a [CacheDB], creating a nested cache.
    pub fn nest(self) -> CacheDB<Self> {
        CacheDB::new(self)
    }
}

impl<ExtDB: DatabaseRef> CacheDB<ExtDB> {
    /// Returns the account for the given address.
    ///
    /// If the account was not found in the cache, it will be loaded from the underlying database.
    pub fn load_account(&mut self, address: Address) -> Result<&mut DbAccount, ExtDB::Error> {
        let db = &self.db;
        match self.cache.accounts.entry(address) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(db.basic_ref(address)?.into())),
        }
    }

    /// Inserts account storage without overriding account info.
    pub fn insert_account_storage(
        &mut self,
        address: Address,
        slot: StorageKey,
        value: StorageValue,
    ) -> Result<(), ExtDB::Error> {
        let account = self.load_account(address)?;
        account.storage.insert(slot, value);
        Ok(())
    }

    /// Replaces account storage without overriding account info.
    pub fn replace_account_storage(
        &mut self,
        address: Address,
        storage: HashMap<StorageKey, StorageValue>,
    ) -> Result<(), ExtDB::Error> {
        let account = self.load_account(address)?;
        account.account_state = AccountState::StorageCleared;
        account.storage = storage;
        Ok(())
    }
}

impl<ExtDB> DatabaseCommit for CacheDB<ExtDB> {
    fn commit(&mut self, changes: HashMap<Address, Account>) {
        for (address, mut account) in changes {
            if !account.is_touched() {
                continue;
            }
            if account.is_selfdestructed() {
                let db_account = self.cache.accounts.entry(address).or_default();
                db_account.storage.clear();
                db_account.account_state = AccountState::NotExisting;
                db_account.info = AccountInfo::default();
                continue;
            }
            let is_newly_created = account.is_created();
            self.insert_contract(&mut account.info);

            let db_account = self.cache.accounts.entry(address).or_default();
            db_account.info = account.info;

            db_account.account_state = if is_newly_created {
                db_account.storage.clear();
                AccountState::StorageCleared
            } else if db_account.account_state.is_storage_cleared() {
                // Preserve old account state if it already exists
                AccountState::StorageCleared
            } else {
                AccountState::Touched
            };
            db_account.storage.extend(
                account
                    .storage
                    .into_iter()
                    .map(|(key, value)| (key, value.present_value())),
            );
        }
    }
}

impl<ExtDB: DatabaseRef> Database for CacheDB<ExtDB> {
    type Error = ExtDB::Error;

    fn basic(&mut self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        Ok(self.load_account(address)?.info())
    }

    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytes, Self::Error> {
        match self.cache.contracts.entry(code_hash) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => Ok(entry.insert(self.db.code_by_hash_ref(code_hash)?).clone()),
        }
    }

    /// Get the value in an account's storage slot.
    ///
    /// Loads the account first when it is not cached yet.
    fn storage(
        &mut self,
        address: Address,
        index: StorageKey,
    ) -> Result<StorageValue, Self::Error> {
        let db = &self.db;
        let account = match self.cache.accounts.entry(address) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(db.basic_ref(address)?.into()),
        };
        match account.storage.entry(index) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                if matches!(
                    account.account_state,
                    AccountState::StorageCleared | AccountState::NotExisting
                ) {
                    Ok(StorageValue::ZERO)
                } else {
                    let slot = db.storage_ref(address, index)?;
                    entry.insert(slot);
                    Ok(slot)
                }
            }
        }
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error> {
        match self.cache.block_hashes.entry(U256::from(number)) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let hash = self.db.block_hash_ref(number)?;
                entry.insert(hash);
                Ok(hash)
            }
        }
    }
}

impl<ExtDB: DatabaseRef> DatabaseRef for CacheDB<ExtDB> {
    type Error = ExtDB::Error;

    fn basic_ref(&self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        match self.cache.accounts.get(&address) {
            Some(acc) => Ok(acc.info()),
            None => self.db.basic_ref(address),
        }
    }

    fn code_by_hash_ref(&self, code_hash: B256) -> Result<Bytes, Self::Error> {
        match self.cache.contracts.get(&code_hash) {
            Some(entry) => Ok(entry.clone()),
            None => self.db.code_by_hash_ref(code_hash),
        }
    }

    fn storage_ref(
        &self,
        address: Address,
        index: StorageKey,
    ) -> Result<StorageValue, Self::Error> {
        match self.cache.accounts.get(&address) {
            Some(acc_entry) => match acc_entry.storage.get(&index) {
                Some(entry) => Ok(*entry),
                None => {
                    if matches!(
                        acc_entry.account_state,
                        AccountState::StorageCleared | AccountState::NotExisting
                    ) {
                        Ok(StorageValue::ZERO)
                    } else {
                        self.db.storage_ref(address, index)
                    }
                }
            },
            None => self.db.storage_ref(address, index),
        }
    }

    fn block_hash_ref(&self, number: u64) -> Result<B256, Self::Error> {
        match self.cache.block_hashes.get(&U256::from(number)) {
            Some(entry) => Ok(*entry),
            None => self.db.block_hash_ref(number),
        }
    }
}

/// Cached account: info, storage and how the storage relates to the backend.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbAccount {
    /// Account info, without code.
    pub info: AccountInfo,
    /// How the cached storage relates to the underlying database.
    pub account_state: AccountState,
    /// Storage slots written or read through the cache.
    pub storage: HashMap<StorageKey, StorageValue>,
}

impl DbAccount {
    /// An account the backend does not know about.
    pub fn new_not_existing() -> Self {
        Self {
            account_state: AccountState::NotExisting,
            ..Default::default()
        }
    }

    /// Returns the account info, or `None` when the account does not exist.
    pub fn info(&self) -> Option<AccountInfo> {
        if matches!(self.account_state, AccountState::NotExisting) {
            None
        } else {
            Some(self.info.clone())
        }
    }
}

impl From<Option<AccountInfo>> for DbAccount {
    fn from(from: Option<AccountInfo>) -> Self {
        from.map(Self::from).unwrap_or_else(Self::new_not_existing)
    }
}

impl From<AccountInfo> for DbAccount {
    fn from(info: AccountInfo) -> Self {
        Self {
            info,
            account_state: AccountState::None,
            ..Default::default()
        }
    }
}

/// State of a cached account relative to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccountState {
    /// Before Spurious Dragon hardfork there was a difference between empty and not existing.
    /// And we are flagging it here.
    NotExisting,
    /// EVM touched this account. For newer hardfork this means it can be cleared/removed from state.
    Touched,
    /// EVM cleared storage of this account, mostly by selfdestruct, we don't ask database for storage slots
    /// and assume they are StorageValue::ZERO
    StorageCleared,
    /// EVM didn't interacted with this account
    #[default]
    None,
}

impl AccountState {
    /// Returns `true` if EVM cleared storage of this account
    pub fn is_storage_cleared(&self) -> bool {
        matches!(self, AccountState::StorageCleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::{address, Bytes};
    use state::EvmStorageSlot;

    const ALICE: Address = address!("0x1000000000000000000000000000000000000001");

    #[test]
    fn insert_account_storage() {
        let nonce = 420;
        let mut init_state = CacheDB::new(EmptyDB::default());
        init_state.insert_account_info(
            ALICE,
            AccountInfo {
                nonce,
                ..Default::default()
            },
        );

        let (key, value) = (U256::from(123), U256::from(456));
        let mut new_state = CacheDB::new(init_state);
        new_state
            .insert_account_storage(ALICE, key, value)
            .unwrap();

        assert_eq!(new_state.basic(ALICE).unwrap().unwrap().nonce, nonce);
        assert_eq!(new_state.storage(ALICE, key), Ok(value));
    }

    #[test]
    fn replace_account_storage_hides_backend_slots() {
        let mut init_state = CacheDB::new(EmptyDB::default());
        init_state.insert_account_info(ALICE, AccountInfo::default().with_nonce(1));
        let (key0, value0) = (U256::from(123), U256::from(456));
        let (key1, value1) = (U256::from(789), U256::from(999));
        init_state
            .insert_account_storage(ALICE, key0, value0)
            .unwrap();

        let mut new_state = CacheDB::new(init_state);
        new_state
            .replace_account_storage(ALICE, [(key1, value1)].into_iter().collect())
            .unwrap();

        assert_eq!(new_state.storage(ALICE, key0), Ok(U256::ZERO));
        assert_eq!(new_state.storage(ALICE, key1), Ok(value1));
    }

    #[test]
    fn contract_code_is_split_from_account_info() {
        let mut db = InMemoryDB::default();
        let code = Bytes::from_static(&[0x60, 0x00, 0xf3]);
        db.insert_account_info(ALICE, AccountInfo::default().with_code(code.clone()));

        let info = db.basic(ALICE).unwrap().unwrap();
        assert!(info.code.is_none());
        assert_eq!(db.code_by_hash(info.code_hash), Ok(code));
    }

    #[test]
    fn commit_applies_touched_accounts_only() {
        let bob = address!("0x2000000000000000000000000000000000000002");
        let mut db = InMemoryDB::default();

        let mut touched = Account::from(AccountInfo::from_balance(U256::from(10)));
        touched.mark_touch();
        touched
            .storage
            .insert(U256::from(5), EvmStorageSlot::new_changed(U256::ZERO, U256::from(9)));
        let untouched = Account::from(AccountInfo::from_balance(U256::from(99)));

        db.commit([(ALICE, touched), (bob, untouched)].into_iter().collect());

        assert_eq!(db.basic(ALICE).unwrap().unwrap().balance, U256::from(10));
        assert_eq!(db.storage(ALICE, U256::from(5)), Ok(U256::from(9)));
        assert_eq!(db.basic(bob), Ok(None));
    }

    #[test]
    fn commit_of_selfdestructed_account_clears_it() {
        let mut db = InMemoryDB::default();
        db.insert_account_info(ALICE, AccountInfo::from_balance(U256::from(1)));
        db.insert_account_storage(ALICE, U256::from(1), U256::from(1))
            .unwrap();

        let mut destroyed = Account::from(AccountInfo::default());
        destroyed.mark_touch();
        destroyed.mark_selfdestruct();
        db.commit([(ALICE, destroyed)].into_iter().collect());

        assert_eq!(db.basic(ALICE), Ok(None));
        assert_eq!(db.storage(ALICE, U256::from(1)), Ok(U256::ZERO));
    }
}
