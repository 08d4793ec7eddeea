//! Journaled state.
mod entry;

pub use entry::JournalEntry;

use context_interface::{JournalCheckpoint, SelfDestructResult, StateLoad, TransferError};
use core::mem;
use database::Database;
use primitives::{
    hardfork::{SpecId, SpecId::*},
    hash_map::Entry,
    keccak256, Address, Bytes, HashMap, HashSet, Log, StorageKey, StorageValue, B256,
    KECCAK_EMPTY, U256,
};
use state::{Account, EvmState, EvmStorageSlot, TransientStorage};
use std::vec::Vec;

/// A journal of state changes internal to the engine.
///
/// Every frame opens a [`JournalCheckpoint`]. The checkpoint remembers how
/// many logs and journal entries existed when it was taken, so reverting it
/// undoes exactly the changes made by that frame and its sub-frames.
#[derive(Debug, Clone)]
pub struct Journal<DB> {
    /// Database
    pub database: DB,
    /// The current state
    pub state: EvmState,
    /// Transient storage that is discarded after every transaction.
    ///
    /// See [EIP-1153](https://eips.ethereum.org/EIPS/eip-1153).
    pub transient_storage: TransientStorage,
    /// Emitted logs
    pub logs: Vec<Log>,
    /// Number of open checkpoints
    pub depth: usize,
    /// Every state change since the start of the transaction
    pub journal: Vec<JournalEntry>,
    /// Gas refund counter
    pub refund: i64,
    /// The spec ID for the EVM
    ///
    /// Decides between the pre and post EIP-161 notion of an empty account
    /// and whether EIP-6780 limits `SELFDESTRUCT`.
    pub spec: SpecId,
    /// Addresses that count as warm on their first load.
    pub warm_preloaded_addresses: HashSet<Address>,
    /// Precompile addresses
    pub precompiles: HashSet<Address>,
}

/// Output of the journal after finalizing.
#[derive(Debug, Clone, Default)]
pub struct JournalOutput {
    /// Accounts loaded, created or changed during the transaction.
    pub state: EvmState,
    /// Logs that were emitted by contract calls.
    pub logs: Vec<Log>,
    /// Final refund counter.
    pub refund: i64,
}

impl<DB: Database> Journal<DB> {
    /// Creates new journaled state over `database`.
    pub fn new(spec: SpecId, database: DB) -> Journal<DB> {
        Self {
            database,
            state: HashMap::default(),
            transient_storage: TransientStorage::default(),
            logs: Vec::new(),
            journal: Vec::new(),
            refund: 0,
            depth: 0,
            spec,
            warm_preloaded_addresses: HashSet::default(),
            precompiles: HashSet::default(),
        }
    }

    /// Sets SpecId.
    #[inline]
    pub fn set_spec_id(&mut self, spec: SpecId) {
        self.spec = spec;
    }

    /// Makes `address` warm on first access.
    pub fn warm_account(&mut self, address: Address) {
        self.warm_preloaded_addresses.insert(address);
    }

    /// Replaces the precompile set and warms its addresses.
    pub fn warm_precompiles(&mut self, addresses: impl IntoIterator<Item = Address>) {
        self.precompiles = addresses.into_iter().collect();
        self.warm_preloaded_addresses
            .extend(self.precompiles.iter().copied());
    }

    /// Loads an account through split field borrows so callers can keep
    /// pushing journal entries while holding it.
    fn load<'a>(
        state: &'a mut EvmState,
        database: &mut DB,
        journal: &mut Vec<JournalEntry>,
        warm: &HashSet<Address>,
        address: Address,
        load_code: bool,
    ) -> Result<StateLoad<&'a mut Account>, DB::Error> {
        let mut load = match state.entry(address) {
            Entry::Occupied(entry) => {
                let account = entry.into_mut();
                let is_cold = account.mark_warm();
                StateLoad::new(account, is_cold)
            }
            Entry::Vacant(vac) => {
                let account = match database.basic(address)? {
                    Some(info) => Account::from(info),
                    None => Account::new_not_existing(),
                };
                StateLoad::new(vac.insert(account), !warm.contains(&address))
            }
        };
        if load.is_cold {
            journal.push(JournalEntry::AccountWarmed { address });
        }
        if load_code && load.data.info.code.is_none() {
            let code = if load.data.info.code_hash == KECCAK_EMPTY {
                Bytes::new()
            } else {
                database.code_by_hash(load.data.info.code_hash)?
            };
            load.data.info.code = Some(code);
        }
        Ok(load)
    }

    /// Loads account into memory. return if it is cold or warm accessed
    #[inline]
    pub fn load_account(
        &mut self,
        address: Address,
    ) -> Result<StateLoad<&mut Account>, DB::Error> {
        Self::load(
            &mut self.state,
            &mut self.database,
            &mut self.journal,
            &self.warm_preloaded_addresses,
            address,
            false,
        )
    }

    /// Loads account and its code.
    #[inline]
    pub fn load_code(
        &mut self,
        address: Address,
    ) -> Result<StateLoad<&mut Account>, DB::Error> {
        Self::load(
            &mut self.state,
            &mut self.database,
            &mut self.journal,
            &self.warm_preloaded_addresses,
            address,
            true,
        )
    }

    /// Whether the account is empty, honouring the pre EIP-161 distinction
    /// between empty and non-existing accounts.
    pub fn is_empty(&mut self, address: Address) -> Result<bool, DB::Error> {
        let spurious_dragon = self.spec.is_enabled_in(SPURIOUS_DRAGON);
        let account = self.load_account(address)?.data;
        Ok(if spurious_dragon {
            account.is_empty()
        } else {
            account.is_loaded_as_not_existing() && !account.is_touched()
        })
    }

    /// Mark account as touched as only touched accounts will be added to state.
    #[inline]
    pub fn touch(&mut self, address: Address) {
        if let Some(account) = self.state.get_mut(&address) {
            Self::touch_account(&mut self.journal, address, account);
        }
    }

    #[inline]
    fn touch_account(journal: &mut Vec<JournalEntry>, address: Address, account: &mut Account) {
        if !account.is_touched() {
            journal.push(JournalEntry::AccountTouched { address });
            account.mark_touch();
        }
    }

    /// Sets the code of the account and its hash.
    pub fn set_code(&mut self, address: Address, code: Bytes) -> Result<(), DB::Error> {
        let Self {
            state,
            database,
            journal,
            warm_preloaded_addresses: warm,
            ..
        } = self;
        let account = Self::load(state, database, journal, warm, address, false)?.data;
        Self::touch_account(journal, address, account);
        journal.push(JournalEntry::CodeChange { address });

        account.info.code_hash = if code.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(&code)
        };
        account.info.code = Some(code);
        Ok(())
    }

    /// Increments the nonce, returns `None` when it would overflow.
    pub fn inc_nonce(&mut self, address: Address) -> Result<Option<u64>, DB::Error> {
        let Self {
            state,
            database,
            journal,
            warm_preloaded_addresses: warm,
            ..
        } = self;
        let account = Self::load(state, database, journal, warm, address, false)?.data;
        if account.info.nonce == u64::MAX {
            return Ok(None);
        }
        Self::touch_account(journal, address, account);
        journal.push(JournalEntry::NonceChange { address });
        account.info.nonce += 1;
        Ok(Some(account.info.nonce))
    }

    /// Credits `value` to the account.
    pub fn balance_incr(
        &mut self,
        address: Address,
        value: U256,
    ) -> Result<Option<TransferError>, DB::Error> {
        self.balance_change(address, |balance| {
            balance
                .checked_add(value)
                .ok_or(TransferError::OverflowPayment)
        })
    }

    /// Debits `value` from the account.
    pub fn balance_decr(
        &mut self,
        address: Address,
        value: U256,
    ) -> Result<Option<TransferError>, DB::Error> {
        self.balance_change(address, |balance| {
            balance.checked_sub(value).ok_or(TransferError::OutOfFunds)
        })
    }

    fn balance_change(
        &mut self,
        address: Address,
        f: impl FnOnce(U256) -> Result<U256, TransferError>,
    ) -> Result<Option<TransferError>, DB::Error> {
        let Self {
            state,
            database,
            journal,
            warm_preloaded_addresses: warm,
            ..
        } = self;
        let account = Self::load(state, database, journal, warm, address, false)?.data;
        let old_balance = account.info.balance;
        let new_balance = match f(old_balance) {
            Ok(balance) => balance,
            Err(err) => return Ok(Some(err)),
        };
        Self::touch_account(journal, address, account);
        if new_balance != old_balance {
            journal.push(JournalEntry::BalanceChange {
                address,
                old_balance,
            });
            account.info.balance = new_balance;
        }
        Ok(None)
    }

    /// Transfers balance from two accounts. Returns error if sender balance is not enough.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        balance: U256,
    ) -> Result<Option<TransferError>, DB::Error> {
        let Self {
            state,
            database,
            journal,
            warm_preloaded_addresses: warm,
            ..
        } = self;

        let to_account = Self::load(state, database, journal, warm, to, false)?.data;
        Self::touch_account(journal, to, to_account);
        let to_balance = to_account.info.balance;
        if balance.is_zero() {
            return Ok(None);
        }

        let from_account = Self::load(state, database, journal, warm, from, false)?.data;
        Self::touch_account(journal, from, from_account);
        let Some(from_balance) = from_account.info.balance.checked_sub(balance) else {
            return Ok(Some(TransferError::OutOfFunds));
        };
        if from == to {
            return Ok(None);
        }
        let Some(to_balance) = to_balance.checked_add(balance) else {
            return Ok(Some(TransferError::OverflowPayment));
        };
        from_account.info.balance = from_balance;

        if let Some(to_account) = state.get_mut(&to) {
            to_account.info.balance = to_balance;
        }
        journal.push(JournalEntry::BalanceTransfer {
            from,
            to,
            balance,
        });
        Ok(None)
    }

    /// Opens the checkpoint of a create frame and moves the endowment.
    ///
    /// There are few steps done:
    /// 1. Check if there is collision of newly created account with existing one.
    /// 2. Mark created account as created.
    /// 3. Add fund to created account
    /// 4. Increment nonce of created account if SpuriousDragon is active
    /// 5. Decrease balance of caller account.
    ///
    /// On failure the checkpoint is already reverted.
    pub fn create_account_checkpoint(
        &mut self,
        caller: Address,
        target_address: Address,
        balance: U256,
    ) -> Result<Result<JournalCheckpoint, TransferError>, DB::Error> {
        let checkpoint = self.checkpoint();
        match self.create_account(caller, target_address, balance) {
            Ok(None) => Ok(Ok(checkpoint)),
            Ok(Some(err)) => {
                self.checkpoint_revert(checkpoint);
                Ok(Err(err))
            }
            Err(err) => {
                self.checkpoint_revert(checkpoint);
                Err(err)
            }
        }
    }

    fn create_account(
        &mut self,
        caller: Address,
        target_address: Address,
        balance: U256,
    ) -> Result<Option<TransferError>, DB::Error> {
        let spurious_dragon = self.spec.is_enabled_in(SPURIOUS_DRAGON);

        let caller_balance = self.load_account(caller)?.data.info.balance;
        if caller_balance < balance {
            return Ok(Some(TransferError::OutOfFunds));
        }

        let Self {
            state,
            database,
            journal,
            warm_preloaded_addresses: warm,
            ..
        } = self;
        let target = Self::load(state, database, journal, warm, target_address, false)?.data;

        // New account can be created if it has neither code nor nonce.
        if target.info.code_hash != KECCAK_EMPTY || target.info.nonce != 0 {
            return Ok(Some(TransferError::CreateCollision));
        }
        let Some(new_balance) = target.info.balance.checked_add(balance) else {
            return Ok(Some(TransferError::OverflowPayment));
        };

        target.mark_created();
        journal.push(JournalEntry::AccountCreated {
            address: target_address,
        });
        target.info.code = Some(Bytes::new());
        // EIP-161: State trie clearing (invariant-preserving alternative)
        if spurious_dragon {
            // nonce is going to be reset to zero in AccountCreated journal entry.
            target.info.nonce = 1;
        }
        Self::touch_account(journal, target_address, target);
        target.info.balance = new_balance;

        if let Some(caller) = state.get_mut(&caller) {
            caller.info.balance -= balance;
        }
        journal.push(JournalEntry::BalanceTransfer {
            from: caller,
            to: target_address,
            balance,
        });
        Ok(None)
    }

    /// Makes a checkpoint that in case of Revert can bring back state to this point.
    #[inline]
    pub fn checkpoint(&mut self) -> JournalCheckpoint {
        self.depth += 1;
        JournalCheckpoint {
            log_i: self.logs.len(),
            journal_i: self.journal.len(),
        }
    }

    /// Commits the checkpoint.
    #[inline]
    pub fn checkpoint_commit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Reverts all changes to state until given checkpoint.
    pub fn checkpoint_revert(&mut self, checkpoint: JournalCheckpoint) {
        self.depth = self.depth.saturating_sub(1);
        let entries = self
            .journal
            .split_off(checkpoint.journal_i.min(self.journal.len()));
        JournalEntry::revert_all(
            entries,
            &mut self.state,
            &mut self.transient_storage,
            &mut self.refund,
        );
        self.logs.truncate(checkpoint.log_i);
    }

    /// Loads storage slot.
    pub fn sload(
        &mut self,
        address: Address,
        key: StorageKey,
    ) -> Result<StateLoad<StorageValue>, DB::Error> {
        let Self {
            state,
            database,
            journal,
            warm_preloaded_addresses: warm,
            ..
        } = self;
        let account = Self::load(state, database, journal, warm, address, false)?.data;
        // only if account is created in this tx we can assume that storage is empty.
        let is_newly_created = account.is_created();
        let (value, is_cold) = match account.storage.entry(key) {
            Entry::Occupied(occ) => {
                let slot = occ.into_mut();
                let is_cold = slot.mark_warm();
                (slot.present_value, is_cold)
            }
            Entry::Vacant(vac) => {
                let value = if is_newly_created {
                    StorageValue::ZERO
                } else {
                    database.storage(address, key)?
                };
                vac.insert(EvmStorageSlot::new(value));
                (value, true)
            }
        };

        if is_cold {
            journal.push(JournalEntry::StorageWarmed { address, key });
        }
        Ok(StateLoad::new(value, is_cold))
    }

    /// Stores storage slot and returns the value it replaced.
    pub fn sstore(
        &mut self,
        address: Address,
        key: StorageKey,
        new: StorageValue,
    ) -> Result<StateLoad<StorageValue>, DB::Error> {
        let present = self.sload(address, key)?;
        if present.data == new {
            return Ok(present);
        }
        if let Some(account) = self.state.get_mut(&address) {
            Self::touch_account(&mut self.journal, address, account);
            if let Some(slot) = account.storage.get_mut(&key) {
                slot.present_value = new;
            }
        }
        self.journal.push(JournalEntry::StorageChanged {
            address,
            key,
            had_value: present.data,
        });
        Ok(present)
    }

    /// Read transient storage tied to the account.
    ///
    /// EIP-1153: Transient storage opcodes
    #[inline]
    pub fn tload(&mut self, address: Address, key: StorageKey) -> StorageValue {
        self.transient_storage
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    /// Store transient storage tied to the account.
    ///
    /// EIP-1153: Transient storage opcodes
    pub fn tstore(&mut self, address: Address, key: StorageKey, new: StorageValue) {
        let had_value = if new.is_zero() {
            self.transient_storage.remove(&(address, key))
        } else {
            let previous_value = self
                .transient_storage
                .insert((address, key), new)
                .unwrap_or_default();
            (previous_value != new).then_some(previous_value)
        };

        if let Some(had_value) = had_value {
            self.journal.push(JournalEntry::TransientStorageChange {
                address,
                key,
                had_value,
            });
        }
    }

    /// Pushes log into subroutine.
    #[inline]
    pub fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Adds `delta` to the refund counter.
    pub fn add_refund(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.journal.push(JournalEntry::RefundChange {
            old_refund: self.refund,
        });
        self.refund = self.refund.saturating_add(delta);
    }

    /// Performs selfdestruct action.
    /// Transfers balance from address to target.
    ///
    /// After Cancun (EIP-6780) the account is only destroyed when it was
    /// created in the same transaction; otherwise only the balance moves.
    pub fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Result<StateLoad<SelfDestructResult>, DB::Error> {
        let is_cancun_enabled = self.spec.is_enabled_in(CANCUN);
        let target_is_empty = self.is_empty(target)?;
        let Self {
            state,
            database,
            journal,
            warm_preloaded_addresses: warm,
            ..
        } = self;

        let target_load = Self::load(state, database, journal, warm, target, false)?;
        let is_cold = target_load.is_cold;
        Self::touch_account(journal, target, target_load.data);

        let account = Self::load(state, database, journal, warm, address, false)?.data;
        let balance = account.info.balance;
        let previously_destroyed = account.is_selfdestructed();

        let entry = if account.is_created() || !is_cancun_enabled {
            account.mark_selfdestruct();
            account.info.balance = U256::ZERO;
            Some(JournalEntry::AccountDestroyed {
                address,
                target,
                was_destroyed: previously_destroyed,
                had_balance: balance,
            })
        } else if address != target {
            account.info.balance = U256::ZERO;
            Some(JournalEntry::BalanceTransfer {
                from: address,
                to: target,
                balance,
            })
        } else {
            // Cancun, not created in this transaction and sending to itself: nothing changes.
            None
        };

        if let Some(entry) = entry {
            if address != target {
                if let Some(target) = state.get_mut(&target) {
                    target.info.balance = target.info.balance.saturating_add(balance);
                }
            }
            journal.push(entry);
        }

        Ok(StateLoad::new(
            SelfDestructResult {
                had_value: !balance.is_zero(),
                target_exists: !target_is_empty,
                previously_destroyed,
            },
            is_cold,
        ))
    }

    /// Hash of an ancestor block.
    pub fn block_hash(&mut self, number: u64) -> Result<B256, DB::Error> {
        self.database.block_hash(number)
    }

    /// Takes the transaction's state and logs and resets the journal for
    /// the next transaction.
    pub fn finalize(&mut self) -> JournalOutput {
        let Self {
            state,
            transient_storage,
            logs,
            depth,
            journal,
            refund,
            // kept across transactions
            spec: _,
            database: _,
            warm_preloaded_addresses,
            precompiles: _,
        } = self;

        *transient_storage = TransientStorage::default();
        journal.clear();
        *depth = 0;
        warm_preloaded_addresses.clear();
        JournalOutput {
            state: mem::take(state),
            logs: mem::take(logs),
            refund: mem::take(refund),
        }
    }
}
