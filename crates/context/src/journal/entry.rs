//! Journal entries.
//!
//! Every state change pushes one entry; reverting a checkpoint replays the
//! entries pushed after it in reverse.
use primitives::{Address, Bytes, StorageKey, StorageValue, KECCAK_EMPTY, U256};
use state::{EvmState, TransientStorage};
use std::vec::Vec;

/// Journal entries that are used to track changes to the state and are used to revert it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JournalEntry {
    /// Used to mark account that is warm inside EVM in regard to EIP-2929 AccessList.
    /// Revert: mark the account cold again.
    AccountWarmed {
        /// Address of warmed account.
        address: Address,
    },
    /// Mark account to be destroyed and journal balance to be reverted
    /// Revert: unmark the account and give the balance back.
    AccountDestroyed {
        /// Address of account to be destroyed.
        address: Address,
        /// Address of account that received the balance.
        target: Address,
        /// Whether the account had already been destroyed before this entry.
        was_destroyed: bool,
        /// Balance of the account at the time of destruction.
        had_balance: U256,
    },
    /// Loading account does not mean that account will need to be added to MerkleTree (touched).
    /// Only when account is called (to execute contract or transfer balance) only then account is made touched.
    /// Revert: unmark touch.
    AccountTouched {
        /// Address of account that is touched.
        address: Address,
    },
    /// Transfer balance between two accounts
    /// Revert: transfer the balance back.
    BalanceTransfer {
        /// Address of account that sent the balance.
        from: Address,
        /// Address of account that received the balance.
        to: Address,
        /// Balance that is transferred.
        balance: U256,
    },
    /// Direct credit or debit of an account.
    /// Revert: restore the old balance.
    BalanceChange {
        /// Address of account whose balance changed.
        address: Address,
        /// Balance before the change.
        old_balance: U256,
    },
    /// Increment nonce
    /// Revert: decrement nonce.
    NonceChange {
        /// Address of account that changed its nonce.
        address: Address,
    },
    /// Create account
    /// Revert: unmark the account as created and reset its nonce.
    AccountCreated {
        /// Address of account that is created.
        address: Address,
    },
    /// Entry used to track storage changes
    /// Revert: restore the previous present value.
    StorageChanged {
        /// Key of storage slot that is changed.
        key: StorageKey,
        /// Previous value of storage slot.
        had_value: StorageValue,
        /// Address of account that changed its storage.
        address: Address,
    },
    /// Entry used to track storage warming introduced by EIP-2929.
    /// Revert: mark the slot cold.
    StorageWarmed {
        /// Key of storage slot that is warmed.
        key: StorageKey,
        /// Address of account that owns the slot.
        address: Address,
    },
    /// It is used to track an EIP-1153 transient storage change.
    /// Revert: restore the previous value.
    TransientStorageChange {
        /// Key of transient storage slot that is changed.
        key: StorageKey,
        /// Previous value of transient storage slot.
        had_value: StorageValue,
        /// Address of account that changed its transient storage.
        address: Address,
    },
    /// Code changed
    /// Revert: reset the code to empty.
    CodeChange {
        /// Address of account that changed its code.
        address: Address,
    },
    /// Refund counter changed.
    /// Revert: restore the old counter.
    RefundChange {
        /// Counter before the change.
        old_refund: i64,
    },
}

impl JournalEntry {
    /// Undoes the change this entry recorded.
    pub fn revert(
        self,
        state: &mut EvmState,
        transient_storage: &mut TransientStorage,
        refund: &mut i64,
    ) {
        match self {
            JournalEntry::AccountWarmed { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.mark_cold();
                }
            }
            JournalEntry::AccountTouched { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.unmark_touch();
                }
            }
            JournalEntry::AccountDestroyed {
                address,
                target,
                was_destroyed,
                had_balance,
            } => {
                if let Some(account) = state.get_mut(&address) {
                    if !was_destroyed {
                        account.unmark_selfdestruct();
                    }
                    account.info.balance = account.info.balance.saturating_add(had_balance);
                }
                if address != target {
                    if let Some(target) = state.get_mut(&target) {
                        target.info.balance = target.info.balance.saturating_sub(had_balance);
                    }
                }
            }
            JournalEntry::BalanceTransfer { from, to, balance } => {
                if let Some(from) = state.get_mut(&from) {
                    from.info.balance = from.info.balance.saturating_add(balance);
                }
                if let Some(to) = state.get_mut(&to) {
                    to.info.balance = to.info.balance.saturating_sub(balance);
                }
            }
            JournalEntry::BalanceChange {
                address,
                old_balance,
            } => {
                if let Some(account) = state.get_mut(&address) {
                    account.info.balance = old_balance;
                }
            }
            JournalEntry::NonceChange { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.info.nonce = account.info.nonce.saturating_sub(1);
                }
            }
            JournalEntry::AccountCreated { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.unmark_created();
                    account.info.nonce = 0;
                    account.storage.clear();
                }
            }
            JournalEntry::StorageWarmed { address, key } => {
                if let Some(slot) = state
                    .get_mut(&address)
                    .and_then(|account| account.storage.get_mut(&key))
                {
                    slot.mark_cold();
                }
            }
            JournalEntry::StorageChanged {
                address,
                key,
                had_value,
            } => {
                if let Some(slot) = state
                    .get_mut(&address)
                    .and_then(|account| account.storage.get_mut(&key))
                {
                    slot.present_value = had_value;
                }
            }
            JournalEntry::TransientStorageChange {
                address,
                key,
                had_value,
            } => {
                let tkey = (address, key);
                if had_value.is_zero() {
                    // if previous value is zero, remove it
                    transient_storage.remove(&tkey);
                } else {
                    // if not zero, reinsert old value to transient storage.
                    transient_storage.insert(tkey, had_value);
                }
            }
            JournalEntry::CodeChange { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.info.code_hash = KECCAK_EMPTY;
                    account.info.code = Some(Bytes::new());
                }
            }
            JournalEntry::RefundChange { old_refund } => {
                *refund = old_refund;
            }
        }
    }

    /// Reverts every entry of `entries`, newest first.
    pub fn revert_all(
        entries: Vec<JournalEntry>,
        state: &mut EvmState,
        transient_storage: &mut TransientStorage,
        refund: &mut i64,
    ) {
        for entry in entries.into_iter().rev() {
            entry.revert(state, transient_storage, refund);
        }
    }
}
