//! State capabilities.
//!
//! [`StateAccess`] is what a precompiled contract may touch. [`StateDb`] adds
//! the journal controls only the engine and the interpreter need.
use crate::journaled_state::{JournalCheckpoint, SelfDestructResult, TransferError};
use auto_impl::auto_impl;
use primitives::{Address, Bytes, Log, StorageKey, StorageValue, B256, U256};

/// Failure of a state operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    /// Write attempted inside a static context.
    #[error("write protection")]
    WriteProtection,
    /// Balance too low for the requested debit.
    #[error("insufficient balance")]
    OutOfFunds,
    /// Credit would overflow the balance.
    #[error("balance overflow")]
    BalanceOverflow,
    /// Nonce cannot be incremented further.
    #[error("nonce overflow")]
    NonceOverflow,
    /// The database behind the journal failed.
    #[error("state backend failure")]
    Backend,
}

impl From<TransferError> for StateError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::OverflowPayment => Self::BalanceOverflow,
            TransferError::OutOfFunds | TransferError::CreateCollision => Self::OutOfFunds,
        }
    }
}

/// Account and storage access.
#[auto_impl(&mut, Box)]
pub trait StateAccess {
    /// Balance of the account, zero when it does not exist.
    fn balance(&mut self, address: Address) -> Result<U256, StateError>;

    /// Nonce of the account, zero when it does not exist.
    fn nonce(&mut self, address: Address) -> Result<u64, StateError>;

    /// Deployed code of the account.
    fn code(&mut self, address: Address) -> Result<Bytes, StateError>;

    /// Code hash of the account, [`B256::ZERO`] for empty or non-existing accounts (EIP-1052).
    fn code_hash(&mut self, address: Address) -> Result<B256, StateError>;

    /// Whether the account exists in state.
    fn exists(&mut self, address: Address) -> Result<bool, StateError>;

    /// Whether the account is empty per EIP-161 (no code, zero nonce, zero balance).
    fn is_empty(&mut self, address: Address) -> Result<bool, StateError>;

    /// Reads a storage slot.
    fn sload(&mut self, address: Address, key: StorageKey) -> Result<StorageValue, StateError>;

    /// Writes a storage slot.
    fn sstore(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError>;

    /// Moves `value` from `from` to `to`.
    fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<(), StateError>;

    /// Credits the account.
    fn add_balance(&mut self, address: Address, value: U256) -> Result<(), StateError>;

    /// Debits the account.
    fn sub_balance(&mut self, address: Address, value: U256) -> Result<(), StateError>;

    /// Increments the nonce and returns the new value.
    fn inc_nonce(&mut self, address: Address) -> Result<u64, StateError>;

    /// Replaces the code of the account.
    fn set_code(&mut self, address: Address, code: Bytes) -> Result<(), StateError>;
}

/// Full journaled state: [`StateAccess`] plus checkpoints, logs, access
/// lists, refunds, transient storage and self-destruct.
#[auto_impl(&mut, Box)]
pub trait StateDb: StateAccess {
    /// Opens a checkpoint that a later revert returns to.
    fn checkpoint(&mut self) -> JournalCheckpoint;

    /// Folds the latest checkpoint into its parent.
    fn checkpoint_commit(&mut self);

    /// Undoes every change made since `checkpoint`.
    fn checkpoint_revert(&mut self, checkpoint: JournalCheckpoint);

    /// Emits a log.
    fn log(&mut self, log: Log) -> Result<(), StateError>;

    /// Marks the account warm, returns whether it was cold.
    fn warm_account(&mut self, address: Address) -> Result<bool, StateError>;

    /// Marks the slot warm, returns whether it was cold.
    fn warm_storage(&mut self, address: Address, key: StorageKey) -> Result<bool, StateError>;

    /// Whether the account is already in the access list.
    fn is_warm_account(&self, address: Address) -> bool;

    /// Adjusts the refund counter.
    fn add_refund(&mut self, delta: i64);

    /// Current refund counter.
    fn refund(&self) -> i64;

    /// Reads transient storage (EIP-1153).
    fn tload(&mut self, address: Address, key: StorageKey) -> StorageValue;

    /// Writes transient storage (EIP-1153).
    fn tstore(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError>;

    /// Destroys `address`, sending its balance to `target`.
    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Result<SelfDestructResult, StateError>;
}
