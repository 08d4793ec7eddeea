//! Database backends the journaled state reads from.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

use auto_impl::auto_impl;
use core::convert::Infallible;
use primitives::{Address, Bytes, HashMap, StorageKey, StorageValue, B256};
use state::{Account, AccountInfo};

mod empty_db;
mod in_memory_db;

pub use empty_db::{EmptyDB, EmptyDBTyped};
pub use in_memory_db::{AccountState, Cache, CacheDB, DbAccount, InMemoryDB};
pub use primitives;
pub use state;

/// Marker for errors a [Database] may return.
///
/// The engine hands these back to the caller of a transaction untouched.
pub trait DBErrorMarker {}

impl DBErrorMarker for Infallible {}

/// Account, code, storage and block hash source.
#[auto_impl(&mut, Box)]
pub trait Database {
    /// The database error type.
    type Error: DBErrorMarker + core::error::Error;

    /// Gets basic account information.
    fn basic(&mut self, address: Address) -> Result<Option<AccountInfo>, Self::Error>;

    /// Gets account code by its hash.
    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytes, Self::Error>;

    /// Gets storage value of address at index.
    fn storage(&mut self, address: Address, index: StorageKey)
        -> Result<StorageValue, Self::Error>;

    /// Gets block hash by block number.
    fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error>;
}

/// Read-only variant of [Database].
#[auto_impl(&, &mut, Box)]
pub trait DatabaseRef {
    /// The database error type.
    type Error: DBErrorMarker + core::error::Error;

    /// Gets basic account information.
    fn basic_ref(&self, address: Address) -> Result<Option<AccountInfo>, Self::Error>;

    /// Gets account code by its hash.
    fn code_by_hash_ref(&self, code_hash: B256) -> Result<Bytes, Self::Error>;

    /// Gets storage value of address at index.
    fn storage_ref(&self, address: Address, index: StorageKey)
        -> Result<StorageValue, Self::Error>;

    /// Gets block hash by block number.
    fn block_hash_ref(&self, number: u64) -> Result<B256, Self::Error>;
}

/// Applies the final state of a transaction to the database.
#[auto_impl(&mut, Box)]
pub trait DatabaseCommit {
    /// Commit changes to the database.
    fn commit(&mut self, changes: HashMap<Address, Account>);
}
