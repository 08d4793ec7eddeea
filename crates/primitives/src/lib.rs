//! # callvm-primitives
//!
//! Hardfork identifiers, the [`Rules`] snapshot and the alloy types shared by
//! every callvm crate.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

pub mod constants;
pub mod hardfork;
pub mod rules;

pub use alloy_primitives::{
    self, address, b256, hex, keccak256,
    map::{hash_map, hash_set, HashMap, HashSet},
    Address, Bytes, Log, LogData, B256, U256,
};
pub use constants::*;
pub use rules::Rules;

/// Storage key of an account slot.
pub type StorageKey = U256;

/// Storage value of an account slot.
pub type StorageValue = U256;
