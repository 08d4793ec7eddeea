//! Execution engine: frame handling, precompile dispatch and the call context
//! handed to interpreters and precompiled contracts.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

// Use serde to avoid unused dependency warning when the serde feature is enabled
#[cfg(feature = "serde")]
use serde as _;

pub mod error;
pub mod evm;
pub mod frame;
mod host;
pub mod result;

#[cfg(test)]
mod test_utils;

// Public exports
pub use error::EvmError;
pub use evm::Evm;
pub use frame::{CallInputs, CallScheme, CreateScheme};
pub use result::{ExecutionResult, Output, ResultAndState};
