//! Journaled state the engine executes against.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

pub mod journal;

pub use context_interface::{BlockEnv, CfgEnv};
pub use journal::{Journal, JournalEntry, JournalOutput};
