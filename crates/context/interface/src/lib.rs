//! Capability traits shared by the engine, the precompile manager and the
//! external interpreter.
//!
//! The split follows who may see what: [`ExecutionCallback`] is the narrow
//! view handed to precompiled contracts, [`Host`] the full view handed to an
//! [`Interpreter`], and [`CallContext`] the nested-call surface both build on.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

pub mod block;
pub mod call;
pub mod callback;
pub mod cfg;
pub mod host;
pub mod journaled_state;
pub mod result;
pub mod state;

pub use block::{Block, BlockEnv};
pub use call::{CallContext, CallOutcome, CreateOutcome, Frame};
pub use callback::{BlockContextAccessor, CallPrimitives, ExecutionCallback, StateAccessor};
pub use cfg::{Cfg, CfgEnv};
pub use host::{Host, Interpreter};
pub use journaled_state::{JournalCheckpoint, SelfDestructResult, StateLoad, TransferError};
pub use primitives;
pub use result::{CallError, PrecompileError};
pub use state::{StateAccess, StateDb, StateError};
