//! # callvm
//!
//! Precompiled-contract dispatch and the nested-call engine of an EVM.
//!
//! [`Evm`] owns the journaled state, selects the precompile registry for the
//! configured hardfork and runs call and create frames. Bytecode execution is
//! delegated to an [`Interpreter`] supplied by the embedder; nested calls come
//! back to the engine through [`Host`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

// reexport dependencies
pub use context;
pub use context_interface;
pub use database;
pub use handler;
pub use precompile;
pub use primitives;
pub use state;

// reexport common types
pub use context::Journal;
pub use context_interface::{
    BlockContextAccessor, BlockEnv, CallContext, CallError, CallOutcome, CallPrimitives, CfgEnv,
    CreateOutcome, ExecutionCallback, Frame, Host, Interpreter, StateAccess, StateAccessor,
    StateDb, StateError,
};
pub use database::{Database, DatabaseCommit, DatabaseRef, InMemoryDB};
pub use handler::{
    CallInputs, CallScheme, CreateScheme, Evm, EvmError, ExecutionResult, Output, ResultAndState,
};
pub use precompile::{
    EthPrecompileManager, PrecompileManager, PrecompileOutcome, PrecompiledContract, Precompiles,
};
