//! The view of the engine handed to a running precompiled contract.
//!
//! It stops short of [`StateDb`](crate::StateDb): a contract can
//! read and write accounts and start nested calls, but it cannot open or
//! revert checkpoints, emit logs, touch the access list, adjust refunds or
//! self-destruct.
use crate::{
    block::Block,
    call::{CallOutcome, CreateOutcome},
    state::StateAccess,
};
use primitives::{Address, Bytes, B256, U256};

/// Access to account state.
pub trait StateAccessor {
    /// Mutable state access.
    fn state(&mut self) -> &mut dyn StateAccess;
}

/// Access to the block being executed.
pub trait BlockContextAccessor {
    /// The current block.
    fn block(&self) -> &dyn Block;

    /// Chain id of the running configuration.
    fn chain_id(&self) -> u64;
}

/// Nested calls a contract may start on its own behalf.
///
/// `caller` becomes the callee's `CALLER`, usually the contract's own address.
pub trait CallPrimitives {
    /// Message call with value transfer.
    fn call(
        &mut self,
        caller: Address,
        address: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallOutcome;

    /// Message call with every state change forbidden.
    fn static_call(
        &mut self,
        caller: Address,
        address: Address,
        input: Bytes,
        gas: u64,
    ) -> CallOutcome;

    /// Contract creation at `caller.create(nonce)`.
    fn create(&mut self, caller: Address, init_code: Bytes, gas: u64, value: U256)
        -> CreateOutcome;

    /// Contract creation at
    /// `keccak256(0xff ++ caller ++ salt ++ keccak256(init_code))[12..]`.
    fn create2(
        &mut self,
        caller: Address,
        init_code: Bytes,
        gas: u64,
        value: U256,
        salt: B256,
    ) -> CreateOutcome;
}

/// Everything a precompiled contract can reach while it runs.
pub trait ExecutionCallback: StateAccessor + CallPrimitives + BlockContextAccessor {}

impl<T> ExecutionCallback for T where
    T: StateAccessor + CallPrimitives + BlockContextAccessor + ?Sized
{
}
