//! Interpreter-facing capabilities.
use crate::{
    call::{CallContext, CallOutcome, Frame},
    callback::BlockContextAccessor,
    cfg::CfgEnv,
    state::{StateDb, StateError},
};
use auto_impl::auto_impl;
use primitives::{Bytes, B256};

/// Everything an interpreter may use while it executes bytecode.
pub trait Host: CallContext + StateDb + BlockContextAccessor {
    /// Active configuration.
    fn cfg(&self) -> &CfgEnv;

    /// Hash of an ancestor block.
    fn block_hash(&mut self, number: u64) -> Result<B256, StateError>;
}

/// Bytecode runner plugged into the engine.
///
/// The engine prepares the frame (checkpoint, value transfer, depth) and
/// calls [`Interpreter::run`] with the account's code. Nested calls come back
/// in through `host`. For a create frame the returned output is the runtime
/// code to deploy.
#[auto_impl(&, Box, Arc)]
pub trait Interpreter {
    /// Executes `code` in `frame`.
    fn run(&self, frame: &Frame, code: &Bytes, host: &mut dyn Host) -> CallOutcome;
}
