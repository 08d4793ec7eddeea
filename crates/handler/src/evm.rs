//! The engine: owns the journal, the configuration, the precompile manager
//! and the interpreter, and runs top-level executions.
use crate::{
    frame::{CallInputs, CallScheme, CreateScheme},
    EvmError, ExecutionResult, Output, ResultAndState,
};
use context::{Journal, JournalOutput};
use context_interface::{BlockEnv, Cfg, CallError, CfgEnv, Interpreter, StateError};
use database::{Database, DatabaseCommit};
use precompile::{EthPrecompileManager, PrecompileManager};
use primitives::{Address, Bytes, U256};
use state::EvmState;
use tracing::{debug, warn};

/// Execution engine.
///
/// A single value implements every capability the interpreter and the
/// precompiled contracts reach: [`Host`](context_interface::Host),
/// [`CallContext`](context_interface::CallContext) and
/// [`ExecutionCallback`](context_interface::ExecutionCallback).
#[derive(Debug)]
pub struct Evm<DB: Database, I, PM = EthPrecompileManager> {
    /// Journaled state over the database
    pub journal: Journal<DB>,
    /// Configuration
    pub cfg: CfgEnv,
    /// Block being executed
    pub block: BlockEnv,
    /// Precompile lookup and dispatch
    pub precompiles: PM,
    /// Bytecode runner
    pub interpreter: I,
    /// Number of frames currently running
    pub(crate) depth: u64,
    /// The running frame forbids state changes
    pub(crate) is_static: bool,
    /// First database error of the running execution
    pub(crate) db_error: Option<DB::Error>,
}

impl<DB: Database, I> Evm<DB, I, EthPrecompileManager> {
    /// Creates an engine with the mainnet precompiles for `cfg`.
    pub fn new(database: DB, cfg: CfgEnv, interpreter: I) -> Self {
        let precompiles = EthPrecompileManager::new(cfg.rules());
        Self::new_with_precompiles(database, cfg, interpreter, precompiles)
    }
}

impl<DB: Database, I, PM> Evm<DB, I, PM> {
    /// Creates an engine with a custom precompile manager.
    pub fn new_with_precompiles(database: DB, cfg: CfgEnv, interpreter: I, precompiles: PM) -> Self {
        Self {
            journal: Journal::new(cfg.spec, database),
            cfg,
            block: BlockEnv::default(),
            precompiles,
            interpreter,
            depth: 0,
            is_static: false,
            db_error: None,
        }
    }

    /// Sets the block environment.
    pub fn with_block(mut self, block: BlockEnv) -> Self {
        self.block = block;
        self
    }

    /// Database behind the journal.
    pub fn db(&self) -> &DB {
        &self.journal.database
    }

    /// Mutable database behind the journal.
    pub fn db_mut(&mut self) -> &mut DB {
        &mut self.journal.database
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> u64 {
        self.depth
    }

    /// Records a database failure and turns it into the frame-level error.
    ///
    /// Only the first failure of an execution is kept.
    pub(crate) fn backend_error(&mut self, error: DB::Error) -> StateError {
        warn!(target: "evm", %error, depth = self.depth, "database failure");
        if self.db_error.is_none() {
            self.db_error = Some(error);
        }
        StateError::Backend
    }

    /// Maps a database result to a state result, recording the failure.
    #[inline]
    pub(crate) fn db_result<T>(&mut self, result: Result<T, DB::Error>) -> Result<T, StateError> {
        result.map_err(|error| self.backend_error(error))
    }
}

impl<DB, I, PM> Evm<DB, I, PM>
where
    DB: Database,
    I: Interpreter + Clone,
    PM: PrecompileManager + Clone,
{
    /// Executes a message call from `caller` to `to`.
    pub fn transact_call(
        &mut self,
        caller: Address,
        to: Address,
        input: Bytes,
        gas_limit: u64,
        value: U256,
    ) -> Result<ResultAndState, EvmError<DB::Error>> {
        self.prepare(caller, Some(to));
        let outcome = self.execute_call(CallInputs {
            scheme: CallScheme::Call,
            caller,
            target_address: to,
            bytecode_address: to,
            value,
            input,
            gas_limit,
            is_static: false,
        });
        self.finish(
            outcome.result,
            outcome.output,
            outcome.gas_remaining,
            gas_limit,
            Output::Call,
        )
    }

    /// Deploys `init_code` from `caller`.
    pub fn transact_create(
        &mut self,
        caller: Address,
        init_code: Bytes,
        gas_limit: u64,
        value: U256,
    ) -> Result<ResultAndState, EvmError<DB::Error>> {
        self.prepare(caller, None);
        let outcome = self.execute_create(caller, init_code, gas_limit, value, CreateScheme::Create);
        let address = outcome.address;
        self.finish(
            outcome.result,
            outcome.output,
            outcome.gas_remaining,
            gas_limit,
            |output| Output::Create(output, address),
        )
    }

    /// Selects the registry for the configured rules and warms the
    /// addresses every execution starts with.
    fn prepare(&mut self, caller: Address, to: Option<Address>) {
        let rules = self.cfg.rules();
        let active = self.precompiles.get_active(&rules);
        debug!(target: "evm", spec = %self.cfg.spec, precompiles = active.len(), %caller, ?to, "new execution");

        self.journal.set_spec_id(self.cfg.spec);
        self.journal.warm_precompiles(active);
        self.journal.warm_account(caller);
        if let Some(to) = to {
            self.journal.warm_account(to);
        }
        self.depth = 0;
        self.is_static = false;
        self.db_error = None;
    }

    /// Hands out the journal's state and turns the frame result into an
    /// [`ExecutionResult`].
    fn finish(
        &mut self,
        result: Result<(), CallError>,
        output: Bytes,
        gas_remaining: u64,
        gas_limit: u64,
        into_output: impl FnOnce(Bytes) -> Output,
    ) -> Result<ResultAndState, EvmError<DB::Error>> {
        let JournalOutput {
            state,
            logs,
            refund,
        } = self.journal.finalize();
        if let Some(error) = self.db_error.take() {
            return Err(EvmError::Database(error));
        }

        let gas_used = gas_limit.saturating_sub(gas_remaining);
        let result = match result {
            Ok(()) => ExecutionResult::Success {
                gas_used,
                gas_refunded: u64::try_from(refund).unwrap_or_default(),
                logs,
                output: into_output(output),
            },
            Err(CallError::Reverted) => ExecutionResult::Revert { gas_used, output },
            Err(reason) => ExecutionResult::Halt { reason, gas_used },
        };
        Ok(ResultAndState { result, state })
    }
}

impl<DB, I, PM> Evm<DB, I, PM>
where
    DB: Database + DatabaseCommit,
{
    /// Writes the state of a finished execution to the database.
    pub fn commit(&mut self, state: EvmState) {
        self.journal.database.commit(state);
    }
}
