//! Frame execution: depth limit, checkpoints, value transfer, precompile
//! dispatch and contract creation.
use crate::Evm;
use context_interface::{CallError, CallOutcome, Cfg, CreateOutcome, Frame, Interpreter};
use database::Database;
use precompile::{PrecompileManager, PrecompiledContract};
use primitives::{
    hardfork::SpecId, keccak256, Address, Bytes, B256, CODE_DEPOSIT_COST, U256,
};
use tracing::{debug, trace};

/// Stack that must be left before a nested frame runs in place.
const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated once the red zone is reached.
const STACK_SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Runs a nested frame on a fresh heap-allocated stack segment when the
/// current one is nearly exhausted, so the depth limit is reached before the
/// thread stack is.
#[inline]
fn grow_stack<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "std")]
    {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, f)
    }
    #[cfg(not(feature = "std"))]
    {
        f()
    }
}

/// How a call frame relates to its caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallScheme {
    /// `CALL`: callee code on callee state, value moves to the callee.
    Call,
    /// `CALLCODE`: callee code on caller state, value stays with the caller.
    CallCode,
    /// `DELEGATECALL`: callee code on caller state, caller and value inherited.
    DelegateCall,
    /// `STATICCALL`: like `CALL` without value, state changes forbidden.
    StaticCall,
}

/// How the address of a new contract is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreateScheme {
    /// `sender.create(nonce)`
    Create,
    /// `sender.create2(salt, keccak256(init_code))`
    Create2 {
        /// Salt
        salt: B256,
    },
}

/// Inputs of a call frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallInputs {
    /// Call scheme.
    pub scheme: CallScheme,
    /// `CALLER` of the new frame.
    pub caller: Address,
    /// Account whose state the frame runs against.
    pub target_address: Address,
    /// Account whose code runs.
    pub bytecode_address: Address,
    /// `CALLVALUE` of the new frame. Moved from `caller` to `target_address`
    /// for [`CallScheme::Call`], balance-checked for [`CallScheme::CallCode`].
    pub value: U256,
    /// Call data.
    pub input: Bytes,
    /// Gas handed to the frame.
    pub gas_limit: u64,
    /// The new frame is static.
    pub is_static: bool,
}

impl CallInputs {
    /// Whether the scheme moves or checks value.
    #[inline]
    fn transfers_value(&self) -> bool {
        matches!(
            self.scheme,
            CallScheme::Call | CallScheme::CallCode | CallScheme::StaticCall
        )
    }
}

impl<DB, I, PM> Evm<DB, I, PM>
where
    DB: Database,
    I: Interpreter + Clone,
    PM: PrecompileManager + Clone,
{
    /// Runs a call frame in its own checkpoint.
    ///
    /// Failures before the callee runs hand the whole gas back. Halts of a
    /// precompiled contract consume it.
    pub fn execute_call(&mut self, inputs: CallInputs) -> CallOutcome {
        let gas_limit = inputs.gas_limit;
        let depth = self.depth;
        if depth > self.cfg.call_stack_limit() {
            debug!(target: "evm", depth, address = %inputs.bytecode_address, "call too deep");
            return CallOutcome::rejected(CallError::CallTooDeep, gas_limit);
        }

        let is_static = self.is_static || inputs.is_static;
        if is_static && inputs.scheme == CallScheme::Call && !inputs.value.is_zero() {
            return CallOutcome::rejected(CallError::WriteProtection, gas_limit);
        }

        let loaded = self.journal.load_account(inputs.bytecode_address).map(|_| ());
        if let Err(err) = self.db_result(loaded) {
            return CallOutcome::rejected(err.into(), gas_limit);
        }

        let checkpoint = self.journal.checkpoint();
        if inputs.transfers_value() {
            let transferred =
                self.journal
                    .transfer(inputs.caller, inputs.target_address, inputs.value);
            let error = match self.db_result(transferred) {
                Ok(None) => None,
                Ok(Some(err)) => Some(CallError::from(err)),
                Err(err) => Some(CallError::from(err)),
            };
            if let Some(error) = error {
                self.journal.checkpoint_revert(checkpoint);
                return CallOutcome::rejected(error, gas_limit);
            }
        }

        let frame = Frame {
            caller: inputs.caller,
            address: inputs.target_address,
            code_address: inputs.bytecode_address,
            value: inputs.value,
            input: inputs.input,
            gas_limit,
            is_static,
            depth,
        };
        trace!(target: "evm", depth, scheme = ?inputs.scheme, address = %frame.address, code = %frame.code_address, gas_limit, "call");

        let previous_static = core::mem::replace(&mut self.is_static, is_static);
        self.depth += 1;
        let outcome = grow_stack(|| match self.precompiles.get(&frame.code_address) {
            Some(contract) => self.run_precompile(contract, &frame),
            None => self.run_code(&frame),
        });
        self.depth -= 1;
        self.is_static = previous_static;

        if outcome.is_ok() {
            self.journal.checkpoint_commit();
        } else {
            self.journal.checkpoint_revert(checkpoint);
        }
        trace!(target: "evm", depth, result = ?outcome.result, gas_remaining = outcome.gas_remaining, "call done");
        outcome
    }

    fn run_precompile(
        &mut self,
        contract: &'static dyn PrecompiledContract,
        frame: &Frame,
    ) -> CallOutcome {
        let manager = self.precompiles.clone();
        let outcome = manager.run(
            self,
            contract,
            &frame.input,
            frame.caller,
            frame.value,
            frame.gas_limit,
            frame.is_static,
        );
        match outcome.result {
            Ok(()) if outcome.reverted => {
                CallOutcome::failure(CallError::Reverted, outcome.output, outcome.gas_remaining)
            }
            Ok(()) => CallOutcome::success(outcome.output, outcome.gas_remaining),
            Err(error) => {
                debug!(target: "evm", address = %frame.code_address, %error, "precompile failed");
                CallOutcome::failure(error.into(), outcome.output, 0)
            }
        }
    }

    fn run_code(&mut self, frame: &Frame) -> CallOutcome {
        let code = self
            .journal
            .load_code(frame.code_address)
            .map(|account| account.data.info.code.clone().unwrap_or_default());
        let code = match self.db_result(code) {
            Ok(code) => code,
            Err(err) => return CallOutcome::rejected(err.into(), frame.gas_limit),
        };
        if code.is_empty() {
            return CallOutcome::success(Bytes::new(), frame.gas_limit);
        }

        let interpreter = self.interpreter.clone();
        let mut outcome = interpreter.run(frame, &code, self);
        outcome.gas_remaining = outcome.gas_remaining.min(frame.gas_limit);
        outcome
    }

    /// Deploys a contract in its own checkpoint.
    pub fn execute_create(
        &mut self,
        caller: Address,
        init_code: Bytes,
        gas_limit: u64,
        value: U256,
        scheme: CreateScheme,
    ) -> CreateOutcome {
        let depth = self.depth;
        if depth > self.cfg.call_stack_limit() {
            debug!(target: "evm", depth, %caller, "create too deep");
            return CreateOutcome::rejected(CallError::CallTooDeep, None, gas_limit);
        }
        if self.is_static {
            return CreateOutcome::rejected(CallError::WriteProtection, None, gas_limit);
        }

        let balance = self
            .journal
            .load_account(caller)
            .map(|account| account.data.info.balance);
        match self.db_result(balance) {
            Ok(balance) if balance < value => {
                return CreateOutcome::rejected(CallError::OutOfFunds, None, gas_limit)
            }
            Ok(_) => {}
            Err(err) => return CreateOutcome::rejected(err.into(), None, gas_limit),
        }

        let nonce = self.journal.inc_nonce(caller);
        let old_nonce = match self.db_result(nonce) {
            Ok(Some(nonce)) => nonce - 1,
            Ok(None) => return CreateOutcome::rejected(CallError::NonceOverflow, None, gas_limit),
            Err(err) => return CreateOutcome::rejected(err.into(), None, gas_limit),
        };

        let address = match scheme {
            CreateScheme::Create => caller.create(old_nonce),
            CreateScheme::Create2 { salt } => caller.create2(salt, keccak256(&init_code)),
        };

        let checkpoint = self
            .journal
            .create_account_checkpoint(caller, address, value);
        let checkpoint = match self.db_result(checkpoint) {
            Ok(Ok(checkpoint)) => checkpoint,
            Ok(Err(err)) => {
                return CreateOutcome::rejected(err.into(), Some(address), gas_limit)
            }
            Err(err) => return CreateOutcome::rejected(err.into(), Some(address), gas_limit),
        };

        let frame = Frame {
            caller,
            address,
            code_address: address,
            value,
            input: Bytes::new(),
            gas_limit,
            is_static: false,
            depth,
        };
        trace!(target: "evm", depth, %caller, %address, gas_limit, "create");

        self.depth += 1;
        let interpreter = self.interpreter.clone();
        let outcome = grow_stack(|| interpreter.run(&frame, &init_code, self));
        self.depth -= 1;

        let gas_remaining = outcome.gas_remaining.min(gas_limit);
        if let Err(error) = outcome.result {
            self.journal.checkpoint_revert(checkpoint);
            return CreateOutcome {
                result: Err(error),
                output: outcome.output,
                address: Some(address),
                gas_remaining,
            };
        }

        let spec = self.cfg.spec();
        let mut code = outcome.output;

        // EIP-170: Contract code size limit
        if let Some(limit) = self.cfg.max_code_size() {
            if code.len() > limit {
                self.journal.checkpoint_revert(checkpoint);
                return CreateOutcome::rejected(CallError::CreateContractSizeLimit, Some(address), 0);
            }
        }

        // EIP-3541: Reject new contract code starting with the 0xEF byte
        if spec.is_enabled_in(SpecId::LONDON) && code.first() == Some(&0xEF) {
            self.journal.checkpoint_revert(checkpoint);
            return CreateOutcome::rejected(
                CallError::CreateContractStartingWithEF,
                Some(address),
                0,
            );
        }

        let deposit = (code.len() as u64).saturating_mul(CODE_DEPOSIT_COST);
        let gas_remaining = match gas_remaining.checked_sub(deposit) {
            Some(gas) => gas,
            // EIP-2: running out of gas for the code deposit fails the creation.
            None if spec.is_enabled_in(SpecId::HOMESTEAD) => {
                self.journal.checkpoint_revert(checkpoint);
                return CreateOutcome::rejected(CallError::CodeStoreOutOfGas, Some(address), 0);
            }
            None => {
                code = Bytes::new();
                gas_remaining
            }
        };

        self.journal.checkpoint_commit();
        let stored = self.journal.set_code(address, code);
        if let Err(err) = self.db_result(stored) {
            return CreateOutcome::rejected(err.into(), Some(address), gas_remaining);
        }
        trace!(target: "evm", depth, %address, gas_remaining, "created");

        CreateOutcome {
            result: Ok(()),
            output: Bytes::new(),
            address: Some(address),
            gas_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{FailingDB, ScriptedInterpreter},
        EvmError, ExecutionResult,
    };
    use context_interface::{CallContext, CfgEnv, Host, StateAccess, StateError};
    use database::InMemoryDB;
    use precompile::u64_to_address;
    use primitives::{address, MAX_CODE_SIZE};
    use rstest::rstest;
    use state::{AccountInfo, EvmState};

    const CALLER: Address = address!("0x1000000000000000000000000000000000000001");
    const BOB: Address = address!("0x2000000000000000000000000000000000000002");
    const CONTRACT: Address = address!("0x3000000000000000000000000000000000000003");
    const WRITER: Address = address!("0x4000000000000000000000000000000000000004");

    const RECURSE: Bytes = Bytes::from_static(b"recurse");
    const WRITE: Bytes = Bytes::from_static(b"write");
    const STATIC_CALLER: Bytes = Bytes::from_static(b"static-caller");
    const REVERT: Bytes = Bytes::from_static(b"revert");
    const DEPLOY: Bytes = Bytes::from_static(b"deploy");
    const DEPLOY_HUGE: Bytes = Bytes::from_static(b"deploy-huge");
    const DEPLOY_EF: Bytes = Bytes::from_static(b"deploy-ef");
    const RUNTIME: Bytes = Bytes::from_static(b"runtime");

    fn recurse(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
        let outcome = host.call(frame, frame.address, Bytes::new(), frame.gas_limit, U256::ZERO);
        if outcome.result == Err(CallError::CallTooDeep) {
            if let Err(err) = host.sstore(frame.address, U256::from(frame.depth), U256::from(1)) {
                return CallOutcome::rejected(err.into(), 0);
            }
        }
        CallOutcome::success(Bytes::new(), outcome.gas_remaining)
    }

    fn write(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
        match host.sstore(frame.address, U256::ZERO, U256::from(7)) {
            Ok(()) => CallOutcome::success(Bytes::new(), frame.gas_limit),
            Err(err) => CallOutcome::failure(err.into(), Bytes::new(), 0),
        }
    }

    fn static_caller(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
        let outcome = host.static_call(frame, WRITER, Bytes::new(), 1000);
        let flag = if outcome.result == Err(CallError::WriteProtection) {
            U256::from(1)
        } else {
            U256::from(2)
        };
        if let Err(err) = host.sstore(frame.address, U256::ZERO, flag) {
            return CallOutcome::failure(err.into(), Bytes::new(), 0);
        }
        let outcome = host.call(frame, WRITER, Bytes::new(), 1000, U256::ZERO);
        CallOutcome {
            gas_remaining: frame.gas_limit,
            ..outcome
        }
    }

    fn revert(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
        if let Err(err) = host.sstore(frame.address, U256::ZERO, U256::from(9)) {
            return CallOutcome::failure(err.into(), Bytes::new(), 0);
        }
        CallOutcome::failure(
            CallError::Reverted,
            Bytes::from_static(b"nope"),
            frame.gas_limit - 100,
        )
    }

    fn deploy(frame: &Frame, _host: &mut dyn Host) -> CallOutcome {
        CallOutcome::success(RUNTIME, frame.gas_limit)
    }

    fn deploy_huge(frame: &Frame, _host: &mut dyn Host) -> CallOutcome {
        CallOutcome::success(vec![0u8; MAX_CODE_SIZE + 1].into(), frame.gas_limit)
    }

    fn deploy_ef(frame: &Frame, _host: &mut dyn Host) -> CallOutcome {
        CallOutcome::success(Bytes::from_static(&[0xef, 0x00]), frame.gas_limit)
    }

    fn interpreter() -> ScriptedInterpreter {
        ScriptedInterpreter::default()
            .with(&RECURSE, recurse)
            .with(&WRITE, write)
            .with(&STATIC_CALLER, static_caller)
            .with(&REVERT, revert)
            .with(&DEPLOY, deploy)
            .with(&DEPLOY_HUGE, deploy_huge)
            .with(&DEPLOY_EF, deploy_ef)
    }

    fn evm(spec: SpecId) -> Evm<InMemoryDB, ScriptedInterpreter> {
        let mut db = InMemoryDB::default();
        db.insert_account_info(CALLER, AccountInfo::from_balance(U256::from(100)));
        db.insert_account_info(WRITER, AccountInfo::default().with_code(WRITE));
        Evm::new(db, CfgEnv::new(1, spec), interpreter())
    }

    fn install(evm: &mut Evm<InMemoryDB, ScriptedInterpreter>, address: Address, code: Bytes) {
        evm.db_mut()
            .insert_account_info(address, AccountInfo::default().with_code(code));
    }

    fn slot(state: &EvmState, address: Address, key: u64) -> U256 {
        state
            .get(&address)
            .and_then(|account| account.storage.get(&U256::from(key)))
            .map_or(U256::ZERO, |slot| slot.present_value)
    }

    #[test]
    fn value_moves_to_account_without_code() {
        let mut evm = evm(SpecId::PRAGUE);
        let out = evm
            .transact_call(CALLER, BOB, Bytes::new(), 21_000, U256::from(40))
            .unwrap();
        assert_eq!(out.result.gas_used(), 0);
        assert!(out.result.is_success());
        assert_eq!(out.state[&CALLER].info.balance, U256::from(60));
        assert_eq!(out.state[&BOB].info.balance, U256::from(40));
    }

    #[test]
    fn transfer_beyond_balance_is_rejected() {
        let mut evm = evm(SpecId::PRAGUE);
        let out = evm
            .transact_call(CALLER, BOB, Bytes::new(), 21_000, U256::from(101))
            .unwrap();
        assert_eq!(
            out.result,
            ExecutionResult::Halt {
                reason: CallError::OutOfFunds,
                gas_used: 0
            }
        );
        assert_eq!(out.state[&CALLER].info.balance, U256::from(100));
    }

    #[test]
    fn call_past_depth_limit_fails_only_that_call() {
        let mut evm = evm(SpecId::PRAGUE);
        evm.cfg.call_stack_limit = 3;
        install(&mut evm, CONTRACT, RECURSE);

        let out = evm
            .transact_call(CALLER, CONTRACT, Bytes::new(), 50_000, U256::ZERO)
            .unwrap();
        assert!(out.result.is_success());
        assert_eq!(out.result.gas_used(), 0);
        assert_eq!(slot(&out.state, CONTRACT, 3), U256::from(1));
        assert_eq!(slot(&out.state, CONTRACT, 2), U256::ZERO);
        assert_eq!(evm.depth(), 0);
    }

    #[test]
    fn recursion_reaches_default_depth_limit() {
        let mut evm = evm(SpecId::PRAGUE);
        install(&mut evm, CONTRACT, RECURSE);
        let limit = evm.cfg.call_stack_limit;

        let out = evm
            .transact_call(CALLER, CONTRACT, Bytes::new(), 50_000, U256::ZERO)
            .unwrap();
        assert!(out.result.is_success());
        assert_eq!(slot(&out.state, CONTRACT, limit), U256::from(1));
        assert_eq!(slot(&out.state, CONTRACT, limit - 1), U256::ZERO);
        assert_eq!(evm.depth(), 0);
    }

    #[test]
    fn static_call_rejects_state_writes() {
        let mut evm = evm(SpecId::PRAGUE);
        install(&mut evm, CONTRACT, STATIC_CALLER);

        let out = evm
            .transact_call(CALLER, CONTRACT, Bytes::new(), 50_000, U256::ZERO)
            .unwrap();
        assert!(out.result.is_success());
        assert_eq!(slot(&out.state, CONTRACT, 0), U256::from(1));
        // The plain call afterwards is not affected by the static one.
        assert_eq!(slot(&out.state, WRITER, 0), U256::from(7));
    }

    #[test]
    fn revert_discards_changes_and_returns_gas() {
        let mut evm = evm(SpecId::PRAGUE);
        install(&mut evm, CONTRACT, REVERT);

        let out = evm
            .transact_call(CALLER, CONTRACT, Bytes::new(), 50_000, U256::from(10))
            .unwrap();
        assert_eq!(
            out.result,
            ExecutionResult::Revert {
                gas_used: 100,
                output: Bytes::from_static(b"nope"),
            }
        );
        assert_eq!(slot(&out.state, CONTRACT, 0), U256::ZERO);
        assert_eq!(out.state[&CALLER].info.balance, U256::from(100));
    }

    #[test]
    fn precompile_runs_in_call_frame() {
        let mut evm = evm(SpecId::PRAGUE);
        let input = Bytes::from(vec![0xab; 32]);
        let out = evm
            .transact_call(CALLER, u64_to_address(4), input.clone(), 100, U256::ZERO)
            .unwrap();
        assert!(out.result.is_success());
        assert_eq!(out.result.gas_used(), 18);
        assert_eq!(out.result.output(), Some(&input));
    }

    #[test]
    fn precompile_out_of_gas_consumes_supplied_gas() {
        let mut evm = evm(SpecId::PRAGUE);
        let out = evm
            .transact_call(CALLER, u64_to_address(4), Bytes::from(vec![0; 32]), 17, U256::ZERO)
            .unwrap();
        assert_eq!(
            out.result,
            ExecutionResult::Halt {
                reason: CallError::OutOfGas,
                gas_used: 17
            }
        );
    }

    #[test]
    fn inactive_precompile_address_is_a_plain_account() {
        let mut evm = evm(SpecId::HOMESTEAD);
        let out = evm
            .transact_call(CALLER, u64_to_address(9), Bytes::new(), 1000, U256::ZERO)
            .unwrap();
        assert!(out.result.is_success());
        assert_eq!(out.result.gas_used(), 0);
        assert_eq!(out.result.output(), Some(&Bytes::new()));
    }

    #[test]
    fn create_deploys_returned_code() {
        let mut evm = evm(SpecId::PRAGUE);
        let out = evm
            .transact_create(CALLER, DEPLOY, 10_000, U256::from(5))
            .unwrap();
        let created = CALLER.create(0);
        assert_eq!(out.result.created_address(), Some(created));
        assert_eq!(out.result.gas_used(), RUNTIME.len() as u64 * CODE_DEPOSIT_COST);

        let account = &out.state[&created];
        assert_eq!(account.info.code, Some(RUNTIME));
        assert_eq!(account.info.code_hash, keccak256(&RUNTIME));
        assert_eq!(account.info.balance, U256::from(5));
        assert_eq!(account.info.nonce, 1);
        assert_eq!(out.state[&CALLER].info.nonce, 1);
    }

    #[test]
    fn create2_address_depends_on_salt_and_code() {
        let mut evm = evm(SpecId::PRAGUE);
        let salt = B256::with_last_byte(1);
        let outcome = evm.execute_create(
            CALLER,
            DEPLOY,
            10_000,
            U256::ZERO,
            CreateScheme::Create2 { salt },
        );
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.address,
            Some(CALLER.create2(salt, keccak256(&DEPLOY)))
        );
    }

    #[test]
    fn oversized_code_fails_creation() {
        let mut evm = evm(SpecId::PRAGUE);
        let out = evm
            .transact_create(CALLER, DEPLOY_HUGE, 10_000_000, U256::ZERO)
            .unwrap();
        assert_eq!(
            out.result,
            ExecutionResult::Halt {
                reason: CallError::CreateContractSizeLimit,
                gas_used: 10_000_000
            }
        );
        let code = &out.state[&CALLER.create(0)].info.code;
        assert!(code.as_ref().map_or(true, |code| code.is_empty()));
    }

    #[rstest]
    #[case::homestead(SpecId::HOMESTEAD, false)]
    #[case::frontier(SpecId::FRONTIER, true)]
    fn code_deposit_out_of_gas(#[case] spec: SpecId, #[case] deploys_empty: bool) {
        let mut evm = evm(spec);
        let out = evm
            .transact_create(CALLER, DEPLOY, 1000, U256::ZERO)
            .unwrap();
        if deploys_empty {
            assert!(out.result.is_success());
            assert_eq!(out.result.gas_used(), 0);
            assert_eq!(out.state[&CALLER.create(0)].info.code, Some(Bytes::new()));
        } else {
            assert_eq!(
                out.result,
                ExecutionResult::Halt {
                    reason: CallError::CodeStoreOutOfGas,
                    gas_used: 1000
                }
            );
        }
    }

    #[rstest]
    #[case::berlin(SpecId::BERLIN, true)]
    #[case::london(SpecId::LONDON, false)]
    #[case::prague(SpecId::PRAGUE, false)]
    fn ef_prefixed_code(#[case] spec: SpecId, #[case] deploys: bool) {
        let mut evm = evm(spec);
        let out = evm
            .transact_create(CALLER, DEPLOY_EF, 10_000, U256::from(5))
            .unwrap();
        let code = &out.state[&CALLER.create(0)].info.code;
        if deploys {
            assert!(out.result.is_success());
            assert_eq!(code, &Some(Bytes::from_static(&[0xef, 0x00])));
        } else {
            assert_eq!(
                out.result,
                ExecutionResult::Halt {
                    reason: CallError::CreateContractStartingWithEF,
                    gas_used: 10_000
                }
            );
            assert!(code.as_ref().map_or(true, |code| code.is_empty()));
            assert_eq!(out.state[&CALLER].info.balance, U256::from(100));
        }
    }

    #[test]
    fn create_collision_keeps_gas() {
        let mut evm = evm(SpecId::PRAGUE);
        evm.db_mut()
            .insert_account_info(CALLER.create(0), AccountInfo::default().with_nonce(1));
        let out = evm
            .transact_create(CALLER, DEPLOY, 10_000, U256::ZERO)
            .unwrap();
        assert_eq!(
            out.result,
            ExecutionResult::Halt {
                reason: CallError::CreateCollision,
                gas_used: 0
            }
        );
    }

    #[test]
    fn database_failure_aborts_execution() {
        let mut evm: Evm<FailingDB, ScriptedInterpreter> =
            Evm::new(FailingDB, CfgEnv::default(), interpreter());
        let err = evm
            .transact_call(CALLER, BOB, Bytes::new(), 21_000, U256::ZERO)
            .unwrap_err();
        assert!(matches!(err, EvmError::Database(_)));

        let err = evm
            .transact_create(CALLER, DEPLOY, 21_000, U256::ZERO)
            .unwrap_err();
        assert!(matches!(err, EvmError::Database(_)));
    }

    #[test]
    fn precompile_sees_write_protection_of_engine() {
        let mut evm = evm(SpecId::PRAGUE);
        evm.is_static = true;
        assert_eq!(
            evm.sstore(WRITER, U256::ZERO, U256::from(1)),
            Err(StateError::WriteProtection)
        );
        evm.is_static = false;
        assert_eq!(evm.sstore(WRITER, U256::ZERO, U256::from(1)), Ok(()));
        assert_eq!(evm.sload(WRITER, U256::ZERO), Ok(U256::from(1)));
    }
}
