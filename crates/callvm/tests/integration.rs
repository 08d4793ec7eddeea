//! Integration tests for the `callvm` crate.
mod common;

use callvm::{
    context_interface::Cfg,
    precompile::u64_to_address,
    primitives::{address, hardfork::SpecId, keccak256, Address, Bytes, Log, B256, U256},
    state::{AccountInfo, EvmState},
    BlockEnv, CallError, CallOutcome, CfgEnv, CreateOutcome, Evm, ExecutionResult, Frame,
    Host, InMemoryDB, PrecompileManager, StateError,
};
use common::{
    word, Counter, ExtendedManager, ScriptedInterpreter, BLOCK_INFO, CALLER, COUNTER, RELAY,
};
use rstest::rstest;

type TestEvm = Evm<InMemoryDB, ScriptedInterpreter, ExtendedManager>;

const DELEGATOR: Address = address!("0xa000000000000000000000000000000000000001");
const STORE: Address = address!("0xb000000000000000000000000000000000000002");
const CODE_CALLER: Address = address!("0xc000000000000000000000000000000000000003");
const FACTORY: Address = address!("0xd000000000000000000000000000000000000004");
const PROBE: Address = address!("0xe000000000000000000000000000000000000005");
const RECURSER: Address = address!("0xf000000000000000000000000000000000000006");
const LOGGER: Address = address!("0xf000000000000000000000000000000000000007");
const REVERTER: Address = address!("0xf000000000000000000000000000000000000008");

const DELEGATOR_CODE: Bytes = Bytes::from_static(b"delegator");
const STORE_CODE: Bytes = Bytes::from_static(b"store");
const CODE_CALLER_CODE: Bytes = Bytes::from_static(b"code-caller");
const FACTORY_CODE: Bytes = Bytes::from_static(b"factory");
const PROBE_CODE: Bytes = Bytes::from_static(b"probe");
const RECURSE_CODE: Bytes = Bytes::from_static(b"recurse");
const LOGGER_CODE: Bytes = Bytes::from_static(b"logger");
const REVERTER_CODE: Bytes = Bytes::from_static(b"reverter");
const INIT_CODE: Bytes = Bytes::from_static(b"init");
const RUNTIME_CODE: Bytes = Bytes::from_static(b"runtime");

const SALT: B256 = B256::with_last_byte(7);

fn address_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

fn store_all(
    host: &mut dyn Host,
    address: Address,
    slots: &[(u64, U256)],
) -> Result<(), StateError> {
    for (key, value) in slots {
        host.sstore(address, U256::from(*key), *value)?;
    }
    Ok(())
}

fn finish(frame: &Frame, stored: Result<(), StateError>) -> CallOutcome {
    match stored {
        Ok(()) => CallOutcome::success(Bytes::new(), frame.gas_limit),
        Err(err) => CallOutcome::failure(err.into(), Bytes::new(), 0),
    }
}

/// Records the frame it runs in: slot 5 is set, slot 6 holds the caller and
/// slot 7 the value.
fn store(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    let stored = store_all(
        host,
        frame.address,
        &[
            (5, U256::from(1)),
            (6, address_word(frame.caller)),
            (7, frame.value),
        ],
    );
    finish(frame, stored)
}

fn delegator(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    host.delegate_call(frame, STORE, Bytes::new(), frame.gas_limit)
}

fn code_caller(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    host.call_code(frame, STORE, Bytes::new(), frame.gas_limit, U256::from(2))
}

fn init(frame: &Frame, _host: &mut dyn Host) -> CallOutcome {
    CallOutcome::success(RUNTIME_CODE, frame.gas_limit)
}

/// Creates twice with `CREATE` and twice with `CREATE2` under the same salt.
fn factory(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    let gas = 100_000;
    let first = host.create(frame, INIT_CODE, gas, U256::ZERO);
    let second = host.create(frame, INIT_CODE, gas, U256::ZERO);
    let salted = host.create2(frame, INIT_CODE, gas, U256::ZERO, SALT);
    let collided = host.create2(frame, INIT_CODE, gas, U256::ZERO, SALT);

    let created = |outcome: &CreateOutcome| {
        outcome
            .is_ok()
            .then_some(outcome.address)
            .flatten()
            .map_or(U256::ZERO, address_word)
    };
    let stored = store_all(
        host,
        frame.address,
        &[
            (0, created(&first)),
            (1, created(&second)),
            (2, created(&salted)),
            (
                3,
                U256::from(u8::from(collided.result == Err(CallError::CreateCollision))),
            ),
        ],
    );
    finish(frame, stored)
}

/// Probes nested failures: an underfunded counter call, a static counter call
/// and a static call through the relay.
fn probe(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    let oog = host.call(frame, COUNTER, Bytes::new(), 200, U256::ZERO);
    let static_counter = host.static_call(frame, COUNTER, Bytes::new(), 10_000);
    let mut relay_input = STORE.to_vec();
    relay_input.extend_from_slice(b"data");
    let static_relay = host.static_call(frame, RELAY, relay_input.into(), 10_000);

    let flag = |outcome: &CallOutcome, error: CallError| {
        U256::from(u8::from(outcome.result == Err(error)))
    };
    let stored = store_all(
        host,
        frame.address,
        &[
            (0, flag(&oog, CallError::OutOfGas)),
            (1, flag(&static_counter, CallError::WriteProtection)),
            (2, flag(&static_relay, CallError::Reverted)),
        ],
    );
    finish(frame, stored)
}

/// Calls itself until the depth limit stops it, recording the depth that failed.
fn recurse(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    let outcome = host.call(frame, frame.address, Bytes::new(), frame.gas_limit, U256::ZERO);
    let mut stored = Ok(());
    if outcome.result == Err(CallError::CallTooDeep) {
        stored = store_all(host, frame.address, &[(0, U256::from(frame.depth))]);
    }
    finish(frame, stored)
}

fn emit(frame: &Frame, host: &mut dyn Host, data: &'static [u8]) -> Result<(), StateError> {
    host.log(Log::new_unchecked(frame.address, vec![], Bytes::from_static(data)))
}

/// Logs, then calls [`reverter`].
fn logger(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    if let Err(err) = emit(frame, host, b"kept") {
        return CallOutcome::failure(err.into(), Bytes::new(), 0);
    }
    host.call(frame, REVERTER, Bytes::new(), frame.gas_limit, U256::ZERO);
    CallOutcome::success(Bytes::new(), frame.gas_limit)
}

/// Logs, then reverts.
fn reverter(frame: &Frame, host: &mut dyn Host) -> CallOutcome {
    if let Err(err) = emit(frame, host, b"dropped") {
        return CallOutcome::failure(err.into(), Bytes::new(), 0);
    }
    CallOutcome::failure(CallError::Reverted, Bytes::new(), frame.gas_limit)
}

fn interpreter() -> ScriptedInterpreter {
    ScriptedInterpreter::default()
        .with(&DELEGATOR_CODE, delegator)
        .with(&STORE_CODE, store)
        .with(&CODE_CALLER_CODE, code_caller)
        .with(&FACTORY_CODE, factory)
        .with(&PROBE_CODE, probe)
        .with(&RECURSE_CODE, recurse)
        .with(&LOGGER_CODE, logger)
        .with(&REVERTER_CODE, reverter)
        .with(&INIT_CODE, init)
}

fn evm(spec: SpecId) -> TestEvm {
    let mut db = InMemoryDB::default();
    db.insert_account_info(CALLER, AccountInfo::from_balance(U256::from(1_000)));
    for (address, code) in [
        (DELEGATOR, DELEGATOR_CODE),
        (STORE, STORE_CODE),
        (CODE_CALLER, CODE_CALLER_CODE),
        (PROBE, PROBE_CODE),
        (RECURSER, RECURSE_CODE),
        (LOGGER, LOGGER_CODE),
        (REVERTER, REVERTER_CODE),
    ] {
        db.insert_account_info(address, AccountInfo::default().with_code(code));
    }
    db.insert_account_info(
        FACTORY,
        AccountInfo::default().with_nonce(1).with_code(FACTORY_CODE),
    );

    let cfg = CfgEnv::new(1, spec);
    let precompiles = ExtendedManager::new(cfg.rules());
    Evm::new_with_precompiles(db, cfg, interpreter(), precompiles).with_block(BlockEnv {
        number: 42,
        ..Default::default()
    })
}

fn slot(state: &EvmState, address: Address, key: u64) -> U256 {
    state
        .get(&address)
        .and_then(|account| account.storage.get(&U256::from(key)))
        .map_or(U256::ZERO, |slot| slot.present_value)
}

fn balance(state: &EvmState, address: Address) -> U256 {
    state
        .get(&address)
        .map_or(U256::ZERO, |account| account.info.balance)
}

#[test]
fn delegate_call_runs_on_callers_state() {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, DELEGATOR, Bytes::new(), 100_000, U256::from(3))
        .unwrap();
    assert!(out.result.is_success());

    assert_eq!(slot(&out.state, DELEGATOR, 5), U256::from(1));
    assert_eq!(slot(&out.state, DELEGATOR, 6), address_word(CALLER));
    assert_eq!(slot(&out.state, DELEGATOR, 7), U256::from(3));
    assert_eq!(slot(&out.state, STORE, 5), U256::ZERO);

    assert_eq!(balance(&out.state, DELEGATOR), U256::from(3));
    assert_eq!(balance(&out.state, STORE), U256::ZERO);
}

#[rstest]
#[case::funded(3, None)]
#[case::underfunded(1, Some(CallError::OutOfFunds))]
fn call_code_runs_on_own_state(#[case] value: u64, #[case] error: Option<CallError>) {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, CODE_CALLER, Bytes::new(), 100_000, U256::from(value))
        .unwrap();

    match error {
        None => {
            assert!(out.result.is_success());
            assert_eq!(slot(&out.state, CODE_CALLER, 6), address_word(CODE_CALLER));
            assert_eq!(slot(&out.state, CODE_CALLER, 7), U256::from(2));
            assert_eq!(slot(&out.state, STORE, 5), U256::ZERO);
            assert_eq!(balance(&out.state, CODE_CALLER), U256::from(value));
        }
        Some(reason) => {
            assert_eq!(
                out.result,
                ExecutionResult::Halt {
                    reason,
                    gas_used: 0
                }
            );
            assert_eq!(slot(&out.state, CODE_CALLER, 5), U256::ZERO);
            assert_eq!(balance(&out.state, CALLER), U256::from(1_000));
        }
    }
}

#[test]
fn create_addresses_follow_nonce_and_salt() {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, FACTORY, Bytes::new(), 1_000_000, U256::ZERO)
        .unwrap();
    assert!(out.result.is_success());

    let salted = FACTORY.create2(SALT, keccak256(&INIT_CODE));
    assert_eq!(slot(&out.state, FACTORY, 0), address_word(FACTORY.create(1)));
    assert_eq!(slot(&out.state, FACTORY, 1), address_word(FACTORY.create(2)));
    assert_eq!(slot(&out.state, FACTORY, 2), address_word(salted));
    assert_eq!(slot(&out.state, FACTORY, 3), U256::from(1));

    assert_eq!(out.state[&FACTORY].info.nonce, 5);
    assert_eq!(out.state[&salted].info.code, Some(RUNTIME_CODE));
    assert_eq!(out.state[&FACTORY.create(1)].info.code, Some(RUNTIME_CODE));
}

#[rstest]
#[case::shallow(Some(64))]
#[case::default_limit(None)]
fn depth_overflow_is_recoverable(#[case] limit: Option<u64>) {
    let mut evm = evm(SpecId::PRAGUE);
    if let Some(limit) = limit {
        evm.cfg.call_stack_limit = limit;
    }
    let limit = evm.cfg.call_stack_limit;
    let out = evm
        .transact_call(CALLER, RECURSER, Bytes::new(), 1_000_000, U256::ZERO)
        .unwrap();
    assert!(out.result.is_success());
    assert_eq!(out.result.gas_used(), 0);
    assert_eq!(slot(&out.state, RECURSER, 0), U256::from(limit));
    assert_eq!(evm.depth(), 0);
}

#[test]
fn stateful_precompile_charges_required_and_reported_gas() {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, COUNTER, Bytes::new(), 10_000, U256::ZERO)
        .unwrap();
    assert_eq!(
        out.result.gas_used(),
        Counter::REQUIRED_GAS + Counter::RUN_GAS
    );
    assert_eq!(out.result.output(), Some(&word(U256::from(1))));
    assert_eq!(slot(&out.state, COUNTER, 0), U256::from(1));
}

#[test]
fn precompile_out_of_gas_reverts_its_writes() {
    let mut evm = evm(SpecId::PRAGUE);
    let gas = Counter::REQUIRED_GAS + Counter::RUN_GAS - 1;
    let out = evm
        .transact_call(CALLER, COUNTER, Bytes::new(), gas, U256::ZERO)
        .unwrap();
    assert_eq!(
        out.result,
        ExecutionResult::Halt {
            reason: CallError::OutOfGas,
            gas_used: gas
        }
    );
    assert_eq!(slot(&out.state, COUNTER, 0), U256::ZERO);
}

#[test]
fn nested_precompile_failures_stay_in_their_frame() {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, PROBE, Bytes::new(), 100_000, U256::ZERO)
        .unwrap();
    assert!(out.result.is_success());

    assert_eq!(slot(&out.state, PROBE, 0), U256::from(1));
    assert_eq!(slot(&out.state, PROBE, 1), U256::from(1));
    assert_eq!(slot(&out.state, PROBE, 2), U256::from(1));
    assert_eq!(slot(&out.state, COUNTER, 0), U256::ZERO);
    assert_eq!(slot(&out.state, STORE, 5), U256::ZERO);
}

#[test]
fn relay_calls_back_into_the_engine() {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, RELAY, STORE.to_vec().into(), 100_000, U256::from(4))
        .unwrap();
    assert!(out.result.is_success());
    assert_eq!(slot(&out.state, STORE, 6), address_word(RELAY));
    assert_eq!(slot(&out.state, STORE, 7), U256::from(4));
    assert_eq!(balance(&out.state, STORE), U256::from(4));
    assert_eq!(balance(&out.state, RELAY), U256::ZERO);
}

#[test]
fn precompile_reads_block_context() {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, BLOCK_INFO, Bytes::new(), 10, U256::ZERO)
        .unwrap();
    let mut expected = word(U256::from(42)).to_vec();
    expected.extend_from_slice(&word(U256::from(1)));
    assert_eq!(out.result.gas_used(), 2);
    assert_eq!(out.result.output(), Some(&Bytes::from(expected)));
}

#[test]
fn committed_state_is_visible_to_next_execution() {
    let mut evm = evm(SpecId::PRAGUE);
    for expected in 1..=2u64 {
        let out = evm
            .transact_call(CALLER, COUNTER, Bytes::new(), 10_000, U256::ZERO)
            .unwrap();
        assert_eq!(out.result.output(), Some(&word(U256::from(expected))));
        evm.commit(out.state);
    }
}

#[test]
fn reverted_frames_drop_their_logs() {
    let mut evm = evm(SpecId::PRAGUE);
    let out = evm
        .transact_call(CALLER, LOGGER, Bytes::new(), 100_000, U256::ZERO)
        .unwrap();
    assert!(out.result.is_success());
    assert_eq!(out.result.logs().len(), 1);
    assert_eq!(out.result.logs()[0].address, LOGGER);
    assert_eq!(out.result.logs()[0].data.data, Bytes::from_static(b"kept"));
}

#[test]
fn registry_follows_configured_hardfork() {
    let mut evm = evm(SpecId::HOMESTEAD);
    let blake2 = u64_to_address(9);
    assert!(!evm.precompiles.has(&blake2));

    // 4 bytes rounds, 64 bytes state, 128 bytes message, 16 bytes offsets, final flag
    let mut input = vec![0u8; 213];
    input[212] = 1;

    let out = evm
        .transact_call(CALLER, blake2, input.clone().into(), 1000, U256::ZERO)
        .unwrap();
    assert_eq!(out.result.output(), Some(&Bytes::new()));

    evm.cfg.spec = SpecId::BERLIN;
    let out = evm
        .transact_call(CALLER, blake2, input.into(), 1000, U256::ZERO)
        .unwrap();
    assert!(evm.precompiles.has(&blake2));
    assert!(out.result.is_success());
    assert_eq!(out.result.output().map(|output| output.len()), Some(64));
}
