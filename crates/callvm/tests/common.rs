//! Shared fixtures: a scripted interpreter and stateful precompiled contracts.
#![allow(dead_code)]

use callvm::{
    precompile::{run_precompile, PrecompileInput, PrecompileOutput, PrecompileResult},
    primitives::{address, Address, Bytes, HashMap, Rules, U256},
    CallError, CallOutcome, CallPrimitives, EthPrecompileManager, ExecutionCallback, Frame,
    Host, Interpreter, PrecompileManager, PrecompileOutcome, PrecompiledContract,
    StateAccessor,
};

pub(crate) const CALLER: Address = address!("0x1000000000000000000000000000000000000001");
pub(crate) const COUNTER: Address = address!("0x0000000000000000000000000000000000000100");
pub(crate) const RELAY: Address = address!("0x0000000000000000000000000000000000000101");
pub(crate) const BLOCK_INFO: Address = address!("0x0000000000000000000000000000000000000102");

pub(crate) type Script = fn(&Frame, &mut dyn Host) -> CallOutcome;

/// Interpreter that runs a native function per code blob.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedInterpreter {
    scripts: HashMap<Bytes, Script>,
}

impl ScriptedInterpreter {
    pub(crate) fn with(mut self, code: &Bytes, script: Script) -> Self {
        self.scripts.insert(code.clone(), script);
        self
    }
}

impl Interpreter for ScriptedInterpreter {
    fn run(&self, frame: &Frame, code: &Bytes, host: &mut dyn Host) -> CallOutcome {
        match self.scripts.get(code) {
            Some(script) => script(frame, host),
            None => CallOutcome::failure(
                CallError::Interpreter("unknown code".into()),
                Bytes::new(),
                0,
            ),
        }
    }
}

/// Stores a word as call output.
pub(crate) fn word(value: U256) -> Bytes {
    Bytes::copy_from_slice(&value.to_be_bytes::<32>())
}

/// Increments slot zero of its own account and returns the new value.
#[derive(Debug)]
pub(crate) struct Counter;

impl Counter {
    pub(crate) const REQUIRED_GAS: u64 = 100;
    pub(crate) const RUN_GAS: u64 = 5000;
}

impl PrecompiledContract for Counter {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        Self::REQUIRED_GAS
    }

    fn run(
        &self,
        callback: &mut dyn ExecutionCallback,
        _input: PrecompileInput<'_>,
    ) -> PrecompileResult {
        let state = callback.state();
        let next = state.sload(COUNTER, U256::ZERO)? + U256::from(1);
        state.sstore(COUNTER, U256::ZERO, next)?;
        Ok(PrecompileOutput::new(Self::RUN_GAS, word(next)))
    }
}

/// Forwards its input to the account named in the first 20 bytes.
#[derive(Debug)]
pub(crate) struct Relay;

impl PrecompiledContract for Relay {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        0
    }

    fn run(
        &self,
        callback: &mut dyn ExecutionCallback,
        input: PrecompileInput<'_>,
    ) -> PrecompileResult {
        let Some((target, data)) = input.data.split_first_chunk::<20>() else {
            return Ok(PrecompileOutput::new_reverted(0, Bytes::new()));
        };
        let outcome = if input.is_static {
            callback.static_call(
                RELAY,
                Address::from(*target),
                Bytes::copy_from_slice(data),
                input.gas_limit,
            )
        } else {
            callback.call(
                RELAY,
                Address::from(*target),
                Bytes::copy_from_slice(data),
                input.gas_limit,
                input.value,
            )
        };
        let gas_used = input.gas_limit - outcome.gas_remaining;
        if outcome.is_ok() {
            Ok(PrecompileOutput::new(gas_used, outcome.output))
        } else {
            Ok(PrecompileOutput::new_reverted(gas_used, outcome.output))
        }
    }
}

/// Returns the block number followed by the chain id.
#[derive(Debug)]
pub(crate) struct BlockInfo;

impl PrecompiledContract for BlockInfo {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        2
    }

    fn run(
        &self,
        callback: &mut dyn ExecutionCallback,
        _input: PrecompileInput<'_>,
    ) -> PrecompileResult {
        let mut out = word(U256::from(callback.block().number())).to_vec();
        out.extend_from_slice(&word(U256::from(callback.chain_id())));
        Ok(PrecompileOutput::new(0, out.into()))
    }
}

/// Mainnet registry extended with the stateful contracts above.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ExtendedManager {
    inner: EthPrecompileManager,
}

impl ExtendedManager {
    pub(crate) fn new(rules: Rules) -> Self {
        Self {
            inner: EthPrecompileManager::new(rules),
        }
    }

    fn stateful(address: &Address) -> Option<&'static dyn PrecompiledContract> {
        if *address == COUNTER {
            Some(&Counter)
        } else if *address == RELAY {
            Some(&Relay)
        } else if *address == BLOCK_INFO {
            Some(&BlockInfo)
        } else {
            None
        }
    }
}

impl PrecompileManager for ExtendedManager {
    fn has(&mut self, address: &Address) -> bool {
        Self::stateful(address).is_some() || self.inner.has(address)
    }

    fn get(&mut self, address: &Address) -> Option<&'static dyn PrecompiledContract> {
        Self::stateful(address).or_else(|| self.inner.get(address))
    }

    fn get_active(&mut self, rules: &Rules) -> Vec<Address> {
        let mut active = self.inner.get_active(rules);
        active.extend([COUNTER, RELAY, BLOCK_INFO]);
        active
    }

    fn run(
        &self,
        callback: &mut dyn ExecutionCallback,
        contract: &dyn PrecompiledContract,
        input: &[u8],
        caller: Address,
        value: U256,
        supplied_gas: u64,
        readonly: bool,
    ) -> PrecompileOutcome {
        run_precompile(
            callback,
            contract,
            input,
            caller,
            value,
            supplied_gas,
            readonly,
        )
    }
}
