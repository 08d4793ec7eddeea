//! Per-execution precompile lookup and gas accounting.
use crate::{
    select_registry, PrecompileError, PrecompileFailure, PrecompileInput, PrecompiledContract,
    Precompiles,
};
use auto_impl::auto_impl;
use context_interface::ExecutionCallback;
use primitives::{hardfork::SpecId, Address, Bytes, Rules, U256};
use std::vec::Vec;
use tracing::{debug, trace};

/// Result of a dispatched precompile call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileOutcome {
    /// Success, or the error the call failed with.
    pub result: Result<(), PrecompileError>,
    /// Output bytes, partial output on failure.
    pub output: Bytes,
    /// Gas left from the supplied amount.
    pub gas_remaining: u64,
    /// The contract asked for its changes to be reverted.
    pub reverted: bool,
}

impl PrecompileOutcome {
    /// Out of gas: nothing remains, `output` is kept.
    pub fn out_of_gas(output: Bytes) -> Self {
        Self {
            result: Err(PrecompileError::OutOfGas),
            output,
            gas_remaining: 0,
            reverted: false,
        }
    }

    /// Whether the call succeeded without reverting.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok() && !self.reverted
    }
}

/// Lookup and dispatch of precompiled contracts for one execution context.
#[auto_impl(&mut, Box)]
pub trait PrecompileManager {
    /// Whether `address` holds a contract under the current rules.
    fn has(&mut self, address: &Address) -> bool;

    /// The contract at `address` under the current rules.
    fn get(&mut self, address: &Address) -> Option<&'static dyn PrecompiledContract>;

    /// Selects the registry for `rules` and returns its addresses in
    /// ascending order. Later [`has`](Self::has) and [`get`](Self::get)
    /// calls use this registry.
    fn get_active(&mut self, rules: &Rules) -> Vec<Address>;

    /// Charges the contract's required gas out of `supplied_gas` and runs it.
    #[allow(clippy::too_many_arguments)]
    fn run(
        &self,
        callback: &mut dyn ExecutionCallback,
        contract: &dyn PrecompiledContract,
        input: &[u8],
        caller: Address,
        value: U256,
        supplied_gas: u64,
        readonly: bool,
    ) -> PrecompileOutcome;
}

/// Which registry a manager looks contracts up in.
#[derive(Clone, Copy, Debug)]
pub enum RegistryState {
    /// No lookup happened yet.
    Unselected {
        /// Rules the registry will be selected for.
        rules: Rules,
    },
    /// Registry selected for `rules`.
    Selected {
        /// Rules `precompiles` was selected for.
        rules: Rules,
        /// The selected registry.
        precompiles: &'static Precompiles,
    },
}

impl RegistryState {
    /// Rules of the current or pending selection.
    #[inline]
    pub fn rules(&self) -> &Rules {
        match self {
            Self::Unselected { rules } | Self::Selected { rules, .. } => rules,
        }
    }

    /// Returns the selected registry, selecting it first if needed.
    fn precompiles(&mut self) -> &'static Precompiles {
        match *self {
            Self::Selected { precompiles, .. } => precompiles,
            Self::Unselected { rules } => {
                let precompiles = select_registry(&rules);
                trace!(target: "precompile", spec = %rules.spec(), count = precompiles.len(), "selected registry");
                *self = Self::Selected { rules, precompiles };
                precompiles
            }
        }
    }
}

/// Manager over the mainnet registries.
#[derive(Clone, Copy, Debug)]
pub struct EthPrecompileManager {
    state: RegistryState,
}

impl EthPrecompileManager {
    /// Creates a manager that selects its registry for `rules` on first use.
    pub fn new(rules: Rules) -> Self {
        Self {
            state: RegistryState::Unselected { rules },
        }
    }

    /// Rules the manager selects for.
    #[inline]
    pub fn rules(&self) -> &Rules {
        self.state.rules()
    }

    /// Current registry state.
    #[inline]
    pub fn state(&self) -> &RegistryState {
        &self.state
    }
}

impl Default for EthPrecompileManager {
    fn default() -> Self {
        Self::new(Rules::new(1, SpecId::LATEST))
    }
}

impl From<Rules> for EthPrecompileManager {
    fn from(rules: Rules) -> Self {
        Self::new(rules)
    }
}

impl PrecompileManager for EthPrecompileManager {
    #[inline]
    fn has(&mut self, address: &Address) -> bool {
        self.state.precompiles().contains(address)
    }

    #[inline]
    fn get(&mut self, address: &Address) -> Option<&'static dyn PrecompiledContract> {
        self.state.precompiles().get(address)
    }

    fn get_active(&mut self, rules: &Rules) -> Vec<Address> {
        let precompiles = select_registry(rules);
        debug!(target: "precompile", spec = %rules.spec(), count = precompiles.len(), "reselected registry");
        self.state = RegistryState::Selected {
            rules: *rules,
            precompiles,
        };
        precompiles.addresses().copied().collect()
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

/// Charges `contract.required_gas(input)` out of `supplied_gas`, runs the
/// contract with what is left and charges the gas it reports.
///
/// The contract is not invoked when the required gas exceeds the supply.
#[allow(clippy::too_many_arguments)]
pub fn run_precompile(
    callback: &mut dyn ExecutionCallback,
    contract: &dyn PrecompiledContract,
    input: &[u8],
    caller: Address,
    value: U256,
    supplied_gas: u64,
    readonly: bool,
) -> PrecompileOutcome {
    let cost = contract.required_gas(input);
    let Some(gas_limit) = supplied_gas.checked_sub(cost) else {
        debug!(target: "precompile", ?contract, cost, supplied_gas, "out of gas");
        return PrecompileOutcome::out_of_gas(Bytes::new());
    };
    trace!(target: "precompile", ?contract, cost, gas_limit, readonly, "running");

    let input = PrecompileInput {
        data: input,
        caller,
        value,
        is_static: readonly,
        gas_limit,
    };
    match contract.run(callback, input) {
        Ok(output) => match gas_limit.checked_sub(output.gas_used) {
            Some(gas_remaining) => PrecompileOutcome {
                result: Ok(()),
                output: output.bytes,
                gas_remaining,
                reverted: output.reverted,
            },
            None => {
                debug!(target: "precompile", ?contract, gas_used = output.gas_used, gas_limit, "out of gas after run");
                PrecompileOutcome::out_of_gas(output.bytes)
            }
        },
        Err(PrecompileFailure { error, output }) => {
            trace!(target: "precompile", ?contract, %error, "failed");
            PrecompileOutcome {
                result: Err(error),
                output,
                gas_remaining: gas_limit,
                reverted: false,
            }
        }
    }
}
