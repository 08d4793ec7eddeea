//! Interface for the precompiles. It contains the precompiled contract trait,
//! its input, output and failure types.
use context_interface::{ExecutionCallback, StateError};
use core::fmt::Debug;
use primitives::{Address, Bytes, U256};

pub use context_interface::PrecompileError;

/// A precompile operation result type
pub type PrecompileResult = Result<PrecompileOutput, PrecompileFailure>;

/// Precompile execution output
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrecompileOutput {
    /// Gas used by the contract on top of its [`PrecompiledContract::required_gas`]
    pub gas_used: u64,
    /// Output bytes
    pub bytes: Bytes,
    /// Whether the precompile reverted
    pub reverted: bool,
}

impl PrecompileOutput {
    /// Returns new precompile output with the given gas used and output bytes.
    pub fn new(gas_used: u64, bytes: Bytes) -> Self {
        Self {
            gas_used,
            bytes,
            reverted: false,
        }
    }

    /// Returns new precompile revert with the given gas used and output bytes.
    pub fn new_reverted(gas_used: u64, bytes: Bytes) -> Self {
        Self {
            gas_used,
            bytes,
            reverted: true,
        }
    }
}

/// A failed contract run: the error and whatever output was produced.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrecompileFailure {
    /// Why the contract failed
    pub error: PrecompileError,
    /// Partial output, often empty
    pub output: Bytes,
}

impl PrecompileFailure {
    /// Failure with partial output.
    pub fn with_output(error: PrecompileError, output: Bytes) -> Self {
        Self { error, output }
    }
}

impl From<PrecompileError> for PrecompileFailure {
    fn from(error: PrecompileError) -> Self {
        Self {
            error,
            output: Bytes::new(),
        }
    }
}

impl From<StateError> for PrecompileFailure {
    fn from(error: StateError) -> Self {
        PrecompileError::from(error).into()
    }
}

/// Input of a single contract run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrecompileInput<'a> {
    /// Call data
    pub data: &'a [u8],
    /// Account that called the contract
    pub caller: Address,
    /// Value sent with the call
    pub value: U256,
    /// State changes are forbidden
    pub is_static: bool,
    /// Gas left after the contract's required gas was charged
    pub gas_limit: u64,
}

/// A native contract living at a fixed address.
///
/// Implementations are stateless: every side effect goes through the
/// callback handed to [`PrecompiledContract::run`].
pub trait PrecompiledContract: Debug + Send + Sync {
    /// Gas charged before the contract runs.
    fn required_gas(&self, input: &[u8]) -> u64;

    /// Runs the contract.
    fn run(
        &self,
        callback: &mut dyn ExecutionCallback,
        input: PrecompileInput<'_>,
    ) -> PrecompileResult;
}

/// Precompile function type of a stateless contract.
pub type PrecompileFn = fn(&[u8]) -> Result<Bytes, PrecompileError>;

/// Gas function type of a stateless contract.
pub type GasFn = fn(&[u8]) -> u64;

/// A stateless contract built from a gas function and a run function.
///
/// The whole cost is charged through [`PrecompiledContract::required_gas`],
/// so the run reports no extra gas.
#[derive(Clone, Copy, Debug)]
pub struct StandardPrecompile {
    /// Human readable name, used in traces
    pub name: &'static str,
    /// Gas function
    pub gas: GasFn,
    /// Run function
    pub run: PrecompileFn,
}

impl StandardPrecompile {
    /// Creates a stateless contract.
    pub const fn new(name: &'static str, gas: GasFn, run: PrecompileFn) -> Self {
        Self { name, gas, run }
    }
}

impl PrecompiledContract for StandardPrecompile {
    #[inline]
    fn required_gas(&self, input: &[u8]) -> u64 {
        (self.gas)(input)
    }

    #[inline]
    fn run(
        &self,
        _callback: &mut dyn ExecutionCallback,
        input: PrecompileInput<'_>,
    ) -> PrecompileResult {
        (self.run)(input.data)
            .map(|bytes| PrecompileOutput::new(0, bytes))
            .map_err(Into::into)
    }
}
