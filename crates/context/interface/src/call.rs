//! Nested-call surface: the four ways a running contract reaches another one.
use crate::result::CallError;
use auto_impl::auto_impl;
use primitives::{Address, Bytes, B256, U256};

/// The executing frame as seen by the code running in it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Account that invoked this frame (`CALLER`).
    pub caller: Address,
    /// Account whose storage and balance the frame operates on (`ADDRESS`).
    pub address: Address,
    /// Account whose code is executing. Differs from `address` under
    /// `call_code` and `delegate_call`.
    pub code_address: Address,
    /// Value visible as `CALLVALUE`.
    pub value: U256,
    /// Call data.
    pub input: Bytes,
    /// Gas available to the frame.
    pub gas_limit: u64,
    /// State changes are forbidden.
    pub is_static: bool,
    /// Nesting depth, the outermost frame is at depth zero.
    pub depth: u64,
}

/// Result of a call frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    /// Success, or why the frame failed.
    pub result: Result<(), CallError>,
    /// Return or revert data.
    pub output: Bytes,
    /// Gas handed back to the caller.
    pub gas_remaining: u64,
}

impl CallOutcome {
    /// Successful outcome.
    pub fn success(output: Bytes, gas_remaining: u64) -> Self {
        Self {
            result: Ok(()),
            output,
            gas_remaining,
        }
    }

    /// Failed outcome with the given output and remaining gas.
    pub fn failure(error: CallError, output: Bytes, gas_remaining: u64) -> Self {
        Self {
            result: Err(error),
            output,
            gas_remaining,
        }
    }

    /// Outcome of a frame that failed before running any code.
    ///
    /// The supplied gas goes back to the caller untouched.
    pub fn rejected(error: CallError, gas: u64) -> Self {
        Self::failure(error, Bytes::new(), gas)
    }

    /// Whether the frame succeeded.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a create frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateOutcome {
    /// Success, or why the frame failed.
    pub result: Result<(), CallError>,
    /// Revert data on failure, empty on success.
    pub output: Bytes,
    /// Address of the new contract. Set whenever the address could be derived.
    pub address: Option<Address>,
    /// Gas handed back to the caller.
    pub gas_remaining: u64,
}

impl CreateOutcome {
    /// Outcome of a create that failed before running init code.
    pub fn rejected(error: CallError, address: Option<Address>, gas: u64) -> Self {
        Self {
            result: Err(error),
            output: Bytes::new(),
            address,
            gas_remaining: gas,
        }
    }

    /// Whether the contract was deployed.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Call and create operations exposed to running code.
///
/// `me` is the calling frame. Every operation runs the callee in its own
/// checkpoint and returns the unused gas; no gas counter is shared between
/// frames.
#[auto_impl(&mut, Box)]
pub trait CallContext {
    /// Runs `address`'s code against `address`'s state, moving `value` from
    /// `me.address` to `address`.
    fn call(
        &mut self,
        me: &Frame,
        address: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallOutcome;

    /// Runs `address`'s code against `me.address`'s state. `value` is visible
    /// to the callee and must be covered by `me.address`'s balance.
    fn call_code(
        &mut self,
        me: &Frame,
        address: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallOutcome;

    /// Runs `address`'s code against `me.address`'s state with `me.caller`
    /// and `me.value` propagated. No value moves.
    fn delegate_call(&mut self, me: &Frame, address: Address, input: Bytes, gas: u64)
        -> CallOutcome;

    /// Like [`CallContext::call`] without value, with every state change forbidden.
    fn static_call(&mut self, me: &Frame, address: Address, input: Bytes, gas: u64)
        -> CallOutcome;

    /// Deploys `init_code` at `me.address.create(nonce)`.
    fn create(&mut self, me: &Frame, init_code: Bytes, gas: u64, value: U256) -> CreateOutcome;

    /// Deploys `init_code` at `me.address.create2(salt, keccak256(init_code))`.
    fn create2(
        &mut self,
        me: &Frame,
        init_code: Bytes,
        gas: u64,
        value: U256,
        salt: B256,
    ) -> CreateOutcome;
}
