//! Failure reasons of calls, creates and precompiled contracts.
use crate::{journaled_state::TransferError, state::StateError};
use core::fmt;
use std::string::String;

/// Precompile error type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrecompileError {
    /// out of gas is the main error. Others are here just for completeness
    OutOfGas,
    /// Blake2 errors
    Blake2WrongLength,
    /// Blake2 wrong final indicator flag
    Blake2WrongFinalIndicatorFlag,
    /// Modexp errors
    ModexpExpOverflow,
    /// Modexp base overflow
    ModexpBaseOverflow,
    /// Modexp mod overflow
    ModexpModOverflow,
    /// Bn128 errors
    Bn128FieldPointNotAMember,
    /// Bn128 affine g failed to create
    Bn128AffineGFailedToCreate,
    /// Bn128 pair length
    Bn128PairLength,
    /// A stateful contract's access through its callback failed.
    State(StateError),
    /// Catch-all variant for other errors
    Other(String),
}

impl PrecompileError {
    /// Returns another error with the given message.
    pub fn other(err: impl Into<String>) -> Self {
        Self::Other(err.into())
    }

    /// Returns `true` if the error is out of gas.
    pub fn is_oog(&self) -> bool {
        matches!(self, Self::OutOfGas)
    }
}

impl From<StateError> for PrecompileError {
    fn from(err: StateError) -> Self {
        Self::State(err)
    }
}

impl core::error::Error for PrecompileError {}

impl fmt::Display for PrecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OutOfGas => "out of gas",
            Self::Blake2WrongLength => "wrong input length for blake2",
            Self::Blake2WrongFinalIndicatorFlag => "wrong final indicator flag for blake2",
            Self::ModexpExpOverflow => "modexp exp overflow",
            Self::ModexpBaseOverflow => "modexp base overflow",
            Self::ModexpModOverflow => "modexp mod overflow",
            Self::Bn128FieldPointNotAMember => "field point not a member of bn128 curve",
            Self::Bn128AffineGFailedToCreate => "failed to create affine g point for bn128 curve",
            Self::Bn128PairLength => "bn128 invalid pair length",
            Self::State(err) => return write!(f, "state access failed: {err}"),
            Self::Other(s) => s,
        };
        f.write_str(s)
    }
}

/// Why a call or create frame did not succeed.
///
/// Every variant fails only the frame that produced it; the caller sees it in
/// [`CallOutcome::result`](crate::CallOutcome::result) and decides how to go on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallError {
    /// Supplied gas does not cover the execution.
    #[error("out of gas")]
    OutOfGas,
    /// The call would exceed the configured depth limit.
    #[error("max call depth exceeded")]
    CallTooDeep,
    /// The caller cannot cover the transferred value.
    #[error("insufficient balance for transfer")]
    OutOfFunds,
    /// Adding the value would overflow the receiver's balance.
    #[error("balance overflow")]
    OverflowPayment,
    /// State change or value transfer inside a static context.
    #[error("write protection")]
    WriteProtection,
    /// Contract already exists at the derived address.
    #[error("contract address collision")]
    CreateCollision,
    /// The creator's nonce is exhausted.
    #[error("nonce uint64 overflow")]
    NonceOverflow,
    /// Deployed code exceeds the EIP-170 limit.
    #[error("max code size exceeded")]
    CreateContractSizeLimit,
    /// Deployed code starts with the reserved `0xEF` byte (EIP-3541).
    #[error("new contract code starting with 0xEF")]
    CreateContractStartingWithEF,
    /// Gas left after init code does not cover the code deposit.
    #[error("contract creation code storage out of gas")]
    CodeStoreOutOfGas,
    /// Execution reverted, output carries the revert data.
    #[error("execution reverted")]
    Reverted,
    /// A precompiled contract failed.
    #[error("precompile failed: {0}")]
    Precompile(PrecompileError),
    /// The external interpreter halted.
    #[error("interpreter halted: {0}")]
    Interpreter(String),
    /// The state backend failed. The underlying error is reported by the engine.
    #[error("state backend failure")]
    Backend,
}

impl CallError {
    /// Returns `true` for [`CallError::Reverted`], the only failure that returns unused gas.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted)
    }
}

impl From<StateError> for CallError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::WriteProtection => Self::WriteProtection,
            StateError::OutOfFunds => Self::OutOfFunds,
            StateError::BalanceOverflow => Self::OverflowPayment,
            StateError::NonceOverflow => Self::NonceOverflow,
            StateError::Backend => Self::Backend,
        }
    }
}

impl From<TransferError> for CallError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::OutOfFunds => Self::OutOfFunds,
            TransferError::OverflowPayment => Self::OverflowPayment,
            TransferError::CreateCollision => Self::CreateCollision,
        }
    }
}

impl From<PrecompileError> for CallError {
    fn from(err: PrecompileError) -> Self {
        match err {
            PrecompileError::OutOfGas => Self::OutOfGas,
            PrecompileError::State(err) => err.into(),
            err => Self::Precompile(err),
        }
    }
}
