//! Protocol constants used across the engine.
use alloy_primitives::{b256, B256};

/// EVM interpreter stack limit.
pub const STACK_LIMIT: usize = 1024;

/// EVM call stack limit.
///
/// Depth is a counted value kept by the engine, exceeding it fails the call
/// that would go past it and nothing else.
pub const CALL_STACK_LIMIT: u64 = 1024;

/// EIP-170: Contract code size limit
///
/// By default the limit is `0x6000` (~24kb).
pub const MAX_CODE_SIZE: usize = 0x6000;

/// Gas charged per byte of deployed contract code.
pub const CODE_DEPOSIT_COST: u64 = 200;

/// The Keccak-256 hash of the empty string `""`.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
