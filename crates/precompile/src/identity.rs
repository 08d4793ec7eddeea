//! Identity precompile returns the input unchanged
use crate::{calc_linear_cost_u32, PrecompileError, PrecompileWithAddress, StandardPrecompile};
use primitives::Bytes;

/// Address of the identity precompile.
pub const FUN: PrecompileWithAddress = PrecompileWithAddress(
    crate::u64_to_address(4),
    &StandardPrecompile::new("identity", identity_gas, identity_run),
);

/// The base cost of the operation.
pub const IDENTITY_BASE: u64 = 15;
/// The cost per word.
pub const IDENTITY_PER_WORD: u64 = 3;

fn identity_gas(input: &[u8]) -> u64 {
    calc_linear_cost_u32(input.len(), IDENTITY_BASE, IDENTITY_PER_WORD)
}

/// Takes the input bytes, copies them, and returns it as the output.
///
/// See: <https://ethereum.github.io/yellowpaper/paper.pdf>
/// See: <https://etherscan.io/address/0000000000000000000000000000000000000004>
pub fn identity_run(input: &[u8]) -> Result<Bytes, PrecompileError> {
    Ok(Bytes::copy_from_slice(input))
}
