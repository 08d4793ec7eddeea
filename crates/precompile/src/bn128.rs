//! BN254 (alt_bn128) precompiles added in [`EIP-196`](https://eips.ethereum.org/EIPS/eip-196)
//! and [`EIP-197`](https://eips.ethereum.org/EIPS/eip-197), repriced in
//! [`EIP-1108`](https://eips.ethereum.org/EIPS/eip-1108).
use crate::{
    utilities::{bool_to_bytes32, right_pad},
    PrecompileError, PrecompileWithAddress, StandardPrecompile,
};
use bn::{AffineG1, AffineG2, Fq, Fq2, Group, Gt, G1, G2};
use primitives::{Address, Bytes};
use std::vec::Vec;

/// Field element length.
const FQ_LEN: usize = 32;
/// Scalar length.
const SCALAR_LEN: usize = 32;
/// Uncompressed G1 point length.
const G1_LEN: usize = 2 * FQ_LEN;

/// Point addition.
pub mod add {
    use super::*;

    const ADDRESS: Address = crate::u64_to_address(6);

    /// Istanbul point addition cost.
    pub const ISTANBUL_ADD_GAS_COST: u64 = 150;
    /// Istanbul point addition.
    pub const ISTANBUL: PrecompileWithAddress = PrecompileWithAddress(
        ADDRESS,
        &StandardPrecompile::new("bn256Add", |_| ISTANBUL_ADD_GAS_COST, run_add),
    );

    /// Byzantium point addition cost.
    pub const BYZANTIUM_ADD_GAS_COST: u64 = 500;
    /// Byzantium point addition.
    pub const BYZANTIUM: PrecompileWithAddress = PrecompileWithAddress(
        ADDRESS,
        &StandardPrecompile::new("bn256Add", |_| BYZANTIUM_ADD_GAS_COST, run_add),
    );
}

/// Scalar multiplication.
pub mod mul {
    use super::*;

    const ADDRESS: Address = crate::u64_to_address(7);

    /// Istanbul scalar multiplication cost.
    pub const ISTANBUL_MUL_GAS_COST: u64 = 6_000;
    /// Istanbul scalar multiplication.
    pub const ISTANBUL: PrecompileWithAddress = PrecompileWithAddress(
        ADDRESS,
        &StandardPrecompile::new("bn256ScalarMul", |_| ISTANBUL_MUL_GAS_COST, run_mul),
    );

    /// Byzantium scalar multiplication cost.
    pub const BYZANTIUM_MUL_GAS_COST: u64 = 40_000;
    /// Byzantium scalar multiplication.
    pub const BYZANTIUM: PrecompileWithAddress = PrecompileWithAddress(
        ADDRESS,
        &StandardPrecompile::new("bn256ScalarMul", |_| BYZANTIUM_MUL_GAS_COST, run_mul),
    );
}

/// Pairing check.
pub mod pair {
    use super::*;

    const ADDRESS: Address = crate::u64_to_address(8);

    /// Istanbul cost per pair.
    pub const ISTANBUL_PAIR_PER_POINT: u64 = 34_000;
    /// Istanbul base cost.
    pub const ISTANBUL_PAIR_BASE: u64 = 45_000;
    /// Istanbul pairing check.
    pub const ISTANBUL: PrecompileWithAddress = PrecompileWithAddress(
        ADDRESS,
        &StandardPrecompile::new(
            "bn256Pairing",
            |input| pair_gas(input, ISTANBUL_PAIR_PER_POINT, ISTANBUL_PAIR_BASE),
            run_pair,
        ),
    );

    /// Byzantium cost per pair.
    pub const BYZANTIUM_PAIR_PER_POINT: u64 = 80_000;
    /// Byzantium base cost.
    pub const BYZANTIUM_PAIR_BASE: u64 = 100_000;
    /// Byzantium pairing check.
    pub const BYZANTIUM: PrecompileWithAddress = PrecompileWithAddress(
        ADDRESS,
        &StandardPrecompile::new(
            "bn256Pairing",
            |input| pair_gas(input, BYZANTIUM_PAIR_PER_POINT, BYZANTIUM_PAIR_BASE),
            run_pair,
        ),
    );
}

/// Input length for the add operation.
/// `ADD` takes two uncompressed G1 points (64 bytes each).
pub const ADD_INPUT_LEN: usize = 64 + 64;

/// Input length for the multiplication operation.
/// `MUL` takes an uncompressed G1 point (64 bytes) and scalar (32 bytes).
pub const MUL_INPUT_LEN: usize = 64 + 32;

/// Pair element length.
/// `PAIR` elements are composed of an uncompressed G1 point (64 bytes) and an uncompressed G2 point
/// (128 bytes).
pub const PAIR_ELEMENT_LEN: usize = 64 + 128;

/// Reads a single `Fq` from the first 32 bytes of the input.
#[inline]
fn read_fq(input: &[u8]) -> Result<Fq, PrecompileError> {
    input
        .get(..FQ_LEN)
        .and_then(|slice| Fq::from_slice(slice).ok())
        .ok_or(PrecompileError::Bn128FieldPointNotAMember)
}

/// Reads an `Fq2`, encoded imaginary part first.
#[inline]
fn read_fq2(input: &[u8]) -> Result<Fq2, PrecompileError> {
    let y = read_fq(input.get(..FQ_LEN).unwrap_or_default())?;
    let x = read_fq(input.get(FQ_LEN..).unwrap_or_default())?;
    Ok(Fq2::new(x, y))
}

/// Creates a new `G1` point from the given `x` and `y` coordinates.
///
/// `(0, 0)` is the point at infinity.
#[inline]
fn new_g1_point(px: Fq, py: Fq) -> Result<G1, PrecompileError> {
    if px == Fq::zero() && py == Fq::zero() {
        Ok(G1::zero())
    } else {
        AffineG1::new(px, py)
            .map(Into::into)
            .map_err(|_| PrecompileError::Bn128AffineGFailedToCreate)
    }
}

/// Creates a new `G2` point from the given `x` and `y` coordinates.
#[inline]
fn new_g2_point(x: Fq2, y: Fq2) -> Result<G2, PrecompileError> {
    if x.is_zero() && y.is_zero() {
        Ok(G2::zero())
    } else {
        AffineG2::new(x, y)
            .map(Into::into)
            .map_err(|_| PrecompileError::Bn128AffineGFailedToCreate)
    }
}

/// Reads a G1 point from the first 64 bytes of the input.
#[inline]
fn read_g1_point(input: &[u8]) -> Result<G1, PrecompileError> {
    let px = read_fq(input)?;
    let py = read_fq(input.get(FQ_LEN..).unwrap_or_default())?;
    new_g1_point(px, py)
}

/// Reads a G2 point from the first 128 bytes of the input.
#[inline]
fn read_g2_point(input: &[u8]) -> Result<G2, PrecompileError> {
    let ba = read_fq2(input.get(..2 * FQ_LEN).unwrap_or_default())?;
    let bb = read_fq2(input.get(2 * FQ_LEN..).unwrap_or_default())?;
    new_g2_point(ba, bb)
}

/// Serializes an affine G1 point as big-endian `x || y`.
///
/// The point at infinity is all zeroes.
#[inline]
fn encode_g1_point(point: G1) -> Result<[u8; G1_LEN], PrecompileError> {
    let mut output = [0u8; G1_LEN];

    if let Some(point_affine) = AffineG1::from_jacobian(point) {
        point_affine
            .x()
            .to_big_endian(&mut output[..FQ_LEN])
            .map_err(|_| PrecompileError::Bn128FieldPointNotAMember)?;
        point_affine
            .y()
            .to_big_endian(&mut output[FQ_LEN..])
            .map_err(|_| PrecompileError::Bn128FieldPointNotAMember)?;
    }

    Ok(output)
}

/// Adds two G1 points.
pub fn run_add(input: &[u8]) -> Result<Bytes, PrecompileError> {
    let input = right_pad::<ADD_INPUT_LEN>(input);

    let p1 = read_g1_point(&input[..G1_LEN])?;
    let p2 = read_g1_point(&input[G1_LEN..])?;

    Ok(encode_g1_point(p1 + p2)?.into())
}

/// Multiplies a G1 point by a scalar.
pub fn run_mul(input: &[u8]) -> Result<Bytes, PrecompileError> {
    let input = right_pad::<MUL_INPUT_LEN>(input);

    let p = read_g1_point(&input[..G1_LEN])?;
    // The scalar does not need to be canonical.
    let fr = bn::Fr::from_slice(&input[G1_LEN..G1_LEN + SCALAR_LEN])
        .map_err(|_| PrecompileError::Bn128FieldPointNotAMember)?;

    Ok(encode_g1_point(p * fr)?.into())
}

/// Linear pairing cost, on the number of whole pairs in the input.
pub fn pair_gas(input: &[u8], pair_per_point_cost: u64, pair_base_cost: u64) -> u64 {
    ((input.len() / PAIR_ELEMENT_LEN) as u64)
        .saturating_mul(pair_per_point_cost)
        .saturating_add(pair_base_cost)
}

/// Checks that the product of the pairings is one.
///
/// Empty input succeeds.
pub fn run_pair(input: &[u8]) -> Result<Bytes, PrecompileError> {
    if input.len() % PAIR_ELEMENT_LEN != 0 {
        return Err(PrecompileError::Bn128PairLength);
    }

    let pairs = input
        .chunks_exact(PAIR_ELEMENT_LEN)
        .map(|element| {
            let a = read_g1_point(&element[..G1_LEN])?;
            let b = read_g2_point(&element[G1_LEN..])?;
            Ok((a, b))
        })
        .collect::<Result<Vec<(G1, G2)>, PrecompileError>>()?;

    let success = pairs.is_empty() || bn::pairing_batch(&pairs) == Gt::one();
    Ok(bool_to_bytes32(success))
}
