//! Modular exponentiation precompile added in [`EIP-198`](https://eips.ethereum.org/EIPS/eip-198)
//! and repriced in [`EIP-2565`](https://eips.ethereum.org/EIPS/eip-2565).
use crate::{
    utilities::{left_pad, left_pad_vec, right_pad_vec, right_pad_with_offset},
    PrecompileError, PrecompileWithAddress, StandardPrecompile,
};
use core::cmp::{max, min};
use primitives::{Bytes, U256};

/// Modexp precompile with BYZANTIUM gas rules.
pub const BYZANTIUM: PrecompileWithAddress = PrecompileWithAddress(
    crate::u64_to_address(5),
    &StandardPrecompile::new("modexp", byzantium_gas, run),
);

/// Modexp precompile with BERLIN gas rules.
pub const BERLIN: PrecompileWithAddress = PrecompileWithAddress(
    crate::u64_to_address(5),
    &StandardPrecompile::new("modexp", berlin_gas, run),
);

const HEADER_LENGTH: usize = 96;

/// Lengths read from the 96 byte header.
struct Header {
    base_len: U256,
    exp_len: U256,
    mod_len: U256,
}

impl Header {
    fn parse(input: &[u8]) -> Self {
        Self {
            base_len: U256::from_be_bytes(right_pad_with_offset::<32>(input, 0).into_owned()),
            exp_len: U256::from_be_bytes(right_pad_with_offset::<32>(input, 32).into_owned()),
            mod_len: U256::from_be_bytes(right_pad_with_offset::<32>(input, 64).into_owned()),
        }
    }

    /// Lengths as `u64`, or `None` if any of them does not fit.
    fn as_u64(&self) -> Option<(u64, u64, u64)> {
        Some((
            u64::try_from(self.base_len).ok()?,
            u64::try_from(self.exp_len).ok()?,
            u64::try_from(self.mod_len).ok()?,
        ))
    }
}

/// Reads the first 32 bytes of the exponent, left-padded when the exponent is shorter.
fn exp_highp(input: &[u8], base_len: usize, exp_len: usize) -> U256 {
    let body = input.get(HEADER_LENGTH..).unwrap_or_default();
    let exp_highp_len = min(exp_len, 32);
    let right_padded_highp = right_pad_with_offset::<32>(body, base_len);
    let out = left_pad::<32>(&right_padded_highp[..exp_highp_len]);
    U256::from_be_bytes(out.into_owned())
}

/// Calculate the iteration count for the modexp precompile.
fn calculate_iteration_count<const MULTIPLIER: u64>(exp_length: u64, exp_highp: &U256) -> u64 {
    let iteration_count = if exp_length <= 32 && exp_highp.is_zero() {
        0
    } else if exp_length <= 32 {
        exp_highp.bit_len() as u64 - 1
    } else {
        MULTIPLIER
            .saturating_mul(exp_length - 32)
            .saturating_add(max(1, exp_highp.bit_len() as u64) - 1)
    };

    max(iteration_count, 1)
}

/// Calculate gas cost.
fn gas_calc<const MIN_PRICE: u64, const MULTIPLIER: u64, const GAS_DIVISOR: u64, F>(
    input: &[u8],
    calculate_multiplication_complexity: F,
) -> u64
where
    F: Fn(u64) -> U256,
{
    let Some((base_len, exp_len, mod_len)) = Header::parse(input).as_u64() else {
        return u64::MAX;
    };
    let (Ok(base_usize), Ok(exp_usize)) = (usize::try_from(base_len), usize::try_from(exp_len))
    else {
        return u64::MAX;
    };
    let exp_highp = exp_highp(input, base_usize, exp_usize);

    let multiplication_complexity = calculate_multiplication_complexity(max(base_len, mod_len));
    let iteration_count = calculate_iteration_count::<MULTIPLIER>(exp_len, &exp_highp);
    let gas = multiplication_complexity.saturating_mul(U256::from(iteration_count))
        / U256::from(GAS_DIVISOR);

    match u64::try_from(gas) {
        Ok(gas) => max(MIN_PRICE, gas),
        Err(_) => u64::MAX,
    }
}

/// Gas cost under the original EIP-198 pricing.
pub fn byzantium_gas(input: &[u8]) -> u64 {
    gas_calc::<0, 8, 20, _>(input, |max_len| -> U256 {
        // Output of this function is bounded by 2^128
        if max_len <= 64 {
            U256::from(max_len * max_len)
        } else if max_len <= 1_024 {
            U256::from(max_len * max_len / 4 + 96 * max_len - 3_072)
        } else {
            // Up-cast to avoid overflow
            let x = U256::from(max_len);
            let x_sq = x * x;
            x_sq / U256::from(16) + U256::from(480) * x - U256::from(199_680)
        }
    })
}

/// Gas cost according to EIP-2565.
pub fn berlin_gas(input: &[u8]) -> u64 {
    gas_calc::<200, 8, 3, _>(input, |max_len| -> U256 {
        let words = U256::from(max_len.div_ceil(8));
        words * words
    })
}

/// Computes `base ** exp % mod`, returning `mod_len` bytes.
pub fn run(input: &[u8]) -> Result<Bytes, PrecompileError> {
    let header = Header::parse(input);

    let base_len =
        usize::try_from(header.base_len).map_err(|_| PrecompileError::ModexpBaseOverflow)?;
    let mod_len = usize::try_from(header.mod_len).map_err(|_| PrecompileError::ModexpModOverflow)?;

    // Handle a special case when both the base and mod length are zero.
    if base_len == 0 && mod_len == 0 {
        return Ok(Bytes::new());
    }

    let exp_len = usize::try_from(header.exp_len).map_err(|_| PrecompileError::ModexpExpOverflow)?;

    let input_len = base_len
        .checked_add(exp_len)
        .and_then(|len| len.checked_add(mod_len))
        .ok_or(PrecompileError::ModexpExpOverflow)?;

    let body = input.get(HEADER_LENGTH..).unwrap_or_default();
    let body = right_pad_vec(body, input_len);
    let (base, body) = body.split_at(base_len);
    let (exponent, modulus) = body.split_at(exp_len);

    let output = aurora_engine_modexp::modexp(base, exponent, modulus);

    Ok(left_pad_vec(&output, mod_len).into_owned().into())
}
