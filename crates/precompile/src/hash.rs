//! Hash precompiles, it contains SHA-256 and RIPEMD-160 hash precompiles
use crate::{calc_linear_cost_u32, PrecompileError, PrecompileWithAddress, StandardPrecompile};
use primitives::Bytes;
use sha2::Digest;

/// SHA-256 precompile
pub const SHA256: PrecompileWithAddress = PrecompileWithAddress(
    crate::u64_to_address(2),
    &StandardPrecompile::new("sha256", sha256_gas, sha256_run),
);

/// RIPEMD-160 precompile
pub const RIPEMD160: PrecompileWithAddress = PrecompileWithAddress(
    crate::u64_to_address(3),
    &StandardPrecompile::new("ripemd160", ripemd160_gas, ripemd160_run),
);

fn sha256_gas(input: &[u8]) -> u64 {
    calc_linear_cost_u32(input.len(), 60, 12)
}

fn ripemd160_gas(input: &[u8]) -> u64 {
    calc_linear_cost_u32(input.len(), 600, 120)
}

/// Computes the SHA-256 hash of the input data
///
/// See: <https://ethereum.github.io/yellowpaper/paper.pdf>
/// See: <https://etherscan.io/address/0000000000000000000000000000000000000002>
pub fn sha256_run(input: &[u8]) -> Result<Bytes, PrecompileError> {
    Ok(Bytes::copy_from_slice(&sha2::Sha256::digest(input)))
}

/// Computes the RIPEMD-160 hash of the input data, left-padded to 32 bytes
///
/// See: <https://ethereum.github.io/yellowpaper/paper.pdf>
/// See: <https://etherscan.io/address/0000000000000000000000000000000000000003>
pub fn ripemd160_run(input: &[u8]) -> Result<Bytes, PrecompileError> {
    let mut output = [0u8; 32];
    output[12..].copy_from_slice(&ripemd::Ripemd160::digest(input));
    Ok(Bytes::copy_from_slice(&output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::hex;

    #[test]
    fn sha256_of_empty_input() {
        let out = sha256_run(&[]).unwrap();
        assert_eq!(
            out[..],
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        assert_eq!(sha256_gas(&[]), 60);
        assert_eq!(sha256_gas(&[0; 33]), 60 + 2 * 12);
    }

    #[test]
    fn ripemd160_is_left_padded() {
        let out = ripemd160_run(&[]).unwrap();
        assert_eq!(
            out[..],
            hex!("0000000000000000000000009c1185a5c5e9fc54612808977ee8f548b2258d31")
        );
        assert_eq!(ripemd160_gas(&[0; 32]), 720);
    }
}
