//! `ecrecover` precompile, backed by the pure rust [`k256`](https://crates.io/crates/k256) crate.
//!
//! Input format:
//! [32 bytes for message][32 bytes for v][64 bytes for signature]
//!
//! Output format:
//! [32 bytes for recovered address], or empty output if the signature is invalid.
use crate::{utilities::right_pad, PrecompileError, PrecompileWithAddress, StandardPrecompile};
use k256::ecdsa::{Error, RecoveryId, Signature, VerifyingKey};
use primitives::{keccak256, Bytes, B256};

/// `ecrecover` precompile, containing address and contract.
pub const ECRECOVER: PrecompileWithAddress = PrecompileWithAddress(
    crate::u64_to_address(1),
    &StandardPrecompile::new("ecrecover", ec_recover_gas, ec_recover_run),
);

/// Flat cost of a recovery.
pub const ECRECOVER_BASE: u64 = 3_000;

fn ec_recover_gas(_input: &[u8]) -> u64 {
    ECRECOVER_BASE
}

/// `ecrecover` precompile function. Read more about input and output format in [this module docs](self).
pub fn ec_recover_run(input: &[u8]) -> Result<Bytes, PrecompileError> {
    let input = right_pad::<128>(input);

    // `v` must be a 32-byte big-endian integer equal to 27 or 28.
    if !(input[32..63].iter().all(|&b| b == 0) && matches!(input[63], 27 | 28)) {
        return Ok(Bytes::new());
    }

    let msg = B256::from_slice(&input[0..32]);
    let recid = input[63] - 27;

    Ok(ecrecover(&input[64..128], recid, &msg)
        .map(|address| Bytes::copy_from_slice(address.as_slice()))
        .unwrap_or_default())
}

/// Recovers the signer address, left-padded to 32 bytes, from a 64 byte
/// `r || s` signature and a message hash.
pub fn ecrecover(sig: &[u8], mut recid: u8, msg: &B256) -> Result<B256, Error> {
    let mut sig = Signature::from_slice(sig)?;

    // normalize signature and flip recovery id if needed.
    if let Some(sig_normalized) = sig.normalize_s() {
        sig = sig_normalized;
        recid ^= 1;
    }
    let recid = RecoveryId::from_byte(recid).ok_or_else(Error::new)?;

    let recovered_key = VerifyingKey::recover_from_prehash(&msg[..], &sig, recid)?;
    let mut hash = keccak256(
        &recovered_key
            .to_encoded_point(/* compress = */ false)
            .as_bytes()[1..],
    );

    // truncate to 20 bytes
    hash[..12].fill(0);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::hex;

    #[test]
    fn recovers_known_signer() {
        let input = hex!(
            "456e9aea5e197a1f1af7a3e85a3212fa4049a3ba34c2289b4c860fc0b0c64ef3"
            "000000000000000000000000000000000000000000000000000000000000001c"
            "9242685bf161793cc25603c231bc2f568eb630ea16aa137d2664ac8038825608"
            "4f8ae3bd7535248d0bd448298cc2e2071e56992d0774dc340c368ae950852ada"
        );
        let out = ec_recover_run(&input).unwrap();
        assert_eq!(
            out[..],
            hex!("0000000000000000000000007156526fbd7a3c72969b54f64e42c10fbb768c8a")
        );
    }

    #[test]
    fn invalid_v_gives_empty_output() {
        let mut input = [0u8; 128];
        input[63] = 29;
        assert!(ec_recover_run(&input).unwrap().is_empty());
        // non zero high bytes of v
        input[63] = 27;
        input[40] = 1;
        assert!(ec_recover_run(&input).unwrap().is_empty());
    }

    #[test]
    fn unrecoverable_signature_gives_empty_output() {
        let mut input = [0u8; 128];
        input[63] = 27;
        assert!(ec_recover_run(&input).unwrap().is_empty());
        assert_eq!(ec_recover_gas(&input), ECRECOVER_BASE);
    }
}
