//! Blake2 compression function precompile. More details in [`run`]
use crate::{PrecompileError, PrecompileWithAddress, StandardPrecompile};
use primitives::Bytes;

const F_ROUND: u64 = 1;
const INPUT_LENGTH: usize = 213;

/// Blake2 precompile
pub const FUN: PrecompileWithAddress = PrecompileWithAddress(
    crate::u64_to_address(9),
    &StandardPrecompile::new("blake2F", blake2_gas, run),
);

/// Reads the big-endian round count; inputs of the wrong length cost nothing
/// and are rejected by [`run`].
fn blake2_gas(input: &[u8]) -> u64 {
    if input.len() != INPUT_LENGTH {
        return 0;
    }
    read_rounds(input) as u64 * F_ROUND
}

#[inline]
fn read_rounds(input: &[u8]) -> u32 {
    let mut rounds = [0u8; 4];
    rounds.copy_from_slice(&input[..4]);
    u32::from_be_bytes(rounds)
}

#[inline]
fn read_u64_le(input: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&input[offset..offset + 8]);
    u64::from_le_bytes(word)
}

/// reference: <https://eips.ethereum.org/EIPS/eip-152>
/// input format:
/// [4 bytes for rounds][64 bytes for h][128 bytes for m][8 bytes for t_0][8 bytes for t_1][1 byte for f]
pub fn run(input: &[u8]) -> Result<Bytes, PrecompileError> {
    if input.len() != INPUT_LENGTH {
        return Err(PrecompileError::Blake2WrongLength);
    }

    let rounds = read_rounds(input) as usize;

    let f = match input[212] {
        1 => true,
        0 => false,
        _ => return Err(PrecompileError::Blake2WrongFinalIndicatorFlag),
    };

    let mut h = [0u64; 8];
    for (i, item) in h.iter_mut().enumerate() {
        *item = read_u64_le(input, 4 + i * 8);
    }

    let mut m = [0u64; 16];
    for (i, item) in m.iter_mut().enumerate() {
        *item = read_u64_le(input, 68 + i * 8);
    }

    let t = [read_u64_le(input, 196), read_u64_le(input, 204)];

    algo::compress(rounds, &mut h, &m, t, f);

    let mut out = [0u8; 64];
    for (i, h) in (0..64).step_by(8).zip(h.iter()) {
        out[i..i + 8].copy_from_slice(&h.to_le_bytes());
    }

    Ok(out.into())
}

/// Blake2 algorithm
pub mod algo {
    /// SIGMA from spec: <https://datatracker.ietf.org/doc/html/rfc7693#section-2.7>
    pub const SIGMA: [[usize; 16]; 10] = [
        [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
        [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
        [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
        [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
        [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
        [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
        [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
        [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
        [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
        [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    ];

    /// BLAKE2b initialization vector
    pub const IV: [u64; 8] = [
        0x6a09e667f3bcc908,
        0xbb67ae8584caa73b,
        0x3c6ef372fe94f82b,
        0xa54ff53a5f1d36f1,
        0x510e527fade682d1,
        0x9b05688c2b3e6c1f,
        0x1f83d9abfb41bd6b,
        0x5be0cd19137e2179,
    ];

    #[inline(always)]
    #[allow(clippy::many_single_char_names)]
    /// G function: <https://tools.ietf.org/html/rfc7693#section-3.1>
    pub fn g(v: &mut [u64], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
        v[a] = v[a].wrapping_add(v[b]);
        v[a] = v[a].wrapping_add(x);
        v[d] ^= v[a];
        v[d] = v[d].rotate_right(32);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] ^= v[c];
        v[b] = v[b].rotate_right(24);

        v[a] = v[a].wrapping_add(v[b]);
        v[a] = v[a].wrapping_add(y);
        v[d] ^= v[a];
        v[d] = v[d].rotate_right(16);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] ^= v[c];
        v[b] = v[b].rotate_right(63);
    }

    /// Compression function F over state `h`, message block `m`, offset
    /// counter `t` and final block flag `f`.
    #[allow(clippy::many_single_char_names)]
    pub fn compress(rounds: usize, h: &mut [u64; 8], m: &[u64; 16], t: [u64; 2], f: bool) {
        let mut v = [0u64; 16];
        v[..h.len()].copy_from_slice(h);
        v[h.len()..].copy_from_slice(&IV);

        v[12] ^= t[0];
        v[13] ^= t[1];

        if f {
            v[14] = !v[14];
        }
        for i in 0..rounds {
            round(&mut v, m, i);
        }

        for i in 0..8 {
            h[i] ^= v[i] ^ v[i + 8];
        }
    }

    #[inline(always)]
    fn round(v: &mut [u64; 16], m: &[u64; 16], r: usize) {
        // Message word selection permutation for this round.
        let s = &SIGMA[r % 10];
        g(v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(v, 3, 7, 11, 15, m[s[6]], m[s[7]]);

        g(v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }
}
