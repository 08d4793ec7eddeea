//! Input padding helpers shared by the contracts.
use primitives::{b256, Bytes, B256};
use std::{borrow::Cow, vec};

/// Right-pads the given slice at `offset` with zeroes until `LEN`.
///
/// Returns the first `LEN` bytes if it does not need padding.
#[inline]
pub fn right_pad_with_offset<const LEN: usize>(data: &[u8], offset: usize) -> Cow<'_, [u8; LEN]> {
    right_pad(data.get(offset..).unwrap_or_default())
}

/// Right-pads the given slice with zeroes until `LEN`.
///
/// Returns the first `LEN` bytes if it does not need padding.
#[inline]
pub fn right_pad<const LEN: usize>(data: &[u8]) -> Cow<'_, [u8; LEN]> {
    match data.get(..LEN).and_then(|data| <&[u8; LEN]>::try_from(data).ok()) {
        Some(data) => Cow::Borrowed(data),
        None => {
            let mut padded = [0; LEN];
            padded[..data.len()].copy_from_slice(data);
            Cow::Owned(padded)
        }
    }
}

/// Right-pads the given slice with zeroes until `len`.
///
/// Returns the first `len` bytes if it does not need padding.
#[inline]
pub fn right_pad_vec(data: &[u8], len: usize) -> Cow<'_, [u8]> {
    if let Some(data) = data.get(..len) {
        Cow::Borrowed(data)
    } else {
        let mut padded = vec![0; len];
        padded[..data.len()].copy_from_slice(data);
        Cow::Owned(padded)
    }
}

/// Left-pads the given slice with zeroes until `LEN`.
///
/// Returns the first `LEN` bytes if it does not need padding.
#[inline]
pub fn left_pad<const LEN: usize>(data: &[u8]) -> Cow<'_, [u8; LEN]> {
    match data.get(..LEN).and_then(|data| <&[u8; LEN]>::try_from(data).ok()) {
        Some(data) => Cow::Borrowed(data),
        None => {
            let mut padded = [0; LEN];
            padded[LEN - data.len()..].copy_from_slice(data);
            Cow::Owned(padded)
        }
    }
}

/// Left-pads the given slice with zeroes until `len`.
///
/// Returns the first `len` bytes if it does not need padding.
#[inline]
pub fn left_pad_vec(data: &[u8], len: usize) -> Cow<'_, [u8]> {
    if let Some(data) = data.get(..len) {
        Cow::Borrowed(data)
    } else {
        let mut padded = vec![0; len];
        padded[len - data.len()..].copy_from_slice(data);
        Cow::Owned(padded)
    }
}

/// Converts a boolean to a left-padded 32-byte `Bytes` value.
///
/// This is optimized to not allocate at runtime by using 2 static arrays.
#[inline]
pub const fn bool_to_bytes32(value: bool) -> Bytes {
    const TRUE: &B256 = &b256!("0x0000000000000000000000000000000000000000000000000000000000000001");
    const FALSE: &B256 = &B256::ZERO;
    Bytes::from_static(if value { TRUE.as_slice() } else { FALSE.as_slice() })
}
