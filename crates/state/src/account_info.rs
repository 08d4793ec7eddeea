use core::hash::{Hash, Hasher};
use primitives::{keccak256, Bytes, B256, KECCAK_EMPTY, U256};

/// Account information that contains balance, nonce, code hash and code
///
/// Code is set as optional.
#[derive(Clone, Debug, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountInfo {
    /// Account balance
    pub balance: U256,
    /// Account nonce
    pub nonce: u64,
    /// code hash
    pub code_hash: B256,
    /// Code associated with this account
    ///
    /// If [None], `code_hash` is used to fetch it from the database when it
    /// is needed.
    pub code: Option<Bytes>,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            code_hash: KECCAK_EMPTY,
            code: Some(Bytes::new()),
            nonce: 0,
        }
    }
}

impl PartialEq for AccountInfo {
    fn eq(&self, other: &Self) -> bool {
        self.balance == other.balance
            && self.nonce == other.nonce
            && self.code_hash == other.code_hash
    }
}

impl Hash for AccountInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.balance.hash(state);
        self.nonce.hash(state);
        self.code_hash.hash(state);
    }
}

impl AccountInfo {
    /// Creates a new [`AccountInfo`] with the given fields.
    #[inline]
    pub fn new(balance: U256, nonce: u64, code_hash: B256, code: Bytes) -> Self {
        Self {
            balance,
            nonce,
            code: Some(code),
            code_hash,
        }
    }

    /// Creates an account that only holds `balance`.
    #[inline]
    pub fn from_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Creates a new [`AccountInfo`] with the given code, hashing it.
    pub fn with_code(self, code: Bytes) -> Self {
        Self {
            balance: self.balance,
            nonce: self.nonce,
            code_hash: hash_code(&code),
            code: Some(code),
        }
    }

    /// Creates a new [`AccountInfo`] with the given balance.
    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    /// Creates a new [`AccountInfo`] with the given nonce.
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the code and its hash.
    pub fn set_code(&mut self, code: Bytes) {
        self.code_hash = hash_code(&code);
        self.code = Some(code);
    }

    /// Returns a copy of this account with the code removed.
    #[inline]
    pub fn copy_without_code(&self) -> Self {
        Self {
            balance: self.balance,
            nonce: self.nonce,
            code_hash: self.code_hash,
            code: None,
        }
    }

    /// Returns `true` if the account is empty as defined by EIP-161:
    /// zero balance, zero nonce and no code.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.is_empty_code_hash()
    }

    /// Returns `true` if the code hash is the Keccak256 hash of the empty string `""`.
    #[inline]
    pub fn is_empty_code_hash(&self) -> bool {
        self.code_hash == KECCAK_EMPTY
    }

    /// Returns `true` if the account has neither code nor a nonce.
    ///
    /// Contract creation requires this of the target address.
    #[inline]
    pub fn has_no_code_and_nonce(&self) -> bool {
        self.is_empty_code_hash() && self.nonce == 0
    }
}

/// Hashes code, mapping empty code to [`KECCAK_EMPTY`].
#[inline]
fn hash_code(code: &[u8]) -> B256 {
    if code.is_empty() {
        KECCAK_EMPTY
    } else {
        keccak256(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_account_is_empty() {
        let info = AccountInfo::default();
        assert!(info.is_empty());
        assert!(info.has_no_code_and_nonce());
    }

    #[test]
    fn code_updates_hash() {
        let info = AccountInfo::from_balance(U256::from(1)).with_code(Bytes::from_static(&[0x60, 0x00]));
        assert_eq!(info.code_hash, keccak256([0x60, 0x00]));
        assert!(!info.is_empty());
        assert!(!info.has_no_code_and_nonce());

        let cleared = info.with_code(Bytes::new());
        assert!(cleared.is_empty_code_hash());
    }
}
