//! Block context visible to contracts.
use auto_impl::auto_impl;
use primitives::{Address, B256, U256};

/// Trait for retrieving block information required for execution.
#[auto_impl(&, &mut, Box)]
pub trait Block {
    /// The number of ancestor blocks of this block (block height).
    fn number(&self) -> u64;

    /// Beneficiary (Coinbase, miner) is a address that have signed the block.
    fn beneficiary(&self) -> Address;

    /// The timestamp of the block in seconds since the UNIX epoch.
    fn timestamp(&self) -> u64;

    /// The gas limit of the block.
    fn gas_limit(&self) -> u64;

    /// The base fee per gas, added in the London upgrade with [EIP-1559].
    ///
    /// [EIP-1559]: https://eips.ethereum.org/EIPS/eip-1559
    fn basefee(&self) -> u64;

    /// The difficulty of the block.
    ///
    /// Unused after the Paris (AKA the merge) upgrade, and replaced by `prevrandao`.
    fn difficulty(&self) -> U256;

    /// The output of the randomness beacon provided by the beacon chain.
    ///
    /// Replaces `difficulty` after the Paris (AKA the merge) upgrade with [EIP-4399].
    ///
    /// [EIP-4399]: https://eips.ethereum.org/EIPS/eip-4399
    fn prevrandao(&self) -> Option<B256>;
}

/// The block environment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockEnv {
    /// The number of ancestor blocks of this block (block height)
    pub number: u64,
    /// Beneficiary (Coinbase or miner) is a address that have signed the block
    pub beneficiary: Address,
    /// The timestamp of the block in seconds since the UNIX epoch
    pub timestamp: u64,
    /// The gas limit of the block
    pub gas_limit: u64,
    /// The base fee per gas
    pub basefee: u64,
    /// The difficulty of the block
    pub difficulty: U256,
    /// The output of the randomness beacon provided by the beacon chain
    pub prevrandao: Option<B256>,
}

impl Block for BlockEnv {
    #[inline]
    fn number(&self) -> u64 {
        self.number
    }

    #[inline]
    fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    #[inline]
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    #[inline]
    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    #[inline]
    fn basefee(&self) -> u64 {
        self.basefee
    }

    #[inline]
    fn difficulty(&self) -> U256 {
        self.difficulty
    }

    #[inline]
    fn prevrandao(&self) -> Option<B256> {
        self.prevrandao
    }
}
