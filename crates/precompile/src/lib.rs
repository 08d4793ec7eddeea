//! # callvm-precompile
//!
//! Precompiled contracts, the per-fork registries that group them and the
//! [`PrecompileManager`] that prices and dispatches calls to them.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

pub mod blake2;
pub mod bn128;
pub mod hash;
pub mod identity;
pub mod interface;
pub mod manager;
pub mod modexp;
pub mod secp256k1;
pub mod utilities;

pub use interface::*;
pub use manager::{
    run_precompile, EthPrecompileManager, PrecompileManager, PrecompileOutcome, RegistryState,
};

use core::fmt;
use once_cell::race::OnceBox;
use primitives::{hardfork::SpecId, Address, Rules};
use std::{boxed::Box, collections::BTreeMap, vec::Vec};

/// Calculate the linear cost of a precompile.
pub fn calc_linear_cost_u32(len: usize, base: u64, word: u64) -> u64 {
    (len as u64).div_ceil(32).saturating_mul(word).saturating_add(base)
}

/// Address to contract table of one protocol generation.
#[derive(Clone, Default)]
pub struct Precompiles {
    /// Contracts keyed by address, iterated in ascending address order.
    inner: BTreeMap<Address, &'static dyn PrecompiledContract>,
}

impl fmt::Debug for Precompiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.keys()).finish()
    }
}

impl Precompiles {
    /// Returns the precompiles for the given spec.
    pub fn new(spec: PrecompileSpecId) -> &'static Self {
        match spec {
            PrecompileSpecId::HOMESTEAD => Self::homestead(),
            PrecompileSpecId::BYZANTIUM => Self::byzantium(),
            PrecompileSpecId::ISTANBUL => Self::istanbul(),
            PrecompileSpecId::BERLIN => Self::berlin(),
        }
    }

    /// Returns precompiles for Homestead spec.
    pub fn homestead() -> &'static Self {
        static INSTANCE: OnceBox<Precompiles> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Precompiles::default();
            precompiles.extend([
                secp256k1::ECRECOVER,
                hash::SHA256,
                hash::RIPEMD160,
                identity::FUN,
            ]);
            Box::new(precompiles)
        })
    }

    /// Returns precompiles for Byzantium spec.
    pub fn byzantium() -> &'static Self {
        static INSTANCE: OnceBox<Precompiles> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::homestead().clone();
            precompiles.extend([
                // EIP-198: Big integer modular exponentiation.
                modexp::BYZANTIUM,
                // EIP-196: Precompiled contracts for addition and scalar multiplication on the elliptic curve alt_bn128.
                // EIP-197: Precompiled contracts for optimal ate pairing check on the elliptic curve alt_bn128.
                bn128::add::BYZANTIUM,
                bn128::mul::BYZANTIUM,
                bn128::pair::BYZANTIUM,
            ]);
            Box::new(precompiles)
        })
    }

    /// Returns precompiles for Istanbul spec.
    pub fn istanbul() -> &'static Self {
        static INSTANCE: OnceBox<Precompiles> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::byzantium().clone();
            precompiles.extend([
                // EIP-1108: Reduce alt_bn128 precompile gas costs.
                bn128::add::ISTANBUL,
                bn128::mul::ISTANBUL,
                bn128::pair::ISTANBUL,
                // EIP-152: Add BLAKE2 compression function `F` precompile.
                blake2::FUN,
            ]);
            Box::new(precompiles)
        })
    }

    /// Returns precompiles for Berlin spec.
    pub fn berlin() -> &'static Self {
        static INSTANCE: OnceBox<Precompiles> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::istanbul().clone();
            precompiles.extend([
                // EIP-2565: ModExp Gas Cost.
                modexp::BERLIN,
            ]);
            Box::new(precompiles)
        })
    }

    /// Returns the precompiles for the latest spec.
    pub fn latest() -> &'static Self {
        Self::berlin()
    }

    /// Returns an iterator over the precompile addresses, in ascending order.
    #[inline]
    pub fn addresses(&self) -> impl ExactSizeIterator<Item = &Address> {
        self.inner.keys()
    }

    /// Consumes the type and returns all precompile addresses, in ascending order.
    #[inline]
    pub fn into_addresses(self) -> impl ExactSizeIterator<Item = Address> {
        self.inner.into_keys()
    }

    /// Is the given address a precompile.
    #[inline]
    pub fn contains(&self, address: &Address) -> bool {
        self.inner.contains_key(address)
    }

    /// Returns the precompile for the given address.
    #[inline]
    pub fn get(&self, address: &Address) -> Option<&'static dyn PrecompiledContract> {
        self.inner.get(address).copied()
    }

    /// Is the precompiles list empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of precompiles.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Extends the precompiles with the given precompiles.
    ///
    /// Other precompiles with overwrite existing precompiles.
    #[inline]
    pub fn extend(&mut self, other: impl IntoIterator<Item = PrecompileWithAddress>) {
        self.inner.extend(other.into_iter().map(|p| (p.0, p.1)));
    }

    /// Returns complement of `other` in `self`.
    ///
    /// Two entries are considered equal if the precompile addresses are equal.
    pub fn difference(&self, other: &Self) -> Self {
        let inner = self
            .inner
            .iter()
            .filter(|(a, _)| !other.inner.contains_key(*a))
            .map(|(a, p)| (*a, *p))
            .collect();
        Self { inner }
    }

    /// Returns intersection of `self` and `other`.
    ///
    /// Two entries are considered equal if the precompile addresses are equal.
    pub fn intersection(&self, other: &Self) -> Self {
        let inner = self
            .inner
            .iter()
            .filter(|(a, _)| other.inner.contains_key(*a))
            .map(|(a, p)| (*a, *p))
            .collect();
        Self { inner }
    }
}

/// A contract bound to its address.
#[derive(Clone, Copy, Debug)]
pub struct PrecompileWithAddress(pub Address, pub &'static dyn PrecompiledContract);

impl From<(Address, &'static dyn PrecompiledContract)> for PrecompileWithAddress {
    fn from(value: (Address, &'static dyn PrecompiledContract)) -> Self {
        PrecompileWithAddress(value.0, value.1)
    }
}

impl PrecompileWithAddress {
    /// Returns reference of address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.0
    }

    /// Returns the contract.
    #[inline]
    pub fn precompile(&self) -> &'static dyn PrecompiledContract {
        self.1
    }
}

/// Registry generations. A generation only changes when a fork adds or
/// reprices a contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum PrecompileSpecId {
    /// Frontier through Spurious Dragon
    HOMESTEAD,
    /// Byzantium through Petersburg
    BYZANTIUM,
    /// Istanbul
    ISTANBUL,
    /// Berlin and every later fork
    BERLIN,
}

impl From<SpecId> for PrecompileSpecId {
    fn from(spec_id: SpecId) -> Self {
        Self::from_spec_id(spec_id)
    }
}

impl From<&Rules> for PrecompileSpecId {
    fn from(rules: &Rules) -> Self {
        Self::from_rules(rules)
    }
}

impl PrecompileSpecId {
    /// Returns the appropriate precompile Spec for the primitive [SpecId].
    pub const fn from_spec_id(spec_id: SpecId) -> Self {
        use primitives::hardfork::SpecId::*;
        match spec_id {
            FRONTIER | HOMESTEAD | TANGERINE | SPURIOUS_DRAGON => Self::HOMESTEAD,
            BYZANTIUM | CONSTANTINOPLE | PETERSBURG => Self::BYZANTIUM,
            ISTANBUL => Self::ISTANBUL,
            BERLIN | LONDON | MERGE | SHANGHAI | CANCUN | PRAGUE => Self::BERLIN,
        }
    }

    /// Returns the generation of the newest flag set in `rules`.
    ///
    /// Flags are checked newest first, so rules with several flags set
    /// resolve to the newest registry.
    pub const fn from_rules(rules: &Rules) -> Self {
        if rules.is_berlin {
            Self::BERLIN
        } else if rules.is_istanbul {
            Self::ISTANBUL
        } else if rules.is_byzantium {
            Self::BYZANTIUM
        } else {
            Self::HOMESTEAD
        }
    }
}

/// Returns the registry active under `rules`.
#[inline]
pub fn select_registry(rules: &Rules) -> &'static Precompiles {
    Precompiles::new(PrecompileSpecId::from_rules(rules))
}

/// Returns the ascending list of addresses active under `rules`.
#[inline]
pub fn active_addresses(rules: &Rules) -> Vec<Address> {
    select_registry(rules).addresses().copied().collect()
}

/// Const function for making an address by concatenating the bytes from two given numbers.
///
/// Note that 32 + 128 = 160 = 20 bytes (the length of an address).
///
/// This function is used as a convenience for specifying the addresses of the various precompiles.
#[inline]
pub const fn u64_to_address(x: u64) -> Address {
    let x = x.to_be_bytes();
    Address::new([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7],
    ])
}
