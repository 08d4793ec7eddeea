//! [`Rules`]: the fork flag snapshot an execution runs under.
use crate::hardfork::SpecId;

/// Immutable snapshot of the protocol rules active for one execution.
///
/// Flags are ordered and monotonic along the mainnet lineage: when a flag is
/// set, every flag of an older fork is expected to be set as well. Rules built
/// with [`Rules::new`] always satisfy this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rules {
    /// Chain id of the network.
    pub chain_id: u64,
    /// Homestead.
    pub is_homestead: bool,
    /// EIP-150 (Tangerine Whistle).
    pub is_eip150: bool,
    /// EIP-155 replay protection (Spurious Dragon).
    pub is_eip155: bool,
    /// EIP-158 state clearing (Spurious Dragon).
    pub is_eip158: bool,
    /// Byzantium.
    pub is_byzantium: bool,
    /// Constantinople.
    pub is_constantinople: bool,
    /// Petersburg.
    pub is_petersburg: bool,
    /// Istanbul.
    pub is_istanbul: bool,
    /// Berlin.
    pub is_berlin: bool,
    /// London.
    pub is_london: bool,
    /// Paris.
    pub is_merge: bool,
    /// Shanghai.
    pub is_shanghai: bool,
    /// Cancun.
    pub is_cancun: bool,
    /// Prague.
    pub is_prague: bool,
}

impl Rules {
    /// Returns the rules with every fork up to and including `spec` active.
    pub const fn new(chain_id: u64, spec: SpecId) -> Self {
        Self {
            chain_id,
            is_homestead: spec.is_enabled_in(SpecId::HOMESTEAD),
            is_eip150: spec.is_enabled_in(SpecId::TANGERINE),
            is_eip155: spec.is_enabled_in(SpecId::SPURIOUS_DRAGON),
            is_eip158: spec.is_enabled_in(SpecId::SPURIOUS_DRAGON),
            is_byzantium: spec.is_enabled_in(SpecId::BYZANTIUM),
            is_constantinople: spec.is_enabled_in(SpecId::CONSTANTINOPLE),
            is_petersburg: spec.is_enabled_in(SpecId::PETERSBURG),
            is_istanbul: spec.is_enabled_in(SpecId::ISTANBUL),
            is_berlin: spec.is_enabled_in(SpecId::BERLIN),
            is_london: spec.is_enabled_in(SpecId::LONDON),
            is_merge: spec.is_enabled_in(SpecId::MERGE),
            is_shanghai: spec.is_enabled_in(SpecId::SHANGHAI),
            is_cancun: spec.is_enabled_in(SpecId::CANCUN),
            is_prague: spec.is_enabled_in(SpecId::PRAGUE),
        }
    }

    /// Returns the newest [`SpecId`] whose flag is set.
    ///
    /// Flags are checked newest first, so a value with gaps in its flags
    /// still resolves to the newest fork it names.
    pub const fn spec(&self) -> SpecId {
        if self.is_prague {
            SpecId::PRAGUE
        } else if self.is_cancun {
            SpecId::CANCUN
        } else if self.is_shanghai {
            SpecId::SHANGHAI
        } else if self.is_merge {
            SpecId::MERGE
        } else if self.is_london {
            SpecId::LONDON
        } else if self.is_berlin {
            SpecId::BERLIN
        } else if self.is_istanbul {
            SpecId::ISTANBUL
        } else if self.is_petersburg {
            SpecId::PETERSBURG
        } else if self.is_constantinople {
            SpecId::CONSTANTINOPLE
        } else if self.is_byzantium {
            SpecId::BYZANTIUM
        } else if self.is_eip155 || self.is_eip158 {
            SpecId::SPURIOUS_DRAGON
        } else if self.is_eip150 {
            SpecId::TANGERINE
        } else if self.is_homestead {
            SpecId::HOMESTEAD
        } else {
            SpecId::FRONTIER
        }
    }

    /// Returns `true` if `self` has at least every flag `other` has.
    pub const fn includes(&self, other: &Self) -> bool {
        (self.is_homestead || !other.is_homestead)
            && (self.is_eip150 || !other.is_eip150)
            && (self.is_eip155 || !other.is_eip155)
            && (self.is_eip158 || !other.is_eip158)
            && (self.is_byzantium || !other.is_byzantium)
            && (self.is_constantinople || !other.is_constantinople)
            && (self.is_petersburg || !other.is_petersburg)
            && (self.is_istanbul || !other.is_istanbul)
            && (self.is_berlin || !other.is_berlin)
            && (self.is_london || !other.is_london)
            && (self.is_merge || !other.is_merge)
            && (self.is_shanghai || !other.is_shanghai)
            && (self.is_cancun || !other.is_cancun)
            && (self.is_prague || !other.is_prague)
    }
}

impl From<SpecId> for Rules {
    fn from(spec: SpecId) -> Self {
        Self::new(1, spec)
    }
}
