//! Execution configuration.
use auto_impl::auto_impl;
use primitives::{hardfork::SpecId, Rules, CALL_STACK_LIMIT, MAX_CODE_SIZE};

/// Read access to the execution configuration.
#[auto_impl(&, &mut, Box)]
pub trait Cfg {
    /// Chain id, used by EIP-155 and exposed to precompiles.
    fn chain_id(&self) -> u64;

    /// Active hardfork.
    fn spec(&self) -> SpecId;

    /// Maximum nesting depth of calls and creates.
    fn call_stack_limit(&self) -> u64;

    /// Maximum size of deployed code, `None` when unlimited.
    fn max_code_size(&self) -> Option<usize>;

    /// Fork flags derived from [`Cfg::chain_id`] and [`Cfg::spec`].
    fn rules(&self) -> Rules {
        Rules::new(self.chain_id(), self.spec())
    }
}

/// Execution configuration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CfgEnv {
    /// Chain ID of the EVM.
    ///
    /// Chain ID is introduced EIP-155.
    pub chain_id: u64,
    /// Specification for EVM represent the hardfork
    pub spec: SpecId,
    /// Maximum call depth. A call or create past it fails with
    /// [`CallError::CallTooDeep`](crate::CallError::CallTooDeep).
    pub call_stack_limit: u64,
    /// Contract code size limit override.
    ///
    /// Only enforced once Spurious Dragon (EIP-170) is active. `None` disables the check.
    pub limit_contract_code_size: Option<usize>,
}

impl CfgEnv {
    /// Creates a configuration for the given chain and hardfork.
    pub fn new(chain_id: u64, spec: SpecId) -> Self {
        Self {
            chain_id,
            spec,
            ..Default::default()
        }
    }

    /// Returns the configuration with the given hardfork.
    pub fn with_spec(mut self, spec: SpecId) -> Self {
        self.spec = spec;
        self
    }

    /// Returns the configuration with the given call depth limit.
    pub fn with_call_stack_limit(mut self, limit: u64) -> Self {
        self.call_stack_limit = limit;
        self
    }
}

impl Default for CfgEnv {
    fn default() -> Self {
        Self {
            chain_id: 1,
            spec: SpecId::default(),
            call_stack_limit: CALL_STACK_LIMIT,
            limit_contract_code_size: Some(MAX_CODE_SIZE),
        }
    }
}

impl Cfg for CfgEnv {
    #[inline]
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[inline]
    fn spec(&self) -> SpecId {
        self.spec
    }

    #[inline]
    fn call_stack_limit(&self) -> u64 {
        self.call_stack_limit
    }

    fn max_code_size(&self) -> Option<usize> {
        if self.spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            self.limit_contract_code_size
        } else {
            None
        }
    }
}
