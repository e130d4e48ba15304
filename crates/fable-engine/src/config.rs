//! Resolver configuration.

/// What to do when a single link leads back into the current chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Keep following until the depth budget runs out.
    #[default]
    DepthOnly,
    /// Stop before entering a section already visited in this chain.
    RejectRevisits,
}

/// Configuration for a [`crate::Resolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Sections resolved per call, counting the first.
    pub max_depth: usize,
    /// Cycle handling for single-link chains.
    pub cycle_policy: CyclePolicy,
    /// RNG seed for reproducible dice. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            cycle_policy: CyclePolicy::default(),
            seed: None,
        }
    }
}

impl ResolverConfig {
    /// Set the depth budget (at least 1).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Set the cycle policy.
    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
