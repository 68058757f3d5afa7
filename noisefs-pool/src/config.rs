/// Pool sizing configuration (spec section 6's `pool.*` options).
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// `pool.minPoolSizePerSize` — per supported size, minimum blocks.
    pub min_pool_size_per_size: usize,
    /// `pool.maxPoolSizePerSize`.
    pub max_pool_size_per_size: usize,
    /// `pool.publicDomainRatio` — required public-domain fraction within
    /// the pool.
    pub public_domain_ratio: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size_per_size: 100,
            max_pool_size_per_size: 1000,
            public_domain_ratio: 0.5,
        }
    }
}
