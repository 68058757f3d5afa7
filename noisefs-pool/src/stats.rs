use std::collections::HashMap;

/// Per-size counts for one snapshot of the pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeStats {
    pub total: usize,
    pub public_domain: usize,
}

impl SizeStats {
    pub fn public_domain_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.public_domain as f64 / self.total as f64
        }
    }
}

/// A read-only snapshot of pool population, keyed by block size in bytes.
/// Lets operators and tests assert section 8's pool invariants without
/// reaching into private fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolStats {
    pub by_size: HashMap<usize, SizeStats>,
}
