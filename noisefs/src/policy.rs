use chrono::Duration;

/// Process-wide reuse policy (spec section 3 and section 6's `policy.*`
/// options).
#[derive(Debug, Clone, PartialEq)]
pub struct ReusePolicy {
    /// Every non-bootstrap randomizer a descriptor references must already
    /// be associated with at least this many distinct files at acceptance
    /// time. Genesis blocks count as pre-seeded regardless of their actual
    /// registry count.
    pub min_reuse_per_block: usize,
    /// Fraction of triple positions whose rand1 or rand2 is public-domain.
    pub min_public_domain_ratio: f64,
    /// Fraction of randomizer slots across the descriptor that already
    /// appear in the association registry.
    pub min_reuse_ratio_overall: f64,
    /// How long after pool initialization, or how many descriptors,
    /// whichever keeps the window open longer, the bootstrap exemption
    /// applies to `min_reuse_ratio_overall` and `min_reuse_per_block`.
    ///
    /// The spec leaves the exact termination criterion an open question
    /// ("time vs. descriptor count... production deployments must pin
    /// one"); this resolves it as "exemption holds until *both* the time
    /// and the count thresholds have been crossed" per the proposed
    /// "whichever is longer" reading.
    pub bootstrap_window: BootstrapWindow,
}

impl Default for ReusePolicy {
    fn default() -> Self {
        Self {
            min_reuse_per_block: 2,
            min_public_domain_ratio: 0.30,
            min_reuse_ratio_overall: 0.80,
            bootstrap_window: BootstrapWindow::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapWindow {
    pub duration: Duration,
    pub descriptor_count: u64,
}

impl Default for BootstrapWindow {
    fn default() -> Self {
        Self {
            duration: Duration::hours(24),
            descriptor_count: 1000,
        }
    }
}
