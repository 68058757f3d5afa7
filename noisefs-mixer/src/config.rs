/// Mixer configuration (spec section 6's `mixer.*` options).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixerConfig {
    /// `mixer.workers` — bound on concurrent block-mixing tasks per upload.
    pub workers: usize,
    /// Bound on rejection-and-retry attempts when `rand2` collides with
    /// `rand1` (spec section 4.2, step 2: "up to a small bound").
    pub max_rand2_retries: u32,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_rand2_retries: 8,
        }
    }
}
