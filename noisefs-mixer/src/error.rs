use noisefs_common::BlockStoreError;
use noisefs_pool::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MixerError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    BlockStore(#[from] BlockStoreError),

    /// Rejection-and-retry for a colliding `rand2` exhausted its bound
    /// (spec section 4.2, step 2). Vanishingly unlikely against a pool of
    /// the configured minimum size; surfaced rather than looped forever.
    #[error("could not find a distinct second randomizer for size {size} after {attempts} attempts")]
    NoDistinctSecondRandomizer { size: usize, attempts: u32 },
}
