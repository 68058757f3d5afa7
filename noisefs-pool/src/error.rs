use noisefs_common::{BlockStoreError, UnsupportedBlockSize};
use thiserror::Error;

/// Why a size class failed the post-`initialize` population check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnderpopulatedReason {
    TooFewBlocks { have: usize, need: usize },
    InsufficientPublicDomainFraction { have: f64, need: f64 },
}

#[derive(Debug, Error)]
pub enum PoolError {
    /// Spec section 7's `PoolUnderpopulated`: triggered by `Initialize`'s
    /// post-check, or by selecting a randomizer from an empty size class.
    #[error("pool for size {size} is underpopulated: {reason:?}")]
    Underpopulated {
        size: usize,
        reason: UnderpopulatedReason,
    },

    #[error("no public-domain randomizer available for size {size}")]
    NoPublicDomainAvailable { size: usize },

    #[error(transparent)]
    BlockStore(#[from] BlockStoreError),

    #[error(transparent)]
    UnsupportedBlockSize(#[from] UnsupportedBlockSize),
}
