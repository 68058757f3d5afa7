//! The `BlockStore` error taxonomy (section 7 of the spec).

use thiserror::Error;

/// Errors a [`crate::BlockStore`] implementation may surface. These three
/// kinds are the ones the spec names explicitly; everything else the
/// underlying transport might throw (auth failures, quota errors, ...) is an
/// embedder concern and should be mapped into `Transient` or `Corrupt` at
/// the boundary.
#[derive(Debug, Error)]
pub enum BlockStoreError {
    #[error("block {0} was not found in the store")]
    NotFound(String),

    #[error("block store operation failed transiently: {0}")]
    Transient(String),

    #[error("block {cid} returned corrupt: {reason}")]
    Corrupt { cid: String, reason: String },

    #[error("block exceeds the maximum supported block size ({len} bytes)")]
    OversizedBlock { len: usize },
}
