use crate::{EnforcementRejected, Violation};
use noisefs_common::{BlockStoreError, Cid};
use noisefs_descriptor::MalformedDescriptor;
use noisefs_mixer::MixerError;
use noisefs_pool::PoolError;
use thiserror::Error;

/// Errors the Client facade's public operations (`upload`, `download`,
/// `verify`) can surface (spec section 4.5 and section 7).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    EnforcementRejected(#[from] EnforcementRejected),

    #[error(transparent)]
    BlockStore(#[from] BlockStoreError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Mixer(#[from] MixerError),

    #[error(transparent)]
    MalformedDescriptor(#[from] MalformedDescriptor),

    #[error("descriptor {0} was not found")]
    DescriptorNotFound(Cid),

    #[error("block {cid} referenced by the descriptor is missing")]
    BlockMissing { cid: Cid },

    #[error("block {cid} has length {actual}, expected {expected}")]
    SizeMismatch {
        cid: Cid,
        expected: usize,
        actual: usize,
    },

    #[error("operation was cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),
}

impl ClientError {
    /// The violations that caused an `EnforcementRejected`, if that's what
    /// this error is.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            ClientError::EnforcementRejected(rejected) => Some(&rejected.violations),
            _ => None,
        }
    }
}
