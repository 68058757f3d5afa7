use chrono::{DateTime, Utc};
use noisefs_common::{BlockSize, Cid};
use std::collections::HashMap;

/// Where a [`PoolBlock`] came from. Affects nothing at selection time, but
/// matters for audit and for `Register`'s idempotency rule (a collision
/// never downgrades `is_public_domain` or overwrites `source`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSource {
    /// Deterministically derived from the genesis hash chain.
    Genesis,
    /// Sliced from a named public-domain dataset at `initialize` time.
    Bootstrap,
    /// Adopted from a completed upload's anonymized output.
    Harvested,
}

/// The Pool's metadata record for one block. The bytes themselves live in
/// the `BlockStore`; this is purely bookkeeping.
#[derive(Debug, Clone)]
pub struct PoolBlock {
    pub cid: Cid,
    pub size: BlockSize,
    pub is_public_domain: bool,
    pub source: BlockSource,
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub metadata: HashMap<String, String>,
}

impl PoolBlock {
    pub fn new(
        cid: Cid,
        size: BlockSize,
        is_public_domain: bool,
        source: BlockSource,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            cid,
            size,
            is_public_domain,
            source,
            usage_count: 0,
            created_at: Utc::now(),
            last_used: None,
            metadata,
        }
    }
}

/// A named corpus to slice into blocks and register as public-domain at
/// `Pool::initialize` time (spec section 4.1: "loads bootstrap public-domain
/// blocks from named datasets").
#[derive(Debug, Clone)]
pub struct BootstrapDataset {
    pub name: String,
    pub content: bytes::Bytes,
}

impl BootstrapDataset {
    pub fn new(name: impl Into<String>, content: impl Into<bytes::Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
