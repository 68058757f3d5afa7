//! The `BlockStore` capability NoiseFS consumes rather than implements
//! (spec section 1: "deliberately out of scope... the core consumes a
//! `BlockStore` capability"). This module carries only the trait and a
//! minimal in-memory implementation used by the rest of the workspace's
//! tests and doctests; a production deployment swaps in a real
//! content-addressed store at configuration time (spec section 9:
//! "Implementations are swapped at configuration time, not runtime").

use crate::{BlockStoreError, Cid, CidValidator, DefaultCidValidator};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The maximum block size the store will accept, one past the largest
/// entry in [`crate::SUPPORTED_BLOCK_SIZES`]. Guards against a careless
/// caller handing the store a near-unbounded buffer.
pub const MAX_BLOCK_SIZE: usize = 1_048_576;

/// For types that implement content-addressed Put/Get/Has/Delete/Pin over
/// opaque byte blocks and assign their own stable CIDs.
///
/// Implementations are assumed thread-safe by contract (spec section 5:
/// "BlockStore: assumed thread-safe by contract"); `Pin` is an optional
/// capability some backends lack, so it defaults to a no-op rather than
/// being required.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Stores `bytes`, returning its CID and whether this was the first
    /// time these bytes were seen by the store.
    async fn put(&self, bytes: Bytes) -> Result<(Cid, bool), BlockStoreError>;

    /// Fetches the bytes addressed by `cid`.
    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError>;

    /// Whether `cid` is currently resolvable.
    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError>;

    /// Removes `cid`. Best-effort / a no-op on pinning stores that never
    /// forget content.
    async fn delete(&self, cid: &Cid) -> Result<(), BlockStoreError>;

    /// Requests the store retain `cid` indefinitely. Optional capability;
    /// the default implementation is a no-op.
    async fn pin(&self, _cid: &Cid) -> Result<(), BlockStoreError> {
        Ok(())
    }

    /// Whether this store implements `pin` meaningfully.
    fn supports_pin(&self) -> bool {
        false
    }
}

/// An in-memory block store keyed by the blake3 hash of its contents.
///
/// Useful for tests and for embedding NoiseFS in a process that doesn't
/// need durability. Equal bytes always produce equal CIDs, satisfying the
/// content-addressing contract in section 6.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<String, Bytes>>,
    validator: Arc<dyn CidValidator>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            validator: Arc::new(DefaultCidValidator),
        }
    }

    pub fn with_validator(validator: Arc<dyn CidValidator>) -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            validator,
        }
    }

    fn cid_for(&self, bytes: &[u8]) -> Cid {
        let hash = blake3::hash(bytes);
        Cid::trusted(hash.to_hex().to_string())
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put(&self, bytes: Bytes) -> Result<(Cid, bool), BlockStoreError> {
        if bytes.len() > MAX_BLOCK_SIZE {
            return Err(BlockStoreError::OversizedBlock { len: bytes.len() });
        }

        let cid = self.cid_for(&bytes);
        debug_assert!(self.validator.validate(cid.as_str()));

        let mut blocks = self.blocks.write().await;
        let was_newly_stored = !blocks.contains_key(cid.as_str());
        blocks.entry(cid.as_str().to_string()).or_insert(bytes);
        Ok((cid, was_newly_stored))
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        self.blocks
            .read()
            .await
            .get(cid.as_str())
            .cloned()
            .ok_or_else(|| BlockStoreError::NotFound(cid.as_str().to_string()))
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        Ok(self.blocks.read().await.contains_key(cid.as_str()))
    }

    async fn delete(&self, cid: &Cid) -> Result<(), BlockStoreError> {
        self.blocks.write().await.remove(cid.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryBlockStore::new();
        let (cid, was_new) = store.put(Bytes::from_static(b"hello world")).await.unwrap();
        assert!(was_new);

        let fetched = store.get(&cid).await.unwrap();
        assert_eq!(&fetched[..], b"hello world");
    }

    #[tokio::test]
    async fn equal_bytes_produce_equal_cids() {
        let store = MemoryBlockStore::new();
        let (cid_a, first) = store.put(Bytes::from_static(b"same bytes")).await.unwrap();
        let (cid_b, second) = store.put(Bytes::from_static(b"same bytes")).await.unwrap();
        assert_eq!(cid_a, cid_b);
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn missing_cid_is_not_found() {
        let store = MemoryBlockStore::new();
        let bogus = Cid::trusted("0".repeat(32));
        assert!(matches!(
            store.get(&bogus).await,
            Err(BlockStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn oversized_block_is_rejected() {
        let store = MemoryBlockStore::new();
        let oversized = Bytes::from(vec![0u8; MAX_BLOCK_SIZE + 1]);
        assert!(matches!(
            store.put(oversized).await,
            Err(BlockStoreError::OversizedBlock { .. })
        ));
    }

    #[tokio::test]
    async fn delete_then_has_is_false() {
        let store = MemoryBlockStore::new();
        let (cid, _) = store.put(Bytes::from_static(b"ephemeral")).await.unwrap();
        assert!(store.has(&cid).await.unwrap());
        store.delete(&cid).await.unwrap();
        assert!(!store.has(&cid).await.unwrap());
    }
}
