use crate::{
    genesis::genesis_block_bytes, BlockSource, BootstrapDataset, PoolBlock, PoolConfig, PoolError,
    PoolStats, SizeStats, UnderpopulatedReason,
};
use bytes::Bytes;
use chrono::Utc;
use log::{debug, warn};
use noisefs_common::{BlockSize, BlockStore, Cid};
use parking_lot::Mutex;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;

/// The size-classed inventory of randomizer blocks (spec section 4.1).
///
/// Exactly one lock guards the indices; selection and counter updates
/// happen under it, and block bytes are always fetched from the
/// `BlockStore` after the lock is released (spec section 5: "Pool...
/// MUST NOT perform I/O while holding the lock").
pub struct Pool {
    store: Arc<dyn BlockStore>,
    config: PoolConfig,
    inner: Mutex<Inner>,
    rng: Mutex<ChaCha20Rng>,
}

struct Inner {
    initialized: bool,
    by_size: HashMap<usize, Vec<String>>,
    public_domain_by_size: HashMap<usize, Vec<String>>,
    blocks: HashMap<String, PoolBlock>,
}

impl Inner {
    fn new() -> Self {
        Self {
            initialized: false,
            by_size: HashMap::new(),
            public_domain_by_size: HashMap::new(),
            blocks: HashMap::new(),
        }
    }
}

impl Pool {
    /// Creates a pool backed by `store`, seeding its selection RNG from
    /// the OS. Call [`Pool::initialize`] before use.
    pub fn new(store: Arc<dyn BlockStore>, config: PoolConfig) -> Self {
        Self {
            store,
            config,
            inner: Mutex::new(Inner::new()),
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Creates a pool whose selection RNG is seeded deterministically.
    /// Intended for tests that need reproducible randomizer choices.
    pub fn with_seed(store: Arc<dyn BlockStore>, config: PoolConfig, seed: u64) -> Self {
        Self {
            store,
            config,
            inner: Mutex::new(Inner::new()),
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    /// Idempotent. Generates `minPoolSizePerSize/2` genesis blocks per
    /// supported size, ingests any bootstrap datasets, and fails with
    /// [`PoolError::Underpopulated`] if the result doesn't meet the
    /// configured minimums.
    pub async fn initialize(&self, datasets: &[BootstrapDataset]) -> Result<(), PoolError> {
        {
            let inner = self.inner.lock();
            if inner.initialized {
                return Ok(());
            }
        }

        for size in BlockSize::all() {
            let genesis_count = self.config.min_pool_size_per_size / 2;
            for index in 0..genesis_count as u64 {
                let bytes = genesis_block_bytes(size.get(), index);
                self.register(Bytes::from(bytes), true, BlockSource::Genesis, HashMap::new())
                    .await?;
            }
        }

        for dataset in datasets {
            self.ingest_bootstrap_dataset(dataset).await?;
        }

        self.check_populated()?;
        self.inner.lock().initialized = true;
        debug!("pool initialized with {} bootstrap datasets", datasets.len());
        Ok(())
    }

    async fn ingest_bootstrap_dataset(&self, dataset: &BootstrapDataset) -> Result<(), PoolError> {
        for size in BlockSize::all() {
            let chunk_size = size.get();
            let mut offset = 0usize;
            while offset < dataset.content.len() {
                let end = (offset + chunk_size).min(dataset.content.len());
                let mut chunk = dataset.content[offset..end].to_vec();
                if chunk.len() < chunk_size {
                    chunk.resize(chunk_size, 0);
                }
                let mut metadata = HashMap::new();
                metadata.insert("dataset".to_string(), dataset.name.clone());
                self.register(Bytes::from(chunk), true, BlockSource::Bootstrap, metadata)
                    .await?;
                offset = end;
            }
        }
        Ok(())
    }

    fn check_populated(&self) -> Result<(), PoolError> {
        let inner = self.inner.lock();
        for size in BlockSize::all() {
            let have = inner
                .by_size
                .get(&size.get())
                .map(Vec::len)
                .unwrap_or_default();
            if have < self.config.min_pool_size_per_size {
                return Err(PoolError::Underpopulated {
                    size: size.get(),
                    reason: UnderpopulatedReason::TooFewBlocks {
                        have,
                        need: self.config.min_pool_size_per_size,
                    },
                });
            }

            let pd_have = inner
                .public_domain_by_size
                .get(&size.get())
                .map(Vec::len)
                .unwrap_or_default();
            let fraction = pd_have as f64 / have as f64;
            if fraction < self.config.public_domain_ratio {
                return Err(PoolError::Underpopulated {
                    size: size.get(),
                    reason: UnderpopulatedReason::InsufficientPublicDomainFraction {
                        have: fraction,
                        need: self.config.public_domain_ratio,
                    },
                });
            }
        }
        Ok(())
    }

    /// Puts `bytes` into the backing store and records a [`PoolBlock`] for
    /// it. Idempotent on CID collision: an already-registered block never
    /// has `is_public_domain` downgraded or `source` overwritten.
    pub async fn register(
        &self,
        bytes: Bytes,
        is_public_domain: bool,
        source: BlockSource,
        metadata: HashMap<String, String>,
    ) -> Result<Cid, PoolError> {
        let size = BlockSize::new(bytes.len())?;

        let (cid, was_newly_stored) = self.store.put(bytes).await?;

        let mut inner = self.inner.lock();
        if inner.blocks.contains_key(cid.as_str()) {
            return Ok(cid);
        }

        let _ = was_newly_stored; // pool metadata is keyed by CID regardless of store novelty
        inner
            .by_size
            .entry(size.get())
            .or_default()
            .push(cid.as_str().to_string());
        if is_public_domain {
            inner
                .public_domain_by_size
                .entry(size.get())
                .or_default()
                .push(cid.as_str().to_string());
        }
        inner.blocks.insert(
            cid.as_str().to_string(),
            PoolBlock::new(cid.clone(), size, is_public_domain, source, metadata),
        );

        Ok(cid)
    }

    /// Uniform-random pick from all blocks of `size`. Updates `usageCount`
    /// and `lastUsed` under the pool's exclusive lock.
    pub fn get_randomizer(&self, size: BlockSize) -> Result<PoolBlock, PoolError> {
        let mut inner = self.inner.lock();
        let candidates = inner.by_size.get(&size.get()).cloned().unwrap_or_default();
        if candidates.is_empty() {
            return Err(PoolError::Underpopulated {
                size: size.get(),
                reason: UnderpopulatedReason::TooFewBlocks { have: 0, need: 1 },
            });
        }

        let pick = {
            let mut rng = self.rng.lock();
            candidates[rng.gen_range(0..candidates.len())].clone()
        };

        let block = inner.blocks.get_mut(&pick).expect("index and map agree");
        block.usage_count += 1;
        block.last_used = Some(Utc::now());
        Ok(block.clone())
    }

    /// Uniform-random pick from the public-domain subset of `size`.
    pub fn get_public_domain_randomizer(&self, size: BlockSize) -> Result<PoolBlock, PoolError> {
        let mut inner = self.inner.lock();
        let candidates = inner
            .public_domain_by_size
            .get(&size.get())
            .cloned()
            .unwrap_or_default();
        if candidates.is_empty() {
            return Err(PoolError::NoPublicDomainAvailable { size: size.get() });
        }

        let pick = {
            let mut rng = self.rng.lock();
            candidates[rng.gen_range(0..candidates.len())].clone()
        };

        let block = inner.blocks.get_mut(&pick).expect("index and map agree");
        block.usage_count += 1;
        block.last_used = Some(Utc::now());
        Ok(block.clone())
    }

    pub fn is_public_domain(&self, cid: &Cid) -> bool {
        self.inner
            .lock()
            .blocks
            .get(cid.as_str())
            .map(|b| b.is_public_domain)
            .unwrap_or(false)
    }

    pub fn lookup(&self, cid: &Cid) -> Option<PoolBlock> {
        self.inner.lock().blocks.get(cid.as_str()).cloned()
    }

    /// A read-only snapshot of per-size population, for operators and
    /// tests to assert section 8's pool invariants.
    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.lock();
        let mut by_size = HashMap::new();
        for size in BlockSize::all() {
            let total = inner
                .by_size
                .get(&size.get())
                .map(Vec::len)
                .unwrap_or_default();
            let public_domain = inner
                .public_domain_by_size
                .get(&size.get())
                .map(Vec::len)
                .unwrap_or_default();
            by_size.insert(size.get(), SizeStats { total, public_domain });
        }
        PoolStats { by_size }
    }

    /// Whether `initialize` has completed successfully.
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noisefs_common::MemoryBlockStore;

    fn pool() -> Pool {
        Pool::with_seed(
            Arc::new(MemoryBlockStore::new()),
            PoolConfig {
                min_pool_size_per_size: 8,
                max_pool_size_per_size: 100,
                public_domain_ratio: 0.5,
            },
            42,
        )
    }

    #[tokio::test]
    async fn initialize_populates_every_size_with_genesis_blocks() {
        let pool = pool();
        pool.initialize(&[]).await.unwrap();

        for size in BlockSize::all() {
            let stats = pool.stats();
            let s = &stats.by_size[&size.get()];
            assert!(s.total >= 8);
            assert_eq!(s.public_domain, s.total, "genesis blocks are all public-domain");
        }
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let pool = pool();
        pool.initialize(&[]).await.unwrap();
        let before = pool.stats();
        pool.initialize(&[]).await.unwrap();
        let after = pool.stats();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn two_fresh_pools_agree_on_genesis_cids() {
        let pool_a = pool();
        let pool_b = pool();
        pool_a.initialize(&[]).await.unwrap();
        pool_b.initialize(&[]).await.unwrap();

        let size = BlockSize::new(65_536).unwrap();
        let bytes_a = genesis_block_bytes(size.get(), 0);
        let bytes_b = genesis_block_bytes(size.get(), 0);
        assert_eq!(bytes_a, bytes_b);
    }

    #[tokio::test]
    async fn get_randomizer_updates_usage_count() {
        let pool = pool();
        pool.initialize(&[]).await.unwrap();
        let size = BlockSize::new(65_536).unwrap();
        let block = pool.get_randomizer(size).unwrap();
        assert_eq!(block.usage_count, 1);
        let block = pool.lookup(&block.cid).unwrap();
        assert_eq!(block.usage_count, 1);
    }

    #[tokio::test]
    async fn get_randomizer_on_empty_size_fails() {
        let pool = pool();
        let size = BlockSize::new(65_536).unwrap();
        assert!(pool.get_randomizer(size).is_err());
    }

    #[tokio::test]
    async fn underpopulated_pool_fails_initialize() {
        let pool = Pool::with_seed(
            Arc::new(MemoryBlockStore::new()),
            PoolConfig {
                min_pool_size_per_size: 1000,
                max_pool_size_per_size: 2000,
                public_domain_ratio: 0.5,
            },
            1,
        );
        // genesis_count = min/2 = 500, still short of 1000 required.
        assert!(pool.initialize(&[]).await.is_err());
    }

    #[tokio::test]
    async fn register_is_idempotent_on_cid_collision() {
        let pool = pool();
        let bytes = Bytes::from(vec![7u8; 65_536]);
        let cid1 = pool
            .register(bytes.clone(), true, BlockSource::Harvested, HashMap::new())
            .await
            .unwrap();
        let cid2 = pool
            .register(bytes, false, BlockSource::Harvested, HashMap::new())
            .await
            .unwrap();
        assert_eq!(cid1, cid2);
        // is_public_domain was not downgraded from true to false
        assert!(pool.is_public_domain(&cid1));
    }

    #[tokio::test]
    async fn bootstrap_dataset_is_registered_as_public_domain() {
        let pool = pool();
        let dataset = BootstrapDataset::new("gutenberg-sample", vec![b'x'; 65_536 * 3]);
        pool.initialize(std::slice::from_ref(&dataset)).await.unwrap();

        let size = BlockSize::new(65_536).unwrap();
        let stats = pool.stats();
        // genesis (4) + 3 bootstrap blocks of this size, all public domain.
        assert!(stats.by_size[&size.get()].public_domain >= 3);
    }
}
