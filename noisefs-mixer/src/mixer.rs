use crate::{positions::public_domain_positions, MixerConfig, MixerError};
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;
use noisefs_common::{BlockSize, BlockStore, Triple};
use noisefs_pool::Pool;
use std::sync::Arc;

/// Produces the XOR anonymization of file blocks against two randomizers
/// each, enforcing the minimum public-domain participation ratio across a
/// whole file (spec section 4.2).
pub struct Mixer {
    store: Arc<dyn BlockStore>,
    pool: Arc<Pool>,
    config: MixerConfig,
}

impl Mixer {
    pub fn new(store: Arc<dyn BlockStore>, pool: Arc<Pool>, config: MixerConfig) -> Self {
        Self { store, pool, config }
    }

    pub fn config(&self) -> MixerConfig {
        self.config
    }

    /// Mixes every block of one file, distributing `min_public_domain_ratio`
    /// worth of public-domain rand1 slots evenly across the sequence.
    /// Blocks may be mixed concurrently (bounded by `mixer.workers`), but
    /// the returned triples are always in original file-block order.
    pub async fn mix_file(
        &self,
        blocks: Vec<Bytes>,
        size: BlockSize,
        min_public_domain_ratio: f64,
    ) -> Result<Vec<Triple>, MixerError> {
        let n = blocks.len();
        let positions = public_domain_positions(n, min_public_domain_ratio);
        let workers = self.config.workers.max(1);

        let mut indexed = stream::iter(blocks.into_iter().enumerate())
            .map(|(index, block)| {
                let want_public_domain = positions.contains(&index);
                async move {
                    let triple = self.mix_block(block, size, want_public_domain).await?;
                    Ok::<_, MixerError>((index, triple))
                }
            })
            .buffer_unordered(workers)
            .try_collect::<Vec<_>>()
            .await?;

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, triple)| triple).collect())
    }

    /// Mixes a single block, emitting its `(dataCID, rand1CID, rand2CID)`
    /// triple (spec section 4.2, steps 1-6).
    pub async fn mix_block(
        &self,
        block: Bytes,
        size: BlockSize,
        want_public_domain: bool,
    ) -> Result<Triple, MixerError> {
        let rand1 = if want_public_domain {
            self.pool.get_public_domain_randomizer(size)?
        } else {
            self.pool.get_randomizer(size)?
        };

        let mut attempts = 0u32;
        let rand2 = loop {
            let candidate = self.pool.get_randomizer(size)?;
            if candidate.cid != rand1.cid {
                break candidate;
            }
            attempts += 1;
            if attempts >= self.config.max_rand2_retries {
                return Err(MixerError::NoDistinctSecondRandomizer {
                    size: size.get(),
                    attempts,
                });
            }
        };

        let (rand1_bytes, rand2_bytes) =
            futures::try_join!(self.store.get(&rand1.cid), self.store.get(&rand2.cid))?;

        let anonymized = xor3(&block, &rand1_bytes, &rand2_bytes);
        let (data_cid, _) = self.store.put(Bytes::from(anonymized)).await?;

        debug!(
            "mixed block of size {} against {} and {}",
            size, rand1.cid, rand2.cid
        );

        Ok(Triple {
            data_cid,
            rand1_cid: rand1.cid,
            rand2_cid: rand2.cid,
        })
    }
}

/// `a XOR b XOR c`, byte-wise. All three inputs are required to be the same
/// length (every block in the system is exactly one of the supported
/// sizes); panics otherwise since this is an internal invariant, not
/// something caller-supplied data can violate.
fn xor3(a: &[u8], b: &[u8], c: &[u8]) -> Vec<u8> {
    assert_eq!(a.len(), b.len());
    assert_eq!(a.len(), c.len());
    a.iter()
        .zip(b.iter())
        .zip(c.iter())
        .map(|((x, y), z)| x ^ y ^ z)
        .collect()
}

/// Recovers a file block from its anonymized bytes and the two randomizers
/// XORed into it. XOR is its own inverse, so this is the same operation as
/// `xor3` used for mixing; exposed separately under the reconstruction name
/// the download path reasons about.
pub fn xor_reconstruct(data: &[u8], rand1: &[u8], rand2: &[u8]) -> Vec<u8> {
    xor3(data, rand1, rand2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use noisefs_common::MemoryBlockStore;
    use noisefs_pool::{BootstrapDataset, PoolConfig};
    use std::collections::HashSet;

    async fn mixer_with_pool(min_pool_size: usize) -> (Mixer, Arc<Pool>) {
        let store: Arc<dyn BlockStore> = Arc::new(MemoryBlockStore::new());
        let pool = Arc::new(Pool::with_seed(
            store.clone(),
            PoolConfig {
                min_pool_size_per_size: min_pool_size,
                max_pool_size_per_size: min_pool_size * 4,
                public_domain_ratio: 0.5,
            },
            1234,
        ));
        pool.initialize(&[BootstrapDataset::new("sample", vec![7u8; 65_536 * 20])])
            .await
            .unwrap();
        let mixer = Mixer::new(store, pool.clone(), MixerConfig::default());
        (mixer, pool)
    }

    #[tokio::test]
    async fn xor_of_triple_reconstructs_the_original_block() {
        let (mixer, _pool) = mixer_with_pool(8).await;
        let size = BlockSize::new(65_536).unwrap();
        let block = Bytes::from(vec![0xABu8; size.get()]);

        let triple = mixer.mix_block(block.clone(), size, false).await.unwrap();

        let data = mixer.store.get(&triple.data_cid).await.unwrap();
        let r1 = mixer.store.get(&triple.rand1_cid).await.unwrap();
        let r2 = mixer.store.get(&triple.rand2_cid).await.unwrap();

        let recovered = xor_reconstruct(&data, &r1, &r2);
        assert_eq!(recovered, block.to_vec());
    }

    #[tokio::test]
    async fn mix_file_preserves_block_order_under_concurrency() {
        let (mixer, _pool) = mixer_with_pool(16).await;
        let size = BlockSize::new(65_536).unwrap();
        let blocks: Vec<Bytes> = (0..10u8)
            .map(|i| Bytes::from(vec![i; size.get()]))
            .collect();

        let triples = mixer.mix_file(blocks.clone(), size, 0.3).await.unwrap();
        assert_eq!(triples.len(), blocks.len());

        for (block, triple) in blocks.iter().zip(triples.iter()) {
            let data = mixer.store.get(&triple.data_cid).await.unwrap();
            let r1 = mixer.store.get(&triple.rand1_cid).await.unwrap();
            let r2 = mixer.store.get(&triple.rand2_cid).await.unwrap();
            assert_eq!(xor_reconstruct(&data, &r1, &r2), block.to_vec());
        }
    }

    #[tokio::test]
    async fn mix_file_meets_the_public_domain_ratio() {
        let (mixer, pool) = mixer_with_pool(16).await;
        let size = BlockSize::new(65_536).unwrap();
        let blocks: Vec<Bytes> = (0..10u8)
            .map(|i| Bytes::from(vec![i; size.get()]))
            .collect();

        let triples = mixer.mix_file(blocks, size, 0.5).await.unwrap();
        let public_domain_count = triples
            .iter()
            .filter(|t| pool.is_public_domain(&t.rand1_cid) || pool.is_public_domain(&t.rand2_cid))
            .count();
        assert!(public_domain_count as f64 / triples.len() as f64 >= 0.5);
    }

    #[tokio::test]
    async fn rand1_and_rand2_are_never_the_same_block() {
        let (mixer, _pool) = mixer_with_pool(16).await;
        let size = BlockSize::new(65_536).unwrap();
        let block = Bytes::from(vec![3u8; size.get()]);
        let triple = mixer.mix_block(block, size, false).await.unwrap();
        assert_ne!(triple.rand1_cid, triple.rand2_cid);

        let mut seen = HashSet::new();
        seen.insert(triple.rand1_cid.clone());
        seen.insert(triple.rand2_cid.clone());
        assert_eq!(seen.len(), 2);
    }
}
