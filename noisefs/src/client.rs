//! The facade applications embed (spec section 4.5): `upload`, `download`,
//! and `verify` over a `BlockStore` + `Pool` + `Enforcer` + `Mixer`.
//!
//! `upload` walks the `Opened -> Splitting -> Mixing -> Sealing ->
//! Enforcing -> {Committed | Rejected | Failed}` pipeline from spec section
//! 4.5. The states aren't reified as a type: `Committed` is `Ok`,
//! `Rejected` is `Err(ClientError::EnforcementRejected(_))`, and `Failed`
//! is every other `Err` variant. Each transition is logged at debug level,
//! matching how the teacher's `PublicFile`/`PrivateFile` builders narrate
//! their own multi-step writes.

use crate::{ClientError, Config, Enforcer};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use log::debug;
use noisefs_common::{BlockSize, BlockStore, BlockStoreError, Cid};
use noisefs_descriptor::Descriptor;
use noisefs_mixer::{xor_reconstruct, Mixer};
use noisefs_pool::Pool;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// What a successful upload produces: where the descriptor landed, the
/// ratios it was accepted at, and a reuse proof for the caller to keep.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub descriptor_cid: Cid,
    pub reuse_proof: crate::ReuseProof,
    pub report: crate::EnforcementReport,
}

/// Wires a `BlockStore`, `Pool`, `Mixer`, and `Enforcer` together behind
/// the three operations an embedder actually calls.
pub struct Client {
    store: Arc<dyn BlockStore>,
    pool: Arc<Pool>,
    mixer: Mixer,
    enforcer: Enforcer,
}

impl Client {
    pub fn new(store: Arc<dyn BlockStore>, pool: Arc<Pool>, config: Config) -> Self {
        let mixer = Mixer::new(store.clone(), pool.clone(), config.mixer);
        let enforcer = Enforcer::new(pool.clone(), config.policy);
        Self {
            store,
            pool,
            mixer,
            enforcer,
        }
    }

    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }

    pub fn enforcer(&self) -> &Enforcer {
        &self.enforcer
    }

    /// Splits `reader` into `block_size`-sized blocks (zero-padding the
    /// last one), mixes each against two pool randomizers, seals the
    /// result into a `Descriptor`, and runs it through the enforcer.
    ///
    /// Cancellation is checked between pipeline stages rather than inside
    /// the mixing loop itself: a cancelled upload may still leave
    /// orphaned anonymized blocks in the store (harmless, per spec section
    /// 4.1's orphan-block tolerance), but it never reaches `Enforcing`, so
    /// it can never mutate the association registry or audit log.
    pub async fn upload<R>(
        &self,
        mut reader: R,
        filename: String,
        block_size: BlockSize,
        cancellation: &CancellationToken,
    ) -> Result<UploadOutcome, ClientError>
    where
        R: AsyncRead + Unpin + Send,
    {
        debug!("upload {filename}: Opened");
        if cancellation.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        debug!("upload {filename}: Splitting");
        let mut hasher = Sha256::new();
        let mut blocks = Vec::new();
        let mut file_size: u64 = 0;

        loop {
            let mut buf = BytesMut::zeroed(block_size.get());
            let mut filled = 0usize;
            while filled < buf.len() {
                let n = reader
                    .read(&mut buf[filled..])
                    .await
                    .map_err(|e| ClientError::Io(e.to_string()))?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            if filled == 0 {
                break;
            }
            hasher.update(&buf[..filled]);
            file_size += filled as u64;
            blocks.push(buf.freeze());
            if filled < block_size.get() {
                break;
            }
        }
        let file_hash = hex::encode(hasher.finalize());

        debug!("upload {filename}: Mixing ({} block(s))", blocks.len());
        let triples = self
            .mixer
            .mix_file(blocks, block_size, self.enforcer.policy().min_public_domain_ratio)
            .await?;

        if cancellation.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        debug!("upload {filename}: Sealing");
        let descriptor = Descriptor::new(filename.clone(), file_size, block_size, chrono::Utc::now(), triples)?;
        let encoded = descriptor.encode();
        let (descriptor_cid, _) = self.store.put(Bytes::from(encoded)).await?;

        if cancellation.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        debug!("upload {filename}: Enforcing");
        match self.enforcer.enforce(&descriptor, &descriptor_cid, &file_hash) {
            Ok(report) => {
                let reuse_proof = self.enforcer.reuse_proof(&descriptor, &file_hash);
                debug!("upload {filename}: Committed as {descriptor_cid}");
                Ok(UploadOutcome {
                    descriptor_cid,
                    reuse_proof,
                    report,
                })
            }
            Err(rejected) => {
                debug!("upload {filename}: Rejected ({} violation(s))", rejected.violations.len());
                Err(ClientError::EnforcementRejected(rejected))
            }
        }
    }

    /// Fetches the descriptor at `descriptor_cid`, then a stream of
    /// reconstructed chunks in file order: for each triple, `dataCID`,
    /// `rand1CID`, and `rand2CID` are fetched concurrently (bounded by
    /// `mixer.workers`, spec section 4.3), XORed back together, and
    /// trailing zero padding is trimmed from the final chunk. A chunk that
    /// fails to reconstruct ends the stream with an error; chunks already
    /// yielded before it stand, matching spec section 7's "a failed
    /// download emits partial bytes up to the failure point".
    pub async fn download_stream(
        &self,
        descriptor_cid: &Cid,
    ) -> Result<(Descriptor, impl Stream<Item = Result<Bytes, ClientError>> + '_), ClientError> {
        let raw = self.store.get(descriptor_cid).await.map_err(|e| match e {
            BlockStoreError::NotFound(_) => ClientError::DescriptorNotFound(descriptor_cid.clone()),
            other => ClientError::BlockStore(other),
        })?;
        let descriptor = Descriptor::decode(&raw)?;

        let block_size = descriptor.block_size.get();
        let last_index = descriptor.triples.len().saturating_sub(1);
        let last_block_len = descriptor.file_size - (last_index as u64) * block_size as u64;

        let workers = self.mixer_workers();
        let triples = descriptor.triples.clone();
        let stream = stream::iter(triples.into_iter().enumerate())
            .map(move |(index, triple)| async move {
                let (data, r1, r2) = futures::try_join!(
                    self.fetch_checked(&triple.data_cid, block_size),
                    self.fetch_checked(&triple.rand1_cid, block_size),
                    self.fetch_checked(&triple.rand2_cid, block_size)
                )?;

                let mut recovered = xor_reconstruct(&data, &r1, &r2);
                if index == last_index {
                    recovered.truncate(last_block_len as usize);
                }
                Ok(Bytes::from(recovered))
            })
            .buffered(workers.max(1));

        Ok((descriptor, stream))
    }

    /// Convenience wrapper over [`Client::download_stream`] that collects
    /// the whole file into memory.
    pub async fn download(&self, descriptor_cid: &Cid) -> Result<Bytes, ClientError> {
        let (_descriptor, stream) = self.download_stream(descriptor_cid).await?;
        let chunks: Vec<Bytes> = stream.try_collect().await?;
        let mut out = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in chunks {
            out.extend_from_slice(&chunk);
        }
        Ok(out.freeze())
    }

    /// Re-runs enforcement against an already-committed descriptor without
    /// mutating the registry or audit log (spec section 4.5). The file
    /// hash is recovered from the descriptor's own accepted audit entry,
    /// since `Verify` is only ever called with a descriptor CID.
    pub async fn verify(&self, descriptor_cid: &Cid) -> Result<Vec<crate::Violation>, ClientError> {
        let raw = self.store.get(descriptor_cid).await.map_err(|e| match e {
            BlockStoreError::NotFound(_) => ClientError::DescriptorNotFound(descriptor_cid.clone()),
            other => ClientError::BlockStore(other),
        })?;
        let descriptor = Descriptor::decode(&raw)?;

        let file_hash = self
            .enforcer
            .file_hash_for_descriptor(descriptor_cid)
            .ok_or_else(|| ClientError::DescriptorNotFound(descriptor_cid.clone()))?;

        Ok(self.enforcer.verify(&descriptor, &file_hash))
    }

    async fn fetch_checked(&self, cid: &Cid, expected_len: usize) -> Result<Bytes, ClientError> {
        let bytes = self
            .store
            .get(cid)
            .await
            .map_err(|_| ClientError::BlockMissing { cid: cid.clone() })?;
        if bytes.len() != expected_len {
            return Err(ClientError::SizeMismatch {
                cid: cid.clone(),
                expected: expected_len,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }

    fn mixer_workers(&self) -> usize {
        // Download reuses the mixer's worker bound (spec section 6:
        // `mixer.workers` governs concurrency for both directions).
        self.mixer.config().workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReusePolicy;
    use chrono::Duration;
    use proptest::prelude::*;
    use noisefs_common::MemoryBlockStore;
    use noisefs_pool::{BootstrapDataset, PoolConfig};
    use std::io::Cursor;

    async fn client_with(policy: ReusePolicy) -> Client {
        let store: Arc<dyn BlockStore> = Arc::new(MemoryBlockStore::new());
        let pool = Arc::new(Pool::with_seed(
            store.clone(),
            PoolConfig {
                min_pool_size_per_size: 16,
                max_pool_size_per_size: 256,
                public_domain_ratio: 0.5,
            },
            99,
        ));
        pool.initialize(&[BootstrapDataset::new("sample", vec![9u8; 65_536 * 20])])
            .await
            .unwrap();

        let mut config = Config::default();
        config.policy = policy;
        Client::new(store, pool, config)
    }

    fn permissive_bootstrap_policy() -> ReusePolicy {
        ReusePolicy {
            min_reuse_per_block: 2,
            min_public_domain_ratio: 0.30,
            min_reuse_ratio_overall: 0.0,
            bootstrap_window: crate::BootstrapWindow {
                duration: Duration::hours(24),
                descriptor_count: 1000,
            },
        }
    }

    #[tokio::test]
    async fn round_trips_a_small_upload_through_bootstrap() {
        let client = client_with(permissive_bootstrap_policy()).await;
        let size = BlockSize::new(65_536).unwrap();
        let data = vec![42u8; 10_000];
        let token = CancellationToken::new();

        let outcome = client
            .upload(Cursor::new(data.clone()), "note.txt".to_string(), size, &token)
            .await
            .unwrap();

        let downloaded = client.download(&outcome.descriptor_cid).await.unwrap();
        assert_eq!(downloaded.to_vec(), data);
        assert!(outcome.reuse_proof.verify());
    }

    #[tokio::test]
    async fn round_trips_a_multi_block_upload() {
        let client = client_with(permissive_bootstrap_policy()).await;
        let size = BlockSize::new(65_536).unwrap();
        let data: Vec<u8> = (0..size.get() * 3 + 123).map(|i| (i % 251) as u8).collect();
        let token = CancellationToken::new();

        let outcome = client
            .upload(Cursor::new(data.clone()), "movie.bin".to_string(), size, &token)
            .await
            .unwrap();

        let downloaded = client.download(&outcome.descriptor_cid).await.unwrap();
        assert_eq!(downloaded.to_vec(), data);
    }

    #[tokio::test]
    async fn rejects_uploads_outside_the_bootstrap_window_without_reuse() {
        let policy = ReusePolicy {
            min_reuse_per_block: 2,
            min_public_domain_ratio: 0.30,
            min_reuse_ratio_overall: 0.80,
            bootstrap_window: crate::BootstrapWindow {
                duration: Duration::seconds(0),
                descriptor_count: 0,
            },
        };
        let client = client_with(policy).await;
        let size = BlockSize::new(65_536).unwrap();
        let data = vec![1u8; 1_000];
        let token = CancellationToken::new();

        let err = client
            .upload(Cursor::new(data), "file.bin".to_string(), size, &token)
            .await
            .unwrap_err();

        assert!(err.violations().is_some());
    }

    #[tokio::test]
    async fn verify_reports_no_violations_for_a_freshly_committed_descriptor() {
        let client = client_with(permissive_bootstrap_policy()).await;
        let size = BlockSize::new(65_536).unwrap();
        let token = CancellationToken::new();

        let outcome = client
            .upload(Cursor::new(vec![5u8; 500]), "a.bin".to_string(), size, &token)
            .await
            .unwrap();

        let violations = client.verify(&outcome.descriptor_cid).await.unwrap();
        assert!(violations.is_empty());
    }

    #[tokio::test]
    async fn download_fails_when_a_referenced_randomizer_goes_missing() {
        let client = client_with(permissive_bootstrap_policy()).await;
        let size = BlockSize::new(65_536).unwrap();
        let token = CancellationToken::new();

        let outcome = client
            .upload(Cursor::new(vec![7u8; 2_000]), "b.bin".to_string(), size, &token)
            .await
            .unwrap();

        let raw = client.store.get(&outcome.descriptor_cid).await.unwrap();
        let descriptor = Descriptor::decode(&raw).unwrap();
        let corrupt_cid = descriptor.triples[0].rand1_cid.clone();
        client.store.delete(&corrupt_cid).await.unwrap();
        client
            .store
            .put(Bytes::from(vec![0u8; size.get() - 1]))
            .await
            .unwrap();

        let result = client.download(&outcome.descriptor_cid).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn upload_observes_a_pre_cancelled_token() {
        let client = client_with(permissive_bootstrap_policy()).await;
        let size = BlockSize::new(65_536).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let err = client
            .upload(Cursor::new(vec![1u8; 100]), "c.bin".to_string(), size, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(8))]

        /// Spec section 8's round-trip property: `Download(Upload(bytes,
        /// name, blockSize).descriptorCID) == bytes`, for arbitrary byte
        /// lengths under bootstrap-window policy so every draw is accepted.
        /// `fileSize` is spec-required to be positive (descriptor.rs), so
        /// the empty-input case is excluded rather than asserted against.
        #[test]
        fn upload_then_download_recovers_the_original_bytes(len in 1usize..200_000) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let client = client_with(permissive_bootstrap_policy()).await;
                let size = BlockSize::new(65_536).unwrap();
                let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
                let token = CancellationToken::new();

                let outcome = client
                    .upload(Cursor::new(data.clone()), "roundtrip.bin".to_string(), size, &token)
                    .await
                    .unwrap();
                let downloaded = client.download(&outcome.descriptor_cid).await.unwrap();
                assert_eq!(downloaded.to_vec(), data);
            });
        }
    }
}
