use crate::{wire::Reader, MalformedDescriptor};
use chrono::{DateTime, TimeZone, Utc};
use noisefs_common::{BlockSize, Cid, Triple};

/// Wire format magic, section 6: `"NFSD"`.
pub const MAGIC: &[u8; 4] = b"NFSD";
/// The only descriptor wire-format version this crate emits or accepts.
pub const CURRENT_VERSION: u8 = 1;

/// The sealed, self-delimited record describing how to reconstruct one
/// file (spec section 3 and 4.3). Immutable once constructed: there is no
/// mutating API, only `new` (which validates) and `decode` (which
/// validates what it parsed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub version: u8,
    pub filename: String,
    pub file_size: u64,
    pub block_size: BlockSize,
    pub created_at: DateTime<Utc>,
    pub triples: Vec<Triple>,
}

impl Descriptor {
    /// Builds and validates a descriptor. `created_at` is stamped by the
    /// caller so that tests (and replays) can control it; production
    /// callers pass `Utc::now()`.
    pub fn new(
        filename: String,
        file_size: u64,
        block_size: BlockSize,
        created_at: DateTime<Utc>,
        triples: Vec<Triple>,
    ) -> Result<Self, MalformedDescriptor> {
        let descriptor = Self {
            version: CURRENT_VERSION,
            filename,
            file_size,
            block_size,
            created_at,
            triples,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// `ceil(fileSize / blockSize)`, the number of triples a valid
    /// descriptor for this file size and block size must have.
    pub fn expected_triple_count(&self) -> u64 {
        self.file_size.div_ceil(self.block_size.get() as u64)
    }

    fn validate(&self) -> Result<(), MalformedDescriptor> {
        if self.filename.is_empty() {
            return Err(MalformedDescriptor("filename must not be empty".to_string()));
        }
        if self.file_size == 0 {
            return Err(MalformedDescriptor("fileSize must be positive".to_string()));
        }

        let expected = self.expected_triple_count();
        if self.triples.len() as u64 != expected {
            return Err(MalformedDescriptor(format!(
                "expected {expected} triples for fileSize={} blockSize={}, got {}",
                self.file_size,
                self.block_size,
                self.triples.len()
            )));
        }

        for triple in &self.triples {
            for cid in [&triple.data_cid, &triple.rand1_cid, &triple.rand2_cid] {
                if cid.as_str().is_empty() {
                    return Err(MalformedDescriptor("triple contains an empty CID".to_string()));
                }
            }
        }

        Ok(())
    }

    /// Canonical byte encoding (spec section 6). Serializing then
    /// deserializing is a round-trip identity, so the descriptor's CID in
    /// the BlockStore is stable.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.push(self.version);

        let filename_bytes = self.filename.as_bytes();
        out.extend_from_slice(&(filename_bytes.len() as u16).to_be_bytes());
        out.extend_from_slice(filename_bytes);

        out.extend_from_slice(&self.file_size.to_be_bytes());
        out.extend_from_slice(&(self.block_size.get() as u32).to_be_bytes());
        out.extend_from_slice(&self.created_at.timestamp().to_be_bytes());

        out.extend_from_slice(&(self.triples.len() as u32).to_be_bytes());
        for triple in &self.triples {
            for cid in [&triple.data_cid, &triple.rand1_cid, &triple.rand2_cid] {
                let bytes = cid.as_str().as_bytes();
                out.push(bytes.len() as u8);
                out.extend_from_slice(bytes);
            }
        }

        out
    }

    /// Parses and validates the canonical byte encoding. Any deviation —
    /// bad magic, wrong version, truncated fields, a triple count that
    /// doesn't match `fileSize`/`blockSize`, an empty CID — yields
    /// [`MalformedDescriptor`].
    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedDescriptor> {
        let mut r = Reader::new(bytes);

        let magic = r.take(4)?;
        if magic != MAGIC {
            return Err(MalformedDescriptor("bad magic bytes".to_string()));
        }

        let version = r.u8()?;
        if version != CURRENT_VERSION {
            return Err(MalformedDescriptor(format!("unsupported version {version}")));
        }

        let filename_len = r.u16()? as usize;
        let filename = r.utf8_string(filename_len)?;

        let file_size = r.u64()?;
        let block_size_raw = r.u32()?;
        let block_size = BlockSize::new(block_size_raw as usize)
            .map_err(|e| MalformedDescriptor(e.to_string()))?;

        let created_at_secs = r.i64()?;
        let created_at = Utc
            .timestamp_opt(created_at_secs, 0)
            .single()
            .ok_or_else(|| MalformedDescriptor("createdAt is not a valid unix timestamp".to_string()))?;

        let triple_count = r.u32()? as usize;
        // Each triple needs at least 3 length-prefix bytes on the wire; reject
        // an obviously-too-large count before allocating so a crafted
        // `tripleCount` can't force a multi-gigabyte `Vec::with_capacity`.
        if triple_count > r.remaining() / 3 {
            return Err(MalformedDescriptor(format!(
                "tripleCount {triple_count} exceeds what the remaining {} byte(s) could encode",
                r.remaining()
            )));
        }
        let mut triples = Vec::with_capacity(triple_count);
        for _ in 0..triple_count {
            let mut cids: Vec<Cid> = Vec::with_capacity(3);
            for _ in 0..3 {
                let len = r.u8()? as usize;
                let raw = r.utf8_string(len)?;
                if raw.is_empty() {
                    return Err(MalformedDescriptor("triple contains an empty CID".to_string()));
                }
                cids.push(Cid::trusted(raw));
            }
            triples.push(Triple {
                data_cid: cids[0].clone(),
                rand1_cid: cids[1].clone(),
                rand2_cid: cids[2].clone(),
            });
        }

        if r.remaining() != 0 {
            return Err(MalformedDescriptor("trailing bytes after the last triple".to_string()));
        }

        let descriptor = Descriptor {
            version,
            filename,
            file_size,
            block_size,
            created_at,
            triples,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
