use noisefs_common::Cid;
use std::collections::{HashMap, HashSet};

/// `cid → set of fileHashes` (spec section 3's association registry).
/// Grows monotonically; entries are never removed. Mutated only by the
/// Enforcer's commit step.
#[derive(Debug, Default)]
pub struct AssociationRegistry {
    associations: HashMap<String, HashSet<String>>,
}

impl AssociationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_hashes(&self, cid: &Cid) -> Option<&HashSet<String>> {
        self.associations.get(cid.as_str())
    }

    /// How many distinct files this CID is currently associated with.
    pub fn reuse_count(&self, cid: &Cid) -> usize {
        self.file_hashes(cid).map_or(0, HashSet::len)
    }

    /// Whether `cid` is already associated with a file other than
    /// `file_hash` — the "reused block" criterion of spec section 4.4.
    pub fn is_reused_by_other(&self, cid: &Cid, file_hash: &str) -> bool {
        self.file_hashes(cid)
            .is_some_and(|hashes| hashes.iter().any(|h| h != file_hash))
    }

    /// Records that `file_hash` references `cid`. Idempotent.
    pub fn associate(&mut self, cid: &Cid, file_hash: &str) {
        self.associations
            .entry(cid.as_str().to_string())
            .or_default()
            .insert(file_hash.to_string());
    }
}
