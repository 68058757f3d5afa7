use noisefs_common::Cid;

/// One randomizer CID and the other files that also reference it, as of
/// the moment the proof was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReuseProofEntry {
    pub cid: Cid,
    pub shared_with: Vec<String>,
}

/// A tamper-evidence record for a file's reuse story (spec section 4.4:
/// "on demand... signed with a cryptographic hash of its contents... a
/// digital signature is future work"). The `seal` is that hash; it is not
/// a signature and makes no authenticity claim about who produced it, only
/// that its contents haven't been altered since.
#[derive(Debug, Clone, PartialEq)]
pub struct ReuseProof {
    pub file_hash: String,
    pub entries: Vec<ReuseProofEntry>,
    pub seal: [u8; 32],
}

impl ReuseProof {
    pub fn new(file_hash: String, entries: Vec<ReuseProofEntry>) -> Self {
        let seal = compute_seal(&file_hash, &entries);
        Self {
            file_hash,
            entries,
            seal,
        }
    }

    /// Recomputes the seal and checks it against the stored one.
    pub fn verify(&self) -> bool {
        compute_seal(&self.file_hash, &self.entries) == self.seal
    }
}

fn compute_seal(file_hash: &str, entries: &[ReuseProofEntry]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(file_hash.as_bytes());
    for entry in entries {
        hasher.update(entry.cid.as_str().as_bytes());
        for shared in &entry.shared_with {
            hasher.update(shared.as_bytes());
        }
    }
    *hasher.finalize().as_bytes()
}
