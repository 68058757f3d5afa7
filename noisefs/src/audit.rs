use crate::Violation;
use chrono::{DateTime, Utc};
use noisefs_common::Cid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditDecision {
    Accepted,
    Rejected,
}

/// One append-only record of an enforcement decision (spec section 3).
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub descriptor_cid: Cid,
    pub file_hash: String,
    pub decision: AuditDecision,
    pub violations: Vec<Violation>,
    pub reuse_ratio: f64,
    pub public_domain_ratio: f64,
}

/// Append-only audit trail. Never truncated, never rewritten.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn for_file_hash<'a>(&'a self, file_hash: &'a str) -> impl Iterator<Item = &'a AuditEntry> {
        self.entries.iter().filter(move |e| e.file_hash == file_hash)
    }
}
