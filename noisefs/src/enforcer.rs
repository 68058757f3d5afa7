use crate::{
    AssociationRegistry, AuditDecision, AuditEntry, AuditLog, EnforcementRejected, ReusePolicy,
    ReuseProof, ReuseProofEntry, Violation,
};
use chrono::Utc;
use noisefs_common::Cid;
use noisefs_descriptor::Descriptor;
use noisefs_pool::{BlockSource, Pool};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// The ratios an accepted (or verified) descriptor was measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnforcementReport {
    pub reuse_ratio: f64,
    pub public_domain_ratio: f64,
}

struct Ledger {
    registry: AssociationRegistry,
    audit_log: AuditLog,
    descriptors_seen: u64,
}

/// Validates every upload against [`ReusePolicy`] before acceptance, and
/// maintains the block-to-file association registry and audit log (spec
/// section 4.4). A single exclusive lock guards both the registry and the
/// audit log together, so a commit is always serialized against every
/// other enforcement decision (spec section 5: "implementations MAY use a
/// single exclusive lock throughout for simplicity").
pub struct Enforcer {
    pool: Arc<Pool>,
    policy: ReusePolicy,
    ledger: RwLock<Ledger>,
    started_at: chrono::DateTime<Utc>,
}

impl Enforcer {
    /// `started_at` anchors the bootstrap-window clock. Construct the
    /// Enforcer right after `Pool::initialize` completes so the window is
    /// measured from pool initialization, per spec section 4.4.
    pub fn new(pool: Arc<Pool>, policy: ReusePolicy) -> Self {
        Self {
            pool,
            policy,
            ledger: RwLock::new(Ledger {
                registry: AssociationRegistry::new(),
                audit_log: AuditLog::new(),
                descriptors_seen: 0,
            }),
            started_at: Utc::now(),
        }
    }

    /// Validates `descriptor` and, on acceptance, commits its randomizer
    /// associations and appends an `accepted` audit entry; on rejection,
    /// appends a `rejected` entry and leaves the registry untouched. The
    /// whole check-then-commit sequence runs under one write lock, so two
    /// concurrent uploads are fully serialized against each other (spec
    /// section 8: "no descriptor observes a partial commit of another").
    pub fn enforce(
        &self,
        descriptor: &Descriptor,
        descriptor_cid: &Cid,
        file_hash: &str,
    ) -> Result<EnforcementReport, EnforcementRejected> {
        let mut ledger = self.ledger.write();
        let in_bootstrap = self.in_bootstrap_window(ledger.descriptors_seen);
        ledger.descriptors_seen += 1;

        let (reuse_ratio, public_domain_ratio, mut violations) =
            analyze(&self.pool, &ledger.registry, &self.policy, descriptor, file_hash, in_bootstrap);

        if public_domain_ratio < self.policy.min_public_domain_ratio {
            violations.push(Violation::InsufficientPublicDomain {
                actual: public_domain_ratio,
                required: self.policy.min_public_domain_ratio,
            });
        }
        if !in_bootstrap && reuse_ratio < self.policy.min_reuse_ratio_overall {
            violations.push(Violation::InsufficientReuse {
                actual: reuse_ratio,
                required: self.policy.min_reuse_ratio_overall,
            });
        }

        if !violations.is_empty() {
            ledger.audit_log.append(AuditEntry {
                timestamp: Utc::now(),
                descriptor_cid: descriptor_cid.clone(),
                file_hash: file_hash.to_string(),
                decision: AuditDecision::Rejected,
                violations: violations.clone(),
                reuse_ratio,
                public_domain_ratio,
            });
            return Err(EnforcementRejected { violations });
        }

        for triple in &descriptor.triples {
            ledger.registry.associate(&triple.rand1_cid, file_hash);
            ledger.registry.associate(&triple.rand2_cid, file_hash);
        }
        ledger.audit_log.append(AuditEntry {
            timestamp: Utc::now(),
            descriptor_cid: descriptor_cid.clone(),
            file_hash: file_hash.to_string(),
            decision: AuditDecision::Accepted,
            violations: vec![],
            reuse_ratio,
            public_domain_ratio,
        });

        Ok(EnforcementReport {
            reuse_ratio,
            public_domain_ratio,
        })
    }

    /// Runs the same checks as [`Enforcer::enforce`] without mutating the
    /// registry or audit log (spec section 4.5: "runs the enforcement
    /// checks against an existing descriptor without mutating the
    /// registry").
    pub fn verify(&self, descriptor: &Descriptor, file_hash: &str) -> Vec<Violation> {
        let ledger = self.ledger.read();
        let in_bootstrap = self.in_bootstrap_window(ledger.descriptors_seen);
        let (reuse_ratio, public_domain_ratio, mut violations) =
            analyze(&self.pool, &ledger.registry, &self.policy, descriptor, file_hash, in_bootstrap);

        if public_domain_ratio < self.policy.min_public_domain_ratio {
            violations.push(Violation::InsufficientPublicDomain {
                actual: public_domain_ratio,
                required: self.policy.min_public_domain_ratio,
            });
        }
        if !in_bootstrap && reuse_ratio < self.policy.min_reuse_ratio_overall {
            violations.push(Violation::InsufficientReuse {
                actual: reuse_ratio,
                required: self.policy.min_reuse_ratio_overall,
            });
        }

        violations
    }

    /// Produces a reuse proof for `file_hash`: for every randomizer CID the
    /// descriptor references, the other file hashes sharing it right now.
    pub fn reuse_proof(&self, descriptor: &Descriptor, file_hash: &str) -> ReuseProof {
        let ledger = self.ledger.read();
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for triple in &descriptor.triples {
            for cid in [&triple.rand1_cid, &triple.rand2_cid] {
                if !seen.insert(cid.clone()) {
                    continue;
                }
                let shared_with = ledger
                    .registry
                    .file_hashes(cid)
                    .map(|hashes| {
                        hashes
                            .iter()
                            .filter(|h| h.as_str() != file_hash)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                entries.push(ReuseProofEntry {
                    cid: cid.clone(),
                    shared_with,
                });
            }
        }

        ReuseProof::new(file_hash.to_string(), entries)
    }

    pub fn audit_entries_for(&self, file_hash: &str) -> Vec<AuditEntry> {
        self.ledger
            .read()
            .audit_log
            .for_file_hash(file_hash)
            .cloned()
            .collect()
    }

    pub fn registry_reuse_count(&self, cid: &Cid) -> usize {
        self.ledger.read().registry.reuse_count(cid)
    }

    pub fn policy(&self) -> &ReusePolicy {
        &self.policy
    }

    /// Finds the file hash associated with an already-audited descriptor,
    /// by scanning for its most recent `accepted` entry. Backs
    /// `Client::verify`, whose spec signature takes only a descriptor CID:
    /// the file hash of a previously committed descriptor is recovered
    /// from the audit trail rather than being re-supplied by the caller.
    pub fn file_hash_for_descriptor(&self, descriptor_cid: &Cid) -> Option<String> {
        self.ledger
            .read()
            .audit_log
            .entries()
            .iter()
            .rev()
            .find(|entry| {
                entry.descriptor_cid == *descriptor_cid
                    && entry.decision == AuditDecision::Accepted
            })
            .map(|entry| entry.file_hash.clone())
    }

    fn in_bootstrap_window(&self, descriptors_seen: u64) -> bool {
        let elapsed = Utc::now() - self.started_at;
        elapsed < self.policy.bootstrap_window.duration
            || descriptors_seen < self.policy.bootstrap_window.descriptor_count
    }
}

/// Shared by `enforce` and `verify`: computes `reuseRatio` and
/// `publicDomainRatio`, plus any per-randomizer violations
/// (`UnknownRandomizer`, `InsufficientPerBlockReuse`).
fn analyze(
    pool: &Pool,
    registry: &AssociationRegistry,
    policy: &ReusePolicy,
    descriptor: &Descriptor,
    file_hash: &str,
    in_bootstrap: bool,
) -> (f64, f64, Vec<Violation>) {
    let n = descriptor.triples.len().max(1);
    let mut reuse_count = 0usize;
    let mut public_domain_count = 0usize;
    let mut violations = Vec::new();
    let mut flagged: HashSet<Cid> = HashSet::new();

    for triple in &descriptor.triples {
        let mut triple_is_public_domain = false;

        for cid in [&triple.rand1_cid, &triple.rand2_cid] {
            match pool.lookup(cid) {
                None => {
                    if flagged.insert(cid.clone()) {
                        violations.push(Violation::UnknownRandomizer { cid: cid.clone() });
                    }
                }
                Some(block) => {
                    if block.is_public_domain {
                        triple_is_public_domain = true;
                    }
                    if registry.is_reused_by_other(cid, file_hash) {
                        reuse_count += 1;
                    }
                    if !in_bootstrap && block.source != BlockSource::Genesis {
                        let have = registry.reuse_count(cid);
                        if have < policy.min_reuse_per_block && flagged.insert(cid.clone()) {
                            violations.push(Violation::InsufficientPerBlockReuse {
                                cid: cid.clone(),
                                actual: have,
                                required: policy.min_reuse_per_block,
                            });
                        }
                    }
                }
            }
        }

        if triple_is_public_domain {
            public_domain_count += 1;
        }
    }

    let reuse_ratio = reuse_count as f64 / (2.0 * n as f64);
    let public_domain_ratio = public_domain_count as f64 / n as f64;
    (reuse_ratio, public_domain_ratio, violations)
}
