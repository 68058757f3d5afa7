use noisefs_common::Cid;
use thiserror::Error;

/// A single reason a descriptor failed enforcement. The Enforcer collects
/// every applicable violation in one pass rather than short-circuiting on
/// the first (spec section 7: "validation collects all violations rather
/// than short-circuiting on the first").
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("public-domain ratio {actual:.3} is below the required {required:.3}")]
    InsufficientPublicDomain { actual: f64, required: f64 },

    #[error("overall reuse ratio {actual:.3} is below the required {required:.3}")]
    InsufficientReuse { actual: f64, required: f64 },

    #[error("randomizer {cid} is not known to the pool")]
    UnknownRandomizer { cid: Cid },

    #[error("randomizer {cid} has only been used by {actual} distinct file(s), needs {required}")]
    InsufficientPerBlockReuse {
        cid: Cid,
        actual: usize,
        required: usize,
    },
}

/// A sealed descriptor failed one or more enforcement checks.
#[derive(Debug, Clone, Error)]
#[error("enforcement rejected the descriptor: {violations:?}")]
pub struct EnforcementRejected {
    pub violations: Vec<Violation>,
}
