use thiserror::Error;

/// The wire format and the in-memory invariants it encodes are both
/// enforced at the same boundary: any deviation from either yields this
/// one error kind (spec section 3 and section 6: "Any deviation yields
/// `MalformedDescriptor` on read").
#[derive(Debug, Clone, Error)]
#[error("malformed descriptor: {0}")]
pub struct MalformedDescriptor(pub String);
