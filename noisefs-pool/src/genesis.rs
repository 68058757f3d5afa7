//! Deterministic genesis block generation (spec section 4.1).
//!
//! Independently started nodes must agree on the seed blocks for a given
//! size without coordination, so genesis bytes are a pure function of the
//! size and an index: `H0 = SHA-256("noisefs-genesis-"‖size‖"-"‖i)`,
//! `Hn+1 = SHA-256(Hn)`, concatenated until `size` bytes are produced.

use sha2::{Digest, Sha256};

pub fn genesis_block_bytes(size: usize, index: u64) -> Vec<u8> {
    let seed = format!("noisefs-genesis-{size}-{index}");
    let mut out = Vec::with_capacity(size);
    let mut h = Sha256::digest(seed.as_bytes()).to_vec();
    while out.len() < size {
        out.extend_from_slice(&h);
        h = Sha256::digest(&h).to_vec();
    }
    out.truncate(size);
    out
}
