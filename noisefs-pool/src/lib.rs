//! The universal randomizer block pool (spec section 4.1): size-classed
//! inventory, deterministic genesis seeding, public-domain bootstrapping,
//! and uniform-random selection.

mod config;
mod error;
mod genesis;
mod pool;
mod pool_block;
mod stats;

pub use config::*;
pub use error::*;
pub use genesis::genesis_block_bytes;
pub use pool::*;
pub use pool_block::*;
pub use stats::*;
