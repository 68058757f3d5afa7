//! NoiseFS: the OFFSystem-style block anonymization and reuse engine.
//!
//! A [`Client`] wires together a [`noisefs_pool::Pool`] of randomizer
//! blocks, a [`noisefs_mixer::Mixer`] that XORs file blocks against two
//! randomizers each, a [`noisefs_descriptor::Descriptor`] wire format, and
//! an [`Enforcer`] that gates every upload on public-domain participation
//! and cross-file reuse before it is ever considered durable.

mod audit;
mod client;
mod config;
mod enforcer;
mod error;
mod policy;
mod registry;
mod reuse_proof;
mod violation;

pub use audit::*;
pub use client::*;
pub use config::*;
pub use enforcer::*;
pub use error::*;
pub use policy::*;
pub use registry::*;
pub use reuse_proof::*;
pub use violation::*;

pub use noisefs_common::{
    BlockSize, BlockStore, BlockStoreError, Cid, CidError, CidValidator, DefaultCidValidator,
    MemoryBlockStore, Triple, UnsupportedBlockSize,
};
pub use noisefs_descriptor::{Descriptor, MalformedDescriptor};
pub use noisefs_mixer::{xor_reconstruct, Mixer, MixerConfig, MixerError};
pub use noisefs_pool::{BlockSource, BootstrapDataset, Pool, PoolBlock, PoolConfig, PoolError, PoolStats};
