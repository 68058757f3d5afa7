use chrono::Duration;
use noisefs_mixer::MixerConfig;
use noisefs_pool::PoolConfig;

use crate::ReusePolicy;

/// `blockstore.opTimeout` — the per-operation timeout every `BlockStore`
/// call inherits (spec section 6). The Pool and Enforcer have no intrinsic
/// timeouts of their own; this exists purely for embedders to apply around
/// their `BlockStore` implementation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStoreConfig {
    pub op_timeout: Duration,
}

impl Default for BlockStoreConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::seconds(30),
        }
    }
}

/// Every configuration option the spec recognizes (section 6), grouped by
/// the component that owns it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub pool: PoolConfig,
    pub policy: ReusePolicy,
    pub mixer: MixerConfig,
    pub blockstore: BlockStoreConfig,
}
