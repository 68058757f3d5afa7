//! The fixed set of block sizes NoiseFS ever mixes or stores.

use std::fmt;

/// The only block sizes the system recognizes. Any block, randomizer or
/// anonymized, has a length equal to one of these.
pub const SUPPORTED_BLOCK_SIZES: [usize; 5] =
    [65_536, 131_072, 262_144, 524_288, 1_048_576];

/// A validated member of [`SUPPORTED_BLOCK_SIZES`].
///
/// Constructing one is the only way downstream code gets to assume a byte
/// length is a legal block size; there is no way to build a `BlockSize` that
/// isn't in the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockSize(usize);

impl BlockSize {
    /// Validates `size` against [`SUPPORTED_BLOCK_SIZES`].
    pub fn new(size: usize) -> Result<Self, UnsupportedBlockSize> {
        if SUPPORTED_BLOCK_SIZES.contains(&size) {
            Ok(Self(size))
        } else {
            Err(UnsupportedBlockSize(size))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// All supported sizes, smallest first.
    pub fn all() -> [BlockSize; 5] {
        SUPPORTED_BLOCK_SIZES.map(Self)
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for BlockSize {
    type Error = UnsupportedBlockSize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlockSize> for usize {
    fn from(value: BlockSize) -> Self {
        value.0
    }
}

/// Returned when a byte length isn't one of [`SUPPORTED_BLOCK_SIZES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a supported block size")]
pub struct UnsupportedBlockSize(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_supported_size() {
        for size in SUPPORTED_BLOCK_SIZES {
            assert_eq!(BlockSize::new(size).unwrap().get(), size);
        }
    }

    #[test]
    fn rejects_unsupported_sizes() {
        assert!(BlockSize::new(0).is_err());
        assert!(BlockSize::new(65_537).is_err());
        assert!(BlockSize::new(2_097_152).is_err());
    }
}
