use bytes::Bytes;
use noisefs_common::BlockSize;

/// Splits `data` into fixed-size blocks, zero-padding the final block up to
/// exactly `size` (spec section 4.2: "zero-padding the last block to
/// exactly `S`"). An empty input still produces exactly one, all-zero,
/// block — there is always at least one triple per file.
pub fn split_into_blocks(data: &[u8], size: BlockSize) -> Vec<Bytes> {
    let block_size = size.get();
    let mut blocks = Vec::with_capacity(data.len().div_ceil(block_size).max(1));
    let mut offset = 0;

    loop {
        let end = (offset + block_size).min(data.len());
        let mut block = data[offset..end].to_vec();
        if block.len() < block_size {
            block.resize(block_size, 0);
        }
        blocks.push(Bytes::from(block));
        offset = end;
        if offset >= data.len() {
            break;
        }
    }

    blocks
}
