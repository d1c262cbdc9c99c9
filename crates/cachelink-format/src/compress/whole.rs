//! Whole-buffer zstd.

use std::io::Read;

use cachelink_core::Engine;

use super::CompressionError;

/// Compress `data` as a single zstd frame.
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>, CompressionError> {
    Ok(zstd::bulk::compress(data, level)?)
}

/// Decompress a frame that must expand to exactly `size` bytes.
///
/// The output grows with what the frame actually yields, so a corrupt `size`
/// never sizes the allocation.
pub fn decompress(data: &[u8], size: usize) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::new();
    zstd::stream::read::Decoder::new(data)?
        .take((size as u64).saturating_add(1))
        .read_to_end(&mut out)?;
    if out.len() != size {
        return Err(CompressionError::SizeMismatch {
            expected: size,
            actual: out.len(),
        });
    }
    Ok(out)
}

/// Clamp a requested level into the engine's range; the default is the highest level.
pub fn clamp_level(engine: Engine, level: Option<i32>) -> i32 {
    let levels = engine.zstd_levels();
    let (min, max) = (*levels.start(), *levels.end());
    level.unwrap_or(max).clamp(min, max)
}
