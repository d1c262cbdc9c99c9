//! Whole-map compression.
//!
//! Two schemes, chosen by target engine:
//! - anniversary: [`fixed_block`] over the whole file
//! - native: the header stays readable and the rest is one zstd stream ([`whole`])

pub mod fixed_block;
pub mod whole;


use cachelink_core::{CompressionScheme, Engine};

use crate::cache::{COMPRESSION_ZSTD, CacheHeader, HEADER_SIZE, HeaderLayout, MapError};

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("{blocks} blocks exceed the limit of {max}", max = fixed_block::MAX_BLOCKS)]
    TooManyBlocks { blocks: usize },
    #[error("block offset 0x{offset:X} does not fit in 32 bits")]
    OffsetOverflow { offset: usize },
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    InsufficientBuffer { needed: usize, available: usize },
    #[error("compressed data truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("compressed data has no blocks")]
    NoBlocks,
    #[error("block #{block}: {reason}")]
    InvalidBlock { block: usize, reason: &'static str },
    #[error("{} of {total} blocks failed: {failed:?}", .failed.len())]
    BlocksFailed { failed: Vec<usize>, total: usize },
    #[error("header claims an impossible decompressed size of {0} bytes")]
    InvalidSize(u64),
    #[error("decompressed {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("map is not compressed")]
    NotCompressed,
    #[error("map is already compressed")]
    AlreadyCompressed,
    #[error("engine {0} has no compression scheme")]
    Unsupported(Engine),
    #[error("compressed engine version 0x{0:08X} is not supported")]
    UnsupportedVersion(u32),
    #[error("native compression needs a native header")]
    NotNative,
    #[error("zstd: {0}")]
    Zstd(#[from] std::io::Error),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Compress a linked map for `engine`.
///
/// `level` only applies to zstd and is clamped to the engine's range.
pub fn compress_map(
    data: &[u8],
    engine: Engine,
    level: Option<i32>,
) -> Result<Vec<u8>, CompressionError> {
    let header = CacheHeader::from_bytes(data)?;
    if header.is_compressed() {
        return Err(CompressionError::AlreadyCompressed);
    }

    match engine.compression() {
        Some(CompressionScheme::FixedBlock) => {
            let out = fixed_block::compress(data)?;
            log::info!(
                "compressed {} bytes into {} ({} blocks)",
                data.len(),
                out.len(),
                data.len().div_ceil(fixed_block::CHUNK_SIZE)
            );
            Ok(out)
        }
        Some(CompressionScheme::Zstd) => {
            if header.layout != HeaderLayout::Native {
                return Err(CompressionError::NotNative);
            }
            let level = whole::clamp_level(engine, level);
            let payload = whole::compress(&data[HEADER_SIZE..], level)?;

            let mut header = header;
            header.compression_type = COMPRESSION_ZSTD;
            header.decompressed_file_size = data.len() as u64;

            let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
            out.extend_from_slice(&header.to_bytes());
            out.extend_from_slice(&payload);
            log::info!(
                "compressed {} bytes into {} (zstd level {level})",
                data.len(),
                out.len()
            );
            Ok(out)
        }
        None => Err(CompressionError::Unsupported(engine)),
    }
}

/// Decompress a map produced by [`compress_map`].
///
/// Data without a readable header is treated as fixed-block compressed.
pub fn decompress_map(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let header = match CacheHeader::from_bytes(data) {
        Ok(header) => header,
        Err(MapError::FileTooSmall(_) | MapError::InvalidLiteral) => {
            return fixed_block::decompress(data);
        }
        Err(err) => return Err(err.into()),
    };

    if header.layout == HeaderLayout::Native && header.compression_type == COMPRESSION_ZSTD {
        let payload_size = usize::try_from(header.decompressed_file_size)
            .ok()
            .and_then(|total| total.checked_sub(HEADER_SIZE))
            .ok_or(CompressionError::InvalidSize(header.decompressed_file_size))?;
        let payload = whole::decompress(&data[HEADER_SIZE..], payload_size)?;

        let mut header = header;
        header.compression_type = 0;

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&payload);
        return Ok(out);
    }

    if header.is_compressed() {
        return Err(CompressionError::UnsupportedVersion(header.engine_version));
    }
    Err(CompressionError::NotCompressed)
}
