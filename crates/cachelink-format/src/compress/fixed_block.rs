//! Fixed-block zlib codec.
//!
//! Layout: `u32 block_count`, a table of 65535 `u32` block offsets (always
//! full size), then the blocks. Each block is the `u32` uncompressed size
//! followed by a zlib stream of at most [`CHUNK_SIZE`] input bytes.
//!
//! Blocks are independent, so both directions fan out over a thread pool.
//! Every block runs to completion; failures are reported together.

use std::num::NonZeroUsize;
use std::ops::Range;

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use rayon::prelude::*;

use super::CompressionError;
use crate::cache::{read_u32_le, write_u32_le};

/// Uncompressed bytes per block.
pub const CHUNK_SIZE: usize = 0x20000;

/// Entries in the block offset table.
pub const MAX_BLOCKS: usize = 0xFFFF;

/// Block count plus the offset table.
pub const BLOCK_TABLE_SIZE: usize = 4 + 4 * MAX_BLOCKS;

/// Compress `input` into the fixed-block format.
pub fn compress(input: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let block_count = input.len().div_ceil(CHUNK_SIZE);
    if block_count > MAX_BLOCKS {
        return Err(CompressionError::TooManyBlocks {
            blocks: block_count,
        });
    }

    let chunks: Vec<&[u8]> = input.chunks(CHUNK_SIZE).collect();
    let blocks = run_blocks(chunks, deflate_block);
    let failed: Vec<usize> = failed_blocks(blocks.iter().map(Option::is_some));
    if !failed.is_empty() {
        return Err(CompressionError::BlocksFailed {
            failed,
            total: block_count,
        });
    }

    let body: usize = blocks.iter().flatten().map(Vec::len).sum();
    let mut output = vec![0u8; BLOCK_TABLE_SIZE];
    output.reserve(body);
    write_u32_le(&mut output, 0, block_count as u32);

    for (index, block) in blocks.into_iter().flatten().enumerate() {
        let offset = output.len();
        let offset_u32 =
            u32::try_from(offset).map_err(|_| CompressionError::OffsetOverflow { offset })?;
        write_u32_le(&mut output, 4 + 4 * index, offset_u32);
        output.extend_from_slice(&block);
    }

    Ok(output)
}

/// Total uncompressed size, after validating every block offset and size.
pub fn find_decompressed_file_size(input: &[u8]) -> Result<usize, CompressionError> {
    Ok(block_spans(input)?.iter().map(|span| span.size).sum())
}

/// Decompress into a new buffer.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut output = vec![0u8; find_decompressed_file_size(input)?];
    decompress_into(input, &mut output)?;
    Ok(output)
}

/// Decompress into `output`, returning the number of bytes written.
///
/// On [`CompressionError::BlocksFailed`] the blocks that succeeded have
/// still been written to their place in `output`.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
    let spans = block_spans(input)?;
    let total: usize = spans.iter().map(|span| span.size).sum();
    if total > output.len() {
        return Err(CompressionError::InsufficientBuffer {
            needed: total,
            available: output.len(),
        });
    }

    let mut rest = &mut output[..total];
    let mut jobs = Vec::with_capacity(spans.len());
    for span in &spans {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(span.size);
        jobs.push((&input[span.data.clone()], head));
        rest = tail;
    }

    let results = run_blocks(jobs, |(src, dst)| inflate_block(src, dst));
    let failed = failed_blocks(results.into_iter());
    if !failed.is_empty() {
        log::error!("{} of {} blocks failed to decompress", failed.len(), spans.len());
        return Err(CompressionError::BlocksFailed {
            failed,
            total: spans.len(),
        });
    }

    Ok(total)
}

/// One block of compressed input.
struct BlockSpan {
    /// zlib stream, after the size prefix.
    data: Range<usize>,
    /// Uncompressed size.
    size: usize,
}

fn block_spans(input: &[u8]) -> Result<Vec<BlockSpan>, CompressionError> {
    if input.len() < 4 {
        return Err(CompressionError::Truncated {
            needed: 4,
            actual: input.len(),
        });
    }

    let block_count = read_u32_le(input, 0) as usize;
    if block_count == 0 {
        return Err(CompressionError::NoBlocks);
    }
    if block_count > MAX_BLOCKS {
        return Err(CompressionError::TooManyBlocks {
            blocks: block_count,
        });
    }
    if input.len() < BLOCK_TABLE_SIZE {
        return Err(CompressionError::Truncated {
            needed: BLOCK_TABLE_SIZE,
            actual: input.len(),
        });
    }

    let offsets: Vec<usize> = (0..block_count)
        .map(|i| read_u32_le(input, 4 + 4 * i) as usize)
        .collect();

    let mut spans = Vec::with_capacity(block_count);
    for (block, &offset) in offsets.iter().enumerate() {
        if offset < BLOCK_TABLE_SIZE {
            return Err(CompressionError::InvalidBlock {
                block,
                reason: "offset points into the block table",
            });
        }
        if offset + 4 > input.len() {
            return Err(CompressionError::Truncated {
                needed: offset + 4,
                actual: input.len(),
            });
        }

        let end = offsets.get(block + 1).copied().unwrap_or(input.len());
        if end < offset + 4 || end > input.len() {
            return Err(CompressionError::InvalidBlock {
                block,
                reason: "block offsets are not ascending",
            });
        }

        let size = read_u32_le(input, offset) as usize;
        if size > CHUNK_SIZE {
            return Err(CompressionError::InvalidBlock {
                block,
                reason: "uncompressed size exceeds the chunk size",
            });
        }

        spans.push(BlockSpan {
            data: offset + 4..end,
            size,
        });
    }

    Ok(spans)
}

/// Size prefix plus zlib stream, or `None` if the output did not fit.
fn deflate_block(chunk: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(4 + chunk.len() * 2 + 16);
    out.extend_from_slice(&(chunk.len() as u32).to_le_bytes());

    let mut stream = Compress::new(Compression::best(), true);
    match stream.compress_vec(chunk, &mut out, FlushCompress::Finish) {
        Ok(Status::StreamEnd) => {
            out.shrink_to_fit();
            Some(out)
        }
        _ => None,
    }
}

fn inflate_block(input: &[u8], output: &mut [u8]) -> bool {
    let mut stream = Decompress::new(true);
    let done = matches!(
        stream.decompress(input, output, FlushDecompress::Finish),
        Ok(Status::StreamEnd)
    );
    done && stream.total_out() as usize == output.len()
}

fn failed_blocks(ok: impl Iterator<Item = bool>) -> Vec<usize> {
    ok.enumerate()
        .filter_map(|(index, ok)| (!ok).then_some(index))
        .collect()
}

/// Run `work` over every job, in parallel when more than one core is available.
///
/// Results are in job order.
fn run_blocks<J, R, F>(jobs: Vec<J>, work: F) -> Vec<R>
where
    J: Send,
    R: Send,
    F: Fn(J) -> R + Send + Sync,
{
    let workers = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    if workers <= 1 || jobs.len() <= 1 {
        return jobs.into_iter().map(work).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers.min(jobs.len()))
        .build()
    {
        Ok(pool) => pool.install(|| jobs.into_par_iter().map(&work).collect()),
        Err(err) => {
            log::warn!("thread pool unavailable ({err}); running blocks sequentially");
            jobs.into_iter().map(work).collect()
        }
    }
}
