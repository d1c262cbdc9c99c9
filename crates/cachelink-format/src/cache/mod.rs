//! Cache file structures.
//!
//! File order: Header (0x800) → BSP partitions → asset data → tag data.
//! Tag data starts with the tag data header, followed by the tag array,
//! the tag path strings and the tag structs.

mod crc;
mod dump;
mod header;
mod map;
mod tag_data;

#[cfg(test)]
mod crc_tests;
#[cfg(test)]
mod header_tests;
#[cfg(test)]
mod tag_data_tests;
#[cfg(test)]
pub(crate) mod test_utils;

pub use crc::{MapCrc, calculate_map_crc, forge_map_crc};
pub use dump::dump;
pub use header::{
    COMPRESSION_ZSTD, CacheHeader, FOOT_LITERAL, FOOT_LITERAL_DEMO, HEAD_LITERAL,
    HEAD_LITERAL_DEMO, HEADER_SIZE, HeaderLayout,
};
pub use map::{CacheMap, MapError, MapStorage, MapTag};
pub use tag_data::{
    DATA_FLAG_EXTERNAL, DATA_SIZE, DEPENDENCY_SIZE, REFLEXIVE_SIZE, TAG_ARRAY_ENTRY_SIZE,
    TAG_DATA_HEADER_SIZE, TAGS_LITERAL, TagArrayEntry, TagDataHeader, data, dependency, reflexive, scenario,
};

/// Read a little-endian u16 from bytes at the given offset.
#[inline]
pub(crate) fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// Read a little-endian u32 from bytes at the given offset.
#[inline]
pub(crate) fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Read a little-endian u64 from bytes at the given offset.
#[inline]
pub(crate) fn read_u64_le(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

/// Write a little-endian u32 into bytes at the given offset.
#[inline]
pub fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
