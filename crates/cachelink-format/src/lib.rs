//! Cache file format for cachelink.
//!
//! This crate contains:
//! - Cache file structures (header variants, tag data header, tag array)
//! - A loader for linked cache files and a human-readable dump
//! - Map CRC calculation and forging
//! - Fixed-block zlib and whole-buffer zstd compression
//! - The shared-resource map reader

pub mod cache;
pub mod compress;
pub mod resource_map;


pub use cache::{
    CacheHeader, CacheMap, HEADER_SIZE, HeaderLayout, MapCrc, MapError, MapTag, TagArrayEntry,
    TagDataHeader, calculate_map_crc, dump, forge_map_crc,
};
pub use compress::{CompressionError, compress_map, decompress_map};
pub use resource_map::{
    Resource, ResourceMap, ResourceMapError, ResourceType, write_resource_map,
};
