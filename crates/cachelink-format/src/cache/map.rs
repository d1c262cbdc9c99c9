//! Linked cache file loader.
//!
//! [`CacheMap`] validates the header and tag data, then exposes the tag
//! array with resolved paths. Files are memory-mapped when loaded from disk.

use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::Path;

use cachelink_core::{Engine, TagId};
use memmap2::Mmap;

use super::header::{CacheHeader, HEADER_SIZE};
use super::tag_data::{
    TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, TAGS_LITERAL, TagArrayEntry, TagDataHeader,
};

/// Storage for cache file bytes.
#[derive(Debug)]
pub enum MapStorage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for MapStorage {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            MapStorage::Owned(bytes) => bytes,
            MapStorage::Mapped(map) => map,
        }
    }
}

impl MapStorage {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::Owned(bytes)
    }

    /// Memory-map a file read-only.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and lives as long as the storage;
        // concurrent modification of the file by another process is not supported.
        let map = unsafe { Mmap::map(&file)? };
        Ok(Self::Mapped(map))
    }
}

/// Cache file load error.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("file too small: {0} bytes (minimum 2048)")]
    FileTooSmall(usize),
    #[error("invalid header: head/foot literals not found")]
    InvalidLiteral,
    #[error("unknown engine version 0x{0:X}")]
    UnknownEngine(u32),
    #[error("map is compressed (engine version 0x{0:X}); decompress it first")]
    Compressed(u32),
    #[error("tag data at 0x{offset:X} (+0x{size:X}) is outside the {len}-byte file")]
    TagDataOutOfBounds { offset: u64, size: u64, len: usize },
    #[error("invalid tag data literal 0x{0:08X}")]
    InvalidTagsLiteral(u32),
    #[error("tag array with {count} tags does not fit in tag data")]
    TagArrayOutOfBounds { count: u32 },
    #[error("scenario structure_bsps array is outside tag data")]
    InvalidScenario,
    #[error("BSP #{index} at 0x{start:X} (+0x{size:X}) is outside the file")]
    BspOutOfBounds { index: usize, start: usize, size: usize },
    #[error("model data at 0x{offset:X} (+0x{size:X}) is outside the file")]
    ModelDataOutOfBounds { offset: u32, size: u32 },
    #[error("tag #{index} has an invalid path pointer 0x{address:08X}")]
    InvalidPath { index: usize, address: u32 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// One tag of a loaded map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapTag {
    pub id: TagId,
    pub primary_class: u32,
    pub secondary_class: u32,
    pub tertiary_class: u32,
    pub path: String,
    pub data_address: u32,
    pub indexed: bool,
}

/// A loaded, uncompressed cache file.
#[derive(Debug)]
pub struct CacheMap {
    storage: MapStorage,
    header: CacheHeader,
    engine: Engine,
    tag_data_header: TagDataHeader,
    base_address: u32,
    tags: Vec<MapTag>,
}

impl CacheMap {
    /// Load a map from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MapError> {
        Self::from_storage(MapStorage::from_vec(bytes))
    }

    /// Load a map from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let storage = MapStorage::from_file(&path)?;
        Self::from_storage(storage)
    }

    fn from_storage(storage: MapStorage) -> Result<Self, MapError> {
        let header = CacheHeader::from_bytes(&storage)?;
        if header.is_compressed() {
            return Err(MapError::Compressed(header.engine_version));
        }

        let tag_data = tag_data_range(&header, storage.len())?;
        let tag_data_bytes = &storage[tag_data.clone()];
        if tag_data_bytes.len() < TAG_DATA_HEADER_SIZE {
            return Err(MapError::TagDataOutOfBounds {
                offset: header.tag_data_offset,
                size: header.tag_data_size,
                len: storage.len(),
            });
        }

        let tag_data_header = TagDataHeader::from_bytes(tag_data_bytes);
        if tag_data_header.tags_literal != TAGS_LITERAL {
            return Err(MapError::InvalidTagsLiteral(tag_data_header.tags_literal));
        }

        let base_address = tag_data_header
            .tag_array_address
            .wrapping_sub(TAG_DATA_HEADER_SIZE as u32);
        let engine = Engine::from_base_address(base_address, header.engine_version)
            .ok_or(MapError::UnknownEngine(header.engine_version))?;

        let tags = read_tag_array(tag_data_bytes, &tag_data_header, base_address)?;

        Ok(Self {
            storage,
            header,
            engine,
            tag_data_header,
            base_address,
            tags,
        })
    }

    pub fn header(&self) -> &CacheHeader {
        &self.header
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn tag_data_header(&self) -> &TagDataHeader {
        &self.tag_data_header
    }

    /// Address tag data is loaded at.
    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    pub fn tags(&self) -> &[MapTag] {
        &self.tags
    }

    pub fn tag(&self, id: TagId) -> Option<&MapTag> {
        self.tags.get(id.index()?).filter(|t| t.id == id)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    pub fn tag_data(&self) -> &[u8] {
        let start = self.header.tag_data_offset as usize;
        &self.storage[start..start + self.header.tag_data_size as usize]
    }

    /// Bytes of tag space at `address`, if `len` bytes are available there.
    pub fn translate(&self, address: u32, len: usize) -> Option<&[u8]> {
        let offset = address.checked_sub(self.base_address)? as usize;
        self.tag_data().get(offset..offset.checked_add(len)?)
    }
}

pub(super) fn tag_data_range(header: &CacheHeader, len: usize) -> Result<std::ops::Range<usize>, MapError> {
    let out_of_bounds = || MapError::TagDataOutOfBounds {
        offset: header.tag_data_offset,
        size: header.tag_data_size,
        len,
    };
    let start = usize::try_from(header.tag_data_offset).map_err(|_| out_of_bounds())?;
    let size = usize::try_from(header.tag_data_size).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(size).ok_or_else(out_of_bounds)?;
    if start < HEADER_SIZE || end > len {
        return Err(out_of_bounds());
    }
    Ok(start..end)
}

fn read_tag_array(
    tag_data: &[u8],
    header: &TagDataHeader,
    base_address: u32,
) -> Result<Vec<MapTag>, MapError> {
    let count = header.tag_count;
    let array_offset = header.tag_array_address.wrapping_sub(base_address) as usize;
    let array_end = (count as usize)
        .checked_mul(TAG_ARRAY_ENTRY_SIZE)
        .and_then(|size| size.checked_add(array_offset))
        .filter(|&end| end <= tag_data.len())
        .ok_or(MapError::TagArrayOutOfBounds { count })?;

    tag_data[array_offset..array_end]
        .chunks_exact(TAG_ARRAY_ENTRY_SIZE)
        .enumerate()
        .map(|(index, raw)| {
            let entry = TagArrayEntry::from_bytes(raw);
            let path = read_path(tag_data, entry.path_address, base_address).ok_or(
                MapError::InvalidPath {
                    index,
                    address: entry.path_address,
                },
            )?;
            Ok(MapTag {
                id: TagId::from_raw(entry.tag_id),
                primary_class: entry.primary_class,
                secondary_class: entry.secondary_class,
                tertiary_class: entry.tertiary_class,
                path,
                data_address: entry.data_address,
                indexed: entry.indexed != 0,
            })
        })
        .collect()
}

/// Read a null-terminated path from tag space.
fn read_path(tag_data: &[u8], address: u32, base_address: u32) -> Option<String> {
    let start = address.checked_sub(base_address)? as usize;
    let tail = tag_data.get(start..)?;
    let end = tail.iter().position(|&b| b == 0)?;
    Some(String::from_utf8_lossy(&tail[..end]).into_owned())
}
