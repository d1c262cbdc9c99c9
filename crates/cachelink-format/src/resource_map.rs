//! Shared resource maps (`bitmaps.map`, `sounds.map`, `loc.map`).
//!
//! Layout: header `{type, paths_offset, resources_offset, count}`, then
//! `count` entries of `{path_offset, size, data_offset}` at
//! `resources_offset`. Paths are null-terminated strings at
//! `paths_offset + path_offset`.

use std::fs;
use std::io;
use std::path::Path;

use cachelink_core::path::lookup_key;

use crate::cache::{read_u32_le, write_u32_le};

pub const RESOURCE_MAP_HEADER_SIZE: usize = 0x10;
pub const RESOURCE_ENTRY_SIZE: usize = 0xC;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceType {
    Bitmaps,
    Sounds,
    Loc,
}

impl ResourceType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(ResourceType::Bitmaps),
            2 => Some(ResourceType::Sounds),
            3 => Some(ResourceType::Loc),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            ResourceType::Bitmaps => 1,
            ResourceType::Sounds => 2,
            ResourceType::Loc => 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceMapError {
    #[error("resource map too small: {0} bytes")]
    TooSmall(usize),
    #[error("unknown resource map type {0}")]
    UnknownType(u32),
    #[error("resource table ({count} entries at 0x{offset:X}) is out of bounds")]
    TableOutOfBounds { offset: u32, count: u32 },
    #[error("resource #{index}: data is out of bounds")]
    DataOutOfBounds { index: usize },
    #[error("resource #{index}: path is out of bounds or unterminated")]
    PathOutOfBounds { index: usize },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// One entry of a resource map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub path: String,
    /// Offset of the data in the resource map file.
    pub data_offset: u32,
    pub size: u32,
}

/// A parsed resource map. Owns the file bytes.
#[derive(Debug)]
pub struct ResourceMap {
    kind: ResourceType,
    bytes: Vec<u8>,
    resources: Vec<Resource>,
}

impl ResourceMap {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ResourceMapError> {
        Self::from_bytes(fs::read(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ResourceMapError> {
        if bytes.len() < RESOURCE_MAP_HEADER_SIZE {
            return Err(ResourceMapError::TooSmall(bytes.len()));
        }

        let raw_type = read_u32_le(&bytes, 0x0);
        let kind = ResourceType::from_u32(raw_type).ok_or(ResourceMapError::UnknownType(raw_type))?;
        let paths_offset = read_u32_le(&bytes, 0x4) as usize;
        let table_offset = read_u32_le(&bytes, 0x8);
        let count = read_u32_le(&bytes, 0xC);

        let table_start = table_offset as usize;
        let table_end = (count as usize)
            .checked_mul(RESOURCE_ENTRY_SIZE)
            .and_then(|size| size.checked_add(table_start))
            .filter(|&end| end <= bytes.len())
            .ok_or(ResourceMapError::TableOutOfBounds {
                offset: table_offset,
                count,
            })?;

        let resources = bytes[table_start..table_end]
            .chunks_exact(RESOURCE_ENTRY_SIZE)
            .enumerate()
            .map(|(index, entry)| {
                let path_offset = read_u32_le(entry, 0x0) as usize;
                let size = read_u32_le(entry, 0x4);
                let data_offset = read_u32_le(entry, 0x8);

                let data_end = (data_offset as usize).checked_add(size as usize);
                if data_end.is_none_or(|end| end > bytes.len()) {
                    return Err(ResourceMapError::DataOutOfBounds { index });
                }

                let path = paths_offset
                    .checked_add(path_offset)
                    .and_then(|start| read_c_string(&bytes, start))
                    .ok_or(ResourceMapError::PathOutOfBounds { index })?;

                Ok(Resource {
                    path,
                    data_offset,
                    size,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("loaded {} resources ({kind:?})", resources.len());
        Ok(Self {
            kind,
            bytes,
            resources,
        })
    }

    pub fn kind(&self) -> ResourceType {
        self.kind
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Entry index and entry for `path`, ignoring case.
    pub fn find(&self, path: &str) -> Option<(usize, &Resource)> {
        let key = lookup_key(path);
        self.resources
            .iter()
            .enumerate()
            .find(|(_, r)| lookup_key(&r.path) == key)
    }

    pub fn data(&self, resource: &Resource) -> &[u8] {
        let start = resource.data_offset as usize;
        &self.bytes[start..start + resource.size as usize]
    }
}

/// Serialize a resource map: data blobs, then paths, then the entry table.
pub fn write_resource_map(kind: ResourceType, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = vec![0u8; RESOURCE_MAP_HEADER_SIZE];
    let mut data_offsets = Vec::with_capacity(entries.len());
    for (_, data) in entries {
        data_offsets.push(out.len() as u32);
        out.extend_from_slice(data);
    }

    let paths_offset = out.len();
    let mut path_offsets = Vec::with_capacity(entries.len());
    for (path, _) in entries {
        path_offsets.push((out.len() - paths_offset) as u32);
        out.extend_from_slice(path.as_bytes());
        out.push(0);
    }

    let table_offset = out.len();
    for (i, (_, data)) in entries.iter().enumerate() {
        out.extend_from_slice(&path_offsets[i].to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&data_offsets[i].to_le_bytes());
    }

    write_u32_le(&mut out, 0x0, kind.as_u32());
    write_u32_le(&mut out, 0x4, paths_offset as u32);
    write_u32_le(&mut out, 0x8, table_offset as u32);
    write_u32_le(&mut out, 0xC, entries.len() as u32);
    out
}

/// Read a null-terminated string, collapsing repeated separators.
fn read_c_string(bytes: &[u8], start: usize) -> Option<String> {
    let tail = bytes.get(start..)?;
    let end = tail.iter().position(|&b| b == 0)?;
    let raw = String::from_utf8_lossy(&tail[..end]);

    let mut path = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' && path.ends_with('\\') {
            continue;
        }
        path.push(c);
    }
    Some(path)
}
