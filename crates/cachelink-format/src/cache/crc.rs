//! Map CRC calculation and forging.
//!
//! The hash covers each BSP listed in the scenario's `structure_bsps`, then
//! model data, then tag data with its random number masked out. The header
//! and asset data are not hashed. The header stores `hash ^ random`, so a
//! map can be steered to any CRC by rewriting the random number alone.

use std::ops::Range;

use cachelink_core::{TagClass, TagId};
use crc32fast::Hasher;

use super::header::{CacheHeader, HEADER_SIZE};
use super::map::{MapError, tag_data_range};
use super::tag_data::{
    TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, TagArrayEntry, TagDataHeader, reflexive, scenario,
};
use super::{read_u32_le, write_u32_le};

/// CRC state of a linked map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapCrc {
    /// Hash of the file with the random number masked.
    pub crc: u32,
    /// Current tag data random number.
    pub random: u32,
    /// Header CRC does not match `crc ^ random`.
    pub dirty: bool,
}

impl MapCrc {
    /// The CRC the engine will compute for this map.
    pub fn effective(&self) -> u32 {
        self.crc ^ self.random
    }
}

/// File ranges that feed the hash, in hashing order.
#[derive(Debug)]
struct CrcDomain {
    bsps: Vec<Range<usize>>,
    model: Range<usize>,
    tag_data: Range<usize>,
    random_offset: usize,
}

/// Compute the CRC of a linked map.
pub fn calculate_map_crc(data: &[u8]) -> Result<MapCrc, MapError> {
    let header = CacheHeader::from_bytes(data)?;
    let domain = crc_domain(data, &header)?;
    let crc = masked_hash(data, &domain);
    let random = read_u32_le(data, domain.random_offset);
    Ok(MapCrc {
        crc,
        random,
        dirty: header.crc32 != crc ^ random,
    })
}

/// Rewrite the random number and header CRC.
///
/// With `new_crc` the random number is chosen so the map hashes to it;
/// otherwise `new_random` (or the current random number) is kept and the
/// header CRC is brought in line with it.
pub fn forge_map_crc(
    data: &mut [u8],
    new_crc: Option<u32>,
    new_random: Option<u32>,
) -> Result<MapCrc, MapError> {
    let header = CacheHeader::from_bytes(data)?;
    let domain = crc_domain(data, &header)?;
    let crc = masked_hash(data, &domain);

    let random = match (new_crc, new_random) {
        (Some(target), _) => crc ^ target,
        (None, Some(random)) => random,
        (None, None) => read_u32_le(data, domain.random_offset),
    };

    write_u32_le(data, domain.random_offset, random);
    write_u32_le(data, header.layout.crc32_offset(), crc ^ random);
    log::debug!("map crc forged to 0x{:08X}", crc ^ random);

    Ok(MapCrc {
        crc,
        random,
        dirty: false,
    })
}

fn crc_domain(data: &[u8], header: &CacheHeader) -> Result<CrcDomain, MapError> {
    let tag_data = tag_data_range(header, data.len())?;
    let tag_data_bytes = &data[tag_data.clone()];
    if tag_data_bytes.len() < TAG_DATA_HEADER_SIZE {
        return Err(MapError::TagDataOutOfBounds {
            offset: header.tag_data_offset,
            size: header.tag_data_size,
            len: data.len(),
        });
    }
    let tag_data_header = TagDataHeader::from_bytes(tag_data_bytes);

    let model = match tag_data_header.model_data_size {
        0 => 0..0,
        size => {
            let offset = tag_data_header.model_data_file_offset;
            let start = offset as usize;
            start
                .checked_add(size as usize)
                .filter(|&end| start >= HEADER_SIZE && end <= data.len())
                .map(|end| start..end)
                .ok_or(MapError::ModelDataOutOfBounds { offset, size })?
        }
    };

    Ok(CrcDomain {
        bsps: bsp_regions(data.len(), tag_data_bytes, &tag_data_header)?,
        model,
        random_offset: tag_data.start + TagDataHeader::RANDOM_NUMBER_OFFSET,
        tag_data,
    })
}

/// File ranges of the BSPs the scenario lists, in list order.
///
/// Maps without BSP tags have nothing to list, and their scenario is not
/// read.
fn bsp_regions(
    file_len: usize,
    tag_data: &[u8],
    header: &TagDataHeader,
) -> Result<Vec<Range<usize>>, MapError> {
    let base = header.tag_array_address.wrapping_sub(TAG_DATA_HEADER_SIZE as u32);
    let array = (header.tag_count as usize)
        .checked_mul(TAG_ARRAY_ENTRY_SIZE)
        .and_then(|size| tag_data.get(TAG_DATA_HEADER_SIZE..TAG_DATA_HEADER_SIZE.checked_add(size)?))
        .ok_or(MapError::TagArrayOutOfBounds {
            count: header.tag_count,
        })?;

    let bsp_class = TagClass::ScenarioStructureBsp.fourcc();
    let mut entries = array.chunks_exact(TAG_ARRAY_ENTRY_SIZE).map(TagArrayEntry::from_bytes);
    if !entries.clone().any(|entry| entry.primary_class == bsp_class) {
        return Ok(Vec::new());
    }

    let read = |address: u32, offset: usize| -> Option<u32> {
        let at = (address.checked_sub(base)? as usize).checked_add(offset)?;
        tag_data.get(at..at.checked_add(4)?).map(|bytes| read_u32_le(bytes, 0))
    };
    let scenario_root = TagId::from_raw(header.scenario_tag)
        .index()
        .and_then(|index| entries.nth(index))
        .map(|entry| entry.data_address)
        .ok_or(MapError::InvalidScenario)?;
    let count = read(scenario_root, scenario::STRUCTURE_BSPS + reflexive::COUNT)
        .ok_or(MapError::InvalidScenario)?;
    let first = read(scenario_root, scenario::STRUCTURE_BSPS + reflexive::POINTER)
        .ok_or(MapError::InvalidScenario)?;

    (0..count as usize)
        .map(|index| {
            let element = index * scenario::BSP_ENTRY_SIZE;
            let (Some(start), Some(size)) = (
                read(first, element + scenario::BSP_START),
                read(first, element + scenario::BSP_SIZE),
            ) else {
                return Err(MapError::InvalidScenario);
            };
            let (start, size) = (start as usize, size as usize);
            start
                .checked_add(size)
                .filter(|&end| start >= HEADER_SIZE && end <= file_len)
                .map(|end| start..end)
                .ok_or(MapError::BspOutOfBounds { index, start, size })
        })
        .collect()
}

fn masked_hash(data: &[u8], domain: &CrcDomain) -> u32 {
    let mut hasher = Hasher::new();
    for bsp in &domain.bsps {
        hasher.update(&data[bsp.clone()]);
    }
    hasher.update(&data[domain.model.clone()]);
    hasher.update(&data[domain.tag_data.start..domain.random_offset]);
    hasher.update(&[0; 4]);
    hasher.update(&data[domain.random_offset + 4..domain.tag_data.end]);
    hasher.finalize()
}
