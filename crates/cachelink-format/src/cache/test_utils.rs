//! Minimal linked maps for tests.

use cachelink_core::{Engine, TagClass, TagId, align_up};

use super::header::{CacheHeader, HEADER_SIZE};
use super::tag_data::{
    REFLEXIVE_SIZE, TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, TAGS_LITERAL, TagArrayEntry,
    TagDataHeader, reflexive, scenario,
};
use super::write_u32_le;

/// Link a map whose tags each own one 4-byte struct holding their index.
pub(crate) fn build_map(engine: Engine, tags: &[(TagClass, &str)]) -> Vec<u8> {
    let base = engine.base_address();
    let array_size = tags.len() * TAG_ARRAY_ENTRY_SIZE;

    let mut paths = Vec::new();
    let mut path_offsets = Vec::new();
    for (_, path) in tags {
        path_offsets.push(TAG_DATA_HEADER_SIZE + array_size + paths.len());
        paths.extend_from_slice(path.as_bytes());
        paths.push(0);
    }
    let structs_start = align_up(TAG_DATA_HEADER_SIZE + array_size + paths.len(), 4);

    let mut tag_data = TagDataHeader {
        tag_array_address: base + TAG_DATA_HEADER_SIZE as u32,
        scenario_tag: TagId::from_index(0).raw(),
        tag_count: tags.len() as u32,
        tags_literal: TAGS_LITERAL,
        ..Default::default()
    }
    .to_bytes()
    .to_vec();

    for (index, (class, _)) in tags.iter().enumerate() {
        let entry = TagArrayEntry {
            primary_class: class.fourcc(),
            secondary_class: class.secondary_fourcc(),
            tertiary_class: class.tertiary_fourcc(),
            tag_id: TagId::from_index(index).raw(),
            path_address: base + path_offsets[index] as u32,
            data_address: base + (structs_start + index * 4) as u32,
            indexed: 0,
        };
        tag_data.extend_from_slice(&entry.to_bytes());
    }
    tag_data.extend_from_slice(&paths);
    tag_data.resize(structs_start, 0);
    for index in 0..tags.len() {
        tag_data.extend_from_slice(&(index as u32).to_le_bytes());
    }

    let mut header = CacheHeader::new(engine);
    header.name = "test".into();
    header.build = engine.default_build().into();
    header.tag_data_offset = HEADER_SIZE as u64;
    header.tag_data_size = tag_data.len() as u64;
    header.decompressed_file_size = (HEADER_SIZE + tag_data.len()) as u64;

    let mut bytes = header.to_bytes().to_vec();
    bytes.extend_from_slice(&tag_data);
    bytes
}

/// File offset and size of the BSP in [`build_map_with_bsp`].
pub(crate) const BSP_OFFSET: usize = HEADER_SIZE;
pub(crate) const BSP_SIZE: usize = 0x10;
/// Raw asset bytes between the BSP and tag data.
pub(crate) const ASSET_OFFSET: usize = BSP_OFFSET + BSP_SIZE;
pub(crate) const ASSET_SIZE: usize = 0x8;
pub(crate) const BSP_MAP_TAG_DATA_OFFSET: usize = ASSET_OFFSET + ASSET_SIZE;
/// The scenario's single `structure_bsps` entry, right after the tag array.
pub(crate) const BSP_ENTRY_OFFSET: usize =
    BSP_MAP_TAG_DATA_OFFSET + TAG_DATA_HEADER_SIZE + 2 * TAG_ARRAY_ENTRY_SIZE;

/// Link a map with a scenario listing one BSP. The file holds the header,
/// the BSP, an asset, then tag data.
pub(crate) fn build_map_with_bsp(engine: Engine) -> Vec<u8> {
    let base = engine.base_address();
    let entry_offset = BSP_ENTRY_OFFSET - BSP_MAP_TAG_DATA_OFFSET;
    let scenario_offset = entry_offset + scenario::BSP_ENTRY_SIZE;
    let path_offset = scenario_offset + scenario::STRUCTURE_BSPS + REFLEXIVE_SIZE;

    let mut tag_data = TagDataHeader {
        tag_array_address: base + TAG_DATA_HEADER_SIZE as u32,
        scenario_tag: TagId::from_index(0).raw(),
        tag_count: 2,
        tags_literal: TAGS_LITERAL,
        ..Default::default()
    }
    .to_bytes()
    .to_vec();

    let classes = [
        (TagClass::Scenario, base + scenario_offset as u32),
        (TagClass::ScenarioStructureBsp, 0),
    ];
    for (index, (class, data_address)) in classes.into_iter().enumerate() {
        let entry = TagArrayEntry {
            primary_class: class.fourcc(),
            secondary_class: class.secondary_fourcc(),
            tertiary_class: class.tertiary_fourcc(),
            tag_id: TagId::from_index(index).raw(),
            path_address: base + path_offset as u32,
            data_address,
            indexed: 0,
        };
        tag_data.extend_from_slice(&entry.to_bytes());
    }

    tag_data.resize(path_offset, 0);
    write_u32_le(&mut tag_data, entry_offset + scenario::BSP_START, BSP_OFFSET as u32);
    write_u32_le(&mut tag_data, entry_offset + scenario::BSP_SIZE, BSP_SIZE as u32);
    write_u32_le(&mut tag_data, entry_offset + scenario::BSP_ADDRESS, 0x4000_0000);
    let bsps = scenario_offset + scenario::STRUCTURE_BSPS;
    write_u32_le(&mut tag_data, bsps + reflexive::COUNT, 1);
    write_u32_le(&mut tag_data, bsps + reflexive::POINTER, base + entry_offset as u32);
    tag_data.extend_from_slice(b"levels\\a\\a\0");
    tag_data.resize(align_up(tag_data.len(), 4), 0);

    let mut header = CacheHeader::new(engine);
    header.name = "a".into();
    header.build = engine.default_build().into();
    header.tag_data_offset = BSP_MAP_TAG_DATA_OFFSET as u64;
    header.tag_data_size = tag_data.len() as u64;
    header.decompressed_file_size = (BSP_MAP_TAG_DATA_OFFSET + tag_data.len()) as u64;

    let mut bytes = header.to_bytes().to_vec();
    bytes.extend(std::iter::repeat_n(0xB5, BSP_SIZE));
    bytes.extend(std::iter::repeat_n(0xA5, ASSET_SIZE));
    bytes.extend_from_slice(&tag_data);
    bytes
}
