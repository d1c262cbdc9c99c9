use cachelink_core::{Engine, TagClass};
use crc32fast::Hasher;

use super::crc::{calculate_map_crc, forge_map_crc};
use super::map::MapError;
use super::tag_data::{TAG_DATA_HEADER_SIZE, TagDataHeader, scenario};
use super::test_utils::{
    ASSET_OFFSET, ASSET_SIZE, BSP_ENTRY_OFFSET, BSP_MAP_TAG_DATA_OFFSET, BSP_OFFSET, BSP_SIZE,
    build_map, build_map_with_bsp,
};
use super::{read_u32_le, write_u32_le};

const TAGS: &[(TagClass, &str)] = &[
    (TagClass::Scenario, "levels\\test\\test"),
    (TagClass::Globals, "globals\\globals"),
];

/// Tag data starts right after the header in test maps.
const RANDOM_OFFSET: usize = 0x800 + 8;

#[test]
fn fresh_map_is_dirty_until_forged() {
    let mut bytes = build_map(Engine::CustomEdition, TAGS);
    let before = calculate_map_crc(&bytes).unwrap();
    assert!(before.dirty);
    assert_eq!(before.random, 0);

    let forged = forge_map_crc(&mut bytes, None, None).unwrap();
    assert_eq!(forged.crc, before.crc);
    assert_eq!(read_u32_le(&bytes, 0x64), before.crc);

    let after = calculate_map_crc(&bytes).unwrap();
    assert!(!after.dirty);
    assert_eq!(after.effective(), before.crc);
}

#[test]
fn forge_to_requested_crc() {
    let mut bytes = build_map(Engine::CustomEdition, TAGS);
    let forged = forge_map_crc(&mut bytes, Some(0x1234_5678), None).unwrap();
    assert_eq!(forged.effective(), 0x1234_5678);

    let check = calculate_map_crc(&bytes).unwrap();
    assert!(!check.dirty);
    assert_eq!(check.effective(), 0x1234_5678);
    assert_eq!(read_u32_le(&bytes, 0x64), 0x1234_5678);
}

#[test]
fn forge_with_random_number() {
    let mut bytes = build_map(Engine::Retail, TAGS);
    let forged = forge_map_crc(&mut bytes, None, Some(0xAAAA_5555)).unwrap();

    assert_eq!(read_u32_le(&bytes, RANDOM_OFFSET), 0xAAAA_5555);
    assert_eq!(read_u32_le(&bytes, 0x64), forged.crc ^ 0xAAAA_5555);
    assert!(!calculate_map_crc(&bytes).unwrap().dirty);
}

#[test]
fn random_number_is_outside_the_hash() {
    let mut bytes = build_map(Engine::CustomEdition, TAGS);
    let before = calculate_map_crc(&bytes).unwrap();

    write_u32_le(&mut bytes, RANDOM_OFFSET, 0xFFFF_FFFF);
    let after = calculate_map_crc(&bytes).unwrap();
    assert_eq!(after.crc, before.crc);
    assert_eq!(after.random, 0xFFFF_FFFF);

    let last = bytes.len() - 1;
    bytes[last] ^= 1;
    assert_ne!(calculate_map_crc(&bytes).unwrap().crc, before.crc);
}

#[test]
fn header_is_outside_the_hash() {
    let mut bytes = build_map(Engine::CustomEdition, TAGS);
    let before = calculate_map_crc(&bytes).unwrap();

    bytes[0x20] = b'z';
    assert_eq!(calculate_map_crc(&bytes).unwrap().crc, before.crc);
}

#[test]
fn demo_crc_lives_at_its_own_offset() {
    let mut bytes = build_map(Engine::Demo, TAGS);
    let forged = forge_map_crc(&mut bytes, Some(0xCAFE_F00D), None).unwrap();

    assert_eq!(forged.effective(), 0xCAFE_F00D);
    assert_eq!(read_u32_le(&bytes, 0x5B0), 0xCAFE_F00D);
    assert_eq!(read_u32_le(&bytes, 0x64), 0);
}

#[test]
fn truncated_tag_data_is_rejected() {
    let bytes = build_map(Engine::CustomEdition, TAGS);
    assert!(calculate_map_crc(&bytes[..0x804]).is_err());
}

#[test]
fn bsps_are_hashed_ahead_of_tag_data() {
    let bytes = build_map_with_bsp(Engine::CustomEdition);
    let random = BSP_MAP_TAG_DATA_OFFSET + TagDataHeader::RANDOM_NUMBER_OFFSET;

    let mut hasher = Hasher::new();
    hasher.update(&bytes[BSP_OFFSET..BSP_OFFSET + BSP_SIZE]);
    hasher.update(&bytes[BSP_MAP_TAG_DATA_OFFSET..random]);
    hasher.update(&[0; 4]);
    hasher.update(&bytes[random + 4..]);

    assert_eq!(calculate_map_crc(&bytes).unwrap().crc, hasher.finalize());
}

#[test]
fn asset_data_is_outside_the_hash() {
    let mut bytes = build_map_with_bsp(Engine::CustomEdition);
    let before = forge_map_crc(&mut bytes, None, None).unwrap();

    bytes[ASSET_OFFSET] ^= 0xFF;
    let after = calculate_map_crc(&bytes).unwrap();
    assert_eq!(after.crc, before.crc);
    assert!(!after.dirty);

    bytes[BSP_OFFSET] ^= 0xFF;
    let after = calculate_map_crc(&bytes).unwrap();
    assert_ne!(after.crc, before.crc);
    assert!(after.dirty);
}

#[test]
fn model_data_is_hashed() {
    let mut bytes = build_map_with_bsp(Engine::CustomEdition);
    let tag_data = BSP_MAP_TAG_DATA_OFFSET..BSP_MAP_TAG_DATA_OFFSET + TAG_DATA_HEADER_SIZE;
    let mut header = TagDataHeader::from_bytes(&bytes[tag_data.clone()]);
    header.model_data_file_offset = ASSET_OFFSET as u32;
    header.model_data_size = ASSET_SIZE as u32;
    bytes[tag_data.clone()].copy_from_slice(&header.to_bytes());
    let before = calculate_map_crc(&bytes).unwrap();

    bytes[ASSET_OFFSET] ^= 0xFF;
    assert_ne!(calculate_map_crc(&bytes).unwrap().crc, before.crc);

    header.model_data_size = u32::MAX;
    bytes[tag_data].copy_from_slice(&header.to_bytes());
    assert!(matches!(
        calculate_map_crc(&bytes).unwrap_err(),
        MapError::ModelDataOutOfBounds { size: u32::MAX, .. }
    ));
}

#[test]
fn bsp_outside_the_file_is_rejected() {
    let mut bytes = build_map_with_bsp(Engine::CustomEdition);
    let len = bytes.len();
    write_u32_le(&mut bytes, BSP_ENTRY_OFFSET + scenario::BSP_SIZE, len as u32);

    match calculate_map_crc(&bytes).unwrap_err() {
        MapError::BspOutOfBounds { index, start, size } => {
            assert_eq!((index, start, size), (0, BSP_OFFSET, len));
        }
        other => panic!("unexpected error: {other}"),
    }
}
