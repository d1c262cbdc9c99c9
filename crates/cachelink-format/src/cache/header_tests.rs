use cachelink_core::Engine;

use super::header::{CacheHeader, HEAD_LITERAL_DEMO, HEADER_SIZE, HeaderLayout};
use super::map::MapError;
use super::read_u32_le;

fn sample(engine: Engine) -> CacheHeader {
    let mut header = CacheHeader::new(engine);
    header.decompressed_file_size = 0x12_3456;
    header.tag_data_offset = 0x9000;
    header.tag_data_size = 0x4_0000;
    header.name = "bloodgulch".into();
    header.build = engine.default_build().into();
    header.map_type = 1;
    header.crc32 = 0xDEAD_BEEF;
    header
}

#[test]
fn standard_round_trip() {
    let header = sample(Engine::CustomEdition);
    let bytes = header.to_bytes();

    assert_eq!(&bytes[0..4], b"daeh");
    assert_eq!(read_u32_le(&bytes, 0x4), 0x261);
    assert_eq!(read_u32_le(&bytes, 0x64), 0xDEAD_BEEF);
    assert_eq!(CacheHeader::from_bytes(&bytes).unwrap(), header);
}

#[test]
fn demo_fields_are_scattered() {
    let header = sample(Engine::Demo);
    let bytes = header.to_bytes();

    assert_eq!(read_u32_le(&bytes, 0x2C0), HEAD_LITERAL_DEMO);
    assert_eq!(read_u32_le(&bytes, 0x588), 6);
    assert_eq!(read_u32_le(&bytes, 0x5B0), 0xDEAD_BEEF);
    assert_eq!(read_u32_le(&bytes, 0x5EC), 0x9000);
    assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 1);

    let decoded = CacheHeader::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.layout, HeaderLayout::Demo);
    assert_eq!(decoded, header);
}

#[test]
fn native_sizes_are_64_bit() {
    let mut header = sample(Engine::Native);
    header.decompressed_file_size = 0x1_0000_0010;
    header.compression_type = 1;
    let bytes = header.to_bytes();

    assert_eq!(&bytes[0x8..0x10], &0x1_0000_0010u64.to_le_bytes());
    assert_eq!(u16::from_le_bytes([bytes[0x62], bytes[0x63]]), 1);

    let decoded = CacheHeader::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.layout, HeaderLayout::Native);
    assert_eq!(decoded, header);
    assert!(decoded.is_compressed());
}

#[test]
fn long_names_are_truncated() {
    let mut header = CacheHeader::new(Engine::Retail);
    header.name = "x".repeat(40);
    let decoded = CacheHeader::from_bytes(&header.to_bytes()).unwrap();
    assert_eq!(decoded.name.len(), 31);
}

#[test]
fn compressed_version_is_detected() {
    let mut header = CacheHeader::new(Engine::CustomEdition);
    header.engine_version = 0x861A_0261;
    let decoded = CacheHeader::from_bytes(&header.to_bytes()).unwrap();
    assert!(decoded.is_compressed());
    assert_eq!(decoded.engine(), None);
}

#[test]
fn rejects_short_and_unmarked_input() {
    let err = CacheHeader::from_bytes(&[0; 16]).unwrap_err();
    assert!(matches!(err, MapError::FileTooSmall(16)));

    let err = CacheHeader::from_bytes(&[0; HEADER_SIZE]).unwrap_err();
    assert!(matches!(err, MapError::InvalidLiteral));
}

#[test]
fn crc_offset_per_layout() {
    assert_eq!(HeaderLayout::for_engine(Engine::Retail).crc32_offset(), 0x64);
    assert_eq!(HeaderLayout::for_engine(Engine::Native).crc32_offset(), 0x64);
    assert_eq!(HeaderLayout::for_engine(Engine::Demo).crc32_offset(), 0x5B0);
}
