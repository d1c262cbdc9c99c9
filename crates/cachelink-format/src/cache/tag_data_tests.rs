use super::tag_data::{TAGS_LITERAL, TagArrayEntry, TagDataHeader};

#[test]
fn tag_data_header_layout() {
    let header = TagDataHeader {
        tag_array_address: 0x4044_0028,
        scenario_tag: 0xE741_0000,
        random_number: 0x1234_5678,
        tag_count: 3,
        tags_literal: TAGS_LITERAL,
        ..Default::default()
    };
    let bytes = header.to_bytes();

    assert_eq!(&bytes[0x24..0x28], b"sgat");
    assert_eq!(
        &bytes[TagDataHeader::RANDOM_NUMBER_OFFSET..TagDataHeader::RANDOM_NUMBER_OFFSET + 4],
        &0x1234_5678u32.to_le_bytes()
    );
    assert_eq!(TagDataHeader::from_bytes(&bytes), header);
}

#[test]
fn tag_array_entry_layout() {
    let entry = TagArrayEntry {
        primary_class: u32::from_be_bytes(*b"scnr"),
        secondary_class: 0xFFFF_FFFF,
        tertiary_class: 0xFFFF_FFFF,
        tag_id: 0xE741_0000,
        path_address: 0x4044_0048,
        data_address: 0x4044_0100,
        indexed: 0,
    };
    let bytes = entry.to_bytes();

    assert_eq!(&bytes[0x0C..0x10], &0xE741_0000u32.to_le_bytes());
    assert_eq!(&bytes[0x1C..0x20], &[0; 4]);
    assert_eq!(TagArrayEntry::from_bytes(&bytes), entry);
}
