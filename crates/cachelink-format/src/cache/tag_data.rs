//! Tag data header, tag array entries and the layouts of linked fields.

use super::read_u32_le;

pub const TAG_DATA_HEADER_SIZE: usize = 0x28;
pub const TAG_ARRAY_ENTRY_SIZE: usize = 0x20;

/// `tags`, read as a little-endian u32.
pub const TAGS_LITERAL: u32 = 0x7461_6773;

/// Tag reference field: class, path pointer, path size, tag ID.
pub const DEPENDENCY_SIZE: usize = 0x10;
/// Array field: count, pointer, reserved.
pub const REFLEXIVE_SIZE: usize = 0xC;
/// Raw data field: size, flags, file offset, pointer, reserved.
pub const DATA_SIZE: usize = 0x14;

/// Data field flag: payload lives outside tag space.
pub const DATA_FLAG_EXTERNAL: u32 = 1;

pub mod dependency {
    pub const CLASS: usize = 0x0;
    pub const PATH_POINTER: usize = 0x4;
    pub const PATH_SIZE: usize = 0x8;
    pub const TAG_ID: usize = 0xC;
}

pub mod reflexive {
    pub const COUNT: usize = 0x0;
    pub const POINTER: usize = 0x4;
}

pub mod data {
    pub const SIZE: usize = 0x0;
    pub const FLAGS: usize = 0x4;
    pub const FILE_OFFSET: usize = 0x8;
    pub const POINTER: usize = 0xC;
}

/// Scenario root struct: the `structure_bsps` array and its 0x20-byte
/// entries, which locate each BSP in the file.
pub mod scenario {
    pub const STRUCTURE_BSPS: usize = 0x5A4;
    pub const BSP_ENTRY_SIZE: usize = 0x20;
    pub const BSP_START: usize = 0x0;
    pub const BSP_SIZE: usize = 0x4;
    pub const BSP_ADDRESS: usize = 0x8;
}

/// Header at the start of tag data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagDataHeader {
    pub tag_array_address: u32,
    pub scenario_tag: u32,
    /// Free word used to steer the map CRC.
    pub random_number: u32,
    pub tag_count: u32,
    pub model_part_count: u32,
    pub model_data_file_offset: u32,
    pub model_part_count_again: u32,
    pub vertex_size: u32,
    pub model_data_size: u32,
    pub tags_literal: u32,
}

impl TagDataHeader {
    /// Offset of `random_number` from the start of tag data.
    pub const RANDOM_NUMBER_OFFSET: usize = 0x8;

    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= TAG_DATA_HEADER_SIZE, "tag data header too short");
        Self {
            tag_array_address: read_u32_le(bytes, 0x00),
            scenario_tag: read_u32_le(bytes, 0x04),
            random_number: read_u32_le(bytes, 0x08),
            tag_count: read_u32_le(bytes, 0x0C),
            model_part_count: read_u32_le(bytes, 0x10),
            model_data_file_offset: read_u32_le(bytes, 0x14),
            model_part_count_again: read_u32_le(bytes, 0x18),
            vertex_size: read_u32_le(bytes, 0x1C),
            model_data_size: read_u32_le(bytes, 0x20),
            tags_literal: read_u32_le(bytes, 0x24),
        }
    }

    pub fn to_bytes(&self) -> [u8; TAG_DATA_HEADER_SIZE] {
        let mut bytes = [0u8; TAG_DATA_HEADER_SIZE];
        let fields = [
            self.tag_array_address,
            self.scenario_tag,
            self.random_number,
            self.tag_count,
            self.model_part_count,
            self.model_data_file_offset,
            self.model_part_count_again,
            self.vertex_size,
            self.model_data_size,
            self.tags_literal,
        ];
        for (chunk, value) in bytes.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }
}

/// One entry of the tag array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagArrayEntry {
    pub primary_class: u32,
    pub secondary_class: u32,
    pub tertiary_class: u32,
    pub tag_id: u32,
    pub path_address: u32,
    /// Address of the tag's root struct, 0 for BSP tags.
    pub data_address: u32,
    pub indexed: u32,
}

impl TagArrayEntry {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= TAG_ARRAY_ENTRY_SIZE, "tag array entry too short");
        Self {
            primary_class: read_u32_le(bytes, 0x00),
            secondary_class: read_u32_le(bytes, 0x04),
            tertiary_class: read_u32_le(bytes, 0x08),
            tag_id: read_u32_le(bytes, 0x0C),
            path_address: read_u32_le(bytes, 0x10),
            data_address: read_u32_le(bytes, 0x14),
            indexed: read_u32_le(bytes, 0x18),
        }
    }

    pub fn to_bytes(&self) -> [u8; TAG_ARRAY_ENTRY_SIZE] {
        let mut bytes = [0u8; TAG_ARRAY_ENTRY_SIZE];
        let fields = [
            self.primary_class,
            self.secondary_class,
            self.tertiary_class,
            self.tag_id,
            self.path_address,
            self.data_address,
            self.indexed,
        ];
        for (chunk, value) in bytes.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }
}
