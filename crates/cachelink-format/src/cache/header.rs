//! Cache file header (0x800 bytes).
//!
//! Three layouts share one in-memory form:
//! - standard: Xbox, retail, custom edition, anniversary
//! - demo: the same fields scattered through the block, with its own literals
//! - native: 64-bit sizes and a compression type in the former padding

use cachelink_core::Engine;

use super::map::MapError;
use super::{read_u16_le, read_u32_le, read_u64_le, write_u32_le};

/// Size of every header layout.
pub const HEADER_SIZE: usize = 0x800;

/// `head`, read as a little-endian u32.
pub const HEAD_LITERAL: u32 = 0x6865_6164;
/// `foot`, read as a little-endian u32.
pub const FOOT_LITERAL: u32 = 0x666F_6F74;
pub const HEAD_LITERAL_DEMO: u32 = 0x4568_6564;
pub const FOOT_LITERAL_DEMO: u32 = 0x4766_6F74;

/// Length of the name and build fields, terminator included.
const STRING_FIELD_SIZE: usize = 0x20;

/// Native compression type for a zstd payload.
pub const COMPRESSION_ZSTD: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderLayout {
    Standard,
    Demo,
    Native,
}

/// Field offsets of one layout.
struct Offsets {
    head: usize,
    foot: usize,
    engine: usize,
    decompressed_file_size: usize,
    tag_data_offset: usize,
    tag_data_size: usize,
    name: usize,
    build: usize,
    map_type: usize,
    crc32: usize,
}

const STANDARD: Offsets = Offsets {
    head: 0x0,
    foot: 0x7FC,
    engine: 0x4,
    decompressed_file_size: 0x8,
    tag_data_offset: 0x10,
    tag_data_size: 0x14,
    name: 0x20,
    build: 0x40,
    map_type: 0x60,
    crc32: 0x64,
};

const DEMO: Offsets = Offsets {
    head: 0x2C0,
    foot: 0x5F0,
    engine: 0x588,
    decompressed_file_size: 0x5E8,
    tag_data_offset: 0x5EC,
    tag_data_size: 0x2C4,
    name: 0x58C,
    build: 0x2C8,
    map_type: 0x2,
    crc32: 0x5B0,
};

const NATIVE: Offsets = Offsets {
    head: 0x0,
    foot: 0x7FC,
    engine: 0x4,
    decompressed_file_size: 0x8,
    tag_data_offset: 0x10,
    tag_data_size: 0x18,
    name: 0x20,
    build: 0x40,
    map_type: 0x60,
    crc32: 0x64,
};

/// Standard-only field.
const COMPRESSED_PADDING_OFFSET: usize = 0xC;
/// Native-only field.
const COMPRESSION_TYPE_OFFSET: usize = 0x62;

impl HeaderLayout {
    pub fn for_engine(engine: Engine) -> Self {
        match engine {
            Engine::Demo => HeaderLayout::Demo,
            Engine::Native => HeaderLayout::Native,
            _ => HeaderLayout::Standard,
        }
    }

    fn offsets(self) -> &'static Offsets {
        match self {
            HeaderLayout::Standard => &STANDARD,
            HeaderLayout::Demo => &DEMO,
            HeaderLayout::Native => &NATIVE,
        }
    }

    /// Byte offset of the CRC32 field.
    pub fn crc32_offset(self) -> usize {
        self.offsets().crc32
    }

    fn literals(self) -> (u32, u32) {
        match self {
            HeaderLayout::Demo => (HEAD_LITERAL_DEMO, FOOT_LITERAL_DEMO),
            _ => (HEAD_LITERAL, FOOT_LITERAL),
        }
    }
}

/// Decoded cache file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheHeader {
    pub layout: HeaderLayout,
    /// Raw engine field (may be a compressed version).
    pub engine_version: u32,
    pub decompressed_file_size: u64,
    /// Standard layout only.
    pub compressed_padding: u32,
    pub tag_data_offset: u64,
    pub tag_data_size: u64,
    pub name: String,
    pub build: String,
    pub map_type: u16,
    /// Native layout only.
    pub compression_type: u16,
    pub crc32: u32,
}

impl CacheHeader {
    /// An empty header for `engine`.
    pub fn new(engine: Engine) -> Self {
        Self {
            layout: HeaderLayout::for_engine(engine),
            engine_version: engine.cache_version(),
            decompressed_file_size: 0,
            compressed_padding: 0,
            tag_data_offset: 0,
            tag_data_size: 0,
            name: String::new(),
            build: String::new(),
            map_type: 0,
            compression_type: 0,
            crc32: 0,
        }
    }

    /// Decode a header, detecting its layout from the literals.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MapError> {
        if bytes.len() < HEADER_SIZE {
            return Err(MapError::FileTooSmall(bytes.len()));
        }

        let layout = detect_layout(bytes).ok_or(MapError::InvalidLiteral)?;
        let o = layout.offsets();
        let wide = layout == HeaderLayout::Native;
        let read_size = |offset: usize| {
            if wide {
                read_u64_le(bytes, offset)
            } else {
                read_u32_le(bytes, offset) as u64
            }
        };

        Ok(Self {
            layout,
            engine_version: read_u32_le(bytes, o.engine),
            decompressed_file_size: read_size(o.decompressed_file_size),
            compressed_padding: if layout == HeaderLayout::Standard {
                read_u32_le(bytes, COMPRESSED_PADDING_OFFSET)
            } else {
                0
            },
            tag_data_offset: read_size(o.tag_data_offset),
            tag_data_size: read_size(o.tag_data_size),
            name: read_string(bytes, o.name),
            build: read_string(bytes, o.build),
            map_type: read_u16_le(bytes, o.map_type),
            compression_type: if wide {
                read_u16_le(bytes, COMPRESSION_TYPE_OFFSET)
            } else {
                0
            },
            crc32: read_u32_le(bytes, o.crc32),
        })
    }

    /// Encode the header in its layout.
    ///
    /// Sizes wider than 32 bits are truncated outside the native layout;
    /// callers check file limits before encoding.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let o = self.layout.offsets();
        let (head, foot) = self.layout.literals();
        let wide = self.layout == HeaderLayout::Native;

        let mut write_size = |offset: usize, value: u64| {
            if wide {
                bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
            } else {
                write_u32_le(&mut bytes, offset, value as u32);
            }
        };
        write_size(o.decompressed_file_size, self.decompressed_file_size);
        write_size(o.tag_data_offset, self.tag_data_offset);
        write_size(o.tag_data_size, self.tag_data_size);

        write_u32_le(&mut bytes, o.head, head);
        write_u32_le(&mut bytes, o.foot, foot);
        write_u32_le(&mut bytes, o.engine, self.engine_version);
        write_u32_le(&mut bytes, o.crc32, self.crc32);
        bytes[o.map_type..o.map_type + 2].copy_from_slice(&self.map_type.to_le_bytes());
        write_string(&mut bytes, o.name, &self.name);
        write_string(&mut bytes, o.build, &self.build);

        match self.layout {
            HeaderLayout::Standard => {
                write_u32_le(&mut bytes, COMPRESSED_PADDING_OFFSET, self.compressed_padding);
            }
            HeaderLayout::Native => {
                bytes[COMPRESSION_TYPE_OFFSET..COMPRESSION_TYPE_OFFSET + 2]
                    .copy_from_slice(&self.compression_type.to_le_bytes());
            }
            HeaderLayout::Demo => {}
        }

        bytes
    }

    /// Engine named by the engine field, if it is a known uncompressed version.
    pub fn engine(&self) -> Option<Engine> {
        Engine::from_cache_version(self.engine_version)
    }

    pub fn is_compressed(&self) -> bool {
        Engine::is_compressed_version(self.engine_version)
            || (self.layout == HeaderLayout::Native && self.compression_type != 0)
    }
}

fn detect_layout(bytes: &[u8]) -> Option<HeaderLayout> {
    if read_u32_le(bytes, STANDARD.head) == HEAD_LITERAL
        && read_u32_le(bytes, STANDARD.foot) == FOOT_LITERAL
    {
        if read_u32_le(bytes, STANDARD.engine) == Engine::Native.cache_version() {
            return Some(HeaderLayout::Native);
        }
        return Some(HeaderLayout::Standard);
    }
    if read_u32_le(bytes, DEMO.head) == HEAD_LITERAL_DEMO
        && read_u32_le(bytes, DEMO.foot) == FOOT_LITERAL_DEMO
    {
        return Some(HeaderLayout::Demo);
    }
    None
}

/// Read a null-terminated string field.
fn read_string(bytes: &[u8], offset: usize) -> String {
    let field = &bytes[offset..offset + STRING_FIELD_SIZE];
    let end = field.iter().position(|&b| b == 0).unwrap_or(STRING_FIELD_SIZE);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Write a string field, truncated to leave room for the terminator.
fn write_string(bytes: &mut [u8], offset: usize, value: &str) {
    let raw = value.as_bytes();
    let len = raw.len().min(STRING_FIELD_SIZE - 1);
    bytes[offset..offset + len].copy_from_slice(&raw[..len]);
}
