//! Target engines and their fixed memory constants.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Tag space length for the PC-era engines.
pub const MEMORY_LENGTH: u32 = 0x0170_0000;

/// Tag space length for the anniversary engine.
pub const MEMORY_LENGTH_ANNIVERSARY: u32 = 0x01F0_0000;

/// Fixed BSP load address on the anniversary engine.
pub const ANNIVERSARY_BSP_ADDRESS: u32 = 0x4144_8000;

/// Prefix that marks a compressed cache version.
const COMPRESSED_PREFIX: u32 = 0x861A_0000;

/// An engine a cache file can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Engine {
    Xbox,
    Demo,
    Retail,
    CustomEdition,
    /// Retail cache layout, shipped compressed with the fixed-block codec.
    Anniversary,
    Native,
}

/// Whole-file compression applied after linking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionScheme {
    /// Fixed-size zlib blocks with an offset table.
    FixedBlock,
    /// One zstd stream after an uncompressed header.
    Zstd,
}

impl Engine {
    pub const ALL: &'static [Engine] = &[
        Engine::Xbox,
        Engine::Demo,
        Engine::Retail,
        Engine::CustomEdition,
        Engine::Anniversary,
        Engine::Native,
    ];

    /// Value of the header's engine field.
    pub fn cache_version(self) -> u32 {
        match self {
            Engine::Xbox => 5,
            Engine::Demo => 6,
            Engine::Retail | Engine::Anniversary => 7,
            Engine::CustomEdition => 0x261,
            Engine::Native => 0x1A86,
        }
    }

    /// Engine for a header's engine field.
    ///
    /// Version 7 is reported as [`Engine::Retail`]; the anniversary build
    /// can only be told apart by its base address.
    pub fn from_cache_version(version: u32) -> Option<Self> {
        match version {
            5 => Some(Engine::Xbox),
            6 => Some(Engine::Demo),
            7 => Some(Engine::Retail),
            0x261 => Some(Engine::CustomEdition),
            0x1A86 => Some(Engine::Native),
            _ => None,
        }
    }

    /// Recognize an engine from its tag space base address.
    pub fn from_base_address(address: u32, version: u32) -> Option<Self> {
        let engine = Self::from_cache_version(version)?;
        if engine == Engine::Retail && address == Engine::Anniversary.base_address() {
            return Some(Engine::Anniversary);
        }
        Some(engine)
    }

    /// Engine field value of a compressed cache file, if the engine has one.
    pub fn compressed_cache_version(self) -> Option<u32> {
        match self {
            Engine::Xbox | Engine::Demo | Engine::Retail | Engine::CustomEdition => {
                Some(COMPRESSED_PREFIX | self.cache_version())
            }
            Engine::Anniversary | Engine::Native => None,
        }
    }

    pub fn is_compressed_version(version: u32) -> bool {
        version & 0xFFFF_0000 == COMPRESSED_PREFIX
    }

    /// Address tag space is loaded at.
    pub fn base_address(self) -> u32 {
        match self {
            Engine::Retail | Engine::CustomEdition => 0x4044_0000,
            Engine::Demo => 0x4BF1_0000,
            Engine::Anniversary => 0x4044_8000,
            Engine::Xbox => 0x803A_6000,
            Engine::Native => 0,
        }
    }

    /// Bytes available for tag data plus the largest BSP.
    pub fn memory_length(self) -> u32 {
        match self {
            Engine::Anniversary => MEMORY_LENGTH_ANNIVERSARY,
            Engine::Native => u32::MAX,
            _ => MEMORY_LENGTH,
        }
    }

    /// Load address of a BSP partition of `size` bytes.
    pub fn bsp_address(self, size: u32) -> u32 {
        match self {
            Engine::Anniversary => ANNIVERSARY_BSP_ADDRESS,
            _ => self
                .base_address()
                .wrapping_add(self.memory_length())
                .wrapping_sub(size),
        }
    }

    pub fn compression(self) -> Option<CompressionScheme> {
        match self {
            Engine::Anniversary => Some(CompressionScheme::FixedBlock),
            Engine::Native => Some(CompressionScheme::Zstd),
            _ => None,
        }
    }

    /// Accepted zstd levels.
    pub fn zstd_levels(self) -> RangeInclusive<i32> {
        match self {
            Engine::Native => 1..=19,
            _ => 1..=9,
        }
    }

    /// Build string written when none is given.
    pub fn default_build(self) -> &'static str {
        match self {
            Engine::Xbox => "01.10.12.2276",
            Engine::Demo => "01.00.00.0576",
            Engine::Retail => "01.00.00.0564",
            Engine::CustomEdition | Engine::Anniversary => "01.00.00.0609",
            Engine::Native => "cachelink",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Engine::Xbox => "xbox",
            Engine::Demo => "demo",
            Engine::Retail => "retail",
            Engine::CustomEdition => "custom",
            Engine::Anniversary => "anniversary",
            Engine::Native => "native",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Engine::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Engine::ALL.iter().map(|e| e.name()).collect();
                format!("unknown engine '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Scenario type stored in the cache header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MapType {
    #[default]
    Singleplayer,
    Multiplayer,
    UserInterface,
}

impl MapType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(MapType::Singleplayer),
            1 => Some(MapType::Multiplayer),
            2 => Some(MapType::UserInterface),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            MapType::Singleplayer => 0,
            MapType::Multiplayer => 1,
            MapType::UserInterface => 2,
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MapType::Singleplayer => "singleplayer",
            MapType::Multiplayer => "multiplayer",
            MapType::UserInterface => "user_interface",
        })
    }
}
