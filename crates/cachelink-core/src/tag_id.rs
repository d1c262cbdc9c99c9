//! Tag identifiers.
//!
//! The engine identifies a tag by its index in the tag array, salted in the
//! upper 16 bits so that stale IDs are unlikely to alias a live tag.

use std::fmt;

const SALT: u32 = 0xE741;

/// A tag ID as written into cache files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TagId(u32);

impl TagId {
    /// The null tag ID.
    pub const NULL: TagId = TagId(0xFFFF_FFFF);

    /// Compute the tag ID for a tag array index.
    pub fn from_index(index: usize) -> Self {
        let index = index as u32;
        Self((index & 0xFFFF) | ((index.wrapping_add(SALT) << 16) & 0xFFFF_0000))
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// Tag array index, or `None` for the null ID.
    pub fn index(self) -> Option<usize> {
        if self.is_null() {
            None
        } else {
            Some((self.0 & 0xFFFF) as usize)
        }
    }

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
