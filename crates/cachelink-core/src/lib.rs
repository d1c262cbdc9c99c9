#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core vocabulary shared by the cachelink crates.
//!
//! - [`TagClass`]: the closed set of tag classes with their fourccs and extensions
//! - [`TagId`]: the salted tag identifiers written into cache files
//! - [`Engine`]: target engines and their memory constants
//! - [`path`]: tag path normalization and validation

pub mod engine;
pub mod path;
pub mod tag_class;
pub mod tag_id;

#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod path_tests;

pub use engine::{CompressionScheme, Engine, MapType};
pub use path::{PathError, TagPath, scenario_name};
pub use tag_class::TagClass;
pub use tag_id::TagId;

/// Maximum number of tags in one cache file.
pub const MAX_TAG_COUNT: usize = 65535;

/// Maximum length of a tag path in bytes.
pub const MAX_PATH_LENGTH: usize = 254;

/// Size of an engine pointer field.
pub const POINTER_SIZE: usize = 4;

/// Round up to the next multiple of `align` (a power of two).
pub fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}
