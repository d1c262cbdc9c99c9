//! cachelink compiler: turns tag field trees into a linked cache file.
//!
//! Pipeline:
//! - `schema` - tag field trees and the sources they are loaded from
//! - `hooks` - per-class validation and fix-ups around linking
//! - `graph` - struct graph construction from field trees
//! - `workload` - dependency resolution, dedupe, layout and serialization
//! - `driver` - end-to-end build with CRC and compression
//! - `diagnostics` - warnings and validation errors

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod driver;
pub mod graph;
pub mod hooks;
pub mod schema;
pub mod workload;

#[cfg(test)]
pub mod test_utils;

use std::path::PathBuf;

use cachelink_core::{PathError, TagClass};
use cachelink_format::{CompressionError, MapError, ResourceMapError};

pub use diagnostics::{DiagnosticKind, Diagnostics, Severity};
pub use driver::{BuildOptions, BuildOutput, BuildSummary, compile_map};
pub use schema::{DirectorySource, MemorySource, TagSource, TagStruct};
pub use workload::{DedupeStats, Layout, Workload, WorkloadState};

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "{from}: broken dependency {path}.{class}{}",
        .found.map(|c| format!(" (only found as {c})")).unwrap_or_default()
    )]
    BrokenDependency {
        from: String,
        path: String,
        class: TagClass,
        found: Option<TagClass>,
    },

    #[error("{tag}: {reason}")]
    InvalidTagData { tag: String, reason: String },

    #[error("invalid tag path: {0}")]
    InvalidTagPath(#[from] PathError),

    #[error("tag {path}.{class} not found in any tag source")]
    TagNotFound { path: String, class: TagClass },

    #[error("{tag} failed validation with {errors} errors")]
    Validation { tag: String, errors: usize },

    #[error("too many tags: {0} (max {max})", max = cachelink_core::MAX_TAG_COUNT)]
    TooManyTags(usize),

    #[error("tag space needs 0x{required:X} bytes, engine provides 0x{available:X}")]
    TagSpaceExceeded { required: u64, available: u64 },

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: WorkloadState,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    ResourceMap(#[from] ResourceMapError),
}

/// Result type for linker operations.
pub type Result<T> = std::result::Result<T, Error>;
