pub mod build;
pub mod compress;
pub mod crc;
pub mod info;
pub mod resources;


use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cachelink_format::{CompressionError, MapError, ResourceMapError};

/// Errors that end a command with exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Build(#[from] cachelink_compiler::Error),

    #[error("{}: {source}", .path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: MapError,
    },

    #[error("{}: {source}", .path.display())]
    Compression {
        path: PathBuf,
        #[source]
        source: CompressionError,
    },

    #[error("{}: {source}", .path.display())]
    ResourceMap {
        path: PathBuf,
        #[source]
        source: ResourceMapError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
