use std::path::PathBuf;

use cachelink_core::Engine;
use cachelink_format::{compress_map, decompress_map};

use super::{CliError, Result, read_file, write_file};

pub struct CompressArgs {
    pub map: PathBuf,
    pub output: PathBuf,
    pub engine: Engine,
    pub level: Option<i32>,
}

pub fn run_compress(args: CompressArgs) -> Result<()> {
    let data = read_file(&args.map)?;
    let compressed =
        compress_map(&data, args.engine, args.level).map_err(|source| CliError::Compression {
            path: args.map.clone(),
            source,
        })?;
    write_file(&args.output, &compressed)?;
    println!(
        "{} -> {} bytes ({:.1}%)",
        data.len(),
        compressed.len(),
        ratio(compressed.len(), data.len())
    );
    Ok(())
}

pub struct DecompressArgs {
    pub map: PathBuf,
    pub output: PathBuf,
}

pub fn run_decompress(args: DecompressArgs) -> Result<()> {
    let data = read_file(&args.map)?;
    let decompressed = decompress_map(&data).map_err(|source| CliError::Compression {
        path: args.map.clone(),
        source,
    })?;
    write_file(&args.output, &decompressed)?;
    println!("{} -> {} bytes", data.len(), decompressed.len());
    Ok(())
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}
