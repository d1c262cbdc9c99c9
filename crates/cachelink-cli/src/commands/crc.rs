use std::path::PathBuf;

use cachelink_format::{MapCrc, calculate_map_crc, forge_map_crc};

use super::{CliError, Result, read_file, write_file};

pub struct CrcArgs {
    pub map: PathBuf,
    pub forge: Option<u32>,
    pub random: Option<u32>,
}

pub fn run(args: CrcArgs) -> Result<()> {
    println!("{}", describe(&crc(&args)?));
    Ok(())
}

/// Compute the CRC, rewriting the file in place when forging.
pub fn crc(args: &CrcArgs) -> Result<MapCrc> {
    let mut data = read_file(&args.map)?;
    let map_error = |source| CliError::Map {
        path: args.map.clone(),
        source,
    };

    if args.forge.is_none() && args.random.is_none() {
        return calculate_map_crc(&data).map_err(map_error);
    }
    let crc = forge_map_crc(&mut data, args.forge, args.random).map_err(map_error)?;
    write_file(&args.map, &data)?;
    Ok(crc)
}

pub fn describe(crc: &MapCrc) -> String {
    let mut out = format!("0x{:08X}", crc.effective());
    if crc.dirty {
        out.push_str(" (header CRC does not match)");
    }
    out
}
