use std::path::PathBuf;

use cachelink_format::{CacheMap, dump};

use super::{CliError, Result};

pub struct InfoArgs {
    pub map: PathBuf,
}

pub fn run(args: InfoArgs) -> Result<()> {
    print!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &InfoArgs) -> Result<String> {
    let map = CacheMap::from_path(&args.map).map_err(|source| CliError::Map {
        path: args.map.clone(),
        source,
    })?;
    Ok(dump(&map))
}
