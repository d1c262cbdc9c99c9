use std::fmt::Write as _;
use std::path::PathBuf;

use cachelink_format::{ResourceMap, ResourceType};

use super::{CliError, Result};

pub struct ResourcesArgs {
    pub file: PathBuf,
}

pub fn run(args: ResourcesArgs) -> Result<()> {
    print!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &ResourcesArgs) -> Result<String> {
    let map = ResourceMap::from_path(&args.file).map_err(|source| CliError::ResourceMap {
        path: args.file.clone(),
        source,
    })?;

    let kind = match map.kind() {
        ResourceType::Bitmaps => "bitmaps",
        ResourceType::Sounds => "sounds",
        ResourceType::Loc => "loc",
    };
    let mut out = format!("type = {kind}\ncount = {}\n", map.resources().len());
    let w = map.resources().len().saturating_sub(1).to_string().len();
    for (index, resource) in map.resources().iter().enumerate() {
        let _ = writeln!(
            out,
            "{index:0w$} 0x{:08X} {:>8} {}",
            resource.data_offset, resource.size, resource.path
        );
    }
    Ok(out)
}
