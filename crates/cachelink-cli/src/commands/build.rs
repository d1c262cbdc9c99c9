use std::path::PathBuf;

use cachelink_compiler::{BuildOptions, BuildSummary, DirectorySource, compile_map};
use cachelink_core::Engine;

use super::{Result, write_file};

pub struct BuildArgs {
    pub scenario: String,
    pub tags: Vec<PathBuf>,
    pub output: PathBuf,
    pub engine: Engine,
    pub build_string: Option<String>,
    pub forge_crc: Option<u32>,
    pub compress: bool,
    pub level: Option<i32>,
    pub resource_maps: Vec<PathBuf>,
    pub globals: bool,
}

impl BuildArgs {
    fn options(&self) -> BuildOptions {
        let mut options = BuildOptions::new(self.engine);
        options.build = self.build_string.clone();
        options.forge_crc = self.forge_crc;
        options.compress = self.compress;
        options.compression_level = self.level;
        options.resource_maps = self.resource_maps.clone();
        if !self.globals {
            options.required_tags.clear();
        }
        options
    }
}

pub fn run(args: BuildArgs) -> Result<()> {
    let summary = build(&args)?;
    println!("{summary}");
    Ok(())
}

/// Link the map and write it; nothing is written when linking fails.
pub fn build(args: &BuildArgs) -> Result<BuildSummary> {
    let source = DirectorySource::new(args.tags.iter().cloned());
    let output = compile_map(&source, &args.scenario, &args.options())?;
    write_file(&args.output, &output.bytes)?;
    log::info!("wrote {}", args.output.display());
    Ok(output.summary)
}
