//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs that mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use cachelink_core::Engine;
use clap::ArgMatches;
use log::LevelFilter;

use crate::commands::build::BuildArgs;
use crate::commands::compress::{CompressArgs, DecompressArgs};
use crate::commands::crc::CrcArgs;
use crate::commands::info::InfoArgs;
use crate::commands::resources::ResourcesArgs;

/// Log level for a `-v` count; `warn` without any.
pub fn verbosity(m: &ArgMatches) -> LevelFilter {
    match m.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub struct BuildParams {
    pub scenario: String,
    pub tags: Vec<PathBuf>,
    pub output: PathBuf,
    pub engine: Engine,
    pub build_string: Option<String>,
    pub forge_crc: Option<u32>,
    pub compress: bool,
    pub level: Option<i32>,
    pub resource_maps: Vec<PathBuf>,
    pub no_globals: bool,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            scenario: m.get_one::<String>("scenario").cloned().unwrap_or_default(),
            tags: m
                .get_many::<PathBuf>("tags")
                .map(|dirs| dirs.cloned().collect())
                .unwrap_or_default(),
            output: m.get_one::<PathBuf>("output").cloned().unwrap_or_default(),
            engine: m
                .get_one::<Engine>("engine")
                .copied()
                .unwrap_or(Engine::CustomEdition),

            build_string: m.get_one::<String>("build_string").cloned(),
            forge_crc: m.get_one::<u32>("forge_crc").copied(),
            compress: m.get_flag("compress"),
            level: m.get_one::<i32>("level").copied(),
            resource_maps: m
                .get_many::<PathBuf>("resource_map")
                .map(|maps| maps.cloned().collect())
                .unwrap_or_default(),
            no_globals: m.get_flag("no_globals"),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        Self {
            scenario: p.scenario,
            tags: p.tags,
            output: p.output,
            engine: p.engine,
            build_string: p.build_string,
            forge_crc: p.forge_crc,
            compress: p.compress,
            level: p.level,
            resource_maps: p.resource_maps,
            globals: !p.no_globals,
        }
    }
}

pub struct CompressParams {
    pub map: PathBuf,
    pub output: PathBuf,
    pub engine: Engine,
    pub level: Option<i32>,
}

impl CompressParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            map: m.get_one::<PathBuf>("map").cloned().unwrap_or_default(),
            output: m.get_one::<PathBuf>("output").cloned().unwrap_or_default(),
            engine: m
                .get_one::<Engine>("engine")
                .copied()
                .unwrap_or(Engine::Native),
            level: m.get_one::<i32>("level").copied(),
        }
    }
}

impl From<CompressParams> for CompressArgs {
    fn from(p: CompressParams) -> Self {
        Self {
            map: p.map,
            output: p.output,
            engine: p.engine,
            level: p.level,
        }
    }
}

pub struct DecompressParams {
    pub map: PathBuf,
    pub output: PathBuf,
}

impl DecompressParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            map: m.get_one::<PathBuf>("map").cloned().unwrap_or_default(),
            output: m.get_one::<PathBuf>("output").cloned().unwrap_or_default(),
        }
    }
}

impl From<DecompressParams> for DecompressArgs {
    fn from(p: DecompressParams) -> Self {
        Self {
            map: p.map,
            output: p.output,
        }
    }
}

pub struct CrcParams {
    pub map: PathBuf,
    pub forge: Option<u32>,
    pub random: Option<u32>,
}

impl CrcParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            map: m.get_one::<PathBuf>("map").cloned().unwrap_or_default(),
            forge: m.get_one::<u32>("forge").copied(),
            random: m.get_one::<u32>("random").copied(),
        }
    }
}

impl From<CrcParams> for CrcArgs {
    fn from(p: CrcParams) -> Self {
        Self {
            map: p.map,
            forge: p.forge,
            random: p.random,
        }
    }
}

pub struct InfoParams {
    pub map: PathBuf,
}

impl InfoParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            map: m.get_one::<PathBuf>("map").cloned().unwrap_or_default(),
        }
    }
}

impl From<InfoParams> for InfoArgs {
    fn from(p: InfoParams) -> Self {
        Self { map: p.map }
    }
}

pub struct ResourcesParams {
    pub file: PathBuf,
}

impl ResourcesParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            file: m.get_one::<PathBuf>("file").cloned().unwrap_or_default(),
        }
    }
}

impl From<ResourcesParams> for ResourcesArgs {
    fn from(p: ResourcesParams) -> Self {
        Self { file: p.file }
    }
}
