//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands,
//! so flags such as `--engine` and `--level` read the same everywhere.

use std::path::PathBuf;

use cachelink_core::Engine;
use clap::{Arg, ArgAction, value_parser};

/// Scenario tag path (positional).
pub fn scenario_arg() -> Arg {
    Arg::new("scenario")
        .value_name("SCENARIO")
        .required(true)
        .help("Scenario tag path, e.g. levels\\test\\test")
}

/// Tag directories (-t/--tags), searched in order.
pub fn tags_dir_arg() -> Arg {
    Arg::new("tags")
        .short('t')
        .long("tags")
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .required(true)
        .help("Tag directory (repeatable; earlier directories win)")
}

/// Cache file to read (positional).
pub fn map_path_arg() -> Arg {
    Arg::new("map")
        .value_name("MAP")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Cache file")
}

/// Resource map to read (positional).
pub fn resource_path_arg() -> Arg {
    Arg::new("file")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Resource map (bitmaps.map, sounds.map or loc.map)")
}

/// Output file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Write output to file")
}

/// Target engine (-g/--engine).
pub fn engine_arg() -> Arg {
    Arg::new("engine")
        .short('g')
        .long("engine")
        .value_name("ENGINE")
        .value_parser(|s: &str| s.parse::<Engine>())
        .help("Target engine: xbox, demo, retail, custom, anniversary, native")
}

/// Header build string (--build-string).
pub fn build_string_arg() -> Arg {
    Arg::new("build_string")
        .long("build-string")
        .value_name("STRING")
        .help("Build string written to the header (engine default if not given)")
}

/// CRC to forge the map to (--forge-crc).
pub fn forge_crc_arg() -> Arg {
    Arg::new("forge_crc")
        .long("forge-crc")
        .value_name("HEX")
        .value_parser(parse_hex)
        .help("Forge the map CRC to this value")
}

/// Compress the output (--compress).
pub fn compress_arg() -> Arg {
    Arg::new("compress")
        .long("compress")
        .action(ArgAction::SetTrue)
        .help("Compress the map (anniversary and native engines)")
}

/// Compression level (--level).
pub fn level_arg() -> Arg {
    Arg::new("level")
        .long("level")
        .value_name("N")
        .value_parser(value_parser!(i32))
        .help("zstd compression level (clamped to the engine's range)")
}

/// Shared resource maps (--resource-map).
pub fn resource_map_arg() -> Arg {
    Arg::new("resource_map")
        .long("resource-map")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .help("Resource map to index bitmap and sound data against (repeatable)")
}

/// Skip the globals tag (--no-globals).
pub fn no_globals_arg() -> Arg {
    Arg::new("no_globals")
        .long("no-globals")
        .action(ArgAction::SetTrue)
        .help("Do not require globals\\globals")
}

/// Forged CRC for the crc command (--forge).
pub fn forge_arg() -> Arg {
    Arg::new("forge")
        .long("forge")
        .value_name("HEX")
        .value_parser(parse_hex)
        .help("Rewrite the map so its CRC is this value")
}

/// Tag data random number for the crc command (--random).
pub fn random_arg() -> Arg {
    Arg::new("random")
        .long("random")
        .value_name("HEX")
        .value_parser(parse_hex)
        .conflicts_with("forge")
        .help("Set the tag data random number and fix up the header CRC")
}

/// Verbosity level (-v, -vv, -vvv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Verbosity level (-v info, -vv debug, -vvv trace)")
}

/// Parse a 32-bit hex value, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}
