//! Command builders for the CLI.
//!
//! Each command is built using the shared arg builders from `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("cachelink")
        .about("Link tag directories into cache files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(build_command())
        .subcommand(compress_command())
        .subcommand(decompress_command())
        .subcommand(crc_command())
        .subcommand(info_command())
        .subcommand(resources_command())
}

/// Link a scenario and its dependencies into a cache file.
pub fn build_command() -> Command {
    Command::new("build")
        .about("Build a cache file from a scenario")
        .override_usage(
            "\
  cachelink build <SCENARIO> -t <DIR>... -o <FILE> [-g <ENGINE>]",
        )
        .after_help(
            r#"EXAMPLES:
  cachelink build levels\test\test -t tags -o test.map
  cachelink build levels\test\test -t mod -t tags -o test.map -g retail
  cachelink build levels\test\test -t tags -o test.map --forge-crc 0xDEADBEEF
  cachelink build levels\test\test -t tags -o test.map -g native --compress"#,
        )
        .arg(scenario_arg())
        .arg(tags_dir_arg())
        .arg(output_file_arg())
        .arg(engine_arg().default_value("custom"))
        .arg(build_string_arg())
        .arg(forge_crc_arg())
        .arg(compress_arg())
        .arg(level_arg())
        .arg(resource_map_arg())
        .arg(no_globals_arg())
}

/// Compress a linked cache file.
pub fn compress_command() -> Command {
    Command::new("compress")
        .about("Compress a cache file")
        .after_help(
            r#"EXAMPLES:
  cachelink compress test.map -o test.compressed.map -g anniversary
  cachelink compress test.map -o test.zst.map -g native --level 19"#,
        )
        .arg(map_path_arg())
        .arg(output_file_arg())
        .arg(engine_arg().required(true))
        .arg(level_arg())
}

/// Decompress a cache file.
pub fn decompress_command() -> Command {
    Command::new("decompress")
        .about("Decompress a cache file")
        .arg(map_path_arg())
        .arg(output_file_arg())
}

/// Show or rewrite a map's CRC.
pub fn crc_command() -> Command {
    Command::new("crc")
        .about("Show or forge a cache file's CRC")
        .after_help(
            r#"EXAMPLES:
  cachelink crc test.map                     # print the CRC
  cachelink crc test.map --forge 0xDEADBEEF  # rewrite the random number"#,
        )
        .arg(map_path_arg())
        .arg(forge_arg())
        .arg(random_arg())
}

/// Print the header and tag list of a cache file.
pub fn info_command() -> Command {
    Command::new("info")
        .about("Show the header and tags of a cache file")
        .arg(map_path_arg())
}

/// List the entries of a resource map.
pub fn resources_command() -> Command {
    Command::new("resources")
        .about("List the entries of a resource map")
        .arg(resource_path_arg())
}
