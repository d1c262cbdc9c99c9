mod cli;
mod commands;

use cli::{
    BuildParams, CompressParams, CrcParams, DecompressParams, InfoParams, ResourcesParams,
    build_cli, verbosity,
};

fn main() {
    let matches = build_cli().get_matches();

    env_logger::Builder::new()
        .filter_level(verbosity(&matches))
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let result = match matches.subcommand() {
        Some(("build", m)) => commands::build::run(BuildParams::from_matches(m).into()),
        Some(("compress", m)) => {
            commands::compress::run_compress(CompressParams::from_matches(m).into())
        }
        Some(("decompress", m)) => {
            commands::compress::run_decompress(DecompressParams::from_matches(m).into())
        }
        Some(("crc", m)) => commands::crc::run(CrcParams::from_matches(m).into()),
        Some(("info", m)) => commands::info::run(InfoParams::from_matches(m).into()),
        Some(("resources", m)) => commands::resources::run(ResourcesParams::from_matches(m).into()),
        _ => unreachable!("clap should have caught this"),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
