//! End-to-end map builds.
//!
//! [`compile_map`] walks the scenario's dependency tree through a
//! [`TagSource`], links the result and finishes the file (CRC, then
//! optional compression).

use std::fmt;
use std::path::PathBuf;

use cachelink_core::{Engine, TagClass, TagPath};
use cachelink_format::{ResourceMap, compress_map, forge_map_crc};

use crate::diagnostics::Diagnostics;
use crate::schema::TagSource;
use crate::workload::Workload;
use crate::{Error, Result};

/// Tags every map carries besides the scenario.
pub const DEFAULT_REQUIRED_TAGS: &[&str] = &["globals\\globals.globals"];

/// What to build and how to finish the file.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub engine: Engine,
    /// Header build string; the engine's default when `None`.
    pub build: Option<String>,
    /// CRC to forge the map to; the natural CRC is written when `None`.
    pub forge_crc: Option<u32>,
    pub compress: bool,
    pub compression_level: Option<i32>,
    pub resource_maps: Vec<PathBuf>,
    /// `path.extension` tags compiled after the scenario.
    pub required_tags: Vec<String>,
}

impl BuildOptions {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            build: None,
            forge_crc: None,
            compress: false,
            compression_level: None,
            resource_maps: Vec::new(),
            required_tags: DEFAULT_REQUIRED_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Numbers worth reporting after a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildSummary {
    pub scenario: String,
    pub engine: Engine,
    pub tag_count: usize,
    pub struct_count: usize,
    pub structs_merged: usize,
    pub bytes_saved: usize,
    pub tags_indexed: usize,
    pub tag_space: usize,
    pub tag_space_available: u64,
    pub file_size: usize,
    pub crc: u32,
    pub warnings: usize,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario:   {} ({})", self.scenario, self.engine)?;
        writeln!(f, "tags:       {} ({} indexed)", self.tag_count, self.tags_indexed)?;
        writeln!(
            f,
            "structs:    {} ({} merged, {} bytes saved)",
            self.struct_count, self.structs_merged, self.bytes_saved
        )?;
        writeln!(
            f,
            "tag space:  {} / {} bytes",
            self.tag_space, self.tag_space_available
        )?;
        writeln!(f, "file size:  {} bytes", self.file_size)?;
        writeln!(f, "crc:        0x{:08X}", self.crc)?;
        write!(f, "warnings:   {}", self.warnings)
    }
}

/// A finished map.
#[derive(Debug)]
pub struct BuildOutput {
    pub bytes: Vec<u8>,
    pub summary: BuildSummary,
    pub diagnostics: Diagnostics,
}

/// Build the map for `scenario`, given as a tag path with or without its
/// `.scenario` extension.
pub fn compile_map(source: &dyn TagSource, scenario: &str, options: &BuildOptions) -> Result<BuildOutput> {
    let scenario_path = TagPath::new(scenario.strip_suffix(".scenario").unwrap_or(scenario))?;
    log::info!("building {scenario_path} for {}", options.engine);

    let mut workload = Workload::new(options.engine);
    compile_tree(&mut workload, source, &scenario_path, TagClass::Scenario)?;
    for required in &options.required_tags {
        let (path, class) = TagPath::with_extension(required)?;
        compile_tree(&mut workload, source, &path, class)?;
    }

    let maps = options
        .resource_maps
        .iter()
        .map(ResourceMap::from_path)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let tags_indexed = if maps.is_empty() {
        0
    } else {
        workload.index_resources(&maps)?
    };

    let mut bytes = workload.build(options.build.as_deref())?;
    let crc = forge_map_crc(&mut bytes, options.forge_crc, None)?;
    let file_size = bytes.len();
    if options.compress {
        bytes = compress_map(&bytes, options.engine, options.compression_level)?;
    }

    let layout = workload.layout().ok_or(Error::InvalidState {
        operation: "summarize",
        state: workload.state(),
    })?;
    let stats = workload.dedupe_stats();
    let summary = BuildSummary {
        scenario: scenario_path.to_string(),
        engine: options.engine,
        tag_count: workload.tags().len(),
        struct_count: workload.live_struct_count(),
        structs_merged: stats.merged,
        bytes_saved: stats.bytes_saved,
        tags_indexed,
        tag_space: layout.tag_space_size,
        tag_space_available: u64::from(options.engine.memory_length()),
        file_size,
        crc: crc.effective(),
        warnings: workload.diagnostics().warning_count(),
    };
    workload.diagnostics().log();
    log::info!(
        "built {} tags into {} bytes, crc 0x{:08X}",
        summary.tag_count,
        bytes.len(),
        summary.crc
    );

    Ok(BuildOutput {
        bytes,
        summary,
        diagnostics: workload.diagnostics().clone(),
    })
}

/// Compile `root` and everything it references, depth first. A tag is
/// registered before its dependencies, so reference cycles terminate.
///
/// Dependencies the source cannot provide are left for dependency
/// resolution to report; a missing root is fatal.
fn compile_tree(workload: &mut Workload, source: &dyn TagSource, root: &TagPath, class: TagClass) -> Result<()> {
    let mut stack = vec![(root.clone(), class)];
    let mut is_root = true;

    while let Some((path, class)) = stack.pop() {
        let root_tag = std::mem::take(&mut is_root);
        if workload.find_tag(&path, class).is_some_and(|i| workload.tag(i).is_compiled()) {
            continue;
        }

        let Some((found, tag)) = source.load(&path, class)? else {
            if root_tag {
                return Err(Error::TagNotFound {
                    path: path.to_string(),
                    class,
                });
            }
            log::debug!("{path}.{class} not found, left for resolution");
            continue;
        };
        if workload.find_tag(&path, found).is_some_and(|i| workload.tag(i).is_compiled()) {
            continue;
        }

        let index = workload.accumulate_tag(&path, found, tag)?;
        log::debug!("compiled {}", workload.tag(index).name());

        let mut dependencies = workload.dependencies(index);
        dependencies.reverse();
        stack.extend(dependencies);
    }
    Ok(())
}
