//! The build workload: every tag and struct of one cache file.
//!
//! Phases, in order:
//! - accumulate: tags are added deepest dependency first
//! - resolve dependencies: edges are bound to tag indices
//! - dedupe: identical structs are merged
//! - resolve: layout is computed and addresses are patched in
//! - serialize: the cache file is written out
//!
//! One workload builds one map and is discarded afterwards.

mod dedupe;
mod emitter;
mod index;
mod resolve;

#[cfg(test)]
mod tests;

use std::fmt;
use std::ops::Range;

use cachelink_core::{Engine, MAX_TAG_COUNT, MapType, TagClass, TagPath};
use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::graph::{Asset, GraphBuilder, Struct, StructId};
use crate::hooks::{self, PreCompile};
use crate::schema::TagStruct;
use crate::{Error, Result};

pub use dedupe::DedupeStats;
pub use resolve::{Layout, Partition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadState {
    Accumulating,
    Resolving,
    Deduping,
    Serialized,
}

impl fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkloadState::Accumulating => "accumulating",
            WorkloadState::Resolving => "resolving",
            WorkloadState::Deduping => "deduping",
            WorkloadState::Serialized => "serialized",
        })
    }
}

/// One tag of the build.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub path: TagPath,
    pub class: TagClass,
    /// Root struct, `None` until the tag is accumulated.
    pub base_struct: Option<StructId>,
    /// Structs created for this tag.
    pub structs: Range<StructId>,
    /// Asset blobs created for this tag.
    pub assets: Range<usize>,
    /// BSP partition for BSP-class tags.
    pub bsp: Option<usize>,
    /// Offset of the tag's data in a resource map, when it is stored there.
    pub indexed: Option<u32>,
}

impl Tag {
    /// `path.extension`, as used in messages.
    pub fn name(&self) -> String {
        format!("{}.{}", self.path, self.class.extension())
    }

    pub fn is_compiled(&self) -> bool {
        self.base_struct.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Workload {
    pub(crate) engine: Engine,
    pub(crate) state: WorkloadState,
    pub(crate) tags: Vec<Tag>,
    /// Case-folded path to every tag index with that path.
    pub(crate) lookup: IndexMap<String, Vec<usize>>,
    pub(crate) structs: Vec<Struct>,
    pub(crate) assets: Vec<Asset>,
    pub(crate) bsp_count: usize,
    pub(crate) map_type: MapType,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) layout: Option<Layout>,
    pub(crate) dedupe_stats: DedupeStats,
}

impl Workload {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            state: WorkloadState::Accumulating,
            tags: Vec::new(),
            lookup: IndexMap::new(),
            structs: Vec::new(),
            assets: Vec::new(),
            bsp_count: 0,
            map_type: MapType::default(),
            diagnostics: Diagnostics::new(),
            layout: None,
            dedupe_stats: DedupeStats::default(),
        }
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn state(&self) -> WorkloadState {
        self.state
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, index: usize) -> &Tag {
        &self.tags[index]
    }

    pub fn structs(&self) -> &[Struct] {
        &self.structs
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn live_struct_count(&self) -> usize {
        self.structs.iter().filter(|s| !s.dead).count()
    }

    pub fn bsp_count(&self) -> usize {
        self.bsp_count
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn dedupe_stats(&self) -> DedupeStats {
        self.dedupe_stats
    }

    pub(crate) fn expect_state(&self, operation: &'static str, allowed: &[WorkloadState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Index of the tag with this path and class, ignoring path case.
    pub fn find_tag(&self, path: &TagPath, class: TagClass) -> Option<usize> {
        let class = class.normalize();
        self.lookup
            .get(&path.key())?
            .iter()
            .copied()
            .find(|&i| self.tags[i].class == class)
    }

    /// Tags sharing a path, whatever their class.
    pub(crate) fn tags_at(&self, path: &TagPath) -> &[usize] {
        self.lookup.get(&path.key()).map_or(&[], Vec::as_slice)
    }

    /// Add a tag slot without compiling it, so references to it can be
    /// recorded before its own dependencies are compiled.
    pub fn reserve_tag(&mut self, path: &TagPath, class: TagClass) -> Result<usize> {
        self.expect_state("reserve a tag", &[WorkloadState::Accumulating])?;
        let class = class.normalize();
        if let Some(index) = self.find_tag(path, class) {
            return Ok(index);
        }
        if self.tags.len() >= MAX_TAG_COUNT {
            return Err(Error::TooManyTags(self.tags.len() + 1));
        }

        let bsp = (class == TagClass::ScenarioStructureBsp).then(|| {
            self.bsp_count += 1;
            self.bsp_count - 1
        });
        let index = self.tags.len();
        self.tags.push(Tag {
            path: path.clone(),
            class,
            base_struct: None,
            structs: 0..0,
            assets: 0..0,
            bsp,
            indexed: None,
        });
        self.lookup.entry(path.key()).or_default().push(index);
        Ok(index)
    }

    /// Compile a tag's field tree into structs.
    ///
    /// An already compiled path and class returns the existing index.
    pub fn accumulate_tag(&mut self, path: &TagPath, class: TagClass, mut tag: TagStruct) -> Result<usize> {
        self.expect_state("accumulate a tag", &[WorkloadState::Accumulating])?;
        let class = class.normalize();
        let index = match self.find_tag(path, class) {
            Some(index) if self.tags[index].is_compiled() => return Ok(index),
            Some(index) => index,
            None => self.reserve_tag(path, class)?,
        };
        let name = self.tags[index].name();

        let errors_before = self.diagnostics.error_count();
        hooks::pre_compile(
            &mut PreCompile {
                path,
                class,
                diagnostics: &mut self.diagnostics,
            },
            &mut tag,
        )?;
        let errors = self.diagnostics.error_count() - errors_before;
        if errors > 0 {
            return Err(Error::Validation { tag: name, errors });
        }

        if index == 0 && class == TagClass::Scenario {
            let raw = tag.u16_field("type").unwrap_or_default();
            self.map_type = MapType::from_u16(raw).ok_or_else(|| Error::InvalidTagData {
                tag: name.clone(),
                reason: format!("unknown scenario type {raw}"),
            })?;
        }

        let bsp = self.tags[index].bsp;
        let first_struct = self.structs.len();
        let first_asset = self.assets.len();
        let root = GraphBuilder::new(&mut self.structs, &mut self.assets, index, bsp, &name).build(&tag)?;

        let entry = &mut self.tags[index];
        entry.base_struct = Some(root);
        entry.structs = first_struct..self.structs.len();
        entry.assets = first_asset..self.assets.len();
        log::debug!(
            "compiled {name} as tag {index} ({} structs, {} assets)",
            entry.structs.len(),
            entry.assets.len()
        );
        Ok(index)
    }

    /// Dependency targets recorded by a compiled tag, in field order.
    pub fn dependencies(&self, index: usize) -> Vec<(TagPath, TagClass)> {
        self.structs[self.tags[index].structs.clone()]
            .iter()
            .flat_map(|s| &s.dependencies)
            .map(|d| (d.path.clone(), d.class))
            .collect()
    }

    /// Run every phase and return the uncompressed cache file.
    ///
    /// CRC and compression are applied by the caller.
    pub fn build(&mut self, build_string: Option<&str>) -> Result<Vec<u8>> {
        if self.state == WorkloadState::Accumulating {
            self.resolve_dependencies()?;
        }
        if self.layout.is_none() {
            self.dedupe()?;
        }
        let layout = self.resolve()?;
        for index in 0..self.tags.len() {
            hooks::post_compile(self, index, &layout)?;
        }
        self.serialize(build_string)
    }
}
