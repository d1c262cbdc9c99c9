//! Dependency binding, layout and address patching.

use cachelink_core::{POINTER_SIZE, TagId, align_up};
use cachelink_format::cache::{
    HEADER_SIZE, TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, data, dependency,
};
use indexmap::IndexMap;

use super::{Workload, WorkloadState};
use crate::graph::{DependencyKind, StructId};
use crate::schema::is_derived;
use crate::{Error, Result};

/// Where everything goes in tag space and in the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Bytes of tag data, header through the last struct.
    pub tag_space_size: usize,
    /// Offset of each tag's path string in tag data.
    pub path_offsets: Vec<usize>,
    /// Offset of each live struct in its region (tag data or its partition).
    pub struct_offsets: Vec<Option<usize>>,
    /// Load address of each live struct.
    pub addresses: Vec<Option<u32>>,
    pub partitions: Vec<Partition>,
    /// File offset of each asset, or its resource map offset for indexed tags.
    pub asset_offsets: Vec<u64>,
    pub tag_data_offset: u64,
    pub file_size: u64,
}

/// Placement of one BSP's structs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub file_offset: u64,
    pub size: usize,
    pub address: u32,
}

impl Layout {
    pub fn address(&self, id: StructId) -> Option<u32> {
        self.addresses.get(id).copied().flatten()
    }
}

fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

impl Workload {
    /// Bind every dependency edge to a tag index.
    ///
    /// A tag of the referenced class, or of a class derived from it,
    /// satisfies the edge. A path that only exists with an unrelated class
    /// is a broken dependency even for optional edges.
    pub fn resolve_dependencies(&mut self) -> Result<()> {
        self.expect_state(
            "resolve dependencies",
            &[WorkloadState::Accumulating, WorkloadState::Resolving],
        )?;

        if let Some(tag) = self.tags.iter().find(|t| !t.is_compiled()) {
            return Err(Error::InvalidTagData {
                tag: tag.name(),
                reason: "tag was reserved but never compiled".into(),
            });
        }

        let mut bound = 0;
        let mut missing = 0;
        for id in 0..self.structs.len() {
            if self.structs[id].dead {
                continue;
            }
            for d in 0..self.structs[id].dependencies.len() {
                let edge = &self.structs[id].dependencies[d];
                let candidates = self.tags_at(&edge.path);
                let target = candidates
                    .iter()
                    .copied()
                    .find(|&t| is_derived(self.tags[t].class, edge.class));

                let resolved = match target {
                    Some(target) => {
                        bound += 1;
                        Some(target)
                    }
                    None if candidates.is_empty() && edge.optional => {
                        missing += 1;
                        log::debug!(
                            "{}: optional {}.{} not found",
                            self.tags[self.structs[id].owner].name(),
                            edge.path,
                            edge.class.extension()
                        );
                        None
                    }
                    None => {
                        return Err(Error::BrokenDependency {
                            from: self.tags[self.structs[id].owner].name(),
                            path: edge.path.to_string(),
                            class: edge.class,
                            found: candidates.first().map(|&t| self.tags[t].class),
                        });
                    }
                };
                self.structs[id].dependencies[d].resolved = resolved;
            }
        }

        log::info!("resolved {bound} dependencies ({missing} optional missing)");
        self.state = WorkloadState::Resolving;
        Ok(())
    }

    /// Compute the layout and patch addresses, tag IDs and file offsets
    /// into the struct bytes. Calling it again yields the same layout and
    /// bytes.
    pub fn resolve(&mut self) -> Result<Layout> {
        self.expect_state("resolve", &[WorkloadState::Resolving, WorkloadState::Deduping])?;
        let layout = self.compute_layout()?;
        self.patch_pointers(&layout)?;
        self.patch_dependencies(&layout);
        self.patch_assets(&layout);
        self.layout = Some(layout.clone());
        Ok(layout)
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    fn compute_layout(&self) -> Result<Layout> {
        let base = self.engine.base_address();

        // Header, tag array, then each distinct path string once.
        let mut cursor = TAG_DATA_HEADER_SIZE + TAG_ARRAY_ENTRY_SIZE * self.tags.len();
        let mut paths: IndexMap<&str, usize> = IndexMap::new();
        let mut path_offsets = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let offset = *paths.entry(tag.path.as_str()).or_insert_with(|| {
                let offset = cursor;
                cursor += tag.path.as_str().len() + 1;
                offset
            });
            path_offsets.push(offset);
        }

        let mut struct_offsets = vec![None; self.structs.len()];
        let mut addresses = vec![None; self.structs.len()];
        for (id, s) in self.structs.iter().enumerate() {
            if s.dead || s.bsp.is_some() {
                continue;
            }
            if !s.packed {
                cursor = align_up(cursor, POINTER_SIZE);
            }
            struct_offsets[id] = Some(cursor);
            addresses[id] = Some(base.wrapping_add(cursor as u32));
            cursor += s.len();
        }
        let tag_space_size = align_up(cursor, POINTER_SIZE);

        let mut partitions = vec![Partition::default(); self.bsp_count];
        for (id, s) in self.structs.iter().enumerate() {
            let Some(bsp) = s.bsp.filter(|_| !s.dead) else {
                continue;
            };
            let partition = &mut partitions[bsp];
            if !s.packed {
                partition.size = align_up(partition.size, POINTER_SIZE);
            }
            struct_offsets[id] = Some(partition.size);
            partition.size += s.len();
        }
        for partition in &mut partitions {
            partition.size = align_up(partition.size, POINTER_SIZE);
            partition.address = self.engine.bsp_address(partition.size as u32);
        }
        for (id, s) in self.structs.iter().enumerate() {
            if let (Some(bsp), Some(offset)) = (s.bsp, struct_offsets[id]) {
                addresses[id] = Some(partitions[bsp].address.wrapping_add(offset as u32));
            }
        }

        let largest_bsp = partitions.iter().map(|p| p.size).max().unwrap_or(0);
        let required = (tag_space_size + largest_bsp) as u64;
        let available = u64::from(self.engine.memory_length());
        if required > available {
            return Err(Error::TagSpaceExceeded {
                required,
                available,
            });
        }

        // File: header, partitions, assets, tag data.
        let mut file_cursor = HEADER_SIZE as u64;
        for partition in &mut partitions {
            partition.file_offset = file_cursor;
            file_cursor += partition.size as u64;
        }

        // Identical blobs are written once and share a file offset.
        let mut asset_offsets = vec![0; self.assets.len()];
        let mut written: IndexMap<&[u8], u64> = IndexMap::new();
        for tag in &self.tags {
            match tag.indexed {
                Some(resource_offset) => {
                    let mut offset = u64::from(resource_offset);
                    for asset in tag.assets.clone() {
                        asset_offsets[asset] = offset;
                        offset += self.assets[asset].data.len() as u64;
                    }
                }
                None => {
                    for asset in tag.assets.clone() {
                        let bytes = self.assets[asset].data.as_slice();
                        if let Some(&offset) = written.get(bytes) {
                            asset_offsets[asset] = offset;
                            continue;
                        }
                        file_cursor = file_cursor.next_multiple_of(POINTER_SIZE as u64);
                        written.insert(bytes, file_cursor);
                        asset_offsets[asset] = file_cursor;
                        file_cursor += bytes.len() as u64;
                    }
                }
            }
        }

        let tag_data_offset = file_cursor.next_multiple_of(POINTER_SIZE as u64);
        let file_size = tag_data_offset + tag_space_size as u64;

        log::info!(
            "layout: 0x{tag_space_size:X} bytes of tag space, {} partitions, {} distinct assets, {file_size} byte file",
            partitions.len(),
            written.len()
        );

        Ok(Layout {
            tag_space_size,
            path_offsets,
            struct_offsets,
            addresses,
            partitions,
            asset_offsets,
            tag_data_offset,
            file_size,
        })
    }

    fn patch_pointers(&mut self, layout: &Layout) -> Result<()> {
        for id in 0..self.structs.len() {
            if self.structs[id].dead {
                continue;
            }
            for p in 0..self.structs[id].pointers.len() {
                let edge = self.structs[id].pointers[p];
                let invalid = |reason: String| Error::InvalidTagData {
                    tag: self.tags[self.structs[id].owner].name(),
                    reason,
                };

                let Some(address) = layout.address(edge.target) else {
                    return Err(invalid(format!(
                        "pointer at 0x{:X} targets a removed struct",
                        edge.offset
                    )));
                };
                let target_bsp = self.structs[edge.target].bsp;
                if target_bsp.is_some() && target_bsp != self.structs[id].bsp {
                    return Err(invalid(format!(
                        "malformed BSP reference at 0x{:X}",
                        edge.offset
                    )));
                }
                write_u32(&mut self.structs[id].data, edge.offset, address);
            }
        }
        Ok(())
    }

    fn patch_dependencies(&mut self, layout: &Layout) {
        let base = self.engine.base_address();
        for s in self.structs.iter_mut().filter(|s| !s.dead) {
            for edge in &s.dependencies {
                let (class, path_address, id) = match edge.resolved {
                    Some(target) => (
                        self.tags[target].class.fourcc(),
                        base.wrapping_add(layout.path_offsets[target] as u32),
                        TagId::from_index(target),
                    ),
                    None => (edge.class.fourcc(), 0, TagId::NULL),
                };
                match edge.kind {
                    DependencyKind::Reference => {
                        write_u32(&mut s.data, edge.offset + dependency::CLASS, class);
                        write_u32(&mut s.data, edge.offset + dependency::PATH_POINTER, path_address);
                        write_u32(&mut s.data, edge.offset + dependency::PATH_SIZE, 0);
                        write_u32(&mut s.data, edge.offset + dependency::TAG_ID, id.raw());
                    }
                    DependencyKind::IdOnly => write_u32(&mut s.data, edge.offset, id.raw()),
                }
            }
        }
    }

    fn patch_assets(&mut self, layout: &Layout) {
        for s in self.structs.iter_mut().filter(|s| !s.dead) {
            for edge in &s.assets {
                let offset = layout.asset_offsets[edge.asset] as u32;
                write_u32(&mut s.data, edge.offset + data::FILE_OFFSET, offset);
            }
        }
    }
}
