//! Cache file serialization.

use cachelink_core::{TagId, scenario_name};
use cachelink_format::cache::{
    CacheHeader, HEADER_SIZE, TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, TAGS_LITERAL,
    TagArrayEntry, TagDataHeader,
};

use super::{Workload, WorkloadState};
use crate::{Error, Result};

impl Workload {
    /// Write the resolved workload out as an uncompressed cache file with a
    /// zero CRC.
    pub fn serialize(&mut self, build_string: Option<&str>) -> Result<Vec<u8>> {
        self.expect_state("serialize", &[WorkloadState::Resolving, WorkloadState::Deduping])?;
        let Some(layout) = self.layout.as_ref() else {
            return Err(Error::InvalidState {
                operation: "serialize before layout",
                state: self.state,
            });
        };
        let Some(scenario) = self.tags.first() else {
            return Err(Error::InvalidTagData {
                tag: "<none>".into(),
                reason: "a map needs at least one tag".into(),
            });
        };

        let base = self.engine.base_address();
        let file_size = usize::try_from(layout.file_size).map_err(|_| Error::TagSpaceExceeded {
            required: layout.file_size,
            available: usize::MAX as u64,
        })?;
        let mut out = vec![0u8; file_size];

        let mut header = CacheHeader::new(self.engine);
        header.decompressed_file_size = layout.file_size;
        header.tag_data_offset = layout.tag_data_offset;
        header.tag_data_size = layout.tag_space_size as u64;
        header.name = scenario_name(scenario.path.as_str())?.to_owned();
        header.build = build_string.unwrap_or(self.engine.default_build()).to_owned();
        header.map_type = self.map_type.as_u16();
        out[..HEADER_SIZE].copy_from_slice(&header.to_bytes());

        for (id, s) in self.structs.iter().enumerate() {
            let (Some(bsp), Some(offset)) = (s.bsp, layout.struct_offsets[id]) else {
                continue;
            };
            let start = layout.partitions[bsp].file_offset as usize + offset;
            out[start..start + s.len()].copy_from_slice(&s.data);
        }

        for tag in self.tags.iter().filter(|t| t.indexed.is_none()) {
            for asset in tag.assets.clone() {
                let start = layout.asset_offsets[asset] as usize;
                let data = &self.assets[asset].data;
                out[start..start + data.len()].copy_from_slice(data);
            }
        }

        let tag_data = &mut out[layout.tag_data_offset as usize..];
        let tag_data_header = TagDataHeader {
            tag_array_address: base.wrapping_add(TAG_DATA_HEADER_SIZE as u32),
            scenario_tag: TagId::from_index(0).raw(),
            tag_count: self.tags.len() as u32,
            tags_literal: TAGS_LITERAL,
            ..Default::default()
        };
        tag_data[..TAG_DATA_HEADER_SIZE].copy_from_slice(&tag_data_header.to_bytes());

        for (index, tag) in self.tags.iter().enumerate() {
            let data_address = match (tag.bsp, tag.base_struct) {
                (None, Some(root)) => layout.address(root).unwrap_or(0),
                _ => 0,
            };
            let entry = TagArrayEntry {
                primary_class: tag.class.fourcc(),
                secondary_class: tag.class.secondary_fourcc(),
                tertiary_class: tag.class.tertiary_fourcc(),
                tag_id: TagId::from_index(index).raw(),
                path_address: base.wrapping_add(layout.path_offsets[index] as u32),
                data_address,
                indexed: u32::from(tag.indexed.is_some()),
            };
            let start = TAG_DATA_HEADER_SIZE + TAG_ARRAY_ENTRY_SIZE * index;
            tag_data[start..start + TAG_ARRAY_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());

            // Shared paths are written once per tag; the bytes are identical.
            let path = tag.path.as_str().as_bytes();
            let start = layout.path_offsets[index];
            tag_data[start..start + path.len()].copy_from_slice(path);
        }

        for (id, s) in self.structs.iter().enumerate() {
            if s.bsp.is_some() {
                continue;
            }
            let Some(offset) = layout.struct_offsets[id] else {
                continue;
            };
            tag_data[offset..offset + s.len()].copy_from_slice(&s.data);
        }

        log::info!(
            "serialized {} tags, {} structs into {} bytes",
            self.tags.len(),
            self.live_struct_count(),
            out.len()
        );
        self.state = WorkloadState::Serialized;
        Ok(out)
    }
}
