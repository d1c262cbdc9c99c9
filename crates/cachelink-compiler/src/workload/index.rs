//! Resource map indexing.
//!
//! Bitmap and sound data that already ships in a shared resource map is
//! not written again; the tag points into the resource map instead.

use cachelink_core::TagClass;
use cachelink_format::{ResourceMap, ResourceType};

use super::{Workload, WorkloadState};
use crate::Result;
use crate::diagnostics::DiagnosticKind;

fn resource_type(class: TagClass) -> Option<ResourceType> {
    match class {
        TagClass::Bitmap => Some(ResourceType::Bitmaps),
        TagClass::Sound => Some(ResourceType::Sounds),
        _ => None,
    }
}

impl Workload {
    /// Mark tags whose asset data matches a resource map entry byte for
    /// byte. Returns the number of tags marked.
    pub fn index_resources(&mut self, maps: &[ResourceMap]) -> Result<usize> {
        self.expect_state(
            "index resources",
            &[WorkloadState::Accumulating, WorkloadState::Resolving, WorkloadState::Deduping],
        )?;
        if self.layout.is_some() {
            return Err(crate::Error::InvalidState {
                operation: "index resources after layout",
                state: self.state,
            });
        }

        let mut indexed = 0;
        for index in 0..self.tags.len() {
            let tag = &self.tags[index];
            let Some(kind) = resource_type(tag.class) else {
                continue;
            };
            if tag.assets.is_empty() {
                continue;
            }
            let found = maps
                .iter()
                .filter(|m| m.kind() == kind)
                .find_map(|m| m.find(tag.path.as_str()).map(|(_, r)| (m, r)));
            let Some((map, resource)) = found else {
                continue;
            };

            let expected = map.data(resource);
            let mut actual = Vec::with_capacity(expected.len());
            for asset in tag.assets.clone() {
                actual.extend_from_slice(&self.assets[asset].data);
            }

            if actual == expected {
                log::debug!("{} indexed at 0x{:X}", tag.name(), resource.data_offset);
                self.tags[index].indexed = Some(resource.data_offset);
                indexed += 1;
            } else {
                let name = tag.name();
                self.diagnostics
                    .report(DiagnosticKind::ResourceMismatch, name)
                    .message(format!("{} bytes in the map, {} in the tag", expected.len(), actual.len()))
                    .emit();
            }
        }

        log::info!("{indexed} tags indexed from resource maps");
        Ok(indexed)
    }
}
