use cachelink_core::scenario_name;
use cachelink_format::cache::{reflexive, scenario};

use super::PreCompile;
use crate::graph::StructId;
use crate::workload::{Layout, Workload};
use crate::{Error, Result};

/// The map is named after the scenario, so the name must fit the header.
pub(super) fn pre_compile(ctx: &PreCompile<'_>) -> Result<()> {
    scenario_name(ctx.path.as_str())?;
    Ok(())
}

/// Fill each `structure_bsps` entry with where its BSP was placed.
pub(super) fn post_compile(workload: &mut Workload, index: usize, layout: &Layout) -> Result<()> {
    let tag = workload.tag(index);
    let name = tag.name();
    let Some(root) = tag.base_struct else {
        return Ok(());
    };
    let invalid = |reason: String| Error::InvalidTagData {
        tag: name.clone(),
        reason,
    };

    // The map CRC finds BSPs through this array, so once any are linked it
    // must sit where the engine expects it.
    if !layout.partitions.is_empty() {
        match workload.structs[root].field("structure_bsps") {
            Some(field) if field.offset == scenario::STRUCTURE_BSPS => {}
            Some(field) => {
                return Err(invalid(format!(
                    "structure_bsps is at 0x{:X}, expected 0x{:X}",
                    field.offset,
                    scenario::STRUCTURE_BSPS
                )));
            }
            None => return Err(invalid("BSPs are linked but structure_bsps is missing".into())),
        }
    }

    let Some((first, count)) = array(workload, root, "structure_bsps") else {
        return Ok(());
    };

    for i in 0..count {
        let element = &workload.structs[first + i];
        let target = element
            .field("structure_bsp")
            .and_then(|f| element.dependencies.iter().find(|d| d.offset == f.offset))
            .and_then(|d| d.resolved);
        let Some(target) = target else {
            continue;
        };

        let target = workload.tag(target);
        let Some(bsp) = target.bsp else {
            return Err(invalid(format!(
                "structure_bsps[{i}]: {} is not a BSP",
                target.name()
            )));
        };

        let partition = &layout.partitions[bsp];
        let start = u32::try_from(partition.file_offset)
            .map_err(|_| invalid(format!("structure_bsps[{i}]: BSP starts beyond 4 GiB")))?;
        let values = [
            ("bsp_start", scenario::BSP_START, start),
            ("bsp_size", scenario::BSP_SIZE, partition.size as u32),
            ("bsp_address", scenario::BSP_ADDRESS, partition.address),
        ];
        for (field, offset, value) in values {
            write_field(workload, first + i, field, offset, value)
                .map_err(|reason| invalid(format!("structure_bsps[{i}]: {reason}")))?;
        }
    }
    Ok(())
}

/// First element and count of a non-empty array field.
fn array(workload: &Workload, id: StructId, name: &str) -> Option<(StructId, usize)> {
    let s = &workload.structs[id];
    let field = s.field(name)?;
    let pointer = field.offset + reflexive::POINTER;
    let first = s.pointers.iter().find(|p| p.offset == pointer)?.target;
    let count = u32::from_le_bytes(s.data[field.offset..field.offset + 4].try_into().ok()?);
    Some((first, count as usize))
}

fn write_field(
    workload: &mut Workload,
    id: StructId,
    name: &str,
    expected: usize,
    value: u32,
) -> std::result::Result<(), String> {
    let s = &mut workload.structs[id];
    let field = s
        .field(name)
        .filter(|f| f.width == 4)
        .ok_or_else(|| format!("no 4-byte field {name}"))?;
    let offset = field.offset;
    if offset != expected {
        return Err(format!("{name} is at 0x{offset:X}, expected 0x{expected:X}"));
    }
    s.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    Ok(())
}
