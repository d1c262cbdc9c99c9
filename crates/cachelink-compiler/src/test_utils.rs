//! Test utilities: tag fixtures and small readers.

use cachelink_core::{Engine, TagClass, TagPath};

use crate::Workload;
use crate::schema::TagStruct;

/// Parse a tag field tree.
pub fn tag(json: &str) -> TagStruct {
    serde_json::from_str(json).unwrap()
}

/// Split `path.extension` into a path and class.
pub fn tag_ref(path: &str) -> (TagPath, TagClass) {
    TagPath::with_extension(path).unwrap()
}

pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

/// A scenario with no fields beyond its type.
pub const EMPTY_SCENARIO: &str = r#"{"fields": [{"name": "type", "type": "u16", "value": 1}]}"#;

/// Accumulate `(path.extension, json)` tags in order.
pub fn workload(engine: Engine, tags: &[(&str, &str)]) -> Workload {
    try_workload(engine, tags).unwrap()
}

pub fn try_workload(engine: Engine, tags: &[(&str, &str)]) -> crate::Result<Workload> {
    let mut workload = Workload::new(engine);
    for (path, json) in tags {
        let (path, class) = tag_ref(path);
        workload.accumulate_tag(&path, class, tag(json))?;
    }
    Ok(workload)
}

/// Bytes of a struct as laid out in tag space of a serialized map.
pub fn struct_bytes<'a>(map: &'a [u8], workload: &Workload, id: usize) -> &'a [u8] {
    let layout = workload.layout().unwrap();
    let offset = layout.tag_data_offset as usize + layout.struct_offsets[id].unwrap();
    &map[offset..offset + workload.structs()[id].len()]
}
