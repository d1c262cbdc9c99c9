//! Human-readable dump of a linked cache file.
//!
//! Two sections: `[header]` with one `key = value` line per header field,
//! and `[tags]` with one line per tag array entry.

use std::fmt::Write as _;

use cachelink_core::tag_class::fourcc_to_string;

use super::map::CacheMap;

/// Render the header and tag list of a map.
pub fn dump(map: &CacheMap) -> String {
    let mut out = String::new();
    dump_header(&mut out, map);
    dump_tags(&mut out, map);
    out
}

fn dump_header(out: &mut String, map: &CacheMap) {
    let header = map.header();
    let tag_data = map.tag_data_header();

    writeln!(out, "[header]").unwrap();
    writeln!(out, "engine = {}", map.engine()).unwrap();
    writeln!(out, "name = {:?}", header.name).unwrap();
    writeln!(out, "build = {:?}", header.build).unwrap();
    match cachelink_core::MapType::from_u16(header.map_type) {
        Some(map_type) => writeln!(out, "type = {map_type}").unwrap(),
        None => writeln!(out, "type = {} (unknown)", header.map_type).unwrap(),
    }
    writeln!(out, "file_size = {}", header.decompressed_file_size).unwrap();
    writeln!(out, "tag_data_offset = 0x{:X}", header.tag_data_offset).unwrap();
    writeln!(out, "tag_data_size = 0x{:X}", header.tag_data_size).unwrap();
    writeln!(out, "base_address = 0x{:08X}", map.base_address()).unwrap();
    writeln!(out, "crc32 = 0x{:08X}", header.crc32).unwrap();
    writeln!(out, "scenario = 0x{:08X}", tag_data.scenario_tag).unwrap();
    writeln!(out, "tag_count = {}", tag_data.tag_count).unwrap();
    out.push('\n');
}

fn dump_tags(out: &mut String, map: &CacheMap) {
    let tags = map.tags();
    let w = width_for_count(tags.len());

    writeln!(out, "[tags]").unwrap();
    for (index, tag) in tags.iter().enumerate() {
        let class = fourcc_to_string(tag.primary_class);
        write!(
            out,
            "{index:0w$} {} {class:<4} 0x{:08X} {}",
            tag.id, tag.data_address, tag.path
        )
        .unwrap();
        if tag.indexed {
            out.push_str(" (indexed)");
        }
        out.push('\n');
    }
}

/// Digits needed to print indices below `count`.
fn width_for_count(count: usize) -> usize {
    count.saturating_sub(1).max(1).to_string().len()
}
