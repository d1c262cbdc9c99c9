use cachelink_core::tag_class::NO_CLASS;
use cachelink_core::{TagClass, TagId};
use indoc::indoc;

use super::{Asset, DependencyKind, GraphBuilder, Struct, StructBuilder};
use crate::Error;
use crate::schema::TagStruct;

struct Built {
    structs: Vec<Struct>,
    assets: Vec<Asset>,
    root: usize,
}

fn build(json: &str) -> Built {
    try_build(json).unwrap()
}

fn try_build(json: &str) -> crate::Result<Built> {
    let tag: TagStruct = serde_json::from_str(json).unwrap();
    let mut structs = Vec::new();
    let mut assets = Vec::new();
    let root = GraphBuilder::new(&mut structs, &mut assets, 0, None, "test.weapon").build(&tag)?;
    Ok(Built {
        structs,
        assets,
        root,
    })
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}

#[test]
fn scalars_encode_little_endian() {
    let built = build(indoc! {r#"
        {"fields": [
            {"name": "a", "type": "u8", "value": 1},
            {"name": "b", "type": "i16", "value": -2},
            {"name": "c", "type": "u32", "value": 305419896},
            {"name": "d", "type": "f32", "value": 1.0},
            {"name": "e", "type": "pad", "size": 1},
            {"name": "f", "type": "string", "value": "ab"}
        ]}
    "#});

    let root = &built.structs[built.root];
    assert_eq!(root.len(), 1 + 2 + 4 + 4 + 1 + 32);
    assert_eq!(&root.data[..3], &[0x01, 0xFE, 0xFF]);
    assert_eq!(u32_at(&root.data, 3), 0x1234_5678);
    assert_eq!(&root.data[7..11], &1.0f32.to_le_bytes());
    assert_eq!(&root.data[12..15], b"ab\0");

    let f = root.field("f").unwrap();
    assert_eq!((f.offset, f.width), (12, 32));
    assert!(root.pointers.is_empty());
}

#[test]
fn string_must_leave_room_for_terminator() {
    let long = "x".repeat(32);
    let json = format!(r#"{{"fields": [{{"name": "s", "type": "string", "value": "{long}"}}]}}"#);
    let err = try_build(&json).err().unwrap();
    assert!(matches!(err, Error::InvalidTagData { .. }));

    let fits = "x".repeat(31);
    let json = format!(r#"{{"fields": [{{"name": "s", "type": "string", "value": "{fits}"}}]}}"#);
    assert!(try_build(&json).is_ok());
}

#[test]
fn dependency_records_edge_with_placeholder() {
    let built = build(indoc! {r#"
        {"fields": [
            {"name": "pad", "type": "pad", "size": 4},
            {"name": "model", "type": "dependency", "path": "weapons\\pistol\\pistol.gbxmodel"}
        ]}
    "#});

    let root = &built.structs[built.root];
    assert_eq!(root.len(), 20);
    assert_eq!(u32_at(&root.data, 4), TagClass::Gbxmodel.fourcc());
    assert_eq!(u32_at(&root.data, 16), TagId::NULL.raw());

    let edge = &root.dependencies[0];
    assert_eq!(edge.offset, 4);
    assert_eq!(edge.class, TagClass::Gbxmodel);
    assert_eq!(edge.kind, DependencyKind::Reference);
    assert_eq!(edge.path.as_str(), "weapons\\pistol\\pistol");
    assert!(!edge.optional);
}

#[test]
fn empty_dependency_writes_class_and_null() {
    let built = build(indoc! {r#"
        {"fields": [
            {"name": "a", "type": "dependency", "class": "sound"},
            {"name": "b", "type": "dependency"}
        ]}
    "#});

    let root = &built.structs[built.root];
    assert!(root.dependencies.is_empty());
    assert_eq!(u32_at(&root.data, 0), TagClass::Sound.fourcc());
    assert_eq!(u32_at(&root.data, 12), TagId::NULL.raw());
    assert_eq!(u32_at(&root.data, 16), NO_CLASS);
    assert_eq!(u32_at(&root.data, 28), TagId::NULL.raw());
}

#[test]
fn tag_id_field_records_id_only_edge() {
    let built = build(r#"{"fields": [{"name": "id", "type": "tag_id", "path": "a\\b", "class": "bitmap", "optional": true}]}"#);
    let root = &built.structs[built.root];
    assert_eq!(root.len(), 4);
    assert_eq!(root.dependencies[0].kind, DependencyKind::IdOnly);
    assert!(root.dependencies[0].optional);
}

#[test]
fn dependency_without_class_is_fatal() {
    let err = try_build(r#"{"fields": [{"name": "d", "type": "dependency", "path": "a\\b"}]}"#)
        .err()
        .unwrap();
    match err {
        Error::InvalidTagData { tag, reason } => {
            assert_eq!(tag, "test.weapon");
            assert!(reason.starts_with("d: "));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn array_elements_are_contiguous() {
    let built = build(indoc! {r#"
        {"fields": [
            {"name": "items", "type": "reflexive", "elements": [
                {"fields": [
                    {"name": "inner", "type": "reflexive", "elements": [
                        {"fields": [{"name": "v", "type": "u32", "value": 9}]}
                    ]}
                ]},
                {"fields": [
                    {"name": "inner", "type": "reflexive", "elements": []}
                ]}
            ]}
        ]}
    "#});

    // root, items[0], items[1], items[0].inner[0]
    assert_eq!(built.structs.len(), 4);
    let root = &built.structs[0];
    assert_eq!(u32_at(&root.data, 0), 2);
    assert_eq!(root.pointers.len(), 1);
    assert_eq!(root.pointers[0].offset, 4);
    assert_eq!(root.pointers[0].target, 1);

    assert!(built.structs[1].unsafe_to_dedupe);
    assert!(built.structs[2].unsafe_to_dedupe);
    assert_eq!(built.structs[1].pointers[0].target, 3);
    assert!(built.structs[2].pointers.is_empty());
    assert!(!built.structs[1].packed);
    assert!(built.structs[2].packed);

    // Only element of its array.
    assert!(!built.structs[3].unsafe_to_dedupe);
    assert_eq!(built.structs[3].data, 9u32.to_le_bytes());
}

#[test]
fn array_count_mismatch_is_fatal() {
    let err = try_build(r#"{"fields": [{"name": "a", "type": "reflexive", "count": 2, "elements": [{"fields": []}]}]}"#)
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidTagData { .. }));
}

#[test]
fn array_elements_must_share_a_length() {
    let err = try_build(indoc! {r#"
        {"fields": [{"name": "items", "type": "reflexive", "elements": [
            {"fields": [{"name": "v", "type": "u16"}]},
            {"fields": [{"name": "v", "type": "u32"}]}
        ]}]}
    "#})
    .err()
    .unwrap();
    match err {
        Error::InvalidTagData { reason, .. } => {
            assert_eq!(reason, "items[1]: element is 4 bytes, element 0 is 2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn internal_data_becomes_struct() {
    let built = build(indoc! {r#"
        {"fields": [
            {"name": "a", "type": "data", "bytes": [1, 2, 3]},
            {"name": "b", "type": "data", "bytes": [4], "mergeable": false},
            {"name": "c", "type": "data"}
        ]}
    "#});

    let root = &built.structs[0];
    assert_eq!(root.len(), 60);
    assert_eq!(u32_at(&root.data, 0), 3);
    assert_eq!(root.pointers.len(), 2);
    assert_eq!((root.pointers[0].offset, root.pointers[0].target), (0xC, 1));
    assert_eq!((root.pointers[1].offset, root.pointers[1].target), (0x20, 2));

    assert_eq!(built.structs[1].data, vec![1, 2, 3]);
    assert!(!built.structs[1].unsafe_to_dedupe);
    assert!(built.structs[2].unsafe_to_dedupe);
    assert!(built.assets.is_empty());
}

#[test]
fn external_data_becomes_asset() {
    let built = build(r#"{"fields": [{"name": "samples", "type": "data", "bytes": [5, 6], "external": true}]}"#);

    let root = &built.structs[0];
    assert_eq!(built.structs.len(), 1);
    assert_eq!(u32_at(&root.data, 0), 2);
    assert_eq!(u32_at(&root.data, 4), 1);
    assert_eq!(root.assets[0].offset, 0);
    assert_eq!(built.assets[0].data, vec![5, 6]);
    assert_eq!(built.assets[0].owner, 0);
}

#[test]
fn builder_array_without_elements_has_no_pointer() {
    let mut b = StructBuilder::new();
    b.push_pad(12);
    b.add_array(0, 7, 0);
    let s = b.finish(0, Some(1), false);
    assert!(s.pointers.is_empty());
    assert_eq!(s.bsp, Some(1));
}
