use cachelink_core::{Engine, MAX_TAG_COUNT, MapType, PathError, TagClass, TagPath};

use super::{Workload, WorkloadState};
use crate::Error;
use crate::diagnostics::DiagnosticKind;
use crate::test_utils::{EMPTY_SCENARIO, tag, tag_ref, try_workload, workload};

const WEAPON: &str = r#"{"fields": [
    {"name": "model", "type": "dependency", "path": "weapons\\pistol\\pistol.gbxmodel"},
    {"name": "sound", "type": "tag_id", "path": "sound\\fire", "class": "sound", "optional": true}
]}"#;

#[test]
fn accumulating_twice_returns_existing_tag() {
    let mut w = workload(Engine::CustomEdition, &[("levels\\test\\test.scenario", EMPTY_SCENARIO)]);
    let structs = w.structs().len();

    let (path, class) = tag_ref("LEVELS\\TEST\\TEST.scenario");
    let index = w.accumulate_tag(&path, class, tag(EMPTY_SCENARIO)).unwrap();
    assert_eq!(index, 0);
    assert_eq!(w.structs().len(), structs);
    assert_eq!(w.tags().len(), 1);
}

#[test]
fn reserved_tag_is_filled_by_accumulate() {
    let mut w = Workload::new(Engine::Retail);
    let (path, class) = tag_ref("weapons\\pistol\\pistol.weapon");
    let reserved = w.reserve_tag(&path, class).unwrap();
    assert!(!w.tag(reserved).is_compiled());

    let index = w.accumulate_tag(&path, class, tag(WEAPON)).unwrap();
    assert_eq!(index, reserved);
    assert!(w.tag(index).is_compiled());
    assert_eq!(w.tag(index).structs, 0..1);
}

#[test]
fn bsp_tags_get_partitions() {
    let mut w = Workload::new(Engine::CustomEdition);
    let (scenario, class) = tag_ref("levels\\a\\a.scenario");
    w.reserve_tag(&scenario, class).unwrap();
    let (first, bsp) = tag_ref("levels\\a\\first.scenario_structure_bsp");
    let (second, _) = tag_ref("levels\\a\\second.scenario_structure_bsp");
    let first = w.reserve_tag(&first, bsp).unwrap();
    let second = w.reserve_tag(&second, bsp).unwrap();

    assert_eq!(w.tag(0).bsp, None);
    assert_eq!(w.tag(first).bsp, Some(0));
    assert_eq!(w.tag(second).bsp, Some(1));
    assert_eq!(w.bsp_count(), 2);

    let root = r#"{"fields": [{"name": "a", "type": "u32"}, {"name": "b", "type": "data", "bytes": [1]}]}"#;
    let (path, _) = tag_ref("levels\\a\\second.scenario_structure_bsp");
    w.accumulate_tag(&path, bsp, tag(root)).unwrap();
    assert!(w.structs().iter().all(|s| s.bsp == Some(1)));
}

#[test]
fn model_is_stored_as_gbxmodel() {
    let mut w = Workload::new(Engine::CustomEdition);
    let path = TagPath::new("weapons\\pistol\\pistol").unwrap();
    let index = w.reserve_tag(&path, TagClass::Model).unwrap();
    assert_eq!(w.tag(index).class, TagClass::Gbxmodel);
    assert_eq!(w.find_tag(&path, TagClass::Gbxmodel), Some(index));
}

#[test]
fn scenario_type_sets_map_type() {
    let w = workload(Engine::CustomEdition, &[("levels\\test\\test.scenario", EMPTY_SCENARIO)]);
    assert_eq!(w.map_type(), MapType::Multiplayer);

    let err = try_workload(
        Engine::CustomEdition,
        &[("levels\\test\\test.scenario", r#"{"fields": [{"name": "type", "type": "u16", "value": 9}]}"#)],
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::InvalidTagData { .. }));
}

#[test]
fn scenario_name_must_be_lowercase() {
    let err = try_workload(Engine::CustomEdition, &[("levels\\Test\\Test.scenario", EMPTY_SCENARIO)])
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::InvalidTagPath(PathError::ScenarioNameNotLowercase { .. })
    ));
}

#[test]
fn validation_errors_abort_the_tag() {
    let err = try_workload(
        Engine::CustomEdition,
        &[("effects\\spark.particle", r#"{"fields": [{"name": "bitmap", "type": "dependency", "class": "bitmap"}]}"#)],
    )
    .err()
    .unwrap();
    match err {
        Error::Validation { tag, errors } => {
            assert_eq!(tag, "effects\\spark.particle");
            assert_eq!(errors, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn warnings_do_not_abort() {
    let w = workload(
        Engine::CustomEdition,
        &[(
            "ui\\strings.unicode_string_list",
            r#"{"fields": [{"name": "strings", "type": "reflexive", "elements": [
                {"fields": [{"name": "string", "type": "data", "bytes": [104, 0]}]}
            ]}]}"#,
        )],
    );
    assert_eq!(w.diagnostics().warning_count(), 1);
    assert_eq!(
        w.diagnostics().iter().next().unwrap().kind,
        DiagnosticKind::MissingStringTerminator
    );
}

#[test]
fn dependencies_are_listed_in_field_order() {
    let w = workload(Engine::CustomEdition, &[("weapons\\pistol\\pistol.weapon", WEAPON)]);
    let deps: Vec<_> = w
        .dependencies(0)
        .into_iter()
        .map(|(path, class)| format!("{path}.{class}"))
        .collect();
    assert_eq!(deps, ["weapons\\pistol\\pistol.gbxmodel", "sound\\fire.sound"]);
}

#[test]
fn accumulate_after_resolution_is_rejected() {
    let mut w = workload(Engine::CustomEdition, &[("levels\\test\\test.scenario", EMPTY_SCENARIO)]);
    w.resolve_dependencies().unwrap();
    assert_eq!(w.state(), WorkloadState::Resolving);

    let (path, class) = tag_ref("levels\\other\\other.scenario");
    let err = w.accumulate_tag(&path, class, tag(EMPTY_SCENARIO)).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            state: WorkloadState::Resolving,
            ..
        }
    ));
}

#[test]
fn tag_count_is_bounded() {
    let mut w = Workload::new(Engine::CustomEdition);
    for i in 0..MAX_TAG_COUNT {
        let path = TagPath::new(&format!("t\\{i}")).unwrap();
        w.reserve_tag(&path, TagClass::Bitmap).unwrap();
    }
    let path = TagPath::new("t\\overflow").unwrap();
    let err = w.reserve_tag(&path, TagClass::Bitmap).unwrap_err();
    assert!(matches!(err, Error::TooManyTags(_)));
}
