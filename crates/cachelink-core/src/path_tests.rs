use crate::path::{PathError, TagPath, lookup_key, scenario_name};
use crate::{MAX_PATH_LENGTH, TagClass};

#[test]
fn forward_slashes_are_normalized() {
    let path = TagPath::new("levels/test/bloodgulch").unwrap();
    assert_eq!(path.as_str(), "levels\\test\\bloodgulch");
    assert_eq!(path.basename(), "bloodgulch");
    assert_eq!(
        path.components().collect::<Vec<_>>(),
        ["levels", "test", "bloodgulch"]
    );
}

#[test]
fn lookup_key_ignores_case() {
    let a = TagPath::new("Weapons\\Pistol\\Pistol").unwrap();
    let b = TagPath::new("weapons/pistol/pistol").unwrap();
    assert_ne!(a, b);
    assert_eq!(a.key(), b.key());
    assert_eq!(lookup_key("A/B"), "a\\b");
}

#[test]
fn empty_path_rejected() {
    assert_eq!(TagPath::new(""), Err(PathError::Empty));
}

#[test]
fn absolute_path_rejected() {
    assert!(matches!(
        TagPath::new("/levels/test"),
        Err(PathError::NotRelative(_))
    ));
}

#[test]
fn long_path_rejected() {
    let ok = "a".repeat(MAX_PATH_LENGTH);
    assert!(TagPath::new(&ok).is_ok());

    let long = "a".repeat(MAX_PATH_LENGTH + 1);
    let err = TagPath::new(&long).unwrap_err();
    assert!(matches!(err, PathError::TooLong { len, .. } if len == MAX_PATH_LENGTH + 1));
}

#[test]
fn extension_selects_class() {
    let (path, class) = TagPath::with_extension("weapons/pistol/pistol.weapon").unwrap();
    assert_eq!(path.as_str(), "weapons\\pistol\\pistol");
    assert_eq!(class, TagClass::Weapon);
}

#[test]
fn unknown_extension_rejected() {
    assert!(matches!(
        TagPath::with_extension("weapons\\pistol\\pistol.wepon"),
        Err(PathError::UnknownExtension(_))
    ));
    assert!(matches!(
        TagPath::with_extension("weapons.dir\\pistol"),
        Err(PathError::UnknownExtension(_))
    ));
}

#[test]
fn scenario_name_is_basename() {
    assert_eq!(scenario_name("levels\\test\\tutorial").unwrap(), "tutorial");
    assert_eq!(scenario_name("levels/a30/a30").unwrap(), "a30");
    assert_eq!(scenario_name("solo").unwrap(), "solo");
}

#[test]
fn scenario_name_limits() {
    let long = format!("levels\\{}", "x".repeat(32));
    assert!(matches!(
        scenario_name(&long),
        Err(PathError::ScenarioNameTooLong { .. })
    ));
    assert!(matches!(
        scenario_name("levels\\test\\Tutorial"),
        Err(PathError::ScenarioNameNotLowercase { .. })
    ));
    assert_eq!(
        scenario_name("levels\\test\\Tutorial").unwrap_err().to_string(),
        "scenario name \"Tutorial\" contains a capital letter"
    );
}
