use std::fs;

use storage::{Builtin, JsonFile, LoadError, Registry};

#[test]
fn loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("macros.json");
    fs::write(
        &path,
        r#"{ "layers": [ { "name": "one", "keys": {
            "5": { "type": "text", "value": "hello", "color": "4,4,4" } } } ] }"#,
    )
    .unwrap();

    let registry = Registry::load(&JsonFile(path)).unwrap();
    assert_eq!(registry.layer_count(), 1);
    assert_eq!(registry.layer_name(0), Some("one"));
    assert!(registry.get_action(0, 5).is_some());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match Registry::load(&JsonFile(path.clone())) {
        Err(LoadError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn builtin_table_has_four_named_layers() {
    let registry = Registry::load(&Builtin).unwrap();
    let names: Vec<_> = (0..registry.layer_count())
        .map(|i| registry.layer_name(i).unwrap_or_default())
        .collect();
    assert_eq!(names, ["media", "applications", "system", "utility"]);

    for layer in registry.layers() {
        for key in layer.actions.keys() {
            assert!(!app_core::keys::is_nav_key(*key));
        }
    }
}
