use super::ConfigStore;
use std::path::PathBuf;
use toml::Value;

fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
    ConfigStore::at(dir.path().join("provstamp.toml")).expect("open store")
}

#[test]
fn missing_file_is_an_empty_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    assert!(store.get("anything").is_none());
    assert!(store.named_roots().is_empty());
}

#[test]
fn dotted_set_and_get_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = store_in(&dir);
    store
        .set("peek.nc", Value::String("ncdump -h".to_string()))
        .expect("set");
    assert_eq!(
        store.get("peek.nc").and_then(Value::as_str),
        Some("ncdump -h")
    );
    assert!(store.get("peek.grib").is_none());
}

#[test]
fn save_persists_and_reloads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = store_in(&dir);
    store
        .set("roots.venv", Value::String("/opt/venv".to_string()))
        .expect("set");
    store.save().expect("save");

    let reloaded = store_in(&dir);
    assert_eq!(
        reloaded.named_roots(),
        vec![("venv".to_string(), PathBuf::from("/opt/venv"))]
    );
}

#[test]
fn set_refuses_to_cross_a_scalar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = store_in(&dir);
    store
        .set("peek", Value::String("not a table".to_string()))
        .expect("set scalar");
    assert!(store.set("peek.nc", Value::String("x".to_string())).is_err());
}

#[test]
fn malformed_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = store_in(&dir);
    assert!(store.set("", Value::Boolean(true)).is_err());
    assert!(store.set("a..b", Value::Boolean(true)).is_err());
}

#[test]
fn peek_commands_collects_the_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = store_in(&dir);
    store
        .set("peek.nc", Value::String("ncdump -h".to_string()))
        .expect("set");
    store
        .set("peek.zarr", Value::String("zarr-summary".to_string()))
        .expect("set");
    let commands = store.peek_commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands.get("nc").map(String::as_str), Some("ncdump -h"));
}
