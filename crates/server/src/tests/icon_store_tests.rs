use super::*;
use tempfile::TempDir;

fn small() -> GridSize {
    GridSize::new(2, 2)
}

fn store_in(dir: &TempDir) -> IconStore {
    IconStore::open(dir.path().join("icons.json"), small())
}

#[test]
fn safe_name_replaces_unsupported_characters() {
    assert_eq!(safe_name("  smile/face!  "), "smile_face_");
    assert_eq!(safe_name("caf\u{e9} 1.0-b_c"), "caf_ 1.0-b_c");
    assert_eq!(safe_name("   "), DEFAULT_ICON_NAME);
    assert_eq!(safe_name(&"x".repeat(80)).len(), 64);
}

#[test]
fn taken_names_get_numbered_suffixes() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = store_in(&dir);

    assert_eq!(store.save("Smile", &[1, 0, 0, 1]).expect("save"), "Smile");
    assert_eq!(store.save("Smile", &[0, 0, 0, 1]).expect("save"), "Smile (2)");
    assert_eq!(store.save(" Smile ", &[1, 1, 1, 1]).expect("save"), "Smile (3)");

    let names: Vec<_> = store.list_payload().into_iter().map(|i| i.name).collect();
    assert_eq!(names, ["Smile", "Smile (2)", "Smile (3)"]);
}

#[test]
fn wrong_length_frame_is_not_stored() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = store_in(&dir);

    let err = store.save("bad", &[1, 1]).expect_err("should fail");

    assert_eq!(err.code, shared::error::ErrorCode::Validation);
    assert!(store.list_payload().is_empty());
}

#[test]
fn icons_survive_reopen() {
    let dir = TempDir::new().expect("tempdir");
    {
        let mut store = store_in(&dir);
        store.save("heart", &[0, 9, 1, 0]).expect("save");
        store.save("empty", &[0, 0, 0, 0]).expect("save");
        assert!(store.delete("empty"));
    }

    let reopened = store_in(&dir);
    assert_eq!(reopened.load("heart"), Some(vec![0, 1, 1, 0]));
    assert_eq!(reopened.load("empty"), None);
    assert_eq!(reopened.list_payload().len(), 1);
}

#[test]
fn delete_of_unknown_name_reports_false() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = store_in(&dir);
    assert!(!store.delete("ghost"));
}

#[test]
fn corrupt_file_loads_empty() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("icons.json");
    fs::write(&path, "not json").expect("write");

    let store = IconStore::open(path.clone(), small());

    assert!(store.list_payload().is_empty());
}

#[test]
fn stored_frames_of_wrong_size_load_blank() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("icons.json");
    fs::write(&path, r#"{"old": [1, 1, 1, 1, 1, 1], "ok": [1, 0, 0, 0]}"#).expect("write");

    let store = IconStore::open(path.clone(), small());

    assert_eq!(store.load("old"), Some(vec![0, 0, 0, 0]));
    assert_eq!(store.load("ok"), Some(vec![1, 0, 0, 0]));
}
