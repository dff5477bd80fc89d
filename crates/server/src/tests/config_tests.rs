use super::*;

use std::collections::HashMap;

use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_without_file_or_env() {
    let dir = TempDir::new().expect("tempdir");
    let settings = load_settings_from(&dir.path().join("missing.toml"), env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.grid_size(), GridSize::new(13, 8));
}

#[test]
fn file_values_override_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("server.toml");
    fs::write(
        &path,
        "bind_addr = \"0.0.0.0:9000\"\nicons_path = \"/tmp/icons.json\"\nwidth = 12\nheight = 8\n",
    )
    .expect("write");

    let settings = load_settings_from(&path, env_from(&[]));

    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.icons_path, "/tmp/icons.json");
    assert_eq!(settings.grid_size(), GridSize::new(12, 8));
}

#[test]
fn env_overrides_file_and_prefixed_names_win() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("server.toml");
    fs::write(&path, "bind_addr = \"0.0.0.0:9000\"\n").expect("write");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("SERVER_BIND", "127.0.0.1:1"),
            ("APP__BIND_ADDR", "127.0.0.1:2"),
            ("ICONS_PATH", "./x.json"),
            ("MATRIX_WIDTH", "16"),
        ]),
    );

    assert_eq!(settings.server_bind, "127.0.0.1:2");
    assert_eq!(settings.icons_path, "./x.json");
    assert_eq!(settings.matrix_width, 16);
    assert_eq!(settings.matrix_height, 8);
}

#[test]
fn unparsable_inputs_are_ignored() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("server.toml");
    fs::write(&path, "width = \"wide\"").expect("write");

    let settings = load_settings_from(&path, env_from(&[("MATRIX_HEIGHT", "tall")]));

    assert_eq!(settings, Settings::default());
}

#[test]
fn prepare_icons_path_creates_parent_dir() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("nested").join("icons.json");

    let prepared = prepare_icons_path(target.to_string_lossy().as_ref()).expect("prepare");

    assert_eq!(prepared, target);
    assert!(dir.path().join("nested").is_dir());
}
