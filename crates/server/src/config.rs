use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{GridSize, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub icons_path: String,
    pub matrix_width: usize,
    pub matrix_height: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:7000".into(),
            icons_path: "./data/icons.json".into(),
            matrix_width: DEFAULT_WIDTH,
            matrix_height: DEFAULT_HEIGHT,
        }
    }
}

impl Settings {
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.matrix_width, self.matrix_height)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    icons_path: Option<String>,
    width: Option<usize>,
    height: Option<usize>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("server.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then `config_path` if it exists, then environment variables.
pub(crate) fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.icons_path {
                    settings.icons_path = v;
                }
                if let Some(v) = file_cfg.width {
                    settings.matrix_width = v;
                }
                if let Some(v) = file_cfg.height {
                    settings.matrix_height = v;
                }
            }
            Err(err) => warn!(path = %config_path.display(), %err, "ignoring unreadable config file"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("ICONS_PATH") {
        settings.icons_path = v;
    }
    if let Some(v) = env("APP__ICONS_PATH") {
        settings.icons_path = v;
    }

    if let Some(v) = env("MATRIX_WIDTH") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.matrix_width = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric MATRIX_WIDTH"),
        }
    }
    if let Some(v) = env("MATRIX_HEIGHT") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.matrix_height = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric MATRIX_HEIGHT"),
        }
    }

    settings
}

pub fn prepare_icons_path(raw_icons_path: &str) -> anyhow::Result<PathBuf> {
    let raw_icons_path = raw_icons_path.trim();
    let path = if raw_icons_path.is_empty() {
        PathBuf::from(Settings::default().icons_path)
    } else {
        PathBuf::from(raw_icons_path)
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create parent directory '{}' for icons file",
                parent.display()
            )
        })?;
    }

    Ok(path)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
