use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use shared::{
    domain::{normalize_pixel, Frame, GridSize, IconRecord, PIXEL_OFF},
    error::ApiError,
};
use tracing::{error, info};

pub const DEFAULT_ICON_NAME: &str = "icon";
const MAX_NAME_CHARS: usize = 64;

/// Saved frames keyed by sanitized name, persisted as one JSON object.
pub struct IconStore {
    size: GridSize,
    path: PathBuf,
    icons: BTreeMap<String, Frame>,
}

impl IconStore {
    /// Opens the store at `path`. A missing file starts empty; an unreadable
    /// one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>, size: GridSize) -> Self {
        let mut store = Self {
            size,
            path: path.into(),
            icons: BTreeMap::new(),
        };
        match store.read_from_disk() {
            Ok(icons) => store.icons = icons,
            Err(err) => error!(path = %store.path.display(), %err, "icons: load error"),
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list_payload(&self) -> Vec<IconRecord> {
        self.icons
            .iter()
            .map(|(name, frame)| IconRecord {
                name: name.clone(),
                frame: frame.clone(),
            })
            .collect()
    }

    /// Stores `frame` and returns the name it ended up under. Taken names get
    /// a ` (2)`, ` (3)`, ... suffix instead of being overwritten.
    pub fn save(&mut self, name: &str, frame: &[u8]) -> Result<String, ApiError> {
        let frame = self.normalize_frame(frame).ok_or_else(|| {
            ApiError::validation(format!(
                "icon frame must have {} cells, got {}",
                self.size.cell_count(),
                frame.len()
            ))
        })?;

        let base = safe_name(name);
        let mut stored = base.clone();
        let mut suffix = 2;
        while self.icons.contains_key(&stored) {
            stored = format!("{base} ({suffix})");
            suffix += 1;
        }

        self.icons.insert(stored.clone(), frame);
        self.flush();
        info!(name = %stored, "icons: saved");
        Ok(stored)
    }

    pub fn load(&self, name: &str) -> Option<Frame> {
        self.icons.get(&safe_name(name)).cloned()
    }

    pub fn delete(&mut self, name: &str) -> bool {
        let removed = self.icons.remove(&safe_name(name)).is_some();
        if removed {
            self.flush();
        }
        removed
    }

    fn normalize_frame(&self, frame: &[u8]) -> Option<Frame> {
        (frame.len() == self.size.cell_count())
            .then(|| frame.iter().copied().map(normalize_pixel).collect())
    }

    fn read_from_disk(&self) -> anyhow::Result<BTreeMap<String, Frame>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err).context("failed to read icons file"),
        };
        let stored: BTreeMap<String, Vec<u8>> =
            serde_json::from_str(&raw).context("icons file is not a name -> frame object")?;
        Ok(stored
            .into_iter()
            .map(|(name, frame)| {
                let frame = self
                    .normalize_frame(&frame)
                    .unwrap_or_else(|| vec![PIXEL_OFF; self.size.cell_count()]);
                (name, frame)
            })
            .collect())
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.icons)
            .context("failed to encode icons")
            .and_then(|json| {
                fs::write(&self.path, json).context("failed to write icons file")
            });
        if let Err(err) = result {
            error!(path = %self.path.display(), err = %format!("{err:#}"), "icons: save error");
        }
    }
}

/// Trims, replaces anything outside `[A-Za-z0-9 _.-]` with `_` and caps the
/// length. Blank names become [`DEFAULT_ICON_NAME`].
pub fn safe_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_CHARS)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_ICON_NAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[path = "tests/icon_store_tests.rs"]
mod tests;
