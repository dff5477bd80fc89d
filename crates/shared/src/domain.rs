use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: usize = 13;
pub const DEFAULT_HEIGHT: usize = 8;

/// Largest grid accepted from configuration or from the wire.
pub const MAX_CELLS: usize = 1 << 16;

pub const PIXEL_OFF: u8 = 0;
pub const PIXEL_ON: u8 = 1;

/// Row-major pixel buffer, `index = y * width + x`.
pub type Frame = Vec<u8>;

/// Collapses any non-zero wire value to [`PIXEL_ON`].
pub fn normalize_pixel(value: u8) -> u8 {
    if value == PIXEL_OFF {
        PIXEL_OFF
    } else {
        PIXEL_ON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Cell count for a usable grid: non-empty, no overflow, at most
    /// [`MAX_CELLS`].
    pub fn checked_cell_count(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)
            .filter(|count| (1..=MAX_CELLS).contains(count))
    }

    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRecord {
    pub name: String,
    pub frame: Frame,
}

/// Grid snapshot pushed by the authority. Absent dimensions mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,
}

impl StateSnapshot {
    pub fn full(size: GridSize, frame: Frame) -> Self {
        Self {
            w: Some(size.width),
            h: Some(size.height),
            frame: Some(frame),
        }
    }
}
