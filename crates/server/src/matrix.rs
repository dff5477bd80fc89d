use shared::{
    domain::{normalize_pixel, Frame, GridSize, StateSnapshot, PIXEL_OFF, PIXEL_ON},
    error::ApiError,
};

/// Authoritative frame buffer for the physical matrix.
pub struct MatrixCore {
    size: GridSize,
    frame: Frame,
}

impl MatrixCore {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            frame: vec![PIXEL_OFF; size.cell_count()],
        }
    }

    pub fn state(&self) -> StateSnapshot {
        StateSnapshot::full(self.size, self.frame.clone())
    }

    pub fn raw_frame(&self) -> Frame {
        self.frame.clone()
    }

    /// Device export: one grayscale level per pixel, `7` lit and `0` dark.
    pub fn csv_gs3(&self) -> String {
        self.frame
            .iter()
            .map(|pixel| if *pixel == PIXEL_OFF { "0" } else { "7" })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns `false` and leaves the buffer alone for out-of-range cells.
    pub fn set_xy(&mut self, x: usize, y: usize, value: u8) -> bool {
        let Some(index) = self.size.index_of(x, y) else {
            return false;
        };
        self.frame[index] = normalize_pixel(value);
        true
    }

    pub fn toggle_xy(&mut self, x: usize, y: usize) -> bool {
        let Some(index) = self.size.index_of(x, y) else {
            return false;
        };
        self.frame[index] = if self.frame[index] == PIXEL_OFF {
            PIXEL_ON
        } else {
            PIXEL_OFF
        };
        true
    }

    pub fn set_frame(&mut self, frame: &[u8]) -> Result<(), ApiError> {
        if frame.len() != self.size.cell_count() {
            return Err(ApiError::validation(format!(
                "frame has {} cells, expected {}",
                frame.len(),
                self.size.cell_count()
            )));
        }
        self.frame = frame.iter().copied().map(normalize_pixel).collect();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.frame.fill(PIXEL_OFF);
    }

    pub fn fill(&mut self) {
        self.frame.fill(PIXEL_ON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_xy_ignores_cells_outside_the_grid() {
        let mut core = MatrixCore::new(GridSize::new(3, 2));
        assert!(!core.set_xy(3, 0, 1));
        assert!(!core.set_xy(0, 2, 1));
        assert!(core.set_xy(2, 1, 5));
        assert_eq!(core.raw_frame(), vec![0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn toggle_xy_flips_in_range_cells_only() {
        let mut core = MatrixCore::new(GridSize::new(2, 1));
        assert!(core.toggle_xy(1, 0));
        assert_eq!(core.raw_frame(), vec![0, 1]);
        assert!(core.toggle_xy(1, 0));
        assert_eq!(core.raw_frame(), vec![0, 0]);
        assert!(!core.toggle_xy(2, 0));
        assert_eq!(core.raw_frame(), vec![0, 0]);
    }

    #[test]
    fn set_frame_rejects_wrong_length() {
        let mut core = MatrixCore::new(GridSize::new(2, 2));
        let err = core.set_frame(&[1, 1, 1]).expect_err("should fail");
        assert_eq!(err.code, shared::error::ErrorCode::Validation);
        assert_eq!(core.raw_frame(), vec![0; 4]);
    }

    #[test]
    fn csv_export_marks_lit_pixels_with_seven() {
        let mut core = MatrixCore::new(GridSize::new(2, 2));
        core.fill();
        core.set_xy(1, 0, 0);
        assert_eq!(core.csv_gs3(), "7,0,7,7");
        core.clear();
        assert_eq!(core.csv_gs3(), "0,0,0,0");
    }

    #[test]
    fn state_carries_dimensions_and_frame() {
        let core = MatrixCore::new(GridSize::default());
        let state = core.state();
        assert_eq!(state.w, Some(13));
        assert_eq!(state.h, Some(8));
        assert_eq!(state.frame.map(|f| f.len()), Some(104));
    }
}
