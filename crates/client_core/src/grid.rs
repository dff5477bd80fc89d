use shared::{
    domain::{normalize_pixel, Frame, GridSize, StateSnapshot, PIXEL_OFF, PIXEL_ON},
    protocol::ClientRequest,
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::{error::GridError, ClientEvent, RequestSink};

/// What a successfully applied authority snapshot changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotApplied {
    pub resized: bool,
    pub frame_replaced: bool,
}

/// Local copy of the matrix frame buffer.
///
/// Per-cell toggles are applied optimistically. Everything else (resizes,
/// clear, fill, icon loads) only lands here once the authority pushes a
/// snapshot, and that snapshot always wins over local edits.
pub struct GridModel {
    size: GridSize,
    cells: Frame,
    events: broadcast::Sender<ClientEvent>,
}

impl GridModel {
    pub fn initialize(
        size: GridSize,
        events: broadcast::Sender<ClientEvent>,
    ) -> Result<Self, GridError> {
        let count = checked_cells(size)?;
        Ok(Self {
            size,
            cells: vec![PIXEL_OFF; count],
            events,
        })
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<u8> {
        self.size.index_of(x, y).map(|index| self.cells[index])
    }

    /// Copy of the current buffer, as sent in `save_icon`.
    pub fn frame(&self) -> Frame {
        self.cells.clone()
    }

    pub fn apply_remote_snapshot(
        &mut self,
        snapshot: StateSnapshot,
    ) -> Result<SnapshotApplied, GridError> {
        let target = GridSize::new(
            snapshot.w.unwrap_or(self.size.width),
            snapshot.h.unwrap_or(self.size.height),
        );
        let count = checked_cells(target)?;
        if let Some(frame) = &snapshot.frame {
            if frame.len() != count {
                return Err(GridError::FrameLength {
                    expected: count,
                    actual: frame.len(),
                });
            }
        }

        let resized = target != self.size;
        if resized {
            debug!(
                width = target.width,
                height = target.height,
                "grid: resized by authority"
            );
            self.size = target;
            self.cells = vec![PIXEL_OFF; count];
            let _ = self.events.send(ClientEvent::GridResized(target));
        }

        let frame_replaced = match snapshot.frame {
            Some(frame) => {
                self.cells = frame.into_iter().map(normalize_pixel).collect();
                true
            }
            None => false,
        };

        if resized || frame_replaced {
            let _ = self.events.send(ClientEvent::GridRedrawn);
        }
        Ok(SnapshotApplied {
            resized,
            frame_replaced,
        })
    }

    /// Flips one cell locally and asks the authority to store the new value.
    pub fn toggle_local(
        &mut self,
        x: usize,
        y: usize,
        sink: &mut impl RequestSink,
    ) -> Result<u8, GridError> {
        let index = self
            .size
            .index_of(x, y)
            .ok_or(GridError::OutOfBounds {
                x,
                y,
                width: self.size.width,
                height: self.size.height,
            })?;
        let value = if self.cells[index] == PIXEL_OFF {
            PIXEL_ON
        } else {
            PIXEL_OFF
        };
        self.cells[index] = value;
        let _ = self.events.send(ClientEvent::GridRedrawn);
        sink.emit(ClientRequest::set_xy(x, y, value));
        Ok(value)
    }

    pub fn request_clear(&self, sink: &mut impl RequestSink) {
        sink.emit(ClientRequest::Clear {});
    }

    pub fn request_fill(&self, sink: &mut impl RequestSink) {
        sink.emit(ClientRequest::Fill {});
    }
}

fn checked_cells(size: GridSize) -> Result<usize, GridError> {
    size.checked_cell_count()
        .ok_or(GridError::InvalidDimensions {
            width: size.width,
            height: size.height,
        })
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
