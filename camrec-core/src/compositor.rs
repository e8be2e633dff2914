//! Grid compositor
//!
//! Lays out one frame per session on a fixed two-row grid. Missing cells are
//! filled with blank frames so both rows keep the same width.

use crate::frame::{self, Frame};

/// Rows in the grid
pub const GRID_ROWS: usize = 2;

/// Shape of the grid for a given session count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    count: usize,
}

impl GridLayout {
    pub fn for_count(count: usize) -> Self {
        Self {
            cols: count.div_ceil(GRID_ROWS),
            rows: GRID_ROWS,
            count,
        }
    }

    /// Source index for the cell at `row`, `col`, or `None` for a blank cell
    pub fn cell_source(&self, row: usize, col: usize) -> Option<usize> {
        let index = row * self.cols + col;
        (index < self.count).then_some(index)
    }

    /// Output size in pixels for cells of `cell_width` x `cell_height`
    pub fn output_size(&self, cell_width: u32, cell_height: u32) -> (u32, u32) {
        (
            self.cols as u32 * cell_width,
            self.rows as u32 * cell_height,
        )
    }
}

/// Builds the mosaic shown in grid view
#[derive(Debug, Clone, Copy)]
pub struct GridCompositor {
    cell_width: u32,
    cell_height: u32,
}

impl GridCompositor {
    pub fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Compose `frames` into one image
    ///
    /// No frames gives one blank cell and a single frame is returned as is.
    /// Otherwise the result is `ceil(n/2) * cell_width` by `2 * cell_height`.
    pub fn compose(&self, frames: &[&Frame]) -> Frame {
        match frames {
            [] => return self.blank_cell(),
            [only] => return (*only).clone(),
            _ => {}
        }

        let layout = GridLayout::for_count(frames.len());
        let blank = self.blank_cell();

        let mut rows = (0..layout.rows).map(|row| {
            let mut cells = (0..layout.cols).map(|col| match layout.cell_source(row, col) {
                Some(i) => frames[i],
                None => &blank,
            });
            // cols >= 1 whenever n >= 2
            let first = cells.next().map(|f| f.clone()).unwrap_or_else(|| self.blank_cell());
            cells.fold(first, |row, cell| frame::hconcat(&row, cell))
        });

        let top = rows.next().unwrap_or_else(|| self.blank_cell());
        rows.fold(top, |grid, row| frame::vconcat(&grid, &row))
    }

    fn blank_cell(&self) -> Frame {
        frame::blank(self.cell_width, self.cell_height)
    }
}
