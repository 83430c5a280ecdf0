use ndarray::Array2;
use rayon::prelude::*;

use crate::error::{CaltraceError, Result};
use crate::frame::Frame;
use crate::mask::Mask;
use crate::pipeline::types::{CancelToken, ProgressReporter};

/// Pixel coordinates belonging to one labeled cell.
#[derive(Clone, Debug)]
pub struct CellCoords {
    pub cell_id: u32,
    /// (row, col) pairs, in row-major scan order.
    pub coords: Vec<(usize, usize)>,
}

/// Per-cell coordinate index, precomputed once from a label matrix and
/// reused across every frame. This keeps extraction at
/// O(frames × Σ cell area) instead of scanning the full image per cell.
#[derive(Clone, Debug)]
pub struct CellIndex {
    pub cells: Vec<CellCoords>,
    height: usize,
    width: usize,
}

impl CellIndex {
    /// Build the index from a mask, one entry per cell id in the mask's
    /// sorted id order. An id with no pixels yields an empty coordinate
    /// list rather than an error.
    pub fn from_mask(mask: &Mask) -> Self {
        let mut cells: Vec<CellCoords> = mask
            .cell_ids
            .iter()
            .map(|&cell_id| CellCoords {
                cell_id,
                coords: Vec::new(),
            })
            .collect();

        let (h, w) = mask.labels.dim();
        for row in 0..h {
            for col in 0..w {
                let label = mask.labels[[row, col]];
                if label == 0 {
                    continue;
                }
                if let Ok(i) = mask.cell_ids.binary_search(&label) {
                    cells[i].coords.push((row, col));
                }
            }
        }

        Self {
            cells,
            height: h,
            width: w,
        }
    }

    /// Index covering the whole frame under the synthetic cell id 0, used
    /// when no mask is supplied so downstream steps behave uniformly.
    pub fn whole_frame(height: usize, width: usize) -> Self {
        let coords = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .collect();
        Self {
            cells: vec![CellCoords { cell_id: 0, coords }],
            height,
            width,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Extract the raw intensity series for every indexed cell.
///
/// Returns an array of shape (cells, frames), rows aligned with the
/// index's cell order. Each value is the arithmetic mean of that frame's
/// pixels at the cell's coordinates; a zero-area cell reports NaN.
///
/// Frames are processed in parallel; output ordering is fixed by the
/// (cell, frame) key and never depends on scheduling.
pub fn extract_intensities(
    frames: &[Frame],
    index: &CellIndex,
    cancel: &CancelToken,
    reporter: &dyn ProgressReporter,
) -> Result<Array2<f64>> {
    if frames.is_empty() {
        return Err(CaltraceError::EmptySequence);
    }
    let (h, w) = index.dimensions();
    for frame in frames {
        if frame.data.dim() != (h, w) {
            return Err(CaltraceError::DimensionMismatch {
                mask_height: h,
                mask_width: w,
                frame_height: frame.height(),
                frame_width: frame.width(),
            });
        }
    }

    let done = std::sync::atomic::AtomicUsize::new(0);
    let columns: Vec<Vec<f64>> = frames
        .par_iter()
        .map(|frame| {
            if cancel.is_cancelled() {
                return Err(CaltraceError::Extraction("analysis cancelled".into()));
            }
            let means = index
                .cells
                .iter()
                .map(|cell| mean_at(&frame.data, &cell.coords))
                .collect();
            let n = done.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            reporter.advance(n);
            Ok(means)
        })
        .collect::<Result<_>>()?;

    let mut out = Array2::<f64>::zeros((index.cell_count(), frames.len()));
    for (frame_idx, column) in columns.iter().enumerate() {
        for (cell_idx, &value) in column.iter().enumerate() {
            out[[cell_idx, frame_idx]] = value;
        }
    }
    Ok(out)
}

fn mean_at(data: &Array2<f32>, coords: &[(usize, usize)]) -> f64 {
    if coords.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = coords
        .iter()
        .map(|&(row, col)| f64::from(data[[row, col]]))
        .sum();
    sum / coords.len() as f64
}
