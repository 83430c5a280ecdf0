#![allow(dead_code)]

use ndarray::Array2;

use caltrace_core::frame::Frame;
use caltrace_core::table::{ResultRow, ResultTable};

pub fn uniform_frame(index: usize, h: usize, w: usize, value: f32) -> Frame {
    Frame::new(index, Array2::from_elem((h, w), value))
}

/// 5-frame ramp for a single cell: intensities 0, 10, 20, 30, 40. With the
/// whole-series mean (20) as baseline the normalized series is
/// -100, -50, 0, 50, 100.
pub fn ramp_table(cell_id: u32) -> ResultTable {
    let intensities = [0.0, 10.0, 20.0, 30.0, 40.0];
    let normalized = [-100.0, -50.0, 0.0, 50.0, 100.0];
    let rows = intensities
        .iter()
        .zip(normalized.iter())
        .enumerate()
        .map(|(frame, (&intensity, &norm))| ResultRow {
            cell_id,
            frame,
            intensity,
            normalized_intensity: norm,
        })
        .collect();
    ResultTable::new(rows)
}
