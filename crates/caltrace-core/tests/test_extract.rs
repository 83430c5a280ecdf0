mod common;

use ndarray::Array2;

use caltrace_core::error::CaltraceError;
use caltrace_core::extract::{extract_intensities, CellIndex};
use caltrace_core::frame::Frame;
use caltrace_core::mask::Mask;
use caltrace_core::pipeline::{CancelToken, NoOpReporter};

fn two_cell_mask() -> Mask {
    // cell 1 = left 4x2 block, cell 5 = a single pixel at (0, 3)
    let mut labels = Array2::<u32>::zeros((4, 4));
    for row in 0..4 {
        labels[[row, 0]] = 1;
        labels[[row, 1]] = 1;
    }
    labels[[0, 3]] = 5;
    Mask::new(labels)
}

#[test]
fn test_index_from_mask() {
    let index = CellIndex::from_mask(&two_cell_mask());
    assert_eq!(index.cell_count(), 2);
    assert_eq!(index.cells[0].cell_id, 1);
    assert_eq!(index.cells[0].coords.len(), 8);
    assert_eq!(index.cells[1].cell_id, 5);
    assert_eq!(index.cells[1].coords, vec![(0, 3)]);
    assert_eq!(index.dimensions(), (4, 4));
}

#[test]
fn test_whole_frame_index() {
    let index = CellIndex::whole_frame(3, 2);
    assert_eq!(index.cell_count(), 1);
    assert_eq!(index.cells[0].cell_id, 0);
    assert_eq!(index.cells[0].coords.len(), 6);
}

#[test]
fn test_extract_per_cell_means() {
    let mask = two_cell_mask();
    let index = CellIndex::from_mask(&mask);

    // cell-1 pixels carry 2*frame, the cell-5 pixel carries 10*frame
    let frames: Vec<Frame> = (0..3)
        .map(|i| {
            let mut data = Array2::<f32>::zeros((4, 4));
            for &(row, col) in &index.cells[0].coords {
                data[[row, col]] = 2.0 * i as f32;
            }
            data[[0, 3]] = 10.0 * i as f32;
            Frame::new(i, data)
        })
        .collect();

    let out =
        extract_intensities(&frames, &index, &CancelToken::new(), &NoOpReporter).unwrap();
    assert_eq!(out.dim(), (2, 3));
    for i in 0..3 {
        assert!((out[[0, i]] - 2.0 * i as f64).abs() < 1e-6);
        assert!((out[[1, i]] - 10.0 * i as f64).abs() < 1e-6);
    }
}

#[test]
fn test_extract_mean_over_mixed_pixels() {
    let mut labels = Array2::<u32>::zeros((2, 2));
    labels[[0, 0]] = 1;
    labels[[1, 1]] = 1;
    let index = CellIndex::from_mask(&Mask::new(labels));

    let mut data = Array2::<f32>::zeros((2, 2));
    data[[0, 0]] = 0.2;
    data[[1, 1]] = 0.6;
    let frames = vec![Frame::new(0, data)];

    let out =
        extract_intensities(&frames, &index, &CancelToken::new(), &NoOpReporter).unwrap();
    assert!((out[[0, 0]] - 0.4).abs() < 1e-6);
}

#[test]
fn test_extract_empty_sequence() {
    let index = CellIndex::whole_frame(2, 2);
    assert!(matches!(
        extract_intensities(&[], &index, &CancelToken::new(), &NoOpReporter),
        Err(CaltraceError::EmptySequence)
    ));
}

#[test]
fn test_extract_dimension_mismatch() {
    let index = CellIndex::whole_frame(4, 4);
    let frames = vec![common::uniform_frame(0, 2, 2, 0.5)];
    match extract_intensities(&frames, &index, &CancelToken::new(), &NoOpReporter) {
        Err(CaltraceError::DimensionMismatch {
            mask_height,
            frame_height,
            ..
        }) => {
            assert_eq!(mask_height, 4);
            assert_eq!(frame_height, 2);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn test_extract_cancelled() {
    let index = CellIndex::whole_frame(2, 2);
    let frames = vec![common::uniform_frame(0, 2, 2, 0.5)];
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(matches!(
        extract_intensities(&frames, &index, &cancel, &NoOpReporter),
        Err(CaltraceError::Extraction(_))
    ));
}
