use tracing::info;

use crate::error::{CaltraceError, Result};
use crate::extract::{extract_intensities, CellIndex};
use crate::frame::Frame;
use crate::mask::Mask;
use crate::normalize::normalize_series;
use crate::table::{ResultRow, ResultTable};

use super::config::AnalyzeConfig;
use super::types::{AnalyzeStage, CancelToken, NoOpReporter, ProgressReporter};

/// Run the full analysis: index cells, extract intensities in parallel,
/// normalize, and assemble the canonical table.
///
/// Without a mask the whole frame is aggregated under the synthetic cell
/// id 0. Returns a fully populated table or an error; a partially built
/// table is never exposed.
pub fn analyze(frames: &[Frame], mask: Option<&Mask>, config: &AnalyzeConfig) -> Result<ResultTable> {
    analyze_reported(frames, mask, config, &NoOpReporter, &CancelToken::new())
}

/// [`analyze`] with progress reporting and cooperative cancellation.
pub fn analyze_reported(
    frames: &[Frame],
    mask: Option<&Mask>,
    config: &AnalyzeConfig,
    reporter: &dyn ProgressReporter,
    cancel: &CancelToken,
) -> Result<ResultTable> {
    if frames.is_empty() {
        return Err(CaltraceError::EmptySequence);
    }
    let (frame_h, frame_w) = frames[0].data.dim();

    reporter.begin_stage(AnalyzeStage::Indexing, None);
    let index = match mask {
        Some(mask) => {
            if (mask.height(), mask.width()) != (frame_h, frame_w) {
                return Err(CaltraceError::DimensionMismatch {
                    mask_height: mask.height(),
                    mask_width: mask.width(),
                    frame_height: frame_h,
                    frame_width: frame_w,
                });
            }
            CellIndex::from_mask(mask)
        }
        None => CellIndex::whole_frame(frame_h, frame_w),
    };
    reporter.finish_stage();
    info!(
        cells = index.cell_count(),
        frames = frames.len(),
        "Analysis started"
    );

    reporter.begin_stage(AnalyzeStage::Extracting, Some(frames.len()));
    let raw = extract_intensities(frames, &index, cancel, reporter)?;
    reporter.finish_stage();

    reporter.begin_stage(AnalyzeStage::Normalizing, Some(index.cell_count()));
    let normalized: Vec<Vec<f64>> = index
        .cells
        .iter()
        .enumerate()
        .map(|(cell_idx, _)| {
            let series: Vec<f64> = raw.row(cell_idx).to_vec();
            let out = normalize_series(&series, config.baseline);
            reporter.advance(cell_idx + 1);
            out
        })
        .collect();
    reporter.finish_stage();

    reporter.begin_stage(AnalyzeStage::Assembling, None);
    let mut rows = Vec::with_capacity(index.cell_count() * frames.len());
    for (cell_idx, cell) in index.cells.iter().enumerate() {
        for frame_idx in 0..frames.len() {
            rows.push(ResultRow {
                cell_id: cell.cell_id,
                frame: frame_idx,
                intensity: raw[[cell_idx, frame_idx]],
                normalized_intensity: normalized[cell_idx][frame_idx],
            });
        }
    }
    let table = ResultTable::new(rows);
    reporter.finish_stage();

    info!(rows = table.len(), "Analysis complete");
    Ok(table)
}
