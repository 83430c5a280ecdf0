use serde::{Deserialize, Serialize};

/// Baseline convention for converting a raw series into percent deviation.
///
/// The whole-series mean is the default; a fixed early-frame window is the
/// supported alternative for recordings with a quiet lead-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum BaselineMethod {
    WholeSeriesMean,
    FirstFrames { frames: usize },
}

impl Default for BaselineMethod {
    fn default() -> Self {
        Self::WholeSeriesMean
    }
}

/// Compute the baseline value for one cell's raw series.
///
/// An empty series or window yields NaN.
pub fn baseline(raw: &[f64], method: BaselineMethod) -> f64 {
    let window = match method {
        BaselineMethod::WholeSeriesMean => raw,
        BaselineMethod::FirstFrames { frames } => &raw[..frames.min(raw.len())],
    };
    if window.is_empty() {
        return f64::NAN;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Normalize a raw series to percent deviation from its baseline:
/// `(raw[i] - baseline) / baseline * 100`.
///
/// A zero or non-finite baseline yields an all-NaN series (flagged in the
/// summary) rather than an error; the rest of the table stays usable.
pub fn normalize_series(raw: &[f64], method: BaselineMethod) -> Vec<f64> {
    let base = baseline(raw, method);
    if base == 0.0 || !base.is_finite() {
        return vec![f64::NAN; raw.len()];
    }
    raw.iter().map(|&v| (v - base) / base * 100.0).collect()
}
