use approx::assert_abs_diff_eq;

use caltrace_core::normalize::{baseline, normalize_series, BaselineMethod};

#[test]
fn test_whole_series_baseline() {
    let raw = [0.0, 10.0, 20.0, 30.0, 40.0];
    let base = baseline(&raw, BaselineMethod::WholeSeriesMean);
    assert_abs_diff_eq!(base, 20.0, epsilon = 1e-12);
}

#[test]
fn test_first_frames_baseline() {
    let raw = [0.0, 10.0, 20.0, 30.0, 40.0];
    let base = baseline(&raw, BaselineMethod::FirstFrames { frames: 2 });
    assert_abs_diff_eq!(base, 5.0, epsilon = 1e-12);
}

#[test]
fn test_first_frames_window_clamps_to_series_length() {
    let raw = [2.0, 4.0];
    let base = baseline(&raw, BaselineMethod::FirstFrames { frames: 100 });
    assert_abs_diff_eq!(base, 3.0, epsilon = 1e-12);
}

#[test]
fn test_percent_deviation_ramp() {
    let raw = [0.0, 10.0, 20.0, 30.0, 40.0];
    let norm = normalize_series(&raw, BaselineMethod::WholeSeriesMean);
    let expected = [-100.0, -50.0, 0.0, 50.0, 100.0];
    for (&got, &want) in norm.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(got, want, epsilon = 1e-9);
    }
}

#[test]
fn test_constant_series_normalizes_to_zero() {
    let raw = [7.5; 20];
    let norm = normalize_series(&raw, BaselineMethod::WholeSeriesMean);
    assert!(norm.iter().all(|v| v.abs() < 1e-9));
}

#[test]
fn test_zero_baseline_yields_nan_not_error() {
    let raw = [0.0, 0.0, 0.0];
    let norm = normalize_series(&raw, BaselineMethod::WholeSeriesMean);
    assert_eq!(norm.len(), 3);
    assert!(norm.iter().all(|v| v.is_nan()));
}

#[test]
fn test_nan_baseline_propagates() {
    let raw = [f64::NAN, 1.0, 2.0];
    let norm = normalize_series(&raw, BaselineMethod::WholeSeriesMean);
    assert!(norm.iter().all(|v| v.is_nan()));
}

#[test]
fn test_empty_series() {
    let norm = normalize_series(&[], BaselineMethod::WholeSeriesMean);
    assert!(norm.is_empty());
    assert!(baseline(&[], BaselineMethod::WholeSeriesMean).is_nan());
}
