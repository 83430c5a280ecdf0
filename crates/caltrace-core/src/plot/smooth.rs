/// LOESS: tricube-weighted local linear regression, degree 1.
///
/// `span` is the fraction of points in each local window, in (0, 1].
/// Input must be sorted by x; NaN samples are expected to be filtered out
/// by the caller.
pub fn loess(points: &[(f64, f64)], span: f64) -> Vec<(f64, f64)> {
    fit(points, span).into_iter().map(|(x, y, _)| (x, y)).collect()
}

/// LOESS fit plus a pointwise ~95% confidence half-width derived from the
/// locally weighted residual spread.
pub fn loess_with_band(points: &[(f64, f64)], span: f64) -> Vec<(f64, f64, f64)> {
    fit(points, span)
}

fn fit(points: &[(f64, f64)], span: f64) -> Vec<(f64, f64, f64)> {
    let n = points.len();
    if n < 3 {
        return points.iter().map(|&(x, y)| (x, y, 0.0)).collect();
    }
    let window = ((span * n as f64).ceil() as usize).clamp(2, n);

    let fitted: Vec<(f64, f64)> = points
        .iter()
        .map(|&(x0, _)| (x0, local_fit(points, x0, window)))
        .collect();

    // Residuals against the fit drive the band width.
    let residuals: Vec<f64> = points
        .iter()
        .zip(&fitted)
        .map(|(&(_, y), &(_, f))| y - f)
        .collect();

    fitted
        .iter()
        .map(|&(x0, f0)| {
            let (var, weight_sum, eff_n) = local_residual_var(points, &residuals, x0, window);
            let half = if weight_sum > 0.0 && eff_n > 1.0 {
                1.96 * (var / eff_n).sqrt()
            } else {
                0.0
            };
            (x0, f0, half)
        })
        .collect()
}

fn local_fit(points: &[(f64, f64)], x0: f64, window: usize) -> f64 {
    let weights = tricube_weights(points, x0, window);

    // Weighted linear least squares via the 2x2 normal equations.
    let (mut sw, mut swx, mut swy, mut swxx, mut swxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&(x, y), &w) in points.iter().zip(&weights) {
        sw += w;
        swx += w * x;
        swy += w * y;
        swxx += w * x * x;
        swxy += w * x * y;
    }
    if sw == 0.0 {
        return f64::NAN;
    }
    let det = sw * swxx - swx * swx;
    if det.abs() < 1e-12 {
        // Degenerate window (all x equal): weighted mean.
        return swy / sw;
    }
    let slope = (sw * swxy - swx * swy) / det;
    let intercept = (swy - slope * swx) / sw;
    intercept + slope * x0
}

fn local_residual_var(
    points: &[(f64, f64)],
    residuals: &[f64],
    x0: f64,
    window: usize,
) -> (f64, f64, f64) {
    let weights = tricube_weights(points, x0, window);
    let sw: f64 = weights.iter().sum();
    if sw == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let var = weights
        .iter()
        .zip(residuals)
        .map(|(&w, &r)| w * r * r)
        .sum::<f64>()
        / sw;
    // Effective sample size of the window.
    let sw2: f64 = weights.iter().map(|&w| w * w).sum();
    let eff_n = if sw2 > 0.0 { sw * sw / sw2 } else { 0.0 };
    (var, sw, eff_n)
}

fn tricube_weights(points: &[(f64, f64)], x0: f64, window: usize) -> Vec<f64> {
    let mut dists: Vec<f64> = points.iter().map(|&(x, _)| (x - x0).abs()).collect();
    let mut sorted = dists.clone();
    sorted.sort_by(f64::total_cmp);
    let bandwidth = sorted[window - 1].max(1e-12);

    for d in &mut dists {
        let u = *d / bandwidth;
        *d = if u < 1.0 {
            let t = 1.0 - u * u * u;
            t * t * t
        } else {
            0.0
        };
    }
    dists
}
