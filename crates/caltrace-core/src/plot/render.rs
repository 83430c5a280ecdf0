use std::io::Cursor;
use std::ops::Range;

use plotters::chart::ChartContext;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::error::{CaltraceError, Result};
use crate::table::ResultTable;

use super::smooth::{loess, loess_with_band};
use super::spec::{GridStyle, LegendPosition, PlotSpec, ThemeColors, YAxis, YScale};

/// Drawable data for one cell's series.
struct CellSeries {
    cell_id: u32,
    color: RGBColor,
    /// Polyline segments; NaN samples (and non-positive samples under a
    /// log scale) break the line rather than being interpolated.
    segments: Vec<Vec<(f64, f64)>>,
    /// Sample markers, shown when `show_points` is set.
    points: Vec<(f64, f64)>,
    /// Smoothed confidence band as (x, fit, half_width).
    band: Option<Vec<(f64, f64, f64)>>,
}

/// Render the selected cell series as a PNG raster.
///
/// One line/point series per cell, colored by palette, legend keyed by
/// cell id. Rendering is deterministic: identical (table, cell_ids, spec)
/// yields pixel-identical output.
pub fn render_plot(table: &ResultTable, cell_ids: &[u32], spec: &PlotSpec) -> Result<Vec<u8>> {
    spec.validate()?;
    if cell_ids.is_empty() {
        return Err(CaltraceError::Plot("no series selected".into()));
    }

    let theme = spec.style.theme.colors();
    let selection = table.select(cell_ids);
    let series = build_series(&selection, cell_ids, spec);
    let (x_range, y_range) = ranges(&selection, &series, spec);
    let fill_base = match spec.style.y_scale {
        YScale::Linear => 0.0f64.clamp(y_range.start, y_range.end),
        YScale::Log => y_range.start,
    };

    let w = spec.style.width;
    let h = spec.style.height;
    let mut buffer = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
        root.fill(&theme.background).map_err(plot_err)?;

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(15)
            .caption(
                "Calcium Imaging Analysis",
                ("sans-serif", 16.0)
                    .into_font()
                    .color(&theme.foreground),
            )
            .x_label_area_size(40)
            .y_label_area_size(60);

        match spec.style.y_scale {
            YScale::Linear => {
                let mut chart = builder
                    .build_cartesian_2d(x_range, y_range)
                    .map_err(plot_err)?;
                draw_into(&mut chart, &series, spec, &theme, fill_base)?;
            }
            YScale::Log => {
                let mut chart = builder
                    .build_cartesian_2d(x_range, y_range.log_scale())
                    .map_err(plot_err)?;
                draw_into(&mut chart, &series, spec, &theme, fill_base)?;
            }
        }
        root.present().map_err(plot_err)?;
    }

    let img = image::RgbImage::from_raw(w, h, buffer)
        .ok_or_else(|| CaltraceError::Plot("render buffer size mismatch".into()))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

fn build_series(selection: &ResultTable, requested: &[u32], spec: &PlotSpec) -> Vec<CellSeries> {
    // Draw order and palette index follow the request order, deduplicated,
    // restricted to cells actually present.
    let mut order: Vec<u32> = Vec::new();
    for &id in requested {
        if selection.cell_ids().contains(&id) && !order.contains(&id) {
            order.push(id);
        }
    }

    let style = &spec.style;
    let drawable = |v: f64| v.is_finite() && (style.y_scale == YScale::Linear || v > 0.0);

    order
        .iter()
        .enumerate()
        .map(|(i, &cell_id)| {
            let color = style.color_palette.color(i, order.len());
            let samples: Vec<(f64, f64)> = selection
                .rows()
                .iter()
                .filter(|r| r.cell_id == cell_id)
                .map(|r| {
                    let y = match spec.y_axis {
                        YAxis::Intensity => r.intensity,
                        YAxis::NormalizedIntensity => r.normalized_intensity,
                    };
                    (r.frame as f64, y)
                })
                .collect();

            let kept: Vec<(f64, f64)> =
                samples.iter().copied().filter(|&(_, y)| drawable(y)).collect();

            let (segments, band) = if style.smooth_lines {
                if style.show_error_bands {
                    let with_band = loess_with_band(&kept, f64::from(style.smooth_span));
                    let curve: Vec<(f64, f64)> =
                        with_band.iter().map(|&(x, y, _)| (x, y)).collect();
                    (split_segments(&curve, &drawable), Some(with_band))
                } else {
                    let curve = loess(&kept, f64::from(style.smooth_span));
                    (split_segments(&curve, &drawable), None)
                }
            } else {
                (split_segments(&samples, &drawable), None)
            };

            CellSeries {
                cell_id,
                color,
                segments,
                points: kept,
                band,
            }
        })
        .collect()
}

/// Split a sample run into polyline segments, breaking at every undrawable
/// sample so gaps stay gaps. A smoothed curve has no NaN gaps by
/// construction, but a log scale can still make parts of the fit
/// undrawable.
fn split_segments(
    samples: &[(f64, f64)],
    drawable: &dyn Fn(f64) -> bool,
) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in samples {
        if drawable(y) {
            current.push((x, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn ranges(
    selection: &ResultTable,
    series: &[CellSeries],
    spec: &PlotSpec,
) -> (Range<f64>, Range<f64>) {
    let log = spec.style.y_scale == YScale::Log;

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut include = |y: f64| {
        if y.is_finite() && (!log || y > 0.0) {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    };
    for s in series {
        for seg in &s.segments {
            for &(_, y) in seg {
                include(y);
            }
        }
        for &(_, y) in &s.points {
            include(y);
        }
        if let Some(band) = &s.band {
            for &(_, fit, half) in band {
                include(fit + half);
                include(fit - half);
            }
        }
    }

    let y_range = if y_min > y_max {
        if log {
            0.1..1.0
        } else {
            0.0..1.0
        }
    } else if (y_max - y_min).abs() < f64::EPSILON {
        if log {
            (y_min / 2.0)..(y_max * 2.0)
        } else {
            (y_min - 1.0)..(y_max + 1.0)
        }
    } else if log {
        (y_min * 0.8)..(y_max * 1.25)
    } else {
        let pad = (y_max - y_min) * 0.05;
        (y_min - pad)..(y_max + pad)
    };

    let x_max = selection
        .rows()
        .iter()
        .map(|r| r.frame)
        .max()
        .unwrap_or(1) as f64;
    let x_range = if x_max == 0.0 {
        -0.5..0.5
    } else {
        (-0.05 * x_max)..(1.05 * x_max)
    };

    (x_range, y_range)
}

fn draw_into<'a, YT>(
    chart: &mut ChartContext<'a, BitMapBackend<'a>, Cartesian2d<RangedCoordf64, YT>>,
    series: &[CellSeries],
    spec: &PlotSpec,
    theme: &ThemeColors,
    fill_base: f64,
) -> Result<()>
where
    YT: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let style = &spec.style;
    let label_font = ("sans-serif", f64::from(style.axis_text_size))
        .into_font()
        .color(&theme.foreground);

    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Frame")
        .y_desc(spec.y_axis.label())
        .axis_style(&theme.foreground)
        .label_style(label_font.clone())
        .bold_line_style(&theme.grid)
        .light_line_style(theme.grid.mix(0.4));
    match style.grid_style {
        GridStyle::Both => {}
        GridStyle::Major => {
            mesh.light_line_style(&TRANSPARENT);
        }
        GridStyle::None => {
            mesh.disable_x_mesh().disable_y_mesh();
        }
    }
    mesh.draw().map_err(plot_err)?;

    for s in series {
        let color = s.color;
        let stroke = color.stroke_width(style.line_size.round().max(1.0) as u32);

        // Empty carrier series holds the legend entry so every selected
        // cell shows up even when all of its samples are undrawable.
        chart
            .draw_series(LineSeries::new(Vec::<(f64, f64)>::new(), stroke))
            .map_err(plot_err)?
            .label(format!("Cell {}", s.cell_id))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });

        if style.fill_alpha > 0.0 {
            for seg in &s.segments {
                chart
                    .draw_series(AreaSeries::new(
                        seg.iter().copied(),
                        fill_base,
                        color.mix(f64::from(style.fill_alpha)),
                    ))
                    .map_err(plot_err)?;
            }
        }

        if let Some(band) = &s.band {
            let mut poly: Vec<(f64, f64)> =
                band.iter().map(|&(x, fit, half)| (x, fit + half)).collect();
            poly.extend(
                band.iter()
                    .rev()
                    .map(|&(x, fit, half)| (x, (fit - half).max(fill_base))),
            );
            chart
                .draw_series(std::iter::once(Polygon::new(poly, color.mix(0.15))))
                .map_err(plot_err)?;
        }

        for seg in &s.segments {
            if seg.len() == 1 {
                // A single drawable sample has no line to join; mark it.
                chart
                    .draw_series(std::iter::once(Circle::new(
                        seg[0],
                        style.line_size.round().max(1.0) as i32,
                        color.filled(),
                    )))
                    .map_err(plot_err)?;
            } else {
                chart
                    .draw_series(LineSeries::new(seg.iter().copied(), stroke))
                    .map_err(plot_err)?;
            }
        }

        if style.show_points {
            chart
                .draw_series(s.points.iter().map(|&(x, y)| {
                    Circle::new((x, y), style.point_size.round().max(1.0) as i32, color.filled())
                }))
                .map_err(plot_err)?;
        }
    }

    let position = match style.legend_position {
        LegendPosition::Right => SeriesLabelPosition::UpperRight,
        LegendPosition::Left => SeriesLabelPosition::UpperLeft,
        LegendPosition::Top => SeriesLabelPosition::UpperMiddle,
        LegendPosition::Bottom => SeriesLabelPosition::LowerMiddle,
        LegendPosition::None => return Ok(()),
    };
    chart
        .configure_series_labels()
        .position(position)
        .background_style(theme.background.mix(0.8))
        .border_style(&theme.foreground)
        .label_font(label_font)
        .draw()
        .map_err(plot_err)?;
    Ok(())
}

fn plot_err<E: std::fmt::Display>(e: E) -> CaltraceError {
    CaltraceError::Plot(e.to_string())
}
