use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::{CaltraceError, Result};

use super::palette::Palette;

/// Which table column drives the y axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxis {
    Intensity,
    NormalizedIntensity,
}

impl YAxis {
    /// Parse a column name from the boundary layer. Anything other than
    /// the two series columns is rejected.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "intensity" => Ok(Self::Intensity),
            "normalized_intensity" => Ok(Self::NormalizedIntensity),
            _ => Err(CaltraceError::Plot("unknown axis".into())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Intensity => "Intensity",
            Self::NormalizedIntensity => "Normalized intensity (%)",
        }
    }
}

/// Named visual theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Minimal,
    Light,
    Dark,
    Classic,
}

/// Resolved theme colors used by the renderer.
pub(super) struct ThemeColors {
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub grid: RGBColor,
}

impl Theme {
    pub(super) fn colors(self) -> ThemeColors {
        match self {
            Self::Minimal => ThemeColors {
                background: RGBColor(255, 255, 255),
                foreground: RGBColor(60, 60, 60),
                grid: RGBColor(220, 220, 220),
            },
            Self::Light => ThemeColors {
                background: RGBColor(250, 250, 250),
                foreground: RGBColor(0, 0, 0),
                grid: RGBColor(200, 200, 200),
            },
            Self::Dark => ThemeColors {
                background: RGBColor(30, 30, 30),
                foreground: RGBColor(220, 220, 220),
                grid: RGBColor(70, 70, 70),
            },
            Self::Classic => ThemeColors {
                background: RGBColor(255, 255, 255),
                foreground: RGBColor(0, 0, 0),
                grid: RGBColor(230, 230, 230),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YScale {
    Linear,
    Log,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    Right,
    Left,
    Top,
    Bottom,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStyle {
    Both,
    Major,
    None,
}

/// Chart styling. One explicit immutable structure with enumerated named
/// fields; unrecognized keys are rejected at deserialization rather than
/// ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotStyle {
    pub theme: Theme,
    pub line_size: f32,
    pub show_points: bool,
    pub point_size: f32,
    pub fill_alpha: f32,
    pub color_palette: Palette,
    pub y_scale: YScale,
    pub legend_position: LegendPosition,
    pub grid_style: GridStyle,
    pub axis_text_size: f32,
    pub smooth_lines: bool,
    pub smooth_span: f32,
    pub show_error_bands: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            theme: Theme::Minimal,
            line_size: 1.0,
            show_points: false,
            point_size: 2.0,
            fill_alpha: 0.0,
            color_palette: Palette::Set1,
            y_scale: YScale::Linear,
            legend_position: LegendPosition::Right,
            grid_style: GridStyle::Both,
            axis_text_size: 10.0,
            smooth_lines: false,
            smooth_span: 0.75,
            show_error_bands: false,
            width: 1000,
            height: 600,
        }
    }
}

/// Declarative description of what to chart and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotSpec {
    pub y_axis: YAxis,
    pub style: PlotStyle,
}

impl Default for PlotSpec {
    fn default() -> Self {
        Self {
            y_axis: YAxis::Intensity,
            style: PlotStyle::default(),
        }
    }
}

impl PlotSpec {
    /// Check numeric field ranges that the type system cannot enforce.
    pub fn validate(&self) -> Result<()> {
        let s = &self.style;
        if !(s.line_size > 0.0) {
            return Err(CaltraceError::Plot("line_size must be > 0".into()));
        }
        if !(s.point_size > 0.0) {
            return Err(CaltraceError::Plot("point_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&s.fill_alpha) {
            return Err(CaltraceError::Plot("fill_alpha must be in [0, 1]".into()));
        }
        if !(s.smooth_span > 0.0 && s.smooth_span <= 1.0) {
            return Err(CaltraceError::Plot("smooth_span must be in (0, 1]".into()));
        }
        if !(s.axis_text_size > 0.0) {
            return Err(CaltraceError::Plot("axis_text_size must be > 0".into()));
        }
        if s.width == 0 || s.height == 0 {
            return Err(CaltraceError::Plot("plot dimensions must be non-zero".into()));
        }
        Ok(())
    }
}
