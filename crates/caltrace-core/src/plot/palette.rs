use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Named categorical color palette. Fixed palettes cycle when a selection
/// has more series than the palette has colors; the HSV palette generates
/// one distinct hue per series instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Set1,
    Dark2,
    Pastel,
    Hsv,
}

const SET1: [(u8, u8, u8); 9] = [
    (0xE4, 0x1A, 0x1C),
    (0x37, 0x7E, 0xB8),
    (0x4D, 0xAF, 0x4A),
    (0x98, 0x4E, 0xA3),
    (0xFF, 0x7F, 0x00),
    (0xFF, 0xFF, 0x33),
    (0xA6, 0x56, 0x28),
    (0xF7, 0x81, 0xBF),
    (0x99, 0x99, 0x99),
];

const DARK2: [(u8, u8, u8); 8] = [
    (0x1B, 0x9E, 0x77),
    (0xD9, 0x5F, 0x02),
    (0x75, 0x70, 0xB3),
    (0xE7, 0x29, 0x8A),
    (0x66, 0xA6, 0x1E),
    (0xE6, 0xAB, 0x02),
    (0xA6, 0x76, 0x1D),
    (0x66, 0x66, 0x66),
];

const PASTEL: [(u8, u8, u8); 9] = [
    (0xFB, 0xB4, 0xAE),
    (0xB3, 0xCD, 0xE3),
    (0xCC, 0xEB, 0xC5),
    (0xDE, 0xCB, 0xE4),
    (0xFE, 0xD9, 0xA6),
    (0xFF, 0xFF, 0xCC),
    (0xE5, 0xD8, 0xBD),
    (0xFD, 0xDA, 0xEC),
    (0xF2, 0xF2, 0xF2),
];

impl Palette {
    /// Color for series `index` out of `total` series.
    pub fn color(self, index: usize, total: usize) -> RGBColor {
        let fixed = match self {
            Self::Set1 => &SET1[..],
            Self::Dark2 => &DARK2[..],
            Self::Pastel => &PASTEL[..],
            Self::Hsv => {
                let (r, g, b) = hsv_to_rgb(index as f32 / total.max(1) as f32, 0.8, 0.9);
                return RGBColor(r, g, b);
            }
        };
        let (r, g, b) = fixed[index % fixed.len()];
        RGBColor(r, g, b)
    }
}

/// h, s, v in [0, 1] → 8-bit RGB.
pub(crate) fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = (h.fract() + 1.0).fract() * 6.0;
    let i = h.floor() as u32 % 6;
    let f = h - h.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}
