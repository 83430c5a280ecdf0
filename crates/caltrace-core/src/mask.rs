use std::io::Cursor;

use image::{DynamicImage, RgbImage};
use ndarray::Array2;
use tiff::decoder::DecodingResult;
use tracing::{debug, info};

use crate::error::{CaltraceError, Result};
use crate::io::preview::encode_rgb_png;
use crate::plot::palette::hsv_to_rgb;

/// An integer-labeled segmentation image.
///
/// Non-zero pixel values are cell identifiers; 0 is background. Label
/// values are authoritative — two disjoint regions sharing a value are one
/// cell, and connectivity is never recomputed.
#[derive(Clone, Debug)]
pub struct Mask {
    /// Label matrix, row-major, shape = (height, width).
    pub labels: Array2<u32>,
    /// Sorted distinct non-zero labels.
    pub cell_ids: Vec<u32>,
}

impl Mask {
    pub fn new(labels: Array2<u32>) -> Self {
        let mut cell_ids: Vec<u32> = labels.iter().copied().filter(|&v| v > 0).collect();
        cell_ids.sort_unstable();
        cell_ids.dedup();
        Self { labels, cell_ids }
    }

    pub fn width(&self) -> usize {
        self.labels.ncols()
    }

    pub fn height(&self) -> usize {
        self.labels.nrows()
    }

    pub fn cell_count(&self) -> usize {
        self.cell_ids.len()
    }
}

/// A loaded mask plus its color-coded PNG preview.
#[derive(Clone, Debug)]
pub struct MaskData {
    pub mask: Mask,
    pub preview: Vec<u8>,
}

/// Load a segmentation mask from raw image bytes.
///
/// Pixel values are taken verbatim as labels (no scaling). An all-zero
/// mask is valid and yields an empty cell-id list.
pub fn load_mask(bytes: &[u8]) -> Result<MaskData> {
    if bytes.is_empty() {
        return Err(CaltraceError::Mask("empty input".into()));
    }

    let labels = if bytes.len() >= 4 && (&bytes[0..4] == b"II*\0" || &bytes[0..4] == b"MM\0*") {
        decode_tiff_labels(bytes)?
    } else {
        decode_image_labels(bytes)?
    };

    let mask = Mask::new(labels);
    debug!(
        width = mask.width(),
        height = mask.height(),
        cells = mask.cell_count(),
        "Mask decoded"
    );

    let preview = mask_preview(&mask)?;
    info!(cells = mask.cell_count(), "Mask loaded");
    Ok(MaskData { mask, preview })
}

/// First page of a TIFF, raw sample values as labels. Multi-channel pages
/// use the first channel.
fn decode_tiff_labels(bytes: &[u8]) -> Result<Array2<u32>> {
    let mut decoder = tiff::decoder::Decoder::new(Cursor::new(bytes))
        .map_err(|e| CaltraceError::Mask(format!("invalid TIFF mask: {e}")))?;

    let (w, h) = decoder
        .dimensions()
        .map_err(|e| CaltraceError::Mask(format!("invalid TIFF mask: {e}")))?;
    let color = decoder
        .colortype()
        .map_err(|e| CaltraceError::Mask(format!("invalid TIFF mask: {e}")))?;
    let channels = match color {
        tiff::ColorType::Gray(_) => 1,
        tiff::ColorType::RGB(_) => 3,
        tiff::ColorType::RGBA(_) => 4,
        other => {
            return Err(CaltraceError::Mask(format!(
                "unsupported TIFF mask color type {other:?}"
            )))
        }
    };

    let result = decoder
        .read_image()
        .map_err(|e| CaltraceError::Mask(format!("unreadable TIFF mask: {e}")))?;
    let samples: Vec<u32> = match result {
        DecodingResult::U8(v) => v.into_iter().map(u32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(u32::from).collect(),
        DecodingResult::U32(v) => v,
        _ => {
            return Err(CaltraceError::Mask(
                "unsupported TIFF mask sample format (expected unsigned integers)".into(),
            ))
        }
    };

    let (w, h) = (w as usize, h as usize);
    if samples.len() != w * h * channels {
        return Err(CaltraceError::Mask(format!(
            "TIFF mask sample count {} does not match {w}x{h}x{channels}",
            samples.len()
        )));
    }

    let mut labels = Array2::<u32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            labels[[row, col]] = samples[(row * w + col) * channels];
        }
    }
    Ok(labels)
}

/// Non-TIFF mask formats via the image crate. Matching on the concrete
/// pixel layout keeps label values raw; `to_luma16` would rescale them.
fn decode_image_labels(bytes: &[u8]) -> Result<Array2<u32>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CaltraceError::Mask(format!("unreadable mask: {e}")))?;

    let (w, h) = (img.width() as usize, img.height() as usize);
    let mut labels = Array2::<u32>::zeros((h, w));
    match img {
        DynamicImage::ImageLuma8(buf) => {
            for (col, row, px) in buf.enumerate_pixels() {
                labels[[row as usize, col as usize]] = u32::from(px.0[0]);
            }
        }
        DynamicImage::ImageLuma16(buf) => {
            for (col, row, px) in buf.enumerate_pixels() {
                labels[[row as usize, col as usize]] = u32::from(px.0[0]);
            }
        }
        DynamicImage::ImageRgb8(buf) => {
            for (col, row, px) in buf.enumerate_pixels() {
                labels[[row as usize, col as usize]] = u32::from(px.0[0]);
            }
        }
        DynamicImage::ImageRgba8(buf) => {
            for (col, row, px) in buf.enumerate_pixels() {
                labels[[row as usize, col as usize]] = u32::from(px.0[0]);
            }
        }
        other => {
            return Err(CaltraceError::Mask(format!(
                "unsupported mask pixel format {:?}",
                other.color()
            )))
        }
    }
    Ok(labels)
}

/// Color-coded preview: each cell gets a distinct HSV-stepped hue on a
/// black background, PNG-encoded.
pub fn mask_preview(mask: &Mask) -> Result<Vec<u8>> {
    let h = mask.height();
    let w = mask.width();
    let n = mask.cell_count();

    let colors: Vec<(u8, u8, u8)> = (0..n)
        .map(|i| {
            let (r, g, b) = hsv_to_rgb(i as f32 / n.max(1) as f32, 0.8, 0.9);
            // Dim slightly so overlaid viewers stay readable.
            (
                (f32::from(r) * 0.7) as u8,
                (f32::from(g) * 0.7) as u8,
                (f32::from(b) * 0.7) as u8,
            )
        })
        .collect();

    let mut img = RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let label = mask.labels[[row, col]];
            if label == 0 {
                continue;
            }
            if let Ok(i) = mask.cell_ids.binary_search(&label) {
                let (r, g, b) = colors[i];
                img.put_pixel(col as u32, row as u32, image::Rgb([r, g, b]));
            }
        }
    }
    encode_rgb_png(&img)
}
