use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma, RgbImage};

use crate::error::Result;
use crate::frame::Frame;

/// Encode a frame as an 8-bit grayscale PNG, scaled from [0.0, 1.0].
pub fn encode_frame_png(frame: &Frame) -> Result<Vec<u8>> {
    let h = frame.height();
    let w = frame.width();

    let mut img = GrayImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let val = (frame.data[[row, col]].clamp(0.0, 1.0) * 255.0) as u8;
            img.put_pixel(col as u32, row as u32, Luma([val]));
        }
    }

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Encode an RGB image as PNG bytes.
pub fn encode_rgb_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
