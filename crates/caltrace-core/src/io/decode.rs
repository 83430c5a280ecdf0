use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use image::{AnimationDecoder, DynamicImage, RgbaImage};
use memmap2::Mmap;
use ndarray::Array2;
use tiff::decoder::DecodingResult;
use tiff::ColorType;
use tracing::{debug, info};

use crate::error::{CaltraceError, Result};
use crate::frame::{Container, Frame, SourceInfo, VideoData};

use super::avi;
use super::preview;

const TIFF_MAGIC_LE: &[u8; 4] = b"II*\0";
const TIFF_MAGIC_BE: &[u8; 4] = b"MM\0*";

/// Identify the container format from magic bytes, falling back to the
/// filename extension and finally to a still image.
pub fn sniff_container(bytes: &[u8], filename_hint: Option<&str>) -> Container {
    if bytes.len() >= 12 {
        if &bytes[0..4] == TIFF_MAGIC_LE || &bytes[0..4] == TIFF_MAGIC_BE {
            return Container::TiffStack;
        }
        if &bytes[0..4] == b"GIF8" {
            return Container::Gif;
        }
        if &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"AVI " {
            return Container::AviMjpeg;
        }
    }

    let ext = filename_hint
        .and_then(|name| name.rsplit('.').next())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("tif" | "tiff") => Container::TiffStack,
        Some("gif") => Container::Gif,
        Some("avi") => Container::AviMjpeg,
        _ => Container::StillImage,
    }
}

/// Decode a raw recording into an ordered frame sequence.
///
/// Supported containers: multi-page TIFF stacks, animated GIF, AVI with
/// MJPEG-compressed frames, and single still images (as a 1-frame stack).
/// A corrupt stream aborts the whole decode, reporting the index of the
/// last successfully decoded frame; partial output is never returned.
pub fn decode_video(bytes: &[u8], filename_hint: Option<&str>) -> Result<VideoData> {
    if bytes.is_empty() {
        return Err(CaltraceError::Decode("empty input".into()));
    }

    let container = sniff_container(bytes, filename_hint);
    debug!(?container, size = bytes.len(), "Decoding recording");

    let frames = match container {
        Container::TiffStack => decode_tiff_stack(bytes)?,
        Container::Gif => decode_gif(bytes)?,
        Container::AviMjpeg => avi::decode_avi_mjpeg(bytes)?,
        Container::StillImage => decode_still(bytes)?,
    };

    if frames.is_empty() {
        return Err(CaltraceError::Decode(format!(
            "no frames decoded from {container} input"
        )));
    }
    check_uniform_dimensions(&frames)?;

    let preview = preview::encode_frame_png(&frames[0])?;
    info!(
        total_frames = frames.len(),
        width = frames[0].width(),
        height = frames[0].height(),
        "Recording decoded"
    );

    Ok(VideoData {
        total_frames: frames.len(),
        frames,
        preview,
    })
}

/// Memory-mapped convenience wrapper around [`decode_video`].
pub fn decode_video_path(path: &Path) -> Result<VideoData> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let hint = path.file_name().and_then(|n| n.to_str());
    decode_video(&mmap, hint)
}

/// Decode a recording from disk and report its container metadata.
pub fn probe_path(path: &Path) -> Result<(VideoData, SourceInfo)> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let hint = path.file_name().and_then(|n| n.to_str());
    let container = sniff_container(&mmap, hint);
    let video = decode_video(&mmap, hint)?;
    let info = SourceInfo {
        filename: Some(path.to_path_buf()),
        container,
        total_frames: video.total_frames,
        width: video.frames[0].width() as u32,
        height: video.frames[0].height() as u32,
    };
    Ok((video, info))
}

fn decode_tiff_stack(bytes: &[u8]) -> Result<Vec<Frame>> {
    let mut decoder = tiff::decoder::Decoder::new(Cursor::new(bytes))
        .map_err(|e| CaltraceError::Decode(format!("invalid TIFF: {e}")))?;

    let mut frames: Vec<Frame> = Vec::new();
    loop {
        match read_tiff_page(&mut decoder, frames.len()) {
            Ok(frame) => frames.push(frame),
            Err(e) => return Err(corrupt_stream("TIFF", frames.len(), &e)),
        }
        if !decoder.more_images() {
            break;
        }
        if let Err(e) = decoder.next_image() {
            return Err(corrupt_stream("TIFF", frames.len(), &e));
        }
    }
    Ok(frames)
}

fn read_tiff_page(
    decoder: &mut tiff::decoder::Decoder<Cursor<&[u8]>>,
    index: usize,
) -> std::result::Result<Frame, String> {
    let (w, h) = decoder.dimensions().map_err(|e| e.to_string())?;
    let color = decoder.colortype().map_err(|e| e.to_string())?;
    let channels = match color {
        ColorType::Gray(_) => 1,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) => 4,
        other => return Err(format!("unsupported TIFF color type {other:?}")),
    };

    let result = decoder.read_image().map_err(|e| e.to_string())?;
    let (samples, max): (Vec<f32>, f32) = match result {
        DecodingResult::U8(v) => (v.into_iter().map(f32::from).collect(), 255.0),
        DecodingResult::U16(v) => (v.into_iter().map(f32::from).collect(), 65535.0),
        DecodingResult::F32(v) => (v, 1.0),
        _ => return Err("unsupported TIFF sample format".into()),
    };

    let (w, h) = (w as usize, h as usize);
    if samples.len() != w * h * channels {
        return Err(format!(
            "TIFF page sample count {} does not match {w}x{h}x{channels}",
            samples.len()
        ));
    }

    // Multi-channel pages collapse to the green channel (fluorescence).
    let plane = if channels > 1 { 1 } else { 0 };
    let mut data = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let idx = (row * w + col) * channels + plane;
            data[[row, col]] = samples[idx] / max;
        }
    }
    Ok(Frame::new(index, data))
}

fn decode_gif(bytes: &[u8]) -> Result<Vec<Frame>> {
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| CaltraceError::Decode(format!("invalid GIF: {e}")))?;

    let mut frames: Vec<Frame> = Vec::new();
    for frame in decoder.into_frames() {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => return Err(corrupt_stream("GIF", frames.len(), &e)),
        };
        let rgba = frame.into_buffer();
        frames.push(rgba_to_frame(frames.len(), &rgba));
    }
    Ok(frames)
}

fn decode_still(bytes: &[u8]) -> Result<Vec<Frame>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CaltraceError::Decode(format!("unreadable image: {e}")))?;
    Ok(vec![dynamic_to_frame(0, &img)])
}

/// Convert a decoded image to an intensity frame, taking the green channel
/// as the fluorescence signal. Grayscale sources keep their value unchanged.
pub(crate) fn dynamic_to_frame(index: usize, img: &DynamicImage) -> Frame {
    let rgb = img.to_rgb16();
    let (w, h) = rgb.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));
    for row in 0..h as usize {
        for col in 0..w as usize {
            let px = rgb.get_pixel(col as u32, row as u32);
            data[[row, col]] = f32::from(px.0[1]) / 65535.0;
        }
    }
    Frame::new(index, data)
}

fn rgba_to_frame(index: usize, rgba: &RgbaImage) -> Frame {
    let (w, h) = rgba.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));
    for row in 0..h as usize {
        for col in 0..w as usize {
            let px = rgba.get_pixel(col as u32, row as u32);
            data[[row, col]] = f32::from(px.0[1]) / 255.0;
        }
    }
    Frame::new(index, data)
}

fn check_uniform_dimensions(frames: &[Frame]) -> Result<()> {
    let (h, w) = frames[0].data.dim();
    for frame in &frames[1..] {
        if frame.data.dim() != (h, w) {
            return Err(CaltraceError::Decode(format!(
                "frame {} dimensions {}x{} differ from first frame {h}x{w}",
                frame.index,
                frame.height(),
                frame.width()
            )));
        }
    }
    Ok(())
}

/// Structural decode failure: abort, report the last good frame index and
/// discard any partially decoded output.
pub(crate) fn corrupt_stream(
    container: &str,
    decoded: usize,
    err: &dyn std::fmt::Display,
) -> CaltraceError {
    if decoded == 0 {
        CaltraceError::Decode(format!("corrupt {container} stream: {err} (no frames decoded)"))
    } else {
        CaltraceError::Decode(format!(
            "corrupt {container} stream: {err} (last good frame index {})",
            decoded - 1
        ))
    }
}
