use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CaltraceError, Result};
use crate::frame::Frame;

use super::decode::{corrupt_stream, dynamic_to_frame};

/// Decode an AVI container with MJPEG-compressed video frames.
///
/// Walks the RIFF chunk tree and decodes every `##dc`/`##db` chunk as a
/// JPEG image. Index and header chunks are skipped; nothing is seeked, so
/// a truncated chunk aborts the decode.
pub(crate) fn decode_avi_mjpeg(bytes: &[u8]) -> Result<Vec<Frame>> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"AVI " {
        return Err(CaltraceError::Decode("not a RIFF/AVI file".into()));
    }
    let mut frames = Vec::new();
    walk_chunks(&bytes[12..], &mut frames)?;
    Ok(frames)
}

fn walk_chunks(mut data: &[u8], frames: &mut Vec<Frame>) -> Result<()> {
    while data.len() >= 8 {
        let fourcc = &data[0..4];
        let size = LittleEndian::read_u32(&data[4..8]) as usize;
        let end = match 8usize.checked_add(size) {
            Some(end) if end <= data.len() => end,
            _ => return Err(corrupt_stream("AVI", frames.len(), &"truncated chunk")),
        };
        let body = &data[8..end];

        if fourcc == b"LIST" && body.len() >= 4 {
            walk_chunks(&body[4..], frames)?;
        } else if is_video_chunk(fourcc) && !body.is_empty() {
            let img = image::load_from_memory_with_format(body, image::ImageFormat::Jpeg)
                .map_err(|e| corrupt_stream("AVI", frames.len(), &e))?;
            frames.push(dynamic_to_frame(frames.len(), &img));
        }

        // Chunks are word-aligned; odd sizes carry one pad byte.
        let next = end + (end & 1);
        data = &data[next.min(data.len())..];
    }
    Ok(())
}

fn is_video_chunk(fourcc: &[u8]) -> bool {
    fourcc.len() == 4
        && fourcc[0].is_ascii_digit()
        && fourcc[1].is_ascii_digit()
        && (&fourcc[2..4] == b"dc" || &fourcc[2..4] == b"db")
}
