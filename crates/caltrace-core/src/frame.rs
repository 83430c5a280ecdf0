use ndarray::Array2;
use std::path::PathBuf;

/// A single grayscale intensity frame.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Position of this frame in the recording, starting at 0.
    pub index: usize,
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
}

impl Frame {
    pub fn new(index: usize, data: Array2<f32>) -> Self {
        Self { index, data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Container format of the source recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    TiffStack,
    Gif,
    AviMjpeg,
    StillImage,
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TiffStack => write!(f, "TIFF stack"),
            Self::Gif => write!(f, "GIF"),
            Self::AviMjpeg => write!(f, "AVI (MJPEG)"),
            Self::StillImage => write!(f, "still image"),
        }
    }
}

/// A decoded recording: the ordered frame sequence plus a preview of the
/// first frame, PNG-encoded for the upload boundary.
#[derive(Clone, Debug)]
pub struct VideoData {
    pub frames: Vec<Frame>,
    pub total_frames: usize,
    pub preview: Vec<u8>,
}

/// Metadata about the source recording.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: Option<PathBuf>,
    pub container: Container,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
}
