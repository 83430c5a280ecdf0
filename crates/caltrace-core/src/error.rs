use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaltraceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Mask error: {0}")]
    Mask(String),

    #[error(
        "Mask dimensions {mask_height}x{mask_width} do not match frame dimensions {frame_height}x{frame_width}"
    )]
    DimensionMismatch {
        mask_height: usize,
        mask_width: usize,
        frame_height: usize,
        frame_width: usize,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, CaltraceError>;
