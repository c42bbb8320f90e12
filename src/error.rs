use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("Failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },

    #[error("Image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("{operation} requires {expected} channel(s), got {actual}")]
    UnsupportedChannelCount {
        operation: &'static str,
        expected: u8,
        actual: u8,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{operation}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        operation: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
