// Error handling for calibration processing

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalError>;

#[derive(Error, Debug)]
pub enum CalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Calibration not monotonic at count {count}: {reason}")]
    NonMonotonic { count: u16, reason: String },

    #[error("Insufficient samples: need at least {needed}, got {found}")]
    InsufficientSamples { needed: usize, found: usize },

    #[error("Cannot fit a line: all {samples} samples share count {count}")]
    DegenerateFit { count: u16, samples: usize },

    #[error("Unrecognized calibration filename: {0}")]
    BadFilename(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Invalid UTF-8 string")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Instrument error: {0}")]
    Instrument(String),
}

impl CalError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        CalError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}
