// src/error.rs
use thiserror::Error;

/// Errors raised by the gesture engine and its session tooling.
#[derive(Error, Debug)]
pub enum Error {
    /// A hand must carry exactly [`crate::hand::LANDMARK_COUNT`] landmarks
    #[error("invalid hand data: expected {expected} landmarks, found {found}")]
    InvalidHandData { expected: usize, found: usize },

    /// A landmark coordinate was NaN or infinite
    #[error("invalid hand data: landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration rejected by validation
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for the malformed-landmark family of errors, which the frame loop
    /// downgrades to "no hand" instead of aborting.
    pub fn is_invalid_hand(&self) -> bool {
        matches!(self, Error::InvalidHandData { .. } | Error::NonFiniteLandmark { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
