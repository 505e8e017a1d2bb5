//! Error types for the commsim link layer

use commsim_core::schemes::{DetectionScheme, FramingScheme};
use commsim_core::ErrorKind;
use thiserror::Error;

/// Link-layer error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("{scheme} frame: {marker} marker does not match FLAG")]
    MarkerMismatch {
        scheme: FramingScheme,
        marker: &'static str,
    },

    #[error("{scheme} frame too short: need at least {required} bits, got {actual}")]
    Truncated {
        scheme: FramingScheme,
        required: usize,
        actual: usize,
    },

    #[error("Length prefix declares {declared} bits but {actual} follow")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Invalid length prefix: {msg}")]
    InvalidLengthPrefix { msg: String },

    #[error("Payload of {bits} bits exceeds the length prefix limit of {max}")]
    PayloadTooLong { bits: usize, max: usize },

    #[error("{scheme} frame: unescaped FLAG inside the body at bit {offset}")]
    UnescapedFlag { scheme: FramingScheme, offset: usize },

    #[error("{scheme} frame: ESCAPE at bit {offset} is not followed by a byte")]
    DanglingEscape { scheme: FramingScheme, offset: usize },

    #[error("{scheme} frame: incomplete stuffed unit at bit {offset}")]
    IncompleteUnit { scheme: FramingScheme, offset: usize },

    #[error("Transmission error detected by {check} check")]
    Transmission { check: DetectionScheme },

    #[error("Transmission error: {check} codeword of {len} bits is too short")]
    CodewordTooShort { check: DetectionScheme, len: usize },

    #[error("Core error: {0}")]
    Core(#[from] commsim_core::CoreError),
}

impl FrameError {
    /// Classify this error for the transport boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::MarkerMismatch { .. }
            | FrameError::Truncated { .. }
            | FrameError::LengthMismatch { .. }
            | FrameError::InvalidLengthPrefix { .. }
            | FrameError::PayloadTooLong { .. }
            | FrameError::UnescapedFlag { .. }
            | FrameError::DanglingEscape { .. }
            | FrameError::IncompleteUnit { .. } => ErrorKind::FramingError,
            FrameError::Transmission { .. } | FrameError::CodewordTooShort { .. } => {
                ErrorKind::TransmissionError
            }
            FrameError::Core(e) => e.kind(),
        }
    }
}

/// Result type for commsim link-layer operations
pub type Result<T> = std::result::Result<T, FrameError>;
