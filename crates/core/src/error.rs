//! Error types for commsim core

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline-wide classification of a failed run.
///
/// Every crate error maps onto one of these so that the transport boundary
/// can report a stable name to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Marker mismatch or declared-vs-actual length mismatch
    FramingError,
    /// Parity or CRC check failed
    TransmissionError,
    /// Malformed byte/text conversion
    DecodeError,
    /// Levels outside the signalling alphabet, 8-QAM table included
    ConstellationError,
    /// Unknown scheme selector or invalid parameter
    ConfigurationError,
    /// Sampled signal that cannot be mapped back to line levels
    DemodulationError,
}

impl ErrorKind {
    /// Name used in serialized error payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FramingError => "FramingError",
            ErrorKind::TransmissionError => "TransmissionError",
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::ConstellationError => "ConstellationError",
            ErrorKind::ConfigurationError => "ConfigurationError",
            ErrorKind::DemodulationError => "DemodulationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Bit count {count} is not a multiple of 8")]
    UnalignedBits { count: usize },

    #[error("Invalid bit value {value} at position {position}")]
    InvalidBit { value: u8, position: usize },

    #[error("Decoded bytes are not valid UTF-8: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    #[error("Unknown {kind} scheme: {name}")]
    UnknownScheme { kind: &'static str, name: String },

    #[error("Flip probability {probability} outside [0, 1]")]
    InvalidProbability { probability: f64 },

    #[error("Bit index {index} out of range for {len} bits")]
    IndexOutOfRange { index: usize, len: usize },
}

impl CoreError {
    /// Classify this error for the transport boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::UnalignedBits { .. }
            | CoreError::InvalidBit { .. }
            | CoreError::InvalidText(_) => ErrorKind::DecodeError,
            CoreError::UnknownScheme { .. }
            | CoreError::InvalidProbability { .. }
            | CoreError::IndexOutOfRange { .. } => ErrorKind::ConfigurationError,
        }
    }
}

/// Result type for commsim core operations
pub type Result<T> = std::result::Result<T, CoreError>;
