//! Error types for the commsim physical layer

use commsim_core::bits::Level;
use commsim_core::schemes::LineCode;
use commsim_core::ErrorKind;
use thiserror::Error;

/// Physical-layer error types
#[derive(Error, Debug)]
pub enum ModemError {
    #[error("Invalid modulation parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("{line_code} level {level} at index {index} is outside the alphabet")]
    LevelOutOfAlphabet {
        line_code: LineCode,
        level: Level,
        index: usize,
    },

    #[error("8-QAM symbol {symbol}: level {level} has no constellation point")]
    Constellation { symbol: usize, level: Level },

    #[error("Malformed {line_code} signal: {msg}")]
    MalformedLineSignal { line_code: LineCode, msg: String },

    #[error("ASK window {window}: mean amplitude {amplitude:.3} is neither on nor off")]
    AmbiguousAmplitude { window: usize, amplitude: f64 },

    #[error("Demodulation failed: {msg}")]
    DemodulationFailed { msg: String },

    #[error("Core error: {0}")]
    Core(#[from] commsim_core::CoreError),
}

impl ModemError {
    /// Classify this error for the transport boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModemError::InvalidParameters { .. } => ErrorKind::ConfigurationError,
            ModemError::LevelOutOfAlphabet { .. } | ModemError::Constellation { .. } => {
                ErrorKind::ConstellationError
            }
            ModemError::MalformedLineSignal { .. }
            | ModemError::AmbiguousAmplitude { .. }
            | ModemError::DemodulationFailed { .. } => ErrorKind::DemodulationError,
            ModemError::Core(e) => e.kind(),
        }
    }
}

/// Result type for commsim physical-layer operations
pub type Result<T> = std::result::Result<T, ModemError>;
