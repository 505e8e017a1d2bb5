//! commsim core - bits, scheme selectors and channel primitives
//!
//! This crate holds the pieces shared by the link and physical layers:
//! the text ⇄ bit codec, the scheme selector enums, the error
//! classification, the bit-flip channel and plottable signal series.

pub mod bits;
pub mod channel;
pub mod schemes;
pub mod signal;
pub mod error;

pub use error::{CoreError, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        bits::{Bit, Level, text_to_bits, bits_to_text, format_bits},
        channel::{BitFlipChannel, flip_bit},
        schemes::{
            FramingScheme, DetectionScheme, CorrectionScheme, LineCode, CarrierScheme, SchemeSet,
        },
        signal::{Series, SignalPlot},
        error::{CoreError, ErrorKind, Result},
    };
}
