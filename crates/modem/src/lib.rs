//! commsim modem - line coding and carrier modulation
//!
//! This crate provides the physical layer of the stack: NRZ-Polar,
//! Manchester and Bipolar line codes, and ASK, FSK and 8-QAM carriers
//! sampled at a fixed rate per symbol.

pub mod line;
pub mod ask;
pub mod fsk;
pub mod qam;
pub mod common;
pub mod physical;
pub mod error;

pub use error::{ModemError, Result};
pub use physical::{demodulate, modulate, modulate_with_trace, Transmission};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ask::{AskModulator, AskDemodulator},
        fsk::{FskModulator, FskDemodulator},
        qam::{QamModulator, QamDemodulator, Constellation},
        common::{Modulator, Demodulator, ModulationConfig},
        physical::{Transmission, modulate, modulate_with_trace, demodulate},
        error::{ModemError, Result},
    };
}
