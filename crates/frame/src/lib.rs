//! commsim link layer - framing, error detection and error correction
//!
//! This crate turns a message into a coded bit sequence and back:
//! framing delimits the payload, detection codes catch corruption and
//! Hamming(12,8) repairs single-bit errors per byte.

pub mod framing;
pub mod detection;
pub mod correction;
pub mod link;
pub mod error;

pub use error::{FrameError, Result};
pub use link::{decode, encode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        framing::{Framer, LengthPrefix, ByteStuffing, BitStuffing, frame, deframe},
        detection::{ErrorDetector, ParityCheck, Crc},
        correction::{HammingCode, ErrorStats},
        link::{LinkConfig, Received, Overhead, encode, decode, receive},
        error::{FrameError, Result},
    };
}
