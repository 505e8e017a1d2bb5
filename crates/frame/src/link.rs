//! Link-layer pipeline
//!
//! Encoding runs framing, then detection, then correction. Decoding applies
//! the inverses in reverse order and finishes with the text codec.

use crate::correction::{self, ErrorStats};
use crate::detection;
use crate::framing;
use crate::Result;
use commsim_core::bits::{bits_to_text, text_to_bits, Bit};
use commsim_core::schemes::{CorrectionScheme, DetectionScheme, FramingScheme};
use tracing::{debug, info};

/// Link-layer scheme choice for one transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    pub framing: FramingScheme,
    pub detection: DetectionScheme,
    pub correction: CorrectionScheme,
}

impl LinkConfig {
    pub fn new(
        framing: FramingScheme,
        detection: DetectionScheme,
        correction: CorrectionScheme,
    ) -> Self {
        Self {
            framing,
            detection,
            correction,
        }
    }
}

/// Decoded message along with what the correction stage repaired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub text: String,
    pub payload: Vec<Bit>,
    pub stats: ErrorStats,
}

/// Bits each link stage adds on top of the raw message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overhead {
    pub framing: usize,
    pub detection: usize,
    pub correction: usize,
}

impl Overhead {
    /// Total bits added by the link layer
    pub fn total(&self) -> usize {
        self.framing + self.detection + self.correction
    }
}

/// Work out the per-stage overhead of encoding `raw` under `config`.
///
/// Stuffing overhead depends on the payload contents, so the payload is
/// framed to measure it.
pub fn overhead(config: LinkConfig, raw: &[Bit]) -> Result<Overhead> {
    let framed_len = framing::frame(config.framing, raw)?.len();
    let detection = detection::check_overhead(config.detection, framed_len);
    let correction = correction::correction_overhead(config.correction, framed_len + detection);

    Ok(Overhead {
        framing: framed_len - raw.len(),
        detection,
        correction,
    })
}

/// Encode a message, returning the coded bits and the raw message bits
pub fn encode(
    framing: FramingScheme,
    detection: DetectionScheme,
    correction: CorrectionScheme,
    message: &str,
) -> Result<(Vec<Bit>, Vec<Bit>)> {
    let raw = text_to_bits(message);
    let framed = framing::frame(framing, &raw)?;
    let checked = detection::add_check(detection, &framed);
    let coded = correction::protect(correction, &checked);

    debug!(
        "Link encode: {} raw bits -> {} framed -> {} checked -> {} coded",
        raw.len(),
        framed.len(),
        checked.len(),
        coded.len()
    );

    Ok((coded, raw))
}

/// Decode coded bits back into a message
pub fn decode(
    framing: FramingScheme,
    detection: DetectionScheme,
    correction: CorrectionScheme,
    bits: &[Bit],
) -> Result<String> {
    receive(LinkConfig::new(framing, detection, correction), bits).map(|r| r.text)
}

/// Decode coded bits, keeping the recovered payload and correction statistics
pub fn receive(config: LinkConfig, bits: &[Bit]) -> Result<Received> {
    let (corrected, stats) = correction::correct(config.correction, bits);
    if stats.corrected_errors > 0 {
        info!("{} corrected {} group(s)", config.correction, stats.corrected_errors);
    }

    let framed = detection::verify_check(config.detection, &corrected)?;
    let payload = framing::deframe(config.framing, &framed)?;
    let text = bits_to_text(&payload)?;

    debug!(
        "Link decode: {} coded bits -> {} payload bits -> {} chars",
        bits.len(),
        payload.len(),
        text.chars().count()
    );

    Ok(Received {
        text,
        payload,
        stats,
    })
}
