//! End-to-end transmit/receive pipeline

use commsim_core::bits::Bit;
use commsim_core::channel::BitFlipChannel;
use commsim_core::schemes::SchemeSet;
use commsim_core::ErrorKind;
use commsim_frame::link::{self, LinkConfig, Overhead, Received};
use commsim_frame::FrameError;
use commsim_modem::{line, physical, ModemError, Transmission};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;

/// Errors surfaced by the tools crate
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] commsim_core::CoreError),

    #[error(transparent)]
    Link(#[from] FrameError),

    #[error(transparent)]
    Modem(#[from] ModemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Classify this error for the transport boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Core(e) => e.kind(),
            PipelineError::Link(e) => e.kind(),
            PipelineError::Modem(e) => e.kind(),
            PipelineError::Io(_) | PipelineError::Json(_) => ErrorKind::ConfigurationError,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Everything produced on the sending side of one run
#[derive(Debug, Clone)]
pub struct Transmitted {
    /// Message bits before framing
    pub raw: Vec<Bit>,
    /// Link-layer output
    pub coded: Vec<Bit>,
    /// Bits added by each link stage
    pub overhead: Overhead,
    /// Positions the channel flipped in `coded`
    pub flipped: Vec<usize>,
    pub signal: Transmission,
}

/// One configured link + physical stack
#[derive(Debug, Clone)]
pub struct Pipeline {
    schemes: SchemeSet,
    channel: BitFlipChannel,
}

impl Pipeline {
    /// Create a pipeline with an ideal channel
    pub fn new(schemes: SchemeSet) -> Self {
        Self {
            schemes,
            channel: BitFlipChannel::ideal(),
        }
    }

    /// Create a pipeline from a configuration file's contents
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let channel = match config.seed {
            Some(seed) => BitFlipChannel::with_seed(config.flip_probability, seed)?,
            None => BitFlipChannel::new(config.flip_probability)?,
        };
        Ok(Self::new(config.schemes()).with_channel(channel))
    }

    /// Replace the channel
    pub fn with_channel(mut self, channel: BitFlipChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Get the scheme selection
    pub fn schemes(&self) -> SchemeSet {
        self.schemes
    }

    fn link(&self) -> LinkConfig {
        LinkConfig::new(self.schemes.framing, self.schemes.detection, self.schemes.correction)
    }

    /// Encode, pass through the channel and modulate a message
    pub fn transmit(&mut self, message: &str) -> Result<Transmitted> {
        let s = self.schemes;
        let (coded, raw) = link::encode(s.framing, s.detection, s.correction, message)?;
        let overhead = link::overhead(self.link(), &raw)?;

        let (sent, flipped) = self.channel.transmit(&coded);
        if !flipped.is_empty() {
            warn!("Channel flipped {} of {} bits", flipped.len(), coded.len());
        }

        let signal = physical::modulate_with_trace(s.line_code, s.carrier, &sent)?;
        info!(
            "Transmitted {} chars as {} samples ({})",
            message.chars().count(),
            signal.samples.len(),
            s
        );

        Ok(Transmitted {
            raw,
            coded,
            overhead,
            flipped,
            signal,
        })
    }

    /// Demodulate and decode received samples
    pub fn receive(&self, samples: &[f64]) -> Result<Received> {
        self.receive_with_trace(samples).map(|(received, _)| received)
    }

    /// Like [`Pipeline::receive`], also keeping the demodulated line signal
    /// next to the received carrier
    pub fn receive_with_trace(&self, samples: &[f64]) -> Result<(Received, Transmission)> {
        let s = self.schemes;
        let levels = physical::demodulate_levels(s.line_code, s.carrier, samples)?;
        let bits = line::decode(s.line_code, &levels)?;
        debug!("Demodulated {} levels into {} bits", levels.len(), bits.len());

        let received = link::receive(self.link(), &bits)?;
        info!("Received {:?} ({})", received.text, s);

        let signal = Transmission {
            levels,
            samples: samples.to_vec(),
        };
        Ok((received, signal))
    }
}
