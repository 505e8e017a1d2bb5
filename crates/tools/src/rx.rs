//! Receiver configuration and implementation

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use commsim_core::signal::{Series, SignalPlot};

use crate::common::{load_config, read_wav_file, write_plot_file};
use crate::config::SchemeArgs;
use crate::pipeline::Pipeline;
use crate::transport::{Request, Response};
use crate::tx::resolve_config;

/// Receiver configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "commsim-rx")]
#[command(about = "Demodulate and decode a transmission")]
pub struct RxConfig {
    /// Request JSON written by the transmitter, or a WAV carrier
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the decoded text to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the received carrier and demodulated line series as JSON
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Pipeline configuration file, used for WAV input
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub schemes: SchemeArgs,
}

/// commsim receiver
pub struct Receiver {
    config: RxConfig,
}

impl Receiver {
    /// Create a new receiver
    pub fn new(config: RxConfig) -> Self {
        Self { config }
    }

    /// Load the request to decode from the input file.
    ///
    /// A WAV file carries samples only, so its schemes come from the
    /// configuration file and flags.
    pub fn load_request(&self) -> Result<Request> {
        let input = &self.config.input;
        if input.extension().and_then(|s| s.to_str()) == Some("wav") {
            let samples = read_wav_file(input)?;
            let pipeline = resolve_config(self.config.config.as_ref(), &self.config.schemes)?;
            Ok(Request::new(pipeline.schemes(), samples))
        } else {
            load_config(input).with_context(|| format!("Failed to load request: {:?}", input))
        }
    }

    /// Decode the input, writing the plot series when asked
    pub fn receive(&self) -> Result<Response> {
        let request = self.load_request()?;
        info!("Decoding {} samples ({})", request.samples.len(), request.schemes());

        let pipeline = Pipeline::new(request.schemes());
        match pipeline.receive_with_trace(&request.samples) {
            Ok((received, signal)) => {
                if let Some(ref path) = self.config.plot {
                    write_plot_file(&signal.plot(), path)?;
                }
                Ok(Response::from_received(&received))
            }
            Err(e) => {
                warn!("Reception failed: {}", e);
                // The carrier is still worth looking at when decoding fails
                if let Some(ref path) = self.config.plot {
                    let plot = SignalPlot {
                        line: Series::default(),
                        carrier: Series::sampled(&request.samples),
                    };
                    write_plot_file(&plot, path)?;
                }
                Ok(Response::from_error(&e))
            }
        }
    }
}

/// Run a reception from the command line
pub fn run(config: RxConfig) -> Result<()> {
    let output = config.output.clone();
    match Receiver::new(config).receive()? {
        Response::Decoded { text, binary } => {
            println!("Binary result: {}", binary);
            println!("Text result:   {}", text);
            if let Some(path) = output {
                std::fs::write(&path, &text)
                    .with_context(|| format!("Failed to write output: {:?}", path))?;
                println!("Decoded text written to {:?}", path);
            }
            Ok(())
        }
        Response::Failed { error, kind } => anyhow::bail!("{}: {}", kind, error),
    }
}
