//! Transmitter configuration and implementation

use anyhow::{Context, Result};
use clap::Parser;
use commsim_core::bits::format_bits;
use std::path::PathBuf;
use tracing::info;

use crate::common::{load_config, save_config, write_plot_file, write_wav_file};
use crate::config::{PipelineConfig, SchemeArgs};
use crate::pipeline::{Pipeline, Transmitted};
use crate::transport::{send_request, Request, Response};

/// Transmitter configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "commsim-tx")]
#[command(about = "Encode and modulate a message")]
pub struct TxConfig {
    /// Message to transmit
    #[arg(short, long)]
    pub text: Option<String>,

    /// Read the message from a text file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Pipeline configuration file (TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub schemes: SchemeArgs,

    /// Write the request JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write line and carrier series as JSON
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Write the carrier as a 16-bit WAV file
    #[arg(long)]
    pub wav: Option<PathBuf>,

    /// Send the request to a receiver at this address
    #[arg(long, value_name = "ADDR")]
    pub send: Option<String>,

    /// Save the effective pipeline configuration
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

/// Resolve the pipeline configuration from an optional file and flag overrides
pub fn resolve_config(path: Option<&PathBuf>, overrides: &SchemeArgs) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    config.apply(overrides);
    Ok(config)
}

/// commsim transmitter
pub struct Transmitter {
    config: TxConfig,
    pipeline_config: PipelineConfig,
    pipeline: Pipeline,
}

impl Transmitter {
    /// Create a new transmitter
    pub fn new(config: TxConfig) -> Result<Self> {
        let pipeline_config = resolve_config(config.config.as_ref(), &config.schemes)?;
        let pipeline = Pipeline::from_config(&pipeline_config)?;
        Ok(Self {
            config,
            pipeline_config,
            pipeline,
        })
    }

    /// Get the message to send
    pub fn message(&self) -> Result<String> {
        if let Some(ref text) = self.config.text {
            Ok(text.clone())
        } else if let Some(ref file) = self.config.file {
            std::fs::read_to_string(file).with_context(|| format!("Failed to read file: {:?}", file))
        } else {
            anyhow::bail!("Either --text or --file must be specified")
        }
    }

    /// Encode and modulate the message, writing any requested outputs
    pub fn transmit(&mut self) -> Result<(Transmitted, Request)> {
        let message = self.message()?;
        info!("Transmitting {} characters", message.chars().count());

        let sent = self.pipeline.transmit(&message)?;
        let request = Request::new(self.pipeline.schemes(), sent.signal.samples.clone());

        if let Some(ref path) = self.config.output {
            let content = serde_json::to_string(&request)?;
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write request file: {:?}", path))?;
            info!("Wrote request to {:?}", path);
        }
        if let Some(ref path) = self.config.plot {
            write_plot_file(&sent.signal.plot(), path)?;
        }
        if let Some(ref path) = self.config.wav {
            write_wav_file(&sent.signal.samples, path)?;
        }
        if let Some(ref path) = self.config.save_config {
            save_config(&self.pipeline_config, path)?;
        }

        Ok((sent, request))
    }
}

/// Run a transmission from the command line
pub async fn run(config: TxConfig) -> Result<()> {
    let send = config.send.clone();
    let mut transmitter = Transmitter::new(config)?;
    let (sent, request) = transmitter.transmit()?;

    println!("Schemes:     {}", request.schemes());
    println!("Raw bits:    {}", format_bits(&sent.raw));
    println!("Coded bits:  {}", format_bits(&sent.coded));
    println!(
        "Overhead:    {} framing + {} detection + {} correction bits",
        sent.overhead.framing, sent.overhead.detection, sent.overhead.correction
    );
    if !sent.flipped.is_empty() {
        println!("Flipped:     {:?}", sent.flipped);
    }
    println!("Samples:     {}", sent.signal.samples.len());

    if let Some(addr) = send {
        let response = send_request(&addr, &request)
            .await
            .with_context(|| format!("Failed to reach receiver at {}", addr))?;
        match response {
            Response::Decoded { text, binary } => {
                println!("Receiver decoded: {:?}", text);
                println!("Receiver binary:  {}", binary);
            }
            Response::Failed { error, kind } => {
                anyhow::bail!("Receiver reported {}: {}", kind, error);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_transmit_writes_outputs() {
        let dir = tempdir().unwrap();
        let config = TxConfig::parse_from([
            "commsim-tx",
            "--text",
            "Hi",
            "--carrier",
            "8-QAM",
            "--output",
            dir.path().join("request.json").to_str().unwrap(),
            "--plot",
            dir.path().join("plot.json").to_str().unwrap(),
            "--wav",
            dir.path().join("carrier.wav").to_str().unwrap(),
            "--save-config",
            dir.path().join("pipeline.toml").to_str().unwrap(),
        ]);

        let mut transmitter = Transmitter::new(config).unwrap();
        let (_, request) = transmitter.transmit().unwrap();

        let written: Request = load_config(&dir.path().join("request.json")).unwrap();
        assert_eq!(written, request);
        assert!(dir.path().join("plot.json").exists());
        assert!(dir.path().join("carrier.wav").exists());

        let saved: PipelineConfig = load_config(&dir.path().join("pipeline.toml")).unwrap();
        assert_eq!(saved.carrier, commsim_core::schemes::CarrierScheme::Qam8);
    }

    #[test]
    fn test_message_required() {
        let transmitter = Transmitter::new(TxConfig::parse_from(["commsim-tx"])).unwrap();
        assert!(transmitter.message().is_err());
    }

    #[test]
    fn test_unknown_scheme_flag() {
        assert!(TxConfig::try_parse_from(["commsim-tx", "--framing", "slip"]).is_err());
    }
}
