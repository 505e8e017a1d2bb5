//! Common utilities for tools

use anyhow::{Context, Result};
use commsim_core::signal::SignalPlot;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Sample rate written into WAV headers, one symbol per 100 samples
pub const WAV_SAMPLE_RATE: u32 = 8000;

/// Initialize logging from the global CLI flags
pub fn init_logging(verbose: bool, debug: bool) {
    let log_level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Load configuration from file
pub fn load_config<T: for<'a> Deserialize<'a>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    // Try JSON first, then TOML
    if let Ok(config) = serde_json::from_str(&content) {
        return Ok(config);
    }

    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("Failed to parse config file: {}", e),
    }
}

/// Save configuration to file
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = if path.extension().and_then(|s| s.to_str()) == Some("json") {
        serde_json::to_string_pretty(config)?
    } else {
        toml::to_string_pretty(config)?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(())
}

/// Write carrier samples to a 16-bit mono WAV file
pub fn write_wav_file(samples: &[f64], path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: WAV_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

    for sample in samples {
        let amplitude = (sample * 32767.0).clamp(-32767.0, 32767.0) as i16;
        writer.write_sample(amplitude)?;
    }

    writer.finalize()?;
    info!("Wrote {} samples to {:?}", samples.len(), path);
    Ok(())
}

/// Read samples back from a WAV file written by [`write_wav_file`]
pub fn read_wav_file(path: &Path) -> Result<Vec<f64>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {:?}", path))?;

    let samples: std::result::Result<Vec<i16>, _> = reader.samples::<i16>().collect();
    let samples = samples.context("Failed to read audio samples")?;

    info!("Read {} samples from {:?}", samples.len(), path);
    Ok(samples.into_iter().map(|s| f64::from(s) / 32767.0).collect())
}

/// Write the line and carrier series as JSON
pub fn write_plot_file(plot: &SignalPlot, path: &Path) -> Result<()> {
    let content = serde_json::to_string(plot)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write plot file: {:?}", path))?;
    info!("Wrote signal plot to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commsim_core::signal::Series;
    use tempfile::Builder;

    #[test]
    fn test_wav_roundtrip_quantization() {
        let temp_file = Builder::new().suffix(".wav").tempfile().unwrap();
        let samples = vec![0.0, 0.5, 1.0, -1.0, 1.5];

        write_wav_file(&samples, temp_file.path()).unwrap();
        let read = read_wav_file(temp_file.path()).unwrap();

        assert_eq!(read.len(), samples.len());
        assert!((read[1] - 0.5).abs() < 1e-4);
        // out-of-range samples are clamped
        assert_eq!(read[4], 1.0);
    }

    #[test]
    fn test_plot_file() {
        let temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let plot = SignalPlot {
            line: Series::step(&[1, -1]),
            carrier: Series::sampled(&[0.0, 1.0]),
        };

        write_plot_file(&plot, temp_file.path()).unwrap();
        let loaded: SignalPlot = load_config(temp_file.path()).unwrap();
        assert_eq!(loaded, plot);
    }

    #[test]
    fn test_load_config_rejects_garbage() {
        let temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(temp_file.path(), "framing = [").unwrap();
        assert!(load_config::<crate::config::PipelineConfig>(temp_file.path()).is_err());
    }
}
