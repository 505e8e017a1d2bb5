//! Bit-flip channel
//!
//! A stand-in for a noisy medium: every bit is flipped independently with a
//! fixed probability. There is no physical model behind it.

use crate::bits::Bit;
use crate::{CoreError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Uniform independent bit-flip channel
#[derive(Debug, Clone)]
pub struct BitFlipChannel {
    flip_probability: f64,
    rng: StdRng,
}

impl BitFlipChannel {
    /// Create a channel seeded from system entropy
    pub fn new(flip_probability: f64) -> Result<Self> {
        Self::validate(flip_probability)?;
        Ok(Self {
            flip_probability,
            rng: StdRng::from_entropy(),
        })
    }

    /// Create a reproducible channel
    pub fn with_seed(flip_probability: f64, seed: u64) -> Result<Self> {
        Self::validate(flip_probability)?;
        Ok(Self {
            flip_probability,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// A channel that never flips anything
    pub fn ideal() -> Self {
        Self {
            flip_probability: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn validate(flip_probability: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&flip_probability) {
            return Err(CoreError::InvalidProbability {
                probability: flip_probability,
            });
        }
        Ok(())
    }

    /// Get the per-bit flip probability
    pub fn flip_probability(&self) -> f64 {
        self.flip_probability
    }

    /// Pass bits through the channel, returning the received copy and the
    /// positions that were flipped
    pub fn transmit(&mut self, bits: &[Bit]) -> (Vec<Bit>, Vec<usize>) {
        let mut received = Vec::with_capacity(bits.len());
        let mut flipped = Vec::new();

        for (i, &bit) in bits.iter().enumerate() {
            if self.flip_probability > 0.0 && self.rng.gen_bool(self.flip_probability) {
                received.push(bit ^ 1);
                flipped.push(i);
            } else {
                received.push(bit);
            }
        }

        if !flipped.is_empty() {
            debug!("Channel flipped {} of {} bits", flipped.len(), bits.len());
        }

        (received, flipped)
    }
}

/// Return a copy of `bits` with the bit at `index` inverted
pub fn flip_bit(bits: &[Bit], index: usize) -> Result<Vec<Bit>> {
    if index >= bits.len() {
        return Err(CoreError::IndexOutOfRange {
            index,
            len: bits.len(),
        });
    }
    let mut out = bits.to_vec();
    out[index] ^= 1;
    Ok(out)
}
