//! Plottable signal series
//!
//! The stack can hand two series to whatever renders them: the line-coded
//! signal (drawn as steps) and the carrier (drawn sample by sample). Both are
//! plain numeric vectors paired with a time axis.

use crate::bits::Level;
use serde::{Deserialize, Serialize};

/// Numeric series paired with its time axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    /// Series for a line signal, one time unit per level.
    ///
    /// One extra point repeating the final level is appended so a step plot
    /// shows the last level for its full duration.
    pub fn step(levels: &[Level]) -> Self {
        let mut time: Vec<f64> = (0..levels.len()).map(|i| i as f64).collect();
        let mut values: Vec<f64> = levels.iter().map(|&l| f64::from(l)).collect();

        if let Some(&last) = values.last() {
            time.push(levels.len() as f64);
            values.push(last);
        }

        Self { time, values }
    }

    /// Series for carrier samples on a sample-index axis
    pub fn sampled(samples: &[f64]) -> Self {
        Self {
            time: (0..samples.len()).map(|i| i as f64).collect(),
            values: samples.to_vec(),
        }
    }

    /// Get the number of points
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest absolute value, 0 for an empty series
    pub fn peak(&self) -> f64 {
        self.values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
    }
}

/// The two series produced by one transmission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalPlot {
    pub line: Series,
    pub carrier: Series,
}
