// First-order least squares fit of resistance against count

use crate::core::calibration::CalibrationTable;
use crate::core::error::{CalError, Result};
use crate::core::format::CalibrationSample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Ohms per count.
    pub slope: f64,
    /// Ohms at count zero.
    pub offset: f64,
}

impl LinearFit {
    /// Fits the wiper samples; the zero-ohms entry does not take part.
    pub fn from_table(table: &CalibrationTable) -> Result<Self> {
        Self::from_samples(table.wiper_samples())
    }

    pub fn from_samples(samples: &[CalibrationSample]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(CalError::InsufficientSamples {
                needed: 2,
                found: samples.len(),
            });
        }

        let n = samples.len() as f64;
        let mean_x = samples.iter().map(|s| s.count as f64).sum::<f64>() / n;
        let mean_y = samples.iter().map(|s| s.resistance).sum::<f64>() / n;

        let (sxy, sxx) = samples.iter().fold((0.0, 0.0), |(sxy, sxx), s| {
            let dx = s.count as f64 - mean_x;
            (sxy + dx * (s.resistance - mean_y), sxx + dx * dx)
        });

        // distinct counts are enforced by CalibrationTable, but raw slices are not
        if sxx == 0.0 {
            return Err(CalError::DegenerateFit {
                count: samples[0].count,
                samples: samples.len(),
            });
        }

        let slope = sxy / sxx;
        Ok(Self {
            slope,
            offset: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, count: f64) -> f64 {
        self.slope * count + self.offset
    }
}
