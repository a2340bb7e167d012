// Verification of a programmed resistor against its commanded values

use crate::core::calibration::parse_samples;
use crate::core::compression::read_text;
use crate::core::error::{CalError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckPoint {
    pub commanded: u16,
    pub measured: f64,
    pub deviation: f64,
}

/// Deviation of measured resistance from the commanded value over a check
/// sweep. Check files share the calibration layout with the first column
/// holding the commanded ohms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub points: Vec<CheckPoint>,
    pub mean_deviation: f64,
    pub rms_deviation: f64,
    pub worst: CheckPoint,
}

impl CheckReport {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let report = Self::parse(&read_text(path)?)?;
        info!(
            "Checked {} points from {}, worst deviation {:+.3} ohms at {}",
            report.points.len(),
            path.display(),
            report.worst.deviation,
            report.worst.commanded
        );
        Ok(report)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let points: Vec<CheckPoint> = parse_samples(text)?
            .into_iter()
            .map(|s| CheckPoint {
                commanded: s.count,
                measured: s.resistance,
                deviation: s.resistance - s.count as f64,
            })
            .collect();
        Self::from_points(points)
    }

    pub fn from_points(points: Vec<CheckPoint>) -> Result<Self> {
        let first = *points.first().ok_or(CalError::InsufficientSamples {
            needed: 1,
            found: 0,
        })?;

        let n = points.len() as f64;
        let mean_deviation = points.iter().map(|p| p.deviation).sum::<f64>() / n;
        let rms_deviation = (points.iter().map(|p| p.deviation * p.deviation).sum::<f64>() / n).sqrt();
        let worst = points.iter().copied().fold(first, |worst, p| {
            if p.deviation.abs() > worst.deviation.abs() {
                p
            } else {
                worst
            }
        });

        Ok(Self {
            points,
            mean_deviation,
            rms_deviation,
            worst,
        })
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Rcommanded, Rmeasured, Difference")?;
        for p in &self.points {
            writeln!(f, "{}\t{:.2}\t{:+.3}", p.commanded, p.measured, p.deviation)?;
        }
        writeln!(
            f,
            "# points {}  mean {:+.3}  rms {:.3}  worst {:+.3} at {}",
            self.points.len(),
            self.mean_deviation,
            self.rms_deviation,
            self.worst.deviation,
            self.worst.commanded
        )
    }
}
