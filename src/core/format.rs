// Data structures for calibration and inverse table files

use crate::core::constants::REGISTER_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One measured point of a calibration sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub count: u16,
    pub resistance: f64,
    pub stdev: f64,
    pub sample_count: u32,
}

impl CalibrationSample {
    pub fn new(count: u16, resistance: f64) -> Self {
        Self {
            count,
            resistance,
            stdev: 0.0,
            sample_count: 0,
        }
    }
}

/// Aggregated multimeter readings for one setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub mean: f64,
    pub stdev: f64,
    pub samples: u32,
}

/// One row of the inverse table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterSetting {
    pub nominal: u32,
    pub registers: [u16; REGISTER_COUNT],
    pub actual: f64,
    pub error: f64,
}

impl fmt::Display for RegisterSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.nominal as f64)?;
        for reg in &self.registers {
            write!(f, "\t{}", reg)?;
        }
        write!(f, "\t{:.3}\t{:+.3}", self.actual, self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverseTable {
    pub serial: String,
    pub resistor: String,
    pub range_begin: Option<u32>,
    pub range_end: Option<u32>,
    pub row_count: usize,
    pub rows: Vec<RegisterSetting>,
}

impl InverseTable {
    pub fn new(serial: impl Into<String>, resistor: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            resistor: resistor.into(),
            range_begin: None,
            range_end: None,
            row_count: 0,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The relay-shorted row, stored first.
    pub fn zero_ohms(&self) -> Option<&RegisterSetting> {
        self.rows.first().filter(|row| row.nominal == 0)
    }
}
