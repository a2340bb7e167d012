// One-line summary of a processed calibration

use crate::core::constants::NO_RANGE;
use crate::core::fit::LinearFit;
use crate::core::format::InverseTable;
use serde::Serialize;
use std::fmt;

pub const SUMMARY_HEADER: &str = "# S/N\tR#\tSlope\tOffset\tRmin\tRmax\tNres";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalSummary {
    pub serial: String,
    pub resistor: String,
    /// Absent when the sweep has too few wiper samples to fit.
    pub slope: Option<f64>,
    pub offset: Option<f64>,
    pub range_begin: Option<u32>,
    pub range_end: Option<u32>,
    pub row_count: usize,
}

impl CalSummary {
    pub fn new(inverse: &InverseTable, fit: Option<&LinearFit>) -> Self {
        Self {
            serial: inverse.serial.clone(),
            resistor: inverse.resistor.clone(),
            slope: fit.map(|f| f.slope),
            offset: fit.map(|f| f.offset),
            range_begin: inverse.range_begin,
            range_end: inverse.range_end,
            row_count: inverse.row_count,
        }
    }
}

impl fmt::Display for CalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<u32>| b.map_or_else(|| NO_RANGE.to_string(), |v| v.to_string());
        let coef = |c: Option<f64>| c.map_or_else(|| NO_RANGE.to_string(), |v| format!("{:.3}", v));
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.serial,
            self.resistor,
            coef(self.slope),
            coef(self.offset),
            bound(self.range_begin),
            bound(self.range_end),
            self.row_count
        )
    }
}
