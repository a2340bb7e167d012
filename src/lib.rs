// Digipot calibration processing
// Main library entry point

pub mod core;
pub mod models;
pub mod utils;

// Re-export main types
pub use crate::core::acquire::{acquire, ResistanceSampler};
pub use crate::core::calibration::CalibrationTable;
pub use crate::core::check::{CheckPoint, CheckReport};
pub use crate::core::error::{CalError, Result};
pub use crate::core::fit::LinearFit;
pub use crate::core::format::{CalibrationSample, InverseTable, Measurement, RegisterSetting};
pub use crate::core::inversion::Inverter;
pub use crate::core::summary::CalSummary;
pub use crate::models::config_model::InvertConfig;
pub use crate::utils::filename::CalFileName;
