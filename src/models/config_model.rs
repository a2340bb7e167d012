use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::constants::{DEFAULT_NOMINAL_BEGIN, DEFAULT_NOMINAL_END, DELTA};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvertConfig {
    /// Ohms gained or lost per single-count register nudge.
    pub delta: f64,
    pub nominal_begin: u32,
    pub nominal_end: u32,
    /// Directory receiving `invert-*` tables.
    pub output_dir: PathBuf,
}

impl Default for InvertConfig {
    fn default() -> Self {
        Self {
            delta: DELTA,
            nominal_begin: DEFAULT_NOMINAL_BEGIN,
            nominal_end: DEFAULT_NOMINAL_END,
            output_dir: PathBuf::from("data"),
        }
    }
}
