// Serial and resistor identifiers carried in calibration filenames,
// e.g. tracer-sn0-r1-cal.dat

use std::path::{Path, PathBuf};

use crate::core::error::{CalError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalFileName {
    pub serial: String,
    pub resistor: String,
}

impl CalFileName {
    pub fn new(serial: impl Into<String>, resistor: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            resistor: resistor.into(),
        }
    }

    /// Only the final path component is inspected, so directories may
    /// contain dashes.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CalError::BadFilename(path.display().to_string()))?;

        let fields: Vec<&str> = name.split('-').collect();
        if fields.len() < 3 || fields[1].is_empty() || fields[2].is_empty() {
            return Err(CalError::BadFilename(name.to_string()));
        }

        Ok(Self::new(fields[1].to_uppercase(), fields[2].to_uppercase()))
    }

    pub fn inverse_path<P: AsRef<Path>>(&self, dir: P) -> PathBuf {
        dir.as_ref().join(format!(
            "invert-{}-{}-cal.dat",
            self.serial.to_lowercase(),
            self.resistor.to_lowercase()
        ))
    }
}
