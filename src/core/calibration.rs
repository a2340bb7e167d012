// Calibration sweep loading, validation and writing

use crate::core::compression::read_text;
use crate::core::constants::*;
use crate::core::error::{CalError, Result};
use crate::core::format::CalibrationSample;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// A validated calibration sweep. The last sample is the relay-shorted
/// zero-ohms measurement; all others are wiper positions.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    samples: Vec<CalibrationSample>,
}

impl CalibrationTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let table = Self::from_samples(parse_samples(&text)?)?;

        info!(
            "Loaded {} calibration samples from {}",
            table.samples.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_samples(samples: Vec<CalibrationSample>) -> Result<Self> {
        let last = samples.last().ok_or(CalError::InsufficientSamples {
            needed: 1,
            found: 0,
        })?;

        if last.count != ZERO_OHMS_COUNT {
            warn!(
                "Final sample has count {}, expected {} for the relay-shorted entry",
                last.count, ZERO_OHMS_COUNT
            );
        }

        for pair in samples.windows(2) {
            if pair[1].count <= pair[0].count {
                return Err(CalError::NonMonotonic {
                    count: pair[1].count,
                    reason: format!("follows count {}", pair[0].count),
                });
            }
        }

        let wiper = &samples[..samples.len() - 1];
        for pair in wiper.windows(2) {
            if pair[1].resistance < pair[0].resistance {
                return Err(CalError::NonMonotonic {
                    count: pair[1].count,
                    reason: format!(
                        "{:.3} ohms is below {:.3} ohms at count {}",
                        pair[1].resistance, pair[0].resistance, pair[0].count
                    ),
                });
            }
        }

        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    /// Wiper samples, excluding the reserved zero-ohms entry.
    pub fn wiper_samples(&self) -> &[CalibrationSample] {
        &self.samples[..self.samples.len() - 1]
    }

    pub fn zero_ohms(&self) -> &CalibrationSample {
        // from_samples rejects empty sweeps
        &self.samples[self.samples.len() - 1]
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        write_samples(out, &self.samples)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_samples(path, &self.samples)
    }
}

/// Writes samples in the sweep file layout. No ordering checks are made,
/// so a freshly measured sweep can be kept before it is validated.
pub fn write_samples<W: Write>(out: &mut W, samples: &[CalibrationSample]) -> Result<()> {
    writeln!(out, "# count\tmean\tstdev\tn")?;
    for s in samples {
        writeln!(
            out,
            "{}\t{:.2}\t{:.4}\t{}",
            s.count, s.resistance, s.stdev, s.sample_count
        )?;
    }
    Ok(())
}

pub fn save_samples<P: AsRef<Path>>(path: P, samples: &[CalibrationSample]) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_samples(&mut out, samples)?;
    out.flush()?;
    info!("Wrote {} calibration samples to {}", samples.len(), path.display());
    Ok(())
}

/// Parses tab-separated `count mean stdev n [raw...]` records without
/// any ordering checks. Comment and blank lines are skipped.
pub fn parse_samples(text: &str) -> Result<Vec<CalibrationSample>> {
    let mut samples = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() < CAL_MIN_COLUMNS {
            return Err(CalError::malformed(
                line_no,
                format!(
                    "expected at least {} columns, got {}",
                    CAL_MIN_COLUMNS,
                    fields.len()
                ),
            ));
        }

        samples.push(CalibrationSample {
            count: parse_field(fields[0], "count", line_no)?,
            resistance: parse_field(fields[1], "resistance", line_no)?,
            stdev: parse_field(fields[2], "stdev", line_no)?,
            sample_count: parse_field(fields[3], "sample count", line_no)?,
        });
    }

    Ok(samples)
}

pub(crate) fn parse_field<T: FromStr>(field: &str, name: &str, line: usize) -> Result<T> {
    field
        .parse()
        .map_err(|_| CalError::malformed(line, format!("invalid {} '{}'", name, field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWEEP: &str = "# Began on: 2021-03-02\n\
        0\t12.00\t0.0079\t10\t[12.01, 12.01, 12.0]\n\
        1\t13.61\t0.0042\t10\t[13.6, 13.61]\n\
        2\t14.57\t0.0052\t10\n\
        3\t15.80\t0.0000\t10\n\
        256\t0.20\t0.0010\t10\n\
        # Ended on: 2021-03-02\n";

    #[test]
    fn test_parse_skips_comments_and_raw_columns() {
        let samples = parse_samples(SWEEP).unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[1].count, 1);
        assert_eq!(samples[1].resistance, 13.61);
        assert_eq!(samples[1].stdev, 0.0042);
        assert_eq!(samples[1].sample_count, 10);
        assert_eq!(samples[4].count, 256);
    }

    #[test]
    fn test_short_line_is_malformed() {
        let err = parse_samples("0\t12.00\t0.0079\n").unwrap_err();
        assert!(matches!(err, CalError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_bad_number_is_malformed() {
        let err = parse_samples("# header\n0\t12.00\t0.0079\t10\n1\tabc\t0.1\t10\n").unwrap_err();
        match err {
            CalError::MalformedRecord { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("resistance"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fractional_count_is_malformed() {
        let err = parse_samples("1.5\t12.00\t0.0079\t10\n").unwrap_err();
        assert!(matches!(err, CalError::MalformedRecord { .. }));
    }

    #[test]
    fn test_table_splits_zero_ohms() {
        let table = CalibrationTable::from_samples(parse_samples(SWEEP).unwrap()).unwrap();
        assert_eq!(table.wiper_samples().len(), 4);
        assert_eq!(table.zero_ohms().count, 256);
        assert_eq!(table.zero_ohms().resistance, 0.20);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = CalibrationTable::from_samples(Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            CalError::InsufficientSamples { needed: 1, found: 0 }
        ));
    }

    #[test]
    fn test_decreasing_resistance_rejected() {
        let samples = vec![
            CalibrationSample::new(0, 12.0),
            CalibrationSample::new(1, 13.5),
            CalibrationSample::new(2, 13.2),
            CalibrationSample::new(256, 0.2),
        ];
        let err = CalibrationTable::from_samples(samples).unwrap_err();
        assert!(matches!(err, CalError::NonMonotonic { count: 2, .. }));
    }

    #[test]
    fn test_repeated_count_rejected() {
        let samples = vec![
            CalibrationSample::new(0, 12.0),
            CalibrationSample::new(0, 13.0),
            CalibrationSample::new(256, 0.2),
        ];
        assert!(matches!(
            CalibrationTable::from_samples(samples),
            Err(CalError::NonMonotonic { count: 0, .. })
        ));
    }

    #[test]
    fn test_flat_resistance_accepted() {
        let samples = vec![
            CalibrationSample::new(0, 12.0),
            CalibrationSample::new(1, 12.0),
            CalibrationSample::new(256, 0.2),
        ];
        assert!(CalibrationTable::from_samples(samples).is_ok());
    }

    #[test]
    fn test_write_then_load() {
        let table = CalibrationTable::from_samples(parse_samples(SWEEP).unwrap()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracer-sn0-r1-cal.dat");
        table.save(&path).unwrap();

        let loaded = CalibrationTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }
}
