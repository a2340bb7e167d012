// Inverse table file reading, writing and lookup

use crate::core::calibration::parse_field;
use crate::core::compression::read_text;
use crate::core::constants::*;
use crate::core::error::{CalError, Result};
use crate::core::format::{InverseTable, RegisterSetting};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

impl InverseTable {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::parse(&read_text(path)?)?;
        info!(
            "Loaded inverse table {}/{} ({} rows) from {}",
            table.serial,
            table.resistor,
            table.rows.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut header: Vec<(usize, &str)> = Vec::with_capacity(INVERSE_HEADER_LINES);
        let mut rows = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if header.len() < INVERSE_HEADER_LINES {
                header.push((line_no, fields[0]));
                continue;
            }

            rows.push(Self::parse_row(&fields, line_no)?);
        }

        if header.len() < INVERSE_HEADER_LINES {
            return Err(CalError::malformed(
                text.lines().count(),
                format!(
                    "expected {} header values, got {}",
                    INVERSE_HEADER_LINES,
                    header.len()
                ),
            ));
        }

        let (_, serial) = header[0];
        let (_, resistor) = header[1];
        let (begin_line, begin) = header[2];
        let (end_line, end) = header[3];
        let (count_line, count) = header[4];

        let table = Self {
            serial: serial.to_string(),
            resistor: resistor.to_string(),
            range_begin: parse_bound(begin, begin_line)?,
            range_end: parse_bound(end, end_line)?,
            row_count: parse_field(count, "row count", count_line)?,
            rows,
        };

        let nonzero = table.rows.iter().filter(|r| r.nominal != 0).count();
        if nonzero != table.row_count {
            // older tables counted the zero row as well
            warn!(
                "Header declares {} rows, found {} non-zero rows",
                table.row_count, nonzero
            );
        }

        Ok(table)
    }

    fn parse_row(fields: &[&str], line: usize) -> Result<RegisterSetting> {
        if fields.len() != INVERSE_ROW_COLUMNS {
            return Err(CalError::malformed(
                line,
                format!(
                    "expected {} columns, got {}",
                    INVERSE_ROW_COLUMNS,
                    fields.len()
                ),
            ));
        }

        let mut registers = [0u16; REGISTER_COUNT];
        for (reg, field) in registers.iter_mut().zip(&fields[1..=REGISTER_COUNT]) {
            *reg = parse_field(field, "register", line)?;
        }

        Ok(RegisterSetting {
            nominal: parse_nominal(fields[0], line)?,
            registers,
            actual: parse_field(fields[REGISTER_COUNT + 1], "actual resistance", line)?,
            error: parse_field(fields[REGISTER_COUNT + 2], "error", line)?,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}\t# serial number", self.serial)?;
        writeln!(out, "{}\t# resistor number", self.resistor)?;
        writeln!(out, "{}\t# minimum resistance value", format_bound(self.range_begin))?;
        writeln!(out, "{}\t# maximum resistance value", format_bound(self.range_end))?;
        writeln!(out, "{}\t# number of resistances", self.row_count)?;
        writeln!(out, "{}", ROWS_COMMENT)?;
        for row in &self.rows {
            writeln!(out, "{}", row)?;
        }
        Ok(())
    }

    pub fn to_text(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Writes the table, creating the parent directory when needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        info!("Wrote inverse table to {}", path.display());
        Ok(())
    }

    /// Finds the row for `ohms`, rounded half up to a whole ohm.
    ///
    /// Queries below the range fall back to the row after the zero-ohms row,
    /// queries above it to the last row. Inside the range only an exact
    /// nominal match is returned, so gaps in the table yield `None`.
    pub fn lookup(&self, ohms: f64) -> Option<&RegisterSetting> {
        if ohms.is_nan() {
            return None;
        }
        let (begin, end) = (self.range_begin?, self.range_end?);

        let target = (ohms + 0.5).floor();
        if target < begin as f64 {
            return self.rows.get(1);
        }
        if target > end as f64 {
            return self.rows.last();
        }

        let target = target as u32;
        self.rows.iter().find(|row| row.nominal == target)
    }
}

fn parse_nominal(field: &str, line: usize) -> Result<u32> {
    let value: f64 = parse_field(field, "nominal resistance", line)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(CalError::malformed(
            line,
            format!("nominal resistance '{}' is not a whole number of ohms", field),
        ));
    }
    Ok(value as u32)
}

fn parse_bound(field: &str, line: usize) -> Result<Option<u32>> {
    if field.eq_ignore_ascii_case(NO_RANGE) {
        return Ok(None);
    }
    parse_nominal(field, line).map(Some)
}

fn format_bound(bound: Option<u32>) -> String {
    match bound {
        Some(value) => value.to_string(),
        None => NO_RANGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "SN0\t# serial number\n\
        R1\t# resistor number\n\
        13\t# minimum resistance value\n\
        16\t# maximum resistance value\n\
        3\t# number of resistances\n\
        # Rnominal, Registers[1-4], Ractual, Rerror\n\
        0.0\t0\t0\t0\t0\t0.200\t+0.200\n\
        13.0\t0\t0\t1\t1\t13.110\t-0.110\n\
        14.0\t1\t1\t2\t2\t14.070\t-0.070\n\
        16.0\t3\t3\t3\t3\t16.020\t+0.020\n";

    #[test]
    fn test_parse_header_and_rows() {
        let table = InverseTable::parse(TABLE).unwrap();
        assert_eq!(table.serial, "SN0");
        assert_eq!(table.resistor, "R1");
        assert_eq!(table.range_begin, Some(13));
        assert_eq!(table.range_end, Some(16));
        assert_eq!(table.row_count, 3);
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
        assert!(InverseTable::new("SN0", "R1").is_empty());
        assert_eq!(table.rows[1].registers, [0, 0, 1, 1]);
        assert_eq!(table.rows[1].actual, 13.11);
        assert_eq!(table.rows[1].error, -0.11);
    }

    #[test]
    fn test_write_matches_file_layout() {
        let table = InverseTable::parse(TABLE).unwrap();
        assert_eq!(table.to_text().unwrap(), TABLE);
    }

    #[test]
    fn test_row_format() {
        let row = RegisterSetting {
            nominal: 13,
            registers: [0, 0, 1, 1],
            actual: 13.61 - 0.5,
            error: -(13.0f64 - (13.61 - 0.5)).abs(),
        };
        assert_eq!(row.to_string(), "13.0\t0\t0\t1\t1\t13.110\t-0.110");
    }

    #[test]
    fn test_lookup_inside_range() {
        let table = InverseTable::parse(TABLE).unwrap();
        assert_eq!(table.lookup(13.2).unwrap().nominal, 13);
        assert_eq!(table.lookup(13.5).unwrap().nominal, 14);
        assert_eq!(table.lookup(14.49).unwrap().nominal, 14);
    }

    #[test]
    fn test_lookup_gap_misses() {
        let table = InverseTable::parse(TABLE).unwrap();
        // 15 lies within 13..=16 but has no row
        assert!(table.lookup(14.6).is_none());
    }

    #[test]
    fn test_lookup_clamps_outside_range() {
        let table = InverseTable::parse(TABLE).unwrap();
        assert_eq!(table.lookup(1000.0).unwrap().nominal, 16);
        assert_eq!(table.lookup(2.0).unwrap().nominal, 13);
        // zero-ohm queries also clamp past the relay row
        assert_eq!(table.lookup(0.0).unwrap().nominal, 13);
        assert_eq!(table.lookup(-5.0).unwrap().nominal, 13);
    }

    #[test]
    fn test_lookup_empty_range() {
        let text = "SN0\nR1\nnone\nnone\n0\n0.0\t0\t0\t0\t0\t0.200\t+0.200\n";
        let table = InverseTable::parse(text).unwrap();
        assert_eq!(table.range_begin, None);
        assert!(table.lookup(50.0).is_none());
        assert_eq!(table.zero_ohms().unwrap().actual, 0.2);
    }

    #[test]
    fn test_short_header_is_malformed() {
        let err = InverseTable::parse("SN0\nR1\n13\n").unwrap_err();
        assert!(matches!(err, CalError::MalformedRecord { .. }));
    }

    #[test]
    fn test_row_arity_is_malformed() {
        let text = "SN0\nR1\n13\n13\n1\n13.0\t0\t0\t1\t13.110\t-0.110\n";
        let err = InverseTable::parse(text).unwrap_err();
        assert!(matches!(err, CalError::MalformedRecord { line: 6, .. }));
    }

    #[test]
    fn test_fractional_nominal_is_malformed() {
        let text = "SN0\nR1\n13\n13\n1\n13.5\t0\t0\t1\t1\t13.110\t-0.110\n";
        assert!(matches!(
            InverseTable::parse(text),
            Err(CalError::MalformedRecord { line: 6, .. })
        ));
    }

    #[test]
    fn test_legacy_row_count_accepted() {
        // zero row included in the count
        let text = TABLE.replace("3\t# number", "4\t# number");
        let table = InverseTable::parse(&text).unwrap();
        assert_eq!(table.row_count, 4);
        assert_eq!(table.rows.len(), 4);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("invert-sn0-r1-cal.dat");
        let table = InverseTable::parse(TABLE).unwrap();
        table.save(&path).unwrap();
        assert_eq!(InverseTable::open(&path).unwrap(), table);
    }
}
