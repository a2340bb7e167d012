// Calibration and file format constants

/// Resistance change produced by nudging one register by one count (ohms).
pub const DELTA: f64 = 0.25;

/// Number of parallel register channels per resistor.
pub const REGISTER_COUNT: usize = 4;

// Adjustments 0..=3: at most three registers are nudged away from the bracket count
pub const ADJUST_STEPS: usize = REGISTER_COUNT;

/// Wiper positions 0..=255 of the digipot.
pub const WIPER_POSITIONS: u16 = 256;

/// Count under which the relay-shorted (zero ohms) measurement is stored.
pub const ZERO_OHMS_COUNT: u16 = 256;

// Default nominal resistance span covered by the inverse table
pub const DEFAULT_NOMINAL_BEGIN: u32 = 1;
pub const DEFAULT_NOMINAL_END: u32 = 299;

// Calibration record: count mean stdev n [raw...]
pub const CAL_MIN_COLUMNS: usize = 4;

// Inverse row: rnom r0 r1 r2 r3 ract rerr
pub const INVERSE_ROW_COLUMNS: usize = 2 + REGISTER_COUNT + 1;

// serial, resistor, rbeg, rend, nres
pub const INVERSE_HEADER_LINES: usize = 5;

pub const COMMENT_PREFIX: char = '#';

// Written in place of a range bound when the table has no non-zero rows
pub const NO_RANGE: &str = "none";

pub const ROWS_COMMENT: &str = "# Rnominal, Registers[1-4], Ractual, Rerror";

pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
