// Inverse table construction from a calibration sweep

use crate::core::calibration::CalibrationTable;
use crate::core::constants::*;
use crate::core::format::{CalibrationSample, InverseTable, RegisterSetting};
use crate::models::config_model::InvertConfig;
use std::ops::RangeInclusive;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Lo,
    Hi,
}

/// Maps whole-ohm targets onto register settings. Each target is reached
/// from one of its two bracketing samples by nudging up to three registers
/// one count each, `delta` ohms per nudge.
#[derive(Debug, Clone)]
pub struct Inverter {
    delta: f64,
    nominal: RangeInclusive<u32>,
}

impl Default for Inverter {
    fn default() -> Self {
        Self {
            delta: DELTA,
            nominal: DEFAULT_NOMINAL_BEGIN..=DEFAULT_NOMINAL_END,
        }
    }
}

impl Inverter {
    pub fn new(config: &InvertConfig) -> Self {
        Self {
            delta: config.delta,
            nominal: config.nominal_begin..=config.nominal_end,
        }
    }

    pub fn invert(
        &self,
        table: &CalibrationTable,
        serial: impl Into<String>,
        resistor: impl Into<String>,
    ) -> InverseTable {
        let mut inverse = InverseTable::new(serial, resistor);

        // relay engaged, wiper bypassed
        let zero = table.zero_ohms();
        inverse.rows.push(RegisterSetting {
            nominal: 0,
            registers: [0; REGISTER_COUNT],
            actual: zero.resistance,
            error: zero.resistance,
        });

        let wiper = table.wiper_samples();
        for rnom in self.nominal.clone() {
            let Some((lo, hi)) = bracket(wiper, rnom as f64) else {
                continue;
            };

            inverse.range_begin.get_or_insert(rnom);
            inverse.range_end = Some(rnom);
            inverse.row_count += 1;
            inverse.rows.push(self.settle(rnom, lo, hi));
        }

        info!(
            "Inverted {}/{}: {} rows, range {:?}..={:?}",
            inverse.serial,
            inverse.resistor,
            inverse.row_count,
            inverse.range_begin,
            inverse.range_end
        );
        inverse
    }

    fn settle(&self, rnom: u32, lo: &CalibrationSample, hi: &CalibrationSample) -> RegisterSetting {
        let target = rnom as f64;
        let mut err_lo = [0.0; ADJUST_STEPS];
        let mut err_hi = [0.0; ADJUST_STEPS];
        for adjust in 0..ADJUST_STEPS {
            let step = adjust as f64 * self.delta;
            err_lo[adjust] = (target - (lo.resistance + step)).abs();
            err_hi[adjust] = (target - (hi.resistance - step)).abs();
        }

        let (i_lo, e_lo) = first_min(&err_lo);
        let (i_hi, e_hi) = first_min(&err_hi);

        // LO only on a strict win
        let branch = if e_lo < e_hi { Branch::Lo } else { Branch::Hi };

        let setting = match branch {
            Branch::Lo => {
                let mut registers = [lo.count; REGISTER_COUNT];
                registers[..i_lo].iter_mut().for_each(|r| *r += 1);
                RegisterSetting {
                    nominal: rnom,
                    registers,
                    actual: lo.resistance + i_lo as f64 * self.delta,
                    error: e_lo,
                }
            }
            Branch::Hi => {
                let mut registers = [hi.count; REGISTER_COUNT];
                // hi is never the first sample, so its count is at least 1
                registers[..i_hi].iter_mut().for_each(|r| *r -= 1);
                RegisterSetting {
                    nominal: rnom,
                    registers,
                    actual: hi.resistance - i_hi as f64 * self.delta,
                    error: -e_hi,
                }
            }
        };

        debug!(
            rnom,
            lo = lo.count,
            hi = hi.count,
            ?err_lo,
            ?err_hi,
            ?branch,
            registers = ?setting.registers,
            "{:.3} ohms, error {:+.3}",
            setting.actual,
            setting.error
        );
        setting
    }
}

/// First adjacent pair with `lo < target <= hi`.
fn bracket(samples: &[CalibrationSample], target: f64) -> Option<(&CalibrationSample, &CalibrationSample)> {
    samples
        .windows(2)
        .find(|pair| target > pair[0].resistance && target <= pair[1].resistance)
        .map(|pair| (&pair[0], &pair[1]))
}

// Earliest index wins ties, preferring the smaller adjustment
fn first_min(errors: &[f64; ADJUST_STEPS]) -> (usize, f64) {
    errors
        .iter()
        .copied()
        .enumerate()
        .fold((0, errors[0]), |best, (i, e)| if e < best.1 { (i, e) } else { best })
}
