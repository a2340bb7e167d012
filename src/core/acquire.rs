// Calibration sweep acquisition through an instrument seam

use crate::core::constants::{WIPER_POSITIONS, ZERO_OHMS_COUNT};
use crate::core::error::Result;
use crate::core::format::{CalibrationSample, Measurement};
use tracing::{debug, info};

/// A digipot module wired to a multimeter. Implementations own their
/// connections; the sweep only borrows them for its duration.
pub trait ResistanceSampler {
    fn set_counts(&mut self, count: u16) -> Result<()>;

    /// Engages or releases the relay shorting the wiper.
    fn set_relay(&mut self, engaged: bool) -> Result<()>;

    fn measure(&mut self) -> Result<Measurement>;
}

/// Sweeps every wiper position, then measures the relay-shorted state and
/// stores it under count 256. The relay is released even when that
/// measurement fails.
///
/// The sweep comes back as measured. Save it before building a
/// `CalibrationTable`, which rejects sweeps with a resistance dip.
pub fn acquire<S: ResistanceSampler>(sampler: &mut S) -> Result<Vec<CalibrationSample>> {
    let mut samples = Vec::with_capacity(WIPER_POSITIONS as usize + 1);

    for count in 0..WIPER_POSITIONS {
        sampler.set_counts(count)?;
        let m = sampler.measure()?;
        debug!("count {}: {:.2} ohms (stdev {:.4}, n={})", count, m.mean, m.stdev, m.samples);
        samples.push(sample(count, m));
    }

    sampler.set_counts(0)?;
    sampler.set_relay(true)?;
    let shorted = sampler.measure();
    sampler.set_relay(false)?;
    let m = shorted?;
    debug!("relay shorted: {:.2} ohms", m.mean);
    samples.push(sample(ZERO_OHMS_COUNT, m));

    info!("Acquired {} calibration samples", samples.len());
    Ok(samples)
}

fn sample(count: u16, m: Measurement) -> CalibrationSample {
    CalibrationSample {
        count,
        resistance: m.mean,
        stdev: m.stdev,
        sample_count: m.samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calibration::{parse_samples, save_samples, CalibrationTable};
    use crate::core::compression::read_text;
    use crate::core::error::CalError;

    struct MockModule {
        count: u16,
        relay: bool,
        fail_shorted: bool,
        dip_at: Option<u16>,
        relay_log: Vec<bool>,
    }

    impl MockModule {
        fn new() -> Self {
            Self {
                count: 0,
                relay: false,
                fail_shorted: false,
                dip_at: None,
                relay_log: Vec::new(),
            }
        }
    }

    impl ResistanceSampler for MockModule {
        fn set_counts(&mut self, count: u16) -> Result<()> {
            self.count = count;
            Ok(())
        }

        fn set_relay(&mut self, engaged: bool) -> Result<()> {
            self.relay = engaged;
            self.relay_log.push(engaged);
            Ok(())
        }

        fn measure(&mut self) -> Result<Measurement> {
            if self.relay {
                if self.fail_shorted {
                    return Err(CalError::Instrument("meter timeout".to_string()));
                }
                return Ok(Measurement { mean: 0.2, stdev: 0.001, samples: 10 });
            }
            if self.dip_at == Some(self.count) {
                // meter noise on a flat stretch
                let previous = 12.0 + 1.1 * (self.count - 1) as f64;
                return Ok(Measurement { mean: previous - 0.01, stdev: 0.005, samples: 10 });
            }
            Ok(Measurement {
                mean: 12.0 + 1.1 * self.count as f64,
                stdev: 0.005,
                samples: 10,
            })
        }
    }

    #[test]
    fn test_full_sweep() {
        let mut module = MockModule::new();
        let table = CalibrationTable::from_samples(acquire(&mut module).unwrap()).unwrap();

        assert_eq!(table.samples().len(), 257);
        assert_eq!(table.wiper_samples()[255].count, 255);
        assert_eq!(table.zero_ohms().count, ZERO_OHMS_COUNT);
        assert_eq!(table.zero_ohms().resistance, 0.2);
        assert_eq!(module.relay_log, vec![true, false]);
        assert!(!module.relay);
    }

    #[test]
    fn test_relay_released_on_failure() {
        let mut module = MockModule::new();
        module.fail_shorted = true;

        assert!(matches!(acquire(&mut module), Err(CalError::Instrument(_))));
        assert!(!module.relay);
    }

    #[test]
    fn test_dipping_sweep_is_kept() {
        let mut module = MockModule::new();
        module.dip_at = Some(200);

        let samples = acquire(&mut module).unwrap();
        assert_eq!(samples.len(), 257);
        assert!(samples[200].resistance < samples[199].resistance);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracer-sn0-r1-cal.dat");
        save_samples(&path, &samples).unwrap();

        let reloaded = parse_samples(&read_text(&path).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 257);
        assert_eq!(reloaded[200].count, 200);
        assert!(matches!(
            CalibrationTable::from_samples(reloaded),
            Err(CalError::NonMonotonic { count: 200, .. })
        ));
    }
}
