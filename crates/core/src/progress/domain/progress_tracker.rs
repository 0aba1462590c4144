use crate::shared::constants::NOMINAL_PROGRESS_SECONDS;

/// How elapsed time is turned into a visible amount of progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressScale {
    /// Total duration in seconds is known; render a percentage.
    Known(f64),
    /// Seekable input whose duration could not be probed; fill against a
    /// fixed nominal scale.
    Nominal,
    /// Streamed input with no duration at all; spin.
    Spinner,
}

impl ProgressScale {
    pub fn from_probe(duration: Option<f64>) -> Self {
        match duration {
            Some(total) if total.is_finite() && total > 0.0 => Self::Known(total),
            _ => Self::Nominal,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressSnapshot {
    Percent { percent: u8, elapsed_us: u64 },
    Activity { fraction: f64, elapsed_us: u64 },
    Spinner { tick: usize, elapsed_us: u64 },
    Complete,
}

/// `min(100, floor(elapsed * 100 / total))`.
pub fn percent(elapsed_us: u64, total_seconds: f64) -> u8 {
    let elapsed = elapsed_us as f64 / 1_000_000.0;
    (elapsed * 100.0 / total_seconds).floor().clamp(0.0, 100.0) as u8
}

/// Turns a stream of elapsed times into redraw decisions.
#[derive(Debug)]
pub struct ProgressTracker {
    scale: ProgressScale,
    last_time: Option<u64>,
    ticks: usize,
}

impl ProgressTracker {
    pub fn new(scale: ProgressScale) -> Self {
        Self {
            scale,
            last_time: None,
            ticks: 0,
        }
    }

    /// Returns a snapshot only when the elapsed time strictly increased.
    pub fn observe(&mut self, elapsed_us: u64) -> Option<ProgressSnapshot> {
        if self.last_time.is_some_and(|last| elapsed_us <= last) {
            return None;
        }
        self.last_time = Some(elapsed_us);
        Some(match self.scale {
            ProgressScale::Known(total) => ProgressSnapshot::Percent {
                percent: percent(elapsed_us, total),
                elapsed_us,
            },
            ProgressScale::Nominal => ProgressSnapshot::Activity {
                fraction: (elapsed_us as f64 / 1_000_000.0 / NOMINAL_PROGRESS_SECONDS).min(1.0),
                elapsed_us,
            },
            ProgressScale::Spinner => {
                self.ticks += 1;
                ProgressSnapshot::Spinner {
                    tick: self.ticks,
                    elapsed_us,
                }
            }
        })
    }

    /// Completion is always rendered full, whatever the last record said.
    pub fn finish(&self) -> ProgressSnapshot {
        ProgressSnapshot::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn percents(tracker: &mut ProgressTracker, times: &[u64]) -> Vec<u8> {
        times
            .iter()
            .filter_map(|&t| tracker.observe(t))
            .map(|s| match s {
                ProgressSnapshot::Percent { percent, .. } => percent,
                other => panic!("unexpected snapshot {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_percent_floors_and_caps() {
        assert_eq!(percent(0, 10.0), 0);
        assert_eq!(percent(999_999, 10.0), 9);
        assert_eq!(percent(5_000_000, 10.0), 50);
        assert_eq!(percent(25_000_000, 10.0), 100);
    }

    #[test]
    fn test_known_scale_is_non_decreasing_and_capped() {
        let mut tracker = ProgressTracker::new(ProgressScale::Known(4.0));
        let out = percents(
            &mut tracker,
            &[0, 500_000, 1_000_000, 3_999_999, 4_000_000, 9_000_000],
        );
        assert_eq!(out, vec![0, 12, 25, 99, 100, 100]);
        assert!(out.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_repeated_time_is_not_redrawn() {
        let mut tracker = ProgressTracker::new(ProgressScale::Known(10.0));
        assert!(tracker.observe(1_000_000).is_some());
        assert!(tracker.observe(1_000_000).is_none());
        assert!(tracker.observe(900_000).is_none());
        assert!(tracker.observe(1_000_001).is_some());
    }

    #[test]
    fn test_first_zero_record_draws() {
        let mut tracker = ProgressTracker::new(ProgressScale::Known(10.0));
        assert_eq!(
            tracker.observe(0),
            Some(ProgressSnapshot::Percent {
                percent: 0,
                elapsed_us: 0
            })
        );
    }

    #[test]
    fn test_nominal_scale_fills_against_fixed_span() {
        let mut tracker = ProgressTracker::new(ProgressScale::Nominal);
        let Some(ProgressSnapshot::Activity { fraction, .. }) = tracker.observe(60_000_000) else {
            panic!("expected activity snapshot");
        };
        assert_relative_eq!(fraction, 0.1);
        let Some(ProgressSnapshot::Activity { fraction, .. }) = tracker.observe(u64::MAX) else {
            panic!("expected activity snapshot");
        };
        assert_relative_eq!(fraction, 1.0);
    }

    #[test]
    fn test_spinner_ticks_per_redraw() {
        let mut tracker = ProgressTracker::new(ProgressScale::Spinner);
        tracker.observe(1);
        tracker.observe(1);
        assert_eq!(
            tracker.observe(2),
            Some(ProgressSnapshot::Spinner {
                tick: 2,
                elapsed_us: 2
            })
        );
    }

    #[test]
    fn test_finish_is_complete_even_when_undershooting() {
        let mut tracker = ProgressTracker::new(ProgressScale::Known(100.0));
        tracker.observe(1_000_000);
        assert_eq!(tracker.finish(), ProgressSnapshot::Complete);
    }

    #[test]
    fn test_scale_from_probe() {
        assert_eq!(ProgressScale::from_probe(Some(12.5)), ProgressScale::Known(12.5));
        assert_eq!(ProgressScale::from_probe(Some(0.0)), ProgressScale::Nominal);
        assert_eq!(ProgressScale::from_probe(Some(f64::NAN)), ProgressScale::Nominal);
        assert_eq!(ProgressScale::from_probe(None), ProgressScale::Nominal);
    }
}
