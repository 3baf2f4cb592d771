//! CPU utilization from consecutive `/proc/stat` samples.
//!
//! A single read of `/proc/stat` only gives tick counts since boot; usage over
//! an interval needs the previous sample. [`CpuUsageCalculator`] keeps that
//! sample and is owned by whoever drives the sampling loop.

use crate::collector::error::SampleError;
use crate::model::CpuSample;

/// Stateful CPU usage calculator.
///
/// The baseline starts zeroed, so the first update reports the average
/// utilization since boot rather than over the last interval. Callers that
/// need interval semantics should discard the first value (see
/// [`CpuUsageCalculator::is_primed`]).
#[derive(Debug, Clone, Default)]
pub struct CpuUsageCalculator {
    previous: CpuSample,
}

impl CpuUsageCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a sample has been accepted as baseline.
    pub fn is_primed(&self) -> bool {
        !self.previous.is_zero()
    }

    /// Baseline used for the next delta.
    pub fn previous(&self) -> &CpuSample {
        &self.previous
    }

    /// Computes usage in percent between the stored baseline and `current`.
    ///
    /// The baseline is replaced only when a value is returned, except for a
    /// counter reset. When the counters went backwards (reboot or wrap) this
    /// call still fails with [`SampleError::Degenerate`], but `current`
    /// becomes the new baseline; the old one would make every later sample
    /// look like a reset too.
    pub fn update(&mut self, current: CpuSample) -> Result<f64, SampleError> {
        let prev_total = self.previous.total();
        let total = current.total();

        if total < prev_total {
            self.previous = current;
            return Err(SampleError::Degenerate("cpu counters went backwards"));
        }

        let total_delta = total - prev_total;
        if total_delta == 0 {
            return Err(SampleError::Degenerate("no cpu ticks elapsed between samples"));
        }

        let idle_delta = current
            .idle_total()
            .saturating_sub(self.previous.idle_total())
            .min(total_delta);
        let busy_delta = total_delta - idle_delta;

        let usage = (100.0 * busy_delta as f64 / total_delta as f64).clamp(0.0, 100.0);

        self.previous = current;
        Ok(usage)
    }
}
