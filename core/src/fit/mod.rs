pub mod axis;
pub mod robust;
pub mod selector;

pub use axis::{AxisModel, Sample};
pub use robust::FitOutcome;
pub use selector::collect_samples;

use log::debug;

use crate::prelude::{SlewError, SlewResult};

/// Fixed number of refinement passes per axis. No convergence test; the
/// pass count is part of the output contract.
pub const FIT_ITERATIONS: usize = 10;
/// Seed value for the widening acceptance threshold.
pub const INITIAL_THRESHOLD: f64 = 100.0;
/// One-sided residual envelope factor. 1.96 covers 95%, 2.57 covers 99%.
pub const DEFAULT_REJECTION_FACTOR: f64 = 2.57;

/// Result of the iterative fit for one axis.
#[derive(Debug, Clone)]
pub struct AxisEstimate {
    pub model: AxisModel,
    pub accepted: Vec<Sample>,
    pub rejected: Vec<Sample>,
}

/// Refines a copy of the baseline model over `samples`.
///
/// Runs exactly [`FIT_ITERATIONS`] passes; the threshold handed to each
/// pass is `max(2, 2 x previous returned threshold)`, seeded with
/// [`INITIAL_THRESHOLD`], so the acceptance band widens relative to the
/// shrinking residual spread.
pub fn estimate_axis(
    baseline: &AxisModel,
    samples: &[Sample],
    rejection_factor: f64,
) -> SlewResult<AxisEstimate> {
    if samples.is_empty() {
        return Err(SlewError::Insufficient(format!(
            "no {} samples",
            baseline.axis
        )));
    }

    // Independently owned copy; the baseline is never touched by fitting.
    let mut model = baseline.clone();
    let mut threshold = INITIAL_THRESHOLD;
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for pass in 0..FIT_ITERATIONS {
        let outcome = model.refit(samples, (threshold * 2.0).max(2.0), rejection_factor)?;
        threshold = outcome.next_threshold;
        accepted = outcome.accepted;
        rejected = outcome.rejected;
        debug!(
            "{} pass {}: {} accepted, {} rejected, threshold {:.2}",
            model.axis,
            pass,
            accepted.len(),
            rejected.len(),
            threshold
        );
    }

    Ok(AxisEstimate {
        model,
        accepted,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Axis;

    fn linear_samples(rate: f64, offset: f64) -> Vec<Sample> {
        (1..=30)
            .map(|i| {
                let d = i as f64 * 5.0;
                Sample::new(d, d * rate + offset)
            })
            .collect()
    }

    #[test]
    fn estimate_recovers_a_clean_linear_relation() {
        let baseline = AxisModel::new(Axis::Azimuth, 1.5, 10.0);
        let samples = linear_samples(2.0, 6.0);

        let est = estimate_axis(&baseline, &samples, DEFAULT_REJECTION_FACTOR).unwrap();
        assert!((est.model.rate - 2.0).abs() < 1e-9);
        // Noise-free data has zero residual spread, so the envelope term
        // vanishes and the offset is the plain intercept.
        assert!((est.model.offset - 6.0).abs() < 1e-9);
        assert_eq!(est.accepted.len(), samples.len());
        assert!(est.rejected.is_empty());
    }

    #[test]
    fn estimate_rejects_a_gross_outlier() {
        let baseline = AxisModel::new(Axis::Elevation, 4.0, 8.0);
        let mut samples = linear_samples(4.0, 8.0);
        samples.push(Sample::new(10.0, 500.0));

        let est = estimate_axis(&baseline, &samples, DEFAULT_REJECTION_FACTOR).unwrap();
        assert_eq!(est.rejected.len(), 1);
        assert_eq!(est.rejected[0].duration, 500.0);
        assert!((est.model.rate - 4.0).abs() < 1e-6);
    }

    #[test]
    fn estimate_without_samples_is_an_error() {
        let baseline = AxisModel::new(Axis::Azimuth, 1.5, 10.0);
        let err = estimate_axis(&baseline, &[], DEFAULT_REJECTION_FACTOR).unwrap_err();
        assert!(matches!(err, SlewError::Insufficient(_)));
    }

    #[test]
    fn baseline_is_left_untouched() {
        let baseline = AxisModel::new(Axis::Azimuth, 1.5, 10.0);
        let samples = linear_samples(2.0, 6.0);
        estimate_axis(&baseline, &samples, DEFAULT_REJECTION_FACTOR).unwrap();
        assert_eq!(baseline.rate, 1.5);
        assert_eq!(baseline.offset, 10.0);
    }
}
