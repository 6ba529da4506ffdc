//! Outlier-rejecting least-squares refinement of an axis model.

use ndarray::Array1;

use crate::fit::axis::{AxisModel, Sample};
use crate::prelude::{SlewError, SlewResult};

/// One refinement pass: the partition it produced and the threshold the
/// next pass should widen from.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub accepted: Vec<Sample>,
    pub rejected: Vec<Sample>,
    pub next_threshold: f64,
}

impl AxisModel {
    /// Refits this model in place over the samples whose current residual
    /// is within `threshold` seconds.
    ///
    /// The fitted offset is biased upward by mean + std x `factor` of the
    /// accepted residuals, so the line envelopes the bulk of the accepted
    /// population instead of centering on it.
    pub fn refit(
        &mut self,
        samples: &[Sample],
        threshold: f64,
        factor: f64,
    ) -> SlewResult<FitOutcome> {
        let (accepted, rejected): (Vec<Sample>, Vec<Sample>) = samples
            .iter()
            .copied()
            .partition(|s| (self.predict(s.distance) - s.duration).abs() <= threshold);

        if accepted.len() < 2 {
            return Err(SlewError::Insufficient(format!(
                "{} accepted {} samples, need at least 2",
                self.axis,
                accepted.len()
            )));
        }

        let x = Array1::from_iter(accepted.iter().map(|s| s.distance));
        let y = Array1::from_iter(accepted.iter().map(|s| s.duration));

        let x_mean = x.mean().unwrap_or(0.0);
        let y_mean = y.mean().unwrap_or(0.0);
        let dx = &x - x_mean;
        let spread_x = dx.dot(&dx);
        if spread_x == 0.0 {
            return Err(SlewError::Insufficient(format!(
                "{} samples share a single distance",
                self.axis
            )));
        }

        let slope = dx.dot(&(&y - y_mean)) / spread_x;
        let intercept = y_mean - slope * x_mean;

        let residuals = &x * slope + intercept - &y;
        let mean_res = residuals.mean().unwrap_or(0.0);
        // Population standard deviation of the residuals.
        let spread = residuals
            .mapv(|r| (r - mean_res) * (r - mean_res))
            .mean()
            .unwrap_or(0.0)
            .sqrt();
        let envelope = spread * factor;

        self.rate = slope;
        self.offset = intercept + mean_res + envelope;

        Ok(FitOutcome {
            accepted,
            rejected,
            next_threshold: envelope,
        })
    }
}
