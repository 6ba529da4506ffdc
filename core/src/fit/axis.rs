use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prelude::Axis;

/// One (distance, duration) observation used for fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Slew distance in degrees.
    pub distance: f64,
    /// Observed slew duration in seconds.
    pub duration: f64,
}

impl Sample {
    pub fn new(distance: f64, duration: f64) -> Self {
        Self { distance, duration }
    }
}

/// Linear slew-duration model for one axis: duration = distance * rate +
/// offset, with rate in seconds per degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisModel {
    pub axis: Axis,
    pub rate: f64,
    pub offset: f64,
}

impl AxisModel {
    pub fn new(axis: Axis, rate: f64, offset: f64) -> Self {
        Self { axis, rate, offset }
    }

    /// Predicted slew duration in seconds for a distance in degrees.
    pub fn predict(&self, distance: f64) -> f64 {
        distance * self.rate + self.offset
    }

    /// Plot caption fragment with the rate converted back to deg/min.
    pub fn title(&self) -> String {
        format!("Rate: {:.1} Offset: {:.1}", 60.0 / self.rate, self.offset)
    }
}

impl fmt::Display for AxisModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7.1}+{:4.1}", 60.0 / self.rate, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_is_linear() {
        let model = AxisModel::new(Axis::Azimuth, 1.5, 10.0);
        assert_eq!(model.predict(0.0), 10.0);
        assert_eq!(model.predict(40.0), 70.0);
    }

    #[test]
    fn display_reports_speed_and_offset() {
        let model = AxisModel::new(Axis::Elevation, 4.0, 8.0);
        assert_eq!(format!("{model}"), "   15.0+ 8.0");
        assert_eq!(model.title(), "Rate: 15.0 Offset: 8.0");
    }
}
