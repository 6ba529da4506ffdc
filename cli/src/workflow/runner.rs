use log::warn;

use slewcore::catalog::Antenna;
use slewcore::fit::{collect_samples, estimate_axis, AxisModel, Sample};
use slewcore::prelude::Axis;
use slewcore::records::ScanStore;

use crate::workflow::config::AnalysisConfig;

/// Fit result for one axis, ready for rendering and reporting.
pub struct AxisReport {
    pub axis: Axis,
    pub baseline: AxisModel,
    pub estimate: AxisModel,
    pub accepted: Vec<Sample>,
    pub rejected: Vec<Sample>,
}

/// Orchestrates sample selection and per-axis fitting over a filled store.
#[derive(Clone)]
pub struct Runner {
    config: AnalysisConfig,
}

impl Runner {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Fits both axes for `station`. Axes without samples, or whose fit
    /// degenerates, are skipped with a diagnostic rather than failing the
    /// run.
    pub fn execute<S: ScanStore>(
        &self,
        store: &S,
        antenna: &Antenna,
        station: &str,
    ) -> Vec<AxisReport> {
        let (az_samples, el_samples) = collect_samples(store, station, &antenna.azimuth);

        let axes = [
            (&antenna.azimuth, az_samples),
            (&antenna.elevation, el_samples),
        ];

        let mut reports = Vec::new();
        for (baseline, samples) in axes {
            match estimate_axis(baseline, &samples, self.config.rejection_factor) {
                Ok(est) => reports.push(AxisReport {
                    axis: baseline.axis,
                    baseline: baseline.clone(),
                    estimate: est.model,
                    accepted: est.accepted,
                    rejected: est.rejected,
                }),
                Err(err) => warn!("{} axis skipped: {}", baseline.axis, err),
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slewcore::prelude::SettlingAxis;
    use slewcore::records::{MemoryStore, ScanKey, ScanStore};

    fn antenna() -> Antenna {
        Antenna {
            code: "Sh".into(),
            name: "SESHAN25".into(),
            azimuth: AxisModel::new(Axis::Azimuth, 1.5, 10.0),
            elevation: AxisModel::new(Axis::Elevation, 4.0, 8.0),
        }
    }

    fn seed_scan(store: &mut MemoryStore, name: &str, last: SettlingAxis, dist: f64, dt: f64) {
        let rec = store.get_or_create(&ScanKey::new("r1703", "sh", name));
        rec.usable = true;
        rec.last = last;
        match last {
            SettlingAxis::Elevation => rec.slew_el = dist,
            _ => rec.slew_az = dist,
        }
        rec.slew_time = dt;
    }

    #[test]
    fn runner_fits_both_axes_on_clean_data() {
        let mut store = MemoryStore::new();
        for i in 1..=8 {
            let d = i as f64 * 10.0;
            seed_scan(
                &mut store,
                &format!("az{i}"),
                SettlingAxis::Azimuth,
                d,
                d * 1.5 + 10.0,
            );
            seed_scan(
                &mut store,
                &format!("el{i}"),
                SettlingAxis::Elevation,
                d,
                d * 4.0 + 8.0,
            );
        }

        let runner = Runner::new(AnalysisConfig::default());
        let reports = runner.execute(&store, &antenna(), "sh");

        assert_eq!(reports.len(), 2);
        let az = &reports[0];
        assert_eq!(az.axis, Axis::Azimuth);
        assert!((az.estimate.rate - 1.5).abs() < 1e-9);
        assert!((az.estimate.offset - 10.0).abs() < 1e-9);
        assert_eq!(az.accepted.len(), 8);

        let el = &reports[1];
        assert_eq!(el.axis, Axis::Elevation);
        assert!((el.estimate.rate - 4.0).abs() < 1e-9);
    }

    #[test]
    fn axis_without_samples_is_skipped() {
        let mut store = MemoryStore::new();
        for i in 1..=4 {
            let d = i as f64 * 10.0;
            seed_scan(
                &mut store,
                &format!("el{i}"),
                SettlingAxis::Elevation,
                d,
                d * 4.0 + 8.0,
            );
        }

        let runner = Runner::new(AnalysisConfig::default());
        let reports = runner.execute(&store, &antenna(), "sh");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].axis, Axis::Elevation);
    }

    #[test]
    fn empty_store_produces_no_reports() {
        let store = MemoryStore::new();
        let runner = Runner::new(AnalysisConfig::default());
        assert!(runner.execute(&store, &antenna(), "sh").is_empty());
    }
}
