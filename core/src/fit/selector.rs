//! Per-axis sample selection from stored scans.

use log::info;

use crate::fit::axis::{AxisModel, Sample};
use crate::prelude::SettlingAxis;
use crate::records::ScanStore;

/// Collects the (distance, duration) samples for both axes of `station`.
///
/// Only usable scans with a determined last-settling axis contribute.
/// Elevation-tagged scans use the elevation delta directly. Azimuth-tagged
/// scans are ambiguous between the direct delta and its 360-degree
/// complement (the mount may have travelled the other way around the
/// wrap); the candidate whose baseline prediction is closer to the
/// observed duration wins.
pub fn collect_samples<S: ScanStore>(
    store: &S,
    station: &str,
    baseline_az: &AxisModel,
) -> (Vec<Sample>, Vec<Sample>) {
    let mut azimuth = Vec::new();
    let mut elevation = Vec::new();
    let mut scanned = 0usize;

    for rec in store.station_records(station) {
        if !rec.usable || rec.last == SettlingAxis::Unknown {
            continue;
        }
        scanned += 1;
        match rec.last {
            SettlingAxis::Elevation => {
                elevation.push(Sample::new(rec.slew_el.abs(), rec.slew_time));
            }
            _ => {
                azimuth.push(Sample::new(
                    resolve_azimuth_distance(baseline_az, rec.slew_az, rec.slew_time),
                    rec.slew_time,
                ));
            }
        }
    }

    info!(
        "{} useful scans for {}: {} azimuth, {} elevation",
        scanned,
        station,
        azimuth.len(),
        elevation.len()
    );
    (azimuth, elevation)
}

fn resolve_azimuth_distance(baseline: &AxisModel, slew_az: f64, slew_time: f64) -> f64 {
    let direct = slew_az.abs();
    let reverse = (360.0 - direct).abs();
    let t_direct = baseline.predict(direct);
    let t_reverse = baseline.predict(reverse);
    if (t_direct - slew_time).abs() < (t_reverse - slew_time).abs() {
        direct
    } else {
        reverse
    }
}
