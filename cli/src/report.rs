//! Slow-scan report: scans whose observed slew time exceeds what the
//! fitted models allow for their distances.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use slewcore::fit::AxisModel;
use slewcore::records::{ScanRecord, ScanStore};

/// Writes one fixed-width line per slow scan and returns how many were
/// flagged.
pub fn write_slow_scans<S: ScanStore>(
    store: &S,
    station: &str,
    az_model: &AxisModel,
    el_model: &AxisModel,
    path: &Path,
) -> anyhow::Result<usize> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut flagged = 0usize;

    for rec in store.station_records(station) {
        if !rec.usable || rec.preob.is_none() {
            continue;
        }
        if let Some(line) = slow_scan_line(rec, az_model, el_model) {
            writeln!(out, "{line}")?;
            flagged += 1;
        }
    }

    out.flush()?;
    Ok(flagged)
}

/// A scan is slow when its duration beats both the best azimuth path (direct
/// or reverse wrap) and the elevation prediction.
fn slow_scan_line(rec: &ScanRecord, az_model: &AxisModel, el_model: &AxisModel) -> Option<String> {
    let d_az = rec.slew_az.abs();
    let d_rv = (360.0 - d_az).abs();
    let d_el = rec.slew_el.abs();
    let dt = rec.slew_time;

    let t_az = az_model.predict(d_az).abs();
    let t_rv = az_model.predict(d_rv).abs();
    let t_el = el_model.predict(d_el).abs();

    if dt <= t_az.min(t_rv).max(t_el) {
        return None;
    }
    Some(format!(
        "{:12} {:5.1} {:5.1} {:5.1} {:5.1} {:5.1} {:5.1} {}",
        rec.name,
        d_az,
        d_el,
        dt,
        t_az,
        t_rv,
        t_el,
        rec.last.tag()
    ))
}
