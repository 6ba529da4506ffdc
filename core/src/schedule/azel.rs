//! Azel schedule annotation.
//!
//! The azel table carries the planned pointing per scan and station. Rows
//! matched against stored scans contribute measured az/el positions and,
//! across consecutive matches, the per-axis slew distances that make a scan
//! usable for fitting.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use crate::prelude::{capitalize_code, SlewResult};
use crate::records::ScanStore;

/// Byte offset of the first station token in the header line.
const STATION_COLUMNS_START: usize = 21;
/// Width of one per-station duration substring.
const DURATION_WIDTH: usize = 4;

/// Counters reported after annotating one azel file.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AnnotateSummary {
    pub matched: usize,
    pub skipped: usize,
}

/// Merges one azel schedule file into the stored scans of `station` within
/// `session`.
///
/// A missing header is a diagnostic, not an error: the file is abandoned
/// and the run continues. Rows that do not end in a match are skipped and
/// break the slew-delta chain.
pub fn annotate_schedule<S: ScanStore>(
    store: &mut S,
    path: &Path,
    station: &str,
    session: &str,
) -> SlewResult<AnnotateSummary> {
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines();

    let Some(column) = station_column(&mut lines, station) else {
        warn!(
            "{}: no header record for station {}, file skipped",
            path.display(),
            station
        );
        return Ok(AnnotateSummary::default());
    };

    let mut summary = AnnotateSummary::default();
    // Planned (az, el) of the previous matched scan; None breaks the chain.
    let mut previous: Option<(f64, f64)> = None;

    for (row, line) in lines.enumerate() {
        if line.is_empty() || line.starts_with("End") {
            break;
        }
        match annotate_row(store, line, row, column, station, session, previous) {
            Some(position) => {
                summary.matched += 1;
                previous = Some(position);
            }
            None => {
                summary.skipped += 1;
                previous = None;
            }
        }
        store.commit()?;
    }

    debug!(
        "{}: {} rows matched, {} skipped",
        path.display(),
        summary.matched,
        summary.skipped
    );
    Ok(summary)
}

/// Consumes lines up to and including the header and returns the station's
/// positional column index.
fn station_column<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    station: &str,
) -> Option<usize> {
    let wanted = capitalize_code(station);
    let header = lines.find(|line| line.starts_with("name"))?;
    header
        .get(STATION_COLUMNS_START..)?
        .split_whitespace()
        .position(|token| token == wanted)
}

/// Processes one data row. Returns the planned (az, el) on a successful
/// match, `None` for any row that must reset the delta chain.
fn annotate_row<S: ScanStore>(
    store: &mut S,
    line: &str,
    row: usize,
    column: usize,
    station: &str,
    session: &str,
    previous: Option<(f64, f64)>,
) -> Option<(f64, f64)> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 4 {
        return None;
    }

    let az_el = *fields[1..fields.len() - 2].get(column)?;
    let durations = fields[fields.len() - 2];
    let duration = durations
        .get(column * DURATION_WIDTH..(column + 1) * DURATION_WIDTH)
        .unwrap_or("");
    if az_el.trim().is_empty() || duration.trim().is_empty() {
        return None;
    }

    let (azimuth, elevation) = parse_az_el(az_el)?;

    // The scan name derives from the start-time token; rows can also be
    // stored under a zero-padded placeholder alias.
    let start = line_start_token(fields[0])?;
    let name = start.get(2..10)?;
    let alias = format!("no{row:05}");

    let key = store
        .find_scan(name, session, station)
        .or_else(|| store.find_scan(&alias, session, station))?;

    let rec = store.get_or_create(&key);
    rec.azimuth = azimuth;
    rec.elevation = elevation;
    if let Some((prev_az, prev_el)) = previous {
        rec.slew_az = (azimuth - prev_az).abs();
        rec.slew_el = (elevation - prev_el).abs();
        rec.usable = true;
    }
    debug!("row {row} -> scan {}", rec.name);

    Some((azimuth, elevation))
}

fn line_start_token(unique: &str) -> Option<&str> {
    let mut parts = unique.split_whitespace();
    let _source = parts.next()?;
    parts.next()
}

fn parse_az_el(field: &str) -> Option<(f64, f64)> {
    let mut parts = field.split_whitespace();
    let az = parts.next()?.parse().ok()?;
    let el = parts.next()?.parse().ok()?;
    Some((az, el))
}
