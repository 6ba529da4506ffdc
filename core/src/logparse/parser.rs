//! Single-pass scan reconstruction over a control-log file.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Serialize;

use crate::logparse::patterns::{classify, LogEvent};
use crate::prelude::{SettlingAxis, SlewResult, Wrap};
use crate::records::{ScanKey, ScanStore};

/// Error magnitude under which an axis counts as settled, in the same
/// units as the log's error samples.
const SETTLE_TOLERANCE: f64 = 0.1;

/// Counters reported after ingesting one log file.
#[derive(Debug, Default, Clone, Serialize)]
pub struct IngestSummary {
    pub lines: usize,
    pub scans: usize,
}

/// All scan-scoped parser state. Replaced wholesale at every boundary or
/// finalize event so no field can leak across scans.
#[derive(Debug, Default)]
struct ScanAccumulator {
    name: Option<String>,
    station: Option<String>,
    session: Option<String>,
    source: Option<String>,
    slew_start: Option<NaiveDateTime>,
    slew_stop: Option<NaiveDateTime>,
    preob: Option<NaiveDateTime>,
    wrap: Wrap,
    radar: bool,
    positions: Vec<(f64, f64)>,
    errors: Vec<(f64, f64)>,
    seen_position: bool,
}

impl ScanAccumulator {
    fn begin(name: String, session: String, station: String) -> Self {
        Self {
            name: Some(name),
            station: Some(station),
            session: Some(session),
            ..Self::default()
        }
    }

    /// Post-scan reset: the next scan's name arrives with its own boundary
    /// event, but station and session stay valid for the whole file.
    fn carry_scope(&self) -> Self {
        Self {
            station: self.station.clone(),
            session: self.session.clone(),
            ..Self::default()
        }
    }
}

/// Reads a control log and writes one record per completed scan through the
/// store. Parsing stops at the schedule-end marker; lines without a valid
/// timestamp are ignored entirely.
pub fn read_log<S: ScanStore>(store: &mut S, path: &Path) -> SlewResult<IngestSummary> {
    let contents = fs::read_to_string(path)?;
    let mut summary = IngestSummary::default();
    let mut acc = ScanAccumulator::default();

    for line in contents.lines() {
        summary.lines += 1;
        let Some((stamp, event)) = classify(line) else {
            continue;
        };

        match event {
            LogEvent::ScheduleEnd => break,
            LogEvent::Postob => {
                summary.scans += finalize(&acc, store)?;
                acc = acc.carry_scope();
            }
            LogEvent::ScanBoundary {
                name,
                session,
                station,
            } => {
                summary.scans += finalize(&acc, store)?;
                acc = ScanAccumulator::begin(
                    normalize_scan_name(&name),
                    session,
                    station.to_ascii_lowercase(),
                );
            }
            LogEvent::Source { name, wrap } => {
                // First source wins; a repeated declaration within the same
                // scan never moves the slew start.
                if acc.source.is_none() {
                    acc.source = Some(name);
                    acc.wrap = wrap;
                    acc.slew_start = Some(stamp);
                }
            }
            LogEvent::SourceAcquired => {
                if acc.slew_stop.is_none() {
                    acc.slew_stop = Some(stamp);
                }
            }
            LogEvent::Preob => {
                if acc.preob.is_none() {
                    acc.preob = Some(stamp);
                }
            }
            LogEvent::Radar => acc.radar = true,
            LogEvent::Position { az, el } => {
                acc.positions.push((az, el));
                acc.seen_position = true;
            }
            LogEvent::PointingError { az, el } => {
                // An error sample before any position sample belongs to the
                // pre-slew state and is discarded.
                if acc.seen_position {
                    acc.errors.push((az, el));
                }
            }
        }
    }

    info!(
        "{}: {} scans from {} lines",
        path.display(),
        summary.scans,
        summary.lines
    );
    Ok(summary)
}

/// Emits the accumulated scan if its name, slew start, and slew stop are all
/// known. Returns how many records were written (0 or 1).
fn finalize<S: ScanStore>(acc: &ScanAccumulator, store: &mut S) -> SlewResult<usize> {
    let (Some(name), Some(station), Some(session)) = (&acc.name, &acc.station, &acc.session)
    else {
        return Ok(0);
    };
    let (Some(start), Some(stop)) = (acc.slew_start, acc.slew_stop) else {
        return Ok(0);
    };

    let key = ScanKey::new(session, station, name);
    let last = settling_axis(&acc.positions, &acc.errors);

    let rec = store.get_or_create(&key);
    rec.source = acc.source.clone().unwrap_or_default();
    rec.start = start;
    rec.stop = stop;
    rec.preob = acc.preob;
    rec.slew_time = seconds_between(start, stop);
    rec.late = acc.preob.map(|p| seconds_between(stop, p)).unwrap_or(0.0);
    rec.wrap = acc.wrap;
    rec.radar = acc.radar;
    rec.last = last;
    debug!("scan {} slew {:.2}s last {:?}", rec.name, rec.slew_time, last);

    store.commit()?;
    Ok(1)
}

/// Walks position and error samples in lockstep, skipping the leading
/// pre-slew pair, and tags the axis that was still moving when the other
/// one first settled inside the tolerance.
fn settling_axis(positions: &[(f64, f64)], errors: &[(f64, f64)]) -> SettlingAxis {
    if positions.is_empty() || errors.is_empty() {
        return SettlingAxis::Unknown;
    }
    for (_, (az_err, el_err)) in positions.iter().skip(1).zip(errors.iter().skip(1)) {
        if az_err.abs() < SETTLE_TOLERANCE && az_err.abs() < el_err.abs() {
            return SettlingAxis::Elevation;
        }
        if el_err.abs() < SETTLE_TOLERANCE && el_err.abs() < az_err.abs() {
            return SettlingAxis::Azimuth;
        }
    }
    SettlingAxis::Unknown
}

/// Placeholder scan names (`no` + digits) are renormalized to a fixed
/// 5-digit zero-padded form so they line up with azel row aliases.
fn normalize_scan_name(name: &str) -> String {
    if name.to_ascii_lowercase().starts_with("no") {
        let digits = &name[2..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = digits.parse::<u32>() {
                return format!("no{n:05}");
            }
        }
    }
    name.to_string()
}

fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    delta
        .num_microseconds()
        .map(|us| us as f64 / 1e6)
        .unwrap_or_else(|| delta.num_seconds() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::records::{MemoryStore, ScanStore};

    fn ingest(lines: &[&str]) -> (MemoryStore, IngestSummary) {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        let mut store = MemoryStore::new();
        let summary = read_log(&mut store, file.path()).unwrap();
        (store, summary)
    }

    #[test]
    fn complete_scan_is_emitted_with_timing() {
        let (store, summary) = ingest(&[
            "2015.123.12:00:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,neutral",
            "2015.123.12:00:13.00#trakl#Source acquired",
            "2015.123.12:00:16.00:preob",
            "2015.123.12:00:40.00:postob",
        ]);

        assert_eq!(summary.scans, 1);
        let recs = store.station_records("ab");
        assert_eq!(recs.len(), 1);
        let rec = recs[0];
        assert_eq!(rec.name, "AA001");
        assert_eq!(rec.session, "S1");
        assert_eq!(rec.source, "casa");
        assert_eq!(rec.slew_time, 12.0);
        assert_eq!(rec.late, 3.0);
        assert_eq!(rec.wrap, Wrap::Neutral);
        assert!(!rec.radar);
    }

    #[test]
    fn first_source_and_first_acquisition_win() {
        let (store, _) = ingest(&[
            "2015.123.12:00:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,cw",
            "2015.123.12:00:02.00:source=cyga,1959.5,+4044,2000.0,ccw",
            "2015.123.12:00:13.00#trakl#Source acquired",
            "2015.123.12:00:20.00#start#Source reached",
            "2015.123.12:00:40.00:postob",
        ]);

        let rec = store.station_records("ab")[0];
        assert_eq!(rec.source, "casa");
        assert_eq!(rec.wrap, Wrap::Clockwise);
        assert_eq!(rec.slew_time, 12.0);
    }

    #[test]
    fn scan_without_stop_is_never_emitted() {
        let (store, summary) = ingest(&[
            "2015.123.12:00:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,neutral",
            "2015.123.12:00:40.00:postob",
        ]);
        assert_eq!(summary.scans, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn sched_end_halts_ingestion() {
        let (store, summary) = ingest(&[
            "2015.123.12:00:00.00:sched_end",
            "2015.123.12:01:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:01:01.00:source=casa,2313.8,+6127,2000.0,neutral",
            "2015.123.12:01:13.00#trakl#Source acquired",
            "2015.123.12:01:40.00:postob",
        ]);
        assert_eq!(summary.scans, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn boundary_finalizes_previous_scan_and_resets_flags() {
        let (store, summary) = ingest(&[
            "2015.123.12:00:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,ccw",
            "2015.123.12:00:13.00#trakl#Source acquired",
            "2015.123.12:00:30.00#trakl# Masking Radar",
            "2015.123.12:01:00.00:scan_name=AA002,S1,ab,120,30",
            "2015.123.12:01:01.00:source=cyga,1959.5,+4044,2000.0,neutral",
            "2015.123.12:01:09.00flagr/antenna,acquired",
            "2015.123.12:01:40.00:postob",
        ]);

        assert_eq!(summary.scans, 2);
        let recs = store.station_records("ab");
        assert!(recs[0].radar);
        assert_eq!(recs[0].wrap, Wrap::CounterClockwise);
        assert!(!recs[1].radar);
        assert_eq!(recs[1].wrap, Wrap::Neutral);
        assert_eq!(recs[1].slew_time, 8.0);
    }

    #[test]
    fn placeholder_names_are_zero_padded() {
        let (store, _) = ingest(&[
            "2015.123.12:00:00.00:scan_name=no17,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,neutral",
            "2015.123.12:00:13.00#trakl#Source acquired",
            "2015.123.12:00:40.00:postob",
        ]);
        assert_eq!(store.station_records("ab")[0].name, "no00017");
    }

    #[test]
    fn settling_axis_tags_the_slower_axis() {
        // Azimuth error drops inside tolerance first, so elevation is the
        // axis that finished last.
        let (store, _) = ingest(&[
            "2015.123.12:00:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,neutral",
            "2015.123.12:00:13.00#trakl#Source acquired",
            "2015.123.12:00:14.00#trakl#[az 100.0 el 40.0 azv 1.0 elv 1.0]",
            "2015.123.12:00:14.10#trakl#{AzErr 5.00 ElErr 4.00}",
            "2015.123.12:00:15.00#trakl#[az 110.0 el 45.0 azv 1.0 elv 1.0]",
            "2015.123.12:00:15.10#trakl#{AzErr 0.05 ElErr 2.00}",
            "2015.123.12:00:40.00:postob",
        ]);
        assert_eq!(store.station_records("ab")[0].last, SettlingAxis::Elevation);
    }

    #[test]
    fn errors_without_positions_leave_axis_unknown() {
        let (store, _) = ingest(&[
            "2015.123.12:00:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,neutral",
            "2015.123.12:00:13.00#trakl#Source acquired",
            "2015.123.12:00:14.10#trakl#{AzErr 0.01 ElErr 2.00}",
            "2015.123.12:00:15.10#trakl#{AzErr 0.01 ElErr 2.00}",
            "2015.123.12:00:40.00:postob",
        ]);
        let rec = store.station_records("ab")[0];
        assert_eq!(rec.last, SettlingAxis::Unknown);
    }

    #[test]
    fn reprocessing_the_same_log_is_idempotent() {
        let mut file = NamedTempFile::new().unwrap();
        for line in [
            "2015.123.12:00:00.00:scan_name=AA001,S1,ab,120,30",
            "2015.123.12:00:01.00:source=casa,2313.8,+6127,2000.0,neutral",
            "2015.123.12:00:13.00#trakl#Source acquired",
            "2015.123.12:00:40.00:postob",
        ] {
            writeln!(file, "{line}").unwrap();
        }
        let mut store = MemoryStore::new();
        read_log(&mut store, file.path()).unwrap();
        read_log(&mut store, file.path()).unwrap();
        assert_eq!(store.len(), 1);
    }
}
