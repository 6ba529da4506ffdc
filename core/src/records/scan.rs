use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::prelude::{SettlingAxis, Wrap};

/// Unique identity of a scan, stable across re-processing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanKey {
    pub session: String,
    pub station: String,
    pub name: String,
}

impl ScanKey {
    pub fn new(session: &str, station: &str, name: &str) -> Self {
        Self {
            session: session.to_string(),
            station: station.to_string(),
            name: name.to_string(),
        }
    }
}

/// One observation scan reconstructed from the control log and amended with
/// planned pointing from the azel schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub session: String,
    pub station: String,
    pub name: String,
    pub source: String,

    /// Start of slewing (first source declaration).
    pub start: NaiveDateTime,
    /// End of slewing (first source-acquired signal).
    pub stop: NaiveDateTime,
    pub preob: Option<NaiveDateTime>,

    pub wrap: Wrap,
    pub radar: bool,

    /// Planned pointing in degrees, from the azel schedule.
    pub azimuth: f64,
    pub elevation: f64,

    /// Slew duration in seconds, stop - start.
    pub slew_time: f64,
    /// Per-axis slew distances in degrees, relative to the previous matched
    /// scan.
    pub slew_az: f64,
    pub slew_el: f64,
    /// Seconds between preob and end of slewing, 0 when preob is absent.
    pub late: f64,
    pub last: SettlingAxis,

    /// Set once slew distances exist, i.e. the immediately preceding matched
    /// scan's position was known.
    pub usable: bool,
}

impl ScanRecord {
    pub fn new(key: ScanKey) -> Self {
        Self {
            session: key.session,
            station: key.station,
            name: key.name,
            source: String::new(),
            start: NaiveDateTime::default(),
            stop: NaiveDateTime::default(),
            preob: None,
            wrap: Wrap::Neutral,
            radar: false,
            azimuth: 0.0,
            elevation: 0.0,
            slew_time: 0.0,
            slew_az: 0.0,
            slew_el: 0.0,
            late: 0.0,
            last: SettlingAxis::Unknown,
            usable: false,
        }
    }

    pub fn key(&self) -> ScanKey {
        ScanKey::new(&self.session, &self.station, &self.name)
    }
}
