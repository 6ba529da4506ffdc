use std::fmt;

use serde::{Deserialize, Serialize};

/// Antenna axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Azimuth,
    Elevation,
}

impl Axis {
    /// Two-letter tag used in file names.
    pub fn short(&self) -> &'static str {
        match self {
            Axis::Azimuth => "az",
            Axis::Elevation => "el",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Azimuth => write!(f, "azimuth"),
            Axis::Elevation => write!(f, "elevation"),
        }
    }
}

/// Cable-wrap state of the antenna mount during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrap {
    #[default]
    Neutral,
    #[serde(rename = "cw")]
    Clockwise,
    #[serde(rename = "ccw")]
    CounterClockwise,
}

impl Wrap {
    /// Decodes the wrap tag carried by source declarations.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "neutral" => Some(Wrap::Neutral),
            "cw" => Some(Wrap::Clockwise),
            "ccw" => Some(Wrap::CounterClockwise),
            _ => None,
        }
    }
}

/// Which axis stabilized last during a slew, attributing the total slew
/// time to that axis's model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlingAxis {
    #[serde(rename = "az")]
    Azimuth,
    #[serde(rename = "el")]
    Elevation,
    #[default]
    #[serde(rename = "??")]
    Unknown,
}

impl SettlingAxis {
    pub fn tag(&self) -> &'static str {
        match self {
            SettlingAxis::Azimuth => "az",
            SettlingAxis::Elevation => "el",
            SettlingAxis::Unknown => "??",
        }
    }
}

/// Common error type for the analysis pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SlewError {
    #[error("catalog lookup failed: {0}")]
    CatalogLookup(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("insufficient data: {0}")]
    Insufficient(String),
}

pub type SlewResult<T> = Result<T, SlewError>;

/// Station codes are stored lowercase but appear capitalized in catalogs,
/// schedule headers, and output paths.
pub fn capitalize_code(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
