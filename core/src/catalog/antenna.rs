//! Antenna catalog lookup.
//!
//! The catalog is a flat text table with one antenna per line. Fields at
//! fixed token positions give the long name and the per-axis slew speed
//! (deg/min) and constant offset (s); the last token is the antenna code.

use std::fs;
use std::path::Path;

use crate::fit::AxisModel;
use crate::prelude::{capitalize_code, Axis, SlewError, SlewResult};

/// Catalog entry with the baseline per-axis models derived from it.
#[derive(Debug, Clone)]
pub struct Antenna {
    /// Capitalized station code, also the plot output directory name.
    pub code: String,
    pub name: String,
    pub azimuth: AxisModel,
    pub elevation: AxisModel,
}

/// Looks up `code` in the catalog at `path`. The catalog speeds are in
/// degrees per minute, so the baseline rate is 60/speed seconds per degree.
///
/// A missing or malformed entry is fatal to the run.
pub fn load_antenna(path: &Path, code: &str) -> SlewResult<Antenna> {
    let contents = fs::read_to_string(path)?;
    let wanted = capitalize_code(code);

    for line in contents.lines() {
        if line.trim().is_empty() || line.starts_with('*') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.last() != Some(&wanted.as_str()) {
            continue;
        }
        return entry_from_tokens(&wanted, &tokens);
    }

    Err(SlewError::CatalogLookup(format!(
        "no entry for {} in {}",
        wanted,
        path.display()
    )))
}

fn entry_from_tokens(code: &str, tokens: &[&str]) -> SlewResult<Antenna> {
    let field = |idx: usize| -> SlewResult<f64> {
        tokens
            .get(idx)
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| {
                SlewError::CatalogLookup(format!("malformed catalog entry for {code}"))
            })
    };

    let name = tokens
        .get(1)
        .ok_or_else(|| SlewError::CatalogLookup(format!("malformed catalog entry for {code}")))?
        .to_string();

    let az_speed = field(4)?;
    let el_speed = field(8)?;
    if az_speed <= 0.0 || el_speed <= 0.0 {
        return Err(SlewError::CatalogLookup(format!(
            "non-positive axis speed for {code}"
        )));
    }

    Ok(Antenna {
        code: code.to_string(),
        name,
        azimuth: AxisModel::new(Axis::Azimuth, 60.0 / az_speed, field(5)?),
        elevation: AxisModel::new(Axis::Elevation, 60.0 / el_speed, field(9)?),
    })
}
