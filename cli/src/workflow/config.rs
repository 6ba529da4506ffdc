use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use slewcore::fit::DEFAULT_REJECTION_FACTOR;

/// Tunable analysis settings, optionally loaded from YAML.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// One-sided residual envelope factor for outlier rejection.
    pub rejection_factor: f64,
    pub plot_width: u32,
    pub plot_height: u32,
    /// Directory under which per-antenna plot folders are created.
    pub output_root: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rejection_factor: DEFAULT_REJECTION_FACTOR,
            plot_width: 1024,
            plot_height: 768,
            output_root: PathBuf::from("."),
        }
    }
}

impl AnalysisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading analysis config {}", path_ref.display()))?;
        let config: AnalysisConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing analysis config {}", path_ref.display()))?;
        Ok(config)
    }
}
