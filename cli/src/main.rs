use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};

use slewcore::catalog::load_antenna;
use slewcore::logparse::read_log;
use slewcore::records::{MemoryStore, ScanRecord, ScanStore};
use slewcore::schedule::annotate_schedule;

use crate::workflow::config::AnalysisConfig;
use crate::workflow::runner::Runner;

mod plot;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Compute antenna slew models from session logs")]
struct Args {
    /// Two-letter station code
    station: String,
    /// Antenna catalog file
    #[arg(short, long, default_value = "antenna.cat")]
    catalog: PathBuf,
    /// Session folders to process; defaults to every folder in the working
    /// directory
    #[arg(short, long, num_args = 1..)]
    sessions: Option<Vec<PathBuf>>,
    /// Analysis settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write all stored scan records as JSON
    #[arg(long)]
    dump: Option<PathBuf>,
    /// Write a report of scans slower than the fitted models predict
    #[arg(long)]
    slow_report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let station = args.station.to_lowercase();

    let antenna = load_antenna(&args.catalog, &station)
        .with_context(|| format!("looking up {} in {}", station, args.catalog.display()))?;
    info!("antenna {} ({})", antenna.name, antenna.code);

    let mut store = MemoryStore::new();
    let mut processed = 0usize;
    for folder in session_folders(args.sessions.clone())? {
        let Some((log_path, azel_path)) = session_files(&folder, &station) else {
            debug!("skipping {}, incomplete session folder", folder.display());
            continue;
        };
        let session = folder_name(&folder)?;

        println!("Reading {}", log_path.display());
        read_log(&mut store, &log_path)
            .with_context(|| format!("reading {}", log_path.display()))?;
        annotate_schedule(&mut store, &azel_path, &station, &session)
            .with_context(|| format!("reading {}", azel_path.display()))?;
        processed += 1;
    }

    if processed == 0 {
        warn!("no session folder with both a {station} log and an azel file");
    }
    info!("store holds stations {:?}", store.stations());

    let runner = Runner::new(config.clone());
    let reports = runner.execute(&store, &antenna, &station);

    for axis_report in &reports {
        println!("Computed {} model {}", axis_report.axis, axis_report.estimate);
        if axis_report.accepted.is_empty() {
            println!("Could not generate {} plot. No data points!", axis_report.axis);
            continue;
        }
        let path = plot::render_axis(
            &config.output_root,
            &antenna.code,
            &antenna.name,
            axis_report,
            config.plot_width,
            config.plot_height,
        )?;
        println!(
            "Generated {} plot using {:4} points.",
            path.display(),
            axis_report.accepted.len()
        );
    }

    if let Some(path) = &args.dump {
        dump_records(&store, path)?;
        println!("Wrote scan records to {}", path.display());
    }

    if let Some(path) = &args.slow_report {
        write_slow_report(&store, &station, &reports, path)?;
    }

    Ok(())
}

/// Explicit session folders, or every directory under the working
/// directory in name order.
fn session_folders(explicit: Option<Vec<PathBuf>>) -> anyhow::Result<Vec<PathBuf>> {
    if let Some(folders) = explicit {
        return Ok(folders);
    }
    let mut folders = Vec::new();
    for entry in fs::read_dir(".").context("listing the working directory")? {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// A session folder qualifies when it holds both `<name><station>.log` and
/// `<name>.azel`.
fn session_files(folder: &Path, station: &str) -> Option<(PathBuf, PathBuf)> {
    let name = folder.file_name()?.to_str()?;
    let log_path = folder.join(format!("{name}{station}.log"));
    let azel_path = folder.join(format!("{name}.azel"));
    (log_path.is_file() && azel_path.is_file()).then_some((log_path, azel_path))
}

fn folder_name(folder: &Path) -> anyhow::Result<String> {
    folder
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .with_context(|| format!("session folder name {}", folder.display()))
}

fn dump_records<S: ScanStore>(store: &S, path: &Path) -> anyhow::Result<()> {
    let records: Vec<&ScanRecord> = store
        .stations()
        .iter()
        .flat_map(|station| store.station_records(station))
        .collect();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &records)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_slow_report<S: ScanStore>(
    store: &S,
    station: &str,
    reports: &[crate::workflow::runner::AxisReport],
    path: &Path,
) -> anyhow::Result<()> {
    use slewcore::prelude::Axis;

    let az = reports.iter().find(|r| r.axis == Axis::Azimuth);
    let el = reports.iter().find(|r| r.axis == Axis::Elevation);
    let (Some(az), Some(el)) = (az, el) else {
        warn!("slow-scan report needs both axis models, skipping");
        return Ok(());
    };

    let flagged = report::write_slow_scans(store, station, &az.estimate, &el.estimate, path)?;
    println!("Flagged {flagged} slow scans in {}", path.display());
    Ok(())
}
