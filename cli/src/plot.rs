//! Per-axis scatter plot of samples against the baseline and fitted models.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use plotters::prelude::*;

use slewcore::fit::{AxisModel, Sample};
use slewcore::prelude::Axis;

use crate::workflow::runner::AxisReport;

/// Renders one axis report as `<out_root>/<Code>/<ax>.png` and returns the
/// written path.
pub fn render_axis(
    out_root: &Path,
    antenna_code: &str,
    antenna_name: &str,
    report: &AxisReport,
    width: u32,
    height: u32,
) -> anyhow::Result<PathBuf> {
    let path = axis_png_path(out_root, antenna_code, report.axis);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    draw(&path, antenna_name, report, width, height)
        .map_err(|e| anyhow!("rendering {}: {e}", path.display()))?;
    Ok(path)
}

fn axis_png_path(out_root: &Path, antenna_code: &str, axis: Axis) -> PathBuf {
    out_root
        .join(antenna_code)
        .join(format!("{}.png", axis.short()))
}

fn draw(
    path: &Path,
    antenna_name: &str,
    report: &AxisReport,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let (x_max, y_max) = plot_bounds(report);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "{} {} - {}",
                antenna_name,
                report.axis,
                report.estimate.title()
            ),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Distance [deg]")
        .y_desc("Time [s]")
        .draw()?;

    chart
        .draw_series(LineSeries::new(model_line(&report.baseline, x_max), &CYAN))?
        .label(format!("Current model {}", report.baseline))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CYAN));
    chart
        .draw_series(LineSeries::new(model_line(&report.estimate, x_max), &BLACK))?
        .label("Calculated model")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    chart
        .draw_series(
            report
                .rejected
                .iter()
                .map(|s| Cross::new((s.distance, s.duration), 3, RED)),
        )?
        .label(format!("Discarded points ({})", report.rejected.len()))
        .legend(|(x, y)| Cross::new((x + 10, y), 3, RED));
    chart
        .draw_series(
            report
                .accepted
                .iter()
                .map(|s| Circle::new((s.distance, s.duration), 2, BLUE.filled())),
        )?
        .label(format!("Valid points ({})", report.accepted.len()))
        .legend(|(x, y)| Circle::new((x + 10, y), 2, BLUE.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn model_line(model: &AxisModel, x_max: f64) -> Vec<(f64, f64)> {
    vec![(0.0, model.predict(0.0)), (x_max, model.predict(x_max))]
}

fn plot_bounds(report: &AxisReport) -> (f64, f64) {
    let points = || report.accepted.iter().chain(report.rejected.iter());
    let x_max = points()
        .map(|s: &Sample| s.distance)
        .fold(1.0f64, f64::max)
        * 1.05;
    let y_max = points()
        .map(|s| s.duration)
        .chain([
            report.baseline.predict(x_max),
            report.estimate.predict(x_max),
        ])
        .fold(1.0f64, f64::max)
        * 1.05;
    (x_max, y_max)
}
