use std::{fs, path::Path};

use plotters::prelude::*;

use crate::{error::BenchError, stats::SpeedupSeries};

const SIZE: (u32, u32) = (800, 600);

/// Renders the speedup series as a single line plot: thread count on the x
/// axis, speedup ratio on the y axis. An empty series still produces a valid
/// chart with empty axes. The drawing is composed in memory and written in
/// one step, so the only I/O failure point is the final write.
pub fn render(series: &SpeedupSeries, path: &Path) -> Result<(), BenchError> {
  let draw_err = |reason: String| BenchError::ChartWrite {
    path: path.to_path_buf(),
    reason,
  };

  let x_max = series.iter().map(|point| point.threads).max().unwrap_or(1);
  let y_max = series.iter().map(|point| point.speedup).fold(1.0_f64, f64::max);

  let mut svg = String::new();
  {
    let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|err| draw_err(err.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
      .caption("Number of Threads vs Speedup", ("sans-serif", 24))
      .margin(10)
      .x_label_area_size(40)
      .y_label_area_size(50)
      .build_cartesian_2d(0..x_max + 1, 0.0..y_max * 1.05)
      .map_err(|err| draw_err(err.to_string()))?;

    chart
      .configure_mesh()
      .x_desc("Number of Threads (N)")
      .y_desc("Speedup")
      .draw()
      .map_err(|err| draw_err(err.to_string()))?;

    chart
      .draw_series(LineSeries::new(
        series.iter().map(|point| (point.threads, point.speedup)),
        &BLUE,
      ))
      .map_err(|err| draw_err(err.to_string()))?;

    root.present().map_err(|err| draw_err(err.to_string()))?;
  }

  fs::write(path, svg).map_err(|source| draw_err(source.to_string()))
}
