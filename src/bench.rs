use std::{
  fs,
  path::PathBuf,
  process::Command,
  time::Duration,
};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::{
  error::BenchError,
  report::Reporter,
  run::{Mode, ProcessTimer, Timer},
  stats::{Samples, SpeedupPoint, SpeedupSeries},
};

#[derive(Debug)]
pub struct Config {
  /// Directory holding the workload crate.
  pub workload_dir: PathBuf,
  /// Name of the built binary, when it differs from the directory name.
  pub bin_name: Option<String>,
  /// First positional argument passed to the workload.
  pub mode_arg: String,
  /// Samples to collect per configuration.
  pub runs: usize,
  /// Thread counts to sweep, in reporting order.
  pub levels: Vec<u32>,
  pub timeout: Option<Duration>,
  pub strict_exit: bool,
}

#[derive(Debug)]
pub struct Bench {
  config: Config,
  /// Temporary directory the built workload binary is staged into.
  tempdir: TempDir,
}

impl Bench {
  pub fn new(config: Config) -> Result<Self> {
    if config.runs == 0 {
      return Err(BenchError::InvalidSampleCount.into());
    }

    let tempdir = TempDir::with_prefix("speedup-bench-").context("tempdir")?;
    fs::create_dir(tempdir.path().join("bin")).context("create_dir bin")?;

    Ok(Self { config, tempdir })
  }

  /// Builds the workload, then sweeps every configured thread count against
  /// the sequential baseline.
  pub fn run<R: Reporter>(&self, reporter: &mut R) -> Result<SpeedupSeries> {
    let bin = self.build().context("build workload")?;

    let mut timer = ProcessTimer::new(
      bin,
      self.config.mode_arg.clone(),
      self.config.timeout,
      self.config.strict_exit,
    );

    sweep(&mut timer, self.config.runs, &self.config.levels, reporter).context("sweep")
  }

  /// Compiles the workload crate and stages its binary out of the build
  /// tree, so a later rebuild cannot clobber it mid-sweep.
  fn build(&self) -> Result<PathBuf, BenchError> {
    eprintln!("building {:?}", self.config.workload_dir);

    let status = Command::new("cargo")
      .current_dir(&self.config.workload_dir)
      .args(["build", "--release"])
      .status()
      .map_err(|source| BenchError::Build {
        reason: format!("failed to run cargo: {source}"),
      })?;

    if !status.success() {
      return Err(BenchError::Build {
        reason: format!("cargo exited with {status}"),
      });
    }

    let name = self.bin_name()?;
    let built = self.config.workload_dir.join("target/release").join(&name);
    let staged = self.bin_dir().join(&name);

    fs::copy(&built, &staged).map_err(|source| BenchError::Build {
      reason: format!("missing built binary {built:?}: {source}"),
    })?;

    Ok(staged)
  }

  fn bin_name(&self) -> Result<String, BenchError> {
    if let Some(name) = &self.config.bin_name {
      return Ok(name.clone());
    }

    self
      .config
      .workload_dir
      .canonicalize()
      .ok()
      .and_then(|dir| dir.file_name().map(|name| name.to_string_lossy().into_owned()))
      .ok_or_else(|| BenchError::Build {
        reason: format!("cannot derive a binary name from {:?}", self.config.workload_dir),
      })
  }

  fn bin_dir(&self) -> PathBuf {
    self.tempdir.path().join("bin")
  }
}

/// Times `runs` invocations under `mode`, strictly one at a time, and
/// returns the arithmetic mean. Each sample is reported as it lands, so the
/// report reflects exactly what was collected before any failure.
pub fn average<T: Timer, R: Reporter>(
  timer: &mut T,
  mode: Mode,
  runs: usize,
  reporter: &mut R,
) -> Result<f64, BenchError> {
  if runs == 0 {
    return Err(BenchError::InvalidSampleCount);
  }

  let mut samples = Samples::default();
  for run_id in 0..runs {
    let elapsed = timer.time(mode)?;
    reporter.sample(run_id + 1, mode, elapsed);
    samples.push(elapsed);
  }

  let mean = samples.mean();
  reporter.average(mode, mean);

  Ok(mean)
}

/// Measures the sequential baseline once, then each thread count in the
/// order given, returning one speedup point per count in that same order.
/// A zero parallel mean aborts the sweep before any later level is timed.
pub fn sweep<T: Timer, R: Reporter>(
  timer: &mut T,
  runs: usize,
  levels: &[u32],
  reporter: &mut R,
) -> Result<SpeedupSeries, BenchError> {
  reporter.section("SEQUENTIAL");
  let baseline = average(timer, Mode::Sequential, runs, reporter)?;

  reporter.section("PARALLEL");

  let mut series = SpeedupSeries::new();
  for &threads in levels {
    let mean = average(timer, Mode::Parallel { threads }, runs, reporter)?;

    if mean == 0.0 {
      return Err(BenchError::DegenerateMean { threads });
    }

    series.push(SpeedupPoint {
      threads,
      speedup: baseline / mean,
    });
  }

  Ok(series)
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Timer returning one fixed duration per mode, recording every call.
  struct FixedTimer {
    sequential: f64,
    parallel: Vec<(u32, f64)>,
    calls: Vec<Mode>,
  }

  impl FixedTimer {
    fn new(sequential: f64, parallel: &[(u32, f64)]) -> Self {
      Self {
        sequential,
        parallel: parallel.to_vec(),
        calls: Vec::new(),
      }
    }
  }

  impl Timer for FixedTimer {
    fn time(&mut self, mode: Mode) -> Result<f64, BenchError> {
      self.calls.push(mode);

      Ok(match mode {
        Mode::Sequential => self.sequential,
        Mode::Parallel { threads } => {
          self
            .parallel
            .iter()
            .find(|(level, _)| *level == threads)
            .expect("unexpected level")
            .1
        }
      })
    }
  }

  /// Timer yielding a scripted sequence of durations, regardless of mode.
  struct SequenceTimer {
    durations: Vec<f64>,
    next: usize,
  }

  impl Timer for SequenceTimer {
    fn time(&mut self, _mode: Mode) -> Result<f64, BenchError> {
      let elapsed = self.durations[self.next];
      self.next += 1;

      Ok(elapsed)
    }
  }

  struct NullReporter;

  impl Reporter for NullReporter {
    fn section(&mut self, _title: &str) {}
    fn sample(&mut self, _run_id: usize, _mode: Mode, _seconds: f64) {}
    fn average(&mut self, _mode: Mode, _seconds: f64) {}
  }

  #[test]
  fn average_is_the_arithmetic_mean_of_all_runs() {
    let mut timer = SequenceTimer {
      durations: vec![1.0, 2.0, 6.0],
      next: 0,
    };

    let mean = average(&mut timer, Mode::Sequential, 3, &mut NullReporter).unwrap();

    assert_eq!(mean, 3.0);
  }

  #[test]
  fn zero_runs_are_rejected_before_any_launch() {
    let mut timer = FixedTimer::new(1.0, &[]);

    let err = average(&mut timer, Mode::Sequential, 0, &mut NullReporter).unwrap_err();

    assert!(matches!(err, BenchError::InvalidSampleCount));
    assert!(timer.calls.is_empty());
  }

  #[test]
  fn speedups_are_relative_to_the_baseline() {
    let mut timer = FixedTimer::new(2.0, &[(1, 2.0), (2, 1.0), (4, 0.5), (6, 0.25), (8, 0.2)]);

    let series = sweep(&mut timer, 1, &[1, 2, 4, 6, 8], &mut NullReporter).unwrap();
    let speedups: Vec<f64> = series.iter().map(|point| point.speedup).collect();

    assert_eq!(speedups, vec![1.0, 2.0, 4.0, 8.0, 10.0]);
  }

  #[test]
  fn baseline_is_measured_exactly_once() {
    let mut timer = FixedTimer::new(2.0, &[(2, 1.0), (4, 0.5)]);

    sweep(&mut timer, 5, &[2, 4], &mut NullReporter).unwrap();

    let sequential_calls = timer.calls.iter().filter(|mode| **mode == Mode::Sequential).count();
    assert_eq!(sequential_calls, 5);
    assert_eq!(timer.calls.len(), 15);
  }

  #[test]
  fn sweep_preserves_level_order() {
    let mut timer = FixedTimer::new(2.0, &[(8, 1.0), (2, 1.0), (4, 1.0)]);

    let series = sweep(&mut timer, 2, &[8, 2, 4], &mut NullReporter).unwrap();
    let levels: Vec<u32> = series.iter().map(|point| point.threads).collect();

    assert_eq!(levels, vec![8, 2, 4]);
  }

  #[test]
  fn zero_mean_aborts_the_sweep() {
    let mut timer = FixedTimer::new(2.0, &[(2, 1.0), (4, 0.0), (8, 1.0)]);

    let err = sweep(&mut timer, 3, &[2, 4, 8], &mut NullReporter).unwrap_err();

    assert!(matches!(err, BenchError::DegenerateMean { threads: 4 }));
    assert!(!timer.calls.contains(&Mode::Parallel { threads: 8 }));
  }

  #[test]
  fn identical_timings_give_identical_series() {
    let parallel = [(2, 1.0), (4, 0.5)];
    let mut first = FixedTimer::new(2.0, &parallel);
    let mut second = FixedTimer::new(2.0, &parallel);

    let a = sweep(&mut first, 20, &[2, 4], &mut NullReporter).unwrap();
    let b = sweep(&mut second, 20, &[2, 4], &mut NullReporter).unwrap();

    assert_eq!(a, b);
  }

  #[test]
  fn report_is_baseline_section_first() {
    struct Recording(Vec<String>);

    impl Reporter for Recording {
      fn section(&mut self, title: &str) {
        self.0.push(format!("section {title}"));
      }

      fn sample(&mut self, run_id: usize, _mode: Mode, _seconds: f64) {
        self.0.push(format!("sample {run_id}"));
      }

      fn average(&mut self, _mode: Mode, _seconds: f64) {
        self.0.push("average".to_string());
      }
    }

    let mut timer = FixedTimer::new(2.0, &[(2, 1.0)]);
    let mut reporter = Recording(Vec::new());

    sweep(&mut timer, 2, &[2], &mut reporter).unwrap();

    let events: Vec<&str> = reporter.0.iter().map(String::as_str).collect();
    assert_eq!(
      events,
      [
        "section SEQUENTIAL",
        "sample 1",
        "sample 2",
        "average",
        "section PARALLEL",
        "sample 1",
        "sample 2",
        "average",
      ],
    );
  }

  #[test]
  fn bench_rejects_zero_runs() {
    let config = Config {
      workload_dir: "anywhere".into(),
      bin_name: None,
      mode_arg: "process".into(),
      runs: 0,
      levels: vec![1],
      timeout: None,
      strict_exit: false,
    };

    let err = Bench::new(config).unwrap_err();

    assert!(matches!(
      err.downcast_ref::<BenchError>(),
      Some(BenchError::InvalidSampleCount)
    ));
  }
}
