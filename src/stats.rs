/// Elapsed wall-clock durations, in seconds, collected for repeated runs
/// under a single configuration.
#[derive(Debug, Default)]
pub struct Samples {
  durations: Vec<f64>,
}

impl Samples {
  pub fn push(&mut self, seconds: f64) {
    self.durations.push(seconds);
  }

  /// Unweighted arithmetic mean over all samples; outliers are kept.
  pub fn mean(&self) -> f64 {
    self.durations.iter().sum::<f64>() / self.durations.len() as f64
  }
}

/// Speedup of one parallel configuration relative to the sequential baseline.
/// Values above 1 mean the parallel configuration was faster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedupPoint {
  pub threads: u32,
  pub speedup: f64,
}

/// One point per swept thread count, in sweep order.
pub type SpeedupSeries = Vec<SpeedupPoint>;
