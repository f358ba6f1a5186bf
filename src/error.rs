use std::{io, path::PathBuf, process::ExitStatus, time::Duration};

use thiserror::Error;

/// Failures that abort a benchmark run. Every variant is fatal: no sample is
/// retried and no partial series is reported.
#[derive(Debug, Error)]
pub enum BenchError {
  #[error("sample count must be at least 1")]
  InvalidSampleCount,

  #[error("failed to launch workload {bin:?}: {source}")]
  Launch {
    bin: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed waiting for workload to exit: {source}")]
  Wait {
    #[source]
    source: io::Error,
  },

  #[error("workload exited with non-zero status {status}")]
  WorkloadFailed { status: ExitStatus },

  #[error("workload run exceeded the {timeout:?} timeout")]
  Timeout { timeout: Duration },

  #[error("mean duration at {threads} threads is zero, cannot compute speedup")]
  DegenerateMean { threads: u32 },

  #[error("failed to build workload: {reason}")]
  Build { reason: String },

  #[error("failed to write chart to {path:?}: {reason}")]
  ChartWrite { path: PathBuf, reason: String },
}
