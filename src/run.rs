use std::{
  path::PathBuf,
  process::{Command, Stdio},
  time::{Duration, Instant},
};

use crate::{
  error::BenchError,
  ext::{ChildExt, ExitStatusExt},
};

/// How the workload is asked to do its work: plain sequential mode, or
/// parallel mode with an explicit worker count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
  Sequential,
  Parallel { threads: u32 },
}

/// Times a single workload invocation, returning elapsed wall-clock seconds.
pub trait Timer {
  fn time(&mut self, mode: Mode) -> Result<f64, BenchError>;
}

/// Launches the workload binary once per call and measures wall-clock time
/// from spawn to reaped exit. Both output streams go to the null device, so
/// no capture I/O lands inside the timed window.
pub struct ProcessTimer {
  bin: PathBuf,
  mode_arg: String,
  timeout: Option<Duration>,
  strict_exit: bool,
}

impl ProcessTimer {
  pub fn new(bin: PathBuf, mode_arg: String, timeout: Option<Duration>, strict_exit: bool) -> Self {
    Self {
      bin,
      mode_arg,
      timeout,
      strict_exit,
    }
  }

  fn command(&self, mode: Mode) -> Command {
    let mut command = Command::new(&self.bin);
    command.arg(&self.mode_arg);

    if let Mode::Parallel { threads } = mode {
      command.arg(threads.to_string());
    }

    command.stdout(Stdio::null()).stderr(Stdio::null());

    command
  }
}

impl Timer for ProcessTimer {
  fn time(&mut self, mode: Mode) -> Result<f64, BenchError> {
    let mut command = self.command(mode);

    let begin = Instant::now();

    let mut child = command.spawn().map_err(|source| BenchError::Launch {
      bin: self.bin.clone(),
      source,
    })?;

    let status = match self.timeout {
      Some(timeout) => child.wait_or_kill(timeout)?,
      None => child.wait().map_err(|source| BenchError::Wait { source })?,
    };

    let elapsed = begin.elapsed().as_secs_f64();

    if self.strict_exit {
      status.check_success()?;
    }

    Ok(elapsed)
  }
}
