use std::{
  process::{Child, ExitStatus},
  time::Duration,
};

use wait_timeout::ChildExt as WaitExt;

use crate::error::BenchError;

#[extend::ext(name = ExitStatusExt)]
pub impl ExitStatus {
  fn check_success(&self) -> Result<(), BenchError> {
    if !self.success() {
      return Err(BenchError::WorkloadFailed { status: *self });
    }

    Ok(())
  }
}

#[extend::ext(name = ChildExt)]
pub impl Child {
  /// Waits up to `timeout` for the child to exit. On expiry the child is
  /// killed and reaped, and the current sample fails.
  fn wait_or_kill(&mut self, timeout: Duration) -> Result<ExitStatus, BenchError> {
    let Some(status) = self.wait_timeout(timeout).map_err(|source| BenchError::Wait { source })? else {
      self.kill().map_err(|source| BenchError::Wait { source })?;
      let _ = self.wait();

      return Err(BenchError::Timeout { timeout });
    };

    Ok(status)
  }
}
