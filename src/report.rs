use crate::run::Mode;

/// Receives every sample and average as it is computed, in collection order.
/// The console implementation echoes them; tests record them.
pub trait Reporter {
  fn section(&mut self, title: &str);
  fn sample(&mut self, run_id: usize, mode: Mode, seconds: f64);
  fn average(&mut self, mode: Mode, seconds: f64);
}

/// Prints the report to stdout: baseline section first, then one block per
/// thread count, times rounded to three decimals.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
  fn section(&mut self, title: &str) {
    println!("{title}\n{}\n", "=".repeat(title.len()));
  }

  fn sample(&mut self, run_id: usize, mode: Mode, seconds: f64) {
    match mode {
      Mode::Sequential => println!("Run {run_id}:\t\t{seconds:.3} seconds"),
      Mode::Parallel { threads } => println!("Run {run_id} ({threads} threads):\t{seconds:.3} seconds"),
    }
  }

  fn average(&mut self, mode: Mode, seconds: f64) {
    match mode {
      Mode::Sequential => println!("Average:\t{seconds:.3} seconds\n"),
      Mode::Parallel { .. } => println!("Average:\t\t{seconds:.3} seconds\n"),
    }
  }
}
