mod bench;
mod chart;
mod error;
mod ext;
mod report;
mod run;
mod stats;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use self::{
  bench::{Bench, Config},
  report::ConsoleReporter,
};

#[derive(Parser)]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  Bench {
    /// Samples to collect per configuration.
    #[arg(default_value_t = 20)]
    runs: usize,
    /// Path the speedup chart is written to.
    #[arg(default_value = "speedup_graph.svg")]
    output: PathBuf,
    /// Path to the workload crate to benchmark.
    #[arg(long, default_value = "./workload")]
    workload_dir: PathBuf,
    /// Name of the built workload binary, if it differs from the crate
    /// directory name.
    #[arg(long)]
    bin_name: Option<String>,
    /// Mode argument passed to the workload as its first argument.
    #[arg(long, default_value = "process")]
    mode_arg: String,
    /// Thread counts to sweep, in reporting order.
    #[arg(short, long, value_delimiter = ',', value_parser = clap::value_parser!(u32).range(1..), default_values_t = vec![1, 2, 4, 6, 8])]
    levels: Vec<u32>,
    /// Per-run timeout in seconds. A run that exceeds it is killed and
    /// fails the benchmark.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Treat a non-zero workload exit status as a failed run instead of a
    /// valid sample.
    #[arg(long)]
    strict_exit: bool,
  },
}

fn main() -> Result<()> {
  match Args::parse().command {
    Command::Bench {
      runs,
      output,
      workload_dir,
      bin_name,
      mode_arg,
      levels,
      timeout_secs,
      strict_exit,
    } => {
      if !workload_dir.exists() {
        anyhow::bail!("{workload_dir:?} does not exist");
      }

      let config = Config {
        workload_dir,
        bin_name,
        mode_arg,
        runs,
        levels,
        timeout: timeout_secs.map(Duration::from_secs),
        strict_exit,
      };

      let bench = Bench::new(config).context("Bench::new")?;
      let series = bench.run(&mut ConsoleReporter).context("bench")?;

      chart::render(&series, &output).context("render chart")?;
      eprintln!("chart written to {output:?}");
    }
  }

  Ok(())
}
