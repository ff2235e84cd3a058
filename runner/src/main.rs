//! Round robin scheduling simulator.
//!
//! ```text
//! rrsim -m <quantum> -p <probability> -orden <schedule> -salida <trace>
//! ```
//!
//! The instructions of each process are read from the `procesos` directory
//! (see `--procesos`), the trace is appended to the output file.

use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use processor::{load_schedule, DirectoryCatalog, Processor, SimulationConfig, Summary, TraceWriter};
use scheduler::round_robin;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

/// Flags that are also accepted with a single dash.
const SINGLE_DASH_FLAGS: [&str; 3] = ["orden", "salida", "procesos"];

#[derive(Parser, Debug)]
#[command(name = "rrsim", version)]
#[command(about = "Simulate preemptive round robin scheduling", long_about = None)]
struct Cli {
    /// Instructions a process executes in a row before it is preempted
    #[arg(short = 'm', value_name = "QUANTUM")]
    quantum: NonZeroUsize,

    /// Probability that the running process is terminated in a cycle
    #[arg(short = 'p', value_name = "PROBABILITY", value_parser = parse_probability)]
    probability: f64,

    /// Arrival schedule, one `<cycle>|<process>` entry per line
    #[arg(long = "orden", value_name = "FILE")]
    order: PathBuf,

    /// Trace file, created with a header when missing or empty
    #[arg(long = "salida", value_name = "FILE")]
    output: PathBuf,

    /// Directory with one instruction file per process
    #[arg(long = "procesos", value_name = "DIR", default_value = "procesos")]
    processes: PathBuf,

    /// Seed for the termination trials, random when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Pause after every cycle in milliseconds, 0 disables it
    #[arg(long, default_value_t = 1)]
    delay_ms: u64,
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let probability: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(format!("{probability} is not between 0 and 1"))
    }
}

/// Rewrites `-orden` style flags to the `--orden` form clap expects.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str().and_then(|flag| flag.strip_prefix('-')) {
            Some(name) if SINGLE_DASH_FLAGS.contains(&name) => OsString::from(format!("--{name}")),
            _ => arg,
        })
        .collect()
}

fn execute(cli: &Cli) -> anyhow::Result<Summary> {
    if !cli.processes.is_dir() {
        bail!(processor::Error::NotFound {
            path: cli.processes.clone()
        });
    }
    info!(path = %cli.processes.display(), "process directory verified");

    let schedule = load_schedule(&cli.order).context("cannot load the arrival schedule")?;
    info!(path = %cli.order.display(), entries = schedule.len(), "arrival schedule loaded");

    if output::ensure_header(&cli.output, cli.quantum.get(), cli.probability)
        .with_context(|| format!("cannot prepare `{}`", cli.output.display()))?
    {
        info!(path = %cli.output.display(), "trace header written");
    }
    let file = output::open_trace(&cli.output)
        .with_context(|| format!("cannot open `{}`", cli.output.display()))?;
    let mut sink = TraceWriter::new(file);

    let config = SimulationConfig::new(cli.probability)?
        .with_cycle_delay(Duration::from_millis(cli.delay_ms));
    let catalog = DirectoryCatalog::new(&cli.processes);

    let summary = Processor::seeded(round_robin(cli.quantum), config, cli.seed)
        .run(schedule, &catalog, &mut sink)
        .context("simulation aborted")?;
    Ok(summary)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let summary = execute(&cli)?;
    println!("{summary}");

    Ok(())
}

// Do not delete this line
#[cfg(test)]
mod tests;
