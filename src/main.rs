//! Command-line front end: load the lists, solve, write the roster.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use lector_schedule::io::{load_input, render_text, write_html};
use lector_schedule::roster::{RosterConfig, RosterOutcome, RosterRunner, RotationMode};

/// Builds a fair lector roster for mass readings.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Text file with one lector per line: name, then blocked days, comma-separated
    #[arg(short, long)]
    lectors: PathBuf,

    /// Text file with one mass day per line
    #[arg(short, long)]
    dates: PathBuf,

    /// Text file with one reading title per line
    #[arg(short, long)]
    readings: PathBuf,

    /// HTML output file; prints a text table when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page title for the HTML output
    #[arg(long, default_value = "Lector roster")]
    title: String,

    /// Solver time limit in seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Number of parallel search workers
    #[arg(long)]
    workers: Option<usize>,

    /// Random seed for a reproducible search order
    #[arg(long)]
    seed: Option<u64>,

    /// Do not require every lector to perform every reading
    #[arg(long)]
    relax_rotation: bool,

    /// Readings one lector may perform on the same day
    #[arg(long, default_value_t = 1)]
    max_per_day: usize,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> RosterConfig {
        let mut config = RosterConfig::default().with_max_readings_per_day(self.max_per_day);
        if let Some(secs) = self.time_limit {
            config = config.with_time_limit_secs(secs);
        }
        if let Some(workers) = self.workers {
            config = config.with_num_workers(workers);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.relax_rotation {
            config = config.with_rotation(RotationMode::Relaxed);
        }
        config
    }

    fn run(self) -> anyhow::Result<ExitCode> {
        setup_logging(self.verbose);

        let input = load_input(&self.lectors, &self.dates, &self.readings)?;
        let result = RosterRunner::run(&input, &self.config())?;

        let roster = match &result.outcome {
            RosterOutcome::Optimal(roster) => roster,
            RosterOutcome::FeasibleSuboptimal(roster) => {
                eprintln!("time limit reached: the roster is valid but may not be the fairest");
                roster
            }
            RosterOutcome::Infeasible => {
                eprintln!(
                    "no roster satisfies every rule; add days, unblock dates, or pass --relax-rotation"
                );
                return Ok(ExitCode::from(2));
            }
            RosterOutcome::Unknown => {
                eprintln!("no roster found within the time limit; try a larger --time-limit");
                return Ok(ExitCode::from(3));
            }
        };

        match &self.output {
            Some(path) => {
                let today = chrono::Local::now().format("%Y-%m-%d").to_string();
                write_html(roster, path, &self.title, &today)?;
            }
            None => print!("{}", render_text(roster)),
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    Cli::parse().run()
}
