//! evbomb command-line interface
//!
//! Generates Elitzur–Vaidman bombs, runs the interaction-free tester on the
//! bundled statevector simulator and prints what it found.
//!
//! ```text
//! evbomb run --bombs 1000 --steps 25 --seed 7
//! evbomb sweep --bombs 500 --steps 2,5,10,25
//! evbomb classify 000001
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::OutputFormat;
use commands::{backends, classify, run, sweep, version};

/// evbomb - interaction-free bomb testing on a simulated quantum backend
#[derive(Parser)]
#[command(name = "evbomb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that runs an experiment.
#[derive(Args, Debug, Clone, Default)]
pub struct ExperimentArgs {
    /// Number of bombs to generate
    #[arg(short, long)]
    pub bombs: Option<u32>,

    /// Simulator seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability that the simulator misreads a measured bit
    #[arg(long)]
    pub readout_error: Option<f64>,

    /// YAML config file (defaults to ~/.evbomb/config.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bombs and test them
    Run {
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Tester steps per bomb
        #[arg(short, long)]
        steps: Option<u32>,

        /// Rotation per step in radians (defaults to pi/steps)
        #[arg(short, long, allow_negative_numbers = true)]
        epsilon: Option<f64>,
    },

    /// Test one bomb set at several step counts
    Sweep {
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Comma-separated step counts, e.g. 2,5,10,25
        #[arg(short, long, value_delimiter = ',', required = true)]
        steps: Vec<u32>,
    },

    /// Classify a measurement register given as a bit string
    Classify {
        /// Bits in construction order: intermediate target bits, then the final control bit
        bits: String,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            experiment,
            steps,
            epsilon,
        } => run::execute(&experiment, steps, epsilon).await,
        Commands::Sweep { experiment, steps } => sweep::execute(&experiment, &steps).await,
        Commands::Classify { bits } => classify::execute(&bits),
        Commands::Backends => backends::execute().await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--format json` output stays machine-readable.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
