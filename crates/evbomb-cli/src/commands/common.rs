//! Shared helpers for CLI commands.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use evbomb_adapter_sim::SimulatorBackend;
use evbomb_core::{ExperimentConfig, ExperimentReport, Outcome, OutcomeTally};
use evbomb_hal::BackendFactory;

use crate::ExperimentArgs;

/// How results are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with histograms.
    #[default]
    Table,
    /// Pretty-printed JSON report.
    Json,
}

/// Build the experiment config: file and environment first, then flags.
pub fn resolve_config(
    args: &ExperimentArgs,
    steps: Option<u32>,
    epsilon: Option<f64>,
) -> Result<ExperimentConfig> {
    let mut config = ExperimentConfig::load(args.config.as_deref())
        .context("Failed to load experiment configuration")?;

    if let Some(bombs) = args.bombs {
        config.bombs = bombs;
    }
    if let Some(steps) = steps {
        config.steps = steps;
    }
    if let Some(epsilon) = epsilon {
        config.epsilon = Some(epsilon);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(p) = args.readout_error {
        config.readout_error = p;
    }

    config.validate()?;
    Ok(config)
}

/// The local simulator, configured from the experiment's seed and noise.
pub fn create_simulator(config: &ExperimentConfig) -> Result<SimulatorBackend> {
    SimulatorBackend::from_config(config.backend_config())
        .context("Failed to configure simulator")
}

/// Spinner shown while a batch runs; hidden unless output is a table.
///
/// Records only arrive after a whole batch returns, so it carries no length.
pub fn create_spinner(message: &str, format: OutputFormat) -> Result<ProgressBar> {
    if format != OutputFormat::Table {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg}",
    )?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Render a rate, or a dash when it is undefined.
pub fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| format!("{:.2}%", r * 100.0))
}

/// One bar per outcome, scaled to the tally total.
pub fn print_histogram(tally: &OutcomeTally) {
    let total = tally.total();
    for (outcome, count) in tally.iter() {
        let prob = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);
        let label = format!("{:<9}", outcome.as_str());
        let label = match outcome {
            Outcome::Detonated => style(label).red(),
            Outcome::Live => style(label).green(),
            Outcome::Dud => style(label).yellow(),
        };
        println!(
            "  {}: {:>6} ({:>6.2}%) {}",
            label,
            count,
            prob,
            style(bar).green()
        );
    }
}

/// Full table rendering of a single run.
pub fn print_report(report: &ExperimentReport) {
    print_header(&format!(
        "Elitzur-Vaidman bomb test ({} bombs, S = {})",
        report.records.len(),
        report.steps
    ));
    print_result("Backend", &report.backend);
    print_result("Epsilon", format!("{:.6} rad", report.epsilon));
    if let Some(seed) = report.seed {
        print_result("Seed", seed);
    }
    print_result(
        "Bombs",
        format!(
            "{} live, {} dud",
            report.live_bombs(),
            report.dud_bombs()
        ),
    );

    print_section("Outcomes");
    print_histogram(&report.tally);

    let confusion = report.confusion();
    print_section("Live bombs");
    print_histogram(&confusion.live_bombs);
    print_section("Duds");
    print_histogram(&confusion.dud_bombs);

    print_section("Statistics");
    print_result("Detonation rate", format_rate(report.detonation_rate()));
    print_result(
        "Expected rate",
        format_rate(Some(report.expected_detonation_rate())),
    );
    print_result(
        "Detection efficiency",
        format_rate(report.detection_efficiency()),
    );
    println!();
}

/// Write JSON to `output`, or to stdout when no path is given.
pub fn emit_json(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green().bold(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
