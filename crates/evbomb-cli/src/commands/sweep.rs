//! Sweep command implementation.

use anyhow::Result;
use console::style;

use evbomb_core::Experiment;

use super::common::{
    OutputFormat, create_simulator, create_spinner, emit_json, format_rate, print_header,
    resolve_config,
};
use crate::ExperimentArgs;

/// Execute the sweep command.
pub async fn execute(args: &ExperimentArgs, steps: &[u32]) -> Result<()> {
    if steps.is_empty() {
        anyhow::bail!("At least one step count is required");
    }

    // The first step count only has to pass validation; each point
    // overrides it.
    let config = resolve_config(args, Some(steps[0]), None)?;
    let backend = create_simulator(&config)?;

    let bombs = config.bombs;
    let pb = create_spinner(
        &format!("sweeping {} step counts over {bombs} bombs", steps.len()),
        args.format,
    )?;
    let mut points_done = 0usize;
    let mut seen = 0u32;
    let mut experiment = Experiment::new(config, &backend)?.with_observer(|_| {
        seen += 1;
        if seen == bombs {
            seen = 0;
            points_done += 1;
            pb.set_message(format!("finished {points_done}/{} step counts", steps.len()));
        }
    });

    let reports = experiment.sweep(steps).await?;
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Table => {
            print_header(&format!("Step sweep over {bombs} bombs"));
            println!(
                "  {:>5}  {:>10}  {:>9}  {:>10}  {:>10}  {:>10}",
                style("S").bold(),
                style("epsilon").bold(),
                style("detonated").bold(),
                style("rate").bold(),
                style("expected").bold(),
                style("efficiency").bold()
            );
            for report in &reports {
                println!(
                    "  {:>5}  {:>10.5}  {:>9}  {:>10}  {:>10}  {:>10}",
                    report.steps,
                    report.epsilon,
                    report.confusion().live_bombs.detonated,
                    format_rate(report.detonation_rate()),
                    format_rate(Some(report.expected_detonation_rate())),
                    format_rate(report.detection_efficiency())
                );
            }
            println!();
            if let Some(path) = &args.output {
                emit_json(&serde_json::to_string_pretty(&reports)?, Some(path))?;
            }
        }
        OutputFormat::Json => {
            emit_json(&serde_json::to_string_pretty(&reports)?, args.output.as_deref())?;
        }
    }

    Ok(())
}
