//! Run command implementation.

use anyhow::Result;
use console::style;
use tracing::debug;

use evbomb_core::{Experiment, Outcome};

use super::common::{
    OutputFormat, create_simulator, create_spinner, emit_json, print_report, resolve_config,
};
use crate::ExperimentArgs;

/// Execute the run command.
pub async fn execute(args: &ExperimentArgs, steps: Option<u32>, epsilon: Option<f64>) -> Result<()> {
    let config = resolve_config(args, steps, epsilon)?;
    let backend = create_simulator(&config)?;

    if args.format == OutputFormat::Table {
        println!(
            "{} Testing {} bombs with S = {} on {}",
            style("→").cyan().bold(),
            config.bombs,
            config.steps,
            style("simulator").bold()
        );
    }

    let total = config.bombs;
    let pb = create_spinner(&format!("testing {total} bombs"), args.format)?;
    let mut classified = 0u32;
    let mut experiment = Experiment::new(config, &backend)?.with_observer(|record| {
        if record.outcome == Outcome::Detonated {
            debug!(bomb = %record.id(), "detonated");
        }
        classified += 1;
        pb.set_message(format!("classified {classified}/{total}"));
    });

    let report = experiment.run().await?;
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Table => {
            print_report(&report);
            if let Some(path) = &args.output {
                emit_json(&report.to_json()?, Some(path))?;
            }
        }
        OutputFormat::Json => emit_json(&report.to_json()?, args.output.as_deref())?,
    }

    Ok(())
}
