//! Classify command implementation.

use anyhow::{Context, Result};
use console::style;

use evbomb_core::{MeasurementRegister, Outcome, classify};

/// Execute the classify command.
pub fn execute(bits: &str) -> Result<()> {
    let register = MeasurementRegister::from_bit_str(bits)
        .with_context(|| format!("Invalid register: '{bits}'"))?;
    let outcome = classify(&register);

    let styled = match outcome {
        Outcome::Detonated => style(outcome.as_str()).red().bold(),
        Outcome::Live => style(outcome.as_str()).green().bold(),
        Outcome::Dud => style(outcome.as_str()).yellow().bold(),
    };
    println!("{register} → {styled}");

    if let Some(step) = register.intermediate().iter().position(|&b| b) {
        println!("  target fired at step {}", step + 1);
    }

    Ok(())
}
