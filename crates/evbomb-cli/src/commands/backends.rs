//! Backends command implementation.

use anyhow::Result;
use console::style;

use evbomb_adapter_sim::SimulatorBackend;
use evbomb_hal::Backend;

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("evbomb").cyan().bold());

    let sim = SimulatorBackend::new();
    let caps = sim.capabilities();
    let available = sim.availability().await?.is_available;

    println!(
        "  {} {} {}",
        if available {
            style("●").green()
        } else {
            style("○").red()
        },
        style(sim.name()).bold(),
        if caps.is_simulator { "(local)" } else { "" }
    );
    println!("    Qubits: {}", caps.num_qubits);
    println!("    Max shots: {}", caps.max_shots);
    println!(
        "    Gates: {}",
        caps.gate_set
            .single_qubit
            .iter()
            .chain(&caps.gate_set.two_qubit)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    if !caps.features.is_empty() {
        println!("    Features: {}", caps.features.join(", "));
    }
    println!();

    Ok(())
}
