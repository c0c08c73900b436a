//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - interaction-free bomb testing",
        style("evbomb").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  evbomb-ir           Circuit intermediate representation");
    println!("  evbomb-hal          Backend abstraction layer");
    println!("  evbomb-adapter-sim  Statevector simulator with mid-circuit measurement");
    println!("  evbomb-core         Bomb generator, tester and classifier");
    println!("  evbomb-cli          Command-line interface");
}
