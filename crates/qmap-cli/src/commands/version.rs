//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - qubit placement and routing",
        style("qmap").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qmap-ir     Circuit model");
    println!("  qmap-route  Placement, routing and rewriting");
    println!("  qmap-cli    Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
