//! Devices command implementation.

use anyhow::Result;
use console::style;

use qmap_route::device::distance_histogram;

use super::common::{PRESETS, load_device};

/// Execute the devices command.
pub fn execute(device: Option<&str>) -> Result<()> {
    let Some(device) = device else {
        println!("{} Device presets:\n", style("qmap").cyan().bold());
        for preset in PRESETS {
            println!("  {}", style(preset).bold());
        }
        println!();
        println!("Any other value is read as a JSON or YAML device file.");
        return Ok(());
    };

    let (name, graph) = load_device(device)?;

    println!("{} {}", style("●").green(), style(&name).bold());
    println!("  Nodes: {}", graph.num_nodes());
    println!(
        "  Edges: {}{}",
        graph.num_edges(),
        if graph.is_directed() { " (directed)" } else { "" }
    );
    println!(
        "  Connected: {}",
        if graph.is_connected() {
            style("yes").green()
        } else {
            style("no").red()
        }
    );
    if graph.calibration().is_some_and(|c| !c.is_empty()) {
        println!("  Calibration: {}", style("present").green());
    }

    println!("  Distances:");
    for (distance, pairs) in distance_histogram(&graph) {
        if distance == qmap_route::device::UNREACHABLE {
            println!("    unreachable: {pairs} pairs");
        } else {
            println!("    {distance}: {pairs} pairs");
        }
    }

    Ok(())
}
