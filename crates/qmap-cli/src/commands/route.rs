//! Route command implementation.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use qmap_ir::Circuit;
use qmap_route::{PassManagerBuilder, PlacementStrategy, QubitMap, RoutingStats};

use super::common::{load_circuit, load_config, load_device, parse_native, write_document};

/// Arguments of the route command.
pub struct RouteArgs {
    pub input: String,
    pub device: String,
    pub output: Option<String>,
    pub placement: String,
    pub config: Option<String>,
    pub optimization_level: u8,
    pub native: String,
    pub bridge: bool,
    pub restore: bool,
    pub json: bool,
}

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub circuit: String,
    pub device: String,
    pub placement: PlacementStrategy,
    pub optimization_level: u8,
    pub stats: RoutingStats,
    pub depth: usize,
    pub ops: usize,
    pub initial_map: QubitMap,
    pub final_map: QubitMap,
}

/// Execute the route command.
pub fn execute(args: &RouteArgs) -> Result<()> {
    let circuit = load_circuit(&args.input)?;
    let (device_name, device) = load_device(&args.device)?;
    let placement: PlacementStrategy = args.placement.parse()?;
    let native = parse_native(&args.native)?;

    let mut config = load_config(args.config.as_deref())?;
    config.bridge |= args.bridge;
    config.restore_permutation |= args.restore;

    if !args.json {
        println!(
            "{} Routing {} onto {} ({} nodes, {} edges)",
            style("→").cyan().bold(),
            style(&args.input).green(),
            style(&device_name).yellow(),
            device.num_nodes(),
            device.num_edges()
        );
        println!(
            "  Loaded: {} qubits, {} two-qubit gates, depth {}",
            circuit.num_qubits(),
            circuit.num_two_qubit_gates(),
            circuit.depth()
        );
    }

    let (pm, mut props) = PassManagerBuilder::new()
        .with_optimization_level(args.optimization_level)
        .with_placement(placement)
        .with_routing(config)
        .with_target(device, native)
        .build();

    let mut routed: Circuit = circuit.clone();
    pm.run(&mut routed, &mut props)
        .with_context(|| format!("Failed to route '{}'", circuit.name()))?;

    let stats = props.remove::<RoutingStats>().unwrap_or_default();
    let report = RouteReport {
        circuit: circuit.name().to_string(),
        device: device_name,
        placement,
        optimization_level: args.optimization_level.min(3),
        stats,
        depth: routed.depth(),
        ops: routed.num_ops(),
        initial_map: props.initial_map.take().unwrap_or_default(),
        final_map: props.final_map.take().unwrap_or_default(),
    };

    if let Some(path) = &args.output {
        write_document(&routed, path)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    if let Some(path) = &args.output {
        println!("  Output: {}", style(path).green());
    }

    Ok(())
}

fn print_report(report: &RouteReport) {
    println!("{} Routing complete", style("✓").green().bold());
    println!(
        "  Inserted: {} swaps, {} bridges in {} resolutions",
        style(report.stats.swaps).yellow(),
        style(report.stats.bridges).yellow(),
        report.stats.resolutions
    );
    println!("  Result: depth {}, {} ops", report.depth, report.ops);

    println!("  Placement ({}):", report.placement);
    for (qubit, start) in report.initial_map.iter() {
        let end = report.final_map.physical(qubit);
        match end {
            Some(end) if end != start => {
                println!("    {qubit}: {start} → {}", style(end).cyan());
            }
            _ => println!("    {qubit}: {start}"),
        }
    }
}
