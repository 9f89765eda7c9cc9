//! qmap Command-Line Interface
//!
//! Places and routes circuits onto restricted-connectivity devices.
//!
//! ```text
//! qmap route -i circuit.json -d grid:3x3 -o routed.json
//! qmap devices --device device.yaml
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{devices, route, version};

/// qmap - qubit placement and routing for restricted-connectivity devices
#[derive(Parser)]
#[command(name = "qmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place and route a circuit onto a device
    Route {
        /// Input circuit (JSON or YAML)
        #[arg(short, long)]
        input: String,

        /// Device: a preset such as `linear:5`, `grid:3x4`, or a JSON/YAML file
        #[arg(short, long, env = "QMAP_DEVICE", default_value = "linear:5")]
        device: String,

        /// Output file for the routed circuit (JSON or YAML)
        #[arg(short, long)]
        output: Option<String>,

        /// Placement strategy (trivial, line, graph)
        #[arg(short, long, default_value = "graph")]
        placement: String,

        /// Routing configuration file (JSON or YAML)
        #[arg(short, long)]
        config: Option<String>,

        /// Optimization level (0-3)
        #[arg(long, default_value = "1")]
        optimization_level: u8,

        /// Native two-qubit gate (cx, cz)
        #[arg(long, default_value = "cx")]
        native: String,

        /// Allow BRIDGE gates for distance-2 CX
        #[arg(long)]
        bridge: bool,

        /// Return every qubit to its initial node at the end
        #[arg(long)]
        restore: bool,

        /// Print a JSON report instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// List device presets or describe a device
    Devices {
        /// Device to describe
        #[arg(short, long)]
        device: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Route {
            input,
            device,
            output,
            placement,
            config,
            optimization_level,
            native,
            bridge,
            restore,
            json,
        } => route::execute(&route::RouteArgs {
            input,
            device,
            output,
            placement,
            config,
            optimization_level,
            native,
            bridge,
            restore,
            json,
        }),

        Commands::Devices { device } => devices::execute(device.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
