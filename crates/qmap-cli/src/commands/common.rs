//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use qmap_ir::Circuit;
use qmap_route::{DeviceGraph, DeviceSpec, NativeGates, NativeTwoQubitGate, RoutingConfig, Topology};

/// Device presets accepted by `--device`.
pub const PRESETS: [&str; 5] = ["linear:N", "ring:N", "star:N", "full:N", "grid:RxC"];

/// Read a JSON or YAML file, chosen by extension (JSON if unknown).
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => {
            serde_yaml_ng::from_str(&source).with_context(|| format!("Invalid YAML in {path}"))
        }
        _ => serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {path}")),
    }
}

/// Write `value` as JSON or YAML, chosen by extension (JSON if unknown).
pub fn write_document<T: Serialize>(value: &T, path: &str) -> Result<()> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("json");

    let content = match ext.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml_ng::to_string(value)?,
        _ => serde_json::to_string_pretty(value)?,
    };

    fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;

    Ok(())
}

/// Load a circuit from a JSON or YAML file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let circuit: Circuit = read_document(path)?;
    circuit
        .validate()
        .with_context(|| format!("Invalid circuit in {path}"))?;
    Ok(circuit)
}

/// Parse a preset such as `linear:5` or `grid:3x4`.
pub fn parse_preset(device: &str) -> Result<Option<Topology>> {
    let Some((kind, size)) = device.split_once(':') else {
        return Ok(None);
    };
    let count = || {
        size.trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid qubit count in '{device}'"))
    };

    let topology = match kind.trim().to_lowercase().as_str() {
        "linear" | "line" => Topology::Linear { qubits: count()? },
        "ring" => Topology::Ring { qubits: count()? },
        "star" => Topology::Star { qubits: count()? },
        "full" => Topology::Full { qubits: count()? },
        "grid" => {
            let (rows, cols) = size
                .split_once(['x', 'X'])
                .with_context(|| format!("Expected grid:RxC, got '{device}'"))?;
            Topology::Grid {
                rows: rows.trim().parse().context("Invalid grid rows")?,
                cols: cols.trim().parse().context("Invalid grid columns")?,
            }
        }
        other => anyhow::bail!(
            "Unknown device preset: '{other}'. Available: {}",
            PRESETS.join(", ")
        ),
    };
    Ok(Some(topology))
}

/// Load a device from a preset or a JSON/YAML [`DeviceSpec`] file.
pub fn load_device(device: &str) -> Result<(String, DeviceGraph)> {
    let spec = match parse_preset(device)? {
        Some(topology) => DeviceSpec {
            name: device.to_string(),
            topology,
            directed: false,
            node_errors: vec![],
            edge_errors: vec![],
        },
        None => read_document(device)?,
    };
    let graph = spec
        .build()
        .with_context(|| format!("Invalid device '{device}'"))?;
    let name = if spec.name.is_empty() {
        device.to_string()
    } else {
        spec.name
    };
    Ok((name, graph))
}

/// Load a routing configuration, or the default when no file is given.
pub fn load_config(path: Option<&str>) -> Result<RoutingConfig> {
    let config = match path {
        Some(path) => read_document(path)?,
        None => RoutingConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Native gate set for a `--native` value.
pub fn parse_native(native: &str) -> Result<NativeGates> {
    let two_qubit = match native.to_lowercase().as_str() {
        "cx" | "cnot" => NativeTwoQubitGate::Cx,
        "cz" => NativeTwoQubitGate::Cz,
        other => anyhow::bail!("Unknown native gate: '{other}'. Available: cx, cz"),
    };
    Ok(NativeGates {
        two_qubit,
        native_swap: false,
    })
}
