//! CLI command parsing and end-to-end tests.
//!
//! Argument parsing is checked against a mirror of the binary's clap
//! definitions; the `end_to_end` module runs the built `qmap` binary on
//! temporary files.

// ============================================================================
// clap parsing
// ============================================================================

mod clap_parsing {
    use clap::{Parser, Subcommand};

    #[derive(Parser)]
    #[command(name = "qmap")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Route {
            #[arg(short, long)]
            input: String,
            #[arg(short, long, default_value = "linear:5")]
            device: String,
            #[arg(short, long)]
            output: Option<String>,
            #[arg(short, long, default_value = "graph")]
            placement: String,
            #[arg(short, long)]
            config: Option<String>,
            #[arg(long, default_value = "1")]
            optimization_level: u8,
            #[arg(long, default_value = "cx")]
            native: String,
            #[arg(long)]
            bridge: bool,
            #[arg(long)]
            restore: bool,
            #[arg(long)]
            json: bool,
        },
        Devices {
            #[arg(short, long)]
            device: Option<String>,
        },
        Version,
    }

    #[test]
    fn test_parse_route_minimal() {
        let cli = TestCli::try_parse_from(["qmap", "route", "-i", "circuit.json"]).unwrap();
        match cli.command {
            TestCommands::Route {
                input,
                device,
                output,
                placement,
                optimization_level,
                native,
                bridge,
                json,
                ..
            } => {
                assert_eq!(input, "circuit.json");
                assert_eq!(device, "linear:5");
                assert!(output.is_none());
                assert_eq!(placement, "graph");
                assert_eq!(optimization_level, 1);
                assert_eq!(native, "cx");
                assert!(!bridge);
                assert!(!json);
            }
            _ => panic!("Expected Route command"),
        }
    }

    #[test]
    fn test_parse_route_with_all_args() {
        let cli = TestCli::try_parse_from([
            "qmap",
            "-vv",
            "route",
            "-i",
            "in.yaml",
            "-d",
            "grid:3x3",
            "-o",
            "out.json",
            "-p",
            "line",
            "-c",
            "routing.yaml",
            "--optimization-level",
            "2",
            "--native",
            "cz",
            "--bridge",
            "--restore",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            TestCommands::Route {
                device,
                output,
                placement,
                config,
                optimization_level,
                native,
                bridge,
                restore,
                json,
                ..
            } => {
                assert_eq!(device, "grid:3x3");
                assert_eq!(output.as_deref(), Some("out.json"));
                assert_eq!(placement, "line");
                assert_eq!(config.as_deref(), Some("routing.yaml"));
                assert_eq!(optimization_level, 2);
                assert_eq!(native, "cz");
                assert!(bridge && restore && json);
            }
            _ => panic!("Expected Route command"),
        }
    }

    #[test]
    fn test_parse_route_missing_input() {
        assert!(TestCli::try_parse_from(["qmap", "route"]).is_err());
    }

    #[test]
    fn test_parse_devices() {
        let cli = TestCli::try_parse_from(["qmap", "devices", "-d", "ring:6"]).unwrap();
        match cli.command {
            TestCommands::Devices { device } => assert_eq!(device.as_deref(), Some("ring:6")),
            _ => panic!("Expected Devices command"),
        }
    }

    #[test]
    fn test_parse_version() {
        let cli = TestCli::try_parse_from(["qmap", "version"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(TestCli::try_parse_from(["qmap", "compile"]).is_err());
    }
}

// ============================================================================
// End to end
// ============================================================================

mod end_to_end {
    use std::fs;
    use std::path::Path;
    use std::process::{Command, Output};

    use qmap_ir::{Circuit, CircuitLevel, QubitId};
    use qmap_route::{DeviceGraph, valid_connectivity};

    fn qmap(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_qmap"))
            .args(args)
            .env_remove("QMAP_DEVICE")
            .output()
            .unwrap()
    }

    fn write_triangle(dir: &Path) -> String {
        let mut circuit = Circuit::with_size("triangle", 3, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(2)).unwrap();
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        let path = dir.join("triangle.json");
        fs::write(&path, serde_json::to_string(&circuit).unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_route_writes_valid_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_triangle(dir.path());
        let output = dir.path().join("routed.json");
        let output_str = output.to_string_lossy().into_owned();

        let result = qmap(&["route", "-i", &input, "-d", "linear:3", "-o", &output_str]);
        assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

        let routed: Circuit = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(routed.level(), CircuitLevel::Physical);
        assert!(valid_connectivity(&routed, &DeviceGraph::linear(3), false));
    }

    #[test]
    fn test_route_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_triangle(dir.path());
        let config = dir.path().join("routing.yaml");
        fs::write(&config, "lookahead: 2\nbridge: false\n").unwrap();
        let config_str = config.to_string_lossy().into_owned();

        let result = qmap(&[
            "route", "-i", &input, "-d", "ring:4", "-p", "trivial", "-c", &config_str, "--json",
        ]);
        assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

        let report: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
        assert_eq!(report["circuit"], "triangle");
        assert_eq!(report["placement"], "trivial");
        assert!(report["stats"]["swaps"].as_u64().unwrap() >= 1);
        assert_eq!(report["initial_map"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_route_rejects_oversized_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_triangle(dir.path());

        let result = qmap(&["route", "-i", &input, "-d", "linear:2"]);
        assert!(!result.status.success());
        let stderr = String::from_utf8_lossy(&result.stderr);
        assert!(stderr.contains("requires 3 qubits"), "{stderr}");
    }

    #[test]
    fn test_route_rejects_unknown_options() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_triangle(dir.path());

        let result = qmap(&["route", "-i", &input, "-p", "random"]);
        assert!(!result.status.success());

        let result = qmap(&["route", "-i", &input, "-d", "torus:4"]);
        assert!(!result.status.success());
        assert!(String::from_utf8_lossy(&result.stderr).contains("Unknown device preset"));

        let result = qmap(&["route", "-i", "missing.json"]);
        assert!(!result.status.success());
        assert!(String::from_utf8_lossy(&result.stderr).contains("File not found"));
    }

    #[test]
    fn test_devices_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.yaml");
        fs::write(
            &path,
            "name: tiny\ntopology: { kind: custom, qubits: 3, edges: [[0, 1], [1, 2]] }\n\
             edge_errors:\n  - { edge: [0, 1], error: 0.02 }\n",
        )
        .unwrap();

        let result = qmap(&["devices", "-d", &path.to_string_lossy()]);
        assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert!(stdout.contains("tiny"));
        assert!(stdout.contains("Nodes: 3"));
        assert!(stdout.contains("Calibration"));
    }

    #[test]
    fn test_devices_lists_presets() {
        let result = qmap(&["devices"]);
        assert!(result.status.success());
        assert!(String::from_utf8_lossy(&result.stdout).contains("grid:RxC"));
    }

    #[test]
    fn test_version() {
        let result = qmap(&["version"]);
        assert!(result.status.success());
        assert!(String::from_utf8_lossy(&result.stdout).contains(env!("CARGO_PKG_VERSION")));
    }
}
