//! End-to-end routing properties: validity, equivalence, termination.

mod common;

use common::{assert_routed, equivalent, line_scenario, with_fingerprint};
use proptest::prelude::*;
use qmap_ir::{Circuit, Instruction, QubitId, StandardGate};
use qmap_route::{
    DeviceGraph, NativeGates, PassManagerBuilder, PlacementStrategy, PropertySet, QubitMap,
    Replacement, RouteResult, Router, RoutingConfig, RoutingMethod, RoutingStats, RoutingWindow,
    place, remove_redundancies, rewrite, route, valid_connectivity,
};

fn q(i: u32) -> QubitId {
    QubitId(i)
}

fn route_with(
    circuit: &Circuit,
    device: &DeviceGraph,
    strategy: PlacementStrategy,
    config: &RoutingConfig,
) -> qmap_route::RoutedCircuit {
    let initial = place(circuit, device, strategy).unwrap();
    route(circuit, device, &initial, config).unwrap()
}

#[test]
fn valid_circuit_needs_no_moves() {
    let circuit = Circuit::ghz(5).unwrap();
    let device = DeviceGraph::linear(5);
    let routed = route(&circuit, &device, &QubitMap::trivial(5), &RoutingConfig::default()).unwrap();

    assert_eq!(routed.stats.swaps, 0);
    assert_eq!(routed.stats.bridges, 0);
    assert!(routed.circuit.implicit_permutation().is_empty());
    assert_eq!(routed.circuit.instructions(), circuit.instructions());
    assert_eq!(routed.initial_map, routed.final_map);
}

#[test]
fn isolated_interaction_takes_distance_minus_one_swaps() {
    let device = DeviceGraph::linear(7);
    for d in 1..7u32 {
        let mut circuit = Circuit::with_size("far", 7, 0);
        circuit.cx(q(0), q(d)).unwrap();
        let routed =
            route(&circuit, &device, &QubitMap::trivial(7), &RoutingConfig::default()).unwrap();
        assert_eq!(routed.stats.swaps, d as usize - 1, "distance {d}");
        assert_routed(&circuit, &routed, &device);
    }
}

#[test]
fn line_scenario_for_every_strategy() {
    let circuit = with_fingerprint(&line_scenario());
    let device = DeviceGraph::linear(4);
    // Routing every gate on its own along a shortest path needs up to
    // two SWAPs per gate on this device.
    let naive = 2 * circuit.num_two_qubit_gates();

    for strategy in PlacementStrategy::ALL {
        let routed = route_with(&circuit, &device, strategy, &RoutingConfig::default());
        assert!(routed.stats.swaps >= 1, "{strategy}: K4 does not embed in a line");
        assert!(routed.stats.swaps < naive, "{strategy}: {} swaps", routed.stats.swaps);
        assert_routed(&circuit, &routed, &device);
    }
}

#[test]
fn line_scenario_with_trivial_placement() {
    let circuit = with_fingerprint(&line_scenario());
    let device = DeviceGraph::linear(4);
    let routed = route_with(
        &circuit,
        &device,
        PlacementStrategy::Trivial,
        &RoutingConfig::default(),
    );
    assert!((1..=3).contains(&routed.stats.swaps));
}

#[test]
fn reduced_lookahead_stays_valid() {
    let circuit = with_fingerprint(&line_scenario());
    let device = DeviceGraph::linear(4);
    for lookahead in 0..=2 {
        let config = RoutingConfig::default().with_lookahead(lookahead);
        let routed = route_with(&circuit, &device, PlacementStrategy::Trivial, &config);
        assert!(routed.stats.swaps >= 1);
        assert_routed(&circuit, &routed, &device);
    }
}

#[test]
fn qft_terminates_on_a_long_line() {
    let circuit = Circuit::qft(10).unwrap();
    let device = DeviceGraph::linear(10);
    let routed = route(&circuit, &device, &QubitMap::trivial(10), &RoutingConfig::default()).unwrap();

    assert!(routed.stats.swaps > 0);
    assert!(valid_connectivity(&routed.circuit, &device, false));
    let gates_out = routed.circuit.num_ops() - routed.stats.swaps;
    assert_eq!(gates_out, circuit.num_ops());
}

#[test]
fn qft_is_equivalent_on_every_topology() {
    let circuit = with_fingerprint(&Circuit::qft(5).unwrap());
    for device in [
        DeviceGraph::linear(5),
        DeviceGraph::ring(5),
        DeviceGraph::star(5),
        DeviceGraph::grid(2, 3),
    ] {
        for strategy in PlacementStrategy::ALL {
            let routed = route_with(&circuit, &device, strategy, &RoutingConfig::default());
            assert_routed(&circuit, &routed, &device);
        }
    }
}

#[test]
fn routing_is_deterministic() {
    let circuit = Circuit::qft(6).unwrap();
    let device = DeviceGraph::grid(2, 3);
    let config = RoutingConfig::default().with_bridge(true);
    let first = route_with(&circuit, &device, PlacementStrategy::Graph, &config);
    let second = route_with(&circuit, &device, PlacementStrategy::Graph, &config);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn restored_permutation_is_identity() {
    let circuit = with_fingerprint(&line_scenario());
    let device = DeviceGraph::linear(4);
    let config = RoutingConfig::default().with_restore_permutation(true);
    let routed = route_with(&circuit, &device, PlacementStrategy::Trivial, &config);

    assert!(routed.circuit.implicit_permutation().is_empty());
    assert_eq!(routed.initial_map, routed.final_map);
    assert_routed(&circuit, &routed, &device);
}

#[test]
fn rewriting_keeps_equivalence() {
    let circuit = with_fingerprint(&line_scenario());
    let device = DeviceGraph::from_edges(4, &[(0, 1), (2, 1), (2, 3)], true).unwrap();
    let config = RoutingConfig::default().with_bridge(true);
    let routed = route_with(&circuit, &device, PlacementStrategy::Line, &config);

    for native in [NativeGates::default(), NativeGates::cz()] {
        let lowered = rewrite(&routed.circuit, &device, &native).unwrap();
        assert!(valid_connectivity(&lowered, &device, true));
        assert!(equivalent(&circuit, &lowered, &routed.final_map, &device));

        let cleaned = remove_redundancies(&lowered).unwrap();
        assert!(cleaned.num_ops() <= lowered.num_ops());
        assert!(equivalent(&circuit, &cleaned, &routed.final_map, &device));
    }
}

#[test]
fn reversed_controlled_gates_keep_equivalence() {
    let mut circuit = Circuit::with_size("controlled", 3, 0);
    circuit.h(q(0)).unwrap();
    circuit.cy(q(1), q(0)).unwrap();
    circuit.ch(q(1), q(2)).unwrap();
    circuit.crz(0.7, q(1), q(0)).unwrap();
    circuit.cx(q(2), q(1)).unwrap();
    circuit.cx(q(0), q(2)).unwrap();
    let circuit = with_fingerprint(&circuit);
    let device = DeviceGraph::from_edges(3, &[(0, 1), (2, 1)], true).unwrap();

    let (pm, mut props) = PassManagerBuilder::new()
        .with_placement(PlacementStrategy::Trivial)
        .with_target(device.clone(), NativeGates::default())
        .build();
    let mut lowered = circuit.clone();
    pm.run(&mut lowered, &mut props).unwrap();

    assert!(valid_connectivity(&lowered, &device, true));
    assert!(equivalent(&circuit, &lowered, props.final_map.as_ref().unwrap(), &device));
}

#[test]
fn pipeline_reports_stats() {
    let device = DeviceGraph::ring(6);
    let (pm, mut props) = PassManagerBuilder::new()
        .with_optimization_level(3)
        .with_properties(PropertySet::new().with_device(device.clone()))
        .build();

    let logical = with_fingerprint(&Circuit::qft(6).unwrap());
    let mut circuit = logical.clone();
    pm.run(&mut circuit, &mut props).unwrap();

    let stats = props.get::<RoutingStats>().unwrap();
    assert_eq!(stats.ops_in, logical.num_ops());
    let final_map = props.final_map.as_ref().unwrap();
    assert!(equivalent(&logical, &circuit, final_map, &device));
}

/// Bridges every distance-2 CX of the front and nothing else.
struct BridgeOnly;

impl RoutingMethod for BridgeOnly {
    fn name(&self) -> &'static str {
        "bridge_only"
    }

    fn can_act(&self, window: &RoutingWindow<'_>, device: &DeviceGraph) -> bool {
        !self.bridges(window, device).ops.is_empty()
    }

    fn act(&self, window: &RoutingWindow<'_>, device: &DeviceGraph) -> RouteResult<Replacement> {
        Ok(self.bridges(window, device))
    }
}

impl BridgeOnly {
    fn bridges(&self, window: &RoutingWindow<'_>, device: &DeviceGraph) -> Replacement {
        let mut replacement = Replacement::default();
        for gate in &window.front {
            if gate.instruction.as_standard_gate() != Some(&StandardGate::CX) {
                continue;
            }
            let (c, t) = gate.qubits();
            let (Some(pc), Some(pt)) = (window.position(c), window.position(t)) else {
                continue;
            };
            if device.dist(pc, pt) != 2 {
                continue;
            }
            let Some(&mid) = device
                .neighbors_of(pc)
                .iter()
                .find(|&&m| device.has_edge(m, pt))
            else {
                continue;
            };
            replacement.ops.push(Instruction::gate(
                StandardGate::Bridge,
                [pc, mid, pt].map(QubitId::from_index),
            ));
            replacement.consumed.push(gate.index);
        }
        replacement
    }
}

#[test]
fn custom_method_takes_priority() {
    let mut circuit = Circuit::with_size("far", 3, 0);
    circuit.h(q(0)).unwrap();
    circuit.cx(q(0), q(2)).unwrap();
    circuit.cx(q(2), q(0)).unwrap();
    let circuit = with_fingerprint(&circuit);
    let device = DeviceGraph::linear(3);

    let router = Router::new(RoutingConfig::default()).with_priority_method(BridgeOnly);
    assert_eq!(router.method_names(), vec!["bridge_only", "swap"]);

    let routed = router.route(&circuit, &device, &QubitMap::trivial(3)).unwrap();
    assert_eq!(routed.stats.bridges, 2);
    assert_eq!(routed.stats.swaps, 0);
    assert_routed(&circuit, &routed, &device);
}

/// Operations drawn by the generator; invalid operand pairs are skipped.
#[derive(Debug, Clone)]
enum Op {
    H(u32),
    Rx(f64, u32),
    T(u32),
    Cx(u32, u32),
    Cz(u32, u32),
    Cp(f64, u32, u32),
    Swap(u32, u32),
}

impl Op {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            Op::H(a) => circuit.h(q(a)),
            Op::Rx(theta, a) => circuit.rx(theta, q(a)),
            Op::T(a) => circuit.t(q(a)),
            Op::Cx(a, b) => circuit.cx(q(a), q(b)),
            Op::Cz(a, b) => circuit.cz(q(a), q(b)),
            Op::Cp(lambda, a, b) => circuit.cp(lambda, q(a), q(b)),
            Op::Swap(a, b) => circuit.swap(q(a), q(b)),
        };
    }
}

fn arb_op(num_qubits: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (0..num_qubits).prop_map(Op::H),
        1 => (-3.0..3.0f64, 0..num_qubits).prop_map(|(t, a)| Op::Rx(t, a)),
        1 => (0..num_qubits).prop_map(Op::T),
        3 => (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Cx(a, b)),
        1 => (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Cz(a, b)),
        1 => (-3.0..3.0f64, 0..num_qubits, 0..num_qubits).prop_map(|(t, a, b)| Op::Cp(t, a, b)),
        1 => (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Swap(a, b)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=5).prop_flat_map(|n| {
        prop::collection::vec(arb_op(n), 0..=24).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", n, 0);
            for op in ops {
                op.apply(&mut circuit);
            }
            with_fingerprint(&circuit)
        })
    })
}

fn arb_device() -> impl Strategy<Value = DeviceGraph> {
    prop_oneof![
        Just(DeviceGraph::linear(5)),
        Just(DeviceGraph::ring(5)),
        Just(DeviceGraph::star(5)),
        Just(DeviceGraph::grid(2, 3)),
        Just(DeviceGraph::linear(6)),
    ]
}

fn arb_directed_device() -> impl Strategy<Value = DeviceGraph> {
    prop_oneof![
        Just(DeviceGraph::from_edges(5, &[(0, 1), (2, 1), (2, 3), (4, 3)], true).unwrap()),
        Just(
            DeviceGraph::from_edges(
                6,
                &[(0, 1), (2, 1), (3, 0), (1, 4), (5, 2), (4, 3), (4, 5)],
                true,
            )
            .unwrap()
        ),
    ]
}

fn arb_strategy() -> impl Strategy<Value = PlacementStrategy> {
    prop::sample::select(PlacementStrategy::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn routed_circuits_are_valid_and_equivalent(
        circuit in arb_circuit(),
        device in arb_device(),
        strategy in arb_strategy(),
        lookahead in 0_usize..=4,
        bridge in any::<bool>(),
    ) {
        let config = RoutingConfig::default()
            .with_lookahead(lookahead)
            .with_bridge(bridge);
        let routed = route_with(&circuit, &device, strategy, &config);
        assert_routed(&circuit, &routed, &device);

        let lowered = rewrite(&routed.circuit, &device, &NativeGates::default()).unwrap();
        prop_assert!(equivalent(&circuit, &lowered, &routed.final_map, &device));
    }

    #[test]
    fn pipeline_respects_directed_edges(
        circuit in arb_circuit(),
        device in arb_directed_device(),
        strategy in arb_strategy(),
        bridge in any::<bool>(),
        native in prop::sample::select(vec![NativeGates::default(), NativeGates::cz()]),
    ) {
        let (pm, mut props) = PassManagerBuilder::new()
            .with_optimization_level(1)
            .with_placement(strategy)
            .with_routing(RoutingConfig::default().with_bridge(bridge))
            .with_target(device.clone(), native)
            .build();

        let mut lowered = circuit.clone();
        pm.run(&mut lowered, &mut props).unwrap();

        prop_assert!(valid_connectivity(&lowered, &device, true));
        let final_map = props.final_map.as_ref().unwrap();
        prop_assert!(equivalent(&circuit, &lowered, final_map, &device));
    }

    #[test]
    fn routing_a_routed_circuit_is_idle(
        circuit in arb_circuit(),
        device in arb_device(),
    ) {
        let routed = route_with(&circuit, &device, PlacementStrategy::Graph, &RoutingConfig::default());
        let again = route(
            &routed.circuit,
            &device,
            &QubitMap::trivial(device.num_nodes()),
            &RoutingConfig::default(),
        )
        .unwrap();
        prop_assert_eq!(again.stats.swaps, 0);
        prop_assert!(again.circuit.implicit_permutation().is_empty());
        prop_assert_eq!(again.circuit.instructions(), routed.circuit.instructions());
    }
}
