//! Property-based tests for the circuit model.

use proptest::prelude::*;
use qmap_ir::{Circuit, ClbitId, QubitId};

/// Operations drawn by the generator; invalid operand pairs are skipped.
#[derive(Debug, Clone)]
enum Op {
    H(u32),
    Rz(f64, u32),
    Cx(u32, u32),
    Cz(u32, u32),
    Measure(u32),
}

impl Op {
    fn apply(self, circuit: &mut Circuit) {
        match self {
            Op::H(q) => {
                let _ = circuit.h(QubitId(q));
            }
            Op::Rz(theta, q) => {
                let _ = circuit.rz(theta, QubitId(q));
            }
            Op::Cx(a, b) => {
                let _ = circuit.cx(QubitId(a), QubitId(b));
            }
            Op::Cz(a, b) => {
                let _ = circuit.cz(QubitId(a), QubitId(b));
            }
            Op::Measure(q) => {
                let _ = circuit.measure(QubitId(q), ClbitId(q));
            }
        }
    }
}

fn arb_op(num_qubits: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..num_qubits).prop_map(Op::H),
        (-3.0..3.0f64, 0..num_qubits).prop_map(|(t, q)| Op::Rz(t, q)),
        (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Cx(a, b)),
        (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Cz(a, b)),
        (0..num_qubits).prop_map(Op::Measure),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=6).prop_flat_map(|n| {
        prop::collection::vec(arb_op(n), 0..=30).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", n, n);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn depth_is_bounded_by_op_count(circuit in arb_circuit()) {
        prop_assert!(circuit.depth() <= circuit.num_ops());
        if !circuit.is_empty() {
            prop_assert!(circuit.depth() >= 1);
        }
    }

    #[test]
    fn interaction_weights_count_two_qubit_gates(circuit in arb_circuit()) {
        let graph = circuit.interaction_graph();
        let total: u32 = graph.edges().iter().map(|e| e.2).sum();
        prop_assert_eq!(total as usize, circuit.num_two_qubit_gates());
    }

    #[test]
    fn every_instruction_survives_revalidation(circuit in arb_circuit()) {
        prop_assert!(circuit.validate().is_ok());
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        prop_assert!(back.validate().is_ok());
        prop_assert_eq!(back.num_ops(), circuit.num_ops());
    }

    #[test]
    fn encounter_order_is_a_permutation(circuit in arb_circuit()) {
        let mut order = circuit.encounter_order();
        order.sort();
        let declared: Vec<_> = circuit.qubits().collect();
        prop_assert_eq!(order, declared);
    }
}
