//! Shared helpers for routing integration tests.
//!
//! The simulator is a plain statevector over at most a handful of qubits;
//! qubit `i` is bit `i` of the basis index.

#![allow(dead_code)]

use num_complex::Complex64;
use qmap_ir::{Circuit, Instruction, QubitId, StandardGate};
use qmap_route::unitary::Unitary2x2;
use qmap_route::{DeviceGraph, QubitMap, RoutedCircuit, valid_connectivity};

const TOLERANCE: f64 = 1e-8;

/// The 4-qubit line scenario.
pub fn line_scenario() -> Circuit {
    let mut circuit = Circuit::with_size("line_scenario", 4, 0);
    for (a, b) in [(0, 1), (1, 2), (0, 2), (0, 3), (2, 3), (1, 3), (0, 1)] {
        circuit.cx(QubitId(a), QubitId(b)).unwrap();
    }
    circuit
}

/// Single-qubit rotations with distinct angles on every qubit, so that
/// misplaced qubits show up in the final state.
pub fn with_fingerprint(circuit: &Circuit) -> Circuit {
    let mut out = Circuit::with_size(circuit.name(), circuit.num_qubits() as u32, 0);
    for (k, q) in circuit.qubits().enumerate() {
        let k = k as f64;
        out.ry(0.3 + 0.41 * k, q).unwrap();
        out.rz(0.7 + 0.23 * k, q).unwrap();
    }
    out.extend(circuit.instructions().iter().cloned()).unwrap();
    out
}

/// A statevector over `num_qubits` qubits, starting in |0...0>.
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            num_qubits,
            amplitudes,
        }
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Run every gate of `circuit`; qubit ids index the state directly.
    pub fn run(&mut self, circuit: &Circuit) {
        for op in circuit.instructions() {
            self.apply(op);
        }
    }

    fn apply(&mut self, op: &Instruction) {
        if op.is_barrier() {
            return;
        }
        let gate = op
            .as_standard_gate()
            .unwrap_or_else(|| panic!("cannot simulate '{}'", op.name()));
        assert!(op.condition().is_none(), "conditioned gates are not simulated");
        let q: Vec<usize> = op.qubits.iter().map(|q| q.index()).collect();

        use StandardGate as G;
        match (gate, q.as_slice()) {
            (g, &[t]) => self.apply_1q(&single(g), t),
            (G::CX, &[c, t]) => self.controlled(&single(&G::X), c, t),
            (G::CY, &[c, t]) => self.controlled(&single(&G::Y), c, t),
            (G::CZ, &[c, t]) => self.controlled(&single(&G::Z), c, t),
            (G::CH, &[c, t]) => self.controlled(&single(&G::H), c, t),
            (G::CRz(theta), &[c, t]) => self.controlled(&single(&G::Rz(*theta)), c, t),
            (G::CP(lambda), &[c, t]) => self.controlled(&single(&G::P(*lambda)), c, t),
            (G::Swap, &[a, b]) => self.swap(a, b),
            (G::ISwap, &[a, b]) => self.iswap(a, b),
            (G::RZZ(theta), &[a, b]) => self.rzz(*theta, a, b),
            (G::RXX(theta), &[a, b]) => {
                let h = single(&G::H);
                self.apply_1q(&h, a);
                self.apply_1q(&h, b);
                self.rzz(*theta, a, b);
                self.apply_1q(&h, a);
                self.apply_1q(&h, b);
            }
            // Same unitary as a CX between the outer qubits.
            (G::Bridge, &[c, _, t]) => self.controlled(&single(&G::X), c, t),
            (g, _) => panic!("cannot simulate {g:?}"),
        }
    }

    fn apply_1q(&mut self, u: &Unitary2x2, t: usize) {
        let [a, b, c, d] = u.data;
        let bit = 1 << t;
        for i in 0..self.amplitudes.len() {
            if i & bit == 0 {
                let (x, y) = (self.amplitudes[i], self.amplitudes[i | bit]);
                self.amplitudes[i] = a * x + b * y;
                self.amplitudes[i | bit] = c * x + d * y;
            }
        }
    }

    fn controlled(&mut self, u: &Unitary2x2, c: usize, t: usize) {
        let [a, b, cc, d] = u.data;
        let (cbit, tbit) = (1 << c, 1 << t);
        for i in 0..self.amplitudes.len() {
            if i & cbit != 0 && i & tbit == 0 {
                let (x, y) = (self.amplitudes[i], self.amplitudes[i | tbit]);
                self.amplitudes[i] = a * x + b * y;
                self.amplitudes[i | tbit] = cc * x + d * y;
            }
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        let (abit, bbit) = (1 << a, 1 << b);
        for i in 0..self.amplitudes.len() {
            if i & abit != 0 && i & bbit == 0 {
                self.amplitudes.swap(i, i ^ abit ^ bbit);
            }
        }
    }

    fn iswap(&mut self, a: usize, b: usize) {
        self.swap(a, b);
        let (abit, bbit) = (1 << a, 1 << b);
        let i_unit = Complex64::new(0.0, 1.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & abit == 0) != (i & bbit == 0) {
                *amp *= i_unit;
            }
        }
    }

    fn rzz(&mut self, theta: f64, a: usize, b: usize) {
        let (abit, bbit) = (1 << a, 1 << b);
        let even = Complex64::from_polar(1.0, -theta / 2.0);
        let odd = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & abit == 0) == (i & bbit == 0) {
                *amp *= even;
            } else {
                *amp *= odd;
            }
        }
    }

    /// Reorder the amplitudes of a physical state into logical order.
    ///
    /// Logical qubit `q` is read from node `map[q]`; every node outside the
    /// image of `map` must hold |0>, otherwise `None` is returned.
    pub fn project(&self, map: &QubitMap, logical: &[QubitId]) -> Option<Vec<Complex64>> {
        let nodes: Vec<usize> = logical
            .iter()
            .map(|&q| map.physical(q).expect("every logical qubit is mapped"))
            .collect();
        let used: usize = nodes.iter().map(|&p| 1 << p).sum();

        let mut out = vec![Complex64::new(0.0, 0.0); 1 << logical.len()];
        for (i, &amp) in self.amplitudes.iter().enumerate() {
            if i & !used != 0 {
                if amp.norm() > TOLERANCE {
                    return None;
                }
                continue;
            }
            let mut j = 0;
            for (k, &p) in nodes.iter().enumerate() {
                if i & (1 << p) != 0 {
                    j |= 1 << k;
                }
            }
            out[j] = amp;
        }
        debug_assert!(self.num_qubits >= logical.len());
        Some(out)
    }
}

fn single(gate: &StandardGate) -> Unitary2x2 {
    Unitary2x2::from_gate(gate).unwrap_or_else(|| panic!("{gate:?} is not a single-qubit gate"))
}

/// Whether two states agree up to a global phase.
pub fn same_up_to_phase(a: &[Complex64], b: &[Complex64]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let overlap: Complex64 = a.iter().zip(b).map(|(x, y)| x.conj() * y).sum();
    (overlap.norm() - 1.0).abs() < 1e-6
}

/// Whether `routed` implements `logical` on `device`.
///
/// Simulates both circuits (after a fingerprint prefix applied to the
/// logical circuit before routing) and compares the logical state with the
/// physical one read through the final map.
pub fn equivalent(logical: &Circuit, routed: &Circuit, final_map: &QubitMap, device: &DeviceGraph) -> bool {
    let qubits: Vec<QubitId> = logical.qubits().collect();
    let mut expected = StateVector::new(qubits.len());
    expected.run(&reindexed(logical, &qubits));

    let mut actual = StateVector::new(device.num_nodes());
    actual.run(routed);

    actual
        .project(final_map, &qubits)
        .is_some_and(|state| same_up_to_phase(expected.amplitudes(), &state))
}

/// Rename declared qubits onto `0..n` so the logical state is dense.
fn reindexed(circuit: &Circuit, qubits: &[QubitId]) -> Circuit {
    let mut out = Circuit::with_size(circuit.name(), qubits.len() as u32, 0);
    for op in circuit.instructions() {
        let renamed = op.map_qubits(|q| {
            let k = qubits
                .iter()
                .position(|&d| d == q)
                .expect("operand is declared");
            QubitId(k as u32)
        });
        out.apply(renamed).unwrap();
    }
    out
}

/// Every invariant a routing result must satisfy for `logical`.
///
/// `logical` must already carry its fingerprint prefix.
pub fn assert_routed(logical: &Circuit, routed: &RoutedCircuit, device: &DeviceGraph) {
    assert!(
        valid_connectivity(&routed.circuit, device, false),
        "routed circuit violates connectivity"
    );
    for q in logical.qubits() {
        let start = routed.initial_map.physical(q).expect("initial map covers every qubit");
        let end = routed.final_map.physical(q).expect("final map covers every qubit");
        assert_eq!(
            routed.circuit.permuted(QubitId::from_index(start)),
            QubitId::from_index(end),
            "implicit permutation disagrees with the final map for {q}"
        );
    }
    assert!(
        equivalent(logical, &routed.circuit, &routed.final_map, device),
        "routed circuit is not equivalent"
    );
}
