//! Bounded view of the pending suffix offered to routing methods.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use qmap_ir::{Instruction, QubitId};

use crate::layout::QubitMap;

/// A two-qubit gate inside a routing window.
#[derive(Debug, Clone, Copy)]
pub struct WindowGate<'a> {
    /// Arena index in the circuit being routed.
    pub index: usize,
    /// The logical instruction.
    pub instruction: &'a Instruction,
    /// Layer counted from the front; front gates have depth 0.
    pub depth: usize,
}

impl WindowGate<'_> {
    /// The two logical operands.
    #[inline]
    pub fn qubits(&self) -> (QubitId, QubitId) {
        (self.instruction.qubits[0], self.instruction.qubits[1])
    }
}

/// The blocked front plus a bounded lookahead.
#[derive(Debug, Clone)]
pub struct RoutingWindow<'a> {
    /// Blocking two-qubit gates, ascending by index.
    pub front: Vec<WindowGate<'a>>,
    /// Upcoming two-qubit gates, ascending by index.
    pub lookahead: Vec<WindowGate<'a>>,
    /// Current logical-to-physical map.
    pub map: &'a QubitMap,
    /// Consecutive resolutions that emitted no gate.
    pub stalled_steps: usize,
}

impl RoutingWindow<'_> {
    /// Node currently holding `qubit`.
    #[inline]
    pub fn position(&self, qubit: QubitId) -> Option<usize> {
        self.map.physical(qubit)
    }

    /// Logical qubits touched by any window gate.
    pub fn qubits(&self) -> BTreeSet<QubitId> {
        self.front
            .iter()
            .chain(&self.lookahead)
            .flat_map(|g| g.instruction.qubits.iter().copied())
            .collect()
    }

    /// Whether the window holds no gate.
    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }
}

/// Collect up to `lookahead` two-qubit gates per qubit beyond the front,
/// no deeper than `max_depth` layers.
pub(crate) fn collect_lookahead<'a>(
    ops: &'a [Instruction],
    done: &[bool],
    front: &[usize],
    lookahead: usize,
    max_depth: usize,
) -> Vec<WindowGate<'a>> {
    let Some(&start) = front.first() else {
        return vec![];
    };
    if lookahead == 0 {
        return vec![];
    }

    let front_set: BTreeSet<usize> = front.iter().copied().collect();
    let front_qubits: BTreeSet<QubitId> = front
        .iter()
        .flat_map(|&i| ops[i].qubits.iter().copied())
        .collect();

    let mut depth: FxHashMap<QubitId, usize> = FxHashMap::default();
    let mut count: FxHashMap<QubitId, usize> = FxHashMap::default();
    let mut gates = Vec::new();

    for (index, inst) in ops.iter().enumerate().skip(start) {
        if done[index] || !inst.is_two_qubit_gate() || front_set.contains(&index) {
            continue;
        }
        let (a, b) = (inst.qubits[0], inst.qubits[1]);
        let layer = 1 + depth
            .get(&a)
            .copied()
            .unwrap_or(0)
            .max(depth.get(&b).copied().unwrap_or(0));
        depth.insert(a, layer);
        depth.insert(b, layer);

        let (ca, cb) = (
            count.get(&a).copied().unwrap_or(0),
            count.get(&b).copied().unwrap_or(0),
        );
        if layer <= max_depth && (ca < lookahead || cb < lookahead) {
            *count.entry(a).or_insert(0) += 1;
            *count.entry(b).or_insert(0) += 1;
            gates.push(WindowGate {
                index,
                instruction: inst,
                depth: layer,
            });
        }

        // Front qubits past their budget or depth admit no further gates.
        let exhausted = |q: &QubitId| {
            count.get(q).copied().unwrap_or(0) >= lookahead
                || depth.get(q).copied().unwrap_or(0) > max_depth
        };
        if front_qubits.iter().all(exhausted) {
            break;
        }
    }

    gates
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmap_ir::{Circuit, QubitId};

    #[test]
    fn test_lookahead_layers() {
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap(); // front
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        circuit.h(QubitId(1)).unwrap();
        circuit.cx(QubitId(2), QubitId(3)).unwrap();
        circuit.cx(QubitId(1), QubitId(3)).unwrap();

        let ops = circuit.instructions();
        let done = vec![false; ops.len()];
        let gates = collect_lookahead(ops, &done, &[0], 4, 20);
        let layers: Vec<_> = gates.iter().map(|g| (g.index, g.depth)).collect();
        assert_eq!(layers, vec![(1, 1), (3, 2), (4, 3)]);

        let shallow = collect_lookahead(ops, &done, &[0], 4, 2);
        assert_eq!(shallow.len(), 2);

        assert!(collect_lookahead(ops, &done, &[0], 0, 20).is_empty());
    }

    #[test]
    fn test_lookahead_stops_past_max_depth() {
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap(); // front
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        // Out of reach once the front qubits are past depth 2.
        circuit.cx(QubitId(2), QubitId(3)).unwrap();

        let ops = circuit.instructions();
        let done = vec![false; ops.len()];
        let gates = collect_lookahead(ops, &done, &[0], 10, 2);
        let indices: Vec<_> = gates.iter().map(|g| g.index).collect();
        assert_eq!(indices, vec![1, 2]);

        let deep = collect_lookahead(ops, &done, &[0], 10, 20);
        assert_eq!(deep.len(), 4);
    }

    #[test]
    fn test_lookahead_stops_at_per_qubit_budget() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        for _ in 0..10 {
            circuit.cx(QubitId(0), QubitId(1)).unwrap();
        }
        let ops = circuit.instructions();
        let done = vec![false; ops.len()];
        let gates = collect_lookahead(ops, &done, &[0], 3, 20);
        assert_eq!(gates.len(), 3);
    }
}
