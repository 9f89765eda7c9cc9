//! Connectivity checks for physical circuits.

use qmap_ir::{Circuit, Instruction, StandardGate};

use crate::device::DeviceGraph;
use crate::error::{RouteError, RouteResult};

/// Whether every gate of `circuit` fits the device.
///
/// Two-qubit gates must sit on an edge, an ordered one when `directed`.
/// A `bridge` passes when both of its hops are edges. Wider gates never
/// pass; non-gate instructions always do.
pub fn valid_connectivity(circuit: &Circuit, device: &DeviceGraph, directed: bool) -> bool {
    verify_connectivity(circuit, device, directed).is_ok()
}

/// Like [`valid_connectivity`], reporting the first offending instruction.
pub fn verify_connectivity(
    circuit: &Circuit,
    device: &DeviceGraph,
    directed: bool,
) -> RouteResult<()> {
    for (index, op) in circuit.instructions().iter().enumerate() {
        if !fits(op, device, directed) {
            let nodes: Vec<usize> = op.qubits.iter().map(|q| q.index()).collect();
            return Err(RouteError::ConnectivityViolation(format!(
                "instruction {index} '{}' on nodes {nodes:?}",
                op.name()
            )));
        }
    }
    Ok(())
}

fn fits(op: &Instruction, device: &DeviceGraph, directed: bool) -> bool {
    let n = device.num_nodes();
    if op.qubits.iter().any(|q| q.index() >= n) {
        return false;
    }
    if !op.is_gate() {
        return true;
    }
    let edge = |a: usize, b: usize| {
        if directed {
            device.has_edge_ordered(a, b)
        } else {
            device.has_edge(a, b)
        }
    };
    match (op.qubits.as_slice(), op.as_standard_gate()) {
        ([_], _) => true,
        ([a, b], _) => edge(a.index(), b.index()),
        ([c, m, t], Some(StandardGate::Bridge)) => {
            edge(c.index(), m.index()) && edge(m.index(), t.index())
        }
        _ => false,
    }
}
