//! Orientation repair for directed devices.

use std::f64::consts::FRAC_PI_4;

use qmap_ir::{ClassicalCondition, Instruction, QubitId, StandardGate};

use crate::device::DeviceGraph;
use crate::error::{RouteError, RouteResult};
use crate::rewrite::decompose::conditioned;

/// Make a two-qubit gate follow the device's edge direction.
///
/// On undirected devices, and for gates that already follow an edge, the
/// gate is returned unchanged. Symmetric gates have their operands
/// swapped. A reversed CX is conjugated with Hadamards on both operands;
/// CY, CH and CRz are rewritten around a reversed CX, CZ or CP with
/// single-qubit basis changes. Other asymmetric gates cannot be reversed.
pub fn fix_direction(op: &Instruction, device: &DeviceGraph) -> RouteResult<Vec<Instruction>> {
    if !device.is_directed() || !op.is_two_qubit_gate() {
        return Ok(vec![op.clone()]);
    }
    let (a, b) = (op.qubits[0], op.qubits[1]);
    let (pa, pb) = (a.index(), b.index());
    if device.has_edge_ordered(pa, pb) {
        return Ok(vec![op.clone()]);
    }
    if !device.has_edge_ordered(pb, pa) {
        return Err(RouteError::ConnectivityViolation(format!(
            "'{}' on non-adjacent nodes {pa} and {pb}",
            op.name()
        )));
    }

    let condition = op.condition();
    let gate = |g: StandardGate, qubits: &[QubitId]| conditioned(g, qubits.iter().copied(), condition);
    let ops = match op.as_standard_gate() {
        Some(StandardGate::CX) => reversed_cx(a, b, condition),
        Some(StandardGate::CY) => {
            // Y = S X Sdg on the target.
            let mut ops = vec![gate(StandardGate::Sdg, &[b])];
            ops.extend(reversed_cx(a, b, condition));
            ops.push(gate(StandardGate::S, &[b]));
            ops
        }
        Some(StandardGate::CH) => {
            // H = Ry(pi/4) Z Ry(-pi/4) on the target.
            vec![
                gate(StandardGate::Ry(-FRAC_PI_4), &[b]),
                gate(StandardGate::CZ, &[b, a]),
                gate(StandardGate::Ry(FRAC_PI_4), &[b]),
            ]
        }
        Some(StandardGate::CRz(theta)) => {
            // CRz(t) = CP(t) with P(-t/2) on the control.
            vec![
                gate(StandardGate::CP(*theta), &[b, a]),
                gate(StandardGate::P(-theta / 2.0), &[a]),
            ]
        }
        Some(g) if g.is_symmetric() => {
            let mut reversed = op.clone();
            reversed.qubits.swap(0, 1);
            vec![reversed]
        }
        _ => {
            return Err(RouteError::UnsupportedDirection {
                name: op.name().to_string(),
                control: pa,
                target: pb,
            });
        }
    };
    Ok(ops)
}

/// CX from `control` to `target` run on the opposite edge.
fn reversed_cx(
    control: QubitId,
    target: QubitId,
    condition: Option<&ClassicalCondition>,
) -> Vec<Instruction> {
    let h = |q| conditioned(StandardGate::H, [q], condition);
    vec![
        h(control),
        h(target),
        conditioned(StandardGate::CX, [target, control], condition),
        h(control),
        h(target),
    ]
}
