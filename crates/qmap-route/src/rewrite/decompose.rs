//! Lowering of routing placeholders to native two-qubit gates.

use qmap_ir::{ClassicalCondition, Gate, Instruction, QubitId, StandardGate};

use crate::rewrite::{NativeGates, NativeTwoQubitGate};

/// Build a gate instruction carrying `condition`.
pub(crate) fn conditioned(
    gate: StandardGate,
    qubits: impl IntoIterator<Item = QubitId>,
    condition: Option<&ClassicalCondition>,
) -> Instruction {
    let gate = match condition {
        Some(c) => Gate::standard(gate).with_condition(c.clone()),
        None => Gate::standard(gate),
    };
    Instruction::gate(gate, qubits)
}

/// A CX in the native two-qubit primitive.
pub fn native_cx(
    control: QubitId,
    target: QubitId,
    native: NativeTwoQubitGate,
    condition: Option<&ClassicalCondition>,
) -> Vec<Instruction> {
    match native {
        NativeTwoQubitGate::Cx => vec![conditioned(StandardGate::CX, [control, target], condition)],
        NativeTwoQubitGate::Cz => vec![
            conditioned(StandardGate::H, [target], condition),
            conditioned(StandardGate::CZ, [control, target], condition),
            conditioned(StandardGate::H, [target], condition),
        ],
    }
}

/// Lower a SWAP to three alternating CX (or the native equivalent).
///
/// The first and last CX use the operand order of `op`. Anything that is
/// not a SWAP, and SWAPs on devices with a native SWAP, pass through.
pub fn decompose_swap(op: &Instruction, native: &NativeGates) -> Vec<Instruction> {
    if op.as_standard_gate() != Some(&StandardGate::Swap) || native.native_swap {
        return vec![op.clone()];
    }
    let (a, b) = (op.qubits[0], op.qubits[1]);
    let condition = op.condition();
    [(a, b), (b, a), (a, b)]
        .into_iter()
        .flat_map(|(c, t)| native_cx(c, t, native.two_qubit, condition))
        .collect()
}

/// Lower `BRIDGE(c, m, t)` to `CX(c,m) CX(m,t) CX(c,m) CX(m,t)`.
///
/// The sequence acts as `CX(c, t)` and leaves the middle qubit unchanged.
pub fn decompose_bridge(op: &Instruction, native: &NativeGates) -> Vec<Instruction> {
    if op.as_standard_gate() != Some(&StandardGate::Bridge) {
        return vec![op.clone()];
    }
    let (c, m, t) = (op.qubits[0], op.qubits[1], op.qubits[2]);
    let condition = op.condition();
    [(c, m), (m, t), (c, m), (m, t)]
        .into_iter()
        .flat_map(|(x, y)| native_cx(x, y, native.two_qubit, condition))
        .collect()
}
