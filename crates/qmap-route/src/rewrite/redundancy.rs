//! Peephole cleanup after routing.
//!
//! A single forward sweep keeps, per qubit, a stack of the surviving
//! instructions on that wire. A new gate is compared with the instruction
//! on top of all of its wires; when both act on the same qubits they may
//! cancel (inverse pairs, single-qubit products equal to the identity) or
//! merge (co-axial rotations). Because cancelled gates are popped, chains
//! such as `H X X H` collapse completely.
//!
//! Conditioned gates, measurements, resets, barriers and custom gates are
//! never removed and block cancellation across them.

use std::f64::consts::PI;

use rustc_hash::FxHashMap;
use tracing::debug;

use qmap_ir::{Circuit, Instruction, QubitId, StandardGate};

use crate::error::RouteResult;
use crate::unitary::Unitary2x2;

/// Tolerance for zero rotations.
const EPSILON: f64 = 1e-10;

/// What two adjacent gates on the same qubits reduce to.
enum Combined {
    /// Identity, up to the given global phase.
    Cancel(f64),
    /// A single gate on the earlier gate's operands.
    Merge(StandardGate),
}

/// Remove adjacent inverse pairs, merge adjacent rotations and drop
/// identities. The implicit permutation and declarations are kept; the
/// global phase absorbs any phase of removed products.
pub fn remove_redundancies(circuit: &Circuit) -> RouteResult<Circuit> {
    let mut kept: Vec<Option<Instruction>> = Vec::with_capacity(circuit.num_ops());
    let mut wires: FxHashMap<QubitId, Vec<usize>> = FxHashMap::default();
    let mut phase = circuit.global_phase();
    let mut removed = 0usize;

    for op in circuit.instructions() {
        if let Some(p) = free_gate(op).and_then(identity_phase) {
            phase += p;
            removed += 1;
            continue;
        }

        if let Some(j) = previous_on_same_qubits(&kept, &wires, op) {
            let combined = match (&kept[j], free_gate(op)) {
                (Some(prev), Some(gate)) => free_gate(prev).and_then(|prev_gate| {
                    combine(prev_gate, &prev.qubits, gate, &op.qubits)
                }),
                _ => None,
            };
            match combined {
                Some(Combined::Cancel(p)) => {
                    phase += p;
                    removed += 2;
                    pop(&mut kept, &mut wires, j);
                    continue;
                }
                Some(Combined::Merge(gate)) => {
                    removed += 1;
                    if let Some(p) = identity_phase(&gate) {
                        phase += p;
                        removed += 1;
                        pop(&mut kept, &mut wires, j);
                    } else if let Some(prev) = kept[j].take() {
                        kept[j] = Some(Instruction::gate(gate, prev.qubits));
                    }
                    continue;
                }
                None => {}
            }
        }

        for &q in &op.qubits {
            wires.entry(q).or_default().push(kept.len());
        }
        kept.push(Some(op.clone()));
    }

    debug!(removed, "removed redundant gates");
    let mut out = circuit.clone();
    out.splice(0..out.num_ops(), kept.into_iter().flatten())?;
    out.set_global_phase(normalize_phase(phase));
    Ok(out)
}

/// The standard gate of an unconditioned gate instruction.
fn free_gate(op: &Instruction) -> Option<&StandardGate> {
    if op.condition().is_some() {
        return None;
    }
    op.as_standard_gate()
}

/// Index of the surviving instruction on top of every wire of `op`, if it
/// is the same for all of them and acts on exactly the same qubits.
fn previous_on_same_qubits(
    kept: &[Option<Instruction>],
    wires: &FxHashMap<QubitId, Vec<usize>>,
    op: &Instruction,
) -> Option<usize> {
    let first = *op.qubits.first()?;
    let j = *wires.get(&first)?.last()?;
    let all_on_top = op
        .qubits
        .iter()
        .all(|q| wires.get(q).and_then(|s| s.last()) == Some(&j));
    let prev = kept[j].as_ref()?;
    let same_qubits = prev.qubits.len() == op.qubits.len()
        && op.qubits.iter().all(|q| prev.qubits.contains(q));
    (all_on_top && same_qubits).then_some(j)
}

fn pop(kept: &mut [Option<Instruction>], wires: &mut FxHashMap<QubitId, Vec<usize>>, j: usize) {
    if let Some(prev) = kept[j].take() {
        for q in &prev.qubits {
            if let Some(stack) = wires.get_mut(q) {
                stack.pop();
            }
        }
    }
}

/// Reduce `prev` followed by `next`, both on the same qubit set.
fn combine(
    prev: &StandardGate,
    prev_qubits: &[QubitId],
    next: &StandardGate,
    next_qubits: &[QubitId],
) -> Option<Combined> {
    let aligned = prev_qubits == next_qubits || (prev.is_symmetric() && next.is_symmetric());
    if !aligned {
        return None;
    }

    if prev.inverse().as_ref() == Some(next) {
        return Some(Combined::Cancel(0.0));
    }

    use StandardGate as G;
    let merged = match (prev, next) {
        (G::Rx(a), G::Rx(b)) => Some(G::Rx(a + b)),
        (G::Ry(a), G::Ry(b)) => Some(G::Ry(a + b)),
        (G::Rz(a), G::Rz(b)) => Some(G::Rz(a + b)),
        (G::P(a), G::P(b)) => Some(G::P(a + b)),
        (G::CP(a), G::CP(b)) => Some(G::CP(a + b)),
        (G::CRz(a), G::CRz(b)) => Some(G::CRz(a + b)),
        (G::RXX(a), G::RXX(b)) => Some(G::RXX(a + b)),
        (G::RZZ(a), G::RZZ(b)) => Some(G::RZZ(a + b)),
        _ => None,
    };
    if let Some(gate) = merged {
        return Some(Combined::Merge(gate));
    }

    let (u, v) = (Unitary2x2::from_gate(prev)?, Unitary2x2::from_gate(next)?);
    (v * u).identity_phase().map(Combined::Cancel)
}

/// Global phase of a gate equal to the identity, if it is one.
fn identity_phase(gate: &StandardGate) -> Option<f64> {
    use StandardGate as G;
    match *gate {
        G::CP(a) => is_zero_mod(a, 2.0 * PI).then_some(0.0),
        G::CRz(a) | G::RXX(a) | G::RZZ(a) => is_zero_mod(a, 4.0 * PI).then_some(0.0),
        _ => Unitary2x2::from_gate(gate).and_then(|u| u.identity_phase()),
    }
}

fn is_zero_mod(angle: f64, period: f64) -> bool {
    let r = angle.rem_euclid(period);
    r < EPSILON || period - r < EPSILON
}

fn normalize_phase(phase: f64) -> f64 {
    let p = phase.rem_euclid(2.0 * PI);
    if p > PI { p - 2.0 * PI } else { p }
}
