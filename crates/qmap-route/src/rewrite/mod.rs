//! Post-routing rewriting.
//!
//! Routing leaves `swap` and `bridge` placeholders in the physical
//! circuit. [`rewrite`] lowers them to the device's native two-qubit gate
//! and repairs gate direction on directed devices; the result is checked
//! with [`verify_connectivity`](crate::verification::verify_connectivity).
//! [`remove_redundancies`] then cleans up what lowering leaves behind.

pub mod decompose;
pub mod direction;
pub mod redundancy;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qmap_ir::{Circuit, Instruction, StandardGate};

use crate::device::DeviceGraph;
use crate::error::RouteResult;
use crate::verification::verify_connectivity;

pub use decompose::{decompose_bridge, decompose_swap, native_cx};
pub use direction::fix_direction;
pub use redundancy::remove_redundancies;

/// The entangling primitive a device implements natively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeTwoQubitGate {
    /// Controlled-X.
    #[default]
    Cx,
    /// Controlled-Z; CX is realised as `H(t) CZ H(t)`.
    Cz,
}

/// Native gate set relevant to rewriting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeGates {
    /// Native entangling gate.
    pub two_qubit: NativeTwoQubitGate,
    /// Whether SWAP is native and left as is.
    pub native_swap: bool,
}

impl NativeGates {
    /// CZ-native device without a native SWAP.
    pub fn cz() -> Self {
        Self {
            two_qubit: NativeTwoQubitGate::Cz,
            native_swap: false,
        }
    }
}

/// Lower placeholders and fix gate direction.
///
/// The implicit permutation and global phase of `circuit` are kept.
#[instrument(skip_all, fields(ops = circuit.num_ops()))]
pub fn rewrite(circuit: &Circuit, device: &DeviceGraph, native: &NativeGates) -> RouteResult<Circuit> {
    let mut lowered = Vec::with_capacity(circuit.num_ops());
    for op in circuit.instructions() {
        let op = orient_swap(op, device);
        for step in decompose_swap(&op, native) {
            for low in decompose_bridge(&step, native) {
                lowered.extend(fix_direction(&low, device)?);
            }
        }
    }
    debug!(lowered = lowered.len(), "lowered routing placeholders");

    let mut out = circuit.clone();
    out.splice(0..out.num_ops(), lowered)?;
    verify_connectivity(&out, device, device.is_directed())?;
    Ok(out)
}

/// Order SWAP operands so most of its CX follow a directed edge.
fn orient_swap(op: &Instruction, device: &DeviceGraph) -> Instruction {
    if device.is_directed() && op.as_standard_gate() == Some(&StandardGate::Swap) {
        let (a, b) = (op.qubits[0].index(), op.qubits[1].index());
        if !device.has_edge_ordered(a, b) && device.has_edge_ordered(b, a) {
            let mut reversed = op.clone();
            reversed.qubits.swap(0, 1);
            return reversed;
        }
    }
    op.clone()
}
