//! Trivial placement.

use qmap_ir::Circuit;

use crate::device::DeviceGraph;
use crate::error::RouteResult;
use crate::layout::QubitMap;
use crate::placement::Placement;

/// Maps logical qubits onto nodes `0, 1, 2, ...` in the order they first
/// appear in the circuit; idle qubits follow in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialPlacement;

impl Placement for TrivialPlacement {
    fn name(&self) -> &'static str {
        "trivial"
    }

    fn place(&self, circuit: &Circuit, device: &DeviceGraph) -> RouteResult<QubitMap> {
        crate::placement::check_capacity(circuit, device)?;
        let mut map = QubitMap::new();
        for (node, qubit) in circuit.encounter_order().into_iter().enumerate() {
            map.assign(qubit, node)?;
        }
        Ok(map)
    }
}
