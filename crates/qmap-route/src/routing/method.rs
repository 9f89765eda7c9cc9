//! The routing-method extension point.

use qmap_ir::{Instruction, QubitId, StandardGate};

use crate::device::DeviceGraph;
use crate::error::RouteResult;
use crate::routing::window::RoutingWindow;

/// A strategy that can unblock a routing window.
///
/// The engine offers every blocked window to its methods in priority
/// order; the first whose [`can_act`](Self::can_act) returns `true` is
/// asked for a [`Replacement`]. Methods only observe the window and the
/// device, never the rest of the circuit, so they compose freely.
pub trait RoutingMethod: Send + Sync {
    /// Get the name of this method.
    fn name(&self) -> &str;

    /// Whether this method can make progress on `window`.
    fn can_act(&self, window: &RoutingWindow<'_>, device: &DeviceGraph) -> bool;

    /// Produce the edit for `window`.
    ///
    /// Only called after `can_act` returned `true`. Errors are propagated
    /// to the caller of `route` unmodified.
    fn act(&self, window: &RoutingWindow<'_>, device: &DeviceGraph) -> RouteResult<Replacement>;
}

/// The edit a routing method applies at the frontier.
///
/// The engine applies the parts in field order: newly fixed qubits are
/// placed, `ops` are emitted, `consumed` window gates are marked routed,
/// and finally the map is updated by the `permutation` transpositions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replacement {
    /// Physical instructions to emit; operands are device node indices.
    pub ops: Vec<Instruction>,
    /// Arena indices of window gates implemented by `ops`.
    pub consumed: Vec<usize>,
    /// Placements of previously unmapped logical qubits.
    pub relabel: Vec<(QubitId, usize)>,
    /// Node transpositions applied to the map after `ops`.
    pub permutation: Vec<(usize, usize)>,
}

impl Replacement {
    /// A single SWAP on edge `(a, b)`.
    pub fn swap(a: usize, b: usize) -> Self {
        Self::swaps([(a, b)])
    }

    /// A sequence of SWAPs applied left to right.
    pub fn swaps(edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let permutation: Vec<_> = edges.into_iter().collect();
        let ops = permutation
            .iter()
            .map(|&(a, b)| {
                Instruction::two_qubit_gate(
                    StandardGate::Swap,
                    QubitId::from_index(a),
                    QubitId::from_index(b),
                )
            })
            .collect();
        Self {
            ops,
            permutation,
            ..Self::default()
        }
    }

    /// Place unmapped qubits without emitting anything.
    pub fn relabel(pairs: impl IntoIterator<Item = (QubitId, usize)>) -> Self {
        Self {
            relabel: pairs.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether the replacement changes nothing.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
            && self.consumed.is_empty()
            && self.relabel.is_empty()
            && self.permutation.is_empty()
    }
}
