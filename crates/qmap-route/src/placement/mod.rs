//! Initial placement of logical qubits onto device nodes.
//!
//! A placement computes the [`QubitMap`] routing starts from. Every
//! strategy yields an injective map; qubits a strategy cannot place well
//! are put on the free node nearest to an already placed interaction
//! partner, or on the lowest free node.

pub mod graph;
pub mod line;
pub mod trivial;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qmap_ir::{Circuit, InteractionGraph};

use crate::device::DeviceGraph;
use crate::error::{RouteError, RouteResult};
use crate::layout::QubitMap;

pub use graph::GraphPlacement;
pub use line::LinePlacement;
pub use trivial::TrivialPlacement;

/// Built-in placement strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Encounter order onto ascending nodes.
    Trivial,
    /// Chains of interacting qubits onto device paths.
    Line,
    /// Subgraph monomorphism of the interaction graph.
    #[default]
    Graph,
}

impl PlacementStrategy {
    /// All strategies, cheapest first.
    pub const ALL: [Self; 3] = [Self::Trivial, Self::Line, Self::Graph];

    /// Lowercase name of the strategy.
    pub fn name(self) -> &'static str {
        match self {
            Self::Trivial => "trivial",
            Self::Line => "line",
            Self::Graph => "graph",
        }
    }

    /// The placer implementing this strategy.
    pub fn placer(self) -> Box<dyn Placement> {
        match self {
            Self::Trivial => Box::new(TrivialPlacement),
            Self::Line => Box::new(LinePlacement::default()),
            Self::Graph => Box::new(GraphPlacement::default()),
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlacementStrategy {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RouteError::InvalidConfiguration(format!("unknown placement '{s}'")))
    }
}

/// A strategy computing an initial map.
pub trait Placement: Send + Sync {
    /// Get the name of this strategy.
    fn name(&self) -> &str;

    /// Compute a map for `circuit` on `device`.
    ///
    /// Callers go through [`place`], which checks capacity first.
    fn place(&self, circuit: &Circuit, device: &DeviceGraph) -> RouteResult<QubitMap>;
}

/// Compute the initial map of `circuit` on `device` with `strategy`.
#[instrument(skip_all, fields(strategy = %strategy))]
pub fn place(
    circuit: &Circuit,
    device: &DeviceGraph,
    strategy: PlacementStrategy,
) -> RouteResult<QubitMap> {
    check_capacity(circuit, device)?;
    let map = strategy.placer().place(circuit, device)?;
    debug!(placed = map.len(), qubits = circuit.num_qubits(), "initial placement");
    Ok(map)
}

/// Fail with `InsufficientQubits` when the circuit cannot fit.
pub fn check_capacity(circuit: &Circuit, device: &DeviceGraph) -> RouteResult<()> {
    if circuit.num_qubits() > device.num_nodes() {
        return Err(RouteError::InsufficientQubits {
            required: circuit.num_qubits(),
            available: device.num_nodes(),
        });
    }
    Ok(())
}

/// Place every qubit `map` misses, in encounter order.
///
/// A qubit goes to the free node closest to its first placed partner,
/// otherwise to the lowest free node.
pub(crate) fn complete_map(
    map: &mut QubitMap,
    circuit: &Circuit,
    device: &DeviceGraph,
    interactions: &InteractionGraph,
) -> RouteResult<()> {
    for qubit in circuit.encounter_order() {
        if map.contains(qubit) {
            continue;
        }
        let partner = interactions
            .neighbors(qubit)
            .into_iter()
            .find_map(|partner| map.physical(partner));
        let node = partner
            .and_then(|p| device.nearest(p, |n| map.is_free(n)))
            .or_else(|| (0..device.num_nodes()).find(|&n| map.is_free(n)))
            .ok_or(RouteError::InsufficientQubits {
                required: circuit.num_qubits(),
                available: device.num_nodes(),
            })?;
        map.assign(qubit, node)?;
    }
    Ok(())
}
