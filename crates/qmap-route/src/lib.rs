//! qmap Qubit Placement and Routing
//!
//! This crate maps logical circuits onto devices with restricted
//! connectivity. A device is an undirected (or directed) graph of physical
//! qubits; a two-qubit gate can only run on an edge.
//!
//! # Overview
//!
//! Mapping a circuit happens in three stages:
//! 1. **Placement**: choose an initial logical-to-physical map
//! 2. **Routing**: walk the circuit, inserting SWAP and BRIDGE gates
//!    whenever the next interactions are not adjacent
//! 3. **Rewriting**: lower the placeholders to native gates, fix gate
//!    direction and remove redundant gates
//!
//! # Architecture
//!
//! ```text
//! Logical Circuit
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (device, native gates, maps)
//! +-------------+
//!       |
//!       |-- PlacementPass      (trivial / line / graph)
//!       |-- RoutingPass        (Router + RoutingMethod list)
//!       |-- RewritePass        (swap / bridge lowering, direction)
//!       |-- RemoveRedundancies
//!       `-- ConnectivityVerification
//!       |
//!       v
//! Physical Circuit (connectivity-valid)
//! ```
//!
//! # Example: Routing a Circuit
//!
//! ```rust
//! use qmap_ir::{Circuit, QubitId};
//! use qmap_route::{DeviceGraph, PlacementStrategy, RoutingConfig, place, route, valid_connectivity};
//!
//! let mut circuit = Circuit::with_size("triangle", 3, 0);
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.cx(QubitId(1), QubitId(2)).unwrap();
//! circuit.cx(QubitId(0), QubitId(2)).unwrap();
//!
//! let device = DeviceGraph::linear(3);
//! let initial = place(&circuit, &device, PlacementStrategy::Trivial).unwrap();
//! let routed = route(&circuit, &device, &initial, &RoutingConfig::default()).unwrap();
//!
//! assert!(routed.stats.swaps >= 1);
//! assert!(valid_connectivity(&routed.circuit, &device, false));
//! ```
//!
//! # Optimization Levels
//!
//! | Level | Passes Included |
//! |-------|-----------------|
//! | 0 | Placement + Routing + Verification |
//! | 1 | + Rewrite (native lowering, direction) |
//! | 2, 3 | + Redundancy removal |
//!
//! # Routing Methods
//!
//! The router tries its [`RoutingMethod`]s in order; the first that can
//! act on the blocked window wins. [`SwapRouting`] ships as the default
//! and handles every connected device; custom methods (for example a
//! device-specific synthesis) are added with
//! [`Router::with_priority_method`].

pub mod config;
pub mod device;
pub mod error;
pub mod layout;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod placement;
pub mod property;
pub mod rewrite;
pub mod routing;
pub mod unitary;
pub mod verification;

pub use config::RoutingConfig;
pub use device::{Calibration, DeviceGraph, DeviceSpec, Node, Topology};
pub use error::{RouteError, RouteResult};
pub use layout::QubitMap;
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{
    ConnectivityVerification, PlacementPass, RemoveRedundancies, RewritePass, RoutingPass,
};
pub use placement::{Placement, PlacementStrategy, place};
pub use property::PropertySet;
pub use rewrite::{
    NativeGates, NativeTwoQubitGate, decompose_bridge, decompose_swap, fix_direction,
    remove_redundancies, rewrite,
};
pub use routing::{
    Replacement, RoutedCircuit, Router, RoutingMethod, RoutingState, RoutingStats,
    RoutingWindow, SwapRouting, WindowGate, route,
};
pub use verification::{valid_connectivity, verify_connectivity};
