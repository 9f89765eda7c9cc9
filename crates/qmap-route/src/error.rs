//! Error types for the routing crate.

use qmap_ir::{IrError, QubitId};
use thiserror::Error;

/// Errors that can occur during placement, routing and rewriting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouteError {
    /// Error from the IR crate, e.g. an undeclared logical qubit.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Malformed device description.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Node not present in the device graph.
    #[error("Unknown node {0}")]
    UnknownNode(String),

    /// Circuit too large for the device.
    #[error("Circuit requires {required} qubits but device only has {available}")]
    InsufficientQubits { required: usize, available: usize },

    /// Invalid routing or pass configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A pass needing the device ran without one.
    #[error("Missing device graph")]
    MissingDevice,

    /// No routing method could act on a blocked window.
    #[error("Routing deadlock: no routing method can act on {pending} blocked interaction(s)")]
    RoutingDeadlock { pending: usize },

    /// A blocking interaction spans two connected components.
    #[error("Qubits {a} and {b} sit on disconnected nodes {node_a} and {node_b}")]
    DisconnectedQubits {
        a: QubitId,
        b: QubitId,
        node_a: usize,
        node_b: usize,
    },

    /// Operation the router cannot handle.
    #[error("Unsupported operation '{name}' on {num_qubits} qubits")]
    UnsupportedOperation { name: String, num_qubits: usize },

    /// Asymmetric gate against the direction of a directed edge.
    #[error("Gate '{name}' cannot be reversed onto directed edge ({target}, {control})")]
    UnsupportedDirection {
        name: String,
        control: usize,
        target: usize,
    },

    /// A routing method returned a replacement the engine cannot apply.
    #[error("Routing method '{method}' failed: {reason}")]
    MethodFailed { method: String, reason: String },

    /// Internal consistency violated; always a bug.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Post-condition check found a gate off the device edges.
    #[error("Connectivity violation: {0}")]
    ConnectivityViolation(String),
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
