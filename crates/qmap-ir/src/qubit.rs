//! Logical qubit and classical bit identifiers.
//!
//! Both identifiers are opaque to the router. In a physical circuit
//! (see [`CircuitLevel::Physical`](crate::CircuitLevel)) a [`QubitId`]
//! is reinterpreted as the dense index of a device node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a qubit wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Build the wire id that addresses device node `index`.
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    pub fn from_index(index: usize) -> Self {
        QubitId(index as u32)
    }

    /// The raw id as a `usize`, i.e. the device node index on physical circuits.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Identifier of a classical bit wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A wire of a circuit: either quantum or classical.
///
/// Classical wires order measurements against the gates conditioned on
/// their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Wire {
    /// A qubit wire.
    Qubit(QubitId),
    /// A classical bit wire.
    Clbit(ClbitId),
}

impl From<QubitId> for Wire {
    fn from(q: QubitId) -> Self {
        Wire::Qubit(q)
    }
}

impl From<ClbitId> for Wire {
    fn from(c: ClbitId) -> Self {
        Wire::Clbit(c)
    }
}
