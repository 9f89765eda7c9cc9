//! Logical-to-physical qubit maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use qmap_ir::QubitId;

use crate::error::{RouteError, RouteResult};

/// A partial injective map from logical qubits to device node indices.
///
/// Both directions are kept in ordered maps so iteration is
/// deterministic. Serialized as a list of `(logical, node)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<(QubitId, usize)>", try_from = "Vec<(QubitId, usize)>")]
pub struct QubitMap {
    logical_to_physical: BTreeMap<QubitId, usize>,
    physical_to_logical: BTreeMap<usize, QubitId>,
}

impl QubitMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map logical qubit `i` to node `i` for `i < n`.
    pub fn trivial(n: usize) -> Self {
        let mut map = Self::new();
        for i in 0..n {
            map.logical_to_physical.insert(QubitId::from_index(i), i);
            map.physical_to_logical.insert(i, QubitId::from_index(i));
        }
        map
    }

    /// Map `logical` to `physical`.
    ///
    /// Fails if the qubit is already mapped elsewhere or the node is taken,
    /// since either would break injectivity.
    pub fn assign(&mut self, logical: QubitId, physical: usize) -> RouteResult<()> {
        if let Some(&current) = self.logical_to_physical.get(&logical) {
            if current == physical {
                return Ok(());
            }
            return Err(RouteError::InvariantViolation(format!(
                "{logical} already mapped to node {current}"
            )));
        }
        if let Some(&occupant) = self.physical_to_logical.get(&physical) {
            return Err(RouteError::InvariantViolation(format!(
                "node {physical} already holds {occupant}"
            )));
        }
        self.logical_to_physical.insert(logical, physical);
        self.physical_to_logical.insert(physical, logical);
        Ok(())
    }

    /// Node currently holding `logical`.
    #[inline]
    pub fn physical(&self, logical: QubitId) -> Option<usize> {
        self.logical_to_physical.get(&logical).copied()
    }

    /// Logical qubit currently on `physical`.
    #[inline]
    pub fn logical(&self, physical: usize) -> Option<QubitId> {
        self.physical_to_logical.get(&physical).copied()
    }

    /// Whether `logical` is mapped.
    pub fn contains(&self, logical: QubitId) -> bool {
        self.logical_to_physical.contains_key(&logical)
    }

    /// Whether no logical qubit sits on `physical`.
    #[inline]
    pub fn is_free(&self, physical: usize) -> bool {
        !self.physical_to_logical.contains_key(&physical)
    }

    /// Exchange the occupants (either may be empty) of two nodes.
    pub fn swap_physical(&mut self, a: usize, b: usize) {
        let la = self.physical_to_logical.remove(&a);
        let lb = self.physical_to_logical.remove(&b);
        if let Some(l) = la {
            self.physical_to_logical.insert(b, l);
            self.logical_to_physical.insert(l, b);
        }
        if let Some(l) = lb {
            self.physical_to_logical.insert(a, l);
            self.logical_to_physical.insert(l, a);
        }
    }

    /// Number of mapped qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// `(logical, physical)` pairs in ascending logical order.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, usize)> + '_ {
        self.logical_to_physical.iter().map(|(&l, &p)| (l, p))
    }

    /// Occupied nodes in ascending order.
    pub fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        self.physical_to_logical.keys().copied()
    }
}

impl From<QubitMap> for Vec<(QubitId, usize)> {
    fn from(map: QubitMap) -> Self {
        map.logical_to_physical.into_iter().collect()
    }
}

impl TryFrom<Vec<(QubitId, usize)>> for QubitMap {
    type Error = RouteError;

    fn try_from(pairs: Vec<(QubitId, usize)>) -> RouteResult<Self> {
        let mut map = QubitMap::new();
        for (logical, physical) in pairs {
            map.assign(logical, physical)?;
        }
        Ok(map)
    }
}

impl FromIterator<(QubitId, usize)> for QubitMap {
    /// Collect pairs, keeping the first claim on every qubit and node.
    fn from_iter<I: IntoIterator<Item = (QubitId, usize)>>(iter: I) -> Self {
        let mut map = QubitMap::new();
        for (logical, physical) in iter {
            let _ = map.assign(logical, physical);
        }
        map
    }
}
