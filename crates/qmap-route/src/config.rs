//! Tunable routing parameters.

use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// Scoring and termination parameters of the routing engine.
///
/// The constants are policy, not semantics: any valid configuration yields
/// a connectivity-valid, equivalent circuit; they only trade SWAP count
/// against runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Two-qubit interactions per qubit considered beyond the front.
    pub lookahead: usize,
    /// Maximum layer (counted from the front) of a lookahead interaction.
    pub max_depth: usize,
    /// Weight multiplier applied per lookahead layer, in `(0, 1]`.
    pub decay: f64,
    /// Weight of the whole lookahead term relative to the front.
    pub extended_weight: f64,
    /// Allow BRIDGE insertion for distance-2 CX gates.
    pub bridge: bool,
    /// Resolutions without an emitted gate before forcing progress.
    pub stall_limit: usize,
    /// Append a SWAP network returning every qubit to its initial node.
    pub restore_permutation: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            lookahead: 4,
            max_depth: 20,
            decay: 0.5,
            extended_weight: 0.5,
            bridge: false,
            stall_limit: 10,
            restore_permutation: false,
        }
    }
}

impl RoutingConfig {
    /// Set the per-qubit lookahead.
    #[must_use]
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Enable or disable BRIDGE insertion.
    #[must_use]
    pub fn with_bridge(mut self, bridge: bool) -> Self {
        self.bridge = bridge;
        self
    }

    /// Enable or disable final permutation restoration.
    #[must_use]
    pub fn with_restore_permutation(mut self, restore: bool) -> Self {
        self.restore_permutation = restore;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> RouteResult<()> {
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(RouteError::InvalidConfiguration(format!(
                "decay must be in (0, 1], got {}",
                self.decay
            )));
        }
        if !(self.extended_weight.is_finite() && self.extended_weight >= 0.0) {
            return Err(RouteError::InvalidConfiguration(format!(
                "extended_weight must be finite and non-negative, got {}",
                self.extended_weight
            )));
        }
        if self.max_depth == 0 && self.lookahead > 0 {
            return Err(RouteError::InvalidConfiguration(
                "max_depth must be positive when lookahead is enabled".into(),
            ));
        }
        Ok(())
    }
}
