//! Pass manager for orchestrating placement, routing and rewriting.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use qmap_ir::Circuit;

use crate::config::RoutingConfig;
use crate::device::DeviceGraph;
use crate::error::RouteResult;
use crate::pass::Pass;
use crate::passes::{
    ConnectivityVerification, PlacementPass, RemoveRedundancies, RewritePass, RoutingPass,
};
use crate::placement::PlacementStrategy;
use crate::property::PropertySet;
use crate::rewrite::NativeGates;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on `circuit`.
    #[instrument(skip(self, circuit, properties), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> RouteResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, depth: {}, ops: {}",
            circuit.depth(),
            circuit.num_ops()
        );

        Ok(())
    }

    /// Names of the passes in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard placement/routing pipeline.
pub struct PassManagerBuilder {
    /// Optimization level (0-3).
    optimization_level: u8,
    placement: PlacementStrategy,
    routing: RoutingConfig,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            placement: PlacementStrategy::default(),
            routing: RoutingConfig::default(),
            properties: PropertySet::new(),
        }
    }

    /// Set the optimization level.
    ///
    /// - Level 0: placement and routing only; SWAP and BRIDGE stay in
    ///   the output
    /// - Level 1: lower placeholders to native gates and fix direction
    ///   (default)
    /// - Level 2 and 3: also remove redundant gates
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    /// Set the placement strategy.
    #[must_use]
    pub fn with_placement(mut self, strategy: PlacementStrategy) -> Self {
        self.placement = strategy;
        self
    }

    /// Set the routing configuration.
    #[must_use]
    pub fn with_routing(mut self, config: RoutingConfig) -> Self {
        self.routing = config;
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target device and its native gates.
    #[must_use]
    pub fn with_target(mut self, device: impl Into<Arc<DeviceGraph>>, native: NativeGates) -> Self {
        self.properties.device = Some(device.into());
        self.properties.native_gates = Some(native);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        pm.add_pass(PlacementPass::new(self.placement));
        pm.add_pass(RoutingPass::new(self.routing));

        if self.optimization_level >= 1 {
            pm.add_pass(RewritePass);
        }
        if self.optimization_level >= 2 {
            pm.add_pass(RemoveRedundancies);
        }

        // Always verify last so cleanup passes cannot break connectivity.
        // Direction is only fixed by the rewrite.
        if self.optimization_level >= 1 {
            pm.add_pass(ConnectivityVerification::new());
        } else {
            pm.add_pass(ConnectivityVerification::undirected());
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
