//! Built-in passes of the routing pipeline.

use qmap_ir::{Circuit, CircuitLevel};

use crate::config::RoutingConfig;
use crate::error::{RouteError, RouteResult};
use crate::pass::{Pass, PassKind};
use crate::placement::{PlacementStrategy, place};
use crate::property::PropertySet;
use crate::rewrite::{remove_redundancies, rewrite};
use crate::routing::{Router, RoutingStats};
use crate::verification::verify_connectivity;

/// Computes the initial map with a [`PlacementStrategy`].
///
/// Skipped when the property set already carries an initial map.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementPass {
    strategy: PlacementStrategy,
}

impl PlacementPass {
    /// Placement with `strategy`.
    pub fn new(strategy: PlacementStrategy) -> Self {
        Self { strategy }
    }

    /// The strategy used.
    pub fn strategy(&self) -> PlacementStrategy {
        self.strategy
    }
}

impl Pass for PlacementPass {
    fn name(&self) -> &'static str {
        "Placement"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> RouteResult<()> {
        let map = place(circuit, properties.device()?, self.strategy)?;
        properties.initial_map = Some(map);
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.initial_map.is_none() && properties.device.is_some()
    }
}

/// Routes the circuit onto the device.
///
/// Replaces the logical circuit by the physical one, stores the final map
/// and leaves the [`RoutingStats`] as a custom property.
pub struct RoutingPass {
    router: Router,
}

impl RoutingPass {
    /// Routing with the default method and `config`.
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            router: Router::new(config),
        }
    }

    /// Routing with a custom method list.
    pub fn from_router(router: Router) -> Self {
        Self { router }
    }
}

impl Default for RoutingPass {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl Pass for RoutingPass {
    fn name(&self) -> &'static str {
        "Routing"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> RouteResult<()> {
        if circuit.level() == CircuitLevel::Physical {
            return Err(RouteError::InvalidConfiguration(format!(
                "circuit '{}' is already routed",
                circuit.name()
            )));
        }
        let device = properties.device()?;
        let initial = properties.initial_map.clone().unwrap_or_default();
        let routed = self.router.route(circuit, device, &initial)?;

        *circuit = routed.circuit;
        properties.initial_map = Some(routed.initial_map);
        properties.final_map = Some(routed.final_map);
        properties.insert::<RoutingStats>(routed.stats);
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.device.is_some()
    }
}

/// Lowers routing placeholders and fixes gate direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewritePass;

impl Pass for RewritePass {
    fn name(&self) -> &'static str {
        "Rewrite"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> RouteResult<()> {
        let native = properties.native_gates.clone().unwrap_or_default();
        *circuit = rewrite(circuit, properties.device()?, &native)?;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, properties: &PropertySet) -> bool {
        circuit.level() == CircuitLevel::Physical && properties.device.is_some()
    }
}

/// Cancels inverse pairs and merges rotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveRedundancies;

impl Pass for RemoveRedundancies {
    fn name(&self) -> &'static str {
        "RemoveRedundancies"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> RouteResult<()> {
        *circuit = remove_redundancies(circuit)?;
        Ok(())
    }
}

/// Fails when a gate of the physical circuit is off the device edges.
///
/// By default directed devices are checked with edge direction. Before
/// rewriting, routed gates may still run against an edge, so
/// [`undirected`](Self::undirected) only checks adjacency.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityVerification {
    respect_direction: bool,
}

impl ConnectivityVerification {
    /// Verification that honours the direction of directed devices.
    pub fn new() -> Self {
        Self {
            respect_direction: true,
        }
    }

    /// Verification that only checks adjacency.
    pub fn undirected() -> Self {
        Self {
            respect_direction: false,
        }
    }

    /// Whether edge direction is checked on directed devices.
    pub fn respects_direction(&self) -> bool {
        self.respect_direction
    }
}

impl Default for ConnectivityVerification {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ConnectivityVerification {
    fn name(&self) -> &'static str {
        "ConnectivityVerification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> RouteResult<()> {
        let device = properties.device()?;
        verify_connectivity(
            circuit,
            device,
            self.respect_direction && device.is_directed(),
        )
    }

    fn should_run(&self, circuit: &Circuit, _properties: &PropertySet) -> bool {
        circuit.level() == CircuitLevel::Physical
    }
}
