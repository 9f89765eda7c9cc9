//! The routing engine.
//!
//! Routing walks the logical circuit in program order with one cursor per
//! wire. An instruction is *ready* when it sits at the head of all of its
//! wires. The engine alternates between two states:
//!
//! - **Scanning** emits every ready instruction that is already valid on
//!   the device: anything that is not a two-qubit gate, and two-qubit
//!   gates whose operands sit on adjacent nodes. Blocked gates stop their
//!   wires and form the *front*.
//! - **Resolving** offers a bounded window (the front plus a lookahead)
//!   to the routing methods in priority order and applies the first
//!   replacement it gets.
//!
//! Once every instruction has been emitted the engine is **Done**: idle
//! qubits receive the lowest free nodes and the output circuit records the
//! implicit permutation between each wire's initial and final node.

pub mod method;
pub mod permutation;
pub mod swap;
pub mod window;

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use qmap_ir::{Circuit, IrError, Instruction, QubitId, StandardGate, Wire};

use crate::config::RoutingConfig;
use crate::device::{DeviceGraph, UNREACHABLE};
use crate::error::{RouteError, RouteResult};
use crate::layout::QubitMap;

pub use method::{Replacement, RoutingMethod};
pub use permutation::restore_permutation;
pub use swap::SwapRouting;
pub use window::{RoutingWindow, WindowGate};

/// States of the routing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingState {
    /// Emitting valid ready instructions.
    Scanning,
    /// Asking routing methods to unblock the front.
    Resolving,
    /// Every instruction has been emitted.
    Done,
}

/// Counters collected during one routing call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingStats {
    /// SWAP gates inserted.
    pub swaps: usize,
    /// BRIDGE gates inserted.
    pub bridges: usize,
    /// Resolving steps taken.
    pub resolutions: usize,
    /// Logical qubits placed while routing.
    pub relabels: usize,
    /// Instructions in the input circuit.
    pub ops_in: usize,
    /// Instructions in the output circuit.
    pub ops_out: usize,
}

/// Result of routing a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedCircuit {
    /// Physical circuit; `QubitId(i)` is device node `i`.
    pub circuit: Circuit,
    /// Where every logical qubit starts.
    pub initial_map: QubitMap,
    /// Where every logical qubit ends.
    pub final_map: QubitMap,
    /// Routing counters.
    pub stats: RoutingStats,
}

/// Routes circuits with an ordered list of routing methods.
pub struct Router {
    methods: Vec<Box<dyn RoutingMethod>>,
    config: RoutingConfig,
}

impl Router {
    /// A router whose only method is [`SwapRouting`].
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            methods: vec![Box::new(SwapRouting::new(config.clone()))],
            config,
        }
    }

    /// A router with no methods at all; add them with
    /// [`with_method`](Self::with_method).
    pub fn without_methods(config: RoutingConfig) -> Self {
        Self {
            methods: vec![],
            config,
        }
    }

    /// Append a method with the lowest priority.
    #[must_use]
    pub fn with_method(mut self, method: impl RoutingMethod + 'static) -> Self {
        self.methods.push(Box::new(method));
        self
    }

    /// Insert a method with the highest priority.
    #[must_use]
    pub fn with_priority_method(mut self, method: impl RoutingMethod + 'static) -> Self {
        self.methods.insert(0, Box::new(method));
        self
    }

    /// Names of the methods in priority order.
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name()).collect()
    }

    /// The routing configuration.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Route `circuit` onto `device`, starting from `initial_map`.
    ///
    /// Qubits missing from `initial_map` are placed when first needed.
    /// The input circuit is never modified; on error nothing is returned.
    #[instrument(skip_all, fields(circuit = circuit.name(), nodes = device.num_nodes()))]
    pub fn route(
        &self,
        circuit: &Circuit,
        device: &DeviceGraph,
        initial_map: &QubitMap,
    ) -> RouteResult<RoutedCircuit> {
        self.config.validate()?;
        check_input(circuit, device, initial_map)?;

        let mut engine = Engine::new(circuit, device, &self.config, initial_map.clone());
        engine.run(&self.methods)?;
        let mut routed = engine.finish()?;

        if self.config.restore_permutation {
            let added = routed.restore_permutation(device)?;
            debug!(swaps = added, "restored initial permutation");
        }

        info!(
            swaps = routed.stats.swaps,
            bridges = routed.stats.bridges,
            resolutions = routed.stats.resolutions,
            ops = routed.stats.ops_out,
            "routing complete"
        );
        Ok(routed)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

/// Route with the default [`SwapRouting`] method.
pub fn route(
    circuit: &Circuit,
    device: &DeviceGraph,
    initial_map: &QubitMap,
    config: &RoutingConfig,
) -> RouteResult<RoutedCircuit> {
    Router::new(config.clone()).route(circuit, device, initial_map)
}

/// Pre-conditions checked before any work is done.
fn check_input(circuit: &Circuit, device: &DeviceGraph, initial_map: &QubitMap) -> RouteResult<()> {
    circuit.validate()?;

    if circuit.num_qubits() > device.num_nodes() {
        return Err(RouteError::InsufficientQubits {
            required: circuit.num_qubits(),
            available: device.num_nodes(),
        });
    }

    for inst in circuit.instructions() {
        if inst.is_gate() && inst.qubits.len() > 2 {
            return Err(RouteError::UnsupportedOperation {
                name: inst.name().to_string(),
                num_qubits: inst.qubits.len(),
            });
        }
    }

    for (logical, physical) in initial_map.iter() {
        if !circuit.contains_qubit(logical) {
            return Err(IrError::QubitNotFound {
                qubit: logical,
                gate_name: None,
            }
            .into());
        }
        if physical >= device.num_nodes() {
            return Err(RouteError::UnknownNode(format!("node index {physical}")));
        }
    }

    Ok(())
}

/// Working state of one routing call.
struct Engine<'a> {
    circuit: &'a Circuit,
    ops: &'a [Instruction],
    device: &'a DeviceGraph,
    config: &'a RoutingConfig,
    qubit_wire: FxHashMap<QubitId, usize>,
    /// Dense wire indices touched by each instruction.
    op_wires: Vec<Vec<usize>>,
    /// Instruction indices on each wire, in program order.
    wire_ops: Vec<Vec<usize>>,
    /// Position of the first unrouted instruction on each wire.
    cursor: Vec<usize>,
    done: Vec<bool>,
    remaining: usize,
    map: QubitMap,
    initial: QubitMap,
    /// `origin[p]` is the node whose initial content now sits on `p`.
    origin: Vec<usize>,
    out: Circuit,
    stats: RoutingStats,
    state: RoutingState,
}

impl<'a> Engine<'a> {
    fn new(
        circuit: &'a Circuit,
        device: &'a DeviceGraph,
        config: &'a RoutingConfig,
        initial_map: QubitMap,
    ) -> Self {
        let mut wire_index: FxHashMap<Wire, usize> = FxHashMap::default();
        let mut qubit_wire = FxHashMap::default();
        for q in circuit.qubits() {
            let w = wire_index.len();
            wire_index.insert(Wire::Qubit(q), w);
            qubit_wire.insert(q, w);
        }
        for c in circuit.clbits() {
            let w = wire_index.len();
            wire_index.insert(Wire::Clbit(c), w);
        }

        let ops = circuit.instructions();
        let mut wire_ops = vec![Vec::new(); wire_index.len()];
        let op_wires: Vec<Vec<usize>> = ops
            .iter()
            .enumerate()
            .map(|(i, inst)| {
                let wires: Vec<usize> = inst
                    .wires()
                    .iter()
                    .filter_map(|w| wire_index.get(w).copied())
                    .collect();
                for &w in &wires {
                    wire_ops[w].push(i);
                }
                wires
            })
            .collect();

        let mut out = Circuit::physical(circuit.name(), device.num_nodes(), circuit.clbits());
        out.set_global_phase(circuit.global_phase());

        Self {
            circuit,
            ops,
            device,
            config,
            qubit_wire,
            op_wires,
            cursor: vec![0; wire_ops.len()],
            wire_ops,
            done: vec![false; ops.len()],
            remaining: ops.len(),
            initial: initial_map.clone(),
            map: initial_map,
            origin: (0..device.num_nodes()).collect(),
            out,
            stats: RoutingStats {
                ops_in: ops.len(),
                ..RoutingStats::default()
            },
            state: RoutingState::Scanning,
        }
    }

    fn run(&mut self, methods: &[Box<dyn RoutingMethod>]) -> RouteResult<()> {
        let stall_cap = self.config.stall_limit + 2 * self.device.num_nodes() + 16;
        let mut stalled = 0usize;

        loop {
            trace!(state = ?self.state, remaining = self.remaining, "engine step");
            match self.state {
                RoutingState::Scanning => {
                    if self.scan()? > 0 {
                        stalled = 0;
                    }
                    self.state = if self.remaining == 0 {
                        RoutingState::Done
                    } else {
                        RoutingState::Resolving
                    };
                }
                RoutingState::Resolving => {
                    if stalled > stall_cap {
                        return Err(RouteError::RoutingDeadlock {
                            pending: self.front().len(),
                        });
                    }
                    let consumed = self.resolve(methods, stalled)?;
                    self.stats.resolutions += 1;
                    stalled = if consumed > 0 { 0 } else { stalled + 1 };
                    self.state = RoutingState::Scanning;
                }
                RoutingState::Done => return Ok(()),
            }
        }
    }

    // =========================================================================
    // Cursors
    // =========================================================================

    fn head(&self, wire: usize) -> Option<usize> {
        self.wire_ops[wire].get(self.cursor[wire]).copied()
    }

    fn is_ready(&self, op: usize) -> bool {
        !self.done[op] && self.op_wires[op].iter().all(|&w| self.head(w) == Some(op))
    }

    fn retire(&mut self, op: usize) {
        self.done[op] = true;
        self.remaining -= 1;
        for &w in &self.op_wires[op] {
            self.cursor[w] += 1;
        }
    }

    /// Ready but unrouted instructions, ascending.
    fn front(&self) -> Vec<usize> {
        let heads: BTreeSet<usize> = (0..self.wire_ops.len())
            .filter_map(|w| self.head(w))
            .filter(|&op| self.is_ready(op))
            .collect();
        heads.into_iter().collect()
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Emit every valid ready instruction; returns how many were emitted.
    fn scan(&mut self) -> RouteResult<usize> {
        let ops = self.ops;
        let mut queue: BTreeSet<usize> = (0..self.wire_ops.len())
            .filter_map(|w| self.head(w))
            .collect();
        let mut emitted = 0;

        while let Some(op) = queue.pop_first() {
            if !self.is_ready(op) {
                continue;
            }
            let inst = &ops[op];
            if inst.is_two_qubit_gate() {
                let (a, b) = (inst.qubits[0], inst.qubits[1]);
                match (self.map.physical(a), self.map.physical(b)) {
                    (Some(pa), Some(pb)) if self.device.has_edge(pa, pb) => {}
                    _ => continue,
                }
            } else {
                for &q in &inst.qubits {
                    if !self.map.contains(q) {
                        self.place_lazily(q)?;
                    }
                }
            }

            self.emit(op)?;
            emitted += 1;
            for &w in &self.op_wires[op] {
                if let Some(next) = self.head(w) {
                    queue.insert(next);
                }
            }
        }

        Ok(emitted)
    }

    fn emit(&mut self, op: usize) -> RouteResult<()> {
        let inst = &self.ops[op];
        let mut physical = Vec::with_capacity(inst.qubits.len());
        for &q in &inst.qubits {
            let p = self.map.physical(q).ok_or_else(|| {
                RouteError::InvariantViolation(format!("{q} unmapped when emitting '{}'", inst.name()))
            })?;
            physical.push(QubitId::from_index(p));
        }
        let mut mapped = inst.clone();
        mapped.qubits = physical;
        self.out.apply(mapped)?;
        self.retire(op);
        Ok(())
    }

    /// Node of the next mapped interaction partner of `qubit`.
    fn next_partner(&self, qubit: QubitId) -> Option<usize> {
        let w = *self.qubit_wire.get(&qubit)?;
        self.wire_ops[w][self.cursor[w]..].iter().find_map(|&op| {
            let inst = &self.ops[op];
            if !inst.is_two_qubit_gate() {
                return None;
            }
            let other = if inst.qubits[0] == qubit {
                inst.qubits[1]
            } else {
                inst.qubits[0]
            };
            self.map.physical(other)
        })
    }

    /// Place `qubit` next to its upcoming partner, else on the lowest free node.
    fn place_lazily(&mut self, qubit: QubitId) -> RouteResult<()> {
        let map = &self.map;
        let node = self
            .next_partner(qubit)
            .and_then(|partner| self.device.nearest(partner, |p| map.is_free(p)))
            .or_else(|| (0..self.device.num_nodes()).find(|&p| map.is_free(p)))
            .ok_or(RouteError::InsufficientQubits {
                required: self.circuit.num_qubits(),
                available: self.device.num_nodes(),
            })?;
        trace!(%qubit, node, "placing qubit");
        self.assign(qubit, node)
    }

    fn assign(&mut self, qubit: QubitId, node: usize) -> RouteResult<()> {
        self.map.assign(qubit, node)?;
        self.initial.assign(qubit, self.origin[node])?;
        self.stats.relabels += 1;
        Ok(())
    }

    // =========================================================================
    // Resolving
    // =========================================================================

    fn resolve(&mut self, methods: &[Box<dyn RoutingMethod>], stalled: usize) -> RouteResult<usize> {
        let ops = self.ops;
        let front = self.front();

        for &op in &front {
            let (a, b) = (ops[op].qubits[0], ops[op].qubits[1]);
            if let (Some(pa), Some(pb)) = (self.map.physical(a), self.map.physical(b)) {
                if self.device.dist(pa, pb) == UNREACHABLE {
                    return Err(RouteError::DisconnectedQubits {
                        a,
                        b,
                        node_a: pa,
                        node_b: pb,
                    });
                }
            }
        }

        let (method, replacement) = {
            let window = RoutingWindow {
                front: front
                    .iter()
                    .map(|&index| WindowGate {
                        index,
                        instruction: &ops[index],
                        depth: 0,
                    })
                    .collect(),
                lookahead: window::collect_lookahead(
                    ops,
                    &self.done,
                    &front,
                    self.config.lookahead,
                    self.config.max_depth,
                ),
                map: &self.map,
                stalled_steps: stalled,
            };
            let method = methods
                .iter()
                .find(|m| m.can_act(&window, self.device))
                .ok_or(RouteError::RoutingDeadlock {
                    pending: front.len(),
                })?;
            debug!(
                method = method.name(),
                front = window.front.len(),
                lookahead = window.lookahead.len(),
                "resolving"
            );
            (method.name().to_string(), method.act(&window, self.device)?)
        };

        self.apply(&method, replacement, front.len())
    }

    /// Apply a replacement from `method`; returns the number of consumed
    /// instructions. A malformed replacement fails with `MethodFailed`.
    fn apply(&mut self, method: &str, replacement: Replacement, pending: usize) -> RouteResult<usize> {
        if replacement.is_empty() {
            return Err(RouteError::RoutingDeadlock { pending });
        }
        let Replacement {
            ops,
            consumed,
            relabel,
            permutation,
        } = replacement;
        let n = self.device.num_nodes();
        let failed = |reason: String| RouteError::MethodFailed {
            method: method.to_string(),
            reason,
        };

        let mut claimed = FxHashSet::default();
        for &(qubit, node) in &relabel {
            if !self.qubit_wire.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: None,
                }
                .into());
            }
            if self.map.contains(qubit) {
                return Err(failed(format!("{qubit} is already placed")));
            }
            if node >= n || !self.map.is_free(node) || !claimed.insert(node) {
                return Err(failed(format!("cannot place {qubit} on node {node}")));
            }
        }
        for inst in &ops {
            self.check_physical(inst).map_err(&failed)?;
        }
        if let Some(&(a, b)) = permutation.iter().find(|&&(a, b)| a >= n || b >= n) {
            return Err(failed(format!("transposition ({a}, {b}) outside the device")));
        }

        for (qubit, node) in relabel {
            self.assign(qubit, node)?;
        }
        for inst in ops {
            match inst.as_standard_gate() {
                Some(StandardGate::Swap) => self.stats.swaps += 1,
                Some(StandardGate::Bridge) => self.stats.bridges += 1,
                _ => {}
            }
            self.out.apply(inst)?;
        }
        for &op in &consumed {
            if op >= self.ops.len() || !self.is_ready(op) {
                return Err(failed(format!("consumed instruction {op} is not ready")));
            }
            self.retire(op);
        }
        for (a, b) in permutation {
            self.map.swap_physical(a, b);
            self.origin.swap(a, b);
        }

        Ok(consumed.len())
    }

    /// Check that a replacement instruction fits the device.
    fn check_physical(&self, inst: &Instruction) -> Result<(), String> {
        let n = self.device.num_nodes();
        let nodes: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
        if let Some(&bad) = nodes.iter().find(|&&p| p >= n) {
            return Err(format!("'{}' on node {bad} outside the device", inst.name()));
        }
        if !inst.is_gate() {
            return Ok(());
        }
        let on_edges = match (nodes.as_slice(), inst.as_standard_gate()) {
            ([_], _) => true,
            ([a, b], _) => self.device.has_edge(*a, *b),
            ([c, m, t], Some(StandardGate::Bridge)) => {
                self.device.has_edge(*c, *m) && self.device.has_edge(*m, *t)
            }
            _ => false,
        };
        if on_edges {
            Ok(())
        } else {
            Err(format!(
                "'{}' on nodes {nodes:?} does not follow device edges",
                inst.name()
            ))
        }
    }

    // =========================================================================
    // Done
    // =========================================================================

    fn finish(mut self) -> RouteResult<RoutedCircuit> {
        for qubit in self.circuit.qubits() {
            if self.map.contains(qubit) {
                continue;
            }
            let map = &self.map;
            let node = (0..self.device.num_nodes())
                .find(|&p| map.is_free(p))
                .ok_or(RouteError::InsufficientQubits {
                    required: self.circuit.num_qubits(),
                    available: self.device.num_nodes(),
                })?;
            self.map.assign(qubit, node)?;
            self.initial.assign(qubit, self.origin[node])?;
        }

        let moved: Vec<_> = self
            .origin
            .iter()
            .enumerate()
            .filter(|&(p, &o)| p != o)
            .map(|(p, &o)| (QubitId::from_index(o), QubitId::from_index(p)))
            .collect();
        self.out.set_implicit_permutation(moved)?;
        self.stats.ops_out = self.out.num_ops();

        Ok(RoutedCircuit {
            circuit: self.out,
            initial_map: self.initial,
            final_map: self.map,
            stats: self.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_circuit_is_untouched() {
        let device = DeviceGraph::linear(3);
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(2)).unwrap();

        let routed = Router::default()
            .route(&circuit, &device, &QubitMap::trivial(3))
            .unwrap();
        assert_eq!(routed.stats.swaps, 0);
        assert_eq!(routed.stats.resolutions, 0);
        assert_eq!(routed.circuit.num_ops(), 3);
        assert!(routed.circuit.implicit_permutation().is_empty());
        assert_eq!(routed.final_map, routed.initial_map);
    }

    #[test]
    fn test_swap_moves_map() {
        let device = DeviceGraph::linear(3);
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();

        let routed = Router::default()
            .route(&circuit, &device, &QubitMap::trivial(3))
            .unwrap();
        assert_eq!(routed.stats.swaps, 1);
        assert_eq!(routed.final_map.physical(QubitId(0)), Some(1));
        assert_eq!(routed.final_map.physical(QubitId(1)), Some(0));
        assert_eq!(
            routed.circuit.implicit_permutation(),
            &[(QubitId(0), QubitId(1)), (QubitId(1), QubitId(0))]
        );
        let names: Vec<_> = routed.circuit.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, vec!["swap", "cx"]);
    }

    #[test]
    fn test_lazy_placement_and_idle_qubits() {
        let device = DeviceGraph::linear(5);
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.cx(QubitId(1), QubitId(2)).unwrap();

        let routed = Router::default()
            .route(&circuit, &device, &QubitMap::new())
            .unwrap();
        assert_eq!(routed.stats.swaps, 0);
        assert_eq!(routed.final_map.physical(QubitId(1)), Some(0));
        assert_eq!(routed.final_map.physical(QubitId(2)), Some(1));
        assert_eq!(routed.final_map.physical(QubitId(0)), Some(2));
        assert_eq!(routed.final_map.len(), 3);
    }

    #[test]
    fn test_too_many_qubits() {
        let device = DeviceGraph::linear(2);
        let circuit = Circuit::with_size("test", 3, 0);
        let err = Router::default()
            .route(&circuit, &device, &QubitMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::InsufficientQubits {
                required: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn test_three_qubit_gate_rejected() {
        let device = DeviceGraph::linear(3);
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let err = Router::default()
            .route(&circuit, &device, &QubitMap::trivial(3))
            .unwrap_err();
        assert!(matches!(err, RouteError::UnsupportedOperation { num_qubits: 3, .. }));
    }

    #[test]
    fn test_disconnected_interaction() {
        let device = DeviceGraph::from_edges(4, &[(0, 1), (2, 3)], false).unwrap();
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        let err = Router::default()
            .route(&circuit, &device, &QubitMap::trivial(4))
            .unwrap_err();
        assert!(matches!(err, RouteError::DisconnectedQubits { .. }));
    }

    #[test]
    fn test_no_methods_deadlocks() {
        let device = DeviceGraph::linear(3);
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        let err = Router::without_methods(RoutingConfig::default())
            .route(&circuit, &device, &QubitMap::trivial(3))
            .unwrap_err();
        assert!(matches!(err, RouteError::RoutingDeadlock { pending: 1 }));
    }

    /// Emits every front gate where its operands sit, ignoring the device.
    struct Teleporter {
        consume_twice: bool,
    }

    impl RoutingMethod for Teleporter {
        fn name(&self) -> &str {
            "teleporter"
        }

        fn can_act(&self, window: &RoutingWindow<'_>, _device: &DeviceGraph) -> bool {
            !window.front.is_empty()
        }

        fn act(&self, window: &RoutingWindow<'_>, _device: &DeviceGraph) -> RouteResult<Replacement> {
            let gate = &window.front[0];
            let mut replacement = Replacement::default();
            if self.consume_twice {
                replacement.consumed = vec![gate.index, gate.index];
            } else {
                let (a, b) = gate.qubits();
                let nodes = [a, b].map(|q| window.position(q).unwrap_or_default());
                replacement.ops.push(Instruction::two_qubit_gate(
                    StandardGate::CX,
                    QubitId::from_index(nodes[0]),
                    QubitId::from_index(nodes[1]),
                ));
                replacement.consumed.push(gate.index);
            }
            Ok(replacement)
        }
    }

    #[test]
    fn test_malformed_replacement_blames_method() {
        let device = DeviceGraph::linear(3);
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();

        for consume_twice in [false, true] {
            let router = Router::without_methods(RoutingConfig::default())
                .with_method(Teleporter { consume_twice });
            let err = router
                .route(&circuit, &device, &QubitMap::trivial(3))
                .unwrap_err();
            match err {
                RouteError::MethodFailed { method, .. } => assert_eq!(method, "teleporter"),
                other => panic!("Expected MethodFailed, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_initial_map_with_undeclared_qubit() {
        let device = DeviceGraph::linear(3);
        let circuit = Circuit::with_size("test", 2, 0);
        let mut map = QubitMap::new();
        map.assign(QubitId(7), 0).unwrap();
        let err = Router::default().route(&circuit, &device, &map).unwrap_err();
        assert!(matches!(err, RouteError::Ir(IrError::QubitNotFound { .. })));
    }

    #[test]
    fn test_restore_permutation_option() {
        let device = DeviceGraph::linear(4);
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();

        let config = RoutingConfig::default().with_restore_permutation(true);
        let routed = route(&circuit, &device, &QubitMap::trivial(4), &config).unwrap();
        assert_eq!(routed.final_map, routed.initial_map);
        assert!(routed.circuit.implicit_permutation().is_empty());
        assert_eq!(routed.stats.swaps, 4);
    }
}
