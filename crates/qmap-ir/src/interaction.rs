//! Qubit interaction graph of a logical circuit.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::qubit::QubitId;

/// Undirected multigraph collapsed into weights: one node per declared
/// qubit, one edge per interacting pair weighted by the number of gates
/// acting on that pair.
///
/// Gates on three or more qubits contribute every pair of their operands.
/// Barriers, measurements and resets contribute nothing.
#[derive(Debug, Clone)]
pub struct InteractionGraph {
    graph: UnGraph<QubitId, u32>,
    index: FxHashMap<QubitId, NodeIndex>,
}

impl InteractionGraph {
    /// Build the interaction graph of a circuit.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut graph = UnGraph::with_capacity(circuit.num_qubits(), 0);
        let mut index = FxHashMap::default();
        for qubit in circuit.qubits() {
            index.insert(qubit, graph.add_node(qubit));
        }

        for inst in circuit.instructions() {
            if !inst.is_gate() || inst.qubits.len() < 2 {
                continue;
            }
            for (i, &a) in inst.qubits.iter().enumerate() {
                for &b in &inst.qubits[i + 1..] {
                    let (na, nb) = (index[&a], index[&b]);
                    match graph.find_edge(na, nb) {
                        Some(e) => graph[e] += 1,
                        None => {
                            graph.add_edge(na, nb, 1);
                        }
                    }
                }
            }
        }

        Self { graph, index }
    }

    /// Number of qubits (nodes).
    pub fn num_qubits(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct interacting pairs.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of gates acting on the pair `(a, b)`.
    pub fn weight(&self, a: QubitId, b: QubitId) -> u32 {
        match (self.index.get(&a), self.index.get(&b)) {
            (Some(&na), Some(&nb)) => self
                .graph
                .find_edge(na, nb)
                .map_or(0, |e| self.graph[e]),
            _ => 0,
        }
    }

    /// Interaction partners of `qubit`, ascending.
    pub fn neighbors(&self, qubit: QubitId) -> Vec<QubitId> {
        let Some(&node) = self.index.get(&qubit) else {
            return vec![];
        };
        let mut partners: Vec<_> = self.graph.neighbors(node).map(|n| self.graph[n]).collect();
        partners.sort_unstable();
        partners.dedup();
        partners
    }

    /// Number of distinct partners of `qubit`.
    pub fn degree(&self, qubit: QubitId) -> usize {
        self.neighbors(qubit).len()
    }

    /// Total interaction weight of `qubit`.
    pub fn total_weight(&self, qubit: QubitId) -> u32 {
        self.index.get(&qubit).map_or(0, |&node| {
            self.graph.edges(node).map(|e| *e.weight()).sum()
        })
    }

    /// All weighted pairs, heaviest first, ties by ascending pair.
    pub fn edges(&self) -> Vec<(QubitId, QubitId, u32)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (self.graph[e.source()], self.graph[e.target()]);
                (a.min(b), a.max(b), *e.weight())
            })
            .collect();
        edges.sort_unstable_by(|x, y| y.2.cmp(&x.2).then((x.0, x.1).cmp(&(y.0, y.1))));
        edges
    }

    /// The underlying petgraph graph.
    pub fn graph(&self) -> &UnGraph<QubitId, u32> {
        &self.graph
    }
}

impl Circuit {
    /// Build the interaction graph of this circuit.
    pub fn interaction_graph(&self) -> InteractionGraph {
        InteractionGraph::from_circuit(self)
    }
}
