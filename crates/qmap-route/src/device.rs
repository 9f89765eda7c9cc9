//! Device connectivity graph.
//!
//! A [`DeviceGraph`] is built once from topology data and is read-only
//! afterwards. All-pairs shortest-path distances and predecessors are
//! precomputed at construction so the router can query them in O(1);
//! the graph is `Send + Sync` and can be shared between routing calls.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use petgraph::unionfind::UnionFind;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// Distance between nodes in different connected components.
pub const UNREACHABLE: u32 = u32::MAX;

const NO_PRED: usize = usize::MAX;

/// A physical qubit site: a register name plus a hierarchical index.
///
/// Lines use a single index (`q[3]`), grids a row and a column
/// (`q[1, 2]`), and arbitrary topologies whatever they need.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    /// Register name.
    pub register: String,
    /// Position within the register.
    pub index: Vec<u32>,
}

impl Node {
    /// Create a node.
    pub fn new(register: impl Into<String>, index: impl IntoIterator<Item = u32>) -> Self {
        Self {
            register: register.into(),
            index: index.into_iter().collect(),
        }
    }

    /// Node `q[i]` of the default register.
    pub fn q(i: u32) -> Self {
        Self::new("q", [i])
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.register)?;
        for (i, idx) in self.index.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{idx}")?;
        }
        write!(f, "]")
    }
}

/// Optional per-node and per-edge error rates.
///
/// Only placement scoring reads calibration; a device without it is
/// scored by graph distance alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calibration {
    node_error: FxHashMap<usize, f64>,
    edge_error: FxHashMap<(usize, usize), f64>,
}

impl Calibration {
    /// Create empty calibration data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error rate of a node (readout or single-qubit gate).
    pub fn set_node_error(&mut self, node: usize, error: f64) {
        self.node_error.insert(node, error);
    }

    /// Set the two-qubit gate error rate of an edge, in either orientation.
    pub fn set_edge_error(&mut self, a: usize, b: usize, error: f64) {
        self.edge_error.insert((a.min(b), a.max(b)), error);
    }

    /// Error rate of a node, if known.
    pub fn node_error(&self, node: usize) -> Option<f64> {
        self.node_error.get(&node).copied()
    }

    /// Error rate of an edge, if known.
    pub fn edge_error(&self, a: usize, b: usize) -> Option<f64> {
        self.edge_error.get(&(a.min(b), a.max(b))).copied()
    }

    /// Whether no error rates are recorded.
    pub fn is_empty(&self) -> bool {
        self.node_error.is_empty() && self.edge_error.is_empty()
    }
}

/// Physical nodes and the pairs between which a native two-qubit gate
/// is allowed.
///
/// Nodes are addressed by their dense index (declaration order) inside the
/// router; [`Node`] names are only used at the API boundary. On directed
/// devices an edge `(a, b)` allows a gate with control `a` and target `b`;
/// distances and adjacency ignore direction since the rewriter repairs
/// orientation afterwards.
#[derive(Debug, Clone)]
pub struct DeviceGraph {
    nodes: Vec<Node>,
    node_index: FxHashMap<Node, usize>,
    /// Canonical, sorted edge list; `(min, max)` when undirected.
    edges: Vec<(usize, usize)>,
    directed: bool,
    /// Undirected adjacency, ascending.
    adjacency: Vec<Vec<usize>>,
    /// Every allowed ordered pair.
    ordered: FxHashSet<(usize, usize)>,
    dist: Vec<Vec<u32>>,
    /// `pred[src][dst]` is the node before `dst` on a shortest path from `src`.
    pred: Vec<Vec<usize>>,
    calibration: Option<Calibration>,
}

impl DeviceGraph {
    /// Build a device graph from named nodes and an edge list.
    ///
    /// Duplicate edges are merged (on undirected devices `(a, b)` and
    /// `(b, a)` are the same edge). Self-loops, edges naming undeclared
    /// nodes and duplicate nodes are rejected.
    pub fn new(
        nodes: impl IntoIterator<Item = Node>,
        edges: &[(Node, Node)],
        directed: bool,
    ) -> RouteResult<Self> {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        let mut index = FxHashMap::default();
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.clone(), i).is_some() {
                return Err(RouteError::InvalidTopology(format!(
                    "node {node} declared twice"
                )));
            }
        }

        let mut index_edges = Vec::with_capacity(edges.len());
        for (a, b) in edges {
            let lookup = |n: &Node| {
                index.get(n).copied().ok_or_else(|| {
                    RouteError::InvalidTopology(format!(
                        "edge ({a}, {b}) names undeclared node {n}"
                    ))
                })
            };
            index_edges.push((lookup(a)?, lookup(b)?));
        }

        Self::from_named_edges(nodes, &index_edges, directed)
    }

    /// Build a device graph over nodes `q[0]..q[num_nodes - 1]` from
    /// index pairs.
    pub fn from_edges(
        num_nodes: usize,
        edges: &[(usize, usize)],
        directed: bool,
    ) -> RouteResult<Self> {
        Self::from_named_edges(default_nodes(num_nodes), edges, directed)
    }

    fn from_named_edges(
        nodes: Vec<Node>,
        edges: &[(usize, usize)],
        directed: bool,
    ) -> RouteResult<Self> {
        let n = nodes.len();
        for &(a, b) in edges {
            if a >= n || b >= n {
                return Err(RouteError::InvalidTopology(format!(
                    "edge ({a}, {b}) out of range for {n} nodes"
                )));
            }
            if a == b {
                return Err(RouteError::InvalidTopology(format!(
                    "self-loop on node {}",
                    nodes[a]
                )));
            }
        }
        let mut seen = FxHashSet::default();
        for node in &nodes {
            if !seen.insert(node) {
                return Err(RouteError::InvalidTopology(format!(
                    "node {node} declared twice"
                )));
            }
        }
        Ok(Self::assemble(nodes, edges.iter().copied(), directed))
    }

    /// Build caches from already-validated parts.
    fn assemble(
        nodes: Vec<Node>,
        raw_edges: impl IntoIterator<Item = (usize, usize)>,
        directed: bool,
    ) -> Self {
        let n = nodes.len();
        let edge_set: BTreeSet<(usize, usize)> = raw_edges
            .into_iter()
            .map(|(a, b)| if directed { (a, b) } else { (a.min(b), a.max(b)) })
            .collect();
        let edges: Vec<_> = edge_set.into_iter().collect();

        let mut adjacency = vec![Vec::new(); n];
        let mut ordered = FxHashSet::default();
        for &(a, b) in &edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
            ordered.insert((a, b));
            if !directed {
                ordered.insert((b, a));
            }
        }
        for adj in &mut adjacency {
            adj.sort_unstable();
            adj.dedup();
        }

        let (dist, pred) = all_pairs_bfs(&adjacency);
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.clone(), i))
            .collect();

        Self {
            nodes,
            node_index,
            edges,
            directed,
            adjacency,
            ordered,
            dist,
            pred,
            calibration: None,
        }
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// Linear chain `0-1-2-...`.
    pub fn linear(n: usize) -> Self {
        Self::assemble(default_nodes(n), Topology::Linear { qubits: n }.edges(), false)
    }

    /// Closed ring.
    pub fn ring(n: usize) -> Self {
        Self::assemble(default_nodes(n), Topology::Ring { qubits: n }.edges(), false)
    }

    /// Rectangular grid with nodes `q[row, col]` in row-major order.
    pub fn grid(rows: usize, cols: usize) -> Self {
        Self::assemble(
            grid_nodes(rows, cols),
            Topology::Grid { rows, cols }.edges(),
            false,
        )
    }

    /// Star with node 0 at the center.
    pub fn star(n: usize) -> Self {
        Self::assemble(default_nodes(n), Topology::Star { qubits: n }.edges(), false)
    }

    /// Fully connected device.
    pub fn full(n: usize) -> Self {
        Self::assemble(default_nodes(n), Topology::Full { qubits: n }.edges(), false)
    }

    /// Attach calibration data.
    #[must_use]
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    // =========================================================================
    // Node-level queries
    // =========================================================================

    /// Dense index of a node.
    pub fn index_of(&self, node: &Node) -> RouteResult<usize> {
        self.node_index
            .get(node)
            .copied()
            .ok_or_else(|| RouteError::UnknownNode(node.to_string()))
    }

    /// Nodes adjacent to `node`, regardless of edge direction.
    pub fn neighbors(&self, node: &Node) -> RouteResult<BTreeSet<Node>> {
        let i = self.index_of(node)?;
        Ok(self.adjacency[i]
            .iter()
            .map(|&j| self.nodes[j].clone())
            .collect())
    }

    /// Shortest-path hop count, or [`UNREACHABLE`].
    pub fn distance(&self, a: &Node, b: &Node) -> RouteResult<u32> {
        Ok(self.dist(self.index_of(a)?, self.index_of(b)?))
    }

    /// Whether `a` and `b` share an edge in either direction.
    pub fn is_edge(&self, a: &Node, b: &Node) -> bool {
        match (self.node_index.get(a), self.node_index.get(b)) {
            (Some(&i), Some(&j)) => self.has_edge(i, j),
            _ => false,
        }
    }

    /// Whether `(a, b)` is an edge in this orientation. Equal to
    /// [`is_edge`](Self::is_edge) on undirected devices.
    pub fn is_edge_ordered(&self, a: &Node, b: &Node) -> bool {
        match (self.node_index.get(a), self.node_index.get(b)) {
            (Some(&i), Some(&j)) => self.has_edge_ordered(i, j),
            _ => false,
        }
    }

    // =========================================================================
    // Index-level queries
    // =========================================================================

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges (both orientations count on directed devices).
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether edge direction matters.
    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The node at `index`.
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Canonical sorted edge list.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Calibration data, if attached.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Neighbors of node `i` in ascending order.
    #[inline]
    pub fn neighbors_of(&self, i: usize) -> &[usize] {
        self.adjacency.get(i).map_or(&[][..], Vec::as_slice)
    }

    /// Degree of node `i`.
    pub fn degree(&self, i: usize) -> usize {
        self.neighbors_of(i).len()
    }

    /// Precomputed distance, [`UNREACHABLE`] across components or for
    /// out-of-range indices.
    #[inline]
    pub fn dist(&self, a: usize, b: usize) -> u32 {
        self.dist
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(UNREACHABLE)
    }

    /// Whether `a` and `b` share an edge in either direction.
    #[inline]
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.ordered.contains(&(a, b)) || self.ordered.contains(&(b, a))
    }

    /// Whether a gate with control `a` and target `b` is native.
    #[inline]
    pub fn has_edge_ordered(&self, a: usize, b: usize) -> bool {
        self.ordered.contains(&(a, b))
    }

    /// Nodes of a shortest path from `a` to `b`, both ends included.
    ///
    /// Among equal-length paths the one found by ascending-index BFS is
    /// returned, so the result is deterministic.
    pub fn shortest_path(&self, a: usize, b: usize) -> Option<Vec<usize>> {
        if self.dist(a, b) == UNREACHABLE {
            return None;
        }
        let mut path = vec![b];
        let mut current = b;
        while current != a {
            current = self.pred[a][current];
            if current == NO_PRED {
                return None;
            }
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// The reachable node closest to `from` that satisfies `accept`, ties
    /// broken by lowest index. `from` itself qualifies at distance 0.
    pub fn nearest(&self, from: usize, accept: impl Fn(usize) -> bool) -> Option<usize> {
        (0..self.num_nodes())
            .filter(|&i| self.dist(from, i) != UNREACHABLE && accept(i))
            .min_by_key(|&i| (self.dist(from, i), i))
    }

    /// Connected components, each sorted, ordered by their lowest node.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut uf = UnionFind::<usize>::new(self.nodes.len());
        for &(a, b) in &self.edges {
            uf.union(a, b);
        }
        let labels = uf.into_labeling();
        let mut slot: FxHashMap<usize, usize> = FxHashMap::default();
        let mut components: Vec<Vec<usize>> = Vec::new();
        for (node, label) in labels.into_iter().enumerate() {
            let idx = *slot.entry(label).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[idx].push(node);
        }
        components
    }

    /// Whether every node is reachable from every other.
    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }
}

fn default_nodes(n: usize) -> Vec<Node> {
    (0..n)
        .map(|i| Node::q(u32::try_from(i).unwrap_or(u32::MAX)))
        .collect()
}

fn grid_nodes(rows: usize, cols: usize) -> Vec<Node> {
    let to_u32 = |v: usize| u32::try_from(v).unwrap_or(u32::MAX);
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| Node::new("q", [to_u32(r), to_u32(c)])))
        .collect()
}

/// BFS from every source over ascending neighbor lists.
fn all_pairs_bfs(adjacency: &[Vec<usize>]) -> (Vec<Vec<u32>>, Vec<Vec<usize>>) {
    let n = adjacency.len();
    let mut dist = vec![vec![UNREACHABLE; n]; n];
    let mut pred = vec![vec![NO_PRED; n]; n];

    for src in 0..n {
        dist[src][src] = 0;
        let mut queue = VecDeque::from([src]);
        while let Some(current) = queue.pop_front() {
            for &next in &adjacency[current] {
                if dist[src][next] == UNREACHABLE {
                    dist[src][next] = dist[src][current] + 1;
                    pred[src][next] = current;
                    queue.push_back(next);
                }
            }
        }
    }

    (dist, pred)
}

// =============================================================================
// Serializable device description
// =============================================================================

/// Shape of a device in a [`DeviceSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Linear chain.
    Linear { qubits: usize },
    /// Closed ring.
    Ring { qubits: usize },
    /// Rectangular grid, row-major.
    Grid { rows: usize, cols: usize },
    /// Star with node 0 at the center.
    Star { qubits: usize },
    /// All-to-all connectivity.
    Full { qubits: usize },
    /// Explicit edge list.
    Custom {
        qubits: usize,
        edges: Vec<(usize, usize)>,
    },
}

impl Topology {
    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        match self {
            Topology::Linear { qubits }
            | Topology::Ring { qubits }
            | Topology::Star { qubits }
            | Topology::Full { qubits }
            | Topology::Custom { qubits, .. } => *qubits,
            Topology::Grid { rows, cols } => rows * cols,
        }
    }

    /// Index edge list; directed devices use these pairs as given.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        match self {
            Topology::Linear { qubits } => (1..*qubits).map(|i| (i - 1, i)).collect(),
            Topology::Ring { qubits } => {
                let mut edges: Vec<_> = (1..*qubits).map(|i| (i - 1, i)).collect();
                if *qubits > 2 {
                    edges.push((qubits - 1, 0));
                }
                edges
            }
            Topology::Grid { rows, cols } => {
                let mut edges = Vec::new();
                for r in 0..*rows {
                    for c in 0..*cols {
                        let i = r * cols + c;
                        if c + 1 < *cols {
                            edges.push((i, i + 1));
                        }
                        if r + 1 < *rows {
                            edges.push((i, i + cols));
                        }
                    }
                }
                edges
            }
            Topology::Star { qubits } => (1..*qubits).map(|i| (0, i)).collect(),
            Topology::Full { qubits } => (0..*qubits)
                .flat_map(|i| ((i + 1)..*qubits).map(move |j| (i, j)))
                .collect(),
            Topology::Custom { edges, .. } => edges.clone(),
        }
    }
}

/// Measured error rate of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeError {
    pub node: usize,
    pub error: f64,
}

/// Measured error rate of one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeError {
    pub edge: (usize, usize),
    pub error: f64,
}

/// Serializable device description, e.g. loaded from JSON or YAML.
///
/// ```yaml
/// name: heavy-line
/// topology: { kind: linear, qubits: 5 }
/// directed: false
/// edge_errors:
///   - { edge: [0, 1], error: 0.01 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSpec {
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Device shape.
    pub topology: Topology,
    /// Whether edges are directed as listed.
    #[serde(default)]
    pub directed: bool,
    /// Per-node error rates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_errors: Vec<NodeError>,
    /// Per-edge error rates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edge_errors: Vec<EdgeError>,
}

impl DeviceSpec {
    /// Build the described device graph.
    pub fn build(&self) -> RouteResult<DeviceGraph> {
        let nodes = match self.topology {
            Topology::Grid { rows, cols } => grid_nodes(rows, cols),
            _ => default_nodes(self.topology.num_nodes()),
        };
        let n = nodes.len();
        let graph = DeviceGraph::from_named_edges(nodes, &self.topology.edges(), self.directed)?;

        if self.node_errors.is_empty() && self.edge_errors.is_empty() {
            return Ok(graph);
        }

        let mut calibration = Calibration::new();
        for entry in &self.node_errors {
            check_error_rate(entry.error)?;
            if entry.node >= n {
                return Err(RouteError::InvalidTopology(format!(
                    "calibration for node {} out of range",
                    entry.node
                )));
            }
            calibration.set_node_error(entry.node, entry.error);
        }
        for entry in &self.edge_errors {
            check_error_rate(entry.error)?;
            let (a, b) = entry.edge;
            if !graph.has_edge(a, b) {
                return Err(RouteError::InvalidTopology(format!(
                    "calibration for ({a}, {b}) which is not an edge"
                )));
            }
            calibration.set_edge_error(a, b, entry.error);
        }
        Ok(graph.with_calibration(calibration))
    }
}

fn check_error_rate(error: f64) -> RouteResult<()> {
    if (0.0..1.0).contains(&error) {
        Ok(())
    } else {
        Err(RouteError::InvalidTopology(format!(
            "error rate {error} outside [0, 1)"
        )))
    }
}

/// Distances from every node, grouped by value. Handy for debugging
/// placement decisions.
pub fn distance_histogram(device: &DeviceGraph) -> BTreeMap<u32, usize> {
    let mut histogram = BTreeMap::new();
    for a in 0..device.num_nodes() {
        for b in (a + 1)..device.num_nodes() {
            *histogram.entry(device.dist(a, b)).or_insert(0) += 1;
        }
    }
    histogram
}
