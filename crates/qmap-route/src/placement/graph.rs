//! Subgraph-monomorphism placement.
//!
//! The interaction graph is embedded into the device graph with a bounded
//! VF2-style backtracking search. Pattern qubits are ordered so that each
//! one after the first has as many already-placed partners as possible;
//! device candidates are tried in ascending index order and must be
//! adjacent to the nodes of every placed partner.
//!
//! When no full embedding turns up within the call budget the weakest
//! interaction is dropped and the search restarts. Embeddings found are
//! scored by calibrated error when the device carries calibration data,
//! by weighted distance otherwise; ties go to the lexicographically
//! smallest assignment.

use tracing::{debug, trace};

use qmap_ir::{Circuit, InteractionGraph, QubitId};

use crate::device::{Calibration, DeviceGraph};
use crate::error::RouteResult;
use crate::layout::QubitMap;
use crate::placement::{Placement, check_capacity, complete_map};

/// Tolerance for comparing embedding scores.
const EPSILON: f64 = 1e-9;

/// Places qubits by embedding the interaction graph into the device.
#[derive(Debug, Clone)]
pub struct GraphPlacement {
    call_limit: usize,
    max_matches: usize,
}

impl GraphPlacement {
    /// Create a placer with a budget of `call_limit` search steps per
    /// attempt, keeping at most `max_matches` embeddings for scoring.
    pub fn new(call_limit: usize, max_matches: usize) -> Self {
        Self {
            call_limit: call_limit.max(1),
            max_matches: max_matches.max(1),
        }
    }

    /// Best embedding of `edges`, as `(qubit, node)` pairs sorted by qubit.
    fn embed(
        &self,
        edges: &[(QubitId, QubitId, u32)],
        device: &DeviceGraph,
        scorer: &Scorer<'_>,
    ) -> Option<Vec<(QubitId, usize)>> {
        let pattern = Pattern::new(edges);
        if pattern.qubits.len() > device.num_nodes() || edges.len() > device.num_edges() {
            return None;
        }

        let mut search = Search {
            device,
            pattern: &pattern,
            scorer,
            assignment: Vec::with_capacity(pattern.qubits.len()),
            used: vec![false; device.num_nodes()],
            calls: self.call_limit,
            matches: self.max_matches,
            best: None,
        };
        search.run();
        search.best.map(|(_, embedding)| embedding)
    }
}

impl Default for GraphPlacement {
    fn default() -> Self {
        Self::new(20_000, 64)
    }
}

impl Placement for GraphPlacement {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn place(&self, circuit: &Circuit, device: &DeviceGraph) -> RouteResult<QubitMap> {
        check_capacity(circuit, device)?;
        let interactions = circuit.interaction_graph();
        let scorer = Scorer::new(device, &interactions);

        let mut edges = interactions.edges();
        let mut map = QubitMap::new();
        loop {
            if let Some(embedding) = self.embed(&edges, device, &scorer) {
                debug!(
                    qubits = embedding.len(),
                    edges = edges.len(),
                    "found interaction embedding"
                );
                for (qubit, node) in embedding {
                    map.assign(qubit, node)?;
                }
                break;
            }
            // Heaviest first, so the weakest interaction is last.
            let Some((a, b, weight)) = edges.pop() else {
                break;
            };
            trace!(%a, %b, weight, "dropping interaction");
        }

        complete_map(&mut map, circuit, device, &interactions)?;
        Ok(map)
    }
}

/// The interaction subgraph being embedded, in search order.
struct Pattern {
    qubits: Vec<QubitId>,
    /// Degree of each qubit in the pattern.
    degree: Vec<usize>,
    /// Positions of earlier-ordered partners of each qubit.
    prior: Vec<Vec<usize>>,
}

impl Pattern {
    fn new(edges: &[(QubitId, QubitId, u32)]) -> Self {
        let mut qubits: Vec<QubitId> = edges.iter().flat_map(|&(a, b, _)| [a, b]).collect();
        qubits.sort_unstable();
        qubits.dedup();

        let position = |q: QubitId| qubits.binary_search(&q).unwrap_or(0);
        let mut adjacency = vec![Vec::new(); qubits.len()];
        for &(a, b, _) in edges {
            let (i, j) = (position(a), position(b));
            adjacency[i].push(j);
            adjacency[j].push(i);
        }

        let mut order: Vec<usize> = Vec::with_capacity(qubits.len());
        let mut placed = vec![false; qubits.len()];
        while order.len() < qubits.len() {
            let next = (0..qubits.len())
                .filter(|&i| !placed[i])
                .max_by_key(|&i| {
                    let linked = adjacency[i].iter().filter(|&&j| placed[j]).count();
                    (linked, adjacency[i].len(), std::cmp::Reverse(i))
                });
            let Some(next) = next else {
                break;
            };
            placed[next] = true;
            order.push(next);
        }

        let mut rank = vec![0; qubits.len()];
        for (r, &i) in order.iter().enumerate() {
            rank[i] = r;
        }
        let prior = order
            .iter()
            .enumerate()
            .map(|(r, &i)| {
                let mut earlier: Vec<usize> = adjacency[i]
                    .iter()
                    .map(|&j| rank[j])
                    .filter(|&rj| rj < r)
                    .collect();
                earlier.sort_unstable();
                earlier
            })
            .collect();

        Self {
            degree: order.iter().map(|&i| adjacency[i].len()).collect(),
            qubits: order.iter().map(|&i| qubits[i]).collect(),
            prior,
        }
    }
}

/// Backtracking state of one embedding attempt.
struct Search<'a> {
    device: &'a DeviceGraph,
    pattern: &'a Pattern,
    scorer: &'a Scorer<'a>,
    /// Node of each pattern qubit placed so far, in search order.
    assignment: Vec<usize>,
    used: Vec<bool>,
    calls: usize,
    matches: usize,
    best: Option<(f64, Vec<(QubitId, usize)>)>,
}

impl Search<'_> {
    fn run(&mut self) {
        if self.calls == 0 || self.matches == 0 {
            return;
        }
        self.calls -= 1;

        let depth = self.assignment.len();
        if depth == self.pattern.qubits.len() {
            self.matches -= 1;
            self.record();
            return;
        }

        let prior = &self.pattern.prior[depth];
        let candidates: Vec<usize> = match prior.first() {
            Some(&anchor) => self.device.neighbors_of(self.assignment[anchor]).to_vec(),
            None => (0..self.device.num_nodes()).collect(),
        };
        for node in candidates {
            if self.used[node]
                || self.device.degree(node) < self.pattern.degree[depth]
                || !prior
                    .iter()
                    .all(|&j| self.device.has_edge(node, self.assignment[j]))
            {
                continue;
            }
            self.used[node] = true;
            self.assignment.push(node);
            self.run();
            self.assignment.pop();
            self.used[node] = false;
            if self.calls == 0 || self.matches == 0 {
                return;
            }
        }
    }

    fn record(&mut self) {
        let mut embedding: Vec<(QubitId, usize)> = self
            .pattern
            .qubits
            .iter()
            .copied()
            .zip(self.assignment.iter().copied())
            .collect();
        embedding.sort_unstable();
        let score = self.scorer.score(&embedding);

        let better = match &self.best {
            None => true,
            Some((best, current)) => {
                score < best - EPSILON || ((score - best).abs() <= EPSILON && embedding < *current)
            }
        };
        if better {
            self.best = Some((score, embedding));
        }
    }
}

/// Cost of an embedding; lower is better.
struct Scorer<'a> {
    device: &'a DeviceGraph,
    interactions: Vec<(QubitId, QubitId, u32)>,
    weights: Vec<(QubitId, u32)>,
    calibration: Option<&'a Calibration>,
    mean_edge_cost: f64,
}

impl<'a> Scorer<'a> {
    fn new(device: &'a DeviceGraph, interactions: &InteractionGraph) -> Self {
        let calibration = device.calibration().filter(|c| !c.is_empty());
        let known: Vec<f64> = calibration
            .map(|c| {
                device
                    .edges()
                    .iter()
                    .filter_map(|&(a, b)| c.edge_error(a, b))
                    .collect()
            })
            .unwrap_or_default();
        let mean_edge_cost = if known.is_empty() {
            0.0
        } else {
            let mean = known.iter().sum::<f64>() / known.len() as f64;
            error_cost(mean)
        };

        let weights = interactions
            .graph()
            .node_weights()
            .map(|&q| (q, interactions.total_weight(q)))
            .collect();

        Self {
            device,
            interactions: interactions.edges(),
            weights,
            calibration,
            mean_edge_cost,
        }
    }

    fn score(&self, embedding: &[(QubitId, usize)]) -> f64 {
        let node_of = |q: QubitId| {
            embedding
                .binary_search_by_key(&q, |&(l, _)| l)
                .ok()
                .map(|i| embedding[i].1)
        };

        let mut total = 0.0;
        for &(a, b, w) in &self.interactions {
            let (Some(pa), Some(pb)) = (node_of(a), node_of(b)) else {
                continue;
            };
            let d = self.device.dist(pa, pb);
            let cost = match self.calibration {
                None => f64::from(d),
                Some(cal) if d == 1 => cal
                    .edge_error(pa, pb)
                    .map_or(self.mean_edge_cost, error_cost),
                // A SWAP costs three two-qubit gates.
                Some(_) => f64::from(3 * d.saturating_sub(1) + 1) * self.mean_edge_cost,
            };
            total += f64::from(w) * cost;
        }

        if let Some(cal) = self.calibration {
            for &(q, w) in &self.weights {
                if let Some(error) = node_of(q).and_then(|p| cal.node_error(p)) {
                    total += f64::from(w + 1) * error_cost(error);
                }
            }
        }
        total
    }
}

/// Negative log-fidelity of an operation with the given error rate.
fn error_cost(error: f64) -> f64 {
    -(1.0 - error.clamp(0.0, 1.0 - EPSILON)).ln()
}
