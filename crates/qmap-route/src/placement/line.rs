//! Line placement.
//!
//! Interacting qubits are chained into disjoint lines, heaviest
//! interactions first, and every line is laid onto a simple path of free
//! adjacent device nodes. Lines that do not fit are split; the tail is
//! placed as close as possible to where the head ended.

use std::collections::VecDeque;

use petgraph::unionfind::UnionFind;
use rustc_hash::FxHashMap;
use tracing::trace;

use qmap_ir::{Circuit, InteractionGraph, QubitId};

use crate::device::DeviceGraph;
use crate::error::RouteResult;
use crate::layout::QubitMap;
use crate::placement::{Placement, check_capacity, complete_map};

/// Default number of path extensions tried per line.
const DEFAULT_SEARCH_BUDGET: usize = 10_000;

/// Places chains of interacting qubits onto device paths.
#[derive(Debug, Clone)]
pub struct LinePlacement {
    search_budget: usize,
}

impl LinePlacement {
    /// Create a placer that tries at most `search_budget` path extensions
    /// per line.
    pub fn new(search_budget: usize) -> Self {
        Self {
            search_budget: search_budget.max(1),
        }
    }

    /// Disjoint chains of interacting qubits, longest first, then
    /// heaviest, then by first qubit.
    ///
    /// Chains only use interaction edges; every qubit appears at most once
    /// and qubits without an accepted edge are left out.
    pub fn lines(interactions: &InteractionGraph) -> Vec<Vec<QubitId>> {
        let qubits: Vec<QubitId> = interactions.graph().node_weights().copied().collect();
        let slot: FxHashMap<QubitId, usize> =
            qubits.iter().enumerate().map(|(i, &q)| (q, i)).collect();

        let mut sets = UnionFind::<usize>::new(qubits.len());
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); qubits.len()];
        for (a, b, _) in interactions.edges() {
            let (i, j) = (slot[&a], slot[&b]);
            if adjacency[i].len() < 2 && adjacency[j].len() < 2 && sets.union(i, j) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }

        let mut visited = vec![false; qubits.len()];
        let mut lines: Vec<(Vec<QubitId>, u64)> = Vec::new();
        for start in 0..qubits.len() {
            if visited[start] || adjacency[start].len() != 1 {
                continue;
            }
            let mut line = Vec::new();
            let mut weight = 0u64;
            let (mut current, mut previous) = (start, usize::MAX);
            loop {
                visited[current] = true;
                line.push(qubits[current]);
                let Some(&next) = adjacency[current].iter().find(|&&n| n != previous) else {
                    break;
                };
                weight += u64::from(interactions.weight(qubits[current], qubits[next]));
                (previous, current) = (current, next);
            }
            lines.push((line, weight));
        }

        lines.sort_by(|(a, wa), (b, wb)| {
            b.len()
                .cmp(&a.len())
                .then(wb.cmp(wa))
                .then(a[0].cmp(&b[0]))
        });
        lines.into_iter().map(|(line, _)| line).collect()
    }

    /// Longest simple path of free nodes, up to `len` nodes.
    ///
    /// Start nodes are tried closest to `anchor` first, or lowest degree
    /// first without one, ties by index.
    fn free_path(
        &self,
        device: &DeviceGraph,
        map: &QubitMap,
        len: usize,
        anchor: Option<usize>,
    ) -> Vec<usize> {
        let mut starts: Vec<usize> = (0..device.num_nodes()).filter(|&p| map.is_free(p)).collect();
        match anchor {
            Some(a) => starts.sort_by_key(|&s| (device.dist(a, s), s)),
            None => starts.sort_by_key(|&s| (device.degree(s), s)),
        }

        let mut search = PathSearch {
            device,
            map,
            len,
            used: vec![false; device.num_nodes()],
            path: Vec::with_capacity(len),
            best: Vec::new(),
            budget: self.search_budget,
        };
        for start in starts {
            search.used[start] = true;
            search.path.push(start);
            search.extend();
            search.path.pop();
            search.used[start] = false;
            if search.best.len() == len || search.budget == 0 {
                break;
            }
        }
        search.best
    }
}

impl Default for LinePlacement {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BUDGET)
    }
}

/// Depth-first search for a path of free nodes.
struct PathSearch<'a> {
    device: &'a DeviceGraph,
    map: &'a QubitMap,
    len: usize,
    used: Vec<bool>,
    path: Vec<usize>,
    best: Vec<usize>,
    budget: usize,
}

impl PathSearch<'_> {
    fn extend(&mut self) {
        if self.path.len() > self.best.len() {
            self.best.clone_from(&self.path);
        }
        if self.path.len() >= self.len || self.budget == 0 {
            return;
        }
        self.budget -= 1;

        let Some(&last) = self.path.last() else {
            return;
        };
        for &next in self.device.neighbors_of(last) {
            if self.used[next] || !self.map.is_free(next) {
                continue;
            }
            self.used[next] = true;
            self.path.push(next);
            self.extend();
            self.path.pop();
            self.used[next] = false;
            if self.best.len() >= self.len {
                return;
            }
        }
    }
}

impl Placement for LinePlacement {
    fn name(&self) -> &'static str {
        "line"
    }

    fn place(&self, circuit: &Circuit, device: &DeviceGraph) -> RouteResult<QubitMap> {
        check_capacity(circuit, device)?;
        let interactions = circuit.interaction_graph();
        let mut pending: VecDeque<(Vec<QubitId>, Option<usize>)> = Self::lines(&interactions)
            .into_iter()
            .map(|line| (line, None))
            .collect();
        let mut map = QubitMap::new();

        while let Some((line, anchor)) = pending.pop_front() {
            let path = self.free_path(device, &map, line.len(), anchor);
            if path.is_empty() {
                break;
            }
            for (&qubit, &node) in line.iter().zip(&path) {
                map.assign(qubit, node)?;
            }
            if path.len() < line.len() {
                trace!(line = line.len(), placed = path.len(), "splitting line");
                pending.push_front((line[path.len()..].to_vec(), path.last().copied()));
            }
        }

        complete_map(&mut map, circuit, device, &interactions)?;
        Ok(map)
    }
}
