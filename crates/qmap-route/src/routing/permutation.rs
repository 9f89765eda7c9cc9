//! SWAP networks that undo the routing permutation.

use std::collections::{BTreeSet, VecDeque};

use qmap_ir::QubitId;

use crate::device::DeviceGraph;
use crate::error::{RouteError, RouteResult};
use crate::routing::RoutedCircuit;

/// SWAPs that move the token on every node `p` to node `destination[p]`.
///
/// Works per connected component on a BFS spanning tree: repeatedly pick
/// the lowest-index leaf of the remaining tree, walk the token destined
/// for it along the tree path, then remove the leaf. Every SWAP is on a
/// device edge.
pub fn restore_permutation(
    device: &DeviceGraph,
    destination: &[usize],
) -> RouteResult<Vec<(usize, usize)>> {
    let n = device.num_nodes();
    if destination.len() != n {
        return Err(RouteError::InvariantViolation(format!(
            "permutation over {} nodes on a device with {n}",
            destination.len()
        )));
    }
    let mut seen = vec![false; n];
    for (p, &d) in destination.iter().enumerate() {
        if d >= n || std::mem::replace(&mut seen[d], true) {
            return Err(RouteError::InvariantViolation(
                "destinations do not form a permutation".into(),
            ));
        }
        if device.dist(p, d) == crate::device::UNREACHABLE {
            return Err(RouteError::InvariantViolation(format!(
                "token on node {p} cannot reach node {d}"
            )));
        }
    }

    let mut tokens = destination.to_vec();
    let mut swaps = Vec::new();

    for component in device.components() {
        if component.len() < 2 {
            continue;
        }
        let mut tree = spanning_tree(device, component[0]);
        let mut remaining: BTreeSet<usize> = component.iter().copied().collect();

        while remaining.len() > 1 {
            let Some(leaf) = remaining.iter().copied().find(|&v| tree[v].len() <= 1) else {
                break;
            };
            let Some(holder) = remaining.iter().copied().find(|&u| tokens[u] == leaf) else {
                return Err(RouteError::InvariantViolation(format!(
                    "no token destined for node {leaf}"
                )));
            };
            if holder != leaf {
                for hop in tree_path(&tree, holder, leaf).windows(2) {
                    tokens.swap(hop[0], hop[1]);
                    swaps.push((hop[0], hop[1]));
                }
            }
            remaining.remove(&leaf);
            let parents: Vec<usize> = tree[leaf].iter().copied().collect();
            for parent in parents {
                tree[parent].remove(&leaf);
            }
            tree[leaf].clear();
        }
    }

    Ok(swaps)
}

/// BFS spanning tree over ascending neighbors, as adjacency sets.
fn spanning_tree(device: &DeviceGraph, root: usize) -> Vec<BTreeSet<usize>> {
    let mut tree = vec![BTreeSet::new(); device.num_nodes()];
    let mut visited = vec![false; device.num_nodes()];
    visited[root] = true;
    let mut queue = VecDeque::from([root]);
    while let Some(v) = queue.pop_front() {
        for &w in device.neighbors_of(v) {
            if !visited[w] {
                visited[w] = true;
                tree[v].insert(w);
                tree[w].insert(v);
                queue.push_back(w);
            }
        }
    }
    tree
}

/// Path from `from` to `to` inside the tree, both ends included.
fn tree_path(tree: &[BTreeSet<usize>], from: usize, to: usize) -> Vec<usize> {
    let mut parent = vec![usize::MAX; tree.len()];
    parent[from] = from;
    let mut queue = VecDeque::from([from]);
    while let Some(v) = queue.pop_front() {
        if v == to {
            break;
        }
        for &w in &tree[v] {
            if parent[w] == usize::MAX {
                parent[w] = v;
                queue.push_back(w);
            }
        }
    }
    let mut path = vec![to];
    let mut current = to;
    while current != from && parent[current] != usize::MAX {
        current = parent[current];
        path.push(current);
    }
    path.reverse();
    path
}

impl RoutedCircuit {
    /// Append SWAPs returning every qubit to its initial node, leaving an
    /// identity implicit permutation. Returns the number of SWAPs added.
    pub fn restore_permutation(&mut self, device: &DeviceGraph) -> RouteResult<usize> {
        let mut destination: Vec<usize> = (0..device.num_nodes()).collect();
        for &(from, to) in self.circuit.implicit_permutation() {
            destination[to.index()] = from.index();
        }

        let swaps = restore_permutation(device, &destination)?;
        for &(a, b) in &swaps {
            self.circuit
                .swap(QubitId::from_index(a), QubitId::from_index(b))?;
            self.final_map.swap_physical(a, b);
        }
        self.circuit.clear_implicit_permutation();
        self.stats.swaps += swaps.len();
        self.stats.ops_out = self.circuit.num_ops();
        Ok(swaps.len())
    }
}
