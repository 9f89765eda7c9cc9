//! Lookahead SWAP insertion with optional BRIDGE synthesis.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use qmap_ir::{Instruction, QubitId, StandardGate};

use crate::config::RoutingConfig;
use crate::device::{DeviceGraph, UNREACHABLE};
use crate::error::RouteResult;
use crate::routing::method::{Replacement, RoutingMethod};
use crate::routing::window::RoutingWindow;

/// Tolerance for comparing floating-point scores.
const EPSILON: f64 = 1e-9;

/// The general-purpose routing method.
///
/// It can act on every non-empty window, so a router whose method list
/// ends with it never deadlocks on a connected device. Per resolution it
///
/// 1. places unmapped front qubits next to their partner,
/// 2. after too many fruitless resolutions, walks the closest front
///    interaction along a shortest path,
/// 3. bridges a distance-2 CX when no SWAP improves the lookahead
///    (only with `bridge` enabled),
/// 4. otherwise inserts the best-scoring SWAP.
///
/// A SWAP candidate is a device edge at a front node that brings that
/// node's qubit one hop closer to its partner. Its score is the summed
/// front distance after the SWAP plus `extended_weight` times the mean
/// lookahead distance, each lookahead gate weighted by `decay^layer`.
/// Ties go to the lowest node pair.
#[derive(Debug, Clone, Default)]
pub struct SwapRouting {
    config: RoutingConfig,
}

impl SwapRouting {
    /// Create the method with the given scoring parameters.
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Place unmapped front qubits, or `None` if every front qubit is mapped.
    fn place_unmapped(window: &RoutingWindow<'_>, device: &DeviceGraph) -> Option<Replacement> {
        let mut relabel: Vec<(QubitId, usize)> = Vec::new();

        for gate in &window.front {
            let (a, b) = gate.qubits();
            let lookup = |relabel: &[(QubitId, usize)], q: QubitId| {
                window
                    .position(q)
                    .or_else(|| relabel.iter().find(|(l, _)| *l == q).map(|&(_, p)| p))
            };
            let is_free = |relabel: &[(QubitId, usize)], p: usize| {
                window.map.is_free(p) && relabel.iter().all(|&(_, taken)| taken != p)
            };

            match (lookup(&relabel, a), lookup(&relabel, b)) {
                (Some(_), Some(_)) => {}
                (Some(pa), None) => {
                    if let Some(p) = device
                        .nearest(pa, |p| is_free(&relabel, p))
                        .or_else(|| lowest_free(device, |p| is_free(&relabel, p)))
                    {
                        relabel.push((b, p));
                    }
                }
                (None, Some(pb)) => {
                    if let Some(p) = device
                        .nearest(pb, |p| is_free(&relabel, p))
                        .or_else(|| lowest_free(device, |p| is_free(&relabel, p)))
                    {
                        relabel.push((a, p));
                    }
                }
                (None, None) => {
                    let pair = device
                        .edges()
                        .iter()
                        .copied()
                        .find(|&(x, y)| is_free(&relabel, x) && is_free(&relabel, y));
                    if let Some((x, y)) = pair {
                        relabel.push((a, x));
                        relabel.push((b, y));
                    } else if let Some(x) = lowest_free(device, |p| is_free(&relabel, p)) {
                        relabel.push((a, x));
                        if let Some(y) = device
                            .nearest(x, |p| is_free(&relabel, p))
                            .or_else(|| lowest_free(device, |p| is_free(&relabel, p)))
                        {
                            relabel.push((b, y));
                        }
                    }
                }
            }
        }

        if relabel.is_empty() {
            None
        } else {
            Some(Replacement::relabel(relabel))
        }
    }

    /// Route the closest front interaction all the way along a shortest path.
    fn release(window: &RoutingWindow<'_>, device: &DeviceGraph) -> Option<Replacement> {
        let (pa, pb) = window
            .front
            .iter()
            .filter_map(|g| {
                let (a, b) = g.qubits();
                let (pa, pb) = (window.position(a)?, window.position(b)?);
                let d = device.dist(pa, pb);
                (d != UNREACHABLE).then_some((d, g.index, pa, pb))
            })
            .min()
            .map(|(_, _, pa, pb)| (pa, pb))?;

        let path = device.shortest_path(pa, pb)?;
        if path.len() <= 2 {
            return None;
        }
        let swaps: Vec<_> = path[..path.len() - 1]
            .windows(2)
            .map(|w| (w[0], w[1]))
            .collect();
        Some(Replacement::swaps(swaps))
    }

    /// Candidate SWAP edges that move a front qubit towards its partner.
    fn candidates(window: &RoutingWindow<'_>, device: &DeviceGraph) -> BTreeSet<(usize, usize)> {
        let mut candidates = BTreeSet::new();
        for gate in &window.front {
            let (a, b) = gate.qubits();
            let (Some(pa), Some(pb)) = (window.position(a), window.position(b)) else {
                continue;
            };
            let d = device.dist(pa, pb);
            if d == UNREACHABLE || d <= 1 {
                continue;
            }
            for (here, there) in [(pa, pb), (pb, pa)] {
                for &next in device.neighbors_of(here) {
                    if device.dist(next, there) < d {
                        candidates.insert((here.min(next), here.max(next)));
                    }
                }
            }
        }
        candidates
    }

    /// Summed front distance with `swap` applied.
    fn front_cost(
        window: &RoutingWindow<'_>,
        device: &DeviceGraph,
        swap: Option<(usize, usize)>,
    ) -> f64 {
        window
            .front
            .iter()
            .filter_map(|g| {
                let (a, b) = g.qubits();
                let d = device.dist(moved(window, a, swap)?, moved(window, b, swap)?);
                (d != UNREACHABLE).then(|| f64::from(d))
            })
            .sum()
    }

    /// Mean decayed lookahead distance with `swap` applied.
    fn lookahead_cost(
        &self,
        window: &RoutingWindow<'_>,
        device: &DeviceGraph,
        swap: Option<(usize, usize)>,
    ) -> f64 {
        let mut total = 0.0;
        let mut counted = 0u32;
        for g in &window.lookahead {
            let (a, b) = g.qubits();
            let (Some(pa), Some(pb)) = (moved(window, a, swap), moved(window, b, swap)) else {
                continue;
            };
            let d = device.dist(pa, pb);
            if d == UNREACHABLE {
                continue;
            }
            let layer = i32::try_from(g.depth).unwrap_or(i32::MAX);
            total += self.config.decay.powi(layer) * f64::from(d);
            counted += 1;
        }
        if counted == 0 {
            0.0
        } else {
            total / f64::from(counted)
        }
    }

    /// Best SWAP and its lookahead cost.
    fn best_swap(
        &self,
        window: &RoutingWindow<'_>,
        device: &DeviceGraph,
    ) -> Option<((usize, usize), f64)> {
        let mut best: Option<((usize, usize), f64, f64)> = None;
        for edge in Self::candidates(window, device) {
            let front = Self::front_cost(window, device, Some(edge));
            let ahead = self.lookahead_cost(window, device, Some(edge));
            let score = front + self.config.extended_weight * ahead;
            trace!(a = edge.0, b = edge.1, front, ahead, score, "swap candidate");
            match best {
                Some((_, best_score, _)) if score >= best_score - EPSILON => {}
                _ => best = Some((edge, score, ahead)),
            }
        }
        best.map(|(edge, _, ahead)| (edge, ahead))
    }

    /// BRIDGE for the first distance-2 unconditioned CX, if no SWAP helps
    /// the lookahead.
    fn try_bridge(
        &self,
        window: &RoutingWindow<'_>,
        device: &DeviceGraph,
        best_ahead: Option<f64>,
    ) -> Option<Replacement> {
        let ahead_now = self.lookahead_cost(window, device, None);
        if best_ahead.is_some_and(|after| after < ahead_now - EPSILON) {
            return None;
        }

        window.front.iter().find_map(|g| {
            let inst = g.instruction;
            if inst.as_standard_gate() != Some(&StandardGate::CX) || inst.condition().is_some() {
                return None;
            }
            let (c, t) = g.qubits();
            let (pc, pt) = (window.position(c)?, window.position(t)?);
            if device.dist(pc, pt) != 2 {
                return None;
            }
            let mid = device
                .neighbors_of(pc)
                .iter()
                .copied()
                .find(|&m| device.has_edge(m, pt))?;
            Some(Replacement {
                ops: vec![Instruction::gate(
                    StandardGate::Bridge,
                    [pc, mid, pt].map(QubitId::from_index),
                )],
                consumed: vec![g.index],
                ..Replacement::default()
            })
        })
    }
}

/// Position of `qubit` after applying `swap` to the current map.
fn moved(window: &RoutingWindow<'_>, qubit: QubitId, swap: Option<(usize, usize)>) -> Option<usize> {
    let p = window.position(qubit)?;
    Some(match swap {
        Some((x, y)) if p == x => y,
        Some((x, y)) if p == y => x,
        _ => p,
    })
}

fn lowest_free(device: &DeviceGraph, accept: impl Fn(usize) -> bool) -> Option<usize> {
    (0..device.num_nodes()).find(|&p| accept(p))
}

impl RoutingMethod for SwapRouting {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn can_act(&self, window: &RoutingWindow<'_>, _device: &DeviceGraph) -> bool {
        !window.is_empty()
    }

    fn act(&self, window: &RoutingWindow<'_>, device: &DeviceGraph) -> RouteResult<Replacement> {
        if let Some(replacement) = Self::place_unmapped(window, device) {
            debug!(placed = replacement.relabel.len(), "placing front qubits");
            return Ok(replacement);
        }

        if window.stalled_steps >= self.config.stall_limit {
            if let Some(replacement) = Self::release(window, device) {
                debug!(
                    swaps = replacement.permutation.len(),
                    stalled = window.stalled_steps,
                    "forcing progress along a shortest path"
                );
                return Ok(replacement);
            }
        }

        let best = self.best_swap(window, device);

        if self.config.bridge {
            if let Some(replacement) = self.try_bridge(window, device, best.map(|(_, ahead)| ahead)) {
                debug!("inserting bridge");
                return Ok(replacement);
            }
        }

        match best {
            Some(((a, b), _)) => {
                debug!(a, b, "inserting swap");
                Ok(Replacement::swap(a, b))
            }
            None => Ok(Self::release(window, device).unwrap_or_default()),
        }
    }
}
