//! Competitive route finding: how much does routing through the home node
//! save versus the best detour?
//!
//! # Algorithm
//!
//! Given a scenario subgraph, a distinguished *home* node, and an origin:
//!
//! 1. Zero the weight of every channel leaving home (the home node forwards
//!    at cost to itself) and run single-source cheapest paths from the
//!    origin, tracking one predecessor per vertex.
//! 2. Every reachable destination whose path passes through home becomes a
//!    candidate: record its cost, the upstream peer of home on the path,
//!    and home's outgoing channel toward the next hop (the channel whose
//!    fee terms the home node controls).
//! 3. Re-run cheapest paths with home excluded entirely.
//! 4. `fee_differential = cost_without_home - cost_with_home`. Positive
//!    means home is the cheaper intermediary. Destinations unreachable
//!    without home are omitted — there is no meaningful comparison.
//!
//! The subgraph is never mutated: zeroing and exclusion are view-level
//! overrides inside the Dijkstra runs. Purely functional per call; origin
//! and amount sampling is the caller's policy (see [`crate::scenario`]).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::graph::ReducedGraph;

/// One destination's competitive comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteComparison {
    /// Destination node id.
    pub destination: String,
    /// Upstream peer of the home node on the cheapest path.
    pub peer: String,
    /// Channel arena index of home's outgoing channel on the path.
    pub channel: usize,
    /// Cheapest cost through home (home's own fees zeroed), millisatoshi.
    pub cost_via_home_msat: u64,
    /// Cheapest cost avoiding home entirely, millisatoshi.
    pub cost_without_home_msat: u64,
    /// `cost_without_home - cost_via_home`; positive favors home.
    pub fee_differential_msat: i64,
}

/// Compare the cheapest paths through `home_id` against the cheapest paths
/// avoiding it, from `origin_id`, over an already fee-weighted subgraph.
///
/// Degenerate inputs (origin or home missing from the subgraph, or origin
/// == home) yield an empty result rather than an error.
#[must_use]
#[instrument(skip(sub), fields(nodes = sub.graph.node_count()))]
pub fn compare_routes(sub: &ReducedGraph, home_id: &str, origin_id: &str) -> Vec<RouteComparison> {
    let (Some(home), Some(origin)) = (sub.node_index(home_id), sub.node_index(origin_id)) else {
        debug!(home_id, origin_id, "home or origin not in subgraph");
        return Vec::new();
    };
    if home == origin {
        return Vec::new();
    }

    // Pass 1: home forwards for free.
    let with_home = shortest_paths(sub, origin, Some(home), None);

    // The upstream peer of home is path-tree global: home has one parent.
    let Some((peer_idx, _)) = with_home.parent[home.index()] else {
        // Home unreachable from origin: nothing routes through it.
        return Vec::new();
    };
    let peer = sub.graph[peer_idx].id.clone();

    // Candidates: destinations whose path passes through home.
    let mut candidates: Vec<(NodeIndex, usize, u64)> = Vec::new();
    for dest in sub.graph.node_indices() {
        if dest == origin || dest == home {
            continue;
        }
        let cost = with_home.dist[dest.index()];
        if cost == u64::MAX {
            continue;
        }
        if let Some(channel) = home_exit_channel(sub, &with_home.parent, home, dest) {
            candidates.push((dest, channel, cost));
        }
    }

    if candidates.is_empty() {
        debug!(origin_id, "no destination routes through home");
        return Vec::new();
    }

    // Pass 2: the network without home.
    let without_home = shortest_paths(sub, origin, None, Some(home));

    let mut comparisons: Vec<RouteComparison> = candidates
        .into_iter()
        .filter_map(|(dest, channel, cost_via_home)| {
            let cost_without = without_home.dist[dest.index()];
            (cost_without != u64::MAX).then(|| RouteComparison {
                destination: sub.graph[dest].id.clone(),
                peer: peer.clone(),
                channel,
                cost_via_home_msat: cost_via_home,
                cost_without_home_msat: cost_without,
                fee_differential_msat: differential(cost_without, cost_via_home),
            })
        })
        .collect();

    comparisons.sort_by(|a, b| a.destination.cmp(&b.destination));
    comparisons
}

fn differential(cost_without: u64, cost_via: u64) -> i64 {
    i64::try_from(i128::from(cost_without) - i128::from(cost_via)).unwrap_or(i64::MAX)
}

/// Walk the parent chain from `dest` back to the origin; if it passes
/// through `home`, return home's outgoing channel on the path.
fn home_exit_channel(
    sub: &ReducedGraph,
    parent: &[Option<(NodeIndex, EdgeIndex)>],
    home: NodeIndex,
    dest: NodeIndex,
) -> Option<usize> {
    let mut current = dest;
    while let Some((prev, edge)) = parent[current.index()] {
        if prev == home {
            return Some(sub.graph[edge].channel);
        }
        current = prev;
    }
    None
}

struct PathTree {
    dist: Vec<u64>,
    parent: Vec<Option<(NodeIndex, EdgeIndex)>>,
}

/// Dijkstra with one recorded predecessor per vertex.
///
/// `zero_source`: edges leaving this vertex cost nothing. `skip`: this
/// vertex is excluded (never settled, never relaxed into).
fn shortest_paths(
    sub: &ReducedGraph,
    origin: NodeIndex,
    zero_source: Option<NodeIndex>,
    skip: Option<NodeIndex>,
) -> PathTree {
    let g = &sub.graph;
    let n = g.node_count();

    let mut dist: Vec<u64> = vec![u64::MAX; n];
    let mut parent: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
    let mut settled = FixedBitSet::with_capacity(n);

    dist[origin.index()] = 0;
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
    heap.push(Reverse((0, origin.index())));

    while let Some(Reverse((d, vi))) = heap.pop() {
        if settled.contains(vi) {
            continue;
        }
        settled.insert(vi);
        let v = NodeIndex::new(vi);

        for e in g.edges(v) {
            let w = e.target();
            if Some(w) == skip || settled.contains(w.index()) {
                continue;
            }
            let weight = if Some(v) == zero_source {
                0
            } else {
                e.weight().weight_msat
            };
            let Some(nd) = d.checked_add(weight) else {
                continue;
            };
            if nd < dist[w.index()] {
                dist[w.index()] = nd;
                parent[w.index()] = Some((v, e.id()));
                heap.push(Reverse((nd, w.index())));
            }
        }
    }

    PathTree { dist, parent }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
