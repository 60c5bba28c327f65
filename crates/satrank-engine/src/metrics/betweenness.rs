//! Fee-weighted betweenness centrality via Brandes' algorithm.
//!
//! # Overview
//!
//! Betweenness measures how often a node or channel lies on the cheapest
//! paths between other pairs. High-betweenness subjects are the bridges of
//! the network for the scenario's transaction size — the routes most
//! payments would take.
//!
//! # Algorithm
//!
//! Brandes (2001), Dijkstra variant for non-negative weights:
//!
//! 1. For each source `s`, run Dijkstra with a lazy-deletion binary heap,
//!    recording shortest-path counts (`sigma`) and predecessor edges.
//!    Path counts accumulate only from settled predecessors, so zero-weight
//!    edges are tolerated (a strictly-positive-only variant would not be —
//!    zero-fee channels are legal).
//! 2. Accumulate dependencies in reverse settlement order, crediting both
//!    the predecessor vertex and the specific edge used. Parallel channels
//!    between the same pair count as distinct shortest paths and receive
//!    individual edge scores.
//! 3. Normalize: nodes by `(n-1)(n-2)`, edges by `n(n-1)` (directed-graph
//!    factors). Graphs with fewer than 2 vertices return empty score sets —
//!    a degenerate but valid case, not an error.
//!
//! Complexity: O(V·(E log V)).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use fixedbitset::FixedBitSet;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::instrument;

use crate::graph::ReducedGraph;

/// Betweenness share of one specific channel.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeScore {
    /// Forwarding node id.
    pub source: String,
    /// Receiving node id.
    pub destination: String,
    /// Channel arena index in the base graph — joins the score back to the
    /// channel's fee attributes for reporting.
    pub channel: usize,
    /// Normalized betweenness share in `[0, 1]`.
    pub score: f64,
}

/// Node and edge betweenness for one scenario subgraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetweennessScores {
    /// Normalized share per node id.
    pub nodes: HashMap<String, f64>,
    /// Normalized share per channel, in subgraph edge order.
    pub edges: Vec<EdgeScore>,
}

/// Compute weighted betweenness centrality for all nodes and channels.
#[must_use]
#[instrument(skip(sub), fields(nodes = sub.graph.node_count(), edges = sub.graph.edge_count()))]
pub fn betweenness(sub: &ReducedGraph) -> BetweennessScores {
    let g = &sub.graph;
    let n = g.node_count();
    let m = g.edge_count();

    if n < 2 {
        return BetweennessScores::default();
    }

    let mut node_cb: Vec<f64> = vec![0.0; n];
    let mut edge_cb: Vec<f64> = vec![0.0; m];

    for s in g.node_indices() {
        let si = s.index();

        // Dijkstra state, indexed by vertex.
        let mut dist: Vec<u64> = vec![u64::MAX; n];
        let mut sigma: Vec<f64> = vec![0.0; n];
        let mut preds: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
        let mut settled = FixedBitSet::with_capacity(n);
        let mut order: Vec<NodeIndex> = Vec::with_capacity(n);

        dist[si] = 0;
        sigma[si] = 1.0;

        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
        heap.push(Reverse((0, si)));

        while let Some(Reverse((d, vi))) = heap.pop() {
            if settled.contains(vi) {
                continue;
            }
            settled.insert(vi);
            let v = NodeIndex::new(vi);
            order.push(v);

            for e in g.edges(v) {
                let wi = e.target().index();
                if settled.contains(wi) {
                    continue;
                }
                let Some(nd) = d.checked_add(e.weight().weight_msat) else {
                    continue;
                };
                if nd < dist[wi] {
                    dist[wi] = nd;
                    sigma[wi] = sigma[vi];
                    preds[wi].clear();
                    preds[wi].push((v, e.id()));
                    heap.push(Reverse((nd, wi)));
                } else if nd == dist[wi] {
                    sigma[wi] += sigma[vi];
                    preds[wi].push((v, e.id()));
                }
            }
        }

        // Dependency accumulation, farthest settled vertices first.
        let mut delta: Vec<f64> = vec![0.0; n];

        for &w in order.iter().rev() {
            let wi = w.index();
            for &(v, eid) in &preds[wi] {
                let vi = v.index();
                if sigma[wi] > 0.0 {
                    let credit = (sigma[vi] / sigma[wi]) * (1.0 + delta[wi]);
                    edge_cb[eid.index()] += credit;
                    delta[vi] += credit;
                }
            }
            if wi != si {
                node_cb[wi] += delta[wi];
            }
        }
    }

    normalize(sub, &node_cb, &edge_cb)
}

#[allow(clippy::cast_precision_loss)]
fn normalize(sub: &ReducedGraph, node_cb: &[f64], edge_cb: &[f64]) -> BetweennessScores {
    let g = &sub.graph;
    let n = g.node_count();

    let node_scale = if n >= 3 {
        1.0 / ((n as f64 - 1.0) * (n as f64 - 2.0))
    } else {
        0.0
    };
    let edge_scale = 1.0 / (n as f64 * (n as f64 - 1.0));

    let nodes = g
        .node_indices()
        .map(|v| (g[v].id.clone(), node_cb[v.index()] * node_scale))
        .collect();

    let edges = g
        .edge_references()
        .map(|e| EdgeScore {
            source: g[e.source()].id.clone(),
            destination: g[e.target()].id.clone(),
            channel: e.weight().channel,
            score: edge_cb[e.id().index()] * edge_scale,
        })
        .collect();

    BetweennessScores { nodes, edges }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::GraphNode;
    use crate::graph::reduce::ReducedEdge;
    use petgraph::graph::DiGraph;
    use std::collections::BTreeSet;

    /// Build a ReducedGraph directly from a weighted edge list; channel
    /// arena indices follow edge-list order.
    fn make_subgraph(edges: &[(&str, &str, u64)]) -> ReducedGraph {
        let mut graph = DiGraph::<GraphNode, ReducedEdge>::new();
        let mut node_map = HashMap::new();

        let ids: BTreeSet<&str> = edges.iter().flat_map(|(a, b, _)| [*a, *b]).collect();
        for id in ids {
            let idx = graph.add_node(GraphNode {
                id: id.to_string(),
                alias: None,
            });
            node_map.insert(id.to_string(), idx);
        }

        for (channel, (a, b, w)) in edges.iter().enumerate() {
            let ia = node_map[*a];
            let ib = node_map[*b];
            graph.add_edge(
                ia,
                ib,
                ReducedEdge {
                    channel,
                    weight_msat: *w,
                },
            );
        }

        ReducedGraph {
            graph,
            node_map,
            truncated: false,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn fewer_than_two_vertices_yields_empty_scores() {
        let sub = make_subgraph(&[]);
        let scores = betweenness(&sub);
        assert!(scores.nodes.is_empty());
        assert!(scores.edges.is_empty());
    }

    #[test]
    fn uniform_directed_cycle_shares_equally() {
        // 4-cycle, equal weights: raw node betweenness (k-1)(k-2)/2 = 3,
        // normalized by (n-1)(n-2) = 6 → 0.5 each. Edge traversals
        // k(k-1)/2 = 6, normalized by n(n-1) = 12 → 0.5 each.
        let sub = make_subgraph(&[
            ("a", "b", 10),
            ("b", "c", 10),
            ("c", "d", 10),
            ("d", "a", 10),
        ]);
        let scores = betweenness(&sub);

        for id in ["a", "b", "c", "d"] {
            assert!(approx(scores.nodes[id], 0.5), "{id}: {}", scores.nodes[id]);
        }
        for edge in &scores.edges {
            assert!(approx(edge.score, 0.5), "edge score {}", edge.score);
        }
    }

    #[test]
    fn cheaper_branch_takes_the_whole_share() {
        // a→b→d costs 2, a→c→d costs 10: b owns the a→d pair entirely.
        let sub = make_subgraph(&[
            ("a", "b", 1),
            ("b", "d", 1),
            ("a", "c", 5),
            ("c", "d", 5),
        ]);
        let scores = betweenness(&sub);

        // Raw: b = 1 (pair a→d), c = 0; normalized by (4-1)(4-2) = 6.
        assert!(approx(scores.nodes["b"], 1.0 / 6.0));
        assert!(approx(scores.nodes["c"], 0.0));
    }

    #[test]
    fn equal_cost_branches_split_the_share() {
        let sub = make_subgraph(&[
            ("a", "b", 3),
            ("b", "d", 3),
            ("a", "c", 3),
            ("c", "d", 3),
        ]);
        let scores = betweenness(&sub);
        assert!(approx(scores.nodes["b"], 0.5 / 6.0));
        assert!(approx(scores.nodes["c"], 0.5 / 6.0));
    }

    #[test]
    fn weighted_beats_hop_count() {
        // a→d direct costs 100; a→b→c→d costs 3. The long-hop route is
        // cheaper, so b and c are on the only shortest a→d path.
        let sub = make_subgraph(&[
            ("a", "d", 100),
            ("a", "b", 1),
            ("b", "c", 1),
            ("c", "d", 1),
        ]);
        let scores = betweenness(&sub);
        // b on a→c and a→d; c on a→d and b→d. Raw 2 each, /6.
        assert!(approx(scores.nodes["b"], 2.0 / 6.0));
        assert!(approx(scores.nodes["c"], 2.0 / 6.0));
        // The direct a→d edge carries nothing.
        let direct = scores
            .edges
            .iter()
            .find(|e| e.channel == 0)
            .expect("direct edge");
        assert!(approx(direct.score, 0.0));
    }

    #[test]
    fn parallel_channels_split_paths_and_keep_identity() {
        // Two parallel a→b channels at equal cost, then b→c.
        let sub = make_subgraph(&[("a", "b", 1), ("a", "b", 1), ("b", "c", 1)]);
        let scores = betweenness(&sub);

        // b carries the whole a→c pair: raw 1, n = 3 → /2.
        assert!(approx(scores.nodes["b"], 0.5));

        // Each parallel channel: half of a→b plus half of a→c = 1 raw,
        // normalized by n(n-1) = 6.
        let parallel: Vec<&EdgeScore> =
            scores.edges.iter().filter(|e| e.channel < 2).collect();
        assert_eq!(parallel.len(), 2);
        for e in parallel {
            assert!(approx(e.score, 1.0 / 6.0), "channel {}: {}", e.channel, e.score);
        }
        // b→c carries a→c (both paths) and b→c: raw 2 → 2/6.
        let last = scores.edges.iter().find(|e| e.channel == 2).expect("b→c");
        assert!(approx(last.score, 2.0 / 6.0));
    }

    #[test]
    fn zero_weight_edges_are_tolerated() {
        // A zero-fee leg must not panic or underflow the heap logic.
        let sub = make_subgraph(&[("a", "b", 0), ("b", "c", 5), ("c", "a", 5)]);
        let scores = betweenness(&sub);
        assert_eq!(scores.nodes.len(), 3);
        let total: f64 = scores.nodes.values().sum();
        assert!(total.is_finite());
    }

    #[test]
    fn normalized_node_sum_is_bounded() {
        // Sum of normalized node scores ≤ n - 1.
        let sub = make_subgraph(&[
            ("a", "b", 2),
            ("b", "c", 2),
            ("c", "d", 2),
            ("d", "e", 2),
            ("e", "a", 2),
            ("b", "d", 1),
        ]);
        let scores = betweenness(&sub);
        let n = scores.nodes.len() as f64;
        let total: f64 = scores.nodes.values().sum();
        assert!(total <= n - 1.0 + 1e-9, "sum {total} exceeds n-1");
    }
}
