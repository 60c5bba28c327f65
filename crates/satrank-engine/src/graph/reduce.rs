//! Connectivity reduction: largest-SCC extraction and bounded neighborhoods.
//!
//! # Overview
//!
//! Betweenness and route comparison are only meaningful where payments can
//! actually flow both ways, so each scenario restricts the base graph to the
//! largest strongly connected component of its admissible active edges.
//!
//! Two reductions are provided:
//!
//! - [`ReducedGraph::largest_scc`] — filter to `active && admissible`
//!   channels, compute SCCs (Tarjan), induce the subgraph on the biggest
//!   component. Ties on component size are broken by the smallest member
//!   node id, so the choice is deterministic across runs.
//! - [`ReducedGraph::local_neighborhood`] — hop-bounded BFS from a start
//!   vertex, capped at a vertex budget. Used to keep betweenness cheap
//!   during iterative testing. If the vertex cap cut the frontier, the
//!   result is flagged [`ReducedGraph::truncated`] — a truncated
//!   neighborhood is not necessarily connected and callers must be able to
//!   tell.
//!
//! A reduced graph is scenario-scoped: built from one [`WeightedView`] and
//! discarded after centrality/routing results are extracted. Edge weights
//! from the view are copied in, so the reduced graph is self-contained.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, info, instrument};

use satrank_core::AnalysisError;

use crate::fees::WeightedView;
use crate::graph::build::{ChannelGraph, GraphNode};

/// Edge payload of a reduced subgraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducedEdge {
    /// Index into the base graph's channel arena.
    pub channel: usize,
    /// Fee weight copied from the scenario's weighted view, millisatoshi.
    pub weight_msat: u64,
}

/// Size summary logged per scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubgraphStats {
    /// Vertices in the reduced subgraph.
    pub node_count: usize,
    /// Channels in the reduced subgraph.
    pub edge_count: usize,
    /// `edge_count / (node_count * (node_count - 1))`; 0 below 2 vertices.
    pub density: f64,
}

/// A scenario-scoped subgraph of admissible active channels.
#[derive(Debug)]
pub struct ReducedGraph {
    /// Induced subgraph. Node payloads are cloned from the base graph;
    /// edge payloads carry the arena index and the scenario weight.
    pub graph: DiGraph<GraphNode, ReducedEdge>,
    /// Node id → index within `graph`.
    pub node_map: HashMap<String, NodeIndex>,
    /// True when a bounded BFS hit its vertex cap before finishing a hop
    /// boundary. Always false for [`ReducedGraph::largest_scc`] results.
    pub truncated: bool,
}

impl ReducedGraph {
    /// Restrict to the largest strongly connected component of the
    /// `active && admissible` channels.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::EmptyGraph`] when no channel survives filtering.
    #[instrument(skip(base, view), fields(scenario))]
    pub fn largest_scc(
        base: &ChannelGraph,
        view: &WeightedView,
        scenario: &str,
    ) -> Result<Self, AnalysisError> {
        let passing = passing_edges(base, view);
        if passing.is_empty() {
            return Err(AnalysisError::empty_graph(scenario, "filter"));
        }

        // SCCs over the filtered edge set, on the base graph's vertex set.
        let mut filtered = DiGraph::<(), ()>::with_capacity(base.node_count(), passing.len());
        for _ in 0..base.node_count() {
            filtered.add_node(());
        }
        for &(src, dst, _) in &passing {
            filtered.add_edge(src, dst, ());
        }

        let components = tarjan_scc(&filtered);
        let max_len = components.iter().map(Vec::len).max().unwrap_or(0);

        // Tie-break on equal vertex count: smallest member node id wins.
        let component = components
            .iter()
            .filter(|c| c.len() == max_len)
            .min_by_key(|c| c.iter().filter_map(|&v| base.node_id(v)).min())
            .ok_or_else(|| AnalysisError::empty_graph(scenario, "largest_scc"))?;

        debug!(
            components = components.len(),
            largest = max_len,
            "strongly connected components labeled"
        );

        let reduced = induce(base, view, &passing, component, false);
        let stats = reduced.stats();
        info!(
            scenario,
            nodes = stats.node_count,
            edges = stats.edge_count,
            "largest SCC subgraph"
        );
        Ok(reduced)
    }

    /// Hop- and size-bounded BFS neighborhood over admissible active edges.
    ///
    /// `start` defaults to the lowest node id among the filtered edges'
    /// endpoints, which makes unconfigured runs deterministic. Vertices are
    /// collected in traversal order up to `max_hops` away, truncated at
    /// `max_vertices`; truncation is surfaced via the returned graph's
    /// `truncated` flag, never hidden.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::EmptyGraph`] when no channel survives filtering or
    /// the start vertex is unknown.
    #[instrument(skip(base, view), fields(scenario, max_hops, max_vertices))]
    pub fn local_neighborhood(
        base: &ChannelGraph,
        view: &WeightedView,
        start: Option<&str>,
        max_hops: usize,
        max_vertices: usize,
        scenario: &str,
    ) -> Result<Self, AnalysisError> {
        let passing = passing_edges(base, view);
        if passing.is_empty() || max_vertices == 0 {
            return Err(AnalysisError::empty_graph(scenario, "filter"));
        }

        let start_idx = match start {
            Some(id) => base
                .node_index(id)
                .ok_or_else(|| AnalysisError::empty_graph(scenario, "local_start"))?,
            None => passing
                .iter()
                .flat_map(|&(src, dst, _)| [src, dst])
                .min_by_key(|&v| base.node_id(v))
                .ok_or_else(|| AnalysisError::empty_graph(scenario, "local_start"))?,
        };

        // Outgoing adjacency restricted to passing edges.
        let mut adjacency: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        for &(src, dst, _) in &passing {
            adjacency.entry(src).or_default().push(dst);
        }

        let mut order: Vec<NodeIndex> = vec![start_idx];
        let mut dist: HashMap<NodeIndex, usize> = HashMap::from([(start_idx, 0)]);
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([start_idx]);
        let mut truncated = false;

        'bfs: while let Some(v) = queue.pop_front() {
            let d = dist[&v];
            if d == max_hops {
                continue;
            }
            for &w in adjacency.get(&v).map_or(&[][..], Vec::as_slice) {
                if dist.contains_key(&w) {
                    continue;
                }
                if order.len() == max_vertices {
                    // The cap cut an unexplored neighbor: the collected set
                    // is partial and may not be connected to everything the
                    // hop bound would have reached.
                    truncated = true;
                    break 'bfs;
                }
                dist.insert(w, d + 1);
                order.push(w);
                queue.push_back(w);
            }
        }

        let reduced = induce(base, view, &passing, &order, truncated);
        let stats = reduced.stats();
        info!(
            scenario,
            nodes = stats.node_count,
            edges = stats.edge_count,
            truncated,
            "bounded local subgraph"
        );
        Ok(reduced)
    }

    /// Vertex index for a node id within this subgraph.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Node id for a vertex.
    #[must_use]
    pub fn node_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|n| n.id.as_str())
    }

    /// Whether every vertex reaches every other vertex both ways.
    #[must_use]
    pub fn is_strongly_connected(&self) -> bool {
        self.graph.node_count() <= 1 || tarjan_scc(&self.graph).len() == 1
    }

    /// Size summary for logging.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> SubgraphStats {
        let n = self.graph.node_count();
        let e = self.graph.edge_count();
        let density = if n < 2 {
            0.0
        } else {
            e as f64 / (n as f64 * (n as f64 - 1.0))
        };
        SubgraphStats {
            node_count: n,
            edge_count: e,
            density,
        }
    }
}

/// Edges surviving the `active && admissible` filter, as
/// `(source, destination, arena index)` in arena order.
fn passing_edges(base: &ChannelGraph, view: &WeightedView) -> Vec<(NodeIndex, NodeIndex, usize)> {
    base.graph
        .edge_references()
        .filter_map(|e| {
            let arena = *e.weight();
            (base.channels[arena].active && view.is_admissible(arena))
                .then_some((e.source(), e.target(), arena))
        })
        .collect()
}

/// Induce the subgraph on `keep` (base-graph vertex indices), retaining the
/// passing edges with both endpoints inside and copying in their scenario
/// weights.
fn induce(
    base: &ChannelGraph,
    view: &WeightedView,
    passing: &[(NodeIndex, NodeIndex, usize)],
    keep: &[NodeIndex],
    truncated: bool,
) -> ReducedGraph {
    let mut graph = DiGraph::with_capacity(keep.len(), passing.len());
    let mut node_map = HashMap::with_capacity(keep.len());
    let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(keep.len());

    for &old in keep {
        if let Some(node) = base.graph.node_weight(old) {
            let new = graph.add_node(node.clone());
            node_map.insert(node.id.clone(), new);
            remap.insert(old, new);
        }
    }

    for &(src, dst, arena) in passing {
        if let (Some(&s), Some(&d)) = (remap.get(&src), remap.get(&dst)) {
            graph.add_edge(
                s,
                d,
                ReducedEdge {
                    channel: arena,
                    weight_msat: view.weight(arena),
                },
            );
        }
    }

    ReducedGraph {
        graph,
        node_map,
        truncated,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use satrank_core::config::FeePolicy;
    use satrank_core::{ChannelRecord, Snapshot};

    fn channel(scid: &str, source: &str, destination: &str, active: bool) -> ChannelRecord {
        ChannelRecord {
            source: source.to_string(),
            destination: destination.to_string(),
            short_channel_id: scid.to_string(),
            base_fee_msat: 1000,
            fee_per_millionth: 100,
            htlc_minimum_msat: 1,
            htlc_maximum_msat: 1_000_000_000,
            capacity_sat: 1_000_000,
            active,
            last_update: None,
        }
    }

    fn snapshot(channels: Vec<ChannelRecord>) -> Snapshot {
        Snapshot {
            captured_at: None,
            nodes: vec![],
            channels,
        }
    }

    fn view(graph: &ChannelGraph) -> WeightedView {
        WeightedView::compute(graph, 10_000, &FeePolicy::default(), "test")
    }

    #[test]
    fn cycle_plus_tail_keeps_only_the_cycle() {
        // a → b → c → a is the SCC; d hangs off c.
        let base = ChannelGraph::build(&snapshot(vec![
            channel("1", "a", "b", true),
            channel("2", "b", "c", true),
            channel("3", "c", "a", true),
            channel("4", "c", "d", true),
        ]))
        .expect("build");
        let reduced = ReducedGraph::largest_scc(&base, &view(&base), "test").expect("reduce");

        assert_eq!(reduced.graph.node_count(), 3);
        assert_eq!(reduced.graph.edge_count(), 3);
        assert!(reduced.node_index("d").is_none());
        assert!(reduced.is_strongly_connected());
        assert!(!reduced.truncated);
    }

    #[test]
    fn inactive_edges_are_filtered_before_scc() {
        // The c → a return edge is inactive, so no 3-cycle survives;
        // a ⇄ b remains the largest SCC.
        let base = ChannelGraph::build(&snapshot(vec![
            channel("1", "a", "b", true),
            channel("2", "b", "a", true),
            channel("3", "b", "c", true),
            channel("4", "c", "a", false),
        ]))
        .expect("build");
        let reduced = ReducedGraph::largest_scc(&base, &view(&base), "test").expect("reduce");

        assert_eq!(reduced.graph.node_count(), 2);
        assert!(reduced.node_index("a").is_some());
        assert!(reduced.node_index("b").is_some());
    }

    #[test]
    fn scc_tie_breaks_on_smallest_member_id() {
        // Two disjoint 2-cycles; the one containing "a" must win.
        let base = ChannelGraph::build(&snapshot(vec![
            channel("1", "x", "y", true),
            channel("2", "y", "x", true),
            channel("3", "a", "b", true),
            channel("4", "b", "a", true),
        ]))
        .expect("build");
        let reduced = ReducedGraph::largest_scc(&base, &view(&base), "test").expect("reduce");

        assert_eq!(reduced.graph.node_count(), 2);
        assert!(reduced.node_index("a").is_some());
        assert!(reduced.node_index("x").is_none());
    }

    #[test]
    fn no_surviving_edges_is_empty_graph_error() {
        let base = ChannelGraph::build(&snapshot(vec![channel("1", "a", "b", false)]))
            .expect("build");
        let err = ReducedGraph::largest_scc(&base, &view(&base), "micro").expect_err("empty");
        assert!(matches!(err, AnalysisError::EmptyGraph { .. }));
    }

    #[test]
    fn parallel_channels_survive_induction_individually() {
        let base = ChannelGraph::build(&snapshot(vec![
            channel("1", "a", "b", true),
            channel("2", "a", "b", true),
            channel("3", "b", "a", true),
        ]))
        .expect("build");
        let reduced = ReducedGraph::largest_scc(&base, &view(&base), "test").expect("reduce");
        assert_eq!(reduced.graph.edge_count(), 3);
    }

    #[test]
    fn local_neighborhood_respects_hop_bound() {
        // Chain a → b → c → d; 1 hop from a reaches only {a, b}.
        let base = ChannelGraph::build(&snapshot(vec![
            channel("1", "a", "b", true),
            channel("2", "b", "c", true),
            channel("3", "c", "d", true),
        ]))
        .expect("build");
        let reduced =
            ReducedGraph::local_neighborhood(&base, &view(&base), Some("a"), 1, 100, "test")
                .expect("bfs");
        assert_eq!(reduced.graph.node_count(), 2);
        assert!(!reduced.truncated);
    }

    #[test]
    fn local_neighborhood_flags_truncation() {
        // Star: a → {b, c, d}; cap of 2 vertices cuts the first hop.
        let base = ChannelGraph::build(&snapshot(vec![
            channel("1", "a", "b", true),
            channel("2", "a", "c", true),
            channel("3", "a", "d", true),
        ]))
        .expect("build");
        let reduced =
            ReducedGraph::local_neighborhood(&base, &view(&base), Some("a"), 2, 2, "test")
                .expect("bfs");
        assert_eq!(reduced.graph.node_count(), 2);
        assert!(reduced.truncated);
    }

    #[test]
    fn local_neighborhood_default_start_is_lowest_id() {
        let base = ChannelGraph::build(&snapshot(vec![
            channel("1", "m", "z", true),
            channel("2", "b", "m", true),
        ]))
        .expect("build");
        let reduced =
            ReducedGraph::local_neighborhood(&base, &view(&base), None, 0, 100, "test")
                .expect("bfs");
        // Start at "b" (lowest id), zero hops → just the start vertex.
        assert_eq!(reduced.graph.node_count(), 1);
        assert!(reduced.node_index("b").is_some());
    }
}
