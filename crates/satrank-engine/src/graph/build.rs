//! Graph construction from a channel/node snapshot.
//!
//! # Overview
//!
//! Builds a [`petgraph`] directed **multigraph** from a [`Snapshot`]. Each
//! channel record becomes one edge; parallel channels between the same
//! ordered node pair stay individually addressable because every edge weight
//! is an index into the channel arena (a clone of the snapshot's channel
//! list, in input order).
//!
//! ## Inactive channels
//!
//! Channels with `active == false` are included. Filtering happens
//! downstream in the connectivity reducer, so inactive-edge accounting stays
//! auditable on the built graph.
//!
//! ## Dangling endpoints
//!
//! A channel may reference a node missing from the node table (gossip
//! captures are not transactionally consistent). Such endpoints are added
//! as vertices with no alias rather than dropped.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use satrank_core::{AnalysisError, ChannelRecord, Snapshot};
use tracing::{info, instrument};

// ---------------------------------------------------------------------------
// ChannelGraph
// ---------------------------------------------------------------------------

/// Vertex payload: node identity plus display alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Stable node id.
    pub id: String,
    /// Display alias; `None` for nodes only known from channel endpoints.
    pub alias: Option<String>,
}

/// The immutable base graph shared by every scenario.
///
/// Edge weights are indices into [`ChannelGraph::channels`]; the arena is
/// never mutated, and per-scenario fee weights live in separate
/// [`crate::fees::WeightedView`] values keyed by the same indices.
#[derive(Debug)]
pub struct ChannelGraph {
    /// Directed multigraph: nodes = participants, edges = channel arena
    /// indices.
    pub graph: DiGraph<GraphNode, usize>,
    /// Mapping from node id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// Channel arena, in snapshot order.
    pub channels: Vec<ChannelRecord>,
    /// BLAKE3 content hash of the snapshot's channel list.
    pub content_hash: String,
    /// Snapshot timestamp stamped onto report rows.
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChannelGraph {
    /// Build the base graph from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedSnapshot`] if any channel has an
    /// empty source or destination id.
    #[instrument(skip(snapshot), fields(nodes = snapshot.nodes.len(), channels = snapshot.channels.len()))]
    pub fn build(snapshot: &Snapshot) -> Result<Self, AnalysisError> {
        for (i, channel) in snapshot.channels.iter().enumerate() {
            if channel.source.trim().is_empty() || channel.destination.trim().is_empty() {
                return Err(AnalysisError::malformed(format!(
                    "channel #{i} ({}) has a blank endpoint id",
                    channel.short_channel_id
                )));
            }
        }

        let mut graph = DiGraph::<GraphNode, usize>::new();
        let mut node_map: HashMap<String, NodeIndex> =
            HashMap::with_capacity(snapshot.nodes.len());

        for node in &snapshot.nodes {
            node_map.entry(node.id.clone()).or_insert_with(|| {
                graph.add_node(GraphNode {
                    id: node.id.clone(),
                    alias: node.alias.clone(),
                })
            });
        }

        let channels = snapshot.channels.clone();

        for (arena_idx, channel) in channels.iter().enumerate() {
            // Endpoints absent from the node table become alias-less
            // vertices; identity must not be dropped silently.
            let src = *node_map.entry(channel.source.clone()).or_insert_with(|| {
                graph.add_node(GraphNode {
                    id: channel.source.clone(),
                    alias: None,
                })
            });
            let dst = *node_map
                .entry(channel.destination.clone())
                .or_insert_with(|| {
                    graph.add_node(GraphNode {
                        id: channel.destination.clone(),
                        alias: None,
                    })
                });
            graph.add_edge(src, dst, arena_idx);
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "channel graph built"
        );

        Ok(Self {
            graph,
            node_map,
            channels,
            content_hash: snapshot.content_hash(),
            timestamp: snapshot.latest_update(),
        })
    }

    /// Number of vertices.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of channels (edges), parallel channels counted individually.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a node id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Node id for a vertex.
    #[must_use]
    pub fn node_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|n| n.id.as_str())
    }

    /// Channel attributes for an arena index.
    #[must_use]
    pub fn channel(&self, arena_idx: usize) -> Option<&ChannelRecord> {
        self.channels.get(arena_idx)
    }

    /// Count of channels currently announced active.
    #[must_use]
    pub fn active_channel_count(&self) -> usize {
        self.channels.iter().filter(|c| c.active).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
