//! Channel graph construction and connectivity reduction.
//!
//! # Overview
//!
//! [`build::ChannelGraph`] turns a snapshot into a petgraph directed
//! multigraph whose edge weights are indices into an immutable channel
//! arena. [`reduce::ReducedGraph`] restricts it, per scenario, to the
//! largest strongly connected component of the admissible active edges —
//! or to a bounded BFS neighborhood for cheap iterative testing.
//!
//! The base graph is never mutated after construction. All per-scenario
//! state (weights, admissibility, the reduced subgraph itself) lives in
//! derived values with their own lifecycles.

pub mod build;
pub mod reduce;

pub use build::{ChannelGraph, GraphNode};
pub use reduce::{ReducedEdge, ReducedGraph, SubgraphStats};
