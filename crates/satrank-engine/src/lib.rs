#![forbid(unsafe_code)]
//! satrank-engine: fee-weighted graph analytics for payment-channel networks.
//!
//! # Pipeline
//!
//! ```text
//! Snapshot (nodes + channels)
//!        ↓  graph::build::ChannelGraph::build()
//! ChannelGraph (immutable multigraph + channel arena)
//!        ↓  fees::WeightedView::compute()          one per scenario amount
//! WeightedView (per-channel weight + admissibility)
//!        ↓  graph::reduce::ReducedGraph::largest_scc()
//! ReducedGraph (largest strongly connected subgraph)
//!        ├─ metrics::betweenness()   → ranked node/channel centrality
//!        └─ routing::compare_routes() → fee differentials vs. best detour
//! ```
//!
//! The base [`graph::ChannelGraph`] is built once and shared read-only;
//! every scenario derives its own [`fees::WeightedView`] and
//! [`graph::ReducedGraph`] and never mutates shared state, so scenarios run
//! in parallel (see [`scenario`]).
//!
//! # Conventions
//!
//! - **Errors**: [`satrank_core::AnalysisError`]; one scenario failing never
//!   aborts its siblings.
//! - **Logging**: `tracing` macros; pipeline entry points are
//!   `#[instrument]`ed.
//! - **Units**: millisatoshi throughout.

pub mod fees;
pub mod graph;
pub mod metrics;
pub mod routing;
pub mod scenario;

pub use fees::{EdgeCost, WeightedView, channel_cost};
pub use graph::{ChannelGraph, ReducedGraph};
pub use metrics::BetweennessScores;
pub use routing::compare_routes;
pub use scenario::run_analysis;
