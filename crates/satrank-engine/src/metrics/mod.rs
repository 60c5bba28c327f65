//! Centrality metrics over a reduced channel subgraph.
//!
//! # Overview
//!
//! - **Betweenness centrality** (`betweenness`): which nodes and which
//!   specific channels carry the cheapest payment routes? Weighted by the
//!   scenario's fee view, so "shortest" means "cheapest for this amount".
//! - **Ranking** (`rank`): "min" ranking of the shares; tied subjects
//!   receive the identical, lowest available rank.
//!
//! Scores are normalized shares in `[0, 1]`: nodes by `(n-1)(n-2)`, edges
//! by `n(n-1)`, the standard factors for directed graphs.

pub mod betweenness;
pub mod rank;

pub use betweenness::{BetweennessScores, EdgeScore, betweenness};
pub use rank::min_ranks;
