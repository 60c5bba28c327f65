//! Result tables handed to the caller for persistence.
//!
//! The engine never writes anywhere itself; a run returns an
//! [`AnalysisReport`] of flat rows, one per `(subject, scenario)`, ready for
//! whatever sink the caller uses (files, a warehouse, stdout).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node betweenness for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCentralityRow {
    /// Node id.
    pub node_id: String,
    /// Display alias, if the node announced one.
    pub alias: Option<String>,
    /// Normalized betweenness share in `[0, 1]`.
    pub betweenness_share: f64,
    /// 1 = highest share; ties share the lowest available rank.
    pub rank: u64,
    /// Scenario label (transaction-size bucket).
    pub scenario: String,
    /// Snapshot timestamp the row was computed from.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Edge (channel) betweenness for one scenario, joined back to the
/// channel's fee attributes so reports stand alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCentralityRow {
    /// Forwarding node.
    pub source: String,
    /// Receiving node.
    pub destination: String,
    /// Which specific channel among parallel channels.
    pub short_channel_id: String,
    /// Channel base fee, millisatoshi.
    pub base_fee_msat: u64,
    /// Channel proportional fee, parts-per-million.
    pub fee_per_millionth: u64,
    /// Normalized betweenness share in `[0, 1]`.
    pub betweenness_share: f64,
    /// 1 = highest share; ties share the lowest available rank.
    pub rank: u64,
    /// Scenario label.
    pub scenario: String,
    /// Snapshot timestamp.
    pub timestamp: Option<DateTime<Utc>>,
}

/// One routing-competition observation.
///
/// `fee_differential_msat` is the cheapest cost avoiding the home node minus
/// the cheapest cost through it; positive means the home node is the cheaper
/// intermediary for this destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCompetitionRow {
    /// Sampled origin node.
    pub origin: String,
    /// Destination reached through the home node.
    pub destination: String,
    /// The distinguished node under evaluation.
    pub home_node: String,
    /// Upstream peer of the home node on the cheapest path.
    pub peer: String,
    /// The home node's outgoing channel used on the path.
    pub short_channel_id: String,
    /// Sampled transaction amount, millisatoshi.
    pub amount_msat: u64,
    /// `cost_without_home - cost_with_home`, millisatoshi.
    pub fee_differential_msat: i64,
    /// Snapshot timestamp.
    pub timestamp: Option<DateTime<Utc>>,
}

/// A scenario that was skipped, with enough context to log and move on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFailure {
    /// Scenario label or trial tag.
    pub scenario: String,
    /// Pipeline stage that failed.
    pub stage: String,
    /// Human-readable cause.
    pub message: String,
}

/// Everything one analysis pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One row per `(node, scenario)`.
    pub node_centrality: Vec<NodeCentralityRow>,
    /// One row per `(channel, scenario)`.
    pub edge_centrality: Vec<EdgeCentralityRow>,
    /// One row per `(origin, destination, trial)` with a comparable route.
    pub route_competition: Vec<RouteCompetitionRow>,
    /// Scenarios that were skipped. Partial results above are still valid.
    pub failures: Vec<ScenarioFailure>,
}

impl AnalysisReport {
    /// `true` when the pass produced no rows and no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_centrality.is_empty()
            && self.edge_centrality.is_empty()
            && self.route_competition.is_empty()
            && self.failures.is_empty()
    }

    /// Fold another report's rows into this one.
    pub fn merge(&mut self, other: Self) {
        self.node_centrality.extend(other.node_centrality);
        self.edge_centrality.extend(other.edge_centrality);
        self.route_competition.extend(other.route_competition);
        self.failures.extend(other.failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_concatenates_rows() {
        let mut a = AnalysisReport::default();
        let mut b = AnalysisReport::default();
        b.failures.push(ScenarioFailure {
            scenario: "micro".into(),
            stage: "largest_scc".into(),
            message: "no usable graph".into(),
        });
        assert!(a.is_empty());
        a.merge(b);
        assert!(!a.is_empty());
        assert_eq!(a.failures.len(), 1);
    }
}
