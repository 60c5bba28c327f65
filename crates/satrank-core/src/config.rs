//! Run configuration for an analysis pass.
//!
//! Loaded from TOML; every field has a default so an empty file (or no file)
//! yields a working configuration. Defaults mirror the production run
//! parameters: three transaction-size buckets (micro / common / macro), a
//! 2.5× capacity margin for routing trials, and a +1 msat bump for zero-fee
//! channels so shortest-path distances never collapse to zero.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A named transaction-size scenario for centrality analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBucket {
    /// Scenario label carried into every report row.
    pub label: String,
    /// Candidate transaction size, millisatoshi.
    pub amount_msat: u64,
}

/// How to treat channels whose computed fee for the scenario amount is zero.
///
/// Zero-weight edges are legal but collapse shortest-path distances and make
/// tie-breaking arbitrary. This is an explicit policy, never a silent
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroFeePolicy {
    /// Keep zero weights as computed.
    AsIs,
    /// Bump a computed zero weight to this many millisatoshi (≥ 1).
    Epsilon(u64),
}

impl Default for ZeroFeePolicy {
    fn default() -> Self {
        Self::Epsilon(1)
    }
}

/// Fee-model policy knobs shared by all scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeePolicy {
    /// Zero-weight handling.
    #[serde(default)]
    pub zero_fee: ZeroFeePolicy,
    /// Upper bound of the uniform per-edge jitter added to break weight
    /// ties before betweenness. `0` disables jitter. When enabled without a
    /// `seed`, runs are not exactly reproducible.
    #[serde(default)]
    pub jitter_msat: u64,
    /// Seed for jitter and trial sampling. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Randomized routing-competition trial parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Number of independent `(origin, amount)` trials.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Smallest sampled transaction amount, millisatoshi.
    #[serde(default = "default_min_amount")]
    pub min_amount_msat: u64,
    /// Largest sampled transaction amount, millisatoshi.
    #[serde(default = "default_max_amount")]
    pub max_amount_msat: u64,
    /// A channel is only considered for routing trials when its capacity is
    /// at least `capacity_margin × amount`.
    #[serde(default = "default_capacity_margin")]
    pub capacity_margin: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            min_amount_msat: default_min_amount(),
            max_amount_msat: default_max_amount(),
            capacity_margin: default_capacity_margin(),
        }
    }
}

/// Bounded-neighborhood reduction for fast iterative testing.
///
/// When set, each centrality scenario is further restricted to a BFS
/// neighborhood of `start` before betweenness runs, capping the dominant
/// cost center on large captures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSubgraphConfig {
    /// BFS start node id. Defaults to the lowest node id in the subgraph.
    #[serde(default)]
    pub start: Option<String>,
    /// Maximum hop distance from the start.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    /// Hard cap on collected vertices, applied in traversal order.
    #[serde(default = "default_max_vertices")]
    pub max_vertices: usize,
}

impl Default for LocalSubgraphConfig {
    fn default() -> Self {
        Self {
            start: None,
            max_hops: default_max_hops(),
            max_vertices: default_max_vertices(),
        }
    }
}

/// Full configuration for one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Transaction-size buckets for centrality scenarios.
    #[serde(default = "default_buckets")]
    pub buckets: Vec<TxBucket>,
    /// The distinguished node whose competitive position the routing
    /// pipeline evaluates. Routing is skipped when unset.
    #[serde(default)]
    pub home_node: Option<String>,
    /// Fee-model policy.
    #[serde(default)]
    pub fees: FeePolicy,
    /// Routing-trial parameters.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Optional bounded-subgraph restriction for centrality scenarios.
    #[serde(default)]
    pub local: Option<LocalSubgraphConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            buckets: default_buckets(),
            home_node: None,
            fees: FeePolicy::default(),
            routing: RoutingConfig::default(),
            local: None,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }
}

fn default_buckets() -> Vec<TxBucket> {
    vec![
        TxBucket {
            label: "micro".to_string(),
            amount_msat: 200_000,
        },
        TxBucket {
            label: "common".to_string(),
            amount_msat: 80_000_000,
        },
        TxBucket {
            label: "macro".to_string(),
            amount_msat: 4_000_000_000,
        },
    ]
}

fn default_trials() -> u32 {
    100
}

fn default_min_amount() -> u64 {
    1_000
}

fn default_max_amount() -> u64 {
    1_000_000_000
}

fn default_capacity_margin() -> f64 {
    2.5
}

fn default_max_hops() -> usize {
    3
}

fn default_max_vertices() -> usize {
    200
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AnalysisConfig = toml::from_str("").expect("parse empty");
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.buckets.len(), 3);
        assert_eq!(config.fees.zero_fee, ZeroFeePolicy::Epsilon(1));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let text = r#"
            home_node = "02abc"

            [[buckets]]
            label = "tiny"
            amount_msat = 1000

            [fees]
            zero_fee = "as_is"
            jitter_msat = 1000
            seed = 42

            [routing]
            trials = 5
        "#;
        let config: AnalysisConfig = toml::from_str(text).expect("parse");
        assert_eq!(config.home_node.as_deref(), Some("02abc"));
        assert_eq!(config.buckets.len(), 1);
        assert_eq!(config.fees.zero_fee, ZeroFeePolicy::AsIs);
        assert_eq!(config.fees.seed, Some(42));
        assert_eq!(config.routing.trials, 5);
        // Unnamed routing fields keep defaults.
        assert!((config.routing.capacity_margin - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn load_from_missing_path_is_an_error() {
        let err = AnalysisConfig::load_from_path(Path::new("/nonexistent/satrank.toml"));
        assert!(err.is_err());
    }
}
