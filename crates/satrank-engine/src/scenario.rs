//! Scenario orchestration: parallel per-bucket centrality and randomized
//! routing trials.
//!
//! # Isolation model
//!
//! The base [`ChannelGraph`] is built once and shared read-only. Every
//! scenario (one transaction-size bucket, or one routing trial) derives its
//! own weighted view and reduced subgraph, so scenarios run on independent
//! rayon workers with no shared mutable state. A scenario that comes up
//! empty is recorded as a [`ScenarioFailure`] and skipped; its siblings
//! always continue. Only a malformed snapshot aborts the whole pass.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use satrank_core::config::{AnalysisConfig, FeePolicy, TxBucket};
use satrank_core::report::{
    AnalysisReport, EdgeCentralityRow, NodeCentralityRow, RouteCompetitionRow, ScenarioFailure,
};
use satrank_core::{AnalysisError, Snapshot};

use crate::fees::{WeightedView, mix_seed};
use crate::graph::{ChannelGraph, ReducedGraph};
use crate::metrics::{betweenness, min_ranks};
use crate::routing::compare_routes;

/// Run the full analysis pass: centrality over every bucket plus routing
/// trials, in parallel, over one immutable snapshot.
///
/// # Errors
///
/// Only [`AnalysisError::MalformedSnapshot`] is fatal. Empty scenarios are
/// reported in [`AnalysisReport::failures`] alongside the partial results.
#[instrument(skip(snapshot, config))]
pub fn run_analysis(
    snapshot: &Snapshot,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let base = ChannelGraph::build(snapshot)?;

    // Centrality and routing are independent consumers of the base graph.
    let (centrality, routing) = rayon::join(
        || run_centrality(&base, config),
        || run_routing(&base, config),
    );

    let mut report = AnalysisReport {
        node_centrality: Vec::new(),
        edge_centrality: Vec::new(),
        route_competition: routing.0,
        failures: routing.1,
    };
    for outcome in centrality {
        match outcome {
            Ok((nodes, edges)) => {
                report.node_centrality.extend(nodes);
                report.edge_centrality.extend(edges);
            }
            Err(failure) => report.failures.push(failure),
        }
    }

    info!(
        node_rows = report.node_centrality.len(),
        edge_rows = report.edge_centrality.len(),
        route_rows = report.route_competition.len(),
        failures = report.failures.len(),
        "analysis pass complete"
    );
    Ok(report)
}

type BucketRows = (Vec<NodeCentralityRow>, Vec<EdgeCentralityRow>);

/// Per-bucket centrality pipelines, one rayon task per bucket.
pub fn run_centrality(
    base: &ChannelGraph,
    config: &AnalysisConfig,
) -> Vec<Result<BucketRows, ScenarioFailure>> {
    config
        .buckets
        .par_iter()
        .map(|bucket| {
            centrality_bucket(base, config, bucket).map_err(|err| {
                warn!(scenario = %bucket.label, %err, "centrality scenario skipped");
                failure_of(&bucket.label, &err)
            })
        })
        .collect()
}

#[instrument(skip(base, config), fields(scenario = %bucket.label, amount = bucket.amount_msat))]
fn centrality_bucket(
    base: &ChannelGraph,
    config: &AnalysisConfig,
    bucket: &TxBucket,
) -> Result<BucketRows, AnalysisError> {
    let view = WeightedView::compute(base, bucket.amount_msat, &config.fees, &bucket.label);

    // Bounded-neighborhood reduction replaces the full-SCC reduction when
    // configured; it exists to cap the betweenness cost during iterative
    // testing on large captures.
    let reduced = match &config.local {
        Some(local) => ReducedGraph::local_neighborhood(
            base,
            &view,
            local.start.as_deref(),
            local.max_hops,
            local.max_vertices,
            &bucket.label,
        )?,
        None => ReducedGraph::largest_scc(base, &view, &bucket.label)?,
    };
    if reduced.truncated {
        warn!(
            scenario = %bucket.label,
            "local subgraph truncated at the vertex cap; results cover a partial neighborhood"
        );
    }

    let scores = betweenness(&reduced);

    // Node rows, in subgraph vertex order for determinism.
    let mut node_rows: Vec<NodeCentralityRow> = reduced
        .graph
        .node_indices()
        .map(|v| {
            let node = &reduced.graph[v];
            NodeCentralityRow {
                node_id: node.id.clone(),
                alias: node.alias.clone(),
                betweenness_share: scores.nodes.get(&node.id).copied().unwrap_or(0.0),
                rank: 0,
                scenario: bucket.label.clone(),
                timestamp: base.timestamp,
            }
        })
        .collect();
    let shares: Vec<f64> = node_rows.iter().map(|r| r.betweenness_share).collect();
    for (row, rank) in node_rows.iter_mut().zip(min_ranks(&shares)) {
        row.rank = rank;
    }

    // Edge rows join back to the channel arena's fee attributes.
    let mut edge_rows: Vec<EdgeCentralityRow> = scores
        .edges
        .iter()
        .filter_map(|edge| {
            base.channel(edge.channel).map(|channel| EdgeCentralityRow {
                source: edge.source.clone(),
                destination: edge.destination.clone(),
                short_channel_id: channel.short_channel_id.clone(),
                base_fee_msat: channel.base_fee_msat,
                fee_per_millionth: channel.fee_per_millionth,
                betweenness_share: edge.score,
                rank: 0,
                scenario: bucket.label.clone(),
                timestamp: base.timestamp,
            })
        })
        .collect();
    let shares: Vec<f64> = edge_rows.iter().map(|r| r.betweenness_share).collect();
    for (row, rank) in edge_rows.iter_mut().zip(min_ranks(&shares)) {
        row.rank = rank;
    }

    Ok((node_rows, edge_rows))
}

/// Randomized routing-competition trials, one rayon task per trial.
///
/// Skipped (with an `info!`) when no home node is configured. Each trial
/// draws `(origin, amount)` from its own RNG seeded by `(seed, trial
/// index)`, so a fixed seed reproduces every trial exactly.
pub fn run_routing(
    base: &ChannelGraph,
    config: &AnalysisConfig,
) -> (Vec<RouteCompetitionRow>, Vec<ScenarioFailure>) {
    let Some(home) = config.home_node.as_deref() else {
        info!("no home node configured; routing analysis skipped");
        return (Vec::new(), Vec::new());
    };

    let outcomes: Vec<Result<Vec<RouteCompetitionRow>, ScenarioFailure>> = (0..config
        .routing
        .trials)
        .into_par_iter()
        .map(|trial| {
            let label = format!("routing/trial-{trial}");
            routing_trial(base, config, home, &label).map_err(|err| {
                warn!(scenario = %label, %err, "routing trial skipped");
                failure_of(&label, &err)
            })
        })
        .collect();

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(trial_rows) => rows.extend(trial_rows),
            Err(failure) => failures.push(failure),
        }
    }
    (rows, failures)
}

fn routing_trial(
    base: &ChannelGraph,
    config: &AnalysisConfig,
    home: &str,
    label: &str,
) -> Result<Vec<RouteCompetitionRow>, AnalysisError> {
    let mut rng = match config.fees.seed {
        Some(seed) => StdRng::seed_from_u64(mix_seed(seed, label)),
        None => StdRng::from_entropy(),
    };

    let lo = config.routing.min_amount_msat.min(config.routing.max_amount_msat);
    let hi = config.routing.min_amount_msat.max(config.routing.max_amount_msat);
    let amount_msat = rng.gen_range(lo..=hi);

    // Routing trials never jitter: the component must be deterministic
    // given (subgraph, home, origin, amount).
    let policy = FeePolicy {
        zero_fee: config.fees.zero_fee,
        jitter_msat: 0,
        seed: config.fees.seed,
    };
    let view = WeightedView::compute(base, amount_msat, &policy, label)
        .with_capacity_margin(base, config.routing.capacity_margin);
    let reduced = ReducedGraph::largest_scc(base, &view, label)?;

    let n = reduced.graph.node_count();
    if n == 0 {
        return Err(AnalysisError::empty_graph(label, "largest_scc"));
    }
    let origin_idx = petgraph::graph::NodeIndex::new(rng.gen_range(0..n));
    let origin = reduced
        .node_id(origin_idx)
        .ok_or_else(|| AnalysisError::empty_graph(label, "origin_sample"))?
        .to_string();

    let rows = compare_routes(&reduced, home, &origin)
        .into_iter()
        .filter_map(|cmp| {
            base.channel(cmp.channel).map(|channel| RouteCompetitionRow {
                origin: origin.clone(),
                destination: cmp.destination,
                home_node: home.to_string(),
                peer: cmp.peer,
                short_channel_id: channel.short_channel_id.clone(),
                amount_msat,
                fee_differential_msat: cmp.fee_differential_msat,
                timestamp: base.timestamp,
            })
        })
        .collect();
    Ok(rows)
}

fn failure_of(scenario: &str, err: &AnalysisError) -> ScenarioFailure {
    let stage = match err {
        AnalysisError::MalformedSnapshot { .. } => "build".to_string(),
        AnalysisError::EmptyGraph { stage, .. } => stage.clone(),
    };
    ScenarioFailure {
        scenario: scenario.to_string(),
        stage,
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
