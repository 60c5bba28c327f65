//! Fee model: per-scenario edge weights and admissibility.
//!
//! # Overview
//!
//! Routing cost for forwarding `amount` over a channel is
//!
//! ```text
//! weight = base_fee_msat + floor(amount_msat * fee_per_millionth / 1_000_000)
//! ```
//!
//! computed in integer millisatoshi (u128 intermediate) so there is no
//! floating-point drift. A channel is *admissible* for an amount exactly when
//! `htlc_minimum_msat <= amount <= htlc_maximum_msat`, both ends inclusive.
//!
//! ## Scenario-scoped views
//!
//! The base [`ChannelGraph`] is never mutated. Each transaction-size
//! scenario derives a [`WeightedView`]: one weight and one admissibility bit
//! per channel arena index, discarded when the scenario is done.
//!
//! ## Tie-breaking
//!
//! Two explicit, configurable policies exist (neither is silent):
//!
//! - [`ZeroFeePolicy::Epsilon`] bumps computed zero weights so zero-fee
//!   channels do not collapse all shortest-path distances to zero.
//! - `jitter_msat` adds uniform per-edge noise drawn **once per edge per
//!   scenario** from a seeded RNG. With a fixed seed runs reproduce exactly;
//!   without one, jitter breaks reproducibility by design.

use fixedbitset::FixedBitSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use satrank_core::ChannelRecord;
use satrank_core::config::{FeePolicy, ZeroFeePolicy};
use tracing::{debug, instrument};

use crate::graph::ChannelGraph;

/// Scalar routing cost plus capacity verdict for one `(channel, amount)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeCost {
    /// Non-negative fee for forwarding the amount, millisatoshi.
    pub weight_msat: u64,
    /// Whether the amount lies within the channel's forwarding bounds.
    pub admissible: bool,
}

/// Pure fee computation for one channel and amount.
///
/// Deterministic: no randomness, no history. Jitter, when enabled, is
/// applied by [`WeightedView::compute`] on top of this value.
#[must_use]
pub fn channel_cost(channel: &ChannelRecord, amount_msat: u64, zero_fee: ZeroFeePolicy) -> EdgeCost {
    let proportional = u128::from(amount_msat) * u128::from(channel.fee_per_millionth) / 1_000_000;
    let proportional = u64::try_from(proportional).unwrap_or(u64::MAX);
    let weight_msat = channel.base_fee_msat.saturating_add(proportional);

    let weight_msat = match zero_fee {
        ZeroFeePolicy::AsIs => weight_msat,
        ZeroFeePolicy::Epsilon(eps) if weight_msat == 0 => eps.max(1),
        ZeroFeePolicy::Epsilon(_) => weight_msat,
    };

    EdgeCost {
        weight_msat,
        admissible: channel.htlc_minimum_msat <= amount_msat
            && amount_msat <= channel.htlc_maximum_msat,
    }
}

// ---------------------------------------------------------------------------
// WeightedView
// ---------------------------------------------------------------------------

/// Per-scenario derived weights, indexed by channel arena index.
///
/// Ephemeral: built fresh per `(amount, scenario)` and discarded once the
/// scenario's results are extracted.
#[derive(Debug, Clone)]
pub struct WeightedView {
    /// The amount this view was computed for, millisatoshi.
    pub amount_msat: u64,
    /// Fee weight per channel arena index.
    weights: Vec<u64>,
    /// Admissibility bit per channel arena index.
    admissible: FixedBitSet,
}

impl WeightedView {
    /// Compute the weighted view for one scenario amount.
    ///
    /// Jitter (if `policy.jitter_msat > 0`) is drawn once per edge from an
    /// RNG seeded by `(policy.seed, scenario)`, so a fixed seed reproduces
    /// the exact view.
    #[must_use]
    #[instrument(skip(graph, policy), fields(channels = graph.channels.len()))]
    pub fn compute(
        graph: &ChannelGraph,
        amount_msat: u64,
        policy: &FeePolicy,
        scenario: &str,
    ) -> Self {
        let mut weights = Vec::with_capacity(graph.channels.len());
        let mut admissible = FixedBitSet::with_capacity(graph.channels.len());

        let mut jitter_rng = (policy.jitter_msat > 0).then(|| match policy.seed {
            Some(seed) => StdRng::seed_from_u64(mix_seed(seed, scenario)),
            None => StdRng::from_entropy(),
        });

        for (idx, channel) in graph.channels.iter().enumerate() {
            let cost = channel_cost(channel, amount_msat, policy.zero_fee);
            let jitter = jitter_rng
                .as_mut()
                .map_or(0, |rng| rng.gen_range(0..=policy.jitter_msat));
            weights.push(cost.weight_msat.saturating_add(jitter));
            admissible.set(idx, cost.admissible);
        }

        debug!(
            amount_msat,
            admissible = admissible.count_ones(..),
            "weighted view computed"
        );

        Self {
            amount_msat,
            weights,
            admissible,
        }
    }

    /// Additionally require `capacity >= margin × amount` per channel.
    ///
    /// Routing trials use this headroom filter; a channel running near its
    /// total capacity is not a realistic forwarding candidate.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn with_capacity_margin(mut self, graph: &ChannelGraph, margin: f64) -> Self {
        let required_msat = (self.amount_msat as f64 * margin).ceil() as u64;
        for (idx, channel) in graph.channels.iter().enumerate() {
            if channel.capacity_msat() < required_msat {
                self.admissible.set(idx, false);
            }
        }
        self
    }

    /// Fee weight for a channel arena index.
    #[must_use]
    pub fn weight(&self, arena_idx: usize) -> u64 {
        self.weights[arena_idx]
    }

    /// Whether the channel admits this view's amount.
    #[must_use]
    pub fn is_admissible(&self, arena_idx: usize) -> bool {
        self.admissible.contains(arena_idx)
    }

    /// Number of admissible channels in this view.
    #[must_use]
    pub fn admissible_count(&self) -> usize {
        self.admissible.count_ones(..)
    }
}

/// Derive a per-scenario seed from the configured seed and scenario label.
pub(crate) fn mix_seed(seed: u64, scenario: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(scenario.as_bytes());
    let mut out = [0u8; 8];
    hasher.finalize_xof().fill(&mut out);
    u64::from_le_bytes(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
