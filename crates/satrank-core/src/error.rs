//! Error taxonomy for the analytics engine.
//!
//! Two failure classes exist:
//!
//! - [`AnalysisError::MalformedSnapshot`] — structurally invalid input.
//!   Fatal to the whole run; nothing downstream can be trusted.
//! - [`AnalysisError::EmptyGraph`] — filtering/reduction left no usable
//!   graph for one scenario. That scenario is skipped and recorded; sibling
//!   scenarios continue (the per-scenario pipeline is the isolation unit).
//!
//! Unreachable routing destinations are **not** errors — they are silently
//! omitted from routing output, since no comparison is meaningful for them.

use thiserror::Error;

/// Errors produced by graph construction and per-scenario pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The snapshot is structurally invalid (e.g., a channel with a blank
    /// endpoint id). Not retried.
    #[error("malformed snapshot: {reason}")]
    MalformedSnapshot {
        /// What was wrong with the input.
        reason: String,
    },

    /// Fee/capacity filtering or SCC reduction produced no usable graph.
    ///
    /// Carries the scenario label and pipeline stage so the caller can log
    /// and continue with the remaining scenarios.
    #[error("no usable graph for scenario `{scenario}` at stage `{stage}`")]
    EmptyGraph {
        /// Scenario label (transaction-size bucket or trial tag).
        scenario: String,
        /// Pipeline stage that came up empty.
        stage: String,
    },
}

impl AnalysisError {
    /// Build a [`AnalysisError::MalformedSnapshot`].
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            reason: reason.into(),
        }
    }

    /// Build an [`AnalysisError::EmptyGraph`] tagged with scenario + stage.
    #[must_use]
    pub fn empty_graph(scenario: impl Into<String>, stage: impl Into<String>) -> Self {
        Self::EmptyGraph {
            scenario: scenario.into(),
            stage: stage.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisError;

    #[test]
    fn display_carries_scenario_and_stage() {
        let err = AnalysisError::empty_graph("micro", "largest_scc");
        let msg = err.to_string();
        assert!(msg.contains("micro"));
        assert!(msg.contains("largest_scc"));
    }
}
