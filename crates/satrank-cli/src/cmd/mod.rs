pub mod analyze;
pub mod centrality;
pub mod routes;

use std::path::Path;

use anyhow::{Context, Result};
use satrank_core::{AnalysisConfig, Snapshot};
use tracing::debug;

/// Load the snapshot and (optional) run configuration shared by every
/// subcommand.
pub(crate) fn load_inputs(
    snapshot_path: &Path,
    config_path: Option<&Path>,
) -> Result<(Snapshot, AnalysisConfig)> {
    let bytes = std::fs::read(snapshot_path)
        .with_context(|| format!("read snapshot {}", snapshot_path.display()))?;
    let snapshot = Snapshot::from_json(&bytes)
        .with_context(|| format!("parse snapshot {}", snapshot_path.display()))?;
    debug!(
        nodes = snapshot.nodes.len(),
        channels = snapshot.channels.len(),
        "snapshot loaded"
    );

    let config = match config_path {
        Some(path) => AnalysisConfig::load_from_path(path)?,
        None => AnalysisConfig::default(),
    };
    Ok((snapshot, config))
}
